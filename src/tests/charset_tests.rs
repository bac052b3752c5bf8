use map_macro::btree_set;

use crate::CharSet;

#[test]
fn test_single_and_contains() {
    let set = CharSet::single('a' as u32);
    assert!(set.contains('a' as u32));
    assert!(!set.contains('b' as u32));
    assert_eq!(set.len(), 1);
    assert_eq!(set.first(), 'a' as u32);
}

#[test]
fn test_empty() {
    let set = CharSet::empty();
    assert!(set.is_empty());
    assert!(!set.contains(0));
}

#[test]
fn test_from_iter_deduplicates() {
    let set = CharSet::from_iter([0x62, 0x61, 0x61]);
    assert_eq!(set.len(), 2);
    assert_eq!(set.first(), 0x61);
}

#[test]
fn test_union_merges_enumerated() {
    let set = CharSet::single(0x61).union(CharSet::from_iter([0x62, 0x63]));
    match &set {
        CharSet::Enumerated(s) => assert_eq!(*s, btree_set! { 0x61, 0x62, 0x63 }),
        other => panic!("expected a merged enumerated set, got {other:?}"),
    }
}

#[test]
fn test_union_keeps_predicates() {
    let digits = CharSet::predicate(|c| char::from_u32(c).is_some_and(|c| c.is_ascii_digit()));
    let set = CharSet::single('x' as u32).union(digits);
    match &set {
        CharSet::Union(members) => assert_eq!(members.len(), 2),
        other => panic!("expected a union, got {other:?}"),
    }
    assert!(set.contains('x' as u32));
    assert!(set.contains('7' as u32));
    assert!(!set.contains('y' as u32));
}

#[test]
fn test_union_flattens_nested_unions() {
    let inner = CharSet::single(0x61).union(CharSet::predicate(|c| c == 0x62));
    let set = inner.union(CharSet::single(0x63));
    let CharSet::Union(members) = &set else {
        panic!("expected a union, got {set:?}");
    };
    // Enumerated members collapse into a single leading set.
    assert_eq!(members.len(), 2);
    assert!(matches!(members[0], CharSet::Enumerated(_)));
    assert!(set.contains(0x61));
    assert!(set.contains(0x62));
    assert!(set.contains(0x63));
    assert!(!set.contains(0x64));
}

#[test]
fn test_complement() {
    let set = CharSet::from_iter(0x30..=0x39).complement();
    assert!(!set.contains('5' as u32));
    assert!(set.contains('a' as u32));
    // The complement is total over the unit range, lone surrogates included.
    assert!(set.contains(0xD800));
    assert!(set.contains(0x10FFFF));
}
