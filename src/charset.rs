use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Membership predicate over code points / code units.
pub type CharPredicate = Arc<dyn Fn(u32) -> bool + Send + Sync>;

/// A set of characters, where a character is a `u32` unit (a code point in
/// unicode mode, a UTF-16 code unit otherwise).
///
/// Sets are either enumerated, defined by a predicate (possibly unbounded,
/// e.g. "everything that is not a digit"), or a union of both kinds. Unions
/// keep predicate members as predicates instead of enumerating them, so
/// membership stays a cheap test over the whole range `0..=0x10FFFF`.
#[derive(Clone)]
pub enum CharSet {
    Enumerated(BTreeSet<u32>),
    Predicate(CharPredicate),
    Union(Vec<CharSet>),
}

impl CharSet {
    /// Empty enumerated set.
    pub fn empty() -> Self {
        CharSet::Enumerated(BTreeSet::new())
    }

    /// Set containing a single character.
    pub fn single(ch: u32) -> Self {
        CharSet::Enumerated(BTreeSet::from([ch]))
    }

    pub fn from_iter<I: IntoIterator<Item = u32>>(items: I) -> Self {
        CharSet::Enumerated(items.into_iter().collect())
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(u32) -> bool + Send + Sync + 'static,
    {
        CharSet::Predicate(Arc::new(f))
    }

    /// The complement of this set, as a predicate.
    pub fn complement(self) -> Self {
        CharSet::predicate(move |c| !self.contains(c))
    }

    /// Membership test. Total over all units.
    pub fn contains(&self, ch: u32) -> bool {
        match self {
            CharSet::Enumerated(set) => set.contains(&ch),
            CharSet::Predicate(f) => f(ch),
            CharSet::Union(members) => members.iter().any(|m| m.contains(ch)),
        }
    }

    /// Union of two sets. Enumerated members are merged; predicate members
    /// are carried along untouched.
    pub fn union(self, other: CharSet) -> CharSet {
        let mut concrete = BTreeSet::new();
        let mut rest = Vec::new();
        for set in [self, other] {
            match set {
                CharSet::Enumerated(s) => concrete.extend(s),
                CharSet::Predicate(f) => rest.push(CharSet::Predicate(f)),
                CharSet::Union(members) => {
                    for m in members {
                        match m {
                            CharSet::Enumerated(s) => concrete.extend(s),
                            other => rest.push(other),
                        }
                    }
                }
            }
        }
        if rest.is_empty() {
            return CharSet::Enumerated(concrete);
        }
        if !concrete.is_empty() {
            rest.insert(0, CharSet::Enumerated(concrete));
        }
        CharSet::Union(rest)
    }

    /// Number of characters in a known-enumerable set.
    ///
    /// Only meaningful for `Enumerated` sets; the parser guarantees range
    /// endpoints are singleton enumerated sets, so hitting another variant
    /// here is a programming error.
    pub fn len(&self) -> usize {
        match self {
            CharSet::Enumerated(set) => set.len(),
            _ => panic!("CharSet::len on a non-enumerable set"),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CharSet::Enumerated(set) => set.is_empty(),
            _ => panic!("CharSet::is_empty on a non-enumerable set"),
        }
    }

    /// Smallest character of a non-empty enumerated set.
    pub fn first(&self) -> u32 {
        match self {
            CharSet::Enumerated(set) => {
                *set.iter().next().expect("CharSet::first on an empty set")
            }
            _ => panic!("CharSet::first on a non-enumerable set"),
        }
    }
}

impl fmt::Debug for CharSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharSet::Enumerated(set) => f.debug_tuple("Enumerated").field(set).finish(),
            CharSet::Predicate(_) => f.debug_tuple("Predicate").field(&"<fn>").finish(),
            CharSet::Union(members) => f.debug_tuple("Union").field(members).finish(),
        }
    }
}
