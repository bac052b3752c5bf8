use crate::canonical::canonicalize;

#[test]
fn test_identity_without_ignore_case() {
    assert_eq!(canonicalize('A' as u32, false, false), 'A' as u32);
    assert_eq!(canonicalize('A' as u32, false, true), 'A' as u32);
}

#[test]
fn test_unicode_simple_fold() {
    assert_eq!(canonicalize('A' as u32, true, true), 'a' as u32);
    assert_eq!(canonicalize('a' as u32, true, true), 'a' as u32);
    // KELVIN SIGN folds to `k`.
    assert_eq!(canonicalize(0x212A, true, true), 'k' as u32);
    assert_eq!(canonicalize(0xE9, true, true), 0xE9);
    assert_eq!(canonicalize(0xC9, true, true), 0xE9);
}

#[test]
fn test_unicode_fold_is_not_lowercasing() {
    // These characters fold to a different character than their lowercase
    // mapping (which is themselves).
    assert_eq!(canonicalize(0x17F, true, true), 's' as u32);
    // MICRO SIGN folds to GREEK SMALL LETTER MU.
    assert_eq!(canonicalize(0xB5, true, true), 0x3BC);
    // Final sigma folds to sigma.
    assert_eq!(canonicalize(0x3C2, true, true), 0x3C3);
}

#[test]
fn test_unicode_full_foldings_are_skipped() {
    // SHARP S has only a full (two-character) folding, so it stays itself.
    assert_eq!(canonicalize(0xDF, true, true), 0xDF);
}

#[test]
fn test_legacy_maps_to_uppercase() {
    assert_eq!(canonicalize('a' as u32, true, false), 'A' as u32);
    assert_eq!(canonicalize('A' as u32, true, false), 'A' as u32);
    assert_eq!(canonicalize(0xE9, true, false), 0xC9);
}

#[test]
fn test_legacy_no_ascii_bleed() {
    // LATIN SMALL LETTER LONG S uppercases to `S` but must not match it
    // in per-unit mode.
    assert_eq!(canonicalize(0x17F, true, false), 0x17F);
    // KELVIN SIGN lowercases to `k` but legacy mode maps through uppercase,
    // so it stays itself.
    assert_eq!(canonicalize(0x212A, true, false), 0x212A);
}

#[test]
fn test_legacy_multi_character_mapping_discarded() {
    // LATIN SMALL LETTER SHARP S uppercases to "SS".
    assert_eq!(canonicalize(0xDF, true, false), 0xDF);
}

#[test]
fn test_lone_surrogate_is_its_own_canonical_form() {
    assert_eq!(canonicalize(0xD800, true, false), 0xD800);
    assert_eq!(canonicalize(0xD800, true, true), 0xD800);
}
