//! Case canonicalization applied to characters before comparison when
//! case-insensitive matching is active.

/// Canonicalizes one character under the given modes.
///
/// With `ignore_case` off this is the identity. In unicode mode the
/// character is case folded through the simple and common foldings;
/// characters with no simple fold (including those with only a full,
/// multi-character folding) fold to themselves. In legacy per-unit
/// mode the character is mapped through its uppercase form, with two
/// exceptions: a mapping that is not exactly one unit is discarded, and a
/// non-ASCII character is never allowed to canonicalize into the ASCII
/// range. That asymmetry prevents case-fold "bleed" between ASCII and
/// non-ASCII characters (e.g. U+017F LATIN SMALL LETTER LONG S uppercases
/// to `S` but must not match it in per-unit mode).
pub fn canonicalize(ch: u32, ignore_case: bool, unicode: bool) -> u32 {
    if !ignore_case {
        return ch;
    }
    if unicode {
        let Some(c) = char::from_u32(ch) else {
            // Lone surrogates have no folding.
            return ch;
        };
        match unicode_case_mapping::case_folded(c) {
            Some(folded) => folded.get(),
            None => ch,
        }
    } else {
        let Some(c) = char::from_u32(ch) else {
            return ch;
        };
        let mut upper = c.to_uppercase();
        let mapped = match (upper.next(), upper.next()) {
            (Some(single), None) => single as u32,
            // Not exactly one unit; leave the character alone.
            _ => return ch,
        };
        // A code point above 0xFFFF would occupy two units.
        if mapped > 0xFFFF {
            return ch;
        }
        if ch >= 128 && mapped < 128 {
            return ch;
        }
        mapped
    }
}
