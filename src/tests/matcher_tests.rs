use std::str::FromStr;

use crate::charset::CharSet;
use crate::unicode::PropertyDatabase;
use crate::{compile, compile_with, Flags, Match, Span};

fn exec(pattern: &str, flags: &str, input: &str, start: usize) -> Option<Match> {
    let flags = Flags::from_str(flags).unwrap();
    compile(pattern, flags).unwrap().execute(input, start)
}

fn span(start: usize, end: usize) -> Option<Span> {
    Some(Span::new(start, end))
}

#[test]
fn test_literal_sequence() {
    let m = exec("abc", "", "abcdef", 0).unwrap();
    assert_eq!(m.end_index, 3);
    assert!(exec("abc", "", "abx", 0).is_none());
    assert_eq!(exec("bc", "", "abc", 1).unwrap().end_index, 3);
}

#[test]
fn test_greedy_vs_lazy() {
    assert_eq!(exec("a+", "", "aaa", 0).unwrap().end_index, 3);
    assert_eq!(exec("a+?", "", "aaa", 0).unwrap().end_index, 1);
    assert_eq!(exec("a*", "", "aaab", 0).unwrap().end_index, 3);
    assert_eq!(exec("a*?", "", "aaab", 0).unwrap().end_index, 0);
}

#[test]
fn test_zero_width_loop_guard_terminates() {
    let m = exec("(a*)*", "", "", 0).unwrap();
    assert_eq!(m.end_index, 0);
    assert_eq!(exec("(a*)*", "", "aaa", 0).unwrap().end_index, 3);
    assert_eq!(exec("(?:a?b?)*", "", "abab", 0).unwrap().end_index, 4);
}

#[test]
fn test_unset_backreference_matches_empty() {
    let m = exec(r"(a)?\1", "", "b", 0).unwrap();
    assert_eq!(m.end_index, 0);
    assert_eq!(m.capture(1), None);
}

#[test]
fn test_backreference() {
    let m = exec(r"(ab)\1", "", "abab", 0).unwrap();
    assert_eq!(m.end_index, 4);
    assert_eq!(m.capture(1), span(0, 2));
    assert!(exec(r"(ab)\1", "", "abac", 0).is_none());
}

#[test]
fn test_backreference_ignore_case() {
    let m = exec(r"(a)\1", "i", "aA", 0).unwrap();
    assert_eq!(m.end_index, 2);
}

#[test]
fn test_capture_scenario() {
    let m = exec(r"(\d+)-(\d+)", "", "12-34", 0).unwrap();
    assert_eq!(m.end_index, 5);
    assert_eq!(m.capture(1), span(0, 2));
    assert_eq!(m.capture(2), span(3, 5));
    // Slot 0 is reserved.
    assert_eq!(m.captures()[0], None);
}

#[test]
fn test_ordered_alternation_first_wins() {
    assert_eq!(exec("a|ab", "", "ab", 0).unwrap().end_index, 1);
    assert_eq!(exec("ab|a", "", "ab", 0).unwrap().end_index, 2);
    // An empty alternative matches anywhere.
    assert_eq!(exec("a|", "", "b", 0).unwrap().end_index, 0);
}

#[test]
fn test_capture_reset_between_iterations() {
    let m = exec("(?:(a)|(b))*", "", "ab", 0).unwrap();
    assert_eq!(m.end_index, 2);
    // The last iteration matched `b`, so group 1 was cleared.
    assert_eq!(m.capture(1), None);
    assert_eq!(m.capture(2), span(1, 2));
}

#[test_log::test]
fn test_quantified_group_capture_reset() {
    // The classic nested-optional example: in the final iteration `ac`,
    // `(b+)?` does not participate and its old span must not leak.
    let m = exec("(z)((a+)?(b+)?(c))*", "", "zaacbbbcac", 0).unwrap();
    assert_eq!(m.end_index, 10);
    assert_eq!(m.capture(1), span(0, 1));
    assert_eq!(m.capture(2), span(8, 10));
    assert_eq!(m.capture(3), span(8, 9));
    assert_eq!(m.capture(4), None);
    assert_eq!(m.capture(5), span(9, 10));
}

#[test]
fn test_quantifier_bounds() {
    assert_eq!(exec("a{2,3}", "", "aaaa", 0).unwrap().end_index, 3);
    assert_eq!(exec("a{2,}", "", "aaaa", 0).unwrap().end_index, 4);
    assert_eq!(exec("a{2}", "", "aaaa", 0).unwrap().end_index, 2);
    assert!(exec("a{2}", "", "a", 0).is_none());
    assert_eq!(exec("a{0}", "", "aaa", 0).unwrap().end_index, 0);
}

#[test]
fn test_lookahead() {
    let m = exec("(?=(a))a", "", "a", 0).unwrap();
    assert_eq!(m.end_index, 1);
    // Captures from inside the lookahead are spliced into the result.
    assert_eq!(m.capture(1), span(0, 1));
    assert!(exec("(?=b)a", "", "a", 0).is_none());
}

#[test]
fn test_negative_lookahead() {
    assert_eq!(exec("(?!a)b", "", "b", 0).unwrap().end_index, 1);
    assert!(exec("(?!a)a", "", "a", 0).is_none());
    // A negative lookahead never contributes captures.
    let m = exec("(?!(x))a", "", "a", 0).unwrap();
    assert_eq!(m.capture(1), None);
}

#[test_log::test]
fn test_lookbehind_is_zero_width() {
    let m = exec("(?<=a)b", "", "ab", 1).unwrap();
    assert_eq!(m.end_index, 2);
    assert!(exec("(?<=x)b", "", "ab", 1).is_none());
}

#[test]
fn test_lookbehind_scans_right_to_left() {
    // A multi-term lookbehind exercises the reversed sequencing.
    let m = exec("(?<=ab)c", "", "abc", 2).unwrap();
    assert_eq!(m.end_index, 3);
    let m = exec("(?<=(a)b)c", "", "abc", 2).unwrap();
    assert_eq!(m.capture(1), span(0, 1));
}

#[test]
fn test_negative_lookbehind() {
    assert!(exec("(?<!a)b", "", "ab", 1).is_none());
    assert_eq!(exec("(?<!c)b", "", "ab", 1).unwrap().end_index, 2);
}

#[test]
fn test_start_and_end_anchors() {
    assert_eq!(exec("^a", "", "a", 0).unwrap().end_index, 1);
    assert!(exec("^b", "", "ab", 1).is_none());
    assert_eq!(exec("a$", "", "ba", 1).unwrap().end_index, 2);
    assert!(exec("a$", "", "ab", 0).is_none());
}

#[test]
fn test_multiline_anchors() {
    assert_eq!(exec("^b", "m", "a\nb", 2).unwrap().end_index, 3);
    assert!(exec("^b", "", "a\nb", 2).is_none());
    assert_eq!(exec("a$", "m", "a\nb", 0).unwrap().end_index, 1);
    assert!(exec("a$", "", "a\nb", 0).is_none());
}

#[test]
fn test_dot() {
    assert_eq!(exec(".", "", "a", 0).unwrap().end_index, 1);
    assert!(exec(".", "", "\n", 0).is_none());
    assert_eq!(exec(".", "s", "\n", 0).unwrap().end_index, 1);
    assert!(exec(".", "", "", 0).is_none());
}

#[test]
fn test_word_boundary() {
    assert_eq!(exec(r"\bfoo\b", "", "foo bar", 0).unwrap().end_index, 3);
    assert!(exec(r"\bob\b", "", "foob", 2).is_none());
    assert_eq!(exec(r"\Boo", "", "foo", 1).unwrap().end_index, 3);
    assert!(exec(r"\Bfoo", "", "foo", 0).is_none());
}

#[test]
fn test_character_classes() {
    assert_eq!(exec("[a-c]", "", "b", 0).unwrap().end_index, 1);
    assert!(exec("[a-c]", "", "d", 0).is_none());
    assert_eq!(exec("[^a]", "", "b", 0).unwrap().end_index, 1);
    assert!(exec("[^a]", "", "a", 0).is_none());
    // `\b` inside a class is a backspace.
    assert_eq!(exec(r"[\b]", "", "\u{8}", 0).unwrap().end_index, 1);
    // Trailing `-` is a literal.
    assert_eq!(exec("[a-]", "", "-", 0).unwrap().end_index, 1);
    assert_eq!(exec(r"[\d]+", "", "42x", 0).unwrap().end_index, 2);
}

#[test]
fn test_class_escapes() {
    assert_eq!(exec(r"\d+", "", "123a", 0).unwrap().end_index, 3);
    assert_eq!(exec(r"\D", "", "x", 0).unwrap().end_index, 1);
    assert!(exec(r"\D", "", "4", 0).is_none());
    assert_eq!(exec(r"\s", "", " ", 0).unwrap().end_index, 1);
    assert_eq!(exec(r"\s", "", "\n", 0).unwrap().end_index, 1);
    assert_eq!(exec(r"\S\w+", "", "word!", 0).unwrap().end_index, 4);
    assert!(exec(r"\W", "", "_", 0).is_none());
}

#[test]
fn test_space_escape_is_the_exact_whitespace_set() {
    // NEL is neither WhiteSpace nor a LineTerminator.
    assert!(exec(r"\s", "", "\u{85}", 0).is_none());
    assert_eq!(exec(r"\S", "", "\u{85}", 0).unwrap().end_index, 1);
    // NBSP and ZWNBSP are WhiteSpace.
    assert_eq!(exec(r"\s", "", "\u{A0}", 0).unwrap().end_index, 1);
    assert_eq!(exec(r"\s", "", "\u{FEFF}", 0).unwrap().end_index, 1);
}

#[test]
fn test_ignore_case_legacy() {
    assert_eq!(exec("abc", "i", "ABC", 0).unwrap().end_index, 3);
    // U+017F uppercases to ASCII `S`, which must not bleed across the
    // ASCII boundary in legacy mode.
    assert!(exec("\u{17F}", "i", "S", 0).is_none());
    assert!(exec("S", "i", "\u{17F}", 0).is_none());
    // Non-ASCII folding still applies.
    assert_eq!(exec("\u{E9}", "i", "\u{C9}", 0).unwrap().end_index, 1);
}

#[test]
fn test_ignore_case_unicode() {
    // KELVIN SIGN case folds to `k` only under unicode rules.
    assert_eq!(exec("k", "ui", "\u{212A}", 0).unwrap().end_index, 1);
    assert!(exec("k", "i", "\u{212A}", 0).is_none());
}

#[test]
fn test_ignore_case_unicode_folds_beyond_lowercasing() {
    // LONG S and MICRO SIGN lowercase to themselves but case fold to `s`
    // and GREEK SMALL LETTER MU.
    assert_eq!(exec("\u{17F}", "ui", "S", 0).unwrap().end_index, 1);
    assert_eq!(exec("S", "ui", "\u{17F}", 0).unwrap().end_index, 1);
    assert_eq!(exec("\u{B5}", "ui", "\u{3BC}", 0).unwrap().end_index, 1);
    assert_eq!(exec("\u{3BC}", "ui", "\u{B5}", 0).unwrap().end_index, 1);
    // Legacy mode keeps the ASCII-bleed rule for the same characters.
    assert!(exec("\u{17F}", "i", "S", 0).is_none());
}

#[test]
fn test_word_boundary_unicode_ignore_case() {
    // Under `ui` the word set is widened through the fold: LONG S and
    // KELVIN SIGN fold into it, so neither makes a boundary next to `a`.
    assert_eq!(exec(r"a\B\u{17F}", "ui", "a\u{17F}", 0).unwrap().end_index, 2);
    assert_eq!(exec(r"\u{212A}\b", "ui", "\u{212A}", 0).unwrap().end_index, 1);
    assert!(exec(r"a\b\u{17F}", "ui", "a\u{17F}", 0).is_none());
    // Without ignore-case the same characters are non-word, flipping both.
    assert!(exec(r"\u{212A}\b", "u", "\u{212A}", 0).is_none());
    assert_eq!(exec(r"a\b\u{17F}", "u", "a\u{17F}", 0).unwrap().end_index, 2);
}

#[test]
fn test_indexing_granularity() {
    // Legacy mode iterates UTF-16 units: an astral character is two units.
    assert_eq!(exec("..", "", "\u{1F600}", 0).unwrap().end_index, 2);
    assert!(exec("..", "u", "\u{1F600}", 0).is_none());
    assert_eq!(exec(".", "u", "\u{1F600}", 0).unwrap().end_index, 1);
    // A surrogate pair spelled as two legacy escapes.
    assert_eq!(
        exec(r"😀", "", "\u{1F600}", 0).unwrap().end_index,
        2
    );
    assert_eq!(
        exec(r"\u{1F600}", "u", "\u{1F600}", 0).unwrap().end_index,
        1
    );
}

#[test]
fn test_named_groups() {
    let m = exec("(?<x>a)(?<y>b)", "n", "ab", 0).unwrap();
    assert_eq!(m.named_capture("x"), span(0, 1));
    assert_eq!(m.named_capture("y"), span(1, 2));
    assert_eq!(m.named_capture("z"), None);
    let m = exec(r"(?<x>a)\k<x>", "n", "aa", 0).unwrap();
    assert_eq!(m.end_index, 2);
}

#[test]
fn test_start_index_bounds() {
    assert_eq!(exec("", "", "abc", 3).unwrap().end_index, 3);
    assert!(exec("", "", "abc", 4).is_none());
}

#[test]
fn test_determinism_and_reuse() {
    let pattern = compile(r"(a+)(b*)", Flags::default()).unwrap();
    let first = pattern.execute("aabb", 0).unwrap();
    for _ in 0..3 {
        let again = pattern.execute("aabb", 0).unwrap();
        assert_eq!(again.end_index, first.end_index);
        assert_eq!(again.captures(), first.captures());
    }
    // Compiling the same source twice behaves identically.
    let other = compile(r"(a+)(b*)", Flags::default()).unwrap();
    let again = other.execute("aabb", 0).unwrap();
    assert_eq!(again.end_index, first.end_index);
    assert_eq!(again.captures(), first.captures());
}

#[test]
fn test_backtracking_into_quantifier() {
    // The quantifier has to give back one `a` for the trailing literal.
    let m = exec("a*ab", "", "aaab", 0).unwrap();
    assert_eq!(m.end_index, 4);
    let m = exec("(a+)(a+)", "", "aaa", 0).unwrap();
    assert_eq!(m.capture(1), span(0, 2));
    assert_eq!(m.capture(2), span(2, 3));
}

struct DigitsOnly;

impl PropertyDatabase for DigitsOnly {
    fn is_lone_property(&self, name_or_value: &str) -> bool {
        name_or_value == "Digit"
    }

    fn is_property_with_value(&self, _name: &str, _value: &str) -> bool {
        false
    }

    fn code_points(&self, _name: &str, _value: Option<&str>) -> CharSet {
        CharSet::from_iter('0' as u32..='9' as u32)
    }
}

#[test]
fn test_property_escapes_with_injected_database() {
    let flags = Flags::from_str("u").unwrap();
    let pattern = compile_with(r"\p{Digit}+", flags, &DigitsOnly).unwrap();
    assert_eq!(pattern.execute("123a", 0).unwrap().end_index, 3);

    let negated = compile_with(r"\P{Digit}", flags, &DigitsOnly).unwrap();
    assert_eq!(negated.execute("x", 0).unwrap().end_index, 1);
    assert!(negated.execute("7", 0).is_none());

    assert!(compile_with(r"\p{Nope}", flags, &DigitsOnly).is_err());
}

#[test]
fn test_default_property_database() {
    assert_eq!(exec(r"\p{Lu}", "u", "A", 0).unwrap().end_index, 1);
    assert!(exec(r"\p{Lu}", "u", "a", 0).is_none());
    assert_eq!(exec(r"\p{Alphabetic}+", "u", "héllo!", 0).unwrap().end_index, 5);
}
