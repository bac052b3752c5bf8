//! Character classification shared by the parser and the matcher, plus the
//! Unicode property database interface used by `\p{...}` / `\P{...}`.

use crate::charset::CharSet;

/// ECMAScript LineTerminator: LF, CR, LINE SEPARATOR, PARAGRAPH SEPARATOR.
pub fn is_line_terminator(ch: u32) -> bool {
    matches!(ch, 0x000A | 0x000D | 0x2028 | 0x2029)
}

/// ECMAScript WhiteSpace (without line terminators): TAB, VT, FF, SP,
/// NBSP, ZWNBSP and the Space_Separator category. U+0085 NEL is neither
/// WhiteSpace nor a LineTerminator.
pub fn is_white_space(ch: u32) -> bool {
    matches!(
        ch,
        0x0009
            | 0x000B
            | 0x000C
            | 0x0020
            | 0x00A0
            | 0x1680
            | 0x2000..=0x200A
            | 0x202F
            | 0x205F
            | 0x3000
            | 0xFEFF
    )
}

pub fn is_decimal_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

pub fn is_hex_digit(ch: char) -> bool {
    ch.is_ascii_hexdigit()
}

pub fn is_control_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

/// Characters that carry syntactic meaning in a pattern.
pub fn is_syntax_character(ch: char) -> bool {
    matches!(
        ch,
        '^' | '$' | '\\' | '.' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|'
    )
}

/// Characters that terminate an Alternative.
pub fn is_closing_syntax_character(ch: char) -> bool {
    matches!(ch, ')' | ']' | '}' | '|')
}

/// Identifier-start approximation for group names: alphabetic, `_` or `$`.
pub fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

/// Identifier-continuation approximation: alphanumeric, `_`, `$`, ZWNJ, ZWJ.
pub fn is_identifier_part(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$' || ch == '\u{200C}' || ch == '\u{200D}'
}

/// UnicodeIDContinue approximation, used for legacy identity-escape
/// legality. Unlike [`is_identifier_part`] this excludes `$`, which is an
/// identifier character but not ID_Continue, so `\$` stays legal.
pub fn is_identifier_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

pub fn is_leading_surrogate(unit: u32) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

pub fn is_trailing_surrogate(unit: u32) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

/// Combines a surrogate pair into the code point it encodes.
pub fn surrogate_pair_to_code_point(lead: u32, trail: u32) -> u32 {
    (lead - 0xD800) * 0x400 + (trail - 0xDC00) + 0x10000
}

/// The Unicode property lookup collaborator behind `\p{...}` / `\P{...}`.
///
/// The parser consults the validation methods while parsing a property
/// escape; the matcher compiler asks for the actual set of code points.
/// Implementations are free to back this with a full character database;
/// the engine itself treats it as opaque.
pub trait PropertyDatabase: Sync {
    /// Is `name_or_value` a known binary property name, or a known
    /// General_Category value used on its own (`\p{Lu}`)?
    fn is_lone_property(&self, name_or_value: &str) -> bool;

    /// Is `name=value` a known non-binary property/value pair?
    fn is_property_with_value(&self, name: &str, value: &str) -> bool;

    /// The set of code points carrying the property. Only called for
    /// name/value pairs that passed validation.
    fn code_points(&self, name: &str, value: Option<&str>) -> CharSet;
}

/// A deliberately small property database backed by `char` classification.
///
/// Covers a few common binary properties and General_Category values;
/// everything else is rejected, which surfaces as a parse error on the
/// property escape.
#[derive(Debug, Default)]
pub struct DefaultProperties;

const BINARY_PROPERTIES: &[&str] = &[
    "Any",
    "ASCII",
    "Alphabetic",
    "Alpha",
    "Lowercase",
    "Uppercase",
    "White_Space",
];

const GENERAL_CATEGORY_VALUES: &[&str] = &["Ll", "Lu", "Nd"];

impl PropertyDatabase for DefaultProperties {
    fn is_lone_property(&self, name_or_value: &str) -> bool {
        BINARY_PROPERTIES.contains(&name_or_value)
            || GENERAL_CATEGORY_VALUES.contains(&name_or_value)
    }

    fn is_property_with_value(&self, name: &str, value: &str) -> bool {
        matches!(name, "General_Category" | "gc") && GENERAL_CATEGORY_VALUES.contains(&value)
    }

    fn code_points(&self, name: &str, value: Option<&str>) -> CharSet {
        let key = value.unwrap_or(name);
        match key {
            "Any" => CharSet::predicate(|_| true),
            "ASCII" => CharSet::predicate(|c| c < 0x80),
            "Alphabetic" | "Alpha" => {
                CharSet::predicate(|c| char::from_u32(c).is_some_and(char::is_alphabetic))
            }
            "Lowercase" | "Ll" => {
                CharSet::predicate(|c| char::from_u32(c).is_some_and(char::is_lowercase))
            }
            "Uppercase" | "Lu" => {
                CharSet::predicate(|c| char::from_u32(c).is_some_and(char::is_uppercase))
            }
            // The Unicode property, unlike the WhiteSpace production,
            // includes NEL.
            "White_Space" => CharSet::predicate(|c| {
                is_white_space(c) || is_line_terminator(c) || c == 0x0085
            }),
            "Nd" => CharSet::predicate(|c| {
                char::from_u32(c).is_some_and(|c| c.to_digit(10).is_some())
            }),
            _ => CharSet::empty(),
        }
    }
}
