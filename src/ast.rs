//! The validated pattern AST produced by the parser.
//!
//! Each node kind carries only the fields relevant to it, so the matcher
//! compiler can match exhaustively. Characters are stored as `u32` values:
//! in legacy mode a pattern may name a lone surrogate (`\uD800`), which is
//! not representable as a `char`.

use std::collections::HashMap;

/// A fully parsed pattern: the root disjunction plus the group table.
///
/// `group_names` maps a declared group name to its 1-based capture index.
/// Both tables are fixed once parsing completes.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedPattern {
    pub disjunction: Disjunction,
    /// Total number of capturing groups.
    pub group_count: usize,
    pub group_names: HashMap<String, usize>,
}

/// Ordered alternation: alternatives are tried left to right.
#[derive(Clone, Debug, PartialEq)]
pub struct Disjunction {
    pub alternatives: Vec<Alternative>,
}

/// A (possibly empty) sequence of terms.
#[derive(Clone, Debug, PartialEq)]
pub struct Alternative {
    pub terms: Vec<Term>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    Assertion(Assertion),
    Atom {
        atom: Atom,
        quantifier: Option<Quantifier>,
        /// Capturing groups opened strictly to the left of this term.
        parens_before: usize,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Assertion {
    /// `^`
    Start,
    /// `$`
    End,
    /// `\b`
    WordBoundary,
    /// `\B`
    NotWordBoundary,
    /// `(?=...)` / `(?!...)`
    Lookahead {
        negated: bool,
        disjunction: Disjunction,
    },
    /// `(?<=...)` / `(?<!...)`
    Lookbehind {
        negated: bool,
        disjunction: Disjunction,
    },
}

/// Repetition bounds. `max == None` means unbounded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quantifier {
    pub min: usize,
    pub max: Option<usize>,
    pub greedy: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Atom {
    /// A literal character (escapes already resolved to their value).
    Character(u32),
    /// `.`
    Dot,
    /// `[...]`
    Class(CharacterClass),
    /// `(...)` or `(?:...)` or `(?<name>...)`
    Group(Group),
    /// `\d \D \s \S \w \W`
    ClassEscape(ClassEscapeKind),
    /// `\p{...}` / `\P{...}`
    Property(PropertyEscape),
    /// `\1`, `\2`, ...
    Backreference { index: usize },
    /// `\k<name>`
    NamedBackreference { name: String },
}

impl Atom {
    /// Capturing groups contained in this atom, counting the atom's own
    /// group when it is capturing. This is the slot count a quantifier must
    /// reset between iterations.
    pub fn enclosed_parens(&self) -> usize {
        match self {
            Atom::Group(group) => group.enclosed_parens,
            _ => 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    /// 1-based capture index; `None` for `(?:...)`.
    pub index: Option<usize>,
    pub name: Option<String>,
    pub disjunction: Disjunction,
    /// Capturing groups opened strictly to the left of the `(`.
    pub parens_before: usize,
    /// Capturing groups inside this atom, including itself when capturing.
    pub enclosed_parens: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassEscapeKind {
    Digit,
    NotDigit,
    Space,
    NotSpace,
    Word,
    NotWord,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyEscape {
    /// True for `\P{...}`.
    pub negated: bool,
    pub name: String,
    pub value: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CharacterClass {
    pub negated: bool,
    pub members: Vec<ClassMember>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ClassMember {
    Single(u32),
    /// `a-z`; endpoints are raw (uncanonicalized) values, validated
    /// non-decreasing by the parser.
    Range(u32, u32),
    ClassEscape(ClassEscapeKind),
    Property(PropertyEscape),
}
