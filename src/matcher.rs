//! Matcher compilation and execution.
//!
//! `compile_*` walks the AST once, bottom-up, and builds a tree of
//! [`Matcher`] nodes closed over their static parameters (bounds, direction,
//! character sets). Execution is continuation-passing: a matcher receives
//! the current state and a continuation representing the rest of the match,
//! and backtracking falls out of trying the next choice whenever a
//! continuation returns `None`. Failure is an ordinary value here, never an
//! error.

use std::collections::HashMap;
use std::sync::Arc;

use crate::ast::{
    Alternative, Assertion, Atom, CharacterClass, ClassEscapeKind, ClassMember, Disjunction,
    ParsedPattern, PropertyEscape, Term,
};
use crate::canonical::canonicalize;
use crate::charset::CharSet;
use crate::flags::Flags;
use crate::unicode::{is_line_terminator, is_white_space, PropertyDatabase};

/// A half-open span of unit indices into the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// The (position, captures) pair threaded through matching. States are
/// cloned, never mutated in place, so an abandoned branch can never observe
/// another branch's writes.
#[derive(Clone, Debug)]
struct MatchState {
    end_index: usize,
    /// Slot 0 is reserved; groups occupy 1..=N.
    captures: Vec<Option<Span>>,
}

/// "The rest of the match": invoked with the state a sub-matcher produced.
/// `None` is the distinguished failure value.
type Continuation<'a> = dyn Fn(MatchState) -> Option<MatchState> + 'a;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// One compiled matcher per AST node kind. The same node kinds serve both
/// scan directions; lookbehind simply compiles its body with
/// `Direction::Backward`.
#[derive(Debug)]
enum Matcher {
    /// Matches the empty sequence.
    Empty,
    /// Ordered alternation: first success wins.
    Alternation(Vec<Matcher>),
    /// Continuation-chained sequence; under `Backward` the chain runs right
    /// to left.
    Sequence(Vec<Matcher>, Direction),
    Repeat {
        body: Box<Matcher>,
        min: usize,
        max: Option<usize>,
        greedy: bool,
        paren_index: usize,
        paren_count: usize,
    },
    StartOfInput,
    EndOfInput,
    WordBoundary {
        negated: bool,
        word_chars: CharSet,
    },
    Lookaround {
        body: Box<Matcher>,
        negated: bool,
    },
    CharacterSet {
        set: CharSet,
        invert: bool,
        direction: Direction,
    },
    Group {
        body: Box<Matcher>,
        index: usize,
        direction: Direction,
    },
    Backreference {
        index: usize,
        direction: Direction,
    },
}

/// Per-execution context: the input as a unit vector plus the mode flags.
struct ExecContext {
    units: Vec<u32>,
    flags: Flags,
}

impl ExecContext {
    fn canonicalize(&self, ch: u32) -> u32 {
        canonicalize(ch, self.flags.ignore_case, self.flags.unicode)
    }
}

impl Matcher {
    fn run(&self, ctx: &ExecContext, x: MatchState, c: &Continuation<'_>) -> Option<MatchState> {
        match self {
            Matcher::Empty => c(x),
            Matcher::Alternation(branches) => {
                for branch in branches {
                    if let Some(r) = branch.run(ctx, x.clone(), c) {
                        return Some(r);
                    }
                }
                None
            }
            Matcher::Sequence(items, direction) => run_sequence(ctx, items, *direction, x, c),
            Matcher::Repeat {
                body,
                min,
                max,
                greedy,
                paren_index,
                paren_count,
            } => repeat(ctx, body, *min, *max, *greedy, x, c, *paren_index, *paren_count),
            Matcher::StartOfInput => {
                let e = x.end_index;
                if e == 0 || (ctx.flags.multiline && is_line_terminator(ctx.units[e - 1])) {
                    c(x)
                } else {
                    None
                }
            }
            Matcher::EndOfInput => {
                let e = x.end_index;
                if e == ctx.units.len()
                    || (ctx.flags.multiline && is_line_terminator(ctx.units[e]))
                {
                    c(x)
                } else {
                    None
                }
            }
            Matcher::WordBoundary {
                negated,
                word_chars,
            } => {
                let e = x.end_index;
                let before = e
                    .checked_sub(1)
                    .is_some_and(|i| word_chars.contains(ctx.units[i]));
                let after = e < ctx.units.len() && word_chars.contains(ctx.units[e]);
                if (before != after) != *negated {
                    c(x)
                } else {
                    None
                }
            }
            Matcher::Lookaround { body, negated } => {
                // Zero width: position is restored regardless of what the
                // body consumed; captures survive only a positive match.
                let r = body.run(ctx, x.clone(), &|y| Some(y));
                match (r, negated) {
                    (Some(y), false) => c(MatchState {
                        end_index: x.end_index,
                        captures: y.captures,
                    }),
                    (None, false) => None,
                    (Some(_), true) => None,
                    (None, true) => c(x),
                }
            }
            Matcher::CharacterSet {
                set,
                invert,
                direction,
            } => {
                let e = x.end_index;
                let f = match direction {
                    Direction::Forward => {
                        if e >= ctx.units.len() {
                            return None;
                        }
                        e + 1
                    }
                    Direction::Backward => {
                        if e == 0 {
                            return None;
                        }
                        e - 1
                    }
                };
                let ch = ctx.units[e.min(f)];
                let cc = ctx.canonicalize(ch);
                if set.contains(cc) == *invert {
                    return None;
                }
                c(MatchState {
                    end_index: f,
                    captures: x.captures,
                })
            }
            Matcher::Group {
                body,
                index,
                direction,
            } => {
                let xe = x.end_index;
                body.run(ctx, x, &|y: MatchState| {
                    let span = match direction {
                        Direction::Forward => Span::new(xe, y.end_index),
                        Direction::Backward => Span::new(y.end_index, xe),
                    };
                    let mut captures = y.captures;
                    captures[*index] = Some(span);
                    c(MatchState {
                        end_index: y.end_index,
                        captures,
                    })
                })
            }
            Matcher::Backreference { index, direction } => {
                let Some(span) = x.captures[*index] else {
                    // An unset group matches the empty string.
                    return c(x);
                };
                let e = x.end_index;
                let len = span.len();
                let g = match direction {
                    Direction::Forward => {
                        if e + len > ctx.units.len() {
                            return None;
                        }
                        e
                    }
                    Direction::Backward => {
                        if len > e {
                            return None;
                        }
                        e - len
                    }
                };
                for i in 0..len {
                    let expected = ctx.canonicalize(ctx.units[span.start + i]);
                    let found = ctx.canonicalize(ctx.units[g + i]);
                    if expected != found {
                        return None;
                    }
                }
                let f = match direction {
                    Direction::Forward => e + len,
                    Direction::Backward => e - len,
                };
                c(MatchState {
                    end_index: f,
                    captures: x.captures,
                })
            }
        }
    }
}

fn run_sequence(
    ctx: &ExecContext,
    items: &[Matcher],
    direction: Direction,
    x: MatchState,
    c: &Continuation<'_>,
) -> Option<MatchState> {
    match direction {
        Direction::Forward => {
            let Some((first, rest)) = items.split_first() else {
                return c(x);
            };
            first.run(ctx, x, &|y| run_sequence(ctx, rest, direction, y, c))
        }
        Direction::Backward => {
            let Some((last, rest)) = items.split_last() else {
                return c(x);
            };
            last.run(ctx, x, &|y| run_sequence(ctx, rest, direction, y, c))
        }
    }
}

/// The repetition algorithm.
///
/// Capture slots `paren_index+1 ..= paren_index+paren_count` are reset in a
/// copy of the captures before every body attempt, so an iteration that does
/// not reach a nested group cannot leak the previous iteration's span. The
/// wrapped continuation refuses to recurse when an optional iteration
/// consumed nothing, which is what terminates patterns like `(a*)*`.
#[allow(clippy::too_many_arguments)]
fn repeat(
    ctx: &ExecContext,
    body: &Matcher,
    min: usize,
    max: Option<usize>,
    greedy: bool,
    x: MatchState,
    c: &Continuation<'_>,
    paren_index: usize,
    paren_count: usize,
) -> Option<MatchState> {
    if max == Some(0) {
        return c(x);
    }
    let xe = x.end_index;
    let d = |y: MatchState| {
        if min == 0 && y.end_index == xe {
            return None;
        }
        let min2 = min.saturating_sub(1);
        let max2 = max.map(|m| m - 1);
        repeat(ctx, body, min2, max2, greedy, y, c, paren_index, paren_count)
    };
    let mut captures = x.captures.clone();
    for slot in &mut captures[paren_index + 1..=paren_index + paren_count] {
        *slot = None;
    }
    let xr = MatchState {
        end_index: xe,
        captures,
    };
    if min != 0 {
        return body.run(ctx, xr, &d);
    }
    if !greedy {
        if let Some(z) = c(x.clone()) {
            return Some(z);
        }
        return body.run(ctx, xr, &d);
    }
    if let Some(z) = body.run(ctx, xr, &d) {
        return Some(z);
    }
    c(x)
}

/// Static context for matcher construction.
struct CompileContext<'a> {
    flags: Flags,
    properties: &'a dyn PropertyDatabase,
    group_names: &'a HashMap<String, usize>,
}

impl CompileContext<'_> {
    fn canonicalize(&self, ch: u32) -> u32 {
        canonicalize(ch, self.flags.ignore_case, self.flags.unicode)
    }
}

fn compile_disjunction(
    node: &Disjunction,
    direction: Direction,
    ctx: &CompileContext<'_>,
) -> Matcher {
    let mut branches: Vec<Matcher> = node
        .alternatives
        .iter()
        .map(|alt| compile_alternative(alt, direction, ctx))
        .collect();
    if branches.len() == 1 {
        branches.pop().expect("single branch")
    } else {
        Matcher::Alternation(branches)
    }
}

fn compile_alternative(
    node: &Alternative,
    direction: Direction,
    ctx: &CompileContext<'_>,
) -> Matcher {
    let mut items: Vec<Matcher> = node
        .terms
        .iter()
        .map(|term| compile_term(term, direction, ctx))
        .collect();
    match items.len() {
        0 => Matcher::Empty,
        1 => items.pop().expect("single item"),
        _ => Matcher::Sequence(items, direction),
    }
}

fn compile_term(node: &Term, direction: Direction, ctx: &CompileContext<'_>) -> Matcher {
    match node {
        Term::Assertion(assertion) => compile_assertion(assertion, ctx),
        Term::Atom {
            atom,
            quantifier,
            parens_before,
        } => {
            let m = compile_atom(atom, direction, ctx);
            match quantifier {
                None => m,
                Some(q) => Matcher::Repeat {
                    body: Box::new(m),
                    min: q.min,
                    max: q.max,
                    greedy: q.greedy,
                    paren_index: *parens_before,
                    paren_count: atom.enclosed_parens(),
                },
            }
        }
    }
}

fn compile_assertion(node: &Assertion, ctx: &CompileContext<'_>) -> Matcher {
    match node {
        Assertion::Start => Matcher::StartOfInput,
        Assertion::End => Matcher::EndOfInput,
        Assertion::WordBoundary => Matcher::WordBoundary {
            negated: false,
            word_chars: word_characters(ctx.flags),
        },
        Assertion::NotWordBoundary => Matcher::WordBoundary {
            negated: true,
            word_chars: word_characters(ctx.flags),
        },
        Assertion::Lookahead {
            negated,
            disjunction,
        } => Matcher::Lookaround {
            body: Box::new(compile_disjunction(disjunction, Direction::Forward, ctx)),
            negated: *negated,
        },
        Assertion::Lookbehind {
            negated,
            disjunction,
        } => Matcher::Lookaround {
            body: Box::new(compile_disjunction(disjunction, Direction::Backward, ctx)),
            negated: *negated,
        },
    }
}

fn compile_atom(node: &Atom, direction: Direction, ctx: &CompileContext<'_>) -> Matcher {
    match node {
        Atom::Character(ch) => character_matcher(*ch, direction, ctx),
        Atom::Dot => {
            let set = if ctx.flags.dot_all {
                CharSet::predicate(|_| true)
            } else {
                CharSet::predicate(|c| !is_line_terminator(c))
            };
            Matcher::CharacterSet {
                set,
                invert: false,
                direction,
            }
        }
        Atom::Class(class) => {
            let set = compile_class(class, ctx);
            Matcher::CharacterSet {
                set,
                invert: class.negated,
                direction,
            }
        }
        Atom::ClassEscape(kind) => Matcher::CharacterSet {
            set: class_escape_set(*kind, ctx.flags),
            invert: false,
            direction,
        },
        Atom::Property(property) => Matcher::CharacterSet {
            set: property_set(property, ctx.properties),
            invert: false,
            direction,
        },
        Atom::Group(group) => {
            let body = compile_disjunction(&group.disjunction, direction, ctx);
            match group.index {
                Some(index) => Matcher::Group {
                    body: Box::new(body),
                    index,
                    direction,
                },
                None => body,
            }
        }
        Atom::Backreference { index } => Matcher::Backreference {
            index: *index,
            direction,
        },
        Atom::NamedBackreference { name } => Matcher::Backreference {
            // Resolution was checked by the parser's post-pass.
            index: ctx.group_names[name],
            direction,
        },
    }
}

/// A literal character. In per-unit mode a supplementary character occupies
/// two input units, so it compiles to its surrogate pair.
fn character_matcher(ch: u32, direction: Direction, ctx: &CompileContext<'_>) -> Matcher {
    if !ctx.flags.unicode && ch > 0xFFFF {
        let lead = 0xD800 + ((ch - 0x10000) >> 10);
        let trail = 0xDC00 + ((ch - 0x10000) & 0x3FF);
        let units = [lead, trail]
            .map(|unit| Matcher::CharacterSet {
                set: CharSet::single(unit),
                invert: false,
                direction,
            })
            .into();
        return Matcher::Sequence(units, direction);
    }
    Matcher::CharacterSet {
        set: CharSet::single(ctx.canonicalize(ch)),
        invert: false,
        direction,
    }
}

fn compile_class(class: &CharacterClass, ctx: &CompileContext<'_>) -> CharSet {
    let mut set = CharSet::empty();
    for member in &class.members {
        let member_set = match member {
            ClassMember::Single(ch) => CharSet::single(ctx.canonicalize(*ch)),
            ClassMember::Range(start, end) => {
                character_range(&CharSet::single(*start), &CharSet::single(*end), ctx)
            }
            ClassMember::ClassEscape(kind) => class_escape_set(*kind, ctx.flags),
            ClassMember::Property(property) => property_set(property, ctx.properties),
        };
        set = set.union(member_set);
    }
    set
}

/// Builds the set for a class range from two singleton endpoint sets.
///
/// Non-singleton endpoints cannot come out of a successful parse; reaching
/// this with one is a programming error, hence the asserts.
fn character_range(a: &CharSet, b: &CharSet, ctx: &CompileContext<'_>) -> CharSet {
    assert!(a.len() == 1 && b.len() == 1, "range endpoints must be singletons");
    let i = a.first();
    let j = b.first();
    assert!(i <= j, "range endpoints out of order");
    CharSet::from_iter((i..=j).map(|ch| ctx.canonicalize(ch)))
}

fn class_escape_set(kind: ClassEscapeKind, flags: Flags) -> CharSet {
    match kind {
        ClassEscapeKind::Digit => CharSet::from_iter('0' as u32..='9' as u32),
        ClassEscapeKind::NotDigit => {
            CharSet::predicate(|c| !('0' as u32..='9' as u32).contains(&c))
        }
        ClassEscapeKind::Space => {
            CharSet::predicate(|c| is_white_space(c) || is_line_terminator(c))
        }
        ClassEscapeKind::NotSpace => {
            CharSet::predicate(|c| !is_white_space(c) && !is_line_terminator(c))
        }
        ClassEscapeKind::Word => word_characters(flags),
        ClassEscapeKind::NotWord => word_characters(flags).complement(),
    }
}

fn property_set(property: &PropertyEscape, properties: &dyn PropertyDatabase) -> CharSet {
    let set = properties.code_points(&property.name, property.value.as_deref());
    if property.negated {
        set.complement()
    } else {
        set
    }
}

/// The 63-character word set, widened through canonicalization when unicode
/// and ignore-case are both active (so e.g. `\b` sees U+017F as a word
/// character because it folds into the set).
fn word_characters(flags: Flags) -> CharSet {
    let ascii_word = CharSet::from_iter(
        ('a' as u32..='z' as u32)
            .chain('A' as u32..='Z' as u32)
            .chain('0' as u32..='9' as u32)
            .chain(std::iter::once('_' as u32)),
    );
    if flags.unicode && flags.ignore_case {
        return CharSet::predicate(move |c| {
            ascii_word.contains(c) || ascii_word.contains(canonicalize(c, true, true))
        });
    }
    ascii_word
}

/// A pattern compiled down to an executable matcher tree.
///
/// Immutable and reusable: `execute` builds a fresh state per call, so a
/// compiled pattern can be shared across threads.
#[derive(Debug)]
pub struct CompiledPattern {
    source: String,
    flags: Flags,
    matcher: Matcher,
    group_count: usize,
    group_names: Arc<HashMap<String, usize>>,
}

/// A successful match: the end position plus the capture spans.
#[derive(Clone, Debug)]
pub struct Match {
    /// Unit index one past the last consumed unit.
    pub end_index: usize,
    captures: Vec<Option<Span>>,
    group_names: Arc<HashMap<String, usize>>,
}

impl Match {
    /// All capture slots; slot 0 is reserved and always unset.
    pub fn captures(&self) -> &[Option<Span>] {
        &self.captures
    }

    /// The span of capturing group `index` (1-based), if it participated.
    pub fn capture(&self, index: usize) -> Option<Span> {
        self.captures.get(index).copied().flatten()
    }

    /// The span of the named group, if it participated.
    pub fn named_capture(&self, name: &str) -> Option<Span> {
        self.capture(*self.group_names.get(name)?)
    }

    pub fn group_names(&self) -> &HashMap<String, usize> {
        &self.group_names
    }
}

/// Builds the executable form of a parsed pattern. Infallible: every AST a
/// successful parse can produce is compilable.
pub(crate) fn build(
    source: &str,
    pattern: &ParsedPattern,
    flags: Flags,
    properties: &dyn PropertyDatabase,
) -> CompiledPattern {
    let ctx = CompileContext {
        flags,
        properties,
        group_names: &pattern.group_names,
    };
    let matcher = compile_disjunction(&pattern.disjunction, Direction::Forward, &ctx);
    log::debug!(
        "compiled pattern {:?} with {} capturing group(s)",
        source,
        pattern.group_count
    );
    CompiledPattern {
        source: source.to_owned(),
        flags,
        matcher,
        group_count: pattern.group_count,
        group_names: Arc::new(pattern.group_names.clone()),
    }
}

impl CompiledPattern {
    /// Runs the matcher against `input` starting at unit index
    /// `start_index`. Returns `None` both for a failed match and for a
    /// start index past the end of the input.
    ///
    /// Indices are code-point indices in unicode mode and UTF-16 code-unit
    /// indices otherwise; the same granularity applies to every span in the
    /// result.
    pub fn execute(&self, input: &str, start_index: usize) -> Option<Match> {
        let units: Vec<u32> = if self.flags.unicode {
            input.chars().map(|c| c as u32).collect()
        } else {
            input.encode_utf16().map(u32::from).collect()
        };
        if start_index > units.len() {
            return None;
        }
        log::trace!(
            "executing {:?} against {} unit(s) at index {}",
            self.source,
            units.len(),
            start_index
        );
        let ctx = ExecContext {
            units,
            flags: self.flags,
        };
        let state = MatchState {
            end_index: start_index,
            captures: vec![None; self.group_count + 1],
        };
        let result = self.matcher.run(&ctx, state, &|y| Some(y))?;
        Some(Match {
            end_index: result.end_index,
            captures: result.captures,
            group_names: Arc::clone(&self.group_names),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// Number of capturing groups.
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    pub fn group_names(&self) -> &HashMap<String, usize> {
        &self.group_names
    }
}
