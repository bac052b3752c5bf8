//! A backtracking regular expression engine implementing ECMAScript pattern
//! semantics: compile a pattern plus mode flags into a reusable matcher,
//! then execute it against input text from a given start position.
//!
//! ```
//! use ecma_regex::{compile, Flags};
//!
//! let pattern = compile(r"(\d+)-(\d+)", Flags::default()).unwrap();
//! let m = pattern.execute("12-34", 0).unwrap();
//! assert_eq!(m.end_index, 5);
//! ```

mod ast;
mod canonical;
mod charset;
mod error;
mod flags;
mod matcher;
mod parser;
mod unicode;

pub use charset::CharSet;
pub use error::PatternSyntaxError;
pub use flags::Flags;
pub use matcher::{CompiledPattern, Match, Span};
pub use unicode::{DefaultProperties, PropertyDatabase};

/// Compiles `source` under `flags` using the built-in (minimal) Unicode
/// property database.
pub fn compile(source: &str, flags: Flags) -> Result<CompiledPattern, PatternSyntaxError> {
    compile_with(source, flags, &DefaultProperties)
}

/// Compiles `source` under `flags`, resolving `\p{...}` escapes through
/// `properties`.
///
/// Compilation is a pure function of its arguments; the returned pattern is
/// immutable and may be executed any number of times, from any thread.
pub fn compile_with(
    source: &str,
    flags: Flags,
    properties: &dyn PropertyDatabase,
) -> Result<CompiledPattern, PatternSyntaxError> {
    log::debug!("compiling pattern {source:?} with {flags:?}");
    let parsed = parser::parse(source, flags, properties)?;
    Ok(matcher::build(source, &parsed, flags, properties))
}

#[cfg(test)]
mod tests {
    mod canonical_tests;
    mod charset_tests;
    mod matcher_tests;
    mod parser_tests;
}
