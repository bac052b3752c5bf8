use thiserror::Error;

/// Error produced when a pattern fails to parse.
///
/// `offset` is the character offset into the pattern source at which the
/// problem was detected. Parsing never returns a partial AST: the first
/// error aborts compilation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (at offset {offset})")]
pub struct PatternSyntaxError {
    pub offset: usize,
    pub message: String,
}

impl PatternSyntaxError {
    pub fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}
