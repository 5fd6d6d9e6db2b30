//! Core error type shared across the workspace.

use thiserror::Error;

/// Failure raised by the scanner, expression evaluator, or preprocessor.
///
/// Variants group failures by kind rather than by site: a `Syntax` error
/// comes from the character level (unknown character, unclosed string), a
/// `Grammar` error from the token level (unexpected token, mismatched
/// parentheses), a `Semantic` error from meaning (undefined constant,
/// self-referential macro, division by zero), and a `State` error from
/// misuse of the driving objects themselves (a second script loaded,
/// a misplaced `#endif`).
#[derive(Debug, Error)]
pub enum Error {
    /// Character-level failure while scanning.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// Token-level failure: the right characters in the wrong order.
    #[error("grammar error: {0}")]
    Grammar(String),

    /// The input parses but cannot mean anything.
    #[error("semantic error: {0}")]
    Semantic(String),

    /// Failure opening or reading a source file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The scanner or preprocessor was driven into an invalid state.
    #[error("state error: {0}")]
    State(String),
}

/// Result type alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind() {
        let err = Error::Syntax("unknown character '@'".into());
        assert_eq!(err.to_string(), "syntax error: unknown character '@'");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
