//! Error types for recoverable weft operations.
//!
//! Per the error-handling model: layout invariant violations, missing
//! required build-scope state, and core render panics are not
//! represented here — those fail loudly via `panic!` at the point of
//! violation, naming the offending node id or path. This type covers
//! operations with a genuine recoverable failure mode (I/O, parsing).

use std::io;

/// Error type for weft operations.
#[derive(Debug, thiserror::Error)]
pub enum WeftError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Terminal operation failed.
    #[error("terminal error: {0}")]
    Terminal(String),

    /// Layout calculation failed.
    #[error("layout error: {0}")]
    Layout(String),

    /// Style or color parsing error.
    #[error("style error: {0}")]
    Style(String),

    /// Markup parsing error.
    #[error("markup error: {0}")]
    Markup(String),

    /// Rendering failed.
    #[error("render error: {0}")]
    Render(String),

    /// Widget error.
    #[error("widget error: {0}")]
    Widget(String),

    /// Unicode handling error.
    #[error("unicode error: {0}")]
    Unicode(String),

    /// Reactive system error.
    #[error("reactive error: {0}")]
    Reactive(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for weft operations.
pub type Result<T> = std::result::Result<T, WeftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = WeftError::Terminal("no tty".into());
        assert_eq!(err.to_string(), "terminal error: no tty");
    }

    #[test]
    fn io_error_converts() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: WeftError = io_err.into();
        assert!(matches!(err, WeftError::Io(_)));
    }
}
