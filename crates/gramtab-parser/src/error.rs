//! Parse error type for the gramtab front-end.

use std::fmt;

use gramtab_common::error::LexError;
use gramtab_common::span::Span;

/// A parse error with location information and a diagnostic echo.
///
/// Parsing halts at the first fault (there is no recovery), so a single
/// `ParseError` describes the whole failure. Besides the byte span it
/// carries the reader's line/column counters and the last ≤64 bytes of
/// consumed source for contexts where no source text is at hand.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Human-readable description of what went wrong.
    pub message: String,
    /// Byte span where the error was detected (may be empty, at EOF).
    pub span: Span,
    /// 1-based line of the error position.
    pub line: u32,
    /// 1-based column of the error position (approximate for lexical
    /// errors, which report the position after the failed read).
    pub col: u32,
    /// The most recently consumed source bytes, newest last.
    pub echo: String,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(
        message: impl Into<String>,
        span: Span,
        line: u32,
        col: u32,
        echo: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            span,
            line,
            col,
            echo: echo.into(),
        }
    }

    /// Wrap a lexical error, attaching the reader's location and echo.
    pub fn from_lex(err: LexError, line: u32, col: u32, echo: impl Into<String>) -> Self {
        Self {
            message: err.to_string(),
            span: err.span,
            line,
            col,
            echo: echo.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.col, self.message)
    }
}

impl std::error::Error for ParseError {}
