use std::fmt;

use serde::Serialize;

use crate::span::Span;

/// A lexical error with location information.
///
/// Raised by the low-level recognizers (string literals, hex literals,
/// regex bodies). The parser wraps these into its own error type; lexing
/// aborts at the first fault, so a single error is all that ever exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    /// Create a new lexical error.
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The specific kind of lexical error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LexErrorKind {
    /// An unexpected character was encountered.
    UnexpectedCharacter(char),
    /// Input ended in the middle of a construct (literal or regex body).
    UnexpectedEof,
    /// A string literal closed immediately after it opened.
    EmptyStringLiteral,
    /// A string literal was not closed before end of input.
    UnterminatedString,
    /// A `$` hex literal with no hex digits after it.
    EmptyHexLiteral,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedCharacter(c) => write!(f, "unexpected character: {c:?}"),
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::EmptyStringLiteral => write!(f, "string literal is empty"),
            Self::UnterminatedString => write!(f, "unterminated string literal"),
            Self::EmptyHexLiteral => write!(f, "hex literal is empty"),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for LexError {}
