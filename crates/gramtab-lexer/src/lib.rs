// Lexical recognizers for the gramtab grammar compiler.
//
// There is no token stream: the EBNF parser drives the [`Reader`] directly
// and calls these recognizers at the positions its grammar expects them.
// Each recognizer either commits (consuming its lexeme) or resets the
// reader to where it started.

pub mod reader;
pub mod regex;

use gramtab_common::error::{LexError, LexErrorKind};
use gramtab_common::span::Span;

pub use reader::{Mark, Reader, ECHO_BYTES};
pub use regex::read_regex;

/// Longest stored lexeme, in bytes. Longer identifiers and regex bodies
/// are consumed in full but truncated to this many bytes.
pub const MAX_LEXEME: usize = 255;

/// Longest keyword the greedy uppercase scan will consume (`TOKEN`,
/// `DWORD`, `QWORD`).
pub const MAX_KEYWORD: usize = 5;

/// Whether `c` can appear in an identifier.
pub fn is_ident_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '-')
}

/// Read an identifier: `[a-z0-9-]+`, greedy.
///
/// Returns `None` without consuming anything if the next character cannot
/// start an identifier. The stored text is capped at [`MAX_LEXEME`] bytes;
/// excess characters are consumed and dropped.
pub fn read_identifier(r: &mut Reader) -> Option<String> {
    let mut text = String::new();
    let mut matched = false;
    while let Some(c) = r.peek() {
        if !is_ident_char(c) {
            break;
        }
        r.next();
        matched = true;
        if text.len() < MAX_LEXEME {
            text.push(c);
        }
    }
    matched.then_some(text)
}

/// Read a string literal delimited by matched `'` or `"` quotes.
///
/// The caller has peeked the opening quote. The body is any run of
/// characters other than the opening quote, read raw (comments have no
/// meaning inside literals). Empty bodies and EOF before the closing
/// quote are errors.
pub fn read_string_literal(r: &mut Reader) -> Result<String, LexError> {
    let start = r.pos();
    let quote = match r.next_raw() {
        Some(c @ ('\'' | '"')) => c,
        Some(c) => {
            return Err(LexError::new(
                LexErrorKind::UnexpectedCharacter(c),
                Span::new(start, r.pos()),
            ))
        }
        None => {
            return Err(LexError::new(
                LexErrorKind::UnexpectedEof,
                Span::new(start, start),
            ))
        }
    };
    let mut body = String::new();
    loop {
        match r.next_raw() {
            None => {
                return Err(LexError::new(
                    LexErrorKind::UnterminatedString,
                    Span::new(start, r.pos()),
                ))
            }
            Some(c) if c == quote => break,
            Some(c) => body.push(c),
        }
    }
    if body.is_empty() {
        return Err(LexError::new(
            LexErrorKind::EmptyStringLiteral,
            Span::new(start, r.pos()),
        ));
    }
    Ok(body)
}

/// Read the digits of a hex literal; the caller has consumed the `$`.
///
/// The digits are lowered to lowercase, and a leading `0` is prepended
/// when their count is odd so the result always describes whole bytes.
pub fn read_hex_literal(r: &mut Reader) -> Result<String, LexError> {
    let start = r.pos();
    let mut digits = String::new();
    while let Some(c) = r.peek() {
        if !c.is_ascii_hexdigit() {
            break;
        }
        r.next();
        digits.push(c.to_ascii_lowercase());
    }
    if digits.is_empty() {
        return Err(LexError::new(
            LexErrorKind::EmptyHexLiteral,
            Span::new(start, r.pos()),
        ));
    }
    if digits.len() % 2 == 1 {
        digits.insert(0, '0');
    }
    Ok(digits)
}

/// Greedily read up to [`MAX_KEYWORD`] uppercase letters and match them
/// against `candidates`.
///
/// On a match the keyword is consumed and its index returned; otherwise
/// the reader is reset so every read character (and the lookahead that
/// stopped the scan) is seen again by the caller.
pub fn try_keywords(r: &mut Reader, candidates: &[&str]) -> Option<usize> {
    let mark = r.mark();
    let mut read = String::new();
    while read.len() < MAX_KEYWORD {
        match r.peek() {
            Some(c) if c.is_ascii_uppercase() => {
                r.next();
                read.push(c);
            }
            _ => break,
        }
    }
    match candidates.iter().position(|k| *k == read) {
        Some(ix) => Some(ix),
        None => {
            r.reset(mark);
            None
        }
    }
}

/// Match a single keyword with [`try_keywords`] semantics.
pub fn try_keyword(r: &mut Reader, keyword: &str) -> bool {
    try_keywords(r, &[keyword]).is_some()
}
