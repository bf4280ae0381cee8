//! Recursive-descent recognizer for the embedded regex syntax.
//!
//! The grammar recognized is:
//!
//! ```text
//! re-cc-chr   := '\' <any> | [^\]]
//! re-cc-item  := re-cc-chr [ '-' re-cc-chr ]
//! re-cc       := '[' [ '^' ] re-cc-item+ ']'
//! re-chr      := '\' <any> | [^/.*?[(|]
//! re-any      := '.'
//! re-base     := re-cc | re-chr | re-any | '(' re-expr ')'
//! re-repeat   := re-base [ '+' | '*' | '?' ]
//! re-and      := re-repeat+
//! re-or       := re-and { '|' re-and }
//! re-expr     := re-or
//! regex       := '/' re-expr '/'
//! ```
//!
//! No fragment tree is built: the matched text (excluding the outer
//! slashes) is accumulated into a flat buffer capped at [`MAX_LEXEME`]
//! bytes, and the downstream table interpreter re-parses it if needed.
//! A sequence ends at `|`, `/`, `)`, or end of input.

use gramtab_common::error::{LexError, LexErrorKind};
use gramtab_common::span::Span;

use crate::reader::Reader;
use crate::MAX_LEXEME;

/// Read a full `/.../` regex; the caller has peeked the opening slash.
///
/// Returns the body text with the outer slashes stripped.
pub fn read_regex(r: &mut Reader) -> Result<String, LexError> {
    let start = r.pos();
    match r.next_raw() {
        Some('/') => {}
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
    }
    let mut p = RegexReader {
        r,
        start,
        buf: String::new(),
    };
    p.expr()?;
    match p.r.next_raw() {
        Some('/') => Ok(p.buf),
        Some(c) => Err(p.unexpected(c)),
        None => Err(p.eof()),
    }
}

/// Parser state: the shared reader plus the flat text buffer.
struct RegexReader<'r, 'src> {
    r: &'r mut Reader<'src>,
    start: u32,
    buf: String,
}

impl RegexReader<'_, '_> {
    fn expr(&mut self) -> Result<(), LexError> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<(), LexError> {
        self.and_expr()?;
        while self.peek() == Some('|') {
            self.bump();
            self.and_expr()?;
        }
        Ok(())
    }

    /// One or more repeats; the sequence ends at `|`, `/`, `)`, or EOF.
    fn and_expr(&mut self) -> Result<(), LexError> {
        let mut count = 0;
        loop {
            match self.peek() {
                None | Some('|') | Some('/') | Some(')') => break,
                Some(_) => {
                    self.repeat()?;
                    count += 1;
                }
            }
        }
        if count == 0 {
            return match self.peek() {
                Some(c) => Err(self.unexpected(c)),
                None => Err(self.eof()),
            };
        }
        Ok(())
    }

    fn repeat(&mut self) -> Result<(), LexError> {
        self.base()?;
        if matches!(self.peek(), Some('+' | '*' | '?')) {
            self.bump();
        }
        Ok(())
    }

    fn base(&mut self) -> Result<(), LexError> {
        match self.peek() {
            None => Err(self.eof()),
            Some('[') => self.char_class(),
            Some('(') => {
                self.bump();
                self.expr()?;
                match self.peek() {
                    Some(')') => {
                        self.bump();
                        Ok(())
                    }
                    Some(c) => Err(self.unexpected(c)),
                    None => Err(self.eof()),
                }
            }
            Some('.') => {
                self.bump();
                Ok(())
            }
            Some(c) => self.chr(c),
        }
    }

    /// `re-chr`: an escape pair, or any character not reserved by the
    /// surrounding syntax.
    fn chr(&mut self, c: char) -> Result<(), LexError> {
        if c == '\\' {
            self.bump();
            return match self.bump() {
                Some(_) => Ok(()),
                None => Err(self.eof()),
            };
        }
        if matches!(c, '/' | '.' | '*' | '?' | '[' | '(' | '|' | ')') {
            return Err(self.unexpected(c));
        }
        self.bump();
        Ok(())
    }

    fn char_class(&mut self) -> Result<(), LexError> {
        self.bump(); // '['
        if self.peek() == Some('^') {
            self.bump();
        }
        let mut items = 0;
        loop {
            match self.peek() {
                None => return Err(self.eof()),
                Some(']') => break,
                Some(_) => {
                    self.cc_item()?;
                    items += 1;
                }
            }
        }
        if items == 0 {
            return Err(self.unexpected(']'));
        }
        self.bump(); // ']'
        Ok(())
    }

    fn cc_item(&mut self) -> Result<(), LexError> {
        self.cc_chr()?;
        if self.peek() == Some('-') {
            self.bump();
            self.cc_chr()?;
        }
        Ok(())
    }

    fn cc_chr(&mut self) -> Result<(), LexError> {
        match self.peek() {
            None => Err(self.eof()),
            Some(']') => Err(self.unexpected(']')),
            Some('\\') => {
                self.bump();
                match self.bump() {
                    Some(_) => Ok(()),
                    None => Err(self.eof()),
                }
            }
            Some(_) => {
                self.bump();
                Ok(())
            }
        }
    }

    // ── Buffer and reader plumbing ─────────────────────────────────────

    /// Consume one raw character and append it to the buffer (unless the
    /// buffer is full, in which case the character is dropped silently).
    fn bump(&mut self) -> Option<char> {
        let c = self.r.next_raw()?;
        if self.buf.len() + c.len_utf8() <= MAX_LEXEME {
            self.buf.push(c);
        }
        Some(c)
    }

    fn peek(&self) -> Option<char> {
        self.r.peek_raw()
    }

    fn unexpected(&self, c: char) -> LexError {
        LexError::new(
            LexErrorKind::UnexpectedCharacter(c),
            Span::new(self.start, self.r.pos()),
        )
    }

    fn eof(&self) -> LexError {
        LexError::new(
            LexErrorKind::UnexpectedEof,
            Span::new(self.start, self.r.pos()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(src: &str) -> String {
        read_regex(&mut Reader::new(src)).unwrap()
    }

    fn fail(src: &str) -> LexErrorKind {
        read_regex(&mut Reader::new(src)).unwrap_err().kind
    }

    #[test]
    fn plain_characters() {
        assert_eq!(body("/abc/"), "abc");
    }

    #[test]
    fn repeats_and_any() {
        assert_eq!(body("/ab+c*d?./"), "ab+c*d?.");
    }

    #[test]
    fn alternation_and_groups() {
        assert_eq!(body("/(ab|cd)+e/"), "(ab|cd)+e");
    }

    #[test]
    fn character_classes() {
        assert_eq!(body("/[a-z0-9]+/"), "[a-z0-9]+");
        assert_eq!(body("/[^a-c]x/"), "[^a-c]x");
    }

    #[test]
    fn class_escapes() {
        assert_eq!(body(r"/[\]\-]/"), r"[\]\-]");
    }

    #[test]
    fn escaped_slash_is_not_a_terminator() {
        assert_eq!(body(r"/a\/b/"), r"a\/b");
    }

    #[test]
    fn reader_stops_after_closing_slash() {
        let mut r = Reader::new("/ab/ rest");
        assert_eq!(read_regex(&mut r).unwrap(), "ab");
        assert_eq!(r.peek(), Some(' '));
    }

    #[test]
    fn comment_text_is_literal_inside_regex() {
        assert_eq!(body("/a--b/"), "a--b");
    }

    #[test]
    fn empty_regex_is_rejected() {
        assert_eq!(fail("//"), LexErrorKind::UnexpectedCharacter('/'));
    }

    #[test]
    fn empty_alternative_is_rejected() {
        assert_eq!(fail("/a||b/"), LexErrorKind::UnexpectedCharacter('|'));
    }

    #[test]
    fn unterminated_regex() {
        assert_eq!(fail("/abc"), LexErrorKind::UnexpectedEof);
    }

    #[test]
    fn unterminated_class() {
        assert_eq!(fail("/[abc"), LexErrorKind::UnexpectedEof);
    }

    #[test]
    fn unbalanced_close_paren() {
        assert_eq!(fail("/a)b/"), LexErrorKind::UnexpectedCharacter(')'));
    }

    #[test]
    fn empty_class_is_rejected() {
        assert_eq!(fail("/[]/"), LexErrorKind::UnexpectedCharacter(']'));
    }

    #[test]
    fn long_body_is_truncated_silently() {
        let src = format!("/{}/", "a".repeat(300));
        assert_eq!(body(&src).len(), MAX_LEXEME);
    }
}
