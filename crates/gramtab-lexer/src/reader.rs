/// Character-level source reader for the gramtab front-end.
///
/// The reader wraps the full source text (the CLI reads stdin up front)
/// and hands out one logical character at a time. It tracks the current
/// line and column, drops `\r` silently, and strips `--` line comments so
/// downstream consumers never see comment text. Pushback is realized as
/// `mark`/`reset` over the immutable source, which gives the unlimited
/// lookahead the keyword recognizers need.
#[derive(Clone)]
pub struct Reader<'src> {
    src: &'src str,
    pos: usize,
    line: u32,
    col: u32,
}

/// A saved reader position for `reset`. Opaque outside this module.
#[derive(Debug, Clone, Copy)]
pub struct Mark {
    pos: usize,
    line: u32,
    col: u32,
}

/// Width of the diagnostic echo window, in bytes.
pub const ECHO_BYTES: usize = 64;

impl<'src> Reader<'src> {
    /// Create a new reader at the start of the source text.
    pub fn new(src: &'src str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Consume one character with no comment or `\r` handling.
    fn advance_char(&mut self) -> Option<char> {
        let c = self.src[self.pos..].chars().next()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    /// Consume the next character, dropping `\r` but keeping comment text.
    ///
    /// Used inside string literals and regex bodies, where `--` has no
    /// comment meaning.
    pub fn next_raw(&mut self) -> Option<char> {
        loop {
            match self.advance_char() {
                Some('\r') => continue,
                other => return other,
            }
        }
    }

    /// Consume the next character outside literals: drops `\r` and strips
    /// `--` line comments through the following newline.
    pub fn next(&mut self) -> Option<char> {
        loop {
            let c = self.next_raw()?;
            if c == '-' {
                let m = self.mark();
                if self.next_raw() == Some('-') {
                    while let Some(c2) = self.next_raw() {
                        if c2 == '\n' {
                            break;
                        }
                    }
                    continue;
                }
                self.reset(m);
            }
            return Some(c);
        }
    }

    /// Look at the next comment-stripped character without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.clone().next()
    }

    /// Look at the next raw character without consuming it.
    pub fn peek_raw(&self) -> Option<char> {
        self.clone().next_raw()
    }

    /// Save the current position for a later `reset`.
    pub fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            col: self.col,
        }
    }

    /// Rewind to a previously saved position.
    pub fn reset(&mut self, mark: Mark) {
        self.pos = mark.pos;
        self.line = mark.line;
        self.col = mark.col;
    }

    /// Current byte position in the source text.
    pub fn pos(&self) -> u32 {
        self.pos as u32
    }

    /// Current line, 1-based.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Current column, 1-based, in characters from the start of the line.
    pub fn col(&self) -> u32 {
        self.col
    }

    /// Whether there are no more characters to consume (comment-stripped).
    pub fn is_eof(&self) -> bool {
        self.peek().is_none()
    }

    /// The last `ECHO_BYTES` bytes of consumed source, for diagnostics.
    ///
    /// The window is snapped forward to a character boundary, so it may be
    /// up to three bytes short of 64.
    pub fn recent(&self) -> &'src str {
        let mut start = self.pos.saturating_sub(ECHO_BYTES);
        while !self.src.is_char_boundary(start) {
            start += 1;
        }
        &self.src[start..self.pos]
    }

    /// Consume whitespace (and, transparently, comments).
    pub fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_whitespace() {
                self.next();
            } else {
                break;
            }
        }
    }
}
