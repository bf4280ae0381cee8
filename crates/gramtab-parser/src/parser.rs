//! Recursive-descent parser for the gramtab EBNF dialect.
//!
//! The grammar parsed is:
//!
//! ```text
//! production := [ 'TOKEN' ] identifier ':=' expr '.'
//! expr       := or-expr
//! or-expr    := and-expr { '|' and-expr }
//! and-expr   := base-expr { base-expr }
//! base-expr  := identifier | str-lit | regex | bin-match
//!             | '(' expr ')' | '[' expr ']' | '{' expr '}'
//! ```
//!
//! Single-child `and`/`or` wrappers are elided and parenthesized groups
//! return their inner expression directly; downstream passes rely on
//! these simplifications. Parsing halts at the first fault.

use gramtab_common::error::LexError;
use gramtab_common::span::Span;
use gramtab_lexer::{
    is_ident_char, read_hex_literal, read_identifier, read_regex, read_string_literal,
    try_keyword, try_keywords, Reader,
};

use crate::error::ParseError;
use crate::tree::{NodeId, NodeKind, Tree};

/// The four binary field widths, in their emitted code order.
const WIDTH_KEYWORDS: [&str; 4] = ["BYTE", "WORD", "DWORD", "QWORD"];

/// Parse EBNF source into a tree rooted at a `ProdList`.
pub fn parse(source: &str) -> Result<Tree, ParseError> {
    Parser {
        reader: Reader::new(source),
        tree: Tree::new(),
    }
    .run()
}

struct Parser<'src> {
    reader: Reader<'src>,
    tree: Tree,
}

impl Parser<'_> {
    fn run(mut self) -> Result<Tree, ParseError> {
        let root = self.tree.alloc(NodeKind::ProdList, None);
        self.tree.set_root(root);
        loop {
            self.reader.skip_whitespace();
            if self.reader.is_eof() {
                break;
            }
            let prod = self.production()?;
            self.tree.add_branch(root, prod);
        }
        Ok(self.tree)
    }

    /// `[ 'TOKEN' ] identifier ':=' expr '.'`
    fn production(&mut self) -> Result<NodeId, ParseError> {
        let token = try_keyword(&mut self.reader, "TOKEN");
        if token {
            self.reader.skip_whitespace();
        }
        let Some(name) = read_identifier(&mut self.reader) else {
            return Err(self.error("expected production name"));
        };
        self.reader.skip_whitespace();
        self.expect(':', "expected `:=` after production name")?;
        self.expect('=', "expected `:=` after production name")?;
        let prod = self.tree.alloc(NodeKind::Production, Some(name));
        self.tree.node_mut(prod).token = token;
        let body = self.expr()?;
        self.tree.add_branch(prod, body);
        self.reader.skip_whitespace();
        self.expect('.', "expected `.` to close production")?;
        Ok(prod)
    }

    fn expr(&mut self) -> Result<NodeId, ParseError> {
        self.or_expr()
    }

    /// `and-expr { '|' and-expr }`, eliding the wrapper for one child.
    fn or_expr(&mut self) -> Result<NodeId, ParseError> {
        let first = self.and_expr()?;
        self.reader.skip_whitespace();
        if self.reader.peek() != Some('|') {
            return Ok(first);
        }
        let or = self.tree.alloc(NodeKind::OrExpr, None);
        self.tree.add_branch(or, first);
        while self.reader.peek() == Some('|') {
            self.reader.next();
            let alt = self.and_expr()?;
            self.tree.add_branch(or, alt);
            self.reader.skip_whitespace();
        }
        Ok(or)
    }

    /// `base-expr { base-expr }`, eliding the wrapper for one child.
    fn and_expr(&mut self) -> Result<NodeId, ParseError> {
        let mut children: Vec<NodeId> = Vec::new();
        loop {
            self.reader.skip_whitespace();
            match self.base_expr()? {
                Some(child) => children.push(child),
                None => break,
            }
        }
        match children.len() {
            0 => Err(self.error("expected expression")),
            1 => Ok(children[0]),
            _ => {
                let and = self.tree.alloc(NodeKind::AndExpr, None);
                for child in children {
                    self.tree.add_branch(and, child);
                }
                Ok(and)
            }
        }
    }

    /// One base expression, or `None` when the next character cannot
    /// start one (which ends the enclosing sequence).
    fn base_expr(&mut self) -> Result<Option<NodeId>, ParseError> {
        let Some(c) = self.reader.peek() else {
            return Ok(None);
        };
        match c {
            '\'' | '"' => {
                let body = self.lex(read_string_literal)?;
                Ok(Some(self.tree.alloc(NodeKind::StrLit, Some(body))))
            }
            '/' => {
                let body = self.lex(read_regex)?;
                Ok(Some(self.tree.alloc(NodeKind::Regex, Some(body))))
            }
            '$' => {
                self.reader.next();
                let hex = self.lex(read_hex_literal)?;
                Ok(Some(self.tree.alloc(NodeKind::BinData, Some(hex))))
            }
            '(' => {
                self.reader.next();
                let inner = self.expr()?;
                self.reader.skip_whitespace();
                self.expect(')', "expected `)` to close group")?;
                Ok(Some(inner))
            }
            '[' => {
                self.reader.next();
                let inner = self.expr()?;
                self.reader.skip_whitespace();
                self.expect(']', "expected `]` to close optional group")?;
                let node = self.tree.alloc(NodeKind::BracketExpr, None);
                self.tree.add_branch(node, inner);
                Ok(Some(node))
            }
            '{' => {
                self.reader.next();
                let inner = self.expr()?;
                self.reader.skip_whitespace();
                self.expect('}', "expected `}` to close repetition group")?;
                let node = self.tree.alloc(NodeKind::BraceExpr, None);
                self.tree.add_branch(node, inner);
                Ok(Some(node))
            }
            'A'..='Z' => self.binary_field(),
            c if is_ident_char(c) => {
                let name = read_identifier(&mut self.reader)
                    .expect("peeked an identifier character");
                Ok(Some(self.tree.alloc(NodeKind::Ident, Some(name))))
            }
            _ => Ok(None),
        }
    }

    /// `BYTE|WORD|DWORD|QWORD [ ':' id | '*' id ]`.
    ///
    /// Returns `None` (with the reader reset) when the uppercase run is
    /// not one of the width keywords.
    fn binary_field(&mut self) -> Result<Option<NodeId>, ParseError> {
        let Some(ix) = try_keywords(&mut self.reader, &WIDTH_KEYWORDS) else {
            return Ok(None);
        };
        let width = WIDTH_KEYWORDS[ix].to_string();
        // The dispatch character must immediately follow the keyword.
        let kind = match self.reader.peek() {
            Some(':') => NodeKind::BinFieldCount,
            Some('*') => NodeKind::BinFieldTimes,
            _ => NodeKind::BinField,
        };
        let node = self.tree.alloc(kind, Some(width));
        if kind != NodeKind::BinField {
            self.reader.next();
            let Some(name) = read_identifier(&mut self.reader) else {
                return Err(self.error("expected parameter name after `:` or `*`"));
            };
            let param = self.tree.alloc(NodeKind::Ident, Some(name));
            self.tree.add_branch(node, param);
        }
        Ok(Some(node))
    }

    // ── Helpers ────────────────────────────────────────────────────────

    /// Consume `want` or fail with `message`.
    fn expect(&mut self, want: char, message: &str) -> Result<(), ParseError> {
        if self.reader.peek() == Some(want) {
            self.reader.next();
            Ok(())
        } else {
            Err(self.error(message))
        }
    }

    /// Run a lexical recognizer and wrap its error with reader context.
    fn lex<T>(
        &mut self,
        recognizer: impl FnOnce(&mut Reader) -> Result<T, LexError>,
    ) -> Result<T, ParseError> {
        recognizer(&mut self.reader).map_err(|e| {
            ParseError::from_lex(e, self.reader.line(), self.reader.col(), self.reader.recent())
        })
    }

    fn error(&self, message: &str) -> ParseError {
        let pos = self.reader.pos();
        ParseError::new(
            message,
            Span::new(pos, pos),
            self.reader.line(),
            self.reader.col(),
            self.reader.recent(),
        )
    }
}
