//! Token cursor.

use ember_diagnostic::CompileError;
use ember_ir::Span;

use crate::lexer::{Token, TokenKind};

/// Position in a token stream that always ends with `Eof`.
pub struct Cursor<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str, tokens: Vec<Token>) -> Self {
        debug_assert!(matches!(
            tokens.last().map(|t| &t.kind),
            Some(TokenKind::Eof)
        ));
        Cursor {
            source,
            tokens,
            pos: 0,
        }
    }

    #[inline]
    pub fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    #[inline]
    pub fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    pub fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::DUMMY
        }
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// Compare against a token kind without payload.
    #[inline]
    pub fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Move past the current token and return it. Stays put at `Eof`.
    pub fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    /// Consume `kind` if present.
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume `kind` or fail with "expected ..." at the current token.
    pub fn expect(&mut self, kind: &TokenKind) -> Result<Span, CompileError> {
        if self.check(kind) {
            Ok(self.advance().span)
        } else {
            Err(self.unexpected(&kind.display_name()))
        }
    }

    /// Whether a line break separates the previous token from the current one.
    pub fn newline_before_current(&self) -> bool {
        let from = self.previous_span().end as usize;
        let to = self.current_span().start as usize;
        self.source
            .get(from..to)
            .is_some_and(|gap| gap.contains('\n'))
    }

    pub fn unexpected(&self, expected: &str) -> CompileError {
        CompileError::syntax(
            format!(
                "expected {expected}, found {}",
                self.current_kind().display_name()
            ),
            self.current_span(),
        )
    }
}
