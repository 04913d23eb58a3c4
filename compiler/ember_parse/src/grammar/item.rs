use ember_diagnostic::CompileError;
use ember_ir::ast::{Binding, Function, Ident};
use ember_ir::{Program, Span};

use crate::lexer::TokenKind;
use crate::Parser;

impl Parser<'_> {
    pub(crate) fn parse_program(&mut self) -> Result<Program, CompileError> {
        let mut functions = Vec::new();
        while !self.cursor.is_at_end() {
            if self.cursor.eat(&TokenKind::Semicolon) {
                continue;
            }
            if !self.cursor.check(&TokenKind::Function) {
                return Err(self.cursor.unexpected("a function declaration"));
            }
            functions.push(self.parse_function()?);
        }
        Ok(Program { functions })
    }

    /// `function name? (params) { body }`
    fn parse_function(&mut self) -> Result<Function, CompileError> {
        let start = self.cursor.expect(&TokenKind::Function)?;
        let name = self.eat_ident();

        self.cursor.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.cursor.check(&TokenKind::RParen) {
            params.push(self.parse_binding()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::RParen)?;

        let body = self.parse_block()?;
        let span = start.merge(body.span);
        tracing::trace!(
            name = name.as_ref().map_or("<anonymous>", |n| n.name.as_str()),
            params = params.len(),
            "parsed function"
        );
        Ok(Function {
            name,
            params,
            body,
            span,
        })
    }

    pub(crate) fn eat_ident(&mut self) -> Option<Ident> {
        let TokenKind::Ident(name) = self.cursor.current_kind() else {
            return None;
        };
        let name = name.clone();
        let span = self.cursor.advance().span;
        Some(Ident::new(name, span))
    }

    /// A parameter or declarator target.
    ///
    /// Destructuring patterns are skipped as a balanced token group and kept
    /// only as a span.
    pub(crate) fn parse_binding(&mut self) -> Result<Binding, CompileError> {
        if let Some(ident) = self.eat_ident() {
            return Ok(Binding::Ident(ident));
        }
        match self.cursor.current_kind() {
            TokenKind::LBracket | TokenKind::LBrace => Ok(Binding::Pattern(self.skip_balanced()?)),
            _ => Err(self.cursor.unexpected("a binding name")),
        }
    }

    fn skip_balanced(&mut self) -> Result<Span, CompileError> {
        let start = self.cursor.advance().span;
        let mut depth = 1usize;
        while depth > 0 {
            let token = self.cursor.advance();
            match token.kind {
                TokenKind::LBracket | TokenKind::LBrace | TokenKind::LParen => depth += 1,
                TokenKind::RBracket | TokenKind::RBrace | TokenKind::RParen => depth -= 1,
                TokenKind::Eof => {
                    return Err(CompileError::syntax("unterminated pattern", start));
                }
                _ => {}
            }
        }
        Ok(start.merge(self.cursor.previous_span()))
    }
}
