use ember_diagnostic::CompileError;
use ember_ir::ast::{Block, Declarator, ForInit, Stmt, StmtKind};
use ember_stack::ensure_sufficient_stack;

use crate::lexer::TokenKind;
use crate::Parser;

impl Parser<'_> {
    /// `{ stmt* }`
    pub(crate) fn parse_block(&mut self) -> Result<Block, CompileError> {
        let start = self.cursor.expect(&TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) {
            if self.cursor.is_at_end() {
                return Err(self.cursor.unexpected("`}`"));
            }
            stmts.push(self.parse_stmt()?);
        }
        let end = self.cursor.expect(&TokenKind::RBrace)?;
        Ok(Block {
            stmts,
            span: start.merge(end),
        })
    }

    pub(crate) fn parse_stmt(&mut self) -> Result<Stmt, CompileError> {
        ensure_sufficient_stack(|| self.parse_stmt_inner())
    }

    fn parse_stmt_inner(&mut self) -> Result<Stmt, CompileError> {
        let start = self.cursor.current_span();
        let kind = match self.cursor.current_kind() {
            TokenKind::LBrace => StmtKind::Block(self.parse_block()?),
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                let declarators = self.parse_var_decl()?;
                self.end_stmt()?;
                StmtKind::VarDecl(declarators)
            }
            TokenKind::If => self.parse_if()?,
            TokenKind::While => {
                self.cursor.advance();
                self.cursor.expect(&TokenKind::LParen)?;
                let test = self.parse_expr()?;
                self.cursor.expect(&TokenKind::RParen)?;
                let body = Box::new(self.parse_stmt()?);
                StmtKind::While { test, body }
            }
            TokenKind::For => self.parse_for()?,
            TokenKind::Return => {
                self.cursor.advance();
                let value = if self.at_stmt_end() {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.end_stmt()?;
                StmtKind::Return(value)
            }
            TokenKind::Semicolon => {
                self.cursor.advance();
                StmtKind::Empty
            }
            TokenKind::Function => {
                return Err(CompileError::syntax(
                    "nested functions are not supported",
                    start,
                ));
            }
            _ => {
                let expr = self.parse_expr()?;
                self.end_stmt()?;
                StmtKind::Expr(expr)
            }
        };
        Ok(Stmt::new(kind, start.merge(self.cursor.previous_span())))
    }

    /// `if (test) stmt (else stmt)?`
    fn parse_if(&mut self) -> Result<StmtKind, CompileError> {
        self.cursor.expect(&TokenKind::If)?;
        self.cursor.expect(&TokenKind::LParen)?;
        let test = self.parse_expr()?;
        self.cursor.expect(&TokenKind::RParen)?;
        let consequent = Box::new(self.parse_stmt()?);
        let alternate = if self.cursor.eat(&TokenKind::Else) {
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };
        Ok(StmtKind::If {
            test,
            consequent,
            alternate,
        })
    }

    /// `for (init?; test?; update?) stmt`
    fn parse_for(&mut self) -> Result<StmtKind, CompileError> {
        self.cursor.expect(&TokenKind::For)?;
        self.cursor.expect(&TokenKind::LParen)?;

        let init = match self.cursor.current_kind() {
            TokenKind::Semicolon => None,
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                Some(ForInit::VarDecl(self.parse_var_decl()?))
            }
            _ => Some(ForInit::Expr(self.parse_expr()?)),
        };
        self.cursor.expect(&TokenKind::Semicolon)?;

        let test = if self.cursor.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.cursor.expect(&TokenKind::Semicolon)?;

        let update = if self.cursor.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.cursor.expect(&TokenKind::RParen)?;

        let body = Box::new(self.parse_stmt()?);
        Ok(StmtKind::For {
            init,
            test,
            update,
            body,
        })
    }

    /// `var|let|const binding (= expr)? (, binding (= expr)?)*`
    fn parse_var_decl(&mut self) -> Result<Vec<Declarator>, CompileError> {
        self.cursor.advance();
        let mut declarators = Vec::new();
        loop {
            let binding = self.parse_binding()?;
            let init = if self.cursor.eat(&TokenKind::Eq) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            let span = init
                .as_ref()
                .map_or(binding.span(), |init| binding.span().merge(init.span));
            declarators.push(Declarator {
                binding,
                init,
                span,
            });
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(declarators)
    }

    fn at_stmt_end(&self) -> bool {
        self.cursor.check(&TokenKind::Semicolon)
            || self.cursor.check(&TokenKind::RBrace)
            || self.cursor.is_at_end()
            || self.cursor.newline_before_current()
    }

    /// A statement ends at `;`, before `}`, at end of input, or at a line break.
    fn end_stmt(&mut self) -> Result<(), CompileError> {
        if self.cursor.eat(&TokenKind::Semicolon) || self.at_stmt_end() {
            Ok(())
        } else {
            Err(self.cursor.unexpected("`;`"))
        }
    }
}
