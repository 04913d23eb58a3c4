//! Statement lowering.

use ember_diagnostic::CompileError;
use ember_ir::ast::{Binding, Declarator, Expr, ForInit, Stmt, StmtKind};
use ember_ir::Span;
use ember_stack::ensure_sufficient_stack;

use crate::context::GenContext;
use crate::operators::{condition, negated_condition};
use crate::val_type;

type Ir = ember_wasm::Expr;

impl GenContext<'_> {
    pub(crate) fn gen_stmts(&mut self, stmts: &[Stmt]) -> Result<(), CompileError> {
        stmts.iter().try_for_each(|stmt| self.gen_stmt(stmt))
    }

    pub(crate) fn gen_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        ensure_sufficient_stack(|| self.gen_stmt_inner(stmt))
    }

    fn gen_stmt_inner(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match &stmt.kind {
            StmtKind::VarDecl(declarators) => self.declarators(declarators),
            StmtKind::Expr(expr) => self.gen_effect(expr),
            StmtKind::If {
                test,
                consequent,
                alternate,
            } => {
                let ty = self.type_of(test)?;
                let test = condition(self.value(test)?, ty);
                let then = self.branch(consequent)?;
                let otherwise = match alternate {
                    Some(alternate) => Some(self.branch(alternate)?),
                    None => None,
                };
                self.emit(Ir::if_(test, then, otherwise, None), stmt.span)
            }
            StmtKind::While { test, body } => self.gen_loop(Some(test), None, body, stmt.span),
            StmtKind::For {
                init,
                test,
                update,
                body,
            } => {
                match init {
                    Some(ForInit::VarDecl(declarators)) => self.declarators(declarators)?,
                    Some(ForInit::Expr(expr)) => self.gen_effect(expr)?,
                    None => {}
                }
                self.gen_loop(test.as_ref(), update.as_ref(), body, stmt.span)
            }
            StmtKind::Block(block) => {
                let stmts = self.scoped(block.span, |cx| cx.gen_stmts(&block.stmts))?;
                self.emit(Ir::block(None, stmts, None), stmt.span)
            }
            StmtKind::Return(value) => {
                let returns = self.types.return_type();
                let value = match value {
                    Some(value) => self.value_as(value, returns)?,
                    None => val_type(returns).zero(),
                };
                self.emit(Ir::ret(Some(value)), stmt.span)
            }
            StmtKind::Empty => Ok(()),
        }
    }

    /// Initialized declarators store into their slot. A declarator without
    /// an initializer emits nothing, so redeclaring a variable keeps its
    /// value.
    fn declarators(&mut self, declarators: &[Declarator]) -> Result<(), CompileError> {
        for declarator in declarators {
            let Binding::Ident(ident) = &declarator.binding else {
                return Err(CompileError::NonIdentifierBinding {
                    span: declarator.binding.span(),
                });
            };
            let Some(init) = &declarator.init else {
                continue;
            };
            let (slot, ty) = self.variable(&ident.name, ident.span)?;
            let value = self.value_as(init, ty)?;
            self.emit(Ir::local_set(slot, value), declarator.span)?;
        }
        Ok(())
    }

    /// A branch of an `if`, as its own block.
    fn branch(&mut self, stmt: &Stmt) -> Result<Ir, CompileError> {
        let stmts = self.scoped(stmt.span, |cx| cx.gen_stmt(stmt))?;
        Ok(Ir::block(None, stmts, None))
    }

    /// Run `body` with a fresh statement list and return what it emitted.
    fn scoped(
        &mut self,
        span: Span,
        body: impl FnOnce(&mut Self) -> Result<(), CompileError>,
    ) -> Result<Vec<Ir>, CompileError> {
        self.open_block();
        let result = body(self);
        let stmts = self.close_block(span)?;
        result.map(|()| stmts)
    }

    /// ```text
    /// (block $exit
    ///   (loop $next
    ///     (br_if $exit (not test))
    ///     body
    ///     update
    ///     (br $next)))
    /// ```
    fn gen_loop(
        &mut self,
        test: Option<&Expr>,
        update: Option<&Expr>,
        body: &Stmt,
        span: Span,
    ) -> Result<(), CompileError> {
        let exit = self.fresh_label();
        let next = self.fresh_label();
        let stmts = self.scoped(span, |cx| {
            if let Some(test) = test {
                let ty = cx.type_of(test)?;
                let value = cx.value(test)?;
                cx.emit(Ir::br_if(exit, negated_condition(value, ty)), test.span)?;
            }
            cx.gen_stmt(body)?;
            if let Some(update) = update {
                cx.gen_effect(update)?;
            }
            cx.emit(Ir::br(next), span)
        })?;
        let looped = Ir::loop_(next, Ir::block(None, stmts, None));
        self.emit(Ir::block(Some(exit), vec![looped], None), span)
    }
}
