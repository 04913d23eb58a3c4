use ember_diagnostic::CompileError;
use ember_ir::ast::{Binding, Block, Declarator, ForInit, Stmt, StmtKind};
use ember_stack::ensure_sufficient_stack;

use super::{expect_assignable, expect_condition, InferCtx};

impl InferCtx<'_> {
    pub(super) fn infer_block(&mut self, block: &Block) -> Result<(), CompileError> {
        block.stmts.iter().try_for_each(|stmt| self.infer_stmt(stmt))
    }

    fn infer_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        ensure_sufficient_stack(|| self.infer_stmt_inner(stmt))
    }

    fn infer_stmt_inner(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match &stmt.kind {
            StmtKind::VarDecl(declarators) => self.infer_declarators(declarators),
            StmtKind::Expr(expr) => self.infer_expr(expr).map(|_| ()),
            StmtKind::If {
                test,
                consequent,
                alternate,
            } => {
                let ty = self.infer_expr(test)?;
                expect_condition(ty, test.span)?;
                self.infer_stmt(consequent)?;
                if let Some(alternate) = alternate {
                    self.infer_stmt(alternate)?;
                }
                Ok(())
            }
            StmtKind::While { test, body } => {
                let ty = self.infer_expr(test)?;
                expect_condition(ty, test.span)?;
                self.infer_stmt(body)
            }
            StmtKind::For {
                init,
                test,
                update,
                body,
            } => {
                match init {
                    Some(ForInit::VarDecl(declarators)) => self.infer_declarators(declarators)?,
                    Some(ForInit::Expr(expr)) => {
                        self.infer_expr(expr)?;
                    }
                    None => {}
                }
                if let Some(test) = test {
                    let ty = self.infer_expr(test)?;
                    expect_condition(ty, test.span)?;
                }
                // Execution order: body, then update.
                self.infer_stmt(body)?;
                if let Some(update) = update {
                    self.infer_expr(update)?;
                }
                Ok(())
            }
            StmtKind::Block(block) => self.infer_block(block),
            StmtKind::Return(Some(value)) => {
                let ty = self.infer_expr(value)?;
                let returns = self.types.return_type();
                expect_assignable(ty, returns, value.span, || "the return value".to_owned())
            }
            StmtKind::Return(None) | StmtKind::Empty => Ok(()),
        }
    }

    fn infer_declarators(&mut self, declarators: &[Declarator]) -> Result<(), CompileError> {
        for declarator in declarators {
            let Binding::Ident(ident) = &declarator.binding else {
                return Err(CompileError::NonIdentifierBinding {
                    span: declarator.binding.span(),
                });
            };
            if let Some(init) = &declarator.init {
                let ty = self.infer_expr(init)?;
                self.bind(&ident.name, ty, init.span)?;
            }
        }
        Ok(())
    }
}
