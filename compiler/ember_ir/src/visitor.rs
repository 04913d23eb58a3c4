//! AST visitor.
//!
//! Passes that only need to observe part of the tree (symbol collection,
//! memory-usage scanning) implement [`Visitor`] and override the methods
//! they care about. Default methods call the matching `walk_*` function,
//! which visits children in source order.
//!
//! Passes that must handle every node kind (type inference, codegen) match
//! on the node enums directly instead.

use crate::ast::{Binding, Block, Declarator, Expr, ExprKind, ForInit, Function, Stmt, StmtKind};

pub trait Visitor<'ast> {
    fn visit_function(&mut self, function: &'ast Function) {
        walk_function(self, function);
    }

    /// Called for each parameter, in order.
    fn visit_param(&mut self, param: &'ast Binding) {
        let _ = param;
    }

    fn visit_block(&mut self, block: &'ast Block) {
        walk_block(self, block);
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_declarator(&mut self, declarator: &'ast Declarator) {
        walk_declarator(self, declarator);
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr);
    }
}

pub fn walk_function<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, function: &'ast Function) {
    for param in &function.params {
        visitor.visit_param(param);
    }
    visitor.visit_block(&function.body);
}

pub fn walk_block<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, block: &'ast Block) {
    for stmt in &block.stmts {
        visitor.visit_stmt(stmt);
    }
}

pub fn walk_stmt<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, stmt: &'ast Stmt) {
    match &stmt.kind {
        StmtKind::VarDecl(declarators) => {
            for declarator in declarators {
                visitor.visit_declarator(declarator);
            }
        }
        StmtKind::Expr(expr) => visitor.visit_expr(expr),
        StmtKind::If {
            test,
            consequent,
            alternate,
        } => {
            visitor.visit_expr(test);
            visitor.visit_stmt(consequent);
            if let Some(alternate) = alternate {
                visitor.visit_stmt(alternate);
            }
        }
        StmtKind::While { test, body } => {
            visitor.visit_expr(test);
            visitor.visit_stmt(body);
        }
        StmtKind::For {
            init,
            test,
            update,
            body,
        } => {
            match init {
                Some(ForInit::VarDecl(declarators)) => {
                    for declarator in declarators {
                        visitor.visit_declarator(declarator);
                    }
                }
                Some(ForInit::Expr(expr)) => visitor.visit_expr(expr),
                None => {}
            }
            if let Some(test) = test {
                visitor.visit_expr(test);
            }
            if let Some(update) = update {
                visitor.visit_expr(update);
            }
            visitor.visit_stmt(body);
        }
        StmtKind::Block(block) => visitor.visit_block(block),
        StmtKind::Return(value) => {
            if let Some(value) = value {
                visitor.visit_expr(value);
            }
        }
        StmtKind::Empty => {}
    }
}

pub fn walk_declarator<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    declarator: &'ast Declarator,
) {
    if let Some(init) = &declarator.init {
        visitor.visit_expr(init);
    }
}

pub fn walk_expr<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, expr: &'ast Expr) {
    match &expr.kind {
        ExprKind::Number(_) | ExprKind::Bool(_) | ExprKind::Ident(_) => {}
        ExprKind::Unary { operand, .. } => visitor.visit_expr(operand),
        ExprKind::Binary { left, right, .. } | ExprKind::Logical { left, right, .. } => {
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
        ExprKind::Array(elements) => {
            for element in elements {
                visitor.visit_expr(element);
            }
        }
        ExprKind::Index { object, index } => {
            visitor.visit_expr(object);
            visitor.visit_expr(index);
        }
        ExprKind::Member { object, .. } => visitor.visit_expr(object),
        ExprKind::Assign { target, value, .. } => {
            visitor.visit_expr(target);
            visitor.visit_expr(value);
        }
        ExprKind::Update { target, .. } => visitor.visit_expr(target),
        ExprKind::Call { callee, args } => {
            visitor.visit_expr(callee);
            for arg in args {
                visitor.visit_expr(arg);
            }
        }
    }
}
