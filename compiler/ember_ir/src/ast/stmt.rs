use super::{Binding, Expr};
use crate::Span;

/// `{ ... }`
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    /// `var`/`let`/`const` with one or more declarators.
    VarDecl(Vec<Declarator>),
    Expr(Expr),
    If {
        test: Expr,
        consequent: Box<Stmt>,
        alternate: Option<Box<Stmt>>,
    },
    While {
        test: Expr,
        body: Box<Stmt>,
    },
    For {
        init: Option<ForInit>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    Block(Block),
    Return(Option<Expr>),
    /// `;`
    Empty,
}

/// `name = init` inside a variable declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct Declarator {
    pub binding: Binding,
    pub init: Option<Expr>,
    pub span: Span,
}

/// First clause of a `for` statement.
#[derive(Clone, Debug, PartialEq)]
pub enum ForInit {
    VarDecl(Vec<Declarator>),
    Expr(Expr),
}
