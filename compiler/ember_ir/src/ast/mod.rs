//! Abstract syntax tree for the accepted source subset.
//!
//! Every supported construct is a variant of a closed enum; passes dispatch
//! with exhaustive `match`. Unsupported syntax never reaches this tree: the
//! parser rejects it, or it is represented by a variant that later phases
//! reject with a precise error (e.g. [`Binding::Pattern`]).

mod expr;
mod operators;
mod stmt;


pub use expr::{Expr, ExprId, ExprKind};
pub use operators::{AssignOp, BinaryOp, LogicalOp, UnaryOp, UpdateOp};
pub use stmt::{Block, Declarator, ForInit, Stmt, StmtKind};

use crate::Span;

/// A parsed source file: a list of function declarations.
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub functions: Vec<Function>,
}

impl Program {
    /// Find a named function.
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions
            .iter()
            .find(|f| f.name.as_ref().is_some_and(|n| n.name == name))
    }
}

/// `function name(params) { body }`
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    /// `None` for `function (a) { ... }`.
    pub name: Option<Ident>,
    pub params: Vec<Binding>,
    pub body: Block,
    pub span: Span,
}

/// An identifier with its location.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Ident {
            name: name.into(),
            span,
        }
    }
}

/// Target of a parameter or declarator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Binding {
    Ident(Ident),
    /// `[a, b]` or `{ a, b }`. Parsed so it can be reported precisely.
    Pattern(Span),
}

impl Binding {
    pub fn span(&self) -> Span {
        match self {
            Binding::Ident(ident) => ident.span,
            Binding::Pattern(span) => *span,
        }
    }
}
