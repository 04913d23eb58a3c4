use std::fmt;

use super::{AssignOp, BinaryOp, Ident, LogicalOp, UnaryOp, UpdateOp};
use crate::Span;

/// Identity of an expression node within one [`Program`](super::Program).
///
/// Assigned densely by the parser; later passes key side tables
/// (inferred types) on it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        ExprId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExprId({})", self.0)
    }
}

/// An expression node.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub id: ExprId,
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(id: ExprId, kind: ExprKind, span: Span) -> Self {
        Expr { id, kind, span }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// Numeric literal. All source numbers are doubles; typing decides
    /// whether the value is used as `i32` or `f64`.
    Number(f64),
    Bool(bool),
    Ident(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `[a, b, c]`
    Array(Vec<Expr>),
    /// `object[index]`
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    /// `object.property`
    Member {
        object: Box<Expr>,
        property: Ident,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    /// `++x`, `x--`, ...
    Update {
        op: UpdateOp,
        prefix: bool,
        target: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
}

impl ExprKind {
    /// Short description for diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            ExprKind::Number(_) => "number literal",
            ExprKind::Bool(_) => "boolean literal",
            ExprKind::Ident(_) => "identifier",
            ExprKind::Unary { .. } => "unary expression",
            ExprKind::Binary { .. } => "binary expression",
            ExprKind::Logical { .. } => "logical expression",
            ExprKind::Array(_) => "array literal",
            ExprKind::Index { .. } => "index expression",
            ExprKind::Member { .. } => "member expression",
            ExprKind::Assign { .. } => "assignment",
            ExprKind::Update { .. } => "update expression",
            ExprKind::Call { .. } => "call expression",
        }
    }
}
