//! Constant folding.
//!
//! Folding never removes a trap: a signed division that would trap at
//! run time stays in the tree.

use ember_stack::ensure_sufficient_stack;

use crate::{BinOp, Expr, Function, UnOp};

/// What a pass over the module changed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct OptimizeStats {
    /// Operations replaced by their constant result.
    pub folded: usize,
    /// Conditionals and conditional branches with a constant condition.
    pub branches_resolved: usize,
}

pub(crate) fn optimize_function(function: &mut Function, stats: &mut OptimizeStats) {
    fold(&mut function.body, stats);
}

fn fold(expr: &mut Expr, stats: &mut OptimizeStats) {
    ensure_sufficient_stack(|| fold_children(expr, stats));
    if let Some(replacement) = simplify(expr, stats) {
        *expr = replacement;
    }
}

fn fold_children(expr: &mut Expr, stats: &mut OptimizeStats) {
    match expr {
        Expr::I32Const(_) | Expr::F64Const(_) | Expr::LocalGet(_) | Expr::Nop => {}
        Expr::LocalSet { value, .. } | Expr::LocalTee { value, .. } => fold(value, stats),
        Expr::Binary { left, right, .. } => {
            fold(left, stats);
            fold(right, stats);
        }
        Expr::Unary { operand, .. } => fold(operand, stats),
        Expr::Load { address, .. } => fold(address, stats),
        Expr::Store { address, value, .. } => {
            fold(address, stats);
            fold(value, stats);
        }
        Expr::Block { body, .. } => {
            for item in body {
                fold(item, stats);
            }
        }
        Expr::If {
            condition,
            then,
            otherwise,
            ..
        } => {
            fold(condition, stats);
            fold(then, stats);
            if let Some(otherwise) = otherwise {
                fold(otherwise, stats);
            }
        }
        Expr::Loop { body, .. } => fold(body, stats),
        Expr::Break { condition, .. } => {
            if let Some(condition) = condition {
                fold(condition, stats);
            }
        }
        Expr::Call { args, .. } => {
            for arg in args {
                fold(arg, stats);
            }
        }
        Expr::Return(value) => {
            if let Some(value) = value {
                fold(value, stats);
            }
        }
        Expr::Drop(value) => fold(value, stats),
    }
}

fn simplify(expr: &mut Expr, stats: &mut OptimizeStats) -> Option<Expr> {
    match expr {
        Expr::Binary { op, left, right } => {
            let folded = fold_binary(*op, left, right)?;
            stats.folded += 1;
            Some(folded)
        }
        Expr::Unary { op, operand } => {
            let folded = match (op, operand.as_ref()) {
                (UnOp::I32Eqz, Expr::I32Const(v)) => Expr::I32Const(i32::from(*v == 0)),
                (UnOp::F64ConvertI32S, Expr::I32Const(v)) => Expr::F64Const(f64::from(*v)),
                _ => return None,
            };
            stats.folded += 1;
            Some(folded)
        }
        Expr::If {
            condition,
            then,
            otherwise,
            ..
        } => {
            let Expr::I32Const(c) = condition.as_ref() else {
                return None;
            };
            stats.branches_resolved += 1;
            let taken = if *c != 0 {
                std::mem::replace(then.as_mut(), Expr::Nop)
            } else {
                otherwise.take().map_or(Expr::Nop, |o| *o)
            };
            Some(taken)
        }
        Expr::Break {
            label,
            condition: Some(condition),
        } => {
            let Expr::I32Const(c) = condition.as_ref() else {
                return None;
            };
            stats.branches_resolved += 1;
            Some(if *c != 0 { Expr::br(*label) } else { Expr::Nop })
        }
        _ => None,
    }
}

#[allow(clippy::float_cmp)]
fn fold_binary(op: BinOp, left: &Expr, right: &Expr) -> Option<Expr> {
    match (left, right) {
        (Expr::I32Const(l), Expr::I32Const(r)) => {
            let (l, r) = (*l, *r);
            let value = match op {
                BinOp::I32Add => l.wrapping_add(r),
                BinOp::I32Sub => l.wrapping_sub(r),
                BinOp::I32Mul => l.wrapping_mul(r),
                BinOp::I32DivS => l.checked_div(r)?,
                BinOp::I32RemS if r == 0 => return None,
                BinOp::I32RemS => l.wrapping_rem(r),
                BinOp::I32Eq => i32::from(l == r),
                BinOp::I32Ne => i32::from(l != r),
                BinOp::I32LtS => i32::from(l < r),
                BinOp::I32LeS => i32::from(l <= r),
                BinOp::I32GtS => i32::from(l > r),
                BinOp::I32GeS => i32::from(l >= r),
                _ => return None,
            };
            Some(Expr::I32Const(value))
        }
        (Expr::F64Const(l), Expr::F64Const(r)) => {
            let (l, r) = (*l, *r);
            Some(match op {
                BinOp::F64Add => Expr::F64Const(l + r),
                BinOp::F64Sub => Expr::F64Const(l - r),
                BinOp::F64Mul => Expr::F64Const(l * r),
                BinOp::F64Div => Expr::F64Const(l / r),
                BinOp::F64Eq => Expr::I32Const(i32::from(l == r)),
                BinOp::F64Ne => Expr::I32Const(i32::from(l != r)),
                BinOp::F64Lt => Expr::I32Const(i32::from(l < r)),
                BinOp::F64Le => Expr::I32Const(i32::from(l <= r)),
                BinOp::F64Gt => Expr::I32Const(i32::from(l > r)),
                BinOp::F64Ge => Expr::I32Const(i32::from(l >= r)),
                _ => return None,
            })
        }
        _ => None,
    }
}
