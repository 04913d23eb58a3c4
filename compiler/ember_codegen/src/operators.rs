//! Operator selection and value conversions.

use ember_diagnostic::CompileError;
use ember_ir::ast::BinaryOp;
use ember_ir::{Span, ValueType};
use ember_wasm::{BinOp, Expr, UnOp};

/// Convert a value of type `from` for a position of type `to`. Only
/// `Int32` to `Float64` needs an instruction; inference has rejected every
/// other mismatch.
pub(crate) fn coerce(value: Expr, from: ValueType, to: ValueType) -> Expr {
    if from == ValueType::Int32 && to == ValueType::Float64 {
        Expr::unary(UnOp::F64ConvertI32S, value)
    } else {
        value
    }
}

/// A scalar as an `if`/`br_if` operand: any non-zero i32 is true.
pub(crate) fn condition(value: Expr, ty: ValueType) -> Expr {
    match ty {
        ValueType::Float64 => Expr::binary(BinOp::F64Ne, value, Expr::F64Const(0.0)),
        _ => value,
    }
}

/// The negation of [`condition`].
pub(crate) fn negated_condition(value: Expr, ty: ValueType) -> Expr {
    match ty {
        ValueType::Float64 => Expr::binary(BinOp::F64Eq, value, Expr::F64Const(0.0)),
        _ => Expr::unary(UnOp::I32Eqz, value),
    }
}

/// A scalar as a `0`/`1` boolean.
pub(crate) fn boolean(value: Expr, ty: ValueType) -> Expr {
    match ty {
        ValueType::Boolean => value,
        ValueType::Float64 => Expr::binary(BinOp::F64Ne, value, Expr::F64Const(0.0)),
        _ => Expr::binary(BinOp::I32Ne, value, Expr::I32Const(0)),
    }
}

/// `!value`. Booleans use `(x + 1) rem 2`, other scalars compare with zero.
pub(crate) fn not(value: Expr, ty: ValueType) -> Expr {
    match ty {
        ValueType::Boolean => Expr::binary(
            BinOp::I32RemS,
            Expr::binary(BinOp::I32Add, value, Expr::I32Const(1)),
            Expr::I32Const(2),
        ),
        ValueType::Float64 => Expr::binary(BinOp::F64Eq, value, Expr::F64Const(0.0)),
        _ => Expr::unary(UnOp::I32Eqz, value),
    }
}

/// `-value`, as `0 - value`.
pub(crate) fn negate(value: Expr, ty: ValueType) -> Expr {
    match ty {
        ValueType::Float64 => Expr::binary(BinOp::F64Sub, Expr::F64Const(0.0), value),
        _ => Expr::binary(BinOp::I32Sub, Expr::I32Const(0), value),
    }
}

/// `1` in the representation of `ty`, for `++` and `--`.
pub(crate) fn one(ty: ValueType) -> Expr {
    match ty {
        ValueType::Float64 => Expr::F64Const(1.0),
        _ => Expr::I32Const(1),
    }
}

/// The instruction for `op` over operands of type `operand`.
///
/// `Boolean` operands compare as i32.
pub(crate) fn binary_op(op: BinaryOp, operand: ValueType, span: Span) -> Result<BinOp, CompileError> {
    let float = operand == ValueType::Float64;
    let selected = match op {
        BinaryOp::Add => pick(float, BinOp::I32Add, BinOp::F64Add),
        BinaryOp::Sub => pick(float, BinOp::I32Sub, BinOp::F64Sub),
        BinaryOp::Mul => pick(float, BinOp::I32Mul, BinOp::F64Mul),
        BinaryOp::Div => pick(float, BinOp::I32DivS, BinOp::F64Div),
        BinaryOp::Mod if float => {
            return Err(CompileError::unhandled_operator(
                "%",
                "modulo is not allowed with float values",
                span,
            ))
        }
        BinaryOp::Mod => BinOp::I32RemS,
        BinaryOp::Eq | BinaryOp::StrictEq => pick(float, BinOp::I32Eq, BinOp::F64Eq),
        BinaryOp::NotEq | BinaryOp::StrictNotEq => pick(float, BinOp::I32Ne, BinOp::F64Ne),
        BinaryOp::Lt => pick(float, BinOp::I32LtS, BinOp::F64Lt),
        BinaryOp::LtEq => pick(float, BinOp::I32LeS, BinOp::F64Le),
        BinaryOp::Gt => pick(float, BinOp::I32GtS, BinOp::F64Gt),
        BinaryOp::GtEq => pick(float, BinOp::I32GeS, BinOp::F64Ge),
        BinaryOp::Pow
        | BinaryOp::BitAnd
        | BinaryOp::BitOr
        | BinaryOp::BitXor
        | BinaryOp::Shl
        | BinaryOp::Shr
        | BinaryOp::UShr => {
            return Err(CompileError::unhandled_operator(
                op.as_symbol(),
                "operator is not supported",
                span,
            ))
        }
    };
    Ok(selected)
}

fn pick(float: bool, int: BinOp, double: BinOp) -> BinOp {
    if float {
        double
    } else {
        int
    }
}

/// Type both operands of `left op right` are brought to.
pub(crate) fn operand_type(left: ValueType, right: ValueType) -> ValueType {
    if left == ValueType::Float64 || right == ValueType::Float64 {
        ValueType::Float64
    } else {
        left
    }
}
