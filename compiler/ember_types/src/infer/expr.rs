use ember_diagnostic::CompileError;
use ember_ir::ast::{AssignOp, BinaryOp, Expr, ExprKind, UnaryOp};
use ember_ir::{Span, ValueType};
use ember_stack::ensure_sufficient_stack;

use super::{expect_assignable, InferCtx};

impl InferCtx<'_> {
    pub(super) fn infer_expr(&mut self, expr: &Expr) -> Result<ValueType, CompileError> {
        ensure_sufficient_stack(|| {
            let ty = self.infer_expr_inner(expr)?;
            Ok(self.record(expr.id, ty))
        })
    }

    fn infer_expr_inner(&mut self, expr: &Expr) -> Result<ValueType, CompileError> {
        match &expr.kind {
            ExprKind::Number(value) => Ok(literal_type(*value)),
            ExprKind::Bool(_) => Ok(ValueType::Boolean),
            ExprKind::Ident(name) => self
                .types
                .variable_type(name)
                .ok_or_else(|| CompileError::unknown_identifier(name, expr.span)),
            ExprKind::Unary { op, operand } => {
                let ty = self.infer_expr(operand)?;
                match op {
                    UnaryOp::Neg | UnaryOp::Plus if ty.is_numeric() => Ok(ty),
                    UnaryOp::Neg | UnaryOp::Plus => Err(CompileError::type_failure(
                        format!("unary `{}` needs a number, found {ty}", op.as_symbol()),
                        expr.span,
                    )),
                    UnaryOp::Not if !ty.is_array() => Ok(ValueType::Boolean),
                    UnaryOp::Not => Err(CompileError::type_failure(
                        format!("cannot negate {ty}"),
                        expr.span,
                    )),
                    UnaryOp::BitNot => Err(CompileError::unhandled_operator(
                        "~",
                        "bitwise operators are not supported",
                        expr.span,
                    )),
                }
            }
            ExprKind::Binary { op, left, right } => {
                let lhs = self.infer_expr(left)?;
                let rhs = self.infer_expr(right)?;
                binary_type(*op, lhs, rhs, expr.span)
            }
            ExprKind::Logical { op, left, right } => {
                for operand in [left, right] {
                    let ty = self.infer_expr(operand)?;
                    if ty.is_array() {
                        return Err(CompileError::type_failure(
                            format!("`{}` operand cannot be {ty}", op.as_symbol()),
                            operand.span,
                        ));
                    }
                }
                Ok(ValueType::Boolean)
            }
            ExprKind::Array(elements) => {
                let mut ty = ValueType::Int32Array;
                for element in elements {
                    match self.infer_expr(element)? {
                        ValueType::Int32 => {}
                        ValueType::Float64 => ty = ValueType::Float64Array,
                        other => {
                            return Err(CompileError::type_failure(
                                format!("array elements must be numbers, found {other}"),
                                element.span,
                            ))
                        }
                    }
                }
                Ok(ty)
            }
            ExprKind::Index { object, index } => self.infer_element(object, index),
            ExprKind::Member { object, property } => {
                let ty = self.infer_expr(object)?;
                if property.name != "length" {
                    return Err(CompileError::UnsupportedMember {
                        property: property.name.clone(),
                        span: property.span,
                    });
                }
                if ty.is_array() {
                    Ok(ValueType::Int32)
                } else {
                    Err(CompileError::type_failure(
                        format!("`.length` of non-array value of type {ty}"),
                        expr.span,
                    ))
                }
            }
            ExprKind::Assign { op, target, value } => self.infer_assign(*op, target, value),
            ExprKind::Update { op, target, .. } => {
                let ty = self.infer_target(target)?;
                if !ty.is_numeric() {
                    return Err(CompileError::type_failure(
                        format!("`{}` needs a number, found {ty}", op.as_symbol()),
                        expr.span,
                    ));
                }
                Ok(ty)
            }
            ExprKind::Call { callee, args } => self.infer_call(expr, callee, args),
        }
    }

    /// `object[index]`
    fn infer_element(&mut self, object: &Expr, index: &Expr) -> Result<ValueType, CompileError> {
        let array = self.infer_expr(object)?;
        let Some(element) = array.element_type() else {
            return Err(CompileError::type_failure(
                format!("cannot index a value of type {array}"),
                object.span,
            ));
        };
        let index_ty = self.infer_expr(index)?;
        if index_ty != ValueType::Int32 {
            return Err(CompileError::type_failure(
                format!("array index must be {}, found {index_ty}", ValueType::Int32),
                index.span,
            ));
        }
        Ok(element)
    }

    /// Type of an existing assignable location (read-modify-write targets).
    fn infer_target(&mut self, target: &Expr) -> Result<ValueType, CompileError> {
        let ty = match &target.kind {
            ExprKind::Ident(name) if !self.symbols.contains(name) => {
                return Err(CompileError::unknown_identifier(name, target.span));
            }
            ExprKind::Ident(_) | ExprKind::Index { .. } => self.infer_expr(target)?,
            ExprKind::Member { .. } => return Err(read_only_length(target.span)),
            _ => {
                return Err(CompileError::malformed(
                    format!("{} is not assignable", target.kind.describe()),
                    target.span,
                ))
            }
        };
        Ok(ty)
    }

    fn infer_assign(
        &mut self,
        op: AssignOp,
        target: &Expr,
        value: &Expr,
    ) -> Result<ValueType, CompileError> {
        match op {
            AssignOp::Assign => {
                if let ExprKind::Ident(name) = &target.kind {
                    let ty = self.infer_expr(value)?;
                    let ty = self.bind(name, ty, value.span)?;
                    return Ok(self.record(target.id, ty));
                }
                let slot = self.infer_target(target)?;
                let ty = self.infer_expr(value)?;
                expect_assignable(ty, slot, value.span, || "array element".to_owned())?;
                Ok(slot)
            }
            AssignOp::Compound(binary) => {
                let slot = self.infer_target(target)?;
                let rhs = self.infer_expr(value)?;
                let result = binary_type(binary, slot, rhs, value.span)?;
                let what = if matches!(target.kind, ExprKind::Ident(_)) {
                    "variable"
                } else {
                    "array element"
                };
                expect_assignable(result, slot, value.span, || what.to_owned())?;
                Ok(slot)
            }
        }
    }

    fn infer_call(
        &mut self,
        call: &Expr,
        callee: &Expr,
        args: &[Expr],
    ) -> Result<ValueType, CompileError> {
        let ExprKind::Ident(name) = &callee.kind else {
            return Err(CompileError::type_failure(
                "only functions declared by name can be called",
                callee.span,
            ));
        };
        let callees = self.callees;
        let Some(signature) = callees.get(name) else {
            return Err(CompileError::UnknownFunction {
                name: name.clone(),
                span: callee.span,
            });
        };
        if signature.arity() != args.len() {
            return Err(CompileError::ArgumentCountMismatch {
                name: name.clone(),
                expected: signature.arity(),
                found: args.len(),
                span: call.span,
            });
        }
        for (position, (arg, param)) in args.iter().zip(&signature.parameters).enumerate() {
            let ty = self.infer_expr(arg)?;
            expect_assignable(ty, *param, arg.span, || {
                format!("argument {position} of `{name}`")
            })?;
        }
        Ok(signature.returns)
    }
}

fn read_only_length(span: Span) -> CompileError {
    CompileError::type_failure("array `.length` cannot be assigned", span)
}

/// Integral literals are `Int32`; anything else, or anything outside the
/// `i32` range, is `Float64`.
pub(crate) fn literal_type(value: f64) -> ValueType {
    if value.fract() == 0.0 && value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX) {
        ValueType::Int32
    } else {
        ValueType::Float64
    }
}

fn binary_type(
    op: BinaryOp,
    lhs: ValueType,
    rhs: ValueType,
    span: Span,
) -> Result<ValueType, CompileError> {
    let mismatch = || {
        CompileError::type_failure(
            format!("`{}` cannot combine {lhs} and {rhs}", op.as_symbol()),
            span,
        )
    };
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            let common = lhs.common_type(rhs).map_err(|_| mismatch())?;
            if !common.is_numeric() {
                return Err(mismatch());
            }
            if op == BinaryOp::Mod && common == ValueType::Float64 {
                return Err(CompileError::unhandled_operator(
                    "%",
                    "modulo is not allowed with float values",
                    span,
                ));
            }
            Ok(common)
        }
        BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::StrictEq | BinaryOp::StrictNotEq
            if lhs == ValueType::Boolean && rhs == ValueType::Boolean =>
        {
            Ok(ValueType::Boolean)
        }
        BinaryOp::Eq
        | BinaryOp::NotEq
        | BinaryOp::StrictEq
        | BinaryOp::StrictNotEq
        | BinaryOp::Lt
        | BinaryOp::LtEq
        | BinaryOp::Gt
        | BinaryOp::GtEq => match lhs.common_type(rhs) {
            Ok(common) if common.is_numeric() => Ok(ValueType::Boolean),
            _ => Err(mismatch()),
        },
        BinaryOp::Pow
        | BinaryOp::BitAnd
        | BinaryOp::BitOr
        | BinaryOp::BitXor
        | BinaryOp::Shl
        | BinaryOp::Shr
        | BinaryOp::UShr => Err(CompileError::unhandled_operator(
            op.as_symbol(),
            "operator is not supported",
            span,
        )),
    }
}
