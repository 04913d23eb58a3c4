//! Expression lowering.
//!
//! `gen_expr` leaves exactly one operand on the stack; its callers pop it.
//! Assignments and updates are lowered either for their value or, in
//! statement position, for their effect only.

use ember_diagnostic::CompileError;
use ember_ir::ast::{AssignOp, BinaryOp, Expr, ExprKind, Ident, LogicalOp, UnaryOp, UpdateOp};
use ember_ir::{Span, ValueType};
use ember_stack::ensure_sufficient_stack;
use ember_wasm::{BinOp, ValType};

use crate::context::GenContext;
use crate::operators::{binary_op, boolean, coerce, condition, negate, not, one, operand_type};
use crate::val_type;

type Ir = ember_wasm::Expr;

impl GenContext<'_> {
    pub(crate) fn gen_expr(&mut self, expr: &Expr) -> Result<(), CompileError> {
        ensure_sufficient_stack(|| {
            let value = self.lower(expr)?;
            self.push(value);
            Ok(())
        })
    }

    /// Generate `expr` and take its value off the stack.
    pub(crate) fn value(&mut self, expr: &Expr) -> Result<Ir, CompileError> {
        self.gen_expr(expr)?;
        self.pop(expr.span)
    }

    /// Value of `expr` converted for a position of type `to`.
    pub(crate) fn value_as(&mut self, expr: &Expr, to: ValueType) -> Result<Ir, CompileError> {
        let from = self.type_of(expr)?;
        let value = self.value(expr)?;
        Ok(coerce(value, from, to))
    }

    /// Lower an expression statement, discarding any value.
    pub(crate) fn gen_effect(&mut self, expr: &Expr) -> Result<(), CompileError> {
        let effect = match &expr.kind {
            ExprKind::Assign { op, target, value } => {
                self.assign(*op, target, value, false, expr.span)?
            }
            ExprKind::Update { op, prefix, target } => {
                self.update(*op, *prefix, target, false, expr.span)?
            }
            _ => Ir::drop_value(self.value(expr)?),
        };
        self.emit(effect, expr.span)
    }

    fn lower(&mut self, expr: &Expr) -> Result<Ir, CompileError> {
        match &expr.kind {
            ExprKind::Number(value) => self.number(*value, expr),
            ExprKind::Bool(value) => Ok(Ir::I32Const(i32::from(*value))),
            ExprKind::Ident(name) => {
                let (slot, _) = self.variable(name, expr.span)?;
                Ok(Ir::local_get(slot))
            }
            ExprKind::Unary { op, operand } => {
                let ty = self.type_of(operand)?;
                self.gen_expr(operand)?;
                let value = self.pop(operand.span)?;
                match op {
                    UnaryOp::Neg => Ok(negate(value, ty)),
                    UnaryOp::Plus => Ok(value),
                    UnaryOp::Not => Ok(not(value, ty)),
                    UnaryOp::BitNot => Err(CompileError::unhandled_operator(
                        op.as_symbol(),
                        "bitwise operators are not supported",
                        expr.span,
                    )),
                }
            }
            ExprKind::Binary { op, left, right } => self.binary(*op, left, right, expr.span),
            ExprKind::Logical { op, left, right } => self.logical(*op, left, right),
            ExprKind::Array(elements) => self.array_literal(expr, elements),
            ExprKind::Index { object, index } => {
                let ty = self.type_of(expr)?;
                let address = self.element_address(object, index)?;
                Ok(Ir::load(val_type(ty), address))
            }
            ExprKind::Member { object, property } => self.length(object, property),
            ExprKind::Assign { op, target, value } => {
                self.assign(*op, target, value, true, expr.span)
            }
            ExprKind::Update { op, prefix, target } => {
                self.update(*op, *prefix, target, true, expr.span)
            }
            ExprKind::Call { callee, args } => self.call(callee, args, expr.span),
        }
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "Int32 literals are integral and in range"
    )]
    fn number(&self, value: f64, expr: &Expr) -> Result<Ir, CompileError> {
        match self.type_of(expr)? {
            ValueType::Int32 => Ok(Ir::I32Const(value as i32)),
            ValueType::Float64 => Ok(Ir::F64Const(value)),
            other => Err(CompileError::malformed(
                format!("number literal typed as {other}"),
                expr.span,
            )),
        }
    }

    fn binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        span: Span,
    ) -> Result<Ir, CompileError> {
        let (lhs, rhs) = (self.type_of(left)?, self.type_of(right)?);
        let operand = operand_type(lhs, rhs);
        let instruction = binary_op(op, operand, span)?;
        self.gen_expr(left)?;
        self.gen_expr(right)?;
        let r = self.pop(right.span)?;
        let l = self.pop(left.span)?;
        Ok(Ir::binary(
            instruction,
            coerce(l, lhs, operand),
            coerce(r, rhs, operand),
        ))
    }

    /// `&&` and `||` short-circuit and produce `0` or `1`.
    fn logical(&mut self, op: LogicalOp, left: &Expr, right: &Expr) -> Result<Ir, CompileError> {
        let (lhs, rhs) = (self.type_of(left)?, self.type_of(right)?);
        let test = condition(self.value(left)?, lhs);
        let other = boolean(self.value(right)?, rhs);
        Ok(match op {
            LogicalOp::And => Ir::if_(test, other, Some(Ir::I32Const(0)), Some(ValType::I32)),
            LogicalOp::Or => Ir::if_(test, Ir::I32Const(1), Some(other), Some(ValType::I32)),
        })
    }

    /// Write the literal into its static region and yield the base address.
    fn array_literal(&mut self, expr: &Expr, elements: &[Expr]) -> Result<Ir, CompileError> {
        let (element, stride) = element_layout(self.type_of(expr)?, expr.span)?;
        let too_large =
            || CompileError::malformed("array literal does not fit in memory", expr.span);
        let length = u32::try_from(elements.len()).map_err(|_| too_large())?;
        let base = self.literals.allocate(stride.unsigned_abs(), length);
        let address = |index: usize| -> Result<i32, CompileError> {
            let offset = i64::from(stride) * (i64::try_from(index).map_err(|_| too_large())? + 1);
            i32::try_from(i64::from(base) + offset).map_err(|_| too_large())
        };

        let base_address = i32::try_from(base).map_err(|_| too_large())?;
        let mut body = Vec::with_capacity(elements.len() + 2);
        body.push(Ir::store(
            ValType::I32,
            Ir::I32Const(base_address),
            Ir::I32Const(i32::try_from(length).map_err(|_| too_large())?),
        ));
        for (index, item) in elements.iter().enumerate() {
            let value = self.value_as(item, element)?;
            body.push(Ir::store(
                val_type(element),
                Ir::I32Const(address(index)?),
                value,
            ));
        }
        body.push(Ir::I32Const(base_address));
        tracing::trace!(base, length, "array literal placed");
        Ok(Ir::block(None, body, Some(ValType::I32)))
    }

    /// `object[index]` as a byte address: `base + stride * (index + 1)`.
    pub(crate) fn element_address(
        &mut self,
        object: &Expr,
        index: &Expr,
    ) -> Result<Ir, CompileError> {
        let (_, stride) = element_layout(self.type_of(object)?, object.span)?;
        let base = self.value(object)?;
        let index = self.value(index)?;
        Ok(Ir::binary(
            BinOp::I32Add,
            base,
            Ir::binary(
                BinOp::I32Mul,
                Ir::binary(BinOp::I32Add, index, Ir::I32Const(1)),
                Ir::I32Const(stride),
            ),
        ))
    }

    /// `array.length` reads the length word at the base address.
    fn length(&mut self, object: &Expr, property: &Ident) -> Result<Ir, CompileError> {
        if property.name != "length" {
            return Err(CompileError::UnsupportedMember {
                property: property.name.clone(),
                span: property.span,
            });
        }
        let ty = self.type_of(object)?;
        if !ty.is_array() {
            return Err(CompileError::type_failure(
                format!("`.length` of non-array value of type {ty}"),
                object.span,
            ));
        }
        Ok(Ir::load(ValType::I32, self.value(object)?))
    }

    fn assign(
        &mut self,
        op: AssignOp,
        target: &Expr,
        value: &Expr,
        keep: bool,
        span: Span,
    ) -> Result<Ir, CompileError> {
        match &target.kind {
            ExprKind::Ident(name) => {
                let (slot, ty) = self.variable(name, target.span)?;
                let new = match op {
                    AssignOp::Assign => self.value_as(value, ty)?,
                    AssignOp::Compound(binary) => {
                        let instruction = binary_op(binary, ty, span)?;
                        let rhs = self.value_as(value, ty)?;
                        Ir::binary(instruction, Ir::local_get(slot), rhs)
                    }
                };
                Ok(if keep {
                    Ir::local_tee(slot, new)
                } else {
                    Ir::local_set(slot, new)
                })
            }
            ExprKind::Index { object, index } => {
                let element = self.type_of(target)?;
                let ty = val_type(element);
                let address = self.element_address(object, index)?;
                match op {
                    AssignOp::Assign => {
                        let value = self.value_as(value, element)?;
                        Ok(self.store_element(Vec::new(), ty, (address, value), keep))
                    }
                    AssignOp::Compound(binary) => {
                        let instruction = binary_op(binary, element, span)?;
                        let at = self.temp(ValType::I32);
                        let prelude = vec![Ir::local_set(at, address)];
                        let rhs = self.value_as(value, element)?;
                        let new = Ir::binary(instruction, Ir::load(ty, Ir::local_get(at)), rhs);
                        Ok(self.store_element(prelude, ty, (Ir::local_get(at), new), keep))
                    }
                }
            }
            ExprKind::Member { .. } => Err(CompileError::type_failure(
                "array `.length` cannot be assigned",
                target.span,
            )),
            _ => Err(CompileError::malformed(
                format!("{} is not assignable", target.kind.describe()),
                target.span,
            )),
        }
    }

    /// Finish an element store started by `prelude`: store `value` at
    /// `address`, then yield the stored value when `keep` is set.
    fn store_element(
        &mut self,
        mut prelude: Vec<Ir>,
        ty: ValType,
        (address, value): (Ir, Ir),
        keep: bool,
    ) -> Ir {
        if !keep && prelude.is_empty() {
            return Ir::store(ty, address, value);
        }
        if keep {
            let stored = self.temp(ty);
            prelude.push(Ir::store(ty, address, Ir::local_tee(stored, value)));
            prelude.push(Ir::local_get(stored));
            Ir::block(None, prelude, Some(ty))
        } else {
            prelude.push(Ir::store(ty, address, value));
            Ir::block(None, prelude, None)
        }
    }

    fn update(
        &mut self,
        op: UpdateOp,
        prefix: bool,
        target: &Expr,
        keep: bool,
        span: Span,
    ) -> Result<Ir, CompileError> {
        let ty = self.type_of(target)?;
        let instruction = binary_op(op.binary_op(), ty, span)?;
        let wasm_ty = val_type(ty);
        match &target.kind {
            ExprKind::Ident(name) => {
                let (slot, _) = self.variable(name, target.span)?;
                let new = Ir::binary(instruction, Ir::local_get(slot), one(ty));
                Ok(match (keep, prefix) {
                    (false, _) => Ir::local_set(slot, new),
                    (true, true) => Ir::local_tee(slot, new),
                    (true, false) => {
                        let old = self.temp(wasm_ty);
                        Ir::block(
                            None,
                            vec![
                                Ir::local_set(old, Ir::local_get(slot)),
                                Ir::local_set(slot, new),
                                Ir::local_get(old),
                            ],
                            Some(wasm_ty),
                        )
                    }
                })
            }
            ExprKind::Index { object, index } => {
                let address = self.element_address(object, index)?;
                let at = self.temp(ValType::I32);
                let current = Ir::load(wasm_ty, Ir::local_get(at));
                if keep && !prefix {
                    let old = self.temp(wasm_ty);
                    return Ok(Ir::block(
                        None,
                        vec![
                            Ir::local_set(at, address),
                            Ir::local_set(old, current),
                            Ir::store(
                                wasm_ty,
                                Ir::local_get(at),
                                Ir::binary(instruction, Ir::local_get(old), one(ty)),
                            ),
                            Ir::local_get(old),
                        ],
                        Some(wasm_ty),
                    ));
                }
                let prelude = vec![Ir::local_set(at, address)];
                let new = Ir::binary(instruction, current, one(ty));
                Ok(self.store_element(prelude, wasm_ty, (Ir::local_get(at), new), keep))
            }
            ExprKind::Member { .. } => Err(CompileError::type_failure(
                "array `.length` cannot be assigned",
                target.span,
            )),
            _ => Err(CompileError::malformed(
                format!("{} is not assignable", target.kind.describe()),
                target.span,
            )),
        }
    }

    /// Direct call; arguments are evaluated left to right and converted to
    /// the callee's parameter types.
    fn call(&mut self, callee: &Expr, args: &[Expr], span: Span) -> Result<Ir, CompileError> {
        let ExprKind::Ident(name) = &callee.kind else {
            return Err(CompileError::type_failure(
                "only functions declared by name can be called",
                callee.span,
            ));
        };
        let callees = self.callees;
        let signature = callees.get(name).ok_or_else(|| CompileError::UnknownFunction {
            name: name.clone(),
            span: callee.span,
        })?;
        if signature.arity() != args.len() {
            return Err(CompileError::ArgumentCountMismatch {
                name: name.clone(),
                expected: signature.arity(),
                found: args.len(),
                span,
            });
        }
        let mut values = Vec::with_capacity(args.len());
        for (arg, param) in args.iter().zip(&signature.parameters) {
            values.push(self.value_as(arg, *param)?);
        }
        Ok(Ir::call(name.as_str(), values))
    }
}

/// Element type and byte stride of an array type.
fn element_layout(array: ValueType, span: Span) -> Result<(ValueType, i32), CompileError> {
    match array {
        ValueType::Int32Array => Ok((ValueType::Int32, 4)),
        ValueType::Float64Array => Ok((ValueType::Float64, 8)),
        other => Err(CompileError::type_failure(
            format!("cannot index a value of type {other}"),
            span,
        )),
    }
}
