//! Type inference.
//!
//! A single structural pass over a function body, in source order. Each
//! variable's type is fixed by its first initialized declaration or first
//! assignment; later stores must be assignable to it (`Int32` values widen
//! into `Float64` variables, nothing else converts). Calls are typed from
//! the callee's declared signature, never by inferring the callee.

mod expr;
mod stmt;

#[cfg(test)]
mod tests;

use ember_diagnostic::CompileError;
use ember_ir::ast::Function;
use ember_ir::{ExprId, Signature, SignatureTable, Span, ValueType};
use rustc_hash::FxHashMap;

use crate::SymbolTable;

/// Inferred types for one function.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FunctionTypes {
    expr_types: FxHashMap<ExprId, ValueType>,
    variables: FxHashMap<String, ValueType>,
    params: Vec<ValueType>,
    return_type: Option<ValueType>,
}

impl FunctionTypes {
    /// Type of an expression node.
    pub fn expr_type(&self, id: ExprId) -> Option<ValueType> {
        self.expr_types.get(&id).copied()
    }

    /// Type of a parameter or local.
    pub fn variable_type(&self, name: &str) -> Option<ValueType> {
        self.variables.get(name).copied()
    }

    pub fn params(&self) -> &[ValueType] {
        &self.params
    }

    /// Declared return type.
    pub fn return_type(&self) -> ValueType {
        self.return_type.unwrap_or(ValueType::Int32)
    }

    /// Storage type of every slot.
    ///
    /// A local that is declared but never assigned has no inferred type and
    /// is stored as `Int32`.
    pub fn slot_types(&self, symbols: &SymbolTable) -> Vec<ValueType> {
        let params = self.params.iter().copied();
        let locals = symbols
            .locals()
            .iter()
            .map(|name| self.variable_type(name).unwrap_or(ValueType::Int32));
        params.chain(locals).collect()
    }

    /// Whether the function reads or writes linear memory.
    pub fn uses_memory(&self) -> bool {
        self.params.iter().any(|ty| ty.is_array())
            || self.expr_types.values().any(|ty| ty.is_array())
    }
}

/// Infer the types of `function`'s body.
///
/// `callees` holds the signature of every function that may be called,
/// including `function` itself.
#[tracing::instrument(level = "debug", skip_all, fields(params = signature.arity()))]
pub fn infer_function(
    function: &Function,
    symbols: &SymbolTable,
    signature: &Signature,
    callees: &SignatureTable,
) -> Result<FunctionTypes, CompileError> {
    let mut cx = InferCtx::new(symbols, signature, callees);
    for (slot, ty) in (0..symbols.param_count()).zip(&signature.parameters) {
        if let Some(name) = symbols.name(slot) {
            cx.types.variables.entry(name.to_owned()).or_insert(*ty);
        }
    }
    cx.infer_block(&function.body)?;
    tracing::debug!(
        exprs = cx.types.expr_types.len(),
        variables = cx.types.variables.len(),
        "inferred"
    );
    Ok(cx.types)
}

/// State of one inference run.
pub(crate) struct InferCtx<'a> {
    symbols: &'a SymbolTable,
    callees: &'a SignatureTable,
    types: FunctionTypes,
}

impl<'a> InferCtx<'a> {
    fn new(symbols: &'a SymbolTable, signature: &Signature, callees: &'a SignatureTable) -> Self {
        InferCtx {
            symbols,
            callees,
            types: FunctionTypes {
                params: signature.parameters.clone(),
                return_type: Some(signature.returns),
                ..FunctionTypes::default()
            },
        }
    }

    fn record(&mut self, id: ExprId, ty: ValueType) -> ValueType {
        self.types.expr_types.insert(id, ty);
        ty
    }

    /// Record the type of a variable, or check a store against it.
    fn bind(&mut self, name: &str, ty: ValueType, span: Span) -> Result<ValueType, CompileError> {
        if !self.symbols.contains(name) {
            return Err(CompileError::unknown_identifier(name, span));
        }
        match self.types.variables.get(name) {
            Some(&existing) => {
                expect_assignable(ty, existing, span, || format!("variable `{name}`"))?;
                Ok(existing)
            }
            None => {
                tracing::trace!(name, %ty, "variable typed");
                self.types.variables.insert(name.to_owned(), ty);
                Ok(ty)
            }
        }
    }
}

/// Fail unless a `value` can be stored where `target` is expected.
fn expect_assignable(
    value: ValueType,
    target: ValueType,
    span: Span,
    what: impl FnOnce() -> String,
) -> Result<(), CompileError> {
    if value.is_assignable_to(target) {
        return Ok(());
    }
    let message = if value == ValueType::Float64 && target == ValueType::Int32 {
        format!("unable to assign a double value to {} of type {target}", what())
    } else {
        format!("cannot assign {value} to {} of type {target}", what())
    };
    Err(CompileError::type_failure(message, span))
}

/// Conditions may be any scalar.
fn expect_condition(ty: ValueType, span: Span) -> Result<(), CompileError> {
    if ty.is_array() {
        Err(CompileError::type_failure(
            format!("{ty} cannot be used as a condition"),
            span,
        ))
    } else {
        Ok(())
    }
}
