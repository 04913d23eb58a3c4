//! Code generation: typed AST to the `ember_wasm` expression tree.
//!
//! One [`GenContext`](context::GenContext) per function holds everything a
//! traversal mutates: the operand stack, the stack of open statement lists,
//! label and temporary allocation. Nothing survives between functions
//! except the module-wide [`LiteralArena`].
//!
//! # Value representation
//!
//! | Source type    | Wasm | Notes                                  |
//! |----------------|------|----------------------------------------|
//! | `Int32`        | i32  |                                        |
//! | `Boolean`      | i32  | `0` or `1`                             |
//! | `Float64`      | f64  |                                        |
//! | `Int32Array`   | i32  | byte address of the length word        |
//! | `Float64Array` | i32  | byte address of the length word        |
//!
//! Element `i` of an array at `base` lives at `base + stride * (i + 1)`.
//! No bounds check is emitted.

mod context;
mod expr;
mod literals;
mod operators;
mod stmt;


use ember_diagnostic::CompileError;
use ember_ir::ast::{Binding, Function};
use ember_ir::{SignatureTable, ValueType};
use ember_types::{FunctionTypes, SymbolTable};

use crate::context::GenContext;

pub use literals::LiteralArena;

/// Wasm representation of a source type.
pub fn val_type(ty: ValueType) -> ember_wasm::ValType {
    match ty {
        ValueType::Float64 => ember_wasm::ValType::F64,
        ValueType::Int32
        | ValueType::Boolean
        | ValueType::Int32Array
        | ValueType::Float64Array => ember_wasm::ValType::I32,
    }
}

/// Generate the body of `function`.
///
/// `callees` must hold the signature of every function the body calls.
/// Array literals are placed in `literals`, which is shared by all
/// functions of a module.
#[tracing::instrument(level = "debug", skip_all, fields(function = tracing::field::Empty))]
pub fn generate_function(
    function: &Function,
    symbols: &SymbolTable,
    types: &FunctionTypes,
    callees: &SignatureTable,
    literals: &mut LiteralArena,
) -> Result<ember_wasm::Function, CompileError> {
    let Some(name) = &function.name else {
        return Err(CompileError::UnnamedFunction {
            span: function.span,
        });
    };
    tracing::Span::current().record("function", name.name.as_str());
    if let Some(pattern) = function
        .params
        .iter()
        .find(|param| matches!(param, Binding::Pattern(_)))
    {
        return Err(CompileError::NonIdentifierBinding {
            span: pattern.span(),
        });
    }

    let slot_types = types.slot_types(symbols);
    let mut cx = GenContext::new(symbols, types, callees, literals, &slot_types);
    let body = cx.function_body(&function.body)?;

    let param_count = symbols.param_count() as usize;
    let mut locals: Vec<_> = slot_types
        .iter()
        .skip(param_count)
        .map(|ty| val_type(*ty))
        .collect();
    locals.extend(cx.into_temps());

    let generated = ember_wasm::Function {
        name: name.name.clone(),
        params: types.params().iter().map(|ty| val_type(*ty)).collect(),
        result: Some(val_type(types.return_type())),
        locals,
        body,
    };
    tracing::trace!(%generated, "generated");
    Ok(generated)
}
