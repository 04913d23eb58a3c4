//! Per-function traversal state.

use ember_diagnostic::CompileError;
use ember_ir::ast::{Block, Expr};
use ember_ir::{SignatureTable, Span, ValueType};
use ember_types::{FunctionTypes, SymbolTable};
use ember_wasm::{Label, ValType};

use crate::{val_type, LiteralArena};

/// State threaded through the traversal of one function body.
pub(crate) struct GenContext<'a> {
    pub(crate) symbols: &'a SymbolTable,
    pub(crate) types: &'a FunctionTypes,
    pub(crate) callees: &'a SignatureTable,
    pub(crate) literals: &'a mut LiteralArena,
    slot_types: &'a [ValueType],
    /// Operands produced but not yet consumed.
    values: Vec<ember_wasm::Expr>,
    /// Statement lists of the enclosing blocks, innermost last.
    blocks: Vec<Vec<ember_wasm::Expr>>,
    next_label: u32,
    /// Scratch locals, allocated after the named slots.
    temps: Vec<ValType>,
}

impl<'a> GenContext<'a> {
    pub(crate) fn new(
        symbols: &'a SymbolTable,
        types: &'a FunctionTypes,
        callees: &'a SignatureTable,
        literals: &'a mut LiteralArena,
        slot_types: &'a [ValueType],
    ) -> Self {
        GenContext {
            symbols,
            types,
            callees,
            literals,
            slot_types,
            values: Vec::new(),
            blocks: Vec::new(),
            next_label: 0,
            temps: Vec::new(),
        }
    }

    /// Types of the scratch locals, in index order.
    pub(crate) fn into_temps(self) -> Vec<ValType> {
        self.temps
    }

    /// The whole body: the statements, then the zero value of the return
    /// type for control that falls off the end.
    pub(crate) fn function_body(&mut self, body: &Block) -> Result<ember_wasm::Expr, CompileError> {
        let result = val_type(self.types.return_type());
        self.open_block();
        self.gen_stmts(&body.stmts)?;
        let mut stmts = self.close_block(body.span)?;
        stmts.push(result.zero());
        if !self.values.is_empty() {
            return Err(CompileError::malformed(
                format!("{} operands left on the stack", self.values.len()),
                body.span,
            ));
        }
        Ok(ember_wasm::Expr::block(None, stmts, Some(result)))
    }

    pub(crate) fn push(&mut self, value: ember_wasm::Expr) {
        self.values.push(value);
    }

    pub(crate) fn pop(&mut self, span: Span) -> Result<ember_wasm::Expr, CompileError> {
        self.values
            .pop()
            .ok_or_else(|| CompileError::malformed("operand stack is empty", span))
    }

    /// Append a statement to the innermost open block.
    pub(crate) fn emit(&mut self, stmt: ember_wasm::Expr, span: Span) -> Result<(), CompileError> {
        let Some(block) = self.blocks.last_mut() else {
            return Err(CompileError::malformed("statement outside of a block", span));
        };
        block.push(stmt);
        Ok(())
    }

    pub(crate) fn open_block(&mut self) {
        self.blocks.push(Vec::new());
    }

    pub(crate) fn close_block(&mut self, span: Span) -> Result<Vec<ember_wasm::Expr>, CompileError> {
        self.blocks
            .pop()
            .ok_or_else(|| CompileError::malformed("no open block", span))
    }

    pub(crate) fn fresh_label(&mut self) -> Label {
        let label = Label(self.next_label);
        self.next_label += 1;
        label
    }

    /// Allocate a scratch local.
    pub(crate) fn temp(&mut self, ty: ValType) -> u32 {
        let index = self.slot_types.len() + self.temps.len();
        self.temps.push(ty);
        u32::try_from(index).unwrap_or(u32::MAX)
    }

    /// Inferred type of an expression.
    pub(crate) fn type_of(&self, expr: &Expr) -> Result<ValueType, CompileError> {
        self.types.expr_type(expr.id).ok_or_else(|| {
            CompileError::malformed(
                format!("{} has no inferred type", expr.kind.describe()),
                expr.span,
            )
        })
    }

    /// Slot and storage type of a variable.
    pub(crate) fn variable(&self, name: &str, span: Span) -> Result<(u32, ValueType), CompileError> {
        let slot = self
            .symbols
            .slot(name)
            .ok_or_else(|| CompileError::unknown_identifier(name, span))?;
        let ty = self
            .slot_types
            .get(slot as usize)
            .copied()
            .ok_or_else(|| CompileError::unknown_identifier(name, span))?;
        Ok((slot, ty))
    }
}
