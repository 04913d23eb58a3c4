//! Binary encoding with `wasm-encoder`.

use ember_stack::ensure_sufficient_stack;
use rustc_hash::FxHashMap;
use wasm_encoder::{
    BlockType, CodeSection, EntityType, ExportKind, ExportSection, FunctionSection,
    ImportSection, Instruction, MemArg, MemoryType, TypeSection,
};

use crate::{BinOp, Expr, Label, Module, UnOp, ValType};

/// A module that cannot be encoded. Always a bug in whoever built it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EmitError {
    #[error("call to unknown function `{0}`")]
    UnknownFunction(String),
    #[error("branch to {0} outside of its block")]
    UnknownLabel(Label),
    #[error("export `{export}` names unknown function `{function}`")]
    UnknownExport { export: String, function: String },
}

pub(crate) fn encode(module: &Module) -> Result<Vec<u8>, EmitError> {
    let mut types = TypeSection::new();
    let mut imports = ImportSection::new();
    let mut functions = FunctionSection::new();
    let mut exports = ExportSection::new();
    let mut code = CodeSection::new();

    if let Some(memory) = module.memory() {
        imports.import(
            &memory.module,
            &memory.name,
            EntityType::Memory(MemoryType {
                minimum: u64::from(memory.min_pages),
                maximum: None,
                memory64: false,
                shared: false,
                page_size_log2: None,
            }),
        );
    }

    let mut signatures: FxHashMap<(Vec<ValType>, Option<ValType>), u32> = FxHashMap::default();
    for function in module.functions() {
        let key = (function.params.clone(), function.result);
        let next = u32::try_from(signatures.len()).unwrap_or(u32::MAX);
        let type_index = *signatures.entry(key).or_insert_with(|| {
            types.ty().function(
                function.params.iter().map(|ty| wasm_type(*ty)),
                function.result.map(wasm_type),
            );
            next
        });
        functions.function(type_index);
    }

    for (export, function) in module.exports() {
        let index = module
            .function_index(function)
            .ok_or_else(|| EmitError::UnknownExport {
                export: export.to_owned(),
                function: function.to_owned(),
            })?;
        exports.export(export, ExportKind::Func, index);
    }

    for function in module.functions() {
        let mut body = wasm_encoder::Function::new(group_locals(&function.locals));
        let mut emitter = BodyEmitter {
            module,
            labels: Vec::new(),
            out: &mut body,
        };
        emitter.expr(&function.body)?;
        body.instruction(&Instruction::End);
        code.function(&body);
    }

    let mut wasm = wasm_encoder::Module::new();
    wasm.section(&types)
        .section(&imports)
        .section(&functions)
        .section(&exports)
        .section(&code);
    Ok(wasm.finish())
}

fn wasm_type(ty: ValType) -> wasm_encoder::ValType {
    match ty {
        ValType::I32 => wasm_encoder::ValType::I32,
        ValType::F64 => wasm_encoder::ValType::F64,
    }
}

/// Run-length encode local declarations.
fn group_locals(locals: &[ValType]) -> Vec<(u32, wasm_encoder::ValType)> {
    let mut groups: Vec<(u32, ValType)> = Vec::new();
    for &ty in locals {
        match groups.last_mut() {
            Some((count, last)) if *last == ty => *count += 1,
            _ => groups.push((1, ty)),
        }
    }
    groups
        .into_iter()
        .map(|(count, ty)| (count, wasm_type(ty)))
        .collect()
}

fn block_type(ty: Option<ValType>) -> BlockType {
    ty.map_or(BlockType::Empty, |ty| BlockType::Result(wasm_type(ty)))
}

fn mem_arg(ty: ValType, offset: u32) -> MemArg {
    MemArg {
        offset: u64::from(offset),
        align: match ty {
            ValType::I32 => 2,
            ValType::F64 => 3,
        },
        memory_index: 0,
    }
}

struct BodyEmitter<'a> {
    module: &'a Module,
    /// Enclosing control constructs, innermost last. `None` for constructs
    /// without a label (`if`, unlabeled blocks).
    labels: Vec<Option<Label>>,
    out: &'a mut wasm_encoder::Function,
}

impl BodyEmitter<'_> {
    fn ins(&mut self, instruction: &Instruction<'_>) {
        self.out.instruction(instruction);
    }

    fn depth(&self, label: Label) -> Result<u32, EmitError> {
        self.labels
            .iter()
            .rev()
            .position(|l| *l == Some(label))
            .and_then(|depth| u32::try_from(depth).ok())
            .ok_or(EmitError::UnknownLabel(label))
    }

    /// Emit `body` inside a control construct and close it with `end`.
    fn scoped(
        &mut self,
        label: Option<Label>,
        body: impl FnOnce(&mut Self) -> Result<(), EmitError>,
    ) -> Result<(), EmitError> {
        self.labels.push(label);
        let result = body(self);
        self.labels.pop();
        result?;
        self.ins(&Instruction::End);
        Ok(())
    }

    fn expr(&mut self, expr: &Expr) -> Result<(), EmitError> {
        ensure_sufficient_stack(|| self.expr_inner(expr))
    }

    fn expr_inner(&mut self, expr: &Expr) -> Result<(), EmitError> {
        match expr {
            Expr::I32Const(value) => self.ins(&Instruction::I32Const(*value)),
            Expr::F64Const(value) => self.ins(&Instruction::F64Const(*value)),
            Expr::LocalGet(index) => self.ins(&Instruction::LocalGet(*index)),
            Expr::LocalSet { index, value } => {
                self.expr(value)?;
                self.ins(&Instruction::LocalSet(*index));
            }
            Expr::LocalTee { index, value } => {
                self.expr(value)?;
                self.ins(&Instruction::LocalTee(*index));
            }
            Expr::Binary { op, left, right } => {
                self.expr(left)?;
                self.expr(right)?;
                self.ins(&binary_instruction(*op));
            }
            Expr::Unary { op, operand } => {
                self.expr(operand)?;
                self.ins(&match op {
                    UnOp::I32Eqz => Instruction::I32Eqz,
                    UnOp::F64ConvertI32S => Instruction::F64ConvertI32S,
                });
            }
            Expr::Load {
                ty,
                offset,
                address,
            } => {
                self.expr(address)?;
                let arg = mem_arg(*ty, *offset);
                self.ins(&match ty {
                    ValType::I32 => Instruction::I32Load(arg),
                    ValType::F64 => Instruction::F64Load(arg),
                });
            }
            Expr::Store {
                ty,
                offset,
                address,
                value,
            } => {
                self.expr(address)?;
                self.expr(value)?;
                let arg = mem_arg(*ty, *offset);
                self.ins(&match ty {
                    ValType::I32 => Instruction::I32Store(arg),
                    ValType::F64 => Instruction::F64Store(arg),
                });
            }
            Expr::Block { label, body, ty } => {
                self.ins(&Instruction::Block(block_type(*ty)));
                self.scoped(*label, |e| body.iter().try_for_each(|item| e.expr(item)))?;
            }
            Expr::If {
                condition,
                then,
                otherwise,
                ty,
            } => {
                self.expr(condition)?;
                self.ins(&Instruction::If(block_type(*ty)));
                self.scoped(None, |e| {
                    e.expr(then)?;
                    if let Some(otherwise) = otherwise {
                        e.ins(&Instruction::Else);
                        e.expr(otherwise)?;
                    }
                    Ok(())
                })?;
            }
            Expr::Loop { label, body } => {
                self.ins(&Instruction::Loop(BlockType::Empty));
                self.scoped(Some(*label), |e| e.expr(body))?;
            }
            Expr::Break { label, condition } => {
                if let Some(condition) = condition {
                    self.expr(condition)?;
                    let depth = self.depth(*label)?;
                    self.ins(&Instruction::BrIf(depth));
                } else {
                    let depth = self.depth(*label)?;
                    self.ins(&Instruction::Br(depth));
                }
            }
            Expr::Call { target, args } => {
                for arg in args {
                    self.expr(arg)?;
                }
                let index = self
                    .module
                    .function_index(target)
                    .ok_or_else(|| EmitError::UnknownFunction(target.clone()))?;
                self.ins(&Instruction::Call(index));
            }
            Expr::Return(value) => {
                if let Some(value) = value {
                    self.expr(value)?;
                }
                self.ins(&Instruction::Return);
            }
            Expr::Drop(value) => {
                self.expr(value)?;
                self.ins(&Instruction::Drop);
            }
            Expr::Nop => self.ins(&Instruction::Nop),
        }
        Ok(())
    }
}

fn binary_instruction(op: BinOp) -> Instruction<'static> {
    match op {
        BinOp::I32Add => Instruction::I32Add,
        BinOp::I32Sub => Instruction::I32Sub,
        BinOp::I32Mul => Instruction::I32Mul,
        BinOp::I32DivS => Instruction::I32DivS,
        BinOp::I32RemS => Instruction::I32RemS,
        BinOp::I32Eq => Instruction::I32Eq,
        BinOp::I32Ne => Instruction::I32Ne,
        BinOp::I32LtS => Instruction::I32LtS,
        BinOp::I32LeS => Instruction::I32LeS,
        BinOp::I32GtS => Instruction::I32GtS,
        BinOp::I32GeS => Instruction::I32GeS,
        BinOp::F64Add => Instruction::F64Add,
        BinOp::F64Sub => Instruction::F64Sub,
        BinOp::F64Mul => Instruction::F64Mul,
        BinOp::F64Div => Instruction::F64Div,
        BinOp::F64Eq => Instruction::F64Eq,
        BinOp::F64Ne => Instruction::F64Ne,
        BinOp::F64Lt => Instruction::F64Lt,
        BinOp::F64Le => Instruction::F64Le,
        BinOp::F64Gt => Instruction::F64Gt,
        BinOp::F64Ge => Instruction::F64Ge,
    }
}
