//! The compilation pipeline.

use ember_codegen::{generate_function, LiteralArena};
use ember_diagnostic::CompileError;
use ember_ir::ast::{Function, Program};
use ember_ir::{Signature, SignatureTable};
use ember_rt::{EntryPoints, MemoryUse};
use ember_types::{infer_function, SymbolTable};
use ember_wasm::PAGE_SIZE;
use rustc_hash::FxHashSet;

use crate::CompileConfig;

/// A validated binary with what is needed to call into it.
#[derive(Clone, Debug)]
pub struct CompiledModule {
    binary: Vec<u8>,
    signatures: SignatureTable,
    memory: MemoryUse,
}

impl CompiledModule {
    /// The WebAssembly binary.
    pub fn binary(&self) -> &[u8] {
        &self.binary
    }

    /// Signatures of the functions the module exports.
    pub fn signatures(&self) -> &SignatureTable {
        &self.signatures
    }

    pub fn memory_use(&self) -> MemoryUse {
        self.memory
    }

    /// Load into a wasmtime host.
    pub fn load(self) -> Result<EntryPoints, CompileError> {
        EntryPoints::load(&self.binary, self.signatures, self.memory).map_err(|err| {
            CompileError::InvalidModule {
                message: err.to_string(),
            }
        })
    }
}

/// Compile `source` and load it, ready to be called.
pub fn compile(
    source: &str,
    signatures: &SignatureTable,
    config: &CompileConfig,
) -> Result<EntryPoints, CompileError> {
    compile_module(source, signatures, config)?.load()
}

/// Compile every function in `source` into one module.
///
/// Each function needs a signature in `signatures`; signatures that name
/// no function in the source are ignored. A function can only call
/// functions of the same source.
#[tracing::instrument(level = "debug", skip_all, fields(path = %config.file_path))]
pub fn compile_module(
    source: &str,
    signatures: &SignatureTable,
    config: &CompileConfig,
) -> Result<CompiledModule, CompileError> {
    let program = ember_parse::parse(source)?;
    let functions = check_declarations(&program, signatures)?;

    let callees: SignatureTable = signatures
        .iter()
        .filter(|(name, _)| program.function(name).is_some())
        .map(|(name, signature)| (name, signature.clone()))
        .collect();
    for name in signatures.names() {
        if !callees.contains(name) {
            tracing::warn!(name, "signature names no function in the source; ignored");
        }
    }

    let mut module = ember_wasm::Module::new();
    let mut literals = LiteralArena::new();
    let mut uses_memory = false;
    for (name, function, signature) in functions {
        let symbols = SymbolTable::build(function)?;
        let types = infer_function(function, &symbols, signature, &callees)?;
        uses_memory |= types.uses_memory();
        let generated = generate_function(function, &symbols, &types, &callees, &mut literals)?;
        module.add_function(generated);
        module.add_export(name, name);
    }

    let memory = if uses_memory {
        module.import_memory(literals.size().div_ceil(PAGE_SIZE));
        MemoryUse::Imported {
            reserved: literals.size(),
        }
    } else {
        MemoryUse::None
    };

    if config.optimize {
        module.optimize();
    }
    if let Some(message) = module.validation_error() {
        return Err(CompileError::InvalidModule { message });
    }
    let binary = module
        .emit_binary()
        .map_err(|err| CompileError::InvalidModule {
            message: err.to_string(),
        })?;
    tracing::debug!(
        functions = module.functions().len(),
        bytes = binary.len(),
        literal_bytes = literals.size(),
        "module compiled"
    );
    Ok(CompiledModule {
        binary,
        signatures: callees,
        memory,
    })
}

/// Every function is named, unique, and has a signature of matching arity.
fn check_declarations<'p, 's>(
    program: &'p Program,
    signatures: &'s SignatureTable,
) -> Result<Vec<(&'p str, &'p Function, &'s Signature)>, CompileError> {
    let mut seen = FxHashSet::default();
    let mut checked = Vec::with_capacity(program.functions.len());
    for function in &program.functions {
        let Some(name) = &function.name else {
            return Err(CompileError::UnnamedFunction {
                span: function.span,
            });
        };
        if !seen.insert(name.name.as_str()) {
            return Err(CompileError::syntax(
                format!("function `{}` is declared more than once", name.name),
                name.span,
            ));
        }
        let signature = signatures
            .get(&name.name)
            .ok_or_else(|| CompileError::MissingSignature {
                name: name.name.clone(),
                span: name.span,
            })?;
        if signature.arity() != function.params.len() {
            return Err(CompileError::ArgumentCountMismatch {
                name: name.name.clone(),
                expected: signature.arity(),
                found: function.params.len(),
                span: function.span,
            });
        }
        checked.push((name.name.as_str(), function, signature));
    }
    Ok(checked)
}
