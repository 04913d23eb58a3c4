//! Module registration and the optimize / validate / emit pipeline.

use rustc_hash::FxHashMap;

use crate::emit::{self, EmitError};
use crate::optimize::{self, OptimizeStats};
use crate::Function;

/// Linear memory imported from the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryImport {
    pub module: String,
    pub name: String,
    /// Minimum size in pages the host must provide.
    pub min_pages: u32,
}

/// A module under construction.
#[derive(Clone, Debug, Default)]
pub struct Module {
    functions: Vec<Function>,
    by_name: FxHashMap<String, u32>,
    /// (export name, function name)
    exports: Vec<(String, String)>,
    memory: Option<MemoryImport>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function and return its index. A function with the same
    /// name replaces the earlier one.
    pub fn add_function(&mut self, function: Function) -> u32 {
        if let Some(&index) = self.by_name.get(&function.name) {
            self.functions[index as usize] = function;
            return index;
        }
        let index = u32::try_from(self.functions.len()).unwrap_or(u32::MAX);
        self.by_name.insert(function.name.clone(), index);
        self.functions.push(function);
        index
    }

    pub fn add_export(&mut self, function: &str, export_name: &str) {
        self.exports
            .push((export_name.to_owned(), function.to_owned()));
    }

    /// Import the memory as `env.memory`.
    pub fn import_memory(&mut self, min_pages: u32) {
        self.memory = Some(MemoryImport {
            module: "env".to_owned(),
            name: "memory".to_owned(),
            min_pages,
        });
    }

    pub fn memory(&self) -> Option<&MemoryImport> {
        self.memory.as_ref()
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.by_name
            .get(name)
            .map(|&index| &self.functions[index as usize])
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn exports(&self) -> impl Iterator<Item = (&str, &str)> {
        self.exports.iter().map(|(e, f)| (e.as_str(), f.as_str()))
    }

    pub(crate) fn function_index(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }

    /// Fold constants in every function body.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn optimize(&mut self) -> OptimizeStats {
        let mut stats = OptimizeStats::default();
        for function in &mut self.functions {
            optimize::optimize_function(function, &mut stats);
        }
        tracing::debug!(
            folded = stats.folded,
            branches_resolved = stats.branches_resolved,
            "optimized"
        );
        stats
    }

    /// Whether the module encodes and passes validation.
    pub fn validate(&self) -> bool {
        self.validation_error().is_none()
    }

    /// Why [`validate`](Self::validate) fails, if it does.
    pub fn validation_error(&self) -> Option<String> {
        let bytes = match self.emit_binary() {
            Ok(bytes) => bytes,
            Err(err) => return Some(err.to_string()),
        };
        match wasmparser::Validator::new().validate_all(&bytes) {
            Ok(_) => None,
            Err(err) => Some(err.to_string()),
        }
    }

    /// Encode as a WebAssembly binary.
    pub fn emit_binary(&self) -> Result<Vec<u8>, EmitError> {
        emit::encode(self)
    }
}
