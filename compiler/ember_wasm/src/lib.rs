//! WebAssembly module builder.
//!
//! Code generation builds a tree of typed [`Expr`] nodes per function and
//! registers the functions with a [`Module`]. The module then runs its own
//! pipeline:
//!
//! - [`Module::optimize`]: constant folding over the tree
//! - [`Module::validate`]: encode and run the `wasmparser` validator
//! - [`Module::emit_binary`]: encode with `wasm-encoder`
//!
//! Calls refer to functions and branches refer to labels by name; both are
//! resolved to indices and relative depths only when encoding, so the tree
//! can be rewritten freely before that.

mod emit;
mod ir;
mod module;
mod optimize;
mod print;

#[cfg(test)]
mod tests;

pub use emit::EmitError;
pub use ir::{BinOp, Expr, Function, Label, UnOp, ValType};
pub use module::{MemoryImport, Module};
pub use optimize::OptimizeStats;

/// Size of a linear memory page.
pub const PAGE_SIZE: u32 = 65_536;
