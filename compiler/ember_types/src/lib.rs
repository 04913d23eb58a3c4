//! Name resolution and type inference.
//!
//! Per function, [`SymbolTable::build`] assigns storage slots and
//! [`infer_function`] types every expression against the declared
//! [`Signature`](ember_ir::Signature)s. The results drive code generation.

mod infer;
mod symbols;

pub use infer::{infer_function, FunctionTypes};
pub use symbols::SymbolTable;
