//! Intermediate representation shared by every Ember compiler phase.
//!
//! - [`ast`]: the closed set of syntax nodes the compiler accepts
//! - [`visitor`]: default-walking traversal over the AST
//! - [`ValueType`]: the value type lattice and its promotion rule
//! - [`Signature`] / [`SignatureTable`]: declared function types
//! - [`Value`]: call-site argument values checked against signatures
//!
//! Nothing here knows about WebAssembly; lowering lives in `ember_codegen`
//! and `ember_wasm`.

pub mod ast;
mod signature;
mod span;
mod value;
mod value_type;
pub mod visitor;

pub use ast::{ExprId, Program};
pub use signature::{Signature, SignatureError, SignatureTable};
pub use span::{Span, SpanError};
pub use value::Value;
pub use value_type::{IncompatibleTypes, UnknownValueType, ValueType};
