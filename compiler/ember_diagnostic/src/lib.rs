//! Diagnostics for the Ember compiler.
//!
//! Each phase reports failure as a [`CompileError`] carrying the span of the
//! offending node. [`CompileError::to_diagnostic`] turns it into a
//! [`Diagnostic`] with a stable [`ErrorCode`], which the
//! [`TerminalEmitter`](emitter::TerminalEmitter) renders against the source.

mod compile_error;
mod diagnostic;
pub mod emitter;
mod error_code;
pub mod span_utils;

pub use compile_error::CompileError;
pub use diagnostic::{Diagnostic, Label, Severity};
pub use emitter::ColorMode;
pub use error_code::ErrorCode;
