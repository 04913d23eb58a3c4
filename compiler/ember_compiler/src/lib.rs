//! Ember: compile numeric JavaScript functions to WebAssembly and call them.
//!
//! ```text
//! source ──parse──▶ AST ──symbols──▶ slots ──infer──▶ types ──codegen──▶ wasm IR
//!                                                                          │
//!        EntryPoints ◀──load── binary ◀──emit── validate ◀── optimize ◀────┘
//! ```
//!
//! [`compile`] takes the source and a [`SignatureTable`] naming the
//! parameter and return types of every function; it returns callable
//! [`EntryPoints`] or the first [`CompileError`]. Calls go through
//! [`EntryPoints::invoke`] with a [`CallRequest`]:
//!
//! ```ignore
//! let signatures = SignatureTable::from_json(
//!     r#"{"setFirst": {"parameters": ["INT_32_ARRAY"], "returns": "INT_32"}}"#,
//! )?;
//! let entry = compile(
//!     "function setFirst(arr) { arr[0] = 42; return arr[0]; }",
//!     &signatures,
//!     &CompileConfig::default(),
//! )?;
//! let mut args = [Value::from(vec![0, 1, 2])];
//! entry.invoke(CallRequest::new("setFirst", &mut args).with_out_parameters([0]))?;
//! ```

mod config;
mod pipeline;
mod render;

pub use config::CompileConfig;
pub use pipeline::{compile, compile_module, CompiledModule};
pub use render::render_diagnostics;

pub use ember_diagnostic::{ColorMode, CompileError, Diagnostic, ErrorCode};
pub use ember_ir::{Signature, SignatureError, SignatureTable, Value, ValueType};
pub use ember_rt::{CallError, CallRequest, EntryPoints, InvokeError, MemoryUse, ReturnValue};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set; later calls are no-ops.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
