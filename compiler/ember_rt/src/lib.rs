//! Runtime side of a compiled module.
//!
//! [`EntryPoints`] owns a loaded module and its signatures. Each
//! [`invoke`](EntryPoints::invoke) checks a [`CallRequest`] against the
//! callee's signature, lays the array arguments out in a fresh
//! [`MemorySegment`], runs the function on its own instance and copies the
//! requested out parameters back into the caller's arrays.
//!
//! Nothing is shared between invocations except the loaded module, so one
//! `EntryPoints` can serve any number of threads.

mod entry;
mod error;
mod host;
mod layout;
mod request;
mod wasmtime_host;


pub use entry::{EntryPoints, MemoryUse};
pub use error::{CallError, HostError, InvokeError};
pub use host::{Host, Instance, RawValue, ReturnValue};
pub use layout::{ArrayPlacement, MemorySegment, PAGE_SIZE};
pub use request::CallRequest;
pub use wasmtime_host::{WasmtimeHost, WasmtimeInstance};
