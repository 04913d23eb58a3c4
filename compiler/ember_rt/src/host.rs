//! The execution host interface.
//!
//! The adapter only needs to load a binary once, instantiate it per call
//! against an optional memory segment, call an export and read the memory
//! back. Anything that can do that can run compiled modules.

use crate::{HostError, MemorySegment};

/// A scalar crossing the call boundary. Arrays are passed as the `I32`
/// address of their length word.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RawValue {
    I32(i32),
    F64(f64),
}

/// A compiled function's result, as produced by the function.
///
/// `Boolean` results arrive as `I32` `0` or `1`; see [`as_bool`](Self::as_bool).
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ReturnValue {
    I32(i32),
    F64(f64),
}

impl ReturnValue {
    pub fn as_i32(self) -> Option<i32> {
        match self {
            ReturnValue::I32(v) => Some(v),
            ReturnValue::F64(_) => None,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            ReturnValue::I32(v) => f64::from(v),
            ReturnValue::F64(v) => v,
        }
    }

    /// Reinterpret an `I32` result as a boolean.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            ReturnValue::I32(0) => Some(false),
            ReturnValue::I32(1) => Some(true),
            _ => None,
        }
    }
}

impl From<RawValue> for ReturnValue {
    fn from(value: RawValue) -> Self {
        match value {
            RawValue::I32(v) => ReturnValue::I32(v),
            RawValue::F64(v) => ReturnValue::F64(v),
        }
    }
}

/// Loads modules and creates instances of them.
pub trait Host: Send + Sync {
    type Module: Send + Sync;
    type Instance: Instance;

    /// Compile a binary once for any number of instances.
    fn load(&self, binary: &[u8]) -> Result<Self::Module, HostError>;

    /// A fresh instance. When `memory` is given it is bound as the module's
    /// imported memory, initialized with the segment's contents.
    fn instantiate(
        &self,
        module: &Self::Module,
        memory: Option<&MemorySegment>,
    ) -> Result<Self::Instance, HostError>;
}

/// One instantiated module.
pub trait Instance {
    fn call(&mut self, name: &str, args: &[RawValue]) -> Result<ReturnValue, HostError>;

    /// Current contents of the bound memory, if any.
    fn memory_bytes(&self) -> Option<&[u8]>;
}
