//! Invocation errors.

use ember_ir::ValueType;

/// A request that does not match the callee. Raised before anything runs.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    #[error("no function name was given")]
    FunctionNameNotSet,

    #[error("no signature for function `{0}`")]
    UnknownSignature(String),

    #[error("`{name}` takes {expected} arguments but {found} were given")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("argument {position} of `{name}` is not a valid {expected}")]
    TypeMismatch {
        name: String,
        position: usize,
        expected: ValueType,
    },

    #[error("out parameters requested for `{0}`, which takes no arrays")]
    OutParameterWithoutMemory(String),

    #[error("out parameter {position} is not an array argument of `{name}`")]
    OutParameterNotFound { name: String, position: usize },
}

/// Failure inside the execution host.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("invalid module: {0}")]
    Load(String),

    #[error("cannot instantiate module: {0}")]
    Instantiate(String),

    #[error("cannot set up linear memory: {0}")]
    Memory(String),

    #[error("module has no exported function `{0}`")]
    MissingExport(String),

    /// The compiled code trapped.
    #[error("trap: {0}")]
    Trap(String),

    #[error("call failed: {0}")]
    Call(String),
}

/// Everything [`EntryPoints::invoke`](crate::EntryPoints::invoke) can fail
/// with.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvokeError {
    #[error(transparent)]
    Call(#[from] CallError),

    #[error(transparent)]
    Host(HostError),

    /// Division by zero, out-of-bounds memory access and the like, with the
    /// host's message. Never retried.
    #[error("runtime trap: {0}")]
    Trap(String),
}

impl From<HostError> for InvokeError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::Trap(message) => InvokeError::Trap(message),
            other => InvokeError::Host(other),
        }
    }
}

impl InvokeError {
    pub fn is_trap(&self) -> bool {
        matches!(self, InvokeError::Trap(_))
    }
}
