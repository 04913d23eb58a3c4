//! Call requests.

use ember_ir::Value;
use smallvec::SmallVec;

/// One invocation: the callee, its arguments and the argument positions to
/// copy back after the call.
///
/// A request borrows the caller's arguments mutably for its lifetime, so
/// out parameters are written straight into the caller's arrays and a
/// request cannot be shared between calls.
#[derive(Debug)]
pub struct CallRequest<'a> {
    name: &'a str,
    args: &'a mut [Value],
    out_parameters: SmallVec<[usize; 4]>,
}

impl<'a> CallRequest<'a> {
    pub fn new(name: &'a str, args: &'a mut [Value]) -> Self {
        CallRequest {
            name,
            args,
            out_parameters: SmallVec::new(),
        }
    }

    /// Mark argument positions as out parameters.
    #[must_use]
    pub fn with_out_parameters(mut self, positions: impl IntoIterator<Item = usize>) -> Self {
        self.out_parameters.extend(positions);
        self
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn args(&self) -> &[Value] {
        self.args
    }

    pub(crate) fn args_mut(&mut self) -> &mut [Value] {
        self.args
    }

    pub fn out_parameters(&self) -> &[usize] {
        &self.out_parameters
    }
}
