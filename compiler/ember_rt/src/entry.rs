//! The call adapter.

use ember_ir::{Signature, SignatureTable, Value, ValueType};
use smallvec::SmallVec;

use crate::{
    CallError, CallRequest, Host, HostError, Instance, InvokeError, MemorySegment, RawValue,
    ReturnValue, WasmtimeHost,
};

/// How a module uses linear memory.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MemoryUse {
    /// No memory import; no function touches arrays.
    #[default]
    None,
    /// The module imports `env.memory`. The first `reserved` bytes hold its
    /// array literals.
    Imported { reserved: u32 },
}

/// The exported functions of a loaded module, callable by name.
pub struct EntryPoints<H: Host = WasmtimeHost> {
    host: H,
    module: H::Module,
    signatures: SignatureTable,
    memory: MemoryUse,
}

impl EntryPoints<WasmtimeHost> {
    /// Load `binary` with a default wasmtime host.
    pub fn load(
        binary: &[u8],
        signatures: SignatureTable,
        memory: MemoryUse,
    ) -> Result<Self, HostError> {
        Self::with_host(WasmtimeHost::new(), binary, signatures, memory)
    }
}

impl<H: Host> EntryPoints<H> {
    pub fn with_host(
        host: H,
        binary: &[u8],
        signatures: SignatureTable,
        memory: MemoryUse,
    ) -> Result<Self, HostError> {
        let module = host.load(binary)?;
        Ok(EntryPoints {
            host,
            module,
            signatures,
            memory,
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn signatures(&self) -> &SignatureTable {
        &self.signatures
    }

    pub fn signature(&self, name: &str) -> Option<&Signature> {
        self.signatures.get(name)
    }

    pub fn memory_use(&self) -> MemoryUse {
        self.memory
    }

    /// Run one call.
    ///
    /// The request is checked completely before anything is instantiated.
    /// Array arguments are laid out in a segment that lives exactly as long
    /// as this call; the requested out parameters are then copied back into
    /// the caller's arrays in place. The result is returned as the function
    /// produced it.
    #[tracing::instrument(level = "debug", skip_all, fields(function = request.name()))]
    pub fn invoke(&self, mut request: CallRequest<'_>) -> Result<ReturnValue, InvokeError> {
        let signature = self.check(&request)?;
        let segment = match self.memory {
            MemoryUse::Imported { reserved } => Some(MemorySegment::layout(
                reserved,
                request.args(),
                &signature.parameters,
            )?),
            MemoryUse::None => None,
        };
        let raw = raw_arguments(request.args(), &signature.parameters, segment.as_ref());

        let mut instance = self.host.instantiate(&self.module, segment.as_ref())?;
        let result = instance.call(request.name(), &raw)?;
        tracing::trace!(?result, "returned");

        if let Some(segment) = &segment {
            copy_back(&mut request, segment, instance.memory_bytes())?;
        }
        Ok(result)
    }

    fn check(&self, request: &CallRequest<'_>) -> Result<&Signature, CallError> {
        let name = request.name();
        if name.is_empty() {
            return Err(CallError::FunctionNameNotSet);
        }
        let signature = self
            .signatures
            .get(name)
            .ok_or_else(|| CallError::UnknownSignature(name.to_owned()))?;
        let args = request.args();
        if args.len() != signature.arity() {
            return Err(CallError::ArityMismatch {
                name: name.to_owned(),
                expected: signature.arity(),
                found: args.len(),
            });
        }
        for (position, (arg, ty)) in args.iter().zip(&signature.parameters).enumerate() {
            if !arg.is_of_type(*ty) {
                return Err(CallError::TypeMismatch {
                    name: name.to_owned(),
                    position,
                    expected: *ty,
                });
            }
        }

        let out = request.out_parameters();
        if !out.is_empty() && !signature.has_array_parameter() {
            return Err(CallError::OutParameterWithoutMemory(name.to_owned()));
        }
        for &position in out {
            let is_array = signature
                .parameters
                .get(position)
                .is_some_and(|ty| ty.is_array());
            if !is_array {
                return Err(CallError::OutParameterNotFound {
                    name: name.to_owned(),
                    position,
                });
            }
        }
        Ok(signature)
    }
}

impl<H: Host> std::fmt::Debug for EntryPoints<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryPoints")
            .field("functions", &self.signatures.names())
            .field("memory", &self.memory)
            .finish_non_exhaustive()
    }
}

/// Scalars as declared; arrays as the address of their length word.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    reason = "Int32 arguments are checked to be in range; addresses are below 4 GiB and pass as i32 bits"
)]
fn raw_arguments(
    args: &[Value],
    params: &[ValueType],
    segment: Option<&MemorySegment>,
) -> SmallVec<[RawValue; 8]> {
    args.iter()
        .zip(params)
        .enumerate()
        .map(|(position, (arg, ty))| match arg {
            Value::Array(_) => RawValue::I32(
                segment
                    .and_then(|segment| segment.placement(position))
                    .map_or(0, |placement| placement.base as i32),
            ),
            Value::Boolean(b) => RawValue::I32(i32::from(*b)),
            Value::Number(n) if *ty == ValueType::Float64 => RawValue::F64(*n),
            Value::Number(n) => RawValue::I32(*n as i32),
        })
        .collect()
}

fn copy_back(
    request: &mut CallRequest<'_>,
    segment: &MemorySegment,
    memory: Option<&[u8]>,
) -> Result<(), InvokeError> {
    if request.out_parameters().is_empty() {
        return Ok(());
    }
    let memory =
        memory.ok_or_else(|| HostError::Memory("instance has no linear memory".to_owned()))?;
    let positions: SmallVec<[usize; 4]> = request.out_parameters().iter().copied().collect();
    for position in positions {
        let name = request.name().to_owned();
        let not_found = || CallError::OutParameterNotFound { name, position };
        let placement = segment.placement(position).ok_or_else(not_found)?;
        let values = placement.read(memory).ok_or_else(|| {
            HostError::Memory(format!("out parameter {position} lies outside linear memory"))
        })?;
        if let Some(Value::Array(items)) = request.args_mut().get_mut(position) {
            for (item, value) in items.iter_mut().zip(values) {
                *item = value;
            }
        }
        tracing::trace!(position, "out parameter copied back");
    }
    Ok(())
}
