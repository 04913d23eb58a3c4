//! [`Host`] backed by wasmtime.

use smallvec::SmallVec;
use wasmtime::{Engine, Memory, MemoryType, Module, Store, Val};

use crate::{Host, HostError, Instance, MemorySegment, RawValue, ReturnValue};

/// Runs modules with a shared wasmtime [`Engine`].
#[derive(Clone, Default)]
pub struct WasmtimeHost {
    engine: Engine,
}

impl WasmtimeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(engine: Engine) -> Self {
        WasmtimeHost { engine }
    }
}

impl std::fmt::Debug for WasmtimeHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WasmtimeHost").finish_non_exhaustive()
    }
}

/// An instance with its own store and memory.
pub struct WasmtimeInstance {
    store: Store<()>,
    instance: wasmtime::Instance,
    memory: Option<Memory>,
}

impl Host for WasmtimeHost {
    type Module = Module;
    type Instance = WasmtimeInstance;

    fn load(&self, binary: &[u8]) -> Result<Module, HostError> {
        Module::new(&self.engine, binary).map_err(|err| HostError::Load(format!("{err:#}")))
    }

    fn instantiate(
        &self,
        module: &Module,
        segment: Option<&MemorySegment>,
    ) -> Result<WasmtimeInstance, HostError> {
        let mut store = Store::new(&self.engine, ());
        let memory = match segment {
            Some(segment) => {
                let memory = Memory::new(&mut store, MemoryType::new(segment.pages(), None))
                    .map_err(|err| HostError::Memory(format!("{err:#}")))?;
                memory
                    .write(&mut store, 0, segment.as_bytes())
                    .map_err(|err| HostError::Memory(err.to_string()))?;
                Some(memory)
            }
            None => None,
        };
        let imports: SmallVec<[wasmtime::Extern; 1]> =
            memory.iter().map(|memory| (*memory).into()).collect();
        let instance = wasmtime::Instance::new(&mut store, module, &imports)
            .map_err(|err| HostError::Instantiate(format!("{err:#}")))?;
        Ok(WasmtimeInstance {
            store,
            instance,
            memory,
        })
    }
}

impl Instance for WasmtimeInstance {
    fn call(&mut self, name: &str, args: &[RawValue]) -> Result<ReturnValue, HostError> {
        let func = self
            .instance
            .get_func(&mut self.store, name)
            .ok_or_else(|| HostError::MissingExport(name.to_owned()))?;
        let params: SmallVec<[Val; 8]> = args
            .iter()
            .map(|arg| match arg {
                RawValue::I32(v) => Val::I32(*v),
                RawValue::F64(v) => Val::F64(v.to_bits()),
            })
            .collect();
        let mut results = [Val::I32(0)];
        func.call(&mut self.store, &params, &mut results)
            .map_err(|err| match err.downcast_ref::<wasmtime::Trap>() {
                Some(trap) => HostError::Trap(trap.to_string()),
                None => HostError::Call(format!("{err:#}")),
            })?;
        match &results[0] {
            Val::I32(v) => Ok(ReturnValue::I32(*v)),
            Val::F64(bits) => Ok(ReturnValue::F64(f64::from_bits(*bits))),
            other => Err(HostError::Call(format!("unexpected result {other:?}"))),
        }
    }

    fn memory_bytes(&self) -> Option<&[u8]> {
        self.memory.map(|memory| memory.data(&self.store))
    }
}
