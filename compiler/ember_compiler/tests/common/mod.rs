#![allow(dead_code, reason = "each test binary uses a different subset")]

use ember_compiler::{
    compile, CompileConfig, CompileError, EntryPoints, InvokeError, ReturnValue, Signature,
    SignatureTable, Value, ValueType,
};

pub fn try_compile(
    source: &str,
    signatures: &[(&str, &[ValueType], ValueType)],
) -> Result<EntryPoints, CompileError> {
    ember_compiler::init_tracing();
    let table: SignatureTable = signatures
        .iter()
        .map(|(name, params, returns)| (*name, Signature::new(params.to_vec(), *returns)))
        .collect();
    compile(source, &table, &CompileConfig::default())
}

pub fn compile_one(
    source: &str,
    name: &str,
    params: &[ValueType],
    returns: ValueType,
) -> EntryPoints {
    match try_compile(source, &[(name, params, returns)]) {
        Ok(entry) => entry,
        Err(err) => panic!("{name} failed to compile: {err}"),
    }
}

pub fn call(entry: &EntryPoints, name: &str, args: &mut [Value]) -> Result<ReturnValue, InvokeError> {
    entry.invoke(ember_compiler::CallRequest::new(name, args))
}

pub fn call_i32(entry: &EntryPoints, name: &str, args: &mut [Value]) -> i32 {
    match call(entry, name, args) {
        Ok(ReturnValue::I32(v)) => v,
        other => panic!("{name} returned {other:?}"),
    }
}

pub fn call_f64(entry: &EntryPoints, name: &str, args: &mut [Value]) -> f64 {
    match call(entry, name, args) {
        Ok(ReturnValue::F64(v)) => v,
        other => panic!("{name} returned {other:?}"),
    }
}
