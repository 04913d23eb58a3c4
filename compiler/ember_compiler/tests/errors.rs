//! Compile-time and call-time failures.

mod common;

use ember_compiler::{
    compile, compile_module, render_diagnostics, CallError, CallRequest, ColorMode, CompileConfig,
    CompileError, ErrorCode, InvokeError, MemoryUse, Signature, SignatureTable, Value, ValueType,
};
use pretty_assertions::assert_eq;

use common::{compile_one, try_compile};
use ValueType::{Float64, Int32, Int32Array};

fn compile_err(source: &str, signatures: &[(&str, &[ValueType], ValueType)]) -> CompileError {
    match try_compile(source, signatures) {
        Ok(entry) => panic!("expected a compile error, got {entry:?}"),
        Err(err) => err,
    }
}

#[test]
fn syntax_error() {
    let err = compile_err("function f( { }", &[("f", &[], Int32)]);
    assert_eq!(err.code(), ErrorCode::E1001);
}

#[test]
fn unnamed_function() {
    let err = compile_err("function (a) { return a; }", &[]);
    assert!(matches!(err, CompileError::UnnamedFunction { .. }), "{err:?}");
}

#[test]
fn destructuring_is_rejected() {
    let err = compile_err(
        "function f(arr) { var [a, b] = arr; return a; }",
        &[("f", &[Int32Array], Int32)],
    );
    assert!(matches!(err, CompileError::NonIdentifierBinding { .. }), "{err:?}");
}

#[test]
fn unknown_identifier() {
    let err = compile_err("function f() { return y; }", &[("f", &[], Int32)]);
    assert_eq!(
        err,
        CompileError::UnknownIdentifier {
            name: "y".to_owned(),
            span: err.span(),
        }
    );
}

#[test]
fn only_length_is_a_member() {
    let err = compile_err("function f(arr) { return arr.size; }", &[("f", &[Int32Array], Int32)]);
    assert!(
        matches!(&err, CompileError::UnsupportedMember { property, .. } if property == "size"),
        "{err:?}"
    );
}

#[test]
fn narrowing_assignment_fails_inference() {
    let err = compile_err(
        "function f() { var x = 1; x = 1.5; return x; }",
        &[("f", &[], Int32)],
    );
    assert!(matches!(err, CompileError::TypeInferenceFailure { .. }), "{err:?}");
}

#[test]
fn float_remainder_is_unhandled() {
    let err = compile_err(
        "function f(a, b) { return a % b; }",
        &[("f", &[Float64, Float64], Float64)],
    );
    assert!(
        matches!(&err, CompileError::UnhandledOperator { operator, .. } if operator == "%"),
        "{err:?}"
    );
}

#[test]
fn bitwise_operators_are_unhandled() {
    let err = compile_err("function f(a) { return a << 1; }", &[("f", &[Int32], Int32)]);
    assert_eq!(err.code(), ErrorCode::E3001);
}

#[test]
fn every_function_needs_a_signature() {
    let err = compile_err(
        "function f() { return 1; } function g() { return 2; }",
        &[("f", &[], Int32)],
    );
    assert!(
        matches!(&err, CompileError::MissingSignature { name, .. } if name == "g"),
        "{err:?}"
    );
}

#[test]
fn signature_arity_must_match_the_declaration() {
    let err = compile_err("function add(a, b) { return a + b; }", &[("add", &[Int32], Int32)]);
    assert!(
        matches!(
            err,
            CompileError::ArgumentCountMismatch { expected: 1, found: 2, .. }
        ),
        "{err:?}"
    );
}

#[test]
fn calls_must_target_source_functions() {
    // `g` has a signature but no body in this source.
    let err = compile_err(
        "function f(a) { return g(a); }",
        &[("f", &[Int32], Int32), ("g", &[Int32], Int32)],
    );
    assert!(
        matches!(&err, CompileError::UnknownFunction { name, .. } if name == "g"),
        "{err:?}"
    );
}

#[test]
fn call_arity_is_checked_at_compile_time() {
    let err = compile_err(
        "function g(a) { return a; } function f() { return g(1, 2); }",
        &[("f", &[], Int32), ("g", &[Int32], Int32)],
    );
    assert_eq!(err.code(), ErrorCode::E2007);
}

#[test]
fn unused_signatures_are_ignored() {
    let entry = try_compile(
        "function one() { return 1; }",
        &[("one", &[], Int32), ("elsewhere", &[Float64], Float64)],
    )
    .unwrap();
    assert_eq!(entry.memory_use(), MemoryUse::None);
}

#[test]
fn diagnostics_render_with_location() {
    let source = "function f() {\n  return y;\n}";
    let err = compile_err(source, &[("f", &[], Int32)]);
    let out = render_diagnostics(source, "input.js", &[err.to_diagnostic()], ColorMode::Never);
    assert!(out.starts_with("error[E2003]: unknown identifier `y`"), "{out}");
    assert!(out.contains("--> input.js:2:10"), "{out}");
}

#[test]
fn compiled_module_reports_memory_use() {
    let signatures = SignatureTable::new()
        .with("first", Signature::new([Int32Array], Int32))
        .with("pick", Signature::new([Int32], Int32));
    let module = compile_module(
        "function first(arr) { return arr[0]; }
         function pick(i) { var a = [7, 8]; return a[i]; }",
        &signatures,
        &CompileConfig::default(),
    )
    .unwrap();
    // Two i32 slots plus the length word.
    assert_eq!(module.memory_use(), MemoryUse::Imported { reserved: 12 });
    assert!(wasmparser::validate(module.binary()).is_ok());

    let scalar = compile_module(
        "function one() { return 1; }",
        &SignatureTable::new().with("one", Signature::new([], Int32)),
        &CompileConfig::default(),
    )
    .unwrap();
    assert_eq!(scalar.memory_use(), MemoryUse::None);
}

#[test]
fn call_errors_are_reported_before_running() {
    let entry = compile_one(
        "function setFirst(arr, v) { arr[0] = v; return v; }",
        "setFirst",
        &[Int32Array, Int32],
        Int32,
    );
    let call = |name: &str, args: &mut [Value], out: &[usize]| {
        match entry.invoke(CallRequest::new(name, args).with_out_parameters(out.iter().copied())) {
            Err(InvokeError::Call(err)) => err,
            other => panic!("expected a call error, got {other:?}"),
        }
    };

    assert_eq!(call("", &mut [], &[]), CallError::FunctionNameNotSet);
    assert_eq!(
        call("missing", &mut [], &[]),
        CallError::UnknownSignature("missing".to_owned())
    );
    assert_eq!(
        call("setFirst", &mut [Value::from(vec![1])], &[]),
        CallError::ArityMismatch {
            name: "setFirst".to_owned(),
            expected: 2,
            found: 1,
        }
    );
    assert_eq!(
        call("setFirst", &mut [Value::from(vec![1]), Value::from(1.5)], &[]),
        CallError::TypeMismatch {
            name: "setFirst".to_owned(),
            position: 1,
            expected: Int32,
        }
    );
    assert_eq!(
        call("setFirst", &mut [Value::from(vec![1]), Value::from(1)], &[1]),
        CallError::OutParameterNotFound {
            name: "setFirst".to_owned(),
            position: 1,
        }
    );
}

#[test]
fn out_parameters_need_an_array_parameter() {
    let entry = compile_one("function id(a) { return a; }", "id", &[Int32], Int32);
    let err = entry
        .invoke(CallRequest::new("id", &mut [Value::from(1)]).with_out_parameters([0]))
        .unwrap_err();
    assert!(
        matches!(err, InvokeError::Call(CallError::OutParameterWithoutMemory(ref name)) if name == "id"),
        "{err:?}"
    );
}

#[test]
fn signature_tables_load_from_json() {
    let signatures = SignatureTable::from_json(
        r#"{"mean": {"parameters": ["FLOAT_64_ARRAY"], "returns": "FLOAT_64"}}"#,
    )
    .unwrap();
    let entry = compile(
        "function mean(xs) {
            var total = 0.5 - 0.5;
            for (var i = 0; i < xs.length; i++) total += xs[i];
            return total / xs.length;
        }",
        &signatures,
        &CompileConfig::default().with_file_path("mean.js"),
    )
    .unwrap();
    let result = entry
        .invoke(CallRequest::new("mean", &mut [Value::from(vec![1.0, 2.0, 4.5])]))
        .unwrap();
    assert_eq!(result.as_f64(), 2.5);
}
