use ember_diagnostic::CompileError;
use ember_ir::ast::{ExprKind, StmtKind};
use ember_ir::{Signature, SignatureTable, ValueType};
use pretty_assertions::assert_eq;

use super::{expr::literal_type, infer_function, FunctionTypes};
use crate::SymbolTable;

use ValueType::{Boolean, Float64, Float64Array, Int32, Int32Array};

fn infer_with(
    source: &str,
    params: &[ValueType],
    returns: ValueType,
    extra: &[(&str, Signature)],
) -> Result<(FunctionTypes, ember_ir::Program), CompileError> {
    let program = ember_parse::parse(source).unwrap();
    let function = &program.functions[0];
    let name = function.name.as_ref().unwrap().name.clone();
    let signature = Signature::new(params.to_vec(), returns);
    let mut callees: SignatureTable = extra.iter().cloned().collect();
    callees.insert(name, signature.clone());
    let symbols = SymbolTable::build(function)?;
    let types = infer_function(function, &symbols, &signature, &callees)?;
    Ok((types, program))
}

fn infer(source: &str, params: &[ValueType], returns: ValueType) -> Result<FunctionTypes, CompileError> {
    infer_with(source, params, returns, &[]).map(|(types, _)| types)
}

/// Type of the expression in the function's final `return`.
fn return_expr_type(source: &str, params: &[ValueType], returns: ValueType) -> ValueType {
    let (types, program) = infer_with(source, params, returns, &[]).unwrap();
    let last = program.functions[0].body.stmts.last().unwrap();
    let StmtKind::Return(Some(expr)) = &last.kind else {
        panic!("last statement is not a return");
    };
    types.expr_type(expr.id).unwrap()
}

#[test]
fn literal_typing() {
    assert_eq!(literal_type(42.0), Int32);
    assert_eq!(literal_type(42.2), Float64);
    assert_eq!(literal_type(-3.0), Int32);
    assert_eq!(literal_type(1e12), Float64);
}

#[test]
fn arithmetic_promotes() {
    assert_eq!(return_expr_type("function f(a, b) { return a + b; }", &[Int32, Int32], Int32), Int32);
    assert_eq!(
        return_expr_type("function f(a, b) { return a * b; }", &[Int32, Float64], Float64),
        Float64
    );
    assert_eq!(return_expr_type("function f(a) { return a / 2.5; }", &[Int32], Float64), Float64);
}

#[test]
fn comparisons_and_logic_are_boolean() {
    for source in [
        "function f(a, b) { return a < b; }",
        "function f(a, b) { return a == b; }",
        "function f(a, b) { return !a; }",
        "function f(a, b) { return a > 1 && b < 2.5; }",
        "function f(a, b) { return true || false; }",
    ] {
        assert_eq!(return_expr_type(source, &[Int32, Float64], Boolean), Boolean, "{source}");
    }
}

#[test]
fn boolean_equality() {
    assert_eq!(
        return_expr_type("function f(a, b) { return a === b; }", &[Boolean, Boolean], Boolean),
        Boolean
    );
    let err = infer("function f(a, b) { return a < b; }", &[Boolean, Boolean], Boolean).unwrap_err();
    assert!(matches!(err, CompileError::TypeInferenceFailure { .. }));
}

#[test]
fn variables_take_their_first_type() {
    let types = infer(
        "function f(a) { var x = 1; var y; y = 2.5; var z = a; return x; }",
        &[Float64Array],
        Int32,
    )
    .unwrap();
    assert_eq!(types.variable_type("x"), Some(Int32));
    assert_eq!(types.variable_type("y"), Some(Float64));
    assert_eq!(types.variable_type("z"), Some(Float64Array));
    assert_eq!(types.variable_type("a"), Some(Float64Array));
}

#[test]
fn int_widens_into_float_variable() {
    let types = infer("function f() { var x = 1.5; x = 2; x += 1; return x; }", &[], Float64).unwrap();
    assert_eq!(types.variable_type("x"), Some(Float64));
}

#[test]
fn float_does_not_narrow_into_int_variable() {
    let err = infer("function f() { var x = 1; x = 2.5; return x; }", &[], Int32).unwrap_err();
    assert!(matches!(err, CompileError::TypeInferenceFailure { .. }));
    let err = infer("function f() { var x = 1; x *= 0.5; return x; }", &[], Int32).unwrap_err();
    assert!(matches!(err, CompileError::TypeInferenceFailure { .. }));
}

#[test]
fn double_into_int_array_element_fails() {
    let err = infer("function f(arr) { arr[0] = 1.5; return 0; }", &[Int32Array], Int32).unwrap_err();
    let CompileError::TypeInferenceFailure { message, .. } = err else {
        panic!("unexpected error {err:?}");
    };
    assert!(message.contains("double"), "{message}");
}

#[test]
fn array_access() {
    assert_eq!(return_expr_type("function f(a) { return a[0]; }", &[Int32Array], Int32), Int32);
    assert_eq!(return_expr_type("function f(a) { return a[1]; }", &[Float64Array], Float64), Float64);
    assert_eq!(return_expr_type("function f(a) { return a.length; }", &[Float64Array], Int32), Int32);
    let types = infer("function f(a) { a[0] = 2; a[1] += 3; a[2]++; return 0; }", &[Float64Array], Int32);
    assert!(types.is_ok());
}

#[test]
fn array_literals() {
    let types = infer("function f() { var a = [1, 2, 3]; var b = [1, 2.5]; var c = []; return 0; }", &[], Int32)
        .unwrap();
    assert_eq!(types.variable_type("a"), Some(Int32Array));
    assert_eq!(types.variable_type("b"), Some(Float64Array));
    assert_eq!(types.variable_type("c"), Some(Int32Array));
    assert!(types.uses_memory());

    let err = infer("function f() { var a = [true]; return 0; }", &[], Int32).unwrap_err();
    assert!(matches!(err, CompileError::TypeInferenceFailure { .. }));
}

#[test]
fn member_errors() {
    let err = infer("function f(a) { return a.size; }", &[Int32Array], Int32).unwrap_err();
    assert!(matches!(err, CompileError::UnsupportedMember { ref property, .. } if property == "size"));

    let err = infer("function f(a) { return a.length; }", &[Int32], Int32).unwrap_err();
    assert!(matches!(err, CompileError::TypeInferenceFailure { .. }));

    let err = infer("function f(a) { return a[0]; }", &[Int32], Int32).unwrap_err();
    assert!(matches!(err, CompileError::TypeInferenceFailure { .. }));

    let err = infer("function f(a) { a.length = 2; return 0; }", &[Int32Array], Int32).unwrap_err();
    assert!(matches!(err, CompileError::TypeInferenceFailure { .. }));
}

#[test]
fn unknown_identifiers() {
    let err = infer("function f() { return y; }", &[], Int32).unwrap_err();
    assert!(matches!(err, CompileError::UnknownIdentifier { ref name, .. } if name == "y"));

    let err = infer("function f() { y = 1; return 0; }", &[], Int32).unwrap_err();
    assert!(matches!(err, CompileError::UnknownIdentifier { .. }));

    let err = infer("function f() { var x; return x; }", &[], Int32).unwrap_err();
    assert!(matches!(err, CompileError::UnknownIdentifier { .. }));
}

#[test]
fn unsupported_operators() {
    for source in [
        "function f(a) { return a % 2.5; }",
        "function f(a) { return a ** 2; }",
        "function f(a) { return a & 1; }",
        "function f(a) { return ~a; }",
        "function f(a) { a <<= 1; return a; }",
    ] {
        let err = infer(source, &[Int32], Int32).unwrap_err();
        assert!(matches!(err, CompileError::UnhandledOperator { .. }), "{source}: {err:?}");
    }
}

#[test]
fn booleans_do_not_mix_with_numbers() {
    let err = infer("function f(a) { return a + 1; }", &[Boolean], Int32).unwrap_err();
    assert!(matches!(err, CompileError::TypeInferenceFailure { .. }));
}

#[test]
fn return_must_match_declared_type() {
    assert!(infer("function f() { return 1; }", &[], Float64).is_ok());
    let err = infer("function f() { return 1.5; }", &[], Int32).unwrap_err();
    assert!(matches!(err, CompileError::TypeInferenceFailure { .. }));
    let err = infer("function f() { return true; }", &[], Int32).unwrap_err();
    assert!(matches!(err, CompileError::TypeInferenceFailure { .. }));
}

#[test]
fn calls_use_declared_signatures() {
    let helper = ("half", Signature::new([Float64], Float64));
    let (types, _) = infer_with(
        "function f(a) { var h = half(a); return h; }",
        &[Int32],
        Float64,
        &[helper.clone()],
    )
    .unwrap();
    assert_eq!(types.variable_type("h"), Some(Float64));

    let err = infer_with("function f(a) { return half(a, a); }", &[Int32], Float64, &[helper])
        .map(|_| ())
        .unwrap_err();
    assert!(matches!(
        err,
        CompileError::ArgumentCountMismatch { expected: 1, found: 2, .. }
    ));

    let err = infer("function f(a) { return other(a); }", &[Int32], Int32).unwrap_err();
    assert!(matches!(err, CompileError::UnknownFunction { ref name, .. } if name == "other"));
}

#[test]
fn recursion_sees_own_signature() {
    assert!(infer(
        "function fib(n) { if (n <= 2) return 1; return fib(n - 2) + fib(n - 1); }",
        &[Int32],
        Int32
    )
    .is_ok());
}

#[test]
fn arrays_are_not_conditions() {
    let err = infer("function f(a) { if (a) return 1; return 0; }", &[Int32Array], Int32).unwrap_err();
    assert!(matches!(err, CompileError::TypeInferenceFailure { .. }));
}

#[test]
fn slot_types_default_untyped_locals_to_int() {
    let program = ember_parse::parse("function f(a) { var x; var y = 2.5; return 0; }").unwrap();
    let function = &program.functions[0];
    let symbols = SymbolTable::build(function).unwrap();
    let signature = Signature::new([Float64Array], Int32);
    let callees = SignatureTable::new().with("f", signature.clone());
    let types = infer_function(function, &symbols, &signature, &callees).unwrap();
    assert_eq!(types.slot_types(&symbols), vec![Float64Array, Int32, Float64]);
}

#[test]
fn every_expression_is_typed() {
    let (types, program) =
        infer_with("function f(a, i) { return a[i] + a.length * 2; }", &[Float64Array, Int32], Float64, &[])
            .unwrap();
    let StmtKind::Return(Some(expr)) = &program.functions[0].body.stmts[0].kind else {
        panic!("expected return");
    };
    let ExprKind::Binary { left, right, .. } = &expr.kind else {
        panic!("expected binary");
    };
    assert_eq!(types.expr_type(expr.id), Some(Float64));
    assert_eq!(types.expr_type(left.id), Some(Float64));
    assert_eq!(types.expr_type(right.id), Some(Int32));
}
