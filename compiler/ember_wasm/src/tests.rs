use pretty_assertions::assert_eq;

use crate::{BinOp, EmitError, Expr, Function, Label, Module, UnOp, ValType};

fn function(name: &str, params: Vec<ValType>, result: Option<ValType>, body: Expr) -> Function {
    Function {
        name: name.to_owned(),
        params,
        result,
        locals: Vec::new(),
        body,
    }
}

fn add() -> Function {
    function(
        "add",
        vec![ValType::I32, ValType::I32],
        Some(ValType::I32),
        Expr::binary(BinOp::I32Add, Expr::local_get(0), Expr::local_get(1)),
    )
}

/// `sum(n)`: 0 + 1 + ... + (n - 1), with a counted loop.
fn sum() -> Function {
    let (end, begin) = (Label(0), Label(1));
    let body = Expr::block(
        None,
        vec![
            Expr::block(
                Some(end),
                vec![Expr::loop_(
                    begin,
                    Expr::block(
                        None,
                        vec![
                            Expr::br_if(
                                end,
                                Expr::unary(
                                    UnOp::I32Eqz,
                                    Expr::binary(BinOp::I32LtS, Expr::local_get(1), Expr::local_get(0)),
                                ),
                            ),
                            Expr::local_set(
                                2,
                                Expr::binary(BinOp::I32Add, Expr::local_get(2), Expr::local_get(1)),
                            ),
                            Expr::local_set(
                                1,
                                Expr::binary(BinOp::I32Add, Expr::local_get(1), Expr::I32Const(1)),
                            ),
                            Expr::br(begin),
                        ],
                        None,
                    ),
                )],
                None,
            ),
            Expr::local_get(2),
        ],
        Some(ValType::I32),
    );
    Function {
        locals: vec![ValType::I32, ValType::I32],
        ..function("sum", vec![ValType::I32], Some(ValType::I32), body)
    }
}

fn module_with(functions: Vec<Function>) -> Module {
    let mut module = Module::new();
    for f in functions {
        let name = f.name.clone();
        module.add_function(f);
        module.add_export(&name, &name);
    }
    module
}

#[test]
fn emits_a_valid_binary() {
    let module = module_with(vec![add()]);
    assert_eq!(module.validation_error(), None);
    let bytes = module.emit_binary().unwrap();
    assert_eq!(&bytes[..4], b"\0asm");
}

#[test]
fn float_constants_encode() {
    let half = function(
        "half",
        vec![ValType::F64],
        Some(ValType::F64),
        Expr::binary(BinOp::F64Mul, Expr::local_get(0), Expr::F64Const(0.5)),
    );
    let module = module_with(vec![half]);
    assert_eq!(module.validation_error(), None);
    let bytes = module.emit_binary().unwrap();
    // f64.const opcode followed by 0.5 in little-endian IEEE 754.
    let mut encoded = vec![0x44];
    encoded.extend_from_slice(&0.5f64.to_le_bytes());
    assert!(bytes.windows(encoded.len()).any(|w| w == encoded.as_slice()));
}

#[test]
fn loops_and_labels_validate() {
    let module = module_with(vec![sum()]);
    assert_eq!(module.validation_error(), None);
}

#[test]
fn branch_outside_its_block_is_an_error() {
    let module = module_with(vec![function(
        "f",
        vec![],
        None,
        Expr::block(None, vec![Expr::br(Label(9))], None),
    )]);
    assert_eq!(module.emit_binary(), Err(EmitError::UnknownLabel(Label(9))));
    assert!(!module.validate());
}

#[test]
fn calls_resolve_by_name() {
    let caller = function(
        "twice",
        vec![ValType::I32],
        Some(ValType::I32),
        Expr::call("add", vec![Expr::local_get(0), Expr::local_get(0)]),
    );
    let module = module_with(vec![caller, add()]);
    assert!(module.validate());

    let orphan = module_with(vec![function(
        "f",
        vec![],
        Some(ValType::I32),
        Expr::call("missing", vec![]),
    )]);
    assert_eq!(
        orphan.emit_binary(),
        Err(EmitError::UnknownFunction("missing".to_owned()))
    );
}

#[test]
fn export_of_unknown_function_is_an_error() {
    let mut module = module_with(vec![add()]);
    module.add_export("nope", "nope");
    assert!(matches!(
        module.emit_binary(),
        Err(EmitError::UnknownExport { .. })
    ));
}

#[test]
fn memory_access_needs_the_import() {
    let load = function(
        "first",
        vec![ValType::I32],
        Some(ValType::F64),
        Expr::load(
            ValType::F64,
            Expr::binary(BinOp::I32Add, Expr::local_get(0), Expr::I32Const(8)),
        ),
    );
    let mut module = module_with(vec![load]);
    assert!(!module.validate());

    module.import_memory(2);
    assert_eq!(module.validation_error(), None);
    let memory = module.memory().unwrap();
    assert_eq!((memory.module.as_str(), memory.name.as_str()), ("env", "memory"));
    assert_eq!(memory.min_pages, 2);
}

#[test]
fn re_adding_a_function_replaces_it() {
    let mut module = Module::new();
    let first = module.add_function(add());
    let second = module.add_function(function(
        "add",
        vec![ValType::I32, ValType::I32],
        Some(ValType::I32),
        Expr::binary(BinOp::I32Sub, Expr::local_get(0), Expr::local_get(1)),
    ));
    assert_eq!(first, second);
    assert_eq!(module.functions().len(), 1);
    assert_eq!(
        module.function("add").unwrap().body.to_string(),
        "(i32.sub (local.get 0) (local.get 1))"
    );
}

#[test]
fn folds_nested_constants() {
    let mut module = module_with(vec![function(
        "f",
        vec![],
        Some(ValType::I32),
        Expr::binary(
            BinOp::I32Mul,
            Expr::binary(BinOp::I32Add, Expr::I32Const(1), Expr::I32Const(2)),
            Expr::I32Const(4),
        ),
    )]);
    let stats = module.optimize();
    assert_eq!(stats.folded, 2);
    assert_eq!(module.function("f").unwrap().body, Expr::I32Const(12));
}

#[test]
fn folding_keeps_trapping_division() {
    for (l, r) in [(1, 0), (i32::MIN, -1)] {
        let body = Expr::binary(BinOp::I32DivS, Expr::I32Const(l), Expr::I32Const(r));
        let mut module = module_with(vec![function("f", vec![], Some(ValType::I32), body.clone())]);
        assert_eq!(module.optimize().folded, 0);
        assert_eq!(module.function("f").unwrap().body, body);
    }

    let mut module = module_with(vec![function(
        "g",
        vec![],
        Some(ValType::I32),
        Expr::binary(BinOp::I32RemS, Expr::I32Const(i32::MIN), Expr::I32Const(-1)),
    )]);
    module.optimize();
    assert_eq!(module.function("g").unwrap().body, Expr::I32Const(0));
}

#[test]
fn folds_conversions_and_float_comparisons() {
    let mut module = module_with(vec![function(
        "f",
        vec![],
        Some(ValType::I32),
        Expr::binary(
            BinOp::F64Lt,
            Expr::unary(UnOp::F64ConvertI32S, Expr::I32Const(2)),
            Expr::F64Const(2.5),
        ),
    )]);
    module.optimize();
    assert_eq!(module.function("f").unwrap().body, Expr::I32Const(1));
}

#[test]
fn resolves_constant_conditions() {
    let mut module = module_with(vec![function(
        "f",
        vec![ValType::I32],
        Some(ValType::I32),
        Expr::if_(
            Expr::unary(UnOp::I32Eqz, Expr::I32Const(1)),
            Expr::I32Const(10),
            Some(Expr::local_get(0)),
            Some(ValType::I32),
        ),
    )]);
    let stats = module.optimize();
    assert_eq!(stats.branches_resolved, 1);
    assert_eq!(module.function("f").unwrap().body, Expr::local_get(0));
    assert!(module.validate());
}

#[test]
fn never_taken_break_disappears() {
    let mut module = module_with(vec![function(
        "f",
        vec![],
        None,
        Expr::block(Some(Label(0)), vec![Expr::br_if(Label(0), Expr::I32Const(0))], None),
    )]);
    module.optimize();
    assert_eq!(
        module.function("f").unwrap().body.to_string(),
        "(block $L0 (nop))"
    );
}

#[test]
fn prints_functions() {
    assert_eq!(
        add().to_string(),
        "(func $add (param i32) (param i32) (result i32) (i32.add (local.get 0) (local.get 1)))"
    );
    let store = Expr::store(ValType::I32, Expr::I32Const(0), Expr::I32Const(3));
    assert_eq!(store.to_string(), "(i32.store (i32.const 0) (i32.const 3))");
}
