use ember_diagnostic::CompileError;
use ember_ir::ast::{
    AssignOp, BinaryOp, Binding, Expr, ExprKind, ForInit, LogicalOp, StmtKind, UnaryOp, UpdateOp,
};
use ember_ir::Program;
use pretty_assertions::assert_eq;

use crate::parse;

fn parse_ok(source: &str) -> Program {
    match parse(source) {
        Ok(program) => program,
        Err(err) => panic!("parse failed: {err}"),
    }
}

/// Parse `function f() { return <expr>; }` and return the expression.
fn expr(source: &str) -> Expr {
    let program = parse_ok(&format!("function f() {{ return {source}; }}"));
    let stmt = program.functions[0].body.stmts[0].clone();
    match stmt.kind {
        StmtKind::Return(Some(expr)) => expr,
        other => panic!("expected return, got {other:?}"),
    }
}

/// Render an expression as a fully parenthesized string.
fn sexp(e: &Expr) -> String {
    match &e.kind {
        ExprKind::Number(n) => n.to_string(),
        ExprKind::Bool(b) => b.to_string(),
        ExprKind::Ident(name) => name.clone(),
        ExprKind::Unary { op, operand } => format!("({}{})", op.as_symbol(), sexp(operand)),
        ExprKind::Binary { op, left, right } => {
            format!("({} {} {})", sexp(left), op.as_symbol(), sexp(right))
        }
        ExprKind::Logical { op, left, right } => {
            format!("({} {} {})", sexp(left), op.as_symbol(), sexp(right))
        }
        ExprKind::Array(items) => {
            let items: Vec<String> = items.iter().map(sexp).collect();
            format!("[{}]", items.join(", "))
        }
        ExprKind::Index { object, index } => format!("{}[{}]", sexp(object), sexp(index)),
        ExprKind::Member { object, property } => format!("{}.{}", sexp(object), property.name),
        ExprKind::Assign { op, target, value } => {
            format!("({} {} {})", sexp(target), op.as_symbol(), sexp(value))
        }
        ExprKind::Update { op, prefix, target } => {
            if *prefix {
                format!("({}{})", op.as_symbol(), sexp(target))
            } else {
                format!("({}{})", sexp(target), op.as_symbol())
            }
        }
        ExprKind::Call { callee, args } => {
            let args: Vec<String> = args.iter().map(sexp).collect();
            format!("{}({})", sexp(callee), args.join(", "))
        }
    }
}

#[test]
fn function_with_params() {
    let program = parse_ok("function add(a, b) { return a + b; }");
    assert_eq!(program.functions.len(), 1);
    let f = &program.functions[0];
    assert_eq!(f.name.as_ref().map(|n| n.name.as_str()), Some("add"));
    let params: Vec<&str> = f
        .params
        .iter()
        .map(|p| match p {
            Binding::Ident(ident) => ident.name.as_str(),
            Binding::Pattern(_) => "<pattern>",
        })
        .collect();
    assert_eq!(params, vec!["a", "b"]);
}

#[test]
fn several_functions() {
    let program = parse_ok("function a() {} function b() { return 1 }");
    assert!(program.function("a").is_some());
    assert!(program.function("b").is_some());
}

#[test]
fn anonymous_function_parses_without_name() {
    let program = parse_ok("function (a) { return a; }");
    assert!(program.functions[0].name.is_none());
}

#[test]
fn destructuring_is_kept_as_pattern() {
    let program = parse_ok("function f([a, b]) { var {c, d} = x; }");
    let f = &program.functions[0];
    assert!(matches!(f.params[0], Binding::Pattern(_)));
    let StmtKind::VarDecl(decls) = &f.body.stmts[0].kind else {
        panic!("expected declaration");
    };
    assert!(matches!(decls[0].binding, Binding::Pattern(_)));
}

#[test]
fn precedence() {
    assert_eq!(sexp(&expr("1 + 2 * 3")), "(1 + (2 * 3))");
    assert_eq!(sexp(&expr("a - b - c")), "((a - b) - c)");
    assert_eq!(sexp(&expr("a < b == c > d")), "((a < b) == (c > d))");
    assert_eq!(sexp(&expr("a || b && c")), "(a || (b && c))");
    assert_eq!(sexp(&expr("a & b | c ^ d")), "((a & b) | (c ^ d))");
    assert_eq!(sexp(&expr("2 ** 3 ** 2")), "(2 ** (3 ** 2))");
    assert_eq!(sexp(&expr("(1 + 2) * 3")), "((1 + 2) * 3)");
    assert_eq!(sexp(&expr("a << 1 + 2")), "(a << (1 + 2))");
}

#[test]
fn unary_and_update() {
    assert_eq!(sexp(&expr("-a * !b")), "((-a) * (!b))");
    assert_eq!(sexp(&expr("++i + j--")), "((++i) + (j--))");
    let e = expr("~x");
    assert!(matches!(
        e.kind,
        ExprKind::Unary {
            op: UnaryOp::BitNot,
            ..
        }
    ));
    let e = expr("i++");
    assert!(matches!(
        e.kind,
        ExprKind::Update {
            op: UpdateOp::Increment,
            prefix: false,
            ..
        }
    ));
}

#[test]
fn assignment_is_right_associative() {
    assert_eq!(sexp(&expr("a = b = 3")), "(a = (b = 3))");
    assert_eq!(sexp(&expr("arr[i] += 2")), "(arr[i] += 2)");
    let e = expr("x <<= 1");
    assert!(matches!(
        e.kind,
        ExprKind::Assign {
            op: AssignOp::Compound(BinaryOp::Shl),
            ..
        }
    ));
}

#[test]
fn postfix_chains() {
    assert_eq!(sexp(&expr("f(a, b[1])[0]")), "f(a, b[1])[0]");
    assert_eq!(sexp(&expr("arr.length - 1")), "(arr.length - 1)");
    assert_eq!(sexp(&expr("[1, 2.5, 3,]")), "[1, 2.5, 3]");
}

#[test]
fn logical_is_not_binary() {
    let e = expr("a && b");
    assert!(matches!(
        e.kind,
        ExprKind::Logical {
            op: LogicalOp::And,
            ..
        }
    ));
}

#[test]
fn control_flow_statements() {
    let program = parse_ok(
        "function f(n) {
            var total = 0, i;
            for (i = 0; i < n; i++) { total += i; }
            for (var j = 0; ; ) { break_out(); }
            for (;;) ;
            while (n > 0) n--;
            if (total > 10) { return 1; } else if (total > 5) return 2; else { return 3 }
        }",
    );
    let stmts = &program.functions[0].body.stmts;
    assert_eq!(stmts.len(), 6);

    let StmtKind::VarDecl(decls) = &stmts[0].kind else {
        panic!("expected declaration");
    };
    assert_eq!(decls.len(), 2);
    assert!(decls[0].init.is_some());
    assert!(decls[1].init.is_none());

    assert!(matches!(
        &stmts[1].kind,
        StmtKind::For {
            init: Some(ForInit::Expr(_)),
            test: Some(_),
            update: Some(_),
            ..
        }
    ));
    assert!(matches!(
        &stmts[2].kind,
        StmtKind::For {
            init: Some(ForInit::VarDecl(_)),
            test: None,
            update: None,
            ..
        }
    ));
    assert!(matches!(
        &stmts[3].kind,
        StmtKind::For {
            init: None,
            test: None,
            update: None,
            ..
        }
    ));
    assert!(matches!(&stmts[4].kind, StmtKind::While { .. }));

    let StmtKind::If { alternate, .. } = &stmts[5].kind else {
        panic!("expected if");
    };
    let Some(alternate) = alternate else {
        panic!("expected else branch");
    };
    assert!(matches!(alternate.kind, StmtKind::If { .. }));
}

#[test]
fn semicolons_are_optional_at_line_breaks() {
    let program = parse_ok("function f() {\n var x = 1\n x = x + 1\n return x\n}");
    assert_eq!(program.functions[0].body.stmts.len(), 3);
}

#[test]
fn bare_return() {
    let program = parse_ok("function f() { return; }");
    assert!(matches!(
        program.functions[0].body.stmts[0].kind,
        StmtKind::Return(None)
    ));
    let program = parse_ok("function f() { return }");
    assert!(matches!(
        program.functions[0].body.stmts[0].kind,
        StmtKind::Return(None)
    ));
}

#[test]
fn expression_ids_are_unique() {
    let program = parse_ok("function f(a) { return a + a * 2; }");
    let StmtKind::Return(Some(e)) = &program.functions[0].body.stmts[0].kind else {
        panic!("expected return");
    };
    let mut ids = Vec::new();
    collect_ids(e, &mut ids);
    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(ids.len(), unique.len());
    assert_eq!(ids.len(), 5);
}

fn collect_ids(e: &Expr, out: &mut Vec<ember_ir::ExprId>) {
    out.push(e.id);
    if let ExprKind::Binary { left, right, .. } = &e.kind {
        collect_ids(left, out);
        collect_ids(right, out);
    }
}

#[test]
fn spans_cover_source_text() {
    let source = "function f() { return alpha + beta; }";
    let e = expr("alpha + beta");
    let range = e.span.to_range();
    // `expr` wraps the text at the same offsets as `source`.
    assert_eq!(&source[range], "alpha + beta");
}

#[test]
fn syntax_errors() {
    for source in [
        "var x = 1;",
        "function f( { }",
        "function f() { return 1 + ; }",
        "function f() { 1 = 2; }",
        "function f() { a b }",
        "function f() { function g() {} }",
        "function f() { return",
        "function f([a) {}",
    ] {
        let err = parse(source).unwrap_err();
        assert!(
            matches!(err, CompileError::Syntax { .. }),
            "{source}: {err:?}"
        );
    }
}

#[test]
fn deeply_nested_parentheses() {
    let depth = 5_000;
    let nested = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    let e = expr(&nested);
    assert!(matches!(e.kind, ExprKind::Number(n) if n == 1.0));
}

mod properties {
    use proptest::prelude::*;

    use super::{expr, sexp};

    proptest! {
        #[test]
        fn integer_literals_round_trip(n in 0u32..1_000_000) {
            let e = expr(&n.to_string());
            prop_assert_eq!(sexp(&e), n.to_string());
        }

        #[test]
        fn left_associative_subtraction(count in 1usize..20) {
            let names: Vec<String> = (0..=count).map(|i| format!("v{i}")).collect();
            let e = expr(&names.join(" - "));
            let mut expected = names[0].clone();
            for name in &names[1..] {
                expected = format!("({expected} - {name})");
            }
            prop_assert_eq!(sexp(&e), expected);
        }
    }
}
