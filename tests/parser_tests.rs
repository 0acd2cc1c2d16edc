// Integration tests for the Pika parser
//
// Covers the shape of the produced AST, operator precedence, the backtracking
// used to recognise arrow functions, syntax error reporting, and printing a
// program back to source that reparses into the same tree.

use pika::ast::{AssignOp, BinaryOp, Expr, LogicalOp, Program, Stmt, UnaryOp, UpdateOp};
use pika::errors::SyntaxError;
use pika::interpreter::{Environment, Interpreter};
use pika::parser::parse_source;
use std::sync::{Arc, Mutex};

fn parse_ok(code: &str) -> Program {
    match parse_source(code) {
        Ok(program) => program,
        Err(err) => panic!("Expected {:?} to parse, got: {} at {}", code, err, err.location),
    }
}

fn parse_expr(code: &str) -> Expr {
    let mut program = parse_ok(code);
    assert_eq!(program.body.len(), 1, "expected a single statement in {:?}", code);
    match program.body.remove(0) {
        Stmt::Expression(expr) => expr,
        other => panic!("Expected an expression statement, got {:?}", other),
    }
}

fn parse_err(code: &str) -> SyntaxError {
    match parse_source(code) {
        Ok(program) => panic!("Expected {:?} to fail, got {:?}", code, program),
        Err(err) => err,
    }
}

fn ident(name: &str) -> Box<Expr> {
    Box::new(Expr::Identifier(name.to_string()))
}

fn num(n: f64) -> Box<Expr> {
    Box::new(Expr::NumericLiteral(n))
}

#[test]
fn test_variable_declarations() {
    let program = parse_ok("var x = 1 + 2; const y = x\nvar z");
    assert_eq!(
        program.body,
        vec![
            Stmt::VariableDeclaration {
                name: "x".to_string(),
                is_const: false,
                value: Some(Expr::Binary { left: num(1.0), op: BinaryOp::Add, right: num(2.0) }),
            },
            Stmt::VariableDeclaration {
                name: "y".to_string(),
                is_const: true,
                value: Some(Expr::Identifier("x".to_string())),
            },
            Stmt::VariableDeclaration { name: "z".to_string(), is_const: false, value: None },
        ]
    );
}

#[test]
fn test_stray_semicolons_are_skipped() {
    assert!(parse_ok("").body.is_empty());
    assert!(parse_ok(";;;").body.is_empty());
    assert_eq!(parse_ok(";;var x = 1;;; x;").body.len(), 2);
    match &parse_ok("fn f() { ;; return; ; }").body[0] {
        Stmt::FunctionDeclaration { body, .. } => assert_eq!(**body, vec![Stmt::Return(None)]),
        other => panic!("Expected a function declaration, got {:?}", other),
    }
}

#[test]
fn test_assignment_is_right_associative() {
    assert_eq!(
        parse_expr("a = b += 1"),
        Expr::Assignment {
            target: ident("a"),
            op: AssignOp::Assign,
            value: Box::new(Expr::Assignment { target: ident("b"), op: AssignOp::Add, value: num(1.0) }),
        }
    );
}

#[test]
fn test_precedence_levels() {
    // || binds looser than &&, which binds looser than ==
    assert_eq!(
        parse_expr("a || b && c == d"),
        Expr::Logical {
            left: ident("a"),
            op: LogicalOp::Or,
            right: Box::new(Expr::Logical {
                left: ident("b"),
                op: LogicalOp::And,
                right: Box::new(Expr::Binary { left: ident("c"), op: BinaryOp::Equal, right: ident("d") }),
            }),
        }
    );

    assert_eq!(
        parse_expr("1 + 2 * 3"),
        Expr::Binary {
            left: num(1.0),
            op: BinaryOp::Add,
            right: Box::new(Expr::Binary { left: num(2.0), op: BinaryOp::Mul, right: num(3.0) }),
        }
    );

    assert_eq!(
        parse_expr("2 ** 3 ** 2"),
        Expr::Binary {
            left: Box::new(Expr::Binary { left: num(2.0), op: BinaryOp::Pow, right: num(3.0) }),
            op: BinaryOp::Pow,
            right: num(2.0),
        }
    );
    assert_eq!(parse_expr("2 ^ 3"), parse_expr("2 ** 3"));
}

#[test]
fn test_unary_and_update_operators() {
    assert_eq!(
        parse_expr("!-x"),
        Expr::Unary {
            op: UnaryOp::Not,
            argument: Box::new(Expr::Unary { op: UnaryOp::Minus, argument: ident("x"), is_prefix: true }),
            is_prefix: true,
        }
    );
    assert_eq!(
        parse_expr("i++"),
        Expr::Update { op: UpdateOp::Increment, argument: "i".to_string(), is_prefix: false }
    );
    assert_eq!(
        parse_expr("--i"),
        Expr::Update { op: UpdateOp::Decrement, argument: "i".to_string(), is_prefix: true }
    );
}

#[test]
fn test_ternary_nests_in_alternate() {
    assert_eq!(
        parse_expr("a ? b : c ? d : e"),
        Expr::Conditional {
            test: ident("a"),
            consequent: ident("b"),
            alternate: Box::new(Expr::Conditional {
                test: ident("c"),
                consequent: ident("d"),
                alternate: ident("e"),
            }),
        }
    );
}

#[test]
fn test_ternary_branches_take_full_expressions() {
    assert_eq!(
        parse_expr("a ? b = 1 : c = 2"),
        Expr::Conditional {
            test: ident("a"),
            consequent: Box::new(Expr::Assignment { target: ident("b"), op: AssignOp::Assign, value: num(1.0) }),
            alternate: Box::new(Expr::Assignment { target: ident("c"), op: AssignOp::Assign, value: num(2.0) }),
        }
    );
}

#[test]
fn test_member_and_call_chains() {
    assert_eq!(
        parse_expr("a.b[0](1)"),
        Expr::Call {
            callee: Box::new(Expr::Member {
                object: Box::new(Expr::Member { object: ident("a"), property: ident("b"), is_computed: false }),
                property: num(0.0),
                is_computed: true,
            }),
            args: vec![Expr::NumericLiteral(1.0)],
        }
    );

    match parse_expr("[1, 2][0]") {
        Expr::Member { object, is_computed: true, .. } => {
            assert!(matches!(*object, Expr::ArrayLiteral(ref items) if items.len() == 2))
        }
        other => panic!("Expected a computed member, got {:?}", other),
    }

    match parse_expr("{ a: 1 }.a") {
        Expr::Member { object, property, is_computed: false } => {
            assert!(matches!(*object, Expr::ObjectLiteral(_)));
            assert_eq!(property, ident("a"));
        }
        other => panic!("Expected a member of an object literal, got {:?}", other),
    }
}

#[test]
fn test_arrow_functions_and_backtracking() {
    match parse_expr("(a, b) => { return a + b }") {
        Expr::ArrowFunction { params, body } => {
            assert_eq!(params, vec!["a".to_string(), "b".to_string()]);
            assert_eq!(body.len(), 1);
        }
        other => panic!("Expected an arrow function, got {:?}", other),
    }

    // Parenthesised expressions that look like parameter lists
    assert_eq!(parse_expr("(x)"), Expr::Identifier("x".to_string()));
    assert_eq!(
        parse_expr("(a + b) * c"),
        Expr::Binary {
            left: Box::new(Expr::Binary { left: ident("a"), op: BinaryOp::Add, right: ident("b") }),
            op: BinaryOp::Mul,
            right: ident("c"),
        }
    );
    assert!(matches!(parse_expr("() => {}"), Expr::ArrowFunction { ref params, .. } if params.is_empty()));
}

#[test]
fn test_object_literal_keys() {
    match parse_expr("{ a: 1, \"b c\": 2, d }") {
        Expr::ObjectLiteral(properties) => {
            let keys: Vec<&str> = properties.iter().map(|p| p.key.as_str()).collect();
            assert_eq!(keys, vec!["a", "b c", "d"]);
            assert!(properties[2].value.is_none());
        }
        other => panic!("Expected an object literal, got {:?}", other),
    }
}

#[test]
fn test_control_flow_statements() {
    let program = parse_ok(
        r#"
        if a { x } else if b { y } else if c { z } else { w }
        while (n < 3) { n++ }
        for (;;) { break }
        switch v { case 1, 2: one; case 3: three; default: other }
        "#,
    );
    assert_eq!(program.body.len(), 4);

    match &program.body[0] {
        Stmt::If { else_if, else_body, .. } => {
            assert_eq!(else_if.len(), 2);
            assert!(else_body.is_some());
        }
        other => panic!("Expected an if statement, got {:?}", other),
    }
    assert!(matches!(&program.body[1], Stmt::While { .. }));
    assert_eq!(
        program.body[2],
        Stmt::For { init: None, test: None, update: None, body: vec![Stmt::Break] }
    );
    match &program.body[3] {
        Stmt::Switch { cases, default_body, .. } => {
            assert_eq!(cases.len(), 2);
            assert_eq!(cases[0].tests.len(), 2);
            assert_eq!(default_body.as_ref().map(Vec::len), Some(1));
        }
        other => panic!("Expected a switch statement, got {:?}", other),
    }
}

#[test]
fn test_for_header_forms() {
    match &parse_ok("for var i = 0; i < 3; i++ { continue }").body[0] {
        Stmt::For { init, test, update, body } => {
            assert!(matches!(init.as_deref(), Some(Stmt::VariableDeclaration { .. })));
            assert!(test.is_some());
            assert!(update.is_some());
            assert_eq!(body, &vec![Stmt::Continue]);
        }
        other => panic!("Expected a for statement, got {:?}", other),
    }
}

#[test]
fn test_syntax_error_messages() {
    let cases = [
        ("var 1 = 2", "expected identifier after 'var' or 'const'", "1"),
        ("const x", "expected '=' after constant name", ""),
        ("fn (a) {}", "expected function name", "("),
        ("if { }", "condition cannot be empty", "{"),
        ("switch x { default: 1 default: 2 }", "duplicate default case", "default"),
        ("switch x { 1 }", "expected 'case' or 'default'", "1"),
        ("var x = *", "expected an expression", "*"),
        ("print(1", "expected ')'", ""),
        ("fn f() { return 1", "expected '}'", ""),
        ("++1", "expected identifier", "1"),
        ("{ 1: 2 }", "expected a key", "1"),
        ("fn f(1) {}", "expected identifier", "1"),
        ("fn f(a, \"b\") {}", "expected identifier", "b"),
        ("(1, 2) => {}", "expected ')'", ","),
    ];

    for (code, message, found) in cases {
        let err = parse_err(code);
        assert_eq!(err.message, message, "message for {:?}", code);
        assert_eq!(err.found, found, "found token for {:?}", code);
    }
}

#[test]
fn test_syntax_error_positions() {
    let err = parse_err("var x = *");
    assert_eq!((err.location.line, err.location.column), (1, 9));

    let err = parse_err("var a = 1\n\nwhile {");
    assert_eq!((err.location.line, err.location.column), (3, 7));
}

#[test]
fn test_lexer_errors_surface_through_parse_source() {
    assert_eq!(parse_err("var s = \"abc").message, "unterminated string literal");
    assert_eq!(parse_err("/* open").message, "unterminated block comment");
    assert_eq!(parse_err("var a = @").message, "unexpected character");
}

fn evaluate(program: &Program) -> (String, String) {
    let mut interp = Interpreter::new();
    let sink = Arc::new(Mutex::new(Vec::new()));
    interp.set_output(sink.clone());
    let result = match interp.evaluate_program(program, &Environment::new()) {
        Ok(value) => value.to_string(),
        Err(err) => format!("error: {}", err),
    };
    let output = String::from_utf8(sink.lock().unwrap().clone()).unwrap();
    (result, output)
}

#[test]
fn test_printed_programs_reparse_to_the_same_tree() {
    let programs = [
        "1 + 2 * 3 - -4",
        "var a = 1; var b = 2; a = b += 3; print(a, b)",
        "2 ** 3 ** 2 ^ 0.5",
        "var i = 0; var s = !i && i++ || --i; print(s, i)",
        "const o = { a: 1, \"b c\": [true, null, NaN], nested: { x: 'q\"uote\\n' } }; o[\"b c\"][0]",
        "var x = 5; const o = { x }; o.x ? o.x * 2 : 0",
        "fn fact(n) { if n <= 1 { return 1 } return n * fact(n - 1) } fact(6)",
        "const sq = (x) => { return x * x }; ((y) => { return sq(y) + 1 })(3)",
        "var t = 0; for (var i = 0; i < 5; i++) { if i % 2 == 0 { continue } else if i > 3 { break } else { t += i } } t",
        "var n = 0; while n < 3 { n++; } switch n { case 1, 2: print(\"low\"); case n > 2: print(\"high\"); default: print() }",
        "var arr = [1, 2]; arr[5] = 1 / 0; arr",
        "fn noop() { return } noop()",
    ];

    for code in programs {
        let original = parse_ok(code);
        let printed = original.to_string();
        let reparsed = match parse_source(&printed) {
            Ok(program) => program,
            Err(err) => panic!("Printed form of {:?} failed to parse: {}\n{}", code, err, printed),
        };
        assert_eq!(original, reparsed, "round trip of {:?} via\n{}", code, printed);
        assert_eq!(evaluate(&original), evaluate(&reparsed), "evaluation of {:?}", code);
    }
}

#[test]
fn test_ast_serializes_to_json() {
    let program = parse_ok("var x = [1, \"a\"]");
    let json = serde_json::to_value(&program).unwrap();
    assert!(json["body"].is_array());
    assert_eq!(json["body"].as_array().map(Vec::len), Some(1));
}
