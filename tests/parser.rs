use clover::{
    ast::{Program, Stmt},
    diagnostics::{Diagnostic, DiagnosticKind},
    parser,
};

fn parse(source: &str) -> Program {
    parser::parse_program(source).expect("source should parse")
}

fn parse_error(source: &str) -> Diagnostic {
    match parser::parse_program(source) {
        Ok(program) => panic!("expected parse error, got `{program}`"),
        Err(diagnostic) => diagnostic,
    }
}

#[test]
fn operator_precedence_groups_as_expected() {
    let cases = [
        ("-a * b", "((-a) * b)"),
        ("!-a", "(!(-a))"),
        ("a + b + c", "((a + b) + c)"),
        ("a + b - c", "((a + b) - c)"),
        ("a * b * c", "((a * b) * c)"),
        ("a * b / c", "((a * b) / c)"),
        ("a + b / c", "(a + (b / c))"),
        ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f)"),
        ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4))"),
        ("5 < 4 != 3 > 4", "((5 < 4) != (3 > 4))"),
        (
            "3 + 4 * 5 == 3 * 1 + 4 * 5",
            "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)))",
        ),
        ("3 > 5 == false", "((3 > 5) == false)"),
        ("3 < 5 == true", "((3 < 5) == true)"),
        ("(5 + 5) * 2", "((5 + 5) * 2)"),
        ("2 / (5 + 5)", "(2 / (5 + 5))"),
        ("-(5 + 5)", "(-(5 + 5))"),
        ("!(true == true)", "(!(true == true))"),
        ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
        (
            "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
            "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)))",
        ),
        ("add(a + b + c * d / f + g)", "add((((a + b) + ((c * d) / f)) + g))"),
    ];
    for (source, expected) in cases {
        let program = parse(source);
        assert_eq!(format!("{program}"), expected, "{source}");
    }
}

#[test]
fn calls_chain_left_to_right() {
    let program = parse("f(1)(2)");
    assert_eq!(format!("{program}"), "f(1)(2)");
}

#[test]
fn parses_let_statements() {
    let program = parse("let x = 5; let y = true; let foobar = y;");
    assert_eq!(program.statements.len(), 3);
    let names: Vec<&str> = program
        .statements
        .iter()
        .map(|statement| match statement {
            Stmt::Let { name, .. } => name.as_str(),
            other => panic!("expected let statement, got `{other}`"),
        })
        .collect();
    assert_eq!(names, ["x", "y", "foobar"]);
    assert_eq!(
        format!("{program}"),
        "let x = 5; let y = true; let foobar = y;"
    );
}

#[test]
fn parses_return_statements() {
    let program = parse("return 5; return 2 * 3;");
    assert_eq!(program.statements.len(), 2);
    for statement in &program.statements {
        assert!(matches!(statement, Stmt::Return(_)), "got `{statement}`");
    }
    assert_eq!(format!("{program}"), "return 5; return (2 * 3);");
}

#[test]
fn semicolons_between_statements_are_optional() {
    let program = parse("let a = 1 let b = 2 a + b");
    assert_eq!(program.statements.len(), 3);
}

#[test]
fn parses_if_and_if_else_expressions() {
    let program = parse("if (x < y) { x }");
    assert_eq!(format!("{program}"), "if ((x < y)) { x }");

    let program = parse("if (x < y) { x } else { y }");
    assert_eq!(format!("{program}"), "if ((x < y)) { x } else { y }");
}

#[test]
fn parses_function_literals() {
    let cases = [
        ("fn() {}", "fn() { }"),
        ("fn(x) {}", "fn(x) { }"),
        ("fn(x, y, z) {}", "fn(x, y, z) { }"),
        ("fn(x, y) { x + y; }", "fn(x, y) { (x + y) }"),
    ];
    for (source, expected) in cases {
        let program = parse(source);
        assert_eq!(format!("{program}"), expected, "{source}");
    }
}

#[test]
fn parses_nested_blocks_and_statements_inside_bodies() {
    let program = parse("fn(n) { let m = n * 2; if (m > 10) { return m; } m }");
    assert_eq!(
        format!("{program}"),
        "fn(n) { let m = (n * 2); if ((m > 10)) { return m; } m }"
    );
}

#[test]
fn missing_close_paren_is_reported_with_a_span() {
    let diagnostic = parse_error("(1 + 2");
    assert_eq!(diagnostic.kind, DiagnosticKind::Parser);
    assert!(
        diagnostic.message.contains("expected `)`"),
        "{}",
        diagnostic.message
    );
}

#[test]
fn let_without_a_name_is_rejected() {
    let diagnostic = parse_error("let 5 = 6;");
    assert!(
        diagnostic.message.contains("expected binding name"),
        "{}",
        diagnostic.message
    );
    assert!(diagnostic.span.is_some());
}

#[test]
fn keywords_are_rejected_in_name_positions() {
    let diagnostic = parse_error("let if = 3;");
    assert!(
        diagnostic.message.contains("expected binding name"),
        "{}",
        diagnostic.message
    );

    let diagnostic = parse_error("fn(let) { 1 }");
    assert!(
        diagnostic.message.contains("expected parameter name"),
        "{}",
        diagnostic.message
    );
}

#[test]
fn let_without_assign_is_rejected() {
    let diagnostic = parse_error("let x 5;");
    assert!(
        diagnostic.message.contains("expected `=`"),
        "{}",
        diagnostic.message
    );
}

#[test]
fn dangling_operator_is_rejected() {
    let diagnostic = parse_error("let x = ;");
    assert!(
        diagnostic.message.contains("expected expression"),
        "{}",
        diagnostic.message
    );
}

#[test]
fn integer_literal_overflow_is_a_parse_error() {
    let diagnostic = parse_error("9999999999999999999999");
    assert!(
        diagnostic.message.contains("invalid integer literal"),
        "{}",
        diagnostic.message
    );
}

#[test]
fn unrecognized_characters_are_reported() {
    let diagnostic = parse_error("let a = 5 @ 3;");
    assert_eq!(diagnostic.kind, DiagnosticKind::Lexer);
    assert!(
        diagnostic.message.contains("unrecognized character `@`"),
        "{}",
        diagnostic.message
    );
}

#[test]
fn line_comments_are_ignored() {
    let program = parse("// leading note\nlet a = 1; // trailing note\na");
    assert_eq!(program.statements.len(), 2);
}

#[test]
fn if_condition_requires_parentheses() {
    let diagnostic = parse_error("if x < y { x }");
    assert!(
        diagnostic.message.contains("expected `(`"),
        "{}",
        diagnostic.message
    );
}
