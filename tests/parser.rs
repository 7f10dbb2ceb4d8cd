use std::cell::RefCell;
use std::rc::Rc;

use rilox::ast::{Expr, LiteralValue, Stmt};
use rilox::ast_printer::AstPrinter;
use rilox::diagnostics::Diagnostics;
use rilox::parser::Parser;
use rilox::scanner::Scanner;
use rilox::token::Token;

fn scan(source: &str) -> Vec<Token> {
    Scanner::new(source.as_bytes())
        .filter_map(Result::ok)
        .collect()
}

/// Parse a single expression and render it in prefix form.
fn prefix(source: &str) -> String {
    let tokens = scan(source);
    let sink: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
    let mut diagnostics = Diagnostics::with_output(sink);

    let expr = Parser::new(&tokens, &mut diagnostics)
        .parse_expression()
        .expect("expression should parse");

    AstPrinter::print(&expr)
}

/// Parse a program, returning the statements, the captured diagnostic
/// output, and whether any error was reported.
fn parse_program(source: &str) -> (Vec<Stmt>, String, bool) {
    let tokens = scan(source);
    let sink: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
    let mut diagnostics = Diagnostics::with_output(sink.clone());

    let statements = Parser::new(&tokens, &mut diagnostics).parse();
    let had_error = diagnostics.had_error();
    let output = String::from_utf8(sink.borrow().clone()).unwrap();

    (statements, output, had_error)
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_eq!(prefix("1 + 2 * 3"), "(+ 1 (* 2 3))");
}

#[test]
fn grouping_overrides_precedence() {
    assert_eq!(prefix("(1 + 2) * 3"), "(* (group (+ 1 2)) 3)");
}

#[test]
fn subtraction_is_left_associative() {
    assert_eq!(prefix("1 - 2 - 3"), "(- (- 1 2) 3)");
}

#[test]
fn unary_operators_nest() {
    assert_eq!(prefix("!!true"), "(! (! true))");
    assert_eq!(prefix("-4 * 5"), "(* (- 4) 5)");
}

#[test]
fn comparison_binds_tighter_than_equality() {
    assert_eq!(prefix("1 < 2 == true"), "(== (< 1 2) true)");
}

#[test]
fn and_binds_tighter_than_or() {
    assert_eq!(prefix("a or b and c"), "(or a (and b c))");
}

#[test]
fn assignment_is_right_associative() {
    assert_eq!(prefix("a = b = 1"), "(= a (= b 1))");
}

#[test]
fn chained_calls_and_property_access() {
    assert_eq!(prefix("f(1)(2).y"), "(. (call (call f 1) 2) y)");
    assert_eq!(prefix("a.b.c"), "(. (. a b) c)");
    assert_eq!(prefix("a.b = 3"), "(.= a b 3)");
}

#[test]
fn number_literals_render_like_runtime_values() {
    assert_eq!(prefix("1 + 2.5"), "(+ 1 2.5)");
}

#[test]
fn invalid_assignment_target_is_reported() {
    let (_, output, had_error) = parse_program("1 = 2;");

    assert!(had_error);
    assert!(output.contains("Invalid assignment target."), "{}", output);
}

#[test]
fn synchronization_recovers_the_next_statement() {
    let (statements, output, had_error) = parse_program("var = 1;\nprint 42;");

    assert!(had_error);
    assert!(output.contains("[line 1] Error at '='"), "{}", output);
    assert_eq!(output.lines().count(), 1, "exactly one error: {}", output);

    // The malformed declaration is dropped; the print survives.
    assert_eq!(statements.len(), 1);
    assert!(matches!(&statements[0], Stmt::Print(_)));
}

#[test]
fn error_at_end_of_input_names_the_location() {
    let (_, output, had_error) = parse_program("print 1");

    assert!(had_error);
    assert!(output.contains("Error at end"), "{}", output);
}

#[test]
fn for_loop_desugars_to_block_and_while() {
    let (statements, _, had_error) = parse_program("for (var i = 0; i < 3; i = i + 1) print i;");

    assert!(!had_error);
    assert_eq!(statements.len(), 1);

    let Stmt::Block(outer) = &statements[0] else {
        panic!("expected desugared Block, got {:?}", statements[0]);
    };

    assert_eq!(outer.len(), 2);
    assert!(matches!(&outer[0], Stmt::Var { .. }));

    let Stmt::While { body, .. } = &outer[1] else {
        panic!("expected While, got {:?}", outer[1]);
    };

    // Body is the original statement followed by the increment.
    let Stmt::Block(inner) = body.as_ref() else {
        panic!("expected Block body, got {:?}", body);
    };

    assert_eq!(inner.len(), 2);
    assert!(matches!(&inner[0], Stmt::Print(_)));
    assert!(matches!(&inner[1], Stmt::Expression(Expr::Assign { .. })));
}

#[test]
fn bare_for_desugars_to_while_true() {
    let (statements, _, had_error) = parse_program("for (;;) break_me;");

    assert!(!had_error);
    assert_eq!(statements.len(), 1);

    let Stmt::While { condition, body } = &statements[0] else {
        panic!("expected While, got {:?}", statements[0]);
    };

    assert_eq!(*condition, Expr::Literal(LiteralValue::True));
    assert!(matches!(body.as_ref(), Stmt::Expression(_)));
}

#[test]
fn class_bodies_hold_only_methods() {
    let (statements, _, had_error) =
        parse_program("class Point { init(x) { this.x = x; } getX() { return this.x; } }");

    assert!(!had_error);

    let Stmt::Class { name, methods } = &statements[0] else {
        panic!("expected Class, got {:?}", statements[0]);
    };

    assert_eq!(name.lexeme, "Point");
    assert_eq!(methods.len(), 2);
    assert_eq!(methods[0].name.lexeme, "init");
    assert_eq!(methods[0].params.len(), 1);
    assert_eq!(methods[1].name.lexeme, "getX");
}

#[test]
fn using_super_is_a_plain_parse_error() {
    let (_, output, had_error) = parse_program("print super.x;");

    assert!(had_error);
    assert!(output.contains("Expected expression."), "{}", output);
}
