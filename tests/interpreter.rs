use std::cell::RefCell;
use std::rc::Rc;

use rilox::session::Session;

/// Run a program through a fresh session and capture everything it
/// writes — `print` output and error reports share one sink.
fn run_capture(source: &str) -> (String, bool, bool) {
    let sink: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
    let mut session = Session::with_output(sink.clone());

    session.run(source);

    let output = String::from_utf8(sink.borrow().clone()).unwrap();
    (output, session.had_error(), session.had_runtime_error())
}

fn output_of(source: &str) -> String {
    let (output, had_error, had_runtime_error) = run_capture(source);

    assert!(!had_error, "unexpected static error:\n{}", output);
    assert!(!had_runtime_error, "unexpected runtime fault:\n{}", output);

    output
}

#[test]
fn stringify_drops_integral_fraction() {
    assert_eq!(
        output_of("print 6.0; print 6.5; print 100;"),
        "6\n6.5\n100\n"
    );
}

#[test]
fn stringify_primitives() {
    assert_eq!(
        output_of("print nil; print true; print false; print \"hi\";"),
        "nil\ntrue\nfalse\nhi\n"
    );
}

#[test]
fn arithmetic_follows_precedence() {
    assert_eq!(output_of("print 1 + 2 * 3;"), "7\n");
    assert_eq!(output_of("print (1 + 2) * 3;"), "9\n");
    assert_eq!(output_of("print 10 - 4 - 3;"), "3\n");
}

#[test]
fn string_concatenation() {
    assert_eq!(output_of("print \"a\" + \"b\";"), "ab\n");
}

#[test]
fn division_by_zero_follows_ieee() {
    assert_eq!(output_of("print 1 / 0;"), "inf\n");
    assert_eq!(output_of("print -1 / 0;"), "-inf\n");
}

#[test]
fn mixed_plus_operands_fault() {
    let (output, had_error, had_runtime_error) = run_capture("print 1 + \"1\";");

    assert!(!had_error);
    assert!(had_runtime_error);
    assert!(
        output.contains("Operands must be two numbers or two strings."),
        "{}",
        output
    );
    assert!(output.contains("[line 1]"), "{}", output);
}

#[test]
fn unary_minus_requires_a_number() {
    let (output, _, had_runtime_error) = run_capture("print -\"muffin\";");

    assert!(had_runtime_error);
    assert!(output.contains("Operand must be a number."), "{}", output);
}

#[test]
fn comparison_requires_numbers() {
    let (output, _, had_runtime_error) = run_capture("print 1 < \"2\";");

    assert!(had_runtime_error);
    assert!(output.contains("Operand must be a number."), "{}", output);
}

#[test]
fn arithmetic_requires_numbers() {
    let (output, _, had_runtime_error) = run_capture("print \"3\" * 2;");

    assert!(had_runtime_error);
    assert!(output.contains("Operand must be a number."), "{}", output);
}

#[test]
fn equality_never_coerces() {
    assert_eq!(
        output_of("print nil == nil; print nil == false; print 0 == false; print \"1\" == 1;"),
        "true\nfalse\nfalse\nfalse\n"
    );
}

// Equality is defined for primitives only: a function, class, or
// instance is never equal to anything, itself included.
#[test]
fn non_primitives_are_never_equal() {
    let source = "\
fun f() {}
class C {}
var c = C();
print f == f;
print C == C;
print c == c;
print c != c;
";
    assert_eq!(output_of(source), "false\nfalse\nfalse\ntrue\n");
}

#[test]
fn only_nil_and_false_are_falsy() {
    assert_eq!(
        output_of("print !nil; print !false; print !0; print !\"\"; print !true;"),
        "true\ntrue\nfalse\nfalse\nfalse\n"
    );
}

// Logical operators return an operand, not a boolean.
#[test]
fn logical_operators_short_circuit() {
    assert_eq!(output_of("print nil or \"fallback\";"), "fallback\n");
    assert_eq!(output_of("print 0 or 2;"), "0\n");
    assert_eq!(output_of("print false and ignored;"), "false\n");
    assert_eq!(output_of("print 1 and 2;"), "2\n");
}

#[test]
fn undefined_variable_faults_and_aborts() {
    let (output, had_error, had_runtime_error) = run_capture("print 1; print x; print 2;");

    assert!(!had_error);
    assert!(had_runtime_error);
    assert_eq!(output, "1\nUndefined variable 'x'.\n[line 1]\n");
}

#[test]
fn assignment_evaluates_to_the_assigned_value() {
    assert_eq!(output_of("var a = 1; print a = 2; print a;"), "2\n2\n");
}

#[test]
fn assigning_an_undefined_variable_faults() {
    let (output, _, had_runtime_error) = run_capture("x = 1;");

    assert!(had_runtime_error);
    assert!(output.contains("Undefined variable 'x'."), "{}", output);
}

#[test]
fn blocks_scope_and_restore() {
    let source = "\
var a = \"outer\";
{
  var a = \"inner\";
  print a;
}
print a;
";
    assert_eq!(output_of(source), "inner\nouter\n");
}

#[test]
fn while_loop_counts() {
    assert_eq!(
        output_of("var i = 0; while (i < 3) { print i; i = i + 1; }"),
        "0\n1\n2\n"
    );
}

#[test]
fn for_loop_runs_initializer_condition_increment() {
    assert_eq!(
        output_of("for (var i = 0; i < 3; i = i + 1) print i;"),
        "0\n1\n2\n"
    );
}

#[test]
fn closures_share_their_environment() {
    let source = "\
fun makeCounter() {
  var count = 0;
  fun increment() {
    count = count + 1;
    return count;
  }
  return increment;
}
var counter = makeCounter();
print counter();
print counter();
";
    assert_eq!(output_of(source), "1\n2\n");
}

#[test]
fn functions_print_their_name() {
    assert_eq!(
        output_of("fun greet() {} print greet; print clock;"),
        "<fn greet>\n<native fn>\n"
    );
}

#[test]
fn function_without_return_yields_nil() {
    assert_eq!(output_of("fun f() { 1 + 1; } print f();"), "nil\n");
}

#[test]
fn return_unwinds_nested_blocks() {
    let source = "\
fun f() {
  while (true) {
    { return \"escaped\"; }
  }
}
print f();
";
    assert_eq!(output_of(source), "escaped\n");
}

#[test]
fn arity_mismatch_faults_and_aborts() {
    let (output, _, had_runtime_error) = run_capture("fun f(a, b) {} f(1); print \"after\";");

    assert!(had_runtime_error);
    assert!(
        output.contains("Expected 2 arguments but got 1."),
        "{}",
        output
    );
    assert!(!output.contains("after"), "{}", output);
}

#[test]
fn calling_a_non_callable_faults() {
    let (output, _, had_runtime_error) = run_capture("\"not a function\"();");

    assert!(had_runtime_error);
    assert!(
        output.contains("Can only call functions and classes."),
        "{}",
        output
    );
}

#[test]
fn native_clock_returns_a_number() {
    assert_eq!(output_of("print clock() >= 0;"), "true\n");
}

#[test]
fn class_initializer_and_method_dispatch() {
    let source = "\
class Point {
  init(x) {
    this.x = x;
  }
  getX() {
    return this.x;
  }
}
var p = Point(5);
print p.getX();
";
    assert_eq!(output_of(source), "5\n");
}

#[test]
fn classes_and_instances_stringify() {
    assert_eq!(
        output_of("class Widget {} print Widget; print Widget();"),
        "Widget\nWidget instance\n"
    );
}

#[test]
fn fields_shadow_methods() {
    let source = "\
class Box {
  label() { return \"method\"; }
}
var b = Box();
print b.label();
b.label = \"field\";
print b.label;
";
    assert_eq!(output_of(source), "method\nfield\n");
}

#[test]
fn undefined_property_faults() {
    let (output, _, had_runtime_error) = run_capture("class C {} print C().missing;");

    assert!(had_runtime_error);
    assert!(
        output.contains("Undefined property 'missing'."),
        "{}",
        output
    );
}

#[test]
fn property_access_on_non_instance_faults() {
    let (output, _, had_runtime_error) = run_capture("var s = \"str\"; print s.len;");

    assert!(had_runtime_error);
    assert!(
        output.contains("Only instances have properties."),
        "{}",
        output
    );
}

#[test]
fn property_write_on_non_instance_faults() {
    let (output, _, had_runtime_error) = run_capture("var s = \"str\"; s.len = 3;");

    assert!(had_runtime_error);
    assert!(output.contains("Only instances have fields."), "{}", output);
}

// A method pulled off an instance stays bound to it.
#[test]
fn detached_methods_remember_their_instance() {
    let source = "\
class Point {
  init(x) { this.x = x; }
  getX() { return this.x; }
}
var m = Point(9).getX;
print m();
";
    assert_eq!(output_of(source), "9\n");
}

#[test]
fn bare_return_in_initializer_yields_the_instance() {
    let source = "\
class C {
  init() {
    this.ready = true;
    return;
  }
}
print C();
";
    assert_eq!(output_of(source), "C instance\n");
}

#[test]
fn calling_init_directly_returns_the_instance() {
    let source = "\
class C {
  init() {}
}
var c = C();
print c.init();
";
    assert_eq!(output_of(source), "C instance\n");
}

#[test]
fn state_persists_across_session_runs() {
    let sink: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
    let mut session = Session::with_output(sink.clone());

    session.run("var x = 1;");
    session.run("fun double(n) { return n * 2; }");
    session.run("print double(x + 1);");

    let output = String::from_utf8(sink.borrow().clone()).unwrap();
    assert_eq!(output, "4\n");
}

#[test]
fn a_bad_line_does_not_poison_the_session() {
    let sink: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
    let mut session = Session::with_output(sink.clone());

    session.run("var = oops;");
    assert!(session.had_error());
    session.reset_static_error();

    session.run("print \"recovered\";");
    assert!(!session.had_error());

    let output = String::from_utf8(sink.borrow().clone()).unwrap();
    assert!(output.ends_with("recovered\n"), "{}", output);
}

#[test]
fn runtime_fault_does_not_block_later_runs() {
    let sink: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
    let mut session = Session::with_output(sink.clone());

    session.run("print missing;");
    assert!(session.had_runtime_error());

    session.run("print \"still here\";");

    let output = String::from_utf8(sink.borrow().clone()).unwrap();
    assert!(output.ends_with("still here\n"), "{}", output);
}
