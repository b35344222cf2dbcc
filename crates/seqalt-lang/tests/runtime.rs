//! Evaluation behavior tests.
//!
//! Each test runs source through `Interpreter::eval_code` and inspects the
//! rendered result, the captured `print` output, or the error.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use pretty_assertions::assert_eq;
use seqalt_lang::{Config, ErrorCode, EvalError, Interpreter, ScriptError, Value};

// ─── Helpers ─────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct Capture(Rc<RefCell<Vec<u8>>>);

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

impl Capture {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

fn interp() -> (Interpreter, Capture) {
    let out = Capture::default();
    (Interpreter::new().with_output(out.clone()), out)
}

/// Rendered result of `src`.
fn run(src: &str) -> String {
    run_with_output(src).0
}

/// Rendered result and everything printed.
fn run_with_output(src: &str) -> (String, String) {
    let (mut interp, out) = interp();
    let val = interp.eval_code(src).unwrap_or_else(|e| {
        panic!("eval failed for {src:?}: {e:#?}");
    });
    (val.to_string(), out.text())
}

fn run_err(src: &str) -> ScriptError {
    let (mut interp, _) = interp();
    match interp.eval_code(src) {
        Ok(v) => panic!("expected {src:?} to fail, got {v}"),
        Err(e) => e,
    }
}

fn eval_err(src: &str) -> EvalError {
    match run_err(src) {
        ScriptError::Eval(e) => e,
        ScriptError::Syntax(errs) => panic!("expected an eval error, got syntax errors: {errs:#?}"),
    }
}

// ─── Literals ────────────────────────────────────────────────────────────────

#[test]
fn number_literal() {
    assert_eq!(run("42"), "42");
    let (mut interp, _) = interp();
    let v = interp.eval_code("7").unwrap();
    assert_eq!(v.to_number(), 7.0);
}

#[test]
fn string_literal() {
    assert_eq!(run(r#""hello""#), "hello");
}

#[test]
fn empty_sequences() {
    assert_eq!(run(""), "null");
    assert_eq!(run("()"), "null");
    assert_eq!(run("[]"), "[]");
    assert_eq!(run("{}"), "{}");
}

#[test]
fn unbound_symbol_is_null() {
    assert_eq!(run("nothing"), "null");
}

// ─── Arithmetic ──────────────────────────────────────────────────────────────

#[test]
fn addition() {
    assert_eq!(run("1+2"), "3");
    assert_eq!(run(r#""a"+"b""#), "ab");
}

#[test]
fn mixed_addition_concatenates() {
    assert_eq!(run(r#"1 + "a""#), "1a");
    assert_eq!(run(r#""n" + 1"#), "n1");
}

#[test]
fn strict_left_to_right() {
    assert_eq!(run("1 + 2 * 3"), "9");
    assert_eq!(run("2 * 3 - 1"), "5");
}

#[test]
fn subtraction_of_non_numbers_uses_zero() {
    assert_eq!(run(r#"5 - "x""#), "5");
}

// ─── Comparison & logic ──────────────────────────────────────────────────────

#[test]
fn comparisons_yield_one_or_zero() {
    assert_eq!(run("3 < 5"), "1");
    assert_eq!(run("3 >= 5"), "0");
    assert_eq!(run("1 != 2"), "1");
    assert_eq!(run(r#""a" == "a""#), "1");
}

#[test]
fn arrays_compare_by_identity() {
    assert_eq!(run("[1] == [1]"), "0");
    assert_eq!(run("a = [1]; a == a"), "1");
}

#[test]
fn and_short_circuits() {
    assert_eq!(run("0&&(x=1);x"), "null");
    assert_eq!(run("1&&(x=1);x"), "1");
}

#[test]
fn or_short_circuits() {
    assert_eq!(run("1 || (x = 1); x"), "null");
    assert_eq!(run("0 || 7"), "7");
}

#[test]
fn conditional_evaluates_one_branch() {
    assert_eq!(run(r#"1 ? "yes" : "no""#), "yes");
    assert_eq!(run(r#"0 ? "yes" : "no""#), "no");
    assert_eq!(run("1 ? (x = 1) : (y = 2); [x, y]"), "[1,null]");
    assert_eq!(run("0 ? (x = 1) : (y = 2); [x, y]"), "[null,2]");
}

// ─── Bindings ────────────────────────────────────────────────────────────────

#[test]
fn assignment_to_leading_symbol() {
    assert_eq!(run("x=5;x"), "5");
}

#[test]
fn assignment_returns_value() {
    assert_eq!(run("x = 3"), "3");
}

#[test]
fn assignment_to_string_name() {
    assert_eq!(run(r#"x = 1; "y" = 2; x + y"#), "3");
}

#[test]
fn var_returns_its_name() {
    assert_eq!(run(r#"() var "q""#), "q");
}

#[test]
fn var_shadows_in_closure_scope() {
    let src = r#"x = 1; (f = (() => ((() var "x") = 2; x))); (y = (() f ())); [x, y]"#;
    assert_eq!(run(src), "[1,2]");
}

#[test]
fn assignment_from_closure_reaches_owner() {
    assert_eq!(run(r#"x = 1; (f = (() => ("x" = 5))); () f (); x"#), "5");
}

#[test]
fn unknown_name_is_assigned_in_root() {
    assert_eq!(run(r#"(f = (() => ("z" = 3))); () f (); z"#), "3");
}

// ─── Members & indexed writes ────────────────────────────────────────────────

#[test]
fn dict_literal() {
    assert_eq!(run(r#"{"a":1,"b":2}"#), "{a:1,b:2}");
}

#[test]
fn nested_member_access() {
    assert_eq!(run(r#"d = {"a":1,"b":{"c":3}}; d . b . c"#), "3");
}

#[test]
fn member_symbol_key_ignores_bound_variable() {
    assert_eq!(run(r#"d = {"b": 1, "zz": 2}; (b = "zz"); d . b"#), "1");
    assert_eq!(run(r#"d = {"b": 1, "zz": 2}; (b = "zz"); d . (b)"#), "2");
}

#[test]
fn member_with_evaluated_key() {
    assert_eq!(run("a = [10, 20]; a . 1"), "20");
    assert_eq!(run(r#"d = {"k": 4}; "k" = "k"; d . (k)"#), "4");
}

#[test]
fn indexed_write_grows_array() {
    assert_eq!(run("a = [1,2]; [a, 5] = 9; a"), "[1,2,null,null,null,9]");
}

#[test]
fn indexed_write_into_dict() {
    assert_eq!(run(r#"d = {"a":1}; [d, "b"] = 2; d"#), "{a:1,b:2}");
}

#[test]
fn indexed_write_far_past_the_end_fails() {
    assert!(matches!(
        eval_err("a = [1]; [a, 99999999999999999999] = 1; 0"),
        EvalError::IndexOutOfRange { len: 1, .. }
    ));
    assert!(matches!(eval_err("a = [1]; [a, 100000000000000] = 1; 0"), EvalError::IndexOutOfRange { .. }));
}

#[test]
fn indexed_write_into_number_fails() {
    assert!(matches!(eval_err("n = 1; [n, 0] = 5"), EvalError::TypeMismatch(_)));
}

#[test]
fn self_reference_renders_as_ellipsis() {
    assert_eq!(run(r#"d = {"a": 1}; [d, "self"] = d; d"#), "{a:1,self:{...}}");
}

// ─── Builders ────────────────────────────────────────────────────────────────

#[test]
fn comma_builds_arrays() {
    assert_eq!(run("(1, 2)"), "[1,2]");
    assert_eq!(run("((1, 2), 3)"), "[1,2,3]");
    assert_eq!(run("[1, 2, 3]"), "[1,2,3]");
}

#[test]
fn comma_copies_before_appending() {
    assert_eq!(run("a = [1]; (b = (a, 2)); [a, b]"), "[[1],[1,2]]");
}

#[test]
fn colon_without_pending_key_fails() {
    assert!(matches!(eval_err(r#"{"a": 1 : 2}"#), EvalError::TypeMismatch(_)));
}

#[test]
fn colon_after_number_fails() {
    assert!(matches!(eval_err("1 : 2"), EvalError::TypeMismatch(_)));
}

// ─── Closures ────────────────────────────────────────────────────────────────

#[test]
fn closures_bind_positionally() {
    assert_eq!(run(r#"f = (("a","b") => (a+b)); () f (2,3)"#), "5");
}

#[test]
fn single_name_binds_whole_argument() {
    assert_eq!(run(r#"sq = ("n" => (n * n)); () sq 7"#), "49");
    assert_eq!(run(r#"id = ("v" => v); () id (1, 2)"#), "[1,2]");
}

#[test]
fn zero_names() {
    assert_eq!(run("k = (() => 42); () k ()"), "42");
}

#[test]
fn args_holds_both_operands() {
    assert_eq!(run(r#"f = ("x" => ((args . l) + (args . r))); (10 f 5)"#), "15");
}

#[test]
fn missing_positional_args_are_null() {
    assert_eq!(run(r#"f = (("a","b") => (b)); () f [1]"#), "null");
}

#[test]
fn non_array_for_several_names_fails() {
    assert_eq!(
        eval_err(r#"f = (("a","b") => a); () f 1"#),
        EvalError::ArgumentMismatch { expected: 2, found: "number" }
    );
}

#[test]
fn recursion() {
    let src = r#"fact = ("n" => (n < 2 ? 1 : (n * (() fact (n - 1))))); () fact 5"#;
    assert_eq!(run(src), "120");
}

// ─── Arrays ──────────────────────────────────────────────────────────────────

#[test]
fn range_and_length() {
    assert_eq!(run("() range 3"), "[0,1,2]");
    assert_eq!(run("() range (0 - 3)"), "[]");
    assert_eq!(run("() length [1,2,3]"), "3");
    assert_eq!(run(r#"() length {"a":1}"#), "1");
    assert_eq!(run("() length 5"), "0");
}

#[test]
fn map_preserves_order_and_length() {
    assert_eq!(run(r#"[1,2,3] map ("x" => (x * 2))"#), "[2,4,6]");
    assert_eq!(run(r#"(() range 5) map ("i" => (i + 1))"#), "[1,2,3,4,5]");
}

#[test]
fn map_over_null_is_empty() {
    assert_eq!(run(r#"() map ("x" => x)"#), "[]");
}

#[test]
fn map_with_native_callee() {
    let (val, out) = run_with_output("[1,2] map print");
    assert_eq!(val, "[null,null]");
    assert_eq!(out, "1\n2\n");
}

#[test]
fn map_rejects_bad_operands() {
    assert!(matches!(eval_err(r#"5 map ("x" => x)"#), EvalError::TypeMismatch(_)));
    assert!(matches!(eval_err("[1] map 5"), EvalError::TypeMismatch(_)));
}

#[test]
fn for_each_returns_null() {
    let (val, out) = run_with_output(r#"[1,2] forEach ("x" => (() print x))"#);
    assert_eq!(val, "null");
    assert_eq!(out, "1\n2\n");
}

// ─── Output & comments ───────────────────────────────────────────────────────

#[test]
fn print_writes_lines() {
    let (val, out) = run_with_output(r#"() print "hi"; () print (1 + 1)"#);
    assert_eq!(val, "null");
    assert_eq!(out, "hi\n2\n");
}

#[test]
fn at_is_a_null_seed() {
    let (_, out) = run_with_output("@ print 5");
    assert_eq!(out, "5\n");
}

#[test]
fn comments_skip_their_operand() {
    assert_eq!(run(r#"5 // "ignored" + 1"#), "6");
    let (val, out) = run_with_output("5 rem (() print 1)");
    assert_eq!(val, "5");
    assert_eq!(out, "");
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[test]
fn calling_a_number_fails() {
    assert_eq!(eval_err("1 2"), EvalError::NotCallable { callee: "2".into(), found: "number" });
}

#[test]
fn calling_an_unbound_symbol_names_it() {
    assert_eq!(eval_err("1 foo 2"), EvalError::NotCallable { callee: "foo".into(), found: "null" });
}

#[test]
fn syntax_errors_are_reported() {
    match run_err("(1") {
        ScriptError::Syntax(errs) => assert_eq!(errs[0].code, ErrorCode::P002),
        other => panic!("expected syntax error, got {other:?}"),
    }
}

#[test]
fn non_node_is_malformed() {
    let (mut interp, _) = interp();
    let env = interp.root_env().clone();
    let err = interp.eval_expr(&env, &Value::Number(1.0)).unwrap_err();
    assert!(matches!(err, EvalError::MalformedNode(_)));
}

#[test]
fn recursion_limit_is_enforced_and_recoverable() {
    let mut interp = Interpreter::new()
        .with_output(io::sink())
        .with_config(Config::default().with_max_depth(50));
    let err = interp.eval_code(r#"f = ("n" => (() f n)); () f 1"#).unwrap_err();
    assert!(matches!(err, ScriptError::Eval(EvalError::RecursionLimit(50))));

    let v = interp.eval_code("1 + 1").unwrap();
    assert_eq!(v, Value::Number(2.0));
}

#[test]
fn default_recursion_limit_fits_a_test_thread_stack() {
    let mut interp = Interpreter::new().with_output(io::sink());
    let err = interp.eval_code(r#"f = ("n" => (() f n)); () f 1"#).unwrap_err();
    let limit = Config::default().max_depth;
    assert!(matches!(err, ScriptError::Eval(EvalError::RecursionLimit(n)) if n == limit));
}

#[test]
fn deeply_nested_values_render_and_drop() {
    let (mut interp, out) = interp();
    let src = r#"a = []; (() range 100000) forEach ("i" => ("a" = [a])); () length a"#;
    assert_eq!(interp.eval_code(src).unwrap(), Value::Number(1.0));

    interp.eval_code("() print a; 0").unwrap();
    let printed = out.text();
    assert_eq!(printed.len(), 200_003);
    assert!(printed.starts_with("[[[") && printed.ends_with("]]]\n"));
    drop(interp);
}

struct FailingFlush;

impl Write for FailingFlush {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> { Ok(buf.len()) }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }
}

#[test]
fn finish_survives_a_failed_flush() {
    let mut interp = Interpreter::new().with_output(FailingFlush);
    let kept = interp.eval_code("[1, 2]").unwrap();
    let stats = interp.finish([&kept]);
    assert_eq!(stats.cleared, 0);
    assert_eq!(kept.to_string(), "[1,2]");
}

#[test]
fn error_display() {
    assert_eq!(
        EvalError::NotCallable { callee: "foo".into(), found: "null" }.to_string(),
        "`foo` is not callable (found null)"
    );
    assert_eq!(run_err("]").to_string(), "[P001] 1:1: unexpected `]` with no open sequence");
}

// ─── Embedding ───────────────────────────────────────────────────────────────

#[test]
fn host_definitions_are_visible() {
    let (mut interp, _) = interp();
    interp.define("answer", Value::Number(42.0)).unwrap();
    assert_eq!(interp.eval_code("answer + 0").unwrap(), Value::Number(42.0));
}

#[test]
fn bindings_persist_across_runs() {
    let (mut interp, _) = interp();
    interp.eval_code("counter = 1").unwrap();
    interp.eval_code("counter = (counter + 1)").unwrap();
    assert_eq!(interp.eval_code("counter").unwrap(), Value::Number(2.0));
}
