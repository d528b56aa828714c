// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end runtime tests: programs built with `AstBuilder`, run through
//! `Runtime` with the default built-ins, the compiled tier and the
//! diagnostic sink.

use pretty_assertions::assert_eq;
use sage_diagnostic::{ColorMode, ErrorCode, Severity};
use sage_eval::{buffer_handler, Interpreter, SharedPrintHandler, Value};
use sage_ir::{AstBuilder, Node, SharedInterner, Token};
use sage_jit::{JitConfig, TierState};
use sage_value::EvalResult;
use sagec::{Runtime, RuntimeConfig};

fn runtime(config: RuntimeConfig) -> (AstBuilder, Runtime, SharedPrintHandler) {
    let interner = SharedInterner::new();
    let b = AstBuilder::new(interner.clone());
    let output = buffer_handler();
    let runtime = Runtime::with_print_handler(config, interner, output.clone());
    (b, runtime, output)
}

fn jit_config(threshold: u64) -> RuntimeConfig {
    RuntimeConfig::default().with_jit(JitConfig::default().with_threshold(threshold))
}

fn tier_state(runtime: &Runtime, name: &str) -> TierState {
    let name = runtime.interner().intern(name);
    runtime
        .interpreter()
        .functions()
        .user(name)
        .expect("function is defined")
        .slot
        .state()
}

/// `fun add(a, b) { a + b }` followed by a loop calling it `calls` times.
fn hot_add(b: &AstBuilder, calls: f64) -> Node {
    b.root(vec![
        b.func("add", &["a", "b"], vec![b.add(vec![b.ident("a"), b.ident("b")])]),
        b.var("total", vec![b.float(0.0)]),
        b.for_(
            "i",
            b.float(calls),
            vec![b.var(
                "total",
                vec![b.call("add", vec![b.ident("total"), b.ident("i")])],
            )],
        ),
        b.ident("total"),
    ])
}

#[test]
fn test_println_joins_arguments() {
    let (b, mut runtime, output) = runtime(RuntimeConfig::default());
    let result = runtime.run(&b.root(vec![b.call(
        "println",
        vec![b.string("sum"), b.add(vec![b.float(1.0), b.float(2.0)]), b.boolean(true)],
    )]));
    assert!(result.is_ok());
    assert_eq!(result.value, Some(Value::Void));
    assert_eq!(output.get_output(), "sum 3 true\n");
}

#[test]
fn test_top_level_return_ends_program() {
    let (b, mut runtime, output) = runtime(RuntimeConfig::default());
    let result = runtime.run(&b.root(vec![
        b.ret(b.float(7.0)),
        b.call("println", vec![b.string("unreachable")]),
    ]));
    assert_eq!(result.value, Some(Value::Float(7.0)));
    assert_eq!(output.get_output(), "");
}

#[test]
fn test_hot_function_is_compiled_and_used() {
    let (b, mut runtime, _) = runtime(jit_config(3));

    let result = runtime.run(&hot_add(&b, 10.0));
    assert_eq!(result.value, Some(Value::Float(45.0)));
    runtime.jit().wait_idle();
    assert_eq!(tier_state(&runtime, "add"), TierState::Compiled);

    let before = runtime.jit().stats();
    assert_eq!(before.triggers, 1);
    assert_eq!(before.compiled, 1);

    let result = runtime.run(&b.root(vec![b.call("add", vec![b.float(2.0), b.float(3.0)])]));
    assert_eq!(result.value, Some(Value::Float(5.0)));
    assert_eq!(runtime.jit().stats().compiled_calls, before.compiled_calls + 1);
}

#[test]
fn test_compiled_function_falls_back_on_new_argument_kinds() {
    let (b, mut runtime, _) = runtime(jit_config(3));
    runtime.run(&hot_add(&b, 10.0));
    runtime.jit().wait_idle();

    // Compiled for floats; strings are still a type error, reported the way
    // the interpreter reports it.
    let result = runtime.run(&b.root(vec![b
        .at(4, 2)
        .call("add", vec![b.string("x"), b.float(1.0)])]));
    assert!(!result.is_ok());
    assert_eq!(result.diagnostics[0].code, ErrorCode::E6003);
    assert_eq!(runtime.jit().stats().guard_fallbacks, 1);
}

#[test]
fn test_unsupported_body_stays_interpreted() {
    let (b, mut runtime, _) = runtime(jit_config(2));
    let program = b.root(vec![
        b.func(
            "count",
            &["n"],
            vec![
                b.var("c", vec![b.float(0.0)]),
                b.for_(
                    "i",
                    b.ident("n"),
                    vec![b.var("c", vec![b.add(vec![b.ident("c"), b.float(1.0)])])],
                ),
                b.ident("c"),
            ],
        ),
        b.for_("k", b.float(6.0), vec![b.call("count", vec![b.float(4.0)])]),
        b.call("count", vec![b.float(4.0)]),
    ]);

    let result = runtime.run(&program);
    runtime.jit().wait_idle();

    assert_eq!(result.value, Some(Value::Float(4.0)));
    assert_eq!(tier_state(&runtime, "count"), TierState::PermanentlyInterpreted);
    let stats = runtime.jit().stats();
    assert_eq!(stats.triggers, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.compiled_calls, 0);
}

#[test]
fn test_disabled_tier_never_triggers() {
    let config = RuntimeConfig::default().with_jit(JitConfig::disabled());
    let (b, mut runtime, _) = runtime(config);
    let result = runtime.run(&hot_add(&b, 20.0));
    assert_eq!(result.value, Some(Value::Float(190.0)));
    assert_eq!(runtime.jit().stats().triggers, 0);
    assert_eq!(tier_state(&runtime, "add"), TierState::Interpreted);
}

#[test]
fn test_error_stops_the_program() {
    let (b, mut runtime, output) = runtime(RuntimeConfig::default());
    let result = runtime.run(&b.root(vec![
        b.call("println", vec![b.string("before")]),
        b.at(2, 1).call("missing", vec![]),
        b.call("println", vec![b.string("after")]),
    ]));

    assert_eq!(result.value, None);
    assert_eq!(output.get_output(), "before\n");
    assert_eq!(result.diagnostics.len(), 1);
    let diag = &result.diagnostics[0];
    assert_eq!(diag.code, ErrorCode::E6005);
    assert_eq!(diag.message, "Undefined function");
    assert_eq!(diag.position(), (2, 1));

    let rendered = result.render();
    assert!(rendered.contains("error[E6005]: Undefined function"), "{rendered}");
    assert!(rendered.contains("2:1"), "{rendered}");
    result.report(ColorMode::Never);
}

#[test]
fn test_session_keeps_definitions() {
    let (b, mut runtime, _) = runtime(RuntimeConfig::default());
    let result = runtime.run_session(&[
        b.root(vec![
            b.var("base", vec![b.float(10.0)]),
            b.func("scale", &["x"], vec![b.mul(vec![b.ident("x"), b.ident("base")])]),
        ]),
        b.root(vec![b.call("scale", vec![b.float(4.0)])]),
    ]);
    assert!(result.is_ok());
    assert_eq!(result.value, Some(Value::Float(40.0)));
}

#[test]
fn test_session_error_limit() {
    let (b, mut runtime, _) = runtime(RuntimeConfig::default());
    let programs: Vec<Node> = (1..=5)
        .map(|line| b.root(vec![b.at(line, 1).ident("nope")]))
        .collect();

    let result = runtime.run_session(&programs);
    let codes: Vec<ErrorCode> = result.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(
        codes,
        vec![ErrorCode::E6006, ErrorCode::E6006, ErrorCode::E6006, ErrorCode::E9002]
    );
    assert_eq!(result.diagnostics[3].severity, Severity::Warning);
    let lines: Vec<u32> = result.diagnostics[..3].iter().map(|d| d.position().0).collect();
    assert_eq!(lines, vec![1, 2, 3]);
}

#[test]
fn test_session_all_errors() {
    let (b, mut runtime, _) = runtime(RuntimeConfig::default().with_all_errors(true));
    let programs: Vec<Node> = (1..=5)
        .map(|line| b.root(vec![b.at(line, 1).ident("nope")]))
        .collect();

    let result = runtime.run_session(&programs);
    assert_eq!(result.diagnostics.len(), 5);
    assert!(result.diagnostics.iter().all(|d| d.code == ErrorCode::E6006));
}

#[test]
fn test_host_function() {
    let config = RuntimeConfig::default().with_function(
        "twice",
        |interp: &mut Interpreter, _: &Token, args: &[Node]| -> EvalResult {
            let value = interp.eval(&args[0])?;
            let x = value.as_float().unwrap_or(0.0);
            Ok(Value::Float(x * 2.0))
        },
    );
    let (b, mut runtime, _) = runtime(config);
    let result = runtime.run(&b.root(vec![b.call("twice", vec![b.float(21.0)])]));
    assert_eq!(result.value, Some(Value::Float(42.0)));
}

#[test]
fn test_host_function_replaces_default() {
    let config = RuntimeConfig::default().with_function(
        "len",
        |_: &mut Interpreter, _: &Token, _: &[Node]| -> EvalResult { Ok(Value::Float(-1.0)) },
    );
    let (b, mut runtime, _) = runtime(config);
    let result = runtime.run(&b.root(vec![b.call("len", vec![b.string("abc")])]));
    assert_eq!(result.value, Some(Value::Float(-1.0)));
}

#[test]
fn test_len() {
    let (b, mut runtime, _) = runtime(RuntimeConfig::default());
    let run = |runtime: &mut Runtime, arg: Node| runtime.run(&b.root(vec![b.call("len", vec![arg])]));

    let result = run(&mut runtime, b.array(vec![b.float(1.0), b.float(2.0), b.float(3.0)]));
    assert_eq!(result.value, Some(Value::Float(3.0)));

    let result = run(&mut runtime, b.string("héllo"));
    assert_eq!(result.value, Some(Value::Float(5.0)));

    let result = run(&mut runtime, b.boolean(true));
    assert_eq!(result.diagnostics[0].code, ErrorCode::E6099);
    assert_eq!(result.diagnostics[0].message, "Type Error");
}

#[test]
fn test_len_arity() {
    let (b, mut runtime, _) = runtime(RuntimeConfig::default());
    let result = runtime.run(&b.root(vec![b.call("len", vec![])]));
    assert_eq!(result.diagnostics[0].message, "Not enough arguments");

    let result = runtime.run(&b.root(vec![b.call("len", vec![b.float(1.0), b.float(2.0)])]));
    assert_eq!(result.diagnostics[0].message, "Too many arguments");
}
