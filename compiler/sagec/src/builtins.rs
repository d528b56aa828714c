//! Default host built-ins.
//!
//! Built-ins receive their argument nodes unevaluated and decide for
//! themselves what to evaluate.

use sage_eval::{Interpreter, Value};
use sage_ir::{Node, Token};
use sage_value::{host_error, EvalResult};
use std::sync::Arc;

/// Register `println` and `len`.
pub fn register_defaults(interpreter: &mut Interpreter) {
    interpreter.register_builtin("println", Arc::new(println));
    interpreter.register_builtin("len", Arc::new(len));
}

/// Print the arguments separated by spaces.
fn println(interpreter: &mut Interpreter, _: &Token, args: &[Node]) -> EvalResult {
    let mut parts = Vec::with_capacity(args.len());
    for arg in args {
        parts.push(interpreter.eval(arg)?.to_string());
    }
    interpreter.print_handler().println(&parts.join(" "));
    Ok(Value::Void)
}

/// Element count of an array, or character count of a string.
fn len(interpreter: &mut Interpreter, token: &Token, args: &[Node]) -> EvalResult {
    let [arg] = args else {
        let title = if args.is_empty() {
            "Not enough arguments"
        } else {
            "Too many arguments"
        };
        return Err(host_error(title, format!("len takes 1 argument, got {}", args.len()))
            .with_token(token)
            .into());
    };
    let count = match interpreter.eval(arg)? {
        Value::Array(items) => items.len(),
        Value::Str(s) => s.chars().count(),
        other => {
            return Err(host_error(
                "Type Error",
                format!("Expected array or string, got {}", other.kind()),
            )
            .with_token(token)
            .into());
        }
    };
    #[expect(clippy::cast_precision_loss, reason = "lengths stay far below 2^53")]
    let count = count as f64;
    Ok(Value::Float(count))
}
