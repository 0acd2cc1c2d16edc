// File: src/interpreter/native_functions/math.rs
//
// Math-related native functions

use super::NativeRegistry;
use crate::builtins;
use crate::interpreter::{Environment, Interpreter, Value};

pub fn register(registry: &mut NativeRegistry) {
    registry.register("pow", pow);
    registry.register("randNum", rand_num);
}

/// The first two arguments, when both are numbers
fn two_numbers(args: &[Value]) -> Option<(f64, f64)> {
    match (args.first(), args.get(1)) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => Some((*a, *b)),
        _ => None,
    }
}

fn pow(_interp: &mut Interpreter, args: &[Value], _env: &Environment) -> Value {
    match two_numbers(args) {
        Some((base, exp)) => Value::number(builtins::pow(base, exp)),
        None => Value::NaN,
    }
}

/// Random integer in `[min, max]`; NaN for an empty range
fn rand_num(_interp: &mut Interpreter, args: &[Value], _env: &Environment) -> Value {
    two_numbers(args)
        .and_then(|(min, max)| builtins::random_int(min, max))
        .map(Value::Number)
        .unwrap_or(Value::NaN)
}
