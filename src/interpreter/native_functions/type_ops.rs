// File: src/interpreter/native_functions/type_ops.rs
//
// Type queries, casts and predicates

use super::NativeRegistry;
use crate::builtins;
use crate::interpreter::{Environment, Interpreter, Value};

pub fn register(registry: &mut NativeRegistry) {
    registry.register("typeof", type_of);
    registry.register("len", len);
    registry.register("string", to_string);
    registry.register("num", to_num);
    registry.register("bool", to_bool);
    registry.register("isNaN", is_nan);
    registry.register("isNull", is_null);
}

fn type_of(_interp: &mut Interpreter, args: &[Value], _env: &Environment) -> Value {
    let name = args.first().map(Value::type_name).unwrap_or("null");
    Value::string(name)
}

/// Character count of a string or element count of an array, NaN otherwise
fn len(_interp: &mut Interpreter, args: &[Value], _env: &Environment) -> Value {
    match args.first() {
        Some(Value::String(s)) => Value::Number(builtins::str_len(s)),
        Some(Value::Array(elements)) => Value::Number(elements.borrow().len() as f64),
        _ => Value::NaN,
    }
}

fn to_string(_interp: &mut Interpreter, args: &[Value], _env: &Environment) -> Value {
    match args.first() {
        Some(Value::String(s)) => Value::String(s.clone()),
        Some(value) => Value::string(value.to_string()),
        None => Value::string(""),
    }
}

fn to_num(_interp: &mut Interpreter, args: &[Value], _env: &Environment) -> Value {
    match args.first() {
        Some(Value::Number(n)) => Value::Number(*n),
        Some(Value::String(s)) => builtins::parse_number(s).map(Value::Number).unwrap_or(Value::NaN),
        _ => Value::NaN,
    }
}

fn to_bool(_interp: &mut Interpreter, args: &[Value], _env: &Environment) -> Value {
    Value::Boolean(args.first().is_some_and(Value::is_truthy))
}

fn is_nan(_interp: &mut Interpreter, args: &[Value], _env: &Environment) -> Value {
    let result = match args.first() {
        None | Some(Value::NaN) => true,
        Some(Value::Number(n)) => n.is_nan(),
        Some(_) => false,
    };
    Value::Boolean(result)
}

fn is_null(_interp: &mut Interpreter, args: &[Value], _env: &Environment) -> Value {
    Value::Boolean(matches!(args.first(), Some(Value::Null)))
}
