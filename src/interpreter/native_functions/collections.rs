// File: src/interpreter/native_functions/collections.rs
//
// Array native functions. Arrays are shared, so push/pop/shift mutate the
// caller's array in place.

use super::NativeRegistry;
use crate::interpreter::{Environment, Interpreter, Value};

pub fn register(registry: &mut NativeRegistry) {
    registry.register("push", push);
    registry.register("pop", pop);
    registry.register("shift", shift);
    registry.register("includes", includes);
    registry.register("indexOf", index_of);
}

/// Appends the remaining arguments and returns the same array
fn push(_interp: &mut Interpreter, args: &[Value], _env: &Environment) -> Value {
    match args.first() {
        Some(arr @ Value::Array(elements)) => {
            elements.borrow_mut().extend(args[1..].iter().cloned());
            arr.clone()
        }
        _ => Value::Null,
    }
}

/// Removes and returns the last element
fn pop(_interp: &mut Interpreter, args: &[Value], _env: &Environment) -> Value {
    match args.first() {
        Some(Value::Array(elements)) => elements.borrow_mut().pop().unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// Removes and returns the first element
fn shift(_interp: &mut Interpreter, args: &[Value], _env: &Environment) -> Value {
    match args.first() {
        Some(Value::Array(elements)) => {
            let mut elements = elements.borrow_mut();
            if elements.is_empty() {
                Value::Null
            } else {
                elements.remove(0)
            }
        }
        _ => Value::Null,
    }
}

fn includes(_interp: &mut Interpreter, args: &[Value], _env: &Environment) -> Value {
    match (args.first(), args.get(1)) {
        (Some(Value::Array(elements)), Some(needle)) => {
            Value::Boolean(elements.borrow().iter().any(|e| e == needle))
        }
        _ => Value::Boolean(false),
    }
}

fn index_of(_interp: &mut Interpreter, args: &[Value], _env: &Environment) -> Value {
    match (args.first(), args.get(1)) {
        (Some(Value::Array(elements)), Some(needle)) => {
            let position = elements.borrow().iter().position(|e| e == needle);
            Value::Number(position.map(|i| i as f64).unwrap_or(-1.0))
        }
        _ => Value::Null,
    }
}
