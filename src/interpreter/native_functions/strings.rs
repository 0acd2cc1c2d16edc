// File: src/interpreter/native_functions/strings.rs
//
// String manipulation native functions

use super::NativeRegistry;
use crate::builtins;
use crate::interpreter::{Environment, Interpreter, Value};

pub fn register(registry: &mut NativeRegistry) {
    registry.register("toUpperCase", to_upper_case);
    registry.register("toLowerCase", to_lower_case);
    registry.register("capitalize", capitalize);
    registry.register("startsWith", starts_with);
    registry.register("endsWith", ends_with);
    registry.register("reverseString", reverse_string);
    registry.register("concat", concat);
}

/// Applies `f` to a string first argument, or yields "" for anything else
fn map_str(args: &[Value], f: fn(&str) -> String) -> Value {
    match args.first() {
        Some(Value::String(s)) => Value::string(f(s)),
        _ => Value::string(""),
    }
}

/// Applies `f` to two string arguments, or yields false
fn test_strs(args: &[Value], f: fn(&str, &str) -> bool) -> Value {
    match (args.first(), args.get(1)) {
        (Some(Value::String(s)), Some(Value::String(affix))) => Value::Boolean(f(s, affix)),
        _ => Value::Boolean(false),
    }
}

fn to_upper_case(_interp: &mut Interpreter, args: &[Value], _env: &Environment) -> Value {
    map_str(args, builtins::to_upper)
}

fn to_lower_case(_interp: &mut Interpreter, args: &[Value], _env: &Environment) -> Value {
    map_str(args, builtins::to_lower)
}

fn capitalize(_interp: &mut Interpreter, args: &[Value], _env: &Environment) -> Value {
    map_str(args, builtins::capitalize)
}

fn reverse_string(_interp: &mut Interpreter, args: &[Value], _env: &Environment) -> Value {
    map_str(args, builtins::reverse)
}

fn starts_with(_interp: &mut Interpreter, args: &[Value], _env: &Environment) -> Value {
    test_strs(args, builtins::starts_with)
}

fn ends_with(_interp: &mut Interpreter, args: &[Value], _env: &Environment) -> Value {
    test_strs(args, builtins::ends_with)
}

fn concat(_interp: &mut Interpreter, args: &[Value], _env: &Environment) -> Value {
    let joined: String = args.iter().map(Value::to_string).collect();
    Value::string(joined)
}
