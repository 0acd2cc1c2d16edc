// File: src/interpreter/native_functions/io.rs
//
// Console I/O native functions (print, printe, prompt)

use super::NativeRegistry;
use crate::interpreter::{Environment, Interpreter, Value};
use colored::Colorize;

pub fn register(registry: &mut NativeRegistry) {
    registry.register("print", print);
    registry.register("printe", printe);
    registry.register("prompt", prompt);
}

fn join_args(args: &[Value]) -> String {
    let parts: Vec<String> = args.iter().map(Value::to_string).collect();
    parts.join(" ")
}

/// Writes the arguments, separated by spaces, as one line of output
fn print(interp: &mut Interpreter, args: &[Value], _env: &Environment) -> Value {
    interp.write_output(&join_args(args));
    Value::Null
}

/// Like print, but in red on stderr
fn printe(_interp: &mut Interpreter, args: &[Value], _env: &Environment) -> Value {
    eprintln!("{}", join_args(args).red());
    Value::Null
}

/// Shows a message and returns one line of input without its newline
fn prompt(interp: &mut Interpreter, args: &[Value], _env: &Environment) -> Value {
    let Some(message) = args.first() else {
        return Value::string("");
    };
    interp.write_raw(&message.to_string());
    Value::string(interp.read_line().unwrap_or_default())
}
