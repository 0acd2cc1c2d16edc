// File: src/lib.rs
//
// Library interface for the Pika interpreter.
// Exposes modules for integration testing and embedding.

pub mod ast;
pub mod builtins;
pub mod errors;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod repl;

pub use errors::{PikaError, RuntimeError, SyntaxError};
pub use interpreter::{Environment, Interpreter, Value};
pub use parser::{parse, parse_source};
