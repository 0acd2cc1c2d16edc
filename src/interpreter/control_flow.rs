// File: src/interpreter/control_flow.rs
//
// Control flow signals for non-local exits.
//
// Every evaluation step returns `Result<Value, Signal>`. Errors, `return`,
// `break` and `continue` all travel up the `Err` channel until the construct
// that owns them intercepts the signal: calls take `Return`, loops take
// `Break` and `Continue`, and anything else keeps propagating.

use super::value::Value;
use crate::errors::RuntimeError;

/// A non-value outcome of evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// A runtime failure, propagated to the nearest handler
    Error(RuntimeError),
    /// `return` with the function's result
    Return(Value),
    /// `break` out of the innermost loop
    Break,
    /// `continue` with the next iteration of the innermost loop
    Continue,
}

impl Signal {
    /// Turns a signal that escaped every handler into the error it represents
    pub fn into_error(self) -> RuntimeError {
        match self {
            Signal::Error(err) => err,
            Signal::Return(_) => RuntimeError::ReturnOutsideFunction,
            Signal::Break => RuntimeError::BreakOutsideLoop,
            Signal::Continue => RuntimeError::ContinueOutsideLoop,
        }
    }
}

impl From<RuntimeError> for Signal {
    fn from(err: RuntimeError) -> Self {
        Signal::Error(err)
    }
}
