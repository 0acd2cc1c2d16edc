// File: src/interpreter/native_functions/mod.rs
//
// Registry of native (built-in) functions, split into category modules.
// The evaluator consults the registry by name only when ordinary variable
// lookup of a callee fails.

pub mod collections;
pub mod io;
pub mod math;
pub mod strings;
pub mod type_ops;

use super::{Environment, Interpreter, Value};
use ahash::AHashMap;
use once_cell::sync::Lazy;

/// Signature shared by every native function. Natives never fail: bad
/// arguments produce a neutral value instead of an error.
pub type NativeFunction = fn(&mut Interpreter, &[Value], &Environment) -> Value;

/// Name-keyed table of native functions
#[derive(Clone, Default)]
pub struct NativeRegistry {
    functions: AHashMap<String, NativeFunction>,
}

/// The standard library, built once and cloned into each interpreter
static DEFAULT_REGISTRY: Lazy<NativeRegistry> = Lazy::new(|| {
    let mut registry = NativeRegistry::default();
    io::register(&mut registry);
    type_ops::register(&mut registry);
    math::register(&mut registry);
    strings::register(&mut registry);
    collections::register(&mut registry);
    registry
});

impl NativeRegistry {
    /// A registry holding the standard library
    pub fn with_defaults() -> Self {
        DEFAULT_REGISTRY.clone()
    }

    /// Adds or replaces a native function
    pub fn register(&mut self, name: &str, function: NativeFunction) {
        self.functions.insert(name.to_string(), function);
    }

    pub fn get(&self, name: &str) -> Option<NativeFunction> {
        self.functions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names in alphabetical order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }
}
