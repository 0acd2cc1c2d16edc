// File: src/interpreter/environment.rs
//
// Lexical scoping environment for variable management in the Pika interpreter.
// Implements a chain of scopes where inner scopes shadow outer scopes.

use super::value::Value;
use crate::errors::RuntimeError;
use ahash::{AHashMap, AHashSet};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// One scope in the chain
#[derive(Default)]
struct Scope {
    bindings: AHashMap<String, Value>,
    constants: AHashSet<String>,
    parent: Option<Environment>,
}

/// Variable storage using lexical scoping
///
/// An Environment is a shared handle to a scope. Cloning the handle does not
/// copy the scope: closures, calls and the REPL all hold references to the
/// same bindings, so a mutation through one handle is seen by every holder.
/// Lookups walk from the scope outward through its parents.
///
/// # Examples
///
/// ```ignore
/// let global = Environment::new();
/// global.declare("x", Value::Number(10.0), false)?;
///
/// let local = Environment::child_of(&global);
/// local.declare("x", Value::Number(20.0), false)?;  // Shadows outer x
/// assert_eq!(local.lookup("x")?, Value::Number(20.0));
/// assert_eq!(global.lookup("x")?, Value::Number(10.0));
/// ```
#[derive(Clone, Default)]
pub struct Environment(Rc<RefCell<Scope>>);

impl Environment {
    /// Create a new root environment with no parent
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty scope whose lookups fall back to `parent`
    pub fn child_of(parent: &Environment) -> Self {
        Environment(Rc::new(RefCell::new(Scope {
            parent: Some(parent.clone()),
            ..Scope::default()
        })))
    }

    pub fn parent(&self) -> Option<Environment> {
        self.0.borrow().parent.clone()
    }

    /// Define a new variable in this scope. Fails if the name already exists here;
    /// shadowing a name from an outer scope is allowed.
    pub fn declare(&self, name: &str, value: Value, is_const: bool) -> Result<Value, RuntimeError> {
        let mut scope = self.0.borrow_mut();
        if scope.bindings.contains_key(name) {
            return Err(RuntimeError::VariableAlreadyExists(name.to_string()));
        }
        if is_const {
            scope.constants.insert(name.to_string());
        }
        scope.bindings.insert(name.to_string(), value.clone());
        Ok(value)
    }

    /// Set an existing variable in the nearest scope that owns it
    pub fn assign(&self, name: &str, value: Value) -> Result<Value, RuntimeError> {
        let owner = self
            .resolve(name)
            .ok_or_else(|| RuntimeError::VariableDoesNotExist(name.to_string()))?;
        let mut scope = owner.0.borrow_mut();
        if scope.constants.contains(name) {
            return Err(RuntimeError::VariableIsConstant(name.to_string()));
        }
        scope.bindings.insert(name.to_string(), value.clone());
        Ok(value)
    }

    /// Get a variable, searching from this scope outward
    pub fn lookup(&self, name: &str) -> Result<Value, RuntimeError> {
        let owner = self
            .resolve(name)
            .ok_or_else(|| RuntimeError::VariableDoesNotExist(name.to_string()))?;
        let scope = owner.0.borrow();
        scope
            .bindings
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::VariableDoesNotExist(name.to_string()))
    }

    /// Find the scope that owns `name`
    pub fn resolve(&self, name: &str) -> Option<Environment> {
        let mut current = Some(self.clone());
        while let Some(env) = current {
            if env.0.borrow().bindings.contains_key(name) {
                return Some(env);
            }
            current = env.parent();
        }
        None
    }

    /// Every name visible from this scope, innermost first, without duplicates
    pub fn names(&self) -> Vec<String> {
        let mut seen = AHashSet::new();
        let mut names = Vec::new();
        let mut current = Some(self.clone());
        while let Some(env) = current {
            for name in env.0.borrow().bindings.keys() {
                if seen.insert(name.clone()) {
                    names.push(name.clone());
                }
            }
            current = env.parent();
        }
        names
    }

    /// Bindings owned by this scope, sorted by name, with their constness
    pub fn local_bindings(&self) -> Vec<(String, Value, bool)> {
        let scope = self.0.borrow();
        let mut bindings: Vec<(String, Value, bool)> = scope
            .bindings
            .iter()
            .map(|(name, value)| (name.clone(), value.clone(), scope.constants.contains(name)))
            .collect();
        bindings.sort_by(|a, b| a.0.cmp(&b.0));
        bindings
    }

    /// Whether two handles refer to the same scope
    pub fn same_scope(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = self.0.borrow();
        let mut names: Vec<&String> = scope.bindings.keys().collect();
        names.sort();
        f.debug_struct("Environment")
            .field("bindings", &names)
            .field("has_parent", &scope.parent.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_and_lookup() {
        let env = Environment::new();
        env.declare("x", Value::Number(1.0), false).unwrap();
        assert_eq!(env.lookup("x").unwrap(), Value::Number(1.0));
        assert_eq!(
            env.lookup("y").unwrap_err(),
            RuntimeError::VariableDoesNotExist("y".to_string())
        );
    }

    #[test]
    fn test_redeclaration_in_same_scope_fails() {
        let env = Environment::new();
        env.declare("x", Value::Null, false).unwrap();
        assert_eq!(
            env.declare("x", Value::Null, false).unwrap_err(),
            RuntimeError::VariableAlreadyExists("x".to_string())
        );
    }

    #[test]
    fn test_shadowing_in_child_scope() {
        let global = Environment::new();
        global.declare("x", Value::Number(10.0), false).unwrap();

        let local = Environment::child_of(&global);
        local.declare("x", Value::Number(20.0), false).unwrap();

        assert_eq!(local.lookup("x").unwrap(), Value::Number(20.0));
        assert_eq!(global.lookup("x").unwrap(), Value::Number(10.0));
    }

    #[test]
    fn test_assign_walks_to_owning_scope() {
        let global = Environment::new();
        global.declare("count", Value::Number(0.0), false).unwrap();

        let local = Environment::child_of(&global);
        local.assign("count", Value::Number(5.0)).unwrap();

        assert_eq!(global.lookup("count").unwrap(), Value::Number(5.0));
        assert!(local.local_bindings().is_empty());
        assert!(local.resolve("count").unwrap().same_scope(&global));
    }

    #[test]
    fn test_constants_cannot_be_assigned() {
        let global = Environment::new();
        global.declare("PI", Value::Number(3.14), true).unwrap();
        let local = Environment::child_of(&global);

        assert_eq!(
            local.assign("PI", Value::Number(3.0)).unwrap_err(),
            RuntimeError::VariableIsConstant("PI".to_string())
        );
        assert_eq!(global.local_bindings(), vec![("PI".to_string(), Value::Number(3.14), true)]);
    }

    #[test]
    fn test_assign_to_missing_variable_fails() {
        let env = Environment::new();
        assert_eq!(
            env.assign("ghost", Value::Null).unwrap_err(),
            RuntimeError::VariableDoesNotExist("ghost".to_string())
        );
    }

    #[test]
    fn test_clones_share_bindings() {
        let env = Environment::new();
        let handle = env.clone();
        handle.declare("shared", Value::Boolean(true), false).unwrap();
        assert_eq!(env.lookup("shared").unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_names_lists_each_visible_name_once() {
        let global = Environment::new();
        global.declare("a", Value::Null, false).unwrap();
        global.declare("b", Value::Null, false).unwrap();
        let local = Environment::child_of(&global);
        local.declare("a", Value::Null, false).unwrap();

        let mut names = local.names();
        names.sort();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }
}
