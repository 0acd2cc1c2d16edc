// File: src/interpreter/value.rs
//
// Runtime value types for the Pika scripting language.
// Defines all value types that can be represented and manipulated at runtime,
// together with the per-variant behaviour every other module relies on:
// truthiness, equality, type names and display formatting.

use crate::ast::Stmt;
use ahash::AHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::environment::Environment;

/// Shared, mutable element storage; arrays alias exactly like the objects they live in
pub type ArrayRef = Rc<RefCell<Vec<Value>>>;
pub type ObjectRef = Rc<RefCell<AHashMap<String, Value>>>;

/// A user-defined function together with the environment it was declared in.
/// `name` is set for `fn` declarations and absent for arrow functions.
pub struct Function {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Rc<Vec<Stmt>>,
    pub closure: Environment,
}

impl Function {
    /// Name used in call stacks and arity errors
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({}, {:?}, {} stmts)", self.display_name(), self.params, self.body.len())
    }
}

#[derive(Clone, Debug)]
pub enum Value {
    Null,
    NaN,
    Boolean(bool),
    Number(f64),
    String(Rc<str>),
    Array(ArrayRef),
    Object(ObjectRef),
    Function(Rc<Function>),
}

impl Value {
    /// Helper to create a String value
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::String(s.into())
    }

    /// Helper to create a Number, folding IEEE NaN into the `NaN` value
    pub fn number(n: f64) -> Self {
        if n.is_nan() {
            Value::NaN
        } else {
            Value::Number(n)
        }
    }

    /// Helper to create an Array value from a Vec<Value>
    pub fn array(elements: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    /// Helper to create an Object value from a map
    pub fn object(map: AHashMap<String, Value>) -> Self {
        Value::Object(Rc::new(RefCell::new(map)))
    }

    /// Name reported by `typeof`
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::NaN | Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// Truthiness: false, 0, NaN, "", [] and null are falsy; everything else is truthy
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null | Value::NaN => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(elements) => !elements.borrow().is_empty(),
            Value::Object(_) | Value::Function(_) => true,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Display form used inside arrays and objects, where strings are quoted
    fn nested(&self) -> String {
        match self {
            Value::String(s) => format!("\"{}\"", s.escape_default()),
            other => other.to_string(),
        }
    }
}

pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Inf".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        n.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::NaN => write!(f, "NaN"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(elements) => {
                let parts: Vec<String> = elements.borrow().iter().map(Value::nested).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::Object(map) => {
                let map = map.borrow();
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                let parts: Vec<String> = keys
                    .into_iter()
                    .filter_map(|k| map.get(k).map(|v| format!("{}: {}", k, v.nested())))
                    .collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
            Value::Function(func) => match &func.name {
                Some(name) => write!(f, "fn {}({})", name, func.params.join(", ")),
                None => write!(f, "({}) => {{...}}", func.params.join(", ")),
            },
        }
    }
}

/// Value equality: structural for arrays and objects, identity for functions.
/// Values of different types are never equal.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::NaN, Value::NaN) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::NaN.is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(!Value::string("").is_truthy());
        assert!(!Value::array(vec![]).is_truthy());
        assert!(!Value::Boolean(false).is_truthy());

        assert!(Value::Number(-1.5).is_truthy());
        assert!(Value::string("0").is_truthy());
        assert!(Value::array(vec![Value::Null]).is_truthy());
        assert!(Value::object(AHashMap::new()).is_truthy());
    }

    #[test]
    fn test_equality_across_types() {
        assert_eq!(Value::Number(1.0), Value::Number(1.0));
        assert_ne!(Value::Number(1.0), Value::string("1"));
        assert_ne!(Value::Null, Value::Boolean(false));
        assert_eq!(Value::NaN, Value::NaN);
        assert_eq!(
            Value::array(vec![Value::Number(1.0), Value::string("a")]),
            Value::array(vec![Value::Number(1.0), Value::string("a")])
        );
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(Value::Number(7.0).to_string(), "7");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(f64::INFINITY).to_string(), "Inf");
        assert_eq!(Value::Number(f64::NEG_INFINITY).to_string(), "-Inf");
        assert_eq!(Value::string("hi").to_string(), "hi");

        let arr = Value::array(vec![Value::Number(1.0), Value::string("b"), Value::Null]);
        assert_eq!(arr.to_string(), "[1, \"b\", null]");

        let mut map = AHashMap::new();
        map.insert("b".to_string(), Value::Boolean(true));
        map.insert("a".to_string(), Value::Number(1.0));
        assert_eq!(Value::object(map).to_string(), "{a: 1, b: true}");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::NaN.type_name(), "number");
        assert_eq!(Value::array(vec![]).type_name(), "array");
        assert_eq!(Value::object(AHashMap::new()).type_name(), "object");
        assert_eq!(Value::Null.type_name(), "null");
    }

    #[test]
    fn test_arrays_share_storage_when_cloned() {
        let arr = Value::array(vec![]);
        let alias = arr.clone();
        if let Value::Array(elements) = &alias {
            elements.borrow_mut().push(Value::Number(1.0));
        }
        assert_eq!(arr.to_string(), "[1]");
    }
}
