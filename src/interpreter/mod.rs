// File: src/interpreter/mod.rs
//
// Tree-walking interpreter for the Pika scripting language.
// Executes Pika programs by traversing the Abstract Syntax Tree (AST).
//
// Every statement and expression evaluates against an Environment and
// produces either a Value or a Signal. Signals carry errors and the
// non-local exits (return, break, continue) up to the construct that
// handles them. The interpreter supports:
// - Variable and constant declarations with lexical scoping
// - Named functions, arrow functions and closures
// - Arrays and objects with shared, in-place mutation
// - Control flow (if/else if/else, switch, while, for)
// - A registry of native functions consulted when a callee is unbound

mod control_flow;
mod environment;
mod native_functions;
mod value;

pub use control_flow::Signal;
pub use environment::Environment;
pub use native_functions::{NativeFunction, NativeRegistry};
pub use value::{format_number, ArrayRef, Function, ObjectRef, Value};

use crate::ast::{AssignOp, BinaryOp, Expr, LogicalOp, Program, Stmt, UnaryOp, UpdateOp};
use crate::builtins;
use crate::errors::{find_closest_match, PikaError, RuntimeError};
use crate::parser::parse_source;
use ahash::AHashMap;
use log::{debug, trace};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::rc::Rc;
use std::sync::{Arc, Mutex};

type EvalResult = Result<Value, Signal>;

/// Main interpreter that executes Pika programs
pub struct Interpreter {
    natives: NativeRegistry,
    output: Option<Arc<Mutex<Vec<u8>>>>,
    input: Option<VecDeque<String>>,
    call_stack: Vec<String>,
    error_trace: Option<Vec<String>>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates a new interpreter with the standard native library
    pub fn new() -> Self {
        Interpreter {
            natives: NativeRegistry::with_defaults(),
            output: None,
            input: None,
            call_stack: Vec::new(),
            error_trace: None,
        }
    }

    pub fn natives(&self) -> &NativeRegistry {
        &self.natives
    }

    /// Makes `function` callable from scripts under `name`
    pub fn register_native(&mut self, name: &str, function: NativeFunction) {
        self.natives.register(name, function);
    }

    /// Names of all native functions, for REPL listings and suggestions
    pub fn builtin_names(&self) -> Vec<String> {
        self.natives.names()
    }

    /// Redirects program output into a shared buffer instead of stdout
    pub fn set_output(&mut self, output: Arc<Mutex<Vec<u8>>>) {
        self.output = Some(output);
    }

    /// Supplies the lines `prompt` reads instead of stdin
    pub fn set_input(&mut self, lines: Vec<String>) {
        self.input = Some(lines.into());
    }

    /// Writes a line of program output
    pub fn write_output(&self, msg: &str) {
        self.write_raw(&format!("{}\n", msg));
    }

    /// Writes program output without a trailing newline
    pub fn write_raw(&self, msg: &str) {
        match &self.output {
            Some(out) => {
                if let Ok(mut buffer) = out.lock() {
                    let _ = buffer.write_all(msg.as_bytes());
                }
            }
            None => {
                let mut stdout = io::stdout();
                let _ = stdout.write_all(msg.as_bytes());
                let _ = stdout.flush();
            }
        }
    }

    /// Reads one line of input, without its line terminator
    pub fn read_line(&mut self) -> Option<String> {
        if let Some(lines) = self.input.as_mut() {
            return lines.pop_front();
        }
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\n', '\r']).to_string()),
        }
    }

    /// User functions currently executing, outermost first
    pub fn call_stack(&self) -> &[String] {
        &self.call_stack
    }

    /// The call stack captured when the last runtime error left a function
    pub fn take_error_trace(&mut self) -> Vec<String> {
        self.error_trace.take().unwrap_or_default()
    }

    /// Parses and evaluates `source` in `env`, reporting failures as diagnostics
    pub fn run(&mut self, source: &str, env: &Environment) -> Result<Value, PikaError> {
        let program = parse_source(source).map_err(|err| PikaError::from_syntax(err, source))?;
        self.evaluate_program(&program, env).map_err(|err| self.report(err, env))
    }

    /// Turns a runtime error into a user-facing diagnostic
    pub fn report(&mut self, err: RuntimeError, env: &Environment) -> PikaError {
        let mut report = PikaError::from(err.clone()).with_call_stack(self.take_error_trace());

        if let Some(name) = err.unresolved_name() {
            let mut candidates = env.names();
            candidates.extend(self.builtin_names());
            if let Some(suggestion) = find_closest_match(name, &candidates) {
                report = report.with_suggestion(suggestion.to_string());
            }
        }

        match err {
            RuntimeError::VariableIsConstant(_) => {
                report.with_help("declare it with 'var' to allow re-assignment".to_string())
            }
            RuntimeError::VariableAlreadyExists(_) => {
                report.with_help("assign to the existing variable without 'var'".to_string())
            }
            _ => report,
        }
    }

    /// Runs every top-level statement in order and returns the value of the last.
    /// A return, break or continue that escapes the program is reported as an error.
    pub fn evaluate_program(
        &mut self,
        program: &Program,
        env: &Environment,
    ) -> Result<Value, RuntimeError> {
        self.call_stack.clear();
        self.error_trace = None;

        let mut last = Value::Null;
        for stmt in &program.body {
            last = self.evaluate(stmt, env).map_err(Signal::into_error)?;
        }
        Ok(last)
    }

    /// Executes a single statement
    pub fn evaluate(&mut self, stmt: &Stmt, env: &Environment) -> EvalResult {
        match stmt {
            Stmt::VariableDeclaration { name, is_const, value } => {
                let value = match value {
                    Some(expr) => self.evaluate_expr(expr, env)?,
                    None => Value::Null,
                };
                debug!("declare {} {} = {}", if *is_const { "const" } else { "var" }, name, value);
                Ok(env.declare(name, value, *is_const)?)
            }

            Stmt::FunctionDeclaration { name, params, body } => {
                let function = Value::Function(Rc::new(Function {
                    name: Some(name.clone()),
                    params: params.clone(),
                    body: Rc::clone(body),
                    closure: env.clone(),
                }));
                debug!("declare fn {}({})", name, params.join(", "));
                Ok(env.declare(name, function, true)?)
            }

            Stmt::If { test, body, else_if, else_body } => {
                if self.evaluate_expr(test, env)?.is_truthy() {
                    return self.execute_block(body, env);
                }
                for branch in else_if {
                    if self.evaluate_expr(&branch.test, env)?.is_truthy() {
                        return self.execute_block(&branch.body, env);
                    }
                }
                match else_body {
                    Some(body) => self.execute_block(body, env),
                    None => Ok(Value::Null),
                }
            }

            Stmt::Switch { discriminant, cases, default_body } => {
                let discriminant = self.evaluate_expr(discriminant, env)?;
                for case in cases {
                    for test in &case.tests {
                        let candidate = self.evaluate_expr(test, env)?;
                        if candidate == discriminant || candidate == Value::Boolean(true) {
                            return self.execute_block(&case.body, env);
                        }
                    }
                }
                match default_body {
                    Some(body) => self.execute_block(body, env),
                    None => Ok(Value::Null),
                }
            }

            Stmt::Return(value) => {
                let value = match value {
                    Some(expr) => self.evaluate_expr(expr, env)?,
                    None => Value::Null,
                };
                Err(Signal::Return(value))
            }

            Stmt::While { test, body } => {
                while self.evaluate_expr(test, env)?.is_truthy() {
                    if !self.run_iteration(body, env)? {
                        break;
                    }
                }
                Ok(Value::Null)
            }

            Stmt::For { init, test, update, body } => {
                if let Some(init) = init {
                    self.evaluate(init, env)?;
                }
                loop {
                    if let Some(test) = test {
                        if !self.evaluate_expr(test, env)?.is_truthy() {
                            break;
                        }
                    }
                    if !self.run_iteration(body, env)? {
                        break;
                    }
                    if let Some(update) = update {
                        self.evaluate_expr(update, env)?;
                    }
                }
                Ok(Value::Null)
            }

            Stmt::Break => Err(Signal::Break),
            Stmt::Continue => Err(Signal::Continue),
            Stmt::Expression(expr) => self.evaluate_expr(expr, env),
        }
    }

    /// Runs statements in order in `env`; branch bodies share their surrounding scope
    fn execute_block(&mut self, body: &[Stmt], env: &Environment) -> EvalResult {
        let mut last = Value::Null;
        for stmt in body {
            last = self.evaluate(stmt, env)?;
        }
        Ok(last)
    }

    /// Runs one loop iteration in the loop's own scope, so bindings declared
    /// in the body outlive the iteration.
    /// Returns Ok(false) when the body asked to break out of the loop.
    fn run_iteration(&mut self, body: &[Stmt], env: &Environment) -> Result<bool, Signal> {
        match self.execute_block(body, env) {
            Ok(_) => Ok(true),
            Err(Signal::Continue) => {
                trace!("continue");
                Ok(true)
            }
            Err(Signal::Break) => {
                trace!("break");
                Ok(false)
            }
            Err(other) => Err(other),
        }
    }

    /// Evaluates an expression to a value
    pub fn evaluate_expr(&mut self, expr: &Expr, env: &Environment) -> EvalResult {
        match expr {
            Expr::Identifier(name) => Ok(env.lookup(name)?),
            Expr::NumericLiteral(n) => Ok(Value::number(*n)),
            Expr::StringLiteral(s) => Ok(Value::string(s.as_str())),
            Expr::BooleanLiteral(b) => Ok(Value::Boolean(*b)),
            Expr::NullLiteral => Ok(Value::Null),
            Expr::NaNLiteral => Ok(Value::NaN),

            Expr::ArrayLiteral(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.evaluate_expr(element, env)?);
                }
                Ok(Value::array(values))
            }

            Expr::ObjectLiteral(properties) => {
                let mut map = AHashMap::with_capacity(properties.len());
                for property in properties {
                    let value = match &property.value {
                        Some(expr) => self.evaluate_expr(expr, env)?,
                        None => env.lookup(&property.key)?,
                    };
                    map.insert(property.key.clone(), value);
                }
                Ok(Value::object(map))
            }

            Expr::Binary { left, op, right } => {
                let left = self.evaluate_expr(left, env)?;
                let right = self.evaluate_expr(right, env)?;
                Ok(binary_op(*op, &left, &right)?)
            }

            // Both operands are always evaluated
            Expr::Logical { left, op, right } => {
                let left = self.evaluate_expr(left, env)?.is_truthy();
                let right = self.evaluate_expr(right, env)?.is_truthy();
                let result = match op {
                    LogicalOp::And => left && right,
                    LogicalOp::Or => left || right,
                };
                Ok(Value::Boolean(result))
            }

            Expr::Unary { op, argument, .. } => {
                let value = self.evaluate_expr(argument, env)?;
                match (op, &value) {
                    (UnaryOp::Not, _) => Ok(Value::Boolean(!value.is_truthy())),
                    (UnaryOp::Plus, Value::Number(n)) => Ok(Value::Number(*n)),
                    (UnaryOp::Minus, Value::Number(n)) => Ok(Value::Number(-n)),
                    (UnaryOp::Plus | UnaryOp::Minus, Value::NaN) => Ok(Value::NaN),
                    _ => Err(RuntimeError::InvalidUnaryExpr(format!(
                        "{}{}",
                        op.as_str(),
                        value.type_name()
                    ))
                    .into()),
                }
            }

            Expr::Update { op, argument, is_prefix } => {
                let old = match env.lookup(argument)? {
                    Value::Number(n) => n,
                    other => {
                        return Err(RuntimeError::InvalidUpdateExpr(format!(
                            "{}{} on {}",
                            argument,
                            op.as_str(),
                            other.type_name()
                        ))
                        .into())
                    }
                };
                let new = match op {
                    UpdateOp::Increment => old + 1.0,
                    UpdateOp::Decrement => old - 1.0,
                };
                env.assign(argument, Value::Number(new))?;
                Ok(Value::Number(if *is_prefix { new } else { old }))
            }

            Expr::Conditional { test, consequent, alternate } => {
                if self.evaluate_expr(test, env)?.is_truthy() {
                    self.evaluate_expr(consequent, env)
                } else {
                    self.evaluate_expr(alternate, env)
                }
            }

            Expr::Assignment { target, op, value } => self.evaluate_assignment(target, *op, value, env),

            Expr::Member { object, property, is_computed } => {
                let container = self.evaluate_expr(object, env)?;
                let key = self.member_key(property, *is_computed, env)?;
                Ok(read_member(&container, &key, *is_computed)?)
            }

            Expr::Call { callee, args } => self.evaluate_call(callee, args, env),

            Expr::ArrowFunction { params, body } => Ok(Value::Function(Rc::new(Function {
                name: None,
                params: params.clone(),
                body: Rc::clone(body),
                closure: env.clone(),
            }))),
        }
    }

    /// The key of a member expression: the literal name, or the evaluated property
    fn member_key(&mut self, property: &Expr, is_computed: bool, env: &Environment) -> EvalResult {
        if is_computed {
            return self.evaluate_expr(property, env);
        }
        match property {
            Expr::Identifier(name) => Ok(Value::string(name.as_str())),
            _ => Err(RuntimeError::PropertyNotFound(property.callee_name()).into()),
        }
    }

    fn evaluate_assignment(
        &mut self,
        target: &Expr,
        op: AssignOp,
        value: &Expr,
        env: &Environment,
    ) -> EvalResult {
        match target {
            Expr::Identifier(name) => {
                let rhs = self.evaluate_expr(value, env)?;
                let new = match op.binary_op() {
                    None => rhs,
                    Some(bop) => binary_op(bop, &env.lookup(name)?, &rhs)?,
                };
                Ok(env.assign(name, new)?)
            }

            Expr::Member { object, property, is_computed } => {
                let container = self.evaluate_expr(object, env)?;
                let key = self.member_key(property, *is_computed, env)?;
                let rhs = self.evaluate_expr(value, env)?;
                let new = match op.binary_op() {
                    None => rhs,
                    Some(bop) => binary_op(bop, &read_member(&container, &key, *is_computed)?, &rhs)?,
                };
                write_member(&container, &key, new.clone())?;
                Ok(new)
            }

            _ => Err(RuntimeError::InvalidAssignment.into()),
        }
    }

    fn evaluate_call(&mut self, callee: &Expr, args: &[Expr], env: &Environment) -> EvalResult {
        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            arg_values.push(self.evaluate_expr(arg, env)?);
        }

        match callee {
            Expr::Identifier(name) => match env.lookup(name) {
                Ok(value) => self.call_value(value, name, arg_values),
                Err(RuntimeError::VariableDoesNotExist(_)) => self.call_native(name, &arg_values, env),
                Err(err) => Err(err.into()),
            },

            Expr::Member { object, property, is_computed } => {
                let name = match self.member_key(property, *is_computed, env)? {
                    Value::String(s) => s.to_string(),
                    _ => return Err(RuntimeError::ComputedPropertyMustBeString.into()),
                };

                let container = match self.evaluate_expr(object, env) {
                    Ok(value) => Some(value),
                    Err(Signal::Error(RuntimeError::VariableDoesNotExist(_))) => None,
                    Err(other) => return Err(other),
                };

                let method = match &container {
                    Some(Value::Object(map)) => map.borrow().get(&name).cloned(),
                    Some(other) => {
                        // The receiver is not passed along: `a.push(1)` is `push(1)`
                        trace!("{} has no methods, calling native {}", other.type_name(), name);
                        None
                    }
                    None => None,
                };
                match method {
                    Some(value) => self.call_value(value, &name, arg_values),
                    None => self.call_native(&name, &arg_values, env),
                }
            }

            other => {
                let value = self.evaluate_expr(other, env)?;
                self.call_value(value, &other.callee_name(), arg_values)
            }
        }
    }

    fn call_native(&mut self, name: &str, args: &[Value], env: &Environment) -> EvalResult {
        match self.natives.get(name) {
            Some(native) => {
                trace!("native call {}({} args)", name, args.len());
                Ok(native(self, args, env))
            }
            None => Err(RuntimeError::FunctionNotFound(name.to_string()).into()),
        }
    }

    fn call_value(&mut self, callee: Value, name: &str, args: Vec<Value>) -> EvalResult {
        match callee {
            Value::Function(function) => self.call_function(&function, args),
            _ => Err(RuntimeError::FunctionNotFound(name.to_string()).into()),
        }
    }

    /// Calls a user function: exact arity, a fresh scope under the closure,
    /// and `return` intercepted as the result
    pub fn call_function(&mut self, function: &Function, args: Vec<Value>) -> EvalResult {
        let name = function.display_name();
        if args.len() < function.params.len() {
            return Err(RuntimeError::NotEnoughArguments(name.to_string()).into());
        }
        if args.len() > function.params.len() {
            return Err(RuntimeError::TooManyArguments(name.to_string()).into());
        }

        let scope = Environment::child_of(&function.closure);
        for (param, arg) in function.params.iter().zip(args) {
            scope.declare(param, arg, false)?;
        }

        debug!("call {}", name);
        self.call_stack.push(name.to_string());
        let result = self.execute_block(&function.body, &scope);
        if matches!(result, Err(Signal::Error(_))) && self.error_trace.is_none() {
            self.error_trace = Some(self.call_stack.clone());
        }
        self.call_stack.pop();

        match result {
            Ok(_) => Ok(Value::Null),
            Err(Signal::Return(value)) => Ok(value),
            Err(Signal::Break) => Err(RuntimeError::BreakOutsideLoop.into()),
            Err(Signal::Continue) => Err(RuntimeError::ContinueOutsideLoop.into()),
            Err(err) => Err(err),
        }
    }
}

/// Numeric view of a value; the NaN value counts as a number
fn as_numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => Some(*n),
        Value::NaN => Some(f64::NAN),
        _ => None,
    }
}

/// Applies a binary operator to two evaluated operands
pub fn binary_op(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    match op {
        BinaryOp::Equal => return Ok(Value::Boolean(left == right)),
        BinaryOp::NotEqual => return Ok(Value::Boolean(left != right)),
        BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => {
            let (Some(a), Some(b)) = (as_numeric(left), as_numeric(right)) else {
                return Err(RuntimeError::InvalidBinaryExpr(format!(
                    "{} {} {}",
                    left.type_name(),
                    op.as_str(),
                    right.type_name()
                )));
            };
            let result = match op {
                BinaryOp::Less => a < b,
                BinaryOp::LessEqual => a <= b,
                BinaryOp::Greater => a > b,
                _ => a >= b,
            };
            return Ok(Value::Boolean(result));
        }
        _ => {}
    }

    if let (Some(a), Some(b)) = (as_numeric(left), as_numeric(right)) {
        let result = match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Pow => a.powf(b),
            BinaryOp::Mod => {
                if !a.is_finite() || !b.is_finite() {
                    return Ok(Value::NaN);
                }
                let divisor = b.trunc() as i64;
                if divisor == 0 {
                    return Err(RuntimeError::DivisionByZero);
                }
                ((a.trunc() as i64).wrapping_rem(divisor)) as f64
            }
            _ => return Ok(Value::Null),
        };
        return Ok(Value::number(result));
    }

    match (op, left, right) {
        (BinaryOp::Add, Value::String(a), Value::String(b)) => {
            Ok(Value::string(format!("{}{}", a, b)))
        }
        // Any other combination of types yields null
        _ => Ok(Value::Null),
    }
}

/// Resolves an array or string index, counting negative indices from the end
fn resolve_index(key: &Value, len: usize) -> Option<usize> {
    let n = key.as_number()?;
    if n.fract() != 0.0 || !n.is_finite() {
        return None;
    }
    let index = n as i64;
    let index = if index < 0 { index + len as i64 } else { index };
    if index < 0 || index >= len as i64 {
        None
    } else {
        Some(index as usize)
    }
}

/// Reads `container.key` or `container[key]`
fn read_member(container: &Value, key: &Value, is_computed: bool) -> Result<Value, RuntimeError> {
    match container {
        Value::Object(map) => {
            let name = key.to_string();
            let found = map.borrow().get(&name).cloned();
            found.ok_or(RuntimeError::PropertyNotFound(name))
        }
        Value::Array(elements) if is_computed => {
            let elements = elements.borrow();
            resolve_index(key, elements.len())
                .map(|i| elements[i].clone())
                .ok_or_else(|| RuntimeError::IndexNotFound(key.to_string()))
        }
        Value::String(s) if is_computed => key
            .as_number()
            .filter(|n| n.fract() == 0.0 && n.is_finite())
            .and_then(|n| builtins::char_at(s, n as i64))
            .map(Value::string)
            .ok_or_else(|| RuntimeError::IndexNotFound(key.to_string())),
        _ => Err(RuntimeError::PropertyNotFound(format!(
            "{} on {}",
            key,
            container.type_name()
        ))),
    }
}

/// Writes `container.key = value` or `container[key] = value` in place.
/// Writing past the end of an array pads it with nulls.
fn write_member(container: &Value, key: &Value, value: Value) -> Result<(), RuntimeError> {
    match container {
        Value::Object(map) => {
            map.borrow_mut().insert(key.to_string(), value);
            Ok(())
        }
        Value::Array(elements) => {
            let mut elements = elements.borrow_mut();
            let n = key
                .as_number()
                .filter(|n| n.fract() == 0.0 && n.is_finite())
                .ok_or_else(|| RuntimeError::IndexNotFound(key.to_string()))?;
            let len = elements.len() as i64;
            let index = if n < 0.0 { n as i64 + len } else { n as i64 };
            if index < 0 {
                return Err(RuntimeError::IndexNotFound(key.to_string()));
            }
            let index = index as usize;
            if index >= elements.len() {
                elements.resize(index + 1, Value::Null);
            }
            elements[index] = value;
            Ok(())
        }
        _ => Err(RuntimeError::InvalidAssignment),
    }
}
