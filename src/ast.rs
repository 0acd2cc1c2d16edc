// File: src/ast.rs
//
// Abstract Syntax Tree (AST) definitions for the Pika scripting language.
//
// The AST represents the syntactic structure of Pika code after parsing.
// Expressions (Expr) represent values and computations, while Statements (Stmt)
// represent actions and control flow. Nodes are immutable once built; function
// bodies are reference-counted so closures can share them with the tree.

use serde::Serialize;
use std::rc::Rc;

/// Root node produced by the parser
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Program {
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Not,
    Plus,
    Minus,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

impl UpdateOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateOp::Increment => "++",
            UpdateOp::Decrement => "--",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Mod,
}

impl AssignOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Pow => "**=",
            AssignOp::Mod => "%=",
        }
    }

    /// The arithmetic operator a compound assignment applies, `None` for plain `=`
    pub fn binary_op(&self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::Add => Some(BinaryOp::Add),
            AssignOp::Sub => Some(BinaryOp::Sub),
            AssignOp::Mul => Some(BinaryOp::Mul),
            AssignOp::Div => Some(BinaryOp::Div),
            AssignOp::Pow => Some(BinaryOp::Pow),
            AssignOp::Mod => Some(BinaryOp::Mod),
        }
    }
}

/// One `key: value` entry of an object literal; `value` is `None` for shorthand `{ key }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub key: String,
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Identifier(String),
    NumericLiteral(f64),
    StringLiteral(String),
    BooleanLiteral(bool),
    NullLiteral,
    NaNLiteral,
    ArrayLiteral(Vec<Expr>),
    ObjectLiteral(Vec<Property>),
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Logical {
        left: Box<Expr>,
        op: LogicalOp,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        argument: Box<Expr>,
        is_prefix: bool,
    },
    Update {
        op: UpdateOp,
        argument: String,
        is_prefix: bool,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Assignment {
        target: Box<Expr>,
        op: AssignOp,
        value: Box<Expr>,
    },
    Member {
        object: Box<Expr>,
        property: Box<Expr>,
        is_computed: bool,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    ArrowFunction {
        params: Vec<String>,
        body: Rc<Vec<Stmt>>,
    },
}

impl Expr {
    /// Name used for call-stack frames and "not found" errors
    pub fn callee_name(&self) -> String {
        match self {
            Expr::Identifier(name) => name.clone(),
            Expr::Member { property, is_computed: false, .. } => match property.as_ref() {
                Expr::Identifier(name) => name.clone(),
                _ => "<member>".to_string(),
            },
            Expr::Member { property, .. } => match property.as_ref() {
                Expr::StringLiteral(name) => name.clone(),
                _ => "<computed>".to_string(),
            },
            Expr::ArrowFunction { .. } => "<anonymous>".to_string(),
            _ => "<expression>".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElseIf {
    pub test: Expr,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchCase {
    pub tests: Vec<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    VariableDeclaration {
        name: String,
        is_const: bool,
        value: Option<Expr>,
    },
    FunctionDeclaration {
        name: String,
        params: Vec<String>,
        body: Rc<Vec<Stmt>>,
    },
    If {
        test: Expr,
        body: Vec<Stmt>,
        else_if: Vec<ElseIf>,
        else_body: Option<Vec<Stmt>>,
    },
    Switch {
        discriminant: Expr,
        cases: Vec<SwitchCase>,
        default_body: Option<Vec<Stmt>>,
    },
    Return(Option<Expr>),
    While {
        test: Expr,
        body: Vec<Stmt>,
    },
    For {
        init: Option<Box<Stmt>>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Vec<Stmt>,
    },
    Break,
    Continue,
    Expression(Expr),
}
