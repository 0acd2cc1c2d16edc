// File: src/printer.rs
//
// Source printer for the Pika AST, used for debugging output.
//
// Every compound expression is wrapped in parentheses, so the printed text
// parses back into the same tree regardless of operator precedence. Blocks
// are printed on a single line with statements terminated by `;`.

use crate::ast::{Expr, Program, Property, Stmt};
use crate::lexer::TokenKind;
use std::fmt::{self, Display, Formatter};

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, stmt) in self.body.iter().enumerate() {
            if i > 0 {
                writeln!(f, ";")?;
            }
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::VariableDeclaration { name, is_const, value } => {
                write!(f, "{} {}", if *is_const { "const" } else { "var" }, name)?;
                if let Some(value) = value {
                    write!(f, " = {}", value)?;
                }
                Ok(())
            }
            Stmt::FunctionDeclaration { name, params, body } => {
                write!(f, "fn {}({}) ", name, params.join(", "))?;
                write_block(f, body)
            }
            Stmt::If { test, body, else_if, else_body } => {
                write!(f, "if {} ", test)?;
                write_block(f, body)?;
                for branch in else_if {
                    write!(f, " else if {} ", branch.test)?;
                    write_block(f, &branch.body)?;
                }
                if let Some(body) = else_body {
                    write!(f, " else ")?;
                    write_block(f, body)?;
                }
                Ok(())
            }
            Stmt::Switch { discriminant, cases, default_body } => {
                write!(f, "switch {} {{", discriminant)?;
                for case in cases {
                    write!(f, " case {}:", join(&case.tests))?;
                    write_statements(f, &case.body)?;
                }
                if let Some(body) = default_body {
                    write!(f, " default:")?;
                    write_statements(f, body)?;
                }
                write!(f, " }}")
            }
            Stmt::Return(Some(value)) => write!(f, "return {}", value),
            Stmt::Return(None) => write!(f, "return"),
            Stmt::While { test, body } => {
                write!(f, "while {} ", test)?;
                write_block(f, body)
            }
            Stmt::For { init, test, update, body } => {
                write!(f, "for (")?;
                if let Some(init) = init {
                    write!(f, "{}", init)?;
                }
                write!(f, ";")?;
                if let Some(test) = test {
                    write!(f, " {}", test)?;
                }
                write!(f, ";")?;
                if let Some(update) = update {
                    write!(f, " {}", update)?;
                }
                write!(f, ") ")?;
                write_block(f, body)
            }
            Stmt::Break => write!(f, "break"),
            Stmt::Continue => write!(f, "continue"),
            Stmt::Expression(expr) => write!(f, "{}", expr),
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Identifier(name) => write!(f, "{}", name),
            Expr::NumericLiteral(n) => write_number(f, *n),
            Expr::StringLiteral(s) => write_string(f, s),
            Expr::BooleanLiteral(b) => write!(f, "{}", b),
            Expr::NullLiteral => write!(f, "null"),
            Expr::NaNLiteral => write!(f, "NaN"),
            Expr::ArrayLiteral(elements) => write!(f, "[{}]", join(elements)),
            Expr::ObjectLiteral(properties) => {
                write!(f, "({{")?;
                for (i, property) in properties.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " ")?;
                    write_property(f, property)?;
                }
                if properties.is_empty() {
                    write!(f, "}})")
                } else {
                    write!(f, " }})")
                }
            }
            Expr::Binary { left, op, right } => write!(f, "({} {} {})", left, op.as_str(), right),
            Expr::Logical { left, op, right } => write!(f, "({} {} {})", left, op.as_str(), right),
            Expr::Unary { op, argument, .. } => write!(f, "({}{})", op.as_str(), argument),
            Expr::Update { op, argument, is_prefix: true } => {
                write!(f, "({}{})", op.as_str(), argument)
            }
            Expr::Update { op, argument, is_prefix: false } => {
                write!(f, "({}{})", argument, op.as_str())
            }
            Expr::Conditional { test, consequent, alternate } => {
                write!(f, "({} ? {} : {})", test, consequent, alternate)
            }
            Expr::Assignment { target, op, value } => {
                write!(f, "({} {} {})", target, op.as_str(), value)
            }
            Expr::Member { object, property, is_computed: false } => {
                write!(f, "{}.{}", object, property)
            }
            Expr::Member { object, property, is_computed: true } => {
                write!(f, "{}[{}]", object, property)
            }
            Expr::Call { callee, args } => write!(f, "{}({})", callee, join(args)),
            Expr::ArrowFunction { params, body } => {
                write!(f, "(({}) => ", params.join(", "))?;
                write_block(f, body)?;
                write!(f, ")")
            }
        }
    }
}

fn join(exprs: &[Expr]) -> String {
    exprs.iter().map(|e| e.to_string()).collect::<Vec<_>>().join(", ")
}

fn write_block(f: &mut Formatter<'_>, body: &[Stmt]) -> fmt::Result {
    write!(f, "{{")?;
    write_statements(f, body)?;
    write!(f, " }}")
}

fn write_statements(f: &mut Formatter<'_>, body: &[Stmt]) -> fmt::Result {
    for stmt in body {
        write!(f, " {};", stmt)?;
    }
    Ok(())
}

/// Literals are never negative after parsing; other values print as expressions
fn write_number(f: &mut Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_nan() {
        write!(f, "NaN")
    } else if n.is_infinite() {
        write!(f, "({}1 / 0)", if n < 0.0 { "-" } else { "" })
    } else if n.is_sign_negative() {
        write!(f, "(-{})", -n)
    } else {
        write!(f, "{}", n)
    }
}

fn write_string(f: &mut Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            '\r' => write!(f, "\\r")?,
            '\0' => write!(f, "\\0")?,
            c => write!(f, "{}", c)?,
        }
    }
    write!(f, "\"")
}

fn write_property(f: &mut Formatter<'_>, property: &Property) -> fmt::Result {
    if is_bare_key(&property.key) {
        write!(f, "{}", property.key)?;
    } else {
        write_string(f, &property.key)?;
    }
    match &property.value {
        Some(value) => write!(f, ": {}", value),
        None => Ok(()),
    }
}

/// Whether a key can be printed without quotes
fn is_bare_key(key: &str) -> bool {
    let mut chars = key.chars();
    let starts_well = chars.next().is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$');
    starts_well
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        && TokenKind::keyword(key).is_none()
}

#[cfg(test)]
mod tests {
    use crate::parser::parse_source;

    fn print(source: &str) -> String {
        parse_source(source).unwrap().to_string()
    }

    #[test]
    fn test_compound_expressions_are_parenthesised() {
        assert_eq!(print("1 + 2 * 3"), "(1 + (2 * 3))");
        assert_eq!(print("a = b = -c"), "(a = (b = (-c)))");
        assert_eq!(print("!x && y++ || z"), "(((!x) && (y++)) || z)");
    }

    #[test]
    fn test_statement_forms() {
        assert_eq!(print("const x = 5"), "const x = 5");
        assert_eq!(
            print("fn add(a, b) { return a + b }"),
            "fn add(a, b) { return (a + b); }"
        );
        assert_eq!(print("for (;;) { break }"), "for (;;) { break; }");
        assert_eq!(
            print("switch x { case 1, 2: y; default: z }"),
            "switch x { case 1, 2: y; default: z; }"
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(print("{ a: 1, \"b c\": [true, null], d }"), "({ a: 1, \"b c\": [true, null], d })");
        assert_eq!(print("'say \"hi\"\\n'"), "\"say \\\"hi\\\"\\n\"");
        assert_eq!(print("(x) => { return x }"), "((x) => { return x; })");
    }
}
