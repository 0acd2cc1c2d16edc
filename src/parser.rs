// File: src/parser.rs
//
// Recursive descent parser for the Pika scripting language.
// Transforms a sequence of tokens into an Abstract Syntax Tree (AST).
//
// Expression precedence, lowest first:
// - assignment (=, +=, -=, *=, /=, **=, %=), right-recursive
// - arrow functions, the parser's only backtracking point
// - ternary ?:
// - ||, then &&
// - ==, !=, then <, <=, >, >=
// - the object-literal gate
// - + -, then ** / ^, then !, then unary + -, then prefix and postfix ++ --
// - * / %
// - call and member chains
// - primary literals, identifiers, arrays and parenthesised expressions
//
// The first syntax error aborts parsing; there is no recovery.

use crate::ast::{
    AssignOp, BinaryOp, ElseIf, Expr, LogicalOp, Program, Property, Stmt, SwitchCase, UnaryOp,
    UpdateOp,
};
use crate::errors::SyntaxError;
use crate::lexer::{tokenize, Token, TokenKind};
use log::trace;
use std::rc::Rc;

/// Parses a token stream into a program
pub fn parse(tokens: Vec<Token>) -> Result<Program, SyntaxError> {
    Parser::new(tokens).parse()
}

/// Tokenizes and parses Pika source text
pub fn parse_source(source: &str) -> Result<Program, SyntaxError> {
    parse(tokenize(source)?)
}

/// Parser maintains position in token stream and provides methods to parse statements and expressions
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    eof: Token,
}

impl Parser {
    /// Creates a new parser from a vector of tokens
    pub fn new(tokens: Vec<Token>) -> Self {
        let (line, column) = tokens.last().map(|t| (t.line, t.column)).unwrap_or((1, 1));
        Parser { tokens, pos: 0, eof: Token::new(TokenKind::Eof, "", line, column) }
    }

    /// The current token; past the end this is always `Eof`
    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    /// Peek at the current token kind without consuming it
    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    fn peek_next(&self) -> TokenKind {
        self.tokens.get(self.pos + 1).map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    /// Consume and return the current token, then advance to the next
    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    /// Consumes the current token if it has the given kind
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<Token, SyntaxError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(message))
        }
    }

    /// Builds a syntax error pointing at the current token
    fn error(&self, message: &str) -> SyntaxError {
        let tok = self.current();
        SyntaxError::new(message, tok.literal.clone(), tok.location())
    }

    fn skip_semicolons(&mut self) {
        while self.eat(TokenKind::Semicolon) {}
    }

    /// Parse the entire token stream into a program
    pub fn parse(&mut self) -> Result<Program, SyntaxError> {
        let mut body = Vec::new();
        loop {
            self.skip_semicolons();
            if self.check(TokenKind::Eof) {
                break;
            }
            body.push(self.parse_stmt()?);
        }
        Ok(Program { body })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        match self.peek() {
            TokenKind::Var | TokenKind::Const => self.parse_variable_declaration(),
            TokenKind::Fn => self.parse_function_declaration(),
            TokenKind::If => self.parse_if(),
            TokenKind::Switch => self.parse_switch(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Return => {
                self.advance();
                let value = match self.peek() {
                    TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::Eof => None,
                    _ => Some(self.parse_expr()?),
                };
                Ok(Stmt::Return(value))
            }
            TokenKind::Break => {
                self.advance();
                Ok(Stmt::Break)
            }
            TokenKind::Continue => {
                self.advance();
                Ok(Stmt::Continue)
            }
            _ => Ok(Stmt::Expression(self.parse_expr()?)),
        }
    }

    fn parse_variable_declaration(&mut self) -> Result<Stmt, SyntaxError> {
        let is_const = self.advance().kind == TokenKind::Const;
        let name = self.expect(TokenKind::Identifier, "expected identifier after 'var' or 'const'")?;

        let value = if self.eat(TokenKind::Assign) {
            Some(self.parse_expr()?)
        } else if is_const {
            return Err(self.error("expected '=' after constant name"));
        } else {
            None
        };

        Ok(Stmt::VariableDeclaration { name: name.literal, is_const, value })
    }

    fn parse_function_declaration(&mut self) -> Result<Stmt, SyntaxError> {
        self.advance(); // fn
        let name = self.expect(TokenKind::Identifier, "expected function name")?;
        let params = self.parse_params()?;
        let body = self.parse_block()?;
        Ok(Stmt::FunctionDeclaration { name: name.literal, params, body: Rc::new(body) })
    }

    /// Parses `( ident, ident, ... )`
    fn parse_params(&mut self) -> Result<Vec<String>, SyntaxError> {
        self.expect(TokenKind::LeftParen, "expected '('")?;
        let mut params = Vec::new();
        if self.eat(TokenKind::RightParen) {
            return Ok(params);
        }
        loop {
            params.push(self.expect(TokenKind::Identifier, "expected identifier")?.literal);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RightParen, "expected ')'")?;
        Ok(params)
    }

    /// Parses a brace-delimited statement list
    fn parse_block(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        self.expect(TokenKind::LeftBrace, "expected '{'")?;
        let mut body = Vec::new();
        loop {
            self.skip_semicolons();
            if matches!(self.peek(), TokenKind::RightBrace | TokenKind::Eof) {
                break;
            }
            body.push(self.parse_stmt()?);
        }
        self.expect(TokenKind::RightBrace, "expected '}'")?;
        Ok(body)
    }

    fn parse_if(&mut self) -> Result<Stmt, SyntaxError> {
        self.advance(); // if
        let test = self.parse_condition()?;
        let body = self.parse_block()?;

        let mut else_if = Vec::new();
        let mut else_body = None;
        while self.eat(TokenKind::Else) {
            if self.eat(TokenKind::If) {
                let test = self.parse_condition()?;
                let body = self.parse_block()?;
                else_if.push(ElseIf { test, body });
            } else {
                else_body = Some(self.parse_block()?);
                break;
            }
        }

        Ok(Stmt::If { test, body, else_if, else_body })
    }

    /// A statement condition; parentheses are optional and fall out of expression parsing
    fn parse_condition(&mut self) -> Result<Expr, SyntaxError> {
        if self.check(TokenKind::LeftBrace) {
            return Err(self.error("condition cannot be empty"));
        }
        self.parse_expr()
    }

    fn parse_switch(&mut self) -> Result<Stmt, SyntaxError> {
        self.advance(); // switch
        let discriminant = self.parse_condition()?;
        self.expect(TokenKind::LeftBrace, "expected '{'")?;

        let mut cases = Vec::new();
        let mut default_body = None;
        loop {
            self.skip_semicolons();
            match self.peek() {
                TokenKind::Case => {
                    self.advance();
                    let mut tests = vec![self.parse_expr()?];
                    while self.eat(TokenKind::Comma) {
                        tests.push(self.parse_expr()?);
                    }
                    self.expect(TokenKind::Colon, "expected ':'")?;
                    let body = self.parse_case_body()?;
                    cases.push(SwitchCase { tests, body });
                }
                TokenKind::Default => {
                    if default_body.is_some() {
                        return Err(self.error("duplicate default case"));
                    }
                    self.advance();
                    self.expect(TokenKind::Colon, "expected ':'")?;
                    default_body = Some(self.parse_case_body()?);
                }
                TokenKind::RightBrace => break,
                _ => return Err(self.error("expected 'case' or 'default'")),
            }
        }
        self.expect(TokenKind::RightBrace, "expected '}'")?;

        Ok(Stmt::Switch { discriminant, cases, default_body })
    }

    /// Statements up to the next `case`, `default` or closing brace
    fn parse_case_body(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        let mut body = Vec::new();
        loop {
            self.skip_semicolons();
            match self.peek() {
                TokenKind::Case | TokenKind::Default | TokenKind::RightBrace | TokenKind::Eof => {
                    break
                }
                _ => body.push(self.parse_stmt()?),
            }
        }
        Ok(body)
    }

    fn parse_while(&mut self) -> Result<Stmt, SyntaxError> {
        self.advance(); // while
        let test = self.parse_condition()?;
        let body = self.parse_block()?;
        Ok(Stmt::While { test, body })
    }

    fn parse_for(&mut self) -> Result<Stmt, SyntaxError> {
        self.advance(); // for
        let parenthesized = self.eat(TokenKind::LeftParen);

        let init = match self.peek() {
            TokenKind::Semicolon => None,
            TokenKind::Var | TokenKind::Const => Some(Box::new(self.parse_variable_declaration()?)),
            _ => Some(Box::new(Stmt::Expression(self.parse_expr()?))),
        };
        self.expect(TokenKind::Semicolon, "expected ';'")?;

        let test =
            if self.check(TokenKind::Semicolon) { None } else { Some(self.parse_expr()?) };
        self.expect(TokenKind::Semicolon, "expected ';'")?;

        let close = if parenthesized { TokenKind::RightParen } else { TokenKind::LeftBrace };
        let update = if self.check(close) { None } else { Some(self.parse_expr()?) };
        if parenthesized {
            self.expect(TokenKind::RightParen, "expected ')'")?;
        }

        let body = self.parse_block()?;
        Ok(Stmt::For { init, test, update, body })
    }

    pub fn parse_expr(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expr, SyntaxError> {
        let target = self.parse_arrow()?;

        let op = match self.peek() {
            TokenKind::Assign => AssignOp::Assign,
            TokenKind::PlusAssign => AssignOp::Add,
            TokenKind::MinusAssign => AssignOp::Sub,
            TokenKind::StarAssign => AssignOp::Mul,
            TokenKind::SlashAssign => AssignOp::Div,
            TokenKind::StarStarAssign => AssignOp::Pow,
            TokenKind::PercentAssign => AssignOp::Mod,
            _ => return Ok(target),
        };
        self.advance();
        let value = self.parse_assignment()?;

        Ok(Expr::Assignment { target: Box::new(target), op, value: Box::new(value) })
    }

    fn parse_arrow(&mut self) -> Result<Expr, SyntaxError> {
        if !self.check(TokenKind::LeftParen) {
            return self.parse_ternary();
        }

        let snapshot = self.pos;
        if let Ok(params) = self.parse_params() {
            if self.eat(TokenKind::Arrow) {
                let body = self.parse_block()?;
                return Ok(Expr::ArrowFunction { params, body: Rc::new(body) });
            }
        }

        trace!("not an arrow function at token {}, backtracking", snapshot);
        self.pos = snapshot;
        self.parse_ternary()
    }

    fn parse_ternary(&mut self) -> Result<Expr, SyntaxError> {
        let test = self.parse_or()?;
        if !self.eat(TokenKind::Question) {
            return Ok(test);
        }

        let consequent = self.parse_expr()?;
        self.expect(TokenKind::Colon, "expected ':'")?;
        let alternate = self.parse_expr()?;

        Ok(Expr::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    fn parse_or(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_and()?;
        while self.eat(TokenKind::Or) {
            let right = self.parse_and()?;
            left = Expr::Logical { left: Box::new(left), op: LogicalOp::Or, right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_equality()?;
        while self.eat(TokenKind::And) {
            let right = self.parse_equality()?;
            left =
                Expr::Logical { left: Box::new(left), op: LogicalOp::And, right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek() {
                TokenKind::Equal => BinaryOp::Equal,
                TokenKind::NotEqual => BinaryOp::NotEqual,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_relational()?;
            left = binary(left, op, right);
        }
    }

    fn parse_relational(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_literal_gate()?;
        loop {
            let op = match self.peek() {
                TokenKind::Less => BinaryOp::Less,
                TokenKind::LessEqual => BinaryOp::LessEqual,
                TokenKind::Greater => BinaryOp::Greater,
                TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_literal_gate()?;
            left = binary(left, op, right);
        }
    }

    /// Object literals are recognised here, ahead of the arithmetic levels
    fn parse_literal_gate(&mut self) -> Result<Expr, SyntaxError> {
        if self.check(TokenKind::LeftBrace) {
            let object = self.parse_object_literal()?;
            return self.parse_suffixes(object);
        }
        self.parse_additive()
    }

    fn parse_object_literal(&mut self) -> Result<Expr, SyntaxError> {
        self.expect(TokenKind::LeftBrace, "expected '{'")?;
        let mut properties = Vec::new();

        while !matches!(self.peek(), TokenKind::RightBrace | TokenKind::Eof) {
            let key = match self.peek() {
                TokenKind::Identifier | TokenKind::String => self.advance().literal,
                _ => return Err(self.error("expected a key")),
            };

            let value = if self.eat(TokenKind::Colon) { Some(self.parse_expr()?) } else { None };
            properties.push(Property { key, value });

            if !self.check(TokenKind::RightBrace) {
                self.expect(TokenKind::Comma, "expected ','")?;
            }
        }

        self.expect(TokenKind::RightBrace, "expected '}'")?;
        Ok(Expr::ObjectLiteral(properties))
    }

    fn parse_additive(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_exponent()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_exponent()?;
            left = binary(left, op, right);
        }
    }

    /// `**` and `^`, left-associative: `2 ** 3 ** 2` is `(2 ** 3) ** 2`
    fn parse_exponent(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_not()?;
        while matches!(self.peek(), TokenKind::StarStar | TokenKind::Caret) {
            self.advance();
            let right = self.parse_not()?;
            left = binary(left, BinaryOp::Pow, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, SyntaxError> {
        if self.eat(TokenKind::Bang) {
            let argument = self.parse_not()?;
            return Ok(Expr::Unary { op: UnaryOp::Not, argument: Box::new(argument), is_prefix: true });
        }
        self.parse_sign()
    }

    fn parse_sign(&mut self) -> Result<Expr, SyntaxError> {
        let op = match self.peek() {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Minus,
            _ => return self.parse_prefix_update(),
        };
        self.advance();
        let argument = self.parse_sign()?;
        Ok(Expr::Unary { op, argument: Box::new(argument), is_prefix: true })
    }

    fn parse_prefix_update(&mut self) -> Result<Expr, SyntaxError> {
        let op = match self.peek() {
            TokenKind::PlusPlus => UpdateOp::Increment,
            TokenKind::MinusMinus => UpdateOp::Decrement,
            _ => return self.parse_postfix_update(),
        };
        self.advance();
        let argument = self.expect(TokenKind::Identifier, "expected identifier")?;
        Ok(Expr::Update { op, argument: argument.literal, is_prefix: true })
    }

    fn parse_postfix_update(&mut self) -> Result<Expr, SyntaxError> {
        if self.check(TokenKind::Identifier) {
            let op = match self.peek_next() {
                TokenKind::PlusPlus => Some(UpdateOp::Increment),
                TokenKind::MinusMinus => Some(UpdateOp::Decrement),
                _ => None,
            };
            if let Some(op) = op {
                let argument = self.advance();
                self.advance();
                return Ok(Expr::Update { op, argument: argument.literal, is_prefix: false });
            }
        }
        self.parse_multiplicative()
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_call_member()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_call_member()?;
            left = binary(left, op, right);
        }
    }

    fn parse_call_member(&mut self) -> Result<Expr, SyntaxError> {
        let primary = self.parse_primary()?;
        self.parse_suffixes(primary)
    }

    /// Applies `.name`, `[expr]` and `(args)` suffixes left to right
    fn parse_suffixes(&mut self, mut expr: Expr) -> Result<Expr, SyntaxError> {
        loop {
            match self.peek() {
                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect(TokenKind::Identifier, "expected identifier")?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property: Box::new(Expr::Identifier(name.literal)),
                        is_computed: false,
                    };
                }
                TokenKind::LeftBracket => {
                    self.advance();
                    let property = self.parse_expr()?;
                    self.expect(TokenKind::RightBracket, "expected ']'")?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property: Box::new(property),
                        is_computed: true,
                    };
                }
                TokenKind::LeftParen => {
                    let args = self.parse_args()?;
                    expr = Expr::Call { callee: Box::new(expr), args };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        self.expect(TokenKind::LeftParen, "expected '('")?;
        let mut args = Vec::new();
        if self.eat(TokenKind::RightParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RightParen, "expected ')'")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        match self.peek() {
            TokenKind::Identifier => Ok(Expr::Identifier(self.advance().literal)),
            TokenKind::Number => {
                let tok = self.current();
                let value = tok.literal.parse::<f64>().map_err(|_| self.error("invalid number"))?;
                self.advance();
                Ok(Expr::NumericLiteral(value))
            }
            TokenKind::String => Ok(Expr::StringLiteral(self.advance().literal)),
            TokenKind::Boolean => Ok(Expr::BooleanLiteral(self.advance().literal == "true")),
            TokenKind::Null => {
                self.advance();
                Ok(Expr::NullLiteral)
            }
            TokenKind::NaN => {
                self.advance();
                Ok(Expr::NaNLiteral)
            }
            TokenKind::LeftBracket => {
                self.advance();
                let mut elements = Vec::new();
                while !matches!(self.peek(), TokenKind::RightBracket | TokenKind::Eof) {
                    elements.push(self.parse_expr()?);
                    if !self.check(TokenKind::RightBracket) {
                        self.expect(TokenKind::Comma, "expected ','")?;
                    }
                }
                self.expect(TokenKind::RightBracket, "expected ']'")?;
                Ok(Expr::ArrayLiteral(elements))
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RightParen, "expected ')'")?;
                Ok(inner)
            }
            _ => Err(self.error("expected an expression")),
        }
    }
}

fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    Expr::Binary { left: Box::new(left), op, right: Box::new(right) }
}
