// File: src/lexer.rs
//
// Lexical analyzer (tokenizer) for the Pika scripting language.
// Converts source code text into a stream of tokens for parsing.
//
// Supports:
// - Keywords: var, const, fn, if, else, switch, case, default, return, while, for, break, continue
// - Literals: numbers, "double" and 'single' quoted strings, true/false, null, NaN
// - Operators: + - * / % ** ^ = += -= *= /= **= %= == != < <= > >= ! && || ++ -- => ?
// - Punctuation: ( ) { } [ ] , ; : .
// - Comments: // to end of line and /* block */

use crate::errors::{SourceLocation, SyntaxError};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // Literal categories
    Number,
    String,
    Identifier,
    Boolean,
    Null,
    NaN,

    // Keywords
    Var,
    Const,
    Fn,
    If,
    Else,
    Switch,
    Case,
    Default,
    Return,
    While,
    For,
    Break,
    Continue,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    StarStar,
    Caret,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    StarStarAssign,
    PercentAssign,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Bang,
    And,
    Or,
    PlusPlus,
    MinusMinus,
    Arrow,
    Question,

    // Punctuation
    Colon,
    Semicolon,
    Comma,
    Dot,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,

    Eof,
}

impl TokenKind {
    /// Maps a reserved word to its token kind
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "var" => TokenKind::Var,
            "const" => TokenKind::Const,
            "fn" => TokenKind::Fn,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "switch" => TokenKind::Switch,
            "case" => TokenKind::Case,
            "default" => TokenKind::Default,
            "return" => TokenKind::Return,
            "while" => TokenKind::While,
            "for" => TokenKind::For,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "true" | "false" => TokenKind::Boolean,
            "null" => TokenKind::Null,
            "NaN" => TokenKind::NaN,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, line: usize, column: usize) -> Self {
        Token { kind, literal: literal.into(), line, column }
    }

    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

/// Operator spellings, longest first so compound operators win
const OPERATORS: &[(&str, TokenKind)] = &[
    ("**=", TokenKind::StarStarAssign),
    ("**", TokenKind::StarStar),
    ("+=", TokenKind::PlusAssign),
    ("-=", TokenKind::MinusAssign),
    ("*=", TokenKind::StarAssign),
    ("/=", TokenKind::SlashAssign),
    ("%=", TokenKind::PercentAssign),
    ("==", TokenKind::Equal),
    ("!=", TokenKind::NotEqual),
    ("<=", TokenKind::LessEqual),
    (">=", TokenKind::GreaterEqual),
    ("&&", TokenKind::And),
    ("||", TokenKind::Or),
    ("++", TokenKind::PlusPlus),
    ("--", TokenKind::MinusMinus),
    ("=>", TokenKind::Arrow),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("^", TokenKind::Caret),
    ("=", TokenKind::Assign),
    ("<", TokenKind::Less),
    (">", TokenKind::Greater),
    ("!", TokenKind::Bang),
    ("?", TokenKind::Question),
    (":", TokenKind::Colon),
    (";", TokenKind::Semicolon),
    (",", TokenKind::Comma),
    (".", TokenKind::Dot),
    ("(", TokenKind::LeftParen),
    (")", TokenKind::RightParen),
    ("{", TokenKind::LeftBrace),
    ("}", TokenKind::RightBrace),
    ("[", TokenKind::LeftBracket),
    ("]", TokenKind::RightBracket),
];

/// Cursor over the source characters that tracks line and column
struct Scanner {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl Scanner {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn starts_with(&self, text: &str) -> bool {
        text.chars().enumerate().all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.col)
    }
}

/// Tokenizes Pika source code into a vector of tokens.
///
/// The returned vector always ends with a single `Eof` token. Comments and
/// whitespace are consumed and never emitted.
pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut tokens = Vec::new();
    let mut s = Scanner { chars: source.chars().collect(), pos: 0, line: 1, col: 1 };

    while let Some(c) = s.peek() {
        let (line, column) = (s.line, s.col);

        if c.is_whitespace() {
            s.bump();
            continue;
        }

        if s.starts_with("//") {
            while let Some(ch) = s.peek() {
                if ch == '\n' {
                    break;
                }
                s.bump();
            }
            continue;
        }

        if s.starts_with("/*") {
            let start = s.location();
            s.bump();
            s.bump();
            loop {
                if s.starts_with("*/") {
                    s.bump();
                    s.bump();
                    break;
                }
                if s.bump().is_none() {
                    return Err(SyntaxError::new("unterminated block comment", "/*", start));
                }
            }
            continue;
        }

        if c == '"' || c == '\'' {
            let text = scan_string(&mut s, c)?;
            tokens.push(Token::new(TokenKind::String, text, line, column));
            continue;
        }

        if c.is_ascii_digit() {
            let mut number = String::new();
            while let Some(d) = s.peek().filter(char::is_ascii_digit) {
                number.push(d);
                s.bump();
            }
            if s.peek() == Some('.') && s.peek_at(1).is_some_and(|d| d.is_ascii_digit()) {
                number.push('.');
                s.bump();
                while let Some(d) = s.peek().filter(char::is_ascii_digit) {
                    number.push(d);
                    s.bump();
                }
            }
            tokens.push(Token::new(TokenKind::Number, number, line, column));
            continue;
        }

        if c.is_alphabetic() || c == '_' || c == '$' {
            let mut word = String::new();
            while let Some(ch) = s.peek() {
                if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                    word.push(ch);
                    s.bump();
                } else {
                    break;
                }
            }
            let kind = TokenKind::keyword(&word).unwrap_or(TokenKind::Identifier);
            tokens.push(Token::new(kind, word, line, column));
            continue;
        }

        match OPERATORS.iter().find(|(text, _)| s.starts_with(text)) {
            Some((text, kind)) => {
                for _ in 0..text.chars().count() {
                    s.bump();
                }
                tokens.push(Token::new(*kind, *text, line, column));
            }
            None => {
                return Err(SyntaxError::new(
                    "unexpected character",
                    c.to_string(),
                    SourceLocation::new(line, column),
                ));
            }
        }
    }

    tokens.push(Token::new(TokenKind::Eof, "", s.line, s.col));
    Ok(tokens)
}

/// Scans a quoted string starting at the opening quote, returning the unescaped text
fn scan_string(s: &mut Scanner, quote: char) -> Result<String, SyntaxError> {
    let start = s.location();
    s.bump();
    let mut text = String::new();

    loop {
        match s.bump() {
            None => {
                return Err(SyntaxError::new("unterminated string literal", quote.to_string(), start));
            }
            Some(ch) if ch == quote => return Ok(text),
            Some('\\') => match s.bump() {
                Some('n') => text.push('\n'),
                Some('t') => text.push('\t'),
                Some('r') => text.push('\r'),
                Some('0') => text.push('\0'),
                Some(other) => text.push(other),
                None => {
                    return Err(SyntaxError::new(
                        "unterminated string literal",
                        quote.to_string(),
                        start,
                    ));
                }
            },
            Some(ch) => text.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_declaration_tokens() {
        let tokens = tokenize("const x = 5;").unwrap();
        let summary: Vec<(TokenKind, &str)> =
            tokens.iter().map(|t| (t.kind, t.literal.as_str())).collect();
        assert_eq!(
            summary,
            vec![
                (TokenKind::Const, "const"),
                (TokenKind::Identifier, "x"),
                (TokenKind::Assign, "="),
                (TokenKind::Number, "5"),
                (TokenKind::Semicolon, ";"),
                (TokenKind::Eof, ""),
            ]
        );
    }

    #[test]
    fn test_compound_operators_use_longest_match() {
        assert_eq!(
            kinds("a **= 2 ** 3 * 4 %= 1"),
            vec![
                TokenKind::Identifier,
                TokenKind::StarStarAssign,
                TokenKind::Number,
                TokenKind::StarStar,
                TokenKind::Number,
                TokenKind::Star,
                TokenKind::Number,
                TokenKind::PercentAssign,
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("x++ != y-- => !z"),
            vec![
                TokenKind::Identifier,
                TokenKind::PlusPlus,
                TokenKind::NotEqual,
                TokenKind::Identifier,
                TokenKind::MinusMinus,
                TokenKind::Arrow,
                TokenKind::Bang,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_literal_keywords() {
        assert_eq!(
            kinds("true false null NaN"),
            vec![
                TokenKind::Boolean,
                TokenKind::Boolean,
                TokenKind::Null,
                TokenKind::NaN,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_numbers_and_member_dots() {
        let tokens = tokenize("3.14 obj.key 1.x").unwrap();
        assert_eq!(tokens[0].literal, "3.14");
        assert_eq!(tokens[2].kind, TokenKind::Dot);
        assert_eq!(tokens[4].literal, "1");
        assert_eq!(tokens[5].kind, TokenKind::Dot);
    }

    #[test]
    fn test_string_escapes() {
        let tokens = tokenize(r#""a\n\"b\"" 'it\'s'"#).unwrap();
        assert_eq!(tokens[0].literal, "a\n\"b\"");
        assert_eq!(tokens[1].literal, "it's");
    }

    #[test]
    fn test_comments_are_skipped() {
        let source = "// header\nvar a /* inline */ = 1 // trailing";
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("var a\n  a = 2").unwrap();
        assert_eq!((tokens[2].line, tokens[2].column), (2, 3));
        assert_eq!((tokens[4].line, tokens[4].column), (2, 7));
    }

    #[test]
    fn test_lexer_errors() {
        let err = tokenize("var a = 1 /* never closed").unwrap_err();
        assert_eq!(err.message, "unterminated block comment");

        let err = tokenize("print(\"oops)").unwrap_err();
        assert_eq!(err.message, "unterminated string literal");

        let err = tokenize("var a = #").unwrap_err();
        assert_eq!(err.message, "unexpected character");
        assert_eq!(err.found, "#");
        assert_eq!(err.location, SourceLocation::new(1, 9));
    }
}
