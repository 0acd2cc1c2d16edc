// File: src/errors.rs
//
// Error handling and reporting for the Pika scripting language.
// Syntax errors come from the lexer and parser, runtime errors from the
// evaluator. Both can be lifted into a PikaError, which carries source
// location, context and suggestions and renders as a colored diagnostic.

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Where a token starts: 1-based line and column, optionally within a named file.
/// Line 0 marks a location that is not known, as for most runtime errors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
    pub file: Option<String>,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        SourceLocation { line, column, file: None }
    }

    pub fn unknown() -> Self {
        SourceLocation::default()
    }

    pub fn is_known(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}:{}", file, self.line, self.column),
            None => write!(f, "{}:{}", self.line, self.column),
        }
    }
}

/// A lexer or parser failure. The message is fixed per unmet expectation;
/// `found` holds the text of the offending token (empty at end of input).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
    pub found: String,
    pub location: SourceLocation,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, found: impl Into<String>, location: SourceLocation) -> Self {
        Self { message: message.into(), found: found.into(), location }
    }
}

/// Failures raised while evaluating a program
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("variable already exists: {0}")]
    VariableAlreadyExists(String),
    #[error("variable does not exist in this scope: {0}")]
    VariableDoesNotExist(String),
    #[error("constant can't be re-assigned: {0}")]
    VariableIsConstant(String),
    #[error("function not found: {0}")]
    FunctionNotFound(String),
    #[error("not enough arguments for function: {0}")]
    NotEnoughArguments(String),
    #[error("too many arguments for function: {0}")]
    TooManyArguments(String),
    #[error("invalid binary operation: {0}")]
    InvalidBinaryExpr(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("invalid unary operation: {0}")]
    InvalidUnaryExpr(String),
    #[error("invalid update expression: {0}")]
    InvalidUpdateExpr(String),
    #[error("invalid assignment target")]
    InvalidAssignment,
    #[error("index not found: {0}")]
    IndexNotFound(String),
    #[error("property not found: {0}")]
    PropertyNotFound(String),
    #[error("computed property must be a string")]
    ComputedPropertyMustBeString,
    #[error("return statement outside of function")]
    ReturnOutsideFunction,
    #[error("break statement outside of loop")]
    BreakOutsideLoop,
    #[error("continue statement outside of loop")]
    ContinueOutsideLoop,
}

impl RuntimeError {
    /// The unresolved name, for errors that have one
    pub fn unresolved_name(&self) -> Option<&str> {
        match self {
            RuntimeError::VariableDoesNotExist(name) | RuntimeError::FunctionNotFound(name) => {
                Some(name)
            }
            _ => None,
        }
    }
}

/// Types of errors reported to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SyntaxError,
    RuntimeError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::SyntaxError => write!(f, "Syntax Error"),
            ErrorKind::RuntimeError => write!(f, "Runtime Error"),
        }
    }
}

/// A structured, user-facing error with location information
#[derive(Debug, Clone)]
pub struct PikaError {
    pub kind: ErrorKind,
    pub message: String,
    pub location: SourceLocation,
    pub source_line: Option<String>,
    pub suggestion: Option<String>,
    pub help: Option<String>,
    pub call_stack: Vec<String>,
}

impl PikaError {
    pub fn new(kind: ErrorKind, message: String, location: SourceLocation) -> Self {
        Self {
            kind,
            message,
            location,
            source_line: None,
            suggestion: None,
            help: None,
            call_stack: Vec::new(),
        }
    }

    pub fn with_source(mut self, source_line: String) -> Self {
        self.source_line = Some(source_line);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    pub fn with_call_stack(mut self, call_stack: Vec<String>) -> Self {
        self.call_stack = call_stack;
        self
    }

    /// Lifts a syntax error, attaching the line of `source` it points at
    pub fn from_syntax(err: SyntaxError, source: &str) -> Self {
        let line = err.location.line;
        let report = PikaError::from(err);
        match line.checked_sub(1).and_then(|i| source.lines().nth(i)) {
            Some(text) => report.with_source(text.to_string()),
            None => report,
        }
    }

    /// Names the file the error was found in
    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.location.file = Some(file.into());
        self
    }

    /// The offending line with a caret under the reported column
    fn write_snippet(&self, f: &mut fmt::Formatter, source: &str) -> fmt::Result {
        let gutter = "|".bright_blue();
        let caret_pad = " ".repeat(self.location.column.saturating_sub(1));
        writeln!(f, "    {}", gutter)?;
        writeln!(f, "{:>3} {} {}", self.location.line.to_string().bright_blue(), gutter, source)?;
        writeln!(f, "    {} {}{}", gutter, caret_pad, "^".red().bold())?;
        writeln!(f, "    {}", gutter)
    }
}

impl From<SyntaxError> for PikaError {
    fn from(err: SyntaxError) -> Self {
        let message = if err.found.is_empty() {
            format!("{} but reached end of input", err.message)
        } else {
            format!("{} but found '{}'", err.message, err.found)
        };
        PikaError::new(ErrorKind::SyntaxError, message, err.location)
    }
}

impl From<RuntimeError> for PikaError {
    fn from(err: RuntimeError) -> Self {
        PikaError::new(ErrorKind::RuntimeError, err.to_string(), SourceLocation::unknown())
    }
}

impl fmt::Display for PikaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}: {}", self.kind.to_string().red().bold(), self.message.bold())?;

        if self.location.is_known() {
            writeln!(f, "  {} {}", "-->".bright_blue(), self.location)?;
            if let Some(source) = &self.source_line {
                self.write_snippet(f, source)?;
            }
        }

        if let Some(help) = &self.help {
            writeln!(f, "    {} {}", "=".bright_yellow(), format!("help: {}", help).bright_yellow())?;
        }
        if let Some(suggestion) = &self.suggestion {
            let hint = format!("did you mean '{}'?", suggestion);
            writeln!(f, "    {} {}", "=".bright_green(), hint.bright_green())?;
        }
        if !self.call_stack.is_empty() {
            writeln!(f, "    {} {}", "=".bright_cyan(), "call stack:".bright_cyan())?;
            // Innermost call first
            for frame in self.call_stack.iter().rev() {
                writeln!(f, "        {} {}", "in".dimmed(), frame.bright_cyan())?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for PikaError {}

/// Edit distance between two names, counted in chars
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let s1_chars: Vec<char> = a.chars().collect();
    let s2_chars: Vec<char> = b.chars().collect();

    if s1_chars.is_empty() {
        return s2_chars.len();
    }
    if s2_chars.is_empty() {
        return s1_chars.len();
    }

    // Two rolling rows instead of the full matrix
    let mut previous: Vec<usize> = (0..=s2_chars.len()).collect();
    let mut current = vec![0; s2_chars.len() + 1];

    for (i, c1) in s1_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, c2) in s2_chars.iter().enumerate() {
            let cost = if c1 == c2 { 0 } else { 1 };
            current[j + 1] = (previous[j + 1] + 1).min(current[j] + 1).min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[s2_chars.len()]
}

/// The candidate nearest to `target`, if any is within an edit distance of 3.
/// Exact matches are skipped since they cannot be the misspelling.
pub fn find_closest_match<'a>(target: &str, candidates: &'a [String]) -> Option<&'a str> {
    candidates
        .iter()
        .filter(|candidate| candidate.as_str() != target)
        .map(|candidate| (levenshtein_distance(target, candidate), candidate))
        .filter(|(distance, _)| *distance <= 3)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("print", "print"), 0);
        assert_eq!(levenshtein_distance("pritn", "print"), 2);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_find_closest_match_prefers_nearest_candidate() {
        let candidates = vec!["counter".to_string(), "count".to_string(), "total".to_string()];
        assert_eq!(find_closest_match("coutn", &candidates), Some("count"));
        assert_eq!(find_closest_match("zzzzzzzz", &candidates), None);
    }

    #[test]
    fn test_syntax_error_conversion_mentions_found_token() {
        let err = SyntaxError::new("expected ')'", "}", SourceLocation::new(2, 7));
        let report = PikaError::from(err);
        assert_eq!(report.kind, ErrorKind::SyntaxError);
        assert_eq!(report.message, "expected ')' but found '}'");
        assert_eq!(report.location, SourceLocation::new(2, 7));
    }

    #[test]
    fn test_from_syntax_attaches_source_line() {
        let err = SyntaxError::new("expected an expression", "", SourceLocation::new(2, 9));
        let report = PikaError::from_syntax(err, "var a = 1\nvar b =").in_file("main.pk");
        assert_eq!(report.message, "expected an expression but reached end of input");
        assert_eq!(report.source_line.as_deref(), Some("var b ="));
        assert_eq!(report.location.to_string(), "main.pk:2:9");
    }

    #[test]
    fn test_runtime_error_messages() {
        assert_eq!(
            RuntimeError::VariableIsConstant("x".into()).to_string(),
            "constant can't be re-assigned: x"
        );
        assert_eq!(RuntimeError::DivisionByZero.to_string(), "division by zero");
        assert_eq!(RuntimeError::FunctionNotFound("foo".into()).unresolved_name(), Some("foo"));
        assert_eq!(RuntimeError::InvalidAssignment.unresolved_name(), None);
    }
}
