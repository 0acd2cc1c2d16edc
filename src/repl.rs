// File: src/repl.rs
//
// Interactive shell for the Pika scripting language.
// Reads input with rustyline (line editing and history), keeps one root
// environment alive across inputs, and waits for more lines while braces,
// brackets or parentheses are still open. Lines starting with ':' are
// REPL commands rather than Pika code.

use crate::ast::Stmt;
use crate::errors::PikaError;
use crate::interpreter::{Environment, Interpreter, Value};
use crate::lexer::{self, TokenKind};
use crate::parser;
use colored::Colorize;
use log::debug;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Help,
    Quit,
    Clear,
    Vars,
    Reset,
    Ast,
    Builtins,
}

/// Every command with its long name, short alias and description
const COMMANDS: &[(Command, &str, &str, &str)] = &[
    (Command::Help, ":help", ":h", "Show this list"),
    (Command::Quit, ":quit", ":q", "Leave the REPL (also :exit or Ctrl+D)"),
    (Command::Clear, ":clear", ":c", "Clear the screen"),
    (Command::Vars, ":vars", ":v", "List variables in the session scope"),
    (Command::Reset, ":reset", ":r", "Start over with an empty environment"),
    (Command::Ast, ":ast", ":a", "Toggle printing the parsed AST as JSON"),
    (Command::Builtins, ":builtins", ":b", "List native functions"),
];

impl Command {
    fn parse(input: &str) -> Option<Command> {
        if input == ":exit" {
            return Some(Command::Quit);
        }
        COMMANDS
            .iter()
            .find(|(_, long, short, _)| input == *long || input == *short)
            .map(|(command, ..)| *command)
    }
}

/// A REPL session: interpreter, session scope and line editor
pub struct Repl {
    interpreter: Interpreter,
    env: Environment,
    editor: DefaultEditor,
    show_ast: bool,
}

impl Repl {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Repl {
            interpreter: Interpreter::new(),
            env: Environment::new(),
            editor: DefaultEditor::new()?,
            show_ast: false,
        })
    }

    /// Starts with the AST dump enabled or disabled
    pub fn with_ast(mut self, show_ast: bool) -> Self {
        self.show_ast = show_ast;
        self
    }

    fn banner(&self) {
        let title = format!(" Pika {} ", env!("CARGO_PKG_VERSION"));
        println!("{}", format!("┌{:─^40}┐", title).bright_cyan());
        println!(
            "{}",
            format!("│{:^40}│", "interactive shell, :help for commands").bright_cyan()
        );
        println!("{}", format!("└{}┘", "─".repeat(40)).bright_cyan());
        println!();
    }

    /// Reads and evaluates input until the user quits
    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.banner();
        let mut pending = String::new();

        loop {
            let prompt = if pending.is_empty() { "pika> ".bright_green() } else { "....> ".bright_blue() };

            let line = match self.editor.readline(&prompt.to_string()) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C drops a half-typed block but keeps the session
                    if !pending.is_empty() {
                        println!("{}", "(input discarded)".dimmed());
                    }
                    pending.clear();
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            };
            let _ = self.editor.add_history_entry(line.as_str());

            let trimmed = line.trim();
            if pending.is_empty() && trimmed.starts_with(':') {
                match Command::parse(trimmed) {
                    Some(Command::Quit) => break,
                    Some(command) => self.execute(command),
                    None => println!(
                        "{} unknown command {} (try {})",
                        "error:".bright_red(),
                        trimmed.bright_yellow(),
                        ":help".bright_yellow()
                    ),
                }
                continue;
            }

            pending.push_str(&line);
            pending.push('\n');
            if is_input_complete(&pending) {
                self.eval_input(&pending);
                pending.clear();
            }
        }

        println!("{}", "bye".bright_cyan());
        Ok(())
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::Help => {
                println!();
                for (_, long, short, description) in COMMANDS {
                    println!("  {:<10} {:<4} {}", long.bright_yellow(), short.dimmed(), description);
                }
                println!();
            }
            // Handled by the read loop
            Command::Quit => {}
            Command::Clear => {
                print!("\x1B[2J\x1B[1;1H");
                self.banner();
            }
            Command::Vars => {
                let bindings = self.env.local_bindings();
                if bindings.is_empty() {
                    println!("  {}", "no variables defined".dimmed());
                }
                for (name, value, is_const) in bindings {
                    let keyword = if is_const { "const" } else { "var" };
                    println!("  {} {} = {}", keyword.dimmed(), name.bright_yellow(), paint(&value));
                }
            }
            Command::Reset => {
                self.interpreter = Interpreter::new();
                self.env = Environment::new();
                println!("{}", "environment cleared".bright_green());
            }
            Command::Ast => {
                self.show_ast = !self.show_ast;
                let state = if self.show_ast { "on" } else { "off" };
                println!("AST dump {}", state.bright_yellow());
            }
            Command::Builtins => {
                let names = self.interpreter.builtin_names();
                for chunk in names.chunks(6) {
                    println!("  {}", chunk.join("  ").bright_blue());
                }
            }
        }
    }

    /// Parses and runs one complete input, echoing the value of a trailing expression
    fn eval_input(&mut self, input: &str) {
        if input.trim().is_empty() {
            return;
        }

        let program = match parser::parse_source(input) {
            Ok(program) => program,
            Err(err) => {
                print!("{}", PikaError::from_syntax(err, input));
                return;
            }
        };

        if self.show_ast {
            match serde_json::to_string_pretty(&program) {
                Ok(json) => println!("{}", json.dimmed()),
                Err(err) => debug!("could not serialize AST: {}", err),
            }
        }

        match self.interpreter.evaluate_program(&program, &self.env) {
            Ok(Value::Null) => {}
            Ok(value) => {
                if matches!(program.body.last(), Some(Stmt::Expression(_))) {
                    println!("{} {}", "=>".bright_blue(), paint(&value));
                }
            }
            Err(err) => print!("{}", self.interpreter.report(err, &self.env)),
        }
    }
}

/// Colours a value by type for display
fn paint(value: &Value) -> String {
    match value {
        Value::Number(_) | Value::NaN => value.to_string().bright_white().to_string(),
        Value::String(s) => format!("\"{}\"", s).bright_green().to_string(),
        Value::Boolean(_) => value.to_string().bright_magenta().to_string(),
        Value::Null => value.to_string().dimmed().to_string(),
        Value::Function(_) => format!("<{}>", value).bright_cyan().to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Whether `input` can be evaluated, or more lines are needed to close
/// open delimiters or a block comment
pub fn is_input_complete(input: &str) -> bool {
    let tokens = match lexer::tokenize(input) {
        Ok(tokens) => tokens,
        // Other lexer errors are reported when the input is evaluated
        Err(err) => return err.message != "unterminated block comment",
    };

    let depth: i64 = tokens
        .iter()
        .map(|token| match token.kind {
            TokenKind::LeftBrace | TokenKind::LeftBracket | TokenKind::LeftParen => 1,
            TokenKind::RightBrace | TokenKind::RightBracket | TokenKind::RightParen => -1,
            _ => 0,
        })
        .sum();
    depth <= 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_input_complete() {
        assert!(is_input_complete("var x = 1"));
        assert!(!is_input_complete("fn f() {"));
        assert!(!is_input_complete("print([1, 2,"));
        assert!(is_input_complete("fn f() {\n return 1\n}"));
        assert!(is_input_complete("print(\"{\")"));
        assert!(!is_input_complete("/* still open"));
        assert!(is_input_complete("var s = \"unterminated"));
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse(":help"), Some(Command::Help));
        assert_eq!(Command::parse(":q"), Some(Command::Quit));
        assert_eq!(Command::parse(":exit"), Some(Command::Quit));
        assert_eq!(Command::parse(":b"), Some(Command::Builtins));
        assert_eq!(Command::parse(":nope"), None);
    }
}
