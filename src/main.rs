// File: src/main.rs
//
// Main entry point for the Pika scripting language interpreter.
// Handles command-line argument parsing and dispatches to the appropriate
// subcommand (run or repl).

use clap::{ArgAction, Parser as ClapParser, Subcommand};
use colored::Colorize;
use log::{debug, LevelFilter};
use pika::errors::PikaError;
use pika::repl::Repl;
use pika::{parse_source, Environment, Interpreter};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(ClapParser)]
#[command(
    name = "pika",
    about = "Pika: A small dynamically typed scripting language",
    version = env!("CARGO_PKG_VERSION"),
    long_about = None
)]
struct Cli {
    /// Print the parsed AST as JSON before evaluating
    #[arg(long, global = true)]
    ast: bool,

    /// Disable coloured output
    #[arg(long, global = true)]
    no_color: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a Pika script file
    Run {
        /// Path to the .pk file
        #[arg(default_value = "main.pk")]
        file: PathBuf,
    },

    /// Launch interactive Pika REPL
    Repl,
}

fn init_logging(verbose: u8) {
    let mut builder = env_logger::Builder::from_default_env();
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(LevelFilter::Trace);
        }
    }
    let _ = builder.try_init();
}

fn run_file(file: &Path, show_ast: bool) -> ExitCode {
    let code = match fs::read_to_string(file) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} could not read {}: {}", "Error:".bright_red(), file.display(), err);
            return ExitCode::from(2);
        }
    };
    debug!("running {} ({} bytes)", file.display(), code.len());

    let program = match parse_source(&code) {
        Ok(program) => program,
        Err(err) => {
            eprint!("{}", PikaError::from_syntax(err, &code).in_file(file.display().to_string()));
            return ExitCode::from(1);
        }
    };

    if show_ast {
        match serde_json::to_string_pretty(&program) {
            Ok(json) => println!("{}", json),
            Err(err) => eprintln!("{} could not serialize AST: {}", "Error:".bright_red(), err),
        }
    }

    let env = Environment::new();
    let mut interpreter = Interpreter::new();
    match interpreter.evaluate_program(&program, &env) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprint!("{}", interpreter.report(err, &env));
            ExitCode::from(1)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Run { file } => run_file(&file, cli.ast),

        Commands::Repl => match Repl::new() {
            Ok(repl) => match repl.with_ast(cli.ast).run() {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("{} {}", "Error:".bright_red(), err);
                    ExitCode::from(1)
                }
            },
            Err(err) => {
                eprintln!("{} could not start REPL: {}", "Error:".bright_red(), err);
                ExitCode::from(1)
            }
        },
    }
}
