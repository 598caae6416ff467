//! Ember CLI

use clap::{Parser, Subcommand};
use ember::compiler::EntryPoint;
use ember::config::RuntimeConfig;
use ember::error::report_error;
use ember::interp::Interpreter;
use ember::repl::Repl;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "EMBER_LOG";

#[derive(Parser)]
#[command(name = "ember", version, about = "Ember language runtime")]
struct Cli {
    /// Runtime configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute a source file
    Run {
        /// Source file to execute
        file: PathBuf,
    },
    /// Evaluate an expression and print its repr
    Eval {
        /// Expression text
        expr: String,
    },
    /// Start the interactive prompt
    Repl,
    /// Parse a source file and dump the AST as JSON
    Parse {
        /// Source file to parse
        file: PathBuf,
    },
}

fn install_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    install_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match RuntimeConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => RuntimeConfig::default(),
    };

    let ok = match cli.command {
        Command::Run { file } => run_file(&file, config),
        Command::Eval { expr } => eval_expr(&expr, config),
        Command::Repl => start_repl(config),
        Command::Parse { file } => parse_file(&file),
    };
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn read_source(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(source) => Some(source),
        Err(e) => {
            eprintln!("Error: cannot read {}: {e}", path.display());
            None
        }
    }
}

fn run_file(path: &Path, config: RuntimeConfig) -> bool {
    let Some(source) = read_source(path) else {
        return false;
    };
    let filename = path.display().to_string();
    let mut interp = Interpreter::with_config(config);
    match interp.run(&source, &filename, EntryPoint::Module) {
        Ok(_) => true,
        Err(e) => {
            report_error(&filename, &source, &e);
            false
        }
    }
}

fn eval_expr(expr: &str, config: RuntimeConfig) -> bool {
    let mut interp = Interpreter::with_config(config);
    match interp.run(expr, "<string>", EntryPoint::Expression) {
        Ok(value) => {
            println!("{}", value.repr());
            true
        }
        Err(e) => {
            report_error("<string>", expr, &e);
            false
        }
    }
}

fn start_repl(config: RuntimeConfig) -> bool {
    match Repl::new(config).and_then(|mut repl| repl.run()) {
        Ok(()) => true,
        Err(e) => {
            eprintln!("Error: {e}");
            false
        }
    }
}

fn parse_file(path: &Path) -> bool {
    let Some(source) = read_source(path) else {
        return false;
    };
    let filename = path.display().to_string();
    let parsed = ember::lexer::tokenize(&source)
        .and_then(|tokens| ember::parser::parse_program(&source, tokens));
    match parsed {
        Ok(program) => match serde_json::to_string_pretty(&program) {
            Ok(json) => {
                println!("{json}");
                true
            }
            Err(e) => {
                eprintln!("Error: {e}");
                false
            }
        },
        Err(e) => {
            report_error(&filename, &source, &e);
            false
        }
    }
}
