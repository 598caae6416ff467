//! Interactive read-eval-print loop
//!
//! Each line is compiled on the interactive entry point against the
//! session's module globals, so definitions persist between lines.

use crate::compiler::EntryPoint;
use crate::config::RuntimeConfig;
use crate::error::Result;
use crate::interp::Interpreter;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;

const PROMPT: &str = ">>> ";
const HISTORY_FILE: &str = ".ember_history";
const INPUT_NAME: &str = "<stdin>";

/// What a `:command` line asks the loop to do
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Continue,
    Quit,
}

/// Evaluation state shared by every line of a session
pub struct Session {
    interpreter: Interpreter,
}

impl Session {
    pub fn new(config: RuntimeConfig) -> Self {
        Session {
            interpreter: Interpreter::with_config(config),
        }
    }

    /// Evaluate one line; returns the repr to echo, if any
    pub fn eval_line(&mut self, line: &str) -> Result<Option<String>> {
        let value = self.interpreter.run(line, INPUT_NAME, EntryPoint::Interactive)?;
        Ok((!value.is_none()).then(|| value.repr()))
    }
}

/// REPL state
pub struct Repl {
    editor: DefaultEditor,
    session: Session,
    history_path: Option<PathBuf>,
}

impl Repl {
    pub fn new(config: RuntimeConfig) -> RlResult<Self> {
        let mut editor = DefaultEditor::new()?;
        let history_path = home_dir().map(|h| h.join(HISTORY_FILE));
        if let Some(path) = &history_path {
            let _ = editor.load_history(path);
        }
        Ok(Repl {
            editor,
            session: Session::new(config),
            history_path,
        })
    }

    /// Run until `:quit` or end of input
    pub fn run(&mut self) -> RlResult<()> {
        println!("ember {}", env!("CARGO_PKG_VERSION"));
        println!("Type :help for help, :quit to exit.");

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim_end();
                    if line.trim().is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(line);

                    if line.starts_with(':') {
                        if handle_command(line.trim()) == Command::Quit {
                            break;
                        }
                        continue;
                    }

                    match self.session.eval_line(line) {
                        Ok(Some(repr)) => println!("{repr}"),
                        Ok(None) => {}
                        Err(err) => crate::error::report_error(INPUT_NAME, line, &err),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("KeyboardInterrupt");
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("Error: {err}");
                    break;
                }
            }
        }

        if let Some(path) = &self.history_path {
            let _ = self.editor.save_history(path);
        }
        Ok(())
    }
}

fn handle_command(cmd: &str) -> Command {
    match cmd {
        ":quit" | ":q" => Command::Quit,
        ":help" | ":h" => {
            print_help();
            Command::Continue
        }
        _ => {
            println!("Unknown command: {cmd}");
            println!("Type :help for help.");
            Command::Continue
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  :help, :h       Show this help");
    println!("  :quit, :q       Exit");
    println!();
    println!("Enter statements or expressions, for example:");
    println!("  def odd(n): n % 2");
    println!("  filter(odd, range(10))");
    println!("  reduce(lambda a, b: a + b, [1, 2, 3], 0)");
}

fn home_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_definitions_persist_between_lines() {
        let mut session = Session::new(RuntimeConfig::default());
        assert_eq!(session.eval_line("def sq(x): x * x").unwrap(), None);
        assert_eq!(session.eval_line("sq(7)").unwrap().as_deref(), Some("49"));
    }

    #[test]
    fn test_none_is_not_echoed() {
        let mut session = Session::new(RuntimeConfig::default());
        assert_eq!(session.eval_line("None").unwrap(), None);
        assert_eq!(session.eval_line("'a'").unwrap().as_deref(), Some("'a'"));
    }

    #[test]
    fn test_error_leaves_session_usable() {
        let mut session = Session::new(RuntimeConfig::default());
        let err = session.eval_line("undefined").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Name);
        assert_eq!(session.eval_line("1 + 1").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_commands() {
        assert_eq!(handle_command(":quit"), Command::Quit);
        assert_eq!(handle_command(":q"), Command::Quit);
        assert_eq!(handle_command(":help"), Command::Continue);
        assert_eq!(handle_command(":bogus"), Command::Continue);
    }

    #[test]
    fn test_constants() {
        assert_eq!(PROMPT, ">>> ");
        assert_eq!(HISTORY_FILE, ".ember_history");
    }
}
