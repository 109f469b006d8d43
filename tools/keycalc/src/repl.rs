//! Interactive keypad REPL
//!
//! The line editor blocks, so it lives on the blocking pool and hands each
//! line to the async side. The next prompt is only shown once the line has
//! been applied and printed. Meanwhile the session keeps running, so an
//! error display reverts on its own while the prompt is waiting.

use anyhow::{Context, Result};
use colored::*;
use keycalc_engine::{Action, Calculator, Function, Session, SessionHandle, Snapshot};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Editor, Helper};
use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::input;
use crate::render;
use crate::settings::{OutputConfig, ToolConfig};

const PROMPT: &str = "keycalc> ";

const COMMANDS: [&str; 4] = ["help", "keys", "quit", "exit"];

/// Function names, action button names and the named keyboard keys
fn button_words() -> impl Iterator<Item = &'static str> {
    Function::ALL
        .into_iter()
        .map(Function::name)
        .chain(Action::BUTTONS.into_iter().filter_map(Action::button_name))
        .chain(["Enter", "Escape", "Backspace", "Delete"])
}

enum Line {
    Input(String),
    Interrupted,
    Closed,
}

/// REPL helper completing button names and REPL commands
struct KeypadHelper;

impl Helper for KeypadHelper {}

impl Hinter for KeypadHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for KeypadHelper {}

impl Validator for KeypadHelper {}

impl Completer for KeypadHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        let start = line.rfind(char::is_whitespace).map_or(0, |i| i + 1);
        Ok((start, complete_word(&line[start..], start == 0)))
    }
}

fn complete_word(prefix: &str, first_word: bool) -> Vec<Pair> {
    let commands: &[&str] = if first_word { &COMMANDS } else { &[] };
    commands
        .iter()
        .copied()
        .chain(button_words())
        .filter(|word| !prefix.is_empty() && word.starts_with(prefix))
        .map(|word| Pair {
            display: word.to_string(),
            replacement: word.to_string(),
        })
        .collect()
}

/// Owns the editor on the blocking pool
fn read_lines(lines: mpsc::UnboundedSender<Line>, mut ready: mpsc::UnboundedReceiver<()>) {
    let config = rustyline::Config::builder()
        .completion_type(rustyline::CompletionType::List)
        .build();
    let mut rl: Editor<KeypadHelper, rustyline::history::DefaultHistory> =
        match Editor::with_config(config) {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("{} {}", "Failed to initialize readline:".red(), e);
                let _ = lines.send(Line::Closed);
                return;
            },
        };
    rl.set_helper(Some(KeypadHelper));

    loop {
        let line = match rl.readline(PROMPT) {
            Ok(line) => {
                let _ = rl.add_history_entry(line.trim());
                Line::Input(line)
            },
            Err(ReadlineError::Interrupted) => Line::Interrupted,
            Err(ReadlineError::Eof) => Line::Closed,
            Err(e) => {
                eprintln!("{} {}", "Readline error:".red(), e);
                Line::Closed
            },
        };
        let closed = matches!(line, Line::Closed);
        if lines.send(line).is_err() || closed {
            break;
        }
        if ready.blocking_recv().is_none() {
            break;
        }
    }
}

/// Print the display once an error window has reverted on its own
async fn watch_reverts(mut snapshots: watch::Receiver<Snapshot>, output: OutputConfig) {
    let mut was_error = snapshots.borrow_and_update().error;
    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        if was_error && !snapshot.error {
            debug!("Printing reverted display");
            println!("\n{}", render::snapshot(&snapshot, &output));
        }
        was_error = snapshot.error;
    }
}

fn print_help() {
    println!("{}", "Keypad input".bright_cyan().bold());
    println!("  Type keys or button names separated by spaces, e.g.");
    println!("    {}", "12.5 * 2 =".bright_yellow());
    println!("    {}", "9 sqrt m-plus clear mr".bright_yellow());
    println!(
        "  {} mapping table, {} or {} to leave",
        "keys".bright_yellow(),
        "quit".bright_yellow(),
        "exit".bright_yellow()
    );
}

/// Execute one REPL line
/// Returns Ok(true) to continue, Ok(false) to quit
async fn execute_line(handle: &SessionHandle, line: &str, output: &OutputConfig) -> Result<bool> {
    match line {
        "quit" | "exit" => return Ok(false),
        "help" => {
            print_help();
            return Ok(true);
        },
        "keys" => {
            print!("{}", render::key_table());
            return Ok(true);
        },
        _ => {},
    }

    let actions = input::parse_line(line)?;
    handle.dispatch_all(actions)?;
    let snapshot = handle.snapshot().await?;
    println!("{}", render::snapshot(&snapshot, output));
    Ok(true)
}

pub async fn run(config: &ToolConfig) -> Result<()> {
    let (session, handle) = Session::new(Calculator::new(), config.engine.clone());
    let session_task = tokio::spawn(session.run());
    let watcher = tokio::spawn(watch_reverts(handle.subscribe(), config.output.clone()));

    if !config.output.json {
        println!("{}", "keycalc".bright_cyan().bold());
        println!(
            "Type '{}' for usage, {} for completion\n",
            "help".bright_yellow(),
            "Tab".bright_cyan()
        );
    }
    println!("{}", render::snapshot(&handle.snapshot().await?, &config.output));

    let (line_tx, mut line_rx) = mpsc::unbounded_channel();
    let (ready_tx, ready_rx) = mpsc::unbounded_channel();
    let reader = tokio::task::spawn_blocking(move || read_lines(line_tx, ready_rx));

    while let Some(line) = line_rx.recv().await {
        match line {
            Line::Input(line) => {
                let line = line.trim();
                if !line.is_empty() {
                    match execute_line(&handle, line, &config.output).await {
                        Ok(true) => {},
                        Ok(false) => break,
                        Err(e) => eprintln!("{} {}", "Error:".red(), e),
                    }
                }
            },
            Line::Interrupted => println!("^C"),
            Line::Closed => break,
        }
        if ready_tx.send(()).is_err() {
            break;
        }
    }

    drop(ready_tx);
    handle.shutdown();
    watcher.abort();
    session_task.await.context("Session task failed")?;
    reader.await.context("Line editor task failed")?;

    if !config.output.json {
        println!("Bye!");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use keycalc_engine::SessionConfig;

    fn words(pairs: Vec<Pair>) -> Vec<String> {
        pairs.into_iter().map(|p| p.replacement).collect()
    }

    #[test]
    fn test_complete_buttons() {
        assert_eq!(words(complete_word("sq", false)), vec!["sqrt", "square"]);
        assert_eq!(words(complete_word("m-", false)), vec!["m-plus", "m-minus"]);
        assert!(complete_word("", true).is_empty());
    }

    #[test]
    fn test_every_function_completes() {
        assert!(words(complete_word("e", false)).contains(&"e".to_string()));
        for function in Function::ALL {
            assert!(words(complete_word(function.name(), false))
                .contains(&function.name().to_string()));
        }
    }

    #[test]
    fn test_commands_only_complete_first_word() {
        assert_eq!(words(complete_word("ex", true)), vec!["exit"]);
        assert!(complete_word("ex", false).is_empty());
    }

    #[tokio::test]
    async fn test_execute_line() {
        let (session, handle) = Session::new(Calculator::new(), SessionConfig::default());
        tokio::spawn(session.run());
        let output = OutputConfig {
            json: true,
            color: false,
        };

        assert!(execute_line(&handle, "3 + 4 =", &output).await.unwrap());
        assert_eq!(handle.snapshot().await.unwrap().display, "7");

        assert!(execute_line(&handle, "1 + nope", &output).await.is_err());
        assert_eq!(handle.snapshot().await.unwrap().display, "7");

        assert!(!execute_line(&handle, "quit", &output).await.unwrap());
    }
}
