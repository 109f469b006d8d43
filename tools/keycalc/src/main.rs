//! keycalc - terminal keypad for the keycalc engine
//!
//! Feeds keys and button names to a calculator session, either one line at
//! a time from an interactive prompt or in one shot from the command line.

mod eval;
mod input;
mod render;
mod repl;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::settings::ToolConfig;

#[derive(Parser)]
#[command(name = "keycalc")]
#[command(about = "Keypad calculator with eager left-to-right evaluation")]
#[command(long_about = "Keypad calculator with eager left-to-right evaluation

Input is a list of keys and button names separated by spaces:
  digits and '.'     12.5 is entered one key at a time
  operators          + - * / ** ^
  functions          sin cos tan log ln sqrt square factorial inverse
                     percent negate abs pi e power
  actions            clear all-clear backspace equals mc mr m-plus m-minus
                     open-paren close-paren ( ) Enter Escape

Examples:
  keycalc                               # interactive prompt
  keycalc eval 5 + 3 '*' 2 =            # prints 16
  keycalc eval 9 sqrt m-plus clear mr   # prints 3 with the memory indicator
  keycalc --json eval 1 / 0 =           # error snapshot as JSON, exit code 1")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (toml, yaml or json)
    #[arg(short = 'c', long = "config", global = true, env = "KEYCALC_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Print snapshots as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive prompt (default)
    Repl,

    /// Evaluate a token list and print the final display
    Eval {
        /// Keys and button names, applied in order
        #[arg(required = true, allow_hyphen_values = true)]
        tokens: Vec<String>,
    },

    /// Show the keyboard mapping and button names
    Keys,

    /// Show the effective configuration as TOML
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = ToolConfig::load(cli.config.as_deref())?.with_overrides(
        cli.verbose,
        cli.no_color,
        cli.json,
    );

    if !config.output.color {
        colored::control::set_override(false);
    }

    let _log_guard = common::init_logging(&config.logging).context("Failed to initialize logging")?;
    debug!(?config, "Configuration loaded");

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => repl::run(&config).await?,
        Commands::Eval { tokens } => {
            let snapshot = eval::evaluate(&tokens, &config.engine).await?;
            println!("{}", render::snapshot(&snapshot, &config.output));
            if snapshot.error {
                return Ok(ExitCode::FAILURE);
            }
        },
        Commands::Keys => print!("{}", render::key_table()),
        Commands::Config => print!("{}", common::config::to_toml(&config)?),
    }

    Ok(ExitCode::SUCCESS)
}
