//! Snapshot output, coloured text or JSON lines

use colored::*;
use keycalc_engine::{Action, Snapshot, KEY_BINDINGS};

use crate::settings::OutputConfig;

pub fn snapshot(snapshot: &Snapshot, output: &OutputConfig) -> String {
    if output.json {
        // Snapshot only holds strings and a bool
        return serde_json::to_string(snapshot).unwrap_or_default();
    }

    let memory = match &snapshot.memory {
        Some(value) => format!("M {}", value),
        None => String::new(),
    };
    let display = if snapshot.error {
        snapshot.display.red().bold()
    } else {
        snapshot.display.bright_white().bold()
    };
    let expression = if snapshot.error {
        snapshot.expression.red()
    } else {
        snapshot.expression.dimmed()
    };

    let mut lines = Vec::with_capacity(2);
    if !snapshot.expression.is_empty() || !memory.is_empty() {
        lines.push(format!("{:<24} {}", expression, memory.yellow()).trim_end().to_string());
    }
    lines.push(format!("{}", display));
    lines.join("\n")
}

/// Keyboard table plus the button names understood by `eval` and the REPL
pub fn key_table() -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "Keyboard".bright_cyan().bold()));
    for (key, action) in KEY_BINDINGS {
        out.push_str(&format!("  {:<10} {:?}\n", key.bright_yellow(), action));
    }

    out.push_str(&format!("\n{}\n", "Buttons".bright_cyan().bold()));
    let functions: Vec<&str> = keycalc_engine::Function::ALL
        .iter()
        .map(|f| f.name())
        .collect();
    out.push_str(&format!("  functions  {}\n", functions.join(" ")));
    out.push_str("  operators  + - * / ** ^\n");
    let actions: Vec<&str> = Action::BUTTONS
        .into_iter()
        .filter_map(Action::button_name)
        .collect();
    out.push_str(&format!("  actions    {}\n", actions.join(" ")));
    out
}
