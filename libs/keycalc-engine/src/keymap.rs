//! Inbound actions and their key/button bindings
//!
//! The presentation layer translates raw keyboard keys and button names into
//! [`Action`]s; the engine only ever sees actions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::functions::Function;
use crate::operator::Operator;

/// A name that does not correspond to any key or button
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind}: {name}")]
pub struct UnknownInput {
    pub kind: &'static str,
    pub name: String,
}

impl UnknownInput {
    pub fn new(kind: &'static str, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

/// One inbound engine operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action", content = "value")]
pub enum Action {
    Digit(char),
    Decimal,
    Operator(Operator),
    Function(Function),
    Equals,
    Clear,
    AllClear,
    Backspace,
    MemoryAdd,
    MemorySubtract,
    MemoryRecall,
    MemoryClear,
    OpenParenthesis,
    CloseParenthesis,
}

/// Keyboard bindings, in lookup order
pub static KEY_BINDINGS: &[(&str, Action)] = &[
    ("0", Action::Digit('0')),
    ("1", Action::Digit('1')),
    ("2", Action::Digit('2')),
    ("3", Action::Digit('3')),
    ("4", Action::Digit('4')),
    ("5", Action::Digit('5')),
    ("6", Action::Digit('6')),
    ("7", Action::Digit('7')),
    ("8", Action::Digit('8')),
    ("9", Action::Digit('9')),
    ("+", Action::Operator(Operator::Add)),
    ("-", Action::Operator(Operator::Subtract)),
    ("*", Action::Operator(Operator::Multiply)),
    ("/", Action::Operator(Operator::Divide)),
    (".", Action::Decimal),
    (",", Action::Decimal),
    ("=", Action::Equals),
    ("Enter", Action::Equals),
    ("Backspace", Action::Backspace),
    ("Delete", Action::AllClear),
    ("Escape", Action::AllClear),
    ("c", Action::Clear),
    ("C", Action::Clear),
    ("(", Action::OpenParenthesis),
    (")", Action::CloseParenthesis),
];

/// Look up the action bound to a keyboard key
pub fn action_for_key(key: &str) -> Option<Action> {
    KEY_BINDINGS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, action)| *action)
}

impl Action {
    /// Button name for non-digit, non-operator, non-function actions
    pub fn button_name(self) -> Option<&'static str> {
        Some(match self {
            Action::Clear => "clear",
            Action::AllClear => "all-clear",
            Action::Backspace => "backspace",
            Action::Decimal => "decimal",
            Action::Equals => "equals",
            Action::MemoryClear => "mc",
            Action::MemoryRecall => "mr",
            Action::MemoryAdd => "m-plus",
            Action::MemorySubtract => "m-minus",
            Action::OpenParenthesis => "open-paren",
            Action::CloseParenthesis => "close-paren",
            Action::Digit(_) | Action::Operator(_) | Action::Function(_) => return None,
        })
    }

    /// Every action reachable only through a button name
    pub const BUTTONS: [Action; 11] = [
        Action::Clear,
        Action::AllClear,
        Action::Backspace,
        Action::Decimal,
        Action::Equals,
        Action::MemoryClear,
        Action::MemoryRecall,
        Action::MemoryAdd,
        Action::MemorySubtract,
        Action::OpenParenthesis,
        Action::CloseParenthesis,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Digit(d) => write!(f, "{}", d),
            Action::Operator(op) => write!(f, "{}", op),
            Action::Function(function) => write!(f, "{}", function),
            other => f.write_str(other.button_name().unwrap_or("?")),
        }
    }
}

/// Parse a button name: a single digit, an operator symbol, a function
/// name, or an action name such as `all-clear` or `m-plus`.
impl FromStr for Action {
    type Err = UnknownInput;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(d), None) = (chars.next(), chars.next()) {
            if d.is_ascii_digit() {
                return Ok(Action::Digit(d));
            }
        }
        if let Ok(op) = s.parse::<Operator>() {
            return Ok(Action::Operator(op));
        }
        if let Ok(function) = s.parse::<Function>() {
            return Ok(Action::Function(function));
        }
        Action::BUTTONS
            .into_iter()
            .find(|action| action.button_name() == Some(s))
            .ok_or_else(|| UnknownInput::new("button", s))
    }
}
