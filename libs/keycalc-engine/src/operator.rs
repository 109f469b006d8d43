//! Binary operators and eager evaluation
//!
//! Operators are applied immediately, left to right, when the next operator
//! or equals arrives. There is no precedence and no expression tree.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{finite, CalcError, Result};
use crate::keymap::UnknownInput;

/// Pending binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    /// Raise-to-power, entered through the `power` function button
    Power,
}

impl Operator {
    pub const ALL: [Operator; 5] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
        Operator::Power,
    ];

    /// Symbol shown in the expression preview
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Power => "**",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = UnknownInput;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "+" => Ok(Operator::Add),
            "-" => Ok(Operator::Subtract),
            "*" => Ok(Operator::Multiply),
            "/" => Ok(Operator::Divide),
            "**" | "^" => Ok(Operator::Power),
            _ => Err(UnknownInput::new("operator", s)),
        }
    }
}

/// Evaluate `a op b`
///
/// Division by zero is reported as [`CalcError::DivisionByZero`], never as an
/// infinite result. Any other non-finite outcome (overflow, real power of a
/// negative base with a fractional exponent) is [`CalcError::NonFinite`].
pub fn calculate(a: f64, b: f64, op: Operator) -> Result<f64> {
    let value = match op {
        Operator::Add => a + b,
        Operator::Subtract => a - b,
        Operator::Multiply => a * b,
        Operator::Divide => {
            if b == 0.0 {
                return Err(CalcError::DivisionByZero);
            }
            a / b
        },
        Operator::Power => a.powf(b),
    };
    finite(value)
}
