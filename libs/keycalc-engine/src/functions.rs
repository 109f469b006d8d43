//! Unary scientific functions
//!
//! Applied to the current operand; the result replaces it. Trigonometric
//! functions take degrees.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{finite, CalcError, Result};
use crate::keymap::UnknownInput;
use crate::operator::Operator;

/// Largest n whose factorial is representable as a finite f64
pub const FACTORIAL_LIMIT: f64 = 170.0;

/// Function buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Log,
    Ln,
    Sqrt,
    Square,
    Factorial,
    Inverse,
    Percent,
    Negate,
    Abs,
    Pi,
    E,
    Power,
}

impl Function {
    pub const ALL: [Function; 15] = [
        Function::Sin,
        Function::Cos,
        Function::Tan,
        Function::Log,
        Function::Ln,
        Function::Sqrt,
        Function::Square,
        Function::Factorial,
        Function::Inverse,
        Function::Percent,
        Function::Negate,
        Function::Abs,
        Function::Pi,
        Function::E,
        Function::Power,
    ];

    /// Button name
    pub fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Log => "log",
            Function::Ln => "ln",
            Function::Sqrt => "sqrt",
            Function::Square => "square",
            Function::Factorial => "factorial",
            Function::Inverse => "inverse",
            Function::Percent => "percent",
            Function::Negate => "negate",
            Function::Abs => "abs",
            Function::Pi => "pi",
            Function::E => "e",
            Function::Power => "power",
        }
    }

    /// Binary operator this function defers to instead of evaluating
    pub fn deferred_operator(self) -> Option<Operator> {
        match self {
            Function::Power => Some(Operator::Power),
            _ => None,
        }
    }

    /// Evaluate the function on `x`
    ///
    /// Returns `None` for functions that wait for a second operand
    /// (see [`Function::deferred_operator`]).
    pub fn evaluate(self, x: f64) -> Option<Result<f64>> {
        let value = match self {
            Function::Sin => Ok(to_radians(x).sin()),
            Function::Cos => Ok(to_radians(x).cos()),
            Function::Tan => Ok(to_radians(x).tan()),
            Function::Log => positive(self, x).map(f64::log10),
            Function::Ln => positive(self, x).map(f64::ln),
            Function::Sqrt => {
                if x < 0.0 {
                    Err(CalcError::invalid_domain(self.name()))
                } else {
                    Ok(x.sqrt())
                }
            },
            Function::Square => Ok(x.powi(2)),
            Function::Factorial => factorial(x),
            Function::Inverse => {
                if x == 0.0 {
                    Err(CalcError::DivisionByZero)
                } else {
                    Ok(1.0 / x)
                }
            },
            Function::Percent => Ok(x / 100.0),
            Function::Negate => Ok(-x),
            Function::Abs => Ok(x.abs()),
            Function::Pi => Ok(std::f64::consts::PI),
            Function::E => Ok(std::f64::consts::E),
            Function::Power => return None,
        };

        debug!(function = self.name(), input = x, ?value, "function");
        Some(value.and_then(finite))
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Function {
    type Err = UnknownInput;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Function::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| UnknownInput::new("function", s))
    }
}

fn positive(function: Function, x: f64) -> Result<f64> {
    if x <= 0.0 {
        Err(CalcError::invalid_domain(function.name()))
    } else {
        Ok(x)
    }
}

/// Degrees to radians
pub fn to_radians(degrees: f64) -> f64 {
    degrees * (std::f64::consts::PI / 180.0)
}

/// Iterative factorial over non-negative integers up to [`FACTORIAL_LIMIT`]
pub fn factorial(n: f64) -> Result<f64> {
    if n < 0.0 || n.fract() != 0.0 {
        return Err(CalcError::invalid_domain("factorial"));
    }
    if n > FACTORIAL_LIMIT {
        return Err(CalcError::overflow("factorial"));
    }

    let mut result = 1.0;
    let mut i = 2.0;
    while i <= n {
        result *= i;
        i += 1.0;
    }
    Ok(result)
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    fn eval(function: Function, x: f64) -> Result<f64> {
        function.evaluate(x).unwrap()
    }

    #[test]
    fn test_factorial() {
        assert_eq!(factorial(0.0).unwrap(), 1.0);
        assert_eq!(factorial(1.0).unwrap(), 1.0);
        assert_eq!(factorial(5.0).unwrap(), 120.0);
        assert!(factorial(170.0).unwrap().is_finite());
        assert_eq!(
            factorial(171.0),
            Err(CalcError::Overflow("factorial".to_string()))
        );
        assert_eq!(
            factorial(-1.0),
            Err(CalcError::InvalidDomain("factorial".to_string()))
        );
        assert_eq!(
            factorial(2.5),
            Err(CalcError::InvalidDomain("factorial".to_string()))
        );
    }

    #[test]
    fn test_trig_uses_degrees() {
        assert!((eval(Function::Sin, 30.0).unwrap() - 0.5).abs() < 1e-12);
        assert!((eval(Function::Cos, 60.0).unwrap() - 0.5).abs() < 1e-12);
        assert!((eval(Function::Tan, 45.0).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(eval(Function::Sin, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_logarithm_domain() {
        assert!((eval(Function::Log, 1000.0).unwrap() - 3.0).abs() < 1e-12);
        assert_eq!(eval(Function::Ln, 1.0).unwrap(), 0.0);
        assert_eq!(
            eval(Function::Log, 0.0),
            Err(CalcError::InvalidDomain("log".to_string()))
        );
        assert_eq!(
            eval(Function::Ln, -2.0),
            Err(CalcError::InvalidDomain("ln".to_string()))
        );
    }

    #[test]
    fn test_sqrt_domain() {
        assert_eq!(eval(Function::Sqrt, 16.0).unwrap(), 4.0);
        assert_eq!(eval(Function::Sqrt, 0.0).unwrap(), 0.0);
        assert_eq!(
            eval(Function::Sqrt, -4.0),
            Err(CalcError::InvalidDomain("sqrt".to_string()))
        );
    }

    #[test]
    fn test_simple_functions() {
        assert_eq!(eval(Function::Square, -3.0).unwrap(), 9.0);
        assert_eq!(eval(Function::Inverse, 4.0).unwrap(), 0.25);
        assert_eq!(eval(Function::Inverse, 0.0), Err(CalcError::DivisionByZero));
        assert_eq!(eval(Function::Percent, 50.0).unwrap(), 0.5);
        assert_eq!(eval(Function::Negate, 7.0).unwrap(), -7.0);
        assert_eq!(eval(Function::Abs, -7.0).unwrap(), 7.0);
    }

    #[test]
    fn test_constants_ignore_operand() {
        assert_eq!(eval(Function::Pi, 42.0).unwrap(), std::f64::consts::PI);
        assert_eq!(eval(Function::E, f64::NAN).unwrap(), std::f64::consts::E);
    }

    #[test]
    fn test_power_defers_to_operator() {
        assert!(Function::Power.evaluate(2.0).is_none());
        assert_eq!(Function::Power.deferred_operator(), Some(Operator::Power));
        assert_eq!(Function::Sqrt.deferred_operator(), None);
    }

    #[test]
    fn test_nan_operand_is_non_finite() {
        assert_eq!(eval(Function::Sin, f64::NAN), Err(CalcError::NonFinite));
    }

    #[test]
    fn test_names_round_trip() {
        for function in Function::ALL {
            assert_eq!(function.name().parse::<Function>().unwrap(), function);
        }
        assert!("cot".parse::<Function>().is_err());
    }
}
