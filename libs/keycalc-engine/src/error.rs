//! Error types for keycalc-engine

use thiserror::Error;

/// Calculation errors
///
/// Every variant except `SessionClosed` is recovered inside the engine: the
/// display switches to `Error` and the message text is shown in the
/// expression line until the auto-revert fires.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("Division by zero")]
    DivisionByZero,

    #[error("Invalid input for {0}")]
    InvalidDomain(String),

    #[error("Number too large for {0}")]
    Overflow(String),

    #[error("Result is not a finite number")]
    NonFinite,

    #[error("Session closed")]
    SessionClosed,
}

impl CalcError {
    pub fn invalid_domain(function: impl Into<String>) -> Self {
        Self::InvalidDomain(function.into())
    }

    pub fn overflow(function: impl Into<String>) -> Self {
        Self::Overflow(function.into())
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;

/// Reject NaN and infinities produced by any computation
pub(crate) fn finite(value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::NonFinite)
    }
}
