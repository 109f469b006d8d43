//! Common library for keycalc tools
//!
//! Layered configuration loading and logging initialisation shared by the
//! binaries in this workspace.

pub mod config;
pub mod error;
pub mod logging;

// Re-exports for convenience
pub use error::{Error, Result};
pub use logging::{init_logging, LogConfig, LogFormat};
