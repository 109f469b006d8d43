//! Tool configuration, merged from defaults, files and `KEYCALC_` env vars

use std::path::Path;

use anyhow::{Context, Result};
use common::LogConfig;
use keycalc_engine::SessionConfig;
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "keycalc";

/// Output preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Print snapshots as JSON lines
    pub json: bool,
    /// Colourise terminal output
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json: false,
            color: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub engine: SessionConfig,
    pub logging: LogConfig,
    pub output: OutputConfig,
}

impl ToolConfig {
    pub fn load(explicit_file: Option<&Path>) -> Result<Self> {
        common::config::load_config(APP_NAME, explicit_file)
            .context("Failed to load keycalc configuration")
    }

    /// Apply command-line overrides on top of the loaded layers
    pub fn with_overrides(mut self, verbosity: u8, no_color: bool, json: bool) -> Self {
        self.logging = self.logging.with_verbosity(verbosity);
        if no_color {
            self.output.color = false;
            self.logging.ansi = false;
        }
        if json {
            self.output.json = true;
        }
        self
    }
}
