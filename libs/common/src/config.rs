//! Layered configuration loading

use crate::{Error, Result};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Load configuration from multiple sources
///
/// Priority (highest to lowest):
/// 1. Environment variables (`{APP}_` prefix, `__` separates nested keys)
/// 2. Explicit config file (`--config`)
/// 3. App-specific file (e.g., config/keycalc.toml)
/// 4. Default config file (e.g., config/default.toml)
/// 5. Default values
pub fn load_config<T>(app_name: &str, explicit_file: Option<&Path>) -> Result<T>
where
    T: for<'de> Deserialize<'de> + Serialize + Default,
{
    let mut figment = Figment::from(Serialized::defaults(T::default()))
        .merge(Toml::file("config/default.toml"))
        .merge(Yaml::file("config/default.yaml"))
        .merge(Json::file("config/default.json"))
        .merge(Toml::file(format!("config/{}.toml", app_name)))
        .merge(Yaml::file(format!("config/{}.yaml", app_name)));

    if let Some(path) = explicit_file {
        if !path.exists() {
            return Err(Error::config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        figment = figment.merge(file_provider(path)?);
    }

    figment
        .merge(Env::prefixed(&format!("{}_", app_name.to_uppercase())).split("__"))
        .extract()
        .map_err(|e| Error::Config(format!("Failed to load configuration: {}", e)))
}

/// Load configuration from a specific file
pub fn load_config_from_file<T, P>(path: P) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    file_provider(path.as_ref())?
        .extract()
        .map_err(|e| Error::Config(format!("Failed to load configuration from file: {}", e)))
}

/// Render a configuration as TOML
pub fn to_toml<T: Serialize>(config: &T) -> Result<String> {
    toml::to_string_pretty(config).map_err(|e| Error::serialization(e.to_string()))
}

fn file_provider(path: &Path) -> Result<Figment> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::Config("Config file must have an extension".to_string()))?;

    match extension {
        "toml" => Ok(Figment::new().merge(Toml::file(path))),
        "yaml" | "yml" => Ok(Figment::new().merge(Yaml::file(path))),
        "json" => Ok(Figment::new().merge(Json::file(path))),
        _ => Err(Error::Config(format!(
            "Unsupported config file format: {}",
            extension
        ))),
    }
}
