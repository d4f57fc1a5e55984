//! Host configuration, read from `cinder.toml`.

use std::path::Path;

use serde::Deserialize;

use cinder_types::{InterpreterConfig, Result};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "cinder.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// `env_logger` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Print every variable after the script finishes.
    #[serde(default)]
    pub dump_variables: bool,
    #[serde(default)]
    pub interpreter: InterpreterConfig,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            dump_variables: false,
            interpreter: InterpreterConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.interpreter.validate()?;
        Ok(config)
    }

    /// Load from `path`, or from `cinder.toml` if present, or fall back to
    /// defaults. An explicit path that cannot be read is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if !fallback.exists() {
                    return Ok(Self::default());
                }
                fallback
            },
        };
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}
