//! Interpreter configuration.
//!
//! Loaded from the `[interpreter]` table of a TOML file. Every field has a
//! default so an empty table (or no file at all) is valid.

use serde::Deserialize;

use crate::error::{CinderError, Result};

/// Tunables for a single interpreter instance.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InterpreterConfig {
    /// Character that marks a whole line as a comment when it is the first
    /// non-blank character.
    #[serde(default = "default_comment_marker")]
    pub comment_marker: char,
    /// Whether the built-in commands (`SET`, `PRINT`, `GOTO`, ...) are
    /// installed by the host.
    #[serde(default = "default_builtins")]
    pub builtins: bool,
}

fn default_comment_marker() -> char {
    '#'
}

fn default_builtins() -> bool {
    true
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            comment_marker: default_comment_marker(),
            builtins: default_builtins(),
        }
    }
}

impl InterpreterConfig {
    /// Parse a configuration from TOML source.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the tokenizer cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.comment_marker.is_whitespace() {
            return Err(CinderError::Config(
                "comment_marker must not be whitespace".to_string(),
            ));
        }
        Ok(())
    }
}
