//! Evaluator configuration, loaded from TOML

use crate::error::{EvalError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default nesting limit for one evaluation
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Tunables for the evaluator and the web-fetch builtin.
///
/// ```toml
/// max_depth = 512
/// fetch_timeout_secs = 5
/// user_agent = "rules-engine/2.1"
/// history_file = "/var/lib/rules/.formula_history"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalConfig {
    /// Maximum recursion depth before `MaxDepthExceeded`
    pub max_depth: usize,
    /// Timeout for `GetWebPage` requests, in seconds
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
    /// REPL history location; `$HOME/.formula_history` when unset
    pub history_file: Option<PathBuf>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            fetch_timeout_secs: 10,
            user_agent: concat!("formula/", env!("CARGO_PKG_VERSION")).to_string(),
            history_file: None,
        }
    }
}

impl EvalConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: EvalConfig = toml::from_str(text).map_err(|e| EvalError::config(e.message().to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| EvalError::io_error(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(EvalError::config("max_depth must be at least 1"));
        }
        Ok(())
    }
}
