//! Server configuration.
//!
//! Values come from three layers, lowest precedence first: built-in
//! defaults, command-line flags, and the `initializationOptions` object the
//! client sends with `initialize`. The last layer is a partial JSON object
//! merged key by key over the current configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Name of the scratch directory inside the cache directory.
pub const SCRATCH_DIR_NAME: &str = ".tempFiles";

/// Configuration for linting and scratch files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Linter executable, looked up on `PATH`.
    pub linter: String,
    /// Arguments placed before the scratch file path.
    pub linter_args: Vec<String>,
    /// Type-checker executable. `None` disables type checking.
    pub type_checker: Option<String>,
    /// Arguments placed after the scratch file path.
    pub type_checker_args: Vec<String>,
    /// Directory holding scratch files; removed on shutdown.
    pub cache_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            linter: "ruff".to_string(),
            linter_args: vec!["check".to_string()],
            type_checker: Some("mypy".to_string()),
            type_checker_args: vec!["--show-column-number".to_string()],
            cache_dir: PathBuf::from(".nblint"),
        }
    }
}

impl Config {
    /// Directory the scratch files are written to.
    pub fn scratch_dir(&self) -> PathBuf {
        self.cache_dir.join(SCRATCH_DIR_NAME)
    }

    /// Merge a partial JSON object over this configuration.
    ///
    /// Keys absent from `overrides` keep their current value; `null` for
    /// `typeChecker` disables the type checker. Anything other than an
    /// object is ignored.
    pub fn merged_with(&self, overrides: &serde_json::Value) -> serde_json::Result<Config> {
        let serde_json::Value::Object(overrides) = overrides else {
            return Ok(self.clone());
        };

        let mut merged = serde_json::to_value(self)?;
        if let serde_json::Value::Object(base) = &mut merged {
            for (key, value) in overrides {
                base.insert(key.clone(), value.clone());
            }
        }
        serde_json::from_value(merged)
    }
}
