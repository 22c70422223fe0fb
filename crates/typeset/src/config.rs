//! Compiler configuration

use crate::{Result, TypesetError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default wall-clock limit for one engine run
const DEFAULT_TIMEOUT_MS: u64 = 300_000;

/// How and where the typesetting engine is run
///
/// Every field has a default, so a JSON document only needs the keys it
/// changes:
///
/// ```json
/// { "staging_root": "/var/tmp/letters", "timeout_ms": 60000 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Engine binary, looked up on `PATH` unless absolute
    pub program: String,
    /// Arguments placed before the source file name
    pub args: Vec<String>,
    /// Parent of the per-run staging directories (system temp dir if unset)
    pub staging_root: Option<PathBuf>,
    /// Kill the engine after this many milliseconds; `None` waits forever
    pub timeout_ms: Option<u64>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: "context".to_string(),
            args: vec!["--nonstop".to_string(), "--once".to_string()],
            staging_root: None,
            timeout_ms: Some(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl CompilerConfig {
    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| TypesetError::Config(e.to_string()))
    }

    /// Use a different engine binary and argument list
    pub fn with_program<S: Into<String>>(mut self, program: S, args: &[&str]) -> Self {
        self.program = program.into();
        self.args = args.iter().map(|arg| arg.to_string()).collect();
        self
    }

    pub fn with_staging_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.staging_root = Some(root.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout_ms = timeout.map(|t| t.as_millis().try_into().unwrap_or(u64::MAX));
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Directory new staging directories are created in
    pub fn staging_root(&self) -> PathBuf {
        self.staging_root.clone().unwrap_or_else(std::env::temp_dir)
    }
}
