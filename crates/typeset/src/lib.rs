//! Typeset - compile ConTeXt source to PDF bytes
//!
//! This crate provides:
//! - A compiler that stages `document.tex` in a fresh temp directory,
//!   symlinks auxiliary files next to it and runs `context` there
//! - A serde-loadable configuration (program, arguments, staging root, timeout)
//! - Sweeping of staging directories left behind by failed runs
//!
//! Failed and timed-out runs keep their staging directory so the engine's
//! own log files can be inspected.
//!
//! # Example
//!
//! ```ignore
//! use typeset::{Compiled, Compiler, CompilerConfig};
//!
//! let compiler = Compiler::new(CompilerConfig::default());
//! match compiler.compile(&source, &["assets/logo.pdf"])? {
//!     Compiled::Produced(pdf) => std::fs::write("letter.pdf", pdf)?,
//!     Compiled::Skipped(reason) => eprintln!("nothing to do: {:?}", reason),
//! }
//! ```

mod compiler;
mod config;
mod staging;

pub use compiler::{Compiled, Compiler, SkipReason, OUTPUT_FILE, SOURCE_FILE, STDERR_LOG};
pub use config::CompilerConfig;
pub use staging::{sweep_stale_staging, STAGING_PREFIX};

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while compiling a document
#[derive(Debug, Error)]
pub enum TypesetError {
    #[error("Source text is empty, nothing to compile")]
    EmptySource,

    #[error("Failed to create staging directory in {}: {source}", .root.display())]
    Staging {
        root: PathBuf,
        source: std::io::Error,
    },

    #[error("Auxiliary path has no file name: {}", .0.display())]
    AuxiliaryName(PathBuf),

    #[error("Auxiliary file not found: {}", .0.display())]
    AuxiliaryMissing(PathBuf),

    #[error("Auxiliary file name {name:?} is already used in the staging directory ({})", .path.display())]
    AuxiliaryCollision { name: String, path: PathBuf },

    #[error("Failed to run {program}: {source}, staging directory kept at {}", .staging.display())]
    Spawn {
        program: String,
        staging: PathBuf,
        source: std::io::Error,
    },

    #[error("Lost track of the engine: {source}, staging directory kept at {}", .staging.display())]
    Invoke {
        staging: PathBuf,
        source: std::io::Error,
    },

    #[error("Typesetting failed (exit code {code:?}), staging directory kept at {}", .staging.display())]
    Failed { code: Option<i32>, staging: PathBuf },

    #[error("Typesetting timed out after {timeout:?}, staging directory kept at {}", .staging.display())]
    TimedOut { timeout: Duration, staging: PathBuf },

    #[error("Typesetting produced no output, staging directory kept at {}", .staging.display())]
    MissingOutput { staging: PathBuf },

    #[error("Invalid compiler configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TypesetError {
    /// Staging directory left on disk by this failure, if any
    pub fn staging_dir(&self) -> Option<&PathBuf> {
        match self {
            Self::Spawn { staging, .. }
            | Self::Invoke { staging, .. }
            | Self::Failed { staging, .. }
            | Self::TimedOut { staging, .. }
            | Self::MissingOutput { staging } => Some(staging),
            _ => None,
        }
    }
}

/// Result type for typesetting operations
pub type Result<T> = std::result::Result<T, TypesetError>;
