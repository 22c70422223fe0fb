//! Template Engine - Jinja template rendering into ConTeXt source
//!
//! This crate provides:
//! - A template environment searching several root directories in order
//! - Rendering of named templates and inline template strings
//! - The `tex_safe` filter escaping ConTeXt control characters
//!
//! # Example
//!
//! ```ignore
//! use template::{context, TemplateEnv};
//!
//! let env = TemplateEnv::new(["templates/custom", "templates/default"]);
//! let source = env.render("letter.tex", context! { name => "Müller & Söhne" })?;
//! ```

mod env;
mod filters;

pub use env::TemplateEnv;
pub use filters::{escape_tex, tex_safe, TEX_ESCAPES, TEX_SAFE_FILTER};
pub use minijinja::context;

use thiserror::Error;

/// Errors that can occur during template processing
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFoundError(String),

    #[error("Template syntax error: {0}")]
    SyntaxError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<minijinja::Error> for TemplateError {
    fn from(err: minijinja::Error) -> Self {
        match err.kind() {
            minijinja::ErrorKind::TemplateNotFound => Self::NotFoundError(err.to_string()),
            minijinja::ErrorKind::SyntaxError => Self::SyntaxError(format!("{:#}", err)),
            _ => Self::RenderError(format!("{:#}", err)),
        }
    }
}

/// Result type for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;
