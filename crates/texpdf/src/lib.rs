//! texpdf - render templates to ConTeXt, typeset them and post-process the PDF
//!
//! This crate ties the member crates together:
//! - [`template`] renders Jinja templates into ConTeXt source
//! - [`typeset`] runs `context` on that source in a staging directory
//! - [`pdf_core`] merges, bookmarks, stamps and saves the resulting PDF
//!
//! # Example
//!
//! ```ignore
//! use texpdf::{context, save_pdf, stamp_with_named_asset, Compiled, Compiler, Pipeline, StampLayer, TemplateEnv};
//!
//! let pipeline = Pipeline::new(
//!     TemplateEnv::new(["templates/custom", "templates/default"]),
//!     Compiler::default(),
//! );
//!
//! let Compiled::Produced(pdf) =
//!     pipeline.render_pdf("letter.tex", context! { name => "Müller & Söhne" }, &["assets/logo.pdf"])?
//! else {
//!     return Ok(());
//! };
//! let copy = stamp_with_named_asset(&pdf, "de", StampLayer::Underlay)?;
//! save_pdf(&copy, "letter.pdf", Some("out".as_ref()))?;
//! ```

mod pipeline;

pub use pipeline::Pipeline;

pub use pdf_core::{
    add_bookmarks, concatenate, save_pdf, stamp, stamp_with_named_asset, Bookmark, PdfDocument,
    PdfError, StampLanguage, StampLayer, STAMP_DIR,
};
pub use template::{context, escape_tex, tex_safe, TemplateEnv, TemplateError, TEX_SAFE_FILTER};
pub use typeset::{
    sweep_stale_staging, Compiled, Compiler, CompilerConfig, SkipReason, TypesetError,
};

use thiserror::Error;

/// Any error raised along the pipeline
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Typeset(#[from] TypesetError),

    #[error(transparent)]
    Pdf(#[from] PdfError),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;
