//! PDF Core - post-processing of finished PDF documents
//!
//! This crate provides functionality for:
//! - Appending the pages of other PDFs to a document
//! - Adding top-level bookmarks (outline entries)
//! - Stamping a single-page PDF under or over every page
//! - Writing PDF bytes to disk
//!
//! Every byte-level operation takes one or more complete PDF buffers and
//! returns a new buffer; inputs are never modified.
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{add_bookmarks, concatenate, save_pdf, stamp_with_named_asset, Bookmark, StampLayer};
//!
//! let merged = concatenate(&letter, &[&attachment])?;
//! let marked = add_bookmarks(&merged, &[Bookmark::new("Attachment", 1)])?;
//! let copy = stamp_with_named_asset(&marked, "en", StampLayer::Overlay)?;
//! save_pdf(&copy, "letter-copy.pdf", Some("out".as_ref()))?;
//! ```

mod copy;
mod document;
mod merge;
mod outline;
mod persist;
mod stamp;

pub use document::PdfDocument;
pub use merge::concatenate;
pub use outline::{add_bookmarks, Bookmark};
pub use persist::save_pdf;
pub use stamp::{stamp, stamp_with_named_asset, StampLanguage, StampLayer, STAMP_DIR};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("No valid stamp language specified: {0:?}")]
    InvalidLanguage(String),

    #[error("PDF bytes are empty, nothing to save")]
    EmptyDocument,

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;
