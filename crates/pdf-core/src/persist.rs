//! Writing finished PDFs to disk

use crate::{PdfError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Write `pdf` to `directory/filename`, creating `directory` if needed
///
/// An existing file at the destination is overwritten. Empty bytes are
/// rejected with [`PdfError::EmptyDocument`] and nothing is written.
///
/// # Returns
/// The path that was written
pub fn save_pdf(pdf: &[u8], filename: &str, directory: Option<&Path>) -> Result<PathBuf> {
    if pdf.is_empty() {
        log::error!("PDF {} not saved, bytes are empty", filename);
        return Err(PdfError::EmptyDocument);
    }

    let path = match directory {
        Some(dir) => {
            if !dir.exists() {
                log::debug!("Creating directory {}", dir.display());
                fs::create_dir_all(dir)?;
            }
            dir.join(filename)
        }
        None => PathBuf::from(filename),
    };

    fs::write(&path, pdf)?;
    log::info!("Saved {}", path.display());
    Ok(path)
}
