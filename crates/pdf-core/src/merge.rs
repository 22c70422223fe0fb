//! Page concatenation

use crate::copy::ObjectCopier;
use crate::document::{flattened_page, pages_root_id, PdfDocument};
use crate::outline::outline_span;
use crate::{PdfError, Result};
use lopdf::Object;

impl PdfDocument {
    /// Append all pages of `other` after the last page of this document
    ///
    /// Pages are copied with everything they reference. Inherited page
    /// attributes are made explicit on the copies, since the copies hang
    /// directly off this document's root page node. The top-level outline
    /// entries of `other` follow this document's own entries and point at
    /// the copied pages.
    ///
    /// # Returns
    /// Number of pages appended
    pub fn append(&mut self, other: &PdfDocument) -> Result<usize> {
        let source = &other.inner;
        let source_pages: Vec<_> = source.get_pages().into_values().collect();
        if source_pages.is_empty() {
            return Ok(0);
        }

        let pages_id = pages_root_id(&self.inner)?;
        let outline = match outline_span(source)? {
            Some(span) => Some((self.outline_root()?, span)),
            None => None,
        };

        let mut copier = ObjectCopier::new(source, &mut self.inner);
        if let Some((outlines_id, span)) = &outline {
            if let Some(root) = span.root {
                copier.alias(root, *outlines_id);
            }
        }
        // Reserve every page first so links between pages land on the copies
        let new_page_ids: Vec<_> = source_pages
            .iter()
            .map(|page_id| copier.reserve(*page_id))
            .collect();

        for (page_id, new_page_id) in source_pages.iter().zip(&new_page_ids) {
            let mut page = flattened_page(source, *page_id)?;
            page.remove(b"Parent");
            let mut page = copier.remap(Object::Dictionary(page))?;
            if let Object::Dictionary(dict) = &mut page {
                dict.set("Parent", pages_id);
            }
            copier.insert(*new_page_id, page);
        }

        let imported = match &outline {
            Some((outlines_id, span)) => Some((
                *outlines_id,
                copier.copy_object(span.first)?,
                copier.copy_object(span.last)?,
                span.count,
            )),
            None => None,
        };

        let pages_dict = self
            .inner
            .get_object_mut(pages_id)?
            .as_dict_mut()
            .map_err(|_| PdfError::ParseError("Pages object is not a dictionary".to_string()))?;
        let mut kids = pages_dict
            .get(b"Kids")
            .and_then(Object::as_array)
            .map_err(|_| PdfError::ParseError("Pages object missing Kids array".to_string()))?
            .clone();
        let count = pages_dict
            .get(b"Count")
            .and_then(Object::as_i64)
            .map_err(|_| PdfError::ParseError("Pages object missing Count".to_string()))?;

        kids.extend(new_page_ids.iter().copied().map(Object::Reference));
        pages_dict.set("Kids", Object::Array(kids));
        pages_dict.set("Count", Object::Integer(count + new_page_ids.len() as i64));

        if let Some((outlines_id, first, last, entries)) = imported {
            self.attach_outline_items(outlines_id, first, last, entries)?;
            log::debug!("Imported {} outline entries", entries);
        }

        Ok(new_page_ids.len())
    }
}

/// Append the pages of each `additional` PDF to `primary`, in order
///
/// Empty buffers in `additional` are skipped with a warning.
///
/// # Arguments
/// * `primary` - PDF whose pages come first
/// * `additional` - PDFs appended after it
///
/// # Example
/// ```ignore
/// let merged = concatenate(&letter, &[&terms, &invoice])?;
/// ```
pub fn concatenate<A: AsRef<[u8]>>(primary: &[u8], additional: &[A]) -> Result<Vec<u8>> {
    let mut doc = PdfDocument::open_from_bytes(primary)?;

    for (index, pdf) in additional.iter().enumerate() {
        let pdf = pdf.as_ref();
        if pdf.is_empty() {
            log::warn!("PDF #{} is empty, not appending it", index + 1);
            continue;
        }
        let other = PdfDocument::open_from_bytes(pdf)?;
        let appended = doc.append(&other)?;
        log::debug!("Appended {} pages from PDF #{}", appended, index + 1);
    }

    doc.to_bytes()
}
