//! Bookmarks (document outline)

use crate::document::{catalog_id, PdfDocument};
use crate::{PdfError, Result};
use lopdf::{dictionary, Document, Object, ObjectId, StringFormat};
use std::collections::HashSet;

/// Top-level entries of an existing outline tree
pub(crate) struct OutlineSpan {
    /// The `Outlines` dictionary, when it is an indirect object
    pub(crate) root: Option<ObjectId>,
    pub(crate) first: ObjectId,
    pub(crate) last: ObjectId,
    /// Visible entries below the root
    pub(crate) count: i64,
}

/// Locate the outline of `doc`; `None` when it has no entries
pub(crate) fn outline_span(doc: &Document) -> Result<Option<OutlineSpan>> {
    let catalog = doc
        .get_dictionary(catalog_id(doc)?)
        .map_err(|_| PdfError::ParseError("Catalog is not a dictionary".to_string()))?;
    let (root, outlines) = match catalog.get(b"Outlines") {
        Ok(Object::Reference(id)) => match doc.get_dictionary(*id) {
            Ok(dict) => (Some(*id), dict),
            Err(_) => return Ok(None),
        },
        Ok(Object::Dictionary(dict)) => (None, dict),
        _ => return Ok(None),
    };

    let first = outlines.get(b"First").and_then(Object::as_reference);
    let last = outlines.get(b"Last").and_then(Object::as_reference);
    let (Ok(first), Ok(last)) = (first, last) else {
        return Ok(None);
    };
    let count = match outlines.get(b"Count").and_then(Object::as_i64) {
        Ok(count) => count.abs(),
        Err(_) => top_level_ids(doc, first).len() as i64,
    };

    Ok(Some(OutlineSpan {
        root,
        first,
        last,
        count,
    }))
}

/// IDs along the `Next` chain starting at `first`, stopping at a repeat
fn top_level_ids(doc: &Document, first: ObjectId) -> Vec<ObjectId> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    let mut next = Some(first);
    while let Some(id) = next {
        if !seen.insert(id) {
            break;
        }
        ids.push(id);
        next = doc
            .get_dictionary(id)
            .ok()
            .and_then(|item| item.get(b"Next").and_then(Object::as_reference).ok());
    }
    ids
}

/// A top-level outline entry pointing at a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    /// Text shown in the viewer's outline panel
    pub label: String,
    /// Target page (0-indexed)
    pub page: usize,
}

impl Bookmark {
    pub fn new(label: impl Into<String>, page: usize) -> Self {
        Self {
            label: label.into(),
            page,
        }
    }
}

impl<S: Into<String>> From<(S, usize)> for Bookmark {
    fn from((label, page): (S, usize)) -> Self {
        Self::new(label, page)
    }
}

impl PdfDocument {
    /// Add one top-level outline entry per bookmark, in order
    ///
    /// Entries are appended after any outline the document already has.
    /// All page indices are checked before anything is written.
    pub fn add_bookmarks(&mut self, bookmarks: &[Bookmark]) -> Result<()> {
        if bookmarks.is_empty() {
            return Ok(());
        }

        let page_ids = self.get_page_ids();
        if let Some(bad) = bookmarks.iter().find(|b| b.page >= page_ids.len()) {
            return Err(PdfError::InvalidPage(bad.page, page_ids.len()));
        }

        let outlines_id = self.outline_root()?;
        let outlines = self.inner.get_dictionary(outlines_id)?;
        let mut first = outlines.get(b"First").and_then(Object::as_reference).ok();
        let mut last = outlines.get(b"Last").and_then(Object::as_reference).ok();
        let existing = outlines
            .get(b"Count")
            .and_then(Object::as_i64)
            .map(i64::abs)
            .unwrap_or(0);

        for bookmark in bookmarks {
            log::debug!(
                "Adding bookmark on page {}: {}",
                bookmark.page,
                bookmark.label
            );

            let item_id = self.inner.new_object_id();
            let mut item = dictionary! {
                "Title" => text_string(&bookmark.label),
                "Parent" => outlines_id,
                "Dest" => vec![
                    Object::Reference(page_ids[bookmark.page]),
                    Object::Name(b"Fit".to_vec()),
                ],
            };
            if let Some(prev_id) = last {
                item.set("Prev", prev_id);
                self.inner
                    .get_object_mut(prev_id)?
                    .as_dict_mut()?
                    .set("Next", item_id);
            }
            self.inner.objects.insert(item_id, Object::Dictionary(item));

            first.get_or_insert(item_id);
            last = Some(item_id);
        }

        let outlines = self.inner.get_object_mut(outlines_id)?.as_dict_mut()?;
        if let Some(first) = first {
            outlines.set("First", first);
        }
        if let Some(last) = last {
            outlines.set("Last", last);
        }
        outlines.set("Count", existing + bookmarks.len() as i64);

        Ok(())
    }

    /// Link already copied top-level items `first..=last` after the
    /// existing entries of the outline rooted at `outlines_id`
    pub(crate) fn attach_outline_items(
        &mut self,
        outlines_id: ObjectId,
        first: ObjectId,
        last: ObjectId,
        count: i64,
    ) -> Result<()> {
        for id in top_level_ids(&self.inner, first) {
            self.inner
                .get_object_mut(id)?
                .as_dict_mut()?
                .set("Parent", outlines_id);
        }

        let outlines = self.inner.get_dictionary(outlines_id)?;
        let previous = outlines.get(b"Last").and_then(Object::as_reference).ok();
        let existing = outlines
            .get(b"Count")
            .and_then(Object::as_i64)
            .map(i64::abs)
            .unwrap_or(0);

        if let Some(previous) = previous {
            self.inner
                .get_object_mut(previous)?
                .as_dict_mut()?
                .set("Next", first);
            self.inner
                .get_object_mut(first)?
                .as_dict_mut()?
                .set("Prev", previous);
        }

        let outlines = self.inner.get_object_mut(outlines_id)?.as_dict_mut()?;
        if previous.is_none() {
            outlines.set("First", first);
        }
        outlines.set("Last", last);
        outlines.set("Count", existing + count);

        Ok(())
    }

    /// The catalog's `Outlines` dictionary, created if missing
    pub(crate) fn outline_root(&mut self) -> Result<ObjectId> {
        let catalog_id = catalog_id(&self.inner)?;
        let existing = self.inner.get_dictionary(catalog_id)?.get(b"Outlines").ok().cloned();

        let outlines_id = match existing {
            Some(Object::Reference(id)) => return Ok(id),
            Some(Object::Dictionary(dict)) => self.inner.add_object(dict),
            _ => self.inner.add_object(dictionary! {
                "Type" => "Outlines",
                "Count" => 0,
            }),
        };

        self.inner
            .get_object_mut(catalog_id)?
            .as_dict_mut()?
            .set("Outlines", outlines_id);
        Ok(outlines_id)
    }
}

/// Encode a label as a PDF text string (UTF-16BE with BOM unless ASCII)
fn text_string(label: &str) -> Object {
    if label.is_ascii() {
        return Object::string_literal(label);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in label.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Return a copy of `pdf` with the given bookmarks added
///
/// # Arguments
/// * `pdf` - Source PDF bytes
/// * `bookmarks` - `(label, page)` entries, page 0-indexed
pub fn add_bookmarks(pdf: &[u8], bookmarks: &[Bookmark]) -> Result<Vec<u8>> {
    log::info!("Adding {} bookmarks to PDF", bookmarks.len());
    let mut doc = PdfDocument::open_from_bytes(pdf)?;
    doc.add_bookmarks(bookmarks)?;
    doc.to_bytes()
}
