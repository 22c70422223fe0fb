//! Stamping a single-page PDF onto every page of a document

use crate::copy::ObjectCopier;
use crate::document::{flattened_page, resolve, PdfDocument};
use crate::{PdfError, Result};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Directory holding the language-keyed stamp assets, relative to the
/// working directory
///
/// The assets are not bundled with this crate. The application deploying it
/// provides `pdfs/Kopie-Stempel.pdf` and `pdfs/Copy-Stempel.pdf` next to
/// where the process runs.
pub const STAMP_DIR: &str = "pdfs";

/// Where the stamp is drawn relative to the existing page content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StampLayer {
    /// Stamp first, page content on top of it
    #[default]
    Underlay,
    /// Page content first, stamp on top of it
    Overlay,
}

impl StampLayer {
    pub fn from_overlay(overlay: bool) -> Self {
        if overlay {
            Self::Overlay
        } else {
            Self::Underlay
        }
    }
}

/// Language of the bundled "copy" stamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampLanguage {
    German,
    English,
}

impl StampLanguage {
    /// File name of the stamp asset inside [`STAMP_DIR`]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::German => "Kopie-Stempel.pdf",
            Self::English => "Copy-Stempel.pdf",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::German => "de",
            Self::English => "en",
        }
    }
}

impl FromStr for StampLanguage {
    type Err = PdfError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "de" => Ok(Self::German),
            "en" => Ok(Self::English),
            other => Err(PdfError::InvalidLanguage(other.to_string())),
        }
    }
}

impl PdfDocument {
    /// Draw page 0 of `stamp` on every page of this document
    ///
    /// The stamp page is embedded once as a Form XObject and invoked from
    /// an extra content stream on each page. The original content is
    /// wrapped in `q`/`Q` so its graphics state cannot leak into the stamp.
    pub fn stamp(&mut self, stamp: &PdfDocument, layer: StampLayer) -> Result<()> {
        let form_id = self.embed_stamp_form(stamp)?;

        for page_id in self.get_page_ids() {
            self.stamp_page(page_id, form_id, layer)?;
        }

        Ok(())
    }

    /// Copy the first page of `stamp` into this document as a Form XObject
    fn embed_stamp_form(&mut self, stamp: &PdfDocument) -> Result<ObjectId> {
        let source = &stamp.inner;
        let stamp_page_id = source
            .get_pages()
            .values()
            .next()
            .copied()
            .ok_or(PdfError::InvalidPage(0, 0))?;

        let page = flattened_page(source, stamp_page_id)?;
        let bbox = page
            .get(b"MediaBox")
            .map_err(|_| PdfError::ParseError("Stamp page has no MediaBox".to_string()))
            .and_then(|obj| resolve(source, obj))?
            .clone();
        let content = page_content(source, stamp_page_id);

        let mut copier = ObjectCopier::new(source, &mut self.inner);
        let bbox = copier.remap(bbox)?;
        let resources = match page.get(b"Resources") {
            Ok(obj) => copier.remap(obj.clone())?,
            Err(_) => Object::Dictionary(Dictionary::new()),
        };

        let form = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "FormType" => 1,
                "BBox" => bbox,
                "Resources" => resources,
            },
            content,
        );
        Ok(self.inner.add_object(form))
    }

    fn stamp_page(&mut self, page_id: ObjectId, form_id: ObjectId, layer: StampLayer) -> Result<()> {
        let page = flattened_page(&self.inner, page_id)?;

        let mut resources = match page.get(b"Resources") {
            Ok(obj) => resolve(&self.inner, obj)?.as_dict()?.clone(),
            Err(_) => Dictionary::new(),
        };
        let mut xobjects = match resources.get(b"XObject") {
            Ok(obj) => resolve(&self.inner, obj)?.as_dict()?.clone(),
            Err(_) => Dictionary::new(),
        };

        let name = unused_name(&xobjects);
        xobjects.set(name.clone(), form_id);
        resources.set("XObject", xobjects);

        let original = match page.get(b"Contents") {
            Ok(Object::Reference(id)) => match self.inner.get_object(*id)? {
                Object::Array(items) => items.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Ok(Object::Array(items)) => items.clone(),
            Ok(other) => vec![other.clone()],
            Err(_) => Vec::new(),
        };

        let draw = self.add_content(format!("q /{} Do Q\n", name).into_bytes());
        let contents = if original.is_empty() {
            vec![draw]
        } else {
            let save = self.add_content(b"q\n".to_vec());
            let restore = self.add_content(b"Q\n".to_vec());
            let mut contents = Vec::with_capacity(original.len() + 3);
            if layer == StampLayer::Underlay {
                contents.push(draw.clone());
            }
            contents.push(save);
            contents.extend(original);
            contents.push(restore);
            if layer == StampLayer::Overlay {
                contents.push(draw);
            }
            contents
        };

        let page_dict = self
            .inner
            .get_object_mut(page_id)?
            .as_dict_mut()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?;
        page_dict.set("Resources", resources);
        page_dict.set("Contents", Object::Array(contents));

        Ok(())
    }

    fn add_content(&mut self, operators: Vec<u8>) -> Object {
        Object::Reference(self.inner.add_object(Stream::new(dictionary! {}, operators)))
    }
}

/// Decoded content of a page with its streams joined by newlines
///
/// A stream may end without trailing whitespace, and `Q` followed by `q`
/// must not turn into `Qq`.
fn page_content(doc: &Document, page_id: ObjectId) -> Vec<u8> {
    let mut content = Vec::new();
    for stream_id in doc.get_page_contents(page_id) {
        let Ok(stream) = doc.get_object(stream_id).and_then(Object::as_stream) else {
            continue;
        };
        if !content.is_empty() {
            content.push(b'\n');
        }
        match stream.decompressed_content() {
            Ok(data) => content.extend_from_slice(&data),
            Err(_) => content.extend_from_slice(&stream.content),
        }
    }
    content
}

/// First `StampN` name not already used in an XObject dictionary
fn unused_name(xobjects: &Dictionary) -> String {
    let mut index = 0;
    loop {
        let name = format!("Stamp{}", index);
        if !xobjects.has(name.as_bytes()) {
            return name;
        }
        index += 1;
    }
}

/// Return a copy of `pdf` with page 0 of `stamp_pdf` drawn on every page
///
/// # Arguments
/// * `pdf` - PDF to stamp
/// * `stamp_pdf` - Single-page stamp PDF (further pages are ignored)
/// * `layer` - Draw the stamp under or over the existing content
pub fn stamp(pdf: &[u8], stamp_pdf: &[u8], layer: StampLayer) -> Result<Vec<u8>> {
    let mut doc = PdfDocument::open_from_bytes(pdf)?;
    let stamp = PdfDocument::open_from_bytes(stamp_pdf)?;
    doc.stamp(&stamp, layer)?;
    doc.to_bytes()
}

/// Stamp `pdf` with the bundled "copy" stamp for `language` (`de` or `en`)
///
/// The asset is read from [`STAMP_DIR`] on every call.
pub fn stamp_with_named_asset(pdf: &[u8], language: &str, layer: StampLayer) -> Result<Vec<u8>> {
    stamp_with_asset_in(Path::new(STAMP_DIR), pdf, language, layer)
}

fn stamp_with_asset_in(
    dir: &Path,
    pdf: &[u8],
    language: &str,
    layer: StampLayer,
) -> Result<Vec<u8>> {
    let language: StampLanguage = language.parse()?;
    let path = dir.join(language.file_name());
    log::info!(
        "Adding {} copy stamp from {}",
        language.code(),
        path.display()
    );

    let stamp_bytes = fs::read(&path)?;
    stamp(pdf, &stamp_bytes, layer)
}
