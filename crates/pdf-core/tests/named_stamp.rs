//! Stamping with the language-keyed assets from `pdfs/`
//!
//! Kept in its own test binary: it changes the process working directory.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pdf_core::{stamp_with_named_asset, PdfDocument, PdfError, StampLanguage, StampLayer, STAMP_DIR};
use pretty_assertions::assert_eq;
use std::fs;

fn one_page_pdf(text: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let contents_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        "Resources" => dictionary! {},
        "Contents" => contents_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

#[test]
fn test_stamp_with_named_asset_from_working_directory() {
    let workdir = tempfile::tempdir().unwrap();
    let assets = workdir.path().join(STAMP_DIR);
    fs::create_dir(&assets).unwrap();
    fs::write(
        assets.join(StampLanguage::German.file_name()),
        one_page_pdf("KOPIE"),
    )
    .unwrap();
    std::env::set_current_dir(workdir.path()).unwrap();

    let letter = one_page_pdf("Brief");
    let stamped = stamp_with_named_asset(&letter, "de", StampLayer::Underlay).unwrap();
    let doc = PdfDocument::open_from_bytes(&stamped).unwrap();
    assert_eq!(doc.page_count(), 1);
    let form_count = doc
        .inner()
        .objects
        .values()
        .filter_map(|obj| obj.as_stream().ok())
        .filter(|stream| {
            stream.dict.get(b"Subtype").and_then(Object::as_name_str).ok() == Some("Form")
        })
        .count();
    assert_eq!(form_count, 1);

    // only the German asset exists
    let missing = stamp_with_named_asset(&letter, "en", StampLayer::Underlay);
    assert!(matches!(missing, Err(PdfError::IoError(_))));
}
