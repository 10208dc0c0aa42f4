//! PDF rendering of assembled reports
//!
//! This module turns a [`Document`](crate::Document) into PDF bytes:
//! - Embedding compressed photos and the header logo as JPEG XObjects
//! - Drawing header, frames, captions and footer
//! - Building the page tree and catalog

mod page;
mod text;
mod xobject;

pub use page::{FontIds, create_fonts, render_report_page};
pub use text::{encode_win_ansi, hex_string};
pub use xobject::create_jpeg_xobject;

use crate::document::Document as ReportDocument;
use crate::types::*;
use lopdf::{Dictionary, Document, Object};

/// Consumes an assembled report and produces the output file bytes
pub trait DocumentRenderer: Send + Sync + 'static {
    /// Fail early when the renderer cannot produce output.
    ///
    /// Assembly calls this before compressing anything.
    fn check_available(&self) -> Result<()>;

    fn render(&self, document: &ReportDocument) -> Result<Vec<u8>>;
}

/// Renders reports to PDF with `lopdf`
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    /// Document title stored in the PDF metadata
    pub title: Option<String>,
}

impl PdfRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the PDF object graph for `document`
    pub fn build(&self, document: &ReportDocument) -> Result<Document> {
        if document.pages.is_empty() {
            return Err(ReportError::EmptyReport);
        }

        let mut output = Document::with_version("1.7");
        let pages_tree_id = output.new_object_id();
        let fonts = create_fonts(&mut output);
        let logo_id = document
            .pages
            .iter()
            .find_map(|page| page.header.logo.as_ref())
            .map(|logo| create_jpeg_xobject(&mut output, &logo.image));

        let page_refs: Vec<Object> = document
            .pages
            .iter()
            .map(|page| {
                let page_id = render_report_page(
                    &mut output,
                    page,
                    &document.geometry,
                    fonts,
                    logo_id,
                    pages_tree_id,
                );
                Object::Reference(page_id)
            })
            .collect();

        // Create pages tree
        let count = page_refs.len() as i64;
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(page_refs)),
            ("Count", Object::Integer(count)),
        ]);
        output
            .objects
            .insert(pages_tree_id, Object::Dictionary(pages_dict));

        // Create catalog
        let catalog_id = output.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_tree_id)),
        ]));
        output.trailer.set("Root", catalog_id);

        let title = self.title.clone().unwrap_or_else(|| {
            document
                .pages
                .first()
                .map(|page| format!("{} - {}", page.header.title, page.header.report_label))
                .unwrap_or_default()
        });
        let info_id = output.add_object(Dictionary::from_iter(vec![
            ("Title", Object::string_literal(encode_win_ansi(&title))),
            ("Producer", Object::string_literal("photo-report")),
        ]));
        output.trailer.set("Info", info_id);

        Ok(output)
    }
}

impl DocumentRenderer for PdfRenderer {
    fn check_available(&self) -> Result<()> {
        Ok(())
    }

    fn render(&self, document: &ReportDocument) -> Result<Vec<u8>> {
        let mut output = self.build(document)?;
        let mut writer = Vec::new();
        output.save_to(&mut writer)?;
        Ok(writer)
    }
}
