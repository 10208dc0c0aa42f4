//! Report page rendering
//!
//! Layout works in top-left millimetres; this module converts to PDF points
//! with the origin at the bottom-left.

use super::text::hex_string;
use super::xobject::create_jpeg_xobject;
use crate::constants::*;
use crate::document::{HeaderLogo, Page, PageFooter, PageHeader, PlacedPhoto};
use crate::layout::{PageGeometry, Rect, text_width_mm};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Regular and bold font resources shared by all pages
#[derive(Debug, Clone, Copy)]
pub struct FontIds {
    pub regular: ObjectId,
    pub bold: ObjectId,
}

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";
const LOGO_XOBJECT: &str = "Logo";

/// Add the two standard Helvetica fonts to `output`
pub fn create_fonts(output: &mut Document) -> FontIds {
    FontIds {
        regular: output.add_object(font_dict(b"Helvetica")),
        bold: output.add_object(font_dict(b"Helvetica-Bold")),
    }
}

fn font_dict(base_font: &[u8]) -> Dictionary {
    let mut font_dict = Dictionary::new();
    font_dict.set("Type", Object::Name(b"Font".to_vec()));
    font_dict.set("Subtype", Object::Name(b"Type1".to_vec()));
    font_dict.set("BaseFont", Object::Name(base_font.to_vec()));
    font_dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
    font_dict
}

// =============================================================================
// Coordinate Conversion
// =============================================================================

/// Converts top-left millimetres to PDF points
#[derive(Debug, Clone, Copy)]
struct PageSpace {
    height_mm: f32,
}

impl PageSpace {
    fn x(&self, x_mm: f32) -> f32 {
        mm_to_pt(x_mm)
    }

    fn y(&self, y_mm: f32) -> f32 {
        mm_to_pt(self.height_mm - y_mm)
    }

    /// Bottom-left corner and size of `rect` in points
    fn rect(&self, rect: &Rect) -> (f32, f32, f32, f32) {
        (
            self.x(rect.x),
            self.y(rect.bottom()),
            mm_to_pt(rect.width),
            mm_to_pt(rect.height),
        )
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Render one report page.
///
/// # Arguments
/// * `output` - The output document
/// * `page` - The laid out page
/// * `geometry` - Page size and bands
/// * `fonts` - Shared font resources
/// * `logo_id` - Shared logo XObject, drawn when the header has a logo
/// * `parent_pages_id` - The parent Pages object ID
pub fn render_report_page(
    output: &mut Document,
    page: &Page,
    geometry: &PageGeometry,
    fonts: FontIds,
    logo_id: Option<ObjectId>,
    parent_pages_id: ObjectId,
) -> ObjectId {
    let space = PageSpace {
        height_mm: geometry.page_height,
    };

    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(parent_pages_id));
    page_dict.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(mm_to_pt(geometry.page_width)),
            Object::Real(mm_to_pt(geometry.page_height)),
        ]),
    );

    let mut content_ops = Vec::new();
    let mut xobjects = Dictionary::new();

    let logo = match (&page.header.logo, logo_id) {
        (Some(logo), Some(id)) => {
            xobjects.set(LOGO_XOBJECT, Object::Reference(id));
            Some(logo)
        }
        _ => None,
    };
    content_ops.push(header_ops(&page.header, logo, &space));

    for (idx, photo) in page.photos.iter().enumerate() {
        let xobject_name = format!("Im{}", idx);
        let xobject_id = create_jpeg_xobject(output, &photo.image);
        xobjects.set(xobject_name.as_bytes(), Object::Reference(xobject_id));
        content_ops.push(photo_ops(photo, &xobject_name, geometry, &space));
    }

    content_ops.push(footer_ops(&page.footer, geometry, &space));

    let mut font_resources = Dictionary::new();
    font_resources.set(REGULAR_FONT, Object::Reference(fonts.regular));
    font_resources.set(BOLD_FONT, Object::Reference(fonts.bold));

    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(font_resources));
    if !xobjects.is_empty() {
        resources.set("XObject", Object::Dictionary(xobjects));
    }

    let content = content_ops.join("");
    let content_id = output.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", Object::Dictionary(resources));

    output.add_object(page_dict)
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Single line of text with its baseline at (`x_mm`, `baseline_mm`)
fn text_op(
    font: &str,
    size: f32,
    x_mm: f32,
    baseline_mm: f32,
    text: &str,
    space: &PageSpace,
) -> String {
    format!(
        "BT /{} {} Tf {} {} Td {} Tj ET\n",
        font,
        size,
        space.x(x_mm),
        space.y(baseline_mm),
        hex_string(text)
    )
}

fn header_ops(header: &PageHeader, logo: Option<&HeaderLogo>, space: &PageSpace) -> String {
    let band = &header.band;
    let baseline = band.y + HEADER_BASELINE_MM;
    let mut ops = String::new();

    let mut title_x = band.x;
    if let Some(logo) = logo {
        let (x, y, w, h) = space.rect(&logo.rect);
        ops.push_str(&format!(
            "q {} 0 0 {} {} {} cm /{} Do Q\n",
            w, h, x, y, LOGO_XOBJECT
        ));
        title_x = band.x + LOGO_WIDTH_MM + LOGO_TITLE_GAP_MM;
    }

    ops.push_str(&text_op(
        BOLD_FONT,
        TITLE_FONT_SIZE,
        title_x,
        baseline,
        &header.title,
        space,
    ));

    let label_x = band.right() - text_width_mm(&header.report_label, HEADER_FONT_SIZE);
    ops.push_str(&text_op(
        REGULAR_FONT,
        HEADER_FONT_SIZE,
        label_x,
        baseline,
        &header.report_label,
        space,
    ));

    if !header.date_label.is_empty() {
        let date_x = band.right() - text_width_mm(&header.date_label, HEADER_FONT_SIZE);
        ops.push_str(&text_op(
            REGULAR_FONT,
            HEADER_FONT_SIZE,
            date_x,
            baseline + pt_to_mm(HEADER_FONT_SIZE) * 1.3,
            &header.date_label,
            space,
        ));
    }

    let rule_y = space.y(band.bottom() - HEADER_RULE_OFFSET_MM);
    ops.push_str(&format!(
        "q {} G {} w {} {} m {} {} l S Q\n",
        HEADER_RULE_GRAY,
        HEADER_RULE_WIDTH,
        space.x(band.x),
        rule_y,
        space.x(band.right()),
        rule_y
    ));

    ops
}

fn photo_ops(
    photo: &PlacedPhoto,
    xobject_name: &str,
    geometry: &PageGeometry,
    space: &PageSpace,
) -> String {
    let layout = &photo.layout;
    let mut ops = String::new();

    let (x, y, w, h) = space.rect(&layout.placement.rect);
    ops.push_str(&format!(
        "q {} 0 0 {} {} {} cm /{} Do Q\n",
        w, h, x, y, xobject_name
    ));

    let (fx, fy, fw, fh) = space.rect(&layout.frame);
    ops.push_str(&format!(
        "q {} G {} w {} {} {} {} re S Q\n",
        FRAME_GRAY, FRAME_LINE_WIDTH, fx, fy, fw, fh
    ));

    for (line_idx, line) in layout.caption_lines.iter().enumerate() {
        let baseline =
            layout.caption_area.y + (line_idx as f32 + 0.75) * geometry.caption_line_height;
        ops.push_str(&text_op(
            REGULAR_FONT,
            geometry.caption_font_size,
            layout.caption_area.x,
            baseline,
            line,
            space,
        ));
    }

    ops
}

fn footer_ops(footer: &PageFooter, geometry: &PageGeometry, space: &PageSpace) -> String {
    let band = &footer.band;
    let baseline = band.y + band.height * 0.6;
    let mut ops = String::new();

    if !footer.note.is_empty() {
        let note_width = text_width_mm(&footer.note, FOOTER_FONT_SIZE);
        let note_x = geometry.page_width / 2.0 - note_width / 2.0;
        ops.push_str(&text_op(
            REGULAR_FONT,
            FOOTER_FONT_SIZE,
            note_x,
            baseline,
            &footer.note,
            space,
        ));
    }

    let label_x = band.right() - text_width_mm(&footer.page_label, FOOTER_FONT_SIZE);
    ops.push_str(&text_op(
        REGULAR_FONT,
        FOOTER_FONT_SIZE,
        label_x,
        baseline,
        &footer.page_label,
        space,
    ));

    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::CompressedImage;
    use crate::types::BudgetStatus;
    use std::sync::Arc;

    fn header(logo: Option<HeaderLogo>) -> PageHeader {
        PageHeader {
            band: Rect::new(15.0, 15.0, 180.0, 22.0),
            title: "Relatório de Fiscalização".to_string(),
            report_label: "Relatório nº 1".to_string(),
            date_label: String::new(),
            logo,
        }
    }

    #[test]
    fn test_page_space_flips_y() {
        let space = PageSpace { height_mm: 297.0 };
        assert!((space.y(0.0) - mm_to_pt(297.0)).abs() < 0.01);
        assert!(space.y(297.0).abs() < 0.01);

        let (x, y, w, h) = space.rect(&Rect::new(10.0, 20.0, 30.0, 40.0));
        assert!((x - mm_to_pt(10.0)).abs() < 0.01);
        assert!((y - mm_to_pt(297.0 - 60.0)).abs() < 0.01);
        assert!((w - mm_to_pt(30.0)).abs() < 0.01);
        assert!((h - mm_to_pt(40.0)).abs() < 0.01);
    }

    #[test]
    fn test_text_op_uses_hex() {
        let space = PageSpace { height_mm: 297.0 };
        let op = text_op(REGULAR_FONT, 9.0, 0.0, 297.0, "ok", &space);
        assert!(op.starts_with("BT /F1 9 Tf 0 0 Td <6F6B> Tj ET"));
    }

    #[test]
    fn test_logo_shifts_title() {
        let space = PageSpace { height_mm: 297.0 };
        let logo = HeaderLogo {
            rect: Rect::new(15.0, 14.0, 60.0, 14.0),
            image: Arc::new(CompressedImage {
                bytes: vec![0xFF, 0xD8],
                width: 600,
                height: 140,
                quality: 0.9,
                status: BudgetStatus::Met,
            }),
        };
        let header = header(Some(logo));

        let plain = header_ops(&header, None, &space);
        assert!(!plain.contains("/Logo Do"));
        assert!(plain.contains(&format!("Tf {} ", space.x(15.0))));

        let with_logo = header_ops(&header, header.logo.as_ref(), &space);
        assert!(with_logo.contains("/Logo Do"));
        assert!(with_logo.contains(&format!("Tf {} ", space.x(15.0 + 60.0 + 8.0))));
    }
}
