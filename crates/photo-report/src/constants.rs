//! Shared constants for report layout and compression
//!
//! Layout values are in millimetres unless stated otherwise. Font sizes are
//! in points, as PDF expects them.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4; // ≈ 2.83465

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Convert points to millimeters
#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / POINTS_PER_MM
}

// =============================================================================
// Page Geometry (A4 portrait)
// =============================================================================

pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

/// Outer margin on every side
pub const PAGE_MARGIN_MM: f32 = 15.0;

/// Header band below the top margin
pub const HEADER_BAND_MM: f32 = 22.0;

/// Footer band above the bottom margin
pub const FOOTER_BAND_MM: f32 = 12.0;

/// Vertical gap between photo slots
pub const SLOT_GAP_MM: f32 = 8.0;

/// Inset of the photo box inside its slot
pub const PHOTO_INSET_MM: f32 = 6.0;

/// Distance between the photo frame and the photo edge
pub const FRAME_OFFSET_MM: f32 = 1.5;

/// Distance between the bottom of a photo and its first caption line
pub const CAPTION_OFFSET_MM: f32 = 4.0;

/// Caption line height
pub const CAPTION_LINE_HEIGHT_MM: f32 = 5.0;

/// Caption lines reserved at most per photo
pub const MAX_CAPTION_LINES: usize = 3;

// =============================================================================
// Typography
// =============================================================================

pub const TITLE_FONT_SIZE: f32 = 13.0;
pub const HEADER_FONT_SIZE: f32 = 10.0;
pub const CAPTION_FONT_SIZE: f32 = 10.0;
pub const FOOTER_FONT_SIZE: f32 = 9.0;

/// Approximate character width ratio for Helvetica
pub const HELVETICA_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Baseline of the first header line, below the top margin
pub const HEADER_BASELINE_MM: f32 = 6.0;

/// Box the header logo is fitted into, at the left of the band
pub const LOGO_WIDTH_MM: f32 = 60.0;
pub const LOGO_HEIGHT_MM: f32 = 14.0;

/// The logo sits this far above the top of the header band
pub const LOGO_RAISE_MM: f32 = 1.0;

/// Space between the logo box and the title
pub const LOGO_TITLE_GAP_MM: f32 = 8.0;

/// Distance between the header separator and the bottom of the header band
pub const HEADER_RULE_OFFSET_MM: f32 = 3.0;

/// Line width of the header separator (points)
pub const HEADER_RULE_WIDTH: f32 = 0.7;

/// Line width of the photo frame (points)
pub const FRAME_LINE_WIDTH: f32 = 1.7;

/// Gray level of the header separator (0 = black, 1 = white)
pub const HEADER_RULE_GRAY: f32 = 0.78;

/// Gray level of the photo frame
pub const FRAME_GRAY: f32 = 0.59;

// =============================================================================
// Compression
// =============================================================================

/// Default byte budget per photo
pub const DEFAULT_MAX_BYTES: usize = 1_000_000;

/// Longer edge after the pre-scale clamp (pixels)
pub const MAX_DIMENSION_PX: u32 = 2000;

/// Resolution floor of the downscale fallback (pixels)
pub const MIN_DIMENSION_PX: u32 = 400;

pub const QUALITY_LOW: f32 = 0.3;
pub const QUALITY_HIGH: f32 = 0.95;
pub const QUALITY_START: f32 = 0.9;

/// Encode attempts made by the quality bisection
pub const BISECTION_ROUNDS: u32 = 8;

/// Per-step scale of the downscale fallback
pub const SHRINK_FACTOR: f32 = 0.9;

// =============================================================================
// Report Text
// =============================================================================

/// Report number shown when none was entered
pub const PLACEHOLDER_REPORT_ID: &str = "xxxx/7-xxxxxx-x";

pub const FILE_NAME_PREFIX: &str = "Relatorio_Fiscalizacao_";

/// File stem used when the report id is empty
pub const FALLBACK_FILE_STEM: &str = "relatorio";
