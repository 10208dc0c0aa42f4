//! Core types for report page layout

use crate::constants::*;
use crate::types::{PhotosPerPage, ReportError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// =============================================================================
// Geometric Primitives
// =============================================================================

/// A rectangle in page millimetres.
///
/// The origin is the top-left corner of the page and `y` grows downwards,
/// matching how the report is read. Renderers flip to PDF space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Shrink by `amount` on every side
    pub fn inset(&self, amount: f32) -> Rect {
        Rect::new(
            self.x + amount,
            self.y + amount,
            (self.width - 2.0 * amount).max(0.0),
            (self.height - 2.0 * amount).max(0.0),
        )
    }

    /// Whether `other` lies inside this rectangle, allowing `tolerance` of rounding
    pub fn contains(&self, other: &Rect, tolerance: f32) -> bool {
        other.x >= self.x - tolerance
            && other.y >= self.y - tolerance
            && other.right() <= self.right() + tolerance
            && other.bottom() <= self.bottom() + tolerance
    }
}

// =============================================================================
// Page Geometry
// =============================================================================

/// Fixed page format and the bands reserved on it.
///
/// All lengths in millimetres, font size in points.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub header_height: f32,
    pub footer_height: f32,
    /// Vertical gap between slots
    pub gap: f32,
    /// Inset of the photo box inside its slot
    pub photo_inset: f32,
    /// Distance of the frame drawn around each photo
    pub frame_offset: f32,
    pub caption_font_size: f32,
    pub caption_line_height: f32,
    /// Space between a photo and its caption
    pub caption_offset: f32,
    pub max_caption_lines: usize,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            page_width: A4_WIDTH_MM,
            page_height: A4_HEIGHT_MM,
            margin: PAGE_MARGIN_MM,
            header_height: HEADER_BAND_MM,
            footer_height: FOOTER_BAND_MM,
            gap: SLOT_GAP_MM,
            photo_inset: PHOTO_INSET_MM,
            frame_offset: FRAME_OFFSET_MM,
            caption_font_size: CAPTION_FONT_SIZE,
            caption_line_height: CAPTION_LINE_HEIGHT_MM,
            caption_offset: CAPTION_OFFSET_MM,
            max_caption_lines: MAX_CAPTION_LINES,
        }
    }
}

impl PageGeometry {
    pub fn usable_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    /// Height left for photo slots once margins and bands are taken
    pub fn usable_height(&self) -> f32 {
        self.page_height - 2.0 * self.margin - self.header_height - self.footer_height
    }

    /// Top edge of the first slot
    pub fn content_top(&self) -> f32 {
        self.margin + self.header_height
    }

    /// Vertical space kept below the photo box for `lines` caption lines
    pub fn caption_reserve(&self, lines: usize) -> f32 {
        self.caption_offset + lines.max(1) as f32 * self.caption_line_height
    }

    /// Check that every band and slot has positive size
    pub fn validate(&self, photos_per_page: PhotosPerPage) -> Result<()> {
        let values = [
            self.page_width,
            self.page_height,
            self.margin,
            self.header_height,
            self.footer_height,
            self.gap,
            self.photo_inset,
            self.frame_offset,
            self.caption_font_size,
            self.caption_line_height,
            self.caption_offset,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ReportError::Config(
                "Page geometry values must be finite and non-negative".to_string(),
            ));
        }
        if self.page_width <= 0.0 || self.page_height <= 0.0 {
            return Err(ReportError::Config(
                "Page size must be positive".to_string(),
            ));
        }
        if self.caption_font_size <= 0.0 || self.caption_line_height <= 0.0 {
            return Err(ReportError::Config(
                "Caption font size and line height must be positive".to_string(),
            ));
        }
        if self.max_caption_lines == 0 {
            return Err(ReportError::Config(
                "At least one caption line must be allowed".to_string(),
            ));
        }
        if self.usable_width() - 2.0 * self.photo_inset <= 0.0 {
            return Err(ReportError::Config(format!(
                "Margins and photo inset leave no width on a {} mm page",
                self.page_width
            )));
        }

        if self.frame_offset > self.photo_inset {
            return Err(ReportError::Config(format!(
                "Frame offset {} mm reaches past the {} mm photo inset",
                self.frame_offset, self.photo_inset
            )));
        }

        let slot = super::slot_height(self, photos_per_page);
        if slot <= 0.0 {
            return Err(ReportError::Config(format!(
                "Header, footer and gaps leave no room for {} photo(s) per page",
                photos_per_page.count()
            )));
        }

        let inner = slot - 2.0 * self.photo_inset;
        if self.caption_reserve(self.max_caption_lines) > inner / 2.0 {
            return Err(ReportError::Config(format!(
                "{} caption lines leave less than half of a {:.1} mm slot for the photo",
                self.max_caption_lines, slot
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Placement
// =============================================================================

/// Aspect-preserving position of a photo inside its box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Where the photo is drawn
    pub rect: Rect,
    /// Millimetres per source pixel
    pub scale: f32,
}

/// Everything computed for one occupied slot
#[derive(Debug, Clone, PartialEq)]
pub struct SlotLayout {
    /// Slot index on the page (0 = top)
    pub index: usize,
    /// Full slot bounds
    pub slot: Rect,
    /// Area the photo is fitted into (slot minus inset and caption reserve)
    pub image_box: Rect,
    pub placement: Placement,
    /// Frame drawn around the photo
    pub frame: Rect,
    /// Wrapped caption, possibly empty
    pub caption_lines: Vec<String>,
    /// Area the caption lines are written into, directly below the photo
    pub caption_area: Rect,
}
