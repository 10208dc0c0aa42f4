//! Layout calculations for report pages
//!
//! This module computes where each photo goes on a page:
//! - Header and footer bands
//! - Photo slots (one or two per page)
//! - Aspect-preserving fit of each photo into its slot
//! - Caption wrapping and the space it reserves

mod caption;
mod placement;
mod slots;
mod types;

pub use caption::{text_width_mm, wrap_caption};
pub use placement::{calculate_fit_scale, fit_photo};
pub use slots::{
    content_area, create_slots, footer_band, header_band, image_box, logo_box, slot_bounds,
    slot_height,
};
pub use types::{PageGeometry, Placement, Rect, SlotLayout};

use crate::types::PhotosPerPage;

/// Input for one slot: photo dimensions and its caption
#[derive(Debug, Clone, Copy)]
pub struct SlotContent<'a> {
    pub width_px: u32,
    pub height_px: u32,
    pub caption: &'a str,
}

/// Number of pages needed for `item_count` photos
pub fn page_count(item_count: usize, photos_per_page: PhotosPerPage) -> usize {
    item_count.div_ceil(photos_per_page.count())
}

/// Lay out one slot.
pub fn layout_slot(
    geometry: &PageGeometry,
    photos_per_page: PhotosPerPage,
    index: usize,
    content: &SlotContent<'_>,
) -> SlotLayout {
    let slot = slot_bounds(geometry, photos_per_page, index);
    let inner = slot.inset(geometry.photo_inset);

    let caption_lines = wrap_caption(
        content.caption.trim(),
        inner.width,
        geometry.caption_font_size,
        geometry.max_caption_lines,
    );

    let image_box = image_box(&slot, geometry, caption_lines.len());
    let placement = fit_photo(&image_box, content.width_px, content.height_px);

    let frame = placement.rect.inset(-geometry.frame_offset);
    let caption_area = Rect::new(
        inner.x,
        placement.rect.bottom() + geometry.caption_offset,
        inner.width,
        caption_lines.len() as f32 * geometry.caption_line_height,
    );

    SlotLayout {
        index,
        slot,
        image_box,
        placement,
        frame,
        caption_lines,
        caption_area,
    }
}

/// Lay out the photos of one page, top slot first.
///
/// Photos beyond `photos_per_page` are ignored; missing photos leave their
/// slots empty.
pub fn layout_page(
    geometry: &PageGeometry,
    photos_per_page: PhotosPerPage,
    contents: &[SlotContent<'_>],
) -> Vec<SlotLayout> {
    contents
        .iter()
        .take(photos_per_page.count())
        .enumerate()
        .map(|(index, content)| layout_slot(geometry, photos_per_page, index, content))
        .collect()
}
