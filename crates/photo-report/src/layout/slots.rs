//! Page bands and photo slots

use super::placement::calculate_fit_scale;
use super::types::{PageGeometry, Rect};
use crate::constants::{LOGO_HEIGHT_MM, LOGO_RAISE_MM, LOGO_WIDTH_MM};
use crate::types::PhotosPerPage;

/// Header band, directly below the top margin
pub fn header_band(geometry: &PageGeometry) -> Rect {
    Rect::new(
        geometry.margin,
        geometry.margin,
        geometry.usable_width(),
        geometry.header_height,
    )
}

/// Where a `width_px` × `height_px` logo is drawn: fitted into the logo box
/// at the top left of the header band
pub fn logo_box(geometry: &PageGeometry, width_px: u32, height_px: u32) -> Rect {
    let band = header_band(geometry);
    let scale = calculate_fit_scale(
        width_px as f32,
        height_px as f32,
        LOGO_WIDTH_MM,
        LOGO_HEIGHT_MM,
    );
    Rect::new(
        band.x,
        band.y - LOGO_RAISE_MM,
        width_px as f32 * scale,
        height_px as f32 * scale,
    )
}

/// Footer band, directly above the bottom margin
pub fn footer_band(geometry: &PageGeometry) -> Rect {
    Rect::new(
        geometry.margin,
        geometry.page_height - geometry.margin - geometry.footer_height,
        geometry.usable_width(),
        geometry.footer_height,
    )
}

/// Area between the header and footer bands
pub fn content_area(geometry: &PageGeometry) -> Rect {
    Rect::new(
        geometry.margin,
        geometry.content_top(),
        geometry.usable_width(),
        geometry.usable_height(),
    )
}

/// Height of one slot.
///
/// Two photos per page split the usable height around one gap; a single
/// photo takes all of it.
pub fn slot_height(geometry: &PageGeometry, photos_per_page: PhotosPerPage) -> f32 {
    let count = photos_per_page.count() as f32;
    (geometry.usable_height() - (count - 1.0) * geometry.gap) / count
}

/// Bounds of slot `index` (0 = top), spanning the usable width
pub fn slot_bounds(geometry: &PageGeometry, photos_per_page: PhotosPerPage, index: usize) -> Rect {
    let height = slot_height(geometry, photos_per_page);
    Rect::new(
        geometry.margin,
        geometry.content_top() + index as f32 * (height + geometry.gap),
        geometry.usable_width(),
        height,
    )
}

/// All slots of a page, top to bottom
pub fn create_slots(geometry: &PageGeometry, photos_per_page: PhotosPerPage) -> Vec<Rect> {
    (0..photos_per_page.count())
        .map(|index| slot_bounds(geometry, photos_per_page, index))
        .collect()
}

/// Area a photo is fitted into once `caption_lines` lines are reserved below it
pub fn image_box(slot: &Rect, geometry: &PageGeometry, caption_lines: usize) -> Rect {
    let inner = slot.inset(geometry.photo_inset);
    let reserve = geometry.caption_reserve(caption_lines);
    Rect::new(
        inner.x,
        inner.y,
        inner.width,
        (inner.height - reserve).max(0.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_bands() {
        let g = PageGeometry::default();
        let header = header_band(&g);
        assert_eq!(header.y, 15.0);
        assert_eq!(header.height, 22.0);
        assert_eq!(header.width, 180.0);

        let footer = footer_band(&g);
        assert!((footer.y - 270.0).abs() < 0.01);
        assert!((footer.bottom() - 282.0).abs() < 0.01);

        let content = content_area(&g);
        assert!((content.y - 37.0).abs() < 0.01);
        assert!((content.bottom() - footer.y).abs() < 0.01);
    }

    #[test]
    fn test_logo_box_keeps_aspect() {
        let g = PageGeometry::default();
        // 600x140 matches the 60x14 box exactly
        let exact = logo_box(&g, 600, 140);
        assert!((exact.x - 15.0).abs() < 0.01);
        assert!((exact.y - 14.0).abs() < 0.01);
        assert!((exact.width - 60.0).abs() < 0.01);
        assert!((exact.height - 14.0).abs() < 0.01);

        // A square logo is limited by the box height
        let square = logo_box(&g, 200, 200);
        assert!((square.width - 14.0).abs() < 0.01);
        assert!((square.height - 14.0).abs() < 0.01);
        assert_eq!(square.x, exact.x);
    }

    #[test]
    fn test_two_slots_split_usable_height() {
        let g = PageGeometry::default();
        // 297 - 30 - 22 - 12 = 233; (233 - 8) / 2 = 112.5
        assert!((slot_height(&g, PhotosPerPage::Two) - 112.5).abs() < 0.01);
        assert!((slot_height(&g, PhotosPerPage::One) - 233.0).abs() < 0.01);

        let slots = create_slots(&g, PhotosPerPage::Two);
        assert_eq!(slots.len(), 2);
        assert!((slots[0].y - 37.0).abs() < 0.01);
        assert!((slots[1].y - (37.0 + 112.5 + 8.0)).abs() < 0.01);
        assert!((slots[1].bottom() - footer_band(&g).y).abs() < 0.01);
    }

    #[test]
    fn test_slots_stay_inside_content() {
        let g = PageGeometry::default();
        let content = content_area(&g);
        for ppp in [PhotosPerPage::One, PhotosPerPage::Two] {
            for slot in create_slots(&g, ppp) {
                assert!(content.contains(&slot, 0.01));
            }
        }
    }

    #[test]
    fn test_image_box_reserves_caption() {
        let g = PageGeometry::default();
        let slot = slot_bounds(&g, PhotosPerPage::Two, 0);
        let one = image_box(&slot, &g, 1);
        let three = image_box(&slot, &g, 3);
        assert!((one.width - 168.0).abs() < 0.01);
        // 112.5 - 12 - (4 + 5)
        assert!((one.height - 91.5).abs() < 0.01);
        assert!((one.height - three.height - 10.0).abs() < 0.01);
        // Empty captions still reserve one line
        assert_eq!(image_box(&slot, &g, 0), one);
    }
}
