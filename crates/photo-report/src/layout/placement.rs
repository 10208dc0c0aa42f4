//! Aspect-preserving fit of a photo into its box

use super::types::{Placement, Rect};

/// Scale that fits `content` inside `bounds` without distortion
pub fn calculate_fit_scale(content_w: f32, content_h: f32, bounds_w: f32, bounds_h: f32) -> f32 {
    if content_w <= 0.0 || content_h <= 0.0 {
        return 0.0;
    }
    (bounds_w / content_w).min(bounds_h / content_h).max(0.0)
}

/// Fit a `width_px` × `height_px` photo into `bounds`, centered on both axes.
///
/// # Arguments
/// * `bounds` - The box the photo must stay inside
/// * `width_px` - Photo width in pixels
/// * `height_px` - Photo height in pixels
pub fn fit_photo(bounds: &Rect, width_px: u32, height_px: u32) -> Placement {
    let scale = calculate_fit_scale(
        width_px as f32,
        height_px as f32,
        bounds.width,
        bounds.height,
    );
    let width = width_px as f32 * scale;
    let height = height_px as f32 * scale;

    Placement {
        rect: Rect::new(
            bounds.x + (bounds.width - width) / 2.0,
            bounds.y + (bounds.height - height) / 2.0,
            width,
            height,
        ),
        scale,
    }
}
