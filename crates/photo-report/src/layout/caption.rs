//! Caption word wrapping
//!
//! Widths are estimated from an average Helvetica glyph width; the same
//! estimate is used when text is right-aligned or centered by the renderer.

use crate::constants::{HELVETICA_CHAR_WIDTH_RATIO, pt_to_mm};

const ELLIPSIS: char = '…';

/// Estimated width in millimetres of `text` at `font_size` points
pub fn text_width_mm(text: &str, font_size: f32) -> f32 {
    pt_to_mm(text.chars().count() as f32 * font_size * HELVETICA_CHAR_WIDTH_RATIO)
}

/// Characters that fit on one line of `max_width_mm`
fn chars_per_line(max_width_mm: f32, font_size: f32) -> usize {
    let char_width = text_width_mm("m", font_size);
    if char_width <= 0.0 {
        return 1;
    }
    ((max_width_mm / char_width).floor() as usize).max(1)
}

/// Greedy word wrap of `text` into at most `max_lines` lines.
///
/// Whitespace runs collapse to single spaces. Words longer than a line are
/// broken. When the text does not fit, the last kept line ends in an ellipsis.
pub fn wrap_caption(text: &str, max_width_mm: f32, font_size: f32, max_lines: usize) -> Vec<String> {
    if max_lines == 0 {
        return Vec::new();
    }
    let limit = chars_per_line(max_width_mm, font_size);

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        // Break words that cannot fit on any line
        while word.len() > limit {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(limit);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        if word.is_empty() {
            continue;
        }
        let needed = if current_len == 0 {
            word.len()
        } else {
            current_len + 1 + word.len()
        };
        if needed > limit {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }
    if current_len > 0 {
        lines.push(current);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            let mut chars: Vec<char> = last.chars().collect();
            while chars.len() + 1 > limit {
                chars.pop();
            }
            while chars.last().is_some_and(|c| c.is_whitespace()) {
                chars.pop();
            }
            chars.push(ELLIPSIS);
            *last = chars.into_iter().collect();
        }
    }

    lines
}
