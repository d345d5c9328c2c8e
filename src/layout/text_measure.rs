//! Text Measurement
//!
//! Display width of key labels in terminal cells, via `unicode-width`.
//! Control characters count as zero cells.

use unicode_width::UnicodeWidthChar;

fn char_width(c: char) -> u16 {
    c.width().unwrap_or(0) as u16
}

/// Measure the display width of a string in terminal cells.
pub fn string_width(s: &str) -> u16 {
    s.chars().fold(0u16, |w, c| w.saturating_add(char_width(c)))
}

/// Fit `text` into `width` cells, replacing the tail with `…` when it
/// does not fit.
pub fn truncate_text(text: &str, width: u16) -> String {
    if width == 0 {
        return String::new();
    }
    if string_width(text) <= width {
        return text.to_string();
    }

    let target = width.saturating_sub(1);
    let mut result = String::new();
    let mut current = 0u16;
    for c in text.chars() {
        let w = char_width(c);
        if current + w > target {
            break;
        }
        result.push(c);
        current += w;
    }
    result.push('…');
    result
}
