//! Layout Table - Key arrangements and shift transformation.
//!
//! Pure lookups, no state:
//! - [`layout`] returns the rows of keys for a layout name
//! - [`transform_for_shift`] maps a key to its label and inserted text
//!
//! Tables are rebuilt on every call; callers own the returned rows.

use crate::types::{Key, LayoutName, ShiftTransform};

/// Rows of keys, top to bottom.
pub type Layout = Vec<Vec<Key>>;

const ALPHA_ROWS: [&[&str]; 5] = [
    &["1", "2", "3", "4", "5", "6", "7", "8", "9", "0", "backspace"],
    &["q", "w", "e", "r", "t", "y", "u", "i", "o", "p"],
    &["?", "a", "s", "d", "f", "g", "h", "j", "k", "l", "ñ", "/"],
    &["shift", "z", "x", "c", "v", "b", "n", "m", ",", ".", "-"],
    &["left", "space", "enter", "right"],
];

const EMAIL_EXTRAS: [&str; 2] = ["@", "_"];
const EMAIL_EXTRAS_ROW: usize = 2;

const NUMPAD_ROWS: [&[&str]; 4] = [
    &["7", "8", "9", "backspace"],
    &["4", "5", "6", "sign"],
    &["1", "2", "3", "decimal"],
    &["left", "0", "right", "enter"],
];

fn build_rows(rows: &[&[&str]]) -> Layout {
    rows.iter()
        .map(|row| row.iter().filter_map(|t| Key::parse(t)).collect())
        .collect()
}

/// Get the key rows for a layout.
pub fn layout(name: LayoutName) -> Layout {
    match name {
        LayoutName::Alpha => build_rows(&ALPHA_ROWS),
        LayoutName::AlphaEmail => {
            let mut rows = build_rows(&ALPHA_ROWS);
            rows[EMAIL_EXTRAS_ROW].extend(EMAIL_EXTRAS.iter().filter_map(|t| Key::parse(t)));
            rows
        }
        LayoutName::Numeric => build_rows(&NUMPAD_ROWS),
    }
}

/// Shifted symbol for a digit (`1` -> `!`, ..., `0` -> `)`).
/// Non-digits are returned unchanged.
pub fn shifted_digit(d: char) -> char {
    match d {
        '1' => '!',
        '2' => '@',
        '3' => '#',
        '4' => '$',
        '5' => '%',
        '6' => '^',
        '7' => '&',
        '8' => '*',
        '9' => '(',
        '0' => ')',
        other => other,
    }
}

fn shifted_punctuation(c: char) -> Option<char> {
    Some(match c {
        ',' => ';',
        '.' => ':',
        '-' => '_',
        '?' => '=',
        '/' => '+',
        '@' => '~',
        '_' => '+',
        _ => return None,
    })
}

/// Label and inserted text for `key` under `layout_name` and `shift`.
///
/// The numeric layout ignores shift. Control keys always map to their token;
/// the controller handles them instead of inserting the text.
pub fn transform_for_shift(key: Key, layout_name: LayoutName, shift: bool) -> ShiftTransform {
    let Key::Char(c) = key else {
        return ShiftTransform::same(key.token());
    };
    if layout_name.is_numeric() {
        return ShiftTransform::same(c);
    }

    let mapped = if shift {
        if c.is_ascii_lowercase() {
            c.to_ascii_uppercase()
        } else if c.is_ascii_digit() {
            shifted_digit(c)
        } else {
            shifted_punctuation(c).unwrap_or(c)
        }
    } else if c.is_ascii_uppercase() {
        c.to_ascii_lowercase()
    } else {
        c
    };
    ShiftTransform::same(mapped)
}

// =============================================================================
// TESTS
// =============================================================================
