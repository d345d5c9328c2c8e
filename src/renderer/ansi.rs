//! ANSI painter for a laid-out key grid.
//!
//! Commands are queued with crossterm into any writer; the caller decides
//! when to flush. Each key cap is a filled block with its label centered
//! on the middle line.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Attribute, Color, PrintStyledContent, ResetColor, Stylize};

use crate::layout::{truncate_text, GridLayout, KeyRect};
use crate::types::Key;

/// Colors for key caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPalette {
    pub fg: Color,
    pub bg: Color,
    pub control_bg: Color,
    /// Background of the shift key while shift is active.
    pub shift_bg: Color,
}

impl Default for KeyPalette {
    fn default() -> Self {
        Self {
            fg: Color::White,
            bg: Color::DarkGrey,
            control_bg: Color::Grey,
            shift_bg: Color::Blue,
        }
    }
}

fn cap_line(rect: &KeyRect, line: u16) -> String {
    let width = rect.width as usize;
    if line != rect.height / 2 {
        return " ".repeat(width);
    }
    let label = truncate_text(&rect.label, rect.width);
    let label_width = crate::layout::string_width(&label) as usize;
    let left = (width.saturating_sub(label_width)) / 2;
    let right = width.saturating_sub(label_width + left);
    format!("{}{}{}", " ".repeat(left), label, " ".repeat(right))
}

/// Queue the commands drawing `layout` with its top-left corner at
/// `origin`.
pub fn render_grid<W: Write>(
    out: &mut W,
    layout: &GridLayout,
    origin: (u16, u16),
    palette: &KeyPalette,
) -> io::Result<()> {
    for rect in &layout.keys {
        let highlighted = layout.shift && rect.key == Key::Shift;
        let bg = if highlighted {
            palette.shift_bg
        } else if rect.key.is_control() {
            palette.control_bg
        } else {
            palette.bg
        };

        for line in 0..rect.height {
            let mut content = cap_line(rect, line).with(palette.fg).on(bg);
            if highlighted {
                content = content.attribute(Attribute::Bold);
            }
            queue!(
                out,
                MoveTo(origin.0 + rect.x, origin.1 + rect.y + line),
                PrintStyledContent(content)
            )?;
        }
    }
    queue!(out, ResetColor)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(key: Key, label: &str, x: u16, height: u16) -> KeyRect {
        KeyRect { key, label: label.into(), x, y: 0, width: 7, height }
    }

    fn render(layout: &GridLayout) -> String {
        let mut out = Vec::new();
        render_grid(&mut out, layout, (0, 0), &KeyPalette::default()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_cap_line_centers_label() {
        let r = rect(Key::Char('q'), "q", 0, 3);
        assert_eq!(cap_line(&r, 0), "       ");
        assert_eq!(cap_line(&r, 1), "   q   ");

        let r = rect(Key::Space, "Espacio", 0, 1);
        assert_eq!(cap_line(&r, 0), "Espacio");
    }

    #[test]
    fn test_render_contains_labels() {
        let layout = GridLayout {
            keys: vec![rect(Key::Char('a'), "a", 0, 1), rect(Key::Enter, "Enter", 8, 1)],
            rows: 1,
            width: 15,
            height: 1,
            shift: false,
        };
        let output = render(&layout);
        assert!(output.contains("   a   "));
        assert!(output.contains(" Enter "));
    }

    #[test]
    fn test_shift_highlight() {
        let mut layout = GridLayout {
            keys: vec![rect(Key::Shift, "Shift", 0, 1)],
            rows: 1,
            width: 7,
            height: 1,
            shift: false,
        };
        let plain = render(&layout);
        layout.shift = true;
        let active = render(&layout);
        assert_ne!(plain, active);
        assert!(active.contains(" Shift "));
    }
}
