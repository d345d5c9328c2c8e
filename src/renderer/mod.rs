//! Renderer - Terminal output for the key grid.
//!
//! - ANSI: Paint a [`GridLayout`](crate::layout::GridLayout) with crossterm

mod ansi;

pub use ansi::*;
