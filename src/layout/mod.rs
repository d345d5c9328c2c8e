//! Layout Module - Key grid geometry.
//!
//! Uses [Taffy](https://github.com/DioxusLabs/taffy) flexbox to place key
//! caps, sized from their labels' display width.
//!
//! # Example
//!
//! ```ignore
//! use spark_vkeyboard::layout::{compute_grid_layout, GridMetrics};
//!
//! let layout = compute_grid_layout(keyboard.grid(), GridMetrics::new(true), 80)?;
//! if let Some(rect) = layout.key_at(12, 3) {
//!     println!("pressed {}", rect.key);
//! }
//! ```

mod grid;
mod text_measure;

pub use grid::*;
pub use text_measure::*;
