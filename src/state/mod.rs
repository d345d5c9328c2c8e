//! State Module - Field editing and the keyboard controller.
//!
//! - **Field** - Classify editable elements, apply edits at the selection
//! - **Keyboard** - Focus tracking, layout choice, key dispatch, visibility

pub mod field;
mod keyboard;

pub use field::{FieldEditState, FieldKind};
pub use keyboard::*;
