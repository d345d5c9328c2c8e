//! Engine - The host page model.
//!
//! - Document: Element arena, focus, selection, notifications
//! - Tasks: Deferred follow-up work run after each event turn
//!
//! # Architecture
//!
//! Elements are addressed by generational handles, never owned by the
//! keyboard:
//!
//! ```text
//! ElementId { index: 3, generation: 0 }  -> Input  (type=number, value="7.5")
//! ElementId { index: 3, generation: 1 }  -> slot reused, old handles resolve to None
//! ```

mod document;
mod tasks;

pub use document::*;
pub(crate) use document::splice;
pub use tasks::*;
