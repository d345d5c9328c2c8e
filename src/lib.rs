//! # spark-vkeyboard
//!
//! Reactive on-screen keyboard for the editable fields of a page.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals): the
//! current layout, shift state and visibility are signals hosts can observe.
//!
//! ## Architecture
//!
//! The keyboard never owns page elements. It holds weak [`ElementId`]
//! handles into a [`Document`] and reacts to the events the document queues:
//!
//! ```text
//! host input → Document (focus, events) → Keyboard (layout, dispatch) → Field edits
//!                                              ↓
//!                                   KeyGrid → GridLayout (taffy) → ANSI (crossterm)
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Keys, layout names, input types
//! - [`layouts`] - Key arrangements and the shift transform
//! - [`engine`] - Host page model and deferred tasks
//! - [`state`] - Field adapter and keyboard controller
//! - [`layout`] - Key grid geometry
//! - [`renderer`] - Terminal output
//! - [`bootstrap`] - Attach the keyboard to a page

pub mod bootstrap;
pub mod config;
pub mod engine;
pub mod layout;
pub mod layouts;
pub mod renderer;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use bootstrap::{Page, RenderError};
pub use config::KeyboardOptions;

pub use engine::{
    Document, Element, ElementFlags, ElementId, ElementKind, ElementProps, HostError, PageEvent,
    ReadyState, TaskQueue,
};

pub use layout::{compute_grid_layout, GridLayout, GridMetrics, KeyRect};
pub use layouts::{layout, transform_for_shift, Layout};

pub use renderer::{render_grid, KeyPalette};

pub use state::field::{
    begin_numeric_edit, delete_backward, end_numeric_edit, insert_text, is_editable,
    is_email_like_field, is_numeric_field, move_caret, normalize_numeric_text, toggle_sign,
};
pub use state::{FieldEditState, FieldKind, KeyCap, KeyGrid, Keyboard};
