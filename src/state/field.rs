//! Field Adapter - Classify and edit the focused element.
//!
//! All element-type specific logic lives here so the controller stays
//! type-agnostic. Every mutation is best-effort: operations an element does
//! not support (a selection range on a number input, a caret on rich text)
//! are skipped, never reported.
//!
//! # Numeric fields
//!
//! Number inputs reject intermediate text like `"-0."` and expose no
//! selection, so while the keyboard edits one it is switched to a text input.
//! The original type is kept in the element's dataset ([`FieldEditState`])
//! and restored on blur after the value is normalized.

use log::trace;

use crate::engine::{splice, Document, Element, ElementFlags, ElementId, ElementKind};
use crate::types::{Direction, InputType};

/// Dataset key recording a numeric field's original type while coerced.
pub const ORIGINAL_TYPE_KEY: &str = "vk-original-type";

/// Attribute that opts an element out of the keyboard when set to `"off"`.
pub const OPT_OUT_ATTR: &str = "data-keyboard";

// =============================================================================
// Field Kind
// =============================================================================

/// The kinds of element the keyboard can edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Contenteditable region, edited through native commands.
    RichText,
    TextArea,
    /// Single-line input with its current declared type.
    Input(InputType),
}

impl FieldKind {
    pub fn of(element: &Element) -> Option<Self> {
        match element.kind() {
            ElementKind::RichText => Some(Self::RichText),
            ElementKind::TextArea => Some(Self::TextArea),
            ElementKind::Input => Some(Self::Input(element.input_type())),
            _ => None,
        }
    }

    pub fn supports_selection_range(&self) -> bool {
        match self {
            Self::RichText => false,
            Self::TextArea => true,
            Self::Input(t) => t.supports_selection(),
        }
    }

    /// Only single-line inputs submit their form on Enter.
    pub fn supports_form_submit(&self) -> bool {
        matches!(self, Self::Input(_))
    }

    pub fn is_multiline(&self) -> bool {
        matches!(self, Self::RichText | Self::TextArea)
    }

    fn is_plain(&self) -> bool {
        !matches!(self, Self::RichText)
    }
}

fn kind_of(doc: &Document, id: ElementId) -> Option<FieldKind> {
    doc.get(id).and_then(FieldKind::of)
}

// =============================================================================
// Field Edit State
// =============================================================================

/// Marker on a numeric field currently coerced to text editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEditState {
    pub original_type: InputType,
}

impl FieldEditState {
    /// Read the marker attached to `id`, if any.
    pub fn of(doc: &Document, id: ElementId) -> Option<Self> {
        let original = doc.get(id)?.data(ORIGINAL_TYPE_KEY)?;
        Some(Self { original_type: InputType::parse(original) })
    }

    fn attach(&self, doc: &mut Document, id: ElementId) {
        let _ = doc.set_data(id, ORIGINAL_TYPE_KEY, self.original_type.as_str());
    }

    fn detach(doc: &mut Document, id: ElementId) {
        let _ = doc.remove_data(id, ORIGINAL_TYPE_KEY);
    }
}

// =============================================================================
// Classification
// =============================================================================

/// True if the element is a free-text editable region the keyboard may
/// target, and it is not opted out, read-only or disabled.
pub fn is_editable(doc: &Document, id: ElementId) -> bool {
    let Some(element) = doc.get(id) else {
        return false;
    };
    if element.attr(OPT_OUT_ATTR) == Some("off") {
        return false;
    }
    if element.flags().intersects(ElementFlags::READONLY | ElementFlags::DISABLED)
        || element.attr("readonly").is_some()
        || element.attr("disabled").is_some()
    {
        return false;
    }
    match FieldKind::of(element) {
        Some(FieldKind::Input(t)) => t.is_text_entry(),
        Some(_) => true,
        None => false,
    }
}

/// True for number inputs, including ones coerced to text mid-edit.
pub fn is_numeric_field(doc: &Document, id: ElementId) -> bool {
    let Some(element) = doc.get(id) else {
        return false;
    };
    element.kind() == ElementKind::Input
        && (element.input_type() == InputType::Number
            || element.data(ORIGINAL_TYPE_KEY) == Some(InputType::Number.as_str()))
}

/// True for email inputs and fields whose id or name mentions "email".
/// Always false unless `alpha_email` is enabled.
pub fn is_email_like_field(doc: &Document, id: ElementId, alpha_email: bool) -> bool {
    if !alpha_email {
        return false;
    }
    let Some(element) = doc.get(id) else {
        return false;
    };
    if element.kind() == ElementKind::Input && element.input_type() == InputType::Email {
        return true;
    }
    let mentions_email = |s: Option<&str>| s.is_some_and(|s| s.to_lowercase().contains("email"));
    mentions_email(element.id()) || mentions_email(element.name())
}

// =============================================================================
// Numeric Editing
// =============================================================================

/// Normalize intermediate numeric text: commas become periods, and a bare
/// `"."` or `"-."` gets a leading zero.
pub fn normalize_numeric_text(value: &str) -> String {
    let v = value.replace(',', ".");
    match v.as_str() {
        "." => "0.".to_string(),
        "-." => "-0.".to_string(),
        _ => v,
    }
}

/// Switch a number input to text editing, remembering its type.
pub fn begin_numeric_edit(doc: &mut Document, id: ElementId) {
    if FieldEditState::of(doc, id).is_some() || !is_numeric_field(doc, id) {
        return;
    }
    FieldEditState { original_type: InputType::Number }.attach(doc, id);
    let _ = doc.set_input_type(id, InputType::Text.as_str());
    trace!("numeric edit started on {:?}", id);
}

/// Normalize the value and restore the original type of a coerced field.
pub fn end_numeric_edit(doc: &mut Document, id: ElementId) {
    let Some(state) = FieldEditState::of(doc, id) else {
        return;
    };
    let normalized = normalize_numeric_text(&value_of(doc, id));
    let _ = doc.set_value(id, normalized);
    let _ = doc.set_input_type(id, state.original_type.as_str());
    FieldEditState::detach(doc, id);
    trace!("numeric edit ended on {:?}", id);
}

fn normalize_in_place(doc: &mut Document, id: ElementId) {
    if !is_numeric_field(doc, id) {
        return;
    }
    let value = value_of(doc, id);
    let normalized = normalize_numeric_text(&value);
    if normalized != value {
        let _ = doc.set_value(id, normalized);
    }
}

// =============================================================================
// Mutations
// =============================================================================

fn value_of(doc: &Document, id: ElementId) -> String {
    doc.get(id).map(|e| e.value().to_string()).unwrap_or_default()
}

/// Selection bounds, or a caret at the end when the element has none.
fn bounds(doc: &Document, id: ElementId, value: &str) -> (usize, usize) {
    doc.selection(id).unwrap_or_else(|| {
        let len = value.chars().count();
        (len, len)
    })
}

/// Insert `text` at the selection, replacing it, and place the caret after
/// the inserted text.
pub fn insert_text(doc: &mut Document, id: ElementId, text: &str) {
    let Some(kind) = kind_of(doc, id) else {
        return;
    };
    if !kind.is_plain() {
        doc.exec_insert_text(text);
        return;
    }

    let value = value_of(doc, id);
    let (start, end) = bounds(doc, id, &value);
    let _ = doc.set_value(id, splice(&value, start, end, text));
    let pos = start + text.chars().count();
    let _ = doc.set_selection_range(id, pos, pos);
    normalize_in_place(doc, id);
    doc.dispatch_input(id);
}

/// Delete the selection, or the character before the caret.
pub fn delete_backward(doc: &mut Document, id: ElementId) {
    let Some(kind) = kind_of(doc, id) else {
        return;
    };
    if !kind.is_plain() {
        doc.exec_delete();
        return;
    }

    let value = value_of(doc, id);
    let (start, end) = bounds(doc, id, &value);
    let from = if start == end { start.saturating_sub(1) } else { start };
    let _ = doc.set_value(id, splice(&value, from, end, ""));
    let _ = doc.set_selection_range(id, from, from);
    normalize_in_place(doc, id);
    doc.dispatch_input(id);
}

/// Move the caret one position, collapsing any selection.
pub fn move_caret(doc: &mut Document, id: ElementId, direction: Direction) {
    let Some((start, end)) = doc.selection(id) else {
        return;
    };
    let pos = match direction {
        Direction::Left => start.min(end).saturating_sub(1),
        Direction::Right => {
            let len = value_of(doc, id).chars().count();
            (start.max(end) + 1).min(len)
        }
    };
    let _ = doc.set_selection_range(id, pos, pos);
}

/// Flip the leading minus of a numeric field; other fields get a literal `-`.
pub fn toggle_sign(doc: &mut Document, id: ElementId) {
    if !is_numeric_field(doc, id) {
        insert_text(doc, id, "-");
        return;
    }

    let value = value_of(doc, id);
    let toggled = match value.strip_prefix('-') {
        Some(rest) => rest.to_string(),
        None => format!("-{value}"),
    };
    let _ = doc.set_value(id, toggled);
    if doc.selection(id).is_some() {
        let _ = doc.set_selection_range(id, 0, 0);
    }
    doc.dispatch_input(id);
}

// =============================================================================
// TESTS
// =============================================================================
