//! Document - The host page's element tree.
//!
//! An owned arena of elements addressed by generational [`ElementId`]s.
//! Handles are weak: once an element is removed its slot generation bumps and
//! every outstanding id for it resolves to `None`.
//!
//! The document provides what the keyboard needs from a page:
//! - Element classification data (kind, declared type, attributes, flags)
//! - Text value and selection range
//! - Focus tracking with queued `FocusIn` / `FocusOut` events
//! - Native editing commands for rich-text regions
//! - `input` notifications and form submission
//!
//! # Example
//!
//! ```ignore
//! use spark_vkeyboard::engine::{Document, ElementKind, ElementProps};
//!
//! let mut doc = Document::new();
//! let qty = doc.append(doc.body(), ElementProps {
//!     kind: ElementKind::Input,
//!     id: Some("qty".into()),
//!     input_type: Some("number".into()),
//!     ..Default::default()
//! });
//! doc.focus(qty);
//! ```

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;

use crate::types::InputType;

// =============================================================================
// Handles and Flags
// =============================================================================

/// Weak handle to an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId {
    index: usize,
    generation: u32,
}

bitflags::bitflags! {
    /// Element state flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ElementFlags: u8 {
        const READONLY = 1 << 0;
        const DISABLED = 1 << 1;
        /// Not displayed (the `hidden` class).
        const HIDDEN = 1 << 2;
    }
}

/// Element tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementKind {
    #[default]
    Div,
    Paragraph,
    Button,
    Form,
    Input,
    TextArea,
    /// A contenteditable container.
    RichText,
}

impl ElementKind {
    fn is_focusable(&self) -> bool {
        matches!(self, Self::Input | Self::TextArea | Self::RichText | Self::Button)
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Failure of a host operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostError {
    /// The element was removed from the document.
    Detached,
    /// The element does not support the operation in its current state.
    InvalidState,
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detached => write!(f, "element is no longer in the document"),
            Self::InvalidState => write!(f, "operation not supported by element"),
        }
    }
}

impl std::error::Error for HostError {}

// =============================================================================
// Events
// =============================================================================

/// Events the page delivers to the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    /// The document finished loading.
    Ready,
    FocusIn(ElementId),
    FocusOut(ElementId),
    PointerDown(ElementId),
    Click(ElementId),
}

/// Document loading state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Complete,
}

/// Listener for `input` notifications: element and its new value.
pub type InputListener = Rc<dyn Fn(ElementId, &str)>;

/// Listener for form submissions.
pub type SubmitListener = Rc<dyn Fn(ElementId)>;

type ListenerList<L> = Rc<RefCell<Vec<(usize, L)>>>;

// =============================================================================
// Element
// =============================================================================

/// Construction props for a new element.
#[derive(Debug, Clone, Default)]
pub struct ElementProps {
    pub kind: ElementKind,
    pub id: Option<String>,
    pub name: Option<String>,
    /// Declared `type` attribute (inputs only).
    pub input_type: Option<String>,
    /// `inputmode` hint.
    pub input_mode: Option<String>,
    /// Initial value, or text content for non-inputs.
    pub value: String,
    pub flags: ElementFlags,
    /// Additional attributes, e.g. `("data-keyboard", "off")`.
    pub attrs: Vec<(String, String)>,
}

/// An element in the document.
#[derive(Debug, Clone)]
pub struct Element {
    kind: ElementKind,
    id: Option<String>,
    name: Option<String>,
    input_type: String,
    input_mode: Option<String>,
    attrs: HashMap<String, String>,
    dataset: HashMap<String, String>,
    flags: ElementFlags,
    value: String,
    selection: (usize, usize),
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Element {
    fn from_props(props: ElementProps, parent: Option<ElementId>) -> Self {
        let len = props.value.chars().count();
        Self {
            kind: props.kind,
            id: props.id,
            name: props.name,
            input_type: props.input_type.unwrap_or_default(),
            input_mode: props.input_mode,
            attrs: props.attrs.into_iter().collect(),
            dataset: HashMap::new(),
            flags: props.flags,
            value: props.value,
            selection: (len, len),
            parent,
            children: Vec::new(),
        }
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Declared type, parsed. Meaningful for inputs only.
    pub fn input_type(&self) -> InputType {
        InputType::parse(&self.input_type)
    }

    pub fn input_mode(&self) -> Option<&str> {
        self.input_mode.as_deref()
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn data(&self, key: &str) -> Option<&str> {
        self.dataset.get(key).map(String::as_str)
    }

    pub fn flags(&self) -> ElementFlags {
        self.flags
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    fn exposes_selection(&self) -> bool {
        match self.kind {
            ElementKind::TextArea => true,
            ElementKind::Input => self.input_type().supports_selection(),
            _ => false,
        }
    }
}

struct Slot {
    generation: u32,
    element: Option<Element>,
}

// =============================================================================
// Document
// =============================================================================

/// The element tree of a page.
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<usize>,
    body: ElementId,
    active: Option<ElementId>,
    ready_state: ReadyState,
    events: VecDeque<PageEvent>,
    input_counts: HashMap<ElementId, usize>,
    submit_counts: HashMap<ElementId, usize>,
    input_listeners: ListenerList<InputListener>,
    submit_listeners: ListenerList<SubmitListener>,
    next_listener_id: usize,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a loaded document containing only a body.
    pub fn new() -> Self {
        let mut doc = Self {
            slots: Vec::new(),
            free: Vec::new(),
            body: ElementId { index: 0, generation: 0 },
            active: None,
            ready_state: ReadyState::Complete,
            events: VecDeque::new(),
            input_counts: HashMap::new(),
            submit_counts: HashMap::new(),
            input_listeners: Rc::new(RefCell::new(Vec::new())),
            submit_listeners: Rc::new(RefCell::new(Vec::new())),
            next_listener_id: 0,
        };
        doc.body = doc.allocate(Element::from_props(ElementProps::default(), None));
        doc
    }

    /// Create a document that is still loading. Call [`finish_loading`]
    /// once the tree is built.
    ///
    /// [`finish_loading`]: Document::finish_loading
    pub fn loading() -> Self {
        let mut doc = Self::new();
        doc.ready_state = ReadyState::Loading;
        doc
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    /// Mark the document loaded and queue [`PageEvent::Ready`].
    pub fn finish_loading(&mut self) {
        if self.ready_state == ReadyState::Loading {
            self.ready_state = ReadyState::Complete;
            self.events.push_back(PageEvent::Ready);
        }
    }

    pub fn body(&self) -> ElementId {
        self.body
    }

    // -------------------------------------------------------------------------
    // Tree
    // -------------------------------------------------------------------------

    fn allocate(&mut self, element: Element) -> ElementId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.element = Some(element);
            ElementId { index, generation: slot.generation }
        } else {
            let index = self.slots.len();
            self.slots.push(Slot { generation: 0, element: Some(element) });
            ElementId { index, generation: 0 }
        }
    }

    /// Append a new element under `parent`. A detached parent falls back to
    /// the body.
    pub fn append(&mut self, parent: ElementId, props: ElementProps) -> ElementId {
        let parent = if self.get(parent).is_some() { parent } else { self.body };
        let id = self.allocate(Element::from_props(props, Some(parent)));
        if let Some(p) = self.get_mut(parent) {
            p.children.push(id);
        }
        id
    }

    /// Resolve a handle. `None` once the element was removed.
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_ref())
    }

    fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_mut())
    }

    /// Find an element by its `id` attribute.
    pub fn get_element_by_id(&self, id_attr: &str) -> Option<ElementId> {
        self.slots.iter().enumerate().find_map(|(index, slot)| {
            let element = slot.element.as_ref()?;
            (element.id.as_deref() == Some(id_attr))
                .then_some(ElementId { index, generation: slot.generation })
        })
    }

    /// Remove an element and its subtree.
    pub fn remove(&mut self, id: ElementId) {
        if id == self.body {
            return;
        }
        let Some(element) = self.get(id) else {
            return;
        };
        let parent = element.parent;
        let children = element.children.clone();

        for child in children {
            self.remove(child);
        }
        if let Some(p) = parent.and_then(|p| self.get_mut(p)) {
            p.children.retain(|c| *c != id);
        }
        if self.active == Some(id) {
            self.active = None;
        }

        let slot = &mut self.slots[id.index];
        slot.element = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
    }

    /// Remove every child of `id`.
    pub fn clear_children(&mut self, id: ElementId) {
        let children = match self.get(id) {
            Some(element) => element.children.clone(),
            None => return,
        };
        for child in children {
            self.remove(child);
        }
    }

    /// True if `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).and_then(|e| e.parent);
        }
        false
    }

    /// The nearest enclosing form.
    pub fn closest_form(&self, id: ElementId) -> Option<ElementId> {
        let mut current = self.get(id).and_then(|e| e.parent);
        while let Some(p) = current {
            let element = self.get(p)?;
            if element.kind == ElementKind::Form {
                return Some(p);
            }
            current = element.parent;
        }
        None
    }

    // -------------------------------------------------------------------------
    // Attributes and State
    // -------------------------------------------------------------------------

    pub fn set_value(&mut self, id: ElementId, value: impl Into<String>) -> Result<(), HostError> {
        let element = self.get_mut(id).ok_or(HostError::Detached)?;
        element.value = value.into();
        // Assigning a value puts the caret at the end
        let len = element.char_len();
        element.selection = (len, len);
        Ok(())
    }

    /// Change the declared `type` of an input.
    pub fn set_input_type(&mut self, id: ElementId, input_type: &str) -> Result<(), HostError> {
        let element = self.get_mut(id).ok_or(HostError::Detached)?;
        if element.kind != ElementKind::Input {
            return Err(HostError::InvalidState);
        }
        element.input_type = input_type.to_string();
        Ok(())
    }

    pub fn set_attr(&mut self, id: ElementId, name: &str, value: &str) -> Result<(), HostError> {
        let element = self.get_mut(id).ok_or(HostError::Detached)?;
        element.attrs.insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn set_data(&mut self, id: ElementId, key: &str, value: &str) -> Result<(), HostError> {
        let element = self.get_mut(id).ok_or(HostError::Detached)?;
        element.dataset.insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub fn remove_data(&mut self, id: ElementId, key: &str) -> Result<(), HostError> {
        let element = self.get_mut(id).ok_or(HostError::Detached)?;
        element.dataset.remove(key);
        Ok(())
    }

    pub fn set_flags(
        &mut self,
        id: ElementId,
        flags: ElementFlags,
        on: bool,
    ) -> Result<(), HostError> {
        let element = self.get_mut(id).ok_or(HostError::Detached)?;
        element.flags.set(flags, on);
        Ok(())
    }

    pub fn set_hidden(&mut self, id: ElementId, hidden: bool) -> Result<(), HostError> {
        self.set_flags(id, ElementFlags::HIDDEN, hidden)
    }

    pub fn is_hidden(&self, id: ElementId) -> bool {
        self.get(id).is_some_and(|e| e.flags.contains(ElementFlags::HIDDEN))
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Selection bounds as `(start, end)` char offsets, or `None` when the
    /// element does not expose a selection.
    pub fn selection(&self, id: ElementId) -> Option<(usize, usize)> {
        let element = self.get(id)?;
        element.exposes_selection().then_some(element.selection)
    }

    /// Set the selection. Offsets are clamped to the value length.
    pub fn set_selection_range(
        &mut self,
        id: ElementId,
        start: usize,
        end: usize,
    ) -> Result<(), HostError> {
        let element = self.get_mut(id).ok_or(HostError::Detached)?;
        if !element.exposes_selection() {
            return Err(HostError::InvalidState);
        }
        let len = element.char_len();
        let end = end.min(len);
        element.selection = (start.min(end), end);
        Ok(())
    }

    /// Place the caret of a rich-text region.
    pub fn set_caret(
        &mut self,
        id: ElementId,
        start: usize,
        end: usize,
    ) -> Result<(), HostError> {
        let element = self.get_mut(id).ok_or(HostError::Detached)?;
        if element.kind != ElementKind::RichText {
            return Err(HostError::InvalidState);
        }
        let len = element.char_len();
        let end = end.min(len);
        element.selection = (start.min(end), end);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Focus
    // -------------------------------------------------------------------------

    /// The focused element, if any.
    pub fn active_element(&self) -> Option<ElementId> {
        self.active.filter(|id| self.get(*id).is_some())
    }

    /// True if the element can take focus.
    pub fn is_focusable(&self, id: ElementId) -> bool {
        self.get(id).is_some_and(|e| {
            e.kind.is_focusable()
                && !e.flags.intersects(ElementFlags::DISABLED | ElementFlags::HIDDEN)
        })
    }

    /// Move focus to `id`, queueing `FocusOut` for the previous element and
    /// `FocusIn` for the new one. Returns false if the element cannot take
    /// focus.
    pub fn focus(&mut self, id: ElementId) -> bool {
        if !self.is_focusable(id) {
            return false;
        }
        let previous = self.active_element();
        if previous == Some(id) {
            return true;
        }
        if let Some(target) = previous {
            self.events.push_back(PageEvent::FocusOut(target));
        }
        self.active = Some(id);
        self.events.push_back(PageEvent::FocusIn(id));
        true
    }

    /// Drop focus entirely.
    pub fn blur(&mut self) {
        if let Some(target) = self.active_element() {
            self.active = None;
            self.events.push_back(PageEvent::FocusOut(target));
        }
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Next queued event.
    pub fn take_event(&mut self) -> Option<PageEvent> {
        self.events.pop_front()
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    // -------------------------------------------------------------------------
    // Native Editing (rich text)
    // -------------------------------------------------------------------------

    fn focused_rich_text(&self) -> Option<ElementId> {
        self.active_element()
            .filter(|id| self.get(*id).is_some_and(|e| e.kind == ElementKind::RichText))
    }

    /// Insert text at the caret of the focused rich-text region, replacing
    /// any selection. Returns false if no rich-text region has focus.
    pub fn exec_insert_text(&mut self, text: &str) -> bool {
        let Some(id) = self.focused_rich_text() else {
            return false;
        };
        if let Some(element) = self.get_mut(id) {
            let (start, end) = element.selection;
            element.value = splice(&element.value, start, end, text);
            let pos = start + text.chars().count();
            element.selection = (pos, pos);
        }
        self.dispatch_input(id);
        true
    }

    /// Delete backward at the caret of the focused rich-text region.
    pub fn exec_delete(&mut self) -> bool {
        let Some(id) = self.focused_rich_text() else {
            return false;
        };
        if let Some(element) = self.get_mut(id) {
            let (start, end) = element.selection;
            let from = if start == end { start.saturating_sub(1) } else { start };
            element.value = splice(&element.value, from, end, "");
            element.selection = (from, from);
        }
        self.dispatch_input(id);
        true
    }

    // -------------------------------------------------------------------------
    // Notifications
    // -------------------------------------------------------------------------

    /// Emit an `input` notification for `id`.
    pub fn dispatch_input(&mut self, id: ElementId) {
        let Some(value) = self.get(id).map(|e| e.value.clone()) else {
            return;
        };
        *self.input_counts.entry(id).or_insert(0) += 1;

        // Snapshot so listeners may register or unregister while running
        let listeners: Vec<InputListener> =
            self.input_listeners.borrow().iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener(id, &value);
        }
    }

    /// Number of `input` notifications emitted for `id`.
    pub fn input_events(&self, id: ElementId) -> usize {
        self.input_counts.get(&id).copied().unwrap_or(0)
    }

    /// Subscribe to `input` notifications. Returns cleanup function.
    pub fn on_input<F>(&mut self, listener: F) -> impl FnOnce() + use<F>
    where
        F: Fn(ElementId, &str) + 'static,
    {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        self.input_listeners.borrow_mut().push((id, Rc::new(listener)));

        let list = self.input_listeners.clone();
        move || {
            list.borrow_mut().retain(|(listener_id, _)| *listener_id != id);
        }
    }

    /// Submit a form.
    pub fn request_submit(&mut self, form: ElementId) -> Result<(), HostError> {
        let element = self.get(form).ok_or(HostError::Detached)?;
        if element.kind != ElementKind::Form {
            return Err(HostError::InvalidState);
        }
        *self.submit_counts.entry(form).or_insert(0) += 1;

        let listeners: Vec<SubmitListener> =
            self.submit_listeners.borrow().iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener(form);
        }
        Ok(())
    }

    /// Number of times `form` was submitted.
    pub fn submissions(&self, form: ElementId) -> usize {
        self.submit_counts.get(&form).copied().unwrap_or(0)
    }

    /// Subscribe to form submissions. Returns cleanup function.
    pub fn on_submit<F>(&mut self, listener: F) -> impl FnOnce() + use<F>
    where
        F: Fn(ElementId) + 'static,
    {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        self.submit_listeners.borrow_mut().push((id, Rc::new(listener)));

        let list = self.submit_listeners.clone();
        move || {
            list.borrow_mut().retain(|(listener_id, _)| *listener_id != id);
        }
    }
}

/// Replace the chars in `[start, end)` of `s` with `text`.
pub(crate) fn splice(s: &str, start: usize, end: usize, text: &str) -> String {
    let len = s.chars().count();
    let end = end.min(len);
    let start = start.min(end);
    let mut out: String = s.chars().take(start).collect();
    out.push_str(text);
    out.extend(s.chars().skip(end));
    out
}

// =============================================================================
// TESTS
// =============================================================================
