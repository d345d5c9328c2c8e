//! Keyboard Controller - Focus tracking, key grid and key dispatch.
//!
//! Owns the single [`KeyboardState`] and reacts to four event sources:
//! - Focus-in on an editable element: adopt it, pick a layout, show
//! - Focus-out: deferred check that drops the active element once focus
//!   settled somewhere non-editable
//! - Pointer-down: key buttons dispatch, outside presses hide the widget
//! - Clicks on the close control and the floating toggle
//!
//! Layout, shift and visibility are signals so hosts can react to them.
//!
//! # Example
//!
//! ```ignore
//! use spark_vkeyboard::{Document, Keyboard, KeyboardOptions, Key};
//! use spark_signals::effect;
//!
//! let mut keyboard = Keyboard::init(&mut doc, KeyboardOptions::default())?;
//! let visible = keyboard.visible_signal();
//! let _stop = effect(move || println!("keyboard visible: {}", visible.get()));
//!
//! doc.focus(field);
//! keyboard.pump(&mut doc);
//! keyboard.press(&mut doc, Key::Char('7'));
//! ```

use std::collections::HashMap;

use log::{debug, trace};
use spark_signals::{signal, Signal};

use crate::config::KeyboardOptions;
use crate::engine::{Document, ElementId, ElementKind, ElementProps, PageEvent, TaskQueue};
use crate::layouts::{layout, transform_for_shift};
use crate::types::{Direction, Key, LayoutName};

use super::field::{self, FieldKind};

// =============================================================================
// Render Targets
// =============================================================================

/// Collapsible widget container.
pub const CONTAINER_ID: &str = "vk-container";
/// Key grid container.
pub const KEYS_ID: &str = "vk-keys";
/// Layout toggle control, hidden at init.
pub const TOGGLE_LAYOUT_ID: &str = "vk-toggle-layout";
/// Close control.
pub const CLOSE_ID: &str = "vk-close";
/// Floating button that reopens the widget.
pub const FAB_ID: &str = "vk-fab";

/// Resolved render targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elements {
    pub container: ElementId,
    pub keys: ElementId,
    pub close: ElementId,
    pub fab: ElementId,
    pub toggle: Option<ElementId>,
}

impl Elements {
    /// Look up every target by id. `None` if a required one is missing.
    pub fn resolve(doc: &Document) -> Option<Self> {
        Some(Self {
            container: doc.get_element_by_id(CONTAINER_ID)?,
            keys: doc.get_element_by_id(KEYS_ID)?,
            close: doc.get_element_by_id(CLOSE_ID)?,
            fab: doc.get_element_by_id(FAB_ID)?,
            toggle: doc.get_element_by_id(TOGGLE_LAYOUT_ID),
        })
    }
}

// =============================================================================
// Key Grid
// =============================================================================

/// A rendered key: its token and the label on its button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCap {
    pub key: Key,
    pub label: String,
}

/// The currently rendered rows of key caps.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyGrid {
    pub layout: LayoutName,
    pub shift: bool,
    pub rows: Vec<Vec<KeyCap>>,
}

impl KeyGrid {
    pub fn keys(&self) -> impl Iterator<Item = &KeyCap> {
        self.rows.iter().flatten()
    }

    pub fn contains(&self, key: Key) -> bool {
        self.keys().any(|cap| cap.key == key)
    }

    pub fn label(&self, key: Key) -> Option<&str> {
        self.keys().find(|cap| cap.key == key).map(|cap| cap.label.as_str())
    }
}

// =============================================================================
// State
// =============================================================================

/// Mutable keyboard state. Only the controller writes it.
pub struct KeyboardState {
    /// Element receiving key presses. Weak: may have been removed.
    pub active: Option<ElementId>,
    /// Input mode picked on focus (`Alpha` or `Numeric`).
    mode: LayoutName,
    /// Sticky layout choice reapplied on focus.
    remembered: Option<LayoutName>,
    /// Resolved layout of the rendered grid.
    layout: Signal<LayoutName>,
    shift: Signal<bool>,
    visible: Signal<bool>,
}

impl KeyboardState {
    fn new() -> Self {
        Self {
            active: None,
            mode: LayoutName::Alpha,
            remembered: None,
            layout: signal(LayoutName::Alpha),
            shift: signal(false),
            visible: signal(false),
        }
    }
}

enum Deferred {
    FocusOutCheck,
}

// =============================================================================
// Keyboard
// =============================================================================

/// The on-screen keyboard controller.
pub struct Keyboard {
    options: KeyboardOptions,
    els: Elements,
    state: KeyboardState,
    grid: KeyGrid,
    buttons: HashMap<ElementId, Key>,
    tasks: TaskQueue<Deferred>,
}

impl Keyboard {
    /// Attach to the page's render targets and start hidden.
    ///
    /// Returns `None` without touching the page if the container, key grid,
    /// close control or floating toggle is missing.
    pub fn init(doc: &mut Document, options: KeyboardOptions) -> Option<Self> {
        let Some(els) = Elements::resolve(doc) else {
            debug!("virtual keyboard targets missing, not initializing");
            return None;
        };
        if let Some(toggle) = els.toggle {
            let _ = doc.set_hidden(toggle, true);
        }

        let mut keyboard = Self {
            options,
            els,
            state: KeyboardState::new(),
            grid: KeyGrid::default(),
            buttons: HashMap::new(),
            tasks: TaskQueue::new(),
        };
        keyboard.hide(doc);
        debug!("virtual keyboard initialized with {:?}", options);
        Some(keyboard)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn options(&self) -> &KeyboardOptions {
        &self.options
    }

    pub fn elements(&self) -> &Elements {
        &self.els
    }

    pub fn active_element(&self) -> Option<ElementId> {
        self.state.active
    }

    pub fn layout(&self) -> LayoutName {
        self.state.layout.get()
    }

    pub fn remembered_layout(&self) -> Option<LayoutName> {
        self.state.remembered
    }

    pub fn is_shift_active(&self) -> bool {
        self.state.shift.get()
    }

    pub fn is_visible(&self) -> bool {
        self.state.visible.get()
    }

    pub fn layout_signal(&self) -> Signal<LayoutName> {
        self.state.layout.clone()
    }

    pub fn shift_signal(&self) -> Signal<bool> {
        self.state.shift.clone()
    }

    pub fn visible_signal(&self) -> Signal<bool> {
        self.state.visible.clone()
    }

    pub fn grid(&self) -> &KeyGrid {
        &self.grid
    }

    /// Button element currently rendered for `key`.
    pub fn button(&self, key: Key) -> Option<ElementId> {
        self.buttons.iter().find(|(_, k)| **k == key).map(|(id, _)| *id)
    }

    /// Key bound to a rendered button.
    pub fn key_for_button(&self, button: ElementId) -> Option<Key> {
        self.buttons.get(&button).copied()
    }

    /// The active element, if it still exists.
    fn target(&mut self, doc: &Document) -> Option<ElementId> {
        let id = self.state.active?;
        if doc.get(id).is_none() {
            self.state.active = None;
            return None;
        }
        Some(id)
    }

    // -------------------------------------------------------------------------
    // Event Loop
    // -------------------------------------------------------------------------

    /// Handle one page event. Returns true when the event's default action
    /// must not run (a key button was pressed).
    pub fn handle(&mut self, doc: &mut Document, event: PageEvent) -> bool {
        match event {
            PageEvent::FocusIn(target) => {
                self.on_focus_in(doc, target);
                false
            }
            PageEvent::FocusOut(_) => {
                self.tasks.defer(Deferred::FocusOutCheck);
                false
            }
            PageEvent::PointerDown(target) => self.on_pointer_down(doc, target),
            PageEvent::Click(target) => {
                self.on_click(doc, target);
                false
            }
            PageEvent::Ready => false,
        }
    }

    /// Process every queued page event, then the deferred tasks they
    /// scheduled, until both queues are empty.
    pub fn pump(&mut self, doc: &mut Document) {
        loop {
            self.drain_events(doc);
            if self.tasks.is_empty() {
                break;
            }
            for task in self.tasks.take_batch() {
                self.run_deferred(doc, task);
            }
        }
    }

    fn drain_events(&mut self, doc: &mut Document) {
        while let Some(event) = doc.take_event() {
            self.handle(doc, event);
        }
    }

    fn run_deferred(&mut self, doc: &mut Document, task: Deferred) {
        match task {
            Deferred::FocusOutCheck => {
                let focused = doc.active_element();
                if focused.is_some_and(|id| field::is_editable(doc, id)) {
                    return;
                }
                if let Some(previous) = self.state.active.take() {
                    field::end_numeric_edit(doc, previous);
                    trace!("focus left editable fields, released {:?}", previous);
                }
            }
        }
    }

    fn on_focus_in(&mut self, doc: &mut Document, target: ElementId) {
        if !field::is_editable(doc, target) {
            return;
        }
        if let Some(previous) = self.state.active.filter(|p| *p != target) {
            field::end_numeric_edit(doc, previous);
        }

        self.state.active = Some(target);
        field::begin_numeric_edit(doc, target);

        // The inputmode hint only counts here, not in later classification
        let numeric_hint = doc.get(target).and_then(|e| e.input_mode()) == Some("numeric");
        let was_number = field::is_numeric_field(doc, target) || numeric_hint;

        let mode = match self.state.remembered {
            Some(remembered) if self.options.remember_layout => remembered,
            _ if was_number => LayoutName::Numeric,
            _ => LayoutName::Alpha,
        };
        self.state.mode = mode;
        self.state.shift.set(false);
        self.rebuild(doc);
        self.show(doc);
        self.state.remembered = Some(mode);
        debug!("focus on {:?}, layout {}", target, self.layout());
    }

    fn on_pointer_down(&mut self, doc: &mut Document, target: ElementId) -> bool {
        if let Some(key) = self.key_for_button(target) {
            self.press(doc, key);
            return true;
        }
        if self.is_visible()
            && !doc.contains(self.els.container, target)
            && !field::is_editable(doc, target)
        {
            self.hide(doc);
        }
        false
    }

    fn on_click(&mut self, doc: &mut Document, target: ElementId) {
        if target == self.els.close {
            self.hide(doc);
        } else if target == self.els.fab {
            self.show(doc);
            if let Some(focused) = doc.active_element().filter(|id| field::is_editable(doc, *id)) {
                self.state.active = Some(focused);
            }
        } else if Some(target) == self.els.toggle {
            self.toggle_layout(doc);
        }
    }

    // -------------------------------------------------------------------------
    // Key Dispatch
    // -------------------------------------------------------------------------

    /// Apply a key to the active element. No-op without one.
    pub fn press(&mut self, doc: &mut Document, key: Key) {
        let Some(el) = self.target(doc) else {
            return;
        };

        // Keep editing the field even if something else grabbed focus
        if doc.active_element() != Some(el) && doc.focus(el) {
            self.drain_events(doc);
        }

        match key {
            Key::Space => field::insert_text(doc, el, " "),
            Key::Enter => self.press_enter(doc, el),
            Key::Backspace => field::delete_backward(doc, el),
            Key::Decimal => self.press_decimal(doc, el),
            Key::Left => field::move_caret(doc, el, Direction::Left),
            Key::Right => field::move_caret(doc, el, Direction::Right),
            Key::Sign => field::toggle_sign(doc, el),
            Key::Shift => {
                if self.layout().is_numeric() {
                    return;
                }
                self.state.shift.set(!self.is_shift_active());
                self.rebuild(doc);
            }
            Key::Char(_) => {
                let t = transform_for_shift(key, self.layout(), self.is_shift_active());
                field::insert_text(doc, el, &t.text);
            }
        }
    }

    fn press_enter(&mut self, doc: &mut Document, el: ElementId) {
        let Some(kind) = doc.get(el).and_then(FieldKind::of) else {
            return;
        };
        if kind.is_multiline() {
            field::insert_text(doc, el, "\n");
        } else if kind.supports_form_submit() {
            if let Some(form) = doc.closest_form(el) {
                let _ = doc.request_submit(form);
            }
        }
    }

    fn press_decimal(&mut self, doc: &mut Document, el: ElementId) {
        let glyph = if field::is_numeric_field(doc, el) {
            '.'
        } else {
            self.options.decimal_separator
        };
        let current = doc.get(el).map(|e| e.value().to_string()).unwrap_or_default();
        if current.contains(glyph) {
            return;
        }
        if current.is_empty() {
            field::insert_text(doc, el, &format!("0{glyph}"));
        } else {
            field::insert_text(doc, el, &glyph.to_string());
        }
    }

    /// Switch between the alphabetic and numeric layouts and remember it.
    pub fn toggle_layout(&mut self, doc: &mut Document) {
        self.state.mode = if self.state.mode.is_numeric() {
            LayoutName::Alpha
        } else {
            LayoutName::Numeric
        };
        self.state.remembered = Some(self.state.mode);
        self.state.shift.set(false);
        self.rebuild(doc);
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    fn resolve_layout(&self, doc: &Document) -> LayoutName {
        if self.state.mode.is_numeric() {
            return LayoutName::Numeric;
        }
        let email = self
            .state
            .active
            .is_some_and(|id| field::is_email_like_field(doc, id, self.options.alpha_email));
        if email { LayoutName::AlphaEmail } else { LayoutName::Alpha }
    }

    fn label(&self, key: Key, layout_name: LayoutName, shift: bool) -> String {
        match key {
            Key::Space => "Espacio".to_string(),
            Key::Enter => "Enter".to_string(),
            Key::Backspace => "⌫".to_string(),
            Key::Decimal => self.options.decimal_separator.to_string(),
            Key::Left => "◀".to_string(),
            Key::Right => "▶".to_string(),
            Key::Sign => "+/-".to_string(),
            Key::Shift if shift => "Shift▲".to_string(),
            Key::Shift => "Shift".to_string(),
            Key::Char(_) => transform_for_shift(key, layout_name, shift).label,
        }
    }

    /// Re-render the key grid for the current state.
    pub fn rebuild(&mut self, doc: &mut Document) {
        let layout_name = self.resolve_layout(doc);
        if layout_name.is_numeric() {
            self.state.shift.set(false);
        }
        let shift = self.is_shift_active();
        self.state.layout.set(layout_name);

        doc.clear_children(self.els.keys);
        self.buttons.clear();

        let mut rows = Vec::new();
        for row in layout(layout_name) {
            let row_el = doc.append(self.els.keys, ElementProps::default());
            let mut caps = Vec::with_capacity(row.len());
            for key in row {
                let label = self.label(key, layout_name, shift);
                let button = doc.append(row_el, ElementProps {
                    kind: ElementKind::Button,
                    value: label.clone(),
                    ..Default::default()
                });
                self.buttons.insert(button, key);
                caps.push(KeyCap { key, label });
            }
            rows.push(caps);
        }
        self.grid = KeyGrid { layout: layout_name, shift, rows };
    }

    // -------------------------------------------------------------------------
    // Visibility
    // -------------------------------------------------------------------------

    /// Reveal the widget and hide the floating toggle.
    pub fn show(&mut self, doc: &mut Document) {
        let _ = doc.set_hidden(self.els.container, false);
        let _ = doc.set_hidden(self.els.fab, true);
        self.state.visible.set(true);
    }

    /// Collapse the widget and reveal the floating toggle.
    pub fn hide(&mut self, doc: &mut Document) {
        let _ = doc.set_hidden(self.els.container, true);
        let _ = doc.set_hidden(self.els.fab, false);
        self.state.visible.set(false);
    }
}

// =============================================================================
// TESTS
// =============================================================================
