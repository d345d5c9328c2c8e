//! Bootstrap - Wire the keyboard into a page.
//!
//! [`Page`] owns the document and, once the document is ready and carries
//! the render targets, the keyboard. Host events go through
//! [`Page::dispatch`], which also runs the deferred work they schedule.
//!
//! ```ignore
//! let mut page = Page::new(doc, KeyboardOptions::default());
//! page.focus(qty);
//! page.press(Key::Char('7'));
//! page.blur();
//! ```

use std::io::Write;

use log::debug;

use crate::config::KeyboardOptions;
use crate::engine::{Document, ElementId, PageEvent, ReadyState};
use crate::layout::{compute_grid_layout, GridLayout, GridMetrics};
use crate::renderer::{render_grid, KeyPalette};
use crate::state::Keyboard;
use crate::types::Key;

/// Failure while drawing the keyboard.
#[derive(Debug)]
pub enum RenderError {
    Layout(taffy::TaffyError),
    Io(std::io::Error),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Layout(e) => write!(f, "key grid layout failed: {e}"),
            Self::Io(e) => write!(f, "terminal write failed: {e}"),
        }
    }
}

impl std::error::Error for RenderError {}

impl From<taffy::TaffyError> for RenderError {
    fn from(e: taffy::TaffyError) -> Self {
        Self::Layout(e)
    }
}

impl From<std::io::Error> for RenderError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// A document with the keyboard attached.
pub struct Page {
    pub document: Document,
    keyboard: Option<Keyboard>,
    options: KeyboardOptions,
}

impl Page {
    /// Attach to `document`. Initialization waits for the `Ready` event
    /// when the document is still loading.
    pub fn new(document: Document, options: KeyboardOptions) -> Self {
        let mut page = Self { document, keyboard: None, options };
        if page.document.ready_state() == ReadyState::Complete {
            page.init();
        }
        page
    }

    fn init(&mut self) {
        if self.keyboard.is_none() {
            self.keyboard = Keyboard::init(&mut self.document, self.options);
        }
    }

    pub fn keyboard(&self) -> Option<&Keyboard> {
        self.keyboard.as_ref()
    }

    pub fn keyboard_mut(&mut self) -> Option<&mut Keyboard> {
        self.keyboard.as_mut()
    }

    /// Deliver one event, then drain everything it queued. Returns true when
    /// the event's default action was prevented.
    pub fn dispatch(&mut self, event: PageEvent) -> bool {
        let prevented = self.deliver(event);
        self.pump();
        prevented
    }

    fn deliver(&mut self, event: PageEvent) -> bool {
        if event == PageEvent::Ready {
            debug!("document ready");
            self.init();
            return false;
        }
        match self.keyboard.as_mut() {
            Some(keyboard) => keyboard.handle(&mut self.document, event),
            None => false,
        }
    }

    /// Process queued document events and deferred tasks.
    pub fn pump(&mut self) {
        while let Some(event) = self.document.take_event() {
            self.deliver(event);
        }
        if let Some(keyboard) = self.keyboard.as_mut() {
            keyboard.pump(&mut self.document);
        }
    }

    // -------------------------------------------------------------------------
    // Host helpers
    // -------------------------------------------------------------------------

    /// Move focus, as a tap on the element would.
    pub fn focus(&mut self, id: ElementId) -> bool {
        let focused = self.document.focus(id);
        self.pump();
        focused
    }

    pub fn blur(&mut self) {
        self.document.blur();
        self.pump();
    }

    /// Pointer-down then, unless prevented, focus and click.
    pub fn tap(&mut self, id: ElementId) {
        if self.dispatch(PageEvent::PointerDown(id)) {
            return;
        }
        self.focus(id);
        self.dispatch(PageEvent::Click(id));
    }

    /// Tap the rendered button for `key`. Returns false if no such key is
    /// on the current grid.
    pub fn press(&mut self, key: Key) -> bool {
        let Some(button) = self.keyboard.as_ref().and_then(|k| k.button(key)) else {
            return false;
        };
        self.tap(button);
        true
    }

    /// Tap a sequence of key tokens (`"7"`, `"decimal"`, ...). Unknown
    /// tokens are skipped.
    pub fn type_keys(&mut self, tokens: &[&str]) {
        for key in tokens.iter().filter_map(|t| Key::parse(t)) {
            self.press(key);
        }
    }

    // -------------------------------------------------------------------------
    // Terminal
    // -------------------------------------------------------------------------

    /// Key geometry for the current grid, or `None` while hidden.
    pub fn grid_layout(&self, width: u16) -> Result<Option<GridLayout>, RenderError> {
        let Some(keyboard) = self.keyboard.as_ref().filter(|k| k.is_visible()) else {
            return Ok(None);
        };
        let metrics = GridMetrics::new(keyboard.options().compact);
        Ok(Some(compute_grid_layout(keyboard.grid(), metrics, width)?))
    }

    /// Draw the visible keyboard at `origin`. Returns the layout drawn.
    pub fn render<W: Write>(
        &self,
        out: &mut W,
        width: u16,
        origin: (u16, u16),
    ) -> Result<Option<GridLayout>, RenderError> {
        let layout = self.grid_layout(width)?;
        if let Some(layout) = &layout {
            render_grid(out, layout, origin, &KeyPalette::default())?;
            out.flush()?;
        }
        Ok(layout)
    }

    /// Tap the key under a terminal position relative to the grid origin.
    pub fn pointer_at(
        &mut self,
        width: u16,
        x: u16,
        y: u16,
    ) -> Result<Option<Key>, RenderError> {
        let key = self
            .grid_layout(width)?
            .and_then(|layout| layout.key_at(x, y).map(|rect| rect.key));
        if let Some(key) = key {
            self.press(key);
        }
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ElementKind, ElementProps};
    use crate::state::{CLOSE_ID, CONTAINER_ID, FAB_ID, KEYS_ID};

    fn mount(doc: &mut Document) {
        let container = doc.append(doc.body(), ElementProps {
            id: Some(CONTAINER_ID.into()),
            ..Default::default()
        });
        doc.append(container, ElementProps { id: Some(KEYS_ID.into()), ..Default::default() });
        doc.append(container, ElementProps {
            id: Some(CLOSE_ID.into()),
            kind: ElementKind::Button,
            ..Default::default()
        });
        doc.append(doc.body(), ElementProps {
            id: Some(FAB_ID.into()),
            kind: ElementKind::Button,
            ..Default::default()
        });
    }

    fn setup() -> (Page, ElementId) {
        let mut doc = Document::new();
        mount(&mut doc);
        let name = doc.append(doc.body(), ElementProps {
            kind: ElementKind::Input,
            ..Default::default()
        });
        (Page::new(doc, KeyboardOptions::default()), name)
    }

    #[test]
    fn test_init_when_complete() {
        let (page, _) = setup();
        assert!(page.keyboard().is_some());
    }

    #[test]
    fn test_init_waits_for_ready() {
        let mut doc = Document::loading();
        mount(&mut doc);
        let mut page = Page::new(doc, KeyboardOptions::default());
        assert!(page.keyboard().is_none());

        page.document.finish_loading();
        page.pump();
        assert!(page.keyboard().is_some());
    }

    #[test]
    fn test_missing_targets_noop() {
        let mut doc = Document::new();
        let name = doc.append(doc.body(), ElementProps {
            kind: ElementKind::Input,
            ..Default::default()
        });
        let mut page = Page::new(doc, KeyboardOptions::default());

        assert!(page.keyboard().is_none());
        page.focus(name);
        assert!(!page.press(Key::Char('a')));
        assert_eq!(page.document.get(name).unwrap().value(), "");
    }

    #[test]
    fn test_tap_key_keeps_focus() {
        let (mut page, name) = setup();
        page.tap(name);
        page.type_keys(&["h", "o", "l", "a"]);

        assert_eq!(page.document.get(name).unwrap().value(), "hola");
        assert_eq!(page.document.active_element(), Some(name));
    }

    #[test]
    fn test_render_hidden_draws_nothing() {
        let (page, _) = setup();
        let mut out = Vec::new();
        assert!(page.render(&mut out, 80, (0, 0)).unwrap().is_none());
        assert!(out.is_empty());
    }

    #[test]
    fn test_render_and_pointer() {
        let (mut page, name) = setup();
        page.focus(name);

        let mut out = Vec::new();
        let layout = page.render(&mut out, 80, (0, 2)).unwrap().unwrap();
        assert_eq!(layout.rows, 5);
        assert!(String::from_utf8_lossy(&out).contains("Espacio"));

        let q = layout.rect(Key::Char('q')).unwrap().clone();
        assert_eq!(page.pointer_at(80, q.x, q.y).unwrap(), Some(Key::Char('q')));
        assert_eq!(page.document.get(name).unwrap().value(), "q");
    }
}
