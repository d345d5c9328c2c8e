//! End-to-end keyboard scenarios against a page model.
//!
//! Each test builds a page with the keyboard's render targets, drives it
//! through host events only (taps, focus, blur) and checks field values.

use std::cell::RefCell;
use std::rc::Rc;

use spark_signals::effect;
use spark_vkeyboard::state::{CLOSE_ID, CONTAINER_ID, FAB_ID, KEYS_ID, TOGGLE_LAYOUT_ID};
use spark_vkeyboard::{
    Document, ElementId, ElementKind, ElementProps, InputType, Key, KeyboardOptions, LayoutName,
    Page, PageEvent,
};

// =============================================================================
// FIXTURE
// =============================================================================

fn mount_targets(doc: &mut Document) {
    let container = doc.append(doc.body(), ElementProps {
        id: Some(CONTAINER_ID.into()),
        ..Default::default()
    });
    doc.append(container, ElementProps { id: Some(KEYS_ID.into()), ..Default::default() });
    doc.append(container, ElementProps {
        id: Some(TOGGLE_LAYOUT_ID.into()),
        kind: ElementKind::Button,
        ..Default::default()
    });
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

struct Fields {
    name: ElementId,
    qty: ElementId,
    email: ElementId,
    notes: ElementId,
    para: ElementId,
    form: ElementId,
    search: ElementId,
}

fn page_with(options: KeyboardOptions) -> (Page, Fields) {
    let mut doc = Document::new();
    mount_targets(&mut doc);
    let body = doc.body();

    let name = doc.append(body, ElementProps {
        kind: ElementKind::Input,
        id: Some("name".into()),
        ..Default::default()
    });
    let qty = doc.append(body, ElementProps {
        kind: ElementKind::Input,
        id: Some("qty".into()),
        input_type: Some("number".into()),
        ..Default::default()
    });
    let email = doc.append(body, ElementProps {
        kind: ElementKind::Input,
        id: Some("email_address".into()),
        ..Default::default()
    });
    let notes = doc.append(body, ElementProps {
        kind: ElementKind::TextArea,
        ..Default::default()
    });
    let para = doc.append(body, ElementProps {
        kind: ElementKind::Paragraph,
        value: "Terms".into(),
        ..Default::default()
    });
    let form = doc.append(body, ElementProps { kind: ElementKind::Form, ..Default::default() });
    let search = doc.append(form, ElementProps {
        kind: ElementKind::Input,
        input_type: Some("search".into()),
        ..Default::default()
    });

    let page = Page::new(doc, options);
    (page, Fields { name, qty, email, notes, para, form, search })
}

fn page() -> (Page, Fields) {
    page_with(KeyboardOptions::default())
}

fn value(page: &Page, id: ElementId) -> String {
    page.document.get(id).unwrap().value().to_string()
}

fn layout(page: &Page) -> LayoutName {
    page.keyboard().unwrap().layout()
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn numeric_entry_then_blur_restores_type() {
    let (mut page, f) = page();
    page.tap(f.qty);
    assert_eq!(layout(&page), LayoutName::Numeric);
    assert_eq!(page.document.get(f.qty).unwrap().input_type(), InputType::Text);

    page.type_keys(&["7", "decimal", "5"]);
    assert_eq!(value(&page, f.qty), "7.5");

    page.blur();
    assert_eq!(value(&page, f.qty), "7.5");
    assert_eq!(page.document.get(f.qty).unwrap().input_type(), InputType::Number);
    assert!(page.document.get(f.qty).unwrap().data("vk-original-type").is_none());
    assert_eq!(page.keyboard().unwrap().active_element(), None);
}

#[test]
fn decimal_on_empty_field_prefixes_zero_once() {
    let (mut page, f) = page();
    page.tap(f.qty);
    page.type_keys(&["decimal", "decimal", "2"]);
    assert_eq!(value(&page, f.qty), "0.2");
}

#[test]
fn sign_toggles_leading_minus() {
    let (mut page, f) = page();
    page.tap(f.qty);
    page.type_keys(&["4", "2", "sign"]);
    assert_eq!(value(&page, f.qty), "-42");
    page.type_keys(&["sign"]);
    assert_eq!(value(&page, f.qty), "42");
}

#[test]
fn email_field_offers_at_and_underscore() {
    let (mut page, f) = page();
    page.tap(f.email);
    assert_eq!(layout(&page), LayoutName::AlphaEmail);

    page.type_keys(&["a", "_", "b", "@", "c"]);
    assert_eq!(value(&page, f.email), "a_b@c");
}

#[test]
fn email_option_off_uses_plain_alpha() {
    let (mut page, f) = page_with(KeyboardOptions { alpha_email: false, ..Default::default() });
    page.tap(f.email);
    assert_eq!(layout(&page), LayoutName::Alpha);
    assert!(!page.press(Key::Char('@')));
}

#[test]
fn outside_press_hides_and_fab_reopens() {
    let (mut page, f) = page();
    page.tap(f.name);
    assert!(page.keyboard().unwrap().is_visible());

    page.tap(f.para);
    assert!(!page.keyboard().unwrap().is_visible());

    let fab = page.keyboard().unwrap().elements().fab;
    assert!(!page.document.is_hidden(fab));
    page.dispatch(PageEvent::Click(fab));
    assert!(page.keyboard().unwrap().is_visible());
    assert!(page.document.is_hidden(fab));
}

#[test]
fn pressing_a_key_does_not_steal_focus() {
    let (mut page, f) = page();
    page.tap(f.name);
    page.type_keys(&["shift", "h", "shift", "i", "space", "1"]);

    assert_eq!(value(&page, f.name), "Hi 1");
    assert_eq!(page.document.active_element(), Some(f.name));
    assert_eq!(page.keyboard().unwrap().active_element(), Some(f.name));
}

#[test]
fn tapping_close_hides_and_releases_field() {
    let (mut page, f) = page();
    page.tap(f.qty);
    page.type_keys(&["3"]);
    let close = page.keyboard().unwrap().elements().close;
    page.tap(close);

    assert!(!page.keyboard().unwrap().is_visible());
    assert_eq!(page.document.active_element(), Some(close));
    assert_eq!(page.keyboard().unwrap().active_element(), None);
    assert_eq!(page.document.get(f.qty).unwrap().input_type(), InputType::Number);

    // Typing now has no target
    let fab = page.keyboard().unwrap().elements().fab;
    page.tap(fab);
    assert!(page.keyboard().unwrap().is_visible());
    page.type_keys(&["4"]);
    assert_eq!(value(&page, f.qty), "3");
}

#[test]
fn remembered_layout_carries_across_fields() {
    let (mut page, f) = page();
    page.tap(f.name);
    page.tap(f.qty);
    assert_eq!(layout(&page), LayoutName::Alpha);

    let (mut page, f) = page_with(KeyboardOptions { remember_layout: false, ..Default::default() });
    page.tap(f.name);
    page.tap(f.qty);
    assert_eq!(layout(&page), LayoutName::Numeric);
}

#[test]
fn toggle_control_switches_and_remembers() {
    let (mut page, f) = page();
    page.tap(f.name);

    let toggle = page.keyboard().unwrap().elements().toggle.unwrap();
    assert!(page.document.is_hidden(toggle));
    page.dispatch(PageEvent::Click(toggle));
    assert_eq!(layout(&page), LayoutName::Numeric);

    page.tap(f.notes);
    assert_eq!(layout(&page), LayoutName::Numeric);
}

#[test]
fn enter_submits_or_breaks_line() {
    let (mut page, f) = page();
    let submitted = Rc::new(RefCell::new(Vec::new()));
    let submitted_clone = submitted.clone();
    let stop = page.document.on_submit(move |form| submitted_clone.borrow_mut().push(form));

    page.tap(f.search);
    page.type_keys(&["enter"]);
    assert_eq!(page.document.submissions(f.form), 1);
    assert_eq!(*submitted.borrow(), vec![f.form]);
    stop();

    page.tap(f.notes);
    page.type_keys(&["a", "enter", "b"]);
    assert_eq!(value(&page, f.notes), "a\nb");

    page.tap(f.name);
    page.type_keys(&["enter"]);
    assert_eq!(value(&page, f.name), "");

    page.tap(f.search);
    page.type_keys(&["enter"]);
    assert_eq!(page.document.submissions(f.form), 2);
    assert_eq!(submitted.borrow().len(), 1);
}

#[test]
fn moving_between_fields_releases_numeric_edit() {
    let (mut page, f) = page();
    page.tap(f.qty);
    page.type_keys(&["decimal"]);
    page.tap(f.name);

    assert_eq!(page.document.get(f.qty).unwrap().input_type(), InputType::Number);
    assert_eq!(value(&page, f.qty), "0.");
    assert_eq!(page.keyboard().unwrap().active_element(), Some(f.name));
}

#[test]
fn missing_targets_leave_page_untouched() {
    let mut doc = Document::new();
    let name = doc.append(doc.body(), ElementProps {
        kind: ElementKind::Input,
        ..Default::default()
    });
    let mut page = Page::new(doc, KeyboardOptions::default());

    page.tap(name);
    page.type_keys(&["a"]);
    assert!(page.keyboard().is_none());
    assert_eq!(value(&page, name), "");
}

#[test]
fn loading_document_initializes_on_ready() {
    let mut doc = Document::loading();
    mount_targets(&mut doc);
    let name = doc.append(doc.body(), ElementProps {
        kind: ElementKind::Input,
        ..Default::default()
    });
    let mut page = Page::new(doc, KeyboardOptions::default());
    assert!(page.keyboard().is_none());

    page.document.finish_loading();
    page.pump();
    page.tap(name);
    page.type_keys(&["o", "k"]);
    assert_eq!(value(&page, name), "ok");
}

#[test]
fn input_listeners_see_every_edit() {
    let (mut page, f) = page();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_clone = seen.clone();
    let _cleanup = page.document.on_input(move |_, v| seen_clone.borrow_mut().push(v.to_string()));

    page.tap(f.name);
    page.type_keys(&["a", "b", "backspace"]);
    assert_eq!(*seen.borrow(), vec!["a", "ab", "a"]);
}

#[test]
fn visibility_signal_tracks_show_and_hide() {
    let (mut page, f) = page();
    let history = Rc::new(RefCell::new(Vec::new()));
    let history_clone = history.clone();
    let visible = page.keyboard().unwrap().visible_signal();
    let _stop = effect(move || history_clone.borrow_mut().push(visible.get()));

    page.tap(f.name);
    page.tap(f.para);
    assert_eq!(history.borrow().first(), Some(&false));
    assert_eq!(history.borrow().last(), Some(&false));
    assert!(history.borrow().contains(&true));
}
