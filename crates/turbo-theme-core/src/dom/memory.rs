//! In-memory document.
//!
//! A small element tree with classes, attributes, listeners, bubbling
//! dispatch, focus tracking and simulated visibility. Markup passed to
//! `set_inner_html` is stored verbatim and not parsed into child elements.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use super::{
    same_node, DomEvent, Element, EventKind, IntersectionCallback, IntersectionOptions, Listener,
    Node, ObserveAction, Selector,
};

struct Observation {
    options: IntersectionOptions,
    targets: Vec<Element>,
    callback: IntersectionCallback,
}

struct DocState {
    body: Rc<MemoryNode>,
    focused: RefCell<Option<Weak<MemoryNode>>>,
    listeners: RefCell<Vec<(EventKind, Listener)>>,
    observations: RefCell<Vec<Observation>>,
}

/// Element of a [`MemoryDocument`].
pub struct MemoryNode {
    tag: String,
    attributes: RefCell<BTreeMap<String, String>>,
    classes: RefCell<Vec<String>>,
    text: RefCell<String>,
    html: RefCell<String>,
    value: RefCell<Option<String>>,
    disabled: Cell<bool>,
    children: RefCell<Vec<Rc<MemoryNode>>>,
    parent: RefCell<Weak<MemoryNode>>,
    listeners: RefCell<Vec<(EventKind, Listener)>>,
    doc: Weak<DocState>,
    this: Weak<MemoryNode>,
}

impl MemoryNode {
    fn new(doc: Weak<DocState>, tag: &str) -> Rc<Self> {
        Rc::new_cyclic(|this| MemoryNode {
            tag: tag.to_ascii_lowercase(),
            attributes: RefCell::new(BTreeMap::new()),
            classes: RefCell::new(Vec::new()),
            text: RefCell::new(String::new()),
            html: RefCell::new(String::new()),
            value: RefCell::new(None),
            disabled: Cell::new(false),
            children: RefCell::new(Vec::new()),
            parent: RefCell::new(Weak::new()),
            listeners: RefCell::new(Vec::new()),
            doc,
            this: this.clone(),
        })
    }

    fn handle(&self) -> Option<Rc<MemoryNode>> {
        self.this.upgrade()
    }

    fn element(&self) -> Option<Element> {
        self.handle().map(|rc| rc as Element)
    }

    fn parent_node(&self) -> Option<Rc<MemoryNode>> {
        self.parent.borrow().upgrade()
    }

    fn matches(&self, selector: &Selector) -> bool {
        match selector {
            Selector::Id(id) => self.attribute("id").as_deref() == Some(id.as_str()),
            Selector::Class(class) => self.has_class(class),
            Selector::Attribute(name) => self.attributes.borrow().contains_key(name),
            Selector::Tag(tag) => self.tag.eq_ignore_ascii_case(tag),
            Selector::SubmitButton => {
                self.tag == "button" && self.attribute("type").as_deref() == Some("submit")
            }
            Selector::Focusable => {
                matches!(
                    self.tag.as_str(),
                    "button" | "input" | "select" | "textarea"
                ) || self.attributes.borrow().contains_key("href")
                    || self
                        .attribute("tabindex")
                        .and_then(|t| t.trim().parse::<i32>().ok())
                        .is_some_and(|t| t >= 0)
            }
        }
    }

    /// Pre-order walk over descendants, excluding `self`.
    fn descendants(&self) -> Vec<Rc<MemoryNode>> {
        let mut out = Vec::new();
        for child in self.children.borrow().iter() {
            out.push(Rc::clone(child));
            out.extend(child.descendants());
        }
        out
    }

    fn detach(&self) {
        if let Some(parent) = self.parent_node() {
            parent
                .children
                .borrow_mut()
                .retain(|c| !std::ptr::eq(Rc::as_ptr(c), self));
        }
        *self.parent.borrow_mut() = Weak::new();
    }

    fn clear_children(&self) {
        let children: Vec<_> = self.children.borrow_mut().drain(..).collect();
        for child in children {
            *child.parent.borrow_mut() = Weak::new();
        }
    }

    fn listeners_for(&self, kind: EventKind) -> Vec<Listener> {
        self.listeners
            .borrow()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, l)| Rc::clone(l))
            .collect()
    }
}

impl Node for MemoryNode {
    fn tag(&self) -> String {
        self.tag.clone()
    }

    fn add_class(&self, class: &str) {
        let mut classes = self.classes.borrow_mut();
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    fn remove_class(&self, class: &str) {
        self.classes.borrow_mut().retain(|c| c != class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.borrow().iter().any(|c| c == class)
    }

    fn attribute(&self, name: &str) -> Option<String> {
        if name == "class" {
            let classes = self.classes.borrow();
            return (!classes.is_empty()).then(|| classes.join(" "));
        }
        self.attributes.borrow().get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        if name == "class" {
            *self.classes.borrow_mut() = Vec::new();
            self.add_classes(value);
            return;
        }
        self.attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }

    fn set_text(&self, text: &str) {
        self.clear_children();
        *self.text.borrow_mut() = text.to_string();
        *self.html.borrow_mut() = super::escape_html(text);
    }

    fn text(&self) -> String {
        let own = self.text.borrow().clone();
        let children: String = self.children.borrow().iter().map(|c| c.text()).collect();
        own + &children
    }

    fn set_inner_html(&self, html: &str) {
        self.clear_children();
        *self.html.borrow_mut() = html.to_string();
        *self.text.borrow_mut() = strip_tags(html);
    }

    fn inner_html(&self) -> String {
        self.html.borrow().clone()
    }

    fn value(&self) -> String {
        self.value
            .borrow()
            .clone()
            .or_else(|| self.attribute("value"))
            .unwrap_or_default()
    }

    fn set_value(&self, value: &str) {
        *self.value.borrow_mut() = Some(value.to_string());
    }

    fn set_disabled(&self, disabled: bool) {
        self.disabled.set(disabled);
    }

    fn is_disabled(&self) -> bool {
        self.disabled.get()
    }

    fn focus(&self) {
        if let Some(doc) = self.doc.upgrade() {
            *doc.focused.borrow_mut() = Some(self.this.clone());
        }
        if let Some(me) = self.element() {
            let event = DomEvent::new(EventKind::Focus, Some(me));
            for listener in self.listeners_for(EventKind::Focus) {
                listener(&event);
            }
        }
    }

    fn query(&self, selector: &Selector) -> Option<Element> {
        self.descendants()
            .into_iter()
            .find(|n| n.matches(selector))
            .map(|n| n as Element)
    }

    fn query_all(&self, selector: &Selector) -> Vec<Element> {
        self.descendants()
            .into_iter()
            .filter(|n| n.matches(selector))
            .map(|n| n as Element)
            .collect()
    }

    fn closest(&self, selector: &Selector) -> Option<Element> {
        let mut current = self.handle();
        while let Some(node) = current {
            if node.matches(selector) {
                return Some(node as Element);
            }
            current = node.parent_node();
        }
        None
    }

    fn append_child(&self, child: &Element) {
        let Some(child) = child
            .as_any()
            .downcast_ref::<MemoryNode>()
            .and_then(MemoryNode::handle)
        else {
            return;
        };
        child.detach();
        *child.parent.borrow_mut() = self.this.clone();
        self.children.borrow_mut().push(child);
    }

    fn remove(&self) {
        self.detach();
    }

    fn is_connected(&self) -> bool {
        let Some(doc) = self.doc.upgrade() else {
            return false;
        };
        let mut current = self.handle();
        while let Some(node) = current {
            if Rc::ptr_eq(&node, &doc.body) {
                return true;
            }
            current = node.parent_node();
        }
        false
    }

    fn form_value(&self, name: &str) -> Option<String> {
        self.descendants()
            .into_iter()
            .find(|n| n.attribute("name").as_deref() == Some(name) && !n.is_disabled())
            .map(|n| n.value())
    }

    fn add_listener(&self, kind: EventKind, listener: Listener) {
        self.listeners.borrow_mut().push((kind, listener));
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for MemoryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryNode")
            .field("tag", &self.tag)
            .field("id", &self.attributes.borrow().get("id"))
            .field("classes", &self.classes.borrow())
            .field("children", &self.children.borrow().len())
            .finish()
    }
}

/// In-memory [`Document`](super::Document) with helpers to drive it.
#[derive(Clone)]
pub struct MemoryDocument {
    state: Rc<DocState>,
}

impl MemoryDocument {
    /// Create a document holding an empty `<body>`.
    pub fn new() -> Self {
        let state = Rc::new_cyclic(|doc: &Weak<DocState>| DocState {
            body: MemoryNode::new(doc.clone(), "body"),
            focused: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            observations: RefCell::new(Vec::new()),
        });
        Self { state }
    }

    /// Create an element with the given id and append it to `parent`.
    pub fn append(&self, parent: &Element, tag: &str, id: Option<&str>) -> Element {
        let element = MemoryNode::new(Rc::downgrade(&self.state), tag) as Element;
        if let Some(id) = id {
            element.set_attribute("id", id);
        }
        parent.append_child(&element);
        element
    }

    /// The `<body>` element.
    pub fn body_element(&self) -> Element {
        Rc::clone(&self.state.body) as Element
    }

    /// Dispatch a bubbling event at `target`: target, ancestors, then document
    /// listeners. Returns the event so callers can inspect `preventDefault`.
    pub fn dispatch(&self, target: &Element, kind: EventKind) -> DomEvent {
        self.dispatch_event(target, DomEvent::new(kind, Some(Rc::clone(target))))
    }

    fn dispatch_event(&self, target: &Element, event: DomEvent) -> DomEvent {
        let mut path: Vec<Rc<MemoryNode>> = Vec::new();
        let mut current = target
            .as_any()
            .downcast_ref::<MemoryNode>()
            .and_then(MemoryNode::handle);
        while let Some(node) = current {
            current = node.parent_node();
            path.push(node);
        }

        let connected = path
            .last()
            .is_some_and(|root| Rc::ptr_eq(root, &self.state.body));

        for node in &path {
            for listener in node.listeners_for(event.kind()) {
                listener(&event);
            }
        }

        if connected {
            let listeners: Vec<Listener> = self
                .state
                .listeners
                .borrow()
                .iter()
                .filter(|(k, _)| *k == event.kind())
                .map(|(_, l)| Rc::clone(l))
                .collect();
            for listener in listeners {
                listener(&event);
            }
        }

        event
    }

    /// Click an element.
    pub fn click(&self, target: &Element) -> DomEvent {
        self.dispatch(target, EventKind::Click)
    }

    /// Submit a form.
    pub fn submit(&self, form: &Element) -> DomEvent {
        self.dispatch(form, EventKind::Submit)
    }

    /// Set an input's value and fire `input` on it.
    pub fn type_into(&self, input: &Element, value: &str) -> DomEvent {
        input.set_value(value);
        self.dispatch(input, EventKind::Input)
    }

    /// Press a key. The event targets the focused element, or the body.
    pub fn press_key(&self, key: &str) -> DomEvent {
        let target = self.focused().unwrap_or_else(|| self.body_element());
        let event = DomEvent::new(EventKind::KeyDown, Some(Rc::clone(&target))).with_key(key);
        self.dispatch_event(&target, event)
    }

    /// Element that last received focus.
    pub fn focused(&self) -> Option<Element> {
        self.state
            .focused
            .borrow()
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|n| n as Element)
    }

    /// Report `ratio` of `target` as visible to every observation watching it.
    pub fn set_visibility(&self, target: &Element, ratio: f64) {
        let hits: Vec<(IntersectionCallback, usize)> = self
            .state
            .observations
            .borrow()
            .iter()
            .enumerate()
            .filter(|(_, o)| {
                ratio > 0.0
                    && ratio >= o.options.threshold
                    && o.targets.iter().any(|t| same_node(t, target))
            })
            .map(|(i, o)| (Rc::clone(&o.callback), i))
            .collect();

        for (callback, index) in hits {
            if callback(target) == ObserveAction::Unobserve {
                if let Some(observation) = self.state.observations.borrow_mut().get_mut(index) {
                    observation.targets.retain(|t| !same_node(t, target));
                }
            }
        }
    }

    /// Number of elements still observed across all observations.
    pub fn observed_count(&self) -> usize {
        self.state
            .observations
            .borrow()
            .iter()
            .map(|o| o.targets.len())
            .sum()
    }

    /// Options of every registered observation.
    pub fn observation_options(&self) -> Vec<IntersectionOptions> {
        self.state
            .observations
            .borrow()
            .iter()
            .map(|o| o.options.clone())
            .collect()
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDocument")
            .field("body", &self.state.body)
            .field("listeners", &self.state.listeners.borrow().len())
            .finish()
    }
}

impl super::Document for MemoryDocument {
    fn body(&self) -> Option<Element> {
        Some(self.body_element())
    }

    fn query(&self, selector: &Selector) -> Option<Element> {
        if self.state.body.matches(selector) {
            return Some(self.body_element());
        }
        self.state.body.query(selector)
    }

    fn query_all(&self, selector: &Selector) -> Vec<Element> {
        let mut out = Vec::new();
        if self.state.body.matches(selector) {
            out.push(self.body_element());
        }
        out.extend(self.state.body.query_all(selector));
        out
    }

    fn create_element(&self, tag: &str) -> Option<Element> {
        Some(MemoryNode::new(Rc::downgrade(&self.state), tag) as Element)
    }

    fn add_listener(&self, kind: EventKind, listener: Listener) {
        self.state.listeners.borrow_mut().push((kind, listener));
    }

    fn observe_intersection(
        &self,
        targets: &[Element],
        options: &IntersectionOptions,
        callback: IntersectionCallback,
    ) {
        self.state.observations.borrow_mut().push(Observation {
            options: options.clone(),
            targets: targets.to_vec(),
            callback,
        });
    }
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    #[test]
    fn test_query_and_closest() {
        let doc = MemoryDocument::new();
        let body = doc.body_element();
        let container = doc.append(&body, "div", None);
        container.add_class("search-container");
        let input = doc.append(&container, "input", Some("search-input"));

        let found = doc.query(&Selector::id("search-input")).unwrap();
        assert!(same_node(&found, &input));
        assert!(input.closest(&Selector::class("search-container")).is_some());
        assert!(body.closest(&Selector::class("search-container")).is_none());
    }

    #[test]
    fn test_classes_and_attributes() {
        let doc = MemoryDocument::new();
        let el = doc.create_element("DIV").unwrap();
        assert_eq!(el.tag(), "div");

        el.add_classes("a b  c");
        el.add_class("a");
        assert_eq!(el.attribute("class").as_deref(), Some("a b c"));

        el.remove_classes("a c");
        assert!(el.has_class("b"));
        assert!(!el.has_class("a"));

        el.set_attribute("class", "x y");
        assert!(el.has_class("x") && el.has_class("y") && !el.has_class("b"));
    }

    #[test]
    fn test_focusable_matching() {
        let doc = MemoryDocument::new();
        let body = doc.body_element();
        let skipped = doc.append(&body, "div", None);
        skipped.set_attribute("tabindex", "-1");
        let plain = doc.append(&body, "span", None);
        let link = doc.append(&body, "a", None);
        link.set_attribute("href", "/cart");

        let _ = plain;
        let first = body.query(&Selector::Focusable).unwrap();
        assert!(same_node(&first, &link));

        let tabbed = doc.append(&body, "div", None);
        tabbed.set_attribute("tabindex", "0");
        assert_eq!(body.query_all(&Selector::Focusable).len(), 2);
    }

    #[test]
    fn test_dispatch_bubbles_to_document() {
        let doc = MemoryDocument::new();
        let body = doc.body_element();
        let form = doc.append(&body, "form", None);
        let button = doc.append(&form, "button", None);

        let order = Rc::new(RefCell::new(Vec::new()));
        let o = Rc::clone(&order);
        form.add_listener(EventKind::Click, Rc::new(move |_| o.borrow_mut().push("form")));
        let o = Rc::clone(&order);
        doc.add_listener(
            EventKind::Click,
            Rc::new(move |e| {
                o.borrow_mut().push("document");
                e.prevent_default();
            }),
        );

        let event = doc.click(&button);
        assert_eq!(*order.borrow(), vec!["form", "document"]);
        assert!(event.is_default_prevented());
    }

    #[test]
    fn test_detached_elements_do_not_reach_document() {
        let doc = MemoryDocument::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        doc.add_listener(EventKind::Click, Rc::new(move |_| h.set(h.get() + 1)));

        let detached = doc.create_element("div").unwrap();
        doc.click(&detached);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn test_remove_and_connected() {
        let doc = MemoryDocument::new();
        let body = doc.body_element();
        let child = doc.append(&body, "div", None);
        assert!(child.is_connected());

        child.remove();
        assert!(!child.is_connected());
        assert!(body.query(&Selector::tag("div")).is_none());
        child.remove();
    }

    #[test]
    fn test_text_and_html() {
        let doc = MemoryDocument::new();
        let el = doc.create_element("button").unwrap();
        el.set_inner_html(r#"<span class="spinner"></span> Adding..."#);
        assert_eq!(el.text(), " Adding...");

        el.set_text("a < b");
        assert_eq!(el.inner_html(), "a &lt; b");
        assert_eq!(el.text(), "a < b");
    }

    #[test]
    fn test_form_value() {
        let doc = MemoryDocument::new();
        let form = doc.create_element("form").unwrap();
        let id = doc.create_element("input").unwrap();
        id.set_attribute("name", "id");
        id.set_attribute("value", "42");
        form.append_child(&id);

        assert_eq!(form.form_value("id").as_deref(), Some("42"));
        id.set_value("43");
        assert_eq!(form.form_value("id").as_deref(), Some("43"));
        assert_eq!(form.form_value("quantity"), None);
    }

    #[test]
    fn test_press_key_targets_focus() {
        let doc = MemoryDocument::new();
        let body = doc.body_element();
        let input = doc.append(&body, "input", None);
        input.focus();

        let seen = Rc::new(RefCell::new(None));
        let s = Rc::clone(&seen);
        doc.add_listener(
            EventKind::KeyDown,
            Rc::new(move |e| *s.borrow_mut() = e.key().map(str::to_string)),
        );

        let event = doc.press_key("Escape");
        assert!(same_node(event.target().unwrap(), &input));
        assert_eq!(seen.borrow().as_deref(), Some("Escape"));
    }

    #[test]
    fn test_visibility_threshold_and_unobserve() {
        let doc = MemoryDocument::new();
        let body = doc.body_element();
        let el = doc.append(&body, "section", None);
        let hits = Rc::new(Cell::new(0));

        let h = Rc::clone(&hits);
        doc.observe_intersection(
            &[Rc::clone(&el)],
            &IntersectionOptions {
                threshold: 0.1,
                root_margin: "0px".to_string(),
            },
            Rc::new(move |_| {
                h.set(h.get() + 1);
                ObserveAction::Unobserve
            }),
        );

        doc.set_visibility(&el, 0.05);
        assert_eq!(hits.get(), 0);
        doc.set_visibility(&el, 0.5);
        doc.set_visibility(&el, 1.0);
        assert_eq!(hits.get(), 1);
        assert_eq!(doc.observed_count(), 0);
    }
}
