//! Document abstraction the theme components are written against.
//!
//! Components never touch a concrete DOM. They receive [`Element`] handles
//! and a [`Document`], which the browser backend implements over `web-sys`
//! and [`MemoryDocument`] implements in plain Rust for tests.

mod memory;
mod selector;

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

pub use memory::{MemoryDocument, MemoryNode};
pub use selector::Selector;

/// Shared handle to a document element.
pub type Element = Rc<dyn Node>;

/// Callback attached to an element or the document.
pub type Listener = Rc<dyn Fn(&DomEvent)>;

/// Callback for an element crossing the observation threshold.
pub type IntersectionCallback = Rc<dyn Fn(&Element) -> ObserveAction>;

/// Class names, ids and attributes the storefront markup provides.
pub mod markup {
    pub const CART_DRAWER_ID: &str = "cart-drawer";
    pub const CART_DRAWER_OVERLAY_ID: &str = "cart-drawer-overlay";
    pub const CART_DRAWER_OPEN_ATTR: &str = "data-cart-drawer-open";
    pub const CART_DRAWER_CLOSE_ATTR: &str = "data-cart-drawer-close";
    pub const DRAWER_OPEN_CLASS: &str = "is-open";
    pub const BODY_DRAWER_OPEN_CLASS: &str = "cart-drawer-open";

    pub const CART_COUNT_ATTR: &str = "data-cart-count";
    pub const QUICK_ADD_FORM_CLASS: &str = "quick-add-form";
    pub const QUICK_ADD_BUTTON_CLASS: &str = "quick-add-btn";

    pub const SEARCH_INPUT_ID: &str = "search-input";
    pub const SEARCH_RESULTS_ID: &str = "search-results";
    pub const SEARCH_CONTAINER_CLASS: &str = "search-container";
    pub const HIDDEN_CLASS: &str = "hidden";

    pub const REVEAL_ATTR: &str = "data-reveal";
    pub const ANIMATIONS_ENABLED_ATTR: &str = "data-animations-enabled";

    pub const NOTIFICATION_CONTAINER_ID: &str = "notification-container";
}

/// DOM events the components listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Submit,
    Input,
    Focus,
    KeyDown,
}

impl EventKind {
    /// DOM event type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::Submit => "submit",
            EventKind::Input => "input",
            EventKind::Focus => "focus",
            EventKind::KeyDown => "keydown",
        }
    }
}

/// An event delivered to a [`Listener`].
#[derive(Debug)]
pub struct DomEvent {
    kind: EventKind,
    target: Option<Element>,
    key: Option<String>,
    default_prevented: Cell<bool>,
}

impl DomEvent {
    pub fn new(kind: EventKind, target: Option<Element>) -> Self {
        Self {
            kind,
            target,
            key: None,
            default_prevented: Cell::new(false),
        }
    }

    /// Attach the `key` of a keyboard event.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn target(&self) -> Option<&Element> {
        self.target.as_ref()
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Suppress the browser's default action. Backends apply it after the
    /// listener returns.
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

/// Options for visibility observation.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionOptions {
    /// Fraction of the element that must be visible.
    pub threshold: f64,
    /// CSS margin applied to the viewport box.
    pub root_margin: String,
}

/// What an intersection callback wants done with the element afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserveAction {
    Keep,
    Unobserve,
}

/// A document element.
pub trait Node: fmt::Debug {
    /// Lowercase tag name.
    fn tag(&self) -> String;

    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
    fn has_class(&self, class: &str) -> bool;

    fn attribute(&self, name: &str) -> Option<String>;
    fn set_attribute(&self, name: &str, value: &str);

    /// Replace the content with plain text.
    fn set_text(&self, text: &str);
    fn text(&self) -> String;
    /// Replace the content with markup.
    fn set_inner_html(&self, html: &str);
    fn inner_html(&self) -> String;

    /// Current value of a form control.
    fn value(&self) -> String;
    fn set_value(&self, value: &str);

    fn set_disabled(&self, disabled: bool);
    fn is_disabled(&self) -> bool;

    fn focus(&self);

    /// First matching descendant.
    fn query(&self, selector: &Selector) -> Option<Element>;
    /// Every matching descendant, in document order.
    fn query_all(&self, selector: &Selector) -> Vec<Element>;
    /// Nearest inclusive ancestor matching the selector.
    fn closest(&self, selector: &Selector) -> Option<Element>;

    fn append_child(&self, child: &Element);
    /// Detach from the parent. No effect on detached elements.
    fn remove(&self);
    /// Whether the element is attached to its document.
    fn is_connected(&self) -> bool;

    /// Value of the named control, as `FormData.get` sees it on a form.
    fn form_value(&self, name: &str) -> Option<String>;

    fn add_listener(&self, kind: EventKind, listener: Listener);

    fn as_any(&self) -> &dyn Any;

    /// Add every whitespace-separated class in `classes`.
    fn add_classes(&self, classes: &str) {
        for class in classes.split_whitespace() {
            self.add_class(class);
        }
    }

    /// Remove every whitespace-separated class in `classes`.
    fn remove_classes(&self, classes: &str) {
        for class in classes.split_whitespace() {
            self.remove_class(class);
        }
    }
}

/// The page document.
pub trait Document {
    fn body(&self) -> Option<Element>;
    fn query(&self, selector: &Selector) -> Option<Element>;
    fn query_all(&self, selector: &Selector) -> Vec<Element>;
    /// Create a detached element. `None` if the backend rejects the tag.
    fn create_element(&self, tag: &str) -> Option<Element>;
    /// Listen at the document level; bubbling events from every element arrive here.
    fn add_listener(&self, kind: EventKind, listener: Listener);
    /// Watch `targets` and call `callback` when one becomes visible.
    fn observe_intersection(
        &self,
        targets: &[Element],
        options: &IntersectionOptions,
        callback: IntersectionCallback,
    );
}

/// Identity comparison of two element handles.
pub fn same_node(a: &Element, b: &Element) -> bool {
    std::ptr::eq(
        Rc::as_ptr(a) as *const (),
        Rc::as_ptr(b) as *const (),
    )
}

/// Escape text for interpolation into markup or attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
