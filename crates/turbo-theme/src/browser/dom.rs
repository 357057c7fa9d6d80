//! `web-sys` implementation of the document abstraction.

use std::any::Any;
use std::rc::Rc;

use turbo_theme_core::dom::{
    Document, DomEvent, Element, EventKind, IntersectionCallback, IntersectionOptions, Listener,
    Node, ObserveAction, Selector,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// A live DOM element.
#[derive(Debug, Clone)]
pub struct WebElement {
    inner: web_sys::Element,
}

impl WebElement {
    pub fn wrap(inner: web_sys::Element) -> Element {
        Rc::new(Self { inner })
    }

    pub fn raw(&self) -> &web_sys::Element {
        &self.inner
    }
}

impl Node for WebElement {
    fn tag(&self) -> String {
        self.inner.tag_name().to_ascii_lowercase()
    }

    fn add_class(&self, class: &str) {
        let _ = self.inner.class_list().add_1(class);
    }

    fn remove_class(&self, class: &str) {
        let _ = self.inner.class_list().remove_1(class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.inner.class_list().contains(class)
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.inner.get_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        let _ = self.inner.set_attribute(name, value);
    }

    fn set_text(&self, text: &str) {
        self.inner.set_text_content(Some(text));
    }

    fn text(&self) -> String {
        self.inner.text_content().unwrap_or_default()
    }

    fn set_inner_html(&self, html: &str) {
        self.inner.set_inner_html(html);
    }

    fn inner_html(&self) -> String {
        self.inner.inner_html()
    }

    fn value(&self) -> String {
        match self.inner.dyn_ref::<web_sys::HtmlInputElement>() {
            Some(input) => input.value(),
            None => self.attribute("value").unwrap_or_default(),
        }
    }

    fn set_value(&self, value: &str) {
        match self.inner.dyn_ref::<web_sys::HtmlInputElement>() {
            Some(input) => input.set_value(value),
            None => self.set_attribute("value", value),
        }
    }

    fn set_disabled(&self, disabled: bool) {
        let _ = self.inner.toggle_attribute_with_force("disabled", disabled);
    }

    fn is_disabled(&self) -> bool {
        self.inner.has_attribute("disabled")
    }

    fn focus(&self) {
        if let Some(element) = self.inner.dyn_ref::<web_sys::HtmlElement>() {
            let _ = element.focus();
        }
    }

    fn query(&self, selector: &Selector) -> Option<Element> {
        self.inner
            .query_selector(&selector.to_css())
            .ok()
            .flatten()
            .map(WebElement::wrap)
    }

    fn query_all(&self, selector: &Selector) -> Vec<Element> {
        self.inner
            .query_selector_all(&selector.to_css())
            .map(collect_elements)
            .unwrap_or_default()
    }

    fn closest(&self, selector: &Selector) -> Option<Element> {
        self.inner
            .closest(&selector.to_css())
            .ok()
            .flatten()
            .map(WebElement::wrap)
    }

    fn append_child(&self, child: &Element) {
        if let Some(child) = child.as_any().downcast_ref::<WebElement>() {
            let _ = self.inner.append_child(&child.inner);
        }
    }

    fn remove(&self) {
        self.inner.remove();
    }

    fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    fn form_value(&self, name: &str) -> Option<String> {
        let form = self.inner.dyn_ref::<web_sys::HtmlFormElement>()?;
        web_sys::FormData::new_with_form(form)
            .ok()?
            .get(name)
            .as_string()
    }

    fn add_listener(&self, kind: EventKind, listener: Listener) {
        listen(self.inner.as_ref(), kind, listener);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The page document.
#[derive(Debug, Clone)]
pub struct WebDocument {
    document: web_sys::Document,
}

impl WebDocument {
    pub fn new(document: web_sys::Document) -> Self {
        Self { document }
    }

    pub fn raw(&self) -> &web_sys::Document {
        &self.document
    }
}

impl Document for WebDocument {
    fn body(&self) -> Option<Element> {
        self.document.body().map(|body| WebElement::wrap(body.into()))
    }

    fn query(&self, selector: &Selector) -> Option<Element> {
        self.document
            .query_selector(&selector.to_css())
            .ok()
            .flatten()
            .map(WebElement::wrap)
    }

    fn query_all(&self, selector: &Selector) -> Vec<Element> {
        self.document
            .query_selector_all(&selector.to_css())
            .map(collect_elements)
            .unwrap_or_default()
    }

    fn create_element(&self, tag: &str) -> Option<Element> {
        self.document.create_element(tag).ok().map(WebElement::wrap)
    }

    fn add_listener(&self, kind: EventKind, listener: Listener) {
        listen(self.document.as_ref(), kind, listener);
    }

    fn observe_intersection(
        &self,
        targets: &[Element],
        options: &IntersectionOptions,
        callback: IntersectionCallback,
    ) {
        let handler = Closure::<dyn FnMut(js_sys::Array, web_sys::IntersectionObserver)>::new(
            move |entries: js_sys::Array, observer: web_sys::IntersectionObserver| {
                for entry in entries.iter() {
                    let Ok(entry) = entry.dyn_into::<web_sys::IntersectionObserverEntry>() else {
                        continue;
                    };
                    if !entry.is_intersecting() {
                        continue;
                    }
                    let target = entry.target();
                    if callback(&WebElement::wrap(target.clone())) == ObserveAction::Unobserve {
                        observer.unobserve(&target);
                    }
                }
            },
        );

        let init = web_sys::IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin);

        let Ok(observer) =
            web_sys::IntersectionObserver::new_with_options(handler.as_ref().unchecked_ref(), &init)
        else {
            return;
        };
        for target in targets {
            if let Some(target) = target.as_any().downcast_ref::<WebElement>() {
                observer.observe(&target.inner);
            }
        }
        // The observer lives as long as the page.
        handler.forget();
    }
}

fn collect_elements(list: web_sys::NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
        .map(WebElement::wrap)
        .collect()
}

/// Attach `listener` for the page lifetime, translating the browser event
/// and carrying `preventDefault` back.
fn listen(target: &web_sys::EventTarget, kind: EventKind, listener: Listener) {
    let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
        let origin = event
            .target()
            .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
            .map(WebElement::wrap);
        let mut translated = DomEvent::new(kind, origin);
        if let Some(keyboard) = event.dyn_ref::<web_sys::KeyboardEvent>() {
            translated = translated.with_key(keyboard.key());
        }

        listener(&translated);

        if translated.is_default_prevented() {
            event.prevent_default();
        }
    });

    let _ = target.add_event_listener_with_callback(kind.as_str(), callback.as_ref().unchecked_ref());
    callback.forget();
}
