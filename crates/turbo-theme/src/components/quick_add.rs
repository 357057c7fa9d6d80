//! One-click add-to-cart forms on product cards.

use std::rc::Rc;

use futures::FutureExt;
use turbo_theme_core::config::QuickAddConfig;
use turbo_theme_core::dom::{escape_html, markup, Document, Element, EventKind, Selector};
use turbo_theme_core::{CartAdded, CartError, EventBus, Executor};
use turbo_theme_data::{CartApi, CartLineRequest, FetchError};
use turbo_theme_observability::StructuredLogger;

use crate::{ThemeContext, ValidationError};

/// Handles every quick-add form on the page through one delegated `submit`
/// listener, so forms rendered after mount are covered too.
///
/// Outcomes are published as [`CartAdded`] or [`CartError`]; this component
/// never renders feedback itself.
pub struct QuickAddToCart {
    cart: CartApi,
    document: Rc<dyn Document>,
    bus: EventBus,
    executor: Rc<dyn Executor>,
    labels: QuickAddConfig,
    logger: StructuredLogger,
}

impl QuickAddToCart {
    pub fn mount(ctx: &ThemeContext) -> Rc<Self> {
        let this = Rc::new(Self {
            cart: ctx.cart_api(),
            document: Rc::clone(&ctx.document),
            bus: ctx.bus.clone(),
            executor: Rc::clone(&ctx.executor),
            labels: ctx.config.quick_add.clone(),
            logger: ctx.logger_for("quick-add"),
        });

        let weak = Rc::downgrade(&this);
        ctx.document.add_listener(
            EventKind::Submit,
            Rc::new(move |event| {
                let Some(form) = event.target() else {
                    return;
                };
                if !is_quick_add_form(form) {
                    return;
                }
                event.prevent_default();
                if let Some(this) = weak.upgrade() {
                    this.submit(Rc::clone(form));
                }
            }),
        );

        this
    }

    /// Start an add for `form`. Forms without a product id are ignored.
    pub fn submit(self: &Rc<Self>, form: Element) {
        let line = match line_from_form(&form) {
            Ok(line) => line,
            Err(err) => {
                self.logger
                    .debug_builder("submission ignored")
                    .field("reason", err.to_string())
                    .emit();
                return;
            }
        };

        let button = form.query(&Selector::SubmitButton);
        if let Some(button) = &button {
            self.set_loading(button, true);
        }

        let this = Rc::clone(self);
        self.executor
            .spawn(async move { this.add_to_cart(line, button).await }.boxed_local());
    }

    /// Send one line to the cart, publish the outcome and restore `button`.
    pub async fn add_to_cart(self: &Rc<Self>, line: CartLineRequest, button: Option<Element>) {
        self.logger
            .info_builder("adding to cart")
            .field("id", line.id.clone())
            .field_i64("quantity", i64::from(line.quantity))
            .emit();

        match self.cart.add(std::slice::from_ref(&line)).await {
            Ok(_) => {
                self.bus.publish(CartAdded {
                    message: self.labels.success_message.clone(),
                });
                let this = Rc::clone(self);
                self.executor
                    .spawn(async move { this.refresh_cart_count().await }.boxed_local());
            }
            Err(err) => {
                self.logger.error_with("Error adding to cart", &[("error", &err)]);
                let message = match shopper_message(&err) {
                    m if m.is_empty() => self.labels.error_fallback.clone(),
                    m => m,
                };
                self.bus.publish(CartError { message });
            }
        }

        if let Some(button) = &button {
            self.set_loading(button, false);
        }
    }

    /// Write the cart's item count into every `[data-cart-count]` element.
    pub async fn refresh_cart_count(&self) {
        match self.cart.get().await {
            Ok(cart) => {
                let count = cart.item_count.to_string();
                for badge in self
                    .document
                    .query_all(&Selector::attribute(markup::CART_COUNT_ATTR))
                {
                    badge.set_text(&count);
                }
            }
            Err(err) => self.logger.error_with("Error updating cart count", &[("error", &err)]),
        }
    }

    fn set_loading(&self, button: &Element, loading: bool) {
        button.set_disabled(loading);
        if loading {
            button.set_inner_html(&format!(
                r#"<span class="spinner"></span> {}"#,
                escape_html(&self.labels.loading_label)
            ));
        } else {
            button.set_text(&self.labels.idle_label);
        }
    }
}

/// A form is a quick-add form by class or by containing a quick-add button.
pub fn is_quick_add_form(form: &Element) -> bool {
    form.has_class(markup::QUICK_ADD_FORM_CLASS)
        || form
            .query(&Selector::class(markup::QUICK_ADD_BUTTON_CLASS))
            .is_some()
}

/// Read the `id` and `quantity` fields of a form.
pub fn line_from_form(form: &Element) -> Result<CartLineRequest, ValidationError> {
    let id = form
        .form_value("id")
        .filter(|id| !id.is_empty())
        .ok_or(ValidationError::MissingProductId)?;
    let quantity = parse_quantity(form.form_value("quantity").as_deref());
    Ok(CartLineRequest::new(id, quantity))
}

/// Leading-integer parse of a quantity field. Anything that does not yield
/// a positive integer becomes 1.
pub fn parse_quantity(raw: Option<&str>) -> u32 {
    let Some(raw) = raw.map(str::trim_start) else {
        return 1;
    };
    let (negative, rest) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let digits = &rest[..rest.bytes().take_while(u8::is_ascii_digit).count()];
    if negative || digits.is_empty() {
        return 1;
    }
    match digits.parse::<u32>() {
        Ok(0) => 1,
        Ok(n) => n,
        Err(_) => u32::MAX,
    }
}

fn shopper_message(err: &FetchError) -> String {
    match err {
        FetchError::Transport(message) => message.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use serde_json::json;
    use std::cell::RefCell;
    use turbo_theme_data::Method;

    struct Card {
        form: Element,
        id: Element,
        quantity: Element,
        button: Element,
    }

    fn card(h: &Harness, id: &str, quantity: Option<&str>) -> Card {
        let body = h.body();
        let form = h.add(&body, "form", None);
        form.add_class("quick-add-form");

        let id_input = h.add(&form, "input", None);
        id_input.set_attribute("name", "id");
        id_input.set_value(id);

        let qty = h.add(&form, "input", None);
        qty.set_attribute("name", "quantity");
        if let Some(q) = quantity {
            qty.set_value(q);
        } else {
            qty.set_disabled(true);
        }

        let button = h.add(&form, "button", None);
        button.set_attribute("type", "submit");
        button.set_text("Quick Add");

        Card {
            form,
            id: id_input,
            quantity: qty,
            button,
        }
    }

    fn record(h: &Harness) -> Rc<RefCell<Vec<String>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let added = Rc::clone(&seen);
        h.ctx
            .bus
            .subscribe(move |e: &CartAdded| added.borrow_mut().push(format!("added:{}", e.message)));
        let failed = Rc::clone(&seen);
        h.ctx
            .bus
            .subscribe(move |e: &CartError| failed.borrow_mut().push(format!("error:{}", e.message)));
        seen
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity(None), 1);
        assert_eq!(parse_quantity(Some("")), 1);
        assert_eq!(parse_quantity(Some("abc")), 1);
        assert_eq!(parse_quantity(Some("0")), 1);
        assert_eq!(parse_quantity(Some("-3")), 1);
        assert_eq!(parse_quantity(Some("3")), 3);
        assert_eq!(parse_quantity(Some(" 12 ")), 12);
        assert_eq!(parse_quantity(Some("4 pairs")), 4);
        assert_eq!(parse_quantity(Some("2.9")), 2);
        assert_eq!(parse_quantity(Some("+5")), 5);
    }

    #[test]
    fn test_form_detection() {
        let h = Harness::new();
        let body = h.body();

        let by_class = h.add(&body, "form", None);
        by_class.add_class("quick-add-form");
        assert!(is_quick_add_form(&by_class));

        let by_button = h.add(&body, "form", None);
        let btn = h.add(&by_button, "button", None);
        btn.add_class("quick-add-btn");
        assert!(is_quick_add_form(&by_button));

        let plain = h.add(&body, "form", None);
        assert!(!is_quick_add_form(&plain));
    }

    #[test]
    fn test_missing_id_is_silent() {
        let mut h = Harness::new();
        let c = card(&h, "", Some("2"));
        let seen = record(&h);
        let _quick_add = QuickAddToCart::mount(&h.ctx);

        let event = h.doc.submit(&c.form);
        h.run();

        assert!(event.is_default_prevented());
        assert!(h.transport.requests().is_empty());
        assert!(!c.button.is_disabled());
        assert_eq!(c.button.text(), "Quick Add");
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_other_forms_untouched() {
        let mut h = Harness::new();
        let body = h.body();
        let newsletter = h.add(&body, "form", None);
        let _quick_add = QuickAddToCart::mount(&h.ctx);

        let event = h.doc.submit(&newsletter);
        h.run();

        assert!(!event.is_default_prevented());
        assert!(h.transport.requests().is_empty());
    }

    #[test]
    fn test_successful_add_updates_counts() {
        let mut h = Harness::new();
        h.transport
            .respond(Method::Post, "/cart/add.js", 200, json!({"items": []}));
        h.transport
            .respond(Method::Get, "/cart.js", 200, json!({"item_count": 3}));
        let c = card(&h, "40123", None);
        let body = h.body();
        let header_badge = h.add(&body, "span", None);
        header_badge.set_attribute("data-cart-count", "");
        header_badge.set_text("0");
        let drawer_badge = h.add(&body, "span", None);
        drawer_badge.set_attribute("data-cart-count", "");
        let seen = record(&h);
        let _quick_add = QuickAddToCart::mount(&h.ctx);

        h.doc.submit(&c.form);
        h.run();

        assert_eq!(
            *seen.borrow(),
            vec!["added:Item added to cart successfully!".to_string()]
        );
        let requests = h.transport.requests();
        assert_eq!(requests[0].path(), "/cart/add.js");
        assert_eq!(
            requests[0].json_body().unwrap(),
            json!({"items": [{"id": "40123", "quantity": 1}]})
        );
        assert_eq!(h.transport.request_count("/cart.js"), 1);
        assert_eq!(header_badge.text(), "3");
        assert_eq!(drawer_badge.text(), "3");
        assert!(!c.button.is_disabled());
        assert_eq!(c.button.text(), "Quick Add");
    }

    #[test]
    fn test_loading_state_while_in_flight() {
        let mut h = Harness::new();
        let reply = h.transport.defer(Method::Post, "/cart/add.js");
        h.transport
            .respond(Method::Get, "/cart.js", 200, json!({"item_count": 1}));
        let c = card(&h, "7", Some("2"));
        let _quick_add = QuickAddToCart::mount(&h.ctx);

        h.doc.submit(&c.form);
        h.run();

        assert!(c.button.is_disabled());
        assert_eq!(
            c.button.inner_html(),
            r#"<span class="spinner"></span> Adding..."#
        );

        reply.respond(200, json!({}));
        h.run();

        assert!(!c.button.is_disabled());
        assert_eq!(c.button.inner_html(), "Quick Add");
        assert_eq!(
            h.transport.requests()[0].json_body().unwrap()["items"][0]["quantity"],
            2
        );
    }

    #[test]
    fn test_http_failure_publishes_error() {
        let mut h = Harness::new();
        h.transport
            .respond(Method::Post, "/cart/add.js", 500, json!({}));
        let c = card(&h, "9", Some("1"));
        let seen = record(&h);
        let _quick_add = QuickAddToCart::mount(&h.ctx);

        h.doc.submit(&c.form);
        h.run();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].starts_with("error:"));
        assert!(seen[0].contains("500"));
        assert_eq!(h.transport.request_count("/cart.js"), 0);
        assert!(!c.button.is_disabled());
        assert_eq!(c.button.text(), "Quick Add");
        assert_eq!(h.errors(), vec!["Error adding to cart".to_string()]);
    }

    #[test]
    fn test_empty_transport_message_uses_fallback() {
        let mut h = Harness::new();
        h.transport.fail(
            Method::Post,
            "/cart/add.js",
            FetchError::Transport(String::new()),
        );
        let c = card(&h, "9", Some("1"));
        let seen = record(&h);
        let _quick_add = QuickAddToCart::mount(&h.ctx);

        h.doc.submit(&c.form);
        h.run();

        assert_eq!(
            *seen.borrow(),
            vec!["error:Error adding item to cart".to_string()]
        );
    }

    #[test]
    fn test_count_refresh_failure_is_logged_only() {
        let mut h = Harness::new();
        h.transport
            .respond(Method::Post, "/cart/add.js", 200, json!({}));
        h.transport
            .respond(Method::Get, "/cart.js", 503, json!({}));
        let c = card(&h, "9", Some("1"));
        let seen = record(&h);
        let _quick_add = QuickAddToCart::mount(&h.ctx);

        h.doc.submit(&c.form);
        h.run();

        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(h.errors(), vec!["Error updating cart count".to_string()]);
    }

    #[test]
    fn test_form_added_after_mount() {
        let mut h = Harness::new();
        h.transport
            .respond(Method::Post, "/cart/add.js", 200, json!({}));
        h.transport
            .respond(Method::Get, "/cart.js", 200, json!({"item_count": 1}));
        let _quick_add = QuickAddToCart::mount(&h.ctx);

        let c = card(&h, "55", Some("1"));
        c.id.set_value("56");
        c.quantity.set_value("4");
        h.doc.submit(&c.form);
        h.run();

        assert_eq!(
            h.transport.requests()[0].json_body().unwrap(),
            json!({"items": [{"id": "56", "quantity": 4}]})
        );
    }
}
