//! Page bootstrap.

use std::rc::Rc;

use turbo_theme_observability::StructuredLogger;

use crate::components::{
    CartDrawer, NotificationSystem, PredictiveSearch, QuickAddToCart, RevealAnimation,
};
use crate::{ThemeContext, ThemeError};

/// Every component mounted on one page, kept alive for the page lifetime.
///
/// Components whose markup is missing are skipped, and the reason is logged
/// at debug level.
pub struct ThemeRuntime {
    context: ThemeContext,
    cart_drawer: Option<Rc<CartDrawer>>,
    quick_add: Rc<QuickAddToCart>,
    search: Option<Rc<PredictiveSearch>>,
    reveal: Option<RevealAnimation>,
    notifications: Rc<NotificationSystem>,
}

impl ThemeRuntime {
    /// Mount every component the page supports.
    pub fn start(context: ThemeContext) -> Self {
        let logger = context.logger_for("theme");

        let cart_drawer = optional(CartDrawer::mount(&context), &logger, "cart-drawer");
        let quick_add = QuickAddToCart::mount(&context);
        let search = optional(PredictiveSearch::mount(&context), &logger, "predictive-search");
        let reveal = optional(RevealAnimation::mount(&context), &logger, "reveal");
        let notifications = NotificationSystem::mount(&context);

        logger
            .info_builder("theme started")
            .field_bool("cart_drawer", cart_drawer.is_some())
            .field_bool("predictive_search", search.is_some())
            .field_bool("reveal", reveal.is_some())
            .emit();

        Self {
            context,
            cart_drawer,
            quick_add,
            search,
            reveal,
            notifications,
        }
    }

    pub fn context(&self) -> &ThemeContext {
        &self.context
    }

    pub fn cart_drawer(&self) -> Option<&Rc<CartDrawer>> {
        self.cart_drawer.as_ref()
    }

    pub fn quick_add(&self) -> &Rc<QuickAddToCart> {
        &self.quick_add
    }

    pub fn search(&self) -> Option<&Rc<PredictiveSearch>> {
        self.search.as_ref()
    }

    pub fn reveal(&self) -> Option<&RevealAnimation> {
        self.reveal.as_ref()
    }

    pub fn notifications(&self) -> &Rc<NotificationSystem> {
        &self.notifications
    }

    /// Format minor units in the configured currency and locale.
    pub fn format_money(&self, cents: i64) -> String {
        self.context.money().format_cents(cents)
    }
}

fn optional<T>(mounted: Result<T, ThemeError>, logger: &StructuredLogger, name: &str) -> Option<T> {
    match mounted {
        Ok(component) => Some(component),
        Err(err) => {
            logger
                .debug_builder("component skipped")
                .field("component", name)
                .field("reason", err.to_string())
                .emit();
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use serde_json::json;
    use turbo_theme_core::dom::{Document, Element, Selector};
    use turbo_theme_core::ThemeConfig;
    use turbo_theme_data::Method;
    use turbo_theme_observability::LogLevel;

    fn storefront(h: &Harness) -> (Element, Element) {
        let body = h.body();
        let header = h.add(&body, "header", None);
        let badge = h.add(&header, "span", None);
        badge.set_attribute("data-cart-count", "");
        badge.set_text("0");
        let container = h.add(&header, "div", None);
        container.add_class("search-container");
        h.add(&container, "input", Some("search-input"));
        h.add(&container, "div", Some("search-results"))
            .add_class("hidden");

        h.add(&body, "div", Some("cart-drawer-overlay"));
        let drawer = h.add(&body, "aside", Some("cart-drawer"));
        h.add(&drawer, "button", None)
            .set_attribute("data-cart-drawer-close", "");

        let card = h.add(&body, "article", None);
        card.set_attribute("data-reveal", "");
        let form = h.add(&card, "form", None);
        form.add_class("quick-add-form");
        let id = h.add(&form, "input", None);
        id.set_attribute("name", "id");
        id.set_value("40123");
        let button = h.add(&form, "button", None);
        button.set_attribute("type", "submit");
        button.add_class("quick-add-btn");
        button.set_text("Quick Add");

        (form, badge)
    }

    #[test]
    fn test_bare_page_mounts_event_driven_components_only() {
        let h = Harness::new();
        let runtime = ThemeRuntime::start(h.ctx.clone());

        assert!(runtime.cart_drawer().is_none());
        assert!(runtime.search().is_none());
        assert!(runtime.reveal().is_none());
        assert_eq!(runtime.notifications().active_count(), 0);

        let skipped = h
            .logs
            .at_level(LogLevel::Debug)
            .into_iter()
            .filter(|e| e.message == "component skipped")
            .count();
        assert_eq!(skipped, 3);
    }

    #[test]
    fn test_quick_add_to_toast_end_to_end() {
        let mut h = Harness::new();
        h.transport
            .respond(Method::Post, "/cart/add.js", 200, json!({"items": []}));
        h.transport
            .respond(Method::Get, "/cart.js", 200, json!({"item_count": 2}));
        let (form, badge) = storefront(&h);

        let runtime = ThemeRuntime::start(h.ctx.clone());
        assert!(runtime.cart_drawer().is_some());
        assert!(runtime.search().is_some());
        assert_eq!(runtime.reveal().map(RevealAnimation::observed), Some(1));

        h.doc.submit(&form);
        h.run();

        assert_eq!(badge.text(), "2");
        let toasts = h.doc.query_all(&Selector::class("notification"));
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].text(), "Item added to cart successfully!");

        h.scheduler.advance_ms(4300);
        assert!(h.doc.query_all(&Selector::class("notification")).is_empty());
    }

    #[test]
    fn test_host_routes_keep_json_read_endpoints() {
        let mut config = ThemeConfig::default();
        config.routes.merge_host_routes(&json!({
            "root": "/",
            "cart_add_url": "/cart/add",
            "cart_update_url": "/cart/update",
            "cart_change_url": "/cart/change",
            "cart_url": "/cart",
            "predictive_search_url": "/search/suggest"
        }));
        let mut h = Harness::with_config(config);
        h.transport
            .respond(Method::Post, "/cart/add", 200, json!({"items": []}));
        h.transport
            .respond(Method::Get, "/cart.js", 200, json!({"item_count": 7}));
        h.transport.respond(
            Method::Get,
            "/search/suggest.json",
            200,
            json!({"resources": {"results": {"products": [
                {"title": "Boots", "url": "/products/boots", "price": 4500}
            ]}}}),
        );
        let (form, badge) = storefront(&h);
        let _runtime = ThemeRuntime::start(h.ctx.clone());

        h.doc.submit(&form);
        h.run();

        let paths: Vec<String> = h.transport.requests().iter().map(|r| r.path().to_string()).collect();
        assert_eq!(paths, vec!["/cart/add".to_string(), "/cart.js".to_string()]);
        assert_eq!(badge.text(), "7");

        let input = h.doc.query(&Selector::id("search-input")).unwrap();
        h.doc.type_into(&input, "boots");
        h.scheduler.advance_ms(300);
        h.run();

        assert_eq!(h.transport.request_count("/search/suggest.json"), 1);
        let panel = h.doc.query(&Selector::id("search-results")).unwrap();
        assert!(panel.inner_html().contains("/products/boots"));
        assert!(h.errors().is_empty());
    }

    #[test]
    fn test_failed_add_shows_error_toast() {
        let mut h = Harness::new();
        h.transport
            .respond(Method::Post, "/cart/add.js", 500, json!({}));
        let (form, badge) = storefront(&h);
        let _runtime = ThemeRuntime::start(h.ctx.clone());

        h.doc.submit(&form);
        h.run();

        assert_eq!(badge.text(), "0");
        let toasts = h.doc.query_all(&Selector::class("bg-red-600"));
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].text(), "HTTP error! status: 500");
    }

    #[test]
    fn test_animations_flag_skips_reveal() {
        let h = Harness::new();
        storefront(&h);
        h.body().set_attribute("data-animations-enabled", "false");

        let runtime = ThemeRuntime::start(h.ctx.clone());
        assert!(runtime.reveal().is_none());
        assert!(runtime.cart_drawer().is_some());
    }

    #[test]
    fn test_format_money() {
        let h = Harness::new();
        let runtime = ThemeRuntime::start(h.ctx.clone());
        assert_eq!(runtime.format_money(2999), "$29.99");
        assert_eq!(runtime.format_money(0), "$0.00");
        assert_eq!(runtime.format_money(123456789), "$1,234,567.89");
    }
}
