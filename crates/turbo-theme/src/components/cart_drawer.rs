//! Slide-out cart panel.

use std::rc::{Rc, Weak};

use turbo_theme_core::dom::{markup, Element, EventKind, Selector};
use turbo_theme_observability::StructuredLogger;

use crate::{ThemeContext, ThemeError};

/// Opens and closes `#cart-drawer`.
///
/// Open state is the `is-open` class on the drawer, mirrored by
/// `cart-drawer-open` on the body. Triggers marked `data-cart-drawer-open`
/// or `data-cart-drawer-close`, the overlay and the Escape key drive it.
#[derive(Debug)]
pub struct CartDrawer {
    drawer: Element,
    body: Element,
    logger: StructuredLogger,
}

impl CartDrawer {
    /// Bind to the page. Fails when the drawer or body is missing.
    pub fn mount(ctx: &ThemeContext) -> Result<Rc<Self>, ThemeError> {
        let drawer = ctx
            .document
            .query(&Selector::id(markup::CART_DRAWER_ID))
            .ok_or(ThemeError::MissingElement("#cart-drawer"))?;
        let body = ctx
            .document
            .body()
            .ok_or(ThemeError::MissingElement("body"))?;

        let this = Rc::new(Self {
            drawer,
            body,
            logger: ctx.logger_for("cart-drawer"),
        });
        this.bind(ctx);
        Ok(this)
    }

    /// [`CartDrawer::mount`], or `None` when the page has no drawer.
    pub fn from_context(ctx: &ThemeContext) -> Option<Rc<Self>> {
        Self::mount(ctx).ok()
    }

    fn bind(self: &Rc<Self>, ctx: &ThemeContext) {
        let document = &ctx.document;

        let open_triggers = document.query_all(&Selector::attribute(markup::CART_DRAWER_OPEN_ATTR));
        for trigger in &open_triggers {
            let weak = Rc::downgrade(self);
            trigger.add_listener(
                EventKind::Click,
                Rc::new(move |event| {
                    event.prevent_default();
                    with(&weak, |drawer| drawer.open());
                }),
            );
        }

        let close_triggers =
            document.query_all(&Selector::attribute(markup::CART_DRAWER_CLOSE_ATTR));
        for trigger in &close_triggers {
            let weak = Rc::downgrade(self);
            trigger.add_listener(
                EventKind::Click,
                Rc::new(move |event| {
                    event.prevent_default();
                    with(&weak, |drawer| drawer.close());
                }),
            );
        }

        if let Some(overlay) = document.query(&Selector::id(markup::CART_DRAWER_OVERLAY_ID)) {
            let weak = Rc::downgrade(self);
            overlay.add_listener(
                EventKind::Click,
                Rc::new(move |_| with(&weak, |drawer| drawer.close())),
            );
        }

        let weak = Rc::downgrade(self);
        document.add_listener(
            EventKind::KeyDown,
            Rc::new(move |event| {
                if event.key() == Some("Escape") {
                    with(&weak, |drawer| {
                        if drawer.is_open() {
                            drawer.close();
                        }
                    });
                }
            }),
        );

        self.logger
            .debug_builder("mounted")
            .field_i64("open_triggers", open_triggers.len() as i64)
            .field_i64("close_triggers", close_triggers.len() as i64)
            .emit();
    }

    /// Show the drawer and move focus to its first focusable element.
    pub fn open(&self) {
        self.drawer.add_class(markup::DRAWER_OPEN_CLASS);
        self.body.add_class(markup::BODY_DRAWER_OPEN_CLASS);

        if let Some(first) = self.drawer.query(&Selector::Focusable) {
            first.focus();
        }
    }

    pub fn close(&self) {
        self.drawer.remove_class(markup::DRAWER_OPEN_CLASS);
        self.body.remove_class(markup::BODY_DRAWER_OPEN_CLASS);
    }

    pub fn toggle(&self) {
        if self.is_open() {
            self.close();
        } else {
            self.open();
        }
    }

    pub fn is_open(&self) -> bool {
        self.drawer.has_class(markup::DRAWER_OPEN_CLASS)
    }
}

fn with(weak: &Weak<CartDrawer>, f: impl FnOnce(&CartDrawer)) {
    if let Some(drawer) = weak.upgrade() {
        f(&drawer);
    }
}
