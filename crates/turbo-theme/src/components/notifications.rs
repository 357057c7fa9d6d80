//! Toast notifications for cart outcomes.

use std::cell::RefCell;
use std::rc::Rc;

use turbo_theme_core::config::NotificationConfig;
use turbo_theme_core::dom::{markup, same_node, Document, Element, EventKind};
use turbo_theme_core::events::Subscription;
use turbo_theme_core::{CartAdded, CartError, EventBus, Scheduler, TimerHandle};
use turbo_theme_observability::StructuredLogger;

use crate::ThemeContext;

const CONTAINER_CLASSES: &str = "fixed top-4 right-4 z-50 space-y-2";
const TOAST_CLASSES: &str = "notification p-4 rounded-lg shadow-lg max-w-sm transform transition-all duration-300";
/// Off-screen state a toast enters from and leaves through.
const HIDDEN_STATE: &str = "translate-x-full opacity-0";
const DISMISS_ICON: &str = r#"<svg class="w-4 h-4" fill="currentColor" viewBox="0 0 20 20"><path fill-rule="evenodd" d="M4.293 4.293a1 1 0 011.414 0L10 8.586l4.293-4.293a1 1 0 111.414 1.414L11.414 10l4.293 4.293a1 1 0 01-1.414 1.414L10 11.414l-4.293 4.293a1 1 0 01-1.414-1.414L8.586 10 4.293 5.707a1 1 0 010-1.414z" clip-rule="evenodd"/></svg>"#;

/// Toast flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

impl NotificationKind {
    fn classes(&self) -> &'static str {
        match self {
            NotificationKind::Success => "bg-green-600 text-white",
            NotificationKind::Error => "bg-red-600 text-white",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
        }
    }
}

struct Toast {
    element: Element,
    timers: RefCell<Vec<TimerHandle>>,
}

impl Toast {
    fn cancel_timers(&self) {
        for timer in self.timers.borrow_mut().drain(..) {
            timer.cancel();
        }
    }
}

/// Renders [`CartAdded`] and [`CartError`] as stacked toasts.
///
/// The container is created on the first toast. Each toast slides in after
/// the enter delay, dismisses itself after the configured duration and is
/// detached once its exit transition has run.
pub struct NotificationSystem {
    document: Rc<dyn Document>,
    scheduler: Rc<dyn Scheduler>,
    config: NotificationConfig,
    bus: EventBus,
    container: RefCell<Option<Element>>,
    toasts: RefCell<Vec<Rc<Toast>>>,
    subscriptions: RefCell<Vec<Subscription>>,
    logger: StructuredLogger,
}

impl NotificationSystem {
    pub fn mount(ctx: &ThemeContext) -> Rc<Self> {
        let this = Rc::new(Self {
            document: Rc::clone(&ctx.document),
            scheduler: Rc::clone(&ctx.scheduler),
            config: ctx.config.notifications.clone(),
            bus: ctx.bus.clone(),
            container: RefCell::new(None),
            toasts: RefCell::new(Vec::new()),
            subscriptions: RefCell::new(Vec::new()),
            logger: ctx.logger_for("notifications"),
        });

        let weak = Rc::downgrade(&this);
        let added = ctx.bus.subscribe(move |event: &CartAdded| {
            if let Some(this) = weak.upgrade() {
                this.show(NotificationKind::Success, &event.message);
            }
        });
        let weak = Rc::downgrade(&this);
        let failed = ctx.bus.subscribe(move |event: &CartError| {
            if let Some(this) = weak.upgrade() {
                this.show(NotificationKind::Error, &event.message);
            }
        });
        this.subscriptions.borrow_mut().extend([added, failed]);

        this
    }

    /// Show a toast and return its element. `None` when the page has no body.
    pub fn show(self: &Rc<Self>, kind: NotificationKind, message: &str) -> Option<Element> {
        let container = self.container()?;

        let element = self.document.create_element("div")?;
        element.add_classes(TOAST_CLASSES);
        element.add_classes(kind.classes());
        element.add_classes(HIDDEN_STATE);

        let row = self.document.create_element("div")?;
        row.add_classes("flex items-center justify-between");
        let text = self.document.create_element("span")?;
        text.set_text(message);
        let dismiss = self.document.create_element("button")?;
        dismiss.add_classes("ml-4 text-white hover:text-gray-200");
        dismiss.set_attribute("type", "button");
        dismiss.set_attribute("aria-label", "Dismiss notification");
        dismiss.set_inner_html(DISMISS_ICON);
        row.append_child(&text);
        row.append_child(&dismiss);
        element.append_child(&row);

        let toast = Rc::new(Toast {
            element: Rc::clone(&element),
            timers: RefCell::new(Vec::new()),
        });

        let (system, handle) = (Rc::downgrade(self), Rc::downgrade(&toast));
        dismiss.add_listener(
            EventKind::Click,
            Rc::new(move |_| {
                if let (Some(system), Some(toast)) = (system.upgrade(), handle.upgrade()) {
                    system.remove_now(&toast);
                }
            }),
        );

        container.append_child(&element);
        self.toasts.borrow_mut().push(Rc::clone(&toast));
        self.enforce_cap();

        let handle = Rc::downgrade(&toast);
        let enter = self.scheduler.schedule(
            self.config.enter_delay(),
            Box::new(move || {
                if let Some(toast) = handle.upgrade() {
                    toast.element.remove_classes(HIDDEN_STATE);
                }
            }),
        );

        let (system, handle) = (Rc::downgrade(self), Rc::downgrade(&toast));
        let expire = self.scheduler.schedule(
            self.config.duration(),
            Box::new(move || {
                if let (Some(system), Some(toast)) = (system.upgrade(), handle.upgrade()) {
                    system.begin_exit(&toast);
                }
            }),
        );
        toast.timers.borrow_mut().extend([enter, expire]);

        self.logger
            .debug_builder("toast shown")
            .field("kind", kind.as_str())
            .field_i64("active", self.active_count() as i64)
            .emit();

        Some(element)
    }

    /// Remove the toast owning `element` at once, cancelling its timers.
    /// Returns false if it is not an active toast.
    pub fn dismiss(&self, element: &Element) -> bool {
        let toast = self
            .toasts
            .borrow()
            .iter()
            .find(|t| same_node(&t.element, element))
            .cloned();
        match toast {
            Some(toast) => {
                self.remove_now(&toast);
                true
            }
            None => false,
        }
    }

    /// Toasts shown and not yet removed, including ones mid-exit.
    pub fn active_count(&self) -> usize {
        self.toasts.borrow().len()
    }

    fn container(&self) -> Option<Element> {
        if let Some(container) = self.container.borrow().as_ref() {
            if container.is_connected() {
                return Some(Rc::clone(container));
            }
        }

        let Some(body) = self.document.body() else {
            self.logger.warn("no body to attach notifications to");
            return None;
        };
        let container = self.document.create_element("div")?;
        container.set_attribute("id", markup::NOTIFICATION_CONTAINER_ID);
        container.add_classes(CONTAINER_CLASSES);
        body.append_child(&container);
        *self.container.borrow_mut() = Some(Rc::clone(&container));
        Some(container)
    }

    fn begin_exit(self: &Rc<Self>, toast: &Rc<Toast>) {
        toast.cancel_timers();
        toast.element.add_classes(HIDDEN_STATE);

        let (system, handle) = (Rc::downgrade(self), Rc::downgrade(toast));
        let removal = self.scheduler.schedule(
            self.config.transition(),
            Box::new(move || {
                if let (Some(system), Some(toast)) = (system.upgrade(), handle.upgrade()) {
                    system.remove_now(&toast);
                }
            }),
        );
        toast.timers.borrow_mut().push(removal);
    }

    fn remove_now(&self, toast: &Rc<Toast>) {
        toast.cancel_timers();
        if toast.element.is_connected() {
            toast.element.remove();
        }
        self.toasts.borrow_mut().retain(|t| !Rc::ptr_eq(t, toast));
    }

    fn enforce_cap(&self) {
        let Some(max) = self.config.max_visible else {
            return;
        };
        loop {
            let oldest = {
                let toasts = self.toasts.borrow();
                if toasts.len() <= max {
                    break;
                }
                Rc::clone(&toasts[0])
            };
            self.remove_now(&oldest);
        }
    }
}

impl Drop for NotificationSystem {
    fn drop(&mut self) {
        for subscription in self.subscriptions.borrow_mut().drain(..) {
            self.bus.unsubscribe(subscription);
        }
        for toast in self.toasts.borrow().iter() {
            toast.cancel_timers();
        }
    }
}
