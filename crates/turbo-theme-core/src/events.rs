//! Typed publish/subscribe bus shared by the theme components.
//!
//! Each event type names itself on the wire through [`ThemeEvent::NAME`], so
//! a handler subscribed to [`CartAdded`] can only ever receive a `CartAdded`
//! payload. Hosts can attach a mirror that sees every published event as
//! `(name, json)`, which is how the browser backend re-dispatches them as DOM
//! custom events.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// An event that can travel over the [`EventBus`].
pub trait ThemeEvent: Serialize + 'static {
    /// Wire name, e.g. `cart:added`.
    const NAME: &'static str;
}

/// Published after a quick-add request succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartAdded {
    pub message: String,
}

impl ThemeEvent for CartAdded {
    const NAME: &'static str = "cart:added";
}

/// Published after a quick-add request fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartError {
    pub message: String,
}

impl ThemeEvent for CartError {
    const NAME: &'static str = "cart:error";
}

type Handler = Rc<dyn Fn(&dyn Any)>;

/// Observer of every published event, by wire name and JSON payload.
pub type EventMirror = Rc<dyn Fn(&'static str, serde_json::Value)>;

/// Token returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    type_id: TypeId,
    id: u64,
}

#[derive(Default)]
struct BusInner {
    handlers: HashMap<TypeId, Vec<(u64, Handler)>>,
    next_id: u64,
    mirror: Option<EventMirror>,
}

/// Single-threaded event bus. Clones share the same subscriber table.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<BusInner>>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for events of type `E`.
    pub fn subscribe<E: ThemeEvent>(&self, handler: impl Fn(&E) + 'static) -> Subscription {
        let handler: Handler = Rc::new(move |event: &dyn Any| {
            if let Some(event) = event.downcast_ref::<E>() {
                handler(event);
            }
        });

        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        let type_id = TypeId::of::<E>();
        inner.handlers.entry(type_id).or_default().push((id, handler));

        Subscription { type_id, id }
    }

    /// Remove a handler. Unknown subscriptions are ignored.
    pub fn unsubscribe(&self, subscription: Subscription) {
        let mut inner = self.inner.borrow_mut();
        if let Some(handlers) = inner.handlers.get_mut(&subscription.type_id) {
            handlers.retain(|(id, _)| *id != subscription.id);
        }
    }

    /// Deliver an event to every handler of its type, in subscription order.
    /// Returns the number of handlers invoked.
    ///
    /// Handlers may publish or subscribe re-entrantly; subscriptions added
    /// during delivery take effect from the next publish.
    pub fn publish<E: ThemeEvent>(&self, event: E) -> usize {
        let (handlers, mirror) = {
            let inner = self.inner.borrow();
            let handlers: Vec<Handler> = inner
                .handlers
                .get(&TypeId::of::<E>())
                .map(|hs| hs.iter().map(|(_, h)| Rc::clone(h)).collect())
                .unwrap_or_default();
            (handlers, inner.mirror.clone())
        };

        for handler in &handlers {
            handler(&event);
        }

        if let Some(mirror) = mirror {
            if let Ok(payload) = serde_json::to_value(&event) {
                mirror(E::NAME, payload);
            }
        }

        handlers.len()
    }

    /// Number of handlers subscribed to `E`.
    pub fn subscriber_count<E: ThemeEvent>(&self) -> usize {
        self.inner
            .borrow()
            .handlers
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    /// Attach an observer of every published event.
    pub fn set_mirror(&self, mirror: EventMirror) {
        self.inner.borrow_mut().mirror = Some(mirror);
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        let subscribers: usize = inner.handlers.values().map(Vec::len).sum();
        f.debug_struct("EventBus")
            .field("subscribers", &subscribers)
            .field("mirrored", &inner.mirror.is_some())
            .finish()
    }
}
