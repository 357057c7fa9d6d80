//! Core abstractions for the TurboCommerce storefront theme layer.
//!
//! This crate provides:
//! - `ThemeConfig` - Routes, money, search, toast and reveal settings
//! - `MoneyFormatter` - Locale-aware price formatting
//! - `EventBus` - Typed publish/subscribe between components
//! - `Scheduler` / `Debouncer` - Cancellable timers
//! - `Executor` - Spawning of local futures
//! - `Document` / `Node` - DOM abstraction with an in-memory implementation

pub mod config;
pub mod dom;
pub mod error;
pub mod events;
pub mod executor;
pub mod money;
pub mod timer;

pub use config::ThemeConfig;
pub use error::ConfigError;
pub use events::{CartAdded, CartError, EventBus, ThemeEvent};
pub use executor::Executor;
pub use money::{Currency, Money, MoneyFormatter};
pub use timer::{Debouncer, ManualScheduler, Scheduler, TimerHandle};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::*;
    pub use crate::dom::{markup, Document, DomEvent, Element, EventKind, Node, Selector};
    pub use crate::error::ConfigError;
    pub use crate::events::{CartAdded, CartError, EventBus, ThemeEvent};
    pub use crate::executor::Executor;
    pub use crate::money::{Currency, Money, MoneyFormatter};
    pub use crate::timer::{Debouncer, Scheduler, TimerHandle};
}
