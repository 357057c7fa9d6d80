//! TurboCommerce storefront interaction layer.
//!
//! Mounts the theme's page components against a [`ThemeContext`]:
//! - `CartDrawer` - slide-out cart panel
//! - `QuickAddToCart` - one-click add forms on product cards
//! - `PredictiveSearch` - debounced product suggestions
//! - `RevealAnimation` - scroll-triggered entrance classes
//! - `NotificationSystem` - toasts for cart outcomes
//!
//! Components only talk to each other through the [`EventBus`]. In the
//! browser, build with `--features browser` for `wasm32` and the exported
//! `boot` function wires everything to the live page.
//!
//! # Example
//!
//! ```rust,ignore
//! use turbo_theme::prelude::*;
//!
//! let context = ThemeContext::builder()
//!     .config(ThemeConfig::load("theme.toml")?)
//!     .document(document)
//!     .scheduler(scheduler)
//!     .executor(executor)
//!     .transport(transport)
//!     .build()?;
//! let runtime = ThemeRuntime::start(context);
//! assert_eq!(runtime.format_money(2999), "$29.99");
//! ```
//!
//! [`EventBus`]: turbo_theme_core::EventBus

pub mod components;
mod context;
mod error;
mod theme;

#[cfg(all(target_arch = "wasm32", feature = "browser"))]
pub mod browser;

#[cfg(test)]
mod testing;

pub use context::{ThemeContext, ThemeContextBuilder};
pub use error::{ThemeError, ValidationError};
pub use theme::ThemeRuntime;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::components::{
        CartDrawer, NotificationKind, NotificationSystem, PredictiveSearch, QuickAddToCart,
        RevealAnimation,
    };
    pub use crate::{ThemeContext, ThemeError, ThemeRuntime};
    pub use turbo_theme_core::prelude::*;
    pub use turbo_theme_data::prelude::*;
    pub use turbo_theme_observability::{LogLevel, StructuredLogger};
}
