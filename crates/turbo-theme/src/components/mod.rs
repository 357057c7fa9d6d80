//! Page components. Each binds to its markup on mount and stays inert when
//! the markup is absent.

mod cart_drawer;
mod notifications;
mod predictive_search;
mod quick_add;
mod reveal;

pub use cart_drawer::CartDrawer;
pub use notifications::{NotificationKind, NotificationSystem};
pub use predictive_search::PredictiveSearch;
pub use quick_add::{is_quick_add_form, line_from_form, parse_quantity, QuickAddToCart};
pub use reveal::{animations_enabled, RevealAnimation};
