//! Platform HTTP clients for the storefront theme layer.
//!
//! Requests go through a [`Transport`], so the same [`CartApi`] and
//! [`SearchApi`] run over the browser's `fetch` or a scripted mock.
//!
//! # Example
//!
//! ```rust,ignore
//! use turbo_theme_data::{CartApi, CartLineRequest};
//!
//! let api = CartApi::new(transport, config.routes.clone());
//! api.add(&[CartLineRequest::new("40123", 1)]).await?;
//! let cart = api.get().await?;
//! println!("{} items", cart.item_count);
//! ```

mod cart;
mod error;
mod request;
mod response;
mod search;
mod transport;

#[cfg(any(test, feature = "testing"))]
pub mod mock;

pub use cart::{CartApi, CartLineRequest, CartState};
pub use error::FetchError;
pub use request::{Method, Request};
pub use response::Response;
pub use search::{encode_component, SearchApi, SearchResult};
pub use transport::Transport;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        CartApi, CartLineRequest, CartState, FetchError, Method, Request, Response, SearchApi,
        SearchResult, Transport,
    };
}
