//! Client for the platform's AJAX cart endpoints.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use turbo_theme_core::config::RoutesConfig;

use crate::{FetchError, Request, Transport};

/// One line of an add-to-cart or change request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineRequest {
    /// Variant id.
    pub id: String,
    pub quantity: u32,
}

impl CartLineRequest {
    pub fn new(id: impl Into<String>, quantity: u32) -> Self {
        Self {
            id: id.into(),
            quantity,
        }
    }
}

/// Cart as returned by the platform. Only `item_count` is interpreted;
/// every other field is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartState {
    pub item_count: u32,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Serialize)]
struct AddBody<'a> {
    items: &'a [CartLineRequest],
}

#[derive(Serialize)]
struct UpdateBody<'a> {
    updates: &'a BTreeMap<String, u32>,
}

#[derive(Serialize)]
struct ChangeBody<'a> {
    id: &'a str,
    quantity: u32,
}

/// Cart client. Every mutation is a JSON POST marked as AJAX; every call is
/// a single attempt and errors are returned to the caller as-is.
#[derive(Clone)]
pub struct CartApi {
    transport: Rc<dyn Transport>,
    routes: RoutesConfig,
}

impl CartApi {
    pub fn new(transport: Rc<dyn Transport>, routes: RoutesConfig) -> Self {
        Self { transport, routes }
    }

    pub fn routes(&self) -> &RoutesConfig {
        &self.routes
    }

    /// Add lines to the cart. Returns the platform's JSON reply.
    pub async fn add(&self, items: &[CartLineRequest]) -> Result<serde_json::Value, FetchError> {
        self.post(&self.routes.cart_add_url, &AddBody { items }).await
    }

    /// Set quantities for several lines at once, keyed by variant id.
    pub async fn update(&self, updates: &BTreeMap<String, u32>) -> Result<CartState, FetchError> {
        self.post(&self.routes.cart_update_url, &UpdateBody { updates })
            .await
    }

    /// Set the quantity of a single line. Zero removes it.
    pub async fn change(&self, id: &str, quantity: u32) -> Result<CartState, FetchError> {
        self.post(&self.routes.cart_change_url, &ChangeBody { id, quantity })
            .await
    }

    /// Fetch the current cart.
    pub async fn get(&self) -> Result<CartState, FetchError> {
        let response = self
            .transport
            .send(Request::get(&self.routes.cart_url))
            .await?
            .error_for_status()?;
        response.json()
    }

    async fn post<B, T>(&self, url: &str, body: &B) -> Result<T, FetchError>
    where
        B: Serialize,
        T: serde::de::DeserializeOwned,
    {
        let request = Request::post(url).ajax().json(body)?;
        let response = self.transport.send(request).await?.error_for_status()?;
        response.json()
    }
}

impl std::fmt::Debug for CartApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartApi").field("routes", &self.routes).finish()
    }
}
