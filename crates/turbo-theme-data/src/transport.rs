//! The seam between the API clients and whatever actually sends requests.

use async_trait::async_trait;

use crate::{FetchError, Request, Response};

/// Sends one request and yields its response.
///
/// Implementations make exactly one attempt. Any response, whatever its
/// status, is `Ok`; only failures to get a response are `Err`.
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: Request) -> Result<Response, FetchError>;
}
