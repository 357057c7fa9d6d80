//! `fetch`-backed transport.

use std::collections::HashMap;

use async_trait::async_trait;
use turbo_theme_data::{FetchError, Request, Response, Transport};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// Sends requests with `window.fetch`. Cookies follow the browser's
/// same-origin defaults, which is what the cart endpoints expect.
#[derive(Debug, Clone)]
pub struct FetchTransport {
    window: web_sys::Window,
}

impl FetchTransport {
    pub fn new(window: web_sys::Window) -> Self {
        Self { window }
    }
}

#[async_trait(?Send)]
impl Transport for FetchTransport {
    async fn send(&self, request: Request) -> Result<Response, FetchError> {
        let init = web_sys::RequestInit::new();
        init.set_method(request.method.as_str());

        let headers = web_sys::Headers::new().map_err(transport_error)?;
        for (name, value) in &request.headers {
            headers.set(name, value).map_err(transport_error)?;
        }
        init.set_headers(&headers);

        if let Some(body) = &request.body {
            init.set_body(&JsValue::from_str(&String::from_utf8_lossy(body)));
        }

        let js_request = web_sys::Request::new_with_str_and_init(&request.url, &init)
            .map_err(transport_error)?;
        let reply = JsFuture::from(self.window.fetch_with_request(&js_request))
            .await
            .map_err(transport_error)?;
        let reply: web_sys::Response = reply.dyn_into().map_err(transport_error)?;

        let mut response_headers = HashMap::new();
        if let Ok(Some(content_type)) = reply.headers().get("content-type") {
            response_headers.insert("content-type".to_string(), content_type);
        }

        let text = JsFuture::from(reply.text().map_err(transport_error)?)
            .await
            .map_err(transport_error)?;
        let body = text.as_string().unwrap_or_default().into_bytes();

        Ok(Response::new(reply.status(), response_headers, body))
    }
}

fn transport_error(value: JsValue) -> FetchError {
    let message = match value.dyn_ref::<js_sys::Error>() {
        Some(error) => String::from(error.message()),
        None => value.as_string().unwrap_or_else(|| format!("{value:?}")),
    };
    FetchError::Transport(message)
}
