//! Client for the platform's search suggestion endpoint.

use std::rc::Rc;

use serde::{Deserialize, Deserializer, Serialize};
use turbo_theme_core::config::SearchConfig;

use crate::{FetchError, Request, Transport};

/// One product suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    /// Image URL. The platform sends either a plain URL or an object with a
    /// `url` field.
    #[serde(default, deserialize_with = "image_url")]
    pub featured_image: Option<String>,
    /// Price in minor currency units.
    #[serde(default)]
    pub price: i64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ImageField {
    Url(String),
    Object { url: Option<String> },
}

fn image_url<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let field = Option::<ImageField>::deserialize(deserializer)?;
    Ok(field.and_then(|f| match f {
        ImageField::Url(url) => Some(url),
        ImageField::Object { url } => url,
    }))
}

#[derive(Debug, Default, Deserialize)]
struct SuggestResponse {
    #[serde(default)]
    resources: SuggestResources,
}

#[derive(Debug, Default, Deserialize)]
struct SuggestResources {
    #[serde(default)]
    results: SuggestResults,
}

#[derive(Debug, Default, Deserialize)]
struct SuggestResults {
    #[serde(default)]
    products: Option<Vec<SearchResult>>,
}

/// Search suggestion client.
#[derive(Clone)]
pub struct SearchApi {
    transport: Rc<dyn Transport>,
    url: String,
    resource_type: String,
    limit: u32,
}

impl SearchApi {
    pub fn new(transport: Rc<dyn Transport>, url: impl Into<String>, config: &SearchConfig) -> Self {
        Self {
            transport,
            url: url.into(),
            resource_type: config.resource_type.clone(),
            limit: config.limit,
        }
    }

    /// Full request URL for `query`.
    pub fn suggest_url(&self, query: &str) -> String {
        format!(
            "{}?q={}&resources[type]={}&resources[limit]={}",
            self.url,
            encode_component(query),
            encode_component(&self.resource_type),
            self.limit
        )
    }

    /// Fetch product suggestions. A reply without a product list is an empty list.
    pub async fn suggest(&self, query: &str) -> Result<Vec<SearchResult>, FetchError> {
        let response = self
            .transport
            .send(Request::get(self.suggest_url(query)))
            .await?
            .error_for_status()?;
        let body: SuggestResponse = response.json()?;
        Ok(body.resources.results.products.unwrap_or_default())
    }
}

impl std::fmt::Debug for SearchApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchApi")
            .field("url", &self.url)
            .field("resource_type", &self.resource_type)
            .field("limit", &self.limit)
            .finish()
    }
}

/// Percent-encode a URI component, leaving the same characters unescaped as
/// JavaScript's `encodeURIComponent`.
pub fn encode_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
