//! Theme configuration.
//!
//! Every field has a default matching the stock storefront, so an empty
//! document is a valid configuration. Hosts usually override only `routes`,
//! either from a config file or from the page's `window.routes` table.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::money::{Currency, MoneyFormatter};

/// Top-level theme configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Platform endpoints.
    #[serde(default)]
    pub routes: RoutesConfig,

    /// Price formatting.
    #[serde(default)]
    pub money: MoneyConfig,

    /// Predictive search tuning.
    #[serde(default)]
    pub search: SearchConfig,

    /// Quick-add button labels and messages.
    #[serde(default)]
    pub quick_add: QuickAddConfig,

    /// Toast timings.
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Scroll-reveal observation.
    #[serde(default)]
    pub reveal: RevealConfig,

    /// Log level and format.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ThemeConfig {
    /// Load and validate config from a file. `.json` files are parsed as
    /// JSON, anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read theme config: {}", path.display()))?;

        let config: ThemeConfig = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?
        };

        config
            .validate()
            .with_context(|| format!("Invalid theme config: {}", path.display()))?;
        Ok(config)
    }

    /// Parse and validate config from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ThemeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate config from a TOML string.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: ThemeConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section for values the components cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.routes.validate()?;

        if self.search.debounce_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.debounce_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.search.limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.limit",
                reason: "must be greater than zero".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.reveal.threshold) {
            return Err(ConfigError::InvalidValue {
                field: "reveal.threshold",
                reason: format!("{} is outside 0..=1", self.reveal.threshold),
            });
        }
        if self.notifications.max_visible == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "notifications.max_visible",
                reason: "must be at least 1 when set".to_string(),
            });
        }

        Ok(())
    }

    /// Formatter for the configured currency and locale.
    pub fn money_formatter(&self) -> MoneyFormatter {
        MoneyFormatter::new(self.money.currency, self.money.locale.clone())
    }
}

/// Platform endpoints, mirroring the host's routing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    pub cart_add_url: String,
    pub cart_update_url: String,
    pub cart_change_url: String,
    pub cart_url: String,
    pub predictive_search_url: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            cart_add_url: "/cart/add.js".to_string(),
            cart_update_url: "/cart/update.js".to_string(),
            cart_change_url: "/cart/change.js".to_string(),
            cart_url: "/cart.js".to_string(),
            predictive_search_url: "/search/suggest.json".to_string(),
        }
    }
}

impl RoutesConfig {
    /// Overlay the cart mutation endpoints from a host routing table (the
    /// page's `window.routes` object). The host's `cart_url` and
    /// `predictive_search_url` name HTML pages, so the JSON endpoints for
    /// those stay config-only. Unknown keys and non-string values are ignored.
    pub fn merge_host_routes(&mut self, routes: &serde_json::Value) {
        let slots: [(&str, &mut String); 3] = [
            ("cart_add_url", &mut self.cart_add_url),
            ("cart_update_url", &mut self.cart_update_url),
            ("cart_change_url", &mut self.cart_change_url),
        ];

        for (key, slot) in slots {
            if let Some(value) = routes.get(key).and_then(|v| v.as_str()) {
                if !value.is_empty() {
                    *slot = value.to_string();
                }
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let routes = [
            ("cart_add_url", &self.cart_add_url),
            ("cart_update_url", &self.cart_update_url),
            ("cart_change_url", &self.cart_change_url),
            ("cart_url", &self.cart_url),
            ("predictive_search_url", &self.predictive_search_url),
        ];
        for (name, url) in routes {
            if url.trim().is_empty() {
                return Err(ConfigError::MissingRoute(name));
            }
        }
        Ok(())
    }
}

/// Storefront currency and display locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoneyConfig {
    pub currency: Currency,
    pub locale: String,
}

impl Default for MoneyConfig {
    fn default() -> Self {
        Self {
            currency: Currency::CAD,
            locale: "en-CA".to_string(),
        }
    }
}

/// Predictive search tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a request is issued.
    pub debounce_ms: u64,
    /// Queries shorter than this never reach the network.
    pub min_query_chars: usize,
    /// `resources[limit]` sent with every suggest request.
    pub limit: u32,
    /// `resources[type]` sent with every suggest request.
    pub resource_type: String,
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            min_query_chars: 2,
            limit: 6,
            resource_type: "product".to_string(),
        }
    }
}

/// Quick-add button labels and event messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuickAddConfig {
    pub idle_label: String,
    pub loading_label: String,
    pub success_message: String,
    pub error_fallback: String,
}

impl Default for QuickAddConfig {
    fn default() -> Self {
        Self {
            idle_label: "Quick Add".to_string(),
            loading_label: "Adding...".to_string(),
            success_message: "Item added to cart successfully!".to_string(),
            error_fallback: "Error adding item to cart".to_string(),
        }
    }
}

/// Toast timings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Time a toast stays visible before auto-dismissal starts.
    pub duration_ms: u64,
    /// Length of the exit transition; the element is removed after it.
    pub transition_ms: u64,
    /// Delay between insertion and the entrance transition.
    pub enter_delay_ms: u64,
    /// Oldest toasts are evicted beyond this many. Unbounded when unset.
    pub max_visible: Option<usize>,
}

impl NotificationConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    pub fn enter_delay(&self) -> Duration {
        Duration::from_millis(self.enter_delay_ms)
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            duration_ms: 4000,
            transition_ms: 300,
            enter_delay_ms: 10,
            max_visible: None,
        }
    }
}

/// Scroll-reveal observation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub threshold: f64,
    pub root_margin: String,
    pub class: String,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: "0px 0px -50px 0px".to_string(),
            class: "animate-slide-in-up".to_string(),
        }
    }
}

/// Log level and output format, as strings so hosts can pass them through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `trace`, `debug`, `info`, `warn`, `error`.
    pub level: String,
    /// `json` or `human`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_storefront() {
        let config = ThemeConfig::default();
        assert_eq!(config.routes.cart_url, "/cart.js");
        assert_eq!(config.search.debounce(), Duration::from_millis(300));
        assert_eq!(config.search.min_query_chars, 2);
        assert_eq!(config.search.limit, 6);
        assert_eq!(config.notifications.duration(), Duration::from_millis(4000));
        assert_eq!(config.notifications.transition(), Duration::from_millis(300));
        assert_eq!(config.notifications.max_visible, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_is_valid() {
        let config = ThemeConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ThemeConfig::default());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = ThemeConfig::from_toml_str(
            r#"
            [money]
            currency = "USD"
            locale = "en-US"

            [search]
            limit = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.money.currency, Currency::USD);
        assert_eq!(config.search.limit, 10);
        assert_eq!(config.search.debounce_ms, 300);
        assert_eq!(config.money_formatter().format_cents(2999), "$29.99");
    }

    #[test]
    fn test_validate_rejects_empty_route() {
        let mut config = ThemeConfig::default();
        config.routes.cart_add_url = "  ".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingRoute("cart_add_url"))
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ThemeConfig::default();
        config.search.debounce_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "search.debounce_ms", .. })
        ));

        let mut config = ThemeConfig::default();
        config.reveal.threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = ThemeConfig::default();
        config.notifications.max_visible = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            ThemeConfig::from_json_str("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_merge_host_routes() {
        let mut routes = RoutesConfig::default();
        routes.merge_host_routes(&serde_json::json!({
            "cart_add_url": "/en-ca/cart/add",
            "cart_update_url": "",
            "cart_change_url": 42,
            "root": "/en-ca/"
        }));

        assert_eq!(routes.cart_add_url, "/en-ca/cart/add");
        assert_eq!(routes.cart_update_url, "/cart/update.js");
        assert_eq!(routes.cart_change_url, "/cart/change.js");
    }

    #[test]
    fn test_host_routes_keep_json_read_endpoints() {
        let mut routes = RoutesConfig::default();
        routes.merge_host_routes(&serde_json::json!({
            "root": "/",
            "cart_add_url": "/cart/add",
            "cart_update_url": "/cart/update",
            "cart_change_url": "/cart/change",
            "cart_url": "/cart",
            "predictive_search_url": "/search/suggest"
        }));

        assert_eq!(routes.cart_add_url, "/cart/add");
        assert_eq!(routes.cart_update_url, "/cart/update");
        assert_eq!(routes.cart_change_url, "/cart/change");
        assert_eq!(routes.cart_url, "/cart.js");
        assert_eq!(routes.predictive_search_url, "/search/suggest.json");
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("turbo-theme-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let toml_path = dir.join("theme.toml");
        std::fs::write(&toml_path, "[routes]\ncart_url = \"/shop/cart.js\"\n").unwrap();
        let config = ThemeConfig::load(&toml_path).unwrap();
        assert_eq!(config.routes.cart_url, "/shop/cart.js");

        let json_path = dir.join("theme.json");
        std::fs::write(&json_path, r#"{"search": {"debounce_ms": 0}}"#).unwrap();
        let err = ThemeConfig::load(&json_path).unwrap_err();
        assert!(err.to_string().contains("Invalid theme config"));

        assert!(ThemeConfig::load(dir.join("missing.toml")).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }
}
