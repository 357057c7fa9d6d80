//! Structured logging with component context.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

/// Log level for structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse a level name, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trace => write!(f, "TRACE"),
            Self::Debug => write!(f, "DEBUG"),
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// A structured log entry.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    /// Log level.
    pub level: LogLevel,
    /// Log message.
    pub message: String,
    /// Component that emitted the entry (e.g. "quick-add").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// Additional structured fields.
    #[serde(flatten)]
    pub fields: HashMap<String, serde_json::Value>,
}

impl LogEntry {
    /// Format as JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }

    /// Format as human-readable string.
    pub fn to_human(&self) -> String {
        let mut s = match &self.component {
            Some(component) => format!("[{}] {}: {}", self.level, component, self.message),
            None => format!("[{}] {}", self.level, self.message),
        };

        if !self.fields.is_empty() {
            s.push_str(" | ");
            let mut fields: Vec<String> = self
                .fields
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            fields.sort();
            s.push_str(&fields.join(" "));
        }

        s
    }
}

/// Output format for logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON format (for log aggregation).
    #[default]
    Json,
    /// Human-readable format (for development).
    Human,
}

impl LogFormat {
    /// Parse a format name; anything but `human` means JSON.
    pub fn parse(name: &str) -> Self {
        if name.eq_ignore_ascii_case("human") {
            Self::Human
        } else {
            Self::Json
        }
    }
}

/// Destination for formatted log lines.
pub trait LogSink {
    fn write(&self, entry: &LogEntry, line: &str);
}

/// Forwards entries to `tracing` at the matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write(&self, entry: &LogEntry, line: &str) {
        let component = entry.component.as_deref().unwrap_or("theme");
        match entry.level {
            LogLevel::Trace => tracing::trace!(target: "turbo_theme", component, "{}", line),
            LogLevel::Debug => tracing::debug!(target: "turbo_theme", component, "{}", line),
            LogLevel::Info => tracing::info!(target: "turbo_theme", component, "{}", line),
            LogLevel::Warn => tracing::warn!(target: "turbo_theme", component, "{}", line),
            LogLevel::Error => tracing::error!(target: "turbo_theme", component, "{}", line),
        }
    }
}

/// Keeps entries in memory. Clones share the buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    entries: Rc<RefCell<Vec<LogEntry>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every entry written so far.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.borrow().clone()
    }

    /// Entries at exactly `level`.
    pub fn at_level(&self, level: LogLevel) -> Vec<LogEntry> {
        self.entries
            .borrow()
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }
}

impl LogSink for MemorySink {
    fn write(&self, entry: &LogEntry, _line: &str) {
        self.entries.borrow_mut().push(entry.clone());
    }
}

/// Structured logger with component context.
///
/// Cheap to clone; clones share the sink. Components derive their own
/// logger with [`StructuredLogger::for_component`].
#[derive(Clone)]
pub struct StructuredLogger {
    component: Option<String>,
    min_level: LogLevel,
    format: LogFormat,
    sink: Rc<dyn LogSink>,
}

impl StructuredLogger {
    /// Create a logger writing to `tracing`.
    pub fn new() -> Self {
        Self::with_sink(Rc::new(TracingSink))
    }

    /// Create a logger writing to a custom sink.
    pub fn with_sink(sink: Rc<dyn LogSink>) -> Self {
        Self {
            component: None,
            min_level: LogLevel::Info,
            format: LogFormat::Json,
            sink,
        }
    }

    /// Derive a logger tagged with a component name.
    pub fn for_component(&self, component: impl Into<String>) -> Self {
        let mut logger = self.clone();
        logger.component = Some(component.into());
        logger
    }

    /// Set minimum log level.
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Set output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Log at trace level.
    pub fn trace(&self, message: &str) {
        self.log(LogLevel::Trace, message, HashMap::new());
    }

    /// Log at debug level.
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message, HashMap::new());
    }

    /// Log at info level.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message, HashMap::new());
    }

    /// Log at warn level.
    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message, HashMap::new());
    }

    /// Log at error level.
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message, HashMap::new());
    }

    /// Log at error level with fields.
    pub fn error_with(&self, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
        let fields = fields
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::json!(v.to_string())))
            .collect();
        self.log(LogLevel::Error, message, fields);
    }

    fn log(&self, level: LogLevel, message: &str, fields: HashMap<String, serde_json::Value>) {
        if level < self.min_level {
            return;
        }

        let entry = LogEntry {
            level,
            message: message.to_string(),
            component: self.component.clone(),
            fields,
        };

        let output = match self.format {
            LogFormat::Json => entry.to_json(),
            LogFormat::Human => entry.to_human(),
        };

        self.sink.write(&entry, &output);
    }

    /// Minimum level that reaches the sink.
    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Start building an entry at `level`.
    pub fn builder(&self, level: LogLevel, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, level, message)
    }

    /// Start building a debug log entry.
    pub fn debug_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Debug, message)
    }

    /// Start building an info log entry.
    pub fn info_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Info, message)
    }

    /// Start building a warn log entry.
    pub fn warn_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Warn, message)
    }

    /// Start building an error log entry.
    pub fn error_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Error, message)
    }
}

impl Default for StructuredLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StructuredLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuredLogger")
            .field("component", &self.component)
            .field("min_level", &self.min_level)
            .field("format", &self.format)
            .finish()
    }
}

/// Builder for log entries with fluent API.
pub struct LogBuilder<'a> {
    logger: &'a StructuredLogger,
    level: LogLevel,
    message: String,
    fields: HashMap<String, serde_json::Value>,
}

impl<'a> LogBuilder<'a> {
    /// Create a new log builder.
    pub fn new(logger: &'a StructuredLogger, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            logger,
            level,
            message: message.into(),
            fields: HashMap::new(),
        }
    }

    /// Add a string field.
    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields
            .insert(key.to_string(), serde_json::json!(value.into()));
        self
    }

    /// Add an integer field.
    pub fn field_i64(mut self, key: &str, value: i64) -> Self {
        self.fields.insert(key.to_string(), serde_json::json!(value));
        self
    }

    /// Add a boolean field.
    pub fn field_bool(mut self, key: &str, value: bool) -> Self {
        self.fields.insert(key.to_string(), serde_json::json!(value));
        self
    }

    /// Emit the log entry.
    pub fn emit(self) {
        self.logger.log(self.level, &self.message, self.fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture() -> (StructuredLogger, MemorySink) {
        let sink = MemorySink::new();
        let logger = StructuredLogger::with_sink(Rc::new(sink.clone()));
        (logger, sink)
    }

    #[test]
    fn test_min_level_filters() {
        let (logger, sink) = capture();
        logger.debug("hidden");
        logger.info("shown");
        logger.error("also shown");

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "shown");

        let (logger, sink) = capture();
        let logger = logger.with_min_level(LogLevel::Trace);
        logger.trace("now visible");
        assert_eq!(sink.entries().len(), 1);
    }

    #[test]
    fn test_component_context() {
        let (logger, sink) = capture();
        logger.for_component("predictive-search").warn("slow");

        let entry = &sink.entries()[0];
        assert_eq!(entry.component.as_deref(), Some("predictive-search"));
        assert_eq!(entry.level, LogLevel::Warn);
    }

    #[test]
    fn test_builder_fields() {
        let (logger, sink) = capture();
        logger
            .error_builder("Error adding to cart")
            .field("error", "HTTP error! status: 500")
            .field_i64("status", 500)
            .field_bool("retried", false)
            .emit();

        let entry = &sink.at_level(LogLevel::Error)[0];
        assert_eq!(entry.fields["status"], serde_json::json!(500));
        assert_eq!(entry.fields["retried"], serde_json::json!(false));
    }

    #[test]
    fn test_error_with_display_fields() {
        let (logger, sink) = capture();
        logger.error_with("Search error", &[("query", &"boots")]);
        assert_eq!(sink.entries()[0].fields["query"], serde_json::json!("boots"));
    }

    #[test]
    fn test_entry_formats() {
        let mut fields = HashMap::new();
        fields.insert("query".to_string(), serde_json::json!("boots"));
        let entry = LogEntry {
            level: LogLevel::Info,
            message: "search".to_string(),
            component: Some("predictive-search".to_string()),
            fields,
        };

        let json: serde_json::Value = serde_json::from_str(&entry.to_json()).unwrap();
        assert_eq!(json["level"], "info");
        assert_eq!(json["component"], "predictive-search");
        assert_eq!(json["query"], "boots");

        assert_eq!(
            entry.to_human(),
            r#"[INFO] predictive-search: search | query="boots""#
        );
    }

    #[test]
    fn test_parse_level_and_format() {
        assert_eq!(LogLevel::parse("WARN"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("loud"), None);
        assert_eq!(LogFormat::parse("Human"), LogFormat::Human);
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
    }
}
