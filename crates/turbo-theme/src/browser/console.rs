//! Log sink for the browser devtools console.

use turbo_theme_observability::{LogEntry, LogLevel, LogSink};
use wasm_bindgen::JsValue;

/// Writes each rendered line with the `console` method for its level.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn write(&self, entry: &LogEntry, line: &str) {
        let line = JsValue::from_str(line);
        match entry.level {
            LogLevel::Trace | LogLevel::Debug => web_sys::console::debug_1(&line),
            LogLevel::Info => web_sys::console::info_1(&line),
            LogLevel::Warn => web_sys::console::warn_1(&line),
            LogLevel::Error => web_sys::console::error_1(&line),
        }
    }
}
