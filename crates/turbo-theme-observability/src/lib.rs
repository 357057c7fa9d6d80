//! Observability for the storefront theme layer.
//!
//! This crate provides:
//! - `StructuredLogger` - Structured logging with component context
//! - `LogSink` - Where formatted entries go (`tracing` by default)

mod logging;

pub use logging::*;
