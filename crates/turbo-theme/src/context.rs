//! Shared handles every component is mounted with.

use std::fmt;
use std::rc::Rc;

use turbo_theme_core::dom::Document;
use turbo_theme_core::{EventBus, Executor, MoneyFormatter, Scheduler, ThemeConfig};
use turbo_theme_data::{CartApi, SearchApi, Transport};
use turbo_theme_observability::{LogFormat, LogLevel, LogSink, StructuredLogger, TracingSink};

use crate::ThemeError;

/// The page, clocks, network and bus a theme runs against.
///
/// Cloning is cheap; every field is reference counted.
#[derive(Clone)]
pub struct ThemeContext {
    pub config: Rc<ThemeConfig>,
    pub document: Rc<dyn Document>,
    pub scheduler: Rc<dyn Scheduler>,
    pub executor: Rc<dyn Executor>,
    pub transport: Rc<dyn Transport>,
    pub bus: EventBus,
    pub logger: StructuredLogger,
}

impl ThemeContext {
    pub fn builder() -> ThemeContextBuilder {
        ThemeContextBuilder::default()
    }

    /// Cart client over this context's transport and routes.
    pub fn cart_api(&self) -> CartApi {
        CartApi::new(Rc::clone(&self.transport), self.config.routes.clone())
    }

    /// Search client over this context's transport and routes.
    pub fn search_api(&self) -> SearchApi {
        SearchApi::new(
            Rc::clone(&self.transport),
            self.config.routes.predictive_search_url.clone(),
            &self.config.search,
        )
    }

    pub fn money(&self) -> MoneyFormatter {
        self.config.money_formatter()
    }

    /// Logger tagged with `component`.
    pub fn logger_for(&self, component: &str) -> StructuredLogger {
        self.logger.for_component(component)
    }
}

impl fmt::Debug for ThemeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeContext")
            .field("config", &self.config)
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ThemeContext`].
///
/// Document, scheduler, executor and transport are required. The config
/// defaults to [`ThemeConfig::default`], the bus to a fresh one and the
/// logger to the config's level and format, written to the log sink
/// ([`TracingSink`] unless one is given).
#[derive(Default)]
pub struct ThemeContextBuilder {
    config: Option<ThemeConfig>,
    document: Option<Rc<dyn Document>>,
    scheduler: Option<Rc<dyn Scheduler>>,
    executor: Option<Rc<dyn Executor>>,
    transport: Option<Rc<dyn Transport>>,
    bus: Option<EventBus>,
    logger: Option<StructuredLogger>,
    log_sink: Option<Rc<dyn LogSink>>,
}

impl ThemeContextBuilder {
    pub fn config(mut self, config: ThemeConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn document(mut self, document: Rc<dyn Document>) -> Self {
        self.document = Some(document);
        self
    }

    pub fn scheduler(mut self, scheduler: Rc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn executor(mut self, executor: Rc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn transport(mut self, transport: Rc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Where the config-built logger writes. Ignored when a logger is set.
    pub fn log_sink(mut self, sink: Rc<dyn LogSink>) -> Self {
        self.log_sink = Some(sink);
        self
    }

    /// Validate the config and assemble the context.
    pub fn build(self) -> Result<ThemeContext, ThemeError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let log_sink = self.log_sink;
        let logger = self.logger.unwrap_or_else(|| {
            let sink = log_sink.unwrap_or_else(|| Rc::new(TracingSink));
            StructuredLogger::with_sink(sink)
                .with_min_level(LogLevel::parse(&config.logging.level).unwrap_or(LogLevel::Info))
                .with_format(LogFormat::parse(&config.logging.format))
        });

        Ok(ThemeContext {
            config: Rc::new(config),
            document: self.document.ok_or(ThemeError::MissingCapability("document"))?,
            scheduler: self.scheduler.ok_or(ThemeError::MissingCapability("scheduler"))?,
            executor: self.executor.ok_or(ThemeError::MissingCapability("executor"))?,
            transport: self.transport.ok_or(ThemeError::MissingCapability("transport"))?,
            bus: self.bus.unwrap_or_default(),
            logger,
        })
    }
}
