//! Test harness: an in-memory page with a virtual clock and scripted network.

use std::rc::Rc;

use futures::executor::LocalPool;
use turbo_theme_core::dom::{Element, MemoryDocument};
use turbo_theme_core::{ManualScheduler, ThemeConfig};
use turbo_theme_data::mock::MockTransport;
use turbo_theme_observability::{LogLevel, MemorySink, StructuredLogger};

use crate::ThemeContext;

pub(crate) struct Harness {
    pub doc: MemoryDocument,
    pub scheduler: ManualScheduler,
    pub transport: MockTransport,
    pub logs: MemorySink,
    pub pool: LocalPool,
    pub ctx: ThemeContext,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(ThemeConfig::default())
    }

    pub fn with_config(config: ThemeConfig) -> Self {
        let doc = MemoryDocument::new();
        let scheduler = ManualScheduler::new();
        let transport = MockTransport::new();
        let logs = MemorySink::new();
        let pool = LocalPool::new();

        let ctx = ThemeContext::builder()
            .config(config)
            .document(Rc::new(doc.clone()))
            .scheduler(Rc::new(scheduler.clone()))
            .executor(Rc::new(pool.spawner()))
            .transport(Rc::new(transport.clone()))
            .logger(StructuredLogger::with_sink(Rc::new(logs.clone())).with_min_level(LogLevel::Debug))
            .build()
            .expect("harness context");

        Self {
            doc,
            scheduler,
            transport,
            logs,
            pool,
            ctx,
        }
    }

    pub fn body(&self) -> Element {
        self.doc.body_element()
    }

    /// Append `<tag id=..>` under `parent`.
    pub fn add(&self, parent: &Element, tag: &str, id: Option<&str>) -> Element {
        self.doc.append(parent, tag, id)
    }

    /// Drive spawned futures until none can make progress.
    pub fn run(&mut self) {
        self.pool.run_until_stalled();
    }

    pub fn errors(&self) -> Vec<String> {
        self.logs
            .at_level(LogLevel::Error)
            .into_iter()
            .map(|e| e.message)
            .collect()
    }
}
