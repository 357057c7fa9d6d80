//! Search-as-you-type product suggestions.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use futures::FutureExt;
use turbo_theme_core::dom::{escape_html, markup, Element, EventKind, Selector};
use turbo_theme_core::{Debouncer, Executor, MoneyFormatter};
use turbo_theme_data::{SearchApi, SearchResult};
use turbo_theme_observability::StructuredLogger;

use crate::{ThemeContext, ThemeError};

const NO_RESULTS_HTML: &str = r#"<div class="p-4 text-gray-500">No products found</div>"#;

/// Debounced suggestions for `#search-input`, rendered into `#search-results`.
///
/// Every search gets a sequence number when it is issued. A response only
/// renders if no newer search has been issued since, so a slow reply for
/// "bo" can never overwrite the results for "boots".
pub struct PredictiveSearch {
    input: Element,
    panel: Option<Element>,
    api: SearchApi,
    money: MoneyFormatter,
    debouncer: Debouncer,
    executor: Rc<dyn Executor>,
    min_chars: usize,
    issued: Cell<u64>,
    logger: StructuredLogger,
}

impl PredictiveSearch {
    /// Bind to the page. Fails when there is no search input. The results
    /// panel is optional; without it searches still run but render nothing.
    pub fn mount(ctx: &ThemeContext) -> Result<Rc<Self>, ThemeError> {
        let input = ctx
            .document
            .query(&Selector::id(markup::SEARCH_INPUT_ID))
            .ok_or(ThemeError::MissingElement("#search-input"))?;
        let panel = ctx.document.query(&Selector::id(markup::SEARCH_RESULTS_ID));

        let this = Rc::new(Self {
            input,
            panel,
            api: ctx.search_api(),
            money: ctx.money(),
            debouncer: Debouncer::new(Rc::clone(&ctx.scheduler), ctx.config.search.debounce()),
            executor: Rc::clone(&ctx.executor),
            min_chars: ctx.config.search.min_query_chars,
            issued: Cell::new(0),
            logger: ctx.logger_for("predictive-search"),
        });
        this.bind(ctx);
        Ok(this)
    }

    /// [`PredictiveSearch::mount`], or `None` when the page has no search input.
    pub fn from_context(ctx: &ThemeContext) -> Option<Rc<Self>> {
        Self::mount(ctx).ok()
    }

    fn bind(self: &Rc<Self>, ctx: &ThemeContext) {
        let weak = Rc::downgrade(self);
        self.input.add_listener(
            EventKind::Input,
            Rc::new(move |event| {
                with(&weak, |search| {
                    let query = event
                        .target()
                        .map(|target| target.value())
                        .unwrap_or_else(|| search.input.value());
                    search.on_input(query);
                });
            }),
        );

        let weak = Rc::downgrade(self);
        self.input.add_listener(
            EventKind::Focus,
            Rc::new(move |_| {
                with(&weak, |search| {
                    if !search.input.value().is_empty() {
                        search.show_results();
                    }
                });
            }),
        );

        let weak = Rc::downgrade(self);
        ctx.document.add_listener(
            EventKind::Click,
            Rc::new(move |event| {
                let inside = event.target().is_some_and(|target| {
                    target
                        .closest(&Selector::class(markup::SEARCH_CONTAINER_CLASS))
                        .is_some()
                });
                if !inside {
                    with(&weak, |search| search.hide_results());
                }
            }),
        );
    }

    /// Restart the debounce window for `query`.
    pub fn on_input(self: &Rc<Self>, query: String) {
        let weak = Rc::downgrade(self);
        self.debouncer.call(move || {
            if let Some(search) = weak.upgrade() {
                search.perform_search(query);
            }
        });
    }

    /// Search now, bypassing the debounce window.
    pub fn perform_search(self: &Rc<Self>, query: String) {
        // Short queries still invalidate any search in flight.
        let seq = self.issued.get() + 1;
        self.issued.set(seq);

        if query.chars().count() < self.min_chars {
            self.hide_results();
            return;
        }

        let this = Rc::clone(self);
        self.executor.spawn(
            async move {
                match this.api.suggest(&query).await {
                    Ok(products) if this.issued.get() == seq => this.display_results(&products),
                    Ok(_) => {
                        this.logger
                            .debug_builder("stale response dropped")
                            .field("query", query)
                            .field_i64("seq", seq as i64)
                            .emit();
                    }
                    Err(err) => this.logger.error_with(
                        "Search error",
                        &[("query", &query), ("error", &err)],
                    ),
                }
            }
            .boxed_local(),
        );
    }

    /// Render `products` into the panel and show it.
    pub fn display_results(&self, products: &[SearchResult]) {
        let Some(panel) = &self.panel else {
            return;
        };

        if products.is_empty() {
            panel.set_inner_html(NO_RESULTS_HTML);
        } else {
            let html: String = products.iter().map(|p| self.render_result(p)).collect();
            panel.set_inner_html(&html);
        }

        self.show_results();
    }

    /// Markup for one suggestion. All product text is escaped.
    pub fn render_result(&self, product: &SearchResult) -> String {
        let title = escape_html(&product.title);
        format!(
            concat!(
                r#"<a href="{url}" class="flex items-center p-3 hover:bg-gray-50">"#,
                r#"<img src="{image}" alt="{title}" class="w-12 h-12 object-cover rounded mr-3">"#,
                r#"<div><div class="font-medium">{title}</div>"#,
                r#"<div class="text-sm text-gray-600">{price}</div></div></a>"#,
            ),
            url = escape_html(&product.url),
            image = escape_html(product.featured_image.as_deref().unwrap_or_default()),
            title = title,
            price = escape_html(&self.money.format_cents(product.price)),
        )
    }

    pub fn show_results(&self) {
        if let Some(panel) = &self.panel {
            panel.remove_class(markup::HIDDEN_CLASS);
        }
    }

    pub fn hide_results(&self) {
        if let Some(panel) = &self.panel {
            panel.add_class(markup::HIDDEN_CLASS);
        }
    }

    /// Whether the panel exists and is not hidden.
    pub fn is_showing(&self) -> bool {
        self.panel
            .as_ref()
            .is_some_and(|panel| !panel.has_class(markup::HIDDEN_CLASS))
    }
}

fn with(weak: &Weak<PredictiveSearch>, f: impl FnOnce(&Rc<PredictiveSearch>)) {
    if let Some(search) = weak.upgrade() {
        f(&search);
    }
}
