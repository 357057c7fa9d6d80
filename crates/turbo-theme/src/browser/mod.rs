//! Browser backend: live DOM, `fetch`, `setTimeout` and `spawn_local`.
//!
//! The page loads the wasm module and calls `boot()`. Routes published by
//! the host as `window.routes` override the defaults, and every event on the
//! bus is re-dispatched on `document` as a `CustomEvent` carrying the same
//! JSON payload in `detail`. Log lines go to the devtools console.

mod console;
mod dom;
mod fetch;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use futures::future::LocalBoxFuture;
use turbo_theme_core::timer::Task;
use turbo_theme_core::{EventBus, Executor, Scheduler, ThemeConfig, TimerHandle};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub use console::ConsoleSink;
pub use dom::{WebDocument, WebElement};
pub use fetch::FetchTransport;

use crate::{ThemeContext, ThemeError, ThemeRuntime};

thread_local! {
    static RUNTIME: RefCell<Option<ThemeRuntime>> = const { RefCell::new(None) };
}

/// Runs tasks with `window.setTimeout`.
#[derive(Debug, Clone)]
pub struct TimeoutScheduler {
    window: web_sys::Window,
}

impl TimeoutScheduler {
    pub fn new(window: web_sys::Window) -> Self {
        Self { window }
    }
}

impl Scheduler for TimeoutScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        let handle = TimerHandle::new();
        let timer = handle.clone();
        let callback = Closure::once_into_js(move || timer.fire(task));
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);

        if self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
            .is_err()
        {
            handle.cancel();
        }
        handle
    }
}

/// Spawns futures on the browser microtask queue.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpawnLocal;

impl Executor for SpawnLocal {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}

/// Start the theme on the current page, now or on `DOMContentLoaded`.
#[wasm_bindgen]
pub fn boot() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let config = page_config(&window);

    let loading = js_sys::Reflect::get(&document, &JsValue::from_str("readyState"))
        .ok()
        .and_then(|state| state.as_string())
        .is_some_and(|state| state == "loading");

    if !loading {
        return start(window, document, config).map_err(to_js);
    }

    let target = document.clone();
    let on_ready = Closure::once_into_js(move || {
        if let Err(err) = start(window, document, config) {
            web_sys::console::error_1(&to_js(err));
        }
    });
    target.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())
}

/// Format minor units with the running theme's money settings.
#[wasm_bindgen(js_name = formatMoney)]
pub fn format_money(cents: f64) -> String {
    let cents = cents.round() as i64;
    RUNTIME.with(|slot| match slot.borrow().as_ref() {
        Some(runtime) => runtime.format_money(cents),
        None => ThemeConfig::default().money_formatter().format_cents(cents),
    })
}

fn start(
    window: web_sys::Window,
    document: web_sys::Document,
    config: ThemeConfig,
) -> Result<(), ThemeError> {
    let bus = EventBus::new();
    let mirror_target = document.clone();
    bus.set_mirror(Rc::new(move |name, payload| {
        dispatch_custom_event(&mirror_target, name, &payload);
    }));

    let context = ThemeContext::builder()
        .config(config)
        .document(Rc::new(WebDocument::new(document)))
        .scheduler(Rc::new(TimeoutScheduler::new(window.clone())))
        .executor(Rc::new(SpawnLocal))
        .transport(Rc::new(FetchTransport::new(window)))
        .bus(bus)
        .log_sink(Rc::new(ConsoleSink))
        .build()?;

    let runtime = ThemeRuntime::start(context);
    RUNTIME.with(|slot| *slot.borrow_mut() = Some(runtime));
    Ok(())
}

/// Defaults overlaid with the host's `window.routes` table, when present.
fn page_config(window: &web_sys::Window) -> ThemeConfig {
    let mut config = ThemeConfig::default();

    let routes = js_sys::Reflect::get(window, &JsValue::from_str("routes"))
        .ok()
        .filter(|routes| routes.is_object())
        .and_then(|routes| js_sys::JSON::stringify(&routes).ok())
        .and_then(|json| json.as_string())
        .and_then(|json| serde_json::from_str::<serde_json::Value>(&json).ok());
    if let Some(routes) = routes {
        config.routes.merge_host_routes(&routes);
    }

    config
}

fn dispatch_custom_event(document: &web_sys::Document, name: &str, payload: &serde_json::Value) {
    let detail = js_sys::JSON::parse(&payload.to_string()).unwrap_or(JsValue::NULL);
    let init = web_sys::CustomEventInit::new();
    init.set_detail(&detail);
    if let Ok(event) = web_sys::CustomEvent::new_with_event_init_dict(name, &init) {
        let _ = document.dispatch_event(&event);
    }
}

fn to_js(err: ThemeError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
