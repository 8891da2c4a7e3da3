use std::rc::Rc;

use log::{error, info};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Document;

mod analytics;
mod config;
mod dom;
mod page;
mod components {
    pub mod notification;
    pub mod preview;
}
mod lifecycle {
    pub mod host;
    pub mod notice;
    pub mod overlay;
}
#[cfg(test)]
mod sim;

use analytics::AnalyticsLog;
use dom::DomSurface;
use page::Page;

/// `document.readyState` is `"loading"` until the parser is done.
fn markup_parsed(ready_state: &str) -> bool {
    ready_state != "loading"
}

/// Runs `init` once the markup is parsed.
fn when_ready(document: &Document, init: impl FnOnce() + 'static) {
    if markup_parsed(&document.ready_state()) {
        init();
        return;
    }
    let callback = Closure::once_into_js(init);
    if let Err(err) =
        document.add_event_listener_with_callback("DOMContentLoaded", callback.unchecked_ref())
    {
        error!("Failed to wait for DOMContentLoaded: {:?}", err);
    }
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(config::log_level()).expect("error initializing log");

    info!("Dreams Academy enhancements loading");
    let Some(host) = DomSurface::new() else {
        error!("No document to enhance");
        return;
    };
    let landing = Page::new(Rc::new(host), Rc::new(AnalyticsLog::new()));

    if let Err(err) = page::tracking::wire(&landing) {
        error!("Failed to set up page tracking: {:?}", err);
    }

    let document = landing.document().clone();
    when_ready(&document, move || page::enhance(&landing));
}
