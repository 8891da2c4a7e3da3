use log::{error, info};
use serde_json::json;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::ErrorEvent;

use super::{listen, Page};

/// Uncaught script errors and the page load time, both as analytics events.
pub fn wire(page: &Page) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

    {
        let page = page.clone();
        listen(&window, "error", move |event| {
            let Some(event) = event.dyn_ref::<ErrorEvent>() else {
                return;
            };
            error!("JavaScript error: {}", event.message());
            page.record(
                "javascript_error",
                json!({
                    "message": event.message(),
                    "filename": event.filename(),
                    "line": event.lineno(),
                }),
            );
        })?;
    }

    // The module may start after `load` already fired.
    if load_finished(&page.document().ready_state()) {
        record_load(page);
    } else {
        let page = page.clone();
        listen(&window, "load", move |_| record_load(&page))?;
    }
    Ok(())
}

/// `load` has already fired once `readyState` reaches `"complete"`.
fn load_finished(ready_state: &str) -> bool {
    ready_state == "complete"
}

fn record_load(page: &Page) {
    let Some(load_time) = web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now().round())
    else {
        return;
    };
    info!("Page loaded in {}ms", load_time);
    page.record("page_load_complete", json!({ "load_time": load_time as u64 }));
}
