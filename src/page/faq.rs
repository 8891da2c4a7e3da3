use log::{debug, error, info};
use serde_json::json;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlElement;

use super::{listen, query_all, text_of, Page};

/// Bootstrap runs the accordion itself; we only report which question was opened.
pub fn wire(page: &Page) -> Result<(), JsValue> {
    let buttons = query_all(page.document(), ".accordion-button");

    for (index, button) in buttons.iter().enumerate() {
        let question = text_of(button);
        let Some(target) = button.get_attribute("data-bs-target") else {
            error!("FAQ button {} missing data-bs-target", index + 1);
            continue;
        };
        debug!("Setting up FAQ button {}: {}", index + 1, question);

        if let Some(html) = button.dyn_ref::<HtmlElement>() {
            html.set_onclick(None);
        }
        let page = page.clone();
        listen(button, "click", move |_| {
            page.record(
                "faq_clicked",
                json!({ "question": question, "target": target }),
            );
        })?;
    }

    info!("FAQ accordion configured with {} questions", buttons.len());
    Ok(())
}
