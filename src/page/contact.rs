use serde_json::Value;
use wasm_bindgen::JsValue;

use super::{listen, Page};
use crate::config;

pub fn wire(page: &Page) -> Result<(), JsValue> {
    let Some(button) = page.document().query_selector(".whatsapp-float")? else {
        return Ok(());
    };
    let page = page.clone();
    listen(&button, "click", move |_| {
        page.notices
            .success("Opening WhatsApp chat...", config::QUICK_NOTICE_MS);
        page.record("whatsapp_click", Value::Null);
    })
}
