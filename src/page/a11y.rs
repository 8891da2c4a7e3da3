use wasm_bindgen::{JsCast, JsValue};
use web_sys::KeyboardEvent;

use super::{ensure_style, listen, Page};

const KEYBOARD_CLASS: &str = "keyboard-navigation";

const FOCUS_CSS: &str = r#"
    .keyboard-navigation *:focus {
        outline: 3px solid #ff6b35 !important;
        outline-offset: 2px !important;
    }
"#;

/// Focus rings only while the visitor is navigating with the keyboard.
pub fn wire(page: &Page) -> Result<(), JsValue> {
    let document = page.document().clone();

    {
        let document = document.clone();
        listen(page.document(), "keydown", move |event| {
            let is_tab = event
                .dyn_ref::<KeyboardEvent>()
                .is_some_and(|key| key.key() == "Tab");
            if let (true, Some(body)) = (is_tab, document.body()) {
                let _ = body.class_list().add_1(KEYBOARD_CLASS);
            }
        })?;
    }
    {
        let document = document.clone();
        listen(page.document(), "mousedown", move |_| {
            if let Some(body) = document.body() {
                let _ = body.class_list().remove_1(KEYBOARD_CLASS);
            }
        })?;
    }

    ensure_style(&document, "accessibility-styles", FOCUS_CSS)
}
