use log::{debug, error, info};
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlElement, KeyboardEvent};

use super::{listen, strip_legacy_handlers, Page};
use crate::components::preview::PreviewProps;

pub fn wire(page: &Page) -> Result<(), JsValue> {
    // A page restored from the back/forward cache must not come back scroll-locked.
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    {
        let page = page.clone();
        listen(&window, "pagehide", move |_| {
            if page.overlay.close() {
                debug!("Closed preview before page hide");
            }
        })?;
    }

    let document = page.document();
    let Some(play) = document.query_selector(".play-button")? else {
        error!("Play button not found");
        return Ok(());
    };
    let play: HtmlElement = play.dyn_into()?;

    strip_legacy_handlers(&play)?;
    play.set_attribute("tabindex", "0")?;
    play.set_attribute("role", "button")?;
    play.set_attribute("aria-label", "Play course preview video")?;

    {
        let page = page.clone();
        listen(&play, "click", move |event| {
            event.prevent_default();
            event.stop_propagation();
            play_preview(&page);
        })?;
    }
    {
        let page = page.clone();
        listen(&play, "keydown", move |event| {
            let activated = event
                .dyn_ref::<KeyboardEvent>()
                .is_some_and(|key| matches!(key.key().as_str(), "Enter" | " "));
            if activated {
                event.prevent_default();
                event.stop_propagation();
                play_preview(&page);
            }
        })?;
    }

    if let Some(thumbnail) = document.query_selector(".video-thumbnail")? {
        if let Some(thumbnail) = thumbnail.dyn_ref::<HtmlElement>() {
            thumbnail.style().set_property("cursor", "pointer")?;
        }
        let page = page.clone();
        listen(&thumbnail, "click", move |event| {
            event.prevent_default();
            event.stop_propagation();
            play_preview(&page);
        })?;
    }

    info!("Video play button configured");
    Ok(())
}

fn play_preview(page: &Page) {
    if let Ok(Some(play)) = page.document().query_selector(".play-button") {
        if let Some(play) = play.dyn_ref::<HtmlElement>() {
            page.press(play, "0.9");
        }
    }
    page.overlay.open(PreviewProps::course_preview());
    page.record("video_play_attempted", Value::Null);
}
