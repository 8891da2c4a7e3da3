//! Wiring between the pre-rendered landing page markup and the managers.

use std::rc::Rc;

use log::{error, info};
use serde_json::Value;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, EventTarget, HtmlElement};

use crate::analytics::{AnalyticsLog, EventSink};
use crate::config;
use crate::dom::DomSurface;
use crate::lifecycle::host::Scheduler;
use crate::lifecycle::notice::NoticeManager;
use crate::lifecycle::overlay::OverlayController;

pub mod a11y;
pub mod contact;
pub mod counter;
pub mod enroll;
pub mod faq;
pub mod preview;
pub mod resources;
pub mod scroll;
pub mod tracking;

/// Everything a section handler needs. Cheap to clone into closures.
#[derive(Clone)]
pub struct Page {
    host: Rc<DomSurface>,
    sink: Rc<AnalyticsLog>,
    notices: NoticeManager<DomSurface>,
    overlay: OverlayController<DomSurface>,
}

impl Page {
    pub fn new(host: Rc<DomSurface>, sink: Rc<AnalyticsLog>) -> Self {
        let notices = NoticeManager::new(Rc::clone(&host), sink.clone());
        let overlay = OverlayController::new(Rc::clone(&host), sink.clone());
        {
            let notices = notices.clone();
            overlay.on_link(move |_| {
                notices.success("Opening enrollment form...", config::QUICK_NOTICE_MS);
            });
        }
        Self {
            host,
            sink,
            notices,
            overlay,
        }
    }

    pub fn document(&self) -> &Document {
        self.host.document()
    }

    pub fn record(&self, name: &str, properties: Value) {
        self.sink.record(name, properties);
    }

    /// Shrinks `element` to `scale` for a moment, as click feedback.
    pub fn press(&self, element: &HtmlElement, scale: &str) {
        let _ = element
            .style()
            .set_property("transform", &format!("scale({})", scale));
        let element = element.clone();
        self.host.after(
            config::PRESS_FEEDBACK_MS,
            Box::new(move || {
                let _ = element.style().remove_property("transform");
            }),
        );
    }
}

/// Wires every section. A section that fails is logged and skipped.
pub fn enhance(page: &Page) {
    info!("Initializing Dreams Academy landing page");

    let steps: [(&str, fn(&Page) -> Result<(), JsValue>); 9] = [
        ("enroll buttons", enroll::wire),
        ("preview video", preview::wire),
        ("faq accordion", faq::wire),
        ("resource buttons", resources::wire),
        ("scroll reveal", scroll::wire_reveal),
        ("whatsapp button", contact::wire),
        ("scroll to top", scroll::wire_scroll_top),
        ("counter", counter::wire),
        ("accessibility", a11y::wire),
    ];
    for (name, step) in steps {
        if let Err(err) = step(page) {
            error!("Failed to set up {}: {:?}", name, err);
        }
    }

    info!("Landing page initialization complete");
}

pub fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(list) = document.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn text_of(element: &Element) -> String {
    element.text_content().unwrap_or_default().trim().to_string()
}

/// Adds a listener that lives as long as the page.
pub fn listen(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}

/// Appends a `<style id=...>` to the head unless one with that id exists.
pub fn ensure_style(document: &Document, id: &str, css: &str) -> Result<(), JsValue> {
    if document.get_element_by_id(id).is_some() {
        return Ok(());
    }
    let Some(head) = document.head() else {
        return Ok(());
    };
    let style = document.create_element("style")?;
    style.set_id(id);
    style.set_text_content(Some(css));
    head.append_child(&style)?;
    Ok(())
}

/// Drops inline handlers and Bootstrap toggles left by older page scripts.
pub fn strip_legacy_handlers(element: &Element) -> Result<(), JsValue> {
    if let Some(html) = element.dyn_ref::<HtmlElement>() {
        html.set_onclick(None);
    }
    element.remove_attribute("data-bs-toggle")?;
    element.remove_attribute("data-bs-target")?;
    Ok(())
}
