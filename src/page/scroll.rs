use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::debug;
use serde_json::Value;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Array;
use web_sys::{
    Element, HtmlElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    ScrollBehavior, ScrollToOptions,
};

use super::{ensure_style, listen, query_all, Page};
use crate::config;
use crate::lifecycle::host::{Scheduler, Task, TimerId};

const REVEAL_SELECTOR: &str = ".benefit-card, .resource-card, .testimonial-card, \
    .frustrations-card, .solutions-card, .partner-logo";

const REVEAL_CSS: &str = r#"
    .animate-element {
        opacity: 0;
        transform: translateY(30px);
        transition: opacity 0.6s ease, transform 0.6s ease;
    }
    .animate-in {
        opacity: 1;
        transform: translateY(0);
    }
"#;

const SCROLL_TOP_STYLE: &str = "position: fixed; bottom: 100px; right: 20px; width: 50px; \
    height: 50px; background: #ff6b35; color: white; border: none; border-radius: 50%; \
    cursor: pointer; opacity: 0; transform: translateY(20px); transition: all 0.3s ease; \
    z-index: 999; font-size: 1.2rem; box-shadow: 0 4px 15px rgba(255, 107, 53, 0.3);";

/// Trailing-edge debounce: only the last task in a burst runs, `wait_ms`
/// after the burst ends.
pub struct Debouncer<S: Scheduler> {
    scheduler: Rc<S>,
    wait_ms: u32,
    pending: Cell<Option<TimerId>>,
}

impl<S: Scheduler> Debouncer<S> {
    pub fn new(scheduler: Rc<S>, wait_ms: u32) -> Self {
        Self {
            scheduler,
            wait_ms,
            pending: Cell::new(None),
        }
    }

    pub fn call(&self, task: Task) {
        if let Some(timer) = self.pending.take() {
            self.scheduler.cancel(timer);
        }
        self.pending.set(Some(self.scheduler.after(self.wait_ms, task)));
    }
}

pub fn scroll_top_visible(offset: f64) -> bool {
    offset > config::SCROLL_TOP_THRESHOLD_PX
}

/// Runs `on_visible` once per element the first time it scrolls into view.
pub fn observe_once(
    elements: &[Element],
    threshold: f64,
    root_margin: Option<&str>,
    mut on_visible: impl FnMut(&Element) + 'static,
) -> Result<(), JsValue> {
    let callback = Closure::wrap(Box::new(move |entries: Array, observer: IntersectionObserver| {
        for entry in entries.iter() {
            let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                continue;
            };
            if entry.is_intersecting() {
                let target = entry.target();
                on_visible(&target);
                observer.unobserve(&target);
            }
        }
    }) as Box<dyn FnMut(Array, IntersectionObserver)>);

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(threshold));
    if let Some(margin) = root_margin {
        options.set_root_margin(margin);
    }
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;
    for element in elements {
        observer.observe(element);
    }
    callback.forget();
    Ok(())
}

pub fn wire_reveal(page: &Page) -> Result<(), JsValue> {
    let document = page.document();
    let elements = query_all(document, REVEAL_SELECTOR);
    for element in &elements {
        element.class_list().add_1("animate-element")?;
    }
    observe_once(&elements, 0.1, Some("0px 0px -50px 0px"), |element| {
        let _ = element.class_list().add_1("animate-in");
    })?;
    ensure_style(document, "scroll-animations", REVEAL_CSS)?;
    debug!("Scroll reveal observing {} elements", elements.len());
    Ok(())
}

pub fn wire_scroll_top(page: &Page) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let debouncer = Rc::new(Debouncer::new(Rc::clone(&page.host), config::SCROLL_DEBOUNCE_MS));
    let button: Rc<RefCell<Option<HtmlElement>>> = Rc::new(RefCell::new(None));

    let page = page.clone();
    let scroll_window = window.clone();
    listen(&window, "scroll", move |_| {
        let page = page.clone();
        let button = Rc::clone(&button);
        let window = scroll_window.clone();
        debouncer.call(Box::new(move || {
            let Some(button) = scroll_top_button(&page, &button) else {
                return;
            };
            let offset = window.scroll_y().unwrap_or_default();
            let style = button.style();
            let (opacity, transform) = if scroll_top_visible(offset) {
                ("1", "translateY(0)")
            } else {
                ("0", "translateY(20px)")
            };
            let _ = style.set_property("opacity", opacity);
            let _ = style.set_property("transform", transform);
        }));
    })
}

/// The scroll-to-top button, created on first use.
fn scroll_top_button(page: &Page, slot: &RefCell<Option<HtmlElement>>) -> Option<HtmlElement> {
    if let Some(button) = slot.borrow().as_ref() {
        return Some(button.clone());
    }
    let document = page.document();
    let button: HtmlElement = document.create_element("button").ok()?.dyn_into().ok()?;
    button.set_inner_html(r#"<i class="fas fa-arrow-up"></i>"#);
    button.set_attribute("aria-label", "Scroll to top").ok()?;
    button.set_attribute("style", SCROLL_TOP_STYLE).ok()?;

    let clicked = page.clone();
    listen(&button, "click", move |_| {
        if let Some(window) = web_sys::window() {
            let options = ScrollToOptions::new();
            options.set_top(0.0);
            options.set_behavior(ScrollBehavior::Smooth);
            window.scroll_to_with_scroll_to_options(&options);
        }
        clicked.record("scroll_to_top_clicked", Value::Null);
    })
    .ok()?;

    document.body()?.append_child(&button).ok()?;
    *slot.borrow_mut() = Some(button.clone());
    Some(button)
}
