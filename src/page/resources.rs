use std::cell::Cell;
use std::rc::Rc;

use log::{debug, info, warn};
use serde_json::json;
use wasm_bindgen::JsValue;
use web_sys::Element;

use super::{listen, query_all, text_of, Page};
use crate::config;
use crate::lifecycle::host::Scheduler;
use crate::lifecycle::notice::NoticeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadPhase {
    Idle,
    Preparing,
    Ready,
}

impl DownloadPhase {
    /// Replacement markup for the button, `None` meaning "put the original back".
    pub fn label(&self) -> Option<&'static str> {
        match self {
            DownloadPhase::Idle => None,
            DownloadPhase::Preparing => {
                Some(r#"<i class="fas fa-spinner fa-spin me-2"></i>Preparing..."#)
            }
            DownloadPhase::Ready => Some(r#"<i class="fas fa-check me-2"></i>Success!"#),
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            DownloadPhase::Idle => "btn-outline-primary",
            DownloadPhase::Preparing => "btn-secondary",
            DownloadPhase::Ready => "btn-success",
        }
    }

    pub fn disabled(&self) -> bool {
        *self != DownloadPhase::Idle
    }
}

/// `jitter` in `[0, 1)`, usually `Math.random()`.
pub fn prepare_delay_ms(jitter: f64) -> u32 {
    let jitter = jitter.clamp(0.0, 1.0);
    config::RESOURCE_PREPARE_MS + (jitter * f64::from(config::RESOURCE_PREPARE_JITTER_MS)) as u32
}

/// Idle → Preparing → Ready → Idle for one button, on any scheduler.
pub struct DownloadFlow<S: Scheduler> {
    scheduler: Rc<S>,
    phase: Rc<Cell<DownloadPhase>>,
    render: Rc<dyn Fn(DownloadPhase)>,
    on_ready: Rc<dyn Fn()>,
}

impl<S: Scheduler + 'static> DownloadFlow<S> {
    pub fn new(
        scheduler: Rc<S>,
        render: impl Fn(DownloadPhase) + 'static,
        on_ready: impl Fn() + 'static,
    ) -> Self {
        Self {
            scheduler,
            phase: Rc::new(Cell::new(DownloadPhase::Idle)),
            render: Rc::new(render),
            on_ready: Rc::new(on_ready),
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> DownloadPhase {
        self.phase.get()
    }

    /// Returns `false` if a download is already in flight.
    pub fn start(&self, prepare_ms: u32) -> bool {
        if self.phase.get() != DownloadPhase::Idle {
            return false;
        }
        self.enter(DownloadPhase::Preparing);

        let phase = Rc::clone(&self.phase);
        let render = Rc::clone(&self.render);
        let on_ready = Rc::clone(&self.on_ready);
        let scheduler = Rc::clone(&self.scheduler);
        self.scheduler.after(
            prepare_ms,
            Box::new(move || {
                phase.set(DownloadPhase::Ready);
                render(DownloadPhase::Ready);
                on_ready();

                scheduler.after(
                    config::RESOURCE_RESET_MS,
                    Box::new(move || {
                        phase.set(DownloadPhase::Idle);
                        render(DownloadPhase::Idle);
                    }),
                );
            }),
        );
        true
    }

    fn enter(&self, phase: DownloadPhase) {
        self.phase.set(phase);
        (self.render)(phase);
    }
}

pub fn wire(page: &Page) -> Result<(), JsValue> {
    let buttons = query_all(page.document(), ".resource-btn");

    for (index, button) in buttons.iter().enumerate() {
        let Some(title) = resource_title(button) else {
            warn!("Resource button {} has no .resource-title in its card", index + 1);
            continue;
        };
        debug!("Setting up resource button {}: {}", index + 1, title);

        let original = button.inner_html();
        let render = {
            let button = button.clone();
            move |phase: DownloadPhase| render_button(&button, phase, &original)
        };
        let on_ready = {
            let notices = page.notices.clone();
            let title = title.clone();
            move || {
                notices.notify(
                    format!("{} is ready!", title),
                    NoticeKind::Success,
                    config::NOTICE_DURATION_MS,
                )
            }
        };
        let flow = DownloadFlow::new(Rc::clone(&page.host), render, on_ready);

        let page = page.clone();
        listen(button, "click", move |event| {
            event.prevent_default();
            let delay = prepare_delay_ms(web_sys::js_sys::Math::random());
            if flow.start(delay) {
                info!("Downloading resource: {}", title);
                page.record("resource_download", json!({ "resource_name": title }));
            }
        })?;
    }

    info!("Resource buttons configured: {}", buttons.len());
    Ok(())
}

fn resource_title(button: &Element) -> Option<String> {
    let card = button.closest(".card").ok()??;
    let title = card.query_selector(".resource-title").ok()??;
    Some(text_of(&title))
}

fn render_button(button: &Element, phase: DownloadPhase, original: &str) {
    button.set_inner_html(phase.label().unwrap_or(original));
    let classes = button.class_list();
    for other in [DownloadPhase::Idle, DownloadPhase::Preparing, DownloadPhase::Ready] {
        let _ = classes.remove_1(other.class());
    }
    let _ = classes.add_1(phase.class());
    let _ = if phase.disabled() {
        button.set_attribute("disabled", "")
    } else {
        button.remove_attribute("disabled")
    };
}
