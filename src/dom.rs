//! Browser host: real timers, real nodes, real keyboard.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::{debug, error, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, HtmlElement, KeyboardEvent, Node};

use crate::components::notification::{NoticeBody, NoticeBodyProps};
use crate::components::preview::{PreviewCard, PreviewProps};
use crate::lifecycle::host::{
    InputKind, InputSource, OverlayInput, RenderSurface, Scheduler, Subscription, Task, TimerId,
    Visual,
};
use crate::lifecycle::notice::{Notice, NoticeKind};

const NOTICE_STYLE: &str = "position: fixed; top: 20px; right: 20px; color: white; \
    padding: 1rem 1.5rem; border-radius: 8px; z-index: 10000; \
    box-shadow: 0 8px 25px rgba(0, 0, 0, 0.15); transform: translateX(400px); \
    transition: transform 0.3s ease; max-width: 300px; font-weight: 500;";

const OVERLAY_STYLE: &str = "position: fixed; top: 0; left: 0; width: 100vw; height: 100vh; \
    background: rgba(0, 0, 0, 0.9); display: flex; align-items: center; justify-content: center; \
    z-index: 9999; opacity: 0; transition: opacity 0.3s ease; backdrop-filter: blur(5px);";

const PANEL_STYLE: &str = "background: white; padding: 2.5rem; border-radius: 16px; \
    max-width: 500px; width: 90%; max-height: 90vh; overflow-y: auto; text-align: center; \
    position: relative; margin: 1rem; transform: scale(0.9); transition: transform 0.3s ease; \
    box-shadow: 0 20px 60px rgba(0, 0, 0, 0.3);";

fn notice_background(kind: NoticeKind) -> &'static str {
    match kind {
        NoticeKind::Success => "#22c55e",
        NoticeKind::Error => "#ef4444",
        NoticeKind::Info => "#3b82f6",
    }
}

#[derive(Debug, Clone)]
pub struct DomNode {
    id: u64,
    element: HtmlElement,
}

enum MountKind {
    Notice,
    Overlay { panel: HtmlElement },
}

struct Mount {
    kind: MountKind,
    teardown: Option<Box<dyn FnOnce()>>,
    listeners: Vec<Closure<dyn FnMut(Event)>>,
}

pub struct DomSurface {
    document: Document,
    next_id: Cell<u64>,
    timers: Rc<RefCell<HashMap<u64, Timeout>>>,
    mounts: RefCell<HashMap<u64, Mount>>,
    keyboard: RefCell<HashMap<u64, Closure<dyn FnMut(KeyboardEvent)>>>,
}

impl DomSurface {
    pub fn new() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        Some(Self {
            document,
            next_id: Cell::new(0),
            timers: Rc::new(RefCell::new(HashMap::new())),
            mounts: RefCell::new(HashMap::new()),
            keyboard: RefCell::new(HashMap::new()),
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn issue_id(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn create_div(&self, class: &str, style: &str) -> Result<HtmlElement, JsValue> {
        let element: HtmlElement = self.document.create_element("div")?.dyn_into()?;
        element.set_class_name(class);
        element.set_attribute("style", style)?;
        Ok(element)
    }

    fn attach(&self, element: &HtmlElement) -> Result<(), JsValue> {
        let body = self
            .document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;
        body.append_child(element)?;
        Ok(())
    }

    fn build_notice(&self, notice: &Notice) -> Result<HtmlElement, JsValue> {
        let element = self.create_div("notification", NOTICE_STYLE)?;
        element.set_attribute("role", "status")?;
        element
            .style()
            .set_property("background", notice_background(notice.kind))?;
        self.attach(&element)?;
        Ok(element)
    }

    fn build_overlay(&self) -> Result<(HtmlElement, HtmlElement), JsValue> {
        let overlay = self.create_div("video-modal-overlay", OVERLAY_STYLE)?;
        overlay.set_attribute("role", "dialog")?;
        overlay.set_attribute("aria-modal", "true")?;
        let panel = self.create_div("video-modal-content", PANEL_STYLE)?;
        overlay.append_child(&panel)?;
        self.attach(&overlay)?;
        Ok((overlay, panel))
    }

    fn remember(
        &self,
        element: HtmlElement,
        kind: MountKind,
        teardown: Box<dyn FnOnce()>,
    ) -> DomNode {
        let id = self.issue_id();
        self.mounts.borrow_mut().insert(
            id,
            Mount {
                kind,
                teardown: Some(teardown),
                listeners: Vec::new(),
            },
        );
        DomNode { id, element }
    }
}

impl Scheduler for DomSurface {
    fn after(&self, delay_ms: u32, task: Task) -> TimerId {
        let id = self.issue_id();
        let timers = Rc::clone(&self.timers);
        let timeout = Timeout::new(delay_ms, move || {
            let fired = timers.borrow_mut().remove(&id);
            task();
            drop(fired);
        });
        self.timers.borrow_mut().insert(id, timeout);
        TimerId(id)
    }

    fn cancel(&self, timer: TimerId) {
        let removed = self.timers.borrow_mut().remove(&timer.0);
        if let Some(timeout) = removed {
            drop(timeout.cancel());
        }
    }
}

impl InputSource for DomSurface {
    fn subscribe(&self, kind: InputKind, mut handler: Box<dyn FnMut()>) -> Subscription {
        let id = self.issue_id();
        let callback = Closure::wrap(Box::new(move |event: KeyboardEvent| match kind {
            InputKind::Cancel if event.key() == "Escape" => handler(),
            InputKind::Cancel => {}
        }) as Box<dyn FnMut(KeyboardEvent)>);

        if let Err(err) = self
            .document
            .add_event_listener_with_callback("keydown", callback.as_ref().unchecked_ref())
        {
            error!("Failed to listen for {:?}: {:?}", kind, err);
        }
        self.keyboard.borrow_mut().insert(id, callback);
        Subscription(id)
    }

    fn unsubscribe(&self, subscription: Subscription) {
        let removed = self.keyboard.borrow_mut().remove(&subscription.0);
        let Some(callback) = removed else {
            return;
        };
        if let Err(err) = self
            .document
            .remove_event_listener_with_callback("keydown", callback.as_ref().unchecked_ref())
        {
            warn!("Failed to stop listening for {:?}: {:?}", subscription, err);
        }
    }
}

impl RenderSurface for DomSurface {
    type Node = DomNode;
    type Content = PreviewProps;

    fn mount_notice(&self, notice: &Notice) -> Option<DomNode> {
        let element = match self.build_notice(notice) {
            Ok(element) => element,
            Err(err) => {
                warn!("Could not mount notice: {:?}", err);
                return None;
            }
        };
        let handle = yew::Renderer::<NoticeBody>::with_root_and_props(
            element.clone().into(),
            NoticeBodyProps {
                message: notice.message.clone(),
                kind: notice.kind,
            },
        )
        .render();
        Some(self.remember(element, MountKind::Notice, Box::new(move || handle.destroy())))
    }

    fn mount_overlay(&self, content: PreviewProps) -> Option<DomNode> {
        let (overlay, panel) = match self.build_overlay() {
            Ok(nodes) => nodes,
            Err(err) => {
                warn!("Could not mount overlay: {:?}", err);
                return None;
            }
        };
        let root: Element = panel.clone().into();
        let handle = yew::Renderer::<PreviewCard>::with_root_and_props(root, content).render();
        Some(self.remember(
            overlay,
            MountKind::Overlay { panel },
            Box::new(move || handle.destroy()),
        ))
    }

    fn bind_overlay(&self, node: &DomNode, handler: Rc<dyn Fn(OverlayInput)>) {
        let root: Node = node.element.clone().into();
        // One delegated listener: the card is rendered by Yew after this runs.
        let callback = Closure::wrap(Box::new(move |event: Event| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            if target.is_same_node(Some(&root)) {
                handler(OverlayInput::Backdrop);
            } else if let Ok(Some(_)) = target.closest(".close-modal, .close-modal-btn") {
                event.prevent_default();
                event.stop_propagation();
                handler(OverlayInput::CloseControl);
            } else if let Ok(Some(link)) = target.closest(".modal-enroll-btn") {
                let label = link.text_content().unwrap_or_default().trim().to_string();
                handler(OverlayInput::Link { label });
            }
        }) as Box<dyn FnMut(Event)>);

        if let Err(err) = node
            .element
            .add_event_listener_with_callback("click", callback.as_ref().unchecked_ref())
        {
            error!("Failed to bind overlay input: {:?}", err);
            return;
        }
        match self.mounts.borrow_mut().get_mut(&node.id) {
            Some(mount) => mount.listeners.push(callback),
            None => debug!("Bound input to unknown node {}", node.id),
        }
    }

    fn set_visual(&self, node: &DomNode, visual: Visual) {
        let mounts = self.mounts.borrow();
        let Some(mount) = mounts.get(&node.id) else {
            return;
        };
        let style = node.element.style();
        let result = match (&mount.kind, visual) {
            (MountKind::Notice, Visual::Hidden) => {
                style.set_property("transform", "translateX(400px)")
            }
            (MountKind::Notice, Visual::Shown) => style.set_property("transform", "translateX(0)"),
            (MountKind::Overlay { panel }, Visual::Hidden) => style
                .set_property("opacity", "0")
                .and_then(|_| panel.style().set_property("transform", "scale(0.9)")),
            (MountKind::Overlay { panel }, Visual::Shown) => style
                .set_property("opacity", "1")
                .and_then(|_| panel.style().set_property("transform", "scale(1)")),
        };
        if let Err(err) = result {
            warn!("Could not apply {:?} to node {}: {:?}", visual, node.id, err);
        }
    }

    fn unmount(&self, node: &DomNode) {
        let removed = self.mounts.borrow_mut().remove(&node.id);
        if let Some(mut mount) = removed {
            if let Some(teardown) = mount.teardown.take() {
                teardown();
            }
            node.element.remove();
            drop(mount.listeners);
        }
    }

    fn is_mounted(&self, node: &DomNode) -> bool {
        self.mounts.borrow().contains_key(&node.id) && node.element.is_connected()
    }

    fn set_scroll_locked(&self, locked: bool) {
        let Some(body) = self.document.body() else {
            return;
        };
        let style = body.style();
        let result = if locked {
            style.set_property("overflow", "hidden")
        } else {
            style.remove_property("overflow").map(|_| ())
        };
        if let Err(err) = result {
            warn!("Could not toggle scroll lock: {:?}", err);
        }
    }
}
