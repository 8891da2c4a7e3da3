//! Single full-screen overlay with animated open/close and three ways out.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, warn};
use serde_json::{json, Value};

use super::host::{Host, InputKind, OverlayInput, Subscription, TimerId, Visual};
use crate::analytics::EventSink;
use crate::config::{self, OverlayEvents};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissTrigger {
    CloseControl,
    Backdrop,
    Escape,
    Programmatic,
}

impl DismissTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            DismissTrigger::CloseControl => "close_control",
            DismissTrigger::Backdrop => "backdrop",
            DismissTrigger::Escape => "escape",
            DismissTrigger::Programmatic => "programmatic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPhase {
    Absent,
    Opening,
    Open,
    Closing,
}

struct Mounted<N> {
    generation: u64,
    node: N,
    phase: OverlayPhase,
    timers: Vec<TimerId>,
    cancel_listener: Option<Subscription>,
}

type LinkHook = Rc<dyn Fn(&str)>;

struct Inner<H: Host> {
    host: Rc<H>,
    sink: Rc<dyn EventSink>,
    events: OverlayEvents,
    slot: RefCell<Option<Mounted<H::Node>>>,
    generation: Cell<u64>,
    scroll_locked: Cell<bool>,
    link_hook: RefCell<Option<LinkHook>>,
}

pub struct OverlayController<H: Host> {
    inner: Rc<Inner<H>>,
}

impl<H: Host> Clone for OverlayController<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<H: Host + 'static> OverlayController<H> {
    pub fn new(host: Rc<H>, sink: Rc<dyn EventSink>) -> Self {
        Self::with_events(host, sink, OverlayEvents::default())
    }

    pub fn with_events(host: Rc<H>, sink: Rc<dyn EventSink>, events: OverlayEvents) -> Self {
        Self {
            inner: Rc::new(Inner {
                host,
                sink,
                events,
                slot: RefCell::new(None),
                generation: Cell::new(0),
                scroll_locked: Cell::new(false),
                link_hook: RefCell::new(None),
            }),
        }
    }

    /// Called with the link label whenever an interior link is activated.
    pub fn on_link(&self, hook: impl Fn(&str) + 'static) {
        *self.inner.link_hook.borrow_mut() = Some(Rc::new(hook));
    }

    /// Mounts `content`, replacing any overlay already on the surface.
    pub fn open(&self, content: H::Content) {
        let inner = &self.inner;
        inner.discard();

        let Some(node) = inner.host.mount_overlay(content) else {
            warn!("No surface to mount overlay on");
            inner.lock_scroll(false);
            return;
        };
        let generation = inner.generation.get() + 1;
        inner.generation.set(generation);
        inner.lock_scroll(true);

        let weak = Rc::downgrade(inner);
        inner.host.bind_overlay(
            &node,
            Rc::new(move |input: OverlayInput| {
                if let Some(inner) = weak.upgrade() {
                    inner.handle_input(generation, input);
                }
            }),
        );
        let weak = Rc::downgrade(inner);
        let cancel_listener = inner.host.subscribe(
            InputKind::Cancel,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.dismiss(Some(generation), DismissTrigger::Escape);
                }
            }),
        );

        *inner.slot.borrow_mut() = Some(Mounted {
            generation,
            node,
            phase: OverlayPhase::Opening,
            timers: Vec::new(),
            cancel_listener: Some(cancel_listener),
        });

        let weak = Rc::downgrade(inner);
        let reveal = inner.host.next_tick(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.reveal(generation);
            }
        }));
        inner.track(generation, reveal);

        inner.sink.record(&inner.events.opened, Value::Null);
        debug!("Overlay {} opened", generation);
    }

    /// Starts closing the current overlay. Returns `false` when there was
    /// nothing to close or it was already closing.
    pub fn close(&self) -> bool {
        self.inner.dismiss(None, DismissTrigger::Programmatic)
    }

    #[cfg(test)]
    pub fn phase(&self) -> OverlayPhase {
        self.inner.phase_of(None)
    }

    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        matches!(self.phase(), OverlayPhase::Opening | OverlayPhase::Open)
    }
}

impl<H: Host + 'static> Inner<H> {
    fn track(&self, generation: u64, timer: TimerId) {
        match self.slot.borrow_mut().as_mut() {
            Some(mounted) if mounted.generation == generation => mounted.timers.push(timer),
            _ => self.host.cancel(timer),
        }
    }

    fn lock_scroll(&self, locked: bool) {
        if self.scroll_locked.replace(locked) != locked {
            self.host.set_scroll_locked(locked);
        }
    }

    fn current(&self, generation: Option<u64>) -> Option<(u64, H::Node, OverlayPhase)> {
        self.slot
            .borrow()
            .as_ref()
            .filter(|mounted| generation.map_or(true, |g| g == mounted.generation))
            .map(|mounted| (mounted.generation, mounted.node.clone(), mounted.phase))
    }

    fn phase_of(&self, generation: Option<u64>) -> OverlayPhase {
        self.current(generation)
            .map_or(OverlayPhase::Absent, |(_, _, phase)| phase)
    }

    fn reveal(&self, generation: u64) {
        let Some((_, node, OverlayPhase::Opening)) = self.current(Some(generation)) else {
            return;
        };
        if !self.host.is_mounted(&node) {
            return;
        }
        self.host.set_visual(&node, Visual::Shown);
        if let Some(mounted) = self.slot.borrow_mut().as_mut() {
            mounted.phase = OverlayPhase::Open;
        }
    }

    fn handle_input(self: &Rc<Self>, generation: u64, input: OverlayInput) {
        match input {
            OverlayInput::CloseControl => {
                self.dismiss(Some(generation), DismissTrigger::CloseControl);
            }
            OverlayInput::Backdrop => {
                self.dismiss(Some(generation), DismissTrigger::Backdrop);
            }
            OverlayInput::Link { label } => {
                if self.phase_of(Some(generation)) == OverlayPhase::Absent {
                    return;
                }
                self.sink.record(
                    &self.events.link,
                    json!({
                        "source": self.events.source,
                        "button_text": label,
                    }),
                );
                let hook = self.link_hook.borrow().clone();
                if let Some(hook) = hook {
                    hook(&label);
                }
            }
        }
    }

    fn dismiss(self: &Rc<Self>, generation: Option<u64>, trigger: DismissTrigger) -> bool {
        let (generation, node, stale_timers) = {
            let mut slot = self.slot.borrow_mut();
            let Some(mounted) = slot.as_mut() else {
                return false;
            };
            if generation.is_some_and(|g| g != mounted.generation)
                || mounted.phase == OverlayPhase::Closing
            {
                return false;
            }
            mounted.phase = OverlayPhase::Closing;
            (
                mounted.generation,
                mounted.node.clone(),
                std::mem::take(&mut mounted.timers),
            )
        };
        for timer in stale_timers {
            self.host.cancel(timer);
        }

        if self.host.is_mounted(&node) {
            self.host.set_visual(&node, Visual::Hidden);
        }
        self.lock_scroll(false);

        let weak = Rc::downgrade(self);
        let detach = self.host.after(
            config::OVERLAY_TRANSITION_MS,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.finish(generation);
                }
            }),
        );
        self.track(generation, detach);

        self.sink
            .record(&self.events.closed, json!({ "trigger": trigger.as_str() }));
        debug!("Overlay {} closing via {}", generation, trigger.as_str());
        true
    }

    fn finish(&self, generation: u64) {
        let mounted = {
            let mut slot = self.slot.borrow_mut();
            if slot.as_ref().map(|m| m.generation) != Some(generation) {
                return;
            }
            slot.take()
        };
        if let Some(mounted) = mounted {
            self.release(mounted);
        }
    }

    /// Drops the current overlay on the spot, without a close transition.
    fn discard(&self) {
        let Some(mounted) = self.slot.borrow_mut().take() else {
            return;
        };
        debug!("Replacing overlay {}", mounted.generation);
        for timer in &mounted.timers {
            self.host.cancel(*timer);
        }
        self.release(mounted);
    }

    fn release(&self, mounted: Mounted<H::Node>) {
        if let Some(listener) = mounted.cancel_listener {
            self.host.unsubscribe(listener);
        }
        if self.host.is_mounted(&mounted.node) {
            self.host.unmount(&mounted.node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::AnalyticsLog;
    use crate::sim::SimHost;

    fn controller() -> (Rc<SimHost>, Rc<AnalyticsLog>, OverlayController<SimHost>) {
        let host = Rc::new(SimHost::new());
        let log = Rc::new(AnalyticsLog::new());
        let overlay = OverlayController::new(Rc::clone(&host), log.clone());
        (host, log, overlay)
    }

    #[test]
    fn open_mounts_hidden_then_reveals_on_next_tick() {
        let (host, log, overlay) = controller();
        overlay.open("preview".to_string());

        assert_eq!(host.overlays(), vec![("preview".to_string(), Visual::Hidden)]);
        assert!(host.scroll_locked());
        assert_eq!(overlay.phase(), OverlayPhase::Opening);
        assert_eq!(log.count("video_modal_opened"), 1);

        host.advance(0);
        assert_eq!(host.overlays()[0].1, Visual::Shown);
        assert_eq!(overlay.phase(), OverlayPhase::Open);
    }

    #[test]
    fn second_open_replaces_first() {
        let (host, _, overlay) = controller();
        overlay.open("X".to_string());
        overlay.open("Y".to_string());

        let overlays = host.overlays();
        assert_eq!(overlays.len(), 1);
        assert_eq!(overlays[0].0, "Y");
        assert_eq!(host.subscription_count(), 1);
        assert!(host.scroll_locked());

        host.advance(1000);
        assert_eq!(host.overlays().len(), 1);
    }

    #[test]
    fn close_is_idempotent() {
        let (host, log, overlay) = controller();
        overlay.open("X".to_string());
        host.advance(0);

        assert!(overlay.close());
        assert!(!overlay.close());
        host.advance(300);
        assert!(!overlay.close());

        assert_eq!(log.count("video_modal_closed"), 1);
        assert_eq!(host.unmount_count(), 1);
        assert!(host.overlays().is_empty());
    }

    #[test]
    fn escape_closes_once_and_releases_listener() {
        let (host, log, overlay) = controller();
        overlay.open("X".to_string());
        host.advance(0);

        host.press_escape();
        assert_eq!(overlay.phase(), OverlayPhase::Closing);
        assert_eq!(host.overlays()[0].1, Visual::Hidden);

        host.press_escape();
        host.advance(300);
        host.press_escape();

        assert_eq!(log.count("video_modal_closed"), 1);
        assert_eq!(log.last("video_modal_closed").unwrap().properties["trigger"], "escape");
        assert_eq!(host.subscription_count(), 0);
        assert!(host.overlays().is_empty());
    }

    #[test]
    fn close_control_and_backdrop_share_one_close() {
        let (host, log, overlay) = controller();
        overlay.open("X".to_string());
        host.advance(0);

        host.overlay_input(OverlayInput::Backdrop);
        host.overlay_input(OverlayInput::CloseControl);
        host.press_escape();
        host.advance(300);

        assert_eq!(log.count("video_modal_closed"), 1);
        assert_eq!(log.last("video_modal_closed").unwrap().properties["trigger"], "backdrop");
        assert_eq!(host.unmount_count(), 1);
    }

    #[test]
    fn scroll_lock_tracks_open_overlay() {
        let (host, _, overlay) = controller();
        assert!(!host.scroll_locked());

        overlay.open("X".to_string());
        overlay.open("Y".to_string());
        assert!(host.scroll_locked());
        assert_eq!(host.scroll_lock_changes(), 1);

        overlay.close();
        assert!(!host.scroll_locked());
        host.advance(300);
        assert!(!host.scroll_locked());
        assert_eq!(host.scroll_lock_changes(), 2);
    }

    #[test]
    fn closing_before_reveal_never_shows_overlay() {
        let (host, _, overlay) = controller();
        overlay.open("X".to_string());
        overlay.close();

        host.advance(0);
        assert_eq!(host.overlays()[0].1, Visual::Hidden);
        host.advance(300);
        assert!(host.overlays().is_empty());
    }

    #[test]
    fn reopen_while_closing_keeps_new_overlay() {
        let (host, log, overlay) = controller();
        overlay.open("X".to_string());
        host.advance(0);
        overlay.close();
        host.advance(100);

        overlay.open("Y".to_string());
        assert!(host.scroll_locked());
        host.advance(500);

        assert_eq!(host.overlays(), vec![("Y".to_string(), Visual::Shown)]);
        assert_eq!(overlay.phase(), OverlayPhase::Open);
        assert_eq!(log.count("video_modal_opened"), 2);
        assert_eq!(host.subscription_count(), 1);
    }

    #[test]
    fn interior_link_reports_without_closing() {
        let (host, log, overlay) = controller();
        let clicked = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&clicked);
        overlay.on_link(move |label| seen.borrow_mut().push(label.to_string()));

        overlay.open("X".to_string());
        host.advance(0);
        host.overlay_input(OverlayInput::Link {
            label: "Enroll Now".to_string(),
        });

        assert!(overlay.is_open());
        let event = log.last("enroll_click").unwrap();
        assert_eq!(event.properties["source"], "video_modal");
        assert_eq!(event.properties["button_text"], "Enroll Now");
        assert_eq!(*clicked.borrow(), vec!["Enroll Now".to_string()]);
    }

    #[test]
    fn close_without_overlay_is_silent() {
        let (host, log, overlay) = controller();
        assert!(!overlay.close());
        assert!(log.events().is_empty());
        assert!(!host.scroll_locked());
    }

    #[test]
    fn custom_event_names_are_used() {
        let host = Rc::new(SimHost::new());
        let log = Rc::new(AnalyticsLog::new());
        let events = OverlayEvents {
            opened: "demo_opened".to_string(),
            closed: "demo_closed".to_string(),
            ..OverlayEvents::default()
        };
        let overlay = OverlayController::with_events(Rc::clone(&host), log.clone(), events);

        overlay.open("X".to_string());
        overlay.close();
        assert_eq!(log.count("demo_opened"), 1);
        assert_eq!(log.count("demo_closed"), 1);
    }

    #[test]
    fn escape_after_reopen_during_close_closes_only_the_new_overlay() {
        let (host, log, overlay) = controller();
        overlay.open("X".to_string());
        host.press_escape();
        overlay.open("Y".to_string());
        host.press_escape();
        host.press_escape();
        host.advance(1000);

        assert_eq!(log.count("video_modal_closed"), 2);
        assert!(host.overlays().is_empty());
        assert!(!host.scroll_locked());
        assert_eq!(host.subscription_count(), 0);
        assert_eq!(host.pending_timers(), 0);
    }

    #[test]
    fn programmatic_close_releases_scroll_lock_at_once() {
        let (host, log, overlay) = controller();
        overlay.open("X".to_string());
        host.advance(0);

        assert!(overlay.close());
        assert!(!host.scroll_locked());
        assert_eq!(
            log.last("video_modal_closed").unwrap().properties["trigger"],
            "programmatic"
        );
        host.advance(300);
        assert_eq!(overlay.phase(), OverlayPhase::Absent);
    }
}
