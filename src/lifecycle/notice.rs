//! Transient notices: one banner at a time, auto-dismissed, newest wins.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, warn};
use serde::Serialize;
use serde_json::json;

use super::host::{Host, TimerId, Visual};
use crate::analytics::EventSink;
use crate::config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    #[default]
    Info,
    Success,
    Error,
}

impl NoticeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeKind::Info => "info",
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
        }
    }

    /// Font Awesome icon name shown next to the message.
    pub fn icon(&self) -> &'static str {
        match self {
            NoticeKind::Info => "info-circle",
            NoticeKind::Success => "check-circle",
            NoticeKind::Error => "exclamation-circle",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
    pub duration_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticePhase {
    Absent,
    Entering,
    Visible,
    Leaving,
}

struct Shown<N> {
    generation: u64,
    node: N,
    phase: NoticePhase,
    timers: Vec<TimerId>,
}

struct Inner<H: Host> {
    host: Rc<H>,
    sink: Rc<dyn EventSink>,
    slot: RefCell<Option<Shown<H::Node>>>,
    generation: Cell<u64>,
}

/// Shared handle; clones drive the same slot.
pub struct NoticeManager<H: Host> {
    inner: Rc<Inner<H>>,
}

impl<H: Host> Clone for NoticeManager<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<H: Host + 'static> NoticeManager<H> {
    pub fn new(host: Rc<H>, sink: Rc<dyn EventSink>) -> Self {
        Self {
            inner: Rc::new(Inner {
                host,
                sink,
                slot: RefCell::new(None),
                generation: Cell::new(0),
            }),
        }
    }

    /// Shows `message` for `duration_ms`, replacing whatever is on screen.
    ///
    /// Fire-and-forget: an empty message or zero duration is logged and
    /// dropped.
    pub fn notify(&self, message: impl Into<String>, kind: NoticeKind, duration_ms: u32) {
        let message = message.into();
        if message.trim().is_empty() {
            warn!("Ignoring notice with empty message");
            return;
        }
        if duration_ms == 0 {
            warn!("Ignoring notice '{}' with zero duration", message);
            return;
        }

        let inner = &self.inner;
        inner.clear();

        inner.sink.record(
            "notification_shown",
            json!({
                "message": message,
                "kind": kind,
                "duration_ms": duration_ms,
            }),
        );

        let notice = Notice {
            message,
            kind,
            duration_ms,
        };
        let Some(node) = inner.host.mount_notice(&notice) else {
            warn!("No surface to show notice '{}'", notice.message);
            return;
        };
        debug!("Showing {} notice: {}", kind.as_str(), notice.message);

        let generation = inner.generation.get() + 1;
        inner.generation.set(generation);
        *inner.slot.borrow_mut() = Some(Shown {
            generation,
            node,
            phase: NoticePhase::Entering,
            timers: Vec::new(),
        });

        let weak = Rc::downgrade(inner);
        let enter = inner.host.next_tick(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.reveal(generation);
            }
        }));
        let weak = Rc::downgrade(inner);
        let leave = inner.host.after(
            duration_ms,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.begin_leaving(generation);
                }
            }),
        );
        inner.track(generation, [enter, leave]);
    }

    pub fn success(&self, message: impl Into<String>, duration_ms: u32) {
        self.notify(message, NoticeKind::Success, duration_ms);
    }

    #[cfg(test)]
    pub fn phase(&self) -> NoticePhase {
        self.inner
            .slot
            .borrow()
            .as_ref()
            .map_or(NoticePhase::Absent, |shown| shown.phase)
    }
}

impl<H: Host + 'static> Inner<H> {
    fn track(&self, generation: u64, timers: impl IntoIterator<Item = TimerId>) {
        match self.slot.borrow_mut().as_mut() {
            Some(shown) if shown.generation == generation => shown.timers.extend(timers),
            _ => {}
        }
    }

    /// Node of the current notice if it is still `generation` and still
    /// mounted. A notice removed behind our back is forgotten.
    fn live_node(&self, generation: u64) -> Option<H::Node> {
        let node = self
            .slot
            .borrow()
            .as_ref()
            .filter(|shown| shown.generation == generation)
            .map(|shown| shown.node.clone())?;
        if self.host.is_mounted(&node) {
            Some(node)
        } else {
            self.forget(generation);
            None
        }
    }

    fn set_phase(&self, generation: u64, phase: NoticePhase) {
        if let Some(shown) = self.slot.borrow_mut().as_mut() {
            if shown.generation == generation {
                shown.phase = phase;
            }
        }
    }

    fn phase_of(&self, generation: u64) -> NoticePhase {
        self.slot
            .borrow()
            .as_ref()
            .filter(|shown| shown.generation == generation)
            .map_or(NoticePhase::Absent, |shown| shown.phase)
    }

    fn reveal(&self, generation: u64) {
        if self.phase_of(generation) != NoticePhase::Entering {
            return;
        }
        let Some(node) = self.live_node(generation) else {
            return;
        };
        self.host.set_visual(&node, Visual::Shown);
        self.set_phase(generation, NoticePhase::Visible);
    }

    fn begin_leaving(self: &Rc<Self>, generation: u64) {
        let Some(node) = self.live_node(generation) else {
            return;
        };
        self.host.set_visual(&node, Visual::Hidden);
        self.set_phase(generation, NoticePhase::Leaving);

        let weak = Rc::downgrade(self);
        let detach = self.host.after(
            config::NOTICE_TRANSITION_MS,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.finish(generation);
                }
            }),
        );
        self.track(generation, [detach]);
    }

    fn finish(&self, generation: u64) {
        if let Some(node) = self.forget(generation) {
            if self.host.is_mounted(&node) {
                self.host.unmount(&node);
            }
        }
    }

    fn forget(&self, generation: u64) -> Option<H::Node> {
        let mut slot = self.slot.borrow_mut();
        if slot.as_ref().map(|shown| shown.generation) != Some(generation) {
            return None;
        }
        slot.take().map(|shown| shown.node)
    }

    /// Tears the current notice down immediately, timers first.
    fn clear(&self) {
        let Some(shown) = self.slot.borrow_mut().take() else {
            return;
        };
        for timer in shown.timers {
            self.host.cancel(timer);
        }
        if self.host.is_mounted(&shown.node) {
            self.host.unmount(&shown.node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::AnalyticsLog;
    use crate::sim::SimHost;

    fn manager() -> (Rc<SimHost>, Rc<AnalyticsLog>, NoticeManager<SimHost>) {
        let host = Rc::new(SimHost::new());
        let log = Rc::new(AnalyticsLog::new());
        let notices = NoticeManager::new(Rc::clone(&host), log.clone());
        (host, log, notices)
    }

    #[test]
    fn saved_notice_runs_full_lifecycle() {
        let (host, _, notices) = manager();
        notices.notify("Saved", NoticeKind::Success, 2000);

        let mounted = host.notices();
        assert_eq!(mounted.len(), 1);
        assert_eq!(mounted[0].0.kind, NoticeKind::Success);
        assert_eq!(notices.phase(), NoticePhase::Entering);

        host.advance(0);
        assert_eq!(notices.phase(), NoticePhase::Visible);
        assert_eq!(host.notices()[0].1, Visual::Shown);

        host.advance(1999);
        assert_eq!(notices.phase(), NoticePhase::Visible);

        host.advance(1);
        assert_eq!(notices.phase(), NoticePhase::Leaving);
        assert_eq!(host.notices()[0].1, Visual::Hidden);

        host.advance(299);
        assert_eq!(host.notices().len(), 1);

        host.advance(1);
        assert!(host.notices().is_empty());
        assert_eq!(notices.phase(), NoticePhase::Absent);
    }

    #[test]
    fn new_notice_replaces_visible_one_immediately() {
        let (host, _, notices) = manager();
        notices.notify("First", NoticeKind::Info, 1000);
        host.advance(500);

        notices.notify("Second", NoticeKind::Error, 1000);
        let mounted = host.notices();
        assert_eq!(mounted.len(), 1);
        assert_eq!(mounted[0].0.message, "Second");
        assert_eq!(host.unmount_count(), 1);
    }

    #[test]
    fn preempted_notice_timers_never_fire() {
        let (host, _, notices) = manager();
        notices.notify("First", NoticeKind::Info, 1000);
        notices.notify("Second", NoticeKind::Info, 5000);
        assert_eq!(host.pending_timers(), 2);

        // First notice would have started leaving here.
        host.advance(1000);
        assert_eq!(notices.phase(), NoticePhase::Visible);
        assert_eq!(host.notices()[0].1, Visual::Shown);
        assert_eq!(host.unmount_count(), 1);
    }

    #[test]
    fn preempting_a_leaving_notice_cancels_its_detach() {
        let (host, _, notices) = manager();
        notices.notify("First", NoticeKind::Info, 100);
        host.advance(150);
        assert_eq!(notices.phase(), NoticePhase::Leaving);

        notices.notify("Second", NoticeKind::Info, 1000);
        host.advance(300);
        let mounted = host.notices();
        assert_eq!(mounted.len(), 1);
        assert_eq!(mounted[0].0.message, "Second");
    }

    #[test]
    fn never_more_than_one_notice_mounted() {
        let (host, _, notices) = manager();
        for (i, delay) in [0, 10, 400, 2000, 50, 4300].into_iter().enumerate() {
            notices.notify(format!("notice {i}"), NoticeKind::Info, 300 + i as u32 * 200);
            assert!(host.notices().len() <= 1);
            host.advance(delay);
            assert!(host.notices().len() <= 1);
        }
        host.advance(10_000);
        assert!(host.notices().is_empty());
        assert_eq!(host.pending_timers(), 0);
    }

    #[test]
    fn notice_removed_externally_is_forgotten() {
        let (host, _, notices) = manager();
        notices.notify("Detached", NoticeKind::Info, 1000);
        host.remove_all();

        host.advance(0);
        assert_eq!(notices.phase(), NoticePhase::Absent);
        host.advance(2000);
        assert_eq!(host.unmount_count(), 0);
    }

    #[test]
    fn invalid_notices_are_ignored() {
        let (host, log, notices) = manager();
        notices.notify("   ", NoticeKind::Info, 1000);
        notices.notify("Zero", NoticeKind::Info, 0);

        assert!(host.notices().is_empty());
        assert_eq!(log.count("notification_shown"), 0);
    }

    #[test]
    fn each_notice_is_reported() {
        let (_, log, notices) = manager();
        notices.success("Opening WhatsApp chat...", config::QUICK_NOTICE_MS);
        notices.notify("Hello", NoticeKind::default(), config::NOTICE_DURATION_MS);

        assert_eq!(log.count("notification_shown"), 2);
        let first = &log.events()[0];
        assert_eq!(first.properties["kind"], "success");
        assert_eq!(first.properties["duration_ms"], 2000);
        assert_eq!(log.events()[1].properties["duration_ms"], config::NOTICE_DURATION_MS);
    }

    #[test]
    fn default_kind_is_info() {
        assert_eq!(NoticeKind::default(), NoticeKind::Info);
        assert_eq!(NoticeKind::Error.icon(), "exclamation-circle");
    }
}
