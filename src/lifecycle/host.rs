//! Capabilities the lifecycle managers borrow from whatever hosts them.
//!
//! The browser build plugs in `dom::DomSurface`; tests plug in `sim::SimHost`
//! so that timers and input can be driven by hand.

use std::fmt;
use std::rc::Rc;

use super::notice::Notice;

pub type Task = Box<dyn FnOnce()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Subscription(pub u64);

/// Deferred callbacks. Nothing here may run a task synchronously.
pub trait Scheduler {
    fn after(&self, delay_ms: u32, task: Task) -> TimerId;

    /// Runs `task` on the next render tick, after the current one has painted.
    fn next_tick(&self, task: Task) -> TimerId {
        self.after(0, task)
    }

    /// Cancelling a timer that already fired, or was never issued, does nothing.
    fn cancel(&self, timer: TimerId);
}

/// Document-level input signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// Escape key or the platform's equivalent.
    Cancel,
}

pub trait InputSource {
    fn subscribe(&self, kind: InputKind, handler: Box<dyn FnMut()>) -> Subscription;
    fn unsubscribe(&self, subscription: Subscription);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visual {
    /// Off-screen / transparent. Every node is mounted in this state.
    Hidden,
    Shown,
}

/// Input raised from inside a mounted overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayInput {
    CloseControl,
    /// Pointer press on the backdrop, outside the content box.
    Backdrop,
    /// An interior link that should be reported but must not close anything.
    Link { label: String },
}

pub trait RenderSurface {
    type Node: Clone + fmt::Debug;
    type Content;

    /// Returns `None` when the surface has nowhere to attach the node.
    fn mount_notice(&self, notice: &Notice) -> Option<Self::Node>;
    fn mount_overlay(&self, content: Self::Content) -> Option<Self::Node>;

    /// Routes overlay-local input to `handler` until the node is unmounted.
    fn bind_overlay(&self, node: &Self::Node, handler: Rc<dyn Fn(OverlayInput)>);

    fn set_visual(&self, node: &Self::Node, visual: Visual);
    fn unmount(&self, node: &Self::Node);
    fn is_mounted(&self, node: &Self::Node) -> bool;

    fn set_scroll_locked(&self, locked: bool);
}

/// Everything a lifecycle manager needs in one bound.
pub trait Host: RenderSurface + Scheduler + InputSource {}

impl<T: RenderSurface + Scheduler + InputSource> Host for T {}
