//! Deterministic host for tests: virtual clock, in-memory surface, scripted input.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::lifecycle::host::{
    InputKind, InputSource, OverlayInput, RenderSurface, Scheduler, Subscription, Task, TimerId,
    Visual,
};
use crate::lifecycle::notice::Notice;

#[derive(Debug, Clone)]
enum Mounted {
    Notice(Notice),
    Overlay(String),
}

type SharedHandler = Rc<RefCell<Box<dyn FnMut()>>>;

#[derive(Default)]
pub struct SimHost {
    now: Cell<u64>,
    next_id: Cell<u64>,
    timers: RefCell<BTreeMap<(u64, u64), Task>>,
    nodes: RefCell<Vec<(u64, Mounted, Visual)>>,
    overlay_handlers: RefCell<HashMap<u64, Rc<dyn Fn(OverlayInput)>>>,
    subscriptions: RefCell<BTreeMap<u64, (InputKind, SharedHandler)>>,
    scroll_locked: Cell<bool>,
    scroll_lock_changes: Cell<u32>,
    unmounts: Cell<u32>,
}

impl SimHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn issue_id(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    pub fn now(&self) -> u64 {
        self.now.get()
    }

    /// Moves the clock forward, running due timers in order. Timers scheduled
    /// by a running task fire in the same call if they fall inside the window.
    pub fn advance(&self, ms: u64) {
        let target = self.now.get() + ms;
        loop {
            let next = self.timers.borrow().keys().next().copied();
            match next {
                Some(key) if key.0 <= target => {
                    let task = self.timers.borrow_mut().remove(&key);
                    self.now.set(key.0);
                    if let Some(task) = task {
                        task();
                    }
                }
                _ => break,
            }
        }
        self.now.set(target);
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn notices(&self) -> Vec<(Notice, Visual)> {
        self.nodes
            .borrow()
            .iter()
            .filter_map(|(_, mounted, visual)| match mounted {
                Mounted::Notice(notice) => Some((notice.clone(), *visual)),
                Mounted::Overlay(_) => None,
            })
            .collect()
    }

    pub fn overlays(&self) -> Vec<(String, Visual)> {
        self.nodes
            .borrow()
            .iter()
            .filter_map(|(_, mounted, visual)| match mounted {
                Mounted::Overlay(content) => Some((content.clone(), *visual)),
                Mounted::Notice(_) => None,
            })
            .collect()
    }

    pub fn unmount_count(&self) -> u32 {
        self.unmounts.get()
    }

    /// Drops every node as if another script had cleared the document.
    pub fn remove_all(&self) {
        self.nodes.borrow_mut().clear();
        self.overlay_handlers.borrow_mut().clear();
    }

    pub fn scroll_locked(&self) -> bool {
        self.scroll_locked.get()
    }

    pub fn scroll_lock_changes(&self) -> u32 {
        self.scroll_lock_changes.get()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.borrow().len()
    }

    pub fn press_escape(&self) {
        let handlers: Vec<SharedHandler> = self
            .subscriptions
            .borrow()
            .values()
            .filter(|(kind, _)| *kind == InputKind::Cancel)
            .map(|(_, handler)| Rc::clone(handler))
            .collect();
        for handler in handlers {
            (handler.borrow_mut())();
        }
    }

    /// Delivers `input` to the most recently mounted overlay.
    pub fn overlay_input(&self, input: OverlayInput) {
        let handler = {
            let nodes = self.nodes.borrow();
            let handlers = self.overlay_handlers.borrow();
            nodes
                .iter()
                .rev()
                .find(|(_, mounted, _)| matches!(mounted, Mounted::Overlay(_)))
                .and_then(|(id, _, _)| handlers.get(id).cloned())
        };
        if let Some(handler) = handler {
            handler(input);
        }
    }
}

impl Scheduler for SimHost {
    fn after(&self, delay_ms: u32, task: Task) -> TimerId {
        let id = self.issue_id();
        let due = self.now.get() + u64::from(delay_ms);
        self.timers.borrow_mut().insert((due, id), task);
        TimerId(id)
    }

    fn cancel(&self, timer: TimerId) {
        self.timers.borrow_mut().retain(|(_, id), _| *id != timer.0);
    }
}

impl InputSource for SimHost {
    fn subscribe(&self, kind: InputKind, handler: Box<dyn FnMut()>) -> Subscription {
        let id = self.issue_id();
        self.subscriptions
            .borrow_mut()
            .insert(id, (kind, Rc::new(RefCell::new(handler))));
        Subscription(id)
    }

    fn unsubscribe(&self, subscription: Subscription) {
        self.subscriptions.borrow_mut().remove(&subscription.0);
    }
}

impl RenderSurface for SimHost {
    type Node = u64;
    type Content = String;

    fn mount_notice(&self, notice: &Notice) -> Option<u64> {
        let id = self.issue_id();
        self.nodes
            .borrow_mut()
            .push((id, Mounted::Notice(notice.clone()), Visual::Hidden));
        Some(id)
    }

    fn mount_overlay(&self, content: String) -> Option<u64> {
        let id = self.issue_id();
        self.nodes
            .borrow_mut()
            .push((id, Mounted::Overlay(content), Visual::Hidden));
        Some(id)
    }

    fn bind_overlay(&self, node: &u64, handler: Rc<dyn Fn(OverlayInput)>) {
        self.overlay_handlers.borrow_mut().insert(*node, handler);
    }

    fn set_visual(&self, node: &u64, visual: Visual) {
        if let Some(entry) = self.nodes.borrow_mut().iter_mut().find(|(id, _, _)| id == node) {
            entry.2 = visual;
        }
    }

    fn unmount(&self, node: &u64) {
        let mut nodes = self.nodes.borrow_mut();
        let before = nodes.len();
        nodes.retain(|(id, _, _)| id != node);
        if nodes.len() != before {
            self.unmounts.set(self.unmounts.get() + 1);
        }
        self.overlay_handlers.borrow_mut().remove(node);
    }

    fn is_mounted(&self, node: &u64) -> bool {
        self.nodes.borrow().iter().any(|(id, _, _)| id == node)
    }

    fn set_scroll_locked(&self, locked: bool) {
        self.scroll_locked.set(locked);
        self.scroll_lock_changes.set(self.scroll_lock_changes.get() + 1);
    }
}
