//! Input event dispatch
//!
//! A single-threaded event source that widgets subscribe to once at
//! construction. Listeners are keyed by slotmap ids so removal is O(1) and
//! stale ids are harmless.

use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::geometry::Point;

new_key_type! {
    /// Identifier of a registered listener
    pub struct ListenerId;
}

/// Kind of input record delivered by the event source
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Move,
    Enter,
    Leave,
    Wheel,
    DragStart,
    DragMove,
    DragEnd,
    /// Reference element resized; `x`/`y` carry the new width/height
    Resize,
}

/// An input record with absolute pointer coordinates
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    pub kind: EventKind,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub delta_y: f32,
    pub timestamp_ms: u64,
}

impl InputEvent {
    /// Pointer-style event (move, enter, leave, drag) at an absolute position
    pub fn pointer(kind: EventKind, x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self {
            kind,
            x,
            y,
            delta_y: 0.0,
            timestamp_ms,
        }
    }

    /// Wheel event carrying a vertical delta
    pub fn wheel(delta_y: f32, timestamp_ms: u64) -> Self {
        Self {
            kind: EventKind::Wheel,
            x: 0.0,
            y: 0.0,
            delta_y,
            timestamp_ms,
        }
    }

    /// Resize notification for the reference element
    pub fn resize(width: f32, height: f32, timestamp_ms: u64) -> Self {
        Self::pointer(EventKind::Resize, width, height, timestamp_ms)
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Listener callback type
pub type ListenerFn = Box<dyn FnMut(&InputEvent)>;

struct Listener {
    /// Kinds this listener accepts; empty accepts everything
    kinds: SmallVec<[EventKind; 4]>,
    /// `None` while the handler is running
    handler: Option<ListenerFn>,
}

impl Listener {
    fn accepts(&self, kind: EventKind) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&kind)
    }
}

type ListenerMap = SlotMap<ListenerId, Listener>;

/// Dispatches input records to registered listeners
///
/// Cloning yields another handle to the same listener table.
#[derive(Clone, Default)]
pub struct EventSource {
    listeners: Rc<RefCell<ListenerMap>>,
}

impl EventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for the given kinds (empty slice = all kinds)
    pub fn add_listener<F>(&self, kinds: &[EventKind], handler: F) -> ListenerId
    where
        F: FnMut(&InputEvent) + 'static,
    {
        self.listeners.borrow_mut().insert(Listener {
            kinds: kinds.iter().copied().collect(),
            handler: Some(Box::new(handler)),
        })
    }

    /// Remove a listener. Returns false if it was already gone.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let removed = self.listeners.borrow_mut().remove(id);
        removed.is_some()
    }

    /// Register a listener whose lifetime is tied to the returned guard
    pub fn subscribe<F>(&self, kinds: &[EventKind], handler: F) -> ListenerGuard
    where
        F: FnMut(&InputEvent) + 'static,
    {
        let id = self.add_listener(kinds, handler);
        ListenerGuard {
            listeners: Rc::downgrade(&self.listeners),
            id: Some(id),
        }
    }

    /// Deliver an event to every matching listener, returning how many ran.
    ///
    /// Handlers may add or remove listeners (including themselves) while the
    /// event is being delivered. Listeners added during dispatch first see
    /// the next event.
    pub fn dispatch(&self, event: &InputEvent) -> usize {
        let ids: SmallVec<[ListenerId; 8]> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, l)| l.accepts(event.kind))
            .map(|(id, _)| id)
            .collect();

        let mut delivered = 0;
        for id in ids {
            let handler = match self.listeners.borrow_mut().get_mut(id) {
                Some(listener) => listener.handler.take(),
                None => continue,
            };
            // Re-entrant dispatch reaches a handler that is already running
            let Some(mut handler) = handler else {
                continue;
            };

            handler(event);
            delivered += 1;

            if let Some(listener) = self.listeners.borrow_mut().get_mut(id) {
                listener.handler = Some(handler);
            }
        }
        delivered
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

/// Removes its listener when dropped or released
pub struct ListenerGuard {
    listeners: Weak<RefCell<ListenerMap>>,
    id: Option<ListenerId>,
}

impl ListenerGuard {
    pub fn id(&self) -> Option<ListenerId> {
        self.id
    }

    /// Remove the listener now. Safe to call repeatedly.
    pub fn release(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        if let Some(listeners) = self.listeners.upgrade() {
            // Dropped outside the borrow: the handler may own other guards
            let removed = listeners.borrow_mut().remove(id);
            drop(removed);
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.release();
    }
}
