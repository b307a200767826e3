//! Kinet Core Runtime
//!
//! Foundational primitives shared by the Kinet animation engine and widgets:
//!
//! - **Geometry**: points, sizes, reference bounds and 2D vectors
//! - **Event Dispatch**: single-threaded input event source with scoped listeners
//! - **State Machines**: flat statecharts for widget interaction states
//!
//! # Example
//!
//! ```rust
//! use kinet_core::events::{EventKind, EventSource, InputEvent};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let source = EventSource::new();
//! let seen = Rc::new(Cell::new(0.0));
//!
//! let seen_clone = seen.clone();
//! let guard = source.subscribe(&[EventKind::Move], move |event| seen_clone.set(event.x));
//!
//! source.dispatch(&InputEvent::pointer(EventKind::Move, 42.0, 0.0, 0));
//! assert_eq!(seen.get(), 42.0);
//!
//! drop(guard);
//! assert_eq!(source.listener_count(), 0);
//! ```

pub mod events;
pub mod fsm;
pub mod geometry;

pub use events::{EventKind, EventSource, InputEvent, ListenerGuard, ListenerId};
pub use fsm::{StateMachine, StateMachineBuilder, Transition};
pub use geometry::{Point, Rect, Size, Vec2};
