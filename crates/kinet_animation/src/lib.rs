//! Kinet Animation Engine
//!
//! Pointer-reactive continuous animation: input sampling, smoothing and a
//! per-frame driver.
//!
//! # Features
//!
//! - **Input Sampler**: bounds-relative, range-mapped pointer samples
//! - **Smoothing**: direct lerp (per-frame or time-scaled) and eased tweens,
//!   elastic-out by default
//! - **Frame Driver**: cancellable per-frame callbacks on a shared scheduler
//! - **Pointer Tracking**: resting / tracking / returning state machine
//! - **Timelines**: sequenced tweens across property tracks
//!
//! # Example
//!
//! ```rust
//! use kinet_animation::{map_range, wrap};
//!
//! assert_eq!(map_range(0.0, 200.0, 10.0, 190.0, 100.0), 100.0);
//! assert_eq!(map_range(0.0, 200.0, 10.0, 190.0, 500.0), 190.0);
//! assert_eq!(wrap(-200.0, 400.0, -250.0), 350.0);
//! ```

pub mod driver;
pub mod easing;
pub mod error;
pub mod interpolate;
pub mod sampler;
pub mod scheduler;
pub mod smoothing;
pub mod timeline;
pub mod tracker;

pub use driver::{Animation, AnimationHandle, FrameDriver, FrameSample};
pub use easing::Easing;
pub use error::{AnimationError, Result};
pub use interpolate::{clamp, map_range, wrap, Animatable};
pub use sampler::{AxisMapping, PointerSample, Sampler};
pub use scheduler::{FrameControl, FrameHandle, FrameScheduler, FrameTime};
pub use smoothing::{AnimationState, AnimationTarget, LerpFactor, Smoothing};
pub use timeline::{Timeline, TrackId};
pub use tracker::{PointerTracker, TrackingPhase};
