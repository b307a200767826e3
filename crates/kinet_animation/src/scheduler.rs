//! Frame scheduler
//!
//! One scheduler per thread drives every registered frame callback once per
//! display refresh until the callback is cancelled. Registration bookkeeping
//! is the only thing animation instances share.

use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

new_key_type! {
    /// Handle returned by [`FrameScheduler::request_frame`]
    pub struct FrameHandle;
}

/// Timing information passed to frame callbacks
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTime {
    /// Monotonic frame timestamp in milliseconds
    pub timestamp_ms: f64,
    /// Time since the previous frame (0 for the first frame)
    pub delta_ms: f32,
}

/// What a callback wants after running
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    /// Unregister this callback
    Stop,
}

/// Frame callback type
pub type FrameCallback = Box<dyn FnMut(FrameTime) -> FrameControl>;

struct SchedulerInner {
    /// `None` while the callback is running
    callbacks: SlotMap<FrameHandle, Option<FrameCallback>>,
    last_timestamp: Option<f64>,
    target_fps: u32,
    frame_count: u64,
    epoch: Instant,
}

/// The frame scheduler that ticks all registered callbacks
///
/// Cloning yields another handle to the same scheduler.
#[derive(Clone)]
pub struct FrameScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

thread_local! {
    static SHARED: FrameScheduler = FrameScheduler::new();
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                callbacks: SlotMap::with_key(),
                last_timestamp: None,
                target_fps: 60,
                frame_count: 0,
                epoch: Instant::now(),
            })),
        }
    }

    /// The scheduler shared by everything on the current thread
    pub fn shared() -> Self {
        SHARED.with(|s| s.clone())
    }

    pub fn set_target_fps(&self, fps: u32) {
        self.inner.borrow_mut().target_fps = fps.max(1);
    }

    pub fn target_fps(&self) -> u32 {
        self.inner.borrow().target_fps
    }

    /// Nominal time between frames at the target rate
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.target_fps() as f64
    }

    /// Register a callback to run on every frame until cancelled
    pub fn request_frame<F>(&self, callback: F) -> FrameHandle
    where
        F: FnMut(FrameTime) -> FrameControl + 'static,
    {
        let handle = self
            .inner
            .borrow_mut()
            .callbacks
            .insert(Some(Box::new(callback)));
        tracing::trace!(?handle, "frame callback registered");
        handle
    }

    /// Unregister a callback. Cancelling an unknown or already cancelled
    /// handle is a no-op and returns false.
    pub fn cancel_frame(&self, handle: FrameHandle) -> bool {
        let removed = self.inner.borrow_mut().callbacks.remove(handle);
        let existed = removed.is_some();
        // Dropped outside the borrow: captured state may touch the scheduler
        drop(removed);
        if existed {
            tracing::trace!(?handle, "frame callback cancelled");
        }
        existed
    }

    pub fn is_registered(&self, handle: FrameHandle) -> bool {
        self.inner.borrow().callbacks.contains_key(handle)
    }

    /// Number of registered callbacks
    pub fn callback_count(&self) -> usize {
        self.inner.borrow().callbacks.len()
    }

    /// Check if any callbacks are still registered
    pub fn has_active_callbacks(&self) -> bool {
        !self.inner.borrow().callbacks.is_empty()
    }

    /// Frames run so far
    pub fn frame_count(&self) -> u64 {
        self.inner.borrow().frame_count
    }

    /// Timestamp of the last frame run, if any
    pub fn last_timestamp(&self) -> Option<f64> {
        self.inner.borrow().last_timestamp
    }

    /// Run one frame at `timestamp_ms`, returning how many callbacks ran.
    ///
    /// Callbacks may register or cancel callbacks (including themselves)
    /// while the frame runs. New registrations first run on the next frame;
    /// a callback cancelled mid-frame does not run again.
    pub fn run_frame(&self, timestamp_ms: f64) -> usize {
        let (handles, time) = {
            let mut inner = self.inner.borrow_mut();
            let delta = match inner.last_timestamp {
                Some(last) if timestamp_ms > last => (timestamp_ms - last) as f32,
                Some(last) => {
                    if timestamp_ms < last {
                        tracing::warn!(timestamp_ms, last, "frame timestamp went backwards");
                    }
                    0.0
                }
                None => 0.0,
            };
            let timestamp = inner
                .last_timestamp
                .map_or(timestamp_ms, |last| last.max(timestamp_ms));
            inner.last_timestamp = Some(timestamp);
            inner.frame_count += 1;

            let handles: Vec<FrameHandle> = inner.callbacks.keys().collect();
            (
                handles,
                FrameTime {
                    timestamp_ms: timestamp,
                    delta_ms: delta,
                },
            )
        };

        let mut invoked = 0;
        for handle in handles {
            let callback = match self.inner.borrow_mut().callbacks.get_mut(handle) {
                Some(slot) => slot.take(),
                None => continue,
            };
            // Re-entrant run_frame reached a callback that is still running
            let Some(mut callback) = callback else {
                continue;
            };

            let control = callback(time);
            invoked += 1;

            match control {
                FrameControl::Continue => {
                    if let Some(slot) = self.inner.borrow_mut().callbacks.get_mut(handle) {
                        *slot = Some(callback);
                    }
                }
                FrameControl::Stop => {
                    self.cancel_frame(handle);
                }
            }
        }

        tracing::trace!(timestamp_ms = time.timestamp_ms, invoked, "frame");
        invoked
    }

    /// Run one frame one nominal interval after the previous one
    pub fn advance(&self) -> usize {
        let next = self
            .last_timestamp()
            .map_or(0.0, |last| last + self.frame_interval_ms());
        self.run_frame(next)
    }

    /// Run one frame stamped with the wall clock
    pub fn tick(&self) -> usize {
        let now = self.inner.borrow().epoch.elapsed().as_secs_f64() * 1000.0;
        self.run_frame(now)
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}
