//! Widget host
//!
//! Bundles the frame scheduler and event source a widget attaches to. Hosts
//! are cheap to clone; clones share both.

use kinet_animation::FrameScheduler;
use kinet_core::{EventSource, InputEvent};

#[derive(Clone, Default)]
pub struct WidgetHost {
    scheduler: FrameScheduler,
    events: EventSource,
}

impl WidgetHost {
    /// A host with its own scheduler, for tests and headless playback
    pub fn new() -> Self {
        Self::default()
    }

    /// A host on the thread's shared frame scheduler
    pub fn shared() -> Self {
        Self::with_scheduler(FrameScheduler::shared())
    }

    pub fn with_scheduler(scheduler: FrameScheduler) -> Self {
        Self {
            scheduler,
            events: EventSource::new(),
        }
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn events(&self) -> &EventSource {
        &self.events
    }

    /// Deliver an input record to every subscribed widget
    pub fn dispatch(&self, event: &InputEvent) -> usize {
        self.events.dispatch(event)
    }

    pub fn run_frame(&self, timestamp_ms: f64) -> usize {
        self.scheduler.run_frame(timestamp_ms)
    }

    /// Run `frames` frames at the scheduler's nominal interval
    pub fn advance(&self, frames: usize) {
        for _ in 0..frames {
            self.scheduler.advance();
        }
    }

    /// True while any widget still has a frame callback or listener attached
    pub fn is_busy(&self) -> bool {
        self.scheduler.has_active_callbacks() || self.events.listener_count() > 0
    }
}
