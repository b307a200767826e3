//! Animated loader
//!
//! A digit strip slides one digit per step while its clipping wrapper
//! travels across the viewport. Both move on one timeline; the loader
//! unregisters its frame callback once the timeline finishes.

use std::cell::RefCell;
use std::rc::Rc;

use kinet_animation::error::ensure_positive;
use kinet_animation::{
    AnimationError, Easing, FrameControl, FrameDriver, Result, Timeline, TrackId,
};
use serde::{Deserialize, Serialize};

use crate::host::WidgetHost;
use crate::surface::{Surface, Transform};

/// Surface element and timeline track of the digit strip
pub const COUNT: TrackId = 0;
/// Surface element and timeline track of the clipping wrapper
pub const WRAPPER: TrackId = 1;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub viewport_width: f32,
    pub digit_width: f32,
    pub digit_count: u32,
    /// Steps after the opening slide
    pub steps: u32,
    pub delay_ms: f32,
    pub step_duration_ms: f32,
    pub easing: Easing,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1280.0,
            digit_width: 180.0,
            digit_count: 6,
            steps: 6,
            delay_ms: 500.0,
            step_duration_ms: 850.0,
            easing: Easing::EaseInOutQuint,
        }
    }
}

impl LoaderConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("loader digit_width", self.digit_width)?;
        ensure_positive("loader step_duration_ms", self.step_duration_ms)?;
        if self.viewport_width < self.digit_width || !self.viewport_width.is_finite() {
            return Err(AnimationError::invalid(format!(
                "loader viewport_width ({}) must be at least digit_width ({})",
                self.viewport_width, self.digit_width
            )));
        }
        if self.digit_count == 0 || self.steps == 0 {
            return Err(AnimationError::invalid(
                "loader digit_count and steps must be positive",
            ));
        }
        if !(self.delay_ms.is_finite() && self.delay_ms >= 0.0) {
            return Err(AnimationError::invalid(
                "loader delay_ms must be a non-negative finite number",
            ));
        }
        self.easing.validate()
    }

    /// Wrapper travel per step
    pub fn step_distance(&self) -> f32 {
        (self.viewport_width - self.digit_width) / self.steps as f32
    }

    /// Build the loader timeline
    pub fn timeline(&self) -> Result<Timeline> {
        self.validate()?;
        let mut timeline = Timeline::new();
        let hidden = -self.digit_width * self.digit_count as f32;
        let first = hidden + self.digit_width;

        timeline.then(
            COUNT,
            hidden,
            self.delay_ms,
            self.step_duration_ms,
            first,
            self.easing,
        )?;
        // Wrapper steps start together with the matching count steps
        let wrapper_start = self.delay_ms + self.step_duration_ms;
        for step in 0..=self.steps {
            let target = first + step as f32 * self.digit_width;
            timeline.then(COUNT, first, 0.0, self.step_duration_ms, target, self.easing)?;

            let delay = if step == 0 { wrapper_start } else { 0.0 };
            let target = self.step_distance() * step as f32;
            timeline.then(WRAPPER, 0.0, delay, self.step_duration_ms, target, self.easing)?;
        }
        Ok(timeline)
    }
}

pub struct AnimatedLoader {
    timeline: Rc<RefCell<Timeline>>,
    driver: FrameDriver,
}

impl AnimatedLoader {
    /// The digit strip is surface element [`COUNT`], the wrapper [`WRAPPER`]
    pub fn new<S>(host: &WidgetHost, surface: Rc<RefCell<S>>, config: LoaderConfig) -> Result<Self>
    where
        S: Surface + 'static,
    {
        let mut timeline = config.timeline()?;
        timeline.start();
        let timeline = Rc::new(RefCell::new(timeline));

        let driver = {
            let timeline = timeline.clone();
            FrameDriver::start(host.scheduler(), move |time| {
                let (playing, count, wrapper) = {
                    let mut timeline = timeline.borrow_mut();
                    let playing = timeline.tick(time.delta_ms);
                    (
                        playing,
                        timeline.track_value(COUNT).unwrap_or_default(),
                        timeline.track_value(WRAPPER).unwrap_or_default(),
                    )
                };
                let mut surface = surface.borrow_mut();
                surface.apply_transform(COUNT, Transform::translate(count, 0.0));
                surface.apply_transform(WRAPPER, Transform::translate(wrapper, 0.0));
                if playing {
                    FrameControl::Continue
                } else {
                    tracing::debug!("loader finished");
                    FrameControl::Stop
                }
            })
        };

        tracing::debug!(duration_ms = timeline.borrow().duration_ms(), "loader started");
        Ok(Self { timeline, driver })
    }

    pub fn duration_ms(&self) -> f32 {
        self.timeline.borrow().duration_ms()
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.timeline.borrow().current_time()
    }

    pub fn count_offset(&self) -> f32 {
        self.timeline.borrow().track_value(COUNT).unwrap_or_default()
    }

    pub fn wrapper_offset(&self) -> f32 {
        self.timeline.borrow().track_value(WRAPPER).unwrap_or_default()
    }

    pub fn is_finished(&self) -> bool {
        self.timeline.borrow().is_finished()
    }

    pub fn is_active(&self) -> bool {
        self.driver.is_active()
    }

    pub fn dispose(&self) {
        if self.driver.cancel() {
            tracing::debug!("loader disposed");
        }
    }
}
