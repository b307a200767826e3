//! Googly eyes
//!
//! Each pupil points at the pointer from its eye's centre, never straying
//! further than a fraction of the eye width. Pointer leave is ignored so
//! the pupils keep looking where the pointer was last seen.

use std::cell::RefCell;
use std::rc::Rc;

use kinet_animation::error::ensure_positive;
use kinet_animation::{
    Animation, AnimationError, AnimationHandle, AnimationState, LerpFactor, Result, Smoothing,
};
use kinet_core::{EventKind, ListenerGuard, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::host::WidgetHost;
use crate::surface::{BoundsSource, Surface, Transform};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyesConfig {
    pub smoothing: LerpFactor,
    /// Pupil travel as a fraction of the eye width
    pub max_offset_ratio: f32,
}

impl Default for EyesConfig {
    fn default() -> Self {
        Self {
            smoothing: LerpFactor::PerFrame(0.2),
            max_offset_ratio: 0.25,
        }
    }
}

impl EyesConfig {
    pub fn validate(&self) -> Result<()> {
        self.smoothing.validate()?;
        ensure_positive("eyes max_offset_ratio", self.max_offset_ratio)
    }
}

/// Pupil offset from the centre of `eye` toward `pointer`
pub fn pupil_offset(eye: Rect, pointer: Point, max_offset_ratio: f32) -> Vec2 {
    if eye.size.is_degenerate() {
        return Vec2::ZERO;
    }
    let center = eye.center();
    let (dx, dy) = (pointer.x - center.x, pointer.y - center.y);
    if !(dx.is_finite() && dy.is_finite()) {
        return Vec2::ZERO;
    }
    let angle = dy.atan2(dx);
    let distance = (eye.width() * max_offset_ratio).min(dx.hypot(dy));
    Vec2::new(angle.cos() * distance, angle.sin() * distance)
}

pub struct GooglyEyes {
    eyes: SmallVec<[Animation<Vec2>; 2]>,
    listener: ListenerGuard,
}

impl GooglyEyes {
    /// Attach one pupil per entry in `eyes`; pupil `i` is surface element `i`
    pub fn new<B, S>(
        host: &WidgetHost,
        eyes: Vec<B>,
        surface: Rc<RefCell<S>>,
        config: EyesConfig,
    ) -> Result<Self>
    where
        B: BoundsSource + 'static,
        S: Surface + 'static,
    {
        config.validate()?;
        if eyes.is_empty() {
            return Err(AnimationError::invalid("googly eyes need at least one eye"));
        }

        let mut animations: SmallVec<[Animation<Vec2>; 2]> = SmallVec::new();
        let mut targets: Vec<(B, AnimationHandle<Vec2>)> = Vec::with_capacity(eyes.len());
        for (index, bounds) in eyes.into_iter().enumerate() {
            let state = AnimationState::resting(Vec2::ZERO, Smoothing::Lerp(config.smoothing), 0)?;
            let surface = surface.clone();
            let animation = Animation::start(host.scheduler(), state, move |sample| {
                let offset = sample.value;
                surface
                    .borrow_mut()
                    .apply_transform(index, Transform::translate(offset.x, offset.y));
            });
            targets.push((bounds, animation.handle()));
            animations.push(animation);
        }

        let ratio = config.max_offset_ratio;
        let listener = host.events().subscribe(&[EventKind::Move], move |event| {
            for (bounds, handle) in &targets {
                handle.set_target_value(pupil_offset(
                    bounds.bounding_rect(),
                    event.position(),
                    ratio,
                ));
            }
        });

        tracing::debug!(eyes = animations.len(), "googly eyes attached");
        Ok(Self {
            eyes: animations,
            listener,
        })
    }

    pub fn eye_count(&self) -> usize {
        self.eyes.len()
    }

    /// Current pupil offset of eye `index`
    pub fn pupil(&self, index: usize) -> Option<Vec2> {
        self.eyes.get(index).map(Animation::current)
    }

    pub fn dispose(&mut self) {
        self.listener.release();
        for eye in &self.eyes {
            eye.cancel();
        }
        tracing::debug!("googly eyes disposed");
    }
}
