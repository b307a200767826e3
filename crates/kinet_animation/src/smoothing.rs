//! Smoothing / interpolation stage
//!
//! An [`AnimationState`] moves its `current` value toward a target once per
//! frame tick, either by direct lerp or by an eased tween over a fixed
//! duration. Input handlers only ever replace the target; `current` is
//! written exclusively by [`AnimationState::tick`].

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::error::{ensure_positive, AnimationError, Result};
use crate::interpolate::Animatable;

/// Nominal frame interval the per-frame lerp factor is tuned for (60 Hz)
pub const NOMINAL_FRAME_MS: f32 = 1000.0 / 60.0;

/// Distance under which a lerp snaps onto its target
pub const SNAP_EPSILON: f32 = 1e-4;

/// Fraction of the remaining distance covered by one lerp tick
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LerpFactor {
    /// Fixed fraction per tick. Converges faster at higher frame rates.
    PerFrame(f32),
    /// `1 - exp(-rate * dt_ms)`; the same wall-clock speed at any frame rate.
    TimeScaled { rate: f32 },
}

impl LerpFactor {
    /// Time-scaled factor that matches `factor` per tick at 60 Hz
    pub fn time_scaled_from_per_frame(factor: f32) -> Result<Self> {
        LerpFactor::PerFrame(factor).validate()?;
        let rate = -(1.0 - factor).max(f32::MIN_POSITIVE).ln() / NOMINAL_FRAME_MS;
        Ok(LerpFactor::TimeScaled { rate })
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            LerpFactor::PerFrame(f) => {
                if f.is_finite() && f > 0.0 && f <= 1.0 {
                    Ok(())
                } else {
                    Err(AnimationError::invalid(format!(
                        "lerp factor must lie in (0, 1], got {f}"
                    )))
                }
            }
            LerpFactor::TimeScaled { rate } => ensure_positive("lerp rate", rate),
        }
    }

    /// Factor to apply for a tick of `dt_ms`
    pub fn factor(&self, dt_ms: f32) -> f32 {
        match *self {
            LerpFactor::PerFrame(f) => f,
            LerpFactor::TimeScaled { rate } => 1.0 - (-rate * dt_ms).exp(),
        }
        .clamp(0.0, 1.0)
    }
}

/// How an animated value approaches its target
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Smoothing {
    Lerp(LerpFactor),
    /// Eased interpolation from the value at retarget time over `duration_ms`
    Tween(Easing),
}

impl Smoothing {
    pub fn validate(&self, duration_ms: u32) -> Result<()> {
        match self {
            Smoothing::Lerp(factor) => factor.validate(),
            Smoothing::Tween(easing) => {
                if duration_ms == 0 {
                    return Err(AnimationError::invalid("tween duration must be positive"));
                }
                easing.validate()
            }
        }
    }
}

/// The value an animated parameter converges to
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationTarget<T> {
    value: T,
    smoothing: Smoothing,
    duration_ms: u32,
}

impl<T: Animatable> AnimationTarget<T> {
    /// Validated constructor; the only way to obtain a target
    pub fn new(value: T, smoothing: Smoothing, duration_ms: u32) -> Result<Self> {
        if !value.is_finite() {
            return Err(AnimationError::invalid(format!(
                "target value must be finite, got {value:?}"
            )));
        }
        smoothing.validate(duration_ms)?;
        Ok(Self {
            value,
            smoothing,
            duration_ms,
        })
    }

    pub fn lerp(value: T, factor: LerpFactor) -> Result<Self> {
        Self::new(value, Smoothing::Lerp(factor), 0)
    }

    pub fn tween(value: T, easing: Easing, duration_ms: u32) -> Result<Self> {
        Self::new(value, Smoothing::Tween(easing), duration_ms)
    }

    /// Elastic-out tween with amplitude 1 and period 0.3
    pub fn elastic(value: T, duration_ms: u32) -> Result<Self> {
        Self::tween(value, Easing::elastic(), duration_ms)
    }

    /// Same smoothing and duration aimed at a different value
    pub fn with_value(&self, value: T) -> Self {
        Self { value, ..*self }
    }

    pub fn value(&self) -> T {
        self.value
    }

    pub fn smoothing(&self) -> Smoothing {
        self.smoothing
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }
}

/// Per-instance animation state
#[derive(Clone, Debug)]
pub struct AnimationState<T> {
    current: T,
    target: AnimationTarget<T>,
    velocity: f32,
    /// Value the running tween started from
    start: T,
    elapsed_ms: f32,
    /// Target replaced since the last tick
    retargeted: bool,
}

impl<T: Animatable> AnimationState<T> {
    pub fn new(initial: T, target: AnimationTarget<T>) -> Result<Self> {
        if !initial.is_finite() {
            return Err(AnimationError::invalid(format!(
                "initial value must be finite, got {initial:?}"
            )));
        }
        Ok(Self {
            current: initial,
            target,
            velocity: 0.0,
            start: initial,
            elapsed_ms: 0.0,
            retargeted: true,
        })
    }

    /// A state resting at `value` whose target is `value` itself
    pub fn resting(value: T, smoothing: Smoothing, duration_ms: u32) -> Result<Self> {
        let target = AnimationTarget::new(value, smoothing, duration_ms)?;
        Self::new(value, target)
    }

    pub fn current(&self) -> T {
        self.current
    }

    pub fn target(&self) -> &AnimationTarget<T> {
        &self.target
    }

    /// Distance covered per millisecond during the last tick
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed_ms
    }

    /// Replace the target. A running tween restarts from the current value
    /// on the next tick.
    pub fn set_target(&mut self, target: AnimationTarget<T>) {
        self.target = target;
        self.retargeted = true;
    }

    /// Re-aim the existing target, ignoring non-finite values
    pub fn set_target_value(&mut self, value: T) {
        if !value.is_finite() {
            tracing::warn!(?value, "ignoring non-finite animation target");
            return;
        }
        self.set_target(self.target.with_value(value));
    }

    /// True once `current` sits exactly on the target
    pub fn is_settled(&self) -> bool {
        !self.retargeted && self.current == self.target.value
    }

    /// Advance by `dt_ms` and return the new current value.
    ///
    /// Negative or non-finite deltas count as zero. A step that would produce
    /// a non-finite value keeps the previous one.
    pub fn tick(&mut self, dt_ms: f32) -> T {
        let dt = if dt_ms.is_finite() && dt_ms > 0.0 {
            dt_ms
        } else {
            0.0
        };

        if self.retargeted {
            self.start = self.current;
            self.elapsed_ms = 0.0;
            self.retargeted = false;
        }

        let previous = self.current;
        let goal = self.target.value;

        let next = match self.target.smoothing {
            Smoothing::Lerp(factor) => {
                let before = previous.distance(goal);
                let f = factor.factor(dt);
                if before <= SNAP_EPSILON {
                    goal
                } else if f <= 0.0 {
                    previous
                } else {
                    let stepped = previous.lerp(goal, f);
                    let after = stepped.distance(goal);
                    // Snap when rounding stalls progress near the target
                    if after <= SNAP_EPSILON || after >= before {
                        goal
                    } else {
                        stepped
                    }
                }
            }
            Smoothing::Tween(easing) => {
                let duration = self.target.duration_ms as f32;
                self.elapsed_ms = (self.elapsed_ms + dt).min(duration);
                if self.elapsed_ms >= duration {
                    goal
                } else {
                    self.start.lerp(goal, easing.apply(self.elapsed_ms / duration))
                }
            }
        };

        if next.is_finite() {
            self.current = next;
        } else {
            tracing::warn!(?next, "animation tick produced a non-finite value; holding");
        }

        self.velocity = if dt > 0.0 {
            previous.distance(self.current) / dt
        } else {
            0.0
        };

        self.current
    }
}
