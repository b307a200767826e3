//! Input sampler
//!
//! Converts absolute pointer coordinates into bounds-relative, range-mapped
//! samples. Sampling is a pure function of the event and the reference
//! bounds.

use kinet_core::{InputEvent, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, Result};
use crate::interpolate::{clamp, map_range};

/// A normalized pointer position relative to a reference box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
    pub timestamp_ms: u64,
}

impl PointerSample {
    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// How one axis of a bounds-relative position becomes a sample value
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisMapping {
    /// Map `[0, extent]` linearly onto `[out_min, out_max]`
    Range { out_min: f32, out_max: f32 },
    /// Offset from the box centre, clamped to `[min, max]`
    Centered { min: f32, max: f32 },
    /// Bounds-relative coordinate, unmapped
    Raw,
}

impl AxisMapping {
    fn validate(&self) -> Result<()> {
        match *self {
            AxisMapping::Range { out_min, out_max } => {
                ensure_finite("range out_min", out_min)?;
                ensure_finite("range out_max", out_max)
            }
            AxisMapping::Centered { min, max } => {
                ensure_finite("centered min", min)?;
                ensure_finite("centered max", max)
            }
            AxisMapping::Raw => Ok(()),
        }
    }

    /// Midpoint of the output range, used when the reference extent is zero
    pub fn midpoint(&self) -> f32 {
        match *self {
            AxisMapping::Range { out_min, out_max } => (out_min + out_max) / 2.0,
            AxisMapping::Centered { min, max } => (min + max) / 2.0,
            AxisMapping::Raw => 0.0,
        }
    }

    /// Map a bounds-relative coordinate given the box extent on this axis
    pub fn map(&self, local: f32, extent: f32) -> f32 {
        if !(extent.is_finite() && extent > 0.0) || !local.is_finite() {
            return self.midpoint();
        }
        match *self {
            AxisMapping::Range { out_min, out_max } => {
                map_range(0.0, extent, out_min, out_max, local)
            }
            AxisMapping::Centered { min, max } => clamp(min, max, local - extent / 2.0),
            AxisMapping::Raw => local,
        }
    }
}

/// Per-axis pointer sampler
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sampler {
    x: AxisMapping,
    y: AxisMapping,
}

impl Sampler {
    /// Build a sampler, rejecting non-finite range limits
    pub fn new(x: AxisMapping, y: AxisMapping) -> Result<Self> {
        x.validate()?;
        y.validate()?;
        Ok(Self { x, y })
    }

    /// Sampler that only converts to bounds-relative coordinates
    pub fn raw() -> Self {
        Self {
            x: AxisMapping::Raw,
            y: AxisMapping::Raw,
        }
    }

    pub fn x_mapping(&self) -> AxisMapping {
        self.x
    }

    pub fn y_mapping(&self) -> AxisMapping {
        self.y
    }

    /// Sample an event against the reference bounds
    pub fn sample(&self, event: &InputEvent, bounds: Rect) -> PointerSample {
        let local = bounds.to_local(event.position());
        PointerSample {
            x: self.x.map(local.x, bounds.width()),
            y: self.y.map(local.y, bounds.height()),
            timestamp_ms: event.timestamp_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinet_core::EventKind;

    fn line_sampler() -> Sampler {
        Sampler::new(
            AxisMapping::Range {
                out_min: 10.0,
                out_max: 190.0,
            },
            AxisMapping::Centered {
                min: -50.0,
                max: 50.0,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_sample_relative_to_bounds() {
        let sampler = line_sampler();
        let bounds = Rect::new(50.0, 100.0, 200.0, 60.0);

        let s = sampler.sample(&InputEvent::pointer(EventKind::Move, 150.0, 130.0, 7), bounds);
        assert_eq!(s.x, 100.0);
        assert_eq!(s.y, 0.0);
        assert_eq!(s.timestamp_ms, 7);

        let s = sampler.sample(&InputEvent::pointer(EventKind::Move, 50.0, 100.0, 8), bounds);
        assert_eq!(s.x, 10.0);
        assert_eq!(s.y, -30.0);
    }

    #[test]
    fn test_sample_clamps_outside_bounds() {
        let sampler = line_sampler();
        let bounds = Rect::new(0.0, 0.0, 200.0, 300.0);

        let s = sampler.sample(&InputEvent::pointer(EventKind::Move, 900.0, 900.0, 0), bounds);
        assert_eq!(s.x, 190.0);
        assert_eq!(s.y, 50.0);

        let s = sampler.sample(&InputEvent::pointer(EventKind::Move, -900.0, -900.0, 0), bounds);
        assert_eq!(s.x, 10.0);
        assert_eq!(s.y, -50.0);
    }

    #[test]
    fn test_zero_bounds_fall_back_to_midpoint() {
        let sampler = line_sampler();
        let s = sampler.sample(
            &InputEvent::pointer(EventKind::Move, 40.0, 40.0, 0),
            Rect::ZERO,
        );
        assert_eq!(s.x, 100.0);
        assert_eq!(s.y, 0.0);
    }

    #[test]
    fn test_raw_sampler() {
        let s = Sampler::raw().sample(
            &InputEvent::pointer(EventKind::Move, 15.0, 25.0, 0),
            Rect::new(5.0, 5.0, 100.0, 100.0),
        );
        assert_eq!(s.as_vec2(), Vec2::new(10.0, 20.0));
    }

    #[test]
    fn test_rejects_non_finite_limits() {
        assert!(Sampler::new(
            AxisMapping::Range {
                out_min: f32::NAN,
                out_max: 1.0
            },
            AxisMapping::Raw
        )
        .is_err());
    }
}
