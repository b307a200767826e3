//! Easing functions for animations

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::error::{ensure_positive, AnimationError, Result};

/// Default elastic amplitude (`elastic.out(1, 0.3)`)
pub const DEFAULT_ELASTIC_AMPLITUDE: f32 = 1.0;

/// Default elastic period (`elastic.out(1, 0.3)`)
pub const DEFAULT_ELASTIC_PERIOD: f32 = 0.3;

/// Easing function type
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    EaseInQuint,
    EaseOutQuint,
    EaseInOutQuint,
    /// Damped oscillation that overshoots before settling on 1.0
    ElasticOut { amplitude: f32, period: f32 },
    CubicBezier(f32, f32, f32, f32),
}

impl Easing {
    /// Elastic-out with the default amplitude 1 and period 0.3
    pub const fn elastic() -> Self {
        Easing::ElasticOut {
            amplitude: DEFAULT_ELASTIC_AMPLITUDE,
            period: DEFAULT_ELASTIC_PERIOD,
        }
    }

    /// Reject curve parameters that would produce NaN
    pub fn validate(&self) -> Result<()> {
        match *self {
            Easing::ElasticOut { amplitude, period } => {
                ensure_positive("elastic amplitude", amplitude)?;
                ensure_positive("elastic period", period)
            }
            Easing::CubicBezier(x1, y1, x2, y2) => {
                if [x1, y1, x2, y2].iter().any(|v| !v.is_finite()) {
                    return Err(AnimationError::invalid(
                        "cubic bezier control points must be finite",
                    ));
                }
                if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
                    return Err(AnimationError::invalid(
                        "cubic bezier x control points must lie in [0, 1]",
                    ));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Apply the easing function to a progress value (0.0 to 1.0)
    ///
    /// Progress outside the unit interval is clamped, so both endpoints are
    /// exact for every curve.
    pub fn apply(&self, t: f32) -> f32 {
        if t <= 0.0 || t.is_nan() {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match *self {
            Easing::Linear => t,
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOutQuad => in_out(t, 2),
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => in_out(t, 3),
            Easing::EaseInQuart => t.powi(4),
            Easing::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            Easing::EaseInOutQuart => in_out(t, 4),
            Easing::EaseInQuint => t.powi(5),
            Easing::EaseOutQuint => 1.0 - (1.0 - t).powi(5),
            Easing::EaseInOutQuint => in_out(t, 5),
            Easing::ElasticOut { amplitude, period } => elastic_out(t, amplitude, period),
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier_ease(t, x1, y1, x2, y2),
        }
    }
}

/// Symmetric polynomial in-out curve of the given power
#[inline]
fn in_out(t: f32, power: i32) -> f32 {
    if t < 0.5 {
        2f32.powi(power - 1) * t.powi(power)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(power) / 2.0
    }
}

/// `a * 2^(-10t) * sin((t - s) * 2pi / p) + 1`
///
/// Amplitudes below 1 behave as 1. Computed in f64; f32 loses the tail of the
/// oscillation near t = 1.
fn elastic_out(t: f32, amplitude: f32, period: f32) -> f32 {
    let a = (amplitude as f64).max(1.0);
    let p = period as f64;
    let s = p / TAU * (1.0 / a).asin();
    let t = t as f64;
    (a * 2f64.powf(-10.0 * t) * ((t - s) * TAU / p).sin() + 1.0) as f32
}

/// Cubic bezier easing calculation (matches CSS timing functions).
///
/// Uses Newton-Raphson with binary-search fallback for robustness.
fn cubic_bezier_ease(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let x = t as f64;
    let x1 = x1 as f64;
    let y1 = y1 as f64;
    let x2 = x2 as f64;
    let y2 = y2 as f64;

    let mut p = x;
    for _ in 0..8 {
        let err = bezier_sample(p, x1, x2) - x;
        if err.abs() < 1e-7 {
            return bezier_sample(p, y1, y2) as f32;
        }
        let slope = bezier_slope(p, x1, x2);
        if slope.abs() < 1e-7 {
            break;
        }
        p -= err / slope;
    }

    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    p = x;
    for _ in 0..20 {
        let val = bezier_sample(p, x1, x2);
        if (val - x).abs() < 1e-7 {
            break;
        }
        if val < x {
            lo = p;
        } else {
            hi = p;
        }
        p = (lo + hi) * 0.5;
    }

    bezier_sample(p, y1, y2) as f32
}

/// Evaluate cubic bezier at parameter t: B(t) = 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³
#[inline]
fn bezier_sample(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

#[inline]
fn bezier_slope(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}
