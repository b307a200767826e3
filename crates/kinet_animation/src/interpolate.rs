//! Interpolation and range utilities
//!
//! `map_range`, `clamp` and `wrap` follow the usual animation-utility
//! semantics: mapping clamps its input first, wrapping is modulo arithmetic
//! over a half-open range.

use kinet_core::Vec2;

/// Values that the smoothing stage can drive
pub trait Animatable: Copy + std::fmt::Debug + PartialEq + 'static {
    /// Linear interpolation toward `target` by `t` (unclamped)
    fn lerp(self, target: Self, t: f32) -> Self;

    /// Distance between two values, used for convergence and velocity
    fn distance(self, other: Self) -> f32;

    fn is_finite(self) -> bool;
}

impl Animatable for f32 {
    #[inline]
    fn lerp(self, target: f32, t: f32) -> f32 {
        // Two-product form keeps both endpoints exact
        self * (1.0 - t) + target * t
    }

    #[inline]
    fn distance(self, other: f32) -> f32 {
        (self - other).abs()
    }

    #[inline]
    fn is_finite(self) -> bool {
        f32::is_finite(self)
    }
}

impl Animatable for Vec2 {
    #[inline]
    fn lerp(self, target: Vec2, t: f32) -> Vec2 {
        Vec2::new(self.x.lerp(target.x, t), self.y.lerp(target.y, t))
    }

    #[inline]
    fn distance(self, other: Vec2) -> f32 {
        Vec2::distance(&self, other)
    }

    #[inline]
    fn is_finite(self) -> bool {
        Vec2::is_finite(&self)
    }
}

/// Clamp `value` into `[min, max]`, accepting the bounds in either order
pub fn clamp(min: f32, max: f32, value: f32) -> f32 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    value.max(lo).min(hi)
}

/// Map `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// The input is clamped to its range first, so the result never leaves the
/// output range and both endpoints map exactly. A degenerate input range
/// yields the output midpoint.
pub fn map_range(in_min: f32, in_max: f32, out_min: f32, out_max: f32, value: f32) -> f32 {
    let span = in_max - in_min;
    if span == 0.0 || !span.is_finite() {
        return (out_min + out_max) / 2.0;
    }
    let t = (clamp(in_min, in_max, value) - in_min) / span;
    if !t.is_finite() {
        return (out_min + out_max) / 2.0;
    }
    clamp(out_min, out_max, out_min.lerp(out_max, t))
}

/// Wrap `value` into the half-open range `[min, max)`.
///
/// An empty range returns `min`.
pub fn wrap(min: f32, max: f32, value: f32) -> f32 {
    let range = max - min;
    if range <= 0.0 || !range.is_finite() || !value.is_finite() {
        return min;
    }
    let wrapped = min + (value - min).rem_euclid(range);
    // rem_euclid can round up to exactly `range` for tiny negative inputs
    if wrapped >= max {
        min
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_range_endpoints_exact() {
        assert_eq!(map_range(0.0, 200.0, 10.0, 190.0, 0.0), 10.0);
        assert_eq!(map_range(0.0, 200.0, 10.0, 190.0, 200.0), 190.0);
        assert_eq!(map_range(0.0, 200.0, 10.0, 190.0, 100.0), 100.0);
        assert_eq!(map_range(0.0, 3.0, 0.1, 0.3, 3.0), 0.3);
    }

    #[test]
    fn test_map_range_clamps() {
        for i in -50..=50 {
            let v = i as f32 * 13.7;
            let out = map_range(0.0, 200.0, 10.0, 190.0, v);
            assert!((10.0..=190.0).contains(&out), "{v} -> {out}");
        }
        // Inverted output range
        assert_eq!(map_range(0.0, 10.0, 1.0, -1.0, 20.0), -1.0);
        assert_eq!(map_range(0.0, 10.0, 1.0, -1.0, -5.0), 1.0);
    }

    #[test]
    fn test_map_range_degenerate_input() {
        assert_eq!(map_range(5.0, 5.0, 10.0, 190.0, 7.0), 100.0);
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap(-200.0, 400.0, -201.0), 399.0);
        assert_eq!(wrap(-200.0, 400.0, 400.0), -200.0);
        assert_eq!(wrap(-200.0, 400.0, 0.0), 0.0);
        assert_eq!(wrap(-200.0, 400.0, 1000.0), -200.0);
        assert_eq!(wrap(0.0, 0.0, 5.0), 0.0);
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(0.1f32.lerp(0.3, 0.0), 0.1);
        assert_eq!(0.1f32.lerp(0.3, 1.0), 0.3);
        assert_eq!(Vec2::ZERO.lerp(Vec2::new(10.0, -4.0), 0.5), Vec2::new(5.0, -2.0));
    }
}
