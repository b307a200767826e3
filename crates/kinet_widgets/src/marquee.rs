//! Marquee
//!
//! A content strip repeated enough times to cover the container, scrolled
//! leftwards at a constant speed. Copies are positioned with modulo
//! arithmetic over `[-content_width, total_width - content_width)` so the
//! loop never jumps.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kinet_animation::error::ensure_positive;
use kinet_animation::{wrap, FrameControl, FrameDriver, Result};
use serde::{Deserialize, Serialize};

use crate::host::WidgetHost;
use crate::surface::{Surface, Transform};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarqueeConfig {
    /// Scroll speed in pixels per second
    pub speed: f32,
}

impl Default for MarqueeConfig {
    fn default() -> Self {
        Self { speed: 50.0 }
    }
}

impl MarqueeConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("marquee speed", self.speed)
    }
}

/// Looping strip geometry and scroll offset
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarqueeStrip {
    content_width: f32,
    copies: usize,
    offset: f32,
}

impl MarqueeStrip {
    /// Enough copies to cover `container_width` plus one spare on each side
    pub fn new(content_width: f32, container_width: f32) -> Result<Self> {
        ensure_positive("marquee content width", content_width)?;
        ensure_positive("marquee container width", container_width)?;
        let clones = (container_width / content_width).ceil() as usize + 1;
        Ok(Self {
            content_width,
            copies: clones + 1,
            offset: 0.0,
        })
    }

    pub fn content_width(&self) -> f32 {
        self.content_width
    }

    /// Original plus clones
    pub fn copies(&self) -> usize {
        self.copies
    }

    pub fn total_width(&self) -> f32 {
        self.content_width * self.copies as f32
    }

    /// Scroll offset, always within `[-content_width, total_width - content_width)`
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Offset of the whole strip, within `(-content_width, 0]`
    pub fn strip_offset(&self) -> f32 {
        let residual = (-self.offset).rem_euclid(self.content_width);
        if residual == 0.0 {
            0.0
        } else {
            -residual
        }
    }

    /// Move the strip `distance` pixels to the left
    pub fn advance(&mut self, distance: f32) -> f32 {
        if distance.is_finite() {
            self.offset = self.wrap(self.offset - distance);
        }
        self.offset
    }

    /// Position of copy `index`
    pub fn copy_position(&self, index: usize) -> f32 {
        self.wrap(index as f32 * self.content_width + self.offset)
    }

    fn wrap(&self, value: f32) -> f32 {
        wrap(
            -self.content_width,
            self.total_width() - self.content_width,
            value,
        )
    }
}

pub struct Marquee {
    strip: Rc<RefCell<MarqueeStrip>>,
    visible: Rc<Cell<bool>>,
    driver: FrameDriver,
}

impl Marquee {
    /// Copy `i` is surface element `i`
    pub fn new<S>(
        host: &WidgetHost,
        content_width: f32,
        container_width: f32,
        surface: Rc<RefCell<S>>,
        config: MarqueeConfig,
    ) -> Result<Self>
    where
        S: Surface + 'static,
    {
        config.validate()?;
        let strip = Rc::new(RefCell::new(MarqueeStrip::new(
            content_width,
            container_width,
        )?));
        let visible = Rc::new(Cell::new(true));

        let driver = {
            let strip = strip.clone();
            let visible = visible.clone();
            let speed = config.speed;
            FrameDriver::start(host.scheduler(), move |time| {
                if !visible.get() {
                    return FrameControl::Continue;
                }
                let strip = {
                    let mut strip = strip.borrow_mut();
                    strip.advance(speed * time.delta_ms / 1000.0);
                    *strip
                };
                let mut surface = surface.borrow_mut();
                surface.apply_scroll_offset(strip.strip_offset());
                for index in 0..strip.copies() {
                    let x = strip.copy_position(index);
                    surface.apply_transform(index, Transform::translate(x, 0.0));
                }
                FrameControl::Continue
            })
        };

        tracing::debug!(
            content_width,
            container_width,
            copies = strip.borrow().copies(),
            "marquee attached"
        );
        Ok(Self {
            strip,
            visible,
            driver,
        })
    }

    pub fn strip(&self) -> MarqueeStrip {
        *self.strip.borrow()
    }

    /// Pause while off screen, resume when visible again
    pub fn set_visible(&self, visible: bool) {
        if self.visible.replace(visible) != visible {
            tracing::debug!(visible, "marquee visibility changed");
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn is_active(&self) -> bool {
        self.driver.is_active()
    }

    pub fn dispose(&self) {
        if self.driver.cancel() {
            tracing::debug!("marquee disposed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;

    #[test]
    fn test_copy_count_covers_container() {
        let strip = MarqueeStrip::new(200.0, 400.0).unwrap();
        assert_eq!(strip.copies(), 4);
        assert_eq!(strip.total_width(), 800.0);

        let strip = MarqueeStrip::new(300.0, 400.0).unwrap();
        assert_eq!(strip.copies(), 4);
    }

    #[test]
    fn test_offset_wraps_with_residual() {
        let mut strip = MarqueeStrip::new(200.0, 400.0).unwrap();
        strip.advance(190.0);
        assert_eq!(strip.offset(), -190.0);
        // -210 is 10 past the boundary: lands at total - width - 10
        strip.advance(20.0);
        assert_eq!(strip.offset(), 590.0);
        assert_eq!(strip.strip_offset(), -10.0);
    }

    #[test]
    fn test_positions_stay_in_range() {
        let mut strip = MarqueeStrip::new(200.0, 400.0).unwrap();
        for _ in 0..500 {
            strip.advance(7.3);
            for index in 0..strip.copies() {
                let x = strip.copy_position(index);
                assert!((-200.0..600.0).contains(&x), "copy {index} at {x}");
            }
            assert!((-200.0..600.0).contains(&strip.offset()));
        }
    }

    #[test]
    fn test_copies_move_continuously() {
        let mut strip = MarqueeStrip::new(200.0, 400.0).unwrap();
        strip.advance(195.0);
        let before: Vec<f32> = (0..4).map(|i| strip.copy_position(i)).collect();
        strip.advance(10.0);
        let after: Vec<f32> = (0..4).map(|i| strip.copy_position(i)).collect();

        // Copy 0 crosses the left edge and re-enters on the right
        assert_eq!(before[0], -195.0);
        assert_eq!(after[0], 595.0);
        for i in 1..4 {
            assert_eq!(after[i], before[i] - 10.0);
        }
    }

    #[test]
    fn test_rejects_zero_widths() {
        assert!(MarqueeStrip::new(0.0, 400.0).is_err());
        assert!(MarqueeStrip::new(200.0, f32::NAN).is_err());
        let host = WidgetHost::new();
        let surface = Rc::new(RefCell::new(RecordingSurface::new()));
        let config = MarqueeConfig { speed: 0.0 };
        assert!(Marquee::new(&host, 200.0, 400.0, surface, config).is_err());
    }

    #[test]
    fn test_scrolls_at_speed_and_pauses() {
        let host = WidgetHost::new();
        let surface = Rc::new(RefCell::new(RecordingSurface::new()));
        let marquee =
            Marquee::new(&host, 200.0, 400.0, surface.clone(), MarqueeConfig::default()).unwrap();

        host.run_frame(0.0);
        host.run_frame(1000.0);
        assert_eq!(marquee.strip().offset(), -50.0);
        assert_eq!(surface.borrow().last_scroll_offset(), Some(-50.0));
        assert_eq!(
            surface.borrow().last_transform(1),
            Some(Transform::translate(150.0, 0.0))
        );

        marquee.set_visible(false);
        let recorded = surface.borrow().calls().len();
        host.run_frame(2000.0);
        assert_eq!(marquee.strip().offset(), -50.0);
        assert_eq!(surface.borrow().calls().len(), recorded);

        marquee.set_visible(true);
        host.run_frame(2500.0);
        assert_eq!(marquee.strip().offset(), -75.0);
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let host = WidgetHost::new();
        let surface = Rc::new(RefCell::new(RecordingSurface::new()));
        let marquee =
            Marquee::new(&host, 200.0, 400.0, surface.clone(), MarqueeConfig::default()).unwrap();
        marquee.dispose();
        marquee.dispose();
        assert!(!marquee.is_active());
        host.run_frame(0.0);
        assert!(surface.borrow().calls().is_empty());
    }
}
