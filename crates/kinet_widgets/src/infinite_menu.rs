//! Infinite text menu
//!
//! Wheel and drag input accumulate a scroll target that a lerp chases every
//! frame. Items wrap around so the list never ends, and scale down and tilt
//! with the scroll speed.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kinet_animation::error::ensure_positive;
use kinet_animation::{
    wrap, Animation, AnimationError, AnimationState, LerpFactor, Result, Smoothing,
};
use kinet_core::{EventKind, InputEvent, ListenerGuard};
use serde::{Deserialize, Serialize};

use crate::host::WidgetHost;
use crate::surface::{Surface, Transform};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub smoothing: LerpFactor,
    /// Scale lost per pixel-per-frame of scroll speed
    pub scale_per_speed: f32,
    /// Upper bound on the scale reduction
    pub max_scale_reduction: f32,
    /// Degrees of rotation per pixel-per-frame of scroll speed
    pub rotation_per_speed: f32,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            smoothing: LerpFactor::PerFrame(0.1),
            scale_per_speed: 0.0075,
            max_scale_reduction: 100.0,
            rotation_per_speed: 0.2,
        }
    }
}

impl MenuConfig {
    pub fn validate(&self) -> Result<()> {
        self.smoothing.validate()?;
        ensure_positive("menu scale_per_speed", self.scale_per_speed)?;
        ensure_positive("menu max_scale_reduction", self.max_scale_reduction)?;
        if !self.rotation_per_speed.is_finite() {
            return Err(AnimationError::invalid("menu rotation_per_speed must be finite"));
        }
        Ok(())
    }

    /// Item transform for a scroll speed in pixels per frame
    pub fn speed_transform(&self, speed: f32) -> (f32, f32) {
        let scale = 1.0 - (speed.abs() * self.scale_per_speed).min(self.max_scale_reduction);
        (scale, speed * self.rotation_per_speed)
    }
}

/// Vertical position of item `index` for a scroll offset
pub fn item_position(index: usize, item_count: usize, item_height: f32, scroll: f32) -> f32 {
    let total = item_count as f32 * item_height;
    wrap(-item_height, total - item_height, index as f32 * item_height + scroll)
}

#[derive(Debug, Default)]
struct DragState {
    dragging: bool,
    last_y: f32,
}

pub struct InfiniteMenu {
    item_count: usize,
    item_height: Rc<Cell<f32>>,
    speed: Rc<Cell<f32>>,
    scroll: Animation<f32>,
    listener: ListenerGuard,
}

impl InfiniteMenu {
    /// Item `i` is surface element `i`
    pub fn new<S>(
        host: &WidgetHost,
        item_count: usize,
        item_height: f32,
        surface: Rc<RefCell<S>>,
        config: MenuConfig,
    ) -> Result<Self>
    where
        S: Surface + 'static,
    {
        config.validate()?;
        if item_count == 0 {
            return Err(AnimationError::invalid("menu needs at least one item"));
        }
        ensure_positive("menu item height", item_height)?;

        let item_height = Rc::new(Cell::new(item_height));
        let speed = Rc::new(Cell::new(0.0f32));
        let state = AnimationState::resting(0.0f32, Smoothing::Lerp(config.smoothing), 0)?;

        let scroll = {
            let item_height = item_height.clone();
            let speed = speed.clone();
            let mut last = 0.0f32;
            Animation::start(host.scheduler(), state, move |sample| {
                let current_speed = sample.value - last;
                last = sample.value;
                speed.set(current_speed);

                let (scale, rotation) = config.speed_transform(current_speed);
                let height = item_height.get();
                let mut surface = surface.borrow_mut();
                for index in 0..item_count {
                    let y = item_position(index, item_count, height, sample.value);
                    surface.apply_transform(
                        index,
                        Transform::translate(0.0, y)
                            .with_scale(scale)
                            .with_rotation(rotation),
                    );
                }
            })
        };

        let listener = {
            let handle = scroll.handle();
            let item_height = item_height.clone();
            let drag = RefCell::new(DragState::default());
            host.events().subscribe(
                &[
                    EventKind::Wheel,
                    EventKind::DragStart,
                    EventKind::DragMove,
                    EventKind::DragEnd,
                    EventKind::Leave,
                    EventKind::Resize,
                ],
                move |event: &InputEvent| match event.kind {
                    EventKind::Wheel => {
                        handle.set_target_value(handle.target().value() - event.delta_y);
                    }
                    EventKind::DragStart => {
                        *drag.borrow_mut() = DragState {
                            dragging: true,
                            last_y: event.y,
                        };
                    }
                    EventKind::DragMove => {
                        let mut drag = drag.borrow_mut();
                        if drag.dragging {
                            let dy = event.y - drag.last_y;
                            drag.last_y = event.y;
                            handle.set_target_value(handle.target().value() + dy);
                        }
                    }
                    EventKind::DragEnd | EventKind::Leave => {
                        drag.borrow_mut().dragging = false;
                    }
                    EventKind::Resize => set_height(&item_height, event.y),
                    _ => {}
                },
            )
        };

        tracing::debug!(item_count, "infinite menu attached");
        Ok(Self {
            item_count,
            item_height,
            speed,
            scroll,
            listener,
        })
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn item_height(&self) -> f32 {
        self.item_height.get()
    }

    /// Apply a re-measured item height; invalid heights are ignored
    pub fn set_item_height(&self, height: f32) {
        set_height(&self.item_height, height);
    }

    /// Smoothed scroll offset
    pub fn scroll(&self) -> f32 {
        self.scroll.current()
    }

    /// Scroll offset the menu is heading for
    pub fn scroll_target(&self) -> f32 {
        self.scroll.handle().target().value()
    }

    /// Scroll distance covered by the last frame
    pub fn speed(&self) -> f32 {
        self.speed.get()
    }

    pub fn item_position(&self, index: usize) -> f32 {
        item_position(index, self.item_count, self.item_height(), self.scroll())
    }

    pub fn dispose(&mut self) {
        self.listener.release();
        self.scroll.cancel();
        tracing::debug!("infinite menu disposed");
    }
}

fn set_height(cell: &Cell<f32>, height: f32) {
    if height.is_finite() && height > 0.0 {
        cell.set(height);
        tracing::debug!(height, "menu item height updated");
    } else {
        tracing::warn!(height, "ignoring invalid menu item height");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;

    fn setup() -> (WidgetHost, Rc<RefCell<RecordingSurface>>, InfiniteMenu) {
        let host = WidgetHost::new();
        let surface = Rc::new(RefCell::new(RecordingSurface::new()));
        let menu =
            InfiniteMenu::new(&host, 5, 100.0, surface.clone(), MenuConfig::default()).unwrap();
        (host, surface, menu)
    }

    #[test]
    fn test_item_positions_wrap() {
        assert_eq!(item_position(0, 5, 100.0, 0.0), 0.0);
        assert_eq!(item_position(4, 5, 100.0, 0.0), 400.0 - 500.0);
        assert_eq!(item_position(0, 5, 100.0, -150.0), 350.0);
        assert_eq!(item_position(2, 5, 100.0, 1000.0), 200.0);
    }

    #[test]
    fn test_speed_transform() {
        let config = MenuConfig::default();
        let (scale, rotation) = config.speed_transform(-10.0);
        assert!((scale - 0.925).abs() < 1e-6);
        assert!((rotation + 2.0).abs() < 1e-6);
        assert_eq!(config.speed_transform(0.0), (1.0, 0.0));
    }

    #[test]
    fn test_wheel_scrolls_smoothly() {
        let (host, surface, menu) = setup();
        host.dispatch(&InputEvent::wheel(100.0, 0));
        assert_eq!(menu.scroll_target(), -100.0);
        assert_eq!(menu.scroll(), 0.0);

        host.advance(1);
        assert!((menu.scroll() + 10.0).abs() < 1e-4);
        assert!((menu.speed() + 10.0).abs() < 1e-4);

        let first = surface.borrow().last_transform(0).unwrap();
        assert!((first.translate.y + 10.0).abs() < 1e-4);
        assert!((first.scale - 0.925).abs() < 1e-4);

        host.advance(300);
        assert_eq!(menu.scroll(), -100.0);
        assert_eq!(menu.speed(), 0.0);
        assert_eq!(menu.item_position(0), -100.0);
        assert_eq!(menu.item_position(4), 300.0);
    }

    #[test]
    fn test_drag_accumulates_only_while_dragging() {
        let (host, _surface, menu) = setup();
        host.dispatch(&InputEvent::pointer(EventKind::DragMove, 0.0, 40.0, 0));
        assert_eq!(menu.scroll_target(), 0.0);

        host.dispatch(&InputEvent::pointer(EventKind::DragStart, 0.0, 50.0, 1));
        host.dispatch(&InputEvent::pointer(EventKind::DragMove, 0.0, 80.0, 2));
        host.dispatch(&InputEvent::pointer(EventKind::DragMove, 0.0, 70.0, 3));
        assert_eq!(menu.scroll_target(), 20.0);

        host.dispatch(&InputEvent::pointer(EventKind::DragEnd, 0.0, 70.0, 4));
        host.dispatch(&InputEvent::pointer(EventKind::DragMove, 0.0, 0.0, 5));
        assert_eq!(menu.scroll_target(), 20.0);
    }

    #[test]
    fn test_resize_updates_item_height() {
        let (host, _surface, menu) = setup();
        host.dispatch(&InputEvent::resize(800.0, 120.0, 0));
        assert_eq!(menu.item_height(), 120.0);
        menu.set_item_height(-1.0);
        assert_eq!(menu.item_height(), 120.0);
        assert_eq!(menu.item_position(4), 480.0 - 120.0 * 5.0);
    }

    #[test]
    fn test_rejects_bad_config() {
        let host = WidgetHost::new();
        let surface = Rc::new(RefCell::new(RecordingSurface::new()));
        let config = MenuConfig::default();
        assert!(InfiniteMenu::new(&host, 0, 100.0, surface.clone(), config).is_err());
        assert!(InfiniteMenu::new(&host, 3, 0.0, surface.clone(), config).is_err());
        let config = MenuConfig {
            smoothing: LerpFactor::PerFrame(2.0),
            ..MenuConfig::default()
        };
        assert!(InfiniteMenu::new(&host, 3, 100.0, surface, config).is_err());
    }

    #[test]
    fn test_dispose_detaches() {
        let (host, surface, mut menu) = setup();
        menu.dispose();
        host.dispatch(&InputEvent::wheel(100.0, 0));
        host.advance(3);
        assert!(surface.borrow().calls().is_empty());
        assert_eq!(menu.scroll_target(), 0.0);
        assert!(!host.is_busy());
    }
}
