//! Animated line
//!
//! A quadratic curve `M {start} 0 Q {x} {y} {end} 0` whose control point
//! follows the pointer inside the reference box and springs back to the
//! middle of the line when the pointer leaves.

use std::cell::RefCell;
use std::rc::Rc;

use kinet_animation::error::{ensure_finite, ensure_positive};
use kinet_animation::tracker::DEFAULT_CONVERGENCE_EPSILON;
use kinet_animation::{
    Animation, AnimationError, AnimationState, AnimationTarget, AxisMapping, Easing,
    PointerTracker, Result, Sampler, TrackingPhase,
};
use kinet_core::{EventKind, ListenerGuard, Vec2};
use serde::{Deserialize, Serialize};

use crate::host::WidgetHost;
use crate::surface::{format_number, BoundsSource, Surface};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    /// x of the fixed start point
    pub start_x: f32,
    /// x of the fixed end point
    pub end_x: f32,
    /// Largest vertical control point offset
    pub max_deflection: f32,
    pub follow_duration_ms: u32,
    pub return_duration_ms: u32,
    pub easing: Easing,
    pub convergence_epsilon: f32,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            start_x: 10.0,
            end_x: 190.0,
            max_deflection: 50.0,
            follow_duration_ms: 300,
            return_duration_ms: 1000,
            easing: Easing::elastic(),
            convergence_epsilon: DEFAULT_CONVERGENCE_EPSILON,
        }
    }
}

impl LineConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_finite("line start_x", self.start_x)?;
        ensure_finite("line end_x", self.end_x)?;
        if self.end_x <= self.start_x {
            return Err(AnimationError::invalid(format!(
                "line end_x ({}) must be greater than start_x ({})",
                self.end_x, self.start_x
            )));
        }
        ensure_positive("line max_deflection", self.max_deflection)?;
        ensure_positive("line convergence_epsilon", self.convergence_epsilon)?;
        if self.follow_duration_ms == 0 || self.return_duration_ms == 0 {
            return Err(AnimationError::invalid("line durations must be positive"));
        }
        self.easing.validate()
    }

    /// Rest position of the control point
    pub fn home(&self) -> Vec2 {
        Vec2::new((self.start_x + self.end_x) / 2.0, 0.0)
    }
}

/// Path data for a control point at `control`
pub fn line_path(start_x: f32, end_x: f32, control: Vec2) -> String {
    format!(
        "M {} 0 Q {} {} {} 0",
        format_number(start_x),
        format_number(control.x),
        format_number(control.y),
        format_number(end_x)
    )
}

pub struct AnimatedLine {
    config: LineConfig,
    animation: Animation<Vec2>,
    tracker: Rc<RefCell<PointerTracker>>,
    path: Rc<RefCell<String>>,
    listener: ListenerGuard,
}

impl AnimatedLine {
    pub fn new<B, S>(
        host: &WidgetHost,
        bounds: B,
        surface: Rc<RefCell<S>>,
        config: LineConfig,
    ) -> Result<Self>
    where
        B: BoundsSource + 'static,
        S: Surface + 'static,
    {
        config.validate()?;

        let sampler = Sampler::new(
            AxisMapping::Range {
                out_min: config.start_x,
                out_max: config.end_x,
            },
            AxisMapping::Centered {
                min: -config.max_deflection,
                max: config.max_deflection,
            },
        )?;
        let home = config.home();
        let follow = AnimationTarget::tween(home, config.easing, config.follow_duration_ms)?;
        let return_home = AnimationTarget::tween(home, config.easing, config.return_duration_ms)?;
        let state = AnimationState::new(home, return_home)?;

        let tracker = Rc::new(RefCell::new(PointerTracker::new(config.convergence_epsilon)));
        let path = Rc::new(RefCell::new(line_path(config.start_x, config.end_x, home)));

        let animation = {
            let tracker = tracker.clone();
            let path = path.clone();
            let (start_x, end_x) = (config.start_x, config.end_x);
            Animation::start(host.scheduler(), state, move |sample| {
                let d = line_path(start_x, end_x, sample.value);
                surface.borrow_mut().apply_path_command(&d);
                *path.borrow_mut() = d;
                tracker.borrow_mut().observe(sample.value, home);
            })
        };

        let listener = {
            let handle = animation.handle();
            let tracker = tracker.clone();
            host.events().subscribe(
                &[EventKind::Enter, EventKind::Move, EventKind::Leave],
                move |event| {
                    if event.kind == EventKind::Leave {
                        tracker.borrow_mut().pointer_left();
                        handle.set_target(return_home);
                        return;
                    }
                    let sample = sampler.sample(event, bounds.bounding_rect());
                    {
                        let mut tracker = tracker.borrow_mut();
                        if event.kind == EventKind::Enter {
                            tracker.pointer_entered();
                        } else {
                            tracker.pointer_moved();
                        }
                    }
                    handle.set_target(follow.with_value(sample.as_vec2()));
                },
            )
        };

        tracing::debug!(?config, "animated line attached");
        Ok(Self {
            config,
            animation,
            tracker,
            path,
            listener,
        })
    }

    pub fn config(&self) -> &LineConfig {
        &self.config
    }

    pub fn phase(&self) -> TrackingPhase {
        self.tracker.borrow().phase()
    }

    /// Returns home that ran to completion without the pointer re-entering
    pub fn returns_completed(&self) -> u32 {
        self.tracker.borrow().returns_completed()
    }

    /// Current control point
    pub fn control_point(&self) -> Vec2 {
        self.animation.current()
    }

    /// Control point the line is heading for
    pub fn target(&self) -> Vec2 {
        self.animation.handle().target().value()
    }

    /// Last path written to the surface
    pub fn path(&self) -> String {
        self.path.borrow().clone()
    }

    pub fn is_active(&self) -> bool {
        self.animation.is_active()
    }

    /// Detach from the host. Dropping the line does the same.
    pub fn dispose(&mut self) {
        self.listener.release();
        self.animation.cancel();
        tracing::debug!("animated line disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;
    use kinet_core::{InputEvent, Rect};

    fn setup() -> (WidgetHost, Rc<RefCell<RecordingSurface>>, AnimatedLine) {
        let host = WidgetHost::new();
        let surface = Rc::new(RefCell::new(RecordingSurface::new()));
        let line = AnimatedLine::new(
            &host,
            Rect::new(0.0, 0.0, 200.0, 60.0),
            surface.clone(),
            LineConfig::default(),
        )
        .unwrap();
        (host, surface, line)
    }

    #[test]
    fn test_rests_at_home() {
        let (host, surface, line) = setup();
        host.advance(2);
        assert_eq!(surface.borrow().last_path(), Some("M 10 0 Q 100 0 190 0"));
        assert_eq!(line.phase(), TrackingPhase::Resting);
    }

    #[test]
    fn test_move_targets_mapped_sample() {
        let (host, _surface, line) = setup();
        host.dispatch(&InputEvent::pointer(EventKind::Move, 200.0, 60.0, 0));
        assert_eq!(line.target(), Vec2::new(190.0, 30.0));
        assert_eq!(line.phase(), TrackingPhase::Tracking);
        // Handlers never move the current value
        assert_eq!(line.control_point(), Vec2::new(100.0, 0.0));

        host.advance(30);
        assert_eq!(line.control_point(), Vec2::new(190.0, 30.0));
        assert_eq!(line.path(), "M 10 0 Q 190 30 190 0");
    }

    #[test]
    fn test_deflection_is_clamped() {
        let host = WidgetHost::new();
        let surface = Rc::new(RefCell::new(RecordingSurface::new()));
        let line = AnimatedLine::new(
            &host,
            Rect::new(0.0, 0.0, 200.0, 400.0),
            surface,
            LineConfig::default(),
        )
        .unwrap();
        host.dispatch(&InputEvent::pointer(EventKind::Move, 0.0, 0.0, 0));
        assert_eq!(line.target(), Vec2::new(10.0, -50.0));
    }

    #[test]
    fn test_dispose_stops_frames_and_listener() {
        let (host, surface, mut line) = setup();
        host.advance(1);
        line.dispose();
        line.dispose();
        assert!(!line.is_active());
        assert!(!host.is_busy());

        let before = surface.borrow().calls().len();
        host.dispatch(&InputEvent::pointer(EventKind::Move, 0.0, 0.0, 0));
        host.advance(5);
        assert_eq!(surface.borrow().calls().len(), before);
        assert_eq!(line.target(), Vec2::new(100.0, 0.0));
    }

    #[test]
    fn test_drop_detaches() {
        let (host, _surface, line) = setup();
        assert!(host.is_busy());
        drop(line);
        assert!(!host.is_busy());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let host = WidgetHost::new();
        let surface = Rc::new(RefCell::new(RecordingSurface::new()));
        let config = LineConfig {
            return_duration_ms: 0,
            ..LineConfig::default()
        };
        assert!(AnimatedLine::new(&host, Rect::ZERO, surface.clone(), config).is_err());

        let config = LineConfig {
            start_x: 190.0,
            end_x: 10.0,
            ..LineConfig::default()
        };
        assert!(AnimatedLine::new(&host, Rect::ZERO, surface, config).is_err());
        assert!(!host.is_busy());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: LineConfig = serde_json::from_str(r#"{"max_deflection": 20.0}"#).unwrap();
        assert_eq!(config.max_deflection, 20.0);
        assert_eq!(config.end_x, 190.0);
        assert_eq!(config.easing, Easing::elastic());
    }
}
