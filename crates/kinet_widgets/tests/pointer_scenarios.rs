//! End-to-end pointer scenarios against a recording surface

use std::cell::RefCell;
use std::rc::Rc;

use kinet_animation::TrackingPhase;
use kinet_core::{EventKind, InputEvent, Rect, Vec2};
use kinet_widgets::{
    AnimatedLine, LineConfig, Marquee, MarqueeConfig, RecordingSurface, SharedBounds,
    WidgetHost,
};

fn line_on(
    host: &WidgetHost,
    bounds: SharedBounds,
) -> (Rc<RefCell<RecordingSurface>>, AnimatedLine) {
    let surface = Rc::new(RefCell::new(RecordingSurface::new()));
    let line = AnimatedLine::new(host, bounds, surface.clone(), LineConfig::default()).unwrap();
    (surface, line)
}

#[test]
fn enter_leave_returns_home_exactly() {
    let host = WidgetHost::new();
    let (surface, line) = line_on(&host, SharedBounds::new(Rect::new(0.0, 0.0, 200.0, 60.0)));
    host.advance(1);
    assert_eq!(line.phase(), TrackingPhase::Resting);

    // Horizontal midpoint, vertical centre: already mid-range
    host.dispatch(&InputEvent::pointer(EventKind::Enter, 100.0, 30.0, 16));
    assert_eq!(line.target(), Vec2::new(100.0, 0.0));
    assert_eq!(line.phase(), TrackingPhase::Tracking);

    host.dispatch(&InputEvent::pointer(EventKind::Move, 160.0, 10.0, 32));
    host.advance(10);
    assert_eq!(line.phase(), TrackingPhase::Tracking);
    assert_ne!(line.control_point(), Vec2::new(100.0, 0.0));

    host.dispatch(&InputEvent::pointer(EventKind::Leave, 260.0, 10.0, 200));
    assert_eq!(line.phase(), TrackingPhase::Returning);

    // 1000 ms return at 60 fps, plus a frame for convergence detection
    host.advance(62);
    assert_eq!(line.control_point(), Vec2::new(100.0, 0.0));
    assert_eq!(line.path(), "M 10 0 Q 100 0 190 0");
    assert_eq!(surface.borrow().last_path(), Some("M 10 0 Q 100 0 190 0"));
    assert_eq!(line.phase(), TrackingPhase::Resting);
    assert_eq!(line.returns_completed(), 1);
}

#[test]
fn enter_at_top_edge_still_returns_home() {
    let host = WidgetHost::new();
    let (_surface, line) = line_on(&host, SharedBounds::new(Rect::new(0.0, 0.0, 200.0, 60.0)));

    host.dispatch(&InputEvent::pointer(EventKind::Enter, 100.0, 0.0, 0));
    assert_eq!(line.target().x, 100.0);
    assert_eq!(line.target().y, -30.0);
    assert_eq!(line.phase(), TrackingPhase::Tracking);

    host.dispatch(&InputEvent::pointer(EventKind::Leave, 100.0, -1.0, 16));
    assert_eq!(line.phase(), TrackingPhase::Returning);
    host.advance(62);
    assert_eq!(line.control_point(), Vec2::new(100.0, 0.0));
    assert_eq!(line.path(), "M 10 0 Q 100 0 190 0");
    assert_eq!(line.phase(), TrackingPhase::Resting);
}

#[test]
fn reenter_before_convergence_resumes_tracking() {
    let host = WidgetHost::new();
    let (_surface, line) = line_on(&host, SharedBounds::new(Rect::new(0.0, 0.0, 200.0, 60.0)));

    host.dispatch(&InputEvent::pointer(EventKind::Enter, 20.0, 0.0, 0));
    host.advance(30);
    host.dispatch(&InputEvent::pointer(EventKind::Leave, -5.0, 0.0, 500));
    host.advance(10);
    assert_eq!(line.phase(), TrackingPhase::Returning);

    host.dispatch(&InputEvent::pointer(EventKind::Enter, 180.0, 60.0, 700));
    assert_eq!(line.phase(), TrackingPhase::Tracking);
    host.advance(60);
    assert_eq!(line.phase(), TrackingPhase::Tracking);
    let target = line.target();
    assert!((target.x - 172.0).abs() < 1e-3);
    assert_eq!(target.y, 30.0);
    assert_eq!(line.control_point(), target);
    assert_eq!(line.returns_completed(), 0);
}

#[test]
fn bounds_are_queried_per_event() {
    let host = WidgetHost::new();
    let bounds = SharedBounds::new(Rect::new(0.0, 0.0, 200.0, 60.0));
    let (_surface, line) = line_on(&host, bounds.clone());

    // The element moved; the same absolute point now maps elsewhere
    bounds.set(Rect::new(100.0, 0.0, 200.0, 60.0));
    host.dispatch(&InputEvent::pointer(EventKind::Move, 100.0, 30.0, 0));
    assert_eq!(line.target(), Vec2::new(10.0, 0.0));

    // Zero-size bounds fall back to the middle of the ranges
    bounds.set(Rect::ZERO);
    host.dispatch(&InputEvent::pointer(EventKind::Move, 40.0, 40.0, 1));
    assert_eq!(line.target(), Vec2::new(100.0, 0.0));
}

#[test]
fn instances_do_not_interfere() {
    let host = WidgetHost::new();
    let other_host = WidgetHost::with_scheduler(host.scheduler().clone());
    let (_a_surface, a) = line_on(&host, SharedBounds::new(Rect::new(0.0, 0.0, 200.0, 60.0)));
    let (_b_surface, b) =
        line_on(&other_host, SharedBounds::new(Rect::new(0.0, 0.0, 200.0, 60.0)));

    host.dispatch(&InputEvent::pointer(EventKind::Move, 200.0, 60.0, 0));
    host.advance(30);
    assert_eq!(a.control_point(), Vec2::new(190.0, 30.0));
    assert_eq!(b.control_point(), Vec2::new(100.0, 0.0));
    assert_eq!(b.phase(), TrackingPhase::Resting);
}

#[test]
fn teardown_leaves_nothing_registered() {
    let host = WidgetHost::new();
    let surface = Rc::new(RefCell::new(RecordingSurface::new()));
    {
        let _line = line_on(&host, SharedBounds::new(Rect::new(0.0, 0.0, 200.0, 60.0)));
        let _marquee =
            Marquee::new(&host, 200.0, 400.0, surface.clone(), MarqueeConfig::default()).unwrap();
        assert!(host.is_busy());
    }
    assert!(!host.is_busy());
    host.advance(5);
    assert!(surface.borrow().calls().is_empty());
}
