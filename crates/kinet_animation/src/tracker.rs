//! Pointer tracking state machine
//!
//! `Resting -> Tracking -> Returning -> Resting`. Pointer enter/move starts
//! tracking from any state, leave starts the return to home, and the return
//! completes once the animated value is within `epsilon` of home.

use std::cell::Cell;
use std::rc::Rc;

use kinet_core::StateMachine;

use crate::interpolate::Animatable;

/// Default convergence distance for the return to home
pub const DEFAULT_CONVERGENCE_EPSILON: f32 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackingPhase {
    /// Value sits at its home position
    Resting,
    /// Pointer inside the reference bounds; target follows the pointer
    Tracking,
    /// Pointer left; value is easing back home
    Returning,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackingEvent {
    PointerEnter,
    PointerMove,
    PointerLeave,
    Converged,
}

pub struct PointerTracker {
    machine: StateMachine<TrackingPhase, TrackingEvent>,
    epsilon: f32,
    engagements: Rc<Cell<u32>>,
    returns_completed: Rc<Cell<u32>>,
}

impl PointerTracker {
    pub fn new(epsilon: f32) -> Self {
        use TrackingEvent::*;
        use TrackingPhase::*;

        let engagements = Rc::new(Cell::new(0));
        let returns_completed = Rc::new(Cell::new(0));

        let machine = {
            let engagements = engagements.clone();
            let returns_completed = returns_completed.clone();
            StateMachine::builder(Resting)
                .on_any(&[Resting, Returning], PointerEnter, Tracking)
                .on_any(&[Resting, Returning], PointerMove, Tracking)
                .on(Tracking, PointerLeave, Returning)
                .on(Returning, Converged, Resting)
                .on_exit(Resting, move || engagements.set(engagements.get() + 1))
                .on_enter(Resting, move || {
                    returns_completed.set(returns_completed.get() + 1);
                    tracing::debug!("pointer tracking settled at home");
                })
                .build()
        };

        Self {
            machine,
            engagements,
            returns_completed,
            epsilon: if epsilon.is_finite() && epsilon > 0.0 {
                epsilon
            } else {
                DEFAULT_CONVERGENCE_EPSILON
            },
        }
    }

    pub fn phase(&self) -> TrackingPhase {
        self.machine.current_state()
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Times the pointer pulled the value away from rest
    pub fn engagements(&self) -> u32 {
        self.engagements.get()
    }

    /// Times a return home ran to completion
    pub fn returns_completed(&self) -> u32 {
        self.returns_completed.get()
    }

    pub fn pointer_entered(&mut self) -> TrackingPhase {
        self.send(TrackingEvent::PointerEnter)
    }

    pub fn pointer_moved(&mut self) -> TrackingPhase {
        self.send(TrackingEvent::PointerMove)
    }

    pub fn pointer_left(&mut self) -> TrackingPhase {
        self.send(TrackingEvent::PointerLeave)
    }

    /// Feed the latest animated value; completes the return once it is
    /// within `epsilon` of `home`.
    pub fn observe<T: Animatable>(&mut self, current: T, home: T) -> TrackingPhase {
        if self.phase() == TrackingPhase::Returning && current.distance(home) < self.epsilon {
            self.send(TrackingEvent::Converged)
        } else {
            self.phase()
        }
    }

    /// Recent phase changes, oldest first
    pub fn history(&self) -> impl Iterator<Item = &(TrackingPhase, TrackingEvent, TrackingPhase)> {
        self.machine.history()
    }

    fn send(&mut self, event: TrackingEvent) -> TrackingPhase {
        let before = self.machine.current_state();
        let after = self.machine.send(event);
        if before != after {
            tracing::debug!(?before, ?event, ?after, "pointer tracking phase changed");
        }
        after
    }
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new(DEFAULT_CONVERGENCE_EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinet_core::Vec2;

    #[test]
    fn test_full_cycle() {
        let mut tracker = PointerTracker::default();
        assert_eq!(tracker.phase(), TrackingPhase::Resting);

        assert_eq!(tracker.pointer_entered(), TrackingPhase::Tracking);
        assert_eq!(tracker.pointer_moved(), TrackingPhase::Tracking);
        assert_eq!(tracker.pointer_left(), TrackingPhase::Returning);

        let home = Vec2::new(100.0, 0.0);
        assert_eq!(tracker.observe(Vec2::new(120.0, 3.0), home), TrackingPhase::Returning);
        assert_eq!(tracker.observe(home, home), TrackingPhase::Resting);
    }

    #[test]
    fn test_reenter_while_returning() {
        let mut tracker = PointerTracker::default();
        tracker.pointer_moved();
        tracker.pointer_left();
        assert_eq!(tracker.pointer_moved(), TrackingPhase::Tracking);

        let phases: Vec<_> = tracker.history().map(|(_, _, to)| *to).collect();
        assert_eq!(
            phases,
            vec![
                TrackingPhase::Tracking,
                TrackingPhase::Returning,
                TrackingPhase::Tracking
            ]
        );
    }

    #[test]
    fn test_leave_while_resting_is_ignored() {
        let mut tracker = PointerTracker::default();
        assert_eq!(tracker.pointer_left(), TrackingPhase::Resting);
        // Convergence only matters while returning
        assert_eq!(tracker.observe(0.0f32, 0.0), TrackingPhase::Resting);
        tracker.pointer_entered();
        assert_eq!(tracker.observe(0.0f32, 0.0), TrackingPhase::Tracking);
    }

    #[test]
    fn test_interrupted_return_is_not_counted() {
        let mut tracker = PointerTracker::default();
        tracker.pointer_entered();
        tracker.pointer_left();
        tracker.pointer_entered();
        assert_eq!((tracker.engagements(), tracker.returns_completed()), (1, 0));

        tracker.pointer_left();
        tracker.observe(0.0f32, 0.0);
        assert_eq!((tracker.engagements(), tracker.returns_completed()), (1, 1));

        tracker.pointer_moved();
        assert_eq!(tracker.engagements(), 2);
    }

    #[test]
    fn test_invalid_epsilon_uses_default() {
        assert_eq!(PointerTracker::new(-1.0).epsilon(), DEFAULT_CONVERGENCE_EPSILON);
    }
}
