//! Frame driver
//!
//! [`FrameDriver`] ties a frame callback registration to a value's lifetime.
//! [`Animation`] builds on it: every frame it ticks an [`AnimationState`] and
//! hands the new value to an apply closure that writes the output surface.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::interpolate::Animatable;
use crate::scheduler::{FrameControl, FrameHandle, FrameScheduler, FrameTime};
use crate::smoothing::{AnimationState, AnimationTarget};

/// Owns one frame callback registration; dropping it cancels the callback
pub struct FrameDriver {
    scheduler: FrameScheduler,
    handle: Cell<Option<FrameHandle>>,
}

impl FrameDriver {
    /// Register `callback` on `scheduler` for every frame until cancelled
    pub fn start<F>(scheduler: &FrameScheduler, callback: F) -> Self
    where
        F: FnMut(FrameTime) -> FrameControl + 'static,
    {
        let handle = scheduler.request_frame(callback);
        Self {
            scheduler: scheduler.clone(),
            handle: Cell::new(Some(handle)),
        }
    }

    pub fn handle(&self) -> Option<FrameHandle> {
        self.handle.get()
    }

    /// True while the callback is still registered
    pub fn is_active(&self) -> bool {
        self.handle
            .get()
            .map_or(false, |handle| self.scheduler.is_registered(handle))
    }

    /// Stop future invocations. Returns true only for the call that actually
    /// unregistered the callback.
    pub fn cancel(&self) -> bool {
        match self.handle.take() {
            Some(handle) => self.scheduler.cancel_frame(handle),
            None => false,
        }
    }
}

impl Drop for FrameDriver {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// What the apply closure receives after each tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameSample<T> {
    pub value: T,
    pub velocity: f32,
    /// `value` sits exactly on the target
    pub settled: bool,
    pub time: FrameTime,
}

/// Shared, cancellable access to an animation's target
///
/// Input handlers hold one of these. After the animation is cancelled every
/// write is silently ignored.
pub struct AnimationHandle<T> {
    state: Rc<RefCell<AnimationState<T>>>,
    alive: Rc<Cell<bool>>,
}

impl<T> Clone for AnimationHandle<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            alive: self.alive.clone(),
        }
    }
}

impl<T: Animatable> AnimationHandle<T> {
    pub fn is_alive(&self) -> bool {
        self.alive.get()
    }

    /// Replace the target; ignored once the animation is cancelled
    pub fn set_target(&self, target: AnimationTarget<T>) {
        if !self.alive.get() {
            tracing::trace!("target update after cancel ignored");
            return;
        }
        self.state.borrow_mut().set_target(target);
    }

    /// Re-aim the current target; ignored once the animation is cancelled
    pub fn set_target_value(&self, value: T) {
        if !self.alive.get() {
            tracing::trace!("target update after cancel ignored");
            return;
        }
        self.state.borrow_mut().set_target_value(value);
    }

    pub fn target(&self) -> AnimationTarget<T> {
        *self.state.borrow().target()
    }

    pub fn current(&self) -> T {
        self.state.borrow().current()
    }

    pub fn velocity(&self) -> f32 {
        self.state.borrow().velocity()
    }

    pub fn is_settled(&self) -> bool {
        self.state.borrow().is_settled()
    }
}

/// A continuously driven animation instance
pub struct Animation<T> {
    handle: AnimationHandle<T>,
    driver: FrameDriver,
}

impl<T: Animatable> Animation<T> {
    /// Start driving `state` on `scheduler`, calling `apply` after every tick
    pub fn start<F>(scheduler: &FrameScheduler, state: AnimationState<T>, mut apply: F) -> Self
    where
        F: FnMut(FrameSample<T>) + 'static,
    {
        let handle = AnimationHandle {
            state: Rc::new(RefCell::new(state)),
            alive: Rc::new(Cell::new(true)),
        };

        let tick_handle = handle.clone();
        let driver = FrameDriver::start(scheduler, move |time| {
            if !tick_handle.alive.get() {
                return FrameControl::Stop;
            }
            let sample = {
                let mut state = tick_handle.state.borrow_mut();
                let value = state.tick(time.delta_ms);
                FrameSample {
                    value,
                    velocity: state.velocity(),
                    settled: state.is_settled(),
                    time,
                }
            };
            apply(sample);
            FrameControl::Continue
        });

        Self { handle, driver }
    }

    /// A cloneable handle for input handlers
    pub fn handle(&self) -> AnimationHandle<T> {
        self.handle.clone()
    }

    pub fn set_target(&self, target: AnimationTarget<T>) {
        self.handle.set_target(target);
    }

    pub fn set_target_value(&self, value: T) {
        self.handle.set_target_value(value);
    }

    pub fn current(&self) -> T {
        self.handle.current()
    }

    pub fn velocity(&self) -> f32 {
        self.handle.velocity()
    }

    pub fn is_settled(&self) -> bool {
        self.handle.is_settled()
    }

    pub fn is_active(&self) -> bool {
        self.handle.alive.get() && self.driver.is_active()
    }

    /// Stop ticking and ignore further target updates. Idempotent.
    pub fn cancel(&self) {
        self.handle.alive.set(false);
        self.driver.cancel();
    }
}

impl<T> Drop for Animation<T> {
    fn drop(&mut self) {
        self.handle.alive.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smoothing::{LerpFactor, Smoothing};

    fn recorder<T: Copy + 'static>() -> (Rc<RefCell<Vec<T>>>, impl FnMut(FrameSample<T>)) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = log.clone();
        (log, move |sample: FrameSample<T>| {
            log_clone.borrow_mut().push(sample.value)
        })
    }

    #[test]
    fn test_animation_ticks_and_applies() {
        let scheduler = FrameScheduler::new();
        let (log, apply) = recorder::<f32>();
        let state = AnimationState::resting(0.0f32, Smoothing::Lerp(LerpFactor::PerFrame(0.5)), 0)
            .unwrap();
        let animation = Animation::start(&scheduler, state, apply);

        animation.set_target_value(8.0);
        scheduler.run_frame(0.0);
        scheduler.run_frame(16.0);
        scheduler.run_frame(32.0);

        assert_eq!(*log.borrow(), vec![4.0, 6.0, 7.0]);
        assert_eq!(animation.current(), 7.0);
    }

    #[test]
    fn test_cancel_twice_stops_applies() {
        let scheduler = FrameScheduler::new();
        let (log, apply) = recorder::<f32>();
        let state = AnimationState::resting(0.0f32, Smoothing::Lerp(LerpFactor::PerFrame(0.5)), 0)
            .unwrap();
        let animation = Animation::start(&scheduler, state, apply);

        scheduler.run_frame(0.0);
        animation.cancel();
        animation.cancel();
        assert!(!animation.is_active());

        scheduler.run_frame(16.0);
        scheduler.run_frame(32.0);
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(scheduler.callback_count(), 0);
    }

    #[test]
    fn test_target_update_after_cancel_is_ignored() {
        let scheduler = FrameScheduler::new();
        let state = AnimationState::resting(1.0f32, Smoothing::Lerp(LerpFactor::PerFrame(0.5)), 0)
            .unwrap();
        let animation = Animation::start(&scheduler, state, |_| {});
        let handle = animation.handle();

        animation.cancel();
        handle.set_target_value(100.0);
        assert!(!handle.is_alive());
        assert_eq!(handle.target().value(), 1.0);
    }

    #[test]
    fn test_drop_unregisters() {
        let scheduler = FrameScheduler::new();
        let state = AnimationState::resting(1.0f32, Smoothing::Lerp(LerpFactor::PerFrame(0.5)), 0)
            .unwrap();
        let animation = Animation::start(&scheduler, state, |_| {});
        let handle = animation.handle();
        assert_eq!(scheduler.callback_count(), 1);

        drop(animation);
        assert_eq!(scheduler.callback_count(), 0);
        handle.set_target_value(3.0);
        assert_eq!(handle.target().value(), 1.0);
    }

    #[test]
    fn test_frame_driver_cancel_reports_once() {
        let scheduler = FrameScheduler::new();
        let driver = FrameDriver::start(&scheduler, |_| FrameControl::Continue);
        assert!(driver.is_active());
        assert!(driver.cancel());
        assert!(!driver.cancel());
        assert!(driver.handle().is_none());
    }

    #[test]
    fn test_frame_sample_reports_settled() {
        let scheduler = FrameScheduler::new();
        let settled = Rc::new(Cell::new(false));
        let settled_clone = settled.clone();
        let state = AnimationState::resting(0.0f32, Smoothing::Lerp(LerpFactor::PerFrame(1.0)), 0)
            .unwrap();
        let animation = Animation::start(&scheduler, state, move |sample| {
            settled_clone.set(sample.settled)
        });

        animation.set_target_value(5.0);
        scheduler.run_frame(0.0);
        assert!(settled.get());
        assert_eq!(animation.current(), 5.0);
    }
}
