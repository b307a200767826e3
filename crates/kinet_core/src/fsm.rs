//! State Machine Runtime
//!
//! Flat state machines for widget interaction states, generic over the state
//! and event types. Supports:
//! - Entry/exit actions
//! - Multi-source transitions
//! - A bounded transition history for debugging

use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::hash::Hash;

/// Marker for types usable as state or event identifiers
pub trait FsmKey: Copy + Eq + Hash + Debug + 'static {}

impl<T: Copy + Eq + Hash + Debug + 'static> FsmKey for T {}

/// An action run when a state is entered or exited
pub type Action = Box<dyn FnMut()>;

/// Default number of transitions kept in the history ring
pub const DEFAULT_HISTORY_LIMIT: usize = 32;

/// A transition in the state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition<S, E> {
    pub from_state: S,
    pub event: E,
    pub to_state: S,
}

impl<S: FsmKey, E: FsmKey> Transition<S, E> {
    pub fn new(from: S, event: E, to: S) -> Self {
        Self {
            from_state: from,
            event,
            to_state: to,
        }
    }

    fn matches(&self, state: S, event: E) -> bool {
        self.from_state == state && self.event == event
    }
}

/// Builder for creating state machines
pub struct StateMachineBuilder<S, E> {
    initial_state: S,
    transitions: Vec<Transition<S, E>>,
    entry_callbacks: FxHashMap<S, Vec<Action>>,
    exit_callbacks: FxHashMap<S, Vec<Action>>,
    history_limit: usize,
}

impl<S: FsmKey, E: FsmKey> StateMachineBuilder<S, E> {
    pub fn new(initial_state: S) -> Self {
        Self {
            initial_state,
            transitions: Vec::new(),
            entry_callbacks: FxHashMap::default(),
            exit_callbacks: FxHashMap::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Add a simple transition (from, event, to)
    pub fn on(mut self, from: S, event: E, to: S) -> Self {
        self.transitions.push(Transition::new(from, event, to));
        self
    }

    /// Add the same event transition from several source states
    pub fn on_any(mut self, from: &[S], event: E, to: S) -> Self {
        for state in from {
            self.transitions.push(Transition::new(*state, event, to));
        }
        self
    }

    /// Add an entry action for a state
    pub fn on_enter<F: FnMut() + 'static>(mut self, state: S, action: F) -> Self {
        self.entry_callbacks
            .entry(state)
            .or_default()
            .push(Box::new(action));
        self
    }

    /// Add an exit action for a state
    pub fn on_exit<F: FnMut() + 'static>(mut self, state: S, action: F) -> Self {
        self.exit_callbacks
            .entry(state)
            .or_default()
            .push(Box::new(action));
        self
    }

    /// Cap the number of remembered transitions
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Build the state machine
    pub fn build(self) -> StateMachine<S, E> {
        StateMachine {
            current_state: self.initial_state,
            transitions: self.transitions,
            entry_callbacks: self.entry_callbacks,
            exit_callbacks: self.exit_callbacks,
            history: VecDeque::new(),
            history_limit: self.history_limit,
        }
    }
}

/// A state machine instance
pub struct StateMachine<S, E> {
    current_state: S,
    transitions: Vec<Transition<S, E>>,
    entry_callbacks: FxHashMap<S, Vec<Action>>,
    exit_callbacks: FxHashMap<S, Vec<Action>>,
    history: VecDeque<(S, E, S)>,
    history_limit: usize,
}

impl<S: FsmKey, E: FsmKey> StateMachine<S, E> {
    /// Create a builder for a state machine
    pub fn builder(initial_state: S) -> StateMachineBuilder<S, E> {
        StateMachineBuilder::new(initial_state)
    }

    /// Get the current state
    pub fn current_state(&self) -> S {
        self.current_state
    }

    /// Most recent transitions, oldest first
    pub fn history(&self) -> impl Iterator<Item = &(S, E, S)> {
        self.history.iter()
    }

    /// Send an event to the state machine, potentially triggering a transition.
    ///
    /// Returns the state after the event. Unmatched events leave the machine
    /// unchanged and run no callbacks.
    pub fn send(&mut self, event: E) -> S {
        let current = self.current_state;

        let Some(to_state) = self
            .transitions
            .iter()
            .find(|t| t.matches(current, event))
            .map(|t| t.to_state)
        else {
            return current;
        };

        if let Some(callbacks) = self.exit_callbacks.get_mut(&current) {
            for callback in callbacks.iter_mut() {
                callback();
            }
        }

        self.current_state = to_state;
        tracing::trace!(from = ?current, event = ?event, to = ?to_state, "fsm transition");

        if self.history_limit > 0 {
            if self.history.len() == self.history_limit {
                self.history.pop_front();
            }
            self.history.push_back((current, event, to_state));
        }

        if let Some(callbacks) = self.entry_callbacks.get_mut(&to_state) {
            for callback in callbacks.iter_mut() {
                callback();
            }
        }

        to_state
    }
}
