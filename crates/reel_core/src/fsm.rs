//! State Machine Runtime
//!
//! Flat statecharts over caller-defined state and event types, with a
//! bounded transition history for debugging.

use std::collections::VecDeque;
use std::fmt::Debug;

/// Default number of transitions kept for debugging
pub const DEFAULT_HISTORY_LIMIT: usize = 32;

/// A transition in the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<S, E> {
    pub from_state: S,
    pub event: E,
    pub to_state: S,
}

impl<S, E> Transition<S, E> {
    pub fn new(from: S, event: E, to: S) -> Self {
        Self {
            from_state: from,
            event,
            to_state: to,
        }
    }
}

/// Builder for creating state machines
pub struct StateMachineBuilder<S, E> {
    initial_state: S,
    transitions: Vec<Transition<S, E>>,
    history_limit: usize,
}

impl<S, E> StateMachineBuilder<S, E>
where
    S: Copy + Eq + Debug,
    E: Copy + Eq + Debug,
{
    pub fn new(initial_state: S) -> Self {
        Self {
            initial_state,
            transitions: Vec::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Add a transition (from, event, to)
    pub fn on(mut self, from: S, event: E, to: S) -> Self {
        self.transitions.push(Transition::new(from, event, to));
        self
    }

    /// Cap the number of remembered transitions (0 disables history)
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn build(self) -> StateMachine<S, E> {
        StateMachine {
            current_state: self.initial_state,
            transitions: self.transitions,
            history: VecDeque::new(),
            history_limit: self.history_limit,
        }
    }
}

/// A state machine instance
pub struct StateMachine<S, E> {
    current_state: S,
    transitions: Vec<Transition<S, E>>,
    /// Most recent transitions, oldest first
    history: VecDeque<(S, E, S)>,
    history_limit: usize,
}

impl<S, E> StateMachine<S, E>
where
    S: Copy + Eq + Debug,
    E: Copy + Eq + Debug,
{
    pub fn builder(initial_state: S) -> StateMachineBuilder<S, E> {
        StateMachineBuilder::new(initial_state)
    }

    pub fn current_state(&self) -> S {
        self.current_state
    }

    /// Check if we're in a specific state
    pub fn is_in(&self, state: S) -> bool {
        self.current_state == state
    }

    /// Get transition history, oldest first
    pub fn history(&self) -> &VecDeque<(S, E, S)> {
        &self.history
    }

    /// Send an event, returning the resulting state (unchanged if no transition matched)
    pub fn send(&mut self, event: E) -> S {
        self.try_send(event).unwrap_or(self.current_state)
    }

    /// Send an event, returning the new state only if a transition fired
    pub fn try_send(&mut self, event: E) -> Option<S> {
        let current = self.current_state;

        let Some(to_state) = self
            .transitions
            .iter()
            .find(|t| t.from_state == current && t.event == event)
            .map(|t| t.to_state)
        else {
            tracing::trace!("fsm: {:?} has no transition for {:?}", current, event);
            return None;
        };

        self.current_state = to_state;
        self.record(current, event, to_state);
        Some(to_state)
    }

    fn record(&mut self, from: S, event: E, to: S) {
        if self.history_limit == 0 {
            return;
        }
        if self.history.len() == self.history_limit {
            self.history.pop_front();
        }
        self.history.push_back((from, event, to));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Pull {
        Idle,
        Pulling,
        Armed,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Gesture {
        Drag,
        PastThreshold,
        Release,
    }

    fn pull_machine() -> StateMachine<Pull, Gesture> {
        StateMachine::builder(Pull::Idle)
            .on(Pull::Idle, Gesture::Drag, Pull::Pulling)
            .on(Pull::Pulling, Gesture::PastThreshold, Pull::Armed)
            .on(Pull::Pulling, Gesture::Release, Pull::Idle)
            .on(Pull::Armed, Gesture::Release, Pull::Idle)
            .build()
    }

    #[test]
    fn test_simple_transitions() {
        let mut fsm = pull_machine();
        assert_eq!(fsm.current_state(), Pull::Idle);

        fsm.send(Gesture::Drag);
        assert!(fsm.is_in(Pull::Pulling));

        fsm.send(Gesture::PastThreshold);
        assert_eq!(fsm.current_state(), Pull::Armed);

        fsm.send(Gesture::Release);
        assert_eq!(fsm.current_state(), Pull::Idle);
    }

    #[test]
    fn test_invalid_event_no_transition() {
        let mut fsm = pull_machine();

        assert_eq!(fsm.send(Gesture::Release), Pull::Idle);
        assert_eq!(fsm.try_send(Gesture::PastThreshold), None);
        assert!(fsm.history().is_empty());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut fsm = StateMachine::builder(Pull::Idle)
            .on(Pull::Idle, Gesture::Drag, Pull::Pulling)
            .on(Pull::Pulling, Gesture::Release, Pull::Idle)
            .history_limit(3)
            .build();

        for _ in 0..5 {
            fsm.send(Gesture::Drag);
            fsm.send(Gesture::Release);
        }

        let history = fsm.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0], (Pull::Pulling, Gesture::Release, Pull::Idle));
        assert_eq!(history[1], (Pull::Idle, Gesture::Drag, Pull::Pulling));
        assert_eq!(history[2], (Pull::Pulling, Gesture::Release, Pull::Idle));
    }

    #[test]
    fn test_zero_history_limit() {
        let mut fsm = StateMachine::builder(Pull::Idle)
            .on(Pull::Idle, Gesture::Drag, Pull::Pulling)
            .history_limit(0)
            .build();

        fsm.send(Gesture::Drag);
        assert!(fsm.history().is_empty());
    }
}
