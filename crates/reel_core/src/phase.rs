//! Load phase of a pagination controller

use crate::fsm::StateMachine;

/// What a controller is currently waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadPhase {
    /// Nothing in flight
    #[default]
    Idle,
    /// `refresh_all` dispatched, completion pending
    Refreshing,
    /// `load_more` dispatched, completion pending
    LoadingMore,
}

impl LoadPhase {
    /// Whether a load operation is in flight
    pub fn is_loading(&self) -> bool {
        !matches!(self, LoadPhase::Idle)
    }
}

/// Inputs that move a controller between load phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadEvent {
    /// Pull-to-refresh or a programmatic `load`
    RefreshTriggered,
    /// The trailing edge reached the end of content during user interaction
    ThresholdReached,
    /// The in-flight operation resolved its completion
    Completed,
}

/// Build the load phase machine.
///
/// Triggers are only accepted while idle; the busy phases only leave through
/// `Completed`, so a trigger arriving mid-load finds no transition and is
/// absorbed.
pub fn load_machine(history_limit: usize) -> StateMachine<LoadPhase, LoadEvent> {
    StateMachine::builder(LoadPhase::Idle)
        .history_limit(history_limit)
        .on(LoadPhase::Idle, LoadEvent::RefreshTriggered, LoadPhase::Refreshing)
        .on(LoadPhase::Idle, LoadEvent::ThresholdReached, LoadPhase::LoadingMore)
        .on(LoadPhase::Refreshing, LoadEvent::Completed, LoadPhase::Idle)
        .on(LoadPhase::LoadingMore, LoadEvent::Completed, LoadPhase::Idle)
        .build()
}
