//! Reel error types
//!
//! None of these reach the integrator through the trigger entry points: a
//! controller turns every `Err` into a logged no-op. They are public so hosts
//! can ask why a trigger would be dropped.

use thiserror::Error;

use crate::phase::LoadPhase;

/// Reasons a pagination trigger is not acted upon
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReelError {
    /// The bound scrollable view has been released
    #[error("scrollable view has been released")]
    ViewReleased,

    /// The load operations delegate has been released
    #[error("load operations delegate has been released")]
    DelegateReleased,

    /// The controller was dropped before a callback arrived
    #[error("controller has been released")]
    ControllerReleased,

    /// A load operation is already in flight
    #[error("a load is already in flight ({0:?})")]
    Busy(LoadPhase),

    /// The last completion reported that no more data remains
    #[error("no more data to load")]
    NoMoreData,

    /// The controller is not subscribed to position changes
    #[error("not observing position changes")]
    NotObserving,

    /// A refresh trigger from wiring that has since been torn down
    #[error("refresh trigger belongs to detached wiring")]
    StaleTrigger,
}

/// Result type for Reel operations
pub type Result<T> = std::result::Result<T, ReelError>;
