//! Reel Core
//!
//! Platform-agnostic primitives shared by the Reel pagination widgets:
//!
//! - **State Machines**: flat statecharts driving the load phase of a controller
//! - **Position Signal**: subscribe/unsubscribe registry for scroll position changes
//! - **Errors**: reasons a trigger gets dropped
//!
//! # Example
//!
//! ```rust
//! use reel_core::events::{PositionChange, PositionSignal};
//!
//! let signal = PositionSignal::new();
//! let id = signal.subscribe(|change| {
//!     println!("offset {} of {}", change.offset, change.threshold());
//! });
//!
//! signal.emit(&PositionChange::new(120.0, 1000.0, 300.0, true));
//! assert!(signal.unsubscribe(id));
//! ```

pub mod error;
pub mod events;
pub mod fsm;
pub mod phase;

pub use error::{ReelError, Result};
pub use events::{PositionChange, PositionSignal, SubscriptionId};
pub use fsm::{StateMachine, StateMachineBuilder, Transition};
pub use phase::{LoadEvent, LoadPhase};

use std::sync::{Mutex, MutexGuard};

/// Lock a mutex, recovering the data if a previous holder panicked.
pub fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
