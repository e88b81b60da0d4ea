//! Refresh and load-more indicator contracts
//!
//! The controller never draws anything. It only tells indicators when to
//! start showing and when to settle; how that looks is up to the host.

use std::fmt;
use std::sync::{Arc, Mutex};

use reel_core::lock;

use crate::controller::RefreshTrigger;

/// Head indicator shown while a refresh is in flight
pub trait RefreshIndicator: Send + Sync {
    /// A refresh was dispatched; show the busy state
    fn begin_showing(&self);

    /// The refresh settled (or was absorbed); return to rest
    fn finish(&self);

    /// Wiring was built for this indicator. Calling `trigger.fire()` asks the
    /// controller for a refresh, e.g. when the user starts a pull.
    fn attach(&self, trigger: RefreshTrigger) {
        let _ = trigger;
    }

    /// Wiring was torn down; any stored trigger is already dead
    fn detach(&self) {}
}

/// Trailing indicator placed after the last row while more data may exist
pub trait TrailingIndicator: Send + Sync {
    /// Reserve space after the content, idle and not shown
    fn prepare(&self);

    /// Track the end of content (called on every position change)
    fn set_origin(&self, origin: f32);

    /// A load-more was dispatched
    fn begin_showing(&self);

    /// The load-more settled
    fn finish(&self);

    /// No more data: give up the reserved space entirely
    fn remove(&self);
}

/// Which refresh indicator wiring a controller maintains
#[derive(Clone, Default)]
pub enum RefreshMode {
    /// No refresh indicator; refreshes only happen through `load`
    #[default]
    None,
    /// The built-in [`PullHandle`](crate::pull::PullHandle)
    Basic,
    /// A host-provided indicator
    Custom(Arc<dyn RefreshIndicator>),
}

impl RefreshMode {
    pub fn custom(indicator: Arc<dyn RefreshIndicator>) -> Self {
        RefreshMode::Custom(indicator)
    }
}

impl PartialEq for RefreshMode {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RefreshMode::None, RefreshMode::None) => true,
            (RefreshMode::Basic, RefreshMode::Basic) => true,
            (RefreshMode::Custom(a), RefreshMode::Custom(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            _ => false,
        }
    }
}

impl fmt::Debug for RefreshMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshMode::None => f.write_str("None"),
            RefreshMode::Basic => f.write_str("Basic"),
            RefreshMode::Custom(indicator) => f
                .debug_tuple("Custom")
                .field(&(Arc::as_ptr(indicator) as *const ()))
                .finish(),
        }
    }
}

/// Observable state of a [`LoadMoreIndicator`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoadMoreState {
    /// Leading edge of the indicator (end of content)
    pub origin: f32,
    /// Space is reserved after the content
    pub reserved: bool,
    /// The busy state is showing
    pub visible: bool,
    /// Number of load-more cycles shown so far
    pub shown: u32,
}

/// Ready-made trailing indicator that only keeps model state
#[derive(Default)]
pub struct LoadMoreIndicator {
    state: Mutex<LoadMoreState>,
}

impl LoadMoreIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoadMoreState {
        *lock(&self.state)
    }

    pub fn is_visible(&self) -> bool {
        lock(&self.state).visible
    }

    pub fn is_reserved(&self) -> bool {
        lock(&self.state).reserved
    }
}

impl TrailingIndicator for LoadMoreIndicator {
    fn prepare(&self) {
        let mut state = lock(&self.state);
        state.reserved = true;
        state.visible = false;
    }

    fn set_origin(&self, origin: f32) {
        lock(&self.state).origin = origin;
    }

    fn begin_showing(&self) {
        let mut state = lock(&self.state);
        state.visible = true;
        state.shown += 1;
    }

    fn finish(&self) {
        lock(&self.state).visible = false;
    }

    fn remove(&self) {
        let mut state = lock(&self.state);
        state.reserved = false;
        state.visible = false;
    }
}
