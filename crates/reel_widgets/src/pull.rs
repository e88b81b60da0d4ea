//! Basic pull-to-refresh handle
//!
//! The handle the controller wires up for [`RefreshMode::Basic`](crate::RefreshMode::Basic).
//! Hosts feed it the overscroll distance at the leading edge while the user
//! drags; releasing past the threshold fires a refresh.

use std::sync::Mutex;

use reel_core::lock;

use crate::controller::RefreshTrigger;
use crate::indicator::RefreshIndicator;

/// Pull handle interaction state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PullPhase {
    /// At rest
    #[default]
    Idle,
    /// Pulled, but not far enough to refresh on release
    Pulling,
    /// Pulled past the threshold; releasing refreshes
    Armed,
    /// A refresh is in flight
    Refreshing,
}

struct PullState {
    phase: PullPhase,
    distance: f32,
    trigger: Option<RefreshTrigger>,
}

/// Standard pull handle
pub struct PullHandle {
    threshold: f32,
    state: Mutex<PullState>,
}

impl PullHandle {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            state: Mutex::new(PullState {
                phase: PullPhase::Idle,
                distance: 0.0,
                trigger: None,
            }),
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn phase(&self) -> PullPhase {
        lock(&self.state).phase
    }

    /// Current pull distance
    pub fn distance(&self) -> f32 {
        lock(&self.state).distance
    }

    /// Whether the handle is wired to a controller
    pub fn is_attached(&self) -> bool {
        lock(&self.state).trigger.is_some()
    }

    /// Report the current overscroll at the leading edge
    ///
    /// Ignored while refreshing; the indicator stays put until `finish`.
    pub fn pull(&self, distance: f32) {
        let mut state = lock(&self.state);
        if state.phase == PullPhase::Refreshing {
            return;
        }

        state.distance = distance.max(0.0);
        state.phase = if state.distance <= 0.0 {
            PullPhase::Idle
        } else if state.distance >= self.threshold {
            PullPhase::Armed
        } else {
            PullPhase::Pulling
        };
    }

    /// The user let go. Returns true if a refresh was dispatched.
    pub fn release(&self) -> bool {
        let trigger = {
            let mut state = lock(&self.state);
            match state.phase {
                PullPhase::Armed => state.trigger.clone(),
                PullPhase::Pulling => {
                    state.phase = PullPhase::Idle;
                    state.distance = 0.0;
                    None
                }
                PullPhase::Idle | PullPhase::Refreshing => None,
            }
        };

        // The controller calls back into begin_showing/finish
        match trigger {
            Some(trigger) => trigger.fire(),
            None => false,
        }
    }
}

impl RefreshIndicator for PullHandle {
    fn begin_showing(&self) {
        let mut state = lock(&self.state);
        state.phase = PullPhase::Refreshing;
        state.distance = state.distance.max(self.threshold);
    }

    fn finish(&self) {
        let mut state = lock(&self.state);
        state.phase = PullPhase::Idle;
        state.distance = 0.0;
    }

    fn attach(&self, trigger: RefreshTrigger) {
        lock(&self.state).trigger = Some(trigger);
    }

    fn detach(&self) {
        let mut state = lock(&self.state);
        state.trigger = None;
        state.phase = PullPhase::Idle;
        state.distance = 0.0;
    }
}
