//! Pagination controller
//!
//! Decides when a scrollable view refreshes all of its data or loads the next
//! page, and makes sure at most one of those operations is in flight.
//!
//! The controller holds its view and its delegate weakly. Once either is gone
//! every entry point turns into a no-op, and completions that arrive after the
//! controller itself was dropped are discarded.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use reel_widgets::prelude::*;
//!
//! struct Feed;
//!
//! impl LoadOperations for Feed {
//!     fn refresh_all(&self, completion: LoadCompletion) {
//!         completion.complete(true);
//!     }
//!     fn load_more(&self, completion: LoadCompletion) {
//!         completion.complete(false);
//!     }
//! }
//!
//! let view = Arc::new(ScrollView::new(1000.0, 300.0));
//! let feed = Arc::new(Feed);
//! let controller = PaginationController::new(&view, &feed);
//!
//! controller.load(|| println!("first page ready"));
//! assert!(controller.is_observing_position());
//!
//! view.drag_to(700.0);
//! assert!(!controller.has_more_data());
//! assert!(!controller.is_observing_position());
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use smallvec::SmallVec;

use reel_core::events::{PositionChange, SubscriptionId};
use reel_core::fsm::StateMachine;
use reel_core::phase::{load_machine, LoadEvent, LoadPhase};
use reel_core::{lock, ReelError, Result};

use crate::config::PaginationConfig;
use crate::indicator::{LoadMoreIndicator, RefreshIndicator, RefreshMode, TrailingIndicator};
use crate::pull::PullHandle;
use crate::scroll_view::Scrollable;

// ============================================================================
// Load operations
// ============================================================================

/// Data source driven by a [`PaginationController`]
///
/// Both operations must eventually resolve their completion. A completion that
/// is never resolved leaves the controller loading for good; there is no
/// internal timeout.
pub trait LoadOperations: Send + Sync {
    /// Replace all data. Resolve with whether another page exists.
    fn refresh_all(&self, completion: LoadCompletion);

    /// Append the next page. Resolve with whether another page exists.
    fn load_more(&self, completion: LoadCompletion);
}

/// Single-use completion handed to [`LoadOperations`]
///
/// May be resolved synchronously inside the call that received it, or later
/// from any thread.
#[must_use = "an unresolved completion leaves the controller loading"]
pub struct LoadCompletion {
    phase: LoadPhase,
    callback: Option<Box<dyn FnOnce(bool) + Send>>,
}

impl LoadCompletion {
    fn new<F: FnOnce(bool) + Send + 'static>(phase: LoadPhase, callback: F) -> Self {
        Self {
            phase,
            callback: Some(Box::new(callback)),
        }
    }

    /// Which operation this completion belongs to
    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    /// Settle the operation
    pub fn complete(mut self, has_more_data: bool) {
        if let Some(callback) = self.callback.take() {
            callback(has_more_data);
        }
    }
}

impl Drop for LoadCompletion {
    fn drop(&mut self) {
        if self.callback.is_some() {
            tracing::warn!(
                "{:?} completion dropped without being resolved; the controller stays loading",
                self.phase
            );
        }
    }
}

impl fmt::Debug for LoadCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadCompletion")
            .field("phase", &self.phase)
            .field("resolved", &self.callback.is_none())
            .finish()
    }
}

// ============================================================================
// Refresh trigger
// ============================================================================

/// Handle a refresh indicator uses to ask its controller for a refresh
///
/// Each wiring gets its own generation. Once the wiring is torn down (mode
/// change or controller drop) the trigger stops doing anything.
#[derive(Clone)]
pub struct RefreshTrigger {
    shared: Weak<Shared>,
    generation: u64,
}

impl RefreshTrigger {
    /// Request a refresh. Returns true if `refresh_all` was dispatched.
    pub fn fire(&self) -> bool {
        let Some(shared) = self.shared.upgrade() else {
            tracing::debug!("refresh trigger fired after controller release");
            return false;
        };
        match shared.trigger_refresh(Some(self.generation), None) {
            Ok(()) => true,
            Err(err) => {
                log_dropped("refresh trigger", err);
                false
            }
        }
    }

    /// Whether firing can still reach a controller through live wiring
    pub fn is_live(&self) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| lock(&shared.state).generation == self.generation)
    }
}

impl fmt::Debug for RefreshTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshTrigger")
            .field("generation", &self.generation)
            .finish()
    }
}

// ============================================================================
// Controller
// ============================================================================

type SettleCallback = Box<dyn FnOnce() + Send>;

/// Built indicator wiring for the active [`RefreshMode`]
enum RefreshWiring {
    None,
    Basic(Arc<PullHandle>),
    Custom(Arc<dyn RefreshIndicator>),
}

impl RefreshWiring {
    fn indicator(&self) -> Option<Arc<dyn RefreshIndicator>> {
        match self {
            RefreshWiring::None => None,
            RefreshWiring::Basic(handle) => Some(handle.clone() as Arc<dyn RefreshIndicator>),
            RefreshWiring::Custom(indicator) => Some(indicator.clone()),
        }
    }
}

struct ControllerState {
    machine: StateMachine<LoadPhase, LoadEvent>,
    has_more_data: bool,
    subscription: Option<SubscriptionId>,
    trailing_reserved: bool,
    mode: RefreshMode,
    wiring: RefreshWiring,
    generation: u64,
    /// `load` callbacks waiting for the in-flight operation to settle
    pending: SmallVec<[SettleCallback; 2]>,
}

struct Shared {
    view: Weak<dyn Scrollable>,
    delegate: Weak<dyn LoadOperations>,
    trailing: Arc<dyn TrailingIndicator>,
    config: PaginationConfig,
    state: Mutex<ControllerState>,
}

/// Coordinates pull-to-refresh and infinite scroll for one scrollable view
///
/// Dropping the controller unsubscribes it from the view's position signal and
/// tears down its refresh indicator wiring.
pub struct PaginationController {
    shared: Arc<Shared>,
}

impl PaginationController {
    /// Bind to `view` and `delegate` with the default configuration and a
    /// [`LoadMoreIndicator`] as trailing indicator
    pub fn new<V, D>(view: &Arc<V>, delegate: &Arc<D>) -> Self
    where
        V: Scrollable + 'static,
        D: LoadOperations + 'static,
    {
        Self::with_config(view, delegate, PaginationConfig::default())
    }

    pub fn with_config<V, D>(view: &Arc<V>, delegate: &Arc<D>, config: PaginationConfig) -> Self
    where
        V: Scrollable + 'static,
        D: LoadOperations + 'static,
    {
        Self::with_trailing(view, delegate, Arc::new(LoadMoreIndicator::new()), config)
    }

    /// Bind with a host-provided trailing indicator
    pub fn with_trailing<V, D>(
        view: &Arc<V>,
        delegate: &Arc<D>,
        trailing: Arc<dyn TrailingIndicator>,
        config: PaginationConfig,
    ) -> Self
    where
        V: Scrollable + 'static,
        D: LoadOperations + 'static,
    {
        let view: Weak<dyn Scrollable> = Arc::downgrade(view) as Weak<V>;
        let delegate: Weak<dyn LoadOperations> = Arc::downgrade(delegate) as Weak<D>;

        Self {
            shared: Arc::new(Shared {
                view,
                delegate,
                trailing,
                config,
                state: Mutex::new(ControllerState {
                    machine: load_machine(config.history_limit),
                    has_more_data: true,
                    subscription: None,
                    trailing_reserved: false,
                    mode: RefreshMode::None,
                    wiring: RefreshWiring::None,
                    generation: 0,
                    pending: SmallVec::new(),
                }),
            }),
        }
    }

    /// Select the refresh indicator wiring. Setting the current mode again is a no-op.
    pub fn configure(&self, mode: RefreshMode) {
        if let Err(err) = self.shared.configure(mode) {
            log_dropped("configure", err);
        }
    }

    /// Refresh all data programmatically, calling `completion` once the
    /// in-flight operation settles
    ///
    /// A call while another load is in flight does not start a second one;
    /// its `completion` runs when the current operation settles.
    pub fn load<F: FnOnce() + Send + 'static>(&self, completion: F) {
        if let Err(err) = self.shared.load(Box::new(completion)) {
            log_dropped("load", err);
        }
    }

    /// Start a refresh, or settle the refresh indicator if a load is in flight
    pub fn handle_refresh_trigger(&self) {
        if let Err(err) = self.shared.trigger_refresh(None, None) {
            log_dropped("refresh trigger", err);
        }
    }

    /// React to a position change, as if delivered by the view's signal
    pub fn handle_position_change(&self, change: &PositionChange) {
        self.shared.position_changed(change);
    }

    /// Why a trigger arriving now would be dropped, if it would
    pub fn check_ready(&self) -> Result<()> {
        self.shared.view()?;
        self.shared.delegate()?;
        let phase = self.phase();
        if phase.is_loading() {
            return Err(ReelError::Busy(phase));
        }
        Ok(())
    }

    pub fn phase(&self) -> LoadPhase {
        lock(&self.shared.state).machine.current_state()
    }

    /// Whether a refresh or load-more is in flight
    pub fn is_loading(&self) -> bool {
        self.phase().is_loading()
    }

    pub fn has_more_data(&self) -> bool {
        lock(&self.shared.state).has_more_data
    }

    /// Whether the controller is subscribed to the view's position signal
    pub fn is_observing_position(&self) -> bool {
        lock(&self.shared.state).subscription.is_some()
    }

    pub fn refresh_mode(&self) -> RefreshMode {
        lock(&self.shared.state).mode.clone()
    }

    /// The pull handle built for [`RefreshMode::Basic`]
    pub fn pull_handle(&self) -> Option<Arc<PullHandle>> {
        match &lock(&self.shared.state).wiring {
            RefreshWiring::Basic(handle) => Some(handle.clone()),
            _ => None,
        }
    }

    /// Recent load phase transitions, oldest first
    pub fn transition_history(&self) -> Vec<(LoadPhase, LoadEvent, LoadPhase)> {
        lock(&self.shared.state)
            .machine
            .history()
            .iter()
            .copied()
            .collect()
    }

    pub fn config(&self) -> &PaginationConfig {
        &self.shared.config
    }
}

impl Drop for PaginationController {
    fn drop(&mut self) {
        self.shared.teardown();
    }
}

impl fmt::Debug for PaginationController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.shared.state);
        f.debug_struct("PaginationController")
            .field("phase", &state.machine.current_state())
            .field("has_more_data", &state.has_more_data)
            .field("observing", &state.subscription.is_some())
            .field("mode", &state.mode)
            .finish()
    }
}

impl Shared {
    fn view(&self) -> Result<Arc<dyn Scrollable>> {
        self.view.upgrade().ok_or(ReelError::ViewReleased)
    }

    fn delegate(&self) -> Result<Arc<dyn LoadOperations>> {
        self.delegate.upgrade().ok_or(ReelError::DelegateReleased)
    }

    fn configure(self: &Arc<Self>, mode: RefreshMode) -> Result<()> {
        self.view()?;

        let (old, new, trigger) = {
            let mut state = lock(&self.state);
            if state.mode == mode {
                tracing::trace!("refresh mode already {:?}", mode);
                return Ok(());
            }

            state.generation += 1;
            let trigger = RefreshTrigger {
                shared: Arc::downgrade(self),
                generation: state.generation,
            };
            let wiring = match &mode {
                RefreshMode::None => RefreshWiring::None,
                RefreshMode::Basic => {
                    RefreshWiring::Basic(Arc::new(PullHandle::new(self.config.pull_threshold)))
                }
                RefreshMode::Custom(indicator) => RefreshWiring::Custom(indicator.clone()),
            };
            let new = wiring.indicator();
            let old = std::mem::replace(&mut state.wiring, wiring);
            tracing::debug!("refresh mode {:?} -> {:?}", state.mode, mode);
            state.mode = mode;
            (old, new, trigger)
        };

        if let Some(old) = old.indicator() {
            old.detach();
        }
        if let Some(new) = new {
            new.attach(trigger);
        }
        Ok(())
    }

    fn load(self: &Arc<Self>, completion: SettleCallback) -> Result<()> {
        self.delegate()?;
        match self.trigger_refresh(None, Some(completion)) {
            Ok(()) | Err(ReelError::Busy(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// `generation` is set when the request comes through indicator wiring.
    /// `settle` joins whichever operation is in flight once the gate passes,
    /// under the same lock that reads the phase.
    fn trigger_refresh(
        self: &Arc<Self>,
        generation: Option<u64>,
        settle: Option<SettleCallback>,
    ) -> Result<()> {
        self.view()?;

        let (indicator, delegate) = {
            let mut state = lock(&self.state);
            if generation.is_some_and(|generation| generation != state.generation) {
                return Err(ReelError::StaleTrigger);
            }

            let indicator = state.wiring.indicator();
            let phase = state.machine.current_state();
            if phase.is_loading() {
                state.pending.extend(settle);
                drop(state);
                if let Some(indicator) = indicator {
                    indicator.finish();
                }
                return Err(ReelError::Busy(phase));
            }

            let delegate = self.delegate()?;
            state.machine.try_send(LoadEvent::RefreshTriggered);
            state.pending.extend(settle);
            (indicator, delegate)
        };

        tracing::debug!("refresh_all dispatched");
        if let Some(indicator) = &indicator {
            indicator.begin_showing();
        }

        let weak = Arc::downgrade(self);
        delegate.refresh_all(LoadCompletion::new(LoadPhase::Refreshing, move |has_more| {
            match weak.upgrade() {
                Some(shared) => shared.finish_refresh(has_more),
                None => log_dropped("refresh completion", ReelError::ControllerReleased),
            }
        }));
        Ok(())
    }

    fn finish_refresh(self: &Arc<Self>, has_more_data: bool) {
        let view = match self.view() {
            Ok(view) => view,
            Err(err) => return log_dropped("refresh completion", err),
        };

        if !self.still_in(LoadPhase::Refreshing, "refresh") {
            return;
        }

        // Only this completion leaves Refreshing, so the trailing indicator
        // settles before a load-more on another thread can show it again
        if has_more_data {
            self.trailing.prepare();
            view.set_trailing_inset(self.config.trailing_extent);
        } else {
            self.trailing.remove();
            view.set_trailing_inset(0.0);
        }

        let (indicator, pending) = {
            let mut state = lock(&self.state);
            state.machine.try_send(LoadEvent::Completed);
            state.has_more_data = has_more_data;
            state.trailing_reserved = has_more_data;
            if has_more_data {
                self.observe(&mut state, view.as_ref());
            } else {
                Self::stop_observing(&mut state, view.as_ref());
            }
            (state.wiring.indicator(), std::mem::take(&mut state.pending))
        };

        tracing::debug!("refresh_all settled (has_more_data={})", has_more_data);
        if let Some(indicator) = indicator {
            indicator.finish();
        }
        for callback in pending {
            callback();
        }
    }

    fn position_changed(self: &Arc<Self>, change: &PositionChange) {
        if let Err(err) = self.view() {
            return log_dropped("position change", err);
        }

        self.trailing.set_origin(change.content_extent);

        if !change.is_user_interacting {
            return;
        }

        let delegate = match self.begin_load_more(change) {
            Ok(Some(delegate)) => delegate,
            Ok(None) => return,
            Err(err) => return log_dropped("position change", err),
        };

        tracing::debug!(
            "load_more dispatched at offset {:.1} (threshold {:.1})",
            change.offset,
            change.threshold()
        );
        self.trailing.begin_showing();

        let weak = Arc::downgrade(self);
        delegate.load_more(LoadCompletion::new(LoadPhase::LoadingMore, move |has_more| {
            match weak.upgrade() {
                Some(shared) => shared.finish_load_more(has_more),
                None => log_dropped("load-more completion", ReelError::ControllerReleased),
            }
        }));
    }

    /// Gate and enter `LoadingMore`. `Ok(None)` means the end is not reached yet.
    fn begin_load_more(&self, change: &PositionChange) -> Result<Option<Arc<dyn LoadOperations>>> {
        let mut state = lock(&self.state);
        // A change can still be in delivery after an unsubscribe
        if state.subscription.is_none() {
            return Err(ReelError::NotObserving);
        }
        let phase = state.machine.current_state();
        if phase.is_loading() {
            return Err(ReelError::Busy(phase));
        }
        if !state.has_more_data {
            return Err(ReelError::NoMoreData);
        }

        tracing::trace!(
            "offset {:.1} vs threshold {:.1} (prefetch {:.1})",
            change.offset,
            change.threshold(),
            self.config.prefetch_distance
        );
        if !change.reached_end(self.config.prefetch_distance) {
            return Ok(None);
        }

        let delegate = self.delegate()?;
        state.machine.try_send(LoadEvent::ThresholdReached);
        Ok(Some(delegate))
    }

    fn finish_load_more(self: &Arc<Self>, has_more_data: bool) {
        let view = match self.view() {
            Ok(view) => view,
            Err(err) => return log_dropped("load-more completion", err),
        };

        if !self.still_in(LoadPhase::LoadingMore, "load-more") {
            return;
        }

        self.trailing.finish();
        if !has_more_data {
            self.trailing.remove();
            view.set_trailing_inset(0.0);
        }

        let pending = {
            let mut state = lock(&self.state);
            state.machine.try_send(LoadEvent::Completed);
            state.has_more_data = has_more_data;
            if !has_more_data {
                state.trailing_reserved = false;
                Self::stop_observing(&mut state, view.as_ref());
            }
            std::mem::take(&mut state.pending)
        };

        tracing::debug!("load_more settled (has_more_data={})", has_more_data);
        for callback in pending {
            callback();
        }
    }

    /// Whether a completion for `phase` is the one the controller waits on
    fn still_in(&self, phase: LoadPhase, operation: &str) -> bool {
        let current = lock(&self.state).machine.current_state();
        if current != phase {
            tracing::warn!("{} completion arrived in {:?}; ignoring", operation, current);
        }
        current == phase
    }

    /// Subscribe to the view's position signal unless already subscribed
    fn observe(self: &Arc<Self>, state: &mut ControllerState, view: &dyn Scrollable) {
        if state.subscription.is_some() {
            return;
        }
        let weak = Arc::downgrade(self);
        let id = view.position_signal().subscribe(move |change| {
            if let Some(shared) = weak.upgrade() {
                shared.position_changed(change);
            }
        });
        tracing::debug!("observing position ({:?})", id);
        state.subscription = Some(id);
    }

    fn stop_observing(state: &mut ControllerState, view: &dyn Scrollable) {
        if let Some(id) = state.subscription.take() {
            view.position_signal().unsubscribe(id);
            tracing::debug!("stopped observing position ({:?})", id);
        }
    }

    fn teardown(&self) {
        let (wiring, subscription, trailing_reserved) = {
            let mut state = lock(&self.state);
            state.generation += 1;
            state.pending.clear();
            state.mode = RefreshMode::None;
            (
                std::mem::replace(&mut state.wiring, RefreshWiring::None),
                state.subscription.take(),
                std::mem::replace(&mut state.trailing_reserved, false),
            )
        };

        if let Ok(view) = self.view() {
            if let Some(id) = subscription {
                view.position_signal().unsubscribe(id);
            }
            if trailing_reserved {
                view.set_trailing_inset(0.0);
            }
        }
        if let Some(indicator) = wiring.indicator() {
            indicator.detach();
        }
        tracing::debug!("pagination controller torn down");
    }
}

/// Log a dropped trigger; scroll-rate reasons stay at trace level
fn log_dropped(operation: &str, err: ReelError) {
    match err {
        ReelError::Busy(_) | ReelError::NoMoreData | ReelError::NotObserving => {
            tracing::trace!("{} ignored: {}", operation, err)
        }
        _ => tracing::debug!("{} ignored: {}", operation, err),
    }
}
