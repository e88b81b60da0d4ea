//! Scroll position signal
//!
//! A scrollable host emits a [`PositionChange`] every time its offset, content
//! extent or viewport extent changes. Observers register through
//! [`PositionSignal::subscribe`] and are removed with the returned id.

use std::sync::{Arc, Mutex};

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::lock;

new_key_type! {
    /// Handle for a registered position observer
    pub struct SubscriptionId;
}

/// Geometry of a scrollable container at one instant, along the scroll axis
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PositionChange {
    /// Distance scrolled from the leading edge of content
    pub offset: f32,
    /// Total length of the content, excluding any reserved trailing space
    pub content_extent: f32,
    /// Visible length of the container
    pub viewport_extent: f32,
    /// True while the user drags or the view decelerates from a fling;
    /// false for programmatic offset changes
    pub is_user_interacting: bool,
}

impl PositionChange {
    pub fn new(
        offset: f32,
        content_extent: f32,
        viewport_extent: f32,
        is_user_interacting: bool,
    ) -> Self {
        Self {
            offset,
            content_extent,
            viewport_extent,
            is_user_interacting,
        }
    }

    /// Offset at which the trailing edge of the viewport meets the end of content
    ///
    /// Negative when the content is shorter than the viewport, in which case
    /// any offset counts as having reached the end.
    pub fn threshold(&self) -> f32 {
        self.content_extent - self.viewport_extent
    }

    /// Whether the trailing edge is within `prefetch_distance` of the end of content
    pub fn reached_end(&self, prefetch_distance: f32) -> bool {
        self.offset >= self.threshold() - prefetch_distance
    }
}

/// Position observer callback
pub type PositionHandler = Arc<dyn Fn(&PositionChange) + Send + Sync>;

/// Subscriber registry for scroll position changes
///
/// Handlers run outside the registry lock, so a handler may subscribe or
/// unsubscribe (itself included) while a change is being delivered.
#[derive(Default)]
pub struct PositionSignal {
    handlers: Mutex<SlotMap<SubscriptionId, PositionHandler>>,
}

impl PositionSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for every subsequent change
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&PositionChange) + Send + Sync + 'static,
    {
        let id = lock(&self.handlers).insert(Arc::new(handler));
        tracing::trace!("position signal: subscribed {:?}", id);
        id
    }

    /// Remove a handler. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = lock(&self.handlers).remove(id).is_some();
        tracing::trace!("position signal: unsubscribed {:?} (removed={})", id, removed);
        removed
    }

    /// Check whether a handler is still registered
    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        lock(&self.handlers).contains_key(id)
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        lock(&self.handlers).len()
    }

    /// Check if no handlers are registered
    pub fn is_empty(&self) -> bool {
        lock(&self.handlers).is_empty()
    }

    /// Deliver a change to every handler registered at the time of the call
    pub fn emit(&self, change: &PositionChange) {
        let handlers: SmallVec<[PositionHandler; 4]> =
            lock(&self.handlers).values().cloned().collect();

        for handler in handlers {
            handler(change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_threshold_geometry() {
        let at = |offset| PositionChange::new(offset, 1000.0, 300.0, true);

        assert_eq!(at(0.0).threshold(), 700.0);
        assert!(!at(699.0).reached_end(0.0));
        assert!(at(700.0).reached_end(0.0));
        assert!(at(750.0).reached_end(0.0));
        assert!(at(600.0).reached_end(100.0));
    }

    #[test]
    fn test_short_content_counts_as_end() {
        let change = PositionChange::new(0.0, 200.0, 300.0, true);
        assert!(change.threshold() < 0.0);
        assert!(change.reached_end(0.0));
    }

    #[test]
    fn test_subscribe_emit_unsubscribe() {
        let signal = PositionSignal::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = hits.clone();

        let id = signal.subscribe(move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert!(signal.is_subscribed(id));
        assert_eq!(signal.len(), 1);

        signal.emit(&PositionChange::default());
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        assert!(signal.unsubscribe(id));
        assert!(!signal.unsubscribe(id));
        assert!(signal.is_empty());

        signal.emit(&PositionChange::default());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handler_may_unsubscribe_itself() {
        let signal = Arc::new(PositionSignal::new());
        let own_id = Arc::new(Mutex::new(None));
        let hits = Arc::new(AtomicUsize::new(0));

        let weak_signal = Arc::downgrade(&signal);
        let own_id_clone = own_id.clone();
        let hits_clone = hits.clone();
        let id = signal.subscribe(move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
            if let (Some(signal), Some(id)) = (weak_signal.upgrade(), *own_id_clone.lock().unwrap())
            {
                signal.unsubscribe(id);
            }
        });
        *own_id.lock().unwrap() = Some(id);

        signal.emit(&PositionChange::default());
        signal.emit(&PositionChange::default());

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(signal.is_empty());
    }
}
