//! Scrollable host
//!
//! [`Scrollable`] is what a [`PaginationController`](crate::PaginationController)
//! binds to: a position signal plus the ability to reserve space after the
//! content for the trailing indicator. [`ScrollView`] is an in-memory host that
//! tracks one scroll axis and emits a [`PositionChange`] whenever it moves.
//!
//! # Example
//!
//! ```rust
//! use reel_widgets::scroll_view::ScrollView;
//!
//! let view = ScrollView::new(1000.0, 300.0);
//! view.drag_to(250.0);
//! view.end_drag();
//! assert_eq!(view.geometry().offset, 250.0);
//! ```

use std::sync::Mutex;

use reel_core::events::{PositionChange, PositionSignal};
use reel_core::lock;

/// A scroll container a pagination controller can observe
pub trait Scrollable: Send + Sync {
    /// Signal emitting every offset/extent change
    fn position_signal(&self) -> &PositionSignal;

    /// Reserve `inset` pixels after the content (0 collapses the space).
    ///
    /// Must not emit on the position signal synchronously.
    fn set_trailing_inset(&self, inset: f32);
}

/// Geometry snapshot of a [`ScrollView`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollGeometry {
    pub offset: f32,
    pub content_extent: f32,
    pub viewport_extent: f32,
    /// Space reserved after the content
    pub trailing_inset: f32,
    /// Whether a drag or fling is in progress
    pub interacting: bool,
}

impl ScrollGeometry {
    /// Largest reachable offset, including reserved trailing space
    pub fn max_offset(&self) -> f32 {
        (self.content_extent + self.trailing_inset - self.viewport_extent).max(0.0)
    }

    fn change(&self) -> PositionChange {
        PositionChange::new(
            self.offset,
            self.content_extent,
            self.viewport_extent,
            self.interacting,
        )
    }
}

/// Single-axis scroll container model
pub struct ScrollView {
    geometry: Mutex<ScrollGeometry>,
    signal: PositionSignal,
}

impl ScrollView {
    pub fn new(content_extent: f32, viewport_extent: f32) -> Self {
        Self {
            geometry: Mutex::new(ScrollGeometry {
                content_extent: content_extent.max(0.0),
                viewport_extent: viewport_extent.max(0.0),
                ..Default::default()
            }),
            signal: PositionSignal::new(),
        }
    }

    /// Current geometry
    pub fn geometry(&self) -> ScrollGeometry {
        *lock(&self.geometry)
    }

    /// Mark the start of a user drag (no position change is emitted)
    pub fn begin_drag(&self) {
        lock(&self.geometry).interacting = true;
    }

    /// Move to `offset` as part of a user drag or fling
    pub fn drag_to(&self, offset: f32) {
        self.update(|geometry| {
            geometry.interacting = true;
            geometry.offset = offset.clamp(0.0, geometry.max_offset());
        });
    }

    /// Mark the end of a user drag or fling (no position change is emitted)
    pub fn end_drag(&self) {
        lock(&self.geometry).interacting = false;
    }

    /// Move to `offset` programmatically
    pub fn scroll_to(&self, offset: f32) {
        self.update(|geometry| {
            geometry.interacting = false;
            geometry.offset = offset.clamp(0.0, geometry.max_offset());
        });
    }

    /// Change the content length, e.g. after a page of rows was appended
    pub fn set_content_extent(&self, extent: f32) {
        self.update(|geometry| {
            geometry.content_extent = extent.max(0.0);
            geometry.offset = geometry.offset.min(geometry.max_offset());
        });
    }

    /// Change the visible length, e.g. after a resize
    pub fn set_viewport_extent(&self, extent: f32) {
        self.update(|geometry| {
            geometry.viewport_extent = extent.max(0.0);
            geometry.offset = geometry.offset.min(geometry.max_offset());
        });
    }

    fn update(&self, apply: impl FnOnce(&mut ScrollGeometry)) {
        let change = {
            let mut geometry = lock(&self.geometry);
            apply(&mut geometry);
            geometry.change()
        };
        tracing::trace!(
            "scroll view: offset={:.1} content={:.1} viewport={:.1} interacting={}",
            change.offset,
            change.content_extent,
            change.viewport_extent,
            change.is_user_interacting
        );
        self.signal.emit(&change);
    }
}

impl Scrollable for ScrollView {
    fn position_signal(&self) -> &PositionSignal {
        &self.signal
    }

    fn set_trailing_inset(&self, inset: f32) {
        let mut geometry = lock(&self.geometry);
        geometry.trailing_inset = inset.max(0.0);
        geometry.offset = geometry.offset.min(geometry.max_offset());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn record(view: &ScrollView) -> Arc<Mutex<Vec<PositionChange>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        view.position_signal()
            .subscribe(move |change| seen_clone.lock().unwrap().push(*change));
        seen
    }

    #[test]
    fn test_drag_reports_interaction() {
        let view = ScrollView::new(1000.0, 300.0);
        let seen = record(&view);

        view.drag_to(200.0);
        view.end_drag();
        view.scroll_to(100.0);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].is_user_interacting);
        assert_eq!(seen[0].offset, 200.0);
        assert!(!seen[1].is_user_interacting);
        assert_eq!(seen[1].offset, 100.0);
    }

    #[test]
    fn test_offset_clamped_to_content() {
        let view = ScrollView::new(1000.0, 300.0);
        view.drag_to(5000.0);
        assert_eq!(view.geometry().offset, 700.0);

        view.drag_to(-20.0);
        assert_eq!(view.geometry().offset, 0.0);
    }

    #[test]
    fn test_trailing_inset_extends_reach() {
        let view = ScrollView::new(1000.0, 300.0);
        let seen = record(&view);

        view.set_trailing_inset(44.0);
        assert!(seen.lock().unwrap().is_empty());

        view.drag_to(5000.0);
        assert_eq!(view.geometry().offset, 744.0);

        view.set_trailing_inset(0.0);
        assert_eq!(view.geometry().offset, 700.0);
    }

    #[test]
    fn test_content_growth_emits_change() {
        let view = ScrollView::new(1000.0, 300.0);
        let seen = record(&view);

        view.set_content_extent(1600.0);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].threshold(), 1300.0);
    }
}
