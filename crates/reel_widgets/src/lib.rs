//! Reel Widgets
//!
//! Pull-to-refresh and infinite scroll for any scrollable host:
//!
//! - [`PaginationController`]: decides when to refresh or load the next page
//! - [`PullHandle`]: the basic pull-to-refresh indicator
//! - [`LoadMoreIndicator`]: a model-only trailing indicator
//! - [`ScrollView`]: an in-memory scrollable host
//!
//! The host supplies a [`LoadOperations`] implementation and feeds its scroll
//! position through the view's [`PositionSignal`](reel_core::PositionSignal).

pub mod config;
pub mod controller;
pub mod indicator;
pub mod pull;
pub mod scroll_view;

pub use config::PaginationConfig;
pub use controller::{LoadCompletion, LoadOperations, PaginationController, RefreshTrigger};
pub use indicator::{
    LoadMoreIndicator, LoadMoreState, RefreshIndicator, RefreshMode, TrailingIndicator,
};
pub use pull::{PullHandle, PullPhase};
pub use scroll_view::{ScrollGeometry, ScrollView, Scrollable};

pub use reel_core::{LoadEvent, LoadPhase, PositionChange, ReelError};

/// Common imports for integrating a pagination controller
pub mod prelude {
    pub use crate::config::PaginationConfig;
    pub use crate::controller::{LoadCompletion, LoadOperations, PaginationController};
    pub use crate::indicator::{RefreshIndicator, RefreshMode, TrailingIndicator};
    pub use crate::scroll_view::{ScrollView, Scrollable};
    pub use reel_core::{LoadPhase, PositionChange};
}
