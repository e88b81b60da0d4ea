//! Pagination configuration

use reel_core::fsm::DEFAULT_HISTORY_LIMIT;

/// Configuration for a [`PaginationController`](crate::PaginationController)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaginationConfig {
    /// Space reserved after the content for the trailing indicator while more
    /// data may exist (pixels)
    pub trailing_extent: f32,
    /// How far before the end of content load-more fires (pixels)
    pub prefetch_distance: f32,
    /// Pull distance the basic handle needs before release refreshes (pixels)
    pub pull_threshold: f32,
    /// Number of load phase transitions kept for debugging
    pub history_limit: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            trailing_extent: 44.0,
            // Fire exactly when the trailing edge meets the end of content
            prefetch_distance: 0.0,
            pull_threshold: 60.0,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl PaginationConfig {
    /// Start loading the next page `distance` pixels before the end of content
    pub fn eager(distance: f32) -> Self {
        Self {
            prefetch_distance: distance.max(0.0),
            ..Default::default()
        }
    }

    /// No space reserved for the trailing indicator
    pub fn compact() -> Self {
        Self {
            trailing_extent: 0.0,
            ..Default::default()
        }
    }

    pub fn with_trailing_extent(mut self, extent: f32) -> Self {
        self.trailing_extent = extent.max(0.0);
        self
    }

    pub fn with_prefetch_distance(mut self, distance: f32) -> Self {
        self.prefetch_distance = distance.max(0.0);
        self
    }

    pub fn with_pull_threshold(mut self, threshold: f32) -> Self {
        self.pull_threshold = threshold.max(0.0);
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let eager = PaginationConfig::eager(120.0);
        assert_eq!(eager.prefetch_distance, 120.0);
        assert_eq!(eager.trailing_extent, 44.0);

        assert_eq!(PaginationConfig::compact().trailing_extent, 0.0);
        assert_eq!(PaginationConfig::eager(-5.0).prefetch_distance, 0.0);
    }

    #[test]
    fn test_builder_clamps_negative_values() {
        let config = PaginationConfig::default()
            .with_trailing_extent(-1.0)
            .with_pull_threshold(-10.0)
            .with_history_limit(4);

        assert_eq!(config.trailing_extent, 0.0);
        assert_eq!(config.pull_threshold, 0.0);
        assert_eq!(config.history_limit, 4);
    }
}
