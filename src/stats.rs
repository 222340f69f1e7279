//! Statistics collection for searches
//!
//! This module provides structures for collecting and reporting statistics
//! about one call to [`MCTS::choose_action`](crate::MCTS::choose_action).

use std::time::Duration;

/// Statistics collected during a search
#[derive(Debug, Clone, Default)]
pub struct SearchStatistics {
    /// Number of completed iterations
    pub iterations: u64,

    /// Number of state-mutating forward model calls
    pub fm_calls: u64,

    /// Total time spent searching
    pub total_time: Duration,

    /// Nodes created during this search
    pub nodes_created: usize,

    /// Nodes in the tree when the search finished
    pub tree_size: usize,

    /// Maximum depth reached in the tree
    pub max_depth: u32,

    /// How many times the flexible budget topped the budget up
    pub budget_extensions: u32,

    /// End-turn actions that still left the same player to move after a retry
    pub turn_warnings: u32,

    /// Node updates made by all backpropagation passes
    pub backprop_updates: u64,

    /// Whether a stop flag ended the search before the budget did
    pub stopped_early: bool,

    /// Whether the root came from a retained subtree
    pub reused_tree: bool,
}

impl SearchStatistics {
    /// Creates a new, empty statistics object
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the average time per iteration in microseconds
    pub fn avg_time_per_iteration_us(&self) -> f64 {
        if self.iterations == 0 {
            return 0.0;
        }
        self.total_time.as_micros() as f64 / self.iterations as f64
    }

    /// Returns the number of iterations per second
    pub fn iterations_per_second(&self) -> f64 {
        if self.total_time.as_secs_f64() <= 0.0 {
            return 0.0;
        }
        self.iterations as f64 / self.total_time.as_secs_f64()
    }

    /// Returns a summary of the statistics as a string
    pub fn summary(&self) -> String {
        format!(
            "MCTS Search Statistics:\n\
             - Iterations: {}\n\
             - Forward model calls: {}\n\
             - Total time: {:.3} seconds\n\
             - Tree size: {} nodes ({} new)\n\
             - Max depth: {}\n\
             - Budget extensions: {}\n\
             - Turn warnings: {}\n\
             - Avg time per iteration: {:.3} µs\n\
             - Iterations per second: {:.1}\n\
             - Stopped early: {}\n\
             - Reused tree: {}",
            self.iterations,
            self.fm_calls,
            self.total_time.as_secs_f64(),
            self.tree_size,
            self.nodes_created,
            self.max_depth,
            self.budget_extensions,
            self.turn_warnings,
            self.avg_time_per_iteration_us(),
            self.iterations_per_second(),
            self.stopped_early,
            self.reused_tree
        )
    }
}
