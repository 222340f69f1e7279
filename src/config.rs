//! Configuration options for the search
//!
//! This module defines the parameters that control the behavior of the
//! engine. A [`SearchParams`] value is never mutated while a search runs; every
//! phase reads it by reference.

use std::time::Duration;

use crate::{MCTSError, Result};

/// The resource limit bounding a search.
///
/// Only one kind of budget is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    /// Stop after this many full selection, expansion, rollout and
    /// backpropagation cycles
    Iterations(u32),

    /// Stop when the remaining wall-clock time (in milliseconds) is too short
    /// to fit another iteration
    TimeMillis(u64),

    /// Stop after this many state-mutating forward model calls
    ///
    /// Expansion and rollout steps count; selection does not.
    ForwardModelCalls(u32),
}

impl Budget {
    /// Returns the time budget as a duration, if this is a time budget
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Budget::TimeMillis(ms) => Some(Duration::from_millis(*ms)),
            _ => None,
        }
    }
}

/// Which flavor of the search loop to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Regular search: only actions with a positive heuristic score are
    /// expanded, and the flexible budget may extend the search
    Full,

    /// Cheap check used for optional sub-decisions: zero-scored actions are
    /// expanded too, and the flexible budget is never applied
    Narrow,
}

/// Configuration for the search
///
/// Use the builder methods to create a customized configuration.
///
/// # Example
///
/// ```
/// use turnwise_mcts::config::{Budget, SearchParams};
///
/// let params = SearchParams::default()
///     .with_exploration_constant(1.0)
///     .with_budget(Budget::TimeMillis(50))
///     .with_rollout_length(0)
///     .with_seed(7);
///
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    /// Exploration constant `K` of the UCB formula
    ///
    /// Higher values favor exploration of less-visited nodes.
    pub exploration_constant: f64,

    /// Nodes at this depth are evaluated instead of expanded further
    pub max_tree_depth: u32,

    /// Small positive constant guarding divisions and scaling the tie-break
    /// noise
    pub epsilon: f64,

    /// Number of actions played out after expansion (0 evaluates the expanded
    /// state directly)
    pub rollout_length: u32,

    /// The resource limit for one search
    pub budget: Budget,

    /// Whether to keep searching until the greedy line from the root
    /// completes the current turn
    pub flexible_budget: bool,

    /// Maximum number of times the flexible budget may top up one search
    pub max_budget_extensions: u32,

    /// Minimum remaining time, in milliseconds, below which a time budget
    /// stops searching
    pub break_ms: u64,

    /// Full or narrow search
    pub mode: SearchMode,

    /// Whether a subtree retained by [`MCTS::advance_root`](crate::MCTS::advance_root)
    /// may seed the next search
    pub reuse_tree: bool,

    /// Seed for the search's random number generator
    ///
    /// Identical seeds, states and parameters produce identical decisions.
    /// `None` seeds from system entropy.
    pub seed: Option<u64>,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            exploration_constant: std::f64::consts::SQRT_2,
            max_tree_depth: 100,
            epsilon: 1e-6,
            rollout_length: 10,
            budget: Budget::Iterations(1000),
            flexible_budget: true,
            max_budget_extensions: 10,
            break_ms: 10,
            mode: SearchMode::Full,
            reuse_tree: true,
            seed: None,
        }
    }
}

impl SearchParams {
    /// Sets the exploration constant
    pub fn with_exploration_constant(mut self, constant: f64) -> Self {
        self.exploration_constant = constant;
        self
    }

    /// Sets the maximum tree depth
    pub fn with_max_tree_depth(mut self, depth: u32) -> Self {
        self.max_tree_depth = depth;
        self
    }

    /// Sets epsilon
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets the rollout length
    pub fn with_rollout_length(mut self, length: u32) -> Self {
        self.rollout_length = length;
        self
    }

    /// Sets the budget
    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = budget;
        self
    }

    /// Enables or disables the flexible budget
    pub fn with_flexible_budget(mut self, flexible: bool) -> Self {
        self.flexible_budget = flexible;
        self
    }

    /// Sets how many times the flexible budget may top up a search
    pub fn with_max_budget_extensions(mut self, extensions: u32) -> Self {
        self.max_budget_extensions = extensions;
        self
    }

    /// Sets the minimum remaining time of a time budget
    pub fn with_break_ms(mut self, break_ms: u64) -> Self {
        self.break_ms = break_ms;
        self
    }

    /// Sets the search mode
    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enables or disables tree reuse between moves
    pub fn with_tree_reuse(mut self, reuse: bool) -> Self {
        self.reuse_tree = reuse;
        self
    }

    /// Sets the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Returns a copy of these parameters configured for a narrow search
    pub fn narrowed(&self) -> Self {
        self.clone().with_mode(SearchMode::Narrow)
    }

    /// True if zero-scored actions may be expanded
    pub fn includes_all_actions(&self) -> bool {
        self.mode == SearchMode::Narrow
    }

    /// True if the flexible budget applies to this search
    pub fn uses_flexible_budget(&self) -> bool {
        self.flexible_budget && self.mode == SearchMode::Full
    }

    /// Checks that the parameters describe a runnable search
    pub fn validate(&self) -> Result<()> {
        if !self.exploration_constant.is_finite() || self.exploration_constant < 0.0 {
            return Err(MCTSError::InvalidConfiguration(format!(
                "exploration constant must be finite and non-negative, got {}",
                self.exploration_constant
            )));
        }
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(MCTSError::InvalidConfiguration(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        if self.max_tree_depth == 0 {
            return Err(MCTSError::InvalidConfiguration(
                "max tree depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
