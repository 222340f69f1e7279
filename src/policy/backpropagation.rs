//! Backpropagation policies
//!
//! Backpropagation policies determine how to update node statistics
//! after a rollout.

use crate::{game_state::GameState, tree::SearchNode};

/// Trait for policies that backpropagate rollout values
pub trait BackpropagationPolicy<S: GameState> {
    /// Updates statistics for a node based on a rollout value
    fn update_stats(&self, node: &mut SearchNode<S>, value: f64);
}

/// Standard backpropagation policy
///
/// Increments the visit count and adds the value to the total, always from
/// the searching player's point of view. The sign flip for opponents lives
/// in selection, not here.
#[derive(Debug, Clone, Default)]
pub struct StandardPolicy;

impl StandardPolicy {
    /// Creates a new standard policy
    pub fn new() -> Self {
        StandardPolicy
    }
}

impl<S: GameState> BackpropagationPolicy<S> for StandardPolicy {
    fn update_stats(&self, node: &mut SearchNode<S>, value: f64) {
        node.record(value);
    }
}
