//! Expansion policies determine which unexpanded action to choose
//! when expanding a node.

use crate::{game_state::GameState, tree::SearchNode};

/// Trait for policies that select which action to expand
pub trait ExpansionPolicy<S: GameState> {
    /// Returns the slot index of the action to expand next, or `None` if the
    /// node has no eligible unexpanded action.
    fn select_action_to_expand(&self, node: &SearchNode<S>, include_all: bool) -> Option<usize>;
}

/// Expands the unexpanded action with the highest heuristic score.
///
/// Promising actions are tried first instead of in random order. Ties go to
/// the action the forward model listed first.
#[derive(Debug, Clone, Default)]
pub struct HighestScoreExpansion;

impl HighestScoreExpansion {
    /// Creates a new expansion policy
    pub fn new() -> Self {
        HighestScoreExpansion
    }
}

impl<S: GameState> ExpansionPolicy<S> for HighestScoreExpansion {
    fn select_action_to_expand(&self, node: &SearchNode<S>, include_all: bool) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;

        for (i, slot) in node.children.iter().enumerate() {
            if slot.is_expanded() || !node.is_eligible(slot, include_all) {
                continue;
            }
            if best.map_or(true, |(_, score)| slot.score > score) {
                best = Some((i, slot.score));
            }
        }

        best.map(|(i, _)| i)
    }
}
