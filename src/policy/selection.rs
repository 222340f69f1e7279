//! Selection policies
//!
//! Selection policies determine which expanded child to descend into,
//! balancing exploration and exploitation.

use rand::{Rng, RngCore};

use crate::{
    config::SearchParams,
    game_state::GameState,
    tree::SearchNode,
    utils::{guarded_mean, noise},
    MCTSError, Result,
};

/// Trait for policies that select nodes to explore
pub trait SelectionPolicy<S: GameState> {
    /// Selects the slot index of an expanded child of `node`.
    ///
    /// `agent` is the player the whole search is run for. Fails with
    /// [`MCTSError::NoExpandedChildren`] if `node` has no expanded child.
    fn select_child(
        &self,
        node: &SearchNode<S>,
        agent: &S::Player,
        params: &SearchParams,
        rng: &mut dyn RngCore,
    ) -> Result<usize>;
}

/// UCB score of one child.
///
/// ```text
/// exploit = total / (visits + eps)
/// explore = K * sqrt(ln(parent_visits + 1) / (visits + eps))
/// score   = ±exploit + explore, perturbed by at most eps/2 relative noise
/// ```
///
/// The exploitation term is negated when `maximizing` is false, i.e. when
/// the node belongs to an opponent who is assumed to minimise the searching
/// player's value. Exploration is credited the same way for everyone.
pub fn ucb_score(
    child_total: f64,
    child_visits: u32,
    parent_visits: u32,
    exploration_constant: f64,
    epsilon: f64,
    maximizing: bool,
    draw: f64,
) -> f64 {
    let exploit = guarded_mean(child_total, child_visits, epsilon);
    let explore = exploration_constant
        * ((f64::from(parent_visits) + 1.0).ln() / (f64::from(child_visits) + epsilon)).sqrt();

    let signed = if maximizing { exploit } else { -exploit };
    noise(signed + explore, epsilon, draw)
}

/// Adversarial UCB selection policy
///
/// Classic UCB on the searching player's own turns; on every other player's
/// turn the child values are negated, a minimax-flavored assumption that the
/// opponent works against the searching player.
#[derive(Debug, Clone, Default)]
pub struct AdversarialUcbPolicy;

impl AdversarialUcbPolicy {
    /// Creates a new adversarial UCB policy
    pub fn new() -> Self {
        AdversarialUcbPolicy
    }
}

impl<S: GameState> SelectionPolicy<S> for AdversarialUcbPolicy {
    fn select_child(
        &self,
        node: &SearchNode<S>,
        agent: &S::Player,
        params: &SearchParams,
        rng: &mut dyn RngCore,
    ) -> Result<usize> {
        let maximizing = &node.owning_player == agent;
        let mut best: Option<(usize, f64)> = None;

        for (i, child) in node.expanded_children() {
            let score = ucb_score(
                child.total_value(),
                child.visits(),
                node.visits(),
                params.exploration_constant,
                params.epsilon,
                maximizing,
                rng.gen::<f64>(),
            );

            if best.map_or(true, |(_, s)| score > s) {
                best = Some((i, score));
            }
        }

        best.map(|(i, _)| i)
            .ok_or(MCTSError::NoExpandedChildren { depth: node.depth })
    }
}
