//! Rollout policy
//!
//! A rollout plays a few actions forward from a freshly expanded node and
//! evaluates where it ends up, estimating the node's value without searching
//! to the true end of the game.

use log::trace;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::RngCore;

use crate::{
    game_state::{ForwardModel, GameState},
    heuristic::{sanitize, ActionHeuristic, StateHeuristic},
    MCTSError, Result,
};

/// Outcome of one rollout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rollout {
    /// Value of the final state for the searching player
    pub value: f64,

    /// Number of actions applied, each one a forward model call
    pub steps: u32,
}

/// Heuristic-weighted rollout policy
///
/// Each step samples an action with probability proportional to its
/// heuristic weight: stochastic, but biased towards actions the heuristic
/// likes. The rollout stops after `length` steps or at a terminal state. A
/// length of 0 evaluates the starting state directly.
#[derive(Debug, Clone)]
pub struct WeightedRolloutPolicy {
    /// Maximum number of actions to play out
    pub length: u32,
}

impl WeightedRolloutPolicy {
    /// Creates a rollout policy playing at most `length` actions
    pub fn new(length: u32) -> Self {
        WeightedRolloutPolicy { length }
    }

    /// Plays out a private copy of `start` and evaluates it for `viewpoint`.
    ///
    /// The returned value is not checked for finiteness; the caller knows the
    /// depth to report.
    pub fn simulate<S, M>(
        &self,
        start: &S,
        model: &M,
        actions: &dyn ActionHeuristic<S>,
        evaluator: &dyn StateHeuristic<S>,
        viewpoint: &S::Player,
        rng: &mut dyn RngCore,
    ) -> Result<Rollout>
    where
        S: GameState,
        M: ForwardModel<S> + ?Sized,
    {
        if self.length == 0 {
            return Ok(Rollout {
                value: evaluator.evaluate(start, viewpoint),
                steps: 0,
            });
        }

        let mut state = start.clone();
        let mut steps = 0;

        while steps < self.length && !state.is_terminal() {
            let legal = model.legal_actions(&state);
            if legal.is_empty() {
                break;
            }

            let weights: Vec<f64> = legal
                .iter()
                .map(|action| sanitize(actions.score(action, &state, &legal)))
                .collect();

            // All-zero weights are rejected by WeightedIndex; sample uniformly then
            let action = match WeightedIndex::new(&weights) {
                Ok(dist) => legal[dist.sample(&mut *rng)].clone(),
                Err(_) => match legal.choose(&mut *rng) {
                    Some(action) => action.clone(),
                    None => break,
                },
            };

            model
                .apply(&mut state, &action)
                .map_err(MCTSError::ForwardModel)?;
            steps += 1;
        }

        let value = evaluator.evaluate(&state, viewpoint);
        trace!("rollout finished after {} steps with value {}", steps, value);

        Ok(Rollout { value, steps })
    }
}
