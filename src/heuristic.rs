//! Heuristics that steer the search.
//!
//! An [`ActionHeuristic`] assigns each candidate action a non-negative
//! desirability weight. The search uses it to order expansions, to weight
//! rollout sampling and to settle ties between equally valued moves. A
//! [`StateHeuristic`] scores the position reached at the end of a rollout.

use std::collections::HashMap;
use std::hash::Hash;

use crate::game_state::GameState;

/// Scores candidate actions.
pub trait ActionHeuristic<S: GameState> {
    /// Desirability of `action` in `state`, given every legal action
    /// `siblings` (which includes `action` itself).
    ///
    /// Must be non-negative. Zero means "never worth expanding unless the
    /// search is told to include all actions".
    fn score(&self, action: &S::Action, state: &S, siblings: &[S::Action]) -> f64;

    /// Picks one action among `tied`, which all have the same search value.
    ///
    /// The default keeps the highest scoring action, first one wins on ties.
    /// Returns `None` only when `tied` is empty.
    fn choose(&self, tied: &[S::Action], state: &S) -> Option<S::Action> {
        let mut best: Option<(&S::Action, f64)> = None;
        for action in tied {
            let score = sanitize(self.score(action, state, tied));
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((action, score));
            }
        }
        best.map(|(action, _)| action.clone())
    }
}

/// Evaluates a state for a given viewpoint player.
pub trait StateHeuristic<S: GameState> {
    /// Value of `state` for `viewpoint`. Larger is better.
    fn evaluate(&self, state: &S, viewpoint: &S::Player) -> f64;
}

impl<S, F> ActionHeuristic<S> for F
where
    S: GameState,
    F: Fn(&S::Action, &S, &[S::Action]) -> f64,
{
    fn score(&self, action: &S::Action, state: &S, siblings: &[S::Action]) -> f64 {
        self(action, state, siblings)
    }
}

impl<S, F> StateHeuristic<S> for F
where
    S: GameState,
    F: Fn(&S, &S::Player) -> f64,
{
    fn evaluate(&self, state: &S, viewpoint: &S::Player) -> f64 {
        self(state, viewpoint)
    }
}

/// Negative and NaN scores collapse to zero so they can be used as weights.
pub(crate) fn sanitize(score: f64) -> f64 {
    if score.is_nan() || score < 0.0 {
        0.0
    } else {
        score
    }
}

/// Gives every action the same weight.
///
/// Expansion then follows the forward model's order and rollouts sample
/// uniformly.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformActionHeuristic;

impl<S: GameState> ActionHeuristic<S> for UniformActionHeuristic {
    fn score(&self, _action: &S::Action, _state: &S, _siblings: &[S::Action]) -> f64 {
        1.0
    }
}

/// Delegates to [`GameState::evaluate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StateEvaluation;

impl<S: GameState> StateHeuristic<S> for StateEvaluation {
    fn evaluate(&self, state: &S, viewpoint: &S::Player) -> f64 {
        state.evaluate(viewpoint)
    }
}

/// Actions that belong to a closed set of variants.
pub trait Tagged {
    /// The variant tag, usually a fieldless mirror of the action enum
    type Tag: Eq + Hash;

    /// Returns the variant tag of this action
    fn tag(&self) -> Self::Tag;
}

/// A scoring table keyed by an action's variant tag.
///
/// Each variant gets a fixed weight; variants missing from the table get
/// `default_score`. The lookup is total, so adding a variant to the action
/// enum never leaves it unscored.
///
/// # Example
///
/// ```
/// use turnwise_mcts::heuristic::ScoreTable;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Kind { Attack, Move, EndTurn }
///
/// let table = ScoreTable::new(0.0)
///     .with_score(Kind::Attack, 3.0)
///     .with_score(Kind::Move, 2.0);
///
/// assert_eq!(table.lookup(&Kind::Attack), 3.0);
/// assert_eq!(table.lookup(&Kind::EndTurn), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct ScoreTable<K> {
    scores: HashMap<K, f64>,
    default_score: f64,
}

impl<K: Eq + Hash> ScoreTable<K> {
    /// Creates an empty table with the given fallback score
    pub fn new(default_score: f64) -> Self {
        ScoreTable {
            scores: HashMap::new(),
            default_score: sanitize(default_score),
        }
    }

    /// Sets the score for one tag
    pub fn with_score(mut self, tag: K, score: f64) -> Self {
        self.scores.insert(tag, sanitize(score));
        self
    }

    /// Returns the score for `tag`
    pub fn lookup(&self, tag: &K) -> f64 {
        self.scores.get(tag).copied().unwrap_or(self.default_score)
    }
}

impl<K, S> ActionHeuristic<S> for ScoreTable<K>
where
    K: Eq + Hash,
    S: GameState,
    S::Action: Tagged<Tag = K>,
{
    fn score(&self, action: &S::Action, _state: &S, _siblings: &[S::Action]) -> f64 {
        self.lookup(&action.tag())
    }
}
