//! Traits describing the game the search runs over.
//!
//! The engine never looks inside a state. It only needs to know whose turn it
//! is, whether the game is over and how good the position is for a player,
//! while a separate [`ForwardModel`] knows the rules: which actions are legal
//! and how to apply them.

use std::fmt::Debug;
use std::hash::Hash;

/// Error type returned by a forward model when it refuses an action.
///
/// The search never inspects these; they are handed back to the caller of
/// [`MCTS::choose_action`](crate::MCTS::choose_action) as they were raised.
pub type ModelError = Box<dyn std::error::Error + Send + Sync>;

/// Trait for actions that can be taken in a game
///
/// Actions are used as keys of a node's child map, so two equal actions must
/// describe the same move.
pub trait Action: Clone + Debug + Eq + Hash {
    /// Returns true if this action hands control to the next player.
    ///
    /// Games with multi-action turns usually have an explicit "end turn"
    /// action. When one of those fails to move play on to another player,
    /// expansion retries it once before accepting the state.
    fn ends_turn(&self) -> bool {
        false
    }
}

/// Trait for players in a game
pub trait Player: Clone + Debug + PartialEq {}

impl Player for usize {}
impl Player for u8 {}
impl Player for i32 {}
impl Player for char {}

/// A snapshot of the game.
///
/// States are deep-copied whenever the search needs a private version to
/// mutate, so `clone` must not share mutable data with the original.
pub trait GameState: Clone {
    /// The type of actions that can be taken in this game
    type Action: Action;

    /// The type of players in this game
    type Player: Player;

    /// Returns the player whose turn it is in this state
    fn current_player(&self) -> Self::Player;

    /// Returns true if this state is terminal (game over)
    fn is_terminal(&self) -> bool;

    /// Heuristic value of this state from the perspective of `viewpoint`.
    ///
    /// Larger is better for `viewpoint`. The value must be finite for every
    /// reachable state; the search aborts on NaN or infinity.
    fn evaluate(&self, viewpoint: &Self::Player) -> f64;

    /// An optional identity for this state.
    ///
    /// When a retained subtree is offered for reuse, its root fingerprint is
    /// compared against the live state. `None` on both sides means the caller
    /// vouches for the match.
    fn fingerprint(&self) -> Option<u64> {
        None
    }
}

/// The rules of the game.
///
/// # Example
///
/// ```
/// use turnwise_mcts::{Action, ForwardModel, GameState, ModelError};
///
/// #[derive(Clone, Debug, PartialEq, Eq, Hash)]
/// struct Take(u8);
/// impl Action for Take {}
///
/// #[derive(Clone)]
/// struct Pile { stones: u8, to_move: usize }
///
/// impl GameState for Pile {
///     type Action = Take;
///     type Player = usize;
///     fn current_player(&self) -> usize { self.to_move }
///     fn is_terminal(&self) -> bool { self.stones == 0 }
///     fn evaluate(&self, viewpoint: &usize) -> f64 {
///         // Whoever took the last stone is not the player to move
///         if self.stones == 0 && self.to_move != *viewpoint { 1.0 } else { 0.0 }
///     }
/// }
///
/// struct PileRules;
///
/// impl ForwardModel<Pile> for PileRules {
///     fn legal_actions(&self, state: &Pile) -> Vec<Take> {
///         (1..=state.stones.min(3)).map(Take).collect()
///     }
///
///     fn apply(&self, state: &mut Pile, action: &Take) -> Result<(), ModelError> {
///         if action.0 > state.stones {
///             return Err("not enough stones".into());
///         }
///         state.stones -= action.0;
///         state.to_move = 1 - state.to_move;
///         Ok(())
///     }
/// }
///
/// let mut pile = Pile { stones: 5, to_move: 0 };
/// assert_eq!(PileRules.legal_actions(&pile).len(), 3);
/// PileRules.apply(&mut pile, &Take(2)).unwrap();
/// assert_eq!(pile.stones, 3);
/// ```
pub trait ForwardModel<S: GameState> {
    /// Returns the legal actions from `state`, in a deterministic order.
    ///
    /// Must be empty if and only if `state` is terminal.
    fn legal_actions(&self, state: &S) -> Vec<S::Action>;

    /// Applies `action` to `state` in place.
    ///
    /// Every call counts as one simulation step against a forward-model-call
    /// budget.
    fn apply(&self, state: &mut S, action: &S::Action) -> Result<(), ModelError>;
}

impl<S: GameState, M: ForwardModel<S> + ?Sized> ForwardModel<S> for &M {
    fn legal_actions(&self, state: &S) -> Vec<S::Action> {
        (**self).legal_actions(state)
    }

    fn apply(&self, state: &mut S, action: &S::Action) -> Result<(), ModelError> {
        (**self).apply(state, action)
    }
}
