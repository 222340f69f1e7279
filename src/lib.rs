//! # turnwise-mcts
//!
//! A budgeted, heuristic-guided Monte Carlo Tree Search (MCTS) engine for
//! turn-based, multi-player, stochastic games.
//!
//! Given a game state and a forward model that knows the rules, the engine
//! returns the best action it can find within a computational budget. It is
//! the decision core a game-specific AI player delegates to.
//!
//! ## Features
//!
//! - Adversarial UCB selection: opponents are assumed to minimise the
//!   searching player's value
//! - Heuristic-ordered expansion and heuristic-weighted rollouts
//! - Iteration, wall-clock and forward-model-call budgets
//! - A flexible budget that keeps searching until the best line completes the
//!   current turn
//! - Tree reuse across successive moves of a multi-action turn
//!
//! ## Basic Usage
//!
//! ```
//! use turnwise_mcts::{
//!     config::{Budget, SearchParams},
//!     Action, ForwardModel, GameState, ModelError, MCTS,
//! };
//!
//! // Pick one of three doors; the game ends immediately.
//! #[derive(Clone, Debug, PartialEq, Eq, Hash)]
//! struct Door(u8);
//! impl Action for Door {}
//!
//! #[derive(Clone)]
//! struct Hall { opened: Option<u8> }
//!
//! impl GameState for Hall {
//!     type Action = Door;
//!     type Player = usize;
//!     fn current_player(&self) -> usize { 0 }
//!     fn is_terminal(&self) -> bool { self.opened.is_some() }
//!     fn evaluate(&self, _viewpoint: &usize) -> f64 {
//!         match self.opened {
//!             Some(2) => 1.0,
//!             Some(_) => -1.0,
//!             None => 0.0,
//!         }
//!     }
//! }
//!
//! struct Rules;
//!
//! impl ForwardModel<Hall> for Rules {
//!     fn legal_actions(&self, state: &Hall) -> Vec<Door> {
//!         if state.is_terminal() { vec![] } else { (0..3).map(Door).collect() }
//!     }
//!     fn apply(&self, state: &mut Hall, action: &Door) -> Result<(), ModelError> {
//!         state.opened = Some(action.0);
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), turnwise_mcts::MCTSError> {
//!     let params = SearchParams::default()
//!         .with_budget(Budget::Iterations(10))
//!         .with_rollout_length(0)
//!         .with_seed(1);
//!
//!     let mut mcts = MCTS::new(Rules, params);
//!     let action = mcts.choose_action(&Hall { opened: None })?;
//!
//!     assert_eq!(action, Door(2));
//!     println!("{}", mcts.statistics().summary());
//!     Ok(())
//! }
//! ```
//!
//! ## How It Works
//!
//! Each iteration runs the four classical phases:
//!
//! 1. **Selection**: from the root, descend through fully expanded nodes with
//!    the adversarial UCB formula.
//!
//! 2. **Expansion**: at the first node with an unexpanded action worth trying,
//!    expand the single highest-scored one.
//!
//! 3. **Simulation**: play out a short rollout from the new node, sampling
//!    actions in proportion to their heuristic weight, and evaluate the
//!    resulting state for the searching player.
//!
//! 4. **Backpropagation**: add the value to every node on the path back to
//!    the root.
//!
//! When the budget runs out the root child with the highest mean value is
//! chosen; exact ties go to the action heuristic.

pub mod budget;
pub mod config;
pub mod game_state;
pub mod heuristic;
pub mod mcts;
pub mod policy;
pub mod stats;
pub mod tree;
pub mod utils;

pub use config::{Budget, SearchMode, SearchParams};
pub use game_state::{Action, ForwardModel, GameState, ModelError, Player};
pub use heuristic::{ActionHeuristic, StateHeuristic};
pub use mcts::{RootReuse, MCTS};
pub use policy::{BackpropagationPolicy, ExpansionPolicy, SelectionPolicy};
pub use stats::SearchStatistics;
pub use tree::{NodePath, SearchNode};

/// Error types for the search
#[derive(thiserror::Error, Debug)]
pub enum MCTSError {
    /// No legal actions are available from the current state
    #[error("No legal actions available from current state")]
    NoLegalActions,

    /// The search finished without visiting any root child
    #[error("No decision possible: no root child was visited during the search")]
    NoDecision,

    /// An evaluation produced NaN or an infinity
    #[error("Non-finite value {value} evaluated at depth {depth}")]
    NonFiniteValue {
        /// The offending value
        value: f64,
        /// Depth of the node the rollout started from
        depth: u32,
    },

    /// Selection was asked to choose among zero expanded children
    #[error("Selection invoked on a node at depth {depth} with no expanded children")]
    NoExpandedChildren {
        /// Depth of the node
        depth: u32,
    },

    /// Expansion was asked to expand a node with nothing left to expand
    #[error("Expansion invoked on a node at depth {depth} with no eligible unexpanded action")]
    NoEligibleAction {
        /// Depth of the node
        depth: u32,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The forward model rejected an action
    #[error("Forward model error: {0}")]
    ForwardModel(ModelError),
}

/// Result type for search operations
pub type Result<T> = std::result::Result<T, MCTSError>;
