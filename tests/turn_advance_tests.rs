mod common;

use turnwise_mcts::{
    config::{Budget, SearchParams},
    Action, ForwardModel, GameState, ModelError, MCTS,
};

use common::init_logging;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Act {
    Work,
    EndTurn,
}

impl Action for Act {
    fn ends_turn(&self) -> bool {
        matches!(self, Act::EndTurn)
    }
}

/// A game whose end-turn button has to be pressed `needed` times in a row
/// before the other player gets to move
#[derive(Clone, Debug)]
struct Sticky {
    player: usize,
    presses: u32,
    needed: u32,
    turns: u32,
}

impl Sticky {
    fn new(needed: u32) -> Self {
        Sticky {
            player: 0,
            presses: 0,
            needed,
            turns: 0,
        }
    }
}

impl GameState for Sticky {
    type Action = Act;
    type Player = usize;

    fn current_player(&self) -> usize {
        self.player
    }

    fn is_terminal(&self) -> bool {
        self.turns >= 4
    }

    fn evaluate(&self, _viewpoint: &usize) -> f64 {
        0.0
    }
}

struct StickyRules;

impl ForwardModel<Sticky> for StickyRules {
    fn legal_actions(&self, state: &Sticky) -> Vec<Act> {
        if state.is_terminal() {
            return vec![];
        }
        vec![Act::Work, Act::EndTurn]
    }

    fn apply(&self, state: &mut Sticky, action: &Act) -> Result<(), ModelError> {
        if *action == Act::EndTurn {
            state.presses += 1;
            if state.presses >= state.needed {
                state.player = 1 - state.player;
                state.presses = 0;
                state.turns += 1;
            }
        }
        Ok(())
    }
}

fn prefer(first: Act) -> impl Fn(&Act, &Sticky, &[Act]) -> f64 {
    move |action: &Act, _: &Sticky, _: &[Act]| if *action == first { 2.0 } else { 1.0 }
}

fn one_iteration() -> SearchParams {
    SearchParams::default()
        .with_budget(Budget::Iterations(1))
        .with_rollout_length(0)
        .with_seed(9)
}

#[test]
fn test_end_turn_is_retried_once() {
    init_logging();
    let mut mcts = MCTS::new(StickyRules, one_iteration()).with_action_heuristic(prefer(Act::EndTurn));

    let action = mcts.choose_action(&Sticky::new(2)).unwrap();

    assert_eq!(action, Act::EndTurn);
    let child = mcts.root().unwrap().child(&Act::EndTurn).unwrap();
    assert_eq!(child.owning_player, 1);
    assert_eq!(mcts.statistics().fm_calls, 2);
    assert_eq!(mcts.statistics().turn_warnings, 0);
}

#[test]
fn test_stuck_turn_is_reported_and_search_continues() {
    init_logging();
    let params = one_iteration().with_flexible_budget(false);
    let mut mcts = MCTS::new(StickyRules, params).with_action_heuristic(prefer(Act::EndTurn));

    let action = mcts.choose_action(&Sticky::new(5)).unwrap();

    assert_eq!(action, Act::EndTurn);
    let child = mcts.root().unwrap().child(&Act::EndTurn).unwrap();
    assert_eq!(child.owning_player, 0, "the turn never passed");
    assert_eq!(child.state.presses, 2);
    assert_eq!(mcts.statistics().fm_calls, 2);
    assert_eq!(mcts.statistics().turn_warnings, 1);
}

#[test]
fn test_ordinary_actions_are_not_retried() {
    let params = one_iteration().with_flexible_budget(false);
    let mut mcts = MCTS::new(StickyRules, params).with_action_heuristic(prefer(Act::Work));

    let action = mcts.choose_action(&Sticky::new(2)).unwrap();

    assert_eq!(action, Act::Work);
    assert_eq!(mcts.statistics().fm_calls, 1);
    assert_eq!(mcts.statistics().turn_warnings, 0);
}
