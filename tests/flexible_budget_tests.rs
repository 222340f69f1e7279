mod common;

use turnwise_mcts::{
    config::{Budget, SearchParams},
    MCTS,
};

use common::{init_logging, ScriptBuilder, ScriptRules, ScriptState, Step};

/// Player 0 may take `x`, which looks good but keeps the turn going into a
/// bad follow-up, or `y`, which hands over to player 1 at an even position.
fn deceptive_turn() -> ScriptState {
    ScriptBuilder::new()
        .node(0, 0.0, &[("x", 1), ("y", 2)])
        .node(0, 0.5, &[("x2", 3)])
        .node(1, 0.0, &[("z", 4)])
        .node(1, -1.0, &[("w", 5)])
        .node(0, 0.0, &[])
        .node(0, -1.0, &[])
        .start()
}

fn prefer_x(action: &Step, _: &ScriptState, _: &[Step]) -> f64 {
    if action.0 == "x" {
        2.0
    } else {
        1.0
    }
}

fn two_iterations() -> SearchParams {
    SearchParams::default()
        .with_budget(Budget::Iterations(2))
        .with_exploration_constant(0.0)
        .with_rollout_length(0)
        .with_seed(21)
}

#[test]
fn test_fixed_budget_stops_mid_turn() {
    init_logging();
    let mut mcts = MCTS::new(ScriptRules::new(), two_iterations().with_flexible_budget(false))
        .with_action_heuristic(prefer_x);

    let action = mcts.choose_action(&deceptive_turn()).unwrap();

    assert_eq!(action, Step("x"));
    assert_eq!(mcts.statistics().iterations, 2);
    assert_eq!(mcts.statistics().budget_extensions, 0);
}

#[test]
fn test_flexible_budget_finishes_the_turn() {
    init_logging();
    let mut mcts = MCTS::new(ScriptRules::new(), two_iterations().with_flexible_budget(true))
        .with_action_heuristic(prefer_x);

    let action = mcts.choose_action(&deceptive_turn()).unwrap();

    assert_eq!(action, Step("y"), "the follow-up after x should have been seen");
    assert_eq!(mcts.statistics().budget_extensions, 1);
    assert_eq!(mcts.statistics().iterations, 4);

    let root = mcts.root().unwrap();
    assert!(root.child(&Step("x")).unwrap().mean_value() < 0.0);
}

#[test]
fn test_extensions_are_capped() {
    let params = two_iterations()
        .with_flexible_budget(true)
        .with_max_budget_extensions(0);
    let mut mcts = MCTS::new(ScriptRules::new(), params).with_action_heuristic(prefer_x);

    let action = mcts.choose_action(&deceptive_turn()).unwrap();

    assert_eq!(action, Step("x"));
    assert_eq!(mcts.statistics().budget_extensions, 0);
}

#[test]
fn test_narrow_search_skips_flexible_budget() {
    let mut mcts = MCTS::new(ScriptRules::new(), two_iterations().with_flexible_budget(true))
        .with_action_heuristic(prefer_x);

    let action = mcts.choose_action_narrow(&deceptive_turn()).unwrap();

    assert_eq!(action, Step("x"));
    assert_eq!(mcts.statistics().budget_extensions, 0);
    assert!(mcts.params().flexible_budget, "parameters are restored");
}
