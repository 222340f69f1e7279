mod common;

use rand::rngs::StdRng;
use rand::SeedableRng;
use turnwise_mcts::{
    config::SearchParams,
    heuristic::UniformActionHeuristic,
    policy::selection::{ucb_score, AdversarialUcbPolicy, SelectionPolicy},
    MCTSError, SearchNode,
};

use common::{three_outcomes, ScriptRules};

#[test]
fn test_ucb_monotone_in_total_value() {
    let eps = 1e-6;
    let mut previous = f64::NEG_INFINITY;

    for step in 0..40 {
        let total = -5.0 + f64::from(step) * 0.25;
        let score = ucb_score(total, 7, 30, 1.0, eps, true, 0.5);
        assert!(
            score >= previous,
            "raising the total value from {} lowered the score",
            total
        );
        previous = score;
    }
}

#[test]
fn test_ucb_monotone_under_any_noise_draw() {
    let eps = 1e-6;
    for draw in [0.0, 0.25, 0.5, 0.75, 0.999] {
        let low = ucb_score(1.0, 4, 10, 0.7, eps, true, draw);
        let high = ucb_score(1.5, 4, 10, 0.7, eps, true, draw);
        assert!(high > low);
    }
}

#[test]
fn test_ucb_sign_flip_for_opponent() {
    let eps = 1e-6;
    let ours_good = ucb_score(2.0, 2, 4, 0.0, eps, true, 0.5);
    let ours_bad = ucb_score(-2.0, 2, 4, 0.0, eps, true, 0.5);
    assert!(ours_good > ours_bad);

    let theirs_good = ucb_score(2.0, 2, 4, 0.0, eps, false, 0.5);
    let theirs_bad = ucb_score(-2.0, 2, 4, 0.0, eps, false, 0.5);
    assert!(theirs_bad > theirs_good, "opponents minimise our value");
}

#[test]
fn test_exploration_is_symmetric_between_players() {
    let eps = 1e-6;
    let ours = ucb_score(0.0, 1, 50, 1.0, eps, true, 0.5);
    let theirs = ucb_score(0.0, 1, 50, 1.0, eps, false, 0.5);
    assert!((ours - theirs).abs() < 1e-9);
}

#[test]
fn test_unvisited_child_does_not_divide_by_zero() {
    let score = ucb_score(0.0, 0, 0, 1.414, 1e-6, true, 0.5);
    assert!(score.is_finite());
}

#[test]
fn test_selection_on_unexpanded_node_is_a_fault() {
    let rules = ScriptRules::new();
    let node = SearchNode::new(three_outcomes(), 0, &rules, &UniformActionHeuristic);
    let mut rng = StdRng::seed_from_u64(3);

    let result = AdversarialUcbPolicy::new().select_child(&node, &0, &SearchParams::default(), &mut rng);

    match result {
        Err(MCTSError::NoExpandedChildren { depth }) => assert_eq!(depth, 0),
        other => panic!("expected a selection fault, got {:?}", other),
    }
}
