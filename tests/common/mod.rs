//! Toy games shared by the integration tests.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use turnwise_mcts::{Action, ForwardModel, GameState, ModelError, SearchNode};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A labelled move of a scripted game
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Step(pub &'static str);

impl Action for Step {
    fn ends_turn(&self) -> bool {
        self.0 == "end_turn"
    }
}

#[derive(Debug, Clone)]
struct ScriptNode {
    player: usize,
    value: f64,
    edges: Vec<(&'static str, usize)>,
}

/// A game given as an explicit table of positions.
///
/// Position `i` is the `i`-th call to [`ScriptBuilder::node`]. Values are
/// from player 0's point of view; a position without edges is terminal.
#[derive(Debug, Default)]
pub struct ScriptBuilder {
    nodes: Vec<ScriptNode>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(mut self, player: usize, value: f64, edges: &[(&'static str, usize)]) -> Self {
        self.nodes.push(ScriptNode {
            player,
            value,
            edges: edges.to_vec(),
        });
        self
    }

    pub fn start(self) -> ScriptState {
        ScriptState {
            position: 0,
            script: Rc::new(self.nodes),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScriptState {
    pub position: usize,
    script: Rc<Vec<ScriptNode>>,
}

impl ScriptState {
    fn node(&self) -> &ScriptNode {
        &self.script[self.position]
    }
}

impl GameState for ScriptState {
    type Action = Step;
    type Player = usize;

    fn current_player(&self) -> usize {
        self.node().player
    }

    fn is_terminal(&self) -> bool {
        self.node().edges.is_empty()
    }

    fn evaluate(&self, viewpoint: &usize) -> f64 {
        if *viewpoint == 0 {
            self.node().value
        } else {
            -self.node().value
        }
    }

    fn fingerprint(&self) -> Option<u64> {
        Some(self.position as u64)
    }
}

/// Rules of a scripted game; counts every `apply`
#[derive(Debug, Default)]
pub struct ScriptRules {
    pub calls: Cell<u64>,
}

impl ScriptRules {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ForwardModel<ScriptState> for ScriptRules {
    fn legal_actions(&self, state: &ScriptState) -> Vec<Step> {
        state.node().edges.iter().map(|(label, _)| Step(*label)).collect()
    }

    fn apply(&self, state: &mut ScriptState, action: &Step) -> Result<(), ModelError> {
        self.calls.set(self.calls.get() + 1);
        let target = state
            .node()
            .edges
            .iter()
            .find(|(label, _)| *label == action.0)
            .map(|(_, target)| *target)
            .ok_or_else(|| format!("illegal step {:?} at {}", action, state.position))?;
        state.position = target;
        Ok(())
    }
}

/// Root with three immediately terminal children worth +1, 0 and -1 for
/// player 0
pub fn three_outcomes() -> ScriptState {
    ScriptBuilder::new()
        .node(0, 0.0, &[("win", 1), ("draw", 2), ("lose", 3)])
        .node(1, 1.0, &[])
        .node(1, 0.0, &[])
        .node(1, -1.0, &[])
        .start()
}

/// An endless-looking game: every position offers `width` actions, players
/// alternate, and play stops at `max_depth`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ladder {
    pub depth: u32,
    pub max_depth: u32,
    pub width: u8,
    pub score: i64,
}

impl Ladder {
    pub fn new(width: u8, max_depth: u32) -> Self {
        Ladder {
            depth: 0,
            max_depth,
            width,
            score: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rung(pub u8);

impl Action for Rung {}

impl GameState for Ladder {
    type Action = Rung;
    type Player = usize;

    fn current_player(&self) -> usize {
        (self.depth % 2) as usize
    }

    fn is_terminal(&self) -> bool {
        self.depth >= self.max_depth
    }

    fn evaluate(&self, viewpoint: &usize) -> f64 {
        let score = self.score as f64 / f64::from(self.max_depth.max(1));
        if *viewpoint == 0 {
            score
        } else {
            -score
        }
    }
}

#[derive(Debug, Default)]
pub struct LadderRules {
    pub calls: Cell<u64>,
}

impl ForwardModel<Ladder> for LadderRules {
    fn legal_actions(&self, state: &Ladder) -> Vec<Rung> {
        if state.is_terminal() {
            return vec![];
        }
        (0..state.width).map(Rung).collect()
    }

    fn apply(&self, state: &mut Ladder, action: &Rung) -> Result<(), ModelError> {
        self.calls.set(self.calls.get() + 1);
        // Player 0 likes high rungs, player 1 low ones
        let delta = i64::from(action.0) - i64::from(state.width / 2);
        state.score += if state.current_player() == 0 { delta } else { -delta };
        state.depth += 1;
        Ok(())
    }
}

/// Walks a subtree, calling `visit` on every node
pub fn walk<S: GameState>(node: &SearchNode<S>, visit: &mut dyn FnMut(&SearchNode<S>)) {
    visit(node);
    for (_, child) in node.expanded_children() {
        walk(child, visit);
    }
}
