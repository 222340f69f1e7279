//! Tree data structures for the search
//!
//! Every [`SearchNode`] owns its game state and its subtree outright. There
//! are no parent pointers: the way back to the root during backpropagation is
//! the [`NodePath`] recorded by the current iteration, which is dropped as
//! soon as that iteration has been backed up.

use std::collections::HashSet;
use std::fmt;

use crate::game_state::{ForwardModel, GameState};
use crate::heuristic::{sanitize, ActionHeuristic};

/// One legal action of a node and, once expanded, the node it leads to
pub struct ChildSlot<S: GameState> {
    /// The action leading to the child
    pub action: S::Action,

    /// Heuristic weight of the action, computed once when the parent is built
    pub score: f64,

    /// The child node, or `None` while the action is unexpanded
    pub node: Option<Box<SearchNode<S>>>,
}

impl<S: GameState> ChildSlot<S> {
    /// Returns true once the action has been expanded
    pub fn is_expanded(&self) -> bool {
        self.node.is_some()
    }
}

/// Represents a node in the search tree
///
/// The child slots are fixed at construction: one per legal action of the
/// node's state, in the forward model's order. Expansion fills slots in; it
/// never adds or removes them.
pub struct SearchNode<S: GameState> {
    /// The player whose turn it is in `state`
    pub owning_player: S::Player,

    /// The game snapshot this node represents
    pub state: S,

    /// Legal actions of `state` and their children
    pub children: Vec<ChildSlot<S>>,

    /// Distance from the search root (root = 0)
    pub depth: u32,

    visits: u32,
    total_value: f64,

    /// True if at least one action has a positive heuristic score
    any_positive: bool,
}

impl<S: GameState> SearchNode<S> {
    /// Creates a node for `state`, enumerating its legal actions.
    ///
    /// No children are created; every action starts unexpanded. Terminal
    /// states get no slots at all.
    pub fn new<M, H>(state: S, depth: u32, model: &M, heuristic: &H) -> Self
    where
        M: ForwardModel<S> + ?Sized,
        H: ActionHeuristic<S> + ?Sized,
    {
        let owning_player = state.current_player();
        let mut children = Vec::new();

        if !state.is_terminal() {
            let mut actions = model.legal_actions(&state);
            let mut seen = HashSet::with_capacity(actions.len());
            actions.retain(|action| seen.insert(action.clone()));

            children = actions
                .iter()
                .map(|action| ChildSlot {
                    action: action.clone(),
                    score: sanitize(heuristic.score(action, &state, &actions)),
                    node: None,
                })
                .collect();
        }

        let any_positive = children.iter().any(|slot| slot.score > 0.0);

        SearchNode {
            owning_player,
            state,
            children,
            depth,
            visits: 0,
            total_value: 0.0,
            any_positive,
        }
    }

    /// Returns the number of visits to this node
    pub fn visits(&self) -> u32 {
        self.visits
    }

    /// Returns the sum of all values backed up through this node
    pub fn total_value(&self) -> f64 {
        self.total_value
    }

    /// Returns the mean backed-up value, 0 for an unvisited node
    pub fn mean_value(&self) -> f64 {
        if self.visits == 0 {
            return 0.0;
        }
        self.total_value / f64::from(self.visits)
    }

    /// Adds one visit with the given value
    pub fn record(&mut self, value: f64) {
        self.visits += 1;
        self.total_value += value;
    }

    /// Returns true if the game is over in this node's state
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Returns true if the node has no legal actions
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// True if `slot` may be expanded.
    ///
    /// Only positively scored actions qualify, unless `include_all` is set or
    /// no action of this node scores above zero.
    pub fn is_eligible(&self, slot: &ChildSlot<S>, include_all: bool) -> bool {
        include_all || !self.any_positive || slot.score > 0.0
    }

    /// Returns true if some eligible action is still unexpanded
    pub fn has_expandable(&self, include_all: bool) -> bool {
        self.children
            .iter()
            .any(|slot| !slot.is_expanded() && self.is_eligible(slot, include_all))
    }

    /// Iterates over the expanded children with their slot index
    pub fn expanded_children(&self) -> impl Iterator<Item = (usize, &SearchNode<S>)> {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.node.as_deref().map(|node| (i, node)))
    }

    /// Returns the slot index of `action`
    pub fn slot_index(&self, action: &S::Action) -> Option<usize> {
        self.children.iter().position(|slot| &slot.action == action)
    }

    /// Returns the child reached by `action`, if expanded
    pub fn child(&self, action: &S::Action) -> Option<&SearchNode<S>> {
        self.slot_index(action)
            .and_then(|i| self.children[i].node.as_deref())
    }

    /// Returns the child in slot `index`, if expanded
    pub fn child_at_mut(&mut self, index: usize) -> Option<&mut SearchNode<S>> {
        self.children
            .get_mut(index)
            .and_then(|slot| slot.node.as_deref_mut())
    }

    /// Installs `child` in slot `index` and returns it
    pub(crate) fn install_child(&mut self, index: usize, child: SearchNode<S>) -> &mut SearchNode<S> {
        self.children[index].node.insert(Box::new(child))
    }

    /// Detaches the child reached by `action`; its siblings are dropped with
    /// this node
    pub fn take_child(&mut self, action: &S::Action) -> Option<SearchNode<S>> {
        let index = self.slot_index(action)?;
        self.children[index].node.take().map(|child| *child)
    }

    /// Counts this node and all of its descendants
    pub fn subtree_size(&self) -> usize {
        1 + self
            .expanded_children()
            .map(|(_, child)| child.subtree_size())
            .sum::<usize>()
    }

    /// Shifts the depth of this subtree so that this node sits at `depth`
    pub(crate) fn rebase_depth(&mut self, depth: u32) {
        self.depth = depth;
        for slot in &mut self.children {
            if let Some(child) = slot.node.as_deref_mut() {
                child.rebase_depth(depth + 1);
            }
        }
    }
}

impl<S: GameState> fmt::Debug for SearchNode<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchNode")
            .field("owning_player", &self.owning_player)
            .field("depth", &self.depth)
            .field("visits", &self.visits)
            .field("total_value", &self.total_value)
            .field("actions", &self.children.len())
            .finish()
    }
}

/// Represents a path through the search tree
///
/// A path is a sequence of child slot indices leading from the root to one
/// node. It is the only link from a node back towards its ancestors.
#[derive(Debug, Clone)]
pub struct NodePath {
    /// Indices of children to follow from the root
    pub indices: Vec<usize>,
}

impl NodePath {
    /// Creates a new empty path (pointing to the root)
    pub fn new() -> Self {
        NodePath {
            indices: Vec::new(),
        }
    }

    /// Extends the path with a new index
    pub fn push(&mut self, index: usize) {
        self.indices.push(index);
    }

    /// Returns the length of the path
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns true if the path is empty
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Forgets every step of the path
    pub fn clear(&mut self) {
        self.indices.clear();
    }
}

impl Default for NodePath {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path[")?;
        for (i, idx) in self.indices.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", idx)?;
        }
        write!(f, "]")
    }
}
