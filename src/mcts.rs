//! Main implementation of the search
//!
//! This module contains the search driver, orchestrating the four phases of
//! selection, expansion, simulation and backpropagation under a budget, and
//! picking the final move.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{
    budget::BudgetTracker,
    config::SearchParams,
    game_state::{Action, ForwardModel, GameState},
    heuristic::{ActionHeuristic, StateEvaluation, StateHeuristic, UniformActionHeuristic},
    policy::{
        backpropagation::{BackpropagationPolicy, StandardPolicy},
        expansion::{ExpansionPolicy, HighestScoreExpansion},
        selection::{AdversarialUcbPolicy, SelectionPolicy},
        simulation::WeightedRolloutPolicy,
    },
    stats::SearchStatistics,
    tree::{NodePath, SearchNode},
    utils::truncate_for_ties,
    MCTSError, Result,
};

/// What [`MCTS::advance_root`] did with the search tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootReuse {
    /// The chosen child's subtree is now the root.
    ///
    /// `skipped` counts forced single-action continuations descended through
    /// after the chosen action.
    Retained {
        /// Number of forced moves skipped
        skipped: u32,
    },

    /// Nothing could be kept; the next search starts from a fresh root
    Fresh,
}

/// A child created by the expansion phase
struct Expansion<'n, S: GameState> {
    node: &'n mut SearchNode<S>,
    fm_calls: u64,
    /// An end-turn action left the same player to move even after a retry
    turn_stuck: bool,
}

/// The search driver
///
/// Owns the forward model, the parameters, the heuristics and, between
/// moves, the retained search tree.
pub struct MCTS<S: GameState, M: ForwardModel<S>> {
    /// The rules of the game
    model: M,

    /// Configuration for every search
    params: SearchParams,

    /// Tree of the last search, or the subtree kept by `advance_root`
    root: Option<SearchNode<S>>,

    /// True only while `root` is a subtree moved forward by `advance_root`.
    /// A tree that was merely left over from the last search never seeds the
    /// next one.
    advanced: bool,

    /// Statistics gathered during the last search
    statistics: SearchStatistics,

    rng: StdRng,

    /// Orders expansions, weights rollouts and settles final ties
    action_heuristic: Box<dyn ActionHeuristic<S>>,

    /// Scores rollout end states
    state_heuristic: Box<dyn StateHeuristic<S>>,

    selection_policy: Box<dyn SelectionPolicy<S>>,

    expansion_policy: Box<dyn ExpansionPolicy<S>>,

    backpropagation_policy: Box<dyn BackpropagationPolicy<S>>,

    rollout_policy: WeightedRolloutPolicy,

    /// Checked before every iteration; setting it ends the search early
    stop_flag: Option<Arc<AtomicBool>>,
}

impl<S: GameState + 'static, M: ForwardModel<S>> MCTS<S, M> {
    /// Creates a driver with the default heuristics: every action weighs the
    /// same and states are scored with [`GameState::evaluate`]
    pub fn new(model: M, params: SearchParams) -> Self {
        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let rollout_policy = WeightedRolloutPolicy::new(params.rollout_length);

        MCTS {
            model,
            params,
            root: None,
            advanced: false,
            statistics: SearchStatistics::new(),
            rng,
            action_heuristic: Box::new(UniformActionHeuristic),
            state_heuristic: Box::new(StateEvaluation),
            selection_policy: Box::new(AdversarialUcbPolicy::new()),
            expansion_policy: Box::new(HighestScoreExpansion::new()),
            backpropagation_policy: Box::new(StandardPolicy::new()),
            rollout_policy,
            stop_flag: None,
        }
    }

    /// Sets the action heuristic
    pub fn with_action_heuristic<H: ActionHeuristic<S> + 'static>(mut self, heuristic: H) -> Self {
        self.action_heuristic = Box::new(heuristic);
        self
    }

    /// Sets the state heuristic
    pub fn with_state_heuristic<H: StateHeuristic<S> + 'static>(mut self, heuristic: H) -> Self {
        self.state_heuristic = Box::new(heuristic);
        self
    }

    /// Sets the selection policy to use
    pub fn with_selection_policy<P: SelectionPolicy<S> + 'static>(mut self, policy: P) -> Self {
        self.selection_policy = Box::new(policy);
        self
    }

    /// Sets the expansion policy to use
    pub fn with_expansion_policy<P: ExpansionPolicy<S> + 'static>(mut self, policy: P) -> Self {
        self.expansion_policy = Box::new(policy);
        self
    }

    /// Sets the backpropagation policy to use
    pub fn with_backpropagation_policy<P: BackpropagationPolicy<S> + 'static>(
        mut self,
        policy: P,
    ) -> Self {
        self.backpropagation_policy = Box::new(policy);
        self
    }

    /// Installs a stop flag.
    ///
    /// The flag is checked at the top of every iteration, so a search notices
    /// it at the next iteration boundary and returns its best action so far.
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = Some(flag);
        self
    }

    /// Returns the search parameters
    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Returns the forward model
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Returns the root of the retained tree
    pub fn root(&self) -> Option<&SearchNode<S>> {
        self.root.as_ref()
    }

    /// Returns the statistics of the last search
    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    /// Drops the retained tree
    pub fn reset(&mut self) {
        self.root = None;
        self.advanced = false;
    }

    /// Searches from `state` and returns the best action found.
    ///
    /// If `state` has exactly one legal action it is returned without
    /// searching. A subtree retained by [`advance_root`](Self::advance_root)
    /// seeds the search when tree reuse is on, the same player is to move, the
    /// fingerprints agree and the retained root offers exactly the live
    /// state's legal actions. The tree left by a search that was not followed
    /// by `advance_root` is never reused.
    pub fn choose_action(&mut self, state: &S) -> Result<S::Action> {
        self.params.validate()?;
        self.statistics = SearchStatistics::new();

        if state.is_terminal() {
            return Err(MCTSError::NoLegalActions);
        }
        let mut legal = self.model.legal_actions(state);
        if legal.len() <= 1 {
            self.reset();
            return legal.pop().ok_or(MCTSError::NoLegalActions);
        }

        let started = Instant::now();
        let agent = state.current_player();
        let mut root = self.prepare_root(state, &agent, &legal);

        let outcome = self.run_search(&mut root, &agent);

        self.statistics.total_time = started.elapsed();
        self.statistics.tree_size = root.subtree_size();
        debug!("{}", self.statistics.summary());

        let decision = outcome.and_then(|()| self.best_action(&root));
        self.root = Some(root);
        decision
    }

    /// Runs a narrow search from `state`.
    ///
    /// Used for cheap checks such as whether to activate an optional
    /// sub-decision: zero-scored actions are expanded too and the flexible
    /// budget is skipped. The retained tree is left untouched.
    pub fn choose_action_narrow(&mut self, state: &S) -> Result<S::Action> {
        let narrow = self.params.narrowed();
        let full = std::mem::replace(&mut self.params, narrow);
        let retained = self.root.take();
        let advanced = std::mem::replace(&mut self.advanced, false);

        let result = self.choose_action(state);

        self.params = full;
        self.root = retained;
        self.advanced = advanced;
        result
    }

    /// Keeps the subtree under `action` as the root for the next search.
    ///
    /// Siblings of the chosen child are dropped. Forced moves after it
    /// (nodes with a single legal action) are descended through, as the game
    /// loop plays those without asking. If the descent ends at another
    /// player's decision with several options, their choice cannot be
    /// predicted and the tree is dropped.
    ///
    /// Forward model calls made here are not added to any search's
    /// statistics.
    pub fn advance_root(&mut self, action: &S::Action) -> Result<RootReuse> {
        self.advanced = false;
        let Some(mut old_root) = self.root.take() else {
            return Ok(RootReuse::Fresh);
        };
        let agent = old_root.owning_player.clone();
        let Some(mut next) = old_root.take_child(action) else {
            return Ok(RootReuse::Fresh);
        };
        drop(old_root);

        let mut skipped = 0;
        loop {
            if next.is_terminal() || next.is_leaf() {
                return Ok(RootReuse::Fresh);
            }
            if next.children.len() == 1 {
                if !next.children[0].is_expanded() {
                    self.expand(&mut next, 0)?;
                }
                let forced = next.children[0].action.clone();
                next = match next.take_child(&forced) {
                    Some(child) => child,
                    None => return Ok(RootReuse::Fresh),
                };
                skipped += 1;
                continue;
            }
            if next.owning_player == agent {
                break;
            }
            trace!("dropping tree at an opponent decision for {:?}", next.owning_player);
            return Ok(RootReuse::Fresh);
        }

        next.rebase_depth(0);
        self.root = Some(next);
        self.advanced = true;
        Ok(RootReuse::Retained { skipped })
    }

    /// Returns a visualization of the search tree
    pub fn visualize_tree(&self) -> String {
        let mut result = String::new();
        if let Some(root) = &self.root {
            Self::visualize_node(root, "Root", &mut result);
        }
        result
    }

    /// Helper method to visualize a node and its children
    fn visualize_node(node: &SearchNode<S>, label: &str, output: &mut String) {
        let indent = "  ".repeat(node.depth as usize);
        output.push_str(&format!(
            "{}{} [{:?}] (visits: {}, value: {:.3})\n",
            indent,
            label,
            node.owning_player,
            node.visits(),
            node.mean_value()
        ));

        for slot in &node.children {
            if let Some(child) = slot.node.as_deref() {
                Self::visualize_node(child, &format!("{:?}", slot.action), output);
            }
        }
    }

    /// Takes the retained root if it fits `state`, otherwise builds a new one
    fn prepare_root(&mut self, state: &S, agent: &S::Player, legal: &[S::Action]) -> SearchNode<S> {
        let advanced = std::mem::replace(&mut self.advanced, false);
        if let Some(root) = self.root.take().filter(|_| advanced) {
            let fits = self.params.reuse_tree
                && &root.owning_player == agent
                && !root.is_terminal()
                && root.state.fingerprint() == state.fingerprint()
                && Self::same_actions(&root, legal);
            if fits {
                debug!("reusing retained tree with {} visits", root.visits());
                self.statistics.reused_tree = true;
                return root;
            }
        }

        self.statistics.nodes_created += 1;
        SearchNode::new(state.clone(), 0, &self.model, &*self.action_heuristic)
    }

    /// True if the slots of `root` hold exactly the actions in `legal`
    fn same_actions(root: &SearchNode<S>, legal: &[S::Action]) -> bool {
        let live: HashSet<&S::Action> = legal.iter().collect();
        live.len() == root.children.len()
            && root.children.iter().all(|slot| live.contains(&slot.action))
    }

    fn stop_requested(&self) -> bool {
        self.stop_flag
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }

    /// Iterates until the budget, possibly topped up by the flexible budget,
    /// is exhausted
    fn run_search(&mut self, root: &mut SearchNode<S>, agent: &S::Player) -> Result<()> {
        let mut tracker = BudgetTracker::new(self.params.budget, self.params.break_ms);

        loop {
            if self.stop_requested() {
                debug!("stop flag raised after {} iterations", tracker.iterations());
                self.statistics.stopped_early = true;
                break;
            }

            if tracker.exhausted() {
                let may_extend = self.params.uses_flexible_budget()
                    && self.statistics.budget_extensions < self.params.max_budget_extensions;
                if may_extend && self.incomplete_turn(root) && tracker.top_up() {
                    self.statistics.budget_extensions += 1;
                    debug!(
                        "turn incomplete after {} iterations, extending budget ({}/{})",
                        tracker.iterations(),
                        self.statistics.budget_extensions,
                        self.params.max_budget_extensions
                    );
                    continue;
                }
                break;
            }

            let iteration_started = Instant::now();
            let fm_calls = self.execute_iteration(root, agent)?;
            tracker.record_iteration(iteration_started.elapsed(), fm_calls);

            self.statistics.iterations += 1;
            self.statistics.fm_calls += fm_calls;
        }

        Ok(())
    }

    /// Execute a single iteration; returns the forward model calls it made
    fn execute_iteration(&mut self, root: &mut SearchNode<S>, agent: &S::Player) -> Result<u64> {
        let include_all = self.params.includes_all_actions();
        let max_depth = self.params.max_tree_depth;
        let mut path = NodePath::new();
        let mut fm_calls = 0;

        // 1. Selection and 2. expansion
        let mut node: &mut SearchNode<S> = &mut *root;
        loop {
            if node.is_terminal() || node.is_leaf() || node.depth >= max_depth {
                break;
            }

            if let Some(index) = self.expansion_policy.select_action_to_expand(node, include_all) {
                let expansion = self.expand(node, index)?;
                fm_calls += expansion.fm_calls;
                self.statistics.nodes_created += 1;
                if expansion.turn_stuck {
                    self.statistics.turn_warnings += 1;
                }
                path.push(index);
                node = expansion.node;
                break;
            }

            let depth = node.depth;
            let index =
                self.selection_policy
                    .select_child(node, agent, &self.params, &mut self.rng)?;
            path.push(index);
            node = node
                .child_at_mut(index)
                .ok_or(MCTSError::NoExpandedChildren { depth })?;
        }
        self.statistics.max_depth = self.statistics.max_depth.max(node.depth);

        // 3. Simulation
        let rollout = self.rollout_policy.simulate(
            &node.state,
            &self.model,
            &*self.action_heuristic,
            &*self.state_heuristic,
            agent,
            &mut self.rng,
        )?;
        fm_calls += u64::from(rollout.steps);
        if !rollout.value.is_finite() {
            return Err(MCTSError::NonFiniteValue {
                value: rollout.value,
                depth: node.depth,
            });
        }
        trace!("iteration reached {} with value {:.4}", path, rollout.value);

        // 4. Backpropagation
        let updated = self.backpropagation(root, &path, rollout.value);
        self.statistics.backprop_updates += updated;
        path.clear();

        Ok(fm_calls)
    }

    /// Expansion phase: creates the child for slot `index` of `node`.
    ///
    /// Leaves the statistics alone; callers account for the expansion.
    fn expand<'n>(&self, node: &'n mut SearchNode<S>, index: usize) -> Result<Expansion<'n, S>> {
        let depth = node.depth;
        let action = node
            .children
            .get(index)
            .filter(|slot| !slot.is_expanded())
            .map(|slot| slot.action.clone())
            .ok_or(MCTSError::NoEligibleAction { depth })?;

        let mut next = node.state.clone();
        self.model
            .apply(&mut next, &action)
            .map_err(MCTSError::ForwardModel)?;
        let mut fm_calls = 1;
        let mut turn_stuck = false;

        if action.ends_turn() && !next.is_terminal() && next.current_player() == node.owning_player {
            if self.model.legal_actions(&next).contains(&action) {
                self.model
                    .apply(&mut next, &action)
                    .map_err(MCTSError::ForwardModel)?;
                fm_calls += 1;
            }
            if !next.is_terminal() && next.current_player() == node.owning_player {
                warn!(
                    "{:?} at depth {} left {:?} to move after a retry; continuing",
                    action, depth, node.owning_player
                );
                turn_stuck = true;
            }
        }

        let child = SearchNode::new(next, depth + 1, &self.model, &*self.action_heuristic);

        Ok(Expansion {
            node: node.install_child(index, child),
            fm_calls,
            turn_stuck,
        })
    }

    /// Backpropagation phase: updates the root and every node along `path`.
    ///
    /// Returns the number of nodes updated, which is the depth of the last
    /// node plus one.
    fn backpropagation(&self, root: &mut SearchNode<S>, path: &NodePath, value: f64) -> u64 {
        self.backpropagation_policy.update_stats(root, value);
        let mut updated = 1;

        let mut node = root;
        for &index in &path.indices {
            let Some(child) = node.child_at_mut(index) else {
                break;
            };
            self.backpropagation_policy.update_stats(child, value);
            updated += 1;
            node = child;
        }

        updated
    }

    /// True if greedily following the best mean values from the root runs
    /// out of expanded nodes before another player gets to move.
    ///
    /// This is a heuristic stopping condition: it reads statistics that
    /// later iterations may still change.
    fn incomplete_turn(&self, root: &SearchNode<S>) -> bool {
        let player = &root.owning_player;
        let mut node = root;

        loop {
            if node.is_terminal() || node.is_leaf() || node.depth >= self.params.max_tree_depth {
                return false;
            }

            let greedy = node
                .expanded_children()
                .filter(|(_, child)| child.visits() > 0)
                .max_by(|(_, a), (_, b)| a.mean_value().total_cmp(&b.mean_value()));

            match greedy {
                None => return true,
                Some((_, child)) if &child.owning_player != player => return false,
                Some((_, child)) => node = child,
            }
        }
    }

    /// Picks the visited root child with the highest mean value.
    ///
    /// Means are truncated before comparing; remaining ties are settled by
    /// the action heuristic.
    fn best_action(&self, root: &SearchNode<S>) -> Result<S::Action> {
        let mut best_value = f64::NEG_INFINITY;
        let mut tied: Vec<S::Action> = Vec::new();

        for (index, child) in root.expanded_children() {
            if child.visits() == 0 {
                continue;
            }
            let value = truncate_for_ties(child.mean_value());
            let action = &root.children[index].action;

            if value > best_value {
                best_value = value;
                tied.clear();
                tied.push(action.clone());
            } else if value == best_value {
                tied.push(action.clone());
            }
        }

        match tied.len() {
            0 => Err(MCTSError::NoDecision),
            1 => tied.pop().ok_or(MCTSError::NoDecision),
            _ => {
                debug!("{} root actions tied at {:.6}", tied.len(), best_value);
                self.action_heuristic
                    .choose(&tied, &root.state)
                    .ok_or(MCTSError::NoDecision)
            }
        }
    }
}
