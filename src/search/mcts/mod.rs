//! Implements [Monte Carlo Tree Search] (MCTS) algorithm.
//!
//! Every iteration goes through four steps:
//!
//! 1. Selection: starting at the root, descend into the child with the
//!    greatest [UCB1] score until reaching a node without children.
//! 2. Expansion: unless the game is over in that node, create a child for
//!    every legal move and pick the first of them.
//! 3. Simulation: play random moves from the picked node until the game ends.
//! 4. Backpropagation: update the visit counts and the accumulated rewards of
//!    the nodes on the path from the picked node to the root.
//!
//! The answer is the move leading to the most visited child of the root
//! ("robust child"), which is less sensitive to noisy playouts than the one
//! with the greatest average reward.
//!
//! Expansion is full-width: one expansion adds a node for each legal move, so
//! the tree grows by the branching factor of the game rather than by one node
//! per iteration. [`Config::max_nodes`] caps the growth.
//!
//! [Monte Carlo Tree Search]: https://en.wikipedia.org/wiki/Monte_Carlo_tree_search
//! [UCB1]: https://www.chessprogramming.org/UCT

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{debug, trace, warn};

use crate::environment::GameState;
use crate::search::random::playout;
use crate::search::SearchError;

mod config;
mod tree;

pub use config::Config;
pub use tree::{Node, NodeFlags, NodeId, Tree};

/// Search tree together with the playout policy. The tree lives as long as the
/// searcher and only grows: nodes are never removed.
#[derive(Debug)]
pub struct Mcts<S: GameState> {
    tree: Tree<S>,
    config: Config,
    rng: ChaCha20Rng,
    node_limit_reached: bool,
}

impl<S: GameState> Mcts<S> {
    /// Creates a tree containing only `root`.
    ///
    /// # Errors
    ///
    /// [`SearchError::Configuration`] if `config` is invalid.
    pub fn new(root: S, config: Config) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            tree: Tree::new(root),
            rng: ChaCha20Rng::seed_from_u64(config.seed),
            config,
            node_limit_reached: false,
        })
    }

    /// Runs `iterations` rounds of selection, expansion, simulation and
    /// backpropagation. Does nothing if the game is already over at the root.
    ///
    /// # Errors
    ///
    /// [`SearchError::Configuration`] if `iterations` is zero.
    pub fn run(&mut self, iterations: u32) -> Result<(), SearchError> {
        if iterations == 0 {
            return Err(SearchError::Configuration(
                "number of iterations should be positive".to_string(),
            ));
        }
        if self.tree.get(self.tree.root()).is_terminal() {
            debug!("root position is terminal, nothing to search");
            return Ok(());
        }
        self.node_limit_reached = false;
        for _ in 0..iterations {
            self.iterate();
        }
        debug!(
            iterations,
            nodes = self.tree.len(),
            root_visits = self.root_visits(),
            "finished MCTS run"
        );
        Ok(())
    }

    /// The move leading to the most visited child of the root. Ties are
    /// resolved in favor of the earliest legal move.
    ///
    /// # Errors
    ///
    /// [`SearchError::EmptyTree`] if the root has no children: no iterations
    /// were run or the game is over at the root.
    pub fn best_move(&self) -> Result<S::Move, SearchError> {
        self.tree
            .most_visited_child(self.tree.root())
            .and_then(|child| self.tree.get(child).action().cloned())
            .ok_or(SearchError::EmptyTree)
    }

    /// Number of completed iterations that reached the root.
    #[must_use]
    pub fn root_visits(&self) -> u32 {
        self.tree.get(self.tree.root()).visits()
    }

    /// The search tree built so far.
    #[must_use]
    pub const fn tree(&self) -> &Tree<S> {
        &self.tree
    }

    fn iterate(&mut self) {
        let leaf = self.select();
        let node = self.expand(leaf);
        let reward = playout(
            self.tree.get(node).state(),
            self.config.max_rollout_plies,
            &mut self.rng,
        );
        self.tree.backpropagate(node, reward);
    }

    fn select(&self) -> NodeId {
        let mut current = self.tree.root();
        while let Some(child) = self.tree.select_child(current, self.config.exploration) {
            current = child;
        }
        current
    }

    /// Expands `leaf` and returns the child to simulate from. Returns `leaf`
    /// itself if it can not be expanded.
    fn expand(&mut self, leaf: NodeId) -> NodeId {
        let node = self.tree.get(leaf);
        if node.is_terminal() {
            return leaf;
        }
        let moves = node.state().legal_moves();
        if moves.is_empty() {
            return leaf;
        }
        if self.tree.len() + moves.len() > self.config.max_nodes {
            if !self.node_limit_reached {
                warn!(
                    nodes = self.tree.len(),
                    max_nodes = self.config.max_nodes,
                    "node limit reached, simulating leaves without expanding them"
                );
                self.node_limit_reached = true;
            }
            return leaf;
        }
        let children = moves.len();
        self.tree.expand(leaf, moves);
        trace!(children, nodes = self.tree.len(), "expanded node");
        // All children are unvisited: this is the first one.
        self.tree
            .select_child(leaf, self.config.exploration)
            .unwrap_or(leaf)
    }
}
