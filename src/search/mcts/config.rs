//! Parameters of the Monte Carlo Tree Search.

use crate::search::SearchError;

/// Configuration of [`crate::search::mcts::Mcts`].
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Exploration constant `c` of UCB1: `W / N + c * sqrt(ln(N_parent) / N)`.
    /// `sqrt(2)` gives the textbook `sqrt(2 * ln(N_parent) / N)` term.
    pub exploration: f64,
    /// Upper bound on the number of nodes in the tree. Once expanding a leaf
    /// would exceed it, leaves are simulated in place instead.
    pub max_nodes: usize,
    /// Playouts that do not reach a terminal position after this many plies
    /// are scored as a draw. Has to be positive.
    pub max_rollout_plies: usize,
    /// Seed of the playout random number generator.
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exploration: std::f64::consts::SQRT_2,
            max_nodes: 1_000_000,
            max_rollout_plies: 2048,
            seed: 0,
        }
    }
}

impl Config {
    /// Checks that the search can run with this configuration.
    ///
    /// # Errors
    ///
    /// [`SearchError::Configuration`] if the exploration constant is not a
    /// positive number, the node limit is zero or does not fit node ids, or
    /// rollouts are limited to zero plies.
    pub fn validate(&self) -> Result<(), SearchError> {
        if !self.exploration.is_finite() || self.exploration <= 0.0 {
            return Err(SearchError::Configuration(format!(
                "exploration constant should be positive, got {}",
                self.exploration
            )));
        }
        if self.max_nodes == 0 {
            return Err(SearchError::Configuration(
                "tree should be allowed to hold at least the root".to_string(),
            ));
        }
        if u32::try_from(self.max_nodes).is_err() {
            return Err(SearchError::Configuration(format!(
                "tree can hold at most {} nodes, got {}",
                u32::MAX,
                self.max_nodes
            )));
        }
        if self.max_rollout_plies == 0 {
            return Err(SearchError::Configuration(
                "rollouts should be allowed at least one ply".to_string(),
            ));
        }
        Ok(())
    }
}
