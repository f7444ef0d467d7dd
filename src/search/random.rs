//! Uniformly random play: the baseline opponent and the playout policy of
//! [`crate::search::mcts`].

use rand::seq::SliceRandom;
use rand::Rng;

use crate::environment::GameState;

/// Picks one of the legal moves uniformly at random, `None` if the game is
/// over or there are no legal moves.
pub fn random_move<S: GameState>(state: &S, rng: &mut impl Rng) -> Option<S::Move> {
    if state.is_terminal() {
        return None;
    }
    state.legal_moves().choose(rng).cloned()
}

/// Plays random moves from `state` until the game ends and returns the reward
/// from White's perspective.
///
/// Games that do not finish within `max_plies` are scored as a draw, as are
/// positions that are not terminal but have no legal moves.
pub fn playout<S: GameState>(state: &S, max_plies: usize, rng: &mut impl Rng) -> f64 {
    let mut position = state.clone();
    for _ in 0..max_plies {
        if let Some(reward) = position.terminal_reward() {
            return reward;
        }
        match random_move(&position, rng) {
            Some(next_move) => position.apply(&next_move),
            None => return 0.0,
        }
    }
    position.terminal_reward().unwrap_or(0.0)
}
