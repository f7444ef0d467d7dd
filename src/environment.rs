//! Interface between the search and the rules of the game. The search never
//! looks inside the position: it only enumerates moves, applies them and asks
//! whether the game is over.

use std::fmt;
use std::ops::Not;

use anyhow::bail;
use arrayvec::ArrayVec;

/// Upper bound on the number of legal moves in a single position. The known
/// maximum for a legal chess position is 218.
pub const MAX_MOVES: usize = 256;

/// Legal moves of a position in the order they are generated. The order
/// defines tie-breaking: the search prefers the earliest of equally good moves.
pub type Moves<M> = ArrayVec<M, MAX_MOVES>;

/// A standard game of chess is played between two players: White (having the
/// advantage of the first turn) and Black.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Player {
    White,
    Black,
}

impl Player {
    /// `+1` for White and `-1` for Black: multiplying a White-relative score by
    /// the sign gives the score from the player's perspective.
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::White => 1.0,
            Self::Black => -1.0,
        }
    }
}

impl Not for Player {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

impl TryFrom<&str> for Player {
    type Error = anyhow::Error;

    fn try_from(color: &str) -> anyhow::Result<Self> {
        match color {
            "w" => Ok(Self::White),
            "b" => Ok(Self::Black),
            _ => bail!("color should be 'w' or 'b', got '{color}'"),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match &self {
                Self::White => 'w',
                Self::Black => 'b',
            }
        )
    }
}

/// Result of a finished game from the perspective of the first player
/// (White).
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Win,
    Draw,
    Loss,
}

impl GameResult {
    /// Numeric reward used by playouts: `1` for a win, `0` for a draw and `-1`
    /// for a loss.
    #[must_use]
    pub const fn reward(self) -> f64 {
        match self {
            Self::Win => 1.0,
            Self::Draw => 0.0,
            Self::Loss => -1.0,
        }
    }

    /// The result for the game won by `winner`.
    #[must_use]
    pub const fn won_by(winner: Player) -> Self {
        match winner {
            Player::White => Self::Win,
            Player::Black => Self::Loss,
        }
    }
}

/// Position of a two-player zero-sum game with perfect information.
///
/// Snapshots are cheap to clone and are never shared between search branches:
/// the search clones the parent, applies the move to the clone and drops the
/// clone when the branch is abandoned, which restores the parent exactly.
pub trait GameState: Clone {
    /// A legal action. Equality is enough to map a move back to the transition
    /// it came from.
    type Move: Clone + PartialEq + fmt::Debug;

    /// Legal moves in a deterministic order. Empty if and only if the player to
    /// move has no legal action.
    fn legal_moves(&self) -> Moves<Self::Move>;

    /// Plays `action`, which must be one of [`GameState::legal_moves`].
    fn apply(&mut self, action: &Self::Move);

    /// The player who makes the next move.
    fn side_to_move(&self) -> Player;

    /// `Some` once no further play is possible. A game can be over while
    /// legal moves remain, e.g. when it is drawn by rule.
    fn result(&self) -> Option<GameResult>;

    /// Returns `true` if no further play is possible.
    fn is_terminal(&self) -> bool {
        self.result().is_some()
    }

    /// Reward of a finished game from White's perspective, `None` while the
    /// game is still in progress.
    fn terminal_reward(&self) -> Option<f64> {
        self.result().map(GameResult::reward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn players() {
        assert_eq!(!Player::White, Player::Black);
        assert_eq!(!Player::Black, Player::White);
        assert_eq!(Player::try_from("w").unwrap(), Player::White);
        assert_eq!(Player::try_from("b").unwrap(), Player::Black);
        assert!(Player::try_from("x").is_err());
        assert_eq!(Player::Black.to_string(), "b");
        assert!(Player::White.sign() > 0.0);
        assert!(Player::Black.sign() < 0.0);
    }

    #[test]
    fn rewards() {
        assert_eq!(GameResult::won_by(Player::White), GameResult::Win);
        assert_eq!(GameResult::won_by(Player::Black), GameResult::Loss);
        assert!(GameResult::Win.reward() > GameResult::Draw.reward());
        assert!(GameResult::Draw.reward() > GameResult::Loss.reward());
    }
}
