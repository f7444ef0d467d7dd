//! Chess rules for the search, backed by [`shakmaty`]. Board representation,
//! move generation and the detection of game end are all delegated to it.

use anyhow::{bail, Context};
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Color, Move, Outcome, Position};

use crate::environment::{GameResult, GameState, Moves, Player};

/// The game is drawn once this many plies were played without a capture or a
/// pawn move.
const FIFTY_MOVE_RULE_PLIES: u32 = 100;

impl From<Color> for Player {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Self::White,
            Color::Black => Self::Black,
        }
    }
}

impl GameState for Chess {
    type Move = Move;

    fn legal_moves(&self) -> Moves<Move> {
        Position::legal_moves(self).into_iter().collect()
    }

    fn apply(&mut self, action: &Move) {
        self.play_unchecked(action);
    }

    fn side_to_move(&self) -> Player {
        self.turn().into()
    }

    fn result(&self) -> Option<GameResult> {
        match self.outcome() {
            Some(Outcome::Decisive { winner }) => Some(GameResult::won_by(winner.into())),
            Some(Outcome::Draw) => Some(GameResult::Draw),
            None if self.halfmoves() >= FIFTY_MOVE_RULE_PLIES => Some(GameResult::Draw),
            None => None,
        }
    }
}

/// Parses a position in [Forsyth-Edwards Notation].
///
/// [Forsyth-Edwards Notation]: https://www.chessprogramming.org/Forsyth-Edwards_Notation
pub fn from_fen(input: &str) -> anyhow::Result<Chess> {
    let fen: Fen = input
        .trim()
        .parse()
        .with_context(|| format!("invalid FEN: {input}"))?;
    fen.into_position(CastlingMode::Standard)
        .with_context(|| format!("illegal position: {input}"))
}

/// Formats the move in the UCI long algebraic notation, e.g. `e2e4`.
#[must_use]
pub fn to_uci(action: &Move) -> String {
    action.to_uci(CastlingMode::Standard).to_string()
}

/// Finds the legal move of `position` spelled as `uci`.
pub fn parse_uci(position: &Chess, uci: &str) -> anyhow::Result<Move> {
    match Position::legal_moves(position)
        .into_iter()
        .find(|candidate| to_uci(candidate) == uci)
    {
        Some(action) => Ok(action),
        None => bail!("{uci} is not a legal move"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position() {
        let position = Chess::default();
        assert_eq!(GameState::legal_moves(&position).len(), 20);
        assert_eq!(position.side_to_move(), Player::White);
        assert!(!position.is_terminal());
        assert_eq!(position.terminal_reward(), None);
    }

    #[test]
    fn apply_switches_player() {
        let mut position = Chess::default();
        let action = parse_uci(&position, "e2e4").unwrap();
        position.apply(&action);
        assert_eq!(position.side_to_move(), Player::Black);
        assert_eq!(to_uci(&action), "e2e4");
    }

    #[test]
    fn illegal_moves() {
        let position = Chess::default();
        assert!(parse_uci(&position, "e2e5").is_err());
        assert!(parse_uci(&position, "garbage").is_err());
    }

    #[test]
    fn checkmate() {
        // Fool's mate: White is checkmated.
        let position =
            from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
        assert!(GameState::legal_moves(&position).is_empty());
        assert_eq!(position.result(), Some(GameResult::Loss));
        assert_eq!(position.terminal_reward(), Some(-1.0));
    }

    #[test]
    fn stalemate() {
        let position = from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(GameState::legal_moves(&position).is_empty());
        assert_eq!(position.result(), Some(GameResult::Draw));
    }

    #[test]
    fn fifty_move_rule() {
        let position = from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 100 80").unwrap();
        assert!(!GameState::legal_moves(&position).is_empty());
        assert_eq!(position.result(), Some(GameResult::Draw));
    }

    #[test]
    fn invalid_fen() {
        assert!(from_fen("not a position").is_err());
        // No kings.
        assert!(from_fen("8/8/8/8/8/8/8/8 w - - 0 1").is_err());
    }
}
