//! Provides a very basic implementation of evaluation based on material
//! advantage using "[standard piece valuations]".
//!
//! While not very useful in practice, this evaluation function is great for
//! testing search and other infrastructure, because it is stable (will not
//! change because of the fixed piece "values"), easy to understand and
//! deterministic.
//!
//! [standard piece valuations]: https://en.wikipedia.org/wiki/Chess_piece_relative_value

use shakmaty::{Board, Chess, Color, Position, Role};

use crate::environment::{GameResult, GameState};
use crate::evaluation::Evaluator;

const PAWN_VALUE: f64 = 100.0;
const KNIGHT_VALUE: f64 = 300.0;
const BISHOP_VALUE: f64 = 300.0;
const ROOK_VALUE: f64 = 500.0;
const QUEEN_VALUE: f64 = 900.0;

/// Score of a checkmate. Exceeds any material balance.
pub const WIN: f64 = 32_000.0;

/// Counts material of both sides in centipawns. Finished games are scored by
/// their result instead: checkmate is worth [`WIN`] and draws are worth 0.
#[derive(Clone, Copy, Debug, Default)]
pub struct Material;

fn piece_value(board: &Board, color: Color) -> f64 {
    [
        (Role::Pawn, PAWN_VALUE),
        (Role::Knight, KNIGHT_VALUE),
        (Role::Bishop, BISHOP_VALUE),
        (Role::Rook, ROOK_VALUE),
        (Role::Queen, QUEEN_VALUE),
    ]
    .into_iter()
    .map(|(role, value)| {
        let count = (board.by_color(color) & board.by_role(role)).count();
        value * f64::from(u32::try_from(count).unwrap_or(u32::MAX))
    })
    .sum()
}

/// White's material minus Black's material.
#[must_use]
pub fn material_advantage(position: &Chess) -> f64 {
    piece_value(position.board(), Color::White) - piece_value(position.board(), Color::Black)
}

impl Evaluator<Chess> for Material {
    fn evaluate(&self, state: &Chess) -> f64 {
        match state.result() {
            Some(GameResult::Win) => WIN,
            Some(GameResult::Loss) => -WIN,
            Some(GameResult::Draw) => 0.0,
            None => material_advantage(state),
        }
    }
}
