//! Implementation of [Minimax] algorithm with [Negamax] and [Alpha-Beta
//! pruning] extensions.
//!
//! Both formulations compute the same value. Minimax keeps every leaf score in
//! the perspective of a fixed `color` and alternates between maximizing and
//! minimizing plies; negamax flips `color` together with the sign of the
//! window on every ply and always maximizes.
//!
//! [Minimax]: https://en.wikipedia.org/wiki/Minimax
//! [Negamax]: https://en.wikipedia.org/wiki/Negamax
//! [Alpha-Beta pruning]: https://en.wikipedia.org/wiki/Alpha%E2%80%93beta_pruning

use crate::environment::{GameState, Player};
use crate::evaluation::{EvaluationError, Evaluator, Score};
use crate::search::state::State;
use crate::search::{Depth, SearchError};

/// Static evaluation of the current position from `color`'s perspective.
fn leaf<S, E>(state: &State<S>, color: Player, evaluator: &E) -> Result<Score, EvaluationError>
where
    S: GameState,
    E: Evaluator<S> + ?Sized,
{
    Ok(Score::try_from(evaluator.evaluate(state.last()))?.relative_to(color))
}

pub(super) fn minimax<S, E>(
    state: &mut State<S>,
    depth: Depth,
    mut alpha: Score,
    mut beta: Score,
    maximizing: bool,
    color: Player,
    evaluator: &E,
) -> Result<Score, SearchError>
where
    S: GameState,
    E: Evaluator<S> + ?Sized,
{
    debug_assert!(alpha <= beta);
    if depth == 0 || state.last().is_terminal() {
        return Ok(leaf(state, color, evaluator)?);
    }
    if state.out_of_time() {
        return Err(SearchError::OutOfTime);
    }
    let moves = state.last().legal_moves();
    if moves.is_empty() {
        return Ok(leaf(state, color, evaluator)?);
    }

    let mut best = if maximizing {
        -Score::INFINITY
    } else {
        Score::INFINITY
    };
    for next_move in &moves {
        let value = minimax(
            &mut state.make_move(next_move),
            depth - 1,
            alpha,
            beta,
            !maximizing,
            color,
            evaluator,
        )?;
        if maximizing {
            best = best.max(value);
            alpha = alpha.max(value);
        } else {
            best = best.min(value);
            beta = beta.min(value);
        }
        if beta <= alpha {
            break;
        }
    }
    Ok(best)
}

pub(super) fn negamax<S, E>(
    state: &mut State<S>,
    depth: Depth,
    mut alpha: Score,
    beta: Score,
    color: Player,
    evaluator: &E,
) -> Result<Score, SearchError>
where
    S: GameState,
    E: Evaluator<S> + ?Sized,
{
    debug_assert!(alpha <= beta);
    if depth == 0 || state.last().is_terminal() {
        return Ok(leaf(state, color, evaluator)?);
    }
    if state.out_of_time() {
        return Err(SearchError::OutOfTime);
    }
    let moves = state.last().legal_moves();
    if moves.is_empty() {
        return Ok(leaf(state, color, evaluator)?);
    }

    let mut best = -Score::INFINITY;
    for next_move in &moves {
        let value = -negamax(
            &mut state.make_move(next_move),
            depth - 1,
            -beta,
            -alpha,
            !color,
            evaluator,
        )?;
        best = best.max(value);
        alpha = alpha.max(value);
        if alpha >= beta {
            break;
        }
    }
    Ok(best)
}
