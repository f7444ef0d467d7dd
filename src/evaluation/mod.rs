//! This module implements "static" [evaluation], i.e. predicting the relative
//! value/score of given position without [`crate::search`].
//!
//! The search only needs a number from an [`Evaluator`]: whether it comes
//! from counting material, a learned model or the game result is decided by
//! the caller when constructing the searcher.
//!
//! [evaluation]: https://www.chessprogramming.org/Evaluation

use thiserror::Error;

pub mod material;
mod score;

pub use score::Score;

/// Static evaluation of a position. Positive values favor White (the first
/// player) regardless of whose turn it is.
///
/// Implementations must be total and deterministic: the search rejects
/// non-finite values instead of guessing what they were supposed to mean.
pub trait Evaluator<S> {
    /// Scores `state` from White's perspective.
    fn evaluate(&self, state: &S) -> f64;
}

impl<S, F> Evaluator<S> for F
where
    F: Fn(&S) -> f64,
{
    fn evaluate(&self, state: &S) -> f64 {
        self(state)
    }
}

/// Evaluator produced something that is not a score.
#[derive(Debug, Clone, Copy, Error, PartialEq)]
#[error("evaluator returned a non-finite score: {value}")]
pub struct EvaluationError {
    /// The rejected value.
    pub value: f64,
}
