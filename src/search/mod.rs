//! [Search] is a "dynamic" position evaluation. It uses the rules of the game to
//! look ahead into possible continuations and combines the static evaluation
//! of the positions it reaches into a final score of every move at the root.
//!
//! Two independent engines are provided:
//!
//! - [`AlphaBetaSearcher`]: depth-limited minimax search in either the
//!   [`Variant::Minimax`] or the [`Variant::Negamax`] formulation, with
//!   alpha-beta pruning.
//! - [`mcts::Mcts`]: Monte Carlo Tree Search with UCB1 selection and random
//!   playouts.
//!
//! [Search]: https://www.chessprogramming.org/Search

use std::fmt;
use std::ops::Neg;
use std::str::FromStr;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

use crate::environment::{GameState, Player};
use crate::evaluation::{EvaluationError, Evaluator, Score};

pub mod mcts;
mod minimax;
pub mod random;
mod state;

use state::State;

/// Search depth in plies.
pub type Depth = u8;

/// Deepest search supported. The positions on the current search path are
/// kept in a fixed-size stack of this many plies.
pub const MAX_DEPTH: Depth = 64;

/// Adding reserve time to ensure that the engine does not exceed the time
/// limit.
pub(crate) const RESERVE: Duration = Duration::from_millis(100);

/// Errors that stop the search.
#[derive(Debug, Error, PartialEq)]
pub enum SearchError {
    /// Search was started with parameters that can not be satisfied.
    #[error("invalid search configuration: {0}")]
    Configuration(String),
    /// Evaluator produced an invalid score for one of the searched positions.
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    /// The tree has no children at the root: either no iterations were run or
    /// the root position is already terminal.
    #[error("no move available: search tree has no children at the root")]
    EmptyTree,
    /// Time budget ran out in the middle of an iteration.
    /// [`AlphaBetaSearcher::iterative_deepening`] recovers from it by
    /// returning the previous iteration.
    #[error("search ran out of time")]
    OutOfTime,
}

/// Formulation of the depth-limited search. Both produce the same value and
/// the same move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    /// Alternates maximizing and minimizing plies, scores stay in the root
    /// player's perspective.
    Minimax,
    /// Always maximizes from the perspective of the player to move, negating
    /// the scores and the window between plies.
    Negamax,
}

impl FromStr for Variant {
    type Err = SearchError;

    fn from_str(variant: &str) -> Result<Self, Self::Err> {
        match variant.trim().to_ascii_lowercase().as_str() {
            "minimax" | "mini" => Ok(Self::Minimax),
            "negamax" | "nega" => Ok(Self::Negamax),
            _ => Err(SearchError::Configuration(format!(
                "unknown search variant '{variant}', expected 'minimax' or 'negamax'"
            ))),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Minimax => "minimax",
            Self::Negamax => "negamax",
        })
    }
}

/// Outcome of the search at the root.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult<M> {
    /// Move with the greatest score for the player to move. `None` if the root
    /// position is terminal or has no legal moves.
    pub best_move: Option<M>,
    /// Score of [`SearchResult::best_move`] from the perspective of the player
    /// to move at the root. Static evaluation of the root if there is no move.
    pub score: Score,
    /// Depth of the completed search.
    pub depth: Depth,
    /// Number of positions visited by the search.
    pub nodes: u64,
}

/// Constraints for [`AlphaBetaSearcher::iterative_deepening`]. At least one of
/// them has to be set.
#[derive(Clone, Copy, Debug, Default)]
pub struct Limiter {
    /// Maximum depth in plies.
    pub depth: Option<Depth>,
    /// Time budget. The search does not start a new iteration once the budget
    /// is (almost) exhausted and abandons an iteration that would exceed it.
    /// The first iteration always completes.
    pub time: Option<Duration>,
}

fn too_deep(depth: Depth) -> SearchError {
    SearchError::Configuration(format!(
        "search depth should be at most {MAX_DEPTH}, got {depth}"
    ))
}

fn validate_depth(depth: Depth) -> Result<(), SearchError> {
    match depth {
        0 => Err(SearchError::Configuration(
            "search depth should be positive".to_string(),
        )),
        depth if depth > MAX_DEPTH => Err(too_deep(depth)),
        _ => Ok(()),
    }
}

/// Depth-limited adversarial search with alpha-beta pruning.
///
/// The evaluator is injected on construction and the searcher does not keep
/// any state between calls besides the total number of searched nodes.
#[derive(Debug)]
pub struct AlphaBetaSearcher<E> {
    evaluator: E,
    searched_nodes: u64,
}

impl<E> AlphaBetaSearcher<E> {
    /// Creates a searcher using `evaluator` to score the leaves.
    #[must_use]
    pub const fn new(evaluator: E) -> Self {
        Self {
            evaluator,
            searched_nodes: 0,
        }
    }

    /// Total number of positions visited by all searches of this searcher.
    #[must_use]
    pub const fn searched_nodes(&self) -> u64 {
        self.searched_nodes
    }

    /// Finds the move with the greatest score for the player to move, looking
    /// `max_depth` plies ahead.
    ///
    /// Moves are explored in [`GameState::legal_moves`] order and a later move
    /// only replaces the current best if its score is strictly greater, so the
    /// earliest of equally good moves is returned. A terminal position or one
    /// without legal moves yields [`SearchResult::best_move`] `None`.
    ///
    /// # Errors
    ///
    /// [`SearchError::Configuration`] if `max_depth` is zero or exceeds
    /// [`MAX_DEPTH`] and [`SearchError::Evaluation`] if the evaluator returns
    /// an invalid score anywhere in the tree.
    pub fn best_move<S>(
        &mut self,
        root: &S,
        max_depth: Depth,
        variant: Variant,
    ) -> Result<SearchResult<S::Move>, SearchError>
    where
        S: GameState,
        E: Evaluator<S>,
    {
        validate_depth(max_depth)?;
        self.search_root(root, max_depth, variant, false, None)
    }

    /// Same as [`AlphaBetaSearcher::best_move`], but an invalid evaluation
    /// does not discard the moves that were already searched: if a root move
    /// has been fully searched before the failing one, the best of them is
    /// returned and the failure is logged.
    ///
    /// # Errors
    ///
    /// Same as [`AlphaBetaSearcher::best_move`] if the failure happens while
    /// searching the first root move.
    pub fn best_move_with_fallback<S>(
        &mut self,
        root: &S,
        max_depth: Depth,
        variant: Variant,
    ) -> Result<SearchResult<S::Move>, SearchError>
    where
        S: GameState,
        E: Evaluator<S>,
    {
        validate_depth(max_depth)?;
        self.search_root(root, max_depth, variant, true, None)
    }

    /// Runs [`AlphaBetaSearcher::best_move`] with increasing depth until one of
    /// the `limiter` constraints is hit and returns the deepest result.
    ///
    /// If a deeper iteration fails to evaluate a position, the result of the
    /// previous iteration is returned and the failure is logged. The same
    /// happens when an iteration runs past the time limit.
    ///
    /// # Errors
    ///
    /// [`SearchError::Configuration`] if `limiter` sets neither depth nor
    /// time or sets an invalid depth. [`SearchError::Evaluation`] if the very
    /// first iteration fails.
    pub fn iterative_deepening<S>(
        &mut self,
        root: &S,
        variant: Variant,
        limiter: &Limiter,
    ) -> Result<SearchResult<S::Move>, SearchError>
    where
        S: GameState,
        E: Evaluator<S>,
    {
        let max_depth = match (limiter.depth, limiter.time) {
            (Some(depth), _) => {
                validate_depth(depth)?;
                depth
            },
            (None, Some(_)) => MAX_DEPTH,
            (None, None) => {
                return Err(SearchError::Configuration(
                    "iterative deepening needs a depth or a time limit".to_string(),
                ))
            },
        };

        let timer = Instant::now();
        let mut result: Option<SearchResult<S::Move>> = None;

        // The first iteration runs without a deadline so that there is always
        // a result to return.
        let deadline = limiter
            .time
            .map(|time_limit| timer + time_limit.saturating_sub(RESERVE));

        for depth in 1..=max_depth {
            let deadline = if depth == 1 { None } else { deadline };
            let iteration = match self.search_root(root, depth, variant, false, deadline) {
                Ok(iteration) => iteration,
                Err(SearchError::OutOfTime) => match result {
                    Some(previous) => {
                        debug!(
                            depth,
                            elapsed = ?timer.elapsed(),
                            "iteration abandoned, out of time"
                        );
                        return Ok(previous);
                    },
                    None => return Err(SearchError::OutOfTime),
                },
                Err(error) => match result {
                    Some(previous) => {
                        warn!(
                            %error,
                            depth = previous.depth,
                            "search failed, falling back to the previous iteration"
                        );
                        return Ok(previous);
                    },
                    None => return Err(error),
                },
            };
            debug!(
                depth,
                score = %iteration.score,
                nodes = iteration.nodes,
                elapsed = ?timer.elapsed(),
                "completed iteration"
            );
            let no_moves = iteration.best_move.is_none();
            result = Some(iteration);

            if no_moves {
                break;
            }
            if let Some(time_limit) = limiter.time {
                if timer.elapsed() + RESERVE >= time_limit {
                    break;
                }
            }
        }

        // The loop runs at least once because `max_depth` is positive.
        result.ok_or(SearchError::EmptyTree)
    }

    /// Value of `position` searched `depth` plies deep with the minimax
    /// formulation. Leaf scores are taken from `color`'s perspective at every
    /// ply; `maximizing` tells whether the player to move at `position` picks
    /// the greatest or the smallest value.
    ///
    /// # Errors
    ///
    /// [`SearchError::Configuration`] if `depth` exceeds [`MAX_DEPTH`] and
    /// [`SearchError::Evaluation`] if the evaluator returns an invalid score.
    ///
    /// # Panics
    ///
    /// Panics if `alpha > beta`.
    pub fn minimax<S>(
        &mut self,
        position: &S,
        depth: Depth,
        alpha: Score,
        beta: Score,
        maximizing: bool,
        color: Player,
    ) -> Result<Score, SearchError>
    where
        S: GameState,
        E: Evaluator<S>,
    {
        assert!(alpha <= beta, "empty search window: {alpha} > {beta}");
        if depth > MAX_DEPTH {
            return Err(too_deep(depth));
        }
        let mut state = State::new(position.clone());
        let value = minimax::minimax(
            &mut state,
            depth,
            alpha,
            beta,
            maximizing,
            color,
            &self.evaluator,
        );
        self.searched_nodes += state.searched_nodes();
        value
    }

    /// Value of `position` searched `depth` plies deep with the negamax
    /// formulation. The value is in the perspective of `color`, which should
    /// be the player to move at `position`.
    ///
    /// # Errors
    ///
    /// [`SearchError::Configuration`] if `depth` exceeds [`MAX_DEPTH`] and
    /// [`SearchError::Evaluation`] if the evaluator returns an invalid score.
    ///
    /// # Panics
    ///
    /// Panics if `alpha > beta`.
    pub fn negamax<S>(
        &mut self,
        position: &S,
        depth: Depth,
        alpha: Score,
        beta: Score,
        color: Player,
    ) -> Result<Score, SearchError>
    where
        S: GameState,
        E: Evaluator<S>,
    {
        assert!(alpha <= beta, "empty search window: {alpha} > {beta}");
        if depth > MAX_DEPTH {
            return Err(too_deep(depth));
        }
        let mut state = State::new(position.clone());
        let value = minimax::negamax(&mut state, depth, alpha, beta, color, &self.evaluator);
        self.searched_nodes += state.searched_nodes();
        value
    }

    fn search_root<S>(
        &mut self,
        root: &S,
        max_depth: Depth,
        variant: Variant,
        fallback: bool,
        deadline: Option<Instant>,
    ) -> Result<SearchResult<S::Move>, SearchError>
    where
        S: GameState,
        E: Evaluator<S>,
    {
        let color = root.side_to_move();
        let mut state = State::with_deadline(root.clone(), deadline);
        let moves = root.legal_moves();

        // A finished game (e.g. drawn by the fifty-move rule) may still have
        // legal moves, none of which can be played.
        if root.is_terminal() || moves.is_empty() {
            let score = Score::try_from(self.evaluator.evaluate(root))?.relative_to(color);
            self.searched_nodes += state.searched_nodes();
            return Ok(SearchResult {
                best_move: None,
                score,
                depth: max_depth,
                nodes: state.searched_nodes(),
            });
        }

        let mut alpha = -Score::INFINITY;
        let beta = Score::INFINITY;
        let mut best_move = None;
        let mut best_value = -Score::INFINITY;

        for next_move in moves {
            let value = {
                let mut child = state.make_move(&next_move);
                match variant {
                    Variant::Minimax => minimax::minimax(
                        &mut child,
                        max_depth - 1,
                        alpha,
                        beta,
                        false,
                        color,
                        &self.evaluator,
                    ),
                    Variant::Negamax => minimax::negamax(
                        &mut child,
                        max_depth - 1,
                        -beta,
                        -alpha,
                        !color,
                        &self.evaluator,
                    )
                    .map(Neg::neg),
                }
            };
            let value = match value {
                Ok(value) => value,
                Err(error) if fallback && best_move.is_some() => {
                    warn!(
                        %error,
                        failed_move = ?next_move,
                        fallback_move = ?best_move,
                        "evaluation failed, falling back to the best move searched so far"
                    );
                    break;
                },
                Err(error) => {
                    self.searched_nodes += state.searched_nodes();
                    return Err(error);
                },
            };
            // Ties keep the earliest move.
            if value > best_value {
                best_value = value;
                best_move = Some(next_move);
                alpha = alpha.max(value);
            }
        }

        self.searched_nodes += state.searched_nodes();
        Ok(SearchResult {
            best_move,
            score: best_value,
            depth: max_depth,
            nodes: state.searched_nodes(),
        })
    }
}
