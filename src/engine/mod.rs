//! The engine puts all pieces together. It implements a subset of the
//! [Universal Chess Interface] (UCI) for communication with the client (e.g.
//! tournament runner with other engines or GUI).
//!
//! [`Engine::uci_loop`] is the "main loop" of the engine which communicates
//! with the environment and executes commands from the input stream. The
//! search is synchronous: `go` returns only after `bestmove` is written, so
//! `stop` has nothing to interrupt.
//!
//! [Universal Chess Interface]: https://www.chessprogramming.org/UCI

use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;
use std::time::{Duration, Instant};

use itertools::Itertools;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use shakmaty::Chess;
use tracing::debug;

use crate::chess::{from_fen, parse_uci, to_uci};
use crate::engine::uci::{Command, EngineOption, OptionValue};
use crate::environment::GameState;
use crate::evaluation::material::Material;
use crate::search::mcts::{self, Mcts};
use crate::search::random::random_move;
use crate::search::{AlphaBetaSearcher, Depth, Limiter, SearchError, Variant, RESERVE};

mod uci;

/// Depth of the alpha-beta search when `go` sets neither depth nor time.
const DEFAULT_DEPTH: Depth = 4;

/// MCTS iterations when `go` does not set `nodes`.
const DEFAULT_ITERATIONS: u32 = 1000;

/// MCTS iterations between two checks of the time budget.
const ITERATIONS_BATCH: u32 = 100;

/// Values of the `Search` option.
const ALGORITHMS: [&str; 4] = ["minimax", "negamax", "mcts", "random"];

/// Way of picking the move in response to `go`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Algorithm {
    AlphaBeta(Variant),
    Mcts,
    Random,
}

impl FromStr for Algorithm {
    type Err = SearchError;

    fn from_str(algorithm: &str) -> Result<Self, Self::Err> {
        match algorithm.trim().to_ascii_lowercase().as_str() {
            "mcts" => Ok(Self::Mcts),
            "random" => Ok(Self::Random),
            _ => algorithm.parse().map(Self::AlphaBeta),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlphaBeta(variant) => write!(f, "{variant}"),
            Self::Mcts => f.write_str("mcts"),
            Self::Random => f.write_str("random"),
        }
    }
}

/// The Engine connects everything together: handles commands sent by the UCI
/// server, including I/O.
pub struct Engine<'a, R: BufRead, W: Write> {
    position: Chess,
    algorithm: Algorithm,
    iterations: u32,
    seed: u64,
    rng: ChaCha20Rng,
    input: &'a mut R,
    output: &'a mut W,
}

impl<'a, R: BufRead, W: Write> Engine<'a, R, W> {
    /// Creates a new instance of the engine with starting position and provided
    /// I/O. Negamax is the default search algorithm.
    #[must_use]
    pub fn new(input: &'a mut R, output: &'a mut W) -> Self {
        Self {
            position: Chess::default(),
            algorithm: Algorithm::AlphaBeta(Variant::Negamax),
            iterations: DEFAULT_ITERATIONS,
            seed: 0,
            rng: ChaCha20Rng::seed_from_u64(0),
            input,
            output,
        }
    }

    /// Continuously reads the input stream and executes sent UCI commands until
    /// "quit" is sent or the input is closed.
    ///
    /// Invalid commands do not stop the loop: they are reported to the client
    /// as `info string` lines and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the input or writing the output fails.
    pub fn uci_loop(&mut self) -> anyhow::Result<()> {
        loop {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }
            match Command::parse(&line) {
                Command::Uci => self.handle_uci()?,
                Command::IsReady => self.handle_isready()?,
                Command::SetOption { option, value } => self.handle_setoption(option, value)?,
                Command::SetPosition { fen, moves } => {
                    self.handle_position(fen.as_deref(), &moves)?;
                },
                Command::NewGame => self.handle_ucinewgame(),
                Command::Go {
                    depth,
                    nodes,
                    movetime,
                } => self.handle_go(depth, nodes, movetime.map(Duration::from_millis))?,
                Command::Stop => {},
                Command::Quit => break,
                Command::Unknown(command) if command.is_empty() => {},
                Command::Unknown(command) => {
                    writeln!(self.output, "info string Unsupported command: {command}")?;
                },
            }
            self.output.flush()?;
        }
        Ok(())
    }

    /// Responds to the `uci` handshake command by identifying the engine and
    /// listing the options it supports.
    fn handle_uci(&mut self) -> anyhow::Result<()> {
        writeln!(
            self.output,
            "id name {} {}",
            env!("CARGO_PKG_NAME"),
            crate::engine_version()
        )?;
        writeln!(self.output, "id author {}", env!("CARGO_PKG_AUTHORS"))?;
        writeln!(
            self.output,
            "option name Search type combo default {} {}",
            Algorithm::AlphaBeta(Variant::Negamax),
            ALGORITHMS.iter().map(|name| format!("var {name}")).join(" ")
        )?;
        writeln!(
            self.output,
            "option name Iterations type spin default {DEFAULT_ITERATIONS} min 1 max {}",
            u32::MAX
        )?;
        writeln!(self.output, "option name Seed type string default 0")?;
        writeln!(self.output, "uciok")?;
        Ok(())
    }

    /// Syncs with the UCI server by responding with `readyok`.
    fn handle_isready(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "readyok")?;
        Ok(())
    }

    fn handle_setoption(&mut self, option: EngineOption, value: OptionValue) -> anyhow::Result<()> {
        match (option, value) {
            (EngineOption::Search, OptionValue::String(value)) => match value.parse() {
                Ok(algorithm) => self.algorithm = algorithm,
                Err(error) => writeln!(self.output, "info string {error}")?,
            },
            (EngineOption::Iterations, OptionValue::Integer(value)) => {
                match u32::try_from(value) {
                    Ok(iterations) if iterations > 0 => self.iterations = iterations,
                    _ => writeln!(
                        self.output,
                        "info string Iterations should be in 1..={}, got {value}",
                        u32::MAX
                    )?,
                }
            },
            (EngineOption::Seed, OptionValue::Integer(value)) => {
                self.seed = value;
                self.rng = ChaCha20Rng::seed_from_u64(value);
            },
            (option, value) => {
                writeln!(self.output, "info string Invalid value {value:?} for {option:?}")?;
            },
        }
        debug!(
            algorithm = %self.algorithm,
            iterations = self.iterations,
            seed = self.seed,
            "updated engine options"
        );
        Ok(())
    }

    fn handle_ucinewgame(&mut self) {
        self.position = Chess::default();
        self.rng = ChaCha20Rng::seed_from_u64(self.seed);
    }

    /// Changes the position of the board to the one specified in the command.
    /// On an invalid FEN the previous position is kept; on an illegal move the
    /// moves before it are applied.
    fn handle_position(&mut self, fen: Option<&str>, moves: &[String]) -> anyhow::Result<()> {
        let mut position = match fen {
            None => Chess::default(),
            Some(fen) => match from_fen(fen) {
                Ok(position) => position,
                Err(error) => {
                    writeln!(self.output, "info string {error:#}")?;
                    return Ok(());
                },
            },
        };
        for next_move in moves {
            match parse_uci(&position, next_move) {
                Ok(next_move) => position.apply(&next_move),
                Err(error) => {
                    writeln!(self.output, "info string Unexpected UCI move: {error:#}")?;
                    break;
                },
            }
        }
        self.position = position;
        Ok(())
    }

    fn handle_go(
        &mut self,
        depth: Option<Depth>,
        nodes: Option<u32>,
        movetime: Option<Duration>,
    ) -> anyhow::Result<()> {
        let timer = Instant::now();
        let best_move = match self.algorithm {
            Algorithm::AlphaBeta(variant) => {
                let limiter = Limiter {
                    depth: depth.or_else(|| movetime.is_none().then_some(DEFAULT_DEPTH)),
                    time: movetime,
                };
                let mut searcher = AlphaBetaSearcher::new(Material);
                match searcher.iterative_deepening(&self.position, variant, &limiter) {
                    Ok(result) => {
                        writeln!(
                            self.output,
                            "info depth {} score {} nodes {} time {}{}",
                            result.depth,
                            result.score,
                            result.nodes,
                            timer.elapsed().as_millis(),
                            result
                                .best_move
                                .as_ref()
                                .map_or_else(String::new, |m| format!(" pv {}", to_uci(m))),
                        )?;
                        result.best_move
                    },
                    Err(error) => {
                        writeln!(self.output, "info string {error}")?;
                        None
                    },
                }
            },
            Algorithm::Mcts => match self.search_mcts(nodes, movetime, timer) {
                Ok(searcher) => {
                    let best_move = searcher.best_move().ok();
                    if let Some(best_move) = &best_move {
                        writeln!(
                            self.output,
                            "info nodes {} time {} pv {}",
                            searcher.root_visits(),
                            timer.elapsed().as_millis(),
                            to_uci(best_move)
                        )?;
                    }
                    best_move
                },
                Err(error) => {
                    writeln!(self.output, "info string {error}")?;
                    None
                },
            },
            Algorithm::Random => random_move(&self.position, &mut self.rng),
        };
        match best_move {
            Some(best_move) => writeln!(self.output, "bestmove {}", to_uci(&best_move))?,
            // Null move: the game is over.
            None => writeln!(self.output, "bestmove 0000")?,
        }
        Ok(())
    }

    /// Runs `nodes` iterations (or the configured number) and, if only
    /// `movetime` is set, keeps running batches of iterations until the time is
    /// up.
    fn search_mcts(
        &mut self,
        nodes: Option<u32>,
        movetime: Option<Duration>,
        timer: Instant,
    ) -> Result<Mcts<Chess>, SearchError> {
        // Each search draws its seed from the engine's generator.
        let config = mcts::Config {
            seed: self.rng.next_u64(),
            ..mcts::Config::default()
        };
        let mut searcher = Mcts::new(self.position.clone(), config)?;
        match (nodes, movetime) {
            (None, Some(movetime)) if !self.position.is_terminal() => {
                searcher.run(ITERATIONS_BATCH)?;
                while timer.elapsed() + RESERVE < movetime {
                    searcher.run(ITERATIONS_BATCH)?;
                }
            },
            (nodes, _) => searcher.run(nodes.unwrap_or(self.iterations))?,
        }
        Ok(searcher)
    }
}
