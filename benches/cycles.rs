//! iai benchmarks are measuring projected processor cycles spent on executing a
//! piece of code. They are less noisy and give a better understanding of
//! whether the performance is "objectively" changing between different
//! versions.
//!
//! It doesn't eliminate the necessity of measuring the time, though, because
//! knowing the absolute values is very important, too. Hence, the two sets of
//! benchmarks are very similar but complement each other.

use pabi_search::chess::from_fen;
use pabi_search::evaluation::material::Material;
use pabi_search::search::mcts::{Config, Mcts};
use pabi_search::search::{AlphaBetaSearcher, Variant};

const MIDDLEGAME: &str = "r1bq1rk1/ppp2ppp/2np1n2/2b1p3/2B1P3/2NP1N2/PPP2PPP/R1BQ1RK1 w - - 0 7";

fn negamax_depth_3() {
    let position = from_fen(MIDDLEGAME).expect("benchmarks are given valid positions");
    let mut searcher = AlphaBetaSearcher::new(Material);
    drop(iai::black_box(searcher.best_move(&position, 3, Variant::Negamax)));
}

fn minimax_depth_3() {
    let position = from_fen(MIDDLEGAME).expect("benchmarks are given valid positions");
    let mut searcher = AlphaBetaSearcher::new(Material);
    drop(iai::black_box(searcher.best_move(&position, 3, Variant::Minimax)));
}

fn mcts_1000_iterations() {
    let position = from_fen(MIDDLEGAME).expect("benchmarks are given valid positions");
    let mut mcts = Mcts::new(position, Config::default()).expect("default configuration is valid");
    drop(iai::black_box(mcts.run(1000)));
    drop(iai::black_box(mcts.best_move()));
}

iai::main!(negamax_depth_3, minimax_depth_3, mcts_1000_iterations);
