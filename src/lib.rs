//! Move selection for chess by searching the game tree. Two independent
//! engines are provided: depth-limited [Minimax]/[Negamax] search with
//! alpha-beta pruning ([`search::AlphaBetaSearcher`]) and Monte Carlo Tree
//! Search with random playouts ([`search::mcts::Mcts`]).
//!
//! Board representation and move generation are not implemented here: the
//! engines work on top of [`environment::GameState`], which is implemented for
//! [`shakmaty::Chess`] in [`chess`] and can be implemented for any other
//! two-player zero-sum game.
//!
//! [Minimax]: https://www.chessprogramming.org/Minimax
//! [Negamax]: https://www.chessprogramming.org/Negamax

// Rustdoc lints.
#![warn(
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_html_tags,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::bare_urls
)]

pub mod chess;
pub mod environment;
pub mod evaluation;
pub mod search;

mod engine;
pub use engine::Engine;
use shadow_rs::shadow;

shadow!(build);

/// Build type and target. Produced by `build.rs`.
const FEATURES: &str = include_str!(concat!(env!("OUT_DIR"), "/features"));

/// Returns the full engine version that can be used to identify how it was
/// built in the first place.
fn engine_version() -> String {
    format!(
        "{} (commit {}, branch {})",
        build::PKG_VERSION,
        build::SHORT_COMMIT,
        build::BRANCH
    )
}

/// Prints informations about the engine version, author and GitHub repository
/// on engine startup.
pub fn print_engine_info() {
    println!("Pabi search {}", engine_version());
    println!("<https://github.com/kirillbobyrev/pabi>");
}

/// Prints information the build type, features and whether the build is clean
/// on engine startup.
pub fn print_binary_info() {
    println!("Release build: {}", !shadow_rs::is_debug());
    println!("Features: {FEATURES}");
    if !shadow_rs::git_clean() {
        println!("Warning: built with uncommitted changes");
    }
    println!();
}
