//! UCI engine binary: reads commands from stdin and answers on stdout.

use std::io;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Logs go to stderr: stdout is reserved for the UCI protocol.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    pabi_search::print_engine_info();
    pabi_search::print_binary_info();

    let mut input = io::stdin().lock();
    let mut output = io::stdout().lock();

    let mut engine = pabi_search::Engine::new(&mut input, &mut output);
    engine.uci_loop()
}
