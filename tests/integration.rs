use assert_cmd::Command;
use predicates::boolean::PredicateBooleanExt;
use predicates::str::contains;

const BINARY_NAME: &str = "pabi-search";

#[test]
fn uci_setup() {
    let mut cmd = Command::cargo_bin(BINARY_NAME).expect("Binary should be built");

    drop(
        cmd.write_stdin("uci\n") // Write the uci command to stdin
            .assert()
            .success()
            .stdout(
                contains("id name")
                    .and(contains("id author"))
                    .and(contains("option name Search"))
                    .and(contains("uciok")),
            ),
    );
}

#[test]
fn mate_in_one() {
    let mut cmd = Command::cargo_bin(BINARY_NAME).expect("Binary should be built");

    drop(
        cmd.write_stdin("position fen 6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1\ngo depth 2\nquit\n")
            .assert()
            .success()
            .stdout(contains("info depth 2").and(contains("bestmove a1a8"))),
    );
}

#[test]
fn mcts_search() {
    let mut cmd = Command::cargo_bin(BINARY_NAME).expect("Binary should be built");

    drop(
        cmd.write_stdin(
            "setoption name Search value mcts\nposition fen r5k1/8/8/8/8/8/5PPP/6K1 b - - 0 1\ngo nodes 500\nquit\n",
        )
        .assert()
        .success()
        .stdout(contains("bestmove a8a1")),
    );
}

#[test]
fn logs_stay_out_of_stdout() {
    let mut cmd = Command::cargo_bin(BINARY_NAME).expect("Binary should be built");
    let _ = cmd.env("RUST_LOG", "debug");

    drop(
        cmd.write_stdin("go depth 2\nquit\n")
            .assert()
            .success()
            .stdout(contains("bestmove").and(contains("completed iteration").not()))
            .stderr(contains("completed iteration")),
    );
}
