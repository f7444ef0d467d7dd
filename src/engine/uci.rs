use crate::search::Depth;

/// Subset of the UCI commands understood by the engine.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum Command {
    Uci,
    IsReady,
    SetOption {
        option: EngineOption,
        value: OptionValue,
    },
    SetPosition {
        fen: Option<String>,
        moves: Vec<String>,
    },
    NewGame,
    Go {
        depth: Option<Depth>,
        nodes: Option<u32>,
        movetime: Option<u64>,
    },
    Stop,
    Quit,
    Unknown(String),
}

#[derive(Debug, PartialEq, Eq)]
pub(super) enum EngineOption {
    /// Search algorithm: `minimax`, `negamax`, `mcts` or `random`.
    Search,
    /// Number of MCTS iterations when `go` does not specify `nodes`.
    Iterations,
    /// Seed of the random number generator used by MCTS and random moves.
    Seed,
}

#[derive(Debug, PartialEq, Eq)]
pub(super) enum OptionValue {
    Integer(u64),
    String(String),
}

fn parse_go(parts: &[&str]) -> Command {
    let mut depth = None;
    let mut nodes = None;
    let mut movetime = None;

    let mut i = 1;

    while i < parts.len() {
        match parts[i] {
            "depth" if i + 1 < parts.len() => depth = parts[i + 1].parse().ok(),
            "nodes" if i + 1 < parts.len() => nodes = parts[i + 1].parse().ok(),
            "movetime" if i + 1 < parts.len() => movetime = parts[i + 1].parse().ok(),
            // Flags without a value.
            "infinite" | "ponder" => {
                i += 1;
                continue;
            },
            // Clock parameters are accepted but not used.
            _ => {},
        }
        i += 2;
    }

    Command::Go {
        depth,
        nodes,
        movetime,
    }
}

fn parse_setoption(parts: &[&str]) -> Command {
    if parts.len() > 3 && parts[1] == "name" {
        let name_end = parts
            .iter()
            .position(|&x| x == "value")
            .unwrap_or(parts.len());
        let option = match parts[2..name_end].join(" ").as_str() {
            "Search" => EngineOption::Search,
            "Iterations" => EngineOption::Iterations,
            "Seed" => EngineOption::Seed,
            _ => return Command::Unknown(parts.join(" ")),
        };
        let value = if name_end + 1 < parts.len() {
            match option {
                EngineOption::Iterations | EngineOption::Seed => parts[name_end + 1]
                    .parse::<u64>()
                    .ok()
                    .map(OptionValue::Integer),
                EngineOption::Search => Some(OptionValue::String(parts[name_end + 1..].join(" "))),
            }
        } else {
            None
        };
        if let Some(value) = value {
            Command::SetOption { option, value }
        } else {
            Command::Unknown(parts.join(" "))
        }
    } else {
        Command::Unknown(parts.join(" "))
    }
}

fn parse_setposition(parts: &[&str]) -> Command {
    let fen_index = parts.iter().position(|&x| x == "fen");
    let moves_index = parts.iter().position(|&x| x == "moves");
    if let (Some(fen_index), Some(moves_index)) = (fen_index, moves_index) {
        if moves_index < fen_index {
            return Command::Unknown(parts.join(" "));
        }
    }
    let fen =fen_index.map(|index| parts[index + 1..moves_index.unwrap_or(parts.len())].join(" "));
    let moves = moves_index.map_or_else(Vec::new, |moves_index| {
        parts[moves_index + 1..]
            .iter()
            .map(|s| (*s).to_string())
            .collect()
    });
    Command::SetPosition { fen, moves }
}

impl Command {
    pub(super) fn parse(input: &str) -> Self {
        let parts: Vec<&str> = input.split_whitespace().collect();

        if parts.is_empty() {
            return Self::Unknown(String::new());
        }

        match parts[0] {
            "uci" => Self::Uci,
            "isready" => Self::IsReady,
            "setoption" => parse_setoption(&parts),
            "position" => parse_setposition(&parts),
            "ucinewgame" => Self::NewGame,
            "go" => parse_go(&parts),
            "stop" => Self::Stop,
            "quit" => Self::Quit,
            _ => Self::Unknown(input.trim().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_uci() {
        assert_eq!(Command::parse("uci"), Command::Uci);
        assert_eq!(Command::parse("  uci\n"), Command::Uci);
    }

    #[test]
    fn parse_isready() {
        assert_eq!(Command::parse("isready"), Command::IsReady);
    }

    #[test]
    fn parse_setoption() {
        assert_eq!(
            Command::parse("setoption name Search value negamax"),
            Command::SetOption {
                option: EngineOption::Search,
                value: OptionValue::String("negamax".to_string())
            }
        );
        assert_eq!(
            Command::parse("setoption name Iterations value 5000"),
            Command::SetOption {
                option: EngineOption::Iterations,
                value: OptionValue::Integer(5000)
            }
        );
        assert_eq!(
            Command::parse("setoption name Seed value 42"),
            Command::SetOption {
                option: EngineOption::Seed,
                value: OptionValue::Integer(42)
            }
        );
        assert_eq!(
            Command::parse("setoption name Seed value many"),
            Command::Unknown("setoption name Seed value many".to_string())
        );
        assert_eq!(
            Command::parse("setoption name Hash value 128"),
            Command::Unknown("setoption name Hash value 128".to_string())
        );
        assert_eq!(
            Command::parse("setoption name Search value"),
            Command::Unknown("setoption name Search value".to_string())
        );
    }

    #[test]
    fn parse_position() {
        assert_eq!(
            Command::parse("position startpos"),
            Command::SetPosition {
                fen: None,
                moves: vec![]
            }
        );
        assert_eq!(
            Command::parse("position startpos moves e2e4 e7e5"),
            Command::SetPosition {
                fen: None,
                moves: vec!["e2e4".to_string(), "e7e5".to_string()]
            }
        );
        assert_eq!(
            Command::parse("position fen rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1 moves e2e4 e7e5"),
            Command::SetPosition {
                fen: Some("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1".to_string()),
                moves: vec!["e2e4".to_string(), "e7e5".to_string()]
            }
        );
    }

    #[test]
    fn moves_before_fen() {
        assert_eq!(
            Command::parse("position moves e2e4 fen 8/8/8/8/8/8/8/8 w - - 0 1"),
            Command::Unknown("position moves e2e4 fen 8/8/8/8/8/8/8/8 w - - 0 1".to_string())
        );
    }

    #[test]
    fn ucinewgame() {
        assert_eq!(Command::parse("ucinewgame"), Command::NewGame);
    }

    #[test]
    fn parse_go() {
        assert_eq!(
            Command::parse("go depth 3 wtime 300000 btime 300000 winc 1000 binc 1000 nodes 500 movetime 5000"),
            Command::Go {
                depth: Some(3),
                nodes: Some(500),
                movetime: Some(5000),
            }
        );
        assert_eq!(
            Command::parse("go depth 10"),
            Command::Go {
                depth: Some(10),
                nodes: None,
                movetime: None,
            }
        );
        assert_eq!(
            Command::parse("go infinite nodes 100"),
            Command::Go {
                depth: None,
                nodes: Some(100),
                movetime: None,
            }
        );
        assert_eq!(
            Command::parse("go"),
            Command::Go {
                depth: None,
                nodes: None,
                movetime: None,
            }
        );
    }

    #[test]
    fn parse_stop() {
        assert_eq!(Command::parse("stop"), Command::Stop);
    }

    #[test]
    fn parse_quit() {
        assert_eq!(Command::parse("quit"), Command::Quit);
    }

    #[test]
    fn unknown() {
        assert_eq!(
            Command::parse("unknown command"),
            Command::Unknown("unknown command".to_string())
        );
        assert_eq!(Command::parse(""), Command::Unknown(String::new()));
        assert_eq!(Command::parse(" \n"), Command::Unknown(String::new()));
    }
}
