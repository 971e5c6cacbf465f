use std::io::{self, BufRead, Write};

use console_chess::config::{AppConfig, OutputFormat};
use console_chess::engine::{ChessError, Game, Promotion, Square};

/// One line of console input.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Move {
        from: Square,
        to: Square,
        promotion: Option<Promotion>,
    },
    Moves(Square),
    Board,
    Reset,
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Result<Self, ChessError> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(Command::Board);
        };

        match head.to_ascii_lowercase().as_str() {
            "board" => return Ok(Command::Board),
            "reset" => return Ok(Command::Reset),
            "help" | "?" => return Ok(Command::Help),
            "quit" | "exit" => return Ok(Command::Quit),
            "moves" => {
                let name = words.next().unwrap_or_default();
                return parse_square(name).map(Command::Moves);
            }
            _ => {}
        }

        // Moves: "e2e4", "e2 e4", "e7e8q", "e7 e8 q".
        let joined: String = line.split_whitespace().collect();
        if !joined.is_ascii() || !(4..=5).contains(&joined.len()) {
            return Err(ChessError::InvalidMove {
                from: joined.clone(),
                to: String::new(),
                reason: "expected a move like e2e4".into(),
            });
        }
        let from = parse_square(&joined[0..2])?;
        let to = parse_square(&joined[2..4])?;
        let promotion = match joined.get(4..) {
            Some(rest) if !rest.is_empty() => Some(Promotion::from_str_loose(rest)?),
            _ => None,
        };
        Ok(Command::Move {
            from,
            to,
            promotion,
        })
    }
}

fn parse_square(name: &str) -> Result<Square, ChessError> {
    Square::from_algebraic(name).ok_or_else(|| ChessError::InvalidSquare(name.to_string()))
}

fn print_position(out: &mut impl Write, game: &Game, config: &AppConfig) -> io::Result<()> {
    match config.output {
        OutputFormat::Text => {
            writeln!(out, "{}", game.board().board_string())?;
            writeln!(out, "{} to move ({})", game.side_to_move(), game.status())?;
        }
        OutputFormat::Json => match serde_json::to_string(&game.snapshot()) {
            Ok(json) => writeln!(out, "{json}")?,
            Err(e) => tracing::error!("failed to serialize snapshot: {e}"),
        },
    }
    out.flush()
}

fn print_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "commands:")?;
    writeln!(out, "  e2e4 | e2 e4    move a piece")?;
    writeln!(out, "  e7e8n           move and promote (q, r, b, n)")?;
    writeln!(out, "  moves e2        list legal destinations")?;
    writeln!(out, "  board           show the board")?;
    writeln!(out, "  reset           start over")?;
    writeln!(out, "  quit            leave")
}

fn run(game: &mut Game, config: &AppConfig) -> io::Result<()> {
    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    print_position(&mut out, game, config)?;

    for line in stdin.lock().lines() {
        let line = line?;
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                writeln!(out, "error: {e}")?;
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => print_help(&mut out)?,
            Command::Board => print_position(&mut out, game, config)?,
            Command::Reset => {
                game.reset();
                print_position(&mut out, game, config)?;
            }
            Command::Moves(sq) => {
                let targets: Vec<String> = game
                    .legal_moves_from(sq)
                    .iter()
                    .map(|s| s.to_algebraic())
                    .collect();
                writeln!(out, "{sq}: {}", targets.join(" "))?;
            }
            Command::Move {
                from,
                to,
                promotion,
            } => {
                let promotion = promotion.unwrap_or(config.default_promotion);
                match game.play(from, to, promotion) {
                    Ok(_) => print_position(&mut out, game, config)?,
                    Err(e) => writeln!(out, "error: {e}")?,
                }
            }
        }
    }
    Ok(())
}

fn main() {
    let config = AppConfig::from_env();

    // Initialize tracing (structured logging) on stderr, away from the board.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with_writer(io::stderr)
        .init();

    let mut game = Game::new();
    tracing::info!(
        game = %game.id,
        "console-chess v{} ready",
        env!("CARGO_PKG_VERSION")
    );

    if let Err(e) = run(&mut game, &config) {
        tracing::error!("console I/O failed: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn parses_move_forms() {
        let expected = Command::Move {
            from: sq("e2"),
            to: sq("e4"),
            promotion: None,
        };
        assert_eq!(Command::parse("e2e4").unwrap(), expected);
        assert_eq!(Command::parse("  e2 e4 ").unwrap(), expected);
        assert_eq!(Command::parse("E2E4").unwrap(), expected);
        assert_eq!(
            Command::parse("e7e8n").unwrap(),
            Command::Move {
                from: sq("e7"),
                to: sq("e8"),
                promotion: Some(Promotion::Knight),
            }
        );
    }

    #[test]
    fn parses_keywords() {
        assert_eq!(Command::parse("quit").unwrap(), Command::Quit);
        assert_eq!(Command::parse("board").unwrap(), Command::Board);
        assert_eq!(Command::parse("").unwrap(), Command::Board);
        assert_eq!(Command::parse("RESET").unwrap(), Command::Reset);
        assert_eq!(Command::parse("moves g1").unwrap(), Command::Moves(sq("g1")));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(Command::parse("e2"), Err(ChessError::InvalidMove { .. })));
        assert!(matches!(Command::parse("z9e4"), Err(ChessError::InvalidSquare(_))));
        assert!(matches!(Command::parse("e7e8k"), Err(ChessError::InvalidPromotion(_))));
        assert!(matches!(Command::parse("moves"), Err(ChessError::InvalidSquare(_))));
        assert!(Command::parse("é2e4").is_err());
    }
}
