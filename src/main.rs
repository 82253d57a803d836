//! TetrECS text runner (default binary).
//!
//! Reads moves from stdin (`place x y`, `rotate`, `swap`, `quit`) and prints
//! the board to stdout whenever the match changes. Logs go to stderr.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tetrecs::adapter::{connect, ClientConfig, EventLog, OutboundMessage, PlayerLives, ScoreEntry};
use tetrecs::core::{GameEvent, GameSnapshot, PieceSnapshot, SequenceStrategy, SoloStrategy};
use tetrecs::core::{MatchStrategy, PlaceOutcome};
use tetrecs::engine::GameEngine;
use tetrecs::types::{Difficulty, PlayerAction, PIECE_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Solo,
    Multiplayer,
}

#[derive(Debug, Parser)]
#[command(name = "tetrecs", about = "Place pieces on a 5x5 grid before the timer runs out")]
struct Cli {
    #[arg(long, value_enum, default_value_t = Mode::Solo)]
    mode: Mode,

    /// easy, normal or challenge
    #[arg(long, default_value = "normal")]
    difficulty: String,

    /// Seed for solo piece draws
    #[arg(long)]
    seed: Option<u32>,

    /// Fixed, repeating piece order for solo play (comma-separated catalog indices)
    #[arg(long, value_delimiter = ',')]
    sequence: Vec<u8>,

    /// Server host (overrides TETRECS_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Server port (overrides TETRECS_PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let difficulty = Difficulty::from_str(&cli.difficulty);
    info!(mode = ?cli.mode, difficulty = difficulty.as_str(), "tetrecs starting");

    let mut config = ClientConfig::from_env();
    if let Some(host) = cli.host.clone() {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    let log = match config.event_log.as_deref() {
        Some(path) => Some(EventLog::open(path).await?),
        None => None,
    };

    match cli.mode {
        Mode::Solo => {
            let strategy: Box<dyn MatchStrategy> = if !cli.sequence.is_empty() {
                Box::new(SequenceStrategy::new(&cli.sequence))
            } else if let Some(seed) = cli.seed {
                Box::new(SoloStrategy::new(seed))
            } else {
                Box::new(SoloStrategy::from_clock())
            };
            let (engine, mut events) = GameEngine::with_strategy(difficulty, strategy)?;
            let mut frontend = Frontend {
                engine: &engine,
                events: &mut events,
                scores: None,
                outbound: None,
                log: log.as_ref(),
                player: config.player.as_deref(),
            };
            frontend.run().await?;
        }
        Mode::Multiplayer => {
            let mut session = connect(&config, difficulty).await?;
            let outbound = session.outbound();
            let mut frontend = Frontend {
                engine: &session.engine,
                events: &mut session.events,
                scores: Some(&mut session.scores),
                outbound: Some(outbound),
                log: log.as_ref(),
                player: config.player.as_deref(),
            };
            frontend.run().await?;
            session.shutdown();
        }
    }

    if let Some(log) = log {
        log.close().await;
    }
    Ok(())
}

struct Frontend<'a> {
    engine: &'a GameEngine,
    events: &'a mut mpsc::UnboundedReceiver<GameEvent>,
    scores: Option<&'a mut mpsc::UnboundedReceiver<Vec<ScoreEntry>>>,
    outbound: Option<mpsc::UnboundedSender<OutboundMessage>>,
    log: Option<&'a EventLog>,
    player: Option<&'a str>,
}

impl Frontend<'_> {
    async fn run(&mut self) -> Result<()> {
        println!("{}", HELP);
        self.engine.start()?;
        println!("{}", render(&self.engine.snapshot()));

        let mut stdin = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                line = stdin.next_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    if !self.handle_line(&line) {
                        break;
                    }
                }
                event = self.events.recv() => {
                    let Some(event) = event else {
                        break;
                    };
                    if !self.handle_event(&event) {
                        break;
                    }
                }
                board = next_scores(&mut self.scores) => {
                    match board {
                        Some(board) => print_leaderboard(&board, self.player),
                        None => self.scores = None,
                    }
                }
            }
        }

        self.engine.shutdown();
        let snapshot = self.engine.snapshot();
        println!("Final score {} (level {})", snapshot.score, snapshot.level);
        Ok(())
    }

    /// Returns false when the player quits.
    fn handle_line(&self, line: &str) -> bool {
        if line.trim().is_empty() {
            return true;
        }
        let Some(action) = PlayerAction::parse(line) else {
            println!("unknown command: {}", line.trim());
            println!("{}", HELP);
            return true;
        };

        match action {
            PlayerAction::Place { x, y } => match self.engine.place_at(x, y) {
                PlaceOutcome::Rejected => println!("piece does not fit at ({}, {})", x, y),
                PlaceOutcome::NoPiece => println!("waiting for the next piece"),
                PlaceOutcome::NotRunning | PlaceOutcome::Placed { .. } => {}
            },
            PlayerAction::Rotate => {
                self.engine.rotate_current();
            }
            PlayerAction::Swap => {
                self.engine.swap_pieces();
            }
            PlayerAction::Quit => return false,
        }
        println!("{}", render(&self.engine.snapshot()));
        true
    }

    /// Returns false once the match is over.
    fn handle_event(&self, event: &GameEvent) -> bool {
        if let Some(log) = self.log {
            log.record(event);
        }

        match event {
            GameEvent::LinesCleared { lines, blocks, .. } => {
                println!("Cleared {} line(s), {} block(s)", lines, blocks);
            }
            GameEvent::LevelUp(level) => println!("Level up! Now level {}", level),
            GameEvent::LifeLost { remaining } => {
                println!("Time's up! {} lives left", remaining);
                println!("{}", render(&self.engine.snapshot()));
            }
            GameEvent::GameOver => {
                println!("Game over");
                return false;
            }
            _ => {}
        }

        if matches!(event, GameEvent::ScoreChanged(_) | GameEvent::LifeLost { .. }) {
            if let Some(outbound) = &self.outbound {
                let _ = outbound.send(OutboundMessage::RequestScores);
            }
        }
        true
    }
}

async fn next_scores(
    scores: &mut Option<&mut mpsc::UnboundedReceiver<Vec<ScoreEntry>>>,
) -> Option<Vec<ScoreEntry>> {
    match scores {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

const HELP: &str = "commands: place <x> <y> | rotate | swap | quit";

fn cell_char(value: u8) -> char {
    match value {
        0 => '.',
        v => std::char::from_digit(u32::from(v), 16)
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('#'),
    }
}

fn piece_row(piece: Option<&PieceSnapshot>, row: usize) -> String {
    (0..PIECE_SIZE as usize)
        .map(|col| match piece {
            Some(p) => cell_char(p.blocks[row][col]),
            None => ' ',
        })
        .collect()
}

fn render(snapshot: &GameSnapshot) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "score {}  level {}  lives {}  x{}  [{}]\n",
        snapshot.score,
        snapshot.level,
        snapshot.lives,
        snapshot.multiplier,
        snapshot.phase.as_str()
    ));

    let name = |p: Option<&PieceSnapshot>| p.map(|p| p.name).unwrap_or("-");
    out.push_str(&format!(
        "   {:<width$}  current: {:<14} next: {}\n",
        (0..snapshot.cols).map(|x| x.to_string()).collect::<String>(),
        name(snapshot.current.as_ref()),
        name(snapshot.next.as_ref()),
        width = snapshot.cols as usize
    ));

    for y in 0..snapshot.rows {
        let cells: String = (0..snapshot.cols)
            .map(|x| cell_char(snapshot.cell(x, y).unwrap_or(0)))
            .collect();
        out.push_str(&format!("{:>2} {}", y, cells));
        if (y as usize) < PIECE_SIZE as usize {
            out.push_str(&format!(
                "  current: {}   next: {}",
                piece_row(snapshot.current.as_ref(), y as usize),
                piece_row(snapshot.next.as_ref(), y as usize)
            ));
        }
        out.push('\n');
    }
    out
}

fn print_leaderboard(board: &[ScoreEntry], player: Option<&str>) {
    println!("Leaderboard:");
    for entry in board {
        let marker = if Some(entry.name.as_str()) == player { '*' } else { ' ' };
        let lives = match entry.lives {
            PlayerLives::Alive(n) => n.to_string(),
            PlayerLives::Dead => "DEAD".to_string(),
        };
        println!("{} {:<12} {:>6}  {}", marker, entry.name, entry.score, lives);
    }
}
