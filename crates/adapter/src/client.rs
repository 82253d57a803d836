//! TCP client for multiplayer matches
//!
//! One reader task turns inbound lines into queued pieces and leaderboard
//! updates; one writer task sends outbound messages, one per line. Neither ever
//! holds the engine lock while waiting on the socket.

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::core::GameEvent;
use crate::engine::GameEngine;
use crate::protocol::{parse_message, sort_leaderboard, InboundMessage, OutboundMessage, ScoreEntry};
use crate::sync::{MultiplayerSync, PieceFeed};
use crate::types::Difficulty;

/// A multiplayer match wired to a server connection
pub struct MultiplayerSession {
    pub engine: GameEngine,
    /// Game events from the engine
    pub events: mpsc::UnboundedReceiver<GameEvent>,
    /// Leaderboards, sorted highest score first
    pub scores: mpsc::UnboundedReceiver<Vec<ScoreEntry>>,
    outbound: mpsc::UnboundedSender<OutboundMessage>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl MultiplayerSession {
    /// Ask the server for the leaderboard
    pub fn request_scores(&self) {
        let _ = self.outbound.send(OutboundMessage::RequestScores);
    }

    /// Sender for messages to the server
    pub fn outbound(&self) -> mpsc::UnboundedSender<OutboundMessage> {
        self.outbound.clone()
    }

    /// Stop the match timer and the connection tasks.
    pub fn shutdown(&self) {
        self.engine.shutdown();
        self.reader.abort();
    }

    /// Whether the server connection is still being read
    pub fn is_connected(&self) -> bool {
        !self.reader.is_finished()
    }
}

impl Drop for MultiplayerSession {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

/// Connect to the server and set up a (not yet started) match.
pub async fn connect(config: &ClientConfig, difficulty: Difficulty) -> anyhow::Result<MultiplayerSession> {
    let socket = TcpStream::connect((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("cannot connect to {}", config.address()))?;
    info!(address = %config.address(), "connected to server");
    let (reader, writer) = socket.into_split();
    start_session(reader, writer, difficulty)
}

/// Build a match over any line transport.
pub fn start_session<R, W>(reader: R, writer: W, difficulty: Difficulty) -> anyhow::Result<MultiplayerSession>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (outbound, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (sync, feed) = MultiplayerSync::new(outbound.clone());
    let (engine, events) = GameEngine::with_strategy(difficulty, Box::new(sync))?;
    let (scores_tx, scores) = mpsc::unbounded_channel();

    let writer = tokio::spawn(write_task(writer, out_rx));
    let reader = {
        let engine = engine.clone();
        tokio::spawn(async move {
            if let Err(e) = read_task(BufReader::new(reader), feed, engine, scores_tx).await {
                warn!("server connection error: {}", e);
            }
            info!("server disconnected");
        })
    };

    Ok(MultiplayerSession {
        engine,
        events,
        scores,
        outbound,
        reader,
        writer,
    })
}

async fn write_task<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<OutboundMessage>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(msg) = rx.recv().await {
        debug!(%msg, "send");
        let line = format!("{}\n", msg);
        if writer.write_all(line.as_bytes()).await.is_err() {
            break;
        }
        if writer.flush().await.is_err() {
            break;
        }
    }
}

/// Inbound lines. A `SCORES` line opens a leaderboard; the lines right after it
/// that parse as entries belong to the same leaderboard. It is sent once a
/// different line arrives or no more input is buffered.
async fn read_task<R>(
    mut reader: BufReader<R>,
    feed: PieceFeed,
    engine: GameEngine,
    scores: mpsc::UnboundedSender<Vec<ScoreEntry>>,
) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut line = String::new();
    let mut leaderboard: Option<Vec<ScoreEntry>> = None;
    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            send_leaderboard(&mut leaderboard, &scores);
            return Ok(());
        }

        let trimmed = line.trim();
        if !trimmed.is_empty() {
            let entry = match leaderboard {
                Some(_) => ScoreEntry::parse(trimmed).ok(),
                None => None,
            };
            match entry {
                Some(entry) => leaderboard.get_or_insert_with(Vec::new).push(entry),
                None => {
                    send_leaderboard(&mut leaderboard, &scores);
                    leaderboard = dispatch(trimmed, &feed, &engine);
                }
            }
        }

        if reader.buffer().is_empty() {
            send_leaderboard(&mut leaderboard, &scores);
        }
    }
}

/// Handle one message; returns the leaderboard a `SCORES` line opened.
fn dispatch(line: &str, feed: &PieceFeed, engine: &GameEngine) -> Option<Vec<ScoreEntry>> {
    match parse_message(line) {
        Ok(InboundMessage::Piece(index)) => {
            debug!(index, "piece received");
            if feed.push_index(index).is_ok() {
                engine.refill();
            }
            None
        }
        Ok(InboundMessage::Scores(entries)) => Some(entries),
        Err(e) => {
            debug!(line, "dropped message: {}", e);
            None
        }
    }
}

fn send_leaderboard(
    leaderboard: &mut Option<Vec<ScoreEntry>>,
    scores: &mpsc::UnboundedSender<Vec<ScoreEntry>>,
) {
    if let Some(mut entries) = leaderboard.take() {
        sort_leaderboard(&mut entries);
        let _ = scores.send(entries);
    }
}
