//! Protocol module - line-based text messages for multiplayer matches
//!
//! Every message is a command word, optionally followed by a single space and a
//! payload. Lines with an unknown command word are dropped by the caller.
//!
//! | direction | message | meaning |
//! |-----------|---------|---------|
//! | out | `PIECE` | request one more piece index |
//! | in | `PIECE <int>` | catalog index to enqueue |
//! | out | `SCORE <int>` | our score changed |
//! | out | `LIVES <int>` | we lost a life |
//! | out | `DIE` | we are out |
//! | out | `SCORES` | request the leaderboard |
//! | in | `SCORES <name:score:lives|DEAD ...>` | leaderboard |
//!
//! Leaderboard entries are separated by newlines or spaces, so a leaderboard
//! fits on one transport line.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::types::PIECE_COUNT;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("missing payload for {0}")]
    MissingPayload(&'static str),

    #[error("invalid integer: {0}")]
    InvalidInteger(String),

    #[error("piece index {0} outside the catalog")]
    PieceOutOfRange(i64),

    #[error("malformed leaderboard entry: {0}")]
    MalformedScore(String),
}

/// Remaining lives of a leaderboard player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerLives {
    Alive(u32),
    Dead,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
    pub lives: PlayerLives,
}

impl ScoreEntry {
    /// Parse `name:score:lives` or `name:score:DEAD`
    pub fn parse(entry: &str) -> Result<Self, ProtocolError> {
        let malformed = || ProtocolError::MalformedScore(entry.to_string());

        // Names may contain ':'; score and lives are the last two fields.
        let mut parts = entry.rsplitn(3, ':');
        let lives = parts.next().ok_or_else(malformed)?;
        let score = parts.next().ok_or_else(malformed)?;
        let name = parts.next().ok_or_else(malformed)?;
        if name.is_empty() {
            return Err(malformed());
        }

        let score = score.parse::<u32>().map_err(|_| malformed())?;
        let lives = if lives.eq_ignore_ascii_case("DEAD") {
            PlayerLives::Dead
        } else {
            PlayerLives::Alive(lives.parse::<u32>().map_err(|_| malformed())?)
        };

        Ok(Self {
            name: name.to_string(),
            score,
            lives,
        })
    }
}

/// Messages we act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    Piece(u8),
    Scores(Vec<ScoreEntry>),
}

/// Messages we send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundMessage {
    RequestPiece,
    Score(u32),
    Lives(u32),
    Die,
    RequestScores,
}

impl fmt::Display for OutboundMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutboundMessage::RequestPiece => f.write_str("PIECE"),
            OutboundMessage::Score(score) => write!(f, "SCORE {}", score),
            OutboundMessage::Lives(lives) => write!(f, "LIVES {}", lives),
            OutboundMessage::Die => f.write_str("DIE"),
            OutboundMessage::RequestScores => f.write_str("SCORES"),
        }
    }
}

/// Parse one inbound message.
///
/// Surrounding whitespace is ignored. Unknown commands and bad payloads are
/// errors; the client logs and drops them.
pub fn parse_message(line: &str) -> Result<InboundMessage, ProtocolError> {
    let line = line.trim();
    let (command, payload) = match line.split_once(' ') {
        Some((command, payload)) => (command, payload.trim()),
        None => (line, ""),
    };

    match command {
        "PIECE" => parse_piece(payload).map(InboundMessage::Piece),
        "SCORES" => parse_scores(payload).map(InboundMessage::Scores),
        other => Err(ProtocolError::UnknownCommand(other.to_string())),
    }
}

fn parse_piece(payload: &str) -> Result<u8, ProtocolError> {
    if payload.is_empty() {
        return Err(ProtocolError::MissingPayload("PIECE"));
    }
    let index = payload
        .parse::<i64>()
        .map_err(|_| ProtocolError::InvalidInteger(payload.to_string()))?;
    if !(0..i64::from(PIECE_COUNT)).contains(&index) {
        return Err(ProtocolError::PieceOutOfRange(index));
    }
    Ok(index as u8)
}

fn parse_scores(payload: &str) -> Result<Vec<ScoreEntry>, ProtocolError> {
    payload.split_whitespace().map(ScoreEntry::parse).collect()
}

/// Leaderboard order: highest score first, ties by name
pub fn sort_leaderboard(entries: &mut [ScoreEntry]) {
    entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_piece() {
        assert_eq!(parse_message("PIECE 7"), Ok(InboundMessage::Piece(7)));
        assert_eq!(parse_message("PIECE 0\r\n"), Ok(InboundMessage::Piece(0)));
        assert_eq!(
            parse_message("PIECE 15"),
            Err(ProtocolError::PieceOutOfRange(15))
        );
        assert_eq!(
            parse_message("PIECE -1"),
            Err(ProtocolError::PieceOutOfRange(-1))
        );
        assert_eq!(
            parse_message("PIECE x"),
            Err(ProtocolError::InvalidInteger("x".to_string()))
        );
        assert_eq!(
            parse_message("PIECE"),
            Err(ProtocolError::MissingPayload("PIECE"))
        );
    }

    #[test]
    fn test_parse_scores() {
        let parsed = parse_message("SCORES alice:120:2\nbob:40:DEAD").unwrap();
        let InboundMessage::Scores(entries) = parsed else {
            panic!("Expected Scores message");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "alice");
        assert_eq!(entries[0].score, 120);
        assert_eq!(entries[0].lives, PlayerLives::Alive(2));
        assert_eq!(entries[1].lives, PlayerLives::Dead);
    }

    #[test]
    fn test_parse_scores_rejects_malformed_entry() {
        assert!(matches!(
            parse_message("SCORES alice:lots:2"),
            Err(ProtocolError::MalformedScore(_))
        ));
        assert!(matches!(
            parse_message("SCORES :10:2"),
            Err(ProtocolError::MalformedScore(_))
        ));
    }

    #[test]
    fn test_name_may_contain_colon() {
        let entry = ScoreEntry::parse("a:b:30:1").unwrap();
        assert_eq!(entry.name, "a:b");
        assert_eq!(entry.score, 30);
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_message("MSG hello"),
            Err(ProtocolError::UnknownCommand("MSG".to_string()))
        );
        // Prefix match is on the whole command word.
        assert!(parse_message("PIECES 3").is_err());
    }

    #[test]
    fn test_outbound_wire_format() {
        assert_eq!(OutboundMessage::RequestPiece.to_string(), "PIECE");
        assert_eq!(OutboundMessage::Score(150).to_string(), "SCORE 150");
        assert_eq!(OutboundMessage::Lives(2).to_string(), "LIVES 2");
        assert_eq!(OutboundMessage::Die.to_string(), "DIE");
        assert_eq!(OutboundMessage::RequestScores.to_string(), "SCORES");
    }

    #[test]
    fn test_sort_leaderboard() {
        let mut entries = vec![
            ScoreEntry::parse("b:10:1").unwrap(),
            ScoreEntry::parse("c:90:DEAD").unwrap(),
            ScoreEntry::parse("a:10:3").unwrap(),
        ];
        sort_leaderboard(&mut entries);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }
}
