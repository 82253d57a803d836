//! JSON-lines event log
//!
//! A background task appends one JSON object per game event to a file. Writers
//! never wait on the disk: records go through an unbounded channel and the task
//! stops quietly on the first write error.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::core::GameEvent;

/// Serializable mirror of [`GameEvent`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventRecord {
    Started,
    NextPiece {
        current: Option<u8>,
        next: Option<u8>,
    },
    PiecePlaced {
        x: i32,
        y: i32,
        piece: u8,
    },
    PlacementRejected {
        x: i32,
        y: i32,
    },
    PieceRotated {
        piece: u8,
        rotation: &'static str,
    },
    PiecesSwapped {
        current: u8,
        next: u8,
    },
    LinesCleared {
        lines: u32,
        blocks: u32,
        cells: Vec<[u8; 2]>,
    },
    ScoreChanged {
        score: u32,
    },
    MultiplierChanged {
        multiplier: u32,
    },
    LevelUp {
        level: u32,
    },
    LifeLost {
        remaining: u32,
    },
    GameOver,
    GameLoopArmed {
        delay_ms: u32,
    },
}

impl From<&GameEvent> for EventRecord {
    fn from(value: &GameEvent) -> Self {
        match value {
            GameEvent::Started => EventRecord::Started,
            GameEvent::NextPiece { current, next } => EventRecord::NextPiece {
                current: current.map(|p| p.index()),
                next: next.map(|p| p.index()),
            },
            GameEvent::PiecePlaced { x, y, piece } => EventRecord::PiecePlaced {
                x: *x,
                y: *y,
                piece: piece.index(),
            },
            GameEvent::PlacementRejected { x, y } => EventRecord::PlacementRejected { x: *x, y: *y },
            GameEvent::PieceRotated(piece) => EventRecord::PieceRotated {
                piece: piece.index(),
                rotation: piece.rotation().as_str(),
            },
            GameEvent::PiecesSwapped { current, next } => EventRecord::PiecesSwapped {
                current: current.index(),
                next: next.index(),
            },
            GameEvent::LinesCleared {
                lines,
                blocks,
                cells,
            } => EventRecord::LinesCleared {
                lines: *lines,
                blocks: *blocks,
                cells: cells.iter().map(|c| [c.x, c.y]).collect(),
            },
            GameEvent::ScoreChanged(score) => EventRecord::ScoreChanged { score: *score },
            GameEvent::MultiplierChanged(multiplier) => EventRecord::MultiplierChanged {
                multiplier: *multiplier,
            },
            GameEvent::LevelUp(level) => EventRecord::LevelUp { level: *level },
            GameEvent::LifeLost { remaining } => EventRecord::LifeLost {
                remaining: *remaining,
            },
            GameEvent::GameOver => EventRecord::GameOver,
            GameEvent::GameLoopArmed { delay_ms } => EventRecord::GameLoopArmed {
                delay_ms: *delay_ms,
            },
        }
    }
}

#[derive(Serialize)]
struct LogLine {
    ts: u64,
    #[serde(flatten)]
    record: EventRecord,
}

/// Handle to the background writer
pub struct EventLog {
    tx: mpsc::UnboundedSender<EventRecord>,
    task: JoinHandle<()>,
}

impl EventLog {
    /// Open (create or append) `path` and start the writer task.
    pub async fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())
            .await?;

        let (tx, mut rx) = mpsc::unbounded_channel::<EventRecord>();
        let task = tokio::spawn(async move {
            let mut buf: Vec<u8> = Vec::with_capacity(256);
            while let Some(record) = rx.recv().await {
                buf.clear();
                let line = LogLine {
                    ts: current_timestamp_ms(),
                    record,
                };
                if serde_json::to_writer(&mut buf, &line).is_err() {
                    continue;
                }
                buf.push(b'\n');
                if let Err(e) = file.write_all(&buf).await {
                    warn!("event log write failed: {}", e);
                    break;
                }
            }
            let _ = file.flush().await;
        });

        Ok(Self { tx, task })
    }

    pub fn record(&self, event: &GameEvent) {
        let _ = self.tx.send(EventRecord::from(event));
    }

    /// Stop accepting events and wait until everything is written.
    pub async fn close(self) {
        drop(self.tx);
        let _ = self.task.await;
    }
}

fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::create_piece;
    use crate::types::GridCoord;

    #[test]
    fn test_record_json_shape() {
        let event = GameEvent::LinesCleared {
            lines: 1,
            blocks: 5,
            cells: vec![GridCoord::new(0, 2), GridCoord::new(1, 2)],
        };
        let json = serde_json::to_value(EventRecord::from(&event)).unwrap();
        assert_eq!(json["type"], "lines_cleared");
        assert_eq!(json["blocks"], 5);
        assert_eq!(json["cells"][1], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_record_type_matches_event_kind() {
        let piece = create_piece(4).unwrap();
        let events = [
            GameEvent::Started,
            GameEvent::PieceRotated(piece.rotated()),
            GameEvent::NextPiece {
                current: Some(piece),
                next: None,
            },
            GameEvent::GameLoopArmed { delay_ms: 0 },
        ];
        for event in &events {
            let json = serde_json::to_value(EventRecord::from(event)).unwrap();
            assert_eq!(json["type"], event.kind());
        }
    }

    #[tokio::test]
    async fn test_log_appends_lines() {
        let path = std::env::temp_dir().join(format!(
            "tetrecs-event-log-{}-{}.jsonl",
            std::process::id(),
            current_timestamp_ms()
        ));

        let log = EventLog::open(&path).await.unwrap();
        log.record(&GameEvent::Started);
        log.record(&GameEvent::ScoreChanged(50));
        log.close().await;

        let text = tokio::fs::read_to_string(&path).await.unwrap();
        let _ = tokio::fs::remove_file(&path).await;

        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "started");
        assert_eq!(lines[1]["score"], 50);
        assert!(lines[1]["ts"].as_u64().is_some());
    }
}
