//! Multiplayer piece supply
//!
//! The server hands every player the same piece sequence. [`MultiplayerSync`] is
//! the [`MatchStrategy`] side: it drains a local FIFO without blocking and asks
//! for one more piece every time it tries to draw. [`PieceFeed`] is the network
//! side: the client's reader task pushes inbound indices into the same FIFO,
//! outside the engine lock.
//!
//! An empty FIFO means "no piece yet": the engine leaves the slot empty and the
//! reader refills it when the piece arrives.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::core::{create_piece, MatchStrategy, Piece};
use crate::protocol::{OutboundMessage, ProtocolError};

type Queue = Arc<Mutex<VecDeque<Piece>>>;

fn lock(queue: &Queue) -> MutexGuard<'_, VecDeque<Piece>> {
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Server-fed piece source plus score/lives/death reporting
#[derive(Debug)]
pub struct MultiplayerSync {
    queue: Queue,
    outbound: mpsc::UnboundedSender<OutboundMessage>,
}

/// Producer half of the piece FIFO
#[derive(Debug, Clone)]
pub struct PieceFeed {
    queue: Queue,
}

impl MultiplayerSync {
    /// Create the strategy and its feed. Sends the first piece request.
    pub fn new(outbound: mpsc::UnboundedSender<OutboundMessage>) -> (Self, PieceFeed) {
        let queue: Queue = Arc::new(Mutex::new(VecDeque::new()));
        let sync = Self {
            queue: Arc::clone(&queue),
            outbound,
        };
        sync.send(OutboundMessage::RequestPiece);
        (sync, PieceFeed { queue })
    }

    fn send(&self, message: OutboundMessage) {
        if self.outbound.send(message).is_err() {
            warn!(%message, "outbound channel closed, message dropped");
        }
    }

    /// Pieces received but not drawn yet
    pub fn queued(&self) -> usize {
        lock(&self.queue).len()
    }
}

impl MatchStrategy for MultiplayerSync {
    fn next_piece(&mut self) -> Option<Piece> {
        let piece = lock(&self.queue).pop_front();
        self.send(OutboundMessage::RequestPiece);
        if piece.is_none() {
            debug!("piece queue empty");
        }
        piece
    }

    fn score_changed(&mut self, score: u32) {
        self.send(OutboundMessage::Score(score));
    }

    fn lives_changed(&mut self, lives: u32) {
        self.send(OutboundMessage::Lives(lives));
    }

    fn died(&mut self) {
        self.send(OutboundMessage::Die);
    }
}

impl PieceFeed {
    pub fn push(&self, piece: Piece) {
        lock(&self.queue).push_back(piece);
    }

    /// Enqueue catalog entry `index`
    pub fn push_index(&self, index: u8) -> Result<(), ProtocolError> {
        let piece = create_piece(index).ok_or(ProtocolError::PieceOutOfRange(i64::from(index)))?;
        self.push(piece);
        Ok(())
    }

    pub fn len(&self) -> usize {
        lock(&self.queue).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.queue).is_empty()
    }
}
