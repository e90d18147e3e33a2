// Use-case level inputs for the game loop.

use crate::domain::Intent;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Pre-serialized outbound payload, shared between every client that receives it.
pub type Payload = Arc<str>;

#[derive(Debug)]
pub enum GameEvent {
    /// Client sent its name; spawn a tank and start streaming to `outbound_tx`.
    Join {
        player_id: u64,
        name: String,
        outbound_tx: mpsc::Sender<Payload>,
    },
    Intent { player_id: u64, intent: Intent },
    Leave { player_id: u64 },
}
