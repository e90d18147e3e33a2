use crate::domain::Arena;
use crate::use_cases::GameEvent;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Clone)]
pub struct AppState {
    // Events flowing from connections into the world task.
    pub input_tx: mpsc::Sender<GameEvent>,
    // Read-only arena layout for handshakes.
    pub arena: Arc<Arena>,
    // Per-connection outbound queue length, in payloads.
    pub outbound_capacity: usize,
}
