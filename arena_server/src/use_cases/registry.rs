use super::types::Payload;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::warn;

const LOG_THROTTLE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// The client's outbound queue was full; this payload was skipped.
    Dropped,
    /// The client's writer is gone.
    Closed,
}

struct ClientHandle {
    outbound_tx: mpsc::Sender<Payload>,
    dropped: u64,
    last_drop_log: Instant,
}

/// Connected clients that receive broadcasts, keyed by player ID.
///
/// Sends never wait: a slow client loses payloads instead of stalling the tick.
#[derive(Default)]
pub struct ConnectionRegistry {
    clients: BTreeMap<u64, ClientHandle>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, player_id: u64, outbound_tx: mpsc::Sender<Payload>) {
        self.clients.insert(
            player_id,
            ClientHandle {
                outbound_tx,
                dropped: 0,
                last_drop_log: Instant::now() - LOG_THROTTLE,
            },
        );
    }

    /// Returns false if the client was not registered.
    pub fn unregister(&mut self, player_id: u64) -> bool {
        self.clients.remove(&player_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn send_to(&mut self, player_id: u64, payload: &Payload) -> SendOutcome {
        match self.clients.get_mut(&player_id) {
            Some(client) => deliver(player_id, client, payload),
            None => SendOutcome::Closed,
        }
    }

    /// Sends to every client and returns the IDs whose writers have gone away.
    pub fn broadcast(&mut self, payload: &Payload) -> Vec<u64> {
        let mut closed = Vec::new();
        for (&player_id, client) in self.clients.iter_mut() {
            if deliver(player_id, client, payload) == SendOutcome::Closed {
                closed.push(player_id);
            }
        }
        closed
    }
}

fn deliver(player_id: u64, client: &mut ClientHandle, payload: &Payload) -> SendOutcome {
    match client.outbound_tx.try_send(payload.clone()) {
        Ok(()) => SendOutcome::Sent,
        Err(TrySendError::Full(_)) => {
            client.dropped += 1;
            if client.last_drop_log.elapsed() >= LOG_THROTTLE {
                client.last_drop_log = Instant::now();
                warn!(player_id, dropped = client.dropped, "outbound queue full; dropping frame");
            }
            SendOutcome::Dropped
        }
        Err(TrySendError::Closed(_)) => SendOutcome::Closed,
    }
}
