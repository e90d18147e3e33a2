use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_PLAYER_ID: AtomicU64 = AtomicU64::new(0);

/// Returns a process-unique player identifier. IDs start at 0 and are never reused,
/// so a reconnecting client always gets a fresh tank.
pub fn next_player_id() -> u64 {
    NEXT_PLAYER_ID.fetch_add(1, Ordering::Relaxed)
}
