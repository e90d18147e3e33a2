/// Gameplay tuning for powerups.

#[derive(Debug, Clone, Copy)]
pub struct PowerupTuning {
    /// Number of powerups seeded at startup.
    pub max_count: u64,

    /// Exclusive upper bound of the random respawn delay, in ticks.
    pub max_respawn_delay: i64,

    /// Wall clearance used when placing a respawned powerup.
    pub spawn_clearance: f64,
}

impl Default for PowerupTuning {
    fn default() -> Self {
        Self {
            max_count: 3,
            max_respawn_delay: 1650,
            spawn_clearance: 15.0,
        }
    }
}
