use crate::domain::arena::Arena;
use crate::domain::state::{Powerup, PowerupSnapshot};
use crate::domain::tuning::PowerupTuning;
use rand::Rng;
use std::collections::BTreeMap;

/// Counts down dead powerups and relocates the ones whose countdown reached zero.
/// Every powerup is emitted, dead or alive.
pub fn tick_powerups<R: Rng + ?Sized>(
    powerups: &mut BTreeMap<u64, Powerup>,
    arena: &Arena,
    rng: &mut R,
    tuning: &PowerupTuning,
) -> Vec<PowerupSnapshot> {
    let mut out = Vec::with_capacity(powerups.len());
    for powerup in powerups.values_mut() {
        powerup.decrease_cooldown();
        if powerup.ready_for_respawn() {
            powerup.respawn(arena.random_location(rng, tuning.spawn_clearance));
        }
        out.push(PowerupSnapshot::from(&*powerup));
    }
    out
}
