use crate::domain::geometry::{Vec2, ray_hits_circle};
use crate::domain::state::{Beam, Intent, Tank};
use crate::domain::tuning::TankTuning;
use std::collections::BTreeMap;
use tracing::info;

/// Applies the movement and aim parts of an intent. Firing is handled by the world,
/// which owns the ID counters.
pub fn steer_tank(tank: &mut Tank, intent: &Intent, tuning: &TankTuning) {
    match intent.moving {
        Some(dir) => tank.set_moving(dir.vector(), tuning),
        None => tank.stop(),
    }

    if let Some(aim) = intent.aim {
        let aim = aim.normalize();
        // A zero aim would leave projectiles parked in place.
        if aim != Vec2::ZERO {
            tank.aim = aim;
        }
    }
}

/// Kills every living tank crossed by the beam and credits the shooter.
///
/// The beam starts at the shooter's centre, so the shooter's own circle never counts
/// as a hit. Returns the victim IDs in ID order.
pub fn resolve_beam(beam: &Beam, tanks: &mut BTreeMap<u64, Tank>, hit_radius: f64) -> Vec<u64> {
    let mut victims = Vec::new();
    for tank in tanks.values_mut() {
        if tank.is_alive() && ray_hits_circle(beam.origin, beam.dir, tank.location, hit_radius) {
            tank.kill();
            victims.push(tank.id);
            info!(victim_id = tank.id, shooter_id = beam.owner_id, beam_id = beam.id, "beam kill");
        }
    }

    if let Some(shooter) = tanks.get_mut(&beam.owner_id) {
        shooter.score += victims.len() as u64;
    }
    victims
}
