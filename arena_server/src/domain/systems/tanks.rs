use crate::domain::arena::Arena;
use crate::domain::geometry::point_in_rect;
use crate::domain::state::{GameMode, Powerup, PowerupEffect, Tank, TankSnapshot};
use crate::domain::tuning::{PowerupTuning, TankTuning};
use rand::Rng;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct TankPhaseConfig {
    pub mode: GameMode,
    pub respawn_rate: i64,
    pub tank: TankTuning,
    pub powerup: PowerupTuning,
}

/// Moves live tanks, hands out powerups, starts and finishes respawns.
///
/// Returns a record for every tank that was not waiting to respawn at the start of its
/// turn. The `died` flag is cleared once it has been recorded.
pub fn tick_tanks<R: Rng + ?Sized>(
    tanks: &mut BTreeMap<u64, Tank>,
    powerups: &mut BTreeMap<u64, Powerup>,
    arena: &Arena,
    rng: &mut R,
    cfg: TankPhaseConfig,
) -> Vec<TankSnapshot> {
    let half_size = cfg.tank.half_size;
    let mut out = Vec::with_capacity(tanks.len());

    for tank in tanks.values_mut() {
        if !tank.is_respawning() {
            let predicted = tank.predict_move();
            if arena.wall_at(predicted, half_size).is_none() && arena.contains(predicted, half_size)
            {
                tank.location = predicted;
            }

            for powerup in powerups.values_mut() {
                if powerup.died || !point_in_rect(powerup.location, tank.location, half_size, half_size)
                {
                    continue;
                }
                let effect = pick_effect(cfg.mode, rng);
                tank.apply_powerup(effect, &cfg.tank);
                powerup.kill(rng.gen_range(0..cfg.powerup.max_respawn_delay.max(1)));
                debug!(player_id = tank.id, powerup_id = powerup.id, ?effect, "powerup taken");
            }

            if tank.hp == 0 {
                tank.died = true;
                tank.start_respawn(cfg.respawn_rate);
            }

            out.push(TankSnapshot::from(&*tank));
            tank.died = false;
        } else if tank.respawn_cooldown == 0 {
            let location = arena.random_location(rng, half_size);
            tank.respawn(location, &cfg.tank);
            debug!(player_id = tank.id, x = location.x, y = location.y, "tank respawned");
        }

        tank.decrease_cooldowns();
    }

    out
}

fn pick_effect<R: Rng + ?Sized>(mode: GameMode, rng: &mut R) -> PowerupEffect {
    match mode {
        GameMode::Base => PowerupEffect::ExtraBeam,
        GameMode::Bounce => PowerupEffect::from_index(rng.gen_range(0..PowerupEffect::ALL.len()))
            .unwrap_or(PowerupEffect::ExtraBeam),
    }
}
