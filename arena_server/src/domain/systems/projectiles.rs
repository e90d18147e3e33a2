use crate::domain::arena::Arena;
use crate::domain::geometry::{point_in_rect, reflect_off_wall};
use crate::domain::state::{GameMode, Projectile, ProjectileSnapshot, Tank};
use crate::domain::tuning::ProjectileTuning;
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Clone, Copy)]
pub struct ProjectileConfig {
    pub mode: GameMode,
    pub tuning: ProjectileTuning,
    pub tank_half_size: f64,
}

pub fn tick_projectiles(
    projectiles: &mut BTreeMap<u64, Projectile>,
    tanks: &mut BTreeMap<u64, Tank>,
    arena: &Arena,
    cfg: ProjectileConfig,
) -> Vec<ProjectileSnapshot> {
    let mut out = Vec::with_capacity(projectiles.len());

    for p in projectiles.values_mut() {
        if p.died {
            continue;
        }

        p.advance();

        if !arena.contains(p.location, 0.0) {
            p.died = true;
        } else {
            if let Some(wall) = arena.wall_at(p.location, 0.0) {
                match cfg.mode {
                    GameMode::Bounce if p.bounces < cfg.tuning.max_bounces => {
                        let dir = reflect_off_wall(p.location, p.dir, wall, cfg.tuning.speed);
                        p.bounce(dir);
                    }
                    _ => p.died = true,
                }
            }

            // Tank hits are checked even on the tick a wall stopped the projectile.
            let mut scored = 0;
            for tank in tanks.values_mut() {
                if !tank.is_alive()
                    || tank.id == p.owner_id
                    || !point_in_rect(p.location, tank.location, cfg.tank_half_size, cfg.tank_half_size)
                {
                    continue;
                }

                tank.damage();
                if tank.hp == 0 {
                    scored += 1;
                }
                info!(
                    victim_id = tank.id,
                    shooter_id = p.owner_id,
                    projectile_id = p.id,
                    victim_hp = tank.hp,
                    "tank hit"
                );
                p.died = true;
            }

            // The shooter may have disconnected while the projectile was in flight.
            if scored > 0 {
                if let Some(owner) = tanks.get_mut(&p.owner_id) {
                    owner.score += scored;
                }
            }
        }

        out.push(ProjectileSnapshot::from(&*p));
    }

    // Dead projectiles have been reported once; drop them.
    projectiles.retain(|_, p| !p.died);
    out
}
