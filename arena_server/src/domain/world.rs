// Authoritative entity store. Owned by the simulation task; nothing else mutates it.

use super::arena::Arena;
use super::state::{
    Beam, FireMode, Frame, GameMode, Intent, Powerup, Projectile, Tank, TankSnapshot,
};
use super::systems::{combat, powerups, projectiles, tanks};
use super::tuning::{PowerupTuning, ProjectileTuning, TankTuning};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeMap;
use tracing::debug;

/// Rules taken from the settings file.
#[derive(Debug, Clone, Copy)]
pub struct Rules {
    pub mode: GameMode,
    pub frames_per_shot: i64,
    pub respawn_rate: i64,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            mode: GameMode::Base,
            frames_per_shot: 80,
            respawn_rate: 300,
        }
    }
}

pub struct World {
    arena: Arena,
    rules: Rules,
    tank_tuning: TankTuning,
    projectile_tuning: ProjectileTuning,
    powerup_tuning: PowerupTuning,

    tanks: BTreeMap<u64, Tank>,
    projectiles: BTreeMap<u64, Projectile>,
    powerups: BTreeMap<u64, Powerup>,

    next_projectile_id: u64,
    next_powerup_id: u64,
    next_beam_id: u64,
    tick: u64,

    rng: StdRng,
}

impl World {
    pub fn new(arena: Arena, rules: Rules) -> Self {
        Self::with_rng(arena, rules, StdRng::from_entropy())
    }

    /// Deterministic world for tests and replays.
    pub fn with_seed(arena: Arena, rules: Rules, seed: u64) -> Self {
        Self::with_rng(arena, rules, StdRng::seed_from_u64(seed))
    }

    fn with_rng(arena: Arena, rules: Rules, rng: StdRng) -> Self {
        let mut world = Self {
            arena,
            rules,
            tank_tuning: TankTuning::default(),
            projectile_tuning: ProjectileTuning::default(),
            powerup_tuning: PowerupTuning::default(),
            tanks: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            powerups: BTreeMap::new(),
            next_projectile_id: 0,
            next_powerup_id: 0,
            next_beam_id: 0,
            tick: 0,
            rng,
        };
        world.seed_powerups();
        world
    }

    /// Fills the powerup store up to the cap. Initial placement ignores wall clearance.
    fn seed_powerups(&mut self) {
        while self.next_powerup_id < self.powerup_tuning.max_count {
            let id = self.next_powerup_id;
            let location = self.arena.random_location(&mut self.rng, 0.0);
            self.powerups.insert(id, Powerup::new(id, location));
            self.next_powerup_id += 1;
        }
    }

    pub fn tank(&self, id: u64) -> Option<&Tank> {
        self.tanks.get(&id)
    }

    pub fn tank_count(&self) -> usize {
        self.tanks.len()
    }

    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    #[cfg(test)]
    pub(crate) fn powerups(&self) -> impl Iterator<Item = &Powerup> {
        self.powerups.values()
    }

    /// Places a new tank at a wall-free point and returns its join record.
    ///
    /// The returned record carries `joined = true`; the stored tank has the flag
    /// cleared so later broadcasts report `join: false`.
    pub fn spawn_tank(&mut self, id: u64, name: String) -> TankSnapshot {
        let location = self
            .arena
            .random_location(&mut self.rng, self.tank_tuning.half_size);
        let mut tank = Tank::new(id, name, location, &self.tank_tuning);
        let snapshot = TankSnapshot::from(&tank);
        tank.joined = false;
        self.tanks.insert(id, tank);
        snapshot
    }

    /// Applies a client intent. Returns the beam to broadcast if one was fired.
    pub fn apply_intent(&mut self, player_id: u64, intent: &Intent) -> Option<Beam> {
        let tank = self.tanks.get_mut(&player_id)?;
        combat::steer_tank(tank, intent, &self.tank_tuning);

        // Firing is gated only by the shot cooldown and beam charges, not by hp.
        match intent.fire? {
            FireMode::Main => {
                if tank.try_fire(self.rules.frames_per_shot, &self.tank_tuning) {
                    let id = self.next_projectile_id;
                    self.next_projectile_id += 1;
                    self.projectiles.insert(
                        id,
                        Projectile {
                            id,
                            owner_id: tank.id,
                            speed: self.projectile_tuning.speed,
                            location: tank.location,
                            dir: tank.aim,
                            died: false,
                            bounces: 0,
                        },
                    );
                    debug!(player_id, projectile_id = id, "projectile fired");
                }
                None
            }
            FireMode::Alt => {
                if !tank.try_beam() {
                    return None;
                }
                let beam = Beam {
                    id: self.next_beam_id,
                    origin: tank.location,
                    dir: tank.aim,
                    owner_id: tank.id,
                };
                self.next_beam_id += 1;
                combat::resolve_beam(&beam, &mut self.tanks, self.projectile_tuning.beam_hit_radius);
                Some(beam)
            }
        }
    }

    /// Marks the tank disconnected, removes it, and returns its final record.
    pub fn disconnect_tank(&mut self, player_id: u64) -> Option<TankSnapshot> {
        let mut tank = self.tanks.remove(&player_id)?;
        tank.disconnect();
        Some(TankSnapshot::from(&tank))
    }

    /// Runs one tick: tanks, then powerups, then projectiles.
    pub fn step(&mut self) -> Frame {
        self.tick += 1;

        let tanks = tanks::tick_tanks(
            &mut self.tanks,
            &mut self.powerups,
            &self.arena,
            &mut self.rng,
            tanks::TankPhaseConfig {
                mode: self.rules.mode,
                respawn_rate: self.rules.respawn_rate,
                tank: self.tank_tuning,
                powerup: self.powerup_tuning,
            },
        );

        let powerups = powerups::tick_powerups(
            &mut self.powerups,
            &self.arena,
            &mut self.rng,
            &self.powerup_tuning,
        );

        let projectiles = projectiles::tick_projectiles(
            &mut self.projectiles,
            &mut self.tanks,
            &self.arena,
            projectiles::ProjectileConfig {
                mode: self.rules.mode,
                tuning: self.projectile_tuning,
                tank_half_size: self.tank_tuning.half_size,
            },
        );

        Frame {
            tick: self.tick,
            tanks,
            powerups,
            projectiles,
        }
    }

    #[cfg(test)]
    pub(crate) fn tank_mut(&mut self, id: u64) -> Option<&mut Tank> {
        self.tanks.get_mut(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::Vec2;
    use crate::domain::state::{MoveDirection, NOT_RESPAWNING};

    fn world() -> World {
        World::with_seed(Arena::new(1000.0, Vec::new()), Rules::default(), 42)
    }

    fn place(world: &mut World, id: u64, at: Vec2) {
        world.spawn_tank(id, format!("p{id}"));
        if let Some(t) = world.tank_mut(id) {
            t.location = at;
        }
    }

    fn fire(kind: FireMode, aim: Vec2) -> Intent {
        Intent {
            moving: None,
            fire: Some(kind),
            aim: Some(aim),
        }
    }

    #[test]
    fn powerups_are_seeded_up_to_the_cap() {
        let w = world();
        let ids: Vec<u64> = w.powerups().map(|p| p.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(w.powerups().all(|p| !p.died));
    }

    #[test]
    fn join_record_is_flagged_only_once() {
        let mut w = world();
        let joined = w.spawn_tank(5, "Ace".into());
        assert!(joined.joined);
        assert_eq!(joined.hp, 3);
        assert_eq!(joined.score, 0);
        assert_eq!(joined.name, "Ace");

        let frame = w.step();
        let tank = frame.tanks.iter().find(|t| t.id == 5);
        assert!(matches!(tank, Some(t) if !t.joined));
    }

    #[test]
    fn shot_cooldown_gates_main_fire() {
        let mut w = world();
        place(&mut w, 1, Vec2::ZERO);

        w.apply_intent(1, &fire(FireMode::Main, Vec2::new(0.0, -1.0)));
        w.apply_intent(1, &fire(FireMode::Main, Vec2::new(0.0, -1.0)));
        assert_eq!(w.projectile_count(), 1);

        let frame = w.step();
        assert_eq!(frame.projectiles.len(), 1);
        assert_eq!(frame.projectiles[0].location, Vec2::new(0.0, -10.0));
        assert_eq!(frame.projectiles[0].owner_id, 1);
    }

    #[test]
    fn projectile_ids_are_monotonic() {
        let mut w = world();
        place(&mut w, 1, Vec2::ZERO);
        place(&mut w, 2, Vec2::new(200.0, 200.0));
        w.apply_intent(1, &fire(FireMode::Main, Vec2::new(1.0, 0.0)));
        w.apply_intent(2, &fire(FireMode::Main, Vec2::new(1.0, 0.0)));

        let frame = w.step();
        let ids: Vec<u64> = frame.projectiles.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn alt_fire_needs_a_charge() {
        let mut w = world();
        place(&mut w, 1, Vec2::ZERO);
        place(&mut w, 2, Vec2::new(0.0, -200.0));

        assert!(w.apply_intent(1, &fire(FireMode::Alt, Vec2::new(0.0, -1.0))).is_none());

        if let Some(t) = w.tank_mut(1) {
            t.beams = 1;
        }
        let beam = w.apply_intent(1, &fire(FireMode::Alt, Vec2::new(0.0, -1.0)));
        assert!(matches!(beam, Some(ref b) if b.id == 0 && b.owner_id == 1));
        assert_eq!(w.tank(2).map(|t| t.hp), Some(0));
        assert_eq!(w.tank(1).map(|t| t.score), Some(1));
        assert_eq!(w.tank(1).map(|t| t.beams), Some(0));

        // The victim's death is reported on the next tick, exactly once.
        let frame = w.step();
        let victim = frame.tanks.iter().find(|t| t.id == 2);
        assert!(matches!(victim, Some(t) if t.died && t.hp == 0));
        let frame = w.step();
        assert!(frame.tanks.iter().all(|t| t.id != 2));
    }

    #[test]
    fn respawning_tank_still_fires_when_ready() {
        let mut w = world();
        place(&mut w, 1, Vec2::ZERO);
        if let Some(t) = w.tank_mut(1) {
            t.hp = 0;
            t.beams = 1;
        }
        w.step();
        assert!(w.tank(1).is_some_and(|t| t.is_respawning() && t.shot_cooldown == 0));

        w.apply_intent(1, &fire(FireMode::Main, Vec2::new(1.0, 0.0)));
        assert_eq!(w.projectile_count(), 1);

        let charges = w.tank(1).map_or(0, |t| t.beams);
        let beam = w.apply_intent(1, &fire(FireMode::Alt, Vec2::new(1.0, 0.0)));
        assert!(beam.is_some_and(|b| b.owner_id == 1));
        assert_eq!(w.tank(1).map(|t| t.beams), Some(charges - 1));
    }

    #[test]
    fn projectile_kill_scores_and_hides_the_victim() {
        let mut w = world();
        place(&mut w, 1, Vec2::ZERO);
        place(&mut w, 2, Vec2::new(100.0, 0.0));
        if let Some(t) = w.tank_mut(2) {
            t.hp = 1;
        }

        w.apply_intent(1, &fire(FireMode::Main, Vec2::new(1.0, 0.0)));
        // Travels 10 per tick; enters the victim's box (x > 70) on tick 8.
        let mut hit_tick = None;
        for _ in 0..10 {
            let frame = w.step();
            if frame.projectiles.iter().any(|p| p.died) {
                hit_tick = Some(frame.tick);
                break;
            }
        }
        assert_eq!(hit_tick, Some(8));
        assert_eq!(w.tank(1).map(|t| t.score), Some(1));

        let frame = w.step();
        assert!(matches!(frame.tanks.iter().find(|t| t.id == 2), Some(t) if t.died));
        assert_eq!(frame.projectiles.len(), 0);

        let frame = w.step();
        assert!(frame.tanks.iter().all(|t| t.id != 2));
        assert!(w.tank(2).is_some_and(|t| t.respawn_cooldown != NOT_RESPAWNING));
    }

    #[test]
    fn hp_stays_in_range_under_repeated_hits() {
        let mut w = world();
        place(&mut w, 1, Vec2::ZERO);
        place(&mut w, 2, Vec2::new(60.0, 0.0));

        for _ in 0..400 {
            w.apply_intent(1, &fire(FireMode::Main, Vec2::new(1.0, 0.0)));
            let frame = w.step();
            for t in &frame.tanks {
                assert!(t.hp <= 3);
            }
        }
        assert!(w.tank(1).is_some_and(|t| t.score >= 1));
    }

    #[test]
    fn disconnect_returns_final_record_and_removes_tank() {
        let mut w = world();
        place(&mut w, 1, Vec2::ZERO);

        let last = w.disconnect_tank(1);
        assert!(matches!(last, Some(ref t) if t.disconnected && t.died && t.hp == 0));
        assert!(w.tank(1).is_none());
        assert!(w.disconnect_tank(1).is_none());
        assert!(w.step().tanks.is_empty());
    }

    #[test]
    fn movement_intent_moves_on_next_step() {
        let mut w = world();
        place(&mut w, 1, Vec2::ZERO);
        w.apply_intent(
            1,
            &Intent {
                moving: Some(MoveDirection::Down),
                ..Intent::default()
            },
        );
        let frame = w.step();
        assert_eq!(frame.tanks[0].location, Vec2::new(0.0, 3.0));
    }
}
