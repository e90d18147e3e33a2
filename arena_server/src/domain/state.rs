// Domain-level simulation entities, decoded intents and per-tick snapshots.

use super::geometry::Vec2;
use super::tuning::TankTuning;

/// Body orientation given to freshly spawned and respawned tanks.
pub const SPAWN_FACING: Vec2 = Vec2::new(0.0, -1.0);

/// Respawn countdown value meaning "alive, not respawning".
pub const NOT_RESPAWNING: i64 = -1;

/// Rule set selected by the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    /// Any wall contact destroys a projectile; every pickup grants a beam charge.
    Base,
    /// Projectiles bounce off walls and pickups grant a random effect.
    Bounce,
}

impl GameMode {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(GameMode::Base),
            1 => Some(GameMode::Bounce),
            _ => None,
        }
    }
}

/// Effect granted by a powerup pickup. The discriminants match the effect codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerupEffect {
    ExtraBeam = 0,
    RapidFire = 1,
    SpeedBoost = 2,
}

impl PowerupEffect {
    pub const ALL: [PowerupEffect; 3] = [
        PowerupEffect::ExtraBeam,
        PowerupEffect::RapidFire,
        PowerupEffect::SpeedBoost,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Left,
    Up,
    Right,
    Down,
}

impl MoveDirection {
    pub fn vector(self) -> Vec2 {
        match self {
            MoveDirection::Left => Vec2::new(-1.0, 0.0),
            MoveDirection::Up => Vec2::new(0.0, -1.0),
            MoveDirection::Right => Vec2::new(1.0, 0.0),
            MoveDirection::Down => Vec2::new(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireMode {
    Main,
    Alt,
}

/// One decoded client input line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Intent {
    /// `None` means stop.
    pub moving: Option<MoveDirection>,
    pub fire: Option<FireMode>,
    /// `None` keeps the previous aim.
    pub aim: Option<Vec2>,
}

pub struct Tank {
    pub id: u64,
    pub name: String,
    pub location: Vec2,
    pub body_dir: Vec2,
    pub aim: Vec2,
    pub hp: u32,
    pub score: u64,

    // Movement-only state (never serialized to clients).
    pub speed: f64,
    pub shot_cooldown: i64,
    pub respawn_cooldown: i64,
    pub boost_cooldown: i64,
    pub rapid_fire_cooldown: i64,
    pub beams: u32,

    // One-tick flags.
    pub died: bool,
    pub disconnected: bool,
    pub joined: bool,
}

impl Tank {
    pub fn new(id: u64, name: String, location: Vec2, tuning: &TankTuning) -> Self {
        Self {
            id,
            name,
            location,
            body_dir: SPAWN_FACING,
            aim: SPAWN_FACING,
            hp: tuning.start_hp,
            score: 0,
            speed: 0.0,
            shot_cooldown: 0,
            respawn_cooldown: NOT_RESPAWNING,
            boost_cooldown: 0,
            rapid_fire_cooldown: 0,
            beams: 0,
            died: false,
            disconnected: false,
            joined: true,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn is_respawning(&self) -> bool {
        self.respawn_cooldown != NOT_RESPAWNING
    }

    pub fn predict_move(&self) -> Vec2 {
        self.location + self.body_dir * self.speed
    }

    pub fn set_moving(&mut self, dir: Vec2, tuning: &TankTuning) {
        self.body_dir = dir;
        self.speed = if self.boost_cooldown > 0 {
            // Boosted speed is truncated to whole units per tick.
            (tuning.speed * tuning.boost_ratio).trunc()
        } else {
            tuning.speed
        };
    }

    pub fn stop(&mut self) {
        self.speed = 0.0;
    }

    /// Removes one hit point, floored at zero.
    pub fn damage(&mut self) {
        self.hp = self.hp.saturating_sub(1);
    }

    /// Kills the tank outright; the tank phase turns this into a respawn.
    pub fn kill(&mut self) {
        self.hp = 0;
        self.died = true;
    }

    pub fn disconnect(&mut self) {
        self.kill();
        self.disconnected = true;
    }

    pub fn start_respawn(&mut self, respawn_rate: i64) {
        self.respawn_cooldown = respawn_rate.max(0);
    }

    pub fn respawn(&mut self, location: Vec2, tuning: &TankTuning) {
        self.location = location;
        self.body_dir = SPAWN_FACING;
        self.hp = tuning.start_hp;
        self.respawn_cooldown = NOT_RESPAWNING;
    }

    pub fn decrease_cooldowns(&mut self) {
        for cd in [
            &mut self.shot_cooldown,
            &mut self.respawn_cooldown,
            &mut self.boost_cooldown,
            &mut self.rapid_fire_cooldown,
        ] {
            if *cd > 0 {
                *cd -= 1;
            }
        }
    }

    /// Consumes the shot cooldown if it has elapsed.
    pub fn try_fire(&mut self, frames_per_shot: i64, tuning: &TankTuning) -> bool {
        if self.shot_cooldown != 0 {
            return false;
        }
        self.shot_cooldown = if self.rapid_fire_cooldown > 0 {
            (frames_per_shot as f64 * tuning.rapid_fire_ratio) as i64
        } else {
            frames_per_shot
        };
        true
    }

    /// Consumes one beam charge if any is stored.
    pub fn try_beam(&mut self) -> bool {
        if self.beams == 0 {
            return false;
        }
        self.beams -= 1;
        true
    }

    pub fn apply_powerup(&mut self, effect: PowerupEffect, tuning: &TankTuning) {
        match effect {
            PowerupEffect::ExtraBeam => {
                if self.beams < tuning.max_beams {
                    self.beams += 1;
                }
            }
            PowerupEffect::RapidFire => self.rapid_fire_cooldown = tuning.rapid_fire_ticks,
            PowerupEffect::SpeedBoost => self.boost_cooldown = tuning.boost_ticks,
        }
    }
}

pub struct Projectile {
    pub id: u64,
    pub owner_id: u64,
    pub speed: f64,
    pub location: Vec2,
    pub dir: Vec2,
    pub died: bool,
    pub bounces: u32,
}

impl Projectile {
    pub fn advance(&mut self) {
        self.location = self.location + self.dir * self.speed;
    }

    pub fn bounce(&mut self, dir: Vec2) {
        self.dir = dir;
        self.bounces += 1;
    }
}

pub struct Powerup {
    pub id: u64,
    pub location: Vec2,
    pub died: bool,
    pub respawn_cooldown: i64,
}

impl Powerup {
    pub fn new(id: u64, location: Vec2) -> Self {
        Self {
            id,
            location,
            died: false,
            respawn_cooldown: NOT_RESPAWNING,
        }
    }

    pub fn kill(&mut self, delay: i64) {
        self.died = true;
        self.respawn_cooldown = delay.max(0);
    }

    pub fn decrease_cooldown(&mut self) {
        if self.respawn_cooldown > 0 {
            self.respawn_cooldown -= 1;
        }
    }

    pub fn ready_for_respawn(&self) -> bool {
        self.respawn_cooldown == 0
    }

    pub fn respawn(&mut self, location: Vec2) {
        self.location = location;
        self.died = false;
        self.respawn_cooldown = NOT_RESPAWNING;
    }
}

/// A fired beam. Exists only for the instant it is resolved and broadcast.
#[derive(Debug, Clone, PartialEq)]
pub struct Beam {
    pub id: u64,
    pub origin: Vec2,
    pub dir: Vec2,
    pub owner_id: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TankSnapshot {
    pub id: u64,
    pub name: String,
    pub location: Vec2,
    pub body_dir: Vec2,
    pub aim: Vec2,
    pub hp: u32,
    pub score: u64,
    pub died: bool,
    pub disconnected: bool,
    pub joined: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileSnapshot {
    pub id: u64,
    pub owner_id: u64,
    pub location: Vec2,
    pub dir: Vec2,
    pub died: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PowerupSnapshot {
    pub id: u64,
    pub location: Vec2,
    pub died: bool,
}

/// Everything emitted by one simulation step, in emission order per kind.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub tick: u64,
    pub tanks: Vec<TankSnapshot>,
    pub powerups: Vec<PowerupSnapshot>,
    pub projectiles: Vec<ProjectileSnapshot>,
}

impl From<&Tank> for TankSnapshot {
    fn from(t: &Tank) -> Self {
        Self {
            id: t.id,
            name: t.name.clone(),
            location: t.location,
            body_dir: t.body_dir,
            aim: t.aim,
            hp: t.hp,
            score: t.score,
            died: t.died,
            disconnected: t.disconnected,
            joined: t.joined,
        }
    }
}

impl From<&Projectile> for ProjectileSnapshot {
    fn from(p: &Projectile) -> Self {
        Self {
            id: p.id,
            owner_id: p.owner_id,
            location: p.location,
            dir: p.dir,
            died: p.died,
        }
    }
}

impl From<&Powerup> for PowerupSnapshot {
    fn from(p: &Powerup) -> Self {
        Self {
            id: p.id,
            location: p.location,
            died: p.died,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tank() -> Tank {
        Tank::new(7, "Ace".to_string(), Vec2::ZERO, &TankTuning::default())
    }

    #[test]
    fn new_tank_starts_alive_and_joined() {
        let t = tank();
        assert_eq!(t.hp, 3);
        assert_eq!(t.score, 0);
        assert!(t.joined);
        assert!(!t.died);
        assert!(!t.is_respawning());
    }

    #[test]
    fn damage_floors_at_zero() {
        let mut t = tank();
        for _ in 0..5 {
            t.damage();
        }
        assert_eq!(t.hp, 0);
    }

    #[test]
    fn fire_cooldown_is_shortened_by_rapid_fire() {
        let tuning = TankTuning::default();
        let mut t = tank();
        assert!(t.try_fire(80, &tuning));
        assert_eq!(t.shot_cooldown, 80);
        assert!(!t.try_fire(80, &tuning));

        t.shot_cooldown = 0;
        t.apply_powerup(PowerupEffect::RapidFire, &tuning);
        assert!(t.try_fire(80, &tuning));
        assert_eq!(t.shot_cooldown, 16);
    }

    #[test]
    fn beam_charges_are_capped() {
        let tuning = TankTuning::default();
        let mut t = tank();
        for _ in 0..5 {
            t.apply_powerup(PowerupEffect::ExtraBeam, &tuning);
        }
        assert_eq!(t.beams, tuning.max_beams);
        assert!(t.try_beam());
        assert_eq!(t.beams, tuning.max_beams - 1);
    }

    #[test]
    fn speed_boost_doubles_move_speed() {
        let tuning = TankTuning::default();
        let mut t = tank();
        t.set_moving(MoveDirection::Right.vector(), &tuning);
        assert_eq!(t.speed, 3.0);

        t.apply_powerup(PowerupEffect::SpeedBoost, &tuning);
        t.set_moving(MoveDirection::Right.vector(), &tuning);
        assert_eq!(t.speed, 6.0);
        assert_eq!(t.predict_move(), Vec2::new(6.0, 0.0));
    }

    #[test]
    fn respawn_restores_hp_and_facing() {
        let tuning = TankTuning::default();
        let mut t = tank();
        t.body_dir = MoveDirection::Left.vector();
        t.kill();
        t.start_respawn(300);
        t.respawn(Vec2::new(10.0, 20.0), &tuning);
        assert_eq!(t.hp, 3);
        assert_eq!(t.body_dir, SPAWN_FACING);
        assert_eq!(t.respawn_cooldown, NOT_RESPAWNING);
        assert_eq!(t.location, Vec2::new(10.0, 20.0));
    }

    #[test]
    fn powerup_effect_codes_are_stable() {
        assert_eq!(PowerupEffect::from_index(0), Some(PowerupEffect::ExtraBeam));
        assert_eq!(PowerupEffect::from_index(1), Some(PowerupEffect::RapidFire));
        assert_eq!(PowerupEffect::from_index(2), Some(PowerupEffect::SpeedBoost));
        assert_eq!(PowerupEffect::from_index(3), None);
        assert_eq!(PowerupEffect::SpeedBoost as u8, 2);
    }
}
