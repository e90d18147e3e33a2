/// Gameplay tuning for tanks.
///
/// Keep this separate from the settings file (arena size, tick period, respawn rate).

#[derive(Debug, Clone, Copy)]
pub struct TankTuning {
    /// Distance travelled per tick while moving.
    pub speed: f64,

    /// Speed multiplier while a speed boost is active.
    pub boost_ratio: f64,

    /// Speed boost duration in ticks.
    pub boost_ticks: i64,

    /// Rapid-fire duration in ticks.
    pub rapid_fire_ticks: i64,

    /// Shot cooldown multiplier while rapid fire is active.
    pub rapid_fire_ratio: f64,

    /// Hit points on spawn and respawn.
    pub start_hp: u32,

    /// Maximum stored beam charges.
    pub max_beams: u32,

    /// Half extent of the tank's square body for movement, pickups and hits.
    pub half_size: f64,
}

impl Default for TankTuning {
    fn default() -> Self {
        Self {
            speed: 3.0,
            boost_ratio: 2.0,
            boost_ticks: 500,
            rapid_fire_ticks: 500,
            rapid_fire_ratio: 0.2,
            start_hp: 3,
            max_beams: 3,
            half_size: 30.0,
        }
    }
}
