/// Gameplay tuning for projectiles and beams.

#[derive(Debug, Clone, Copy)]
pub struct ProjectileTuning {
    /// Distance travelled per tick.
    pub speed: f64,

    /// Wall reflections allowed in bounce mode before wall contact is lethal.
    pub max_bounces: u32,

    /// Radius of the circle a beam must cross to hit a tank.
    pub beam_hit_radius: f64,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            speed: 10.0,
            max_bounces: 3,
            beam_hit_radius: 30.0,
        }
    }
}
