// Fixed gameplay constants. Runtime configuration (ports, tick period) lives in frameworks.

pub mod powerup;
pub mod projectile;
pub mod tank;

pub use powerup::PowerupTuning;
pub use projectile::ProjectileTuning;
pub use tank::TankTuning;
