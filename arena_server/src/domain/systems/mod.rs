// Per-tick simulation phases. Each phase mutates the entity maps and returns the
// records it emitted, in ID order.

pub mod combat;
pub mod powerups;
pub mod projectiles;
pub mod tanks;
