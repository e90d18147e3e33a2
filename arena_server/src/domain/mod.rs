// Domain layer: arena geometry, entities and the per-tick rules.

pub mod arena;
pub mod geometry;
pub mod state;
pub mod systems;
pub mod tuning;
pub mod world;

pub use arena::Arena;
pub use geometry::{Vec2, Wall};
pub use state::{
    Beam, FireMode, Frame, GameMode, Intent, MoveDirection, PowerupSnapshot, ProjectileSnapshot,
    TankSnapshot,
};
pub use world::{Rules, World};
