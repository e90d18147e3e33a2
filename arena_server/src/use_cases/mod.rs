// Use cases layer: the simulation task and the connections it streams to.

pub mod game;
pub mod registry;
pub mod types;

pub use registry::ConnectionRegistry;
pub use types::{GameEvent, Payload};
