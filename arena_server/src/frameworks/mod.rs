// Frameworks layer: process bootstrap, environment and settings file.

pub mod config;
pub mod server;
pub mod settings;
