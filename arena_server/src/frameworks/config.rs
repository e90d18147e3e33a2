use std::{
    env,
    net::{IpAddr, Ipv4Addr},
    path::PathBuf,
};

// Runtime/server constants (not gameplay tuning).

pub fn game_port() -> u16 {
    env::var("GAME_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(11000)
}

pub fn bind_host() -> IpAddr {
    env::var("GAME_SERVER_HOST")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

pub fn settings_path() -> PathBuf {
    env::var_os("ARENA_SETTINGS")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("settings.toml"))
}

pub const INPUT_CHANNEL_CAPACITY: usize = 1024;
// Per-client queue of pending broadcast payloads.
pub const OUTBOUND_CHANNEL_CAPACITY: usize = 64;
