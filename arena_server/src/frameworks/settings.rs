// Game settings file: arena layout and rule parameters, loaded once at startup.

use crate::domain::{Arena, GameMode, Rules, Vec2, Wall};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

fn default_ms_per_frame() -> u64 {
    90
}

fn default_frames_per_shot() -> u32 {
    80
}

fn default_respawn_rate() -> u32 {
    300
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("universe_size must be positive")]
    EmptyArena,
    #[error("ms_per_frame must be positive")]
    ZeroTickPeriod,
    #[error("unknown game_mode {0} (expected 0 or 1)")]
    UnknownGameMode(u8),
    #[error("wall {index} is not axis-aligned")]
    SlantedWall { index: usize },
}

/// One `[[walls]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct WallSetting {
    pub p1: Vec2,
    pub p2: Vec2,
}

/// Parsed settings file.
///
/// ```toml
/// universe_size = 2000
/// game_mode = 0
/// ms_per_frame = 17
/// frames_per_shot = 80
/// respawn_rate = 300
///
/// [[walls]]
/// p1 = { x = -575.0, y = -575.0 }
/// p2 = { x = 575.0, y = -575.0 }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct GameSettings {
    pub universe_size: u32,
    #[serde(default)]
    pub game_mode: u8,
    #[serde(default = "default_ms_per_frame")]
    pub ms_per_frame: u64,
    #[serde(default = "default_frames_per_shot")]
    pub frames_per_shot: u32,
    #[serde(default = "default_respawn_rate")]
    pub respawn_rate: u32,
    #[serde(default)]
    pub walls: Vec<WallSetting>,
}

impl GameSettings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: GameSettings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.universe_size == 0 {
            return Err(SettingsError::EmptyArena);
        }
        if self.ms_per_frame == 0 {
            return Err(SettingsError::ZeroTickPeriod);
        }
        if GameMode::from_code(self.game_mode).is_none() {
            return Err(SettingsError::UnknownGameMode(self.game_mode));
        }
        if let Some(index) = self
            .walls
            .iter()
            .position(|w| w.p1.x != w.p2.x && w.p1.y != w.p2.y)
        {
            return Err(SettingsError::SlantedWall { index });
        }
        Ok(())
    }

    /// Walls are numbered from 1 in file order.
    pub fn arena(&self) -> Arena {
        let walls = self
            .walls
            .iter()
            .zip(1u64..)
            .map(|(w, id)| Wall {
                id,
                p1: w.p1,
                p2: w.p2,
            })
            .collect();
        Arena::new(f64::from(self.universe_size), walls)
    }

    pub fn rules(&self) -> Rules {
        Rules {
            mode: GameMode::from_code(self.game_mode).unwrap_or(GameMode::Base),
            frames_per_shot: i64::from(self.frames_per_shot),
            respawn_rate: i64::from(self.respawn_rate),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.ms_per_frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_file_uses_defaults() {
        let settings = GameSettings::from_toml_str("universe_size = 1200\n").unwrap();
        assert_eq!(settings.ms_per_frame, 90);
        assert_eq!(settings.tick_interval(), Duration::from_millis(90));
        let rules = settings.rules();
        assert_eq!(rules.mode, GameMode::Base);
        assert_eq!(rules.frames_per_shot, 80);
        assert_eq!(rules.respawn_rate, 300);
        assert!(settings.arena().walls.is_empty());
        assert_eq!(settings.arena().size, 1200.0);
    }

    #[test]
    fn walls_are_numbered_from_one_in_file_order() {
        let settings = GameSettings::from_toml_str(
            r#"
            universe_size = 2000
            game_mode = 1

            [[walls]]
            p1 = { x = -100.0, y = 0.0 }
            p2 = { x = 100.0, y = 0.0 }

            [[walls]]
            p1 = { x = 300.0, y = -50.0 }
            p2 = { x = 300.0, y = 50.0 }
            "#,
        )
        .unwrap();

        let arena = settings.arena();
        assert_eq!(arena.walls.len(), 2);
        assert_eq!(arena.walls[0].id, 1);
        assert_eq!(arena.walls[1].id, 2);
        assert_eq!(arena.walls[1].p2, Vec2::new(300.0, 50.0));
        assert_eq!(settings.rules().mode, GameMode::Bounce);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            GameSettings::from_toml_str("universe_size = 0"),
            Err(SettingsError::EmptyArena)
        ));
        assert!(matches!(
            GameSettings::from_toml_str("universe_size = 10\nms_per_frame = 0"),
            Err(SettingsError::ZeroTickPeriod)
        ));
        assert!(matches!(
            GameSettings::from_toml_str("universe_size = 10\ngame_mode = 2"),
            Err(SettingsError::UnknownGameMode(2))
        ));
        assert!(matches!(
            GameSettings::from_toml_str(
                "universe_size = 10\n[[walls]]\np1 = { x = 0.0, y = 0.0 }\np2 = { x = 5.0, y = 5.0 }\n"
            ),
            Err(SettingsError::SlantedWall { index: 0 })
        ));
        assert!(matches!(
            GameSettings::from_toml_str("game_mode = 0"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = GameSettings::load(Path::new("/nonexistent/arena-settings.toml")).unwrap_err();
        assert!(err.to_string().contains("arena-settings.toml"));
    }
}
