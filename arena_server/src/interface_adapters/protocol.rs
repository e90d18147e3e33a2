// Wire protocol DTOs and conversions for the line-delimited JSON stream.
// Every record is one JSON object followed by `\n`.

use crate::domain::{
    Arena, Beam, FireMode, Frame, Intent, MoveDirection, PowerupSnapshot, ProjectileSnapshot,
    TankSnapshot, Vec2, Wall,
};
use serde::{Deserialize, Serialize};

/// Tank record. The JSON key `tank` carries the ID.
#[derive(Debug, Clone, Serialize)]
pub struct TankDto {
    #[serde(rename = "tank")]
    pub id: u64,
    pub loc: Vec2,
    pub bdir: Vec2,
    pub tdir: Vec2,
    pub hp: u32,
    pub score: u64,
    pub name: String,
    pub died: bool,
    pub dc: bool,
    pub join: bool,
}

impl From<&TankSnapshot> for TankDto {
    fn from(t: &TankSnapshot) -> Self {
        Self {
            id: t.id,
            loc: t.location,
            bdir: t.body_dir,
            tdir: t.aim,
            hp: t.hp,
            score: t.score,
            name: t.name.clone(),
            died: t.died,
            dc: t.disconnected,
            join: t.joined,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectileDto {
    #[serde(rename = "proj")]
    pub id: u64,
    pub loc: Vec2,
    pub dir: Vec2,
    pub owner: u64,
    pub died: bool,
}

impl From<&ProjectileSnapshot> for ProjectileDto {
    fn from(p: &ProjectileSnapshot) -> Self {
        Self {
            id: p.id,
            loc: p.location,
            dir: p.dir,
            owner: p.owner_id,
            died: p.died,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PowerupDto {
    #[serde(rename = "power")]
    pub id: u64,
    pub loc: Vec2,
    pub died: bool,
}

impl From<&PowerupSnapshot> for PowerupDto {
    fn from(p: &PowerupSnapshot) -> Self {
        Self {
            id: p.id,
            loc: p.location,
            died: p.died,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BeamDto {
    #[serde(rename = "beam")]
    pub id: u64,
    pub org: Vec2,
    pub dir: Vec2,
    pub owner: u64,
}

impl From<&Beam> for BeamDto {
    fn from(b: &Beam) -> Self {
        Self {
            id: b.id,
            org: b.origin,
            dir: b.dir,
            owner: b.owner_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WallDto {
    #[serde(rename = "wall")]
    pub id: u64,
    pub p1: Vec2,
    pub p2: Vec2,
}

impl From<&Wall> for WallDto {
    fn from(w: &Wall) -> Self {
        Self {
            id: w.id,
            p1: w.p1,
            p2: w.p2,
        }
    }
}

/// Client intent as sent on the wire. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntentDto {
    #[serde(default)]
    pub moving: Option<String>,
    #[serde(default)]
    pub fire: Option<String>,
    #[serde(default)]
    pub tdir: Option<Vec2>,
}

impl From<IntentDto> for Intent {
    fn from(dto: IntentDto) -> Self {
        // Unknown movement strings mean "stop"; unknown fire strings mean "hold".
        let moving = match dto.moving.as_deref() {
            Some("left") => Some(MoveDirection::Left),
            Some("up") => Some(MoveDirection::Up),
            Some("right") => Some(MoveDirection::Right),
            Some("down") => Some(MoveDirection::Down),
            _ => None,
        };
        let fire = match dto.fire.as_deref() {
            Some("main") => Some(FireMode::Main),
            Some("alt") => Some(FireMode::Alt),
            _ => None,
        };
        Self {
            moving,
            fire,
            aim: dto.tdir.filter(|v| v.is_finite()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("blank line")]
    Blank,
    #[error("malformed intent: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub fn decode_intent(line: &str) -> Result<Intent, DecodeError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(DecodeError::Blank);
    }
    let dto: IntentDto = serde_json::from_str(line)?;
    Ok(dto.into())
}

/// Serializes one record and appends the line terminator.
pub fn encode_line<T: Serialize>(record: &T) -> Result<String, serde_json::Error> {
    let mut line = serde_json::to_string(record)?;
    line.push('\n');
    Ok(line)
}

/// One tick's broadcast payload: tanks, then powerups, then projectiles.
pub fn encode_frame(frame: &Frame) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    for t in &frame.tanks {
        out.push_str(&encode_line(&TankDto::from(t))?);
    }
    for p in &frame.powerups {
        out.push_str(&encode_line(&PowerupDto::from(p))?);
    }
    for p in &frame.projectiles {
        out.push_str(&encode_line(&ProjectileDto::from(p))?);
    }
    Ok(out)
}

/// Greeting sent before the client names itself: its ID, the arena side length, then
/// every wall.
pub fn encode_handshake(player_id: u64, arena: &Arena) -> Result<String, serde_json::Error> {
    let mut out = format!("{player_id}\n{}\n", arena.size as i64);
    for wall in &arena.walls {
        out.push_str(&encode_line(&WallDto::from(wall))?);
    }
    Ok(out)
}

/// Player name from the first line: only the line terminator is stripped.
pub fn parse_name(line: &str) -> String {
    line.trim_end_matches(['\n', '\r']).to_string()
}
