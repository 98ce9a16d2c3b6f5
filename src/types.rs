use serde::Serialize;

use crate::constants::{CREATURE_COUNT, MAZE_HEIGHT, MAZE_WIDTH, TIME_LIMIT_SECS};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn normalized(&self) -> Vec3 {
        let len = self.length();
        if len == 0.0 {
            return Vec3::ZERO;
        }
        Vec3::new(self.x / len, self.y / len, self.z / len)
    }

    pub fn scaled(&self, factor: f32) -> Vec3 {
        Vec3::new(self.x * factor, self.y * factor, self.z * factor)
    }

    // Navigation happens on the X/Z plane; Y is a cosmetic float height.
    pub fn horizontal_distance_to(&self, other: Vec3) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct InputState {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Left,
    Right,
    Neutral,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatureMode {
    Wandering,
    Alert,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    Escaped,
    Timeout,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct GameConfig {
    pub width: i32,
    pub height: i32,
    #[serde(rename = "creatureCount")]
    pub creature_count: usize,
    #[serde(rename = "timeLimitSecs")]
    pub time_limit_secs: f32,
    pub seed: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: MAZE_WIDTH,
            height: MAZE_HEIGHT,
            creature_count: CREATURE_COUNT,
            time_limit_secs: TIME_LIMIT_SECS,
            seed: 0,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub facing: Facing,
}

#[derive(Clone, Debug, Serialize)]
pub struct CreatureView {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub mode: CreatureMode,
    pub facing: Facing,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    CreatureAlerted {
        #[serde(rename = "creatureId")]
        creature_id: String,
    },
    CreatureCalmed {
        #[serde(rename = "creatureId")]
        creature_id: String,
    },
    CreatureCaught {
        #[serde(rename = "creatureId")]
        creature_id: String,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "timeLeft")]
    pub time_left: f32,
    pub score: i32,
    pub player: PlayerView,
    pub creatures: Vec<CreatureView>,
    pub events: Vec<RuntimeEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
    pub reason: GameOverReason,
    pub score: i32,
    #[serde(rename = "durationSecs")]
    pub duration_secs: f32,
    pub message: String,
}
