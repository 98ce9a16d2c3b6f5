pub const MAZE_WIDTH: i32 = 21;
pub const MAZE_HEIGHT: i32 = 21;
pub const MIN_MAZE_DIM: i32 = 5;
pub const CELL_SIZE: f32 = 4.0;
pub const WALL_HEIGHT: f32 = 2.0;

pub const AGENT_HALF_EXTENT: f32 = 0.5;
pub const PLAYER_FLOAT_HEIGHT: f32 = 2.0;
pub const CREATURE_FLOAT_HEIGHT: f32 = 1.5;

pub const PLAYER_SPEED: f32 = 10.0;
pub const CREATURE_SPEED: f32 = 3.0;
pub const CREATURE_COUNT: usize = 10;

pub const TIME_LIMIT_SECS: f32 = 120.0;
pub const ALERT_RADIUS: f32 = 5.0;
pub const CATCH_RADIUS: f32 = 1.0;
pub const ESCAPE_RADIUS: f32 = 2.0;

pub const HEADING_MIN_SECS: f32 = 1.0;
pub const HEADING_MAX_SECS: f32 = 3.0;

// Rejection-sampling cap for free-cell lookups. Generous for any
// valid maze (~50% path density); only degenerate grids exhaust it.
pub const FREE_CELL_ATTEMPTS: usize = 10_000;

pub const TICK_RATE: u32 = 60;
pub const TICK_SECS: f32 = 1.0 / TICK_RATE as f32;
