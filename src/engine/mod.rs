use crate::collision;
use crate::constants::{
    ALERT_RADIUS, CATCH_RADIUS, CREATURE_FLOAT_HEIGHT, CREATURE_SPEED, ESCAPE_RADIUS,
    HEADING_MAX_SECS, HEADING_MIN_SECS, PLAYER_FLOAT_HEIGHT, PLAYER_SPEED,
};
use crate::error::GameError;
use crate::maze::Maze;
use crate::rng::Rng;
use crate::types::{
    CreatureMode, CreatureView, Facing, GameConfig, GameOverReason, GameSummary, InputState,
    PlayerView, RuntimeEvent, Snapshot, Vec3,
};

mod creature_system;
mod player_system;
mod utils;

use self::utils::{facing_for_velocity, heading_velocity};

#[derive(Clone, Debug)]
struct PlayerInternal {
    pos: Vec3,
    velocity: Vec3,
    speed: f32,
    facing: Facing,
    input: InputState,
}

#[derive(Clone, Debug)]
struct CreatureInternal {
    id: String,
    pos: Vec3,
    velocity: Vec3,
    speed: f32,
    mode: CreatureMode,
    facing: Facing,
    heading_timer: f32,
}

#[derive(Clone, Debug)]
pub struct GameEngine {
    pub config: GameConfig,
    pub maze: Maze,

    rng: Rng,
    player: PlayerInternal,
    creatures: Vec<CreatureInternal>,
    events: Vec<RuntimeEvent>,

    elapsed: f32,
    time_left: f32,
    score: i32,
    ended: bool,
    end_reason: Option<GameOverReason>,
    tick_counter: u64,
    next_id_counter: u64,
}

impl GameEngine {
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        let maze = Maze::generate(config.width, config.height, config.seed)?;
        let rng = Rng::new(config.seed);

        let mut start = maze.start_position();
        start.y = PLAYER_FLOAT_HEIGHT;

        let mut engine = Self {
            config,
            maze,
            rng,
            player: PlayerInternal {
                pos: start,
                velocity: Vec3::ZERO,
                speed: PLAYER_SPEED,
                facing: Facing::Neutral,
                input: InputState::default(),
            },
            creatures: Vec::new(),
            events: Vec::new(),
            elapsed: 0.0,
            time_left: config.time_limit_secs,
            score: 0,
            ended: false,
            end_reason: None,
            tick_counter: 0,
            next_id_counter: 1,
        };
        engine.spawn_initial_creatures()?;
        Ok(engine)
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn end_reason(&self) -> Option<GameOverReason> {
        self.end_reason
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn time_left(&self) -> f32 {
        self.time_left
    }

    pub fn creature_count(&self) -> usize {
        self.creatures.len()
    }

    pub fn set_input(&mut self, input: InputState) {
        self.player.input = input;
    }

    pub fn step(&mut self, dt: f32) {
        if self.ended {
            return;
        }
        self.tick_counter += 1;
        self.elapsed += dt;
        self.time_left -= dt;
        if self.time_left <= 0.0 {
            self.time_left = 0.0;
            self.end(GameOverReason::Timeout);
            return;
        }

        self.update_player(dt);
        self.update_creatures(dt);
        self.check_escape();
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let snapshot = Snapshot {
            tick: self.tick_counter,
            time_left: self.time_left,
            score: self.score,
            player: PlayerView {
                x: self.player.pos.x,
                y: self.player.pos.y,
                z: self.player.pos.z,
                facing: self.player.facing,
            },
            creatures: self
                .creatures
                .iter()
                .map(|creature| CreatureView {
                    id: creature.id.clone(),
                    x: creature.pos.x,
                    y: creature.pos.y,
                    z: creature.pos.z,
                    mode: creature.mode,
                    facing: creature.facing,
                })
                .collect(),
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }

    pub fn build_summary(&self) -> GameSummary {
        let reason = self.end_reason.unwrap_or(GameOverReason::Timeout);
        let message = match reason {
            GameOverReason::Escaped => format!("You Escaped! Score: {}", self.score),
            GameOverReason::Timeout => "Time's Up! Game Over!".to_string(),
        };
        GameSummary {
            reason,
            score: self.score,
            duration_secs: self.elapsed,
            message,
        }
    }

    fn check_escape(&mut self) {
        let exit = self.maze.exit_position();
        if self.player.pos.horizontal_distance_to(exit) < ESCAPE_RADIUS {
            self.end(GameOverReason::Escaped);
        }
    }

    fn end(&mut self, reason: GameOverReason) {
        self.ended = true;
        self.end_reason = Some(reason);
    }

    fn make_id(&mut self, prefix: &str) -> String {
        let id = format!("{}_{}", prefix, self.next_id_counter);
        self.next_id_counter = self.next_id_counter.saturating_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{AGENT_HALF_EXTENT, CELL_SIZE, TICK_SECS};
    use crate::maze::Cell;

    fn make_engine(seed: u32) -> GameEngine {
        GameEngine::new(GameConfig {
            seed,
            ..GameConfig::default()
        })
        .expect("engine builds from default config")
    }

    // A path cell whose east side is walled for two rows while the cell
    // below stays open: sliding south along that wall is unobstructed.
    // Kept away from the exit corner so the player cannot accidentally
    // escape mid-test.
    fn cell_with_east_wall_and_south_corridor(maze: &Maze) -> (i32, i32) {
        for y in 1..maze.height - 4 {
            for x in 1..maze.width - 4 {
                if maze.cell(x, y) == Cell::Path
                    && maze.cell(x, y + 1) == Cell::Path
                    && maze.is_wall(x + 1, y)
                    && maze.is_wall(x + 1, y + 1)
                {
                    return (x, y);
                }
            }
        }
        panic!("expected a path cell with an east wall and a south corridor");
    }

    #[test]
    fn spawns_match_the_configuration() {
        let engine = make_engine(1);
        assert_eq!(engine.creatures.len(), engine.config.creature_count);
        for creature in &engine.creatures {
            assert!(!collision::blocked(
                &collision::agent_box(creature.pos),
                engine.maze.walls()
            ));
            assert_eq!(creature.mode, CreatureMode::Wandering);
        }
        let mut ids: Vec<&str> = engine.creatures.iter().map(|c| c.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), engine.config.creature_count);
    }

    #[test]
    fn invalid_dimensions_fail_engine_construction() {
        let err = GameEngine::new(GameConfig {
            width: 10,
            ..GameConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, GameError::InvalidConfiguration { .. }));
    }

    #[test]
    fn diagonal_input_slides_along_walls() {
        let mut engine = make_engine(5);
        engine.creatures.clear();
        let (cx, cy) = cell_with_east_wall_and_south_corridor(&engine.maze);
        let mut pos = engine.maze.cell_to_world(cx, cy);
        pos.y = PLAYER_FLOAT_HEIGHT;
        engine.player.pos = pos;
        engine.set_input(InputState {
            back: true,
            right: true,
            ..InputState::default()
        });

        let start = engine.player.pos;
        let wall_face = (cx as f32 + 0.5) * CELL_SIZE;
        for _ in 0..25 {
            engine.step(TICK_SECS);
        }
        assert!(!engine.is_ended());
        // X pinned short of the wall, Z advanced along the corridor.
        assert!(engine.player.pos.x + AGENT_HALF_EXTENT < wall_face);
        assert!(engine.player.pos.x > start.x);
        assert!(engine.player.pos.z > start.z + CELL_SIZE * 0.5);

        let pinned_x = engine.player.pos.x;
        for _ in 0..10 {
            engine.step(TICK_SECS);
        }
        assert!((engine.player.pos.x - pinned_x).abs() < 1e-3);
    }

    #[test]
    fn zero_input_leaves_the_player_still_and_neutral() {
        let mut engine = make_engine(9);
        engine.creatures.clear();
        let start = engine.player.pos;
        engine.step(TICK_SECS);
        assert_eq!(engine.player.pos, start);
        assert_eq!(engine.player.facing, Facing::Neutral);
    }

    #[test]
    fn creature_bounces_off_walls() {
        let mut engine = make_engine(8);
        engine.creatures.truncate(1);
        engine.player.pos = Vec3::new(-500.0, PLAYER_FLOAT_HEIGHT, -500.0);

        let (cx, cy) = cell_with_east_wall_and_south_corridor(&engine.maze);
        let mut pos = engine.maze.cell_to_world(cx, cy);
        pos.y = CREATURE_FLOAT_HEIGHT;
        pos.x += 1.0;
        let creature = &mut engine.creatures[0];
        creature.pos = pos;
        creature.velocity = Vec3::new(creature.speed, 0.0, 0.0);
        creature.mode = CreatureMode::Wandering;
        creature.heading_timer = 100.0;

        engine.step(0.5);
        let creature = &engine.creatures[0];
        assert!(creature.velocity.x < 0.0, "east collision must flip x velocity");
        assert_eq!(creature.velocity.z, 0.0);
        assert!(!collision::blocked(
            &collision::agent_box(creature.pos),
            engine.maze.walls()
        ));
    }

    #[test]
    fn alert_latches_and_releases_on_player_distance() {
        let mut engine = make_engine(12);
        engine.creatures.truncate(1);
        let anchor = {
            let mut pos = engine.maze.cell_to_world(1, 1);
            pos.y = CREATURE_FLOAT_HEIGHT;
            pos
        };
        engine.creatures[0].pos = anchor;
        engine.creatures[0].heading_timer = 100.0;

        engine.player.pos = Vec3::new(anchor.x + 4.9, PLAYER_FLOAT_HEIGHT, anchor.z);
        engine.step(TICK_SECS);
        assert_eq!(engine.creatures[0].mode, CreatureMode::Alert);
        let snapshot = engine.build_snapshot(true);
        assert!(snapshot
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::CreatureAlerted { .. })));

        // Holds position for as long as the player stays close.
        for _ in 0..30 {
            engine.step(TICK_SECS);
        }
        assert_eq!(engine.creatures[0].pos, anchor);
        assert!(engine.build_snapshot(true).events.is_empty());

        engine.player.pos = Vec3::new(anchor.x + 5.1, PLAYER_FLOAT_HEIGHT, anchor.z);
        engine.step(TICK_SECS);
        assert_eq!(engine.creatures[0].mode, CreatureMode::Wandering);
        let snapshot = engine.build_snapshot(true);
        assert!(snapshot
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::CreatureCalmed { .. })));
    }

    #[test]
    fn colocated_creature_is_caught_and_scored() {
        let mut engine = make_engine(3);
        engine.creatures.truncate(1);
        engine.creatures[0].pos = Vec3::new(
            engine.player.pos.x,
            CREATURE_FLOAT_HEIGHT,
            engine.player.pos.z,
        );

        engine.step(TICK_SECS);
        assert!(engine.creatures.is_empty());
        assert_eq!(engine.score(), 1);
        let snapshot = engine.build_snapshot(true);
        assert!(snapshot
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::CreatureCaught { .. })));
    }

    #[test]
    fn timeout_ends_the_session_on_the_second_tick() {
        let mut engine = GameEngine::new(GameConfig {
            time_limit_secs: 2.0,
            seed: 4,
            ..GameConfig::default()
        })
        .expect("engine builds");

        engine.step(1.5);
        assert!(!engine.is_ended());
        engine.step(1.0);
        assert!(engine.is_ended());
        assert_eq!(engine.end_reason(), Some(GameOverReason::Timeout));
        assert_eq!(engine.time_left(), 0.0);
        assert_eq!(engine.build_summary().message, "Time's Up! Game Over!");
    }

    #[test]
    fn standing_near_the_exit_escapes_without_input() {
        let mut engine = make_engine(6);
        engine.creatures.clear();
        let exit = engine.maze.exit_position();
        engine.player.pos = Vec3::new(exit.x - 1.9, PLAYER_FLOAT_HEIGHT, exit.z);

        engine.step(TICK_SECS);
        assert!(engine.is_ended());
        assert_eq!(engine.end_reason(), Some(GameOverReason::Escaped));
        assert_eq!(engine.build_summary().message, "You Escaped! Score: 0");
    }

    #[test]
    fn ended_session_never_mutates_again() {
        let mut engine = make_engine(6);
        engine.creatures.clear();
        let exit = engine.maze.exit_position();
        engine.player.pos = Vec3::new(exit.x - 1.0, PLAYER_FLOAT_HEIGHT, exit.z);
        engine.step(TICK_SECS);
        assert!(engine.is_ended());

        let tick = engine.tick_counter;
        let time_left = engine.time_left();
        let pos = engine.player.pos;
        engine.set_input(InputState {
            forward: true,
            ..InputState::default()
        });
        for _ in 0..10 {
            engine.step(TICK_SECS);
        }
        assert_eq!(engine.tick_counter, tick);
        assert_eq!(engine.time_left(), time_left);
        assert_eq!(engine.player.pos, pos);
    }

    #[test]
    fn build_snapshot_drains_events_when_requested() {
        let mut engine = make_engine(333);
        engine.events.push(RuntimeEvent::CreatureAlerted {
            creature_id: "turkey_1".to_string(),
        });

        let peek = engine.build_snapshot(false);
        assert!(peek.events.is_empty());
        let first = engine.build_snapshot(true);
        let second = engine.build_snapshot(true);
        assert_eq!(first.events.len(), 1);
        assert!(second.events.is_empty());
    }

    #[test]
    fn same_seed_and_inputs_produce_same_progression() {
        let mut a = make_engine(424_242);
        let mut b = make_engine(424_242);
        let mut script = Rng::new(7);

        for _ in 0..600 {
            let input = InputState {
                forward: script.next_f32() < 0.5,
                back: script.next_f32() < 0.5,
                left: script.next_f32() < 0.5,
                right: script.next_f32() < 0.5,
            };
            a.set_input(input);
            b.set_input(input);
            a.step(TICK_SECS);
            b.step(TICK_SECS);

            let sa = a.build_snapshot(false);
            let sb = b.build_snapshot(false);
            assert_eq!(sa.time_left.to_bits(), sb.time_left.to_bits());
            assert_eq!(sa.score, sb.score);
            assert_eq!(sa.player.x.to_bits(), sb.player.x.to_bits());
            assert_eq!(sa.player.z.to_bits(), sb.player.z.to_bits());
            assert_eq!(sa.creatures.len(), sb.creatures.len());
            for (ca, cb) in sa.creatures.iter().zip(sb.creatures.iter()) {
                assert_eq!(ca.id, cb.id);
                assert_eq!(ca.x.to_bits(), cb.x.to_bits());
                assert_eq!(ca.z.to_bits(), cb.z.to_bits());
                assert_eq!(ca.mode, cb.mode);
            }

            if a.is_ended() || b.is_ended() {
                assert_eq!(a.is_ended(), b.is_ended());
                break;
            }
        }
    }

    #[test]
    fn wandering_creatures_stay_out_of_walls_and_keep_moving() {
        let mut engine = make_engine(77);
        engine.player.pos = Vec3::new(-500.0, PLAYER_FLOAT_HEIGHT, -500.0);

        let mut traveled = vec![0.0f32; engine.creatures.len()];
        let mut last: Vec<Vec3> = engine.creatures.iter().map(|c| c.pos).collect();
        for _ in 0..2_000 {
            engine.step(TICK_SECS);
            for (idx, creature) in engine.creatures.iter().enumerate() {
                assert!(!collision::blocked(
                    &collision::agent_box(creature.pos),
                    engine.maze.walls()
                ));
                traveled[idx] += creature.pos.horizontal_distance_to(last[idx]);
                last[idx] = creature.pos;
            }
        }
        for distance in traveled {
            assert!(distance > CELL_SIZE, "creature wedged in place");
        }
    }
}
