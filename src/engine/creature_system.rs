use super::*;

impl GameEngine {
    pub(super) fn spawn_initial_creatures(&mut self) -> Result<(), GameError> {
        for _ in 0..self.config.creature_count {
            let mut pos = self.maze.random_free_position(&mut self.rng)?;
            pos.y = CREATURE_FLOAT_HEIGHT;
            let id = self.make_id("turkey");
            let heading = self.rng.angle();
            let heading_timer = self.rng.range_f32(HEADING_MIN_SECS, HEADING_MAX_SECS);
            self.creatures.push(CreatureInternal {
                id,
                pos,
                velocity: heading_velocity(heading, CREATURE_SPEED),
                speed: CREATURE_SPEED,
                mode: CreatureMode::Wandering,
                facing: Facing::Neutral,
                heading_timer,
            });
        }
        Ok(())
    }

    pub(super) fn update_creatures(&mut self, dt: f32) {
        // Reverse order so a catch can remove the current entry without
        // disturbing the ones not yet visited.
        for idx in (0..self.creatures.len()).rev() {
            self.update_creature(idx, dt);
            let dist = self.creatures[idx]
                .pos
                .horizontal_distance_to(self.player.pos);
            if dist < CATCH_RADIUS {
                let caught = self.creatures.remove(idx);
                self.score += 1;
                self.events.push(RuntimeEvent::CreatureCaught {
                    creature_id: caught.id,
                });
            }
        }
    }

    fn update_creature(&mut self, idx: usize, dt: f32) {
        let dist = self.creatures[idx]
            .pos
            .horizontal_distance_to(self.player.pos);
        match self.creatures[idx].mode {
            CreatureMode::Wandering if dist < ALERT_RADIUS => {
                self.creatures[idx].mode = CreatureMode::Alert;
                self.events.push(RuntimeEvent::CreatureAlerted {
                    creature_id: self.creatures[idx].id.clone(),
                });
            }
            CreatureMode::Alert if dist >= ALERT_RADIUS => {
                self.creatures[idx].mode = CreatureMode::Wandering;
                self.events.push(RuntimeEvent::CreatureCalmed {
                    creature_id: self.creatures[idx].id.clone(),
                });
            }
            _ => {}
        }

        // An alert creature freezes: no heading changes, no movement.
        if self.creatures[idx].mode == CreatureMode::Alert {
            return;
        }

        self.creatures[idx].heading_timer -= dt;
        if self.creatures[idx].heading_timer <= 0.0 {
            let heading = self.rng.angle();
            let duration = self.rng.range_f32(HEADING_MIN_SECS, HEADING_MAX_SECS);
            let creature = &mut self.creatures[idx];
            creature.velocity = heading_velocity(heading, creature.speed);
            creature.heading_timer = duration;
        }

        let walls = self.maze.walls();
        let creature = &mut self.creatures[idx];

        // X before Z. A blocked axis reverts its displacement and flips
        // that velocity component, bouncing off the wall.
        creature.pos.x += creature.velocity.x * dt;
        if collision::blocked(&collision::agent_box(creature.pos), walls) {
            creature.pos.x -= creature.velocity.x * dt;
            creature.velocity.x = -creature.velocity.x;
        }
        creature.pos.z += creature.velocity.z * dt;
        if collision::blocked(&collision::agent_box(creature.pos), walls) {
            creature.pos.z -= creature.velocity.z * dt;
            creature.velocity.z = -creature.velocity.z;
        }
        creature.facing = facing_for_velocity(creature.velocity.x);
    }
}
