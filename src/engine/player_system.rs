use super::*;

impl GameEngine {
    pub(super) fn update_player(&mut self, dt: f32) {
        let input = self.player.input;
        let mut direction = Vec3::ZERO;
        if input.forward {
            direction.z -= 1.0;
        }
        if input.back {
            direction.z += 1.0;
        }
        if input.left {
            direction.x -= 1.0;
        }
        if input.right {
            direction.x += 1.0;
        }

        // The per-tick velocity already carries the dt factor, so the
        // position updates below add it raw.
        self.player.velocity = if direction.length() > 0.0 {
            direction.normalized().scaled(self.player.speed * dt)
        } else {
            Vec3::ZERO
        };
        self.player.facing = facing_for_velocity(self.player.velocity.x);

        let walls = self.maze.walls();
        let player = &mut self.player;

        // X before Z. A blocked axis is reverted outright; the player
        // halts against walls instead of bouncing.
        player.pos.x += player.velocity.x;
        if collision::blocked(&collision::agent_box(player.pos), walls) {
            player.pos.x -= player.velocity.x;
        }
        player.pos.z += player.velocity.z;
        if collision::blocked(&collision::agent_box(player.pos), walls) {
            player.pos.z -= player.velocity.z;
        }
    }
}
