use crate::types::{Facing, Vec3};

pub(super) fn facing_for_velocity(vx: f32) -> Facing {
    if vx < 0.0 {
        Facing::Left
    } else if vx > 0.0 {
        Facing::Right
    } else {
        Facing::Neutral
    }
}

pub(super) fn heading_velocity(angle: f32, speed: f32) -> Vec3 {
    Vec3::new(angle.cos(), 0.0, angle.sin()).scaled(speed)
}
