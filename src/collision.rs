use crate::constants::AGENT_HALF_EXTENT;
use crate::types::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Aabb {
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    pub fn from_center_half_extents(center: Vec3, half: Vec3) -> Self {
        Self {
            min: [center.x - half.x, center.y - half.y, center.z - half.z],
            max: [center.x + half.x, center.y + half.y, center.z + half.z],
        }
    }

    // Touching faces count as an overlap.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min[0] <= other.max[0]
            && self.max[0] >= other.min[0]
            && self.min[1] <= other.max[1]
            && self.max[1] >= other.min[1]
            && self.min[2] <= other.max[2]
            && self.max[2] >= other.min[2]
    }
}

pub fn agent_box(pos: Vec3) -> Aabb {
    Aabb::from_center_half_extents(
        pos,
        Vec3::new(AGENT_HALF_EXTENT, AGENT_HALF_EXTENT, AGENT_HALF_EXTENT),
    )
}

pub fn blocked(candidate: &Aabb, walls: &[Aabb]) -> bool {
    walls.iter().any(|wall| candidate.intersects(wall))
}
