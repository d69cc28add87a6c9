use crate::gene::Gene;
use crate::geometry::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec2,
    /// Radians, counter-clockwise from +x, kept in `[0, 2π)`.
    pub heading: f32,
}

impl Pose {
    pub fn new(position: Vec2, heading: f32) -> Self {
        Self { position, heading }
    }

    /// Unit vector along the heading.
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.heading)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Robot {
    pub pose: Pose,
    pub radius: f32,
    pub gene: Gene,
}

impl Robot {
    pub fn new(pose: Pose, radius: f32, gene: Gene) -> Self {
        Self { pose, radius, gene }
    }

    pub fn position(&self) -> Vec2 {
        self.pose.position
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub position: Vec2,
    pub radius: f32,
}

impl Obstacle {
    pub fn new(position: Vec2, radius: f32) -> Self {
        Self { position, radius }
    }
}
