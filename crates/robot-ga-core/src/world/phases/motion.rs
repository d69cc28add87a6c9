use super::super::World;
use crate::agent::{Obstacle, Robot};
use crate::collision::is_colliding;
use crate::geometry::wrap_angle;
use crate::sensor::sensor_turn_delta;

/// Move robot `index` forward, staying put if the new position collides,
/// then turn it by its sensor output at wherever it ended up.
fn step_robot(index: usize, robots: &mut [Robot], obstacles: &[Obstacle], dt: f32) {
    let robot = &robots[index];
    let candidate =
        robot.position() + robot.pose.forward() * (robot.gene.linear_velocity * dt);
    if !is_colliding(candidate, robot.radius, obstacles, robots, Some(index)) {
        robots[index].pose.position = candidate;
    }
    let delta = sensor_turn_delta(index, obstacles, robots);
    let pose = &mut robots[index].pose;
    pose.heading = wrap_angle(pose.heading + delta);
}

impl World {
    /// Step robots in index order; each sees the poses already updated
    /// this tick by lower indices.
    pub(in crate::world) fn step_motion_phase(&mut self, dt: f32) {
        for index in 0..self.robots.len() {
            step_robot(index, &mut self.robots, &self.obstacles, dt);
        }
    }
}
