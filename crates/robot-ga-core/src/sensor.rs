//! Ray-based proximity sensing.
//!
//! Every robot carries [`NUM_SENSORS`] rays fixed relative to its heading. A
//! ray fires when its endpoint leaves the arena or when it reaches another
//! body. Each firing sensor turns the robot by `-action * angular_velocity`
//! radians for the tick, so a positive action turns clockwise.

use crate::agent::{Obstacle, Pose, Robot};
use crate::constants::{NUM_SENSORS, WORLD_SIZE};
use crate::gene::Gene;
use crate::geometry::Vec2;
use serde::{Deserialize, Serialize};

/// World-space segment covered by one sensor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorRay {
    pub origin: Vec2,
    /// Unit direction.
    pub direction: Vec2,
    pub range: f32,
    pub end: Vec2,
}

impl SensorRay {
    pub fn new(origin: Vec2, angle: f32, range: f32) -> Self {
        let direction = Vec2::from_angle(angle);
        Self {
            origin,
            direction,
            range,
            end: origin + direction * range,
        }
    }

    /// Endpoint on or past the arena wall.
    pub fn hits_wall(&self) -> bool {
        self.end.x <= -WORLD_SIZE
            || self.end.x >= WORLD_SIZE
            || self.end.y <= -WORLD_SIZE
            || self.end.y >= WORLD_SIZE
    }

    /// Whether the ray reaches a circle of `radius` around `center`.
    ///
    /// `dx` is the distance along the ray to the foot of the perpendicular
    /// from `center`, `dy` the length of that perpendicular. The second clause
    /// catches bodies whose center lies beyond the ray but still covers the
    /// endpoint.
    pub fn hits_circle(&self, center: Vec2, radius: f32) -> bool {
        let c = center - self.origin;
        let dx = c.dot(self.direction);
        let dy = c.cross(self.direction).abs();
        (dx >= 0.0 && dx <= self.range && dy <= radius)
            || (dx >= self.range && self.end.distance(center) <= radius)
    }
}

/// World-space rays of every sensor for a robot at `pose`.
pub fn sensor_rays(pose: &Pose, gene: &Gene) -> [SensorRay; NUM_SENSORS] {
    std::array::from_fn(|i| {
        let sensor = &gene.sensors[i];
        SensorRay::new(pose.position, pose.heading + sensor.angle, sensor.range)
    })
}

/// Whether `ray` detects the wall, any obstacle, or any robot except `exclude`.
pub fn ray_activated(
    ray: &SensorRay,
    obstacles: &[Obstacle],
    robots: &[Robot],
    exclude: Option<usize>,
) -> bool {
    if ray.hits_wall() {
        return true;
    }
    obstacles
        .iter()
        .any(|o| ray.hits_circle(o.position, o.radius))
        || robots
            .iter()
            .enumerate()
            .filter(|(idx, _)| Some(*idx) != exclude)
            .any(|(_, r)| ray.hits_circle(r.position(), r.radius))
}

/// Angular displacement (radians) robot `index` applies this tick.
pub fn sensor_turn_delta(index: usize, obstacles: &[Obstacle], robots: &[Robot]) -> f32 {
    let robot = &robots[index];
    sensor_rays(&robot.pose, &robot.gene)
        .iter()
        .zip(robot.gene.sensors.iter())
        .filter(|(ray, _)| ray_activated(ray, obstacles, robots, Some(index)))
        .map(|(_, sensor)| -sensor.action * robot.gene.angular_velocity)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gene::SensorGene;
    use proptest::prelude::*;
    use std::f32::consts::FRAC_PI_2;

    fn single_sensor_gene(angle: f32, range: f32, action: f32, angular_velocity: f32) -> Gene {
        let mut sensors = [SensorGene::default(); NUM_SENSORS];
        sensors[0] = SensorGene {
            angle,
            range,
            action,
        };
        Gene {
            linear_velocity: 0.0,
            angular_velocity,
            sensors,
        }
    }

    fn robot(x: f32, y: f32, heading: f32, gene: Gene) -> Robot {
        Robot::new(Pose::new(Vec2::new(x, y), heading), 0.1, gene)
    }

    #[test]
    fn ray_endpoint_on_wall_fires() {
        let ray = SensorRay::new(Vec2::new(3.0, 0.0), 0.0, 2.0);
        assert!(ray.hits_wall());
        let ray = SensorRay::new(Vec2::new(2.0, 0.0), 0.0, 2.0);
        assert!(!ray.hits_wall());
    }

    #[test]
    fn ray_fires_on_body_along_segment() {
        let ray = SensorRay::new(Vec2::ZERO, 0.0, 2.0);
        assert!(ray.hits_circle(Vec2::new(1.0, 0.3), 0.35));
        assert!(!ray.hits_circle(Vec2::new(1.0, 0.5), 0.35));
    }

    #[test]
    fn ray_ignores_body_behind_origin() {
        let ray = SensorRay::new(Vec2::ZERO, 0.0, 2.0);
        assert!(!ray.hits_circle(Vec2::new(-1.0, 0.0), 0.5));
    }

    #[test]
    fn ray_fires_when_endpoint_lies_inside_distant_body() {
        let ray = SensorRay::new(Vec2::ZERO, 0.0, 1.0);
        // Center beyond the nominal range, but the disc still covers the endpoint.
        assert!(ray.hits_circle(Vec2::new(1.4, 0.0), 0.5));
        assert!(!ray.hits_circle(Vec2::new(1.6, 0.0), 0.5));
    }

    #[test]
    fn firing_sensor_turns_clockwise_for_positive_action() {
        let gene = single_sensor_gene(0.0, 2.0, 0.5, 1.0);
        let robots = vec![robot(0.0, 0.0, 0.0, gene)];
        let obstacles = [Obstacle::new(Vec2::new(1.0, 0.0), 0.3)];
        let delta = sensor_turn_delta(0, &obstacles, &robots);
        assert!((delta - -0.5).abs() < 1e-6, "delta = {delta}");
    }

    #[test]
    fn negative_action_turns_counter_clockwise() {
        let gene = single_sensor_gene(FRAC_PI_2, 2.0, -1.0, 2.0);
        let robots = vec![robot(0.0, 0.0, 0.0, gene)];
        let obstacles = [Obstacle::new(Vec2::new(0.0, 1.5), 0.3)];
        let delta = sensor_turn_delta(0, &obstacles, &robots);
        assert!((delta - 2.0).abs() < 1e-6, "delta = {delta}");
    }

    #[test]
    fn idle_sensors_leave_heading_alone() {
        let gene = single_sensor_gene(0.0, 1.0, 1.0, 3.0);
        let robots = vec![robot(0.0, 0.0, 0.0, gene)];
        assert_eq!(sensor_turn_delta(0, &[], &robots), 0.0);
    }

    #[test]
    fn sensor_sees_other_robots_but_not_itself() {
        let gene = single_sensor_gene(0.0, 2.0, 1.0, 1.0);
        let lone = vec![robot(0.0, 0.0, 0.0, gene)];
        assert_eq!(sensor_turn_delta(0, &[], &lone), 0.0);

        let pair = vec![
            robot(0.0, 0.0, 0.0, gene),
            robot(1.0, 0.0, 0.0, Gene::default()),
        ];
        assert!((sensor_turn_delta(0, &[], &pair) - -1.0).abs() < 1e-6);
    }

    #[test]
    fn rays_follow_heading() {
        let gene = single_sensor_gene(FRAC_PI_2, 1.0, 0.0, 0.0);
        let rays = sensor_rays(&Pose::new(Vec2::ZERO, FRAC_PI_2), &gene);
        assert!((rays[0].end.x - -1.0).abs() < 1e-6);
        assert!(rays[0].end.y.abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn proptest_growing_obstacle_never_deactivates_ray(
            angle in 0.0f32..std::f32::consts::TAU,
            range in 0.0f32..2.0,
            cx in -3.0f32..3.0,
            cy in -3.0f32..3.0,
            radius in 0.0f32..1.0,
            growth in 0.0f32..1.0,
        ) {
            let ray = SensorRay::new(Vec2::ZERO, angle, range);
            let small = [Obstacle::new(Vec2::new(cx, cy), radius)];
            let large = [Obstacle::new(Vec2::new(cx, cy), radius + growth)];
            if ray_activated(&ray, &small, &[], None) {
                prop_assert!(ray_activated(&ray, &large, &[], None));
            }
        }
    }
}
