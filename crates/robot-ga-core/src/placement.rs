use crate::agent::{Obstacle, Pose, Robot};
use crate::collision::is_colliding;
use crate::config::SimConfig;
use crate::gene::Gene;
use crate::geometry::{wrap_angle, Vec2};
use rand::Rng;
use std::f32::consts::TAU;
use std::{error::Error, fmt};

/// Rejection sampling gave up on a robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementUnsatisfiable {
    pub robot: usize,
    pub attempts: u32,
}

impl fmt::Display for PlacementUnsatisfiable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no collision-free start position for robot {} after {} attempts",
            self.robot, self.attempts
        )
    }
}

impl Error for PlacementUnsatisfiable {}

/// Obstacles and robot poses for the next evaluation, not yet applied.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub obstacles: Vec<Obstacle>,
    pub poses: Vec<Pose>,
}

fn spawn_point<R: Rng + ?Sized>(rng: &mut R, extent: f32) -> Vec2 {
    Vec2::new(
        rng.random_range(-extent..=extent),
        rng.random_range(-extent..=extent),
    )
}

/// Scatter `config.num_obstacles` obstacles. Overlaps are allowed.
pub fn random_obstacles<R: Rng + ?Sized>(rng: &mut R, config: &SimConfig) -> Vec<Obstacle> {
    (0..config.num_obstacles)
        .map(|_| {
            let position = spawn_point(rng, config.spawn_extent);
            let radius = rng.random_range(config.obstacle_radius_min..=config.obstacle_radius_max);
            Obstacle::new(position, radius)
        })
        .collect()
}

/// Draw a collision-free pose for each of `count` robots of
/// `config.robot_radius`, in index order. Each robot is checked against
/// `obstacles` and the robots already placed; at most
/// `config.max_placement_attempts` draws are made per robot.
pub fn place_robots<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    obstacles: &[Obstacle],
    config: &SimConfig,
) -> Result<Vec<Pose>, PlacementUnsatisfiable> {
    let radius = config.robot_radius;
    let mut placed: Vec<Robot> = Vec::with_capacity(count);
    for idx in 0..count {
        let mut pose = None;
        for _ in 0..config.max_placement_attempts {
            let position = spawn_point(rng, config.spawn_extent);
            let heading = wrap_angle(rng.random_range(0.0..TAU));
            if !is_colliding(position, radius, obstacles, &placed, None) {
                pose = Some(Pose::new(position, heading));
                break;
            }
        }
        let Some(pose) = pose else {
            return Err(PlacementUnsatisfiable {
                robot: idx,
                attempts: config.max_placement_attempts,
            });
        };
        placed.push(Robot::new(pose, radius, Gene::default()));
    }
    Ok(placed.into_iter().map(|r| r.pose).collect())
}

/// Fresh obstacles followed by start poses for `count` robots that avoid them.
pub fn sample_layout<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    config: &SimConfig,
) -> Result<Layout, PlacementUnsatisfiable> {
    let obstacles = random_obstacles(rng, config);
    let poses = place_robots(rng, count, &obstacles, config)?;
    Ok(Layout { obstacles, poses })
}
