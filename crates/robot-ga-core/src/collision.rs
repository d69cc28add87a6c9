use crate::agent::{Obstacle, Robot};
use crate::constants::WORLD_SIZE;
use crate::geometry::Vec2;

/// Whether a circle pokes through the arena wall. Touching the inset
/// boundary exactly is allowed.
pub fn hits_wall(position: Vec2, radius: f32) -> bool {
    position.x > WORLD_SIZE - radius
        || position.x < -WORLD_SIZE + radius
        || position.y > WORLD_SIZE - radius
        || position.y < -WORLD_SIZE + radius
}

/// Circle-circle overlap, contact included.
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) <= ra + rb
}

/// Collision query for a candidate circle against the wall, every obstacle,
/// and every robot except `exclude`.
pub fn is_colliding(
    position: Vec2,
    radius: f32,
    obstacles: &[Obstacle],
    robots: &[Robot],
    exclude: Option<usize>,
) -> bool {
    if hits_wall(position, radius) {
        return true;
    }
    if obstacles
        .iter()
        .any(|o| circles_overlap(position, radius, o.position, o.radius))
    {
        return true;
    }
    robots
        .iter()
        .enumerate()
        .filter(|(idx, _)| Some(*idx) != exclude)
        .any(|(_, r)| circles_overlap(position, radius, r.position(), r.radius))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Pose;
    use crate::gene::Gene;
    use proptest::prelude::*;

    fn robot_at(x: f32, y: f32, radius: f32) -> Robot {
        Robot::new(Pose::new(Vec2::new(x, y), 0.0), radius, Gene::default())
    }

    #[test]
    fn circle_on_inset_boundary_is_not_colliding() {
        let r = 0.25;
        for p in [
            Vec2::new(WORLD_SIZE - r, 0.0),
            Vec2::new(-WORLD_SIZE + r, 0.0),
            Vec2::new(0.0, WORLD_SIZE - r),
            Vec2::new(0.0, -WORLD_SIZE + r),
        ] {
            assert!(!is_colliding(p, r, &[], &[], None), "{p:?}");
        }
    }

    #[test]
    fn circle_one_unit_past_boundary_is_colliding() {
        let r = 0.25;
        for p in [
            Vec2::new(WORLD_SIZE - r + 1.0, 0.0),
            Vec2::new(-WORLD_SIZE + r - 1.0, 0.0),
            Vec2::new(0.0, WORLD_SIZE - r + 1.0),
            Vec2::new(0.0, -WORLD_SIZE + r - 1.0),
        ] {
            assert!(is_colliding(p, r, &[], &[], None), "{p:?}");
        }
    }

    #[test]
    fn obstacle_contact_counts_as_collision() {
        let obstacles = [Obstacle::new(Vec2::new(1.0, 0.0), 0.5)];
        assert!(is_colliding(Vec2::new(0.0, 0.0), 0.5, &obstacles, &[], None));
        assert!(!is_colliding(Vec2::new(-0.1, 0.0), 0.5, &obstacles, &[], None));
    }

    #[test]
    fn excluded_robot_is_ignored() {
        let robots = [robot_at(0.0, 0.0, 0.2), robot_at(3.0, 3.0, 0.2)];
        assert!(!is_colliding(Vec2::new(0.0, 0.0), 0.2, &[], &robots, Some(0)));
        assert!(is_colliding(Vec2::new(0.0, 0.0), 0.2, &[], &robots, Some(1)));
        assert!(is_colliding(Vec2::new(0.0, 0.0), 0.2, &[], &robots, None));
    }

    proptest! {
        #[test]
        fn proptest_robot_collision_is_symmetric(
            ax in -3.0f32..3.0, ay in -3.0f32..3.0, ar in 0.05f32..0.8,
            bx in -3.0f32..3.0, by in -3.0f32..3.0, br in 0.05f32..0.8,
        ) {
            let robots = [robot_at(ax, ay, ar), robot_at(bx, by, br)];
            let a_sees_b = is_colliding(robots[0].position(), ar, &[], &robots, Some(0));
            let b_sees_a = is_colliding(robots[1].position(), br, &[], &robots, Some(1));
            prop_assert_eq!(a_sees_b, b_sees_a);
        }
    }
}
