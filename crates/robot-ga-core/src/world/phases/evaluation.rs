use super::super::World;
use crate::evolution::{exploration_fitness, running_average};
use crate::geometry::Bounds2;
use crate::placement::Layout;
use tracing::debug;

impl World {
    /// Fold this evaluation's exploration score into the open generation
    /// row, then apply the pre-sampled layout and restart the timer.
    pub(in crate::world) fn step_evaluation_phase(&mut self, layout: Layout) {
        let evaluation = self.ga.evaluation;
        if let Some(row) = self.history.last_mut() {
            for (avg, bound) in row.iter_mut().zip(&self.bounds) {
                *avg = running_average(*avg, exploration_fitness(bound), evaluation);
            }
        }

        self.obstacles = layout.obstacles;
        for (robot, pose) in self.robots.iter_mut().zip(layout.poses) {
            robot.pose = pose;
            robot.radius = self.config.robot_radius;
        }
        for (bound, robot) in self.bounds.iter_mut().zip(&self.robots) {
            *bound = Bounds2::from_point(robot.position());
        }

        debug!(
            generation = self.ga.generation,
            evaluation,
            elapsed = self.ga.eval_elapsed,
            "evaluation closed"
        );
        self.ga.eval_elapsed = 0.0;
        self.ga.evaluation += 1;
    }
}
