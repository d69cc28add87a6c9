use super::super::World;

impl World {
    pub(in crate::world) fn step_exploration_phase(&mut self, elapsed: f32) {
        for (bound, robot) in self.bounds.iter_mut().zip(&self.robots) {
            *bound = bound.union_point(robot.position());
        }
        self.ga.eval_elapsed = elapsed;
    }
}
