use super::super::World;
use crate::evolution::{crossover, mutate, select_elite, select_weakest, selection_fitness};
use crate::gene::Gene;
use crate::metrics::{mean, GenerationSummary};
use tracing::info;

impl World {
    /// Close the current generation: select the elite, cross and mutate the
    /// rest, optionally replace the weakest, and open a zeroed row.
    pub(in crate::world) fn step_generation_phase(&mut self) -> GenerationSummary {
        let generation = self.ga.generation;
        self.ga.evaluation = 1;

        let fitness = selection_fitness(
            &self.history,
            self.config.crossing_type,
            self.config.fitness_smooth as usize,
        );
        let elite = select_elite(&fitness);
        let mut mutated = Vec::new();
        let mut predated = None;

        if let Some(elite) = elite {
            let mut genes: Vec<Gene> = self.robots.iter().map(|r| r.gene).collect();
            crossover(&mut genes, elite);
            mutated = mutate(
                &mut genes,
                elite,
                self.config.mutation_rate,
                &mut self.rng,
                &self.limits,
            );
            if self.config.enable_predation
                && generation % self.config.predation_interval == 0
            {
                predated = select_weakest(&fitness, Some(elite));
                if let Some(victim) = predated {
                    genes[victim] = Gene::random(&mut self.rng, &self.limits);
                    info!(
                        generation,
                        robot = victim,
                        fitness = fitness[victim],
                        "predation replaced gene"
                    );
                }
            }
            for (robot, gene) in self.robots.iter_mut().zip(genes) {
                robot.gene = gene;
            }
        }

        let row = self.history.last().unwrap_or(&[]);
        let summary = GenerationSummary {
            generation,
            elite,
            best_fitness: row.iter().copied().fold(0.0f32, f32::max),
            mean_fitness: mean(row),
            mutated,
            predated,
        };
        info!(
            generation,
            elite = ?summary.elite,
            best_fitness = summary.best_fitness,
            mean_fitness = summary.mean_fitness,
            mutated = summary.mutated.len(),
            "generation closed"
        );

        self.history.push_generation(self.robots.len());
        self.ga.generation += 1;
        summary
    }
}
