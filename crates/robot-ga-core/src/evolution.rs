use crate::config::CrossingType;
use crate::constants::ARENA_AREA;
use crate::gene::{Gene, GeneLimits};
use crate::geometry::Bounds2;
use crate::history::FitnessHistory;
use rand::Rng;

/// Share of the arena covered by an explored bound, clamped to `[0, 1]`.
pub fn exploration_fitness(bound: &Bounds2) -> f32 {
    let area = bound.area();
    if !area.is_finite() {
        return 0.0;
    }
    (area / ARENA_AREA).clamp(0.0, 1.0)
}

/// Fold the `evaluation`-th (1-based) sample into a running average.
pub fn running_average(average: f32, sample: f32, evaluation: u32) -> f32 {
    let e = evaluation.max(1) as f32;
    (average * (e - 1.0) + sample) / e
}

/// Index of the highest fitness, scanning in index order with `>=` so the
/// last index reaching the maximum wins. `None` for an empty slice.
pub fn select_elite(fitness: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &value) in fitness.iter().enumerate() {
        match best {
            Some((_, best_value)) if value < best_value => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Index of the lowest fitness other than `exclude`; first index wins ties.
pub fn select_weakest(fitness: &[f32], exclude: Option<usize>) -> Option<usize> {
    let mut worst: Option<(usize, f32)> = None;
    for (idx, &value) in fitness.iter().enumerate() {
        if Some(idx) == exclude {
            continue;
        }
        match worst {
            Some((_, worst_value)) if value >= worst_value => {}
            _ => worst = Some((idx, value)),
        }
    }
    worst.map(|(idx, _)| idx)
}

/// Per-robot fitness averaged over the last `window` generations. Robots
/// missing from shorter, older rows count those rows as zero.
pub fn smoothed_fitness(history: &FitnessHistory, window: usize) -> Vec<f32> {
    let rows = history.generations();
    let Some(last) = rows.last() else {
        return Vec::new();
    };
    let window = window.clamp(1, rows.len());
    let recent = &rows[rows.len() - window..];
    (0..last.len())
        .map(|idx| {
            let sum: f32 = recent
                .iter()
                .map(|row| row.get(idx).copied().unwrap_or(0.0))
                .sum();
            sum / window as f32
        })
        .collect()
}

/// Fitness vector the elite is chosen from under `crossing_type`.
pub fn selection_fitness(
    history: &FitnessHistory,
    crossing_type: CrossingType,
    window: usize,
) -> Vec<f32> {
    match crossing_type {
        CrossingType::BestFitness => history.last().map(<[f32]>::to_vec).unwrap_or_default(),
        CrossingType::BestSmooth => smoothed_fitness(history, window),
    }
}

/// Average every non-elite gene with the elite gene.
pub fn crossover(genes: &mut [Gene], elite: usize) {
    let Some(&elite_gene) = genes.get(elite) else {
        return;
    };
    for (idx, gene) in genes.iter_mut().enumerate() {
        if idx != elite {
            gene.cross_with(&elite_gene);
        }
    }
}

/// Mutate each non-elite gene with probability `rate`. Returns the indices
/// that were mutated.
pub fn mutate<R: Rng + ?Sized>(
    genes: &mut [Gene],
    elite: usize,
    rate: f32,
    rng: &mut R,
    limits: &GeneLimits,
) -> Vec<usize> {
    let mut mutated = Vec::new();
    for (idx, gene) in genes.iter_mut().enumerate() {
        if idx == elite {
            continue;
        }
        if rng.random::<f32>() < rate {
            gene.mutate(rng, limits);
            mutated.push(idx);
        }
    }
    mutated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WORLD_SIZE;
    use crate::geometry::Vec2;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn random_genes(n: usize, seed: u64) -> Vec<Gene> {
        let mut rng = ChaCha12Rng::seed_from_u64(seed);
        let limits = GeneLimits::default();
        (0..n).map(|_| Gene::random(&mut rng, &limits)).collect()
    }

    #[test]
    fn point_bound_scores_zero_and_full_arena_scores_one() {
        let point = Bounds2::from_point(Vec2::new(1.0, -2.0));
        assert_eq!(exploration_fitness(&point), 0.0);

        let arena = Bounds2 {
            min: Vec2::new(-WORLD_SIZE, -WORLD_SIZE),
            max: Vec2::new(WORLD_SIZE, WORLD_SIZE),
        };
        assert_eq!(exploration_fitness(&arena), 1.0);
    }

    #[test]
    fn running_average_weights_evaluations_equally() {
        let avg = running_average(0.0, 0.3, 1);
        let avg = running_average(avg, 0.6, 2);
        let avg = running_average(avg, 0.0, 3);
        assert!((avg - 0.3).abs() < 1e-6, "avg = {avg}");
    }

    proptest! {
        #[test]
        fn proptest_fitness_stays_in_unit_interval(
            ax in -10.0f32..10.0,
            ay in -10.0f32..10.0,
            bx in -10.0f32..10.0,
            by in -10.0f32..10.0,
        ) {
            let bound = Bounds2::from_point(Vec2::new(ax, ay)).union_point(Vec2::new(bx, by));
            let fitness = exploration_fitness(&bound);
            prop_assert!((0.0..=1.0).contains(&fitness));
        }
    }

    #[test]
    fn elite_is_maximum() {
        assert_eq!(select_elite(&[0.1, 0.7, 0.3]), Some(1));
    }

    #[test]
    fn elite_tie_break_keeps_last_maximum() {
        assert_eq!(select_elite(&[0.5, 0.2, 0.5, 0.1]), Some(2));
        assert_eq!(select_elite(&[0.0, 0.0, 0.0]), Some(2));
    }

    #[test]
    fn empty_row_has_no_elite() {
        assert_eq!(select_elite(&[]), None);
        assert_eq!(select_weakest(&[], None), None);
    }

    #[test]
    fn weakest_skips_excluded_and_keeps_first_minimum() {
        assert_eq!(select_weakest(&[0.1, 0.4, 0.1], None), Some(0));
        assert_eq!(select_weakest(&[0.1, 0.4, 0.1], Some(0)), Some(2));
        assert_eq!(select_weakest(&[0.3], Some(0)), None);
    }

    #[test]
    fn smoothing_averages_recent_rows() {
        let history =
            FitnessHistory::from_rows(vec![vec![0.9, 0.0], vec![0.1, 0.2], vec![0.3, 0.4]]);
        let smooth = smoothed_fitness(&history, 2);
        assert!((smooth[0] - 0.2).abs() < 1e-6);
        assert!((smooth[1] - 0.3).abs() < 1e-6);

        // Window larger than the history uses every row.
        let smooth = smoothed_fitness(&history, 10);
        assert!((smooth[0] - 1.3 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn smooth_selection_can_differ_from_best_fitness() {
        let history = FitnessHistory::from_rows(vec![vec![0.9, 0.1], vec![0.3, 0.4]]);
        let last = selection_fitness(&history, CrossingType::BestFitness, 2);
        let smooth = selection_fitness(&history, CrossingType::BestSmooth, 2);
        assert_eq!(select_elite(&last), Some(1));
        assert_eq!(select_elite(&smooth), Some(0));
    }

    #[test]
    fn crossover_leaves_elite_and_averages_others() {
        let before = random_genes(4, 3);
        let mut genes = before.clone();
        crossover(&mut genes, 2);
        assert_eq!(genes[2], before[2]);
        for idx in [0, 1, 3] {
            assert_eq!(genes[idx], before[idx].blend(&before[2]));
        }
    }

    #[test]
    fn crossover_moves_non_elites_strictly_toward_elite() {
        let before = random_genes(5, 11);
        let mut genes = before.clone();
        crossover(&mut genes, 0);
        let elite = before[0].values();
        for idx in 1..genes.len() {
            for ((after, orig), target) in genes[idx]
                .values()
                .iter()
                .zip(before[idx].values())
                .zip(&elite)
            {
                if orig != *target {
                    assert!((after - target).abs() < (orig - target).abs());
                }
            }
        }
    }

    #[test]
    fn crossover_with_out_of_range_elite_is_noop() {
        let before = random_genes(3, 4);
        let mut genes = before.clone();
        crossover(&mut genes, 7);
        assert_eq!(genes, before);
    }

    #[test]
    fn zero_rate_never_mutates() {
        let before = random_genes(6, 8);
        let mut genes = before.clone();
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let mutated = mutate(&mut genes, 0, 0.0, &mut rng, &GeneLimits::default());
        assert!(mutated.is_empty());
        assert_eq!(genes, before);
    }

    #[test]
    fn full_rate_mutates_everyone_but_elite() {
        let before = random_genes(6, 8);
        let mut genes = before.clone();
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let limits = GeneLimits::default();
        let mutated = mutate(&mut genes, 3, 1.0, &mut rng, &limits);
        assert_eq!(mutated, vec![0, 1, 2, 4, 5]);
        assert_eq!(genes[3], before[3]);
        assert!(genes.iter().all(|g| g.is_within(&limits)));
    }
}
