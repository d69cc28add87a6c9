use crate::agent::Pose;
use crate::gene::Gene;
use crate::history::FitnessHistory;
use crate::sensor::SensorRay;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// 1-based generation number.
    pub generation: u32,
    /// Robot whose gene seeded the next generation, if any.
    pub elite: Option<usize>,
    pub best_fitness: f32,
    pub mean_fitness: f32,
    /// Robots whose gene was mutated after crossover.
    #[serde(default)]
    pub mutated: Vec<usize>,
    /// Robot whose gene was replaced by predation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predated: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RobotSnapshot {
    pub index: usize,
    pub pose: Pose,
    pub gene: Gene,
    pub rays: Vec<SensorRay>,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub seed: u64,
    pub ticks: u64,
    pub generations_completed: u32,
    pub generations: Vec<GenerationSummary>,
    /// Best fitness of every recorded generation, the open one included.
    pub best_per_generation: Vec<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub final_robots: Vec<RobotSnapshot>,
}

/// Highest fitness of each generation, floored at zero.
pub fn best_per_generation(history: &FitnessHistory) -> Vec<f32> {
    history
        .generations()
        .iter()
        .map(|row| row.iter().copied().fold(0.0f32, f32::max))
        .collect()
}

pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_per_generation_takes_row_maximum() {
        let history =
            FitnessHistory::from_rows(vec![vec![0.1, 0.4, 0.2], vec![], vec![0.0, 0.0]]);
        assert_eq!(best_per_generation(&history), vec![0.4, 0.0, 0.0]);
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert!((mean(&[0.2, 0.4]) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn legacy_summary_json_defaults_schema_version() {
        let json = r#"{
            "seed": 1,
            "ticks": 10,
            "generations_completed": 0,
            "generations": [],
            "best_per_generation": [0.0]
        }"#;
        let summary: RunSummary = serde_json::from_str(json).expect("summary should parse");
        assert_eq!(summary.schema_version, 1);
        assert!(summary.final_robots.is_empty());
    }
}
