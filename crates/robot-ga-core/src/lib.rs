pub mod agent;
pub mod collision;
pub mod config;
pub mod constants;
pub mod evolution;
pub mod gene;
pub mod geometry;
pub mod history;
pub mod metrics;
pub mod placement;
pub mod rng;
pub mod sensor;
pub mod world;

pub use constants::WORLD_SIZE;
pub use history::{FitnessHistory, HistoryError, HistorySnapshot};
pub use metrics::{GenerationSummary, RobotSnapshot, RunSummary};
