use crate::constants::WORLD_SIZE;
use serde::{Deserialize, Serialize};

/// How the elite robot is chosen at the end of a generation.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CrossingType {
    /// Highest fitness in the generation that just finished.
    #[default]
    BestFitness,
    /// Highest fitness averaged over the last `fitness_smooth` generations.
    BestSmooth,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Deterministic seed for reproducible runs.
    pub seed: u64,
    /// Fixed population size.
    pub num_robots: usize,
    /// Number of circular obstacles re-scattered every evaluation.
    pub num_obstacles: usize,
    /// Body radius shared by all robots.
    pub robot_radius: f32,
    /// Lower end of the obstacle radius band.
    pub obstacle_radius_min: f32,
    /// Upper end of the obstacle radius band.
    pub obstacle_radius_max: f32,
    /// Robots and obstacles are scattered within `[-spawn_extent, spawn_extent]` on each axis.
    pub spawn_extent: f32,
    /// Default tick length in seconds, used by `World::step`.
    pub dt: f32,
    /// Upper bound of the gene's linear velocity (units/s).
    pub max_linear_velocity: f32,
    /// Upper bound of the gene's angular velocity (rad/s).
    pub max_angular_velocity: f32,
    /// Upper bound of every sensor's range.
    pub max_sensor_range: f32,
    /// Probability that a non-elite robot is mutated at the end of a generation.
    pub mutation_rate: f32,
    /// Elite selection strategy.
    pub crossing_type: CrossingType,
    /// Number of generations averaged by `CrossingType::BestSmooth`.
    pub fitness_smooth: u32,
    /// Replace the weakest robot's gene with a random one every `predation_interval` generations.
    pub enable_predation: bool,
    /// Generations between predation events.
    pub predation_interval: u32,
    /// Evaluations averaged into each generation's fitness.
    pub evaluations_per_generation: u32,
    /// Length of a single evaluation in seconds.
    pub evaluation_duration: f32,
    /// Rejection-sampling budget per robot when scattering start positions.
    pub max_placement_attempts: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            num_robots: 20,
            num_obstacles: 10,
            robot_radius: 0.15,
            obstacle_radius_min: 0.15,
            obstacle_radius_max: 0.65,
            spawn_extent: 4.0,
            dt: 1.0 / 60.0,
            max_linear_velocity: 1.0,
            max_angular_velocity: std::f32::consts::TAU,
            max_sensor_range: 2.0,
            mutation_rate: 0.1,
            crossing_type: CrossingType::BestFitness,
            fitness_smooth: 1,
            enable_predation: false,
            predation_interval: 10,
            evaluations_per_generation: 3,
            evaluation_duration: 20.0,
            max_placement_attempts: 10_000,
        }
    }
}

macro_rules! define_sim_config_error {
    (
        $(
            $variant:ident $( { $($field:ident : $type:ty),* } )? => $fmt:literal $(, $arg:expr)*
        );* $(;)?
    ) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum SimConfigError {
            $(
                $variant $( { $($field : $type),* } )?,
            )*
        }

        impl std::fmt::Display for SimConfigError {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        Self::$variant $( { $($field),* } )? => write!(f, $fmt $(, $arg)*),
                    )*
                }
            }
        }
    };
}

define_sim_config_error! {
    TooManyRobots { max: usize, actual: usize } => "Too many robots: {} > max {}", actual, max;
    TooManyObstacles { max: usize, actual: usize } => "Too many obstacles: {} > max {}", actual, max;
    InvalidRobotRadius => "robot_radius must be finite, positive, and smaller than the arena half-size";
    InvalidObstacleRadiusBand => "obstacle_radius_min/obstacle_radius_max must be finite, non-negative, ordered, and smaller than the arena half-size";
    InvalidSpawnExtent => "spawn_extent must be finite, positive, and within the arena";
    InvalidDt => "dt must be positive and finite";
    InvalidMaxLinearVelocity => "max_linear_velocity must be finite and non-negative";
    InvalidMaxAngularVelocity => "max_angular_velocity must be finite and non-negative";
    InvalidMaxSensorRange => "max_sensor_range must be finite and non-negative";
    InvalidMutationRate => "mutation_rate must be finite and within [0,1]";
    InvalidFitnessSmooth => "fitness_smooth must be within [1,10]";
    InvalidPredationInterval => "predation_interval must be within [1,50]";
    InvalidEvaluationsPerGeneration => "evaluations_per_generation must be within [1,50]";
    InvalidEvaluationDuration => "evaluation_duration must be finite and within [0,60]";
    InvalidMaxPlacementAttempts => "max_placement_attempts must be positive";
}

impl std::error::Error for SimConfigError {}

impl SimConfig {
    pub const MAX_ROBOTS: usize = 1_024;
    pub const MAX_OBSTACLES: usize = 1_024;
    pub const MAX_FITNESS_SMOOTH: u32 = 10;
    pub const MAX_PREDATION_INTERVAL: u32 = 50;
    pub const MAX_EVALUATIONS_PER_GENERATION: u32 = 50;
    pub const MAX_EVALUATION_DURATION: f32 = 60.0;

    pub fn validate(&self) -> Result<(), SimConfigError> {
        self.validate_population()?;
        self.validate_bodies()?;
        self.validate_motion()?;
        self.validate_gene_limits()?;
        self.validate_evolution()?;
        self.validate_schedule()?;
        Ok(())
    }

    fn validate_population(&self) -> Result<(), SimConfigError> {
        if self.num_robots > Self::MAX_ROBOTS {
            return Err(SimConfigError::TooManyRobots {
                max: Self::MAX_ROBOTS,
                actual: self.num_robots,
            });
        }
        if self.num_obstacles > Self::MAX_OBSTACLES {
            return Err(SimConfigError::TooManyObstacles {
                max: Self::MAX_OBSTACLES,
                actual: self.num_obstacles,
            });
        }
        if self.max_placement_attempts == 0 {
            return Err(SimConfigError::InvalidMaxPlacementAttempts);
        }
        Ok(())
    }

    fn validate_bodies(&self) -> Result<(), SimConfigError> {
        if !self.robot_radius.is_finite()
            || self.robot_radius <= 0.0
            || self.robot_radius >= WORLD_SIZE
        {
            return Err(SimConfigError::InvalidRobotRadius);
        }
        if !self.obstacle_radius_min.is_finite()
            || !self.obstacle_radius_max.is_finite()
            || self.obstacle_radius_min < 0.0
            || self.obstacle_radius_min > self.obstacle_radius_max
            || self.obstacle_radius_max >= WORLD_SIZE
        {
            return Err(SimConfigError::InvalidObstacleRadiusBand);
        }
        if !self.spawn_extent.is_finite()
            || self.spawn_extent <= 0.0
            || self.spawn_extent > WORLD_SIZE
        {
            return Err(SimConfigError::InvalidSpawnExtent);
        }
        Ok(())
    }

    fn validate_motion(&self) -> Result<(), SimConfigError> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(SimConfigError::InvalidDt);
        }
        Ok(())
    }

    fn validate_gene_limits(&self) -> Result<(), SimConfigError> {
        if !self.max_linear_velocity.is_finite() || self.max_linear_velocity < 0.0 {
            return Err(SimConfigError::InvalidMaxLinearVelocity);
        }
        if !self.max_angular_velocity.is_finite() || self.max_angular_velocity < 0.0 {
            return Err(SimConfigError::InvalidMaxAngularVelocity);
        }
        if !self.max_sensor_range.is_finite() || self.max_sensor_range < 0.0 {
            return Err(SimConfigError::InvalidMaxSensorRange);
        }
        Ok(())
    }

    fn validate_evolution(&self) -> Result<(), SimConfigError> {
        if !self.mutation_rate.is_finite() || !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(SimConfigError::InvalidMutationRate);
        }
        if !(1..=Self::MAX_FITNESS_SMOOTH).contains(&self.fitness_smooth) {
            return Err(SimConfigError::InvalidFitnessSmooth);
        }
        if !(1..=Self::MAX_PREDATION_INTERVAL).contains(&self.predation_interval) {
            return Err(SimConfigError::InvalidPredationInterval);
        }
        Ok(())
    }

    fn validate_schedule(&self) -> Result<(), SimConfigError> {
        if !(1..=Self::MAX_EVALUATIONS_PER_GENERATION).contains(&self.evaluations_per_generation) {
            return Err(SimConfigError::InvalidEvaluationsPerGeneration);
        }
        if !self.evaluation_duration.is_finite()
            || !(0.0..=Self::MAX_EVALUATION_DURATION).contains(&self.evaluation_duration)
        {
            return Err(SimConfigError::InvalidEvaluationDuration);
        }
        Ok(())
    }
}
