use crate::agent::{Obstacle, Pose, Robot};
use crate::config::{SimConfig, SimConfigError};
use crate::gene::{Gene, GeneLimits};
use crate::geometry::Bounds2;
use crate::history::{FitnessHistory, HistoryError, HistorySnapshot};
use crate::metrics::{self, GenerationSummary, RobotSnapshot, RunSummary};
use crate::placement::{sample_layout, PlacementUnsatisfiable};
use crate::rng::create_rng;
use crate::sensor::sensor_rays;
use rand_chacha::ChaCha12Rng;
use std::io::Write;
use std::{error::Error, fmt};
use tracing::warn;

/// Counters of the generation/evaluation state machine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GaState {
    /// 1-based; equals the number of rows in the fitness history.
    pub generation: u32,
    /// 1-based, within `[1, evaluations_per_generation]`.
    pub evaluation: u32,
    /// Seconds spent in the current evaluation.
    pub eval_elapsed: f32,
}

impl Default for GaState {
    fn default() -> Self {
        Self {
            generation: 1,
            evaluation: 1,
            eval_elapsed: 0.0,
        }
    }
}

/// What a tick completed, if anything.
#[derive(Clone, Debug, PartialEq)]
pub enum TickEvent {
    Running,
    EvaluationFinished { generation: u32, evaluation: u32 },
    GenerationFinished(GenerationSummary),
}

pub struct World {
    robots: Vec<Robot>,
    obstacles: Vec<Obstacle>,
    config: SimConfig,
    limits: GeneLimits,
    rng: ChaCha12Rng,
    ga: GaState,
    history: FitnessHistory,
    /// Explored bound of every robot in the current evaluation.
    bounds: Vec<Bounds2>,
    tick_index: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorldInitError {
    Config(SimConfigError),
    RobotCountMismatch { expected: usize, actual: usize },
    Placement(PlacementUnsatisfiable),
}

impl fmt::Display for WorldInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldInitError::Config(e) => write!(f, "{}", e),
            WorldInitError::RobotCountMismatch { expected, actual } => write!(
                f,
                "robots.len() ({actual}) must match num_robots ({expected})"
            ),
            WorldInitError::Placement(e) => write!(f, "initial layout failed: {e}"),
        }
    }
}

impl From<SimConfigError> for WorldInitError {
    fn from(err: SimConfigError) -> Self {
        WorldInitError::Config(err)
    }
}

impl From<PlacementUnsatisfiable> for WorldInitError {
    fn from(err: PlacementUnsatisfiable) -> Self {
        WorldInitError::Placement(err)
    }
}

impl Error for WorldInitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WorldInitError::Config(e) => Some(e),
            WorldInitError::Placement(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorldError {
    InvalidDt,
    Placement(PlacementUnsatisfiable),
    TooManyGenerations { max: u32, actual: u32 },
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldError::InvalidDt => write!(f, "dt must be positive and finite"),
            WorldError::Placement(e) => write!(f, "{e}"),
            WorldError::TooManyGenerations { max, actual } => {
                write!(f, "generations ({actual}) exceed supported maximum ({max})")
            }
        }
    }
}

impl From<PlacementUnsatisfiable> for WorldError {
    fn from(err: PlacementUnsatisfiable) -> Self {
        WorldError::Placement(err)
    }
}

impl Error for WorldError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WorldError::Placement(e) => Some(e),
            _ => None,
        }
    }
}

impl World {
    pub const MAX_RUN_GENERATIONS: u32 = 100_000;

    /// Random genes, a fresh obstacle layout and collision-free start poses,
    /// all drawn from `config.seed`.
    pub fn new(config: SimConfig) -> Result<Self, WorldInitError> {
        config.validate()?;
        let limits = GeneLimits::from_config(&config);
        let mut rng = create_rng(config.seed);
        let mut robots: Vec<Robot> = (0..config.num_robots)
            .map(|_| {
                Robot::new(
                    Pose::default(),
                    config.robot_radius,
                    Gene::random(&mut rng, &limits),
                )
            })
            .collect();
        let layout = sample_layout(&mut rng, robots.len(), &config)?;
        for (robot, pose) in robots.iter_mut().zip(layout.poses) {
            robot.pose = pose;
        }
        Ok(Self::assemble(robots, layout.obstacles, config, limits, rng))
    }

    /// Start from caller-supplied robots and obstacles. Poses and radii are
    /// taken as given; later evaluations re-randomize poses and reset every
    /// radius to `config.robot_radius`.
    pub fn with_population(
        robots: Vec<Robot>,
        obstacles: Vec<Obstacle>,
        config: SimConfig,
    ) -> Result<Self, WorldInitError> {
        config.validate()?;
        if robots.len() != config.num_robots {
            return Err(WorldInitError::RobotCountMismatch {
                expected: config.num_robots,
                actual: robots.len(),
            });
        }
        let limits = GeneLimits::from_config(&config);
        let rng = create_rng(config.seed);
        Ok(Self::assemble(robots, obstacles, config, limits, rng))
    }

    fn assemble(
        robots: Vec<Robot>,
        obstacles: Vec<Obstacle>,
        config: SimConfig,
        limits: GeneLimits,
        rng: ChaCha12Rng,
    ) -> Self {
        let mut history = FitnessHistory::new();
        history.push_generation(robots.len());
        let bounds = robots
            .iter()
            .map(|r| Bounds2::from_point(r.position()))
            .collect();
        Self {
            robots,
            obstacles,
            config,
            limits,
            rng,
            ga: GaState::default(),
            history,
            bounds,
            tick_index: 0,
        }
    }

    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn history(&self) -> &FitnessHistory {
        &self.history
    }

    pub fn bounds(&self) -> &[Bounds2] {
        &self.bounds
    }

    pub fn ga_state(&self) -> GaState {
        self.ga
    }

    pub fn tick_index(&self) -> u64 {
        self.tick_index
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Swap GA and arena options mid-run. The population size is fixed; a
    /// smaller `evaluations_per_generation` clamps the current evaluation.
    /// Body radii and obstacle options apply from the next evaluation, when
    /// the new layout is sampled.
    pub fn set_config(&mut self, config: SimConfig) -> Result<(), WorldInitError> {
        config.validate()?;
        if config.num_robots != self.robots.len() {
            return Err(WorldInitError::RobotCountMismatch {
                expected: config.num_robots,
                actual: self.robots.len(),
            });
        }
        self.ga.evaluation = self
            .ga
            .evaluation
            .clamp(1, config.evaluations_per_generation);
        self.limits = GeneLimits::from_config(&config);
        self.config = config;
        Ok(())
    }

    pub fn history_snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            fitness: self.history.clone(),
            bounds: self.bounds.clone(),
        }
    }

    /// Persist the fitness table followed by the current explored bounds.
    pub fn write_history<W: Write>(&self, writer: &mut W) -> Result<(), HistoryError> {
        self.history.write_to(writer)?;
        crate::history::write_bounds(&self.bounds, writer)
    }

    pub fn robot_snapshots(&self) -> Vec<RobotSnapshot> {
        self.robots
            .iter()
            .enumerate()
            .map(|(index, robot)| RobotSnapshot {
                index,
                pose: robot.pose,
                gene: robot.gene,
                rays: sensor_rays(&robot.pose, &robot.gene).to_vec(),
            })
            .collect()
    }

    /// Advance one tick of `config.dt` seconds.
    pub fn step(&mut self) -> Result<TickEvent, WorldError> {
        self.advance(self.config.dt)
    }

    /// Advance one tick of `dt` seconds.
    ///
    /// When the tick ends an evaluation, the next layout is sampled before
    /// anything moves. If placement fails the error is returned and the
    /// world is left as it was, apart from the random sequence having moved
    /// on, so the next tick retries with fresh draws.
    pub fn advance(&mut self, dt: f32) -> Result<TickEvent, WorldError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(WorldError::InvalidDt);
        }
        let elapsed = self.ga.eval_elapsed + dt;
        let layout = if elapsed > self.config.evaluation_duration {
            match sample_layout(&mut self.rng, self.robots.len(), &self.config) {
                Ok(layout) => Some(layout),
                Err(err) => {
                    warn!(
                        robot = err.robot,
                        attempts = err.attempts,
                        generation = self.ga.generation,
                        evaluation = self.ga.evaluation,
                        "placement retries exhausted, evaluation left open"
                    );
                    return Err(err.into());
                }
            }
        } else {
            None
        };

        self.tick_index = self.tick_index.saturating_add(1);
        self.step_motion_phase(dt);
        self.step_exploration_phase(elapsed);

        let Some(layout) = layout else {
            return Ok(TickEvent::Running);
        };
        let (generation, evaluation) = (self.ga.generation, self.ga.evaluation);
        self.step_evaluation_phase(layout);
        if self.ga.evaluation > self.config.evaluations_per_generation {
            let summary = self.step_generation_phase();
            return Ok(TickEvent::GenerationFinished(summary));
        }
        Ok(TickEvent::EvaluationFinished {
            generation,
            evaluation,
        })
    }

    /// Tick with `config.dt` until `generations` more generations have
    /// closed.
    pub fn run_generations(&mut self, generations: u32) -> Result<RunSummary, WorldError> {
        if generations > Self::MAX_RUN_GENERATIONS {
            return Err(WorldError::TooManyGenerations {
                max: Self::MAX_RUN_GENERATIONS,
                actual: generations,
            });
        }
        let ticks_before = self.tick_index;
        let mut summaries = Vec::with_capacity(generations as usize);
        while summaries.len() < generations as usize {
            if let TickEvent::GenerationFinished(summary) = self.step()? {
                summaries.push(summary);
            }
        }
        Ok(RunSummary {
            schema_version: 1,
            seed: self.config.seed,
            ticks: self.tick_index - ticks_before,
            generations_completed: generations,
            generations: summaries,
            best_per_generation: metrics::best_per_generation(&self.history),
            final_robots: self.robot_snapshots(),
        })
    }
}

mod phases;
