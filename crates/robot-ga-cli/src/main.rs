use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use robot_ga_core::config::SimConfig;
use robot_ga_core::history::{HistoryError, HistorySnapshot, Recovered};
use robot_ga_core::metrics::best_per_generation;
use robot_ga_core::world::World;
use robot_ga_core::FitnessHistory;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

const WARMUP_TICKS: usize = 60;
const BENCHMARK_TICKS: usize = 1_200;
const TARGET_TPS: f64 = 60.0;

#[derive(Parser)]
#[command(name = "robot-ga")]
#[command(about = "Evolve sensor-driven robots in a 2D arena")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the genetic algorithm from a config file
    Run {
        /// Path to config file (JSON)
        #[arg(long)]
        config: PathBuf,

        /// Output directory for summary.json and history.bin (optional)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Number of generations to evolve
        #[arg(long, default_value_t = 10)]
        generations: u32,
    },
    /// Decode a history.bin file and print best fitness per generation
    Inspect {
        /// Path to a history file written by `run`
        #[arg(long)]
        history: PathBuf,
    },
    /// Measure ticks per second at several population sizes
    Benchmark,
    /// Dump the default configuration to stdout
    DumpDefaultConfig,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn run_benchmark(num_robots: usize, num_obstacles: usize) -> Result<()> {
    let config = SimConfig {
        num_robots,
        num_obstacles,
        ..SimConfig::default()
    };
    let mut world = World::new(config).context("failed to initialize benchmark world")?;

    for _ in 0..WARMUP_TICKS {
        world.step()?;
    }

    let start = Instant::now();
    for _ in 0..BENCHMARK_TICKS {
        world.step()?;
    }
    let elapsed = start.elapsed().as_secs_f64();
    let ticks_per_sec = BENCHMARK_TICKS as f64 / elapsed.max(f64::EPSILON);
    let avg_tick_us = elapsed * 1_000_000.0 / BENCHMARK_TICKS as f64;

    println!("--- {num_robots} robots, {num_obstacles} obstacles ---");
    println!("  Avg tick:      {avg_tick_us:.1} us ({ticks_per_sec:.0} ticks/sec)");
    let verdict = if ticks_per_sec >= TARGET_TPS {
        "OK"
    } else {
        "SLOW"
    };
    println!("  Verdict:       {verdict} (target: >={TARGET_TPS} ticks/sec)");
    println!(
        "  GA state:      generation {}, evaluation {}",
        world.ga_state().generation,
        world.ga_state().evaluation
    );
    println!();
    Ok(())
}

fn print_best_per_generation(history: &FitnessHistory) {
    for (idx, best) in best_per_generation(history).iter().enumerate() {
        println!("  generation {:>4}: best {best:.4}", idx + 1);
    }
}

fn inspect(path: &Path) -> Result<()> {
    let file = File::open(path).context("failed to open history file")?;
    let mut reader = BufReader::new(file);
    match HistorySnapshot::read_from(&mut reader) {
        Ok(snapshot) => {
            println!(
                "{} generations, {} explored bounds",
                snapshot.fitness.len(),
                snapshot.bounds.len()
            );
            print_best_per_generation(&snapshot.fitness);
            Ok(())
        }
        Err(HistoryError::CorruptHistory { reason, recovered }) => {
            warn!(%reason, "history file is corrupt, showing recovered data");
            match &recovered {
                Recovered::Fitness(history) => print_best_per_generation(history),
                Recovered::Bounds(bounds) => {
                    println!("fitness table intact, {} bounds recovered", bounds.len())
                }
            }
            Err(HistoryError::CorruptHistory { reason, recovered })
                .context("history file is corrupt")
        }
        Err(err) => Err(err).context("failed to read history file"),
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::DumpDefaultConfig => {
            let config = SimConfig::default();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Benchmark => {
            if cfg!(debug_assertions) {
                eprintln!("WARNING: running in debug mode. Results are not representative.");
                eprintln!("         Use: cargo run -p robot-ga-cli --release -- benchmark");
                eprintln!();
            }
            println!("=== Robot GA tick benchmark ===");
            println!("Warmup: {WARMUP_TICKS} ticks, Benchmark: {BENCHMARK_TICKS} ticks");
            println!();

            let configs = [(20, 10), (100, 20), (200, 30)];
            for (robots, obstacles) in configs {
                run_benchmark(robots, obstacles)?;
            }
        }
        Commands::Inspect { history } => inspect(&history)?,
        Commands::Run {
            config,
            out,
            generations,
        } => {
            let file = File::open(&config).context("failed to open config file")?;
            let reader = BufReader::new(file);
            let sim_config: SimConfig =
                serde_json::from_reader(reader).context("failed to parse config")?;
            sim_config.validate().context("Config validation error")?;

            info!(config = ?config, generations, "starting run");
            let mut world = World::new(sim_config).context("failed to initialize world")?;
            let summary = world
                .run_generations(generations)
                .context("simulation stopped")?;

            if let Some(out_dir) = out {
                std::fs::create_dir_all(&out_dir).context("failed to create output directory")?;
                let summary_path = out_dir.join("summary.json");
                let file = File::create(summary_path).context("failed to create summary file")?;
                serde_json::to_writer_pretty(file, &summary).context("failed to write summary")?;

                let history_path = out_dir.join("history.bin");
                let file = File::create(history_path).context("failed to create history file")?;
                let mut writer = BufWriter::new(file);
                world
                    .write_history(&mut writer)
                    .context("failed to write history")?;
                writer.flush().context("failed to flush history")?;
                println!("Run complete. Results saved to {:?}", out_dir);
            } else {
                let best = summary.best_per_generation.iter().copied().fold(0.0f32, f32::max);
                println!(
                    "Run complete. {} generations in {} ticks, best fitness {best:.4}",
                    summary.generations_completed, summary.ticks
                );
            }
        }
    }
    Ok(())
}
