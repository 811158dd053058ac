//! Evolves networks that run a headless obstacle course.
//!
//! ```bash
//! trainer --config trainer/config.ron --generations 50 --save runners.ron
//! trainer --resume runners.ron --save runners.ron
//! ```

mod config;
mod controller;
mod course;
mod errors;
mod persistence;

use config::TrainerConfig;
use errors::TrainerError;

use clap::Parser;
use dinoneat::Population;
use dinoneat_nn::genomics::{GeneticConfig, LineageCounter, NNGenome, NodeType};
use dinoneat_nn::networks::NetworkError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type RunnerPopulation = Population<GeneticConfig, LineageCounter, NNGenome>;

/// Evolve obstacle course runners.
#[derive(Parser, Debug)]
#[command(name = "trainer")]
struct Cli {
    /// Training configuration file (RON).
    #[arg(short, long, default_value = "trainer/config.ron")]
    config: PathBuf,

    /// Overrides the configured number of generations.
    #[arg(short, long)]
    generations: Option<usize>,

    /// Overrides the configured population seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Population file to continue training from.
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Where to save the population.
    #[arg(long)]
    save: Option<PathBuf>,

    /// Evaluation threads (defaults to one per core).
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let mut config = TrainerConfig::load(&cli.config)?;
    if let Some(generations) = cli.generations {
        config.generations = generations;
    }
    if let Some(seed) = cli.seed {
        config.population.seed = seed;
    }
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    ctrlc::set_handler(move || {
        info!("interrupt received, stopping after the current generation");
        flag.store(true, Ordering::SeqCst);
    })?;

    let population = train(
        &config,
        cli.resume.as_deref(),
        cli.save.as_deref(),
        &interrupted,
    )?;
    match population.champion() {
        Some(champion) => info!(
            fitness = champion.fitness(),
            hidden = champion.count_nodes(NodeType::Hidden),
            edges = champion.enabled_edges().count(),
            "champion"
        ),
        None => info!("no generation was evaluated"),
    }
    Ok(())
}

/// Trains runners on the configured obstacle courses.
fn train(
    config: &TrainerConfig,
    resume: Option<&Path>,
    save: Option<&Path>,
    interrupted: &AtomicBool,
) -> Result<RunnerPopulation, TrainerError> {
    train_with(config, resume, save, interrupted, |genome| {
        controller::fitness(
            genome,
            &config.course,
            &config.course_seeds,
            config.obstacle_reward,
        )
    })
}

/// Runs the configured number of generations, scoring genomes
/// with `evaluate`.
///
/// If `save` is given, the population is saved when training
/// ends, whether it completed, was interrupted, or failed.
fn train_with<E>(
    config: &TrainerConfig,
    resume: Option<&Path>,
    save: Option<&Path>,
    interrupted: &AtomicBool,
    evaluate: E,
) -> Result<RunnerPopulation, TrainerError>
where
    E: Fn(&NNGenome) -> Result<f32, NetworkError> + Sync,
{
    let mut population = match resume {
        Some(path) => {
            let state = persistence::load(path)?;
            info!(path = %path.display(), generation = state.generation, "resuming");
            Population::from_state(state, config.population.clone(), config.genetic.clone())?
        }
        None => Population::new(config.population.clone(), config.genetic.clone())?,
    };

    let outcome = run_generations(&mut population, config, save, interrupted, &evaluate);

    if let Some(path) = save {
        match persistence::save(path, &population.snapshot()) {
            Ok(()) => {
                info!(path = %path.display(), generation = population.generation(), "saved")
            }
            Err(e) if outcome.is_err() => {
                warn!(error = %e, "population could not be saved after a failure")
            }
            Err(e) => return Err(e),
        }
    }
    outcome.map(|()| population)
}

fn run_generations<E>(
    population: &mut RunnerPopulation,
    config: &TrainerConfig,
    save: Option<&Path>,
    interrupted: &AtomicBool,
    evaluate: &E,
) -> Result<(), TrainerError>
where
    E: Fn(&NNGenome) -> Result<f32, NetworkError> + Sync,
{
    for _ in 0..config.generations {
        if interrupted.load(Ordering::SeqCst) {
            warn!(generation = population.generation(), "training interrupted");
            break;
        }
        population.par_evaluate_fitness(evaluate)?;
        let report = population.evolve()?;

        if let (Some(path), Some(interval)) = (save, config.save_interval) {
            if interval > 0 && population.generation() % interval == 0 {
                persistence::save(path, &population.snapshot())?;
                info!(path = %path.display(), generation = population.generation(), "saved");
            }
        }
        if let Some(target) = config.target_fitness {
            if report.champion_fitness >= target {
                info!(
                    target_fitness = target,
                    generation = report.generation,
                    "target fitness reached"
                );
                break;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use dinoneat::{FitnessFailurePolicy, PopulationError};
    use std::sync::atomic::AtomicUsize;

    fn quick_config() -> TrainerConfig {
        let mut config: TrainerConfig = ron::from_str(include_str!("../config.ron")).unwrap();
        config.population.size = std::num::NonZeroUsize::new(12).unwrap();
        config.course.max_ticks = 200;
        config.course_seeds = vec![1, 2];
        config.generations = 3;
        config.target_fitness = None;
        config
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("trainer-{}-{}.ron", name, std::process::id()))
    }

    fn running() -> AtomicBool {
        AtomicBool::new(false)
    }

    #[test]
    fn training_runs_all_generations() {
        let population = train(&quick_config(), None, None, &running()).unwrap();
        assert_eq!(population.generation(), 3);
        assert!(population.champion().unwrap().fitness() > 0.0);
    }

    #[test]
    fn training_stops_at_target() {
        let config = TrainerConfig {
            target_fitness: Some(0.0),
            ..quick_config()
        };
        let population = train(&config, None, None, &running()).unwrap();
        assert_eq!(population.generation(), 1);
    }

    #[test]
    fn training_resumes_from_save() {
        let path = temp_path("resume");
        let config = quick_config();

        let first = train(&config, None, Some(path.as_path()), &running()).unwrap();
        let saved = persistence::load(&path).unwrap();
        assert_eq!(saved.generation, first.generation());
        assert_eq!(saved.genomes, first.genomes().cloned().collect::<Vec<_>>());
        assert_eq!(saved.champion.as_ref(), first.champion());

        let resumed = train(&config, Some(path.as_path()), None, &running()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(resumed.generation(), first.generation() + 3);
        assert!(resumed.champion().unwrap().fitness() >= first.champion().unwrap().fitness());
    }

    #[test]
    fn interrupted_training_is_saved() {
        let path = temp_path("interrupt");
        let interrupted = AtomicBool::new(true);

        let population = train(&quick_config(), None, Some(path.as_path()), &interrupted).unwrap();
        let saved = persistence::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(population.generation(), 0);
        assert_eq!(saved.generation, 0);
        assert_eq!(saved.genomes.len(), 12);
    }

    #[test]
    fn failed_training_saves_last_generation() {
        let path = temp_path("failure");
        let mut config = quick_config();
        config.population.fitness_failure_policy = FitnessFailurePolicy::Propagate;
        let calls = AtomicUsize::new(0);

        // The third generation's evaluation fails.
        let result = train_with(&config, None, Some(path.as_path()), &running(), |_| {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 * 12 {
                Ok(1.0)
            } else {
                Err(NetworkError::InputCountMismatch {
                    expected: 6,
                    actual: 0,
                })
            }
        });
        let saved = persistence::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(
            result,
            Err(TrainerError::Population(PopulationError::Fitness {
                generation: 2,
                ..
            }))
        ));
        assert_eq!(saved.generation, 2);
        assert_eq!(saved.genomes.len(), 12);
    }
}
