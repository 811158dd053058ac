use super::{ConfigError, SelectionScheme};

use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

/// What to do when the fitness collaborator fails
/// (or returns a negative or non-finite value) for a genome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitnessFailurePolicy {
    /// The genome is assigned the worst possible fitness (0)
    /// and evaluation of the remaining genomes continues.
    WorstFitness,
    /// Evaluation stops and the error is returned to the caller.
    Propagate,
}

/// Configuration data for population generation
/// and evolution.
///
/// # Note
/// All quantities expressing probabilities
/// should be in the range [0.0, 1.0], which
/// [`validate`] enforces.
///
/// [`validate`]: PopulationConfig::validate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Size of the population.
    pub size: NonZeroUsize,
    /// Top n of the population which is copied
    /// as-is to the next generation.
    pub elitism: usize,
    /// Top % of the population which can participate
    /// in mating. Rounded up to a whole genome.
    pub survival_threshold: f32,
    /// How parents are picked from the breeding pool.
    pub selection: SelectionScheme,
    /// Chance that offspring will be the result
    /// of crossover (as opposed to a mutated clone).
    pub sexual_reproduction_chance: f32,
    /// Relative improvement of the best fitness below which
    /// a generation is considered stagnated.
    pub stagnation_threshold: f32,
    /// Fraction of the next generation replaced with fresh
    /// genomes after a stagnated generation.
    pub stagnation_replacement: f32,
    /// Factor applied to mutation chances when mutating
    /// the offspring of a stagnated generation.
    #[serde(default = "PopulationConfig::neutral_multiplier")]
    pub stagnation_rate_multiplier: f32,
    /// Factor applied to mutation magnitudes when mutating
    /// the offspring of a stagnated generation.
    #[serde(default = "PopulationConfig::neutral_multiplier")]
    pub stagnation_scale_multiplier: f32,
    /// Handling of fitness evaluation failures.
    pub fitness_failure_policy: FitnessFailurePolicy,
    /// Seed of the population's random number generator.
    pub seed: u64,
}

impl PopulationConfig {
    /// Returns a "zero-valued" default configuration.
    /// All values are 0, or in the case of
    /// `NonZeroUsize`s and stagnation multipliers, 1.
    /// Selection is by truncation and failed evaluations
    /// receive the worst fitness.
    ///
    /// # Note
    /// This value is not suitable for use in most experiments.
    /// It is meant as a way to abbreviate configuration
    /// instantiation, or to fill in unused values.
    ///
    /// # Examples
    /// ```
    /// use dinoneat::PopulationConfig;
    ///
    /// let cfg1 = PopulationConfig::zero();
    ///
    /// let cfg2 = PopulationConfig {
    ///     // Specify some values here...
    ///     survival_threshold: 0.5,
    ///     // Default the rest...
    ///     ..PopulationConfig::zero()
    /// };
    /// ```
    pub const fn zero() -> PopulationConfig {
        PopulationConfig {
            size: NonZeroUsize::MIN,
            elitism: 0,
            survival_threshold: 0.0,
            selection: SelectionScheme::Truncation,
            sexual_reproduction_chance: 0.0,
            stagnation_threshold: 0.0,
            stagnation_replacement: 0.0,
            stagnation_rate_multiplier: 1.0,
            stagnation_scale_multiplier: 1.0,
            fitness_failure_policy: FitnessFailurePolicy::WorstFitness,
            seed: 0,
        }
    }

    const fn neutral_multiplier() -> f32 {
        1.0
    }

    /// Number of top-ranked genomes eligible for mating.
    ///
    /// # Examples
    /// ```
    /// use dinoneat::PopulationConfig;
    /// use std::num::NonZeroUsize;
    ///
    /// let config = PopulationConfig {
    ///     size: NonZeroUsize::new(50).unwrap(),
    ///     survival_threshold: 0.25,
    ///     ..PopulationConfig::zero()
    /// };
    ///
    /// assert_eq!(config.breeding_pool_size(), 13);
    /// ```
    pub fn breeding_pool_size(&self) -> usize {
        let size = self.size.get();
        ((size as f32 * self.survival_threshold).ceil() as usize).min(size)
    }

    /// Checks the configuration for inconsistencies.
    ///
    /// # Errors
    /// Returns the first inconsistency found.
    ///
    /// # Examples
    /// ```
    /// use dinoneat::{ConfigError, PopulationConfig};
    /// use std::num::NonZeroUsize;
    ///
    /// let config = PopulationConfig {
    ///     size: NonZeroUsize::new(10).unwrap(),
    ///     survival_threshold: 0.0,
    ///     ..PopulationConfig::zero()
    /// };
    ///
    /// assert!(matches!(config.validate(), Err(ConfigError::EmptyBreedingPool { .. })));
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_probability("survival_threshold", self.survival_threshold)?;
        ConfigError::check_probability(
            "sexual_reproduction_chance",
            self.sexual_reproduction_chance,
        )?;
        ConfigError::check_non_negative("stagnation_threshold", self.stagnation_threshold)?;
        ConfigError::check_probability("stagnation_replacement", self.stagnation_replacement)?;
        ConfigError::check_non_negative(
            "stagnation_rate_multiplier",
            self.stagnation_rate_multiplier,
        )?;
        ConfigError::check_non_negative(
            "stagnation_scale_multiplier",
            self.stagnation_scale_multiplier,
        )?;

        let size = self.size.get();
        if self.breeding_pool_size() == 0 {
            return Err(ConfigError::EmptyBreedingPool {
                size,
                survival_threshold: self.survival_threshold,
            });
        }
        if self.elitism >= size && size > 1 {
            return Err(ConfigError::ElitismExceedsSize {
                elitism: self.elitism,
                size,
            });
        }
        if let SelectionScheme::Tournament { size: 0 } = self.selection {
            return Err(ConfigError::Zero {
                parameter: "selection.size",
            });
        }
        Ok(())
    }
}
