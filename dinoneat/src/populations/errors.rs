use thiserror::Error;

use std::error::Error as StdError;

/// Inconsistent population or genetic parameters.
/// Always fatal at construction time.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A probability was outside of `[0.0, 1.0]`.
    #[error("`{parameter}` must be a probability in [0, 1], got {value}")]
    ProbabilityOutOfRange { parameter: &'static str, value: f32 },
    /// A magnitude was negative or not finite.
    #[error("`{parameter}` must be finite and non-negative, got {value}")]
    Negative { parameter: &'static str, value: f32 },
    /// A magnitude was zero, negative or not finite.
    #[error("`{parameter}` must be finite and positive, got {value}")]
    NonPositive { parameter: &'static str, value: f32 },
    /// The survival threshold leaves nobody to breed from.
    #[error("survival threshold {survival_threshold} leaves an empty breeding pool in a population of {size}")]
    EmptyBreedingPool { size: usize, survival_threshold: f32 },
    /// Elites would fill the entire next generation.
    #[error("elitism of {elitism} leaves no room for offspring in a population of {size}")]
    ElitismExceedsSize { elitism: usize, size: usize },
    /// A count parameter that must be at least one was zero.
    #[error("`{parameter}` must be at least 1")]
    Zero { parameter: &'static str },
}

impl ConfigError {
    /// Checks that `value` lies in `[0.0, 1.0]`.
    ///
    /// # Examples
    /// ```
    /// use dinoneat::ConfigError;
    ///
    /// assert!(ConfigError::check_probability("chance", 0.5).is_ok());
    /// assert!(ConfigError::check_probability("chance", 1.5).is_err());
    /// assert!(ConfigError::check_probability("chance", f32::NAN).is_err());
    /// ```
    pub fn check_probability(parameter: &'static str, value: f32) -> Result<(), ConfigError> {
        if (0.0..=1.0).contains(&value) {
            Ok(())
        } else {
            Err(ConfigError::ProbabilityOutOfRange { parameter, value })
        }
    }

    /// Checks that `value` is finite and `≥ 0`.
    pub fn check_non_negative(parameter: &'static str, value: f32) -> Result<(), ConfigError> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(ConfigError::Negative { parameter, value })
        }
    }

    /// Checks that `value` is finite and `> 0`.
    pub fn check_positive(parameter: &'static str, value: f32) -> Result<(), ConfigError> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::NonPositive { parameter, value })
        }
    }
}

/// Errors surfaced by a [`Population`].
///
/// Whenever one of these is returned the population is left
/// exactly as it was before the failing call, so evolution can
/// be resumed (or the population saved) from the last good state.
///
/// [`Population`]: crate::Population
#[derive(Debug, Error)]
pub enum PopulationError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// `evolve` was called before every genome of the
    /// generation received a fitness value.
    #[error("generation {generation} has not been fully evaluated")]
    NotEvaluated { generation: usize },
    /// The fitness collaborator failed for one genome.
    #[error("fitness evaluation of genome {genome} failed in generation {generation}")]
    Fitness {
        generation: usize,
        genome: usize,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    /// The fitness collaborator returned a negative or non-finite value.
    #[error("genome {genome} was assigned invalid fitness {value} in generation {generation}")]
    InvalidFitness {
        generation: usize,
        genome: usize,
        value: f32,
    },
    /// A restored population holds more genomes than the configured size.
    #[error("{count} genomes cannot fit in a population of size {size}")]
    TooManyGenomes { count: usize, size: usize },
    /// A restored genome does not match the genetic configuration.
    #[error("genome {index} does not conform to the genetic configuration")]
    NonconformingGenome { index: usize },
}
