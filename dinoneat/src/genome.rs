use crate::ConfigError;

use rand::Rng;

/// An interface for genomes that can be evolved by a [`Population`].
///
/// All stochastic operations receive the random number generator
/// from the caller, so that a population seeded with a fixed value
/// evolves identically across runs.
///
/// [`Population`]: crate::Population
pub trait Genome: Clone {
    type Config;
    type InnovationHistory: InnovationHistory<Config = Self::Config>;

    /// Returns a freshly initialized genome.
    fn new<R: Rng + ?Sized>(config: &Self::Config, rng: &mut R) -> Self;

    /// Combines two genomes and returns a "child" genome.
    ///
    /// Crossover only recombines existing genetic material,
    /// so it never consults the innovation history.
    fn crossover<R: Rng + ?Sized>(
        parent1: &Self,
        parent2: &Self,
        config: &Self::Config,
        rng: &mut R,
    ) -> Self;

    /// Applies all configured mutations to the genome.
    fn mutate<R: Rng + ?Sized>(
        &mut self,
        history: &Self::InnovationHistory,
        config: &Self::Config,
        rng: &mut R,
    );

    /// Returns a copy of `config` with every mutation chance
    /// multiplied by `rate` (capped at 1) and every mutation
    /// magnitude multiplied by `scale`.
    ///
    /// Populations use it to mutate offspring more aggressively
    /// after a stagnated generation.
    fn intensify_mutation(config: &Self::Config, rate: f32, scale: f32) -> Self::Config;

    /// Returns whether the genome is structurally compatible
    /// with genomes generated from `config`.
    fn conforms_to(&self, config: &Self::Config) -> bool;

    /// Checks the genetic configuration for inconsistencies.
    fn validate_config(_config: &Self::Config) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Sets the genome's fitness value.
    ///
    /// Populations only ever assign finite, non-negative values.
    fn set_fitness(&mut self, fitness: f32);

    /// Returns the genome's fitness value.
    fn fitness(&self) -> f32;
}

/// An Innovation History is used to keep track
/// of genetic innovations throughout successive
/// generations of genomes.
///
/// It is shared by reference between every mutation
/// of a generation, so implementations that hand out
/// identifiers must do so through interior, atomic updates.
pub trait InnovationHistory {
    type Config;

    fn new(config: &Self::Config) -> Self;
}
