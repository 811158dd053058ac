//! A Population is a collection of genomes,
//! which can be evolved using a genome evaluation
//! function as the source of selective pressure.
mod config;
mod errors;
mod offspring_factory;
mod report;
mod selection;

use crate::{Genome, InnovationHistory};
pub use config::{FitnessFailurePolicy, PopulationConfig};
pub use errors::{ConfigError, PopulationError};
use offspring_factory::OffspringFactory;
pub use report::{GenerationReport, Stats};
use selection::BreedingPool;
pub use selection::SelectionScheme;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use std::error::Error as StdError;

/// Serializable state of a population, sufficient
/// to resume evolution with [`Population::from_state`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PopulationState<H, G> {
    pub generation: usize,
    pub history: H,
    pub genomes: Vec<G>,
    /// Best genome evaluated so far, if any.
    /// A missing champion deserializes as `None`.
    pub champion: Option<G>,
}

/// A population of genomes.
///
/// Every stochastic decision is drawn from a generator seeded
/// with [`PopulationConfig::seed`], so equal seeds and equal
/// fitness values produce identical evolutionary runs.
pub struct Population<C, H, G> {
    genomes: Vec<G>,
    history: H,
    generation: usize,
    evaluated: bool,
    champion: Option<G>,
    previous_best: Option<f32>,
    rng: ChaCha8Rng,
    population_config: PopulationConfig,
    genetic_config: C,
}

impl<C, H, G> Population<C, H, G>
where
    G: Genome<InnovationHistory = H, Config = C>,
    H: InnovationHistory<Config = C>,
{
    /// Creates a new population using the passed configurations.
    ///
    /// The type of `genetic_config` depends on the implementation
    /// of [`Genome`], and is effectively opaque to the population.
    ///
    /// # Errors
    /// Returns an error if either configuration is inconsistent.
    ///
    /// # Examples
    /// ```
    /// # use dinoneat_nn::genomics::{GeneticConfig, NNGenome as G};
    /// use dinoneat::{Population, PopulationConfig};
    /// use std::num::NonZeroUsize;
    ///
    /// let pop_config = PopulationConfig {
    ///     size: NonZeroUsize::new(30).unwrap(),
    ///     survival_threshold: 0.5,
    ///     ..PopulationConfig::zero()
    /// };
    /// # let genetic_config = GeneticConfig {
    /// #     input_count: NonZeroUsize::new(2).unwrap(),
    /// #     weight_bound: 1.0,
    /// #     ..GeneticConfig::zero()
    /// # };
    ///
    /// // With `G` a suitable type implementing `Genome`...
    /// let population = Population::<_, _, G>::new(pop_config, genetic_config).unwrap();
    /// assert_eq!(population.genomes().count(), 30);
    /// ```
    pub fn new(
        population_config: PopulationConfig,
        genetic_config: C,
    ) -> Result<Population<C, H, G>, ConfigError> {
        population_config.validate()?;
        G::validate_config(&genetic_config)?;
        Ok(Self::populate(population_config, genetic_config))
    }

    /// Builds a population of fresh genomes from
    /// already validated configurations.
    fn populate(population_config: PopulationConfig, genetic_config: C) -> Population<C, H, G> {
        let mut rng = ChaCha8Rng::seed_from_u64(population_config.seed);
        let genomes = (0..population_config.size.get())
            .map(|_| G::new(&genetic_config, &mut rng))
            .collect();
        Population {
            genomes,
            history: H::new(&genetic_config),
            generation: 0,
            evaluated: false,
            champion: None,
            previous_best: None,
            rng,
            population_config,
            genetic_config,
        }
    }

    /// Restores a population from a saved state.
    ///
    /// If the state holds fewer genomes than the configured
    /// population size, the remaining space is filled with
    /// fresh genomes. The restored generation must be
    /// evaluated again before it can evolve.
    ///
    /// # Errors
    /// Returns an error if either configuration is inconsistent,
    /// the state holds more genomes than the configured size, or
    /// any genome is incompatible with the genetic configuration,
    /// as established by [`Genome::conforms_to`].
    pub fn from_state(
        state: PopulationState<H, G>,
        population_config: PopulationConfig,
        genetic_config: C,
    ) -> Result<Population<C, H, G>, PopulationError> {
        population_config.validate()?;
        G::validate_config(&genetic_config)?;

        let size = population_config.size.get();
        let PopulationState {
            generation,
            history,
            mut genomes,
            champion,
        } = state;
        if genomes.len() > size {
            return Err(PopulationError::TooManyGenomes {
                count: genomes.len(),
                size,
            });
        }
        if let Some(index) = genomes.iter().position(|g| !g.conforms_to(&genetic_config)) {
            return Err(PopulationError::NonconformingGenome { index });
        }

        let mut rng =
            ChaCha8Rng::seed_from_u64(population_config.seed.wrapping_add(generation as u64));
        let missing = size - genomes.len();
        genomes.extend((0..missing).map(|_| G::new(&genetic_config, &mut rng)));

        let champion = champion.filter(|g| g.conforms_to(&genetic_config));
        Ok(Population {
            genomes,
            history,
            generation,
            evaluated: false,
            previous_best: champion.as_ref().map(|g| g.fitness()),
            champion,
            rng,
            population_config,
            genetic_config,
        })
    }

    /// Returns a serializable copy of the population's state.
    ///
    /// # Examples
    /// ```
    /// # use dinoneat_nn::genomics::{GeneticConfig, NNGenome as G};
    /// use dinoneat::{Population, PopulationConfig};
    ///
    /// # let genetic_config = GeneticConfig { weight_bound: 1.0, ..GeneticConfig::zero() };
    /// let pop_config = PopulationConfig { survival_threshold: 1.0, ..PopulationConfig::zero() };
    /// let population = Population::<_, _, G>::new(pop_config.clone(), genetic_config.clone()).unwrap();
    /// let state = population.snapshot();
    ///
    /// let restored = Population::<_, _, G>::from_state(state, pop_config, genetic_config).unwrap();
    /// assert_eq!(restored.generation(), population.generation());
    /// ```
    pub fn snapshot(&self) -> PopulationState<H, G>
    where
        H: Clone,
    {
        PopulationState {
            generation: self.generation,
            history: self.history.clone(),
            genomes: self.genomes.clone(),
            champion: self.champion.clone(),
        }
    }

    /// Evaluates the fitness of each genome in the
    /// population using the passed evaluator.
    ///
    /// Negative or non-finite values are handled according
    /// to the configured [`FitnessFailurePolicy`].
    ///
    /// # Errors
    /// Returns an error under the `Propagate` policy if
    /// the evaluator returns an invalid fitness value.
    ///
    /// # Examples
    /// ```
    /// # use dinoneat_nn::genomics::{GeneticConfig, NNGenome as G};
    /// # use dinoneat_nn::networks::evaluate_network;
    /// use dinoneat::{Population, PopulationConfig};
    ///
    /// # let genetic_config = GeneticConfig { weight_bound: 1.0, ..GeneticConfig::zero() };
    /// // With `G` a suitable type implementing `Genome`...
    /// let pop_config = PopulationConfig { survival_threshold: 1.0, ..PopulationConfig::zero() };
    /// let mut population = Population::<_, _, G>::new(pop_config, genetic_config).unwrap();
    ///
    /// population.evaluate_fitness(|g| {
    ///     # let output = evaluate_network(g, &[1.0]).unwrap()[0];
    ///     # // Networks with outputs closer to 0 are given higher scores.
    ///     # let fitness = 1.0 - output.abs();
    ///     // Compute genome's fitness...
    ///     return fitness;
    /// }).unwrap();
    ///
    /// assert!(population.is_evaluated());
    /// ```
    pub fn evaluate_fitness<E>(&mut self, mut evaluator: E) -> Result<(), PopulationError>
    where
        E: FnMut(&G) -> f32,
    {
        self.try_evaluate_fitness(|g| Ok::<f32, std::convert::Infallible>(evaluator(g)))
    }

    /// Evaluates the fitness of each genome in the
    /// population using a fallible evaluator.
    ///
    /// Evaluator errors, as well as negative or non-finite values,
    /// are handled according to the configured [`FitnessFailurePolicy`].
    /// Under the `Propagate` policy evaluation stops at the first
    /// failure; fitness values already assigned are kept, but the
    /// generation is not considered evaluated.
    ///
    /// # Errors
    /// Returns the first failure under the `Propagate` policy.
    pub fn try_evaluate_fitness<E, Err>(&mut self, mut evaluator: E) -> Result<(), PopulationError>
    where
        E: FnMut(&G) -> Result<f32, Err>,
        Err: Into<Box<dyn StdError + Send + Sync>>,
    {
        self.evaluated = false;
        for index in 0..self.genomes.len() {
            let result = evaluator(&self.genomes[index]);
            self.assign_fitness(index, result)?;
        }
        self.finish_evaluation();
        Ok(())
    }

    /// Evaluates the fitness of every genome in parallel,
    /// then assigns the results in population order with the
    /// same failure handling as [`try_evaluate_fitness`].
    ///
    /// [`try_evaluate_fitness`]: Population::try_evaluate_fitness
    ///
    /// # Errors
    /// Returns the first failure (in population order)
    /// under the `Propagate` policy.
    pub fn par_evaluate_fitness<E, Err>(&mut self, evaluator: E) -> Result<(), PopulationError>
    where
        E: Fn(&G) -> Result<f32, Err> + Sync,
        Err: Into<Box<dyn StdError + Send + Sync>> + Send,
        G: Sync,
    {
        self.evaluated = false;
        let results: Vec<Result<f32, Err>> = self.genomes.par_iter().map(&evaluator).collect();
        for (index, result) in results.into_iter().enumerate() {
            self.assign_fitness(index, result)?;
        }
        self.finish_evaluation();
        Ok(())
    }

    /// Assigns an evaluation result to a genome,
    /// applying the failure policy.
    fn assign_fitness<Err>(
        &mut self,
        index: usize,
        result: Result<f32, Err>,
    ) -> Result<(), PopulationError>
    where
        Err: Into<Box<dyn StdError + Send + Sync>>,
    {
        let generation = self.generation;
        let failure = match result {
            Ok(fitness) if fitness.is_finite() && fitness >= 0.0 => {
                self.genomes[index].set_fitness(fitness);
                return Ok(());
            }
            Ok(value) => PopulationError::InvalidFitness {
                generation,
                genome: index,
                value,
            },
            Err(e) => PopulationError::Fitness {
                generation,
                genome: index,
                source: e.into(),
            },
        };

        match self.population_config.fitness_failure_policy {
            FitnessFailurePolicy::WorstFitness => {
                warn!(generation, genome = index, error = %failure, "substituting worst fitness");
                self.genomes[index].set_fitness(0.0);
                Ok(())
            }
            FitnessFailurePolicy::Propagate => Err(failure),
        }
    }

    /// Marks the generation as evaluated and updates the champion.
    fn finish_evaluation(&mut self) {
        self.evaluated = true;
        let best = self
            .genomes
            .iter()
            .reduce(|best, g| if g.fitness() > best.fitness() { g } else { best });
        if let Some(best) = best {
            let improves = self
                .champion
                .as_ref()
                .map_or(true, |c| best.fitness() > c.fitness());
            if improves {
                self.champion = Some(best.clone());
            }
        }
    }

    /// Evolves the population by selecting the best performing
    /// genomes, mating (or cloning) and mutating them. The top
    /// [`elitism`] genomes pass to the next generation unchanged.
    ///
    /// If the best fitness failed to improve by more than the
    /// [stagnation threshold], offspring are mutated with the
    /// stagnation multipliers applied, and the last offspring
    /// slots are replaced with freshly initialized genomes.
    ///
    /// The next generation is assembled separately and only
    /// replaces the current one once complete.
    ///
    /// # Errors
    /// Returns an error if the current generation has not
    /// been fully evaluated.
    ///
    /// [`elitism`]: PopulationConfig::elitism
    /// [stagnation threshold]: PopulationConfig::stagnation_threshold
    ///
    /// # Examples
    /// ```
    /// # use dinoneat_nn::genomics::{GeneticConfig, NNGenome as G};
    /// use dinoneat::{Population, PopulationConfig};
    /// use std::num::NonZeroUsize;
    ///
    /// # let genetic_config = GeneticConfig { weight_bound: 1.0, ..GeneticConfig::zero() };
    /// // With `G` a suitable type implementing `Genome`...
    /// let mut population = Population::<_, _, G>::new(
    ///     PopulationConfig {
    ///         size: NonZeroUsize::new(10).unwrap(),
    ///         survival_threshold: 1.0,
    ///         ..PopulationConfig::zero()
    ///     },
    ///     genetic_config,
    /// ).unwrap();
    ///
    /// assert!(population.evolve().is_err());
    ///
    /// population.evaluate_fitness(|_| 1.0).unwrap();
    /// let report = population.evolve().unwrap();
    ///
    /// assert_eq!(report.generation, 0);
    /// assert_eq!(population.generation(), 1);
    /// ```
    pub fn evolve(&mut self) -> Result<GenerationReport, PopulationError> {
        if !self.evaluated {
            return Err(PopulationError::NotEvaluated {
                generation: self.generation,
            });
        }

        let ranked = self.rank();
        let fitness = Stats::from_values(self.genomes.iter().map(|g| g.fitness()));
        let best = fitness.maximum;
        let stagnated = self.previous_best.map_or(false, |previous| {
            best - previous <= self.population_config.stagnation_threshold * previous
        });

        let factory = OffspringFactory::new(
            &self.genomes,
            &ranked,
            &self.history,
            &self.genetic_config,
            &self.population_config,
        );
        let (next, composition) = factory.generate(stagnated, &mut self.rng);

        let report = GenerationReport {
            generation: self.generation,
            fitness,
            champion_fitness: self.champion.as_ref().map_or(best, |c| c.fitness()),
            stagnated,
            elites: composition.elites,
            offspring: composition.offspring,
            fresh: composition.fresh,
        };
        if stagnated {
            warn!(
                generation = self.generation,
                best,
                fresh = composition.fresh,
                rate_multiplier = self.population_config.stagnation_rate_multiplier,
                scale_multiplier = self.population_config.stagnation_scale_multiplier,
                "fitness stagnated"
            );
        }
        info!(
            generation = self.generation,
            max = fitness.maximum,
            mean = fitness.mean,
            median = fitness.median,
            min = fitness.minimum,
            champion = report.champion_fitness,
            "generation evaluated"
        );

        self.genomes = next;
        self.previous_best = Some(best);
        self.generation += 1;
        self.evaluated = false;
        Ok(report)
    }

    /// Indices of the current genomes by decreasing fitness.
    /// Ties keep population order.
    fn rank(&self) -> Vec<usize> {
        let mut ranked: Vec<usize> = (0..self.genomes.len()).collect();
        ranked.sort_by(|a, b| {
            self.genomes[*b]
                .fitness()
                .total_cmp(&self.genomes[*a].fitness())
        });
        ranked
    }

    /// Resets the population to a freshly initialized
    /// state, reseeding the random number generator.
    ///
    /// # Examples
    /// ```
    /// # use dinoneat_nn::genomics::{GeneticConfig, NNGenome as G};
    /// use dinoneat::{Population, PopulationConfig};
    ///
    /// # let genetic_config = GeneticConfig { weight_bound: 1.0, ..GeneticConfig::zero() };
    /// let pop_config = PopulationConfig { survival_threshold: 1.0, ..PopulationConfig::zero() };
    /// let mut population = Population::<_, _, G>::new(pop_config, genetic_config).unwrap();
    /// population.evaluate_fitness(|_| 1.0).unwrap();
    /// population.evolve().unwrap();
    ///
    /// population.reset();
    /// assert_eq!(population.generation(), 0);
    /// assert!(population.champion().is_none());
    /// ```
    pub fn reset(&mut self)
    where
        C: Clone,
    {
        *self = Self::populate(self.population_config.clone(), self.genetic_config.clone());
    }

    /// Returns the best genome ever evaluated,
    /// or `None` before the first evaluation.
    ///
    /// # Examples
    /// ```
    /// # use dinoneat_nn::genomics::{GeneticConfig, NNGenome as G};
    /// use dinoneat::{Genome, Population, PopulationConfig};
    /// use std::num::NonZeroUsize;
    ///
    /// # let genetic_config = GeneticConfig { weight_bound: 1.0, ..GeneticConfig::zero() };
    /// // With `G` a suitable type implementing `Genome`...
    /// let mut population = Population::<_, _, G>::new(
    ///     PopulationConfig {
    ///         size: NonZeroUsize::new(20).unwrap(),
    ///         survival_threshold: 0.5,
    ///         ..PopulationConfig::zero()
    ///     },
    ///     genetic_config,
    /// ).unwrap();
    /// assert!(population.champion().is_none());
    ///
    /// let mut fitness = 0.0;
    /// population.evaluate_fitness(move |_| {
    ///     fitness += 10.0;
    ///     fitness
    /// }).unwrap();
    ///
    /// assert_eq!(population.champion().unwrap().fitness(), 20.0 * 10.0);
    /// ```
    pub fn champion(&self) -> Option<&G> {
        self.champion.as_ref()
    }

    /// Returns an iterator over all current genomes.
    pub fn genomes(&self) -> impl Iterator<Item = &G> {
        self.genomes.iter()
    }

    /// Returns the current generation number.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns whether every genome of the current
    /// generation has been assigned a fitness.
    pub fn is_evaluated(&self) -> bool {
        self.evaluated
    }

    /// Returns the population's innovation history.
    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn population_config(&self) -> &PopulationConfig {
        &self.population_config
    }

    pub fn genetic_config(&self) -> &C {
        &self.genetic_config
    }
}
