use super::{BreedingPool, PopulationConfig};
use crate::Genome;

use rand::Rng;

/// Number of genomes of each kind in a generated generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(super) struct Composition {
    pub(super) elites: usize,
    pub(super) offspring: usize,
    pub(super) fresh: usize,
}

/// Auxiliary type for offspring generation.
/// Handles all the tasks of generating the next
/// generation from a ranked current one, according
/// to the specified configs.
pub(super) struct OffspringFactory<'a, G: Genome> {
    genomes: &'a [G],
    /// Indices into `genomes`, best first.
    ranked: &'a [usize],
    history: &'a G::InnovationHistory,
    genetic_config: &'a G::Config,
    population_config: &'a PopulationConfig,
}

impl<'a, G: Genome> OffspringFactory<'a, G> {
    pub(super) fn new(
        genomes: &'a [G],
        ranked: &'a [usize],
        history: &'a G::InnovationHistory,
        genetic_config: &'a G::Config,
        population_config: &'a PopulationConfig,
    ) -> OffspringFactory<'a, G> {
        OffspringFactory {
            genomes,
            ranked,
            history,
            genetic_config,
            population_config,
        }
    }

    /// Generates a full generation: elites first, then
    /// mated or cloned offspring, with the trailing offspring
    /// slots given to fresh genomes if `stagnated`. Offspring
    /// of a stagnated generation are mutated with the
    /// configured stagnation multipliers.
    pub(super) fn generate<R: Rng + ?Sized>(
        &self,
        stagnated: bool,
        rng: &mut R,
    ) -> (Vec<G>, Composition) {
        let size = self.population_config.size.get();
        let elites = self.population_config.elitism.min(size);
        let fresh = if stagnated {
            let replaced =
                (size as f32 * self.population_config.stagnation_replacement).ceil() as usize;
            replaced.min(size - elites)
        } else {
            0
        };
        let offspring = size - elites - fresh;

        let intensified;
        let mutation_config = if stagnated {
            intensified = G::intensify_mutation(
                self.genetic_config,
                self.population_config.stagnation_rate_multiplier,
                self.population_config.stagnation_scale_multiplier,
            );
            &intensified
        } else {
            self.genetic_config
        };

        let mut next = Vec::with_capacity(size);
        next.extend(self.ranked[..elites].iter().map(|i| self.genomes[*i].clone()));
        self.add_offspring(&mut next, offspring, mutation_config, rng);
        next.extend((0..fresh).map(|_| G::new(self.genetic_config, rng)));

        (
            next,
            Composition {
                elites,
                offspring,
                fresh,
            },
        )
    }

    /// Choose parents from the breeding pool and mate them
    /// (or clone one of them), mutating every child
    /// according to `mutation_config`.
    fn add_offspring<R: Rng + ?Sized>(
        &self,
        next: &mut Vec<G>,
        count: usize,
        mutation_config: &G::Config,
        rng: &mut R,
    ) {
        let pool_size = self.population_config.breeding_pool_size();
        let pool = BreedingPool::new(
            &self.ranked[..pool_size],
            |i| self.genomes[i].fitness(),
            self.population_config.selection,
        );

        for _ in 0..count {
            let mut child = if pool.len() > 1
                && rng.gen::<f32>() < self.population_config.sexual_reproduction_chance
            {
                let (parent1, parent2) = pool.choose_pair(rng);
                G::crossover(
                    &self.genomes[parent1],
                    &self.genomes[parent2],
                    self.genetic_config,
                    rng,
                )
            } else {
                let mut clone = self.genomes[pool.choose(rng)].clone();
                clone.set_fitness(0.0);
                clone
            };
            child.mutate(self.history, mutation_config, rng);
            next.push(child);
        }
    }
}
