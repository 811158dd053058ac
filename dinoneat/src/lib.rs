//! A generational neuroevolution engine in the style of
//! NeuroEvolution of Augmenting Topologies, built to train
//! agents for a side-scrolling obstacle game.
//!
//! The population controller is generic over the `Genome` trait;
//! a neural network genome with feed-forward evaluation is supplied
//! by the `dinoneat-nn` crate. Every stochastic decision is drawn
//! from a seeded generator owned by the population, so runs are
//! reproducible given identical fitness values.
//!
//! # Example usage: evolving a XOR approximator with `dinoneat-nn`
//! ```
//! use dinoneat::{Genome, Population, PopulationConfig, SelectionScheme};
//! use dinoneat_nn::{
//!     genomics::{ActivationType, GeneticConfig, NNGenome},
//!     networks::FeedForwardNetwork,
//! };
//! use std::num::NonZeroUsize;
//!
//! fn evaluate_xor(genome: &NNGenome) -> f32 {
//!     let network = match FeedForwardNetwork::try_from(genome) {
//!         Ok(network) => network,
//!         Err(_) => return 0.0,
//!     };
//!
//!     let cases = [
//!         ([0.0, 0.0], 0.0),
//!         ([0.0, 1.0], 1.0),
//!         ([1.0, 0.0], 1.0),
//!         ([1.0, 1.0], 0.0),
//!     ];
//!
//!     let error: f32 = cases
//!         .iter()
//!         .map(|(input, expected)| match network.evaluate(input) {
//!             Ok(output) => (output[0] - expected).abs(),
//!             Err(_) => 1.0,
//!         })
//!         .sum();
//!     (4.0 - error).powi(2)
//! }
//!
//! fn main() {
//!     let genetic_config = GeneticConfig {
//!         input_count: NonZeroUsize::new(2).unwrap(),
//!         output_count: NonZeroUsize::new(1).unwrap(),
//!         bias: true,
//!         hidden_activation_types: vec![ActivationType::Sigmoid],
//!         output_activation_types: vec![ActivationType::Sigmoid],
//!         initial_expression_chance: 1.0,
//!         weight_bound: 5.0,
//!         weight_mutation_chance: 0.8,
//!         weight_reset_chance: 0.1,
//!         weight_mutation_power: 0.5,
//!         node_addition_mutation_chance: 0.03,
//!         edge_addition_mutation_chance: 0.05,
//!         max_edge_addition_attempts: 20,
//!         mate_by_averaging_chance: 0.4,
//!         disabled_gene_inheritance_chance: 0.75,
//!         equal_fitness_first_parent_chance: 0.5,
//!         ..GeneticConfig::zero()
//!     };
//!
//!     let population_config = PopulationConfig {
//!         size: NonZeroUsize::new(50).unwrap(),
//!         elitism: 1,
//!         survival_threshold: 0.3,
//!         selection: SelectionScheme::Tournament { size: 3 },
//!         sexual_reproduction_chance: 0.6,
//!         seed: 2002,
//!         ..PopulationConfig::zero()
//!     };
//!
//!     let mut population = Population::new(population_config, genetic_config).unwrap();
//!     for _ in 0..20 {
//!         population.evaluate_fitness(evaluate_xor).unwrap();
//!         match population.evolve() {
//!             Ok(report) => println!("{}", report),
//!             Err(e) => {
//!                 eprintln!("{}", e);
//!                 break;
//!             }
//!         }
//!     }
//!
//!     let champion: &NNGenome = population.champion().unwrap();
//!     println!("best fitness: {}", champion.fitness());
//! }
//! ```

mod genome;
mod populations;

pub use genome::*;
pub use populations::*;
