//! # DinoNEAT-NN
//! A neural network-based implementation of the `dinoneat` crate's `Genome` trait.
//!
//! Provides an [`NNGenome`] type usable in `dinoneat` `Population`s, and a
//! [`FeedForwardNetwork`] which can be generated from an [`NNGenome`] and
//! evaluated as a pure function of its inputs, once per game tick.
//!
//! [`NNGenome`]: crate::genomics::NNGenome
//! [`FeedForwardNetwork`]: crate::networks::FeedForwardNetwork
//!
//! # Example usage: choosing a game action
//! ```
//! use dinoneat_nn::{
//!     genomics::{GeneticConfig, LineageCounter, NNGenome},
//!     networks::{argmax, evaluate_network, softmax},
//! };
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use std::num::NonZeroUsize;
//!
//! let config = GeneticConfig {
//!     input_count: NonZeroUsize::new(6).unwrap(),
//!     output_count: NonZeroUsize::new(3).unwrap(),
//!     bias: true,
//!     initial_expression_chance: 1.0,
//!     weight_bound: 1.0,
//!     ..GeneticConfig::zero()
//! };
//! let mut rng = ChaCha8Rng::seed_from_u64(0);
//! let history = LineageCounter::new(&config);
//!
//! let mut genome = NNGenome::new(&config, &mut rng);
//! genome.mutate_add_node(&history, &config, &mut rng);
//!
//! // Distance, obstacle height, airborne flag, speed, height, vertical velocity.
//! let sensors = [0.4, 0.2, 0.0, 0.6, 0.0, 0.0];
//! let outputs = evaluate_network(&genome, &sensors).unwrap();
//! let action = argmax(&softmax(&outputs)).unwrap();
//!
//! assert!(action < 3);
//! ```

pub mod genomics;
pub mod networks;

/// Identifier type used to designate nodes and
/// edges, and to align historically identical
/// edges during crossover.
pub type Innovation = usize;
