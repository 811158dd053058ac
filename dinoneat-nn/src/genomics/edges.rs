use crate::genomics::{GeneticConfig, WeightPerturbation};
use crate::Innovation;

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use std::fmt;

/// Edges are weighted connections between two nodes,
/// and become network connections in the genome's phenotype.
///
/// Disabled edges carry no signal, but are kept
/// so that they can be aligned during crossover.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct Edge {
    id: Innovation,
    source: Innovation,
    target: Innovation,
    weight: f32,
    enabled: bool,
}

impl Edge {
    /// Returns a new _enabled_ edge with the specified parameters.
    ///
    /// # Examples
    /// ```
    /// use dinoneat_nn::genomics::Edge;
    ///
    /// let edge = Edge::new(42, 3, 9, 2.0);
    ///
    /// assert_eq!(edge.id(), 42);
    /// assert_eq!(edge.endpoints(), (3, 9));
    /// assert_eq!(edge.weight(), 2.0);
    /// assert!(edge.enabled());
    /// ```
    pub fn new(id: Innovation, source: Innovation, target: Innovation, weight: f32) -> Edge {
        Edge {
            id,
            source,
            target,
            weight,
            enabled: true,
        }
    }

    /// Returns a random weight, uniformly distributed
    /// over the range ±[`weight_bound`].
    ///
    /// [`weight_bound`]: crate::genomics::GeneticConfig::weight_bound
    pub fn random_weight<R: Rng + ?Sized>(config: &GeneticConfig, rng: &mut R) -> f32 {
        rng.gen_range(-config.weight_bound..=config.weight_bound)
    }

    /// Nudges the edge's weight by a random amount, drawn
    /// according to [`weight_perturbation`] with a scale of
    /// [`weight_mutation_power`]. The result is clamped to
    /// ±[`weight_bound`].
    ///
    /// [`weight_perturbation`]: crate::genomics::GeneticConfig::weight_perturbation
    /// [`weight_mutation_power`]: crate::genomics::GeneticConfig::weight_mutation_power
    /// [`weight_bound`]: crate::genomics::GeneticConfig::weight_bound
    ///
    /// # Examples
    /// ```
    /// use dinoneat_nn::genomics::{Edge, GeneticConfig};
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    ///
    /// let config = GeneticConfig {
    ///     weight_mutation_power: 2.5,
    ///     weight_bound: 5.0,
    ///     ..GeneticConfig::zero()
    /// };
    /// let mut rng = ChaCha8Rng::seed_from_u64(1);
    /// let mut edge = Edge::new(42, 3, 9, 3.0);
    ///
    /// edge.perturb_weight(&config, &mut rng);
    ///
    /// assert!((edge.weight() - 3.0).abs() <= 2.5);
    /// assert!(edge.weight().abs() <= 5.0);
    /// ```
    pub fn perturb_weight<R: Rng + ?Sized>(&mut self, config: &GeneticConfig, rng: &mut R) {
        let power = config.weight_mutation_power;
        let delta = match config.weight_perturbation {
            WeightPerturbation::Uniform => rng.gen_range(-power..=power),
            WeightPerturbation::Gaussian => match Normal::new(0.0, power) {
                Ok(normal) => normal.sample(rng),
                Err(_) => 0.0,
            },
        };
        self.weight = (self.weight + delta).clamp(-config.weight_bound, config.weight_bound);
    }

    pub fn id(&self) -> Innovation {
        self.id
    }

    pub fn source(&self) -> Innovation {
        self.source
    }

    pub fn target(&self) -> Innovation {
        self.target
    }

    /// Returns the edge's `(source, target)` node ids.
    pub fn endpoints(&self) -> (Innovation, Innovation) {
        (self.source, self.target)
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub(super) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:?}[{:?}->{:?}, {:.3}]{}",
            if self.enabled { "" } else { "(" },
            self.id,
            self.source,
            self.target,
            self.weight,
            if self.enabled { "" } else { ")" },
        )
    }
}
