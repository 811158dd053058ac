use crate::genomics::ActivationType;

use dinoneat::ConfigError;
use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

/// Distribution of the delta applied when an
/// edge weight is perturbed rather than reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightPerturbation {
    /// Uniform over ±`weight_mutation_power`.
    Uniform,
    /// Normal with a standard deviation of `weight_mutation_power`.
    Gaussian,
}

/// Configuration data for genome generation
/// and inter-genome operations.
///
/// # Note
/// All quantities expressing probabilities
/// should be in the range [0.0, 1.0], which
/// [`validate`] enforces.
///
/// [`validate`]: GeneticConfig::validate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneticConfig {
    /// Number of inputs in a genome.
    pub input_count: NonZeroUsize,
    /// Number of outputs in a genome.
    pub output_count: NonZeroUsize,
    /// Whether genomes carry a bias node with a constant
    /// output of 1, connectable like an input.
    pub bias: bool,
    /// Possible activation types for hidden nodes.
    /// If an empty vector is given, nodes will default
    /// to [`Sigmoid`].
    ///
    /// [`Sigmoid`]: crate::genomics::ActivationType
    pub hidden_activation_types: Vec<ActivationType>,
    /// Activation types of output nodes in a genome.
    /// If fewer than [`output_count`] are specified,
    /// the default is [`Sigmoid`].
    ///
    /// [`output_count`]: GeneticConfig::output_count
    /// [`Sigmoid`]: crate::genomics::ActivationType
    pub output_activation_types: Vec<ActivationType>,
    /// Chance that an edge between an input-output node pair
    /// is created during initial genome generation.
    pub initial_expression_chance: f32,
    /// Maximum magnitude of an edge's weight.
    pub weight_bound: f32,
    /// Chance of each enabled edge's weight being mutated.
    pub weight_mutation_chance: f32,
    /// Chance of a mutated weight being reset,
    /// rather than perturbed.
    pub weight_reset_chance: f32,
    /// Distribution of weight perturbations.
    pub weight_perturbation: WeightPerturbation,
    /// Scale of weight perturbations.
    pub weight_mutation_power: f32,
    /// Chance of a node addition mutation taking place.
    pub node_addition_mutation_chance: f32,
    /// Chance of an edge addition mutation taking place.
    pub edge_addition_mutation_chance: f32,
    /// Maximum number of node pairs tried during edge
    /// addition before the mutation gives up.
    pub max_edge_addition_attempts: usize,
    /// Chance of flipping a random edge's enabled flag.
    pub toggle_enable_chance: f32,
    /// Chance that matching edge weights are averaged during
    /// crossover, instead of copying the weight from a
    /// randomly chosen parent.
    pub mate_by_averaging_chance: f32,
    /// Chance that a matching edge disabled in either parent
    /// is disabled in the offspring.
    pub disabled_gene_inheritance_chance: f32,
    /// Chance that the first parent is dominant when
    /// both parents are equally fit.
    pub equal_fitness_first_parent_chance: f32,
}

impl GeneticConfig {
    /// Returns a "zero-valued" default configuration.
    /// All values are 0, empty, or in the case of
    /// `NonZeroUsize`s, 1. Perturbations are uniform.
    ///
    /// # Note
    /// This value is not suitable for use in most experiments
    /// (its weight bound of 0 fails validation). It is meant as
    /// a way to fill in unused values during configuration
    /// instantiation.
    ///
    /// # Examples
    /// ```
    /// use dinoneat_nn::genomics::GeneticConfig;
    ///
    /// let cfg1 = GeneticConfig::zero();
    ///
    /// let cfg2 = GeneticConfig {
    ///     // Specify some values here...
    ///     weight_bound: 3.0,
    ///     node_addition_mutation_chance: 0.05,
    ///     // Default the rest...
    ///     ..GeneticConfig::zero()
    /// };
    ///
    /// assert!(cfg1.validate().is_err());
    /// assert!(cfg2.validate().is_ok());
    /// ```
    pub const fn zero() -> GeneticConfig {
        GeneticConfig {
            input_count: NonZeroUsize::MIN,
            output_count: NonZeroUsize::MIN,
            bias: false,
            hidden_activation_types: Vec::new(),
            output_activation_types: Vec::new(),
            initial_expression_chance: 0.0,
            weight_bound: 0.0,
            weight_mutation_chance: 0.0,
            weight_reset_chance: 0.0,
            weight_perturbation: WeightPerturbation::Uniform,
            weight_mutation_power: 0.0,
            node_addition_mutation_chance: 0.0,
            edge_addition_mutation_chance: 0.0,
            max_edge_addition_attempts: 0,
            toggle_enable_chance: 0.0,
            mate_by_averaging_chance: 0.0,
            disabled_gene_inheritance_chance: 0.0,
            equal_fitness_first_parent_chance: 0.0,
        }
    }

    /// Number of nodes that edges can start from
    /// in a fresh genome: inputs plus the bias node.
    pub fn source_count(&self) -> usize {
        self.input_count.get() + usize::from(self.bias)
    }

    /// Returns a copy of the configuration whose mutation chances
    /// are multiplied by `rate`, capped at 1, and whose weight
    /// mutation power is multiplied by `scale`.
    ///
    /// # Examples
    /// ```
    /// use dinoneat_nn::genomics::GeneticConfig;
    ///
    /// let config = GeneticConfig {
    ///     weight_mutation_chance: 0.5,
    ///     node_addition_mutation_chance: 0.03,
    ///     weight_mutation_power: 0.1,
    ///     ..GeneticConfig::zero()
    /// };
    /// let intensified = config.intensified(3.0, 2.0);
    ///
    /// assert_eq!(intensified.weight_mutation_chance, 1.0);
    /// assert!((intensified.node_addition_mutation_chance - 0.09).abs() < 1e-6);
    /// assert!((intensified.weight_mutation_power - 0.2).abs() < 1e-6);
    /// ```
    pub fn intensified(&self, rate: f32, scale: f32) -> GeneticConfig {
        let boost = |chance: f32| (chance * rate).min(1.0);
        GeneticConfig {
            weight_mutation_chance: boost(self.weight_mutation_chance),
            node_addition_mutation_chance: boost(self.node_addition_mutation_chance),
            edge_addition_mutation_chance: boost(self.edge_addition_mutation_chance),
            toggle_enable_chance: boost(self.toggle_enable_chance),
            weight_mutation_power: self.weight_mutation_power * scale,
            ..self.clone()
        }
    }

    /// Checks the configuration for inconsistencies.
    ///
    /// # Errors
    /// Returns the first out-of-range probability,
    /// a non-positive weight bound, or a negative
    /// mutation power.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (parameter, value) in [
            ("initial_expression_chance", self.initial_expression_chance),
            ("weight_mutation_chance", self.weight_mutation_chance),
            ("weight_reset_chance", self.weight_reset_chance),
            (
                "node_addition_mutation_chance",
                self.node_addition_mutation_chance,
            ),
            (
                "edge_addition_mutation_chance",
                self.edge_addition_mutation_chance,
            ),
            ("toggle_enable_chance", self.toggle_enable_chance),
            ("mate_by_averaging_chance", self.mate_by_averaging_chance),
            (
                "disabled_gene_inheritance_chance",
                self.disabled_gene_inheritance_chance,
            ),
            (
                "equal_fitness_first_parent_chance",
                self.equal_fitness_first_parent_chance,
            ),
        ] {
            ConfigError::check_probability(parameter, value)?;
        }
        ConfigError::check_positive("weight_bound", self.weight_bound)?;
        ConfigError::check_non_negative("weight_mutation_power", self.weight_mutation_power)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unbounded_weights() {
        assert_eq!(
            GeneticConfig::zero().validate(),
            Err(ConfigError::NonPositive {
                parameter: "weight_bound",
                value: 0.0
            })
        );
    }

    #[test]
    fn rejects_bad_probability() {
        let config = GeneticConfig {
            weight_bound: 1.0,
            toggle_enable_chance: 1.5,
            ..GeneticConfig::zero()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ProbabilityOutOfRange {
                parameter: "toggle_enable_chance",
                value: 1.5
            })
        );
    }

    #[test]
    fn intensified_keeps_structure() {
        let config = GeneticConfig {
            input_count: NonZeroUsize::new(6).unwrap(),
            weight_bound: 2.0,
            weight_reset_chance: 0.1,
            edge_addition_mutation_chance: 0.4,
            toggle_enable_chance: 0.01,
            ..GeneticConfig::zero()
        };
        let intensified = config.intensified(3.0, 2.0);

        assert_eq!(intensified.input_count, config.input_count);
        assert_eq!(intensified.weight_bound, 2.0);
        assert_eq!(intensified.weight_reset_chance, 0.1);
        assert_eq!(intensified.edge_addition_mutation_chance, 1.0);
        assert!((intensified.toggle_enable_chance - 0.03).abs() < 1e-6);
        assert!(intensified.validate().is_ok());
        assert_eq!(config.intensified(1.0, 1.0), config);
    }

    #[test]
    fn counts_bias_as_source() {
        let config = GeneticConfig {
            input_count: NonZeroUsize::new(6).unwrap(),
            bias: true,
            ..GeneticConfig::zero()
        };
        assert_eq!(config.source_count(), 7);
    }
}
