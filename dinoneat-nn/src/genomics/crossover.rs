use super::{Edge, GeneticConfig, NNGenome, Node, NodeType};

use rand::Rng;
use tracing::debug;

use std::cmp::Ordering;

impl NNGenome {
    /// Combines two genomes and returns a "child" genome.
    ///
    /// The fitter parent is dominant; if both are equally fit,
    /// the first parent is dominant with probability
    /// [`equal_fitness_first_parent_chance`]. Edges are aligned by
    /// innovation number: matching edges take their weight from a
    /// random parent (or the parents' average, with probability
    /// [`mate_by_averaging_chance`]), while disjoint and excess edges
    /// are inherited from the dominant parent only. A matching edge
    /// disabled in either parent stays disabled with probability
    /// [`disabled_gene_inheritance_chance`].
    ///
    /// The child has fitness 0 and carries no new innovations.
    ///
    /// [`equal_fitness_first_parent_chance`]: crate::genomics::GeneticConfig::equal_fitness_first_parent_chance
    /// [`mate_by_averaging_chance`]: crate::genomics::GeneticConfig::mate_by_averaging_chance
    /// [`disabled_gene_inheritance_chance`]: crate::genomics::GeneticConfig::disabled_gene_inheritance_chance
    ///
    /// # Examples
    /// ```
    /// use dinoneat_nn::genomics::{GeneticConfig, LineageCounter, NNGenome};
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    ///
    /// let config = GeneticConfig {
    ///     initial_expression_chance: 1.0,
    ///     weight_bound: 1.0,
    ///     ..GeneticConfig::zero()
    /// };
    /// let history = LineageCounter::new(&config);
    /// let mut rng = ChaCha8Rng::seed_from_u64(0);
    ///
    /// let mut fitter = NNGenome::new(&config, &mut rng);
    /// fitter.mutate_add_node(&history, &config, &mut rng);
    /// fitter.set_fitness(2.0);
    /// let weaker = NNGenome::new(&config, &mut rng);
    ///
    /// let child = NNGenome::crossover(&weaker, &fitter, &config, &mut rng);
    ///
    /// assert_eq!(child.edges().count(), fitter.edges().count());
    /// assert_eq!(child.fitness(), 0.0);
    /// ```
    pub fn crossover<R: Rng + ?Sized>(
        parent1: &NNGenome,
        parent2: &NNGenome,
        config: &GeneticConfig,
        rng: &mut R,
    ) -> NNGenome {
        let first_is_dominant = match parent1.fitness().partial_cmp(&parent2.fitness()) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Less) => false,
            _ => rng.gen::<f32>() < config.equal_fitness_first_parent_chance,
        };
        let (dominant, other) = if first_is_dominant {
            (parent1, parent2)
        } else {
            (parent2, parent1)
        };

        let mut child = NNGenome::empty();
        for node in dominant.nodes().filter(|n| n.node_type() != NodeType::Hidden) {
            child.nodes.insert(node.id(), Self::inherit_node(node, other, rng));
        }

        for edge in dominant.edges() {
            let inherited = match other.edge(edge.id()) {
                Some(matching) => Self::inherit_matching_edge(edge, matching, config, rng),
                None => *edge,
            };
            for endpoint in [edge.source(), edge.target()] {
                if !child.nodes.contains_key(&endpoint) {
                    if let Some(node) = dominant.node(endpoint) {
                        child.nodes.insert(endpoint, Self::inherit_node(node, other, rng));
                    }
                }
            }
            if let Err(e) = child.add_edge(inherited) {
                debug!(error = %e, "edge dropped during crossover");
            }
        }

        debug!(
            dominant_edges = dominant.edges().count(),
            other_edges = other.edges().count(),
            child_edges = child.edges().count(),
            "crossover"
        );
        child
    }

    /// Takes a node from either parent at random
    /// if both have it.
    fn inherit_node<R: Rng + ?Sized>(node: &Node, other: &NNGenome, rng: &mut R) -> Node {
        match other.node(node.id()) {
            Some(alternative) if rng.gen::<bool>() => *alternative,
            _ => *node,
        }
    }

    fn inherit_matching_edge<R: Rng + ?Sized>(
        edge: &Edge,
        matching: &Edge,
        config: &GeneticConfig,
        rng: &mut R,
    ) -> Edge {
        let mut inherited = *edge;
        if rng.gen::<f32>() < config.mate_by_averaging_chance {
            inherited.set_weight((edge.weight() + matching.weight()) / 2.0);
        } else if rng.gen::<bool>() {
            inherited.set_weight(matching.weight());
        }

        let disabled = !edge.enabled() || !matching.enabled();
        inherited.set_enabled(
            !(disabled && rng.gen::<f32>() < config.disabled_gene_inheritance_chance),
        );
        inherited
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::{ActivationType, LineageCounter};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::num::NonZeroUsize;

    fn config() -> GeneticConfig {
        GeneticConfig {
            input_count: NonZeroUsize::new(2).unwrap(),
            output_count: NonZeroUsize::new(1).unwrap(),
            initial_expression_chance: 1.0,
            weight_bound: 1.0,
            ..GeneticConfig::zero()
        }
    }

    /// Two inputs feeding one output through edges 0 and 1,
    /// with hidden node 3 spliced in on `extra`.
    fn parent(extra: [usize; 2], fitness: f32) -> NNGenome {
        let mut genome = NNGenome::new(&config(), &mut ChaCha8Rng::seed_from_u64(0));
        genome
            .add_node(Node::new(3, NodeType::Hidden, ActivationType::ReLU))
            .unwrap();
        genome.add_edge(Edge::new(extra[0], 0, 3, 0.5)).unwrap();
        genome.add_edge(Edge::new(extra[1], 3, 2, 0.5)).unwrap();
        genome.set_fitness(fitness);
        genome
    }

    fn ids(genome: &NNGenome) -> Vec<usize> {
        genome.edges().map(Edge::id).collect()
    }

    #[test]
    fn disjoint_edges_come_from_fitter_parent() {
        let a = parent([4, 5], 10.0);
        let b = parent([6, 7], 1.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..20 {
            assert_eq!(ids(&NNGenome::crossover(&a, &b, &config(), &mut rng)), [0, 1, 4, 5]);
            assert_eq!(ids(&NNGenome::crossover(&b, &a, &config(), &mut rng)), [0, 1, 4, 5]);
        }
    }

    #[test]
    fn equal_fitness_tie_break() {
        let a = parent([4, 5], 3.0);
        let b = parent([6, 7], 3.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let first = GeneticConfig {
            equal_fitness_first_parent_chance: 1.0,
            ..config()
        };
        assert_eq!(ids(&NNGenome::crossover(&a, &b, &first, &mut rng)), [0, 1, 4, 5]);

        let second = GeneticConfig {
            equal_fitness_first_parent_chance: 0.0,
            ..config()
        };
        assert_eq!(ids(&NNGenome::crossover(&a, &b, &second, &mut rng)), [0, 1, 6, 7]);
    }

    #[test]
    fn matching_weights_come_from_a_parent_or_average() {
        let mut a = parent([4, 5], 1.0);
        let mut b = parent([4, 5], 0.0);
        a.edges.get_mut(&0).unwrap().set_weight(1.0);
        b.edges.get_mut(&0).unwrap().set_weight(-1.0);

        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let picks: Vec<f32> = (0..50)
            .map(|_| NNGenome::crossover(&a, &b, &config(), &mut rng).edge(0).unwrap().weight())
            .collect();
        assert!(picks.iter().all(|w| *w == 1.0 || *w == -1.0));
        assert!(picks.contains(&1.0) && picks.contains(&-1.0));

        let averaging = GeneticConfig {
            mate_by_averaging_chance: 1.0,
            ..config()
        };
        let child = NNGenome::crossover(&a, &b, &averaging, &mut rng);
        assert_eq!(child.edge(0).unwrap().weight(), 0.0);
    }

    #[test]
    fn disabled_inheritance() {
        let a = parent([4, 5], 1.0);
        let mut b = parent([4, 5], 0.0);
        b.set_edge_enabled(1, false).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        let always = GeneticConfig {
            disabled_gene_inheritance_chance: 1.0,
            ..config()
        };
        assert!(!NNGenome::crossover(&a, &b, &always, &mut rng).edge(1).unwrap().enabled());

        let never = GeneticConfig {
            disabled_gene_inheritance_chance: 0.0,
            ..config()
        };
        assert!(NNGenome::crossover(&a, &b, &never, &mut rng).edge(1).unwrap().enabled());
    }

    #[test]
    fn self_crossover_is_isomorphic() {
        let config = GeneticConfig {
            disabled_gene_inheritance_chance: 1.0,
            ..config()
        };
        let history = LineageCounter::new(&config);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut genome = NNGenome::new(&config, &mut rng);
        for _ in 0..5 {
            genome.mutate_add_node(&history, &config, &mut rng);
        }

        let child = NNGenome::crossover(&genome, &genome, &config, &mut rng);
        assert_eq!(child.nodes().collect::<Vec<_>>(), genome.nodes().collect::<Vec<_>>());
        assert_eq!(child.edges().collect::<Vec<_>>(), genome.edges().collect::<Vec<_>>());
    }

    #[test]
    fn keeps_io_nodes_without_edges() {
        let empty = GeneticConfig {
            initial_expression_chance: 0.0,
            ..config()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let a = NNGenome::new(&empty, &mut rng);
        let b = NNGenome::new(&empty, &mut rng);
        let child = NNGenome::crossover(&a, &b, &empty, &mut rng);
        assert!(child.conforms_to(&empty));
        assert_eq!(child.edges().count(), 0);
    }
}
