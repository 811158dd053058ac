use crate::genomics::{GeneticConfig, NNGenome};
use crate::Innovation;

use dinoneat::InnovationHistory;
use serde::{Deserialize, Serialize};

use std::sync::atomic::{AtomicUsize, Ordering};

/// A `LineageCounter` hands out identifiers for every
/// structural innovation in a population: a fresh edge
/// innovation number for each new edge, and a fresh node
/// id for each new hidden node.
///
/// Identifiers are never reused, so edges can be aligned
/// across genomes by innovation number alone. Counters
/// are advanced atomically, so the counter is shared by
/// reference between all mutations of a run.
#[derive(Debug, Serialize, Deserialize)]
pub struct LineageCounter {
    next_edge_innovation: AtomicUsize,
    next_node_innovation: AtomicUsize,
}

impl InnovationHistory for LineageCounter {
    type Config = GeneticConfig;

    fn new(config: &GeneticConfig) -> LineageCounter {
        Self::new(config)
    }
}

impl LineageCounter {
    /// Creates a new counter using the specified configuration.
    ///
    /// Input nodes are numbered `0..input_count`, followed by the
    /// bias node (if any) and then the output nodes. Initially
    /// generated edges are given the innovation number `o + s ⨯ output_count`,
    /// where `s` is the index of their source node and `o` is the
    /// index of their output node. Thus, the next available edge
    /// innovation number starts at `sources ⨯ output_count`.
    ///
    /// # Examples
    /// ```
    /// use dinoneat_nn::genomics::{GeneticConfig, LineageCounter};
    /// use std::num::NonZeroUsize;
    ///
    /// let config = GeneticConfig {
    ///     input_count: NonZeroUsize::new(4).unwrap(),
    ///     output_count: NonZeroUsize::new(2).unwrap(),
    ///     bias: true,
    ///     ..GeneticConfig::zero()
    /// };
    /// let counter = LineageCounter::new(&config);
    ///
    /// assert_eq!(counter.peek_edge_innovation(), 10);
    /// assert_eq!(counter.peek_node_innovation(), 7);
    /// ```
    pub fn new(config: &GeneticConfig) -> LineageCounter {
        let sources = config.source_count();
        let outputs = config.output_count.get();
        LineageCounter {
            next_edge_innovation: AtomicUsize::new(sources * outputs),
            next_node_innovation: AtomicUsize::new(sources + outputs),
        }
    }

    /// Returns a fresh edge innovation number.
    ///
    /// # Examples
    /// ```
    /// use dinoneat_nn::genomics::{GeneticConfig, LineageCounter};
    ///
    /// let counter = LineageCounter::new(&GeneticConfig::zero());
    ///
    /// assert_eq!(counter.next_edge_innovation(), 1);
    /// assert_eq!(counter.next_edge_innovation(), 2);
    /// ```
    pub fn next_edge_innovation(&self) -> Innovation {
        self.next_edge_innovation.fetch_add(1, Ordering::Relaxed)
    }

    /// Returns a fresh hidden node id.
    pub fn next_node_innovation(&self) -> Innovation {
        self.next_node_innovation.fetch_add(1, Ordering::Relaxed)
    }

    /// Returns the edge innovation number that
    /// will be handed out next.
    pub fn peek_edge_innovation(&self) -> Innovation {
        self.next_edge_innovation.load(Ordering::Relaxed)
    }

    /// Returns the node id that will be handed out next.
    pub fn peek_node_innovation(&self) -> Innovation {
        self.next_node_innovation.load(Ordering::Relaxed)
    }

    /// Advances the counters past every identifier used by
    /// `genome`, so that genomes from another source can be
    /// mutated without identifier collisions.
    ///
    /// # Examples
    /// ```
    /// use dinoneat_nn::genomics::{Edge, GeneticConfig, LineageCounter, NNGenome};
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    ///
    /// let config = GeneticConfig { weight_bound: 1.0, ..GeneticConfig::zero() };
    /// let mut genome = NNGenome::new(&config, &mut ChaCha8Rng::seed_from_u64(0));
    /// genome.add_edge(Edge::new(40, 0, 1, 0.5)).unwrap();
    ///
    /// let counter = LineageCounter::new(&config);
    /// counter.observe(&genome);
    ///
    /// assert_eq!(counter.next_edge_innovation(), 41);
    /// ```
    pub fn observe(&self, genome: &NNGenome) {
        if let Some(edge) = genome.edges().last() {
            self.next_edge_innovation
                .fetch_max(edge.id() + 1, Ordering::Relaxed);
        }
        if let Some(node) = genome.nodes().last() {
            self.next_node_innovation
                .fetch_max(node.id() + 1, Ordering::Relaxed);
        }
    }
}

impl Clone for LineageCounter {
    fn clone(&self) -> Self {
        LineageCounter {
            next_edge_innovation: AtomicUsize::new(self.peek_edge_innovation()),
            next_node_innovation: AtomicUsize::new(self.peek_node_innovation()),
        }
    }
}

impl PartialEq for LineageCounter {
    fn eq(&self, other: &Self) -> bool {
        self.peek_edge_innovation() == other.peek_edge_innovation()
            && self.peek_node_innovation() == other.peek_node_innovation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::num::NonZeroUsize;

    #[test]
    fn reserves_initial_identifiers() {
        let config = GeneticConfig {
            input_count: NonZeroUsize::new(3).unwrap(),
            output_count: NonZeroUsize::new(2).unwrap(),
            ..GeneticConfig::zero()
        };
        let counter = LineageCounter::new(&config);
        assert_eq!(counter.next_edge_innovation(), 6);
        assert_eq!(counter.next_node_innovation(), 5);
    }

    #[test]
    fn never_repeats_across_threads() {
        let counter = LineageCounter::new(&GeneticConfig::zero());
        let ids: Vec<Innovation> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        (0..250)
                            .map(|_| counter.next_edge_innovation())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), 1000);
        assert_eq!(counter.peek_edge_innovation(), 1001);
    }

    #[test]
    fn clone_resumes_from_same_value() {
        let counter = LineageCounter::new(&GeneticConfig::zero());
        counter.next_edge_innovation();
        let copy = counter.clone();
        assert_eq!(copy, counter);
        assert_eq!(copy.next_edge_innovation(), counter.next_edge_innovation());
    }
}
