//! Genomes are the focus of evolution.
//! They are a collection of nodes and edges that can be instantiated
//! as a phenotype (a feed-forward neural network). Genomes can be
//! progressively mutated, thus adding complexity and functionality.

mod config;
mod crossover;
mod edges;
mod errors;
mod history;
mod mutation;
mod nodes;

pub use config::{GeneticConfig, WeightPerturbation};
pub use edges::Edge;
pub use errors::GenomeError;
pub use history::LineageCounter;
pub use nodes::{ActivationType, Node, NodeType};

use crate::Innovation;

use ahash::RandomState;
use dinoneat::{ConfigError, Genome};
use rand::Rng;
use serde::{Deserialize, Serialize};

use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// A mutable collection of nodes and edges.
///
/// Nodes and edges are kept ordered by id, so every
/// enumeration (and every random choice made from one)
/// is deterministic.
///
/// Supports Serde for convenient genome saving and loading;
/// deserialized genomes are re-validated edge by edge.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "GenomeRecord", into = "GenomeRecord")]
pub struct NNGenome {
    nodes: BTreeMap<Innovation, Node>,
    edges: BTreeMap<Innovation, Edge>,
    node_pairings: HashSet<(Innovation, Innovation), RandomState>,
    fitness: f32,
}

/// Serialized form of an [`NNGenome`].
#[derive(Serialize, Deserialize)]
struct GenomeRecord {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    fitness: f32,
}

impl NNGenome {
    /// Create a new genome with the specified configuration.
    ///
    /// Inputs are numbered `0..input_count`, followed by the
    /// bias node (if configured) and the outputs. Initially
    /// generated edges are given the innovation number
    /// `o + s ⨯ output_count`, where `s` is the index of their
    /// source node and `o` that of their output node, so that
    /// identical initial edges align across genomes.
    ///
    /// # Examples
    /// ```
    /// use dinoneat_nn::genomics::{GeneticConfig, NNGenome, NodeType};
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    /// use std::num::NonZeroUsize;
    ///
    /// let config = GeneticConfig {
    ///     input_count: NonZeroUsize::new(3).unwrap(),
    ///     output_count: NonZeroUsize::new(2).unwrap(),
    ///     bias: true,
    ///     initial_expression_chance: 1.0,
    ///     weight_bound: 5.0,
    ///     ..GeneticConfig::zero()
    /// };
    ///
    /// let genome = NNGenome::new(&config, &mut ChaCha8Rng::seed_from_u64(0));
    ///
    /// // As configured, the genome should have 3 inputs, a bias and 2 outputs.
    /// assert_eq!(genome.nodes().count(), 3 + 1 + 2);
    /// assert_eq!(genome.nodes().filter(|n| n.node_type() == NodeType::Input).count(), 3);
    /// assert_eq!(genome.nodes().filter(|n| n.node_type() == NodeType::Output).count(), 2);
    ///
    /// // And with an initial_expression_chance of 1, every source feeds every output.
    /// assert_eq!(genome.edges().count(), 4 * 2);
    /// assert!(genome.edges().all(|e| e.weight().abs() <= config.weight_bound));
    /// assert!(genome.edges().all(|e| (0..4 * 2).contains(&e.id())));
    /// ```
    pub fn new<R: Rng + ?Sized>(config: &GeneticConfig, rng: &mut R) -> NNGenome {
        let mut genome = Self::empty();
        for node in Self::generate_fixed_nodes(config) {
            genome.nodes.insert(node.id(), node);
        }

        let sources = config.source_count();
        let outputs = config.output_count.get();
        for s in 0..sources {
            for o in 0..outputs {
                if rng.gen::<f32>() < config.initial_expression_chance {
                    let id = o + s * outputs;
                    let weight = Edge::random_weight(config, rng);
                    genome.insert_edge(Edge::new(id, s, sources + o, weight));
                }
            }
        }

        genome
    }

    /// A genome with no nodes, edges or fitness.
    fn empty() -> NNGenome {
        NNGenome {
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            node_pairings: HashSet::default(),
            fitness: 0.0,
        }
    }

    /// Returns the input, bias and output nodes
    /// every genome of `config` starts with.
    fn generate_fixed_nodes(config: &GeneticConfig) -> impl Iterator<Item = Node> + '_ {
        let inputs = config.input_count.get();
        let sources = config.source_count();
        let input_nodes =
            (0..inputs).map(|id| Node::new(id, NodeType::Input, ActivationType::Identity));
        let bias_node = config
            .bias
            .then(|| Node::new(inputs, NodeType::Bias, ActivationType::Identity));
        let output_nodes = (0..config.output_count.get()).map(move |o| {
            let activation = config
                .output_activation_types
                .get(o)
                .copied()
                .unwrap_or(ActivationType::Sigmoid);
            Node::new(sources + o, NodeType::Output, activation)
        });
        input_nodes.chain(bias_node).chain(output_nodes)
    }

    /// Adds a node to the genome.
    ///
    /// # Errors
    /// Returns an error if a node with the same id
    /// is already in the genome.
    ///
    /// # Examples
    /// ```
    /// use dinoneat_nn::genomics::{ActivationType, GeneticConfig, NNGenome, Node, NodeType};
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    ///
    /// let config = GeneticConfig { weight_bound: 1.0, ..GeneticConfig::zero() };
    /// let mut genome = NNGenome::new(&config, &mut ChaCha8Rng::seed_from_u64(0));
    ///
    /// let node = Node::new(2, NodeType::Hidden, ActivationType::ReLU);
    /// assert!(genome.add_node(node).is_ok());
    /// assert!(genome.add_node(node).is_err());
    /// ```
    pub fn add_node(&mut self, node: Node) -> Result<(), GenomeError> {
        if self.nodes.contains_key(&node.id()) {
            return Err(GenomeError::DuplicateNode(node.id()));
        }
        self.nodes.insert(node.id(), node);
        Ok(())
    }

    /// Adds an edge to the genome.
    ///
    /// Whether the edge forms a cycle is not checked here;
    /// cyclic genomes are rejected when building a network.
    ///
    /// # Errors
    /// Returns an error if an edge with the same id or the same
    /// endpoints is already in the genome, if either endpoint is
    /// missing, if the edge is a self-loop, or if it starts at an
    /// output node or ends at an input or bias node.
    ///
    /// # Examples
    /// ```
    /// use dinoneat_nn::genomics::{Edge, GeneticConfig, GenomeError, NNGenome};
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    ///
    /// let config = GeneticConfig { weight_bound: 1.0, ..GeneticConfig::zero() };
    /// let mut genome = NNGenome::new(&config, &mut ChaCha8Rng::seed_from_u64(0));
    ///
    /// genome.add_edge(Edge::new(0, 0, 1, 0.5)).unwrap();
    ///
    /// assert_eq!(genome.add_edge(Edge::new(0, 0, 1, 0.5)), Err(GenomeError::DuplicateEdge(0)));
    /// assert!(genome.add_edge(Edge::new(7, 0, 1, 0.5)).is_err());
    /// assert!(genome.add_edge(Edge::new(8, 1, 0, 0.5)).is_err());
    /// assert!(genome.add_edge(Edge::new(9, 0, 5, 0.5)).is_err());
    /// ```
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GenomeError> {
        let id = edge.id();
        let (from, to) = edge.endpoints();
        if self.edges.contains_key(&id) {
            return Err(GenomeError::DuplicateEdge(id));
        }
        let (source, target) = match (self.nodes.get(&from), self.nodes.get(&to)) {
            (Some(source), Some(target)) => (source, target),
            _ => return Err(GenomeError::NonexistentEndpoints { id, from, to }),
        };
        if from == to {
            return Err(GenomeError::SelfLoop { id, node: from });
        }
        if !source.node_type().is_source() || !target.node_type().is_target() {
            return Err(GenomeError::InvalidDirection { id, from, to });
        }
        if self.node_pairings.contains(&(from, to)) {
            return Err(GenomeError::DuplicateEndpoints { id, from, to });
        }
        self.insert_edge(edge);
        Ok(())
    }

    /// Inserts an edge known to be valid.
    fn insert_edge(&mut self, edge: Edge) {
        self.node_pairings.insert(edge.endpoints());
        self.edges.insert(edge.id(), edge);
    }

    /// Enables or disables the edge with the given id.
    ///
    /// # Errors
    /// Returns an error if there is no such edge.
    ///
    /// # Examples
    /// ```
    /// use dinoneat_nn::genomics::{GeneticConfig, NNGenome};
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    ///
    /// let config = GeneticConfig {
    ///     initial_expression_chance: 1.0,
    ///     weight_bound: 1.0,
    ///     ..GeneticConfig::zero()
    /// };
    /// let mut genome = NNGenome::new(&config, &mut ChaCha8Rng::seed_from_u64(0));
    ///
    /// genome.set_edge_enabled(0, false).unwrap();
    /// assert_eq!(genome.enabled_edges().count(), 0);
    /// assert_eq!(genome.edges().count(), 1);
    ///
    /// assert!(genome.set_edge_enabled(3, true).is_err());
    /// ```
    pub fn set_edge_enabled(&mut self, id: Innovation, enabled: bool) -> Result<(), GenomeError> {
        match self.edges.get_mut(&id) {
            Some(edge) => {
                edge.set_enabled(enabled);
                Ok(())
            }
            None => Err(GenomeError::AbsentEdge(id)),
        }
    }

    /// Returns an iterator over the genome's nodes,
    /// in ascending id order.
    pub fn nodes(&self) -> impl DoubleEndedIterator<Item = &Node> {
        self.nodes.values()
    }

    /// Returns an iterator over all of the genome's edges
    /// (enabled or not), in ascending innovation order.
    pub fn edges(&self) -> impl DoubleEndedIterator<Item = &Edge> {
        self.edges.values()
    }

    /// Returns an iterator over the genome's enabled edges,
    /// in ascending innovation order.
    pub fn enabled_edges(&self) -> impl DoubleEndedIterator<Item = &Edge> {
        self.edges.values().filter(|e| e.enabled())
    }

    pub fn node(&self, id: Innovation) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn edge(&self, id: Innovation) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Returns the number of nodes of the given type.
    pub fn count_nodes(&self, node_type: NodeType) -> usize {
        self.nodes
            .values()
            .filter(|n| n.node_type() == node_type)
            .count()
    }

    /// Returns whether there is an edge from `from` to `to`.
    pub fn contains_edge_between(&self, from: Innovation, to: Innovation) -> bool {
        self.node_pairings.contains(&(from, to))
    }

    /// Returns pairs of edges with matching innovation numbers
    /// in both genomes, in ascending innovation order.
    ///
    /// Two genomes are compatible exactly where
    /// their innovation numbers match.
    pub fn matching_edges<'a>(
        &'a self,
        other: &'a NNGenome,
    ) -> impl Iterator<Item = (&'a Edge, &'a Edge)> {
        self.edges
            .values()
            .filter_map(move |e| other.edges.get(&e.id()).map(|o| (e, o)))
    }

    /// Returns whether `to` can be reached from `from`
    /// following edges, enabled or not.
    pub(crate) fn has_path(&self, from: Innovation, to: Innovation) -> bool {
        let mut visited: HashSet<Innovation, RandomState> = HashSet::default();
        let mut stack = vec![from];
        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            if visited.insert(current) {
                stack.extend(
                    self.edges
                        .values()
                        .filter(|e| e.source() == current)
                        .map(Edge::target),
                );
            }
        }
        false
    }

    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
    }

    /// Returns whether the genome has exactly the input,
    /// bias and output nodes that `config` prescribes.
    pub fn conforms_to(&self, config: &GeneticConfig) -> bool {
        Self::generate_fixed_nodes(config).all(|expected| {
            self.nodes
                .get(&expected.id())
                .map_or(false, |n| n.node_type() == expected.node_type())
        }) && self.count_nodes(NodeType::Input) == config.input_count.get()
            && self.count_nodes(NodeType::Output) == config.output_count.get()
            && self.count_nodes(NodeType::Bias) == usize::from(config.bias)
    }
}

impl Genome for NNGenome {
    type Config = GeneticConfig;
    type InnovationHistory = LineageCounter;

    fn new<R: Rng + ?Sized>(config: &GeneticConfig, rng: &mut R) -> Self {
        NNGenome::new(config, rng)
    }

    fn crossover<R: Rng + ?Sized>(
        parent1: &Self,
        parent2: &Self,
        config: &GeneticConfig,
        rng: &mut R,
    ) -> Self {
        NNGenome::crossover(parent1, parent2, config, rng)
    }

    fn mutate<R: Rng + ?Sized>(
        &mut self,
        history: &LineageCounter,
        config: &GeneticConfig,
        rng: &mut R,
    ) {
        NNGenome::mutate(self, history, config, rng)
    }

    fn intensify_mutation(config: &GeneticConfig, rate: f32, scale: f32) -> GeneticConfig {
        config.intensified(rate, scale)
    }

    fn conforms_to(&self, config: &GeneticConfig) -> bool {
        NNGenome::conforms_to(self, config)
    }

    fn validate_config(config: &GeneticConfig) -> Result<(), ConfigError> {
        config.validate()
    }

    fn set_fitness(&mut self, fitness: f32) {
        NNGenome::set_fitness(self, fitness)
    }

    fn fitness(&self) -> f32 {
        NNGenome::fitness(self)
    }
}

impl PartialEq for NNGenome {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes && self.edges == other.edges && self.fitness == other.fitness
    }
}

impl TryFrom<GenomeRecord> for NNGenome {
    type Error = GenomeError;

    fn try_from(record: GenomeRecord) -> Result<Self, Self::Error> {
        let mut genome = NNGenome::empty();
        for node in record.nodes {
            genome.add_node(node)?;
        }
        for edge in record.edges {
            genome.add_edge(edge)?;
        }
        genome.fitness = record.fitness;
        Ok(genome)
    }
}

impl From<NNGenome> for GenomeRecord {
    fn from(genome: NNGenome) -> Self {
        GenomeRecord {
            nodes: genome.nodes.into_values().collect(),
            edges: genome.edges.into_values().collect(),
            fitness: genome.fitness,
        }
    }
}

impl fmt::Display for NNGenome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let edges: Vec<String> = self.edges.values().map(Edge::to_string).collect();
        let nodes: Vec<String> = self.nodes.values().map(Node::to_string).collect();
        f.debug_struct("NNGenome")
            .field("Edges", &edges)
            .field("Nodes", &nodes)
            .field("Fitness", &self.fitness)
            .finish()
    }
}
