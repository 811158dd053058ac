use super::{
    ActivationType, Edge, GeneticConfig, GenomeError, LineageCounter, NNGenome, Node, NodeType,
};
use crate::Innovation;

use rand::prelude::{Rng, SliceRandom};
use tracing::debug;

impl NNGenome {
    /// Applies every configured mutation to the genome:
    /// weight mutation, then node addition, edge addition
    /// and enabled-flag toggling, each with its configured chance.
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
    ///     node_addition_mutation_chance: 1.0,
    ///     ..GeneticConfig::zero()
    /// };
    /// let history = LineageCounter::new(&config);
    /// let mut rng = ChaCha8Rng::seed_from_u64(0);
    /// let mut genome = NNGenome::new(&config, &mut rng);
    ///
    /// genome.mutate(&history, &config, &mut rng);
    ///
    /// assert_eq!(genome.nodes().count(), 3);
    /// ```
    pub fn mutate<R: Rng + ?Sized>(
        &mut self,
        history: &LineageCounter,
        config: &GeneticConfig,
        rng: &mut R,
    ) {
        self.mutate_weights(config, rng);
        if rng.gen::<f32>() < config.node_addition_mutation_chance {
            self.mutate_add_node(history, config, rng);
        }
        if rng.gen::<f32>() < config.edge_addition_mutation_chance {
            self.mutate_add_edge(history, config, rng);
        }
        if rng.gen::<f32>() < config.toggle_enable_chance {
            self.mutate_toggle_enable(rng);
        }
    }

    /// Mutates each enabled edge's weight with probability
    /// [`weight_mutation_chance`], resetting it with probability
    /// [`weight_reset_chance`] and perturbing it otherwise.
    ///
    /// [`weight_mutation_chance`]: crate::genomics::GeneticConfig::weight_mutation_chance
    /// [`weight_reset_chance`]: crate::genomics::GeneticConfig::weight_reset_chance
    pub fn mutate_weights<R: Rng + ?Sized>(&mut self, config: &GeneticConfig, rng: &mut R) {
        for edge in self.edges.values_mut().filter(|e| e.enabled()) {
            if rng.gen::<f32>() < config.weight_mutation_chance {
                if rng.gen::<f32>() < config.weight_reset_chance {
                    edge.set_weight(Edge::random_weight(config, rng));
                } else {
                    edge.perturb_weight(config, rng);
                }
            }
        }
    }

    /// Induces an _edge addition mutation_ in the genome.
    /// Returns the id of the new edge, or `None` if no
    /// viable pair of nodes was found within
    /// [`max_edge_addition_attempts`] tries.
    ///
    /// Edges go from an input, bias or hidden node to a hidden
    /// or output node, and are never created where they would
    /// close a cycle (considering disabled edges too), so that
    /// re-enabling an edge can never introduce one either.
    ///
    /// [`max_edge_addition_attempts`]: crate::genomics::GeneticConfig::max_edge_addition_attempts
    ///
    /// # Examples
    /// ```
    /// use dinoneat_nn::genomics::{GeneticConfig, LineageCounter, NNGenome};
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    ///
    /// let config = GeneticConfig {
    ///     weight_bound: 5.0,
    ///     max_edge_addition_attempts: 50,
    ///     ..GeneticConfig::zero()
    /// };
    /// let history = LineageCounter::new(&config);
    /// let mut rng = ChaCha8Rng::seed_from_u64(0);
    /// let mut genome = NNGenome::new(&config, &mut rng);
    ///
    /// // The genome is initially empty.
    /// assert_eq!(genome.edges().count(), 0);
    ///
    /// assert_eq!(genome.mutate_add_edge(&history, &config, &mut rng), Some(1));
    /// // Its single input and output are now connected.
    /// assert_eq!(genome.mutate_add_edge(&history, &config, &mut rng), None);
    /// ```
    pub fn mutate_add_edge<R: Rng + ?Sized>(
        &mut self,
        history: &LineageCounter,
        config: &GeneticConfig,
        rng: &mut R,
    ) -> Option<Innovation> {
        let sources = self.node_ids_where(|t| t.is_source());
        let targets = self.node_ids_where(|t| t.is_target());

        let (from, to) = (0..config.max_edge_addition_attempts).find_map(|_| {
            let from = *sources.choose(rng)?;
            let to = *targets.choose(rng)?;
            self.can_connect(from, to).then(|| (from, to))
        })?;

        let id = history.next_edge_innovation();
        let edge = Edge::new(id, from, to, Edge::random_weight(config, rng));
        match self.add_edge(edge) {
            Ok(()) => {
                debug!(edge = %edge, "added edge");
                Some(id)
            }
            Err(e) => {
                debug!(error = %e, "edge addition rejected");
                None
            }
        }
    }

    /// Whether a new edge `from -> to` keeps the genome valid and acyclic.
    fn can_connect(&self, from: Innovation, to: Innovation) -> bool {
        from != to && !self.contains_edge_between(from, to) && !self.has_path(to, from)
    }

    /// Ids of the nodes whose type satisfies `predicate`, ascending.
    fn node_ids_where(&self, predicate: impl Fn(NodeType) -> bool) -> Vec<Innovation> {
        self.nodes()
            .filter(|n| predicate(n.node_type()))
            .map(Node::id)
            .collect()
    }

    /// Induces a _node addition mutation_ in the genome,
    /// splitting a random enabled edge in two. Returns the
    /// id of the new hidden node, or `None` if the genome
    /// has no enabled edges.
    ///
    /// The split edge is disabled. The edge into the new node
    /// has a weight of 1, and the edge out of it inherits the
    /// split edge's weight, so the network's behaviour is
    /// initially close to unchanged.
    ///
    /// # Examples
    /// ```
    /// use dinoneat_nn::genomics::{GeneticConfig, LineageCounter, NNGenome};
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    ///
    /// let config = GeneticConfig {
    ///     initial_expression_chance: 1.0,
    ///     weight_bound: 5.0,
    ///     ..GeneticConfig::zero()
    /// };
    /// let history = LineageCounter::new(&config);
    /// let mut rng = ChaCha8Rng::seed_from_u64(0);
    /// let mut genome = NNGenome::new(&config, &mut rng);
    ///
    /// let node = genome.mutate_add_node(&history, &config, &mut rng).unwrap();
    ///
    /// assert_eq!(node, 2);
    /// assert_eq!(genome.nodes().count(), 3);
    /// assert_eq!(genome.edges().count(), 3);
    /// assert_eq!(genome.enabled_edges().count(), 2);
    /// ```
    pub fn mutate_add_node<R: Rng + ?Sized>(
        &mut self,
        history: &LineageCounter,
        config: &GeneticConfig,
        rng: &mut R,
    ) -> Option<Innovation> {
        let enabled: Vec<Innovation> = self.enabled_edges().map(Edge::id).collect();
        let split = *self.edges.get(enabled.choose(rng)?)?;
        let (from, to) = split.endpoints();

        let activation = config
            .hidden_activation_types
            .choose(rng)
            .copied()
            .unwrap_or(ActivationType::Sigmoid);
        let node = Node::new(history.next_node_innovation(), NodeType::Hidden, activation);
        let edge_in = Edge::new(history.next_edge_innovation(), from, node.id(), 1.0);
        let edge_out = Edge::new(history.next_edge_innovation(), node.id(), to, split.weight());

        if let Err(e) = self.check_fresh_ids(&node, [&edge_in, &edge_out]) {
            debug!(error = %e, "node addition rejected");
            return None;
        }
        self.nodes.insert(node.id(), node);
        self.insert_edge(edge_in);
        self.insert_edge(edge_out);
        if let Some(edge) = self.edges.get_mut(&split.id()) {
            edge.set_enabled(false);
        }
        debug!(split = %split, node = %node, "added node");
        Some(node.id())
    }

    /// Checks that a node split can be applied in full: the new
    /// node and edges must not reuse ids already in the genome.
    /// Their endpoints are valid by construction.
    fn check_fresh_ids(&self, node: &Node, edges: [&Edge; 2]) -> Result<(), GenomeError> {
        if self.nodes.contains_key(&node.id()) {
            return Err(GenomeError::DuplicateNode(node.id()));
        }
        match edges.iter().find(|e| self.edges.contains_key(&e.id())) {
            Some(edge) => Err(GenomeError::DuplicateEdge(edge.id())),
            None => Ok(()),
        }
    }

    /// Flips the enabled flag of a random edge.
    /// Returns the id of the toggled edge, or `None`
    /// if the genome has no edges.
    pub fn mutate_toggle_enable<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Innovation> {
        let ids: Vec<Innovation> = self.edges.keys().copied().collect();
        let id = *ids.choose(rng)?;
        let edge = self.edges.get_mut(&id)?;
        edge.set_enabled(!edge.enabled());
        debug!(edge = %edge, "toggled edge");
        Some(id)
    }
}
