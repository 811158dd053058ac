//! A Network is the phenotype of a Genome: nodes become
//! network nodes and enabled edges become connections,
//! with disabled edges being ignored.
//!
//! The `FeedForwardNetwork` type evaluates its nodes once,
//! in topological order, making each evaluation a pure
//! function of the inputs. It is meant to be built once per
//! genome and evaluated at every game tick.
mod activation;
mod connection;
mod errors;

pub use activation::{argmax, compute_activation, softmax};
pub use errors::NetworkError;

use crate::genomics::{ActivationType, NNGenome, NodeType};
use crate::Innovation;
use connection::Connection;

use ahash::RandomState;

use std::collections::{HashMap, VecDeque};

/// A non-input node, ready for evaluation.
#[derive(Clone, Debug)]
struct Neuron {
    slot: usize,
    activation: ActivationType,
    inputs: Box<[Connection]>,
}

/// An acyclic neural network.
#[derive(Clone, Debug)]
pub struct FeedForwardNetwork {
    node_ids: Box<[Innovation]>,
    input_slots: Box<[usize]>,
    bias_slot: Option<usize>,
    output_slots: Box<[usize]>,
    /// Nodes reachable from an input or the bias,
    /// in evaluation order.
    neurons: Box<[Neuron]>,
}

impl TryFrom<&NNGenome> for FeedForwardNetwork {
    type Error = NetworkError;

    /// Generates a new network from the passed genome.
    ///
    /// # Errors
    /// Returns an error if the genome's enabled
    /// edges contain a cycle.
    ///
    /// # Examples
    /// ```
    /// use dinoneat_nn::{
    ///     genomics::{GeneticConfig, NNGenome},
    ///     networks::FeedForwardNetwork,
    /// };
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    /// use std::num::NonZeroUsize;
    ///
    /// let config = GeneticConfig {
    ///     input_count: NonZeroUsize::new(3).unwrap(),
    ///     output_count: NonZeroUsize::new(2).unwrap(),
    ///     initial_expression_chance: 1.0,
    ///     weight_bound: 5.0,
    ///     ..GeneticConfig::zero()
    /// };
    /// let genome = NNGenome::new(&config, &mut ChaCha8Rng::seed_from_u64(0));
    ///
    /// let network = FeedForwardNetwork::try_from(&genome).unwrap();
    /// assert_eq!(network.input_count(), 3);
    /// assert_eq!(network.output_count(), 2);
    /// ```
    fn try_from(genome: &NNGenome) -> Result<Self, Self::Error> {
        let node_ids: Box<[Innovation]> = genome.nodes().map(|n| n.id()).collect();
        let slot_of: HashMap<Innovation, usize, RandomState> = node_ids
            .iter()
            .enumerate()
            .map(|(slot, id)| (*id, slot))
            .collect();

        let mut incoming: Vec<Vec<Connection>> = vec![vec![]; node_ids.len()];
        let mut outgoing: Vec<Vec<usize>> = vec![vec![]; node_ids.len()];
        for edge in genome.enabled_edges() {
            // Genomes only hold edges between their own nodes.
            if let (Some(&source), Some(&target)) =
                (slot_of.get(&edge.source()), slot_of.get(&edge.target()))
            {
                incoming[target].push(Connection::new(source, edge.weight()));
                outgoing[source].push(target);
            }
        }

        let order = topological_order(&incoming, &outgoing).map_err(|cyclic| {
            NetworkError::CycleDetected(cyclic.into_iter().map(|s| node_ids[s]).collect())
        })?;

        let nodes: Vec<_> = genome.nodes().collect();
        let mut reachable: Vec<bool> = nodes
            .iter()
            .map(|n| matches!(n.node_type(), NodeType::Input | NodeType::Bias))
            .collect();
        let mut neurons = Vec::with_capacity(nodes.len());
        for slot in order {
            if reachable[slot] {
                continue;
            }
            if incoming[slot].iter().any(|c| reachable[c.source]) {
                reachable[slot] = true;
                neurons.push(Neuron {
                    slot,
                    activation: nodes[slot].activation_type(),
                    inputs: std::mem::take(&mut incoming[slot]).into_boxed_slice(),
                });
            }
        }

        let slots_of = |node_type: NodeType| -> Box<[usize]> {
            nodes
                .iter()
                .enumerate()
                .filter(|(_, n)| n.node_type() == node_type)
                .map(|(slot, _)| slot)
                .collect()
        };

        Ok(FeedForwardNetwork {
            input_slots: slots_of(NodeType::Input),
            bias_slot: slots_of(NodeType::Bias).first().copied(),
            output_slots: slots_of(NodeType::Output),
            neurons: neurons.into_boxed_slice(),
            node_ids,
        })
    }
}

/// Orders node slots so that every connection goes from an
/// earlier slot to a later one. Slots without pending inputs
/// are released in ascending order.
///
/// Returns the slots left over if the connections contain a cycle.
fn topological_order(
    incoming: &[Vec<Connection>],
    outgoing: &[Vec<usize>],
) -> Result<Vec<usize>, Vec<usize>> {
    let mut pending: Vec<usize> = incoming.iter().map(Vec::len).collect();
    let mut ready: VecDeque<usize> = (0..pending.len()).filter(|s| pending[*s] == 0).collect();
    let mut order = Vec::with_capacity(pending.len());

    while let Some(slot) = ready.pop_front() {
        order.push(slot);
        for &target in &outgoing[slot] {
            pending[target] -= 1;
            if pending[target] == 0 {
                ready.push_back(target);
            }
        }
    }

    if order.len() == pending.len() {
        Ok(order)
    } else {
        Err((0..pending.len()).filter(|s| pending[*s] > 0).collect())
    }
}

impl FeedForwardNetwork {
    /// Evaluates the network on `inputs`, returning the
    /// value of every output node in ascending id order.
    ///
    /// Nodes that no input or bias signal can reach
    /// output 0, whatever their activation function.
    ///
    /// # Errors
    /// Returns an error if the number of inputs does not
    /// match the number of input nodes.
    ///
    /// # Examples
    /// ```
    /// use dinoneat_nn::{
    ///     genomics::{ActivationType, GeneticConfig, NNGenome},
    ///     networks::FeedForwardNetwork,
    /// };
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    ///
    /// let config = GeneticConfig {
    ///     output_activation_types: vec![ActivationType::Identity],
    ///     initial_expression_chance: 1.0,
    ///     weight_bound: 5.0,
    ///     ..GeneticConfig::zero()
    /// };
    /// let genome = NNGenome::new(&config, &mut ChaCha8Rng::seed_from_u64(0));
    /// let weight = genome.edge(0).unwrap().weight();
    ///
    /// let network = FeedForwardNetwork::try_from(&genome).unwrap();
    ///
    /// assert_eq!(network.evaluate(&[2.0]).unwrap(), vec![2.0 * weight]);
    /// assert!(network.evaluate(&[1.0, 2.0]).is_err());
    /// ```
    pub fn evaluate(&self, inputs: &[f32]) -> Result<Vec<f32>, NetworkError> {
        if inputs.len() != self.input_slots.len() {
            return Err(NetworkError::InputCountMismatch {
                expected: self.input_slots.len(),
                actual: inputs.len(),
            });
        }

        let mut values = vec![0.0; self.node_ids.len()];
        for (slot, input) in self.input_slots.iter().zip(inputs) {
            values[*slot] = *input;
        }
        if let Some(slot) = self.bias_slot {
            values[slot] = 1.0;
        }
        for neuron in self.neurons.iter() {
            let sum: f32 = neuron
                .inputs
                .iter()
                .map(|c| values[c.source] * c.weight)
                .sum();
            values[neuron.slot] = compute_activation(sum, neuron.activation);
        }

        Ok(self.output_slots.iter().map(|slot| values[*slot]).collect())
    }

    pub fn input_count(&self) -> usize {
        self.input_slots.len()
    }

    pub fn output_count(&self) -> usize {
        self.output_slots.len()
    }

    /// Ids of the evaluated nodes, in evaluation order.
    pub fn evaluation_order(&self) -> impl Iterator<Item = Innovation> + '_ {
        self.neurons.iter().map(|n| self.node_ids[n.slot])
    }
}

/// Builds a network from `genome` and evaluates it once.
///
/// # Errors
/// Returns an error if the genome's enabled edges contain a
/// cycle, or if `inputs` does not have one value per input node.
///
/// # Examples
/// ```
/// use dinoneat_nn::{
///     genomics::{GeneticConfig, NNGenome},
///     networks::evaluate_network,
/// };
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let config = GeneticConfig { weight_bound: 1.0, ..GeneticConfig::zero() };
/// let genome = NNGenome::new(&config, &mut ChaCha8Rng::seed_from_u64(0));
///
/// // Without edges, no signal reaches the output.
/// assert_eq!(evaluate_network(&genome, &[0.7]).unwrap(), vec![0.0]);
/// ```
pub fn evaluate_network(genome: &NNGenome, inputs: &[f32]) -> Result<Vec<f32>, NetworkError> {
    FeedForwardNetwork::try_from(genome)?.evaluate(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::{Edge, GeneticConfig, Node};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::num::NonZeroUsize;

    fn config() -> GeneticConfig {
        GeneticConfig {
            input_count: NonZeroUsize::new(2).unwrap(),
            output_count: NonZeroUsize::new(1).unwrap(),
            bias: true,
            output_activation_types: vec![ActivationType::Identity],
            weight_bound: 5.0,
            ..GeneticConfig::zero()
        }
    }

    /// Inputs 0 and 1, bias 2, output 3, and hidden
    /// nodes 4 (ReLU) and 5 (Identity).
    fn genome() -> NNGenome {
        let mut genome = NNGenome::new(&config(), &mut ChaCha8Rng::seed_from_u64(0));
        genome
            .add_node(Node::new(4, NodeType::Hidden, ActivationType::ReLU))
            .unwrap();
        genome
            .add_node(Node::new(5, NodeType::Hidden, ActivationType::Identity))
            .unwrap();
        genome
    }

    #[test]
    fn evaluates_hidden_layers_in_order() {
        let mut genome = genome();
        genome.add_edge(Edge::new(10, 5, 3, 2.0)).unwrap();
        genome.add_edge(Edge::new(11, 4, 5, 1.0)).unwrap();
        genome.add_edge(Edge::new(12, 0, 4, 1.0)).unwrap();
        genome.add_edge(Edge::new(13, 1, 4, -1.0)).unwrap();
        genome.add_edge(Edge::new(14, 2, 3, 0.5)).unwrap();

        let network = FeedForwardNetwork::try_from(&genome).unwrap();
        assert_eq!(network.evaluation_order().collect::<Vec<_>>(), vec![4, 5, 3]);

        // relu(3 - 1) * 1 * 2 + 0.5
        assert_eq!(network.evaluate(&[3.0, 1.0]).unwrap(), vec![4.5]);
        // relu(1 - 3) = 0, so only the bias remains.
        assert_eq!(network.evaluate(&[1.0, 3.0]).unwrap(), vec![0.5]);
    }

    #[test]
    fn disabled_edges_carry_no_signal() {
        let mut genome = genome();
        genome.add_edge(Edge::new(10, 0, 3, 1.0)).unwrap();
        genome.add_edge(Edge::new(11, 1, 3, 1.0)).unwrap();
        genome.set_edge_enabled(11, false).unwrap();

        assert_eq!(evaluate_network(&genome, &[2.0, 7.0]).unwrap(), vec![2.0]);
    }

    #[test]
    fn unreachable_nodes_stay_zero() {
        let mut genome = genome();
        // 4 -> 5 -> 3 has no path from an input.
        genome.add_edge(Edge::new(10, 4, 5, 1.0)).unwrap();
        genome.add_edge(Edge::new(11, 5, 3, 1.0)).unwrap();

        let network = FeedForwardNetwork::try_from(&genome).unwrap();
        assert_eq!(network.evaluation_order().count(), 0);
        assert_eq!(network.evaluate(&[1.0, 1.0]).unwrap(), vec![0.0]);
    }

    #[test]
    fn zero_edges_give_zero_outputs() {
        let config = GeneticConfig {
            output_count: NonZeroUsize::new(3).unwrap(),
            output_activation_types: vec![],
            ..config()
        };
        let genome = NNGenome::new(&config, &mut ChaCha8Rng::seed_from_u64(0));
        assert_eq!(
            evaluate_network(&genome, &[0.3, -0.3]).unwrap(),
            vec![0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn rejects_cycles() {
        let mut genome = genome();
        genome.add_edge(Edge::new(10, 0, 4, 1.0)).unwrap();
        genome.add_edge(Edge::new(11, 4, 5, 1.0)).unwrap();
        genome.add_edge(Edge::new(12, 5, 4, 1.0)).unwrap();
        assert_eq!(
            FeedForwardNetwork::try_from(&genome).unwrap_err(),
            NetworkError::CycleDetected(vec![4, 5])
        );

        // Disabling any edge of the cycle makes the network valid again.
        genome.set_edge_enabled(12, false).unwrap();
        assert!(FeedForwardNetwork::try_from(&genome).is_ok());
    }

    #[test]
    fn rejects_wrong_input_count() {
        let genome = genome();
        assert_eq!(
            evaluate_network(&genome, &[1.0]),
            Err(NetworkError::InputCountMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn evaluation_is_pure() {
        let config = GeneticConfig {
            initial_expression_chance: 1.0,
            hidden_activation_types: vec![ActivationType::Tanh],
            ..config()
        };
        let history = crate::genomics::LineageCounter::new(&config);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut genome = NNGenome::new(&config, &mut rng);
        for _ in 0..4 {
            genome.mutate_add_node(&history, &config, &mut rng);
        }

        let network = FeedForwardNetwork::try_from(&genome).unwrap();
        let first = network.evaluate(&[0.25, -0.5]).unwrap();
        network.evaluate(&[9.0, 9.0]).unwrap();
        assert_eq!(network.evaluate(&[0.25, -0.5]).unwrap(), first);
        assert_eq!(evaluate_network(&genome, &[0.25, -0.5]).unwrap(), first);
    }
}
