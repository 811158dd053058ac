use crate::Innovation;

use serde::{Deserialize, Serialize};

use std::fmt;

/// An ActivationType represents the type
/// of activation function the node's network
/// equivalent will use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationType {
    // 1 / (1 + exp(-4.9x))
    Sigmoid,
    // tanh(x)
    Tanh,
    // x
    Identity,
    // 0   if x < 0
    // x   if x ≥ 0
    ReLU,
    // exp(-x²)
    Gaussian,
    // sin(πx)
    Sinusoidal,
}

/// A NodeType indicates the function of
/// the node's network equivalent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    /// Sensor inputs, set for every evaluation.
    Input,
    /// Constant signal of 1.
    Bias,
    /// Hidden nodes, added by mutation.
    Hidden,
    /// Action outputs.
    Output,
}

impl NodeType {
    /// Whether edges may start at nodes of this type.
    pub fn is_source(self) -> bool {
        !matches!(self, NodeType::Output)
    }

    /// Whether edges may end at nodes of this type.
    pub fn is_target(self) -> bool {
        matches!(self, NodeType::Hidden | NodeType::Output)
    }
}

/// Nodes are the structural elements of genomes
/// between which edges are created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    id: Innovation,
    node_type: NodeType,
    activation_type: ActivationType,
}

impl Node {
    /// Generate a new node with the passed parameters.
    ///
    /// # Examples
    /// ```
    /// use dinoneat_nn::genomics::{ActivationType, Node, NodeType};
    ///
    /// let node = Node::new(5, NodeType::Hidden, ActivationType::ReLU);
    ///
    /// assert_eq!(node.id(), 5);
    /// assert_eq!(node.node_type(), NodeType::Hidden);
    /// assert_eq!(node.activation_type(), ActivationType::ReLU);
    /// ```
    pub fn new(id: Innovation, node_type: NodeType, activation_type: ActivationType) -> Node {
        Node {
            id,
            node_type,
            activation_type,
        }
    }

    pub fn id(&self) -> Innovation {
        self.id
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn activation_type(&self) -> ActivationType {
        self.activation_type
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}[{:?}, {:?}]",
            self.id, self.node_type, self.activation_type
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_roles() {
        assert!(NodeType::Input.is_source() && !NodeType::Input.is_target());
        assert!(NodeType::Bias.is_source() && !NodeType::Bias.is_target());
        assert!(NodeType::Hidden.is_source() && NodeType::Hidden.is_target());
        assert!(!NodeType::Output.is_source() && NodeType::Output.is_target());
    }
}
