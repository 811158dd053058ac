use crate::Innovation;

use thiserror::Error;

/// Structural violations rejected by genome operations.
/// The genome is left unchanged whenever one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenomeError {
    #[error("duplicate node insertion with id {0}")]
    DuplicateNode(Innovation),
    #[error("duplicate edge insertion with id {0}")]
    DuplicateEdge(Innovation),
    #[error("edge insertion with id {id} between nonexistent endpoint(s) {from} -> {to}")]
    NonexistentEndpoints {
        id: Innovation,
        from: Innovation,
        to: Innovation,
    },
    #[error("edge insertion with id {id} shadows an edge with the same endpoints {from} -> {to}")]
    DuplicateEndpoints {
        id: Innovation,
        from: Innovation,
        to: Innovation,
    },
    #[error("edge insertion with id {id} loops on node {node}")]
    SelfLoop { id: Innovation, node: Innovation },
    /// The edge would start at an output
    /// or end at an input or bias node.
    #[error("edge insertion with id {id} has invalid direction {from} -> {to}")]
    InvalidDirection {
        id: Innovation,
        from: Innovation,
        to: Innovation,
    },
    #[error("no edge with id {0}")]
    AbsentEdge(Innovation),
}
