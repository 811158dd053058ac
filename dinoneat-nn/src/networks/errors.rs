use crate::Innovation;

use thiserror::Error;

/// Errors building or evaluating a network.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// The enabled edges form at least one cycle
    /// through the listed nodes, so no feed-forward
    /// evaluation order exists.
    #[error("enabled edges form a cycle through nodes {0:?}")]
    CycleDetected(Vec<Innovation>),
    #[error("expected {expected} inputs, got {actual}")]
    InputCountMismatch { expected: usize, actual: usize },
}
