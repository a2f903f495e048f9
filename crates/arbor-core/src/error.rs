//! Error types for Arbor core.

use crate::predicate::PredicateError;
use crate::tree::NodeId;

/// A specialized Result type for Arbor core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for tree, cache and resolver operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The node is not present in the tree the query was made against.
    ///
    /// This signals that the caller and the tree are out of sync; it is
    /// never recovered internally.
    #[error("Node {0:?} is not present in the tree")]
    UnknownNode(NodeId),

    /// The active predicate failed while evaluating a node.
    #[error("Predicate failed for node {node:?}: {source}")]
    Predicate {
        node: NodeId,
        #[source]
        source: PredicateError,
    },
}

impl Error {
    /// Create a predicate error for the given node.
    pub fn predicate(node: NodeId, source: PredicateError) -> Self {
        Self::Predicate { node, source }
    }

    /// Returns the node the error refers to.
    pub fn node(&self) -> NodeId {
        match self {
            Self::UnknownNode(node) => *node,
            Self::Predicate { node, .. } => *node,
        }
    }
}
