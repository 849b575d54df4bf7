//! Graph-specific error types.

use dw_core::{DwError, EntityId};

/// Adjacency invariant violations found by [`crate::ConnectionGraph::check_symmetry`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// `node` lists `connection` but `connection` does not list `node` back.
    #[error("Node {node} lists {connection} but {connection} does not list {node}")]
    AsymmetricAdjacency { node: EntityId, connection: EntityId },

    /// `node` lists a connection to an id that has no node in the graph.
    #[error("Node {node} is connected to {connection}, which is not in the graph")]
    DanglingConnection { node: EntityId, connection: EntityId },
}

impl From<GraphError> for DwError {
    fn from(err: GraphError) -> Self {
        DwError::Invariant {
            what: err.to_string(),
        }
    }
}
