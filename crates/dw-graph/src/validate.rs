//! Graph validation logic.

use dw_core::EntityId;
use indexmap::IndexMap;

use crate::error::GraphError;
use crate::graph::GraphNode;

/// Validate adjacency lists for bidirectional membership.
pub(crate) fn validate_adjacency(nodes: &IndexMap<EntityId, GraphNode>) -> Result<(), GraphError> {
    for node in nodes.values() {
        for connection in &node.connections {
            let Some(other) = nodes.get(connection) else {
                return Err(GraphError::DanglingConnection {
                    node: node.id.clone(),
                    connection: connection.clone(),
                });
            };
            if !other.connections.contains(&node.id) {
                return Err(GraphError::AsymmetricAdjacency {
                    node: node.id.clone(),
                    connection: connection.clone(),
                });
            }
        }
    }
    Ok(())
}
