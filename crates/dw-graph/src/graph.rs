//! Core graph data structures.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use dw_core::EntityId;
use dw_model::EntityKind;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Version stamped on every graph produced by the builder.
pub const GRAPH_VERSION: u32 = 1;

/// Extra data carried by a node for downstream consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_type: Option<String>,
}

/// A node wraps one entity of the snapshot.
///
/// `connections` is kept symmetric by [`crate::ConnectionGraphBuilder::add_edge`]:
/// if B is listed by A then A is listed by B.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub entity_id: EntityId,
    pub connections: Vec<EntityId>,
    #[serde(default)]
    pub metadata: NodeMetadata,
}

impl GraphNode {
    /// A node with no connections yet, backed by the entity of the same id.
    pub fn new(id: impl Into<EntityId>, kind: EntityKind) -> Self {
        let id = id.into();
        Self {
            entity_id: id.clone(),
            id,
            kind,
            connections: Vec::new(),
            metadata: NodeMetadata::default(),
        }
    }

    pub fn degree(&self) -> usize {
        self.connections.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Direct,
    Fitting,
    Branch,
}

/// An undirected connection between two nodes.
///
/// `source`/`target` record which entity declared the relation; the id is
/// derived from the unordered pair so the same connection declared from either
/// side maps to one edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: EntityId,
    pub target: EntityId,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl GraphEdge {
    pub fn new(source: impl Into<EntityId>, target: impl Into<EntityId>, kind: EdgeKind) -> Self {
        let (source, target) = (source.into(), target.into());
        Self {
            id: edge_id(&source, &target),
            source,
            target,
            kind,
            metadata: BTreeMap::new(),
        }
    }
}

/// Identity of the unordered pair `{a, b}`.
pub fn edge_id(a: &EntityId, b: &EntityId) -> String {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    format!("{lo}--{hi}")
}

/// The connection graph: nodes and edges in insertion order plus the
/// signature it is cached under.
///
/// Graphs are frozen once built; consumers share them through `Arc` and never
/// mutate them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionGraph {
    pub(crate) nodes: IndexMap<EntityId, GraphNode>,
    pub(crate) edges: IndexMap<String, GraphEdge>,
    pub version: u32,
    pub timestamp: DateTime<Utc>,
    pub signature: String,
}

impl ConnectionGraph {
    /// Iterate over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// Iterate over all edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.values()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn edge(&self, id: &str) -> Option<&GraphEdge> {
        self.edges.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Connections of a node; empty when the id is not in the graph.
    pub fn neighbors(&self, id: &str) -> &[EntityId] {
        self.nodes
            .get(id)
            .map(|n| n.connections.as_slice())
            .unwrap_or(&[])
    }

    pub fn degree(&self, id: &str) -> usize {
        self.neighbors(id).len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Verify the bidirectional-membership invariant of every adjacency list.
    pub fn check_symmetry(&self) -> Result<(), GraphError> {
        crate::validate::validate_adjacency(&self.nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_id_is_order_independent() {
        let a = EntityId::from("a");
        let b = EntityId::from("b");
        assert_eq!(edge_id(&a, &b), edge_id(&b, &a));
        assert_eq!(GraphEdge::new("b", "a", EdgeKind::Direct).id, "a--b");
    }

    #[test]
    fn node_serializes_with_type_tag() {
        let node = GraphNode::new("d1", EntityKind::Duct);
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains("\"type\":\"duct\""));
        assert!(json.contains("\"entityId\":\"d1\""));
    }
}
