//! dw-graph: connection graph layer for the ductwork engine.
//!
//! Provides:
//! - Core graph data structures (GraphNode, GraphEdge, ConnectionGraph)
//! - Incremental builder, including construction from entity relations
//! - Signature-keyed graph cache with insertion-order eviction
//! - Bounded-hop traversal (reachability, affected entities, shortest path)
//!
//! # Example
//!
//! ```
//! use dw_graph::{ConnectionGraphBuilder, EdgeKind, GraphCache, GraphEdge, GraphNode, GraphTraversal};
//! use dw_model::EntityKind;
//!
//! let mut cache = GraphCache::default();
//! let mut builder = ConnectionGraphBuilder::new();
//! builder.add_node(GraphNode::new("trunk", EntityKind::Duct));
//! builder.add_node(GraphNode::new("elbow", EntityKind::Fitting));
//! builder.add_edge(GraphEdge::new("trunk", "elbow", EdgeKind::Direct));
//! let graph = builder.build(["trunk", "elbow"], &mut cache);
//!
//! assert_eq!(graph.node_count(), 2);
//! assert_eq!(GraphTraversal::new(&graph).get_connected_entities("trunk", 1).len(), 1);
//! assert!(cache.get(&graph.signature).is_some());
//! ```

pub mod builder;
pub mod cache;
pub mod error;
pub mod graph;
pub mod traversal;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::ConnectionGraphBuilder;
pub use cache::{DEFAULT_MAX_SIZE, GraphCache, SIGNATURE_SEPARATOR, SharedGraphCache, signature};
pub use error::GraphError;
pub use graph::{
    ConnectionGraph, EdgeKind, GRAPH_VERSION, GraphEdge, GraphNode, NodeMetadata, edge_id,
};
pub use traversal::{
    AffectedEntities, DEFAULT_DIRECT_HOPS, DEFAULT_INDIRECT_HOPS, GraphTraversal,
};
