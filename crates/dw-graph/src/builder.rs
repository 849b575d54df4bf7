//! Incremental graph builder.

use std::sync::Arc;

use chrono::Utc;
use dw_core::EntityId;
use dw_model::Entity;
use indexmap::IndexMap;
use tracing::debug;

use crate::cache::{GraphCache, signature};
use crate::graph::{ConnectionGraph, EdgeKind, GRAPH_VERSION, GraphEdge, GraphNode, NodeMetadata};

/// Builder for constructing a connection graph incrementally.
///
/// Use `add_node` and `add_edge` to build up the graph, then call `build()`
/// to stamp it and store it in a [`GraphCache`].
#[derive(Debug, Default)]
pub struct ConnectionGraphBuilder {
    nodes: IndexMap<EntityId, GraphNode>,
    edges: IndexMap<String, GraphEdge>,
}

impl ConnectionGraphBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a node. A replaced node keeps its position.
    pub fn add_node(&mut self, node: GraphNode) {
        self.nodes.insert(node.id.clone(), node);
    }

    /// Add an edge and record it in both endpoints' adjacency lists.
    ///
    /// Adding the same connection twice is a no-op for adjacency. Endpoints
    /// that have no node are skipped; the edge itself is still stored.
    pub fn add_edge(&mut self, edge: GraphEdge) {
        if let Some(source) = self.nodes.get_mut(&edge.source)
            && !source.connections.contains(&edge.target)
        {
            source.connections.push(edge.target.clone());
        }
        if let Some(target) = self.nodes.get_mut(&edge.target)
            && !target.connections.contains(&edge.source)
        {
            target.connections.push(edge.source.clone());
        }
        self.edges.insert(edge.id.clone(), edge);
    }

    /// Freeze the graph, stamping its signature and timestamp, without caching.
    pub fn finish<I, S>(self, entity_ids: I) -> ConnectionGraph
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let graph = ConnectionGraph {
            nodes: self.nodes,
            edges: self.edges,
            version: GRAPH_VERSION,
            timestamp: Utc::now(),
            signature: signature(entity_ids),
        };
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built connection graph"
        );
        graph
    }

    /// Freeze the graph and store it in `cache` under its signature.
    pub fn build<I, S>(self, entity_ids: I, cache: &mut GraphCache) -> Arc<ConnectionGraph>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let graph = Arc::new(self.finish(entity_ids));
        cache.set(graph.signature.clone(), Arc::clone(&graph));
        graph
    }

    /// Build a graph with one node per entity and one edge per declared
    /// `connectedTo` relation, storing the result in `cache`.
    pub fn from_entities<'a, I>(entities: I, cache: &mut GraphCache) -> Arc<ConnectionGraph>
    where
        I: IntoIterator<Item = &'a Entity>,
    {
        let entities: Vec<&Entity> = entities.into_iter().collect();
        Self::assemble(&entities).build(entities.iter().map(|e| e.id()), cache)
    }

    /// Like [`Self::from_entities`], but returns the cached graph without
    /// rebuilding when the id set's signature is already stored.
    pub fn from_entities_cached<'a, I>(entities: I, cache: &mut GraphCache) -> Arc<ConnectionGraph>
    where
        I: IntoIterator<Item = &'a Entity>,
    {
        let entities: Vec<&Entity> = entities.into_iter().collect();
        let key = signature(entities.iter().map(|e| e.id()));
        if let Some(graph) = cache.get(&key) {
            debug!(entities = entities.len(), "graph cache hit");
            return graph;
        }
        debug!(entities = entities.len(), "graph cache miss");
        Self::assemble(&entities).build(entities.iter().map(|e| e.id()), cache)
    }

    fn assemble(entities: &[&Entity]) -> Self {
        let mut builder = Self::new();
        for entity in entities {
            let mut node = GraphNode::new(entity.id().clone(), entity.kind());
            node.metadata = NodeMetadata {
                system_type: entity.system_type().map(str::to_owned),
            };
            builder.add_node(node);
        }
        for entity in entities {
            if let Some(target) = entity.connected_to() {
                builder.add_edge(GraphEdge::new(
                    entity.id().clone(),
                    target.clone(),
                    EdgeKind::Direct,
                ));
            }
        }
        builder
    }
}
