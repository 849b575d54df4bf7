//! Breadth-first queries over a built graph.

use std::collections::{HashSet, VecDeque};

use dw_core::EntityId;
use indexmap::IndexMap;
use serde::Serialize;

use crate::graph::ConnectionGraph;

pub const DEFAULT_DIRECT_HOPS: usize = 1;
pub const DEFAULT_INDIRECT_HOPS: usize = 3;

/// Entities touched by a change, split by distance from the changed entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedEntities {
    pub directly_affected: Vec<EntityId>,
    pub indirectly_affected: Vec<EntityId>,
    pub all_affected: Vec<EntityId>,
    /// Shortest path from the changed entity to each affected entity.
    pub paths: IndexMap<EntityId, Vec<EntityId>>,
}

/// Bounded-hop breadth-first search utilities over one graph.
#[derive(Debug, Clone, Copy)]
pub struct GraphTraversal<'g> {
    graph: &'g ConnectionGraph,
    direct_hops: usize,
    indirect_hops: usize,
}

impl<'g> GraphTraversal<'g> {
    pub fn new(graph: &'g ConnectionGraph) -> Self {
        Self {
            graph,
            direct_hops: DEFAULT_DIRECT_HOPS,
            indirect_hops: DEFAULT_INDIRECT_HOPS,
        }
    }

    /// Override the hop radii used by [`Self::get_affected_entities`].
    pub fn with_hops(mut self, direct: usize, indirect: usize) -> Self {
        self.direct_hops = direct;
        self.indirect_hops = indirect;
        self
    }

    /// Entities within `hops` connections of `entity_id`, in BFS order,
    /// excluding `entity_id` itself.
    pub fn get_connected_entities(&self, entity_id: &str, hops: usize) -> Vec<EntityId> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<(&str, usize)> = VecDeque::from([(entity_id, 0)]);
        let mut result = Vec::new();

        while let Some((id, depth)) = queue.pop_front() {
            if depth > hops || !visited.insert(id) {
                continue;
            }
            if id != entity_id {
                result.push(EntityId::from(id));
            }
            for connection in self.graph.neighbors(id) {
                if !visited.contains(connection.as_str()) {
                    queue.push_back((connection.as_str(), depth + 1));
                }
            }
        }

        result
    }

    /// Every entity connected to `entity_id` regardless of distance.
    pub fn reachable(&self, entity_id: &str) -> Vec<EntityId> {
        self.get_connected_entities(entity_id, self.graph.node_count())
    }

    pub fn get_affected_entities(&self, changed_id: &str) -> AffectedEntities {
        let directly_affected = self.get_connected_entities(changed_id, self.direct_hops);
        let indirectly_affected: Vec<EntityId> = self
            .get_connected_entities(changed_id, self.indirect_hops)
            .into_iter()
            .filter(|id| !directly_affected.contains(id) && id != changed_id)
            .collect();

        let all_affected: Vec<EntityId> = directly_affected
            .iter()
            .chain(&indirectly_affected)
            .cloned()
            .collect();

        let mut paths = IndexMap::new();
        for affected in &all_affected {
            if let Some(path) = self.find_path(changed_id, affected.as_str()) {
                paths.insert(affected.clone(), path);
            }
        }

        AffectedEntities {
            directly_affected,
            indirectly_affected,
            all_affected,
            paths,
        }
    }

    /// Shortest path from `start_id` to `end_id`, inclusive of both ends.
    /// `None` when either id is not in the graph or no path exists.
    pub fn find_path(&self, start_id: &str, end_id: &str) -> Option<Vec<EntityId>> {
        if !self.graph.contains(start_id) || !self.graph.contains(end_id) {
            return None;
        }

        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<(&str, Vec<&str>)> = VecDeque::from([(start_id, vec![start_id])]);

        while let Some((id, path)) = queue.pop_front() {
            if id == end_id {
                return Some(path.into_iter().map(EntityId::from).collect());
            }
            if !visited.insert(id) {
                continue;
            }
            for connection in self.graph.neighbors(id) {
                if !visited.contains(connection.as_str()) {
                    let mut next = path.clone();
                    next.push(connection.as_str());
                    queue.push_back((connection.as_str(), next));
                }
            }
        }

        None
    }
}
