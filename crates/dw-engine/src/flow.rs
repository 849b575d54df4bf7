//! Airflow accumulation by leaf peeling.
//!
//! Terminal equipment seeds its rated capacity; nodes are then peeled from the
//! outside in, each pushing its accumulated flow to every neighbor that has
//! not been peeled yet. A node becomes peelable once at most one of its
//! connections is still unprocessed. Ducts never start propagation on their
//! own, and ducts left over in cycles or islands report zero.

use std::collections::{HashSet, VecDeque};

use dw_core::{EntityId, Real};
use dw_graph::{ConnectionGraph, GraphTraversal};
use dw_model::{Entity, EntityKind, EntitySnapshot};
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::issues::{IssueCode, ValidationIssue};

/// Computed airflow (CFM) per duct id.
pub type FlowMap = IndexMap<EntityId, Real>;

#[derive(Debug)]
struct FlowNode<'g> {
    kind: EntityKind,
    connections: &'g [EntityId],
    unprocessed: usize,
    accumulated: Real,
}

fn carries_flow(entity: &Entity) -> bool {
    matches!(
        entity.kind(),
        EntityKind::Duct | EntityKind::Equipment | EntityKind::Fitting
    )
}

/// Rated capacity of terminal equipment, `None` for everything else.
fn terminal_capacity(entity: &Entity) -> Option<Real> {
    entity
        .as_equipment()
        .filter(|eq| eq.is_terminal())
        .map(|eq| eq.props.capacity)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FlowPropagationService;

impl FlowPropagationService {
    /// Airflow for every duct node of `graph` that has an entity in `snapshot`.
    ///
    /// Graph nodes without an entity, and entities that do not carry air
    /// (rooms, notes, groups, accessories), take no part.
    pub fn calculate_flows(graph: &ConnectionGraph, snapshot: &EntitySnapshot) -> FlowMap {
        let mut nodes: IndexMap<&EntityId, FlowNode<'_>> = IndexMap::new();
        let mut queue: VecDeque<&EntityId> = VecDeque::new();

        for graph_node in graph.nodes() {
            let Some(entity) = snapshot.get(graph_node.id.as_str()) else {
                continue;
            };
            if !carries_flow(entity) {
                continue;
            }

            let node = FlowNode {
                kind: entity.kind(),
                connections: &graph_node.connections,
                unprocessed: graph_node.degree(),
                accumulated: terminal_capacity(entity).unwrap_or(0.0),
            };
            let is_source = node.accumulated > 0.0;
            let is_leaf = node.unprocessed <= 1 && node.kind != EntityKind::Duct;
            if is_source || is_leaf {
                queue.push_back(&graph_node.id);
            }
            nodes.insert(&graph_node.id, node);
        }

        let mut flows = FlowMap::new();
        let mut processed: HashSet<&EntityId> = HashSet::new();

        while let Some(current) = queue.pop_front() {
            if !processed.insert(current) {
                continue;
            }
            let Some(node) = nodes.get(current) else {
                continue;
            };
            let (kind, connections, flow) = (node.kind, node.connections, node.accumulated);
            if kind == EntityKind::Duct {
                flows.insert(current.clone(), flow);
            }
            trace!(entity = %current, flow, "peeled");

            for neighbor_id in connections {
                if processed.contains(neighbor_id) {
                    continue;
                }
                let Some(neighbor) = nodes.get_mut(neighbor_id) else {
                    continue;
                };
                neighbor.accumulated += flow;
                neighbor.unprocessed = neighbor.unprocessed.saturating_sub(1);
                if neighbor.unprocessed <= 1 {
                    queue.push_back(neighbor_id);
                }
            }
        }

        let mut unresolved = 0usize;
        for (id, node) in &nodes {
            if node.kind == EntityKind::Duct && !processed.contains(id) {
                flows.insert((*id).clone(), 0.0);
                unresolved += 1;
            }
        }
        debug!(
            ducts = flows.len(),
            unresolved, "flow propagation finished"
        );
        flows
    }

    /// Sum of terminal capacities reachable from `equipment_id` through the
    /// graph; the system load a source unit has to serve.
    pub fn connected_terminal_demand(
        graph: &ConnectionGraph,
        snapshot: &EntitySnapshot,
        equipment_id: &str,
    ) -> Real {
        GraphTraversal::new(graph)
            .reachable(equipment_id)
            .iter()
            .filter_map(|id| snapshot.get(id.as_str()))
            .filter_map(terminal_capacity)
            .sum()
    }

    /// Messages for source equipment whose capacity is below `total_flow`.
    ///
    /// Missing ids, non-equipment entities and terminal devices yield nothing.
    pub fn validate_system_capacity(
        equipment_id: &str,
        total_flow: Real,
        snapshot: &EntitySnapshot,
    ) -> Vec<String> {
        let Some(equipment) = snapshot.get(equipment_id).and_then(Entity::as_equipment) else {
            return Vec::new();
        };
        if equipment.is_terminal() {
            return Vec::new();
        }

        let capacity = equipment.props.capacity;
        if total_flow > capacity {
            let overload = (total_flow / capacity - 1.0) * 100.0;
            vec![format!(
                "System load ({total_flow} CFM) exceeds {} capacity ({capacity} CFM) by {overload:.1}%",
                equipment.props.equipment_type
            )]
        } else {
            Vec::new()
        }
    }

    /// [`Self::validate_system_capacity`] as structured warnings.
    pub fn capacity_issues(
        equipment_id: &str,
        total_flow: Real,
        snapshot: &EntitySnapshot,
    ) -> Vec<ValidationIssue> {
        Self::validate_system_capacity(equipment_id, total_flow, snapshot)
            .into_iter()
            .map(|message| {
                ValidationIssue::warning(equipment_id, IssueCode::CapacityExceeded, message)
                    .with_suggestion("Select larger equipment or reduce connected load")
            })
            .collect()
    }
}
