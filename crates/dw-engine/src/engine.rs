//! One entry point that owns the config and the graph cache.

use std::sync::Arc;

use dw_core::DwError;
use dw_graph::{
    AffectedEntities, ConnectionGraph, ConnectionGraphBuilder, GraphCache, GraphTraversal,
    signature,
};
use dw_model::EntitySnapshot;
use tracing::info;

use crate::config::EngineConfig;
use crate::detection::{ConnectionDetectionService, DetectedConnection};
use crate::error::EngineResult;
use crate::flow::{FlowMap, FlowPropagationService};
use crate::issues::ValidationIssue;
use crate::parametric::{DimensionChange, ParametricUpdateResult, ParametricUpdateService};

/// Runs the engine services against caller-supplied snapshots.
///
/// Graphs are cached by the snapshot's id set. When an edit changes
/// connections or properties but keeps the same ids, call
/// [`DesignEngine::invalidate`] before the next query.
#[derive(Debug)]
pub struct DesignEngine {
    config: EngineConfig,
    cache: GraphCache,
    detection: ConnectionDetectionService,
    parametric: ParametricUpdateService,
}

impl Default for DesignEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl DesignEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            cache: GraphCache::new(config.cache.max_size),
            detection: ConnectionDetectionService::new(config.detection.clone()),
            parametric: ParametricUpdateService::new(
                config.parametric.clone(),
                config.traversal.clone(),
            ),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &GraphCache {
        &self.cache
    }

    pub fn detect_connections(
        &self,
        snapshot: &EntitySnapshot,
        new_duct_id: &str,
    ) -> Vec<DetectedConnection> {
        self.detection.detect_connections(snapshot, new_duct_id)
    }

    /// The connection graph for `snapshot`, reusing a cached build when the
    /// id set matches.
    pub fn graph(&mut self, snapshot: &EntitySnapshot) -> Arc<ConnectionGraph> {
        ConnectionGraphBuilder::from_entities_cached(snapshot.iter(), &mut self.cache)
    }

    /// Build (or fetch) the graph and verify its adjacency lists.
    pub fn check_graph(
        &mut self,
        snapshot: &EntitySnapshot,
    ) -> EngineResult<Arc<ConnectionGraph>> {
        let graph = self.graph(snapshot);
        graph.check_symmetry().map_err(DwError::from)?;
        Ok(graph)
    }

    /// Drop the cached graph for this snapshot's id set.
    pub fn invalidate(&mut self, snapshot: &EntitySnapshot) -> bool {
        self.cache.invalidate(&signature(snapshot.ids()))
    }

    pub fn calculate_flows(&mut self, snapshot: &EntitySnapshot) -> FlowMap {
        let graph = self.graph(snapshot);
        FlowPropagationService::calculate_flows(&graph, snapshot)
    }

    pub fn affected_entities(
        &mut self,
        snapshot: &EntitySnapshot,
        changed_id: &str,
    ) -> AffectedEntities {
        let graph = self.graph(snapshot);
        GraphTraversal::new(&graph)
            .with_hops(
                self.config.traversal.direct_hops,
                self.config.traversal.indirect_hops,
            )
            .get_affected_entities(changed_id)
    }

    pub fn apply_dimension_change(
        &mut self,
        snapshot: &EntitySnapshot,
        change: &DimensionChange,
    ) -> ParametricUpdateResult {
        let graph = self.graph(snapshot);
        self.parametric.apply_dimension_change(&graph, change)
    }

    pub fn batch_update(
        &mut self,
        snapshot: &EntitySnapshot,
        changes: &[DimensionChange],
    ) -> ParametricUpdateResult {
        let graph = self.graph(snapshot);
        self.parametric.batch_update(&graph, changes)
    }

    /// Capacity findings for every source unit (non-terminal equipment),
    /// measured against the terminal demand connected to it.
    pub fn system_capacity_report(&mut self, snapshot: &EntitySnapshot) -> Vec<ValidationIssue> {
        let graph = self.graph(snapshot);
        let mut issues = Vec::new();
        for equipment in snapshot.equipment().filter(|eq| !eq.is_terminal()) {
            let id = equipment.id.as_str();
            let demand = FlowPropagationService::connected_terminal_demand(&graph, snapshot, id);
            info!(
                equipment = id,
                demand,
                capacity = equipment.props.capacity,
                "system load"
            );
            issues.extend(FlowPropagationService::capacity_issues(id, demand, snapshot));
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dw_model::{Duct, DuctProps, Entity, Transform};

    fn pair(linked: bool) -> EntitySnapshot {
        let mut a = DuctProps::round(12.0, 10.0);
        if linked {
            a.connected_to = Some("b".into());
        }
        EntitySnapshot::from_entities([
            Entity::Duct(Duct::new("a", Transform::default(), a)),
            Entity::Duct(Duct::new("b", Transform::default(), DuctProps::round(12.0, 10.0))),
        ])
    }

    #[test]
    fn graph_is_cached_until_invalidated() {
        let mut engine = DesignEngine::default();
        let first = engine.graph(&pair(true));
        let second = engine.graph(&pair(false));
        assert!(Arc::ptr_eq(&first, &second));

        assert!(engine.invalidate(&pair(false)));
        let fresh = engine.graph(&pair(false));
        assert_eq!(fresh.edge_count(), 0);
        assert_eq!(engine.cache().len(), 1);
    }

    #[test]
    fn check_graph_accepts_built_graphs() {
        let mut engine = DesignEngine::default();
        let graph = engine.check_graph(&pair(true)).unwrap();
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn cache_size_comes_from_config() {
        let mut config = EngineConfig::default();
        config.cache.max_size = 3;
        let engine = DesignEngine::new(config);
        assert_eq!(engine.cache().max_size(), 3);
    }
}
