//! Cascading updates triggered by a dimension edit.
//!
//! A change to one entity proposes dependent property updates for every
//! entity within the indirect hop radius. Proposals for directly connected
//! entities are checked against the velocity limits; proposals further out
//! are reported as updated but not validated.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use dw_core::{EntityId, Real};
use dw_graph::{ConnectionGraph, ConnectionGraphBuilder, GraphCache, GraphTraversal};
use dw_model::Entity;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ParametricConfig, TraversalConfig};
use crate::issues::{IssueCode, ValidationIssue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionProperty {
    Diameter,
    Width,
    Height,
    Length,
    Airflow,
}

impl DimensionProperty {
    pub fn as_str(self) -> &'static str {
        match self {
            DimensionProperty::Diameter => "diameter",
            DimensionProperty::Width => "width",
            DimensionProperty::Height => "height",
            DimensionProperty::Length => "length",
            DimensionProperty::Airflow => "airflow",
        }
    }

    /// Cross-section dimensions that fittings have to match.
    pub fn is_size(self) -> bool {
        matches!(
            self,
            DimensionProperty::Diameter | DimensionProperty::Width | DimensionProperty::Height
        )
    }
}

impl fmt::Display for DimensionProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DimensionProperty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "diameter" => Ok(DimensionProperty::Diameter),
            "width" => Ok(DimensionProperty::Width),
            "height" => Ok(DimensionProperty::Height),
            "length" => Ok(DimensionProperty::Length),
            "airflow" => Ok(DimensionProperty::Airflow),
            other => Err(format!(
                "unknown property '{other}' (expected diameter, width, height, length or airflow)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionChange {
    pub entity_id: EntityId,
    pub property: DimensionProperty,
    pub old_value: Real,
    pub new_value: Real,
}

impl DimensionChange {
    pub fn new(
        entity_id: impl Into<EntityId>,
        property: DimensionProperty,
        old_value: Real,
        new_value: Real,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            property,
            old_value,
            new_value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CascadeProperty {
    MatchingFittingSize,
    Velocity,
}

/// A dependent property value proposed for one affected entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CascadeUpdate {
    pub property: CascadeProperty,
    pub value: Real,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParametricUpdateResult {
    pub updated_entity_ids: Vec<EntityId>,
    pub validation_issues: Vec<ValidationIssue>,
    /// Token an undo history can use to group every resulting edit.
    pub undo_group_id: String,
}

fn undo_token(prefix: &str) -> String {
    format!("{prefix}-{}", Utc::now().timestamp_millis())
}

#[derive(Debug, Clone, Default)]
pub struct ParametricUpdateService {
    config: ParametricConfig,
    traversal: TraversalConfig,
}

impl ParametricUpdateService {
    pub fn new(config: ParametricConfig, traversal: TraversalConfig) -> Self {
        Self { config, traversal }
    }

    pub fn build_graph<'a, I>(&self, entities: I, cache: &mut GraphCache) -> Arc<ConnectionGraph>
    where
        I: IntoIterator<Item = &'a Entity>,
    {
        ConnectionGraphBuilder::from_entities(entities, cache)
    }

    pub fn apply_dimension_change(
        &self,
        graph: &ConnectionGraph,
        change: &DimensionChange,
    ) -> ParametricUpdateResult {
        let undo_group_id = undo_token("update");
        let affected = GraphTraversal::new(graph)
            .with_hops(self.traversal.direct_hops, self.traversal.indirect_hops)
            .get_affected_entities(change.entity_id.as_str());

        let mut updated: IndexSet<EntityId> = IndexSet::new();
        let mut validation_issues = Vec::new();

        for id in &affected.directly_affected {
            let updates = self.cascade_updates(change);
            if updates.is_empty() {
                continue;
            }
            updated.insert(id.clone());
            for update in &updates {
                validation_issues.extend(self.validate_update(id, update));
            }
        }
        for id in &affected.indirectly_affected {
            if !self.cascade_updates(change).is_empty() {
                updated.insert(id.clone());
            }
        }

        debug!(
            entity = %change.entity_id,
            property = %change.property,
            updated = updated.len(),
            issues = validation_issues.len(),
            "applied dimension change"
        );
        ParametricUpdateResult {
            updated_entity_ids: updated.into_iter().collect(),
            validation_issues,
            undo_group_id,
        }
    }

    /// Apply each change in order and merge the results under one token.
    ///
    /// Updated ids are deduplicated across changes; issues are concatenated.
    pub fn batch_update(
        &self,
        graph: &ConnectionGraph,
        changes: &[DimensionChange],
    ) -> ParametricUpdateResult {
        let undo_group_id = undo_token("batch");
        let mut updated: IndexSet<EntityId> = IndexSet::new();
        let mut validation_issues = Vec::new();

        for change in changes {
            let result = self.apply_dimension_change(graph, change);
            updated.extend(result.updated_entity_ids);
            validation_issues.extend(result.validation_issues);
        }

        ParametricUpdateResult {
            updated_entity_ids: updated.into_iter().collect(),
            validation_issues,
            undo_group_id,
        }
    }

    /// Proposed updates for a neighbor of the changed entity.
    pub fn cascade_updates(&self, change: &DimensionChange) -> Vec<CascadeUpdate> {
        match change.property {
            p if p.is_size() => vec![CascadeUpdate {
                property: CascadeProperty::MatchingFittingSize,
                value: change.new_value,
            }],
            DimensionProperty::Airflow => vec![CascadeUpdate {
                property: CascadeProperty::Velocity,
                value: self.velocity(change.new_value),
            }],
            _ => Vec::new(),
        }
    }

    /// Velocity (FPM) for an airflow (CFM) over the configured placeholder area.
    // TODO: use the duct's real cross-section once sized areas reach the graph.
    pub fn velocity(&self, airflow: Real) -> Real {
        airflow / self.config.default_area / 60.0
    }

    pub fn validate_update(
        &self,
        entity_id: &EntityId,
        update: &CascadeUpdate,
    ) -> Vec<ValidationIssue> {
        if update.property != CascadeProperty::Velocity {
            return Vec::new();
        }
        let (value, warn, max) = (
            update.value,
            self.config.velocity_warning_fpm,
            self.config.velocity_error_fpm,
        );
        if value > max {
            vec![
                ValidationIssue::error(
                    entity_id.clone(),
                    IssueCode::VelocityTooHigh,
                    format!("Velocity {value:.0} FPM exceeds maximum {max:.0} FPM"),
                )
                .with_suggestion("Increase duct size or reduce airflow"),
            ]
        } else if value > warn {
            vec![
                ValidationIssue::warning(
                    entity_id.clone(),
                    IssueCode::VelocityHigh,
                    format!("Velocity {value:.0} FPM is above recommended {warn:.0} FPM"),
                )
                .with_suggestion("Consider increasing duct size"),
            ]
        } else {
            Vec::new()
        }
    }
}
