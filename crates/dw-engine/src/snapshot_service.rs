//! Snapshot loading and summaries for frontends.

use std::path::Path;

use dw_model::{Entity, EntityKind, EntitySnapshot};

use crate::error::{EngineError, EngineResult};

/// Entity counts of a loaded snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotSummary {
    pub entity_count: usize,
    pub ducts: usize,
    pub fittings: usize,
    pub equipment: usize,
    pub other: usize,
}

/// Load and validate a snapshot file (`.yaml`, `.yml` or `.json`).
pub fn load_snapshot(path: &Path) -> EngineResult<EntitySnapshot> {
    Ok(dw_model::load_snapshot(path)?)
}

pub fn summarize(snapshot: &EntitySnapshot) -> SnapshotSummary {
    let mut summary = SnapshotSummary {
        entity_count: snapshot.len(),
        ..SnapshotSummary::default()
    };
    for entity in snapshot.iter() {
        match entity.kind() {
            EntityKind::Duct => summary.ducts += 1,
            EntityKind::Fitting => summary.fittings += 1,
            EntityKind::Equipment => summary.equipment += 1,
            _ => summary.other += 1,
        }
    }
    summary
}

/// Look up an entity, failing with [`EngineError::EntityNotFound`].
pub fn require_entity<'a>(snapshot: &'a EntitySnapshot, id: &str) -> EngineResult<&'a Entity> {
    snapshot
        .get(id)
        .ok_or_else(|| EngineError::EntityNotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dw_model::{Duct, DuctProps, Note, NoteProps, Transform};

    #[test]
    fn summary_counts_by_kind() {
        let snapshot = EntitySnapshot::from_entities([
            Entity::Duct(Duct::new("d", Transform::default(), DuctProps::round(8.0, 4.0))),
            Entity::Note(Note {
                id: "n".into(),
                transform: Transform::default(),
                props: NoteProps {
                    content: "check".to_string(),
                },
            }),
        ]);
        let summary = summarize(&snapshot);
        assert_eq!(summary.entity_count, 2);
        assert_eq!(summary.ducts, 1);
        assert_eq!(summary.other, 1);
        assert!(require_entity(&snapshot, "d").is_ok());
        assert!(matches!(
            require_entity(&snapshot, "x"),
            Err(EngineError::EntityNotFound(id)) if id == "x"
        ));
    }

    #[test]
    fn unsupported_extension_is_a_snapshot_error() {
        let err = load_snapshot(Path::new("design.txt")).unwrap_err();
        assert!(matches!(err, EngineError::Snapshot(_)));
    }
}
