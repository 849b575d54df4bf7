//! Snapshot validation logic.

use crate::schema::{DuctShape, Entity, SnapshotFile};
use std::collections::HashSet;

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_snapshot(file: &SnapshotFile) -> Result<(), ValidationError> {
    if file.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: file.version,
        });
    }

    let mut ids = HashSet::new();
    for entity in &file.entities {
        if !ids.insert(entity.id().as_str()) {
            return Err(ValidationError::DuplicateId {
                id: entity.id().to_string(),
                context: "entities".to_string(),
            });
        }
    }

    for entity in &file.entities {
        validate_entity(entity, &ids)?;
    }

    Ok(())
}

fn validate_entity(entity: &Entity, ids: &HashSet<&str>) -> Result<(), ValidationError> {
    let id = entity.id();

    if !entity.transform().is_finite() {
        return Err(ValidationError::InvalidValue {
            field: format!("{id}.transform"),
            value: format!("{:?}", entity.transform()),
            reason: "must be finite".to_string(),
        });
    }

    let relations = [
        ("connectedTo", entity.connected_to()),
        ("connectedFrom", entity.connected_from()),
    ];
    for (field, target) in relations {
        if let Some(target) = target
            && !ids.contains(target.as_str())
        {
            return Err(ValidationError::MissingReference {
                id: target.to_string(),
                context: format!("entity '{id}' {field}"),
            });
        }
    }

    match entity {
        Entity::Duct(duct) => {
            let props = &duct.props;
            positive(id.as_str(), "length", Some(props.length))?;
            match props.shape {
                DuctShape::Round => {
                    require(id.as_str(), "diameter", props.diameter, "round ducts require diameter")?;
                }
                DuctShape::Rectangular => {
                    require(id.as_str(), "width", props.width, "rectangular ducts require width")?;
                    require(id.as_str(), "height", props.height, "rectangular ducts require height")?;
                }
            }
            positive(id.as_str(), "diameter", props.diameter)?;
            positive(id.as_str(), "width", props.width)?;
            positive(id.as_str(), "height", props.height)?;
            if !props.airflow.is_finite() || props.airflow < 0.0 {
                return Err(ValidationError::InvalidValue {
                    field: format!("{id}.airflow"),
                    value: props.airflow.to_string(),
                    reason: "must be finite and non-negative".to_string(),
                });
            }
        }
        Entity::Equipment(equipment) => {
            positive(id.as_str(), "capacity", Some(equipment.props.capacity))?;
        }
        Entity::Group(group) => {
            for child in &group.props.child_ids {
                if !ids.contains(child.as_str()) {
                    return Err(ValidationError::MissingReference {
                        id: child.to_string(),
                        context: format!("group '{id}' childIds"),
                    });
                }
            }
        }
        Entity::Room(_) | Entity::Fitting(_) | Entity::Accessory(_) | Entity::Note(_) => {}
    }

    Ok(())
}

fn require(
    id: &str,
    field: &str,
    value: Option<f64>,
    reason: &str,
) -> Result<(), ValidationError> {
    if value.is_none() {
        return Err(ValidationError::InvalidValue {
            field: format!("{id}.{field}"),
            value: "missing".to_string(),
            reason: reason.to_string(),
        });
    }
    Ok(())
}

fn positive(id: &str, field: &str, value: Option<f64>) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.is_finite() || v <= 0.0 => Err(ValidationError::InvalidValue {
            field: format!("{id}.{field}"),
            value: v.to_string(),
            reason: "must be finite and positive".to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::*;

    fn file(entities: Vec<Entity>) -> SnapshotFile {
        SnapshotFile {
            version: LATEST_VERSION,
            name: None,
            entities,
        }
    }

    fn duct(id: &str, connected_to: Option<&str>) -> Entity {
        let mut props = DuctProps::round(12.0, 10.0);
        props.connected_to = connected_to.map(Into::into);
        Entity::Duct(Duct::new(id, Transform::default(), props))
    }

    #[test]
    fn accepts_connected_chain() {
        let f = file(vec![duct("a", Some("b")), duct("b", None)]);
        assert!(validate_snapshot(&f).is_ok());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let f = file(vec![duct("a", None), duct("a", None)]);
        assert!(matches!(
            validate_snapshot(&f),
            Err(ValidationError::DuplicateId { .. })
        ));
    }

    #[test]
    fn rejects_dangling_connection() {
        let f = file(vec![duct("a", Some("ghost"))]);
        let err = validate_snapshot(&f).unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn rejects_rectangular_without_height() {
        let mut props = DuctProps::rectangular(12.0, 8.0, 10.0);
        props.height = None;
        let f = file(vec![Entity::Duct(Duct::new("r", Transform::default(), props))]);
        assert!(matches!(
            validate_snapshot(&f),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn rejects_zero_length_duct() {
        let props = DuctProps::round(12.0, 0.0);
        let f = file(vec![Entity::Duct(Duct::new("z", Transform::default(), props))]);
        assert!(validate_snapshot(&f).is_err());
    }

    #[test]
    fn rejects_future_version() {
        let mut f = file(vec![]);
        f.version = LATEST_VERSION + 1;
        assert!(matches!(
            validate_snapshot(&f),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn rejects_unknown_group_child() {
        let group = Entity::Group(Group {
            id: "g".into(),
            transform: Transform::default(),
            props: GroupProps {
                name: "Branch A".into(),
                child_ids: vec!["missing".into()],
            },
        });
        assert!(validate_snapshot(&file(vec![group])).is_err());
    }
}
