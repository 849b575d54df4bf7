//! Immutable view over the entity store handed to the engine per call.

use dw_core::EntityId;
use indexmap::IndexMap;

use crate::schema::{Duct, Entity, Equipment};

/// Entities keyed by id, in the order the store supplied them.
///
/// Insertion order is preserved because detection output and graph node
/// order follow it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntitySnapshot {
    entities: IndexMap<EntityId, Entity>,
}

impl EntitySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from a list of entities. A repeated id replaces the
    /// earlier record but keeps its position.
    pub fn from_entities(entities: impl IntoIterator<Item = Entity>) -> Self {
        entities.into_iter().collect()
    }

    pub fn insert(&mut self, entity: Entity) -> Option<Entity> {
        self.entities.insert(entity.id().clone(), entity)
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &EntityId> {
        self.entities.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn ducts(&self) -> impl Iterator<Item = &Duct> {
        self.iter().filter_map(Entity::as_duct)
    }

    pub fn equipment(&self) -> impl Iterator<Item = &Equipment> {
        self.iter().filter_map(Entity::as_equipment)
    }

    pub fn duct(&self, id: &str) -> Option<&Duct> {
        self.get(id).and_then(Entity::as_duct)
    }
}

impl FromIterator<Entity> for EntitySnapshot {
    fn from_iter<T: IntoIterator<Item = Entity>>(iter: T) -> Self {
        let mut snapshot = Self::new();
        for entity in iter {
            snapshot.insert(entity);
        }
        snapshot
    }
}

impl<'a> IntoIterator for &'a EntitySnapshot {
    type Item = &'a Entity;
    type IntoIter = indexmap::map::Values<'a, EntityId, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.values()
    }
}
