//! Entity registry: the single authoritative id to entity collection.
//!
//! Entities are traversed in insertion order. Game logic must not depend on
//! that order.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};
use typer_entity::{Entity, EntityId, EntityInit, Renderer, UpdateOutcome};

use crate::error::RegistryError;

/// Owns every live entity.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    /// Entities keyed by id.
    entities: HashMap<EntityId, Entity>,
    /// Ids in insertion order.
    order: Vec<EntityId>,
    /// Ids of entities whose kind is `Enemy`.
    enemies: HashSet<EntityId>,
}

impl EntityRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an entity from `init` and register it.
    ///
    /// Enemies are additionally indexed for typed lookup.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateId`] if the id is already taken.
    pub fn create(&mut self, init: EntityInit) -> Result<&mut Entity, RegistryError> {
        self.insert(Entity::from_init(init))
    }

    /// Register an already built entity.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateId`] if the id is already taken.
    pub fn insert(&mut self, entity: Entity) -> Result<&mut Entity, RegistryError> {
        match self.entities.entry(entity.id().clone()) {
            Entry::Occupied(occupied) => Err(RegistryError::DuplicateId(occupied.key().clone())),
            Entry::Vacant(vacant) => {
                debug!(id = %entity.id(), kind = entity.tag().name(), "entity created");
                self.order.push(entity.id().clone());
                if entity.is_enemy() {
                    self.enemies.insert(entity.id().clone());
                }
                Ok(vacant.insert(entity))
            }
        }
    }

    /// Unregister an entity, running its teardown hook.
    ///
    /// Removing an id that is not tracked is logged and otherwise ignored.
    pub fn remove(&mut self, id: &str) -> Option<Entity> {
        let Some(mut entity) = self.entities.remove(id) else {
            warn!(id, "cannot remove an entity that is not being tracked");
            return None;
        };
        entity.destroy();
        self.enemies.remove(id);
        self.order.retain(|tracked| tracked.as_str() != id);
        Some(entity)
    }

    /// Remove every entity and the enemy index.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.order.clear();
        self.enemies.clear();
    }

    /// Returns `true` if the id is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    /// Returns the entity with this id, if registered.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Returns the entity with this id for mutation, if registered.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// Look up an enemy through the enemy index.
    #[must_use]
    pub fn enemy(&self, id: &str) -> Option<&Entity> {
        if self.enemies.contains(id) {
            self.entities.get(id)
        } else {
            None
        }
    }

    /// Iterate all entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(|id| self.entities.get(id))
    }

    /// Iterate all enemies in insertion order.
    pub fn enemies(&self) -> impl Iterator<Item = &Entity> {
        self.iter().filter(|entity| self.enemies.contains(entity.id()))
    }

    /// Ids of all registered entities, in insertion order.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        self.order.clone()
    }

    /// Returns the number of registered entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no entity is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns the number of registered enemies.
    #[must_use]
    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    /// Ids of active enemies touching their own boundary entity.
    #[must_use]
    pub fn enemies_at_boundary(&self) -> Vec<EntityId> {
        self.enemies()
            .filter(|enemy| enemy.is_active())
            .filter(|enemy| {
                enemy
                    .enemy()
                    .and_then(|state| self.entities.get(&state.boundary))
                    .is_some_and(|boundary| enemy.collides(boundary))
            })
            .map(|enemy| enemy.id().clone())
            .collect()
    }

    /// Default update traversal: update every entity, then remove the ones
    /// that reported [`UpdateOutcome::Expired`].
    ///
    /// Returns the removed ids.
    pub fn update_all(&mut self, dt: f32) -> Vec<EntityId> {
        let mut expired = Vec::new();
        for id in &self.order {
            if let Some(entity) = self.entities.get_mut(id) {
                if entity.update(dt) == UpdateOutcome::Expired {
                    expired.push(id.clone());
                }
            }
        }
        for id in &expired {
            self.remove(id.as_str());
        }
        expired
    }

    /// Default draw traversal: draw every entity in insertion order.
    pub fn draw_all(&self, renderer: &mut dyn Renderer) {
        for entity in self.iter() {
            entity.draw(renderer);
        }
    }
}
