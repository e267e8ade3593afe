//! Entity implementation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity {
    id: u32,
}

impl Entity {
    /// Create a new entity with the given ID
    pub(crate) const fn new(id: u32) -> Self {
        Self { id }
    }

    /// Get the entity ID
    pub const fn id(self) -> u32 {
        self.id
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.id)
    }
}

/// Issues strictly increasing entity ids and tracks the live set
#[derive(Debug, Default)]
pub struct EntityRegistry {
    next_id: u32,
    live: Vec<Entity>,
}

impl EntityRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint the next entity
    pub fn create(&mut self) -> Entity {
        let entity = Entity::new(self.next_id);
        self.next_id += 1;
        self.live.push(entity);
        entity
    }

    /// Whether `entity` was created since the last teardown
    pub fn contains(&self, entity: Entity) -> bool {
        self.live.binary_search(&entity).is_ok()
    }

    /// Live entities in creation order
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.live.iter().copied()
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether no entity is live
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Forget every entity and restart ids at zero
    pub fn clear(&mut self) {
        self.live.clear();
        self.next_id = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_increase() {
        let mut registry = EntityRegistry::new();
        let a = registry.create();
        let b = registry.create();
        assert_eq!(a.id(), 0);
        assert_eq!(b.id(), 1);
        assert!(registry.contains(a));
        assert!(!registry.contains(Entity::new(7)));
        assert_eq!(registry.iter().collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn test_clear_resets_counter() {
        let mut registry = EntityRegistry::new();
        registry.create();
        registry.create();
        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.create().id(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Entity::new(12).to_string(), "#12");
    }
}
