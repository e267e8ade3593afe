//! Component Store
//!
//! Owns every component value. Values live in a generational arena
//! ([`slotmap`]) and are indexed by `(entity, type name)`. Systems never hold
//! references into the store across calls; they keep a [`ComponentHandle`]
//! and resolve it when needed. A handle whose component was removed (or whose
//! store was torn down) resolves to [`EcsError::MissingComponent`].

use super::component::{Component, ComponentAllocator};
use super::{EcsError, EcsResult, Entity};
use serde_json::Value;
use slotmap::{new_key_type, SlotMap};
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

new_key_type! {
    /// Arena key of one stored component
    pub struct ComponentKey;
}

/// Generation-checked, typed handle to one stored component
pub struct ComponentHandle<T> {
    key: ComponentKey,
    entity: Entity,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> ComponentHandle<T> {
    /// Entity the component belongs to
    pub const fn entity(&self) -> Entity {
        self.entity
    }
}

impl<T> Clone for ComponentHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ComponentHandle<T> {}

impl<T> PartialEq for ComponentHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for ComponentHandle<T> {}

impl<T> fmt::Debug for ComponentHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentHandle")
            .field("key", &self.key)
            .field("entity", &self.entity)
            .field("type", &type_name::<T>())
            .finish()
    }
}

struct StoredComponent {
    type_name: String,
    value: Box<dyn Any>,
}

/// Type-erased component storage keyed by entity and type name
#[derive(Default)]
pub struct ComponentStore {
    allocators: HashMap<String, Box<dyn ComponentAllocator>>,
    arena: SlotMap<ComponentKey, StoredComponent>,
    index: HashMap<Entity, HashMap<String, ComponentKey>>,
}

impl ComponentStore {
    /// Create an empty store with no registered types
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the allocator for a named component type
    pub fn set_component_handlers(
        &mut self,
        type_name: impl Into<String>,
        allocator: Box<dyn ComponentAllocator>,
    ) {
        let type_name = type_name.into();
        log::debug!("Registered component type '{}'", type_name);
        self.allocators.insert(type_name, allocator);
    }

    /// Whether an allocator is registered for `type_name`
    pub fn is_registered(&self, type_name: &str) -> bool {
        self.allocators.contains_key(type_name)
    }

    /// Allocate a component from structured data and attach it to `entity`
    ///
    /// A second attach of the same type replaces the value in place: the old
    /// value goes through the deallocator and existing handles see the new one.
    pub fn add_component(&mut self, entity: Entity, type_name: &str, data: &Value) -> EcsResult<()> {
        let allocator = self
            .allocators
            .get(type_name)
            .ok_or_else(|| EcsError::UnknownComponentType {
                type_name: type_name.to_string(),
            })?;
        let value = allocator
            .allocate(data)
            .map_err(|reason| EcsError::InvalidComponentData {
                type_name: type_name.to_string(),
                reason,
            })?;
        self.store_value(entity, type_name, value);
        Ok(())
    }

    /// Attach an already-built typed component
    pub fn insert<T: Component>(&mut self, entity: Entity, component: T) -> EcsResult<()> {
        if !self.is_registered(T::NAME) {
            return Err(EcsError::UnknownComponentType {
                type_name: T::NAME.to_string(),
            });
        }
        self.store_value(entity, T::NAME, Box::new(component));
        Ok(())
    }

    fn store_value(&mut self, entity: Entity, type_name: &str, value: Box<dyn Any>) {
        let slots = self.index.entry(entity).or_default();
        if let Some(&key) = slots.get(type_name) {
            if let Some(stored) = self.arena.get_mut(key) {
                log::warn!(
                    "Entity {} already has a '{}' component; replacing it",
                    entity,
                    type_name
                );
                let old = std::mem::replace(&mut stored.value, value);
                if let Some(allocator) = self.allocators.get(type_name) {
                    allocator.deallocate(old);
                }
                return;
            }
        }
        let key = self.arena.insert(StoredComponent {
            type_name: type_name.to_string(),
            value,
        });
        slots.insert(type_name.to_string(), key);
        log::trace!("Attached '{}' to entity {}", type_name, entity);
    }

    fn key_of(&self, entity: Entity, type_name: &str) -> Option<ComponentKey> {
        self.index.get(&entity)?.get(type_name).copied()
    }

    /// Whether `entity` has a component of `type_name`
    pub fn has_component(&self, entity: Entity, type_name: &str) -> bool {
        self.key_of(entity, type_name).is_some()
    }

    /// Type-erased access to a component
    pub fn get_component(&self, entity: Entity, type_name: &str) -> EcsResult<&dyn Any> {
        self.key_of(entity, type_name)
            .and_then(|key| self.arena.get(key))
            .map(|stored| stored.value.as_ref())
            .ok_or_else(|| EcsError::missing(entity, type_name))
    }

    /// Type-erased mutable access to a component
    pub fn get_component_mut(&mut self, entity: Entity, type_name: &str) -> EcsResult<&mut dyn Any> {
        let key = self
            .key_of(entity, type_name)
            .ok_or_else(|| EcsError::missing(entity, type_name))?;
        self.arena
            .get_mut(key)
            .map(|stored| stored.value.as_mut())
            .ok_or_else(|| EcsError::missing(entity, type_name))
    }

    /// Typed access to a component
    pub fn get<T: Component>(&self, entity: Entity) -> EcsResult<&T> {
        downcast_ref(self.get_component(entity, T::NAME)?, entity)
    }

    /// Typed mutable access to a component
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> EcsResult<&mut T> {
        downcast_mut(self.get_component_mut(entity, T::NAME)?, entity)
    }

    /// Create a handle to `entity`'s component of type `T`, checking the stored type
    pub fn handle<T: Component>(&self, entity: Entity) -> EcsResult<ComponentHandle<T>> {
        let key = self
            .key_of(entity, T::NAME)
            .ok_or_else(|| EcsError::missing(entity, T::NAME))?;
        let handle = ComponentHandle {
            key,
            entity,
            _phantom: PhantomData,
        };
        self.resolve(handle)?;
        Ok(handle)
    }

    /// Look up the component behind a handle
    pub fn resolve<T: Component>(&self, handle: ComponentHandle<T>) -> EcsResult<&T> {
        let stored = self
            .arena
            .get(handle.key)
            .ok_or_else(|| EcsError::missing(handle.entity, T::NAME))?;
        downcast_ref(stored.value.as_ref(), handle.entity)
    }

    /// Mutable lookup of the component behind a handle
    pub fn resolve_mut<T: Component>(&mut self, handle: ComponentHandle<T>) -> EcsResult<&mut T> {
        let stored = self
            .arena
            .get_mut(handle.key)
            .ok_or_else(|| EcsError::missing(handle.entity, T::NAME))?;
        downcast_mut(stored.value.as_mut(), handle.entity)
    }

    /// Detach and deallocate one component
    pub fn remove_component(&mut self, entity: Entity, type_name: &str) -> EcsResult<()> {
        let key = self
            .index
            .get_mut(&entity)
            .and_then(|slots| slots.remove(type_name))
            .ok_or_else(|| EcsError::missing(entity, type_name))?;
        if let Some(stored) = self.arena.remove(key) {
            self.deallocate(stored);
        }
        if self.index.get(&entity).is_some_and(HashMap::is_empty) {
            self.index.remove(&entity);
        }
        Ok(())
    }

    /// Type names attached to `entity` (unordered)
    pub fn component_types(&self, entity: Entity) -> Vec<&str> {
        self.index
            .get(&entity)
            .map(|slots| slots.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Entities holding a component of `type_name` (unordered)
    pub fn entities_with<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = Entity> + 'a {
        self.index
            .iter()
            .filter(move |(_, slots)| slots.contains_key(type_name))
            .map(|(&entity, _)| entity)
    }

    /// Total number of stored components
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Whether no component is stored
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Deallocate every component; registered allocators are kept
    pub fn clear(&mut self) {
        let arena = std::mem::take(&mut self.arena);
        for (_, stored) in arena {
            self.deallocate(stored);
        }
        self.index.clear();
    }

    fn deallocate(&self, stored: StoredComponent) {
        match self.allocators.get(&stored.type_name) {
            Some(allocator) => allocator.deallocate(stored.value),
            None => drop(stored.value),
        }
    }
}

fn downcast_ref<T: Component>(value: &dyn Any, entity: Entity) -> EcsResult<&T> {
    value
        .downcast_ref::<T>()
        .ok_or_else(|| EcsError::ComponentTypeMismatch {
            entity,
            type_name: T::NAME.to_string(),
            expected: type_name::<T>(),
        })
}

fn downcast_mut<T: Component>(value: &mut dyn Any, entity: Entity) -> EcsResult<&mut T> {
    value
        .downcast_mut::<T>()
        .ok_or_else(|| EcsError::ComponentTypeMismatch {
            entity,
            type_name: T::NAME.to_string(),
            expected: type_name::<T>(),
        })
}
