//! ECS World implementation
//!
//! The world is the single owner of engine state: the entity registry, the
//! component store, the system registry and the collision engine. Everything
//! that used to be ambient global state is reached through a `&mut World`.

use super::component::{Component, ComponentAllocator, SerdeAllocator};
use super::components::{
    CircleComponent, ColliderComponent, IdComponent, LineComponent, PolygonComponent,
    TransformComponent,
};
use super::storage::{ComponentHandle, ComponentStore};
use super::system::{FnSystem, System, SystemRegistry};
use super::{EcsError, EcsResult, Entity, EntityRegistry};
use crate::config::EngineConfig;
use crate::physics::{systems as collider_systems, CollisionEngine, CollisionHandler};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::rc::Rc;

/// ECS World containing all entities, components and systems
pub struct World {
    entities: EntityRegistry,
    pub(crate) components: ComponentStore,
    systems: SystemRegistry,
    pub(crate) collision: CollisionEngine,
    component_dependencies: BTreeMap<String, Vec<String>>,
    system_requirements: BTreeMap<String, Vec<String>>,
}

impl World {
    /// Create a world with the default configuration
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    /// Create a world, registering built-in components and collider systems
    pub fn with_config(config: &EngineConfig) -> Self {
        let mut world = Self {
            entities: EntityRegistry::new(),
            components: ComponentStore::new(),
            systems: SystemRegistry::new(),
            collision: CollisionEngine::new(config.physics.clone()),
            component_dependencies: config.component_dependencies.clone(),
            system_requirements: config.system_requirements.clone(),
        };
        world.register_component::<TransformComponent>();
        world.register_component::<ColliderComponent>();
        world.register_component::<CircleComponent>();
        world.register_component::<LineComponent>();
        world.register_component::<PolygonComponent>();
        world.register_component::<IdComponent>();
        collider_systems::register_collider_systems(&mut world);
        world
    }

    // ----------------------------------------------------------------------
    // Entity Registry
    // ----------------------------------------------------------------------

    /// Create a new entity
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.entities.create();
        log::trace!("Created entity {}", entity);
        entity
    }

    /// Live entities in creation order
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter()
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Whether `entity` is live
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.contains(entity)
    }

    /// Unsubscribe every entity from every system, deallocate every component,
    /// and reset the id counter. Used when reloading a scene.
    pub fn delete_entity_data(&mut self) -> EcsResult<()> {
        log::info!("Deleting data of {} entities", self.entities.len());
        let entities: Vec<Entity> = self.entities.iter().collect();
        for entity in entities {
            // Unsubscribers may touch shared state, so always drop the oldest
            // subscription and re-read the list
            while let Some(system) = self.systems.first_subscription(entity) {
                self.unsubscribe_from_system(entity, &system)?;
            }
        }
        self.components.clear();
        self.systems.clear_subscriptions();
        self.entities.clear();
        Ok(())
    }

    // ----------------------------------------------------------------------
    // Component Store
    // ----------------------------------------------------------------------

    /// Register the allocate/deallocate pair for a named component type
    pub fn set_component_handlers(
        &mut self,
        type_name: impl Into<String>,
        allocator: Box<dyn ComponentAllocator>,
    ) {
        self.components.set_component_handlers(type_name, allocator);
    }

    /// Register a serde-deserializable component under `T::NAME`
    pub fn register_component<T: Component + DeserializeOwned>(&mut self) {
        self.set_component_handlers(T::NAME, Box::new(SerdeAllocator::<T>::new()));
    }

    /// Allocate a component from structured data and attach it to `entity`
    pub fn add_component(&mut self, entity: Entity, type_name: &str, data: &Value) -> EcsResult<()> {
        self.check_component_dependencies(entity, type_name)?;
        self.components.add_component(entity, type_name, data)
    }

    /// Attach an already-built typed component
    pub fn insert<T: Component>(&mut self, entity: Entity, component: T) -> EcsResult<()> {
        self.check_component_dependencies(entity, T::NAME)?;
        self.components.insert(entity, component)
    }

    fn check_component_dependencies(&self, entity: Entity, type_name: &str) -> EcsResult<()> {
        if !self.components.is_registered(type_name) {
            return Err(EcsError::UnknownComponentType {
                type_name: type_name.to_string(),
            });
        }
        let Some(requires) = self.component_dependencies.get(type_name) else {
            return Ok(());
        };
        match requires
            .iter()
            .find(|required| !self.components.has_component(entity, required))
        {
            Some(missing) => Err(EcsError::MissingComponentDependency {
                entity,
                component: type_name.to_string(),
                requires: missing.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Whether `entity` has a component of `type_name`
    pub fn has_component(&self, entity: Entity, type_name: &str) -> bool {
        self.components.has_component(entity, type_name)
    }

    /// Type-erased access to a component
    pub fn get_component(&self, entity: Entity, type_name: &str) -> EcsResult<&dyn Any> {
        self.components.get_component(entity, type_name)
    }

    /// Typed access to a component
    pub fn get<T: Component>(&self, entity: Entity) -> EcsResult<&T> {
        self.components.get(entity)
    }

    /// Typed mutable access to a component
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> EcsResult<&mut T> {
        self.components.get_mut(entity)
    }

    /// Stable handle to `entity`'s `T` component
    pub fn component_handle<T: Component>(&self, entity: Entity) -> EcsResult<ComponentHandle<T>> {
        self.components.handle(entity)
    }

    /// Resolve a handle; stale handles fail with `MissingComponent`
    pub fn resolve<T: Component>(&self, handle: ComponentHandle<T>) -> EcsResult<&T> {
        self.components.resolve(handle)
    }

    /// Mutably resolve a handle
    pub fn resolve_mut<T: Component>(&mut self, handle: ComponentHandle<T>) -> EcsResult<&mut T> {
        self.components.resolve_mut(handle)
    }

    /// Detach and deallocate one component
    pub fn remove_component(&mut self, entity: Entity, type_name: &str) -> EcsResult<()> {
        self.components.remove_component(entity, type_name)
    }

    /// Read-only view of the component store
    pub fn components(&self) -> &ComponentStore {
        &self.components
    }

    /// Find the entity whose `id` component equals `id`
    ///
    /// Linear scan: ids are optional and few entities carry one.
    pub fn get_entity(&self, id: &str) -> EcsResult<Entity> {
        self.entities
            .iter()
            .find(|&entity| {
                self.components
                    .get::<IdComponent>(entity)
                    .is_ok_and(|component| component.as_str() == id)
            })
            .ok_or_else(|| EcsError::EntityNotFound { id: id.to_string() })
    }

    // ----------------------------------------------------------------------
    // System Registry
    // ----------------------------------------------------------------------

    /// Register a system under `name`
    pub fn register_system(&mut self, name: impl Into<String>, system: Box<dyn System>) {
        self.systems.register(name, system);
    }

    /// Register a system from a subscriber/unsubscriber closure pair
    pub fn set_system_entity_handlers<S, U>(&mut self, name: impl Into<String>, subscriber: S, unsubscriber: U)
    where
        S: FnMut(&mut World, Entity) -> EcsResult<()> + 'static,
        U: FnMut(&mut World, Entity) -> EcsResult<()> + 'static,
    {
        self.register_system(name, Box::new(FnSystem::new(subscriber, unsubscriber)));
    }

    /// Whether a system is registered under `name`
    pub fn has_system(&self, name: &str) -> bool {
        self.systems.contains(name)
    }

    /// Subscribe `entity` to the named system
    pub fn subscribe_to_system(&mut self, entity: Entity, name: &str) -> EcsResult<()> {
        if !self.systems.contains(name) {
            return Err(EcsError::UnknownSystem {
                name: name.to_string(),
            });
        }
        if self.systems.is_subscribed(entity, name) {
            return Err(EcsError::AlreadySubscribed {
                entity,
                system: name.to_string(),
            });
        }

        let mut system = self.systems.checkout(name)?;
        let result = self
            .check_system_requirements(entity, name, system.as_ref())
            .and_then(|()| system.on_subscribe(self, entity));
        self.systems.restore(name, system);
        result?;

        self.systems.push_subscription(entity, name);
        log::debug!("Entity {} subscribed to '{}'", entity, name);
        Ok(())
    }

    /// Unsubscribe `entity` from the named system
    pub fn unsubscribe_from_system(&mut self, entity: Entity, name: &str) -> EcsResult<()> {
        if !self.systems.contains(name) {
            return Err(EcsError::UnknownSystem {
                name: name.to_string(),
            });
        }
        if !self.systems.is_subscribed(entity, name) {
            return Err(EcsError::NotSubscribed {
                entity,
                system: name.to_string(),
            });
        }

        let mut system = self.systems.checkout(name)?;
        let result = system.on_unsubscribe(self, entity);
        self.systems.restore(name, system);
        result?;

        self.systems.remove_subscription(entity, name);
        log::debug!("Entity {} unsubscribed from '{}'", entity, name);
        Ok(())
    }

    fn check_system_requirements(&self, entity: Entity, name: &str, system: &dyn System) -> EcsResult<()> {
        let mut required: Vec<&str> = system.required_components().to_vec();
        if let Some(configured) = self.system_requirements.get(name) {
            required.extend(configured.iter().map(String::as_str));
        }
        match required
            .into_iter()
            .find(|type_name| !self.components.has_component(entity, type_name))
        {
            Some(missing) => Err(EcsError::missing(entity, missing)),
            None => Ok(()),
        }
    }

    /// Systems `entity` has joined, in subscription order
    pub fn subscriptions(&self, entity: Entity) -> &[String] {
        self.systems.subscriptions(entity)
    }

    /// Whether `entity` has joined the named system
    pub fn is_subscribed(&self, entity: Entity, name: &str) -> bool {
        self.systems.is_subscribed(entity, name)
    }

    // ----------------------------------------------------------------------
    // Collision Engine
    // ----------------------------------------------------------------------

    /// Read-only access to the collision engine
    pub fn collision(&self) -> &CollisionEngine {
        &self.collision
    }

    /// Mutable access to the collision engine
    pub fn collision_mut(&mut self) -> &mut CollisionEngine {
        &mut self.collision
    }

    /// Register a named collision handler colliders can refer to
    pub fn register_collision_handler<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&mut World, Entity, Entity) -> EcsResult<()> + 'static,
    {
        let handler: CollisionHandler = Rc::new(handler);
        self.collision.register_handler(name, handler);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
