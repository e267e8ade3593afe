//! System trait and the System Registry
//!
//! A system is anything that wants to know when an entity joins or leaves it.
//! Joining typically pulls handles to components out of the store and
//! registers derived state (collider descriptors, render entries); leaving
//! undoes that.

use super::{EcsError, EcsResult, Entity, World};
use std::collections::HashMap;

/// Entity subscription callbacks for one named system
pub trait System {
    /// Called when `entity` subscribes, after the registry validated requirements
    fn on_subscribe(&mut self, world: &mut World, entity: Entity) -> EcsResult<()>;

    /// Called when `entity` unsubscribes
    fn on_unsubscribe(&mut self, world: &mut World, entity: Entity) -> EcsResult<()>;

    /// Component types an entity must carry before `on_subscribe` runs
    fn required_components(&self) -> &[&'static str] {
        &[]
    }
}

/// System built from a subscriber/unsubscriber closure pair
pub struct FnSystem<S, U> {
    subscriber: S,
    unsubscriber: U,
}

impl<S, U> FnSystem<S, U>
where
    S: FnMut(&mut World, Entity) -> EcsResult<()>,
    U: FnMut(&mut World, Entity) -> EcsResult<()>,
{
    /// Wrap a subscriber/unsubscriber pair
    pub const fn new(subscriber: S, unsubscriber: U) -> Self {
        Self {
            subscriber,
            unsubscriber,
        }
    }
}

impl<S, U> System for FnSystem<S, U>
where
    S: FnMut(&mut World, Entity) -> EcsResult<()>,
    U: FnMut(&mut World, Entity) -> EcsResult<()>,
{
    fn on_subscribe(&mut self, world: &mut World, entity: Entity) -> EcsResult<()> {
        (self.subscriber)(world, entity)
    }

    fn on_unsubscribe(&mut self, world: &mut World, entity: Entity) -> EcsResult<()> {
        (self.unsubscriber)(world, entity)
    }
}

/// Named systems plus each entity's ordered subscription list
///
/// A system is checked out of the registry while its callback runs so the
/// callback can receive the whole `World` mutably.
#[derive(Default)]
pub struct SystemRegistry {
    systems: HashMap<String, Option<Box<dyn System>>>,
    subscriptions: HashMap<Entity, Vec<String>>,
}

impl SystemRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a system under `name`
    pub fn register(&mut self, name: impl Into<String>, system: Box<dyn System>) {
        let name = name.into();
        log::debug!("Registered system '{}'", name);
        self.systems.insert(name, Some(system));
    }

    /// Whether a system is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.systems.contains_key(name)
    }

    /// Take the system out so its callback can borrow the world
    pub(crate) fn checkout(&mut self, name: &str) -> EcsResult<Box<dyn System>> {
        match self.systems.get_mut(name) {
            None => Err(EcsError::UnknownSystem {
                name: name.to_string(),
            }),
            Some(slot) => slot.take().ok_or_else(|| EcsError::SystemBusy {
                name: name.to_string(),
            }),
        }
    }

    /// Put a checked-out system back
    pub(crate) fn restore(&mut self, name: &str, system: Box<dyn System>) {
        if let Some(slot) = self.systems.get_mut(name) {
            *slot = Some(system);
        }
    }

    /// Whether `entity` has joined `name`
    pub fn is_subscribed(&self, entity: Entity, name: &str) -> bool {
        self.subscriptions
            .get(&entity)
            .is_some_and(|names| names.iter().any(|n| n == name))
    }

    /// Systems `entity` has joined, in subscription order
    pub fn subscriptions(&self, entity: Entity) -> &[String] {
        self.subscriptions
            .get(&entity)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Oldest subscription of `entity`, if any
    pub(crate) fn first_subscription(&self, entity: Entity) -> Option<String> {
        self.subscriptions(entity).first().cloned()
    }

    pub(crate) fn push_subscription(&mut self, entity: Entity, name: &str) {
        self.subscriptions
            .entry(entity)
            .or_default()
            .push(name.to_string());
    }

    pub(crate) fn remove_subscription(&mut self, entity: Entity, name: &str) {
        if let Some(names) = self.subscriptions.get_mut(&entity) {
            names.retain(|n| n != name);
            if names.is_empty() {
                self.subscriptions.remove(&entity);
            }
        }
    }

    /// Forget every subscription; registered systems are kept
    pub(crate) fn clear_subscriptions(&mut self) {
        self.subscriptions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl System for Noop {
        fn on_subscribe(&mut self, _world: &mut World, _entity: Entity) -> EcsResult<()> {
            Ok(())
        }

        fn on_unsubscribe(&mut self, _world: &mut World, _entity: Entity) -> EcsResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_checkout_and_restore() {
        let mut registry = SystemRegistry::new();
        registry.register("noop", Box::new(Noop));

        let system = registry.checkout("noop").unwrap();
        assert!(matches!(
            registry.checkout("noop"),
            Err(EcsError::SystemBusy { .. })
        ));
        registry.restore("noop", system);
        assert!(registry.checkout("noop").is_ok());
    }

    #[test]
    fn test_unknown_checkout() {
        let mut registry = SystemRegistry::new();
        assert!(matches!(
            registry.checkout("missing"),
            Err(EcsError::UnknownSystem { .. })
        ));
    }

    #[test]
    fn test_subscription_order() {
        let mut registry = SystemRegistry::new();
        let entity = Entity::new(0);
        registry.push_subscription(entity, "b");
        registry.push_subscription(entity, "a");
        assert_eq!(registry.subscriptions(entity), ["b".to_string(), "a".to_string()]);
        assert_eq!(registry.first_subscription(entity).as_deref(), Some("b"));

        registry.remove_subscription(entity, "b");
        assert!(!registry.is_subscribed(entity, "b"));
        assert!(registry.is_subscribed(entity, "a"));
    }
}
