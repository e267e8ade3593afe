//! Collider systems
//!
//! Subscribing an entity to one of these registers a collider descriptor
//! with the world's collision engine; unsubscribing removes it.

use super::collider::{CircleColliderData, LineColliderData, PolygonColliderData};
use crate::ecs::components::{
    CircleComponent, ColliderComponent, LineComponent, PolygonComponent, TransformComponent,
};
use crate::ecs::{Component, EcsError, EcsResult, Entity, System, World};

/// System name for circle colliders
pub const CIRCLE_COLLIDER: &str = "circle_collider";
/// System name for line colliders
pub const LINE_COLLIDER: &str = "line_collider";
/// System name for polygon colliders
pub const POLYGON_COLLIDER: &str = "polygon_collider";

/// Register the three collider systems with `world`
pub fn register_collider_systems(world: &mut World) {
    world.register_system(CIRCLE_COLLIDER, Box::new(CircleColliderSystem));
    world.register_system(LINE_COLLIDER, Box::new(LineColliderSystem));
    world.register_system(POLYGON_COLLIDER, Box::new(PolygonColliderSystem));
}

/// Fail early when the collider names a handler nobody registered
fn check_handler(world: &World, entity: Entity) -> EcsResult<()> {
    let collider = world.get::<ColliderComponent>(entity)?;
    match &collider.handler {
        Some(name) if !world.collision().has_handler(name) => {
            Err(EcsError::UnknownCollisionHandler {
                entity,
                name: name.clone(),
            })
        }
        _ => Ok(()),
    }
}

/// Registers circle colliders
#[derive(Debug, Default)]
pub struct CircleColliderSystem;

impl System for CircleColliderSystem {
    fn on_subscribe(&mut self, world: &mut World, entity: Entity) -> EcsResult<()> {
        check_handler(world, entity)?;
        let data = CircleColliderData::from_store(world.components(), entity)?;
        world.collision_mut().load_circle_collider_data(data);
        Ok(())
    }

    fn on_unsubscribe(&mut self, world: &mut World, entity: Entity) -> EcsResult<()> {
        world.collision_mut().remove_circle_collider_data(entity);
        Ok(())
    }

    fn required_components(&self) -> &[&'static str] {
        &[
            TransformComponent::NAME,
            ColliderComponent::NAME,
            CircleComponent::NAME,
        ]
    }
}

/// Registers line colliders
#[derive(Debug, Default)]
pub struct LineColliderSystem;

impl System for LineColliderSystem {
    fn on_subscribe(&mut self, world: &mut World, entity: Entity) -> EcsResult<()> {
        check_handler(world, entity)?;
        let data = LineColliderData::from_store(world.components(), entity)?;
        world.collision_mut().load_line_collider_data(data);
        Ok(())
    }

    fn on_unsubscribe(&mut self, world: &mut World, entity: Entity) -> EcsResult<()> {
        world.collision_mut().remove_line_collider_data(entity);
        Ok(())
    }

    fn required_components(&self) -> &[&'static str] {
        &[
            TransformComponent::NAME,
            ColliderComponent::NAME,
            LineComponent::NAME,
        ]
    }
}

/// Registers polygon colliders
#[derive(Debug, Default)]
pub struct PolygonColliderSystem;

impl System for PolygonColliderSystem {
    fn on_subscribe(&mut self, world: &mut World, entity: Entity) -> EcsResult<()> {
        check_handler(world, entity)?;
        let data = PolygonColliderData::from_store(world.components(), entity)?;
        world.collision_mut().load_polygon_collider_data(data);
        Ok(())
    }

    fn on_unsubscribe(&mut self, world: &mut World, entity: Entity) -> EcsResult<()> {
        world.collision_mut().remove_polygon_collider_data(entity);
        Ok(())
    }

    fn required_components(&self) -> &[&'static str] {
        &[
            TransformComponent::NAME,
            ColliderComponent::NAME,
            PolygonComponent::NAME,
        ]
    }
}
