//! Collision detection and positional correction
//!
//! Circles are the only movable colliders. Lines and polygons act as walls:
//! they push circles but are never pushed, and line-line contacts only raise
//! events.

pub mod collider;
pub mod engine;
pub mod geometry;
pub mod systems;


pub use collider::{CircleColliderData, ColliderHandles, LineColliderData, PolygonColliderData};
pub use engine::{CollisionEngine, CollisionEvents, CollisionHandler, PassReport, PhysicsReport};

use crate::ecs::{EcsResult, World};

/// Run the configured number of detection passes, then dispatch handlers
///
/// Handler errors abort the update and propagate unchanged.
pub fn physics_api_update(world: &mut World) -> EcsResult<PhysicsReport> {
    let passes = world.collision.config().passes;
    let mut report = PhysicsReport::default();
    for _ in 0..passes {
        let pass = world.collision.detection_pass(&mut world.components)?;
        report.passes.push(pass);
    }

    let calls = world
        .collision
        .plan_dispatch(&world.components, &report.passes)?;
    report.handler_calls = calls.len();
    for (handler, me, partner) in calls {
        log::trace!("Collision handler: {} hit {}", me, partner);
        handler(world, me, partner)?;
    }
    Ok(report)
}
