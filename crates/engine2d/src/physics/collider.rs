//! Collider descriptors
//!
//! A descriptor is what a collider system registers with the collision engine
//! when an entity subscribes: handles to the components the geometry tests
//! read. Handles are resolved fresh every pass, so a descriptor never holds a
//! reference into the store.

use super::geometry::{Circle, Segment};
use crate::ecs::components::{
    CircleComponent, ColliderComponent, CollisionFlags, LineComponent, PolygonComponent,
    TransformComponent,
};
use crate::ecs::{ComponentHandle, ComponentStore, EcsResult, Entity};

/// Handles shared by every collider kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColliderHandles {
    /// Owning entity
    pub entity: Entity,
    /// Position that receives corrections
    pub transform: ComponentHandle<TransformComponent>,
    /// Participation settings
    pub collider: ComponentHandle<ColliderComponent>,
}

impl ColliderHandles {
    /// Look up the transform and collider handles of `entity`
    pub fn of(store: &ComponentStore, entity: Entity) -> EcsResult<Self> {
        Ok(Self {
            entity,
            transform: store.handle(entity)?,
            collider: store.handle(entity)?,
        })
    }
}

/// Registered circle collider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircleColliderData {
    /// Transform and collider handles
    pub handles: ColliderHandles,
    /// Circle shape
    pub shape: ComponentHandle<CircleComponent>,
}

/// Registered line collider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineColliderData {
    /// Transform and collider handles
    pub handles: ColliderHandles,
    /// Segment shape
    pub shape: ComponentHandle<LineComponent>,
}

/// Registered polygon collider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolygonColliderData {
    /// Transform and collider handles
    pub handles: ColliderHandles,
    /// Polyline shape
    pub shape: ComponentHandle<PolygonComponent>,
}

impl CircleColliderData {
    /// Build a descriptor from the components `entity` already has
    pub fn from_store(store: &ComponentStore, entity: Entity) -> EcsResult<Self> {
        Ok(Self {
            handles: ColliderHandles::of(store, entity)?,
            shape: store.handle(entity)?,
        })
    }
}

impl LineColliderData {
    /// Build a descriptor from the components `entity` already has
    pub fn from_store(store: &ComponentStore, entity: Entity) -> EcsResult<Self> {
        Ok(Self {
            handles: ColliderHandles::of(store, entity)?,
            shape: store.handle(entity)?,
        })
    }
}

impl PolygonColliderData {
    /// Build a descriptor from the components `entity` already has
    pub fn from_store(store: &ComponentStore, entity: Entity) -> EcsResult<Self> {
        Ok(Self {
            handles: ColliderHandles::of(store, entity)?,
            shape: store.handle(entity)?,
        })
    }
}

/// A collider resolved into world space for one pass
#[derive(Debug, Clone)]
pub(crate) struct Resolved<S> {
    pub entity: Entity,
    pub transform: ComponentHandle<TransformComponent>,
    pub flags: CollisionFlags,
    pub shape: S,
}

impl<S> Resolved<S> {
    pub fn sends(&self) -> bool {
        self.flags.contains(CollisionFlags::SEND)
    }

    pub fn receives(&self) -> bool {
        self.flags.contains(CollisionFlags::RECEIVE)
    }
}

/// Resolve the shared handles; `None` when the collider is disabled
fn resolve_common(
    store: &ComponentStore,
    handles: &ColliderHandles,
) -> EcsResult<Option<(TransformComponent, CollisionFlags)>> {
    let collider = store.resolve(handles.collider)?;
    if !collider.enabled {
        return Ok(None);
    }
    let transform = store.resolve(handles.transform)?.clone();
    Ok(Some((transform, collider.flags)))
}

impl CircleColliderData {
    pub(crate) fn resolve(&self, store: &ComponentStore) -> EcsResult<Option<Resolved<Circle>>> {
        let Some((transform, flags)) = resolve_common(store, &self.handles)? else {
            return Ok(None);
        };
        let circle = store.resolve(self.shape)?;
        Ok(Some(Resolved {
            entity: self.handles.entity,
            transform: self.handles.transform,
            flags,
            shape: Circle::new(transform.position_2d(), circle.radius * transform.scale.x),
        }))
    }
}

impl LineColliderData {
    pub(crate) fn resolve(&self, store: &ComponentStore) -> EcsResult<Option<Resolved<Segment>>> {
        let Some((transform, flags)) = resolve_common(store, &self.handles)? else {
            return Ok(None);
        };
        let line = store.resolve(self.shape)?;
        Ok(Some(Resolved {
            entity: self.handles.entity,
            transform: self.handles.transform,
            flags,
            shape: Segment::new(
                transform.world_point(&line.begin),
                transform.world_point(&line.end),
            ),
        }))
    }
}

impl PolygonColliderData {
    pub(crate) fn resolve(&self, store: &ComponentStore) -> EcsResult<Option<Resolved<Vec<Segment>>>> {
        let Some((transform, flags)) = resolve_common(store, &self.handles)? else {
            return Ok(None);
        };
        let polygon = store.resolve(self.shape)?;
        let edges = polygon
            .edges()
            .into_iter()
            .map(|(begin, end)| {
                Segment::new(transform.world_point(&begin), transform.world_point(&end))
            })
            .collect();
        Ok(Some(Resolved {
            entity: self.handles.entity,
            transform: self.handles.transform,
            flags,
            shape: edges,
        }))
    }
}
