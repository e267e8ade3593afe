//! Scene loading
//!
//! A scene is a JSON list of entities. Each entity lists its components in
//! attach order and the systems it joins in subscription order:
//!
//! ```json
//! {
//!   "entities": [
//!     {
//!       "components": [
//!         { "type": "id", "data": "ball" },
//!         { "type": "transform", "data": { "position": [0.0, 2.0, 0.0] } },
//!         { "type": "collider", "data": { "handler": "bounce" } },
//!         { "type": "circle", "data": { "radius": 0.5 } }
//!       ],
//!       "systems": ["circle_collider"]
//!     }
//!   ]
//! }
//! ```

use crate::ecs::{EcsError, Entity, World};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

/// Errors that abort a scene load
#[derive(Error, Debug)]
pub enum SceneError {
    /// Scene file could not be read
    #[error("failed to read scene: {0}")]
    Io(#[from] std::io::Error),

    /// Scene text is not a valid scene description
    #[error("failed to parse scene: {0}")]
    Parse(#[from] serde_json::Error),

    /// Building one of the scene's entities failed
    #[error("scene entity {index}: {source}")]
    Entity {
        /// Position of the entity in the scene list
        index: usize,
        /// Underlying ECS failure
        source: EcsError,
    },
}

/// One component entry of a scene entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDescription {
    /// Registered component type name
    #[serde(rename = "type")]
    pub type_name: String,

    /// Data handed to the type's allocator; omitted data is `{}`
    #[serde(default = "empty_object")]
    pub data: Value,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

/// One entity of a scene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityDescription {
    /// Components, attached in order
    pub components: Vec<ComponentDescription>,
    /// Systems, subscribed in order after every component is attached
    pub systems: Vec<String>,
}

/// A whole scene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    /// Entities in creation order
    pub entities: Vec<EntityDescription>,
}

impl SceneDescription {
    /// Parse a scene from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a scene file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        log::info!("Loading scene from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

/// Create every entity of `scene` in `world`
///
/// Stops at the first failure. Entities built before the failure stay in the
/// world; reload through [`crate::Engine::reload_scene`] to start clean.
pub fn load_scene(world: &mut World, scene: &SceneDescription) -> Result<Vec<Entity>, SceneError> {
    let mut created = Vec::with_capacity(scene.entities.len());
    for (index, description) in scene.entities.iter().enumerate() {
        let entity = build_entity(world, description)
            .map_err(|source| SceneError::Entity { index, source })?;
        created.push(entity);
    }
    log::info!("Loaded scene with {} entities", created.len());
    Ok(created)
}

fn build_entity(world: &mut World, description: &EntityDescription) -> Result<Entity, EcsError> {
    let entity = world.create_entity();
    for component in &description.components {
        world.add_component(entity, &component.type_name, &component.data)?;
    }
    for system in &description.systems {
        world.subscribe_to_system(entity, system)?;
    }
    Ok(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::TransformComponent;
    use crate::foundation::math::Vec2;

    const TWO_BALLS: &str = r#"{
        "entities": [
            {
                "components": [
                    { "type": "id", "data": "left" },
                    { "type": "transform", "data": { "position": [0.0, 0.0, 0.0] } },
                    { "type": "collider" },
                    { "type": "circle", "data": { "radius": 1.0 } }
                ],
                "systems": ["circle_collider"]
            },
            {
                "components": [
                    { "type": "id", "data": "right" },
                    { "type": "transform", "data": { "position": [1.5, 0.0, 0.0] } },
                    { "type": "collider", "data": { "send": true, "receive": true } },
                    { "type": "circle", "data": { "radius": 1.0 } }
                ],
                "systems": ["circle_collider"]
            }
        ]
    }"#;

    #[test]
    fn test_load_scene_builds_entities_in_order() {
        let scene = SceneDescription::from_json_str(TWO_BALLS).unwrap();
        let mut world = World::new();

        let entities = load_scene(&mut world, &scene).unwrap();

        assert_eq!(entities.len(), 2);
        assert_eq!(world.get_entity("left").unwrap(), entities[0]);
        assert_eq!(world.get_entity("right").unwrap(), entities[1]);
        assert_eq!(world.collision().collider_count(), 2);
        let right = world.get::<TransformComponent>(entities[1]).unwrap();
        assert_eq!(right.position_2d(), Vec2::new(1.5, 0.0));
    }

    #[test]
    fn test_unknown_component_aborts_load() {
        let scene = SceneDescription::from_json_str(
            r#"{ "entities": [ { "components": [ { "type": "sprite", "data": {} } ] } ] }"#,
        )
        .unwrap();
        let mut world = World::new();

        let err = load_scene(&mut world, &scene).unwrap_err();
        assert!(matches!(
            err,
            SceneError::Entity {
                index: 0,
                source: EcsError::UnknownComponentType { .. }
            }
        ));
    }

    #[test]
    fn test_missing_required_component_aborts_load() {
        let scene = SceneDescription::from_json_str(
            r#"{ "entities": [
                { "components": [ { "type": "transform" } ] },
                { "components": [ { "type": "transform" } ], "systems": ["circle_collider"] }
            ] }"#,
        )
        .unwrap();
        let mut world = World::new();

        let err = load_scene(&mut world, &scene).unwrap_err();
        assert!(matches!(
            err,
            SceneError::Entity {
                index: 1,
                source: EcsError::MissingComponent { .. }
            }
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SceneDescription::from_json_str("{ \"entities\": 3 }"),
            Err(SceneError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            SceneDescription::from_file("does/not/exist.json"),
            Err(SceneError::Io(_))
        ));
    }
}
