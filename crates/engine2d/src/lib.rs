//! # engine2d
//!
//! Runtime core of a data-driven 2D game engine.
//!
//! ## Features
//!
//! - **String-keyed ECS**: components are created from JSON-like data through
//!   per-type allocators registered at startup
//! - **System lifecycle**: systems hear about entities joining and leaving them
//! - **Collision**: circle, line and polygon colliders with averaged
//!   positional correction over a fixed number of passes per frame
//! - **Scenes**: JSON scene descriptions loaded straight into the world
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use engine2d::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut engine = Engine::new(EngineConfig::default())?;
//!     engine.world_mut().register_collision_handler("bump", |_world, me, partner| {
//!         log::info!("{} bumped into {}", me, partner);
//!         Ok(())
//!     });
//!     let scene = SceneDescription::from_file("scenes/arena.json")?;
//!     engine.load_scene(&scene)?;
//!     for _ in 0..60 {
//!         engine.update(1.0 / 60.0)?;
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod config;
pub mod debug;
pub mod ecs;
pub mod foundation;
pub mod physics;
pub mod scene;

mod engine;

pub use engine::{Engine, EngineError, FrameStage, StageHook};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, EngineConfig, PhysicsConfig},
        debug::{RenderSink, RenderSubmission},
        ecs::{
            components::{
                CircleComponent, ColliderComponent, CollisionFlags, IdComponent, LineComponent,
                PolygonComponent, TransformComponent,
            },
            Component, ComponentHandle, EcsError, EcsResult, Entity, System, World,
        },
        foundation::math::{Mat4, Vec2, Vec3},
        physics::{physics_api_update, PhysicsReport},
        scene::{load_scene, SceneDescription, SceneError},
        Engine, EngineError, FrameStage,
    };
}
