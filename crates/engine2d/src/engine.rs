//! Core engine implementation

use crate::config::{Config, ConfigError, EngineConfig};
use crate::debug::{collider_debug_submissions, RenderSink};
use crate::ecs::{EcsError, EcsResult, Entity, World};
use crate::physics::{physics_api_update, PhysicsReport};
use crate::scene::{self, SceneDescription, SceneError};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Per-frame stages, run in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FrameStage {
    /// Read input, set velocities and intents
    Input,
    /// Collision detection, correction and handler dispatch
    Physics,
    /// Derived transforms (follow targets, parenting)
    Transforms,
    /// Renderer submissions
    Render,
    /// Collider outlines
    ColliderDebug,
    /// Camera and render flush
    Present,
}

impl FrameStage {
    /// Every stage in execution order
    pub const ALL: [Self; 6] = [
        Self::Input,
        Self::Physics,
        Self::Transforms,
        Self::Render,
        Self::ColliderDebug,
        Self::Present,
    ];
}

/// Content-code callback run once per frame in its stage
pub type StageHook = Box<dyn FnMut(&mut World, f32) -> EcsResult<()>>;

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration could not be loaded or is invalid
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// ECS or collision failure during a frame
    #[error("ECS error: {0}")]
    Ecs(#[from] EcsError),

    /// Scene load failure
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),
}

/// Main engine struct
///
/// Owns the world and runs the fixed stage order every frame.
pub struct Engine {
    /// ECS world containing all entities, components, and systems
    pub world: World,

    config: EngineConfig,
    hooks: BTreeMap<FrameStage, Vec<StageHook>>,
    debug_sink: Option<Box<dyn RenderSink>>,
    last_physics: PhysicsReport,
    frame_count: u64,
}

impl Engine {
    /// Create a new engine instance
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!(
            "Initializing engine ({} physics passes per frame)",
            config.physics.passes
        );
        Ok(Self {
            world: World::with_config(&config),
            config,
            hooks: BTreeMap::new(),
            debug_sink: None,
            last_physics: PhysicsReport::default(),
            frame_count: 0,
        })
    }

    /// Create an engine from a TOML or RON configuration file
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        Self::new(EngineConfig::load_from_file(path)?)
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the ECS world
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Frames completed so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// What the most recent physics stage found
    pub fn last_physics_report(&self) -> &PhysicsReport {
        &self.last_physics
    }

    /// Run `hook` every frame during `stage`, after hooks added earlier
    pub fn add_hook<F>(&mut self, stage: FrameStage, hook: F)
    where
        F: FnMut(&mut World, f32) -> EcsResult<()> + 'static,
    {
        self.hooks.entry(stage).or_default().push(Box::new(hook));
    }

    /// Forward collider outlines to `sink` during the collider-debug stage
    pub fn set_debug_sink(&mut self, sink: Box<dyn RenderSink>) {
        self.debug_sink = Some(sink);
    }

    /// Stop producing collider outlines
    pub fn clear_debug_sink(&mut self) -> Option<Box<dyn RenderSink>> {
        self.debug_sink.take()
    }

    /// Add the entities of `scene` to the world
    pub fn load_scene(&mut self, scene: &SceneDescription) -> Result<Vec<Entity>, EngineError> {
        Ok(scene::load_scene(&mut self.world, scene)?)
    }

    /// Tear down every entity, then load `scene` into the empty world
    pub fn reload_scene(&mut self, scene: &SceneDescription) -> Result<Vec<Entity>, EngineError> {
        self.world.delete_entity_data()?;
        self.load_scene(scene)
    }

    /// Run one frame: every stage in order, stopping at the first error
    pub fn update(&mut self, delta_time: f32) -> Result<(), EngineError> {
        for stage in FrameStage::ALL {
            self.run_stage(stage, delta_time)?;
        }
        self.frame_count += 1;
        Ok(())
    }

    fn run_stage(&mut self, stage: FrameStage, delta_time: f32) -> Result<(), EngineError> {
        match stage {
            FrameStage::Physics => {
                self.last_physics = physics_api_update(&mut self.world)?;
            }
            FrameStage::ColliderDebug => {
                if let Some(sink) = self.debug_sink.as_mut() {
                    for submission in collider_debug_submissions(&self.world)? {
                        sink.submit(submission);
                    }
                }
            }
            _ => {}
        }

        if let Some(hooks) = self.hooks.get_mut(&stage) {
            for hook in hooks.iter_mut() {
                hook(&mut self.world, delta_time)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::RenderSubmission;
    use crate::ecs::components::TransformComponent;
    use crate::foundation::math::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    const BALLS: &str = r#"{
        "entities": [
            {
                "components": [
                    { "type": "id", "data": "a" },
                    { "type": "transform", "data": { "position": [0.0, 0.0, 0.0] } },
                    { "type": "collider", "data": { "handler": "count" } },
                    { "type": "circle", "data": { "radius": 1.0 } }
                ],
                "systems": ["circle_collider"]
            },
            {
                "components": [
                    { "type": "id", "data": "b" },
                    { "type": "transform", "data": { "position": [1.5, 0.0, 0.0] } },
                    { "type": "collider" },
                    { "type": "circle", "data": { "radius": 1.0 } }
                ],
                "systems": ["circle_collider"]
            }
        ]
    }"#;

    /// Shares submissions with the test after the engine takes ownership
    struct SharedSink(Rc<RefCell<Vec<RenderSubmission>>>);

    impl RenderSink for SharedSink {
        fn submit(&mut self, submission: RenderSubmission) {
            self.0.borrow_mut().push(submission);
        }
    }

    fn engine_with_counter() -> (Engine, Rc<RefCell<u32>>) {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        engine
            .world_mut()
            .register_collision_handler("count", move |_world: &mut World, _me: Entity, _partner: Entity| {
                *counter.borrow_mut() += 1;
                Ok(())
            });
        (engine, hits)
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = EngineConfig::default();
        config.physics.passes = 0;
        assert!(matches!(Engine::new(config), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_stage_order() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        let order = Rc::new(RefCell::new(Vec::new()));
        for stage in FrameStage::ALL.into_iter().rev() {
            let order = Rc::clone(&order);
            engine.add_hook(stage, move |_world: &mut World, _dt: f32| {
                order.borrow_mut().push(stage);
                Ok(())
            });
        }

        engine.update(1.0 / 60.0).unwrap();

        assert_eq!(*order.borrow(), FrameStage::ALL.to_vec());
        assert_eq!(engine.frame_count(), 1);
    }

    #[test]
    fn test_physics_runs_before_later_stages() {
        let (mut engine, hits) = engine_with_counter();
        let scene = SceneDescription::from_json_str(BALLS).unwrap();
        engine.load_scene(&scene).unwrap();

        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        engine.add_hook(FrameStage::Transforms, move |world: &mut World, _dt: f32| {
            let a = world.get_entity("a")?;
            *sink.borrow_mut() = Some(world.get::<TransformComponent>(a)?.position_2d());
            Ok(())
        });

        engine.update(1.0 / 60.0).unwrap();

        assert_eq!(*seen.borrow(), Some(Vec2::new(-0.25, 0.0)));
        assert_eq!(*hits.borrow(), 2);
        assert_eq!(engine.last_physics_report().passes.len(), 2);
    }

    #[test]
    fn test_debug_sink_receives_outlines() {
        let (mut engine, _hits) = engine_with_counter();
        engine
            .load_scene(&SceneDescription::from_json_str(BALLS).unwrap())
            .unwrap();
        let submissions = Rc::new(RefCell::new(Vec::new()));
        engine.set_debug_sink(Box::new(SharedSink(Rc::clone(&submissions))));

        engine.update(1.0 / 60.0).unwrap();

        assert_eq!(submissions.borrow().len(), 2);
    }

    #[test]
    fn test_reload_scene_starts_from_a_clean_world() {
        let (mut engine, _hits) = engine_with_counter();
        let scene = SceneDescription::from_json_str(BALLS).unwrap();
        engine.load_scene(&scene).unwrap();
        engine.update(1.0 / 60.0).unwrap();

        let entities = engine.reload_scene(&scene).unwrap();

        assert_eq!(entities.iter().map(|e| e.id()).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(engine.world().entity_count(), 2);
        assert_eq!(engine.world().collision().collider_count(), 2);
        let a = engine.world().get_entity("a").unwrap();
        assert_eq!(
            engine.world().get::<TransformComponent>(a).unwrap().position_2d(),
            Vec2::new(0.0, 0.0)
        );
    }

    #[test]
    fn test_hook_error_stops_the_frame() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        let reached = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&reached);
        engine.add_hook(FrameStage::Input, |world: &mut World, _dt: f32| {
            world.get_entity("missing").map(|_| ())
        });
        engine.add_hook(FrameStage::Render, move |_world: &mut World, _dt: f32| {
            *flag.borrow_mut() = true;
            Ok(())
        });

        let err = engine.update(1.0 / 60.0).unwrap_err();

        assert!(matches!(err, EngineError::Ecs(EcsError::EntityNotFound { .. })));
        assert!(!*reached.borrow());
        assert_eq!(engine.frame_count(), 0);
    }
}
