//! Scene demo application
//!
//! Loads a small arena scene, moves the balls with a velocity component and
//! lets the collision engine keep them inside the walls. Runs headless for a
//! fixed number of frames and logs contacts.

use engine2d::config::ConfigFormat;
use engine2d::ecs::SerdeAllocator;
use engine2d::foundation::logging;
use engine2d::prelude::*;
use serde::Deserialize;

const ARENA: &str = include_str!("../scenes/arena.json");
const ENGINE_CONFIG: &str = include_str!("../engine.toml");
const FRAMES: u32 = 120;
const DELTA_TIME: f32 = 1.0 / 60.0;

/// Planar velocity in units per second
#[derive(Debug, Clone, Copy, Deserialize)]
struct Velocity {
    x: f32,
    y: f32,
}

impl Component for Velocity {
    const NAME: &'static str = "velocity";
}

/// Debug sink that logs collider outlines and keeps only a running count
#[derive(Debug, Default)]
struct OutlineLog {
    drawn: u64,
}

impl RenderSink for OutlineLog {
    fn submit(&mut self, submission: RenderSubmission) {
        self.drawn += 1;
        log::trace!(
            "Outline {} with {}: {:?}",
            submission.vertex_array,
            submission.pipeline,
            submission.model.column(3)
        );
    }
}

/// Integrate every velocity into its transform
fn apply_velocities(world: &mut World, delta_time: f32) -> EcsResult<()> {
    let moving: Vec<Entity> = world.components().entities_with(Velocity::NAME).collect();
    for entity in moving {
        let velocity = *world.get::<Velocity>(entity)?;
        world
            .get_mut::<TransformComponent>(entity)?
            .translate(Vec2::new(velocity.x, velocity.y) * delta_time);
    }
    Ok(())
}

/// Send the ball back the way it came
fn bounce(world: &mut World, me: Entity, _partner: Entity) -> EcsResult<()> {
    let velocity = world.get_mut::<Velocity>(me)?;
    velocity.x = -velocity.x;
    velocity.y = -velocity.y;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_level(log::LevelFilter::Info);

    log::info!("Starting scene demo");

    let config = EngineConfig::from_str_as(ENGINE_CONFIG, ConfigFormat::Toml)?;
    let mut engine = Engine::new(config)?;
    let world = engine.world_mut();
    world.set_component_handlers(Velocity::NAME, Box::new(SerdeAllocator::<Velocity>::new()));
    world.register_collision_handler("bounce", bounce);
    world.register_collision_handler("report", |world: &mut World, me: Entity, partner: Entity| {
        let name = world
            .get::<IdComponent>(partner)
            .map_or_else(|_| partner.to_string(), |id| id.as_str().to_string());
        log::info!("{} touched by {}", me, name);
        Ok(())
    });

    engine.add_hook(FrameStage::Input, apply_velocities);
    engine.set_debug_sink(Box::new(OutlineLog::default()));

    let scene = SceneDescription::from_json_str(ARENA)?;
    let entities = engine.load_scene(&scene)?;
    log::info!("Loaded {} entities", entities.len());

    for _ in 0..FRAMES {
        engine.update(DELTA_TIME)?;
        let report = engine.last_physics_report();
        if report.handler_calls > 0 {
            log::debug!(
                "Frame {}: {} handler calls",
                engine.frame_count(),
                report.handler_calls
            );
        }
    }

    for name in ["red", "blue"] {
        let entity = engine.world().get_entity(name)?;
        let position = engine.world().get::<TransformComponent>(entity)?.position_2d();
        log::info!("{} ended at ({:.2}, {:.2})", name, position.x, position.y);
    }

    // Reloading resets ids and positions
    engine.reload_scene(&scene)?;
    log::info!(
        "Reloaded scene: {} entities, {} colliders",
        engine.world().entity_count(),
        engine.world().collision().collider_count()
    );

    log::info!("Scene demo finished after {} frames", FRAMES);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_log_counts_without_storing() {
        let mut sink = OutlineLog::default();
        for _ in 0..3 {
            sink.submit(RenderSubmission {
                vertex_array: "debug_circle".to_string(),
                pipeline: "debug_lines".to_string(),
                model: Mat4::identity(),
            });
        }
        assert_eq!(sink.drawn, 3);
    }

    #[test]
    fn test_bounce_reverses_velocity() {
        let mut world = World::new();
        world.set_component_handlers(Velocity::NAME, Box::new(SerdeAllocator::<Velocity>::new()));
        let ball = world.create_entity();
        let wall = world.create_entity();
        world.insert(ball, Velocity { x: 1.0, y: -2.0 }).unwrap();

        bounce(&mut world, ball, wall).unwrap();

        let velocity = world.get::<Velocity>(ball).unwrap();
        assert_eq!((velocity.x, velocity.y), (-1.0, 2.0));
    }
}
