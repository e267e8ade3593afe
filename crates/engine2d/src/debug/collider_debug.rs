//! Collider outline submissions
//!
//! The renderer is expected to hold two unit meshes: a circle of radius 1
//! around the origin and a segment from (0,0) to (1,0). Each collider becomes
//! one draw of one of those meshes with a model matrix that maps the unit
//! shape onto the collider's world-space geometry.

use crate::ecs::{EcsResult, World};
use crate::foundation::math::{Mat4, Mat4Ext, Vec2};
use crate::physics::geometry::Segment;

/// Vertex array holding the unit circle outline
pub const CIRCLE_VERTEX_ARRAY: &str = "debug_circle";
/// Vertex array holding the unit segment
pub const LINE_VERTEX_ARRAY: &str = "debug_line";
/// Flat-color line pipeline used for every collider outline
pub const DEBUG_PIPELINE: &str = "debug_lines";

/// One draw request: which mesh, which pipeline, where
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSubmission {
    /// Vertex array name
    pub vertex_array: String,
    /// Shader pipeline name
    pub pipeline: String,
    /// Model matrix
    pub model: Mat4,
}

impl RenderSubmission {
    fn circle(center: Vec2, radius: f32) -> Self {
        Self {
            vertex_array: CIRCLE_VERTEX_ARRAY.to_string(),
            pipeline: DEBUG_PIPELINE.to_string(),
            model: Mat4::model_2d(center, 0.0, Vec2::new(radius, radius)),
        }
    }

    fn segment(segment: &Segment) -> Self {
        let direction = segment.direction();
        Self {
            vertex_array: LINE_VERTEX_ARRAY.to_string(),
            pipeline: DEBUG_PIPELINE.to_string(),
            model: Mat4::model_2d(
                segment.begin,
                direction.y.atan2(direction.x),
                Vec2::new(direction.norm(), 1.0),
            ),
        }
    }
}

/// Consumer of render submissions
pub trait RenderSink {
    /// Queue one draw for this frame
    fn submit(&mut self, submission: RenderSubmission);
}

impl RenderSink for Vec<RenderSubmission> {
    fn submit(&mut self, submission: RenderSubmission) {
        self.push(submission);
    }
}

/// Outline submissions for every enabled collider, circles first, then
/// lines, then one submission per polygon edge
pub fn collider_debug_submissions(world: &World) -> EcsResult<Vec<RenderSubmission>> {
    let store = world.components();
    let collision = world.collision();
    let mut submissions = Vec::new();

    for data in collision.circle_colliders() {
        if let Some(circle) = data.resolve(store)? {
            submissions.push(RenderSubmission::circle(circle.shape.center, circle.shape.radius));
        }
    }
    for data in collision.line_colliders() {
        if let Some(line) = data.resolve(store)? {
            submissions.push(RenderSubmission::segment(&line.shape));
        }
    }
    for data in collision.polygon_colliders() {
        if let Some(polygon) = data.resolve(store)? {
            submissions.extend(polygon.shape.iter().map(RenderSubmission::segment));
        }
    }
    Ok(submissions)
}
