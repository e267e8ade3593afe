//! Transform component for the ECS system
//!
//! Pure data: where an entity sits in the XY plane, how it is scaled, and how
//! it is rotated for rendering. Collision geometry uses position and scale
//! only.

use crate::ecs::Component;
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// ECS Transform component
///
/// ```json
/// { "position": [1.0, 2.0, 0.0], "scale": [2.0, 2.0, 1.0], "rotation": 45.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformComponent {
    /// World space position; z is a draw-order depth and ignored by collision
    pub position: Vec3,

    /// Per-axis scale factors
    pub scale: Vec3,

    /// Rotation around Z in degrees
    pub rotation: f32,
}

impl Component for TransformComponent {
    const NAME: &'static str = "transform";
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            rotation: 0.0,
        }
    }
}

impl TransformComponent {
    /// Create from a planar position
    pub fn from_xy(x: f32, y: f32) -> Self {
        Self {
            position: Vec3::new(x, y, 0.0),
            ..Default::default()
        }
    }

    /// Builder pattern: Set scale (uniform in x and y)
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::new(scale, scale, 1.0);
        self
    }

    /// Builder pattern: Set rotation in degrees
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    /// Position projected onto the XY plane
    pub fn position_2d(&self) -> Vec2 {
        self.position.xy()
    }

    /// Move by a planar offset, leaving depth untouched
    pub fn translate(&mut self, offset: Vec2) {
        self.position.x += offset.x;
        self.position.y += offset.y;
    }

    /// Map a local collider point to world space (scale, then translate)
    pub fn world_point(&self, local: &Vec2) -> Vec2 {
        self.position_2d() + local.component_mul(&self.scale.xy())
    }

    /// Model matrix for rendering (TRS order)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * Mat4::rotation_z(utils::deg_to_rad(self.rotation))
            * Mat4::new_nonuniform_scaling(&self.scale)
    }
}
