//! Math utilities and types
//!
//! The engine simulates in the XY plane. Positions are stored as 3D vectors
//! so render code can keep a depth value, but every collision test ignores z.

pub use nalgebra::{Matrix4, Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Vec2};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Z component of the 3D cross product of two planar vectors
    pub fn cross(a: &Vec2, b: &Vec2) -> f32 {
        a.x * b.y - a.y * b.x
    }

    /// Counter-clockwise perpendicular of `v` (not normalized)
    pub fn left_normal(v: &Vec2) -> Vec2 {
        Vec2::new(-v.y, v.x)
    }
}

/// Extension trait for Mat4 with planar model-matrix helpers
pub trait Mat4Ext {
    /// Create a rotation matrix around the Z axis
    fn rotation_z(angle: f32) -> Mat4;

    /// Translate * rotate-about-Z * scale, the usual model matrix for a flat sprite
    fn model_2d(translation: Vec2, angle: f32, scale: Vec2) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn rotation_z(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), angle)
    }

    fn model_2d(translation: Vec2, angle: f32, scale: Vec2) -> Mat4 {
        Mat4::new_translation(&Vec3::new(translation.x, translation.y, 0.0))
            * Self::rotation_z(angle)
            * Mat4::new_nonuniform_scaling(&Vec3::new(scale.x, scale.y, 1.0))
    }
}
