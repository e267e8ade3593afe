//! ECS Components module
//!
//! Built-in components every world registers: placement, collision settings,
//! collider shapes, and the optional string id.

pub mod collider;
pub mod id;
pub mod shapes;
pub mod transform;

pub use collider::{ColliderComponent, CollisionFlags};
pub use id::IdComponent;
pub use shapes::{CircleComponent, LineComponent, PolygonComponent};
pub use transform::TransformComponent;
