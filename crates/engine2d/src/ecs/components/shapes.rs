//! Collider shape components
//!
//! Geometry is given in the owning entity's local space. The collision engine
//! maps points through the entity's [`TransformComponent`] each pass.
//!
//! [`TransformComponent`]: super::TransformComponent

use crate::ecs::Component;
use crate::foundation::math::Vec2;
use serde::{Deserialize, Serialize};

/// Circle collider shape; the effective radius is `radius * transform.scale.x`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleComponent {
    /// Unscaled radius
    pub radius: f32,
}

impl Component for CircleComponent {
    const NAME: &'static str = "circle";
}

/// Line segment collider shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineComponent {
    /// Local start point
    pub begin: Vec2,
    /// Local end point
    pub end: Vec2,
}

impl Component for LineComponent {
    const NAME: &'static str = "line";
}

/// Polyline / polygon collider shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonComponent {
    /// Local vertices in order
    pub points: Vec<Vec2>,

    /// Close the shape with an edge from the last point back to the first
    #[serde(default)]
    pub wrap: bool,
}

impl Component for PolygonComponent {
    const NAME: &'static str = "polygon";
}

impl PolygonComponent {
    /// Consecutive vertex pairs, plus the closing edge when `wrap` is set
    pub fn edges(&self) -> Vec<(Vec2, Vec2)> {
        let mut edges: Vec<_> = self
            .points
            .windows(2)
            .map(|pair| (pair[0], pair[1]))
            .collect();
        if self.wrap && self.points.len() > 2 {
            if let (Some(&last), Some(&first)) = (self.points.last(), self.points.first()) {
                edges.push((last, first));
            }
        }
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square(wrap: bool) -> PolygonComponent {
        PolygonComponent {
            points: vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ],
            wrap,
        }
    }

    #[test]
    fn test_open_polygon_edges() {
        assert_eq!(square(false).edges().len(), 3);
    }

    #[test]
    fn test_wrapped_polygon_edges() {
        let edges = square(true).edges();
        assert_eq!(edges.len(), 4);
        assert_eq!(edges[3], (Vec2::new(0.0, 1.0), Vec2::new(0.0, 0.0)));
    }

    #[test]
    fn test_two_point_polygon_never_wraps() {
        let polygon = PolygonComponent {
            points: vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)],
            wrap: true,
        };
        assert_eq!(polygon.edges().len(), 1);
    }

    #[test]
    fn test_deserialize_line() {
        let line: LineComponent =
            serde_json::from_value(json!({ "begin": [-5.0, 0.0], "end": [5.0, 0.0] })).unwrap();
        assert_eq!(line.begin, Vec2::new(-5.0, 0.0));
        assert_eq!(line.end, Vec2::new(5.0, 0.0));
    }
}
