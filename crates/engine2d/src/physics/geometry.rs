//! Intersection tests and overlap corrections
//!
//! Pure functions over world-space geometry. Nothing here touches the ECS.

use crate::foundation::math::{utils, Vec2};

/// Below this squared length a vector is treated as zero
const DEGENERATE_EPSILON: f32 = 1e-12;

/// Circle in world space (radius already scaled)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Center
    pub center: Vec2,
    /// Effective radius
    pub radius: f32,
}

impl Circle {
    /// Create a circle
    pub const fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Line segment in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Start point
    pub begin: Vec2,
    /// End point
    pub end: Vec2,
}

impl Segment {
    /// Create a segment
    pub const fn new(begin: Vec2, end: Vec2) -> Self {
        Self { begin, end }
    }

    /// `end - begin`
    pub fn direction(&self) -> Vec2 {
        self.end - self.begin
    }

    fn is_point(&self) -> bool {
        self.direction().norm_squared() <= DEGENERATE_EPSILON
    }
}

/// Whether two circles touch or overlap
pub fn circles_overlap(a: &Circle, b: &Circle) -> bool {
    (b.center - a.center).norm() <= a.radius + b.radius
}

/// Unit vector from `a` to `b`, `+x` when the centers coincide
pub fn separation_axis(a: Vec2, b: Vec2) -> Vec2 {
    let delta = b - a;
    if delta.norm_squared() <= DEGENERATE_EPSILON {
        Vec2::x()
    } else {
        delta.normalize()
    }
}

/// How far two overlapping circles have to move apart in total
pub fn circle_penetration(a: &Circle, b: &Circle) -> f32 {
    (a.radius + b.radius - (b.center - a.center).norm()).max(0.0)
}

/// Whether the segment crosses or touches the circle's boundary
///
/// Solves `|begin + t*d - center|^2 = r^2` for `t`; a contact needs a real
/// root inside `[0, 1]`. A segment lying wholly inside the circle has both
/// roots outside that range and does not count.
pub fn circle_segment_intersect(circle: &Circle, segment: &Segment) -> bool {
    if segment.is_point() {
        return (segment.begin - circle.center).norm() <= circle.radius;
    }

    let d = segment.direction();
    let f = segment.begin - circle.center;
    let a = d.dot(&d);
    let b = 2.0 * f.dot(&d);
    let c = f.dot(&f) - circle.radius * circle.radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return false;
    }

    let root = discriminant.sqrt();
    let t1 = (-b - root) / (2.0 * a);
    let t2 = (-b + root) / (2.0 * a);
    (0.0..=1.0).contains(&t1) || (0.0..=1.0).contains(&t2)
}

/// Displacement that moves the circle off the segment
///
/// Past either end the circle is pushed radially away from that endpoint;
/// otherwise along the segment normal on the circle's side. A center lying
/// exactly on the segment is pushed along the left normal.
pub fn circle_segment_correction(circle: &Circle, segment: &Segment) -> Vec2 {
    if segment.is_point() {
        return push_from_point(circle, segment.begin);
    }

    let d = segment.direction();
    let t = (circle.center - segment.begin).dot(&d) / d.norm_squared();
    if t < 0.0 {
        return push_from_point(circle, segment.begin);
    }
    if t > 1.0 {
        return push_from_point(circle, segment.end);
    }

    let normal = utils::left_normal(&d).normalize();
    let offset = (circle.center - segment.begin).dot(&normal);
    let depth = (circle.radius - offset.abs()).max(0.0);
    if offset < 0.0 {
        -normal * depth
    } else {
        normal * depth
    }
}

fn push_from_point(circle: &Circle, point: Vec2) -> Vec2 {
    let axis = separation_axis(point, circle.center);
    let depth = (circle.radius - (circle.center - point).norm()).max(0.0);
    axis * depth
}

/// Whether two segments intersect, including touching and collinear overlap
pub fn segments_intersect(a: &Segment, b: &Segment) -> bool {
    let r = a.direction();
    let s = b.direction();
    let cmp = b.begin - a.begin;

    let cmp_x_r = utils::cross(&cmp, &r);
    let cmp_x_s = utils::cross(&cmp, &s);
    let r_x_s = utils::cross(&r, &s);

    if cmp_x_r == 0.0 && r_x_s == 0.0 {
        // Collinear: intersect when the projections overlap on both axes.
        // b.begin on a's line alone is not enough; a crossing b still goes
        // through the parametric solve below.
        return ranges_overlap(a.begin.x, a.end.x, b.begin.x, b.end.x)
            && ranges_overlap(a.begin.y, a.end.y, b.begin.y, b.end.y);
    }

    if r_x_s == 0.0 {
        return false;
    }

    let inv = 1.0 / r_x_s;
    let t = cmp_x_s * inv;
    let u = cmp_x_r * inv;
    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

fn ranges_overlap(a0: f32, a1: f32, b0: f32, b1: f32) -> bool {
    a0.min(a1) <= b0.max(b1) && b0.min(b1) <= a0.max(a1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn seg(x0: f32, y0: f32, x1: f32, y1: f32) -> Segment {
        Segment::new(Vec2::new(x0, y0), Vec2::new(x1, y1))
    }

    #[test]
    fn test_circles_touching_count_as_overlap() {
        let a = Circle::new(Vec2::new(0.0, 0.0), 1.0);
        let b = Circle::new(Vec2::new(2.0, 0.0), 1.0);
        assert!(circles_overlap(&a, &b));
        assert_relative_eq!(circle_penetration(&a, &b), 0.0);

        let c = Circle::new(Vec2::new(2.01, 0.0), 1.0);
        assert!(!circles_overlap(&a, &c));
    }

    #[test]
    fn test_separation_axis_coincident_centers() {
        assert_eq!(separation_axis(Vec2::new(3.0, 3.0), Vec2::new(3.0, 3.0)), Vec2::x());
        let axis = separation_axis(Vec2::new(0.0, 0.0), Vec2::new(0.0, -4.0));
        assert_relative_eq!(axis, Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_tangent_segment_intersects() {
        let circle = Circle::new(Vec2::new(0.0, 1.0), 1.0);
        assert!(circle_segment_intersect(&circle, &seg(-5.0, 0.0, 5.0, 0.0)));
        assert!(!circle_segment_intersect(&circle, &seg(-5.0, -0.1, 5.0, -0.1)));
    }

    #[test]
    fn test_segment_inside_circle_does_not_intersect() {
        let circle = Circle::new(Vec2::new(0.0, 0.0), 10.0);
        assert!(!circle_segment_intersect(&circle, &seg(-1.0, 0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_segment_ending_inside_circle_intersects() {
        let circle = Circle::new(Vec2::new(0.0, 0.0), 1.0);
        assert!(circle_segment_intersect(&circle, &seg(0.0, 0.0, 5.0, 0.0)));
    }

    #[test]
    fn test_zero_length_segment_is_a_point() {
        let circle = Circle::new(Vec2::new(0.0, 0.0), 1.0);
        assert!(circle_segment_intersect(&circle, &seg(0.5, 0.0, 0.5, 0.0)));
        assert!(!circle_segment_intersect(&circle, &seg(2.0, 0.0, 2.0, 0.0)));
    }

    #[test]
    fn test_correction_along_normal() {
        let circle = Circle::new(Vec2::new(0.0, 0.5), 1.0);
        let correction = circle_segment_correction(&circle, &seg(-5.0, 0.0, 5.0, 0.0));
        assert_relative_eq!(correction, Vec2::new(0.0, 0.5));

        let below = Circle::new(Vec2::new(0.0, -0.25), 1.0);
        let correction = circle_segment_correction(&below, &seg(-5.0, 0.0, 5.0, 0.0));
        assert_relative_eq!(correction, Vec2::new(0.0, -0.75));
    }

    #[test]
    fn test_correction_center_on_segment_uses_left_normal() {
        let circle = Circle::new(Vec2::new(0.0, 0.0), 1.0);
        let correction = circle_segment_correction(&circle, &seg(-5.0, 0.0, 5.0, 0.0));
        assert_relative_eq!(correction, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_correction_past_endpoint_is_radial() {
        let circle = Circle::new(Vec2::new(5.5, 0.0), 1.0);
        let correction = circle_segment_correction(&circle, &seg(-5.0, 0.0, 5.0, 0.0));
        assert_relative_eq!(correction, Vec2::new(0.5, 0.0));
    }

    #[test]
    fn test_correction_before_begin_is_radial() {
        let circle = Circle::new(Vec2::new(-5.5, 0.5), 1.0);
        let correction = circle_segment_correction(&circle, &seg(-5.0, 0.0, 5.0, 0.0));

        let away = circle.center - Vec2::new(-5.0, 0.0);
        let depth = 1.0 - away.norm();
        assert_relative_eq!(correction, away.normalize() * depth, epsilon = 1e-6);
        assert_relative_eq!(correction, Vec2::new(-0.207_106_8, 0.207_106_8), epsilon = 1e-5);
    }

    #[test]
    fn test_crossing_segments() {
        assert!(segments_intersect(&seg(0.0, 0.0, 1.0, 1.0), &seg(0.0, 1.0, 1.0, 0.0)));
        assert!(segments_intersect(&seg(-1.0, 0.0, 1.0, 0.0), &seg(0.0, -1.0, 0.0, 1.0)));
    }

    #[test]
    fn test_parallel_segments() {
        assert!(!segments_intersect(&seg(0.0, 0.0, 1.0, 0.0), &seg(0.0, 2.0, 1.0, 2.0)));
    }

    #[test]
    fn test_collinear_overlap_and_gap() {
        assert!(segments_intersect(&seg(0.0, 0.0, 2.0, 0.0), &seg(1.0, 0.0, 3.0, 0.0)));
        assert!(!segments_intersect(&seg(0.0, 0.0, 1.0, 0.0), &seg(2.0, 0.0, 3.0, 0.0)));
    }

    #[test]
    fn test_collinear_touching_endpoint() {
        assert!(segments_intersect(&seg(0.0, 0.0, 1.0, 0.0), &seg(1.0, 0.0, 2.0, 0.0)));
    }

    #[test]
    fn test_segments_meeting_at_endpoint() {
        assert!(segments_intersect(&seg(0.0, 0.0, 1.0, 1.0), &seg(1.0, 1.0, 2.0, 0.0)));
    }

    #[test]
    fn test_collinear_vertical_segments() {
        assert!(segments_intersect(&seg(0.0, 0.0, 0.0, 2.0), &seg(0.0, 1.0, 0.0, 3.0)));
        assert!(!segments_intersect(&seg(0.0, 0.0, 0.0, 1.0), &seg(0.0, 2.0, 0.0, 3.0)));
    }

    #[test]
    fn test_segment_starting_on_other_line() {
        // b.begin lies on a's infinite line but beyond its end
        assert!(!segments_intersect(&seg(0.0, 0.0, 1.0, 0.0), &seg(2.0, 0.0, 2.0, 1.0)));
        assert!(segments_intersect(&seg(0.0, 0.0, 1.0, 0.0), &seg(0.5, 0.0, 0.5, 1.0)));
    }

    #[test]
    fn test_start_on_line_but_not_parallel_is_not_collinear() {
        // b.begin sits on a's line and the x projections overlap, but b
        // leaves the line and never reaches a
        assert!(!segments_intersect(&seg(0.0, 0.0, 1.0, 0.0), &seg(2.0, 0.0, -1.0, 1.0)));
    }

    #[test]
    fn test_non_crossing_segments() {
        assert!(!segments_intersect(&seg(0.0, 0.0, 1.0, 0.0), &seg(2.0, -1.0, 2.0, 1.0)));
    }
}
