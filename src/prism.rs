//! Exclusion prism geometry.
//!
//! The rotating pentagonal prism at the center of the scene. Particle
//! placement, per-frame reflection and connection rebuilding all test against
//! this volume, and the wireframe render pass draws the same edges at the same
//! rotation angle, so the hit test and the visible shape never drift apart.

use glam::{Vec2, Vec3};
use std::f32::consts::{FRAC_PI_2, TAU};

/// A regular polygon extruded along the Z axis, spinning about that axis.
///
/// Vertices are computed once at rotation zero with the first vertex at
/// -90 degrees; containment queries are inverse-rotated into that local frame
/// instead of re-deriving the vertex list every frame.
#[derive(Debug, Clone)]
pub struct ExclusionPrism {
    vertices: Vec<Vec2>,
    circumradius: f32,
    half_height: f32,
    rotation: f32,
}

impl ExclusionPrism {
    /// Interpolation samples used by [`segment_intersects`](Self::segment_intersects).
    const SEGMENT_STEPS: u32 = 30;

    /// Build a prism from a regular `sides`-gon of the given circumradius,
    /// extruded to `half_height` on both sides of the XY plane.
    pub fn new(sides: u32, circumradius: f32, half_height: f32) -> Self {
        let vertices = (0..sides)
            .map(|i| {
                let angle = i as f32 * TAU / sides as f32 - FRAC_PI_2;
                Vec2::new(angle.cos(), angle.sin()) * circumradius
            })
            .collect();

        Self {
            vertices,
            circumradius,
            half_height,
            rotation: 0.0,
        }
    }

    /// Circumradius of the polygon cross-section.
    #[inline]
    pub fn circumradius(&self) -> f32 {
        self.circumradius
    }

    /// Half the extrusion height along Z.
    #[inline]
    pub fn half_height(&self) -> f32 {
        self.half_height
    }

    /// Current rotation angle in radians.
    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Advance the rotation angle.
    pub fn spin(&mut self, delta: f32) {
        self.rotation += delta;
    }

    /// Whether `point` lies inside the extruded polygon.
    ///
    /// Crossing-number test in the rotation-corrected local frame. Points
    /// beyond the extrusion height are outside regardless of their XY
    /// coordinates.
    pub fn contains(&self, point: Vec3) -> bool {
        if point.z.abs() > self.half_height {
            return false;
        }

        let (sin, cos) = (-self.rotation).sin_cos();
        let local = Vec2::new(
            point.x * cos - point.y * sin,
            point.x * sin + point.y * cos,
        );

        let mut inside = false;
        let n = self.vertices.len();
        let mut j = n - 1;
        for i in 0..n {
            let vi = self.vertices[i];
            let vj = self.vertices[j];
            if (vi.y > local.y) != (vj.y > local.y)
                && local.x < (vj.x - vi.x) * (local.y - vi.y) / (vj.y - vi.y) + vi.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Whether the segment from `a` to `b` passes through the prism.
    ///
    /// Sampled interpolation rather than an analytic polygon intersection:
    /// a short chord clipping a thin sliver of the polygon can slip between
    /// samples. A closest-point-to-axis probe catches most near misses. Good
    /// enough for deciding which links to draw, nothing else.
    pub fn segment_intersects(&self, a: Vec3, b: Vec3) -> bool {
        if self.contains(a) || self.contains(b) {
            return true;
        }

        for i in 1..Self::SEGMENT_STEPS {
            let t = i as f32 / Self::SEGMENT_STEPS as f32;
            if self.contains(a.lerp(b, t)) {
                return true;
            }
        }

        // Near-miss probe: the point on the segment closest to the prism axis.
        let dir = (b - a).normalize_or_zero();
        let along = (-a).dot(dir).clamp(0.0, a.distance(b));
        self.contains(a + dir * along)
    }

    /// Edge list of the prism at rotation zero: both polygon faces plus the
    /// verticals joining them. The render pass applies the live rotation as a
    /// model transform.
    pub fn wire_lines(&self) -> Vec<(Vec3, Vec3)> {
        let n = self.vertices.len();
        let h = self.half_height;
        let at = |v: Vec2, z: f32| Vec3::new(v.x, v.y, z);

        let mut lines = Vec::with_capacity(n * 3);
        for i in 0..n {
            let v0 = self.vertices[i];
            let v1 = self.vertices[(i + 1) % n];
            lines.push((at(v0, h), at(v1, h)));
            lines.push((at(v0, -h), at(v1, -h)));
            lines.push((at(v0, h), at(v0, -h)));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pentagon() -> ExclusionPrism {
        ExclusionPrism::new(5, 3.5, 4.0)
    }

    #[test]
    fn test_center_is_contained() {
        assert!(pentagon().contains(Vec3::ZERO));
    }

    #[test]
    fn test_far_points_are_outside() {
        let prism = pentagon();
        assert!(!prism.contains(Vec3::new(20.0, 0.0, 0.0)));
        assert!(!prism.contains(Vec3::new(0.0, 20.0, 0.0)));
        assert!(!prism.contains(Vec3::new(0.0, 0.0, 20.0)));
    }

    #[test]
    fn test_height_bound_rejects_before_polygon_test() {
        let prism = pentagon();
        assert!(prism.contains(Vec3::new(0.0, 0.0, 3.9)));
        assert!(!prism.contains(Vec3::new(0.0, 0.0, 4.1)));
    }

    #[test]
    fn test_rotation_moves_the_boundary() {
        let mut prism = pentagon();
        // The rotation-zero layout puts a vertex at -90 degrees, so along -Y
        // the polygon extends all the way to the circumradius.
        let probe = Vec3::new(0.0, -0.95 * prism.circumradius(), 0.0);
        assert!(prism.contains(probe));

        // Half a vertex step later -Y points at an edge midpoint, where the
        // boundary sits at the apothem (cos(pi/5) of the circumradius).
        prism.spin(TAU / 10.0);
        assert!(!prism.contains(probe));
    }

    #[test]
    fn test_segment_through_center_intersects() {
        let prism = pentagon();
        let a = Vec3::new(-6.0, 0.1, 0.0);
        let b = Vec3::new(6.0, -0.1, 0.0);
        assert!(prism.segment_intersects(a, b));
    }

    #[test]
    fn test_segment_far_from_prism_misses() {
        let prism = pentagon();
        let a = Vec3::new(-6.0, 8.0, 0.0);
        let b = Vec3::new(6.0, 8.0, 0.0);
        assert!(!prism.segment_intersects(a, b));
    }

    #[test]
    fn test_segment_with_contained_endpoint_intersects() {
        let prism = pentagon();
        assert!(prism.segment_intersects(Vec3::new(0.5, 0.5, 0.0), Vec3::new(9.0, 9.0, 0.0)));
    }

    #[test]
    fn test_segment_above_the_prism_misses() {
        let prism = pentagon();
        let a = Vec3::new(-6.0, 0.0, 5.0);
        let b = Vec3::new(6.0, 0.0, 5.0);
        assert!(!prism.segment_intersects(a, b));
    }

    #[test]
    fn test_wire_lines_cover_faces_and_verticals() {
        let prism = pentagon();
        assert_eq!(prism.wire_lines().len(), 15);
    }
}
