//! Wireframe line sets.
//!
//! A line set is just a list of segment endpoints plus the flattening needed
//! to upload it into a storage buffer. The prism contributes its own edges
//! via [`ExclusionPrism::wire_lines`](crate::prism::ExclusionPrism::wire_lines);
//! the torus knot here is the scene's centerpiece shape.

use std::f32::consts::TAU;

use crate::Vec3;

/// A set of line segments renderable by the wireframe pass.
#[derive(Debug, Clone, PartialEq)]
pub struct WireLines {
    /// Segments as endpoint pairs.
    pub lines: Vec<(Vec3, Vec3)>,
}

impl WireLines {
    /// Build a line set from explicit segments.
    pub fn from_segments(lines: Vec<(Vec3, Vec3)>) -> Self {
        Self { lines }
    }

    /// Closed polyline along a (p, q) torus knot.
    ///
    /// The curve winds `p` times around the torus axis and `q` times through
    /// the hole, on a torus of the given major `radius` and `tube` radius.
    /// `segments` consecutive samples are joined end to end, closing back on
    /// the start.
    pub fn torus_knot(p: u32, q: u32, radius: f32, tube: f32, segments: u32) -> Self {
        let point = |t: f32| {
            let r = radius + tube * (q as f32 * t).cos();
            Vec3::new(
                r * (p as f32 * t).cos(),
                r * (p as f32 * t).sin(),
                tube * (q as f32 * t).sin(),
            )
        };

        let lines = (0..segments)
            .map(|i| {
                let t0 = i as f32 / segments as f32 * TAU;
                let t1 = (i + 1) as f32 / segments as f32 * TAU;
                (point(t0), point(t1))
            })
            .collect();
        Self { lines }
    }

    /// Number of segments.
    #[inline]
    pub fn line_count(&self) -> u32 {
        self.lines.len() as u32
    }

    /// Flatten to `[x0, y0, z0, x1, y1, z1]` per segment for GPU upload.
    pub fn to_vertices(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.lines.len() * 6);
        for (a, b) in &self.lines {
            data.extend_from_slice(&[a.x, a.y, a.z, b.x, b.y, b.z]);
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_torus_knot_is_closed() {
        let knot = WireLines::torus_knot(2, 3, 1.5, 0.4, 100);
        assert_eq!(knot.line_count(), 100);
        let first = knot.lines.first().unwrap();
        let last = knot.lines.last().unwrap();
        assert!((last.1 - first.0).length() < 1e-3);
    }

    #[test]
    fn test_torus_knot_stays_on_the_torus() {
        let knot = WireLines::torus_knot(2, 3, 1.5, 0.4, 64);
        for (a, b) in &knot.lines {
            for point in [a, b] {
                assert!(point.length() <= 1.5 + 0.4 + 1e-4);
            }
        }
    }

    #[test]
    fn test_segments_join_end_to_end() {
        let knot = WireLines::torus_knot(2, 3, 1.5, 0.4, 32);
        for pair in knot.lines.windows(2) {
            assert!((pair[0].1 - pair[1].0).length() < 1e-5);
        }
    }

    #[test]
    fn test_to_vertices_layout() {
        let set = WireLines::from_segments(vec![(Vec3::ZERO, Vec3::X)]);
        assert_eq!(set.to_vertices(), vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    }
}
