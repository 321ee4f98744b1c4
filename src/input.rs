//! Pointer tracking.
//!
//! Keeps the latest cursor position normalized to NDC. The viewer feeds this
//! from raw window events; nothing else about the input stream matters to the
//! background, so no buttons or keys are tracked.

use glam::Vec2;

/// Latest pointer position in normalized device coordinates.
#[derive(Debug, Clone)]
pub struct Pointer {
    width: f32,
    height: f32,
    ndc: Vec2,
}

impl Pointer {
    /// Create a tracker for a surface of the given pixel size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1) as f32,
            height: height.max(1) as f32,
            ndc: Vec2::ZERO,
        }
    }

    /// Update the surface size the cursor is normalized against.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width.max(1) as f32;
        self.height = height.max(1) as f32;
    }

    /// Record a cursor position in surface pixels (origin top-left).
    pub fn set_cursor(&mut self, x: f64, y: f64) {
        self.ndc = Vec2::new(
            (x as f32 / self.width) * 2.0 - 1.0,
            -((y as f32 / self.height) * 2.0 - 1.0),
        );
    }

    /// Pointer position in NDC: [-1, 1] on both axes, +Y up.
    #[inline]
    pub fn ndc(&self) -> Vec2 {
        self.ndc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_maps_to_zero() {
        let mut pointer = Pointer::new(800, 600);
        pointer.set_cursor(400.0, 300.0);
        assert_eq!(pointer.ndc(), Vec2::ZERO);
    }

    #[test]
    fn test_corners_map_to_unit_range() {
        let mut pointer = Pointer::new(800, 600);
        pointer.set_cursor(0.0, 0.0);
        assert_eq!(pointer.ndc(), Vec2::new(-1.0, 1.0));
        pointer.set_cursor(800.0, 600.0);
        assert_eq!(pointer.ndc(), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_resize_rescales_subsequent_positions() {
        let mut pointer = Pointer::new(800, 600);
        pointer.set_size(400, 300);
        pointer.set_cursor(200.0, 150.0);
        assert_eq!(pointer.ndc(), Vec2::ZERO);
    }

    #[test]
    fn test_zero_size_does_not_divide_by_zero() {
        let mut pointer = Pointer::new(0, 0);
        pointer.set_cursor(5.0, 5.0);
        assert!(pointer.ndc().x.is_finite() && pointer.ndc().y.is_finite());
    }
}
