//! Background starfield.
//!
//! A static cloud of distant points, rotated slowly about Y as a whole. The
//! positions never change after generation; only the layer rotation advances.

use crate::spawn::SpawnContext;
use crate::Vec3;

/// Per-frame rotation of the star layer, in radians.
const DRIFT_RATE: f32 = 0.0001;

/// A fixed cloud of background points with a slow shared rotation.
pub struct Starfield {
    positions: Vec<Vec3>,
    rotation: f32,
}

impl Starfield {
    /// Scatter `count` stars uniformly in a cube of the given half-extent.
    pub fn new(count: u32, half_extent: f32, seed: u64) -> Self {
        let positions = (0..count)
            .map(|i| SpawnContext::new(seed, i).random_in_cube(half_extent))
            .collect();
        Self {
            positions,
            rotation: 0.0,
        }
    }

    /// Advance the layer rotation by one frame.
    pub fn advance(&mut self) {
        self.rotation += DRIFT_RATE;
    }

    /// Current rotation about Y.
    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Star positions, unrotated. The render pass applies the rotation as a
    /// model transform.
    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stars_fill_the_requested_extent() {
        let stars = Starfield::new(500, 100.0, 3);
        assert_eq!(stars.positions().len(), 500);
        for p in stars.positions() {
            assert!(p.x.abs() <= 100.0 && p.y.abs() <= 100.0 && p.z.abs() <= 100.0);
        }
    }

    #[test]
    fn test_same_seed_reproduces_layout() {
        let a = Starfield::new(100, 100.0, 11);
        let b = Starfield::new(100, 100.0, 11);
        assert_eq!(a.positions(), b.positions());
    }

    #[test]
    fn test_rotation_accumulates() {
        let mut stars = Starfield::new(1, 100.0, 0);
        for _ in 0..10 {
            stars.advance();
        }
        assert!((stars.rotation() - 10.0 * DRIFT_RATE).abs() < 1e-7);
    }
}
