//! Mouse-parallax camera.
//!
//! The camera never orbits; it sits a fixed distance out on Z and eases its
//! XY position toward a target derived from the pointer, always looking at
//! the world origin. Pointer updates land in the target immediately but show
//! up in the view over many frames of exponential smoothing.

use glam::{Mat4, Vec2};

use crate::Vec3;

/// Fixed-distance camera with pointer-driven parallax.
#[derive(Debug, Clone)]
pub struct ParallaxCamera {
    position: Vec3,
    pointer: Vec2,
    /// How far the camera strays from center at full pointer deflection.
    parallax: f32,
    /// Fraction of the remaining distance covered per frame.
    smoothing: f32,
    fovy: f32,
    znear: f32,
    zfar: f32,
}

impl ParallaxCamera {
    /// Create a camera at the given distance along +Z.
    pub fn new(distance: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, distance),
            pointer: Vec2::ZERO,
            parallax: 0.5,
            smoothing: 0.02,
            fovy: 75.0_f32.to_radians(),
            znear: 0.1,
            zfar: 1000.0,
        }
    }

    /// Record the latest pointer position in NDC ([-1, 1], +Y up). Applied
    /// gradually by subsequent [`advance`](Self::advance) calls.
    pub fn set_pointer(&mut self, ndc: Vec2) {
        self.pointer = ndc;
    }

    /// Ease one frame toward the pointer-derived target.
    pub fn advance(&mut self) {
        let goal = self.pointer * self.parallax;
        self.position.x += (goal.x - self.position.x) * self.smoothing;
        self.position.y += (goal.y - self.position.y) * self.smoothing;
    }

    /// Current world position.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// View matrix looking at the world origin.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Y)
    }

    /// Perspective projection for the given aspect ratio.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fovy, aspect, self.znear, self.zfar)
    }

    /// Combined view-projection for the given aspect ratio.
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

impl Default for ParallaxCamera {
    fn default() -> Self {
        Self::new(5.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converges_to_pointer_target() {
        let mut camera = ParallaxCamera::default();
        camera.set_pointer(Vec2::new(1.0, -1.0));
        for _ in 0..2000 {
            camera.advance();
        }
        // Target is pointer * parallax = (0.5, -0.5).
        assert!((camera.position().x - 0.5).abs() < 1e-3);
        assert!((camera.position().y + 0.5).abs() < 1e-3);
        assert_eq!(camera.position().z, 5.0);
    }

    #[test]
    fn test_pointer_applies_gradually() {
        let mut camera = ParallaxCamera::default();
        camera.set_pointer(Vec2::new(1.0, 0.0));
        camera.advance();
        // One frame covers only the smoothing fraction of the distance.
        assert!((camera.position().x - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_view_keeps_origin_ahead() {
        let mut camera = ParallaxCamera::default();
        camera.set_pointer(Vec2::new(-1.0, 1.0));
        for _ in 0..100 {
            camera.advance();
        }
        // Looking down -Z in view space regardless of parallax offset.
        let origin_in_view = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!(origin_in_view.z < 0.0);
        assert!(origin_in_view.x.abs() < 1e-4);
        assert!(origin_in_view.y.abs() < 1e-4);
    }
}
