//! Window runner.
//!
//! Builds the window and GPU state, then drives the whole scene from the
//! redraw callback: advance the field, the starfield and the camera, upload
//! the frame's buffers, render, ask for the next redraw. Everything is torn
//! down by drop when the window closes.

use std::sync::Arc;

use glam::Mat4;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::camera::ParallaxCamera;
use crate::error::ViewerError;
use crate::field::{FieldConfig, ParticleField};
use crate::gpu::GpuState;
use crate::input::Pointer;
use crate::mesh::WireLines;
use crate::star::Starfield;
use crate::time::FrameClock;
use crate::Vec3;

const STAR_EXTENT: f32 = 100.0;
const KNOT_SPIN_X: f32 = 0.001;
const KNOT_SPIN_Y: f32 = 0.002;

/// Builder for the background window.
///
/// ```ignore
/// use plexfield::{FieldConfig, Viewer};
///
/// Viewer::new()
///     .with_config(FieldConfig::new().with_point_count(400))
///     .run()
///     .unwrap();
/// ```
pub struct Viewer {
    config: FieldConfig,
    title: String,
    star_count: u32,
}

impl Viewer {
    /// Create a viewer with the default field configuration.
    pub fn new() -> Self {
        Self {
            config: FieldConfig::default(),
            title: "plexfield".to_string(),
            star_count: 5000,
        }
    }

    /// Use the given field configuration.
    pub fn with_config(mut self, config: FieldConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the number of background stars.
    pub fn with_star_count(mut self, count: u32) -> Self {
        self.star_count = count;
        self
    }

    /// Open the window and run until it is closed.
    ///
    /// Returns an error when the event loop, the window or the GPU cannot be
    /// brought up; without a usable GPU the background simply does not run.
    pub fn run(self) -> Result<(), ViewerError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self);
        event_loop.run_app(&mut app)?;

        match app.init_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new()
    }
}

struct App {
    title: String,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    field: ParticleField,
    stars: Starfield,
    camera: ParallaxCamera,
    pointer: Pointer,
    clock: FrameClock,
    knot_rotation: (f32, f32),
    init_error: Option<ViewerError>,
}

impl App {
    fn new(viewer: Viewer) -> Self {
        let field = ParticleField::new(&viewer.config);
        let stars = Starfield::new(viewer.star_count, STAR_EXTENT, viewer.config.seed);

        Self {
            title: viewer.title,
            window: None,
            gpu: None,
            field,
            stars,
            camera: ParallaxCamera::default(),
            pointer: Pointer::new(1, 1),
            clock: FrameClock::new(),
            knot_rotation: (0.0, 0.0),
            init_error: None,
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = &mut self.gpu else { return };

        let (time, delta) = self.clock.update();
        self.field.advance();
        self.stars.advance();
        self.camera.advance();
        self.knot_rotation.0 += KNOT_SPIN_X;
        self.knot_rotation.1 += KNOT_SPIN_Y;

        let aspect = gpu.config.width as f32 / gpu.config.height.max(1) as f32;
        gpu.write_uniforms(self.camera.view_projection(aspect), time, delta);

        let positions: Vec<Vec3> = self.field.nodes().iter().map(|n| n.position).collect();
        gpu.write_nodes(&positions);
        gpu.write_links(&link_segments(&self.field));
        gpu.write_prism_model(Mat4::from_rotation_z(self.field.prism().rotation()));
        gpu.write_knot_model(
            Mat4::from_rotation_y(self.knot_rotation.1)
                * Mat4::from_rotation_x(self.knot_rotation.0),
        );
        gpu.write_star_model(Mat4::from_rotation_y(self.stars.rotation()));

        match gpu.render() {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost) => gpu.resize(winit::dpi::PhysicalSize {
                width: gpu.config.width,
                height: gpu.config.height,
            }),
            Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
            Err(e) => eprintln!("Render error: {:?}", e),
        }

        if self.clock.frame() % 60 == 0 {
            if let Some(window) = &self.window {
                window.set_title(&format!("{} - {:.0} fps", self.title, self.clock.fps()));
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                self.init_error = Some(err.into());
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.pointer.set_size(size.width, size.height);

        let config = self.field.config();
        let prism_lines = WireLines::from_segments(self.field.prism().wire_lines());
        let knot_lines = WireLines::torus_knot(2, 3, 1.5, 0.4, 200);

        let gpu = pollster::block_on(GpuState::new(
            window.clone(),
            config.point_count,
            config.point_count * config.link_cap,
            self.stars.positions(),
            &prism_lines,
            &knot_lines,
        ));

        match gpu {
            Ok(gpu) => {
                self.window = Some(window);
                self.gpu = Some(gpu);
            }
            Err(err) => {
                self.init_error = Some(err.into());
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                self.pointer.set_size(physical_size.width, physical_size.height);
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(physical_size);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer.set_cursor(position.x, position.y);
                self.camera.set_pointer(self.pointer.ndc());
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Flatten the field's link set into endpoint pairs for upload, computing the
/// depth-derived alpha for each segment.
fn link_segments(field: &ParticleField) -> Vec<[f32; 4]> {
    let mut data = Vec::with_capacity(field.connections().len() * 2);
    for conn in field.connections() {
        let a = field.nodes()[conn.a as usize].position;
        let b = field.nodes()[conn.b as usize].position;
        data.push([a.x, a.y, a.z, link_alpha(a.z, b.z)]);
        data.push([b.x, b.y, b.z, 0.0]);
    }
    data
}

/// Opacity from segment depth: segments near the camera plane read stronger,
/// far ones fade, with separate ramps on either side of the shell center.
fn link_alpha(z_a: f32, z_b: f32) -> f32 {
    let avg = (z_a + z_b) * 0.5;
    if avg > -3.0 {
        ((avg + 5.0) / 8.0).clamp(0.15, 0.3)
    } else {
        ((avg + 12.0) / 12.0).clamp(0.06, 0.18)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_alpha_ramps_with_depth() {
        assert!(link_alpha(0.0, 0.0) > link_alpha(-8.0, -8.0));
        assert!((link_alpha(3.0, 3.0) - 0.3).abs() < 1e-6);
        assert!((link_alpha(-12.0, -12.0) - 0.06).abs() < 1e-6);
    }

    #[test]
    fn test_link_segments_carry_alpha_on_first_endpoint() {
        let field = ParticleField::new(&FieldConfig::default());
        let data = link_segments(&field);
        assert_eq!(data.len(), field.connections().len() * 2);
        for pair in data.chunks_exact(2) {
            assert!(pair[0][3] > 0.0);
            assert_eq!(pair[1][3], 0.0);
        }
    }

    #[test]
    fn test_builder_overrides() {
        let viewer = Viewer::new()
            .with_title("demo")
            .with_star_count(100)
            .with_config(FieldConfig::new().with_point_count(10));
        assert_eq!(viewer.title, "demo");
        assert_eq!(viewer.star_count, 100);
        assert_eq!(viewer.config.point_count, 10);
    }
}
