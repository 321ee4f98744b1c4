//! GPU presentation layer.
//!
//! Owns the surface, device and the three render passes (point layers, link
//! segments, wireframe meshes). All scene state lives on the CPU; the viewer
//! writes the per-frame slices into the buffers here and calls
//! [`GpuState::render`].

mod links;
mod points;
mod wireframe;

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::error::GpuError;
use crate::mesh::WireLines;
use links::LinkPass;
use points::{PointLayer, PointPipeline};
use wireframe::{WirePipeline, WireSet};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const NODE_COLOR: Vec4 = Vec4::new(0.85, 0.85, 0.85, 0.8);
const NODE_SIZE: f32 = 0.008;
const STAR_COLOR: Vec4 = Vec4::new(0.8, 0.8, 0.8, 0.6);
const STAR_SIZE: f32 = 0.002;
const LINK_COLOR: Vec4 = Vec4::new(0.27, 0.27, 0.27, 1.0);
const PRISM_COLOR: Vec4 = Vec4::new(0.35, 0.35, 0.4, 0.9);
const KNOT_COLOR: Vec4 = Vec4::new(0.16, 0.16, 0.16, 0.35);
const WIRE_THICKNESS: f32 = 0.012;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    time: f32,
    delta_time: f32,
    _padding: [f32; 2],
}

/// GPU resources for the background scene.
pub(crate) struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    depth_texture: wgpu::TextureView,
    uniform_buffer: wgpu::Buffer,
    nodes: PointLayer,
    stars: PointLayer,
    link_pass: LinkPass,
    prism_wire: WireSet,
    knot_wire: WireSet,
}

impl GpuState {
    /// Acquire the GPU and build every pipeline and buffer the scene needs.
    ///
    /// `node_capacity` and `link_capacity` size the dynamic buffers; the star
    /// and wireframe geometry is uploaded once here and never rewritten.
    pub async fn new(
        window: Arc<Window>,
        node_capacity: u32,
        link_capacity: u32,
        star_positions: &[Vec3],
        prism_lines: &WireLines,
        knot_lines: &WireLines,
    ) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("plexfield device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = create_depth_texture(&device, &config);

        let uniforms = Uniforms {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            time: 0.0,
            delta_time: 0.0,
            _padding: [0.0; 2],
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let point_pipeline = PointPipeline::new(&device, surface_format);
        let nodes = point_pipeline.create_layer(
            &device,
            &uniform_buffer,
            node_capacity,
            NODE_COLOR,
            NODE_SIZE,
        );
        let mut stars = point_pipeline.create_layer(
            &device,
            &uniform_buffer,
            star_positions.len() as u32,
            STAR_COLOR,
            STAR_SIZE,
        );
        stars.write_positions(&queue, &pad_positions(star_positions));

        let link_pass = LinkPass::new(
            &device,
            &uniform_buffer,
            link_capacity,
            LINK_COLOR,
            surface_format,
        );

        let wire_pipeline = WirePipeline::new(&device, surface_format);
        let prism_wire = wire_pipeline.create_set(
            &device,
            &uniform_buffer,
            prism_lines,
            PRISM_COLOR,
            WIRE_THICKNESS,
        );
        let knot_wire = wire_pipeline.create_set(
            &device,
            &uniform_buffer,
            knot_lines,
            KNOT_COLOR,
            WIRE_THICKNESS,
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_texture,
            uniform_buffer,
            nodes,
            stars,
            link_pass,
            prism_wire,
            knot_wire,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = create_depth_texture(&self.device, &self.config);
        }
    }

    pub fn write_uniforms(&self, view_proj: Mat4, time: f32, delta_time: f32) {
        let uniforms = Uniforms {
            view_proj: view_proj.to_cols_array_2d(),
            time,
            delta_time,
            _padding: [0.0; 2],
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    /// Upload the live node positions for this frame.
    pub fn write_nodes(&mut self, positions: &[Vec3]) {
        self.nodes
            .write_positions(&self.queue, &pad_positions(positions));
    }

    /// Upload the link segments for this frame as endpoint pairs; the first
    /// endpoint's `w` carries the segment alpha.
    pub fn write_links(&mut self, segments: &[[f32; 4]]) {
        self.link_pass.write_segments(&self.queue, segments);
    }

    pub fn write_prism_model(&self, model: Mat4) {
        self.prism_wire.write_model(&self.queue, model);
    }

    pub fn write_knot_model(&self, model: Mat4) {
        self.knot_wire.write_model(&self.queue, model);
    }

    pub fn write_star_model(&self, model: Mat4) {
        self.stars.write_model(&self.queue, model);
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // Back-to-front: distant decoration first, then links, then the
            // node dots on top.
            self.stars.draw(&mut render_pass);
            self.knot_wire.draw(&mut render_pass);
            self.prism_wire.draw(&mut render_pass);
            self.link_pass.draw(&mut render_pass);
            self.nodes.draw(&mut render_pass);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn pad_positions(positions: &[Vec3]) -> Vec<[f32; 4]> {
    positions.iter().map(|p| [p.x, p.y, p.z, 1.0]).collect()
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
