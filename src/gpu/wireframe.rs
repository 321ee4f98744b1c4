//! Wireframe line-set rendering.
//!
//! Each line set (the exclusion prism's edges, the torus knot) owns a static
//! storage buffer of segment endpoints and a params block whose model matrix
//! is rewritten every frame. The prism's matrix is built from the same
//! rotation angle its hit test uses.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use wgpu::util::DeviceExt;

use super::DEPTH_FORMAT;
use crate::mesh::WireLines;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct WireParams {
    model: [[f32; 4]; 4],
    color: [f32; 4],
    thickness: f32,
    _pad: [f32; 3],
}

/// Shared pipeline for all wireframe sets.
pub(crate) struct WirePipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

/// One uploaded line set.
pub(crate) struct WireSet {
    params_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
    line_count: u32,
    params: WireParams,
}

impl WirePipeline {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Wireframe Shader"),
            source: wgpu::ShaderSource::Wgsl(WIRE_SHADER.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Wireframe Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Wireframe Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Wireframe Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            bind_group_layout,
        }
    }

    /// Upload a line set. The geometry is static; only the model matrix
    /// changes afterwards.
    pub fn create_set(
        &self,
        device: &wgpu::Device,
        uniform_buffer: &wgpu::Buffer,
        lines: &WireLines,
        color: Vec4,
        thickness: f32,
    ) -> WireSet {
        let mesh_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Wireframe Mesh Buffer"),
            contents: bytemuck::cast_slice(&lines.to_vertices()),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let params = WireParams {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            color: color.to_array(),
            thickness,
            _pad: [0.0; 3],
        };
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Wireframe Params Buffer"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Wireframe Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: mesh_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        });

        WireSet {
            params_buffer,
            bind_group,
            pipeline: self.pipeline.clone(),
            line_count: lines.line_count(),
            params,
        }
    }
}

impl WireSet {
    /// Update the set's model transform.
    pub fn write_model(&self, queue: &wgpu::Queue, model: Mat4) {
        let params = WireParams {
            model: model.to_cols_array_2d(),
            ..self.params
        };
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&params));
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.line_count == 0 {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.draw(0..6, 0..self.line_count);
    }
}

const WIRE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    time: f32,
    delta_time: f32,
};

struct WireParams {
    model: mat4x4<f32>,
    color: vec4<f32>,
    thickness: f32,
};

@group(0) @binding(0) var<uniform> uniforms: Uniforms;
@group(0) @binding(1) var<storage, read> mesh_lines: array<f32>;
@group(0) @binding(2) var<uniform> params: WireParams;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @builtin(instance_index) instance_index: u32,
) -> VertexOutput {
    let base = instance_index * 6u;
    let p0 = vec3<f32>(mesh_lines[base], mesh_lines[base + 1u], mesh_lines[base + 2u]);
    let p1 = vec3<f32>(mesh_lines[base + 3u], mesh_lines[base + 4u], mesh_lines[base + 5u]);

    let world0 = (params.model * vec4<f32>(p0, 1.0)).xyz;
    let world1 = (params.model * vec4<f32>(p1, 1.0)).xyz;

    let line_dir = normalize(world1 - world0);
    var perp = cross(line_dir, vec3<f32>(0.0, 1.0, 0.0));
    if length(perp) < 0.001 {
        perp = cross(line_dir, vec3<f32>(1.0, 0.0, 0.0));
    }
    perp = normalize(perp) * params.thickness;

    var pos: vec3<f32>;
    switch vertex_index {
        case 0u: { pos = world0 - perp; }
        case 1u: { pos = world0 + perp; }
        case 2u: { pos = world1 - perp; }
        case 3u: { pos = world0 + perp; }
        case 4u: { pos = world1 - perp; }
        default: { pos = world1 + perp; }
    }

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(pos, 1.0);
    return out;
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return params.color;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shader_is_valid_wgsl() {
        let module = naga::front::wgsl::parse_str(WIRE_SHADER).expect("parse");
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .expect("validate");
    }
}
