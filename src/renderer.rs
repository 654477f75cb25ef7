//! Instanced cube rendering.
//!
//! [`InstancedRenderer`] owns every GPU resource the mobile needs and turns a
//! [`FramePlan`] into GPU work:
//!
//! 1. [`prepare`](InstancedRenderer::prepare) uploads the plan's instance list
//!    and writes the frame constants through a scoped mapping.
//! 2. [`draw`](InstancedRenderer::draw) binds the cube at slot 0, the instance
//!    buffer at slot 1, the index buffer, the pipeline and both bind groups, and
//!    issues a single indexed draw over all instances.
//!
//! Both run before the command buffer holding the draw is submitted, so the
//! draw always reads the current frame's data.
//!
//! # Bind groups
//!
//! - **Group 0**: frame constants (view-projection and rotation), vertex stage
//! - **Group 1**: cube texture and sampler, fragment stage

use crate::cube::{CubeMesh, CubeVertex};
use crate::error::InstanceError;
use crate::frame::{self, ConstantsBuffer, DrawIndexed, FramePlan};
use crate::gpu::GpuContext;
use crate::instance::{InstanceBuffer, InstanceRaw};
use crate::texture::Texture;

/// Depth format used by the cube pass.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Renders the mobile with one instanced draw call.
pub struct InstancedRenderer {
    pipeline: wgpu::RenderPipeline,
    constants: ConstantsBuffer,
    constants_bind_group: wgpu::BindGroup,
    texture_bind_group: wgpu::BindGroup,
    instances: InstanceBuffer,
    cube: CubeMesh,
    depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
    convert_to_gamma: bool,
}

impl InstancedRenderer {
    /// Build the pipeline and allocate all buffers.
    ///
    /// The instance buffer is sized for `max_instances` transforms.
    pub fn new(
        gpu: &GpuContext,
        texture: &Texture,
        max_instances: usize,
    ) -> Result<Self, InstanceError> {
        let device = &gpu.device;
        let convert_to_gamma = gpu.convert_output_to_gamma();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Cube Instancing Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/cube_inst.wgsl").into()),
        });

        let constants = ConstantsBuffer::new(gpu);

        let constants_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Constants Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let constants_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Constants Bind Group"),
            layout: &constants_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: constants.buffer().as_entire_binding(),
            }],
        });

        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Texture Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Cube Texture Bind Group"),
            layout: &texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Cube Pipeline Layout"),
            bind_group_layouts: &[&constants_bind_group_layout, &texture_bind_group_layout],
            push_constant_ranges: &[],
        });

        let gamma_constants = [("CONVERT_TO_GAMMA", if convert_to_gamma { 1.0 } else { 0.0 })];

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Cube Instancing Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[CubeVertex::LAYOUT, InstanceRaw::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions {
                    constants: &gamma_constants,
                    ..Default::default()
                },
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                // Left-handed projection: outward faces wind clockwise on screen.
                front_face: wgpu::FrontFace::Cw,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let instances = InstanceBuffer::new(gpu, max_instances)?;
        let cube = CubeMesh::new(gpu);
        let depth_view = Self::create_depth_view(gpu);

        Ok(Self {
            pipeline,
            constants,
            constants_bind_group,
            texture_bind_group,
            instances,
            cube,
            depth_view,
            depth_size: (gpu.width(), gpu.height()),
            convert_to_gamma,
        })
    }

    fn create_depth_view(gpu: &GpuContext) -> wgpu::TextureView {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
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

    /// Recreate the depth buffer if the surface size changed.
    pub fn ensure_depth_size(&mut self, gpu: &GpuContext) {
        if self.depth_size != (gpu.width(), gpu.height()) {
            self.depth_view = Self::create_depth_view(gpu);
            self.depth_size = (gpu.width(), gpu.height());
        }
    }

    /// Upload the plan's instances and frame constants.
    pub fn prepare(&mut self, plan: &FramePlan) -> Result<(), InstanceError> {
        self.instances.upload(&plan.instances)?;

        let mut constants = self.constants.map_write();
        *constants = plan.constants;
        Ok(())
    }

    /// Begin the cube pass: clears color to gray and depth to 1.0.
    pub fn begin_pass<'a>(
        &self,
        encoder: &'a mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
    ) -> wgpu::RenderPass<'a> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Cube Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(frame::clear_color(self.convert_to_gamma)),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        })
    }

    /// Issue the instanced draw.
    ///
    /// `draw.instance_count` never exceeds what the last [`prepare`](Self::prepare)
    /// uploaded.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass, draw: DrawIndexed) {
        let instance_count = draw.instance_count.min(self.instances.len() as u32);
        if instance_count == 0 {
            return;
        }

        render_pass.set_vertex_buffer(0, self.cube.vertex_buffer.slice(..));
        render_pass.set_vertex_buffer(1, self.instances.buffer().slice(..));
        render_pass.set_index_buffer(self.cube.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.constants_bind_group, &[]);
        render_pass.set_bind_group(1, &self.texture_bind_group, &[]);

        render_pass.draw_indexed(0..draw.index_count, 0, 0..instance_count);
    }

    /// Instance buffer capacity.
    pub fn max_instances(&self) -> usize {
        self.instances.capacity()
    }
}
