//! Textured cube geometry.
//!
//! The cube spans -1..1 on every axis with four vertices per face, so each face
//! maps the full texture independently. Vertices carry only position and UV;
//! the instance transform supplies everything else.

use crate::gpu::GpuContext;

/// Indices in one cube: 12 triangles.
pub const CUBE_INDEX_COUNT: u32 = 36;

/// Position and texture coordinate of one cube vertex (20 bytes).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CubeVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl CubeVertex {
    /// Vertex buffer layout for slot 0: position (loc 0), uv (loc 1).
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<CubeVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };

    const fn new(position: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, uv }
    }
}

#[rustfmt::skip]
pub const CUBE_VERTICES: [CubeVertex; 24] = [
    // Front (-Z)
    CubeVertex::new([-1.0, -1.0, -1.0], [0.0, 1.0]),
    CubeVertex::new([-1.0,  1.0, -1.0], [0.0, 0.0]),
    CubeVertex::new([ 1.0,  1.0, -1.0], [1.0, 0.0]),
    CubeVertex::new([ 1.0, -1.0, -1.0], [1.0, 1.0]),
    // Bottom (-Y)
    CubeVertex::new([-1.0, -1.0, -1.0], [0.0, 1.0]),
    CubeVertex::new([-1.0, -1.0,  1.0], [0.0, 0.0]),
    CubeVertex::new([ 1.0, -1.0,  1.0], [1.0, 0.0]),
    CubeVertex::new([ 1.0, -1.0, -1.0], [1.0, 1.0]),
    // Left (-X)
    CubeVertex::new([-1.0, -1.0, -1.0], [0.0, 1.0]),
    CubeVertex::new([-1.0, -1.0,  1.0], [1.0, 1.0]),
    CubeVertex::new([-1.0,  1.0,  1.0], [1.0, 0.0]),
    CubeVertex::new([-1.0,  1.0, -1.0], [0.0, 0.0]),
    // Back (+Z)
    CubeVertex::new([-1.0, -1.0,  1.0], [1.0, 1.0]),
    CubeVertex::new([ 1.0, -1.0,  1.0], [0.0, 1.0]),
    CubeVertex::new([ 1.0,  1.0,  1.0], [0.0, 0.0]),
    CubeVertex::new([-1.0,  1.0,  1.0], [1.0, 0.0]),
    // Top (+Y)
    CubeVertex::new([-1.0,  1.0, -1.0], [0.0, 1.0]),
    CubeVertex::new([ 1.0,  1.0, -1.0], [1.0, 1.0]),
    CubeVertex::new([ 1.0,  1.0,  1.0], [1.0, 0.0]),
    CubeVertex::new([-1.0,  1.0,  1.0], [0.0, 0.0]),
    // Right (+X)
    CubeVertex::new([ 1.0, -1.0, -1.0], [0.0, 1.0]),
    CubeVertex::new([ 1.0, -1.0,  1.0], [1.0, 1.0]),
    CubeVertex::new([ 1.0,  1.0,  1.0], [1.0, 0.0]),
    CubeVertex::new([ 1.0,  1.0, -1.0], [0.0, 0.0]),
];

#[rustfmt::skip]
pub const CUBE_INDICES: [u32; CUBE_INDEX_COUNT as usize] = [
    2,  0,  1,    2,  3,  0,
    4,  6,  5,    4,  7,  6,
    8,  9,  10,   8,  10, 11,
    12, 13, 14,   12, 14, 15,
    16, 18, 17,   16, 19, 18,
    20, 22, 21,   20, 23, 22,
];

/// The cube's vertex and index buffers on the GPU.
#[derive(Debug)]
pub struct CubeMesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
}

impl CubeMesh {
    pub fn new(gpu: &GpuContext) -> Self {
        use wgpu::util::DeviceExt;

        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Cube Vertex Buffer"),
                contents: bytemuck::cast_slice(&CUBE_VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Cube Index Buffer"),
                contents: bytemuck::cast_slice(&CUBE_INDICES),
                usage: wgpu::BufferUsages::INDEX,
            });

        Self {
            vertex_buffer,
            index_buffer,
        }
    }
}
