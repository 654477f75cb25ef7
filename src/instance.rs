//! Per-instance data and the instance buffer that holds it.
//!
//! Each instance is a single column-major 4x4 model matrix. The vertex shader
//! receives it as four `vec4<f32>` attributes at locations 2–5, stepped once per
//! instance, and rebuilds the matrix from them.
//!
//! [`InstanceBuffer`] owns a buffer allocated once for the maximum instance
//! count. Every frame the freshly generated list is serialized and written to
//! the start of the buffer; only the bytes for the current count are touched.

use glam::Mat4;

use crate::buffer::{BufferTarget, QueueBuffer};
use crate::error::InstanceError;
use crate::generator::MOBILE_INSTANCE_COUNT;
use crate::gpu::GpuContext;

/// One instance transform as uploaded to the GPU (64 bytes).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    /// Model matrix columns.
    pub model: [[f32; 4]; 4],
}

impl InstanceRaw {
    /// Size of one instance in bytes.
    pub const SIZE: u64 = std::mem::size_of::<InstanceRaw>() as u64;

    /// Vertex buffer layout for slot 1, stepped per instance.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: Self::SIZE,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x4,
            },
            wgpu::VertexAttribute {
                offset: 16,
                shader_location: 3,
                format: wgpu::VertexFormat::Float32x4,
            },
            wgpu::VertexAttribute {
                offset: 32,
                shader_location: 4,
                format: wgpu::VertexFormat::Float32x4,
            },
            wgpu::VertexAttribute {
                offset: 48,
                shader_location: 5,
                format: wgpu::VertexFormat::Float32x4,
            },
        ],
    };

    pub fn from_matrix(matrix: Mat4) -> Self {
        Self {
            model: matrix.to_cols_array_2d(),
        }
    }
}

/// Fixed-capacity store for per-instance transforms.
#[derive(Debug)]
pub struct InstanceBuffer<B: BufferTarget = QueueBuffer> {
    target: B,
    capacity: usize,
    len: usize,
}

impl InstanceBuffer<QueueBuffer> {
    /// Allocate a vertex buffer for `capacity` instances.
    pub fn new(gpu: &GpuContext, capacity: usize) -> Result<Self, InstanceError> {
        Self::check_capacity(capacity)?;
        let target = QueueBuffer::new(
            gpu,
            "Instance Data Buffer",
            capacity as u64 * InstanceRaw::SIZE,
            wgpu::BufferUsages::VERTEX,
        );
        log::info!(
            "instance buffer: {} instances, {} bytes",
            capacity,
            target.size()
        );
        Ok(Self {
            target,
            capacity,
            len: 0,
        })
    }

    /// The buffer to bind at the instance slot.
    pub fn buffer(&self) -> &wgpu::Buffer {
        self.target.buffer()
    }
}

impl<B: BufferTarget> InstanceBuffer<B> {
    /// Wrap an existing target. Its size sets the capacity.
    pub fn with_target(target: B) -> Result<Self, InstanceError> {
        let capacity = (target.size() / InstanceRaw::SIZE) as usize;
        Self::check_capacity(capacity)?;
        Ok(Self {
            target,
            capacity,
            len: 0,
        })
    }

    fn check_capacity(capacity: usize) -> Result<(), InstanceError> {
        if capacity < MOBILE_INSTANCE_COUNT {
            return Err(InstanceError::CapacityTooSmall {
                capacity,
                required: MOBILE_INSTANCE_COUNT,
            });
        }
        Ok(())
    }

    /// Serialize `instances` and write them to the start of the buffer.
    ///
    /// Exactly `instances.len() * 64` bytes are written. Anything past that
    /// keeps whatever an earlier, longer upload left behind; only the first
    /// [`len`](Self::len) instances are ever drawn.
    pub fn upload(&mut self, instances: &[InstanceRaw]) -> Result<(), InstanceError> {
        if instances.len() > self.capacity {
            return Err(InstanceError::CapacityExceeded {
                requested: instances.len(),
                capacity: self.capacity,
            });
        }

        if !instances.is_empty() {
            self.target.write(0, bytemuck::cast_slice(instances));
        }
        self.len = instances.len();
        Ok(())
    }

    /// Maximum number of instances the buffer holds.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of instances from the last upload.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn target(&self) -> &B {
        &self.target
    }
}
