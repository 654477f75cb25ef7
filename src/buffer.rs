//! Write targets for GPU-resident buffers.
//!
//! The instance and constants managers only ever need two things from a buffer:
//! its size and the ability to overwrite a byte range. [`BufferTarget`] captures
//! that contract. [`QueueBuffer`] forwards writes to a `wgpu::Queue`, while
//! [`HostBuffer`] keeps the bytes in memory so uploads can be inspected without
//! a device.

use crate::gpu::GpuContext;

/// A fixed-size buffer that accepts byte writes at an offset.
pub trait BufferTarget {
    /// Total size of the buffer in bytes.
    fn size(&self) -> u64;

    /// Overwrite `data.len()` bytes starting at `offset`.
    ///
    /// Callers guarantee `offset + data.len() <= self.size()`.
    fn write(&mut self, offset: u64, data: &[u8]);
}

/// A `wgpu::Buffer` written through the queue.
///
/// Writes are staged by the queue and land before the next submitted command
/// buffer executes, so a frame's uploads are always visible to its draw call.
#[derive(Debug, Clone)]
pub struct QueueBuffer {
    pub(crate) buffer: wgpu::Buffer,
    queue: wgpu::Queue,
}

impl QueueBuffer {
    /// Allocate a new buffer of `size` bytes with `COPY_DST` added to `usage`.
    pub fn new(gpu: &GpuContext, label: &str, size: u64, usage: wgpu::BufferUsages) -> Self {
        let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            queue: gpu.queue.clone(),
        }
    }

    /// The underlying wgpu buffer, for binding.
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

impl BufferTarget for QueueBuffer {
    fn size(&self) -> u64 {
        self.buffer.size()
    }

    fn write(&mut self, offset: u64, data: &[u8]) {
        self.queue.write_buffer(&self.buffer, offset, data);
    }
}

/// A zero-initialized buffer living in host memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostBuffer {
    bytes: Vec<u8>,
    writes: usize,
}

impl HostBuffer {
    pub fn new(size: u64) -> Self {
        Self {
            bytes: vec![0; size as usize],
            writes: 0,
        }
    }

    /// Current contents of the whole buffer.
    pub fn contents(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of writes issued so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl BufferTarget for HostBuffer {
    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn write(&mut self, offset: u64, data: &[u8]) {
        let start = offset as usize;
        self.bytes[start..start + data.len()].copy_from_slice(data);
        self.writes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_buffer_starts_zeroed() {
        let buffer = HostBuffer::new(16);
        assert_eq!(buffer.size(), 16);
        assert!(buffer.contents().iter().all(|&b| b == 0));
        assert_eq!(buffer.write_count(), 0);
    }

    #[test]
    fn host_buffer_write_at_offset() {
        let mut buffer = HostBuffer::new(8);
        buffer.write(2, &[1, 2, 3]);

        assert_eq!(buffer.contents(), &[0, 0, 1, 2, 3, 0, 0, 0]);
        assert_eq!(buffer.write_count(), 1);
    }
}
