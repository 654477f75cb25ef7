//! Per-frame state and the plan for drawing one frame.
//!
//! [`FrameState`] is everything that carries over between frames: the
//! animation angle, elapsed time and the settings chosen in the overlay.
//! [`FramePlan::build`] turns that state into the data a frame needs (instance
//! transforms, frame constants, draw parameters) without touching the GPU.
//! The renderer then uploads and draws exactly what the plan says.

use glam::Mat4;
use std::f32::consts::FRAC_PI_4;
use std::ops::{Deref, DerefMut};

use crate::buffer::{BufferTarget, QueueBuffer};
use crate::camera::{self, CameraMode, SurfaceRotation};
use crate::cube::CUBE_INDEX_COUNT;
use crate::generator::{self, InstanceLayout};
use crate::gpu::GpuContext;
use crate::instance::InstanceRaw;

/// Animation angle at startup.
pub const START_ANGLE: f32 = FRAC_PI_4;
/// Radians added to the animation angle every frame.
pub const ANGLE_STEP: f32 = 0.01;

/// Linear gray the color target is cleared to.
pub const CLEAR_GRAY: f64 = 0.35;

/// Matrices the vertex shader reads once per frame.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameConstants {
    /// World to clip space, including the surface pre-transform.
    pub view_proj: [[f32; 4]; 4],
    /// Global rotation applied to the cube before its instance transform.
    pub rotation: [[f32; 4]; 4],
}

impl FrameConstants {
    pub const SIZE: u64 = std::mem::size_of::<FrameConstants>() as u64;

    pub fn new(view_proj: Mat4, rotation: Mat4) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            rotation: rotation.to_cols_array_2d(),
        }
    }
}

/// Uniform buffer holding [`FrameConstants`], written through a scoped mapping.
#[derive(Debug)]
pub struct ConstantsBuffer<B: BufferTarget = QueueBuffer> {
    target: B,
    staging: FrameConstants,
}

impl ConstantsBuffer<QueueBuffer> {
    pub fn new(gpu: &GpuContext) -> Self {
        Self::with_target(QueueBuffer::new(
            gpu,
            "VS Constants",
            FrameConstants::SIZE,
            wgpu::BufferUsages::UNIFORM,
        ))
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        self.target.buffer()
    }
}

impl<B: BufferTarget> ConstantsBuffer<B> {
    pub fn with_target(target: B) -> Self {
        debug_assert!(target.size() >= FrameConstants::SIZE);
        Self {
            target,
            staging: FrameConstants::default(),
        }
    }

    /// Map the constants for writing.
    ///
    /// The mapping starts zeroed, like a discarded buffer, and is written back
    /// when the returned guard drops, whichever way the scope is left.
    pub fn map_write(&mut self) -> ConstantsWriter<'_, B> {
        self.staging = FrameConstants::default();
        ConstantsWriter { buffer: self }
    }

    pub fn target(&self) -> &B {
        &self.target
    }
}

/// Write access to the frame constants. Unmaps (flushes) on drop.
pub struct ConstantsWriter<'a, B: BufferTarget> {
    buffer: &'a mut ConstantsBuffer<B>,
}

impl<B: BufferTarget> Deref for ConstantsWriter<'_, B> {
    type Target = FrameConstants;

    fn deref(&self) -> &FrameConstants {
        &self.buffer.staging
    }
}

impl<B: BufferTarget> DerefMut for ConstantsWriter<'_, B> {
    fn deref_mut(&mut self) -> &mut FrameConstants {
        &mut self.buffer.staging
    }
}

impl<B: BufferTarget> Drop for ConstantsWriter<'_, B> {
    fn drop(&mut self) {
        let staging = self.buffer.staging;
        self.buffer.target.write(0, bytemuck::bytes_of(&staging));
    }
}

/// State carried from one frame to the next.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameState {
    /// Shared rotation about Y applied to every instance.
    pub angle: f32,
    /// Seconds since startup.
    pub time: f32,
    pub camera_mode: CameraMode,
    pub layout: InstanceLayout,
    pub grid_size: u32,
    /// Global rotation rate in radians per second.
    pub spin_rate: f32,
    pub surface_rotation: SurfaceRotation,
}

impl Default for FrameState {
    fn default() -> Self {
        Self {
            angle: START_ANGLE,
            time: 0.0,
            camera_mode: CameraMode::Default,
            layout: InstanceLayout::Mobile,
            grid_size: 1,
            spin_rate: 0.0,
            surface_rotation: SurfaceRotation::Identity,
        }
    }
}

impl FrameState {
    /// Step the animation by one frame.
    pub fn advance(&mut self, dt: f32) {
        self.angle += ANGLE_STEP;
        self.time += dt;
    }

    /// Step the animation, then plan the frame at the new angle.
    pub fn next_frame(&mut self, dt: f32, aspect: f32) -> FramePlan {
        self.advance(dt);
        FramePlan::build(self, aspect)
    }

    /// Global rotation at the current time.
    pub fn rotation(&self) -> Mat4 {
        let t = self.time * self.spin_rate;
        Mat4::from_rotation_x(t) * Mat4::from_rotation_y(t)
    }
}

/// Parameters of the single indexed, instanced draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawIndexed {
    pub index_count: u32,
    pub instance_count: u32,
}

/// Everything needed to render one frame.
#[derive(Clone, Debug)]
pub struct FramePlan {
    pub instances: Vec<InstanceRaw>,
    pub view: Mat4,
    pub constants: FrameConstants,
    pub draw: DrawIndexed,
}

impl FramePlan {
    /// Build the plan for `state` on a surface with the given aspect ratio.
    pub fn build(state: &FrameState, aspect: f32) -> Self {
        let instances = generator::generate(state.layout, state.angle, state.grid_size);
        let view = state.camera_mode.view_matrix();
        let view_proj = camera::view_projection(state.camera_mode, aspect, state.surface_rotation);

        let draw = DrawIndexed {
            index_count: CUBE_INDEX_COUNT,
            instance_count: instances.len() as u32,
        };

        Self {
            instances,
            view,
            constants: FrameConstants::new(view_proj, state.rotation()),
            draw,
        }
    }
}

/// Convert one linear color channel to sRGB.
pub fn linear_to_srgb(c: f64) -> f64 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Background clear color.
///
/// When the shader gamma-corrects its own output (non-sRGB target), the clear
/// color must be pre-converted to match.
pub fn clear_color(convert_to_gamma: bool) -> wgpu::Color {
    let gray = if convert_to_gamma {
        linear_to_srgb(CLEAR_GRAY)
    } else {
        CLEAR_GRAY
    };
    wgpu::Color {
        r: gray,
        g: gray,
        b: gray,
        a: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::HostBuffer;
    use crate::generator::MOBILE_INSTANCE_COUNT;
    use glam::Vec3;

    fn read_back(buffer: &ConstantsBuffer<HostBuffer>) -> FrameConstants {
        bytemuck::pod_read_unaligned(&buffer.target().contents()[..FrameConstants::SIZE as usize])
    }

    fn host_constants() -> ConstantsBuffer<HostBuffer> {
        ConstantsBuffer::with_target(HostBuffer::new(FrameConstants::SIZE))
    }

    #[test]
    fn constants_layout() {
        assert_eq!(FrameConstants::SIZE, 128);
    }

    #[test]
    fn scoped_write_reads_back() {
        let mut buffer = host_constants();
        let view_proj = Mat4::perspective_lh(0.8, 1.5, 0.1, 100.0);
        let rotation = Mat4::from_rotation_y(0.4);

        {
            let mut constants = buffer.map_write();
            constants.view_proj = view_proj.to_cols_array_2d();
            constants.rotation = rotation.to_cols_array_2d();
        }

        let read = read_back(&buffer);
        assert_eq!(read, FrameConstants::new(view_proj, rotation));
        assert_eq!(buffer.target().write_count(), 1);
    }

    #[test]
    fn guard_flushes_on_early_return() {
        fn write_then_bail(buffer: &mut ConstantsBuffer<HostBuffer>, bail: bool) -> Option<()> {
            let mut constants = buffer.map_write();
            constants.view_proj = Mat4::from_scale(Vec3::splat(2.0)).to_cols_array_2d();
            if bail {
                return None;
            }
            constants.rotation = Mat4::IDENTITY.to_cols_array_2d();
            Some(())
        }

        let mut buffer = host_constants();
        assert!(write_then_bail(&mut buffer, true).is_none());

        let read = read_back(&buffer);
        assert_eq!(read.view_proj, Mat4::from_scale(Vec3::splat(2.0)).to_cols_array_2d());
        assert_eq!(read.rotation, [[0.0; 4]; 4]);
    }

    #[test]
    fn each_mapping_starts_discarded() {
        let mut buffer = host_constants();
        buffer.map_write().rotation = Mat4::IDENTITY.to_cols_array_2d();
        buffer.map_write().view_proj = Mat4::IDENTITY.to_cols_array_2d();

        let read = read_back(&buffer);
        assert_eq!(read.rotation, [[0.0; 4]; 4]);
        assert_eq!(read.view_proj, Mat4::IDENTITY.to_cols_array_2d());
    }

    #[test]
    fn advance_steps_angle_once() {
        let mut state = FrameState::default();
        state.advance(0.016);
        assert!((state.angle - (START_ANGLE + ANGLE_STEP)).abs() < 1e-6);
        assert!((state.time - 0.016).abs() < 1e-6);
    }

    #[test]
    fn first_frame_draws_one_step_past_start() {
        let mut state = FrameState::default();
        let plan = state.next_frame(0.016, 1.0);

        let expected = generator::mobile(START_ANGLE + ANGLE_STEP);
        assert_eq!(plan.instances, expected);
        assert_ne!(plan.instances, generator::mobile(START_ANGLE));
    }

    #[test]
    fn rotation_is_identity_without_spin() {
        let state = FrameState {
            time: 12.0,
            ..FrameState::default()
        };
        assert_eq!(state.rotation(), Mat4::IDENTITY);
    }

    #[test]
    fn plan_draws_every_generated_instance() {
        let state = FrameState::default();
        let plan = FramePlan::build(&state, 1.0);
        assert_eq!(plan.instances.len(), MOBILE_INSTANCE_COUNT);
        assert_eq!(
            plan.draw,
            DrawIndexed {
                index_count: 36,
                instance_count: MOBILE_INSTANCE_COUNT as u32,
            }
        );
    }

    #[test]
    fn plan_is_a_pure_function_of_state() {
        let state = FrameState {
            angle: 1.25,
            camera_mode: CameraMode::Side,
            ..FrameState::default()
        };
        let a = FramePlan::build(&state, 1.5);
        let b = FramePlan::build(&state, 1.5);
        assert_eq!(a.instances, b.instances);
        assert_eq!(a.constants, b.constants);
    }

    #[test]
    fn srgb_conversion() {
        assert_eq!(linear_to_srgb(0.0), 0.0);
        assert!((linear_to_srgb(1.0) - 1.0).abs() < 1e-9);
        assert!((linear_to_srgb(0.35) - 0.6262).abs() < 1e-3);
    }

    #[test]
    fn clear_color_follows_gamma_mode() {
        assert_eq!(clear_color(false).r, CLEAR_GRAY);
        assert!(clear_color(true).r > CLEAR_GRAY);
        assert_eq!(clear_color(true).a, 1.0);
    }
}
