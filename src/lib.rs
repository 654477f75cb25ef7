//! # Instanced Mobile
//!
//! **A hanging mobile of textured cubes, drawn with a single instanced call.**
//!
//! Every frame the generator produces one model matrix per cube, the instance
//! buffer receives the whole list in one write, and the renderer issues one
//! `draw_indexed` over all instances. The cubes share a rotation angle that
//! advances a little each frame, so the whole mobile turns.
//!
//! ## Quick Start
//!
//! ```no_run
//! use instanced_mobile::*;
//!
//! fn main() -> Result<(), InitError> {
//!     run(AppConfig::new()
//!         .title("Mobile")
//!         .camera_mode(CameraMode::Top))
//! }
//! ```
//!
//! ## Headless frames
//!
//! Everything short of the GPU submission is plain data. [`FramePlan::build`]
//! turns a [`FrameState`] into the instance list, the frame constants and the
//! draw parameters, and [`InstanceBuffer`] can upload into a [`HostBuffer`]
//! instead of a GPU buffer:
//!
//! ```
//! use instanced_mobile::*;
//!
//! let plan = FramePlan::build(&FrameState::default(), 16.0 / 9.0);
//! let mut instances = InstanceBuffer::with_target(HostBuffer::new(64 * InstanceRaw::SIZE))?;
//! instances.upload(&plan.instances)?;
//! assert_eq!(plan.draw.instance_count as usize, MOBILE_INSTANCE_COUNT);
//! # Ok::<(), InstanceError>(())
//! ```

mod app;
mod buffer;
mod camera;
mod config;
mod cube;
mod error;
mod frame;
mod generator;
mod gpu;
mod input;
mod instance;
mod renderer;
mod texture;
mod ui;

pub use app::run;
pub use buffer::{BufferTarget, HostBuffer, QueueBuffer};
pub use camera::{CameraMode, SurfaceRotation, projection_matrix, view_projection};
pub use config::{AppConfig, DEFAULT_CONFIG_FILE, MAX_GRID_SIZE_LIMIT, MIN_GRID_SIZE};
pub use cube::{CUBE_INDEX_COUNT, CubeMesh, CubeVertex};
pub use error::{ConfigError, InitError, InstanceError, TextureError};
pub use frame::{
    ConstantsBuffer, ConstantsWriter, DrawIndexed, FrameConstants, FramePlan, FrameState,
    clear_color, linear_to_srgb,
};
pub use generator::{InstanceLayout, MOBILE_INSTANCE_COUNT};
pub use gpu::GpuContext;
pub use input::Input;
pub use instance::{InstanceBuffer, InstanceRaw};
pub use renderer::InstancedRenderer;
pub use texture::Texture;
pub use ui::{Color, Rect, SettingsPanel, UiPass, Widget};

// Re-export glam math types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};
