//! Error types for initialization, asset loading and instance uploads.
//!
//! Invalid configuration and GPU or window failures are fatal for the demo: they
//! surface as [`InitError`]
//! and propagate out of [`run`](crate::run). Instance buffer errors exist so that
//! an oversized upload is rejected instead of writing past the buffer.

use thiserror::Error;

/// Failure while bringing up the window, surface or device.
#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
    #[error(transparent)]
    Texture(#[from] TextureError),
    #[error(transparent)]
    Instance(#[from] InstanceError),
}

/// Failure while loading the cube texture.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to load image '{path}': {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// Instance buffer bound violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InstanceError {
    #[error("upload of {requested} instances exceeds buffer capacity of {capacity}")]
    CapacityExceeded { requested: usize, capacity: usize },
    #[error("instance capacity {capacity} cannot hold the {required} mobile instances")]
    CapacityTooSmall { capacity: usize, required: usize },
}

/// Failure while reading or validating the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
