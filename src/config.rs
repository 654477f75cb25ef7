//! Application configuration.
//!
//! [`AppConfig`] can be built in code with builder methods or read from a TOML
//! file. Every key is optional:
//!
//! ```toml
//! title = "Instanced Mobile"
//! width = 1280
//! height = 720
//! max_grid_size = 32
//! grid_size = 32
//! layout = "mobile"     # or "grid"
//! camera_mode = 0       # 0 default, 1 front, 2 top, 3 side, 4 bottom
//! texture = "logo.png"  # omit for the built-in checker texture
//! spin_rate = 0.0
//! vsync = true
//! ```

use serde::Deserialize;
use std::path::Path;

use crate::camera::CameraMode;
use crate::error::ConfigError;
use crate::generator::{InstanceLayout, MOBILE_INSTANCE_COUNT};

/// Config file read from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "instanced-mobile.toml";

/// Smallest allowed `max_grid_size`: its cube must hold the mobile.
pub const MIN_GRID_SIZE: u32 = 3;

/// Largest allowed `max_grid_size`.
pub const MAX_GRID_SIZE_LIMIT: u32 = 64;

const _: () = assert!((MIN_GRID_SIZE as usize).pow(3) >= MOBILE_INSTANCE_COUNT);

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Instance buffer capacity is `max_grid_size³`.
    pub max_grid_size: u32,
    /// Grid size for the grid layout, clamped to `max_grid_size`.
    pub grid_size: u32,
    pub layout: InstanceLayout,
    pub camera_mode: i64,
    /// Image for the cube faces. `None` uses the built-in checker.
    pub texture: Option<String>,
    /// Global rotation rate in radians per second.
    pub spin_rate: f32,
    pub vsync: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Instanced Mobile".to_string(),
            width: 1280,
            height: 720,
            max_grid_size: 32,
            grid_size: 32,
            layout: InstanceLayout::Mobile,
            camera_mode: 0,
            texture: None,
            spin_rate: 0.0,
            vsync: true,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn max_grid_size(mut self, max_grid_size: u32) -> Self {
        self.max_grid_size = max_grid_size;
        self
    }

    pub fn grid_size(mut self, grid_size: u32) -> Self {
        self.grid_size = grid_size;
        self
    }

    pub fn layout(mut self, layout: InstanceLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn camera_mode(mut self, mode: CameraMode) -> Self {
        self.camera_mode = mode.index() as i64;
        self
    }

    pub fn texture(mut self, path: impl Into<String>) -> Self {
        self.texture = Some(path.into());
        self
    }

    pub fn spin_rate(mut self, spin_rate: f32) -> Self {
        self.spin_rate = spin_rate;
        self
    }

    pub fn vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&source)
    }

    /// Load from `path` if given, else from [`DEFAULT_CONFIG_FILE`] if it
    /// exists, else use defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::load(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size {}x{} must be non-zero",
                self.width, self.height
            )));
        }
        if !(MIN_GRID_SIZE..=MAX_GRID_SIZE_LIMIT).contains(&self.max_grid_size) {
            return Err(ConfigError::Invalid(format!(
                "max_grid_size {} must be between {} and {}",
                self.max_grid_size, MIN_GRID_SIZE, MAX_GRID_SIZE_LIMIT
            )));
        }
        if !self.spin_rate.is_finite() {
            return Err(ConfigError::Invalid("spin_rate must be finite".to_string()));
        }
        Ok(())
    }

    /// Number of instances the instance buffer is allocated for.
    ///
    /// Only meaningful for a validated config; saturates otherwise.
    pub fn max_instances(&self) -> usize {
        (self.max_grid_size as usize).saturating_pow(3)
    }

    /// `grid_size` clamped to `1..=max_grid_size`.
    pub fn effective_grid_size(&self) -> u32 {
        self.grid_size.clamp(1, self.max_grid_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_instances(), 32 * 32 * 32);
        assert_eq!(config.layout, InstanceLayout::Mobile);
    }

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(AppConfig::from_toml("").unwrap(), AppConfig::default());
    }

    #[test]
    fn parses_every_key() {
        let config = AppConfig::from_toml(
            r#"
            title = "Mobile"
            width = 800
            height = 600
            max_grid_size = 8
            grid_size = 5
            layout = "grid"
            camera_mode = 2
            texture = "logo.png"
            spin_rate = 0.5
            vsync = false
            "#,
        )
        .unwrap();

        assert_eq!(
            config,
            AppConfig::new()
                .title("Mobile")
                .size(800, 600)
                .max_grid_size(8)
                .grid_size(5)
                .layout(InstanceLayout::Grid)
                .camera_mode(CameraMode::Top)
                .texture("logo.png")
                .spin_rate(0.5)
                .vsync(false)
        );
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            AppConfig::from_toml("grid = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn rejects_small_capacity() {
        let err = AppConfig::from_toml("max_grid_size = 2").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn builder_is_held_to_the_same_limits() {
        let config = AppConfig::new().max_grid_size(MAX_GRID_SIZE_LIMIT + 1);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        assert!(AppConfig::new().max_grid_size(MAX_GRID_SIZE_LIMIT).validate().is_ok());
    }

    #[test]
    fn huge_grid_size_does_not_overflow_capacity() {
        let config = AppConfig::new().max_grid_size(u32::MAX);
        assert!(config.validate().is_err());
        assert_eq!(config.max_instances(), usize::MAX);
    }

    #[test]
    fn rejects_zero_window() {
        assert!(AppConfig::new().size(0, 600).validate().is_err());
    }

    #[test]
    fn grid_size_is_clamped_to_capacity() {
        let config = AppConfig::new().max_grid_size(4).grid_size(10);
        assert_eq!(config.effective_grid_size(), 4);
        assert_eq!(AppConfig::new().grid_size(0).effective_grid_size(), 1);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = AppConfig::load("does/not/exist.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
