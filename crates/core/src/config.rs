use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use crate::error::{AppError, Result};
use dotenvy::dotenv;

/// Default canvas width in pixels.
pub const DEFAULT_CANVAS_WIDTH: u32 = 800;
/// Default canvas height in pixels.
pub const DEFAULT_CANVAS_HEIGHT: u32 = 600;
/// Upload ceiling used by the mockup service (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10_485_760;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub max_upload_bytes: u64,
    /// Font used for the placeholder hint. Without one only the pattern is drawn.
    pub placeholder_font: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file if it exists, ignore if it doesn't
        let _ = dotenv();

        let canvas_width = parse_var("MOCKUP_CANVAS_WIDTH")?.unwrap_or(DEFAULT_CANVAS_WIDTH);
        let canvas_height = parse_var("MOCKUP_CANVAS_HEIGHT")?.unwrap_or(DEFAULT_CANVAS_HEIGHT);
        let max_upload_bytes =
            parse_var("MOCKUP_MAX_UPLOAD_BYTES")?.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);
        let placeholder_font = env::var("MOCKUP_PLACEHOLDER_FONT")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Self::builder()
            .with_canvas_size(canvas_width, canvas_height)
            .with_max_upload_bytes(max_upload_bytes)
            .with_placeholder_font(placeholder_font)
            .build()
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Canvas size as floating point, the form the geometry works in.
    pub fn canvas_size(&self) -> (f64, f64) {
        (self.canvas_width as f64, self.canvas_height as f64)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            placeholder_font: None,
        }
    }
}

/// Builder for [`Config`], starting from the defaults.
#[derive(Clone, Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn with_canvas_size(mut self, width: u32, height: u32) -> Self {
        self.config.canvas_width = width;
        self.config.canvas_height = height;
        self
    }

    pub fn with_max_upload_bytes(mut self, max: u64) -> Self {
        self.config.max_upload_bytes = max;
        self
    }

    pub fn with_placeholder_font(mut self, font: Option<PathBuf>) -> Self {
        self.config.placeholder_font = font;
        self
    }

    pub fn build(self) -> Result<Config> {
        if self.config.canvas_width == 0 || self.config.canvas_height == 0 {
            return Err(AppError::config(format!(
                "Canvas must have a non-zero size, got {}x{}",
                self.config.canvas_width, self.config.canvas_height
            )));
        }
        if self.config.max_upload_bytes == 0 {
            return Err(AppError::config("MOCKUP_MAX_UPLOAD_BYTES must be greater than zero"));
        }
        Ok(self.config)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AppError::Config(format!("{} has an invalid value: {:?}", name, raw))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = Config::builder().build().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.canvas_size(), (800.0, 600.0));
    }

    #[test]
    fn test_builder_rejects_empty_canvas() {
        let result = Config::builder().with_canvas_size(0, 600).build();
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_builder_overrides() {
        let config = Config::builder()
            .with_canvas_size(1024, 768)
            .with_max_upload_bytes(512)
            .with_placeholder_font(Some(PathBuf::from("/tmp/font.ttf")))
            .build()
            .unwrap();
        assert_eq!(config.canvas_width, 1024);
        assert_eq!(config.canvas_height, 768);
        assert_eq!(config.max_upload_bytes, 512);
        assert!(config.placeholder_font.is_some());
    }
}
