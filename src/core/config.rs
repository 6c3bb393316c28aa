use super::error::{Result, RuntimeError};

pub const DEFAULT_X: i32 = 16;
pub const DEFAULT_Y: i32 = 16;
pub const DEFAULT_WIDTH: u32 = 256;
pub const DEFAULT_HEIGHT: u32 = 256;
pub const DEFAULT_TITLE: &str = "Rapture Pixel Engine";

/// Window dimensions in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowDimensions {
    pub width: u32,
    pub height: u32,
}

impl WindowDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Window placement and title, fixed once handed to the runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub x: i32,
    pub y: i32,
    pub dimensions: WindowDimensions,
    pub title: String,
}

impl RuntimeConfig {
    pub fn new(x: i32, y: i32, width: u32, height: u32, title: impl Into<String>) -> Self {
        Self {
            x,
            y,
            dimensions: WindowDimensions::new(width, height),
            title: title.into(),
        }
    }

    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.dimensions = WindowDimensions::new(width, height);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Reject geometry no backend can honor
    pub fn validate(&self) -> Result<()> {
        let WindowDimensions { width, height } = self.dimensions;
        if width == 0 || height == 0 {
            return Err(RuntimeError::InvalidGeometry { width, height });
        }
        Ok(())
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_X, DEFAULT_Y, DEFAULT_WIDTH, DEFAULT_HEIGHT, DEFAULT_TITLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RuntimeConfig::default();
        assert_eq!((config.x, config.y), (16, 16));
        assert_eq!(config.dimensions, WindowDimensions::new(256, 256));
        assert_eq!(config.title, DEFAULT_TITLE);
    }

    #[test]
    fn builder_overrides_fields() {
        let config = RuntimeConfig::default()
            .with_position(-10, 40)
            .with_size(640, 480)
            .with_title("T");

        assert_eq!(config, RuntimeConfig::new(-10, 40, 640, 480, "T"));
    }

    #[test]
    fn zero_sized_windows_rejected() {
        for (width, height) in [(0, 480), (640, 0), (0, 0)] {
            let err = RuntimeConfig::default()
                .with_size(width, height)
                .validate()
                .unwrap_err();
            assert!(matches!(
                err,
                RuntimeError::InvalidGeometry { width: w, height: h } if w == width && h == height
            ));
        }
    }

    #[test]
    fn various_sizes_accepted() {
        for (width, height) in [(1, 1), (640, 480), (1920, 1080), (3840, 2160)] {
            assert!(RuntimeConfig::default().with_size(width, height).validate().is_ok());
        }
    }
}
