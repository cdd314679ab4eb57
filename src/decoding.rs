use std::path::Path;

use anyhow::{Context, Result};
use image::{ImageReader, RgbaImage};

/// Immutable decoded bitmap. Replaced wholesale on a new load; never
/// mutated by a render pass.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: RgbaImage,
}

impl SourceImage {
    pub fn open(path: &Path) -> Result<Self> {
        let decoded = ImageReader::open(path)
            .with_context(|| format!("failed opening {}", path.display()))?
            .decode()
            .with_context(|| format!("failed decoding {}", path.display()))?;
        Ok(Self {
            pixels: decoded.to_rgba8(),
        })
    }

    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}
