use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use image::{ImageFormat, RgbaImage};

/// Encodes the raster as a PNG byte stream.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .context("failed encoding png byte stream")?;
    Ok(bytes)
}

pub fn write_png(image: &RgbaImage, path: &Path) -> Result<()> {
    let bytes = encode_png(image)?;
    fs::write(path, bytes).with_context(|| format!("failed writing {}", path.display()))
}

/// Default export name next to the manifest, matching the tool's
/// suggested `subtitle-export-<unix-ms>.png` pattern.
pub fn default_export_path(dir: &Path) -> PathBuf {
    dir.join(format!(
        "subtitle-export-{}.png",
        Utc::now().timestamp_millis()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn png_stream_decodes_to_exact_dimensions() {
        let raster = RgbaImage::from_pixel(400, 390, Rgba([12, 34, 56, 255]));
        let bytes = encode_png(&raster).expect("png should encode");
        let decoded = image::load_from_memory(&bytes).expect("png should decode");
        assert_eq!(decoded.width(), 400);
        assert_eq!(decoded.height(), 390);
    }

    #[test]
    fn default_export_name_has_the_suggested_pattern() {
        let path = default_export_path(Path::new("/tmp"));
        let name = path.file_name().and_then(|n| n.to_str()).expect("utf-8 name");
        assert!(name.starts_with("subtitle-export-"));
        assert!(name.ends_with(".png"));
        let stamp = &name["subtitle-export-".len()..name.len() - ".png".len()];
        assert!(stamp.chars().all(|ch| ch.is_ascii_digit()));
    }
}
