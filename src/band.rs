use image::RgbaImage;

/// Top row of the source region the band samples. Clamped at 0 so a band
/// taller than the image never reads above the top edge.
pub fn sample_offset(source_h: u32, band_height: i32) -> i64 {
    (i64::from(source_h) - i64::from(band_height)).max(0)
}

/// Copies the bottom strip of `source` into a fresh raster of size
/// (source width, band height). When the image is shorter than the band,
/// the available rows are stretched vertically (nearest row) to fill the
/// full band height. A non-positive band height yields a zero-height
/// raster.
pub fn synthesize(source: &RgbaImage, band_height: i32) -> RgbaImage {
    let width = source.width();
    let height = band_height.max(0) as u32;
    let mut band = RgbaImage::new(width, height);
    if height == 0 || source.height() == 0 {
        return band;
    }

    let source_h = i64::from(source.height());
    let source_y = sample_offset(source.height(), band_height);
    let avail = source_h - source_y;

    for row in 0..i64::from(height) {
        let src_row = if avail >= i64::from(height) {
            source_y + row
        } else {
            source_y + row * avail / i64::from(height)
        };
        let src_row = src_row.min(source_h - 1) as u32;
        for x in 0..width {
            band.put_pixel(x, row as u32, *source.get_pixel(x, src_row));
        }
    }
    band
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |_, y| Rgba([y as u8, 0, 0, 255]))
    }

    #[test]
    fn sample_offset_clamps_at_zero() {
        assert_eq!(sample_offset(300, 80), 220);
        assert_eq!(sample_offset(50, 80), 0);
        assert_eq!(sample_offset(80, 80), 0);
    }

    #[test]
    fn band_copies_bottom_rows_exactly_when_tall_enough() {
        let source = gradient_image(8, 100);
        let band = synthesize(&source, 30);
        assert_eq!(band.dimensions(), (8, 30));
        for row in 0..30_u32 {
            assert_eq!(band.get_pixel(0, row), source.get_pixel(0, 70 + row));
        }
    }

    #[test]
    fn short_source_is_stretched_to_fill_band() {
        let source = gradient_image(4, 10);
        let band = synthesize(&source, 40);
        assert_eq!(band.dimensions(), (4, 40));
        // First destination row maps to the top of the image, last row to
        // the bottom; no read lands outside.
        assert_eq!(band.get_pixel(0, 0), source.get_pixel(0, 0));
        assert_eq!(band.get_pixel(0, 39), source.get_pixel(0, 9));
        // Monotone mapping.
        let mut previous = 0_u8;
        for row in 0..40_u32 {
            let value = band.get_pixel(0, row)[0];
            assert!(value >= previous);
            previous = value;
        }
    }

    #[test]
    fn non_positive_band_height_yields_empty_raster() {
        let source = gradient_image(4, 10);
        assert_eq!(synthesize(&source, 0).dimensions(), (4, 0));
        assert_eq!(synthesize(&source, -15).dimensions(), (4, 0));
    }

    #[test]
    fn band_width_always_matches_source() {
        let source = gradient_image(17, 9);
        assert_eq!(synthesize(&source, 200).width(), 17);
    }
}
