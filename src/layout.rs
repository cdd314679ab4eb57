//! Canvas dimension and text anchor arithmetic. Everything runs in i64 so
//! degenerate parameters (negative band heights, huge gaps) flow through
//! without panicking; clamping happens only at the raster boundary.

/// Raw canvas height before the allocation clamp. The first line sits on
/// the source image itself and adds no height.
pub fn canvas_height_raw(source_h: u32, band_height: i32, line_gap: i32, line_count: usize) -> i64 {
    let mut height = i64::from(source_h);
    if line_count > 1 {
        height += (line_count as i64 - 1) * (i64::from(band_height) + i64::from(line_gap));
    }
    height
}

/// Output canvas dimensions. Width always equals the source width; height
/// follows the band formula, clamped to at least 1 px for allocation.
pub fn canvas_size(
    source_w: u32,
    source_h: u32,
    band_height: i32,
    line_gap: i32,
    line_count: usize,
) -> (u32, u32) {
    let height = canvas_height_raw(source_h, band_height, line_gap, line_count)
        .clamp(1, i64::from(u32::MAX)) as u32;
    (source_w, height)
}

/// Top edge of the band slot for line `index` (index >= 1; line 0 has no
/// slot of its own, it sits over the source image's bottom region).
pub fn band_slot_y(source_h: u32, band_height: i32, line_gap: i32, index: usize) -> i64 {
    debug_assert!(index >= 1);
    i64::from(source_h)
        + (index as i64 - 1) * (i64::from(band_height) + i64::from(line_gap))
        + i64::from(line_gap)
}

/// Center/middle anchor for line `index`.
pub fn line_anchor(
    canvas_w: u32,
    source_h: u32,
    band_height: i32,
    line_gap: i32,
    index: usize,
) -> (f32, f32) {
    let center_x = canvas_w as f32 / 2.0;
    let half_band = band_height as f32 / 2.0;
    let center_y = if index == 0 {
        source_h as f32 - half_band
    } else {
        band_slot_y(source_h, band_height, line_gap, index) as f32 + half_band
    };
    (center_x, center_y)
}
