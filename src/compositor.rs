use std::collections::HashMap;

use fontdue::layout::{
    CoordinateSystem, GlyphRasterConfig, HorizontalAlign, Layout, LayoutSettings, TextStyle,
    VerticalAlign, WrapStyle,
};
use fontdue::Font;
use image::RgbaImage;

use crate::layout;
use crate::schema::{Color, DrawParameters};

/// Paints the full output canvas: source image first, then one background
/// band per extra line, then every text line. Each step completes before
/// the next so later passes never sample partially drawn content.
pub fn composite(
    source: &RgbaImage,
    band: &RgbaImage,
    params: &DrawParameters,
    lines: &[&str],
    font: &Font,
) -> RgbaImage {
    let (canvas_w, canvas_h) = layout::canvas_size(
        source.width(),
        source.height(),
        params.band_height,
        params.line_gap,
        lines.len(),
    );
    let mut canvas = RgbaImage::new(canvas_w, canvas_h);

    paint_source(&mut canvas, source);

    for index in 1..lines.len() {
        let y = layout::band_slot_y(source.height(), params.band_height, params.line_gap, index);
        blit_band(&mut canvas, band, y);
    }

    let mut painter = TextPainter::new(font);
    for (index, line) in lines.iter().enumerate() {
        let (center_x, center_y) = layout::line_anchor(
            canvas_w,
            source.height(),
            params.band_height,
            params.line_gap,
            index,
        );
        painter.draw_line(&mut canvas, line, params, center_x, center_y);
    }

    canvas
}

fn paint_source(canvas: &mut RgbaImage, source: &RgbaImage) {
    let width = source.width().min(canvas.width());
    let height = source.height().min(canvas.height());
    for y in 0..height {
        for x in 0..width {
            canvas.put_pixel(x, y, *source.get_pixel(x, y));
        }
    }
}

fn blit_band(canvas: &mut RgbaImage, band: &RgbaImage, y: i64) {
    let width = band.width().min(canvas.width());
    for row in 0..i64::from(band.height()) {
        let dst_y = y + row;
        if dst_y < 0 || dst_y >= i64::from(canvas.height()) {
            continue;
        }
        for x in 0..width {
            canvas.put_pixel(x, dst_y as u32, *band.get_pixel(x, row as u32));
        }
    }
}

#[derive(Debug, Clone)]
struct GlyphBitmap {
    width: usize,
    height: usize,
    bitmap: Vec<u8>,
}

/// Rasterized coverage mask of one text line, positioned relative to the
/// top of the font's line box.
struct LineMask {
    width: usize,
    height: usize,
    data: Vec<u8>,
    top_offset: i32,
    line_box_h: f32,
}

pub struct TextPainter<'a> {
    font: &'a Font,
    glyph_cache: HashMap<GlyphRasterConfig, GlyphBitmap>,
}

impl<'a> TextPainter<'a> {
    pub fn new(font: &'a Font) -> Self {
        Self {
            font,
            glyph_cache: HashMap::new(),
        }
    }

    pub fn draw_line(
        &mut self,
        canvas: &mut RgbaImage,
        text: &str,
        params: &DrawParameters,
        center_x: f32,
        center_y: f32,
    ) {
        let Some(mask) = self.rasterize_line(text, params.font_size) else {
            return;
        };
        draw_mask(canvas, &mask, center_x, center_y, params);
    }

    fn rasterize_line(&mut self, text: &str, font_size: i32) -> Option<LineMask> {
        if font_size <= 0 {
            return None;
        }
        let size = font_size as f32;

        let mut line_layout = Layout::new(CoordinateSystem::PositiveYDown);
        line_layout.reset(&LayoutSettings {
            x: 0.0,
            y: 0.0,
            max_width: None,
            max_height: None,
            horizontal_align: HorizontalAlign::Left,
            vertical_align: VerticalAlign::Top,
            line_height: 1.0,
            wrap_style: WrapStyle::Letter,
            wrap_hard_breaks: false,
        });
        line_layout.append(&[self.font], &TextStyle::new(text, size, 0));

        let mut placed = Vec::new();
        for glyph in line_layout.glyphs() {
            if glyph.width == 0 || glyph.height == 0 {
                continue;
            }
            self.glyph_cache.entry(glyph.key).or_insert_with(|| {
                let (_, bitmap) = self.font.rasterize_config(glyph.key);
                GlyphBitmap {
                    width: glyph.width,
                    height: glyph.height,
                    bitmap,
                }
            });
            placed.push((glyph.x.round() as i32, glyph.y.round() as i32, glyph.key));
        }
        if placed.is_empty() {
            return None;
        }

        let mut min_x = i32::MAX;
        let mut min_y = i32::MAX;
        let mut max_x = i32::MIN;
        let mut max_y = i32::MIN;
        for (x, y, key) in &placed {
            let bitmap = &self.glyph_cache[key];
            min_x = min_x.min(*x);
            min_y = min_y.min(*y);
            max_x = max_x.max(x + bitmap.width as i32);
            max_y = max_y.max(y + bitmap.height as i32);
        }

        let width = (max_x - min_x) as usize;
        let height = (max_y - min_y) as usize;
        let mut data = vec![0_u8; width * height];
        for (x, y, key) in &placed {
            let bitmap = &self.glyph_cache[key];
            stamp_max(
                &mut data,
                width,
                (x - min_x) as usize,
                (y - min_y) as usize,
                &bitmap.bitmap,
                bitmap.width,
                bitmap.height,
            );
        }

        let line_box_h = self
            .font
            .horizontal_line_metrics(size)
            .map(|metrics| metrics.ascent - metrics.descent)
            .unwrap_or(size);

        Some(LineMask {
            width,
            height,
            data,
            top_offset: min_y,
            line_box_h,
        })
    }
}

/// Anchors the line box vertically and the ink bounds horizontally on the
/// anchor point, then blends the stroke pass (when stroke_width > 0)
/// followed by the fill pass.
fn draw_mask(
    canvas: &mut RgbaImage,
    mask: &LineMask,
    center_x: f32,
    center_y: f32,
    params: &DrawParameters,
) {
    let left = (center_x - mask.width as f32 / 2.0).round() as i64;
    let top = (center_y - mask.line_box_h / 2.0).round() as i64 + i64::from(mask.top_offset);

    if params.stroke_width > 0 {
        let radius = params.stroke_width as usize;
        let (dilated, dilated_w, dilated_h) =
            dilate_disk(&mask.data, mask.width, mask.height, radius);
        blend_mask(
            canvas,
            left - radius as i64,
            top - radius as i64,
            &dilated,
            dilated_w,
            dilated_h,
            params.stroke_color,
        );
    }

    blend_mask(canvas, left, top, &mask.data, mask.width, mask.height, params.font_color);
}

/// Dilates a coverage mask by a disk of the given radius. The disk
/// structuring element is what gives stroked glyphs rounded joins.
fn dilate_disk(mask: &[u8], width: usize, height: usize, radius: usize) -> (Vec<u8>, usize, usize) {
    let out_w = width + 2 * radius;
    let out_h = height + 2 * radius;
    let mut out = vec![0_u8; out_w * out_h];
    let r = radius as i64;
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy > r * r {
                continue;
            }
            stamp_max(
                &mut out,
                out_w,
                (dx + r) as usize,
                (dy + r) as usize,
                mask,
                width,
                height,
            );
        }
    }
    (out, out_w, out_h)
}

fn stamp_max(
    dst: &mut [u8],
    dst_w: usize,
    at_x: usize,
    at_y: usize,
    src: &[u8],
    src_w: usize,
    src_h: usize,
) {
    for row in 0..src_h {
        let dst_start = (at_y + row) * dst_w + at_x;
        let src_start = row * src_w;
        for col in 0..src_w {
            let slot = &mut dst[dst_start + col];
            *slot = (*slot).max(src[src_start + col]);
        }
    }
}

fn blend_mask(
    canvas: &mut RgbaImage,
    x0: i64,
    y0: i64,
    mask: &[u8],
    mask_w: usize,
    mask_h: usize,
    color: Color,
) {
    let frame_w = canvas.width();
    let frame_h = canvas.height();
    let frame: &mut [u8] = canvas;

    for row in 0..mask_h {
        let py = y0 + row as i64;
        if py < 0 || py >= i64::from(frame_h) {
            continue;
        }
        for col in 0..mask_w {
            let px = x0 + col as i64;
            if px < 0 || px >= i64::from(frame_w) {
                continue;
            }
            let coverage = mask[row * mask_w + col];
            if coverage == 0 {
                continue;
            }
            let alpha = ((u16::from(coverage) * u16::from(color.a)) / 255) as u8;
            let idx = ((py as u32 * frame_w + px as u32) * 4) as usize;
            blend_pixel(frame, idx, [color.r, color.g, color.b, alpha]);
        }
    }
}

fn blend_pixel(frame: &mut [u8], idx: usize, src: [u8; 4]) {
    let alpha = u16::from(src[3]);
    if alpha == 0 {
        return;
    }

    let inv_alpha = 255_u16.saturating_sub(alpha);

    for channel in 0..3 {
        let dst = u16::from(frame[idx + channel]);
        let src_c = u16::from(src[channel]);
        frame[idx + channel] = ((src_c * alpha + dst * inv_alpha + 127) / 255) as u8;
    }
    frame[idx + 3] = 255;
}
