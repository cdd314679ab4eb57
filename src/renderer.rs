use fontdue::Font;
use image::RgbaImage;

use crate::band;
use crate::compositor;
use crate::decoding::SourceImage;
use crate::schema::{self, DrawParameters};

/// One full render pass: split the text, synthesize the background band
/// from the unmodified source, composite. Pure function of its inputs;
/// identical inputs produce pixel-identical output.
pub fn render(source: &SourceImage, params: &DrawParameters, font: &Font) -> RgbaImage {
    let lines = schema::split_lines(&params.text);
    let band = band::synthesize(source.pixels(), params.band_height);
    compositor::composite(source.pixels(), &band, params, &lines, font)
}

/// Owns the current source image across renders. Lifecycle: uninitialized
/// until `load`, then re-renderable any number of times; a new `load`
/// replaces the image wholesale.
#[derive(Default)]
pub struct RenderSession {
    source: Option<SourceImage>,
}

impl RenderSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.source.is_some()
    }

    pub fn load(&mut self, source: SourceImage) {
        self.source = Some(source);
    }

    /// Renders with the current source image, or returns None when no
    /// image has been loaded yet (a no-op, not an error).
    pub fn render_with(&self, params: &DrawParameters, font: &Font) -> Option<RgbaImage> {
        self.source
            .as_ref()
            .map(|source| render(source, params, font))
    }
}
