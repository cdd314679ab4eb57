pub mod band;
pub mod compositor;
pub mod decoding;
pub mod encoding;
pub mod font_assets;
pub mod layout;
pub mod manifest;
pub mod renderer;
pub mod schema;
