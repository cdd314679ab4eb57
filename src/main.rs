use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use bandsub::band;
use bandsub::decoding::SourceImage;
use bandsub::encoding;
use bandsub::font_assets;
use bandsub::layout;
use bandsub::manifest::{load_and_validate_manifest, StyleOverride};
use bandsub::renderer::RenderSession;
use bandsub::schema::{self, DrawParameters};

#[derive(Debug, Parser)]
#[command(name = "bandsub")]
#[command(about = "Subtitle Band Compositor")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Render the manifest and write the composited PNG.
    Build {
        manifest: PathBuf,
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
        /// Font file to render with; wins over the manifest's font field.
        #[arg(long = "font")]
        font: Option<PathBuf>,
        /// Raw style edit, key=value; repeatable.
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
    /// Validate the manifest and print the computed layout.
    Check {
        manifest: PathBuf,
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            manifest,
            output,
            font,
            set,
        } => run_build(&manifest, output, font, &set),
        Commands::Check {
            manifest,
            set,
            json,
        } => run_check(&manifest, &set, json),
    }
}

fn parse_overrides(raw: &[String]) -> Result<Vec<StyleOverride>> {
    raw.iter().map(|edit| StyleOverride::parse(edit)).collect()
}

fn run_check(manifest_path: &Path, sets: &[String], json: bool) -> Result<()> {
    let overrides = parse_overrides(sets)?;
    let manifest = load_and_validate_manifest(manifest_path, &overrides)?;
    let params = DrawParameters::from_raw(&manifest.style);
    let source = SourceImage::open(&manifest.image)?;

    let lines = schema::split_lines(&params.text);
    let (canvas_w, canvas_h) = layout::canvas_size(
        source.width(),
        source.height(),
        params.band_height,
        params.line_gap,
        lines.len(),
    );
    let sample_offset = band::sample_offset(source.height(), params.band_height);

    if json {
        let anchors = lines
            .iter()
            .enumerate()
            .map(|(index, _)| {
                let (center_x, center_y) = layout::line_anchor(
                    canvas_w,
                    source.height(),
                    params.band_height,
                    params.line_gap,
                    index,
                );
                serde_json::json!({
                    "index": index,
                    "center_x": center_x,
                    "center_y": center_y,
                })
            })
            .collect::<Vec<_>>();
        let report = serde_json::json!({
            "source": { "width": source.width(), "height": source.height() },
            "canvas": { "width": canvas_w, "height": canvas_h },
            "band": { "height": params.band_height, "sample_offset_y": sample_offset },
            "line_count": lines.len(),
            "line_gap": params.line_gap,
            "lines": anchors,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "OK: {} ({}x{} -> {}x{}, {} line(s))",
            manifest_path.display(),
            source.width(),
            source.height(),
            canvas_w,
            canvas_h,
            lines.len()
        );
        println!(
            "Band: height {} px sampled from y={}, gap {} px",
            params.band_height, sample_offset, params.line_gap
        );
        for (index, _) in lines.iter().enumerate() {
            let (center_x, center_y) = layout::line_anchor(
                canvas_w,
                source.height(),
                params.band_height,
                params.line_gap,
                index,
            );
            println!("Line {index}: anchor ({center_x}, {center_y})");
        }
    }
    Ok(())
}

fn run_build(
    manifest_path: &Path,
    output: Option<PathBuf>,
    font_flag: Option<PathBuf>,
    sets: &[String],
) -> Result<()> {
    let overrides = parse_overrides(sets)?;
    let manifest = load_and_validate_manifest(manifest_path, &overrides)?;
    let params = DrawParameters::from_raw(&manifest.style);

    let font_path = font_flag.or(manifest.font);
    let font = font_assets::resolve_font(font_path.as_deref())?;

    let mut session = RenderSession::new();
    session.load(SourceImage::open(&manifest.image)?);
    let raster = session
        .render_with(&params, &font)
        .ok_or_else(|| anyhow!("no source image loaded"))?;

    let output_path = output.unwrap_or_else(|| {
        let manifest_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));
        encoding::default_export_path(manifest_dir)
    });
    encoding::write_png(&raster, &output_path)?;
    println!(
        "Wrote {} ({}x{})",
        output_path.display(),
        raster.width(),
        raster.height()
    );
    Ok(())
}
