use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;

use crate::schema::RawStyle;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobManifest {
    pub image: PathBuf,
    #[serde(default)]
    pub font: Option<PathBuf>,
    #[serde(default)]
    pub style: RawStyle,
}

/// One `--set key=value` edit. The key must be a recognized style key;
/// the value is a raw string that goes through the parameter model and
/// therefore falls back to the documented default when malformed.
#[derive(Debug, Clone)]
pub struct StyleOverride {
    pub key: String,
    pub value: String,
}

impl StyleOverride {
    pub fn parse(raw: &str) -> Result<Self> {
        let Some((key, value)) = raw.split_once('=') else {
            bail!("invalid --set '{raw}', expected key=value (example: --set band_height=96)");
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("invalid --set '{raw}', key must not be empty");
        }
        Ok(Self {
            key: key.to_owned(),
            value: value.to_owned(),
        })
    }
}

pub fn load_and_validate_manifest(path: &Path, overrides: &[StyleOverride]) -> Result<JobManifest> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    let mut manifest: JobManifest = serde_yaml::from_str(&contents).map_err(|error| {
        let location = error
            .location()
            .map(|location| format!("line {}, column {}", location.line(), location.column()))
            .unwrap_or_else(|| "unknown location".to_owned());
        anyhow!(
            "failed to parse yaml in {} at {}: {}",
            path.display(),
            location,
            error
        )
    })?;

    let manifest_dir = path
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    manifest.image = resolve_and_validate_asset_path(&manifest_dir, &manifest.image, "image")?;
    if let Some(font) = &manifest.font {
        manifest.font = Some(resolve_and_validate_asset_path(&manifest_dir, font, "font")?);
    }

    for edit in overrides {
        manifest.style.set(&edit.key, edit.value.clone())?;
    }

    Ok(manifest)
}

fn resolve_and_validate_asset_path(
    manifest_dir: &Path,
    source_path: &Path,
    field_name: &str,
) -> Result<PathBuf> {
    let resolved = if source_path.is_absolute() {
        source_path.to_path_buf()
    } else {
        manifest_dir.join(source_path)
    };

    if !resolved.exists() {
        bail!("{} does not exist: {}", field_name, resolved.display());
    }
    if !resolved.is_file() {
        bail!("{} is not a file: {}", field_name, resolved.display());
    }

    Ok(resolved)
}
