use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use fontdue::{Font, FontSettings};

const SYSTEM_FONT_DIRS: [&str; 5] = [
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "/System/Library/Fonts",
    "/Library/Fonts",
    "C:\\Windows\\Fonts",
];

const MAX_SCAN_DEPTH: usize = 4;

pub fn load_font(path: &Path) -> Result<Font> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read font file '{}'", path.display()))?;
    Font::from_bytes(bytes, FontSettings::default())
        .map_err(|error| anyhow!("failed to parse font {}: {error}", path.display()))
}

/// Resolves the render font. An explicit path is loaded as-is (and its
/// failure is a hard error); otherwise the system font directories are
/// scanned and the first parseable candidate wins, bold upright faces
/// first since subtitle text renders at bold weight.
pub fn resolve_font(explicit: Option<&Path>) -> Result<Font> {
    if let Some(path) = explicit {
        return load_font(path);
    }

    for candidate in system_font_candidates() {
        if let Ok(font) = load_font(&candidate) {
            return Ok(font);
        }
    }
    bail!("no usable system font found; pass one with --font or the manifest's font field");
}

/// Font files found under the system directories, ordered bold upright
/// first, then upright, then everything else. Directory entries are
/// sorted so the scan order is stable across runs.
pub fn system_font_candidates() -> Vec<PathBuf> {
    let mut roots = SYSTEM_FONT_DIRS
        .iter()
        .map(PathBuf::from)
        .collect::<Vec<_>>();
    if let Some(home) = std::env::var_os("HOME") {
        let home = PathBuf::from(home);
        roots.push(home.join(".fonts"));
        roots.push(home.join(".local/share/fonts"));
    }

    let mut found = Vec::new();
    for root in roots {
        if root.is_dir() {
            collect_font_files(&root, 0, &mut found);
        }
    }

    let mut bold = Vec::new();
    let mut upright = Vec::new();
    let mut rest = Vec::new();
    for path in found {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        let slanted = name.contains("italic") || name.contains("oblique");
        if name.contains("bold") && !slanted {
            bold.push(path);
        } else if !slanted {
            upright.push(path);
        } else {
            rest.push(path);
        }
    }

    let mut ordered = bold;
    ordered.extend(upright);
    ordered.extend(rest);
    ordered
}

fn collect_font_files(dir: &Path, depth: usize, found: &mut Vec<PathBuf>) {
    if depth > MAX_SCAN_DEPTH {
        return;
    }
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    let mut paths = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .collect::<Vec<_>>();
    paths.sort();

    for path in paths {
        if path.is_dir() {
            collect_font_files(&path, depth + 1, found);
            continue;
        }
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if extension == "ttf" || extension == "otf" {
            found.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_bold_upright(path: &Path) -> bool {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        name.contains("bold") && !name.contains("italic") && !name.contains("oblique")
    }

    #[test]
    fn missing_font_file_is_a_contexted_error() {
        let error = load_font(Path::new("/nonexistent/nope.ttf")).unwrap_err();
        assert!(error.to_string().contains("nope.ttf"));
    }

    #[test]
    fn candidate_order_is_stable() {
        let first = system_font_candidates();
        let second = system_font_candidates();
        assert_eq!(first, second);
    }

    #[test]
    fn bold_upright_candidates_sort_first() {
        let candidates = system_font_candidates();
        let boundary = candidates
            .iter()
            .position(|path| !is_bold_upright(path))
            .unwrap_or(candidates.len());
        for path in &candidates[boundary..] {
            assert!(
                !is_bold_upright(path),
                "bold face {} sorted after the boundary",
                path.display()
            );
        }
    }
}
