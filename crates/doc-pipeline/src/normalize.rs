//! Page normalization: one source document in, an ordered page list out.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::IngestError;
use crate::html::html_to_text;
use crate::render::PageRenderer;

/// The closed set of recognized extensions.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    ".pdf", ".jpg", ".jpeg", ".png", ".webp", ".tif", ".tiff", ".html", ".htm",
];

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".webp", ".tif", ".tiff"];
const HTML_EXTENSIONS: &[&str] = &[".html", ".htm"];

/// Recognize the extension, case-insensitively, against the closed set.
pub fn sniff_ext(path: &Path) -> Option<&'static str> {
    let lower = path.to_string_lossy().to_lowercase();
    SUPPORTED_EXTENSIONS
        .iter()
        .find(|ext| lower.ends_with(*ext))
        .copied()
}

/// A document reduced to pages: either rendered/loaded images to recognize,
/// or already-extracted HTML text. Pages live for one analysis run; the
/// scratch directory (PDF case) is removed on drop unless kept.
#[derive(Debug)]
pub struct NormalizedDocument {
    pub images: Vec<PathBuf>,
    pub html_text: Option<String>,
    /// DPI the pages were rendered at; 0 when nothing was rendered
    pub dpi_used: u32,
    /// Owns the scratch directory; dropping it is the best-effort cleanup
    _scratch: Option<TempDir>,
}

/// Convert a local file into its page list.
pub fn normalize(
    path: &Path,
    renderer: &dyn PageRenderer,
    dpi: u32,
    workdir: &Path,
    keep_temp: bool,
) -> Result<NormalizedDocument, IngestError> {
    let Some(ext) = sniff_ext(path) else {
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_else(|| "<none>".to_string());
        return Err(IngestError::UnsupportedFormat(ext));
    };

    if ext == ".pdf" {
        let scratch = tempfile::Builder::new()
            .prefix("veridoc-pages-")
            .tempdir_in(workdir)?;
        let images = renderer.render(path, scratch.path(), dpi)?;
        let scratch = if keep_temp {
            tracing::info!(dir = %scratch.path().display(), "keeping scratch pages");
            let _ = scratch.into_path();
            None
        } else {
            Some(scratch)
        };
        return Ok(NormalizedDocument {
            images,
            html_text: None,
            dpi_used: dpi,
            _scratch: scratch,
        });
    }

    if IMAGE_EXTENSIONS.contains(&ext) {
        return Ok(NormalizedDocument {
            images: vec![path.to_path_buf()],
            html_text: None,
            dpi_used: 0,
            _scratch: None,
        });
    }

    debug_assert!(HTML_EXTENSIONS.contains(&ext));
    let raw = std::fs::read_to_string(path)?;
    Ok(NormalizedDocument {
        images: Vec::new(),
        html_text: Some(html_to_text(&raw)),
        dpi_used: 0,
        _scratch: None,
    })
}
