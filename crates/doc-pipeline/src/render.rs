//! Page rendering collaborator: PDF to one image per page.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::IngestError;

/// Converts a PDF into ordered per-page images at the requested DPI.
/// Failure propagates: a document whose pages cannot be rendered cannot be
/// analyzed.
pub trait PageRenderer: Send + Sync {
    fn render(&self, pdf: &Path, out_dir: &Path, dpi: u32) -> Result<Vec<PathBuf>, IngestError>;
}

/// Default renderer: shells out to poppler's `pdftoppm`.
pub struct PdftoppmRenderer;

impl PageRenderer for PdftoppmRenderer {
    fn render(&self, pdf: &Path, out_dir: &Path, dpi: u32) -> Result<Vec<PathBuf>, IngestError> {
        std::fs::create_dir_all(out_dir)?;
        let prefix = out_dir.join("page");

        let status = Command::new("pdftoppm")
            .arg("-png")
            .arg("-r")
            .arg(dpi.to_string())
            .arg(pdf)
            .arg(&prefix)
            .status()
            .map_err(|e| IngestError::Render(format!("could not run pdftoppm: {e}")))?;
        if !status.success() {
            return Err(IngestError::Render(format!(
                "pdftoppm exited with {status} for {}",
                pdf.display()
            )));
        }

        let mut pages: Vec<PathBuf> = std::fs::read_dir(out_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("page") && n.ends_with(".png"))
            })
            .collect();
        // pdftoppm zero-pads page numbers, so lexicographic order is page order
        pages.sort();
        Ok(pages)
    }
}
