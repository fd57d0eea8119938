//! Image-derived signals: resolution, compression, sharpness.
//!
//! Individual pages that cannot be read are skipped, never fatal. Sharpness
//! is an optional capability: without an estimator the `blurry` signal is
//! simply withheld.

use std::fs;
use std::path::{Path, PathBuf};

use image::GrayImage;

/// Pages below 400x400 pixels are considered unusable scans
pub const MIN_PAGE_AREA_PX: u64 = 400 * 400;

/// JPEG pages below this bytes-per-pixel ratio were aggressively recompressed
pub const JPEG_MIN_BYTES_PER_PIXEL: f64 = 0.08;

/// Laplacian-variance sharpness below this is flagged as blur
pub const BLUR_VARIANCE_THRESHOLD: f64 = 20.0;

/// Per-run summary of the page image set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageSummary {
    /// Smallest page area in pixels, if any page could be read
    pub min_area_px: Option<u64>,
    pub low_res: bool,
    pub overcompressed: bool,
    /// `None` when no sharpness estimator was available
    pub blurry: Option<bool>,
}

/// Injectable sharpness capability. Absence of an implementation must not
/// fail the pipeline.
pub trait SharpnessEstimator: Send + Sync {
    /// Sharpness estimate of a grayscale page; higher is sharper.
    fn sharpness(&self, image: &GrayImage) -> f64;
}

/// Variance of the Laplacian response, the classic focus measure.
pub struct LaplacianSharpness;

impl SharpnessEstimator for LaplacianSharpness {
    fn sharpness(&self, image: &GrayImage) -> f64 {
        let filtered = imageproc::filter::laplacian_filter(image);
        let n = filtered.len() as f64;
        if n == 0.0 {
            return 0.0;
        }
        let mean: f64 = filtered.iter().map(|v| f64::from(*v)).sum::<f64>() / n;
        filtered
            .iter()
            .map(|v| {
                let d = f64::from(*v) - mean;
                d * d
            })
            .sum::<f64>()
            / n
    }
}

fn is_jpeg(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref(),
        Some("jpg") | Some("jpeg")
    )
}

/// Summarize the rendered/loaded page image set.
///
/// The same set must be the one recognition ran over, so image signals and
/// text signals describe the same pages.
pub fn summarize_images(
    paths: &[PathBuf],
    sharpness: Option<&dyn SharpnessEstimator>,
) -> ImageSummary {
    let mut summary = ImageSummary::default();
    if paths.is_empty() {
        return summary;
    }

    for path in paths {
        let Ok((w, h)) = image::image_dimensions(path) else {
            tracing::warn!(path = %path.display(), "could not read page dimensions, skipping");
            continue;
        };
        let area = u64::from(w) * u64::from(h);
        summary.min_area_px = Some(summary.min_area_px.map_or(area, |m| m.min(area)));

        if is_jpeg(path) {
            if let Ok(meta) = fs::metadata(path) {
                let bpp = meta.len() as f64 / area.max(1) as f64;
                if bpp < JPEG_MIN_BYTES_PER_PIXEL {
                    summary.overcompressed = true;
                }
            }
        }
    }
    summary.low_res = matches!(summary.min_area_px, Some(area) if area < MIN_PAGE_AREA_PX);

    if let Some(estimator) = sharpness {
        let mut blurry = false;
        for path in paths {
            let Ok(img) = image::open(path) else {
                continue;
            };
            if estimator.sharpness(&img.to_luma8()) < BLUR_VARIANCE_THRESHOLD {
                blurry = true;
                break;
            }
        }
        summary.blurry = Some(blurry);
    }

    summary
}
