//! Text recognition collaborator.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use shared_types::OcrStats;

use crate::error::IngestError;

/// Recognized texts aligned to the input image order, plus run statistics.
#[derive(Debug, Clone, Default)]
pub struct OcrOutput {
    pub texts: Vec<String>,
    pub stats: OcrStats,
}

/// Converts images into recognized text. Blocking; any caller-side timeout
/// wrapping is an external responsibility.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, images: &[PathBuf], lang: &str) -> Result<OcrOutput, IngestError>;
}

/// Default recognizer: shells out to the `tesseract` CLI per page.
pub struct TesseractRecognizer;

impl TesseractRecognizer {
    fn recognize_one(&self, image: &Path, lang: &str) -> Result<String, IngestError> {
        let output = Command::new("tesseract")
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(lang)
            .output()
            .map_err(|e| IngestError::Recognize(format!("could not run tesseract: {e}")))?;
        if !output.status.success() {
            return Err(IngestError::Recognize(format!(
                "tesseract exited with {} for {}",
                output.status,
                image.display()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, images: &[PathBuf], lang: &str) -> Result<OcrOutput, IngestError> {
        let started = Instant::now();
        let mut texts = Vec::with_capacity(images.len());
        let mut total_chars = 0usize;

        for image in images {
            let text = self.recognize_one(image, lang)?;
            total_chars += text.chars().count();
            texts.push(text);
        }

        Ok(OcrOutput {
            stats: OcrStats {
                pages: images.len(),
                total_chars,
                time_ms: started.elapsed().as_millis() as u64,
            },
            texts,
        })
    }
}
