//! Training-dataset batch driver.
//!
//! Documents are processed in parallel (no shared mutable state between
//! them); only the CSV append is serialized. A failing document is counted
//! and logged, never aborts the batch. Re-runs skip documents already in
//! the CSV by content id.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rayon::prelude::*;
use thiserror::Error;

use risk_engine::score::{aggregate, map_label};
use shared_types::DocumentType;

use crate::analyze::{AnalyzeOptions, Analyzer};
use crate::error::{AnalyzeError, IngestError};
use crate::hash::content_id;
use crate::ml::{derive_reasons, feature_row};
use crate::normalize::SUPPORTED_EXTENSIONS;

/// CSV schema: identity and raw metadata first, then the numeric feature
/// columns in the exact order the feature row produces them, then targets.
pub const COLUMNS: [&str; 43] = [
    "doc_id",
    "tipo_doc",
    "file_ext",
    "document_language",
    "num_pages",
    "file_size_bytes",
    "meta_producer",
    "meta_creator",
    "meta_createdate",
    "meta_modifydate",
    "has_metadata",
    "producer_suspicious",
    "ocr_total_chars",
    "ocr_pages_with_text",
    "ocr_chars_per_page_mean",
    "has_date",
    "has_patente",
    "has_vin",
    "has_cuit",
    "has_vencimiento",
    "has_entidad_emisora",
    "same_patente_all_pages",
    "min_resolution_px",
    "low_res_flag",
    "dpi_used",
    "rule_META_PRODUCER_SUSPICIOUS",
    "rule_OCR_FIELD_MISSING_DATE",
    "rule_OCR_TEXT_TOO_SHORT",
    "rule_IMAGE_LOW_RES",
    "rule_META_PRODUCER_UNKNOWN",
    "rule_META_PRODUCER_MISSING",
    "rule_META_CREATOR_PERSON_NAME",
    "rule_META_DATE_MISMATCH",
    "rule_META_DATE_LARGE_GAP",
    "rule_OCR_INVALID_CUIT",
    "rule_OCR_VIN_FORMAT_SUSPECT",
    "rule_OCR_MISSING_VIGENCIA",
    "rule_OCR_MISSING_EMISOR",
    "rule_IMAGE_OVERCOMPRESSED",
    "rule_IMAGE_BLURRY",
    "reasons_count",
    "y_score_1_100",
    "y_label",
];

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("could not build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Clone)]
pub struct DatasetOptions {
    pub input: PathBuf,
    pub out_csv: PathBuf,
    pub workers: usize,
    /// Ignore the existing CSV and rebuild it with a fresh header
    pub rebuild: bool,
    pub language: Option<String>,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub found: usize,
    pub processed: usize,
    pub skipped_existing: usize,
    pub skipped_unsupported: usize,
    pub errors: usize,
}

/// Collect candidate files under the raw root, recursively. Paths under a
/// `work/` component are scratch output from earlier runs, not input.
fn collect_paths(root: &Path) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for ext in SUPPORTED_EXTENSIONS {
        let pattern = format!("{}/**/*{}", root.display(), ext);
        if let Ok(matches) = glob::glob(&pattern) {
            paths.extend(matches.flatten().filter(|p| p.is_file()));
        }
    }
    paths.retain(|p| !p.components().any(|c| c.as_os_str() == "work"));
    paths.sort();
    paths.dedup();
    paths
}

/// Declared type from the parent directory name; the raw root itself (or a
/// literal `raw/` folder) means untyped.
fn doc_type_for(path: &Path) -> DocumentType {
    let parent = path
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_uppercase())
        .unwrap_or_default();
    if parent == "RAW" {
        DocumentType::Otro
    } else {
        DocumentType::parse(&parent)
    }
}

fn load_existing_ids(csv_path: &Path) -> Result<HashSet<String>, DatasetError> {
    if !csv_path.exists() {
        return Ok(HashSet::new());
    }
    let mut reader = csv::Reader::from_path(csv_path)?;
    let idx = reader
        .headers()?
        .iter()
        .position(|h| h == "doc_id");
    let Some(idx) = idx else {
        return Ok(HashSet::new());
    };
    let mut ids = HashSet::new();
    for record in reader.records() {
        if let Some(id) = record?.get(idx) {
            ids.insert(id.to_string());
        }
    }
    Ok(ids)
}

fn flag(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}

/// Build one CSV record. The numeric columns come from the same feature
/// row the ML path projects, so the dataset and inference stay aligned.
fn process_one(
    analyzer: &Analyzer,
    path: &Path,
    doc_id: &str,
    language: Option<&str>,
) -> Result<Vec<String>, AnalyzeError> {
    let doc_type = doc_type_for(path);
    let options = AnalyzeOptions {
        language: language.map(|l| l.to_string()),
        ocr_enabled: true,
    };
    let ex = analyzer.extract(path, &options)?;
    let reasons = derive_reasons(doc_type, &ex);
    let row = feature_row(&ex, &reasons);
    let value = |name: &str| -> f64 {
        row.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| *v)
            .unwrap_or(0.0)
    };

    let score01 = aggregate(&reasons);
    let y_score = (score01 * 1000.0).round() / 10.0;
    let y_label = map_label(score01, &analyzer.config().thresholds);

    let lang = language
        .unwrap_or(&analyzer.config().ocr.default_lang)
        .to_string();
    let ext = crate::normalize::sniff_ext(path)
        .unwrap_or("")
        .trim_start_matches('.')
        .to_string();
    let meta_get = |k: &str| ex.meta.get(k).cloned().unwrap_or_default();
    let created = ex
        .meta
        .get("CreateDate")
        .or_else(|| ex.meta.get("CreationDate"))
        .cloned()
        .unwrap_or_default();

    let mut record: Vec<String> = vec![
        doc_id.to_string(),
        doc_type.as_str().to_string(),
        ext,
        lang,
        ex.num_pages.to_string(),
        ex.file_size_bytes.to_string(),
        meta_get("Producer"),
        meta_get("Creator"),
        created,
        meta_get("ModifyDate"),
        flag(!ex.meta.is_empty()).to_string(),
        format!("{}", value("producer_suspicious")),
        ex.summary.length.to_string(),
        ex.summary.pages_with_text.to_string(),
        format!("{}", ex.summary.chars_per_page_mean),
        flag(ex.summary.has_date).to_string(),
        flag(ex.summary.has_plate).to_string(),
        flag(ex.summary.has_vin).to_string(),
        flag(ex.summary.has_cuit).to_string(),
        flag(ex.summary.has_vigency).to_string(),
        flag(ex.summary.has_issuer).to_string(),
        flag(ex.summary.same_plate_all_pages).to_string(),
        ex.image_summary
            .min_area_px
            .map(|a| a.to_string())
            .unwrap_or_default(),
        flag(ex.image_summary.low_res).to_string(),
        ex.doc.dpi_used.to_string(),
    ];
    for col in &COLUMNS[25..40] {
        record.push(format!("{}", value(col)));
    }
    record.push(reasons.len().to_string());
    record.push(format!("{:.1}", y_score));
    record.push(y_label.as_str().to_string());

    Ok(record)
}

/// Run the batch. Returns counters; the caller decides how the error count
/// maps to an exit status.
pub fn build_dataset(analyzer: &Analyzer, options: &DatasetOptions) -> Result<BatchSummary, DatasetError> {
    let paths = collect_paths(&options.input);

    if options.rebuild && options.out_csv.exists() {
        std::fs::remove_file(&options.out_csv)?;
    }
    let seen = if options.rebuild {
        HashSet::new()
    } else {
        load_existing_ids(&options.out_csv)?
    };

    let mut summary = BatchSummary {
        found: paths.len(),
        ..BatchSummary::default()
    };

    let mut to_do = Vec::new();
    for path in paths {
        let id = content_id(&path)?;
        if seen.contains(&id) {
            summary.skipped_existing += 1;
        } else {
            to_do.push((path, id));
        }
    }

    if let Some(parent) = options.out_csv.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let write_header = !options.out_csv.exists();
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&options.out_csv)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    if write_header {
        writer.write_record(COLUMNS)?;
    }
    let writer = Mutex::new(writer);

    let processed = AtomicUsize::new(0);
    let unsupported = AtomicUsize::new(0);
    let errors = AtomicUsize::new(0);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers)
        .build()?;
    pool.install(|| {
        to_do.par_iter().for_each(|(path, id)| {
            match process_one(analyzer, path, id, options.language.as_deref()) {
                Ok(record) => {
                    // A panicked worker must not stop the others from appending
                    let mut writer = writer
                        .lock()
                        .unwrap_or_else(std::sync::PoisonError::into_inner);
                    if let Err(e) = writer.write_record(&record) {
                        tracing::error!(path = %path.display(), error = %e, "failed to append row");
                        errors.fetch_add(1, Ordering::Relaxed);
                    } else {
                        processed.fetch_add(1, Ordering::Relaxed);
                    }
                }
                Err(AnalyzeError::Ingest(IngestError::UnsupportedFormat(ext))) => {
                    tracing::warn!(path = %path.display(), ext, "skipping unsupported format");
                    unsupported.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "document failed");
                    errors.fetch_add(1, Ordering::Relaxed);
                }
            }
        });
    });

    writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?
        .flush()?;

    summary.processed = processed.into_inner();
    summary.skipped_unsupported = unsupported.into_inner();
    summary.errors = errors.into_inner();
    Ok(summary)
}
