use risk_engine::model::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    /// Terminal for the document: recorded as skipped, never retried.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("page rendering failed: {0}")]
    Render(String),

    #[error("text recognition failed: {0}")]
    Recognize(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Model/spec divergence is a configuration error, never auto-corrected.
    #[error(transparent)]
    Model(#[from] ModelError),
}
