//! Document ingestion and analysis pipeline.
//!
//! Normalizes a source document into pages, runs the external collaborators
//! (renderer, recognizer, metadata reader), and drives the rule engine over
//! the extracted signals. The heuristic path, the ML path, and the dataset
//! batch driver all go through one shared extraction pass.

pub mod analyze;
pub mod dataset;
pub mod error;
pub mod hash;
pub mod html;
pub mod metadata;
pub mod ml;
pub mod normalize;
pub mod ocr;
pub mod render;

pub use analyze::{AnalyzeOptions, Analyzer};
pub use dataset::{build_dataset, BatchSummary, DatasetOptions};
pub use error::{AnalyzeError, IngestError};
pub use ml::MlScorer;
