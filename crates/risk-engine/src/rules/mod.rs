//! Fraud-indicator rule catalog.
//!
//! Each rule is an independent, side-effect-free predicate over a subset of
//! {metadata, text summary, image summary, declared document type} that
//! emits at most one weighted reason per run. No rule depends on another
//! rule having fired; the only coupling is the document-type gates in the
//! text family.

pub mod image;
pub mod metadata;
pub mod text;

pub use image::check_images;
pub use metadata::check_metadata;
pub use text::check_text;
