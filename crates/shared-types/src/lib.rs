pub mod types;

pub use types::{
    DocumentType, MetadataMap, MlRiskResult, OcrStats, PageScore, Reason, ReasonCode, RiskLabel,
    RiskResult,
};
