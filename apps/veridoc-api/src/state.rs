//! Shared application state

use std::path::PathBuf;

use anyhow::{Context, Result};
use doc_pipeline::{Analyzer, MlScorer};
use risk_engine::config::EngineConfig;
use risk_engine::model::ModelError;

pub struct AppState {
    pub config: EngineConfig,
    pub analyzer: Analyzer,
    pub ml: Option<MlScorer>,
}

impl AppState {
    /// Build the state from the environment: `APP_CONFIG` names an optional
    /// YAML file, `MODEL_DIR` the model artifact directory (default
    /// `models`). Missing artifacts disable the ML route; inconsistent
    /// artifacts are a configuration error and abort startup.
    pub fn new() -> Result<Self> {
        let config = match std::env::var("APP_CONFIG") {
            Ok(path) => EngineConfig::load(&path)
                .with_context(|| format!("loading config from {}", path))?,
            Err(_) => EngineConfig::default(),
        };

        let model_dir =
            PathBuf::from(std::env::var("MODEL_DIR").unwrap_or_else(|_| "models".to_string()));
        let ml = match MlScorer::load(&model_dir) {
            Ok(scorer) => {
                tracing::info!(dir = %model_dir.display(), "ML model loaded");
                Some(scorer)
            }
            Err(ModelError::Io(e)) => {
                tracing::info!(
                    dir = %model_dir.display(),
                    "no model artifacts ({}), ML scoring disabled",
                    e
                );
                None
            }
            Err(e) => {
                return Err(e).context("model artifacts present but inconsistent");
            }
        };

        let analyzer = Analyzer::new(config.clone());
        Ok(Self {
            config,
            analyzer,
            ml,
        })
    }
}
