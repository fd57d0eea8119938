//! Process-wide configuration, loaded once at startup and passed explicitly.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::score::Thresholds;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub version: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "veridoc".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub default_lang: String,
    pub pdf_render_dpi: u32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            default_lang: "spa".to_string(),
            pdf_render_dpi: 300,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Parent directory for per-document scratch directories
    pub workdir: PathBuf,
    /// Keep scratch directories after analysis instead of removing them
    pub keep_temp: bool,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            workdir: std::env::temp_dir(),
            keep_temp: false,
        }
    }
}

/// Toggles for whole signal families. Disabling a family withholds its
/// signals; it never errors.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FeatureToggles {
    pub enable_metadata: bool,
    pub enable_text: bool,
    pub enable_visual: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            enable_metadata: true,
            enable_text: true,
            enable_visual: true,
        }
    }
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub service: ServiceConfig,
    pub thresholds: Thresholds,
    pub ocr: OcrConfig,
    pub paths: PathsConfig,
    pub features: FeatureToggles,
}

impl EngineConfig {
    /// Load from a YAML file. Missing sections fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.ocr.default_lang, "spa");
        assert_eq!(cfg.ocr.pdf_render_dpi, 300);
        assert_eq!(cfg.thresholds.low, 0.25);
        assert_eq!(cfg.thresholds.high, 0.60);
        assert!(cfg.features.enable_visual);
        assert!(!cfg.paths.keep_temp);
    }

    #[test]
    fn partial_yaml_keeps_defaults_elsewhere() {
        let cfg: EngineConfig = serde_yaml::from_str(
            "thresholds:\n  low: 0.3\n  high: 0.7\nocr:\n  default_lang: eng\n",
        )
        .unwrap();
        assert_eq!(cfg.thresholds.low, 0.3);
        assert_eq!(cfg.ocr.default_lang, "eng");
        assert_eq!(cfg.ocr.pdf_render_dpi, 300);
    }
}
