//! HTTP handlers

use std::io::Write;
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde_json::{json, Value};
use shared_types::{DocumentType, MlRiskResult, RiskResult};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": state.config.service.name,
        "version": state.config.service.version,
        "ml_enabled": state.ml.is_some(),
    }))
}

/// One parsed multipart upload: the file body plus the optional form fields.
struct Upload {
    file_name: String,
    bytes: Vec<u8>,
    doc_type: DocumentType,
    language: Option<String>,
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut doc_type = DocumentType::Otro;
    let mut language = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("Failed to read multipart: {}", e)))?
    {
        match field.name().unwrap_or("") {
            "file" => {
                let name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::InvalidRequest(format!("Failed to read file: {}", e)))?;
                file = Some((name, bytes.to_vec()));
            }
            "document_type" => {
                let text = field.text().await.unwrap_or_default();
                doc_type = DocumentType::parse(&text);
            }
            "language" => {
                let text = field.text().await.unwrap_or_default();
                if !text.is_empty() {
                    language = Some(text);
                }
            }
            _ => {}
        }
    }

    let (file_name, bytes) =
        file.ok_or_else(|| ApiError::InvalidRequest("No file provided".to_string()))?;
    if bytes.is_empty() {
        return Err(ApiError::InvalidRequest("Empty file".to_string()));
    }

    Ok(Upload {
        file_name,
        bytes,
        doc_type,
        language,
    })
}

/// Spool the upload to a temp file carrying the original extension, so the
/// format sniffing downstream sees it. The file is removed on drop.
fn spool(upload: &Upload) -> Result<tempfile::NamedTempFile, ApiError> {
    let ext = std::path::Path::new(&upload.file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();

    let mut tmp = tempfile::Builder::new()
        .prefix("veridoc-upload-")
        .suffix(&ext)
        .tempfile()
        .map_err(|e| ApiError::Analysis(format!("Failed to spool upload: {}", e)))?;
    tmp.write_all(&upload.bytes)
        .map_err(|e| ApiError::Analysis(format!("Failed to spool upload: {}", e)))?;
    Ok(tmp)
}

pub async fn analyze_risk(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<RiskResult>, ApiError> {
    let upload = read_upload(multipart).await?;
    tracing::info!(
        file = %upload.file_name,
        doc_type = %upload.doc_type,
        size = upload.bytes.len(),
        "risk analysis requested"
    );

    let result = tokio::task::spawn_blocking(move || -> Result<RiskResult, ApiError> {
        let tmp = spool(&upload)?;
        let options = doc_pipeline::AnalyzeOptions {
            language: upload.language.clone(),
            ocr_enabled: true,
        };
        Ok(state.analyzer.analyze(tmp.path(), upload.doc_type, &options)?)
    })
    .await
    .map_err(|e| ApiError::Analysis(format!("Analysis task failed: {}", e)))??;

    Ok(Json(result))
}

pub async fn analyze_risk_ml(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<MlRiskResult>, ApiError> {
    if state.ml.is_none() {
        return Err(ApiError::ModelUnavailable);
    }
    let upload = read_upload(multipart).await?;
    tracing::info!(
        file = %upload.file_name,
        doc_type = %upload.doc_type,
        size = upload.bytes.len(),
        "ML risk analysis requested"
    );

    let result = tokio::task::spawn_blocking(move || -> Result<MlRiskResult, ApiError> {
        let scorer = state.ml.as_ref().ok_or(ApiError::ModelUnavailable)?;
        let tmp = spool(&upload)?;
        let options = doc_pipeline::AnalyzeOptions {
            language: upload.language.clone(),
            ocr_enabled: true,
        };
        Ok(scorer.score(&state.analyzer, tmp.path(), upload.doc_type, &options)?)
    })
    .await
    .map_err(|e| ApiError::Analysis(format!("Analysis task failed: {}", e)))??;

    Ok(Json(result))
}
