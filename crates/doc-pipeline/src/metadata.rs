//! Metadata reading collaborator.

use std::path::Path;
use std::process::Command;

use shared_types::MetadataMap;

/// Reads document properties as a flat key/value map. Never fails: a
/// missing tool or a file without metadata yields an empty map, and the
/// corresponding signals are simply absent.
pub trait MetadataReader: Send + Sync {
    fn read(&self, path: &Path) -> MetadataMap;
}

/// Default reader: `exiftool -j -n` (JSON output, unformatted values).
pub struct ExiftoolReader;

impl MetadataReader for ExiftoolReader {
    fn read(&self, path: &Path) -> MetadataMap {
        let output = match Command::new("exiftool")
            .arg("-j")
            .arg("-n")
            .arg(path)
            .output()
        {
            Ok(o) if o.status.success() => o,
            Ok(o) => {
                tracing::warn!(path = %path.display(), status = %o.status, "exiftool failed, continuing without metadata");
                return MetadataMap::new();
            }
            Err(e) => {
                tracing::warn!(error = %e, "exiftool unavailable, continuing without metadata");
                return MetadataMap::new();
            }
        };

        let parsed: Result<serde_json::Value, _> = serde_json::from_slice(&output.stdout);
        let Ok(serde_json::Value::Array(entries)) = parsed else {
            tracing::warn!(path = %path.display(), "unexpected exiftool output, continuing without metadata");
            return MetadataMap::new();
        };
        let Some(serde_json::Value::Object(fields)) = entries.into_iter().next() else {
            return MetadataMap::new();
        };

        fields
            .into_iter()
            .map(|(k, v)| {
                let value = match v {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, value)
            })
            .collect()
    }
}
