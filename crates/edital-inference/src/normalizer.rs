//! Recovery of the analysis JSON object from raw model text.
//!
//! Models asked for JSON still wrap it in Markdown fences or lead with a
//! sentence of prose. Normalization strips fences, slices from the first `{`
//! to the last `}` and parses what is left. The result must be a non-empty
//! JSON object.
//!
//! When parsing fails, the candidate text is written to a single diagnostic
//! file that every failure overwrites (last writer wins).

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use edital_core::{AnalysisPayload, Error, Result};

/// Opening fence (with optional `json` tag) or closing fence.
static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)```json|```").expect("valid regex literal"));

/// Remove every Markdown code fence marker and trim the result.
pub fn strip_code_fences(raw: &str) -> String {
    FENCE_RE.replace_all(raw, "").trim().to_string()
}

/// Slice from the first `{` to the last `}` inclusive.
///
/// Returns the input unchanged when no such span exists, so the parse error
/// reports on what the model actually produced.
pub fn slice_json_object(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => text,
    }
}

/// Parses model output into an [`AnalysisPayload`].
#[derive(Debug, Clone)]
pub struct ResponseNormalizer {
    dump_path: Option<PathBuf>,
}

impl ResponseNormalizer {
    /// Normalizer that dumps unparseable candidates to `dump_path`.
    pub fn new(dump_path: impl Into<PathBuf>) -> Self {
        Self {
            dump_path: Some(dump_path.into()),
        }
    }

    pub fn without_dump() -> Self {
        Self { dump_path: None }
    }

    pub fn dump_path(&self) -> Option<&Path> {
        self.dump_path.as_deref()
    }

    pub async fn normalize(&self, raw: &str) -> Result<AnalysisPayload> {
        let stripped = strip_code_fences(raw);
        let candidate = slice_json_object(&stripped);

        let failure = match serde_json::from_str::<JsonValue>(candidate) {
            Ok(JsonValue::Object(map)) if !map.is_empty() => {
                debug!(
                    subsystem = "inference",
                    component = "normalizer",
                    keys = map.len(),
                    "Analysis response parsed"
                );
                return Ok(AnalysisPayload::new(map));
            }
            Ok(JsonValue::Object(_)) => "response is an empty JSON object".to_string(),
            Ok(other) => format!("expected a JSON object, got {}", json_kind(&other)),
            Err(e) => e.to_string(),
        };

        let dump_path = self.dump(candidate).await;
        warn!(
            subsystem = "inference",
            component = "normalizer",
            raw_len = raw.len(),
            error = %failure,
            dump_path = ?dump_path,
            "Model response is not a usable JSON object"
        );
        Err(Error::MalformedResponse {
            message: failure,
            dump_path,
        })
    }

    async fn dump(&self, candidate: &str) -> Option<PathBuf> {
        let path = self.dump_path.as_ref()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                warn!(path = %parent.display(), error = %e, "Failed to create dump directory");
                return None;
            }
        }
        match tokio::fs::write(path, candidate).await {
            Ok(()) => Some(path.clone()),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to write response dump");
                None
            }
        }
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
