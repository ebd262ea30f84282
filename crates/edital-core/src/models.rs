//! Request-scoped data types for the edital analysis pipeline.
//!
//! Nothing here is persisted by the pipeline itself. Records coming from the
//! relational store are plain snapshots handed over by the lookup traits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

use crate::defaults;

// =============================================================================
// FILE REFERENCES
// =============================================================================

/// Normalized identifier of a previously uploaded artifact.
///
/// Raw references may be percent-encoded and may carry a `?query` suffix
/// (signed URLs, cache busters). The normalized form has both removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileReference(String);

impl FileReference {
    /// Normalize a raw reference. Returns `None` when nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let decoded = urlencoding::decode(raw.trim())
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| raw.trim().to_string());
        let name = match decoded.find('?') {
            Some(idx) => &decoded[..idx],
            None => decoded.as_str(),
        };
        let name = name.trim();
        if name.is_empty() {
            None
        } else {
            Some(Self(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the name carries the `<tenantId>_` upload prefix.
    pub fn has_tenant_prefix(&self, tenant_id: Uuid) -> bool {
        self.0.starts_with(&format!("{}_", tenant_id))
    }

    /// The name as written inside stored URLs: plain, then percent-encoded when that differs.
    pub fn url_forms(&self) -> Vec<String> {
        let encoded = urlencoding::encode(&self.0).into_owned();
        if encoded == self.0 {
            vec![encoded]
        } else {
            vec![self.0.clone(), encoded]
        }
    }

    /// True when a stored URL or link list mentions this file, encoded or not.
    pub fn appears_in(&self, text: &str) -> bool {
        if self.url_forms().iter().any(|form| text.contains(form.as_str())) {
            return true;
        }
        urlencoding::decode(text).is_ok_and(|decoded| decoded.contains(self.0.as_str()))
    }
}

impl std::fmt::Display for FileReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file reference proven to belong to the requesting tenant, with its bytes.
#[derive(Debug, Clone)]
pub struct AuthorizedFile {
    pub reference: FileReference,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl AuthorizedFile {
    /// Wrap loaded bytes, detecting the MIME type from magic bytes.
    pub fn from_bytes(reference: FileReference, data: Vec<u8>) -> Self {
        let mime_type = infer::get(&data)
            .map(|kind| kind.mime_type().to_string())
            .unwrap_or_else(|| defaults::DEFAULT_MIME_TYPE.to_string());
        Self {
            reference,
            mime_type,
            data,
        }
    }
}

// =============================================================================
// CONVERSATION
// =============================================================================

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Map a client-supplied role: `user` stays user, anything else is the assistant.
    pub fn from_client(role: &str) -> Self {
        if role == "user" {
            Role::User
        } else {
            Role::Assistant
        }
    }
}

/// One ordered piece of a turn's content.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentSegment {
    Text(String),
    File {
        name: String,
        mime_type: String,
        data: Vec<u8>,
    },
}

impl ContentSegment {
    pub fn text(text: impl Into<String>) -> Self {
        ContentSegment::Text(text.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentSegment::Text(t) => Some(t),
            ContentSegment::File { .. } => None,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, ContentSegment::File { .. })
    }
}

impl From<AuthorizedFile> for ContentSegment {
    fn from(file: AuthorizedFile) -> Self {
        ContentSegment::File {
            name: file.reference.0,
            mime_type: file.mime_type,
            data: file.data,
        }
    }
}

/// A role plus its ordered content segments.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationTurn {
    pub role: Role,
    pub segments: Vec<ContentSegment>,
}

impl ConversationTurn {
    pub fn user(segments: Vec<ContentSegment>) -> Self {
        Self {
            role: Role::User,
            segments,
        }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self::user(vec![ContentSegment::text(text)])
    }
}

/// A chat message as sent by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientMessage {
    pub role: String,
    pub text: String,
}

// =============================================================================
// ANALYSIS PAYLOAD
// =============================================================================

/// One entry of the required-documents checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredDocument {
    /// Citation of the edital clause; empty when the edital has none.
    #[serde(default)]
    pub item: String,
    pub description: String,
}

/// Parsed model output for an edital analysis.
///
/// Kept as a loose JSON object: the model is instructed, not forced, to
/// follow the shape, so accessors tolerate missing or mistyped fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisPayload(Map<String, JsonValue>);

impl AnalysisPayload {
    pub fn new(object: Map<String, JsonValue>) -> Self {
        Self(object)
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    pub fn process_summary(&self) -> Option<&Map<String, JsonValue>> {
        self.0.get("process").and_then(JsonValue::as_object)
    }

    pub fn analysis(&self) -> Option<&Map<String, JsonValue>> {
        self.0.get("analysis").and_then(JsonValue::as_object)
    }

    /// Required documents grouped by category.
    ///
    /// Entries without a non-empty `description` are dropped.
    pub fn required_documents(&self) -> Vec<(String, Vec<RequiredDocument>)> {
        let Some(categories) = self
            .analysis()
            .and_then(|a| a.get("requiredDocuments"))
            .and_then(JsonValue::as_object)
        else {
            return Vec::new();
        };

        categories
            .iter()
            .map(|(category, entries)| {
                let docs = entries
                    .as_array()
                    .map(|list| {
                        list.iter()
                            .filter_map(|e| {
                                serde_json::from_value::<RequiredDocument>(e.clone()).ok()
                            })
                            .filter(|d| !d.description.trim().is_empty())
                            .collect()
                    })
                    .unwrap_or_default();
                (category.clone(), docs)
            })
            .collect()
    }

    pub fn into_inner(self) -> Map<String, JsonValue> {
        self.0
    }
}

// =============================================================================
// PERSISTED RECORD SNAPSHOTS
// =============================================================================

/// A registered compliance document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub url: String,
}

/// The subset of a bidding process the pipeline reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiddingProcessRecord {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Comma-joined list of links to the process's files.
    pub link: Option<String>,
}

impl BiddingProcessRecord {
    /// Trimmed, non-empty entries of the comma-joined link field.
    pub fn links(&self) -> Vec<&str> {
        self.link
            .as_deref()
            .map(|l| l.split(',').map(str::trim).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }
}

/// A previously recorded AI analysis of a bidding process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub bidding_process_id: Uuid,
    /// JSON array of the file names the analysis was run on.
    pub source_file_names: Option<String>,
    pub full_summary: Option<String>,
    pub bidding_items: Option<String>,
    pub qualification_requirements: Option<String>,
    pub pricing_considerations: Option<String>,
    pub penalties: Option<String>,
    pub required_documents: Option<String>,
    pub deadlines: Option<String>,
    pub irregularities_flags: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl AnalysisRecord {
    /// File names recorded as the analysis source.
    ///
    /// The column holds a JSON array; older rows hold a comma-joined list.
    pub fn source_file_names(&self) -> Vec<String> {
        let Some(raw) = self.source_file_names.as_deref().map(str::trim) else {
            return Vec::new();
        };
        if raw.is_empty() {
            return Vec::new();
        }
        match serde_json::from_str::<Vec<String>>(raw) {
            Ok(names) => names
                .into_iter()
                .filter(|n| !n.trim().is_empty())
                .collect(),
            Err(_) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        }
    }

    /// Textual stand-in for the original PDFs, built from the summary fields.
    ///
    /// Only available when a non-empty `full_summary` exists.
    pub fn fallback_context(&self) -> Option<String> {
        let summary = self.full_summary.as_deref().map(str::trim)?;
        if summary.is_empty() {
            return None;
        }

        let sections = [
            ("Resumo geral", Some(summary)),
            ("Itens licitados", self.bidding_items.as_deref()),
            (
                "Requisitos de habilitação",
                self.qualification_requirements.as_deref(),
            ),
            (
                "Considerações de preço",
                self.pricing_considerations.as_deref(),
            ),
            ("Penalidades", self.penalties.as_deref()),
            ("Documentos exigidos", self.required_documents.as_deref()),
            ("Prazos", self.deadlines.as_deref()),
            ("Alertas de irregularidade", self.irregularities_flags.as_deref()),
        ];

        let body = sections
            .iter()
            .filter_map(|(label, value)| {
                let value = value.map(str::trim).filter(|v| !v.is_empty())?;
                Some(format!("## {}\n{}", label, value))
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        Some(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_reference_strips_encoding_and_query() {
        let r = FileReference::parse("edital%20final.pdf?token=abc").unwrap();
        assert_eq!(r.as_str(), "edital final.pdf");
    }

    #[test]
    fn test_file_reference_url_forms() {
        let plain = FileReference::parse("anexo_i.pdf").unwrap();
        assert_eq!(plain.url_forms(), vec!["anexo_i.pdf".to_string()]);

        let spaced = FileReference::parse("edital%20final.pdf").unwrap();
        assert_eq!(
            spaced.url_forms(),
            vec!["edital final.pdf".to_string(), "edital%20final.pdf".to_string()]
        );
    }

    #[test]
    fn test_file_reference_appears_in_encoded_link() {
        let r = FileReference::parse("edital final.pdf").unwrap();
        assert!(r.appears_in("https://app.example.com/uploads/edital%20final.pdf"));
        assert!(r.appears_in("/uploads/edital final.pdf"));
        // Lowercase hex is not what `encode` produces; decoding the link covers it.
        let accented = FileReference::parse("edital ção.pdf").unwrap();
        assert!(accented.appears_in("/uploads/edital%20%c3%a7%c3%a3o.pdf"));
        assert!(!r.appears_in("https://portal.gov.br/edital_final.pdf"));
    }

    #[test]
    fn test_file_reference_empty_is_none() {
        assert!(FileReference::parse("").is_none());
        assert!(FileReference::parse("   ").is_none());
        assert!(FileReference::parse("?x=1").is_none());
    }

    #[test]
    fn test_file_reference_invalid_utf8_escape_kept_raw() {
        let r = FileReference::parse("bad%FFname.pdf").unwrap();
        assert_eq!(r.as_str(), "bad%FFname.pdf");
    }

    #[test]
    fn test_tenant_prefix() {
        let tenant = Uuid::new_v4();
        let other = Uuid::new_v4();
        let r = FileReference::parse(&format!("{}_edital.pdf", tenant)).unwrap();
        assert!(r.has_tenant_prefix(tenant));
        assert!(!r.has_tenant_prefix(other));
    }

    #[test]
    fn test_authorized_file_detects_pdf() {
        let r = FileReference::parse("a.pdf").unwrap();
        let file = AuthorizedFile::from_bytes(r, b"%PDF-1.7\n...".to_vec());
        assert_eq!(file.mime_type, "application/pdf");
    }

    #[test]
    fn test_authorized_file_defaults_mime() {
        let r = FileReference::parse("a.bin").unwrap();
        let file = AuthorizedFile::from_bytes(r, vec![0, 1, 2]);
        assert_eq!(file.mime_type, defaults::DEFAULT_MIME_TYPE);
    }

    #[test]
    fn test_role_from_client() {
        assert_eq!(Role::from_client("user"), Role::User);
        assert_eq!(Role::from_client("model"), Role::Assistant);
        assert_eq!(Role::from_client("assistant"), Role::Assistant);
        assert_eq!(Role::from_client("USER"), Role::Assistant);
    }

    #[test]
    fn test_bidding_links_split_and_trim() {
        let record = BiddingProcessRecord {
            id: Uuid::nil(),
            tenant_id: Uuid::nil(),
            link: Some(" /uploads/a.pdf , ,https://x/b.pdf".to_string()),
        };
        assert_eq!(record.links(), vec!["/uploads/a.pdf", "https://x/b.pdf"]);
    }

    #[test]
    fn test_source_file_names_json_and_csv() {
        let mut record = AnalysisRecord {
            source_file_names: Some(r#"["a.pdf","b.pdf"]"#.to_string()),
            ..Default::default()
        };
        assert_eq!(record.source_file_names(), vec!["a.pdf", "b.pdf"]);

        record.source_file_names = Some("a.pdf, b.pdf".to_string());
        assert_eq!(record.source_file_names(), vec!["a.pdf", "b.pdf"]);

        record.source_file_names = None;
        assert!(record.source_file_names().is_empty());
    }

    #[test]
    fn test_fallback_context_requires_summary() {
        let record = AnalysisRecord {
            penalties: Some("multa de 10%".to_string()),
            ..Default::default()
        };
        assert!(record.fallback_context().is_none());

        let record = AnalysisRecord {
            full_summary: Some("Pregão eletrônico".to_string()),
            penalties: Some("multa de 10%".to_string()),
            deadlines: Some("  ".to_string()),
            ..Default::default()
        };
        let ctx = record.fallback_context().unwrap();
        assert!(ctx.contains("## Resumo geral\nPregão eletrônico"));
        assert!(ctx.contains("## Penalidades\nmulta de 10%"));
        assert!(!ctx.contains("Prazos"));
    }

    #[test]
    fn test_required_documents_tolerates_bad_entries() {
        let value = json!({
            "process": {"title": "Pregão 12/2026"},
            "analysis": {
                "requiredDocuments": {
                    "Habilitação Jurídica": [
                        {"item": "7.1.a", "description": "Contrato social"},
                        {"item": "", "description": "Procuração"},
                        {"item": "7.1.c", "description": ""},
                        "garbage"
                    ],
                    "Fiscal": "not a list"
                }
            }
        });
        let payload = AnalysisPayload::new(value.as_object().unwrap().clone());
        let docs = payload.required_documents();
        assert_eq!(docs.len(), 2);
        let juridica = &docs.iter().find(|(c, _)| c == "Habilitação Jurídica").unwrap().1;
        assert_eq!(juridica.len(), 2);
        assert_eq!(juridica[1].item, "");
        let fiscal = &docs.iter().find(|(c, _)| c == "Fiscal").unwrap().1;
        assert!(fiscal.is_empty());
        assert!(payload.process_summary().is_some());
    }
}
