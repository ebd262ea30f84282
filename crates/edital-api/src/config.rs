//! Server configuration from environment variables.

use std::path::{Path, PathBuf};

use edital_core::defaults;
use edital_inference::{ConfigError, InferenceConfig};

const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["http://localhost:3000", "http://localhost:5173"];

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Shared directory holding every tenant's uploaded files.
    pub upload_dir: PathBuf,
    /// Path segment identifying links into the local upload namespace.
    pub upload_url_segment: String,
    /// Single-slot dump of the last unparseable analysis response.
    pub failed_json_dump_file: PathBuf,
    pub trace_log_enabled: bool,
    /// Browser origins allowed by CORS.
    pub allowed_origins: Vec<String>,
    pub inference: InferenceConfig,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                value: v.clone(),
            })?,
            None => defaults::SERVER_PORT,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| defaults::SERVER_HOST.to_string()),
            port,
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "postgres://localhost/edital".to_string()),
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(defaults::UPLOAD_DIR)),
            upload_url_segment: lookup("UPLOAD_URL_SEGMENT")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| defaults::UPLOAD_URL_SEGMENT.to_string()),
            failed_json_dump_file: lookup("FAILED_JSON_DUMP_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(defaults::FAILED_JSON_DUMP_FILE)),
            trace_log_enabled: lookup("TRACE_LOG_ENABLED")
                .map(|v| !(v == "false" || v == "0"))
                .unwrap_or(true),
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect()),
            inference: InferenceConfig::from_lookup(&lookup)?,
        })
    }

    /// Dump path; relative names live inside the upload directory.
    pub fn dump_path(&self) -> PathBuf {
        resolve_in(&self.upload_dir, &self.failed_json_dump_file)
    }

    pub fn trace_log_path(&self) -> Option<PathBuf> {
        self.trace_log_enabled
            .then(|| self.upload_dir.join(defaults::TRACE_LOG_FILE))
    }
}

fn resolve_in(dir: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        dir.join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.upload_url_segment, "/uploads/");
        assert_eq!(config.allowed_origins.len(), 2);
        assert_eq!(
            config.dump_path(),
            PathBuf::from("./uploads").join("failed_analysis.json")
        );
        assert_eq!(
            config.trace_log_path(),
            Some(PathBuf::from("./uploads").join("analysis-trace.log"))
        );
    }

    #[test]
    fn test_overrides() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("UPLOAD_DIR", "/srv/uploads"),
            ("FAILED_JSON_DUMP_FILE", "/var/log/edital/failed.json"),
            ("TRACE_LOG_ENABLED", "false"),
            ("GEMINI_MODELS", "m1"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.dump_path(), PathBuf::from("/var/log/edital/failed.json"));
        assert!(config.trace_log_path().is_none());
        assert_eq!(config.inference.models, vec!["m1"]);
    }

    #[test]
    fn test_invalid_port() {
        assert!(ApiConfig::from_lookup(lookup(&[("PORT", "http")])).is_err());
    }
}
