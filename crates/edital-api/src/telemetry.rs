//! Logging initialization.
//!
//! Environment variables:
//!   LOG_FORMAT  - "json" or "text" (default: "text")
//!   LOG_FILE    - path to log file (optional, enables daily-rotated file logging)
//!   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
//!   RUST_LOG    - standard env filter (default: "edital_api=debug,edital_inference=debug,tower_http=debug")
//!
//! Independently of the above, pipeline events can be appended as JSON lines
//! to a trace log inside the upload directory.
//!
//! Events carry `subsystem` and `component` fields. Levels: ERROR for
//! degraded service, WARN for skip-and-continue or retry, INFO for request
//! completion and model success, DEBUG for decision points, TRACE for
//! per-candidate detail.

use std::path::{Path, PathBuf};

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::Targets,
    layer::{Layered, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

const DEFAULT_FILTER: &str = "edital_api=debug,edital_inference=debug,tower_http=debug";

type BoxedLayer = Box<dyn Layer<Layered<EnvFilter, Registry>> + Send + Sync>;

/// Logging settings.
#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    pub format: String,
    pub file: Option<PathBuf>,
    pub ansi: Option<bool>,
    /// Append-only pipeline trace log.
    pub trace_log: Option<PathBuf>,
}

impl LogSettings {
    pub fn from_env(trace_log: Option<PathBuf>) -> Self {
        Self {
            format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
            file: std::env::var("LOG_FILE").ok().map(PathBuf::from),
            ansi: std::env::var("LOG_ANSI")
                .ok()
                .map(|v| v == "true" || v == "1"),
            trace_log,
        }
    }

    fn is_json(&self) -> bool {
        self.format == "json"
    }
}

/// Install the global subscriber. Keep the returned guards alive until exit.
pub fn init(settings: &LogSettings) -> Vec<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let mut guards = Vec::new();
    let mut layers: Vec<BoxedLayer> = Vec::new();

    if let Some(path) = &settings.file {
        let (dir, name) = split_path(path, "edital-api.log");
        let file_appender = tracing_appender::rolling::daily(dir, name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        guards.push(guard);

        if settings.is_json() {
            layers.push(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .boxed(),
            );
        } else {
            // no ANSI in files unless asked for
            layers.push(
                tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(settings.ansi.unwrap_or(false))
                    .boxed(),
            );
        }
    } else if settings.is_json() {
        layers.push(tracing_subscriber::fmt::layer().json().boxed());
    } else {
        let mut layer = tracing_subscriber::fmt::layer();
        if let Some(ansi) = settings.ansi {
            layer = layer.with_ansi(ansi);
        }
        layers.push(layer.boxed());
    }

    if let Some(path) = &settings.trace_log {
        let (dir, name) = split_path(path, edital_core::defaults::TRACE_LOG_FILE);
        if std::fs::create_dir_all(&dir).is_ok() {
            let appender = tracing_appender::rolling::never(dir, name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            guards.push(guard);
            let pipeline_only = Targets::new()
                .with_target("edital_api", LevelFilter::DEBUG)
                .with_target("edital_inference", LevelFilter::DEBUG);
            layers.push(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_filter(pipeline_only)
                    .boxed(),
            );
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .init();

    guards
}

fn split_path(path: &Path, default_name: &str) -> (PathBuf, String) {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf();
    let name = path
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or(default_name)
        .to_string();
    (dir, name)
}
