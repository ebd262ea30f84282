//! edital-api server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info};

use edital_api::{build_analysis_service, router, telemetry, ApiConfig, AppState, Collaborators};
use edital_db::{Database, FilesystemBackend};
use edital_inference::GeminiBackend;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env()?;
    let log_settings = telemetry::LogSettings::from_env(config.trace_log_path());
    let _log_guards = telemetry::init(&log_settings);

    info!(
        log_format = %log_settings.format,
        log_file = ?log_settings.file,
        trace_log = ?log_settings.trace_log,
        "Logging initialized"
    );

    let storage = FilesystemBackend::new(&config.upload_dir);
    if let Err(e) = storage.validate().await {
        error!(upload_dir = %config.upload_dir.display(), error = %e, "Upload directory is not usable");
        anyhow::bail!("upload directory check failed: {}", e);
    }

    let db = Database::connect(&config.database_url).await?;
    let gemini = GeminiBackend::new(config.inference.gemini.clone())?;
    if config.inference.gemini.api_key.is_none() {
        error!("GEMINI_API_KEY is not set; analysis requests will fail until it is configured");
    }

    let analysis = build_analysis_service(
        &config,
        Collaborators {
            documents: db.documents.clone(),
            bidding_processes: db.bidding_processes.clone(),
            analyses: db.analyses.clone(),
            storage: Arc::new(storage),
            generation: Arc::new(gemini),
        },
    )?;
    let app = router(AppState::new(analysis), &config.allowed_origins);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        models = %config.inference.models.join(","),
        upload_dir = %config.upload_dir.display(),
        "Starting server on {}",
        addr
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
