//! bookmarko HTTP server.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use bookmarko_api::services::AuthService;
use bookmarko_api::{router, AppState, ServerConfig, StorageBackend};
use bookmarko_db::{log_pool_metrics, Database, MemoryStore, PoolConfig};
use bookmarko_extract::{ExtractorConfig, MetadataExtractor};

const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(3600);

/// Install the global subscriber.
///
/// Environment variables:
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   LOG_FILE    - path to a log file, rotated daily (default: stdout)
///   LOG_ANSI    - "true"/"false" to force ANSI colors on or off
///   RUST_LOG    - env filter (default: "bookmarko_api=debug,tower_http=debug")
///
/// The returned guard flushes the file writer and must live as long as the
/// process.
fn init_tracing() -> Option<WorkerGuard> {
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let log_file = std::env::var("LOG_FILE").ok().filter(|p| !p.trim().is_empty());
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bookmarko_api=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    let guard = match log_file.as_deref() {
        Some(path) => {
            let path = Path::new(path);
            let dir = path.parent().unwrap_or(Path::new("."));
            let file_name = path
                .file_name()
                .and_then(|f| f.to_str())
                .unwrap_or("bookmarko-api.log");
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, file_name));

            if json {
                registry
                    .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
                    .init();
            } else {
                registry
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(writer)
                            .with_ansi(log_ansi.unwrap_or(false)),
                    )
                    .init();
            }
            Some(guard)
        }
        None => {
            if json {
                registry.with(tracing_subscriber::fmt::layer().json()).init();
            } else {
                let mut layer = tracing_subscriber::fmt::layer();
                if let Some(ansi) = log_ansi {
                    layer = layer.with_ansi(ansi);
                }
                registry.with(layer).init();
            }
            None
        }
    };

    let log_format = if json { "json" } else { "text" };
    info!(
        log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );
    guard
}

/// Hourly: delete expired sessions and, with PostgreSQL, report pool health.
fn spawn_maintenance(auth: AuthService, db: Option<Database>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(MAINTENANCE_INTERVAL);
        loop {
            interval.tick().await;
            if let Some(db) = &db {
                log_pool_metrics(db.pool());
            }
            match auth.purge_expired_sessions().await {
                Ok(0) => {}
                Ok(purged) => info!(subsystem = "auth", purged, "Purged expired sessions"),
                Err(e) => error!(subsystem = "auth", error = %e, "Session purge failed"),
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = init_tracing();

    let config = ServerConfig::from_env()?;
    let extractor_config = ExtractorConfig::from_env()?;
    let extractor = Arc::new(MetadataExtractor::from_config(&extractor_config)?);
    info!(
        fallback_configured = extractor.has_secondary(),
        timeout_secs = extractor_config.timeout.as_secs(),
        "Metadata extractor ready"
    );

    let (state, db) = match config.storage {
        StorageBackend::Postgres => {
            let db = Database::connect(&config.database_url, PoolConfig::from_env())
                .await?;
            db.migrate().await?;
            info!("Database connected and migrated");
            let state = AppState::from_database(&db, extractor, config.session_ttl);
            (state, Some(db))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; all data is lost on restart");
            let store = Arc::new(MemoryStore::new());
            (AppState::in_memory(store, extractor, config.session_ttl), None)
        }
    };
    spawn_maintenance(state.auth.clone(), db);

    let app = router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
