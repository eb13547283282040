use dotenvy::dotenv;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use refiner_shield::api::{self, AppState};
use refiner_shield::config::AppConfig;
use refiner_shield::services::detector::{Detector, ScoreStrategy};
use refiner_shield::services::payments::CheckoutClient;
use refiner_shield::services::refiner::Refiner;
use refiner_shield::services::rewriter::Rewriter;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let config = AppConfig::from_env();
    info!(policy = ?config.segment_policy, "configuration loaded");

    let detector = Arc::new(Detector::new(ScoreStrategy::RandomMock, config.segment_policy));
    let refiner = Arc::new(Refiner::new(detector.clone(), Rewriter::default()));
    let payments = Arc::new(CheckoutClient::new(
        config.stripe_secret_key.clone(),
        config.stripe_price_id.clone(),
    ));

    let state = AppState { detector, refiner, payments };
    let app = api::router(state, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}

/// Initialize logging: console always, plus a per-session log file unless
/// disabled via REFINER_SHIELD_DISABLE_FILE_LOG.
fn init_logging() {
    let disable_file_log = matches!(
        std::env::var("REFINER_SHIELD_DISABLE_FILE_LOG").as_deref(),
        Ok("1") | Ok("true") | Ok("TRUE")
    );

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if disable_file_log {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stdout).with_target(true))
            .init();
        info!("File logging disabled via REFINER_SHIELD_DISABLE_FILE_LOG");
        return;
    }

    let logs_dir = match std::env::var("REFINER_SHIELD_LOG_DIR") {
        Ok(p) if !p.trim().is_empty() => PathBuf::from(p),
        _ => PathBuf::from("logs"),
    };

    if let Err(e) = fs::create_dir_all(&logs_dir) {
        eprintln!("Failed to create logs directory: {}", e);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stdout).with_target(true))
            .init();
        info!("Falling back to console-only logging (log dir not writable)");
        return;
    }

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let log_filename = format!("refiner_shield_{}.log", timestamp);

    // One file per session; log writes stay non-blocking.
    let file_appender = rolling::never(&logs_dir, &log_filename);
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(file_guard);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(fmt::layer().with_writer(std::io::stdout).with_target(true))
        .init();

    info!("=== Refiner Shield Started ===");
    info!("Log file: {}/{}", logs_dir.display(), log_filename);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Best-effort cleanup off the startup path.
    std::thread::spawn(move || cleanup_old_logs(&logs_dir, 30));
}

fn cleanup_old_logs(logs_dir: &PathBuf, keep: usize) {
    let mut entries: Vec<_> = match fs::read_dir(logs_dir) {
        Ok(rd) => rd.filter_map(|e| e.ok()).collect(),
        Err(_) => return,
    };

    entries.retain(|e| {
        let name = e.file_name().to_string_lossy().to_string();
        name.starts_with("refiner_shield_") && name.ends_with(".log")
    });

    if entries.len() <= keep {
        return;
    }

    entries.sort_by_key(|e| {
        e.metadata()
            .and_then(|m| m.modified())
            .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
    });

    let remove_count = entries.len().saturating_sub(keep);
    for entry in entries.into_iter().take(remove_count) {
        let _ = fs::remove_file(entry.path());
    }
}
