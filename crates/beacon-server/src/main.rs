use anyhow::Result;
use beacon_storage::{JsonFileStore, NotificationStore};
use chrono::Utc;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use beacon_server::app;
use beacon_server::config::ServerConfig;
use beacon_server::seed;
use beacon_server::state::AppState;

#[allow(clippy::print_stderr)]
fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  beacon-server [config.toml]                          Start the server");
    eprintln!("  beacon-server init-seed <config.toml> <seed.json>    Import notifications from a seed file");
}

#[tokio::main]
async fn main() -> Result<()> {
    beacon_common::id::init(1, 1);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("beacon=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("init-seed") => {
            let config_path = args.get(2).ok_or_else(|| {
                print_usage();
                anyhow::anyhow!("init-seed requires <config.toml> and <seed.json> arguments")
            })?;
            let seed_path = args.get(3).ok_or_else(|| {
                print_usage();
                anyhow::anyhow!("init-seed requires <seed.json> argument")
            })?;
            run_init_seed(config_path, seed_path)
        }
        Some("--help" | "-h") => {
            print_usage();
            Ok(())
        }
        _ => {
            let config_path = args
                .get(1)
                .map(|s| s.as_str())
                .unwrap_or("config/server.toml");
            run_server(config_path).await
        }
    }
}

fn open_store(config: &ServerConfig) -> Result<Arc<dyn NotificationStore>> {
    if config.persist {
        Ok(Arc::new(JsonFileStore::open(Path::new(&config.data_file))?))
    } else {
        tracing::warn!("Persistence disabled, notifications are kept in memory only");
        Ok(Arc::new(JsonFileStore::in_memory()))
    }
}

/// Import notifications from a JSON seed file into the configured document.
fn run_init_seed(config_path: &str, seed_path: &str) -> Result<()> {
    let config = ServerConfig::load_or_default(config_path)?;
    if !config.persist {
        anyhow::bail!("init-seed requires persist = true");
    }
    let store = JsonFileStore::open(Path::new(&config.data_file))?;
    let inserted = seed::init_from_seed_file(&store, seed_path)?;
    if let Some(path) = store.path() {
        tracing::info!(path = %path.display(), inserted, "Seed written to notification document");
    }
    Ok(())
}

async fn run_server(config_path: &str) -> Result<()> {
    let config = ServerConfig::load_or_default(config_path)?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        http_port = config.http_port,
        data_file = %config.data_file,
        persist = config.persist,
        "beacon-server starting"
    );

    let store = open_store(&config)?;

    if config.seed_defaults {
        if let Err(e) = seed::init_default_notifications(store.as_ref()) {
            tracing::error!(error = %e, "Failed to seed default notifications");
        }
    }

    let http_addr: SocketAddr = format!("{}:{}", config.bind_addr, config.http_port).parse()?;
    let state = AppState {
        store,
        start_time: Utc::now(),
        config: Arc::new(config),
    };
    let app = app::build_http_app(state);

    let listener = tokio::net::TcpListener::bind(http_addr).await?;
    tracing::info!(addr = %http_addr, docs = "/docs", "HTTP server listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            signal::ctrl_c().await.ok();
            tracing::info!("Shutting down gracefully");
        })
        .await
    {
        tracing::error!(error = %e, "HTTP server error");
    }

    tracing::info!("Server stopped");
    Ok(())
}
