use anyhow::Result;
use clap::Parser;
use eureka_app::{AppState, build_router};
use eureka_common::EurekaError;
use eureka_common::observability::{LogConfig, init_logging};
use eureka_config::{EurekaConfig, EurekaConfigLoader};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

const DEFAULT_CONFIG_FILE: &str = "eureka.yaml";

#[derive(Debug, Parser)]
#[command(name = "eureka-search", version, about = "Search the Eureka interpretation index over HTTP")]
struct Cli {
    /// Config file; when omitted `eureka.yaml` is used if present.
    #[arg(short, long, env = "EUREKA_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overrides `server.bind`.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await?;
    Ok(())
}

fn load_config(cli: &Cli) -> eureka_common::Result<EurekaConfig> {
    let loader = match &cli.config {
        Some(path) => EurekaConfigLoader::new().with_file(path),
        None => EurekaConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    let mut cfg = loader
        .load()
        .map_err(|e| EurekaError::Config(e.to_string()))?;
    if let Some(bind) = &cli.bind {
        cfg.server.bind = bind.clone();
    }
    Ok(cfg)
}

async fn run(cli: Cli) -> eureka_common::Result<()> {
    // 1) Load config (env wins)
    let cfg = load_config(&cli)?;

    // 2) Logging from the `logging` section
    let log_path = init_logging(LogConfig {
        app_name: "eureka-search",
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cfg.logging.emit_stderr,
        format: cfg.logging.format,
        default_filter: cfg.logging.filter.clone(),
    })?;

    let state = AppState::from_config(&cfg).map_err(|e| EurekaError::Config(e.to_string()))?;
    info!(
        mode = ?cfg.search.mode,
        auth_enabled = state.auth.is_enabled(),
        log_path = %log_path.display(),
        "server.config"
    );

    let app = build_router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind(&cfg.server.bind).await?;
    info!(bind = %cfg.server.bind, "server.listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server.stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
