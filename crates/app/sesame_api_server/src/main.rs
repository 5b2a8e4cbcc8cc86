//! Sesame API server binary.
//!
//! Prints `{"addr": "..."}` to stdout once bound so a supervisor can
//! discover the address when listening on port 0.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use sesame_api::AppState;
use sesame_api::services::backend::HttpAuthenticator;
use sesame_core::config::{CONFIG_PATH_ENV, SecurityConfig};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const DEFAULT_LOG_FILTER: &str = "info,sesame_api=debug,sesame_core=debug";

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "sesame_api_server", about = "Sesame API server")]
struct Args {
    /// Path to the YAML configuration file.
    #[arg(long, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// Address to listen on; overrides `server.bind_addr`.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Write logs to stderr so stdout is reserved for the JSON address message.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let args = Args::parse();

    let mut config = SecurityConfig::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }
    info!(
        backend = %config.backend.url,
        base_path = %config.server.base_path,
        multitenancy = config.multitenancy.enabled,
        anonymous = config.auth.anonymous_auth_enabled,
        "starting sesame_api_server"
    );

    let authenticator = Arc::new(HttpAuthenticator::new(&config.backend)?);
    let bind_addr = config.server.bind_addr.clone();
    let state = AppState::new(Arc::new(config), authenticator);
    let app = sesame_api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    let local_addr = listener.local_addr()?;

    println!("{}", serde_json::json!({ "addr": local_addr.to_string() }));
    info!(addr = %local_addr, "REST API listening");

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("unable to listen for shutdown signal: {e}");
                return;
            }
            info!("shutdown signal received");
            shutdown.cancel();
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    Ok(())
}
