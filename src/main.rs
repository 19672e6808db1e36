//! MISP IOC Server
//! HTTP tool surface over MISP IOC retrieval and normalization

use anyhow::{Context, Result};
use clap::{Arg, Command};
use misp_ioc_server::client::MispClient;
use misp_ioc_server::config::Config;
use misp_ioc_server::handlers::{create_router, AppState, SERVER_VERSION};
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // .env first so both the log filter and the config see it
    dotenvy::dotenv().ok();
    init_tracing();

    let matches = Command::new("misp-ioc-server")
        .version(SERVER_VERSION)
        .author("SIEM Team")
        .about("MISP IOC retrieval and normalization service")
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Server bind host"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Server port")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("check-config")
                .long("check-config")
                .help("Validate configuration and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let mut config = Config::from_env().context("Failed to load configuration")?;

    if let Some(host) = matches.get_one::<String>("host") {
        config.server.host = host.clone();
    }

    if let Some(port) = matches.get_one::<u16>("port") {
        config.server.port = *port;
    }

    if matches.get_flag("check-config") {
        match config.misp.credentials() {
            Ok(creds) => {
                info!("Configuration is valid; MISP endpoint: {}", creds.url);
                return Ok(());
            }
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        }
    }

    let config = Arc::new(config);
    let client =
        Arc::new(MispClient::new(config.clone()).context("Failed to build MISP client")?);

    if config.misp.url.is_none() || config.misp.api_key.is_none() {
        warn!("MISP_URL / MISP_API_KEY not fully configured; retrieval operations will fail until they are set");
    }

    let app = create_router(AppState {
        config: config.clone(),
        client,
    })
    .layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
    );

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("MISP IOC Server listening on {}", addr);
    info!("Search window: {}", config.misp.search_window);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "misp_ioc_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
