mod config;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::Router;
use clap::Parser;
use tokio::{net::TcpListener, task::JoinHandle};
use tollgate::{SqliteRepositoryProvider, Tollgate, TollgateBuilder};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Cli, Command};

const DEFAULT_LOG_FILTER: &str =
    "info,tollgate=debug,tollgate_core=debug,tollgate_axum=debug,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let repositories = Arc::new(
        SqliteRepositoryProvider::connect(&cli.database_url)
            .await
            .with_context(|| format!("Failed to open database {}", cli.database_url))?,
    );

    let tollgate = TollgateBuilder::new()
        .with_repositories(repositories.clone())
        .with_session_config(cli.session_config()?)
        .with_lockout_policy(cli.lockout_policy()?)
        .apply_migrations(true)
        .build()
        .await
        .context("Failed to initialise tollgate")?;

    if let Some(Command::Migrate) = cli.command {
        info!(database_url = %cli.database_url, "Migrations applied");
        repositories.close().await;
        return Ok(());
    }

    let tollgate = Arc::new(tollgate);
    let cleanup = spawn_session_cleanup(
        tollgate.clone(),
        Duration::from_secs(cli.session_cleanup_minutes.max(1) * 60),
    );

    let auth_routes = tollgate_axum::routes(tollgate)
        .with_cookie_config(cli.cookie_config())
        .trust_proxy_headers(cli.trust_proxy_headers)
        .build();

    let app = Router::new()
        .nest("/api", auth_routes)
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("Failed to bind {}", cli.listen))?;
    info!(address = %cli.listen, "Listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    cleanup.abort();
    repositories.close().await;
    info!("Shut down");

    Ok(())
}

/// Periodically delete expired opaque sessions. JWT mode has nothing to purge.
fn spawn_session_cleanup(
    tollgate: Arc<Tollgate<SqliteRepositoryProvider>>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            if let Err(e) = tollgate.cleanup_expired_sessions().await {
                warn!(error = %e, "Session cleanup failed");
            }
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
