//! `parley serve` - run the HTTP server until Ctrl+C / SIGTERM.

use std::path::Path;

use anyhow::Context;
use parley_core::lifecycle::registry::RequestRegistry;
use parley_infra::config::{Secrets, env};
use parley_infra::crypto::secret::generate_session_secret;
use parley_infra::llm::create_provider;
use parley_types::config::AppConfig;

use crate::http::router::build_router;
use crate::state::{AppState, open_database};

pub async fn run(
    config: AppConfig,
    data_dir: &Path,
    host: Option<String>,
    port: Option<u16>,
    quiet: bool,
) -> anyhow::Result<()> {
    let secrets = Secrets::from_env();
    let api_key = secrets
        .api_key
        .with_context(|| format!("{} is not set", env::API_KEY))?;
    let session_secret = secrets.session_secret.unwrap_or_else(|| {
        tracing::warn!(
            "{} is not set; using an ephemeral secret, sessions will not survive a restart",
            env::SESSION_SECRET
        );
        generate_session_secret()
    });

    let provider = create_provider(&config.llm, Some(api_key))?;
    let db_pool = open_database(&config, data_dir).await?;

    let state = AppState::new(db_pool.clone(), provider, &config, &session_secret);
    let registry = state.registry.clone();
    let router = build_router(state);

    let host = host.unwrap_or(config.server.host);
    let port = port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "listening");

    if !quiet {
        println!(
            "  {} Parley listening on {}",
            console::style("⚡").bold(),
            console::style(format!("http://{addr}")).cyan()
        );
        println!("  {}", console::style("Press Ctrl+C to stop").dim());
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(registry))
        .await?;

    db_pool.close().await;
    if !quiet {
        println!("\n  Server stopped.");
    }
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM, then cancel every in-flight completion so
/// graceful shutdown does not wait on the LLM.
async fn shutdown_signal(registry: RequestRegistry) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => tracing::warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    let cancelled = registry.cancel_all();
    tracing::info!(cancelled, "shutdown signal received; stopping server");
}
