use anyhow::{Context, Result};
use axum::Router;
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod gateway;
mod handlers;
mod models;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // --- Parse config; a missing gateway URL or key stops here ---
    let cfg = config::AppConfig::from_env_and_args()?;

    tracing::info!("Starting cybersolution with config: {:?}", cfg);

    if !cfg.static_dir.is_dir() {
        tracing::warn!(
            "Static directory {} not found; pages will answer 404",
            cfg.static_dir.display()
        );
    }

    // --- Initialize gateway client ---
    let gateway = gateway::supabase::SupabaseGateway::new(
        &cfg.gateway_url,
        cfg.gateway_key.clone(),
        cfg.bucket.clone(),
    )
    .context("configuring gateway client")?;
    tracing::debug!("Gateway client ready: {:?}", gateway);

    // --- Build router ---
    let state = state::AppState::new(Arc::new(gateway));
    let app: Router =
        routes::routes::routes(&cfg.static_dir, cfg.max_upload_bytes).with_state(state);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
