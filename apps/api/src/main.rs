mod config;
mod errors;
mod extraction;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{model_status, OllamaClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting procurement API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the generation service client
    let llm_config = config.llm();
    let llm = OllamaClient::new(llm_config.clone()).context("Failed to build Ollama HTTP client")?;
    info!(
        "LLM client initialized (model: {}, base url: {}, timeout: {:?})",
        llm_config.model, llm_config.base_url, llm_config.timeout
    );

    // Startup probe only; the API still starts when the model is not reachable yet
    let status = model_status(&llm).await;
    if !status.running {
        tracing::warn!(
            "Ollama is not reachable at {}. Make sure it is running: ollama serve",
            llm_config.base_url
        );
    } else if !status.model_available {
        tracing::warn!(
            "Model '{}' is not pulled. Run: ollama pull {}",
            llm_config.model,
            llm_config.model
        );
    }

    let state = AppState::new(Arc::new(llm), config.clone());

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
