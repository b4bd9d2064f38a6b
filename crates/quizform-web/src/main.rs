use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tracing_subscriber::EnvFilter;

use quizform_core::config_file::{self, Settings};
use quizform_forms::FormsClient;
use quizform_pdf_mupdf::MupdfBackend;

mod error;
mod handlers;
mod pipeline;
mod state;
mod template;
mod upload;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::resolve(&config_file::load_config());
    tracing::debug!(?settings, "resolved settings");

    let client = FormsClient::from_settings(&settings).context("failed to build Forms API client")?;
    if let Err(e) = client.authenticator().preflight() {
        tracing::warn!(error = %e, "Google API credentials are not usable yet");
    }

    let state = Arc::new(AppState {
        forms: Arc::new(client),
        pdf: Arc::new(MupdfBackend::new()),
        document_title: settings.document_title.clone(),
    });

    let app = router(state, settings.body_limit_bytes);

    let listener = tokio::net::TcpListener::bind(&settings.addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.addr))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: Arc<AppState>, body_limit: usize) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::index::index).post(handlers::generate::generate),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
