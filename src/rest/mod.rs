use std::net::SocketAddr;

use axum::{routing::get, Router};

use crate::service::ApiService;

mod handlers;
mod models;

use handlers::{
    find_content_by_id, health, list_content_by_field_value, list_contents, not_found,
};

#[derive(Clone)]
pub struct AppState {
    pub api: ApiService,
    pub started_at: std::time::SystemTime,
}

pub fn router(api: ApiService) -> Router {
    let state = AppState {
        api,
        started_at: std::time::SystemTime::now(),
    };

    Router::new()
        .route("/health", get(health))
        .route("/api/collections/:alias/content", get(list_contents))
        .route(
            "/api/collections/:alias/content/filter",
            get(list_content_by_field_value),
        )
        .route("/api/content/:id", get(find_content_by_id))
        .fallback(not_found)
        .with_state(state)
}

pub async fn serve(
    addr: SocketAddr,
    api: ApiService,
    shutdown: tokio_util::sync::CancellationToken,
) -> anyhow::Result<()> {
    log::info!("🌐 REST service on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(api))
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            log::info!("🛑 REST shutdown requested");
        })
        .await?;
    log::info!("👋 REST server exited");
    Ok(())
}
