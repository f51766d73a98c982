use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::service::RecordService;

pub mod routes;

/// Server state
pub struct AppState {
    pub service: RecordService,
}

/// Build the API router around a record service
pub fn router(service: RecordService, max_upload_bytes: usize) -> Router {
    let state = Arc::new(AppState { service });

    Router::new()
        .route("/", get(routes::health))
        .route("/records", get(routes::list_records).post(routes::create_record))
        .route(
            "/records/{id}",
            get(routes::get_record)
                .put(routes::update_record)
                .delete(routes::delete_record),
        )
        .route("/records/{id}/attachment", get(routes::get_attachment))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(addr: SocketAddr, service: RecordService, max_upload_bytes: usize) -> anyhow::Result<()> {
    let app = router(service, max_upload_bytes);

    tracing::info!("Starting server on {}", addr);
    println!("🌍 Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
