mod error;
mod http;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use tns_registry::TopicRegistry;

use http::{
    handle_delete_topic, handle_discover_topic, handle_find_by_id, handle_list_topics,
    handle_register_topic, handle_resolve_topic, handle_topic_healthcheck, handle_update_topic,
};

#[derive(Clone)]
struct AppState {
    registry: Arc<TopicRegistry>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiServerError {
    #[error("bind api {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("axum serve: {0}")]
    Serve(std::io::Error),
}

/// Routes of the topic name service under `/api/v1/tns`.
pub fn router(registry: Arc<TopicRegistry>) -> Router {
    let state = AppState { registry };

    Router::new()
        .route(
            "/api/v1/tns/topic",
            get(handle_list_topics)
                .post(handle_register_topic)
                .put(handle_resolve_topic)
                .patch(handle_update_topic)
                .delete(handle_delete_topic),
        )
        .route("/api/v1/tns/topic/{*topic}", get(handle_discover_topic))
        .route("/api/v1/tns/id/{id}", get(handle_find_by_id))
        .route("/api/v1/tns/health", post(handle_topic_healthcheck))
        .with_state(state)
}

pub async fn bind(addr: SocketAddr) -> Result<TcpListener, ApiServerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ApiServerError::Bind { addr, source })
}

/// Serve the API on `listener` until `shutdown` is cancelled. In-flight
/// requests are allowed to finish.
pub async fn serve(
    listener: TcpListener,
    registry: Arc<TopicRegistry>,
    shutdown: CancellationToken,
) -> Result<(), ApiServerError> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "tns api listening");
    }

    axum::serve(listener, router(registry))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(ApiServerError::Serve)
}
