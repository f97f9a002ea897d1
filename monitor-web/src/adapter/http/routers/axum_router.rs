use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::adapter::http::handlers::{
    delete_node_by_id, get_node_by_id, list_location, list_node, list_node_event,
    node_select_kv_item, rename_node, save_node, task_stats,
};
use crate::adapter::http::middleware::{request_id::request_id, server_time::ServerTimeLayer};
use crate::config::{AppState, ServerConfig};

pub fn routes(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        .route("/hello", get(hello))
        .nest(
            "/api/node",
            Router::new()
                .route("/", post(save_node))
                .route("/rename", post(rename_node))
                .route("/list", post(list_node))
                .route("/kv", get(node_select_kv_item))
                .route("/locations", get(list_location))
                .route("/:id", get(get_node_by_id).delete(delete_node_by_id))
                .route("/:id/events", get(list_node_event)),
        )
        .nest("/api/task", Router::new().route("/stats", get(task_stats)))
        .layer(ServerTimeLayer::new(server.slow_request_ms))
        .layer(middleware::from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn hello() -> &'static str {
    "Hello, World!"
}
