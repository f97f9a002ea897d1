//! axum server

use std::future::Future;

use crate::adapter::http::routes;
use crate::config::{AppConfig, AppState};
use crate::error::AppError;

/// Serves until `shutdown` resolves, then drains the task pool.
pub async fn start_http_server(
    config: &AppConfig,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), AppError> {
    let url = config.server.url();
    tracing::info!("start server: {}", url);
    let listener = tokio::net::TcpListener::bind(&url).await?;
    let tasks = state.tasks.clone();
    axum::serve(listener, routes(state, &config.server))
        .with_graceful_shutdown(shutdown)
        .await?;
    tasks.shutdown(config.task.shutdown_grace()).await;
    tracing::info!("end server");
    Ok(())
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("install ctrl-c handler error: {:?}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("install sigterm handler error: {:?}", e);
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
    tracing::info!("shutdown signal received");
}
