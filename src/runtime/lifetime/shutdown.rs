use actix_web::dev::ServerHandle;
use std::time::Duration;
use tokio::signal;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// 等待 Ctrl+C，然后在超时内优雅停止 HTTP 服务
pub async fn listen_for_shutdown(handle: ServerHandle, shutdown_timeout_secs: u64) {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, draining in-flight requests...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }

    match timeout(
        Duration::from_secs(shutdown_timeout_secs),
        handle.stop(true),
    )
    .await
    {
        Ok(()) => info!("HTTP server stopped gracefully"),
        Err(_) => {
            error!(
                "Graceful shutdown timed out after {} seconds, forcing stop",
                shutdown_timeout_secs
            );
            handle.stop(false).await;
        }
    }
}
