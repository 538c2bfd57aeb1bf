//! HTTP server loop.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::shutdown::ShutdownCoordinator;

/// Serve `router` on `listener` until the shutdown coordinator starts
/// draining. In-flight connections are allowed to finish.
pub async fn run_server(
    listener: TcpListener,
    router: Router,
    shutdown: Arc<ShutdownCoordinator>,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "HTTP server listening");
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.stopping())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}
