//! Server startup helper for the engine binary.
//!
//! [`spawn_server`] binds the HTTP listener and launches the Alpaca server
//! on a background Tokio task. The binary holds the returned handle and
//! aborts it on shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{self, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// A server running on a background task.
#[derive(Debug)]
pub struct RunningServer {
    /// The bound address; useful when the configured port was 0.
    pub addr: SocketAddr,
    /// The serving task.
    pub task: JoinHandle<()>,
}

/// Bind `host:port` and serve the Alpaca API in the background.
///
/// The bind happens before this returns, so a port conflict is reported
/// here rather than logged from the task.
pub async fn spawn_server(host: &str, port: u16, state: Arc<AppState>) -> Result<RunningServer, StartupError> {
    let listener = server::bind(host, port).await?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("no local address: {e}")))?;

    let task = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, state).await {
            tracing::error!(error = %e, "Alpaca server exited with error");
        }
    });

    tracing::info!(%addr, "Alpaca server spawned on background task");

    Ok(RunningServer { addr, task })
}
