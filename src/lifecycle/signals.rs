//! OS signal handling.
//!
//! SIGINT and SIGTERM cancel the run; the pollers notice at their next
//! attempt or sleep.

use tokio_util::sync::CancellationToken;

/// Wait for Ctrl-C (or SIGTERM on unix).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Cancel `token` when a shutdown signal arrives.
pub fn spawn_signal_listener(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = shutdown_signal() => {
                tracing::warn!("Shutdown signal received, cancelling run");
                token.cancel();
            }
            _ = token.cancelled() => {}
        }
    })
}
