use tokio::signal;

/// Resolves on Ctrl+C, or SIGTERM on unix. A listener that fails to install never
/// resolves, so the other one still stops the server.
pub(crate) async fn shutdown_signal() {
    let received = tokio::select! {
        () = interrupt() => "interrupt",
        () = terminate() => "terminate",
    };

    tracing::info!(signal = received, "Shutting down, draining in-flight requests");
}

async fn interrupt() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!(error = %err, "Ctrl+C listener unavailable");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(err) => {
            tracing::error!(error = %err, "SIGTERM listener unavailable");
            return std::future::pending().await;
        }
    };
    sigterm.recv().await;
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
