//! Graceful shutdown signal handling.

use std::fmt;
use std::time::Duration;

use crate::TRACING_TARGET_SERVER_SHUTDOWN;

/// The signal that ended the serve loop.
#[derive(Debug, Clone, Copy)]
enum Signal {
    Interrupt,
    Terminate,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => f.write_str("SIGINT"),
            Self::Terminate => f.write_str("SIGTERM"),
        }
    }
}

async fn interrupt() -> Signal {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %err,
            "Cannot listen for SIGINT"
        );
        std::future::pending::<()>().await;
    }

    Signal::Interrupt
}

#[cfg(unix)]
async fn terminate() -> Signal {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(err) => {
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                error = %err,
                "Cannot listen for SIGTERM"
            );
            std::future::pending::<()>().await;
        }
    }

    Signal::Terminate
}

#[cfg(not(unix))]
async fn terminate() -> Signal {
    std::future::pending().await
}

/// Resolves on SIGINT or SIGTERM.
///
/// After the signal, in-flight requests have `drain_timeout` to complete;
/// the process exits once it elapses even if connections are still open.
pub async fn shutdown_signal(drain_timeout: Duration) {
    let signal = tokio::select! {
        signal = interrupt() => signal,
        signal = terminate() => signal,
    };

    tracing::info!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        %signal,
        drain_timeout_secs = drain_timeout.as_secs(),
        "Draining connections"
    );

    tokio::spawn(async move {
        tokio::time::sleep(drain_timeout).await;
        tracing::warn!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "Drain timeout elapsed, exiting"
        );
        std::process::exit(1);
    });
}
