//! Startup and shutdown bookkeeping around the running server.

use std::future::Future;
use std::io;
use std::time::Instant;

use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Runs the server future and reports how it ended.
///
/// # Errors
///
/// Returns the server's own error unchanged.
pub async fn serve_with_shutdown<F>(
    server_config: &ServerConfig,
    serve_fn: impl FnOnce() -> F,
) -> io::Result<()>
where
    F: Future<Output = io::Result<()>>,
{
    if server_config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            addr = %server_config.server_addr(),
            "Listening on every interface"
        );
    }

    let started_at = Instant::now();
    let result = serve_fn().await;
    let uptime_secs = started_at.elapsed().as_secs();

    if let Err(err) = &result {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %err,
            kind = ?err.kind(),
            hint = hint_for(err.kind()).unwrap_or_default(),
            uptime_secs,
            "Server stopped with an error"
        );
    } else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            uptime_secs,
            "Server stopped"
        );
    }

    result
}

/// Operator hint for IO failures that usually come from the bind step.
fn hint_for(kind: io::ErrorKind) -> Option<&'static str> {
    let hint = match kind {
        io::ErrorKind::AddrInUse => "another process holds the port, pick a different PORT",
        io::ErrorKind::AddrNotAvailable => "HOST is not assigned to any local interface",
        io::ErrorKind::PermissionDenied => "the process may not bind this address",
        _ => return None,
    };

    Some(hint)
}
