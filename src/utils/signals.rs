//! Signal handling for graceful shutdown

use futures::stream::StreamExt;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use tracing::{info, warn};

/// Wait for SIGTERM or SIGINT and return the signal number.
///
/// If the handler cannot be installed this never resolves, leaving shutdown
/// to the `quit` command.
pub async fn shutdown_signal() -> i32 {
    let mut signals = match Signals::new([SIGTERM, SIGINT]) {
        Ok(signals) => signals,
        Err(e) => {
            warn!("Failed to install signal handler: {}", e);
            return std::future::pending().await;
        }
    };
    let handle = signals.handle();

    let signal = match signals.next().await {
        Some(signal) => signal,
        None => std::future::pending().await,
    };
    handle.close();

    info!("Received signal: {}", signal);
    signal
}
