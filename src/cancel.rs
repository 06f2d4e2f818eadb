// ABOUTME: Run-scoped cancellation wired to the operator's interrupt signal
// ABOUTME: Loops poll the token cooperatively; in-flight writes are never aborted

use tokio::task::JoinHandle;
pub use tokio_util::sync::CancellationToken;

/// Cancel `token` when the process receives Ctrl+C.
///
/// The returned task ends after the first interrupt or when the token is
/// cancelled by someone else, whichever comes first.
pub fn install_interrupt_handler(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    tracing::warn!("Failed to listen for interrupt signal: {}", e);
                    return;
                }
                tracing::error!("⚠ Migration interrupted by user. Closing connections...");
                token.cancel();
            }
            _ = token.cancelled() => {}
        }
    })
}
