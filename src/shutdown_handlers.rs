use tracing::{info, warn};

use volley::barrier::CancelHandle;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Cancels the run on Ctrl+C or SIGTERM. Abort the returned task once the
/// run is over.
pub(crate) fn setup_signal_handler(cancel: &CancelHandle) -> tokio::task::JoinHandle<()> {
    let cancel = cancel.clone();
    tokio::spawn(async move {
        tokio::select! {
            () = wait_for_interrupt() => {}
            () = wait_for_terminate() => {}
        }
        info!("Interrupted; stopping the bombardment.");
        cancel.cancel();
    })
}

async fn wait_for_interrupt() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", err);
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn wait_for_terminate() {
    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            term.recv().await;
        }
        Err(err) => {
            warn!("Failed to register SIGTERM handler: {}", err);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_terminate() {
    std::future::pending::<()>().await;
}
