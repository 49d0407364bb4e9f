//! OS signal handling.
//!
//! SIGINT and SIGTERM trigger graceful shutdown. SIGHUP reloads the table
//! from the default source path and never shuts down.

use crate::lifecycle::Shutdown;
use crate::reload::Reloader;

/// Spawn the signal listener task.
pub fn spawn_signal_handler(shutdown: Shutdown, reloader: Reloader) {
    tokio::spawn(async move {
        if let Err(e) = listen(shutdown, reloader).await {
            tracing::error!(error = %e, "Failed to install signal handlers");
        }
    });
}

#[cfg(unix)]
async fn listen(shutdown: Shutdown, reloader: Reloader) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;

    loop {
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                res?;
                tracing::info!("SIGINT received");
                break;
            }
            _ = terminate.recv() => {
                tracing::info!("SIGTERM received");
                break;
            }
            _ = hangup.recv() => {
                tracing::info!("SIGHUP received, reloading table");
                // Failures are logged by the reloader; the current table stays active.
                let _ = reloader.reload(None).await;
            }
        }
    }

    shutdown.trigger();
    Ok(())
}

#[cfg(not(unix))]
async fn listen(shutdown: Shutdown, _reloader: Reloader) -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!("Ctrl+C received");
    shutdown.trigger();
    Ok(())
}
