use console::Term;
use newsdigest::{ShutdownSignal, shutdown_channel};

/// Wait for Ctrl+C or SIGTERM.
async fn termination() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Set up the Ctrl+C/SIGTERM handler for graceful shutdown.
///
/// The first signal flips the returned [`ShutdownSignal`]; the cycle stops
/// between articles. A second Ctrl+C exits immediately with code 130.
pub(crate) fn setup_shutdown_handler() -> ShutdownSignal {
    let (tx, rx) = shutdown_channel();

    tokio::spawn(async move {
        termination().await;

        let is_tty = Term::stdout().is_term();
        if is_tty {
            eprintln!("\n\nShutdown requested, finishing current article...");
            eprintln!("Press Ctrl+C again to force quit.");
        } else {
            tracing::warn!("Shutdown requested, finishing current article");
        }

        let _ = tx.send(true);

        // Wait for second Ctrl+C for force quit
        if tokio::signal::ctrl_c().await.is_ok() {
            if is_tty {
                eprintln!("Force quit!");
            }
            std::process::exit(130);
        }
    });

    rx
}
