//! `shadowcue` - timed cue sequencer for shadow tennis practice

use clap::Parser;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::watch;

use shadowcue::cli::args::Cli;
use shadowcue::cli::commands;
use shadowcue::error::ExitCode;
use shadowcue::observability::{StopReason, init_logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        init_logging(cli.log_format, cli.verbose, cli.color);
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(None);

    // First signal ends the session cleanly, a second one forces exit.
    tokio::spawn(async move {
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::warn!(error = %e, "failed to register SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
                let _ = shutdown_tx.send(Some(StopReason::Interrupted));
                return;
            }
        };

        let reason = tokio::select! {
            _ = tokio::signal::ctrl_c() => StopReason::Interrupted,
            _ = sigterm.recv() => StopReason::Terminated,
        };
        eprintln!("\nShutting down gracefully... (press Ctrl+C again to force)");
        let _ = shutdown_tx.send(Some(reason));

        tokio::select! {
            _ = tokio::signal::ctrl_c() => std::process::exit(ExitCode::INTERRUPTED),
            _ = sigterm.recv() => std::process::exit(ExitCode::TERMINATED),
        }
    });

    // Exit explicitly: the blocking stdin reader would otherwise hold the
    // runtime open after the session ends.
    match commands::dispatch(cli, shutdown_rx).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
