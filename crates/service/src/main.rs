//! Peminjaman consumer entry point.

use std::time::Duration;

use consumer::LoggingNotifier;
use service::{App, Config, ServiceError, load_repository, telemetry};
use tokio::io::BufReader;
use tokio::signal;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install SIGINT handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

async fn serve(config: Config) -> Result<(), ServiceError> {
    telemetry::install_metrics(&config)?;

    let repository = load_repository(config.seed_file.as_deref()).await?;
    tracing::info!(
        queue = %config.consumer.queue,
        workers = config.consumer.workers,
        loans = repository.len().await,
        "starting peminjaman consumer"
    );

    let app = App::new(config.consumer, repository, LoggingNotifier);
    let input = BufReader::new(tokio::io::stdin());
    let report = app.run(input, shutdown_signal()).await?;

    tracing::info!(
        processed = report.processed,
        succeeded = report.succeeded,
        failed = report.failed,
        skipped = report.skipped,
        "peminjaman consumer shut down gracefully"
    );
    Ok(())
}

fn main() -> Result<(), ServiceError> {
    let config = Config::from_env();
    telemetry::init_tracing(&config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(serve(config));

    // A pending stdin read cannot be cancelled.
    runtime.shutdown_timeout(Duration::from_millis(250));

    if let Err(e) = &result {
        tracing::error!(error = %e, "peminjaman consumer failed");
    }
    result
}
