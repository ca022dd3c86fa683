mod runner;
mod watch_list;
mod workflow;

use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use crate::runner::Shutdown;
use crate::workflow::Workflow;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = koopje_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::debug!(?config, "configuration loaded");

    let pool =
        koopje_db::connect_pool(&config.database_url, koopje_db::PoolConfig::default()).await?;
    koopje_db::ensure_schema(&pool).await?;
    let stored = koopje_db::count_advertisements(&pool).await?;
    tracing::info!(stored, "listing store ready");

    let workflow = Workflow::from_config(pool, &config)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        // The receiver only disappears once the loop has already stopped.
        let _ = shutdown_tx.send(true);
    });

    runner::run(&workflow, Shutdown::new(shutdown_rx), config.poll_interval()).await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, stopping after the current phase");
}
