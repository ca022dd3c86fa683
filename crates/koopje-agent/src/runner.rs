//! The polling loop and its shutdown signal.

use std::time::Duration;

use koopje_db::DbError;
use tokio::sync::watch;

use crate::workflow::Workflow;

/// Read side of the shutdown channel; `true` means stop.
#[derive(Clone)]
pub(crate) struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub(crate) fn new(rx: watch::Receiver<bool>) -> Self {
        Self { rx }
    }

    pub(crate) fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once shutdown is requested. Never resolves if the sender is
    /// dropped without requesting it.
    pub(crate) async fn triggered(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|stop| *stop).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Ticks until shutdown, sleeping `interval` after each tick.
///
/// The sleep is cut short by shutdown; a running tick finishes its current
/// phase first.
///
/// # Errors
///
/// Returns the first storage error raised by a tick.
pub(crate) async fn run(
    workflow: &Workflow,
    shutdown: Shutdown,
    interval: Duration,
) -> Result<(), DbError> {
    let mut ticks: u64 = 0;

    while !shutdown.is_triggered() {
        ticks += 1;
        tracing::info!(tick = ticks, "starting tick");

        let summary = workflow.tick(&shutdown).await?;
        tracing::info!(
            tick = ticks,
            fetched = summary.fetched,
            stored = summary.stored,
            classified = summary.classified,
            notified = summary.notified,
            "tick complete"
        );

        if shutdown.is_triggered() {
            break;
        }

        tracing::info!(secs = interval.as_secs(), "sleeping until next tick");
        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            () = shutdown.triggered() => {}
        }
    }

    tracing::info!(ticks, "polling loop stopped");
    Ok(())
}
