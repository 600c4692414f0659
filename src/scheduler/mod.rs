//! Timer-driven reconciliation passes.
//!
//! One pass lists both containers, builds a plan, and executes it.
//! [`run`] fires a pass on a fixed interval; a failed pass is logged
//! and the next tick proceeds, so the host process never dies with it.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{error, info};

use crate::blob::{Snapshot, SnapshotError};
use crate::config::SyncConfig;
use crate::reconciliation::{build_sync_plan, execute_plan, ExecuteError, PlanError};
use crate::storage::{ContainerAccess, StorageBackend, StorageError};

#[derive(Error, Debug)]
pub enum PassError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("execute error: {0}")]
    Execute(#[from] ExecuteError),
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct PassSummary {
    pub copied_to_dest: usize,
    pub copied_to_source: usize,
    pub deleted_from_source: usize,
    pub duration_ms: u128,
}

impl PassSummary {
    pub fn is_converged(&self) -> bool {
        self.copied_to_dest == 0 && self.copied_to_source == 0 && self.deleted_from_source == 0
    }
}

/// Run one reconciliation pass over the configured container pair.
pub async fn run_pass(
    store: &dyn StorageBackend,
    config: &SyncConfig,
) -> Result<PassSummary, PassError> {
    let started = Instant::now();

    if config.public_read_access {
        store
            .set_public_access(&config.source.name, ContainerAccess::Blob)
            .await?;
        store
            .set_public_access(&config.destination.name, ContainerAccess::Blob)
            .await?;
    }

    // The two listings are independent; fetch them concurrently.
    let (source_listing, dest_listing) = tokio::join!(
        store.list(&config.source.name),
        store.list(&config.destination.name),
    );

    let source = Snapshot::from_listing(source_listing?)?;
    let dest = Snapshot::from_listing(dest_listing?)?;

    let plan = build_sync_plan(&source, &dest)?;
    let report = execute_plan(store, &config.source.name, &config.destination.name, &plan).await?;

    Ok(PassSummary {
        copied_to_dest: report.copied_to_dest.len(),
        copied_to_source: report.copied_to_source.len(),
        deleted_from_source: report.deleted_from_source.len(),
        duration_ms: started.elapsed().as_millis(),
    })
}

/// Fire [`run_pass`] on the configured interval until the shutdown
/// channel flips to true. The first pass runs immediately.
pub async fn run(
    store: &dyn StorageBackend,
    config: &SyncConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = interval(Duration::from_secs(config.interval_secs.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        source = %config.source.name,
        destination = %config.destination.name,
        interval_secs = config.interval_secs,
        "sync scheduler started"
    );

    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                // A dropped sender means nobody can signal shutdown
                // anymore; stop rather than run unsupervised.
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                match run_pass(store, config).await {
                    Ok(summary) => {
                        info!(
                            copied_to_dest = summary.copied_to_dest,
                            copied_to_source = summary.copied_to_source,
                            deleted_from_source = summary.deleted_from_source,
                            duration_ms = summary.duration_ms as u64,
                            "sync pass completed"
                        );
                    }
                    Err(err) => {
                        error!(error = %err, "sync pass failed, retrying on next tick");
                    }
                }
            }
        }
    }

    info!("sync scheduler stopped");
}
