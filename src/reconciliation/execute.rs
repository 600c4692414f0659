use thiserror::Error;
use tracing::debug;

use super::plan::{SyncAction, SyncPlan};
use crate::storage::{StorageBackend, StorageError};

#[derive(Error, Debug)]
pub enum ExecuteError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// What one executed plan changed, per container.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub copied_to_dest: Vec<String>,
    pub copied_to_source: Vec<String>,
    pub deleted_from_source: Vec<String>,
}

/// Apply every action in the plan through the storage backend.
///
/// Copies are fire-and-forget against the backend; a copy that has
/// been accepted counts as done for this pass. The first backend error
/// aborts the remainder of the pass.
pub async fn execute_plan(
    store: &dyn StorageBackend,
    source_container: &str,
    dest_container: &str,
    plan: &SyncPlan,
) -> Result<SyncReport, ExecuteError> {
    let mut report = SyncReport::default();

    for action in &plan.actions {
        match action {
            SyncAction::CopyToDest { name } => {
                store.copy(source_container, dest_container, name).await?;
                debug!(blob = %name, "copied to destination");
                report.copied_to_dest.push(name.clone());
            }
            SyncAction::CopyToSource { name } => {
                store.copy(dest_container, source_container, name).await?;
                debug!(blob = %name, "copied back to source");
                report.copied_to_source.push(name.clone());
            }
            SyncAction::DeleteFromSource { name } => {
                store.delete(source_container, name).await?;
                debug!(blob = %name, "deleted from source");
                report.deleted_from_source.push(name.clone());
            }
        }
    }

    Ok(report)
}
