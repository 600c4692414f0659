//! Two-container reconciliation: a pure planning step that diffs two
//! snapshots into an ordered action list, and an execution step that
//! applies the actions through a storage backend.

mod execute;
mod plan;

pub use execute::{execute_plan, ExecuteError, SyncReport};
pub use plan::{build_sync_plan, PlanError, SyncAction, SyncPlan};
