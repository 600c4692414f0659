use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::blob::{BlobRecord, Snapshot};

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("container listing for '{container}' holds blob '{name}' more than once")]
    DuplicateName { container: String, name: String },
}

/// One storage operation needed to bring the two containers closer to
/// convergence.
///
/// Actions within a plan never depend on each other, so the executor
/// is free to apply them in any order or in parallel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// Copy a blob from the source container to the destination.
    CopyToDest { name: String },
    /// Copy a blob that only exists on the destination back to the
    /// source.
    CopyToSource { name: String },
    /// Remove a blob from the source container.
    DeleteFromSource { name: String },
}

impl SyncAction {
    pub fn blob_name(&self) -> &str {
        match self {
            SyncAction::CopyToDest { name }
            | SyncAction::CopyToSource { name }
            | SyncAction::DeleteFromSource { name } => name,
        }
    }
}

/// Ordered action list produced by one planning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    pub actions: Vec<SyncAction>,
}

impl SyncPlan {
    /// True when the two snapshots were already converged.
    pub fn is_converged(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn copies_to_dest(&self) -> usize {
        self.count(|action| matches!(action, SyncAction::CopyToDest { .. }))
    }

    pub fn copies_to_source(&self) -> usize {
        self.count(|action| matches!(action, SyncAction::CopyToSource { .. }))
    }

    pub fn deletes_from_source(&self) -> usize {
        self.count(|action| matches!(action, SyncAction::DeleteFromSource { .. }))
    }

    fn count(&self, predicate: impl Fn(&SyncAction) -> bool) -> usize {
        self.actions
            .iter()
            .filter(|action| predicate(action))
            .count()
    }
}

/// Diff two container snapshots into the ordered action list that
/// converges them.
///
/// Blobs are matched by exact, case-sensitive name. A matched pair is
/// copied forward when the source is strictly newer, or when either
/// side has no last-modified timestamp (a missing timestamp reads as a
/// new file). A source-only blob is deleted from the source: the
/// source mirrors a previously copied set, so a blob absent downstream
/// was removed there and is removed upstream to converge. A
/// destination-only blob is copied back to the source.
///
/// Source-driven actions are emitted first, in source snapshot order,
/// then destination-driven actions in destination snapshot order.
/// Zero-length records never produce an action. The planner has no
/// side effects; executing the plan is the caller's job.
pub fn build_sync_plan(source: &Snapshot, dest: &Snapshot) -> Result<SyncPlan, PlanError> {
    ensure_unique_names("source", source)?;
    ensure_unique_names("destination", dest)?;

    let source_blobs: Vec<&BlobRecord> = source
        .records
        .iter()
        .filter(|record| !record.is_placeholder())
        .collect();
    let dest_blobs: Vec<&BlobRecord> = dest
        .records
        .iter()
        .filter(|record| !record.is_placeholder())
        .collect();

    let dest_by_name: HashMap<&str, &BlobRecord> = dest_blobs
        .iter()
        .map(|record| (record.name.as_str(), *record))
        .collect();

    let mut matched: HashSet<&str> = HashSet::new();
    let mut actions = Vec::new();

    for record in &source_blobs {
        match dest_by_name.get(record.name.as_str()) {
            Some(counterpart) => {
                matched.insert(record.name.as_str());
                if needs_copy(record, counterpart) {
                    actions.push(SyncAction::CopyToDest {
                        name: record.name.clone(),
                    });
                }
            }
            None => {
                // Absent downstream means removed downstream; converge
                // by removing the upstream copy as well.
                actions.push(SyncAction::DeleteFromSource {
                    name: record.name.clone(),
                });
            }
        }
    }

    for record in &dest_blobs {
        if !matched.contains(record.name.as_str()) {
            actions.push(SyncAction::CopyToSource {
                name: record.name.clone(),
            });
        }
    }

    Ok(SyncPlan { actions })
}

/// A pair needs a forward copy when the source is strictly newer, or
/// when either timestamp is missing: without both timestamps the pair
/// cannot be proven in sync, so the copy is taken.
fn needs_copy(source: &BlobRecord, dest: &BlobRecord) -> bool {
    match (source.last_modified, dest.last_modified) {
        (Some(src), Some(dst)) => src > dst,
        _ => true,
    }
}

fn ensure_unique_names(container: &str, snapshot: &Snapshot) -> Result<(), PlanError> {
    let mut seen = HashSet::new();
    for record in &snapshot.records {
        if !seen.insert(record.name.as_str()) {
            return Err(PlanError::DuplicateName {
                container: container.to_string(),
                name: record.name.clone(),
            });
        }
    }
    Ok(())
}
