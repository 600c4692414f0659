pub mod blob;
pub mod config;
pub mod reconciliation;
pub mod scheduler;
pub mod storage;
pub mod utils;

// Re-export commonly used types
pub use blob::{
    comparator, sort_blobs, BlobRecord, ListingEntry, Snapshot, SnapshotError, SortColumn,
    SortColumnError, SortDirection,
};
pub use config::{read_config, write_config, ConfigError, ContainerConfig, SyncConfig};
pub use reconciliation::{
    build_sync_plan, execute_plan, ExecuteError, PlanError, SyncAction, SyncPlan, SyncReport,
};
pub use scheduler::{run_pass, PassError, PassSummary};
pub use storage::{ContainerAccess, DirStore, MemoryStore, StorageBackend, StorageError};
pub use utils::multiset_equal;
