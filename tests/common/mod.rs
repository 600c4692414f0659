use blobsync_daemon::config::{ContainerConfig, SyncConfig};
use blobsync_daemon::storage::MemoryStore;

/// Config for a memory-backed container pair named hub/node.
pub fn memory_config() -> SyncConfig {
    SyncConfig {
        source: ContainerConfig {
            name: "hub".to_string(),
            location: String::new(),
            access_key: None,
        },
        destination: ContainerConfig {
            name: "node".to_string(),
            location: String::new(),
            access_key: None,
        },
        interval_secs: 1,
        public_read_access: false,
    }
}

pub fn memory_store() -> MemoryStore {
    MemoryStore::new(["hub", "node"])
}
