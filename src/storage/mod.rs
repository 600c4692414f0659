//! Storage backend abstraction.
//!
//! The reconciliation core never talks to a backend directly; it
//! consumes listings and emits actions. Everything that actually moves
//! bytes lives behind [`StorageBackend`].

mod dir;
mod memory;

pub use dir::DirStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::blob::ListingEntry;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("unknown container '{0}'")]
    ContainerNotFound(String),

    #[error("blob '{name}' not found in container '{container}'")]
    BlobNotFound { container: String, name: String },
}

/// Anonymous access level for a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainerAccess {
    /// No anonymous access.
    #[default]
    Private,
    /// Anonymous read access to blobs only.
    Blob,
    /// Anonymous read access to blobs and container metadata.
    Container,
}

/// Contract every object-storage backend must implement.
///
/// Implementations must be thread-safe (`Send + Sync`). Copying is
/// fire-and-forget: the backend schedules a server-side copy and
/// returns once the request is accepted, not once the bytes land.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Enumerate every item in a container, including virtual
    /// directory markers and placeholder entries. Callers filter what
    /// they do not want.
    async fn list(&self, container: &str) -> Result<Vec<ListingEntry>, StorageError>;

    /// Request a server-side copy of blob `name` from one container to
    /// another.
    async fn copy(&self, from: &str, to: &str, name: &str) -> Result<(), StorageError>;

    /// Delete a blob from a container.
    async fn delete(&self, container: &str, name: &str) -> Result<(), StorageError>;

    /// Set the anonymous access level on a container.
    async fn set_public_access(
        &self,
        container: &str,
        access: ContainerAccess,
    ) -> Result<(), StorageError>;
}
