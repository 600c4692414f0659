//! In-memory storage backend for tests and dry runs.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ContainerAccess, StorageBackend, StorageError};
use crate::blob::ListingEntry;

#[derive(Debug, Clone)]
struct StoredBlob {
    last_modified: Option<String>,
    content_length: String,
}

#[derive(Debug, Default)]
struct ContainerState {
    blobs: BTreeMap<String, StoredBlob>,
    access: ContainerAccess,
}

/// In-memory backend holding blob metadata per container.
///
/// Copying replicates the stored metadata, matching a server-side copy
/// that carries blob properties with it. Listing order is the sorted
/// name order of the backing map, so listings are deterministic.
pub struct MemoryStore {
    containers: RwLock<BTreeMap<String, ContainerState>>,
}

impl MemoryStore {
    pub fn new<I, S>(containers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let containers = containers
            .into_iter()
            .map(|name| (name.into(), ContainerState::default()))
            .collect();
        Self {
            containers: RwLock::new(containers),
        }
    }

    /// Insert or overwrite a blob's metadata.
    pub async fn put_blob(
        &self,
        container: &str,
        name: &str,
        last_modified: Option<&str>,
        content_length: &str,
    ) -> Result<(), StorageError> {
        let mut containers = self.containers.write().await;
        let state = containers
            .get_mut(container)
            .ok_or_else(|| StorageError::ContainerNotFound(container.to_string()))?;
        state.blobs.insert(
            name.to_string(),
            StoredBlob {
                last_modified: last_modified.map(str::to_string),
                content_length: content_length.to_string(),
            },
        );
        Ok(())
    }

    /// Names of every blob in a container, in listing order.
    pub async fn blob_names(&self, container: &str) -> Result<Vec<String>, StorageError> {
        let containers = self.containers.read().await;
        let state = containers
            .get(container)
            .ok_or_else(|| StorageError::ContainerNotFound(container.to_string()))?;
        Ok(state.blobs.keys().cloned().collect())
    }

    /// Stored last-modified metadata for one blob.
    pub async fn blob_last_modified(
        &self,
        container: &str,
        name: &str,
    ) -> Result<Option<String>, StorageError> {
        let containers = self.containers.read().await;
        let state = containers
            .get(container)
            .ok_or_else(|| StorageError::ContainerNotFound(container.to_string()))?;
        let blob = state
            .blobs
            .get(name)
            .ok_or_else(|| StorageError::BlobNotFound {
                container: container.to_string(),
                name: name.to_string(),
            })?;
        Ok(blob.last_modified.clone())
    }

    /// Current anonymous access level of a container.
    pub async fn access_level(&self, container: &str) -> Result<ContainerAccess, StorageError> {
        let containers = self.containers.read().await;
        let state = containers
            .get(container)
            .ok_or_else(|| StorageError::ContainerNotFound(container.to_string()))?;
        Ok(state.access)
    }
}

#[async_trait]
impl StorageBackend for MemoryStore {
    async fn list(&self, container: &str) -> Result<Vec<ListingEntry>, StorageError> {
        let containers = self.containers.read().await;
        let state = containers
            .get(container)
            .ok_or_else(|| StorageError::ContainerNotFound(container.to_string()))?;
        Ok(state
            .blobs
            .iter()
            .map(|(name, blob)| ListingEntry::Blob {
                name: name.clone(),
                last_modified: blob.last_modified.clone(),
                content_length: blob.content_length.clone(),
            })
            .collect())
    }

    async fn copy(&self, from: &str, to: &str, name: &str) -> Result<(), StorageError> {
        let mut containers = self.containers.write().await;

        let blob = containers
            .get(from)
            .ok_or_else(|| StorageError::ContainerNotFound(from.to_string()))?
            .blobs
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::BlobNotFound {
                container: from.to_string(),
                name: name.to_string(),
            })?;

        containers
            .get_mut(to)
            .ok_or_else(|| StorageError::ContainerNotFound(to.to_string()))?
            .blobs
            .insert(name.to_string(), blob);
        Ok(())
    }

    async fn delete(&self, container: &str, name: &str) -> Result<(), StorageError> {
        let mut containers = self.containers.write().await;
        let state = containers
            .get_mut(container)
            .ok_or_else(|| StorageError::ContainerNotFound(container.to_string()))?;
        if state.blobs.remove(name).is_none() {
            return Err(StorageError::BlobNotFound {
                container: container.to_string(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    async fn set_public_access(
        &self,
        container: &str,
        access: ContainerAccess,
    ) -> Result<(), StorageError> {
        let mut containers = self.containers.write().await;
        let state = containers
            .get_mut(container)
            .ok_or_else(|| StorageError::ContainerNotFound(container.to_string()))?;
        state.access = access;
        Ok(())
    }
}
