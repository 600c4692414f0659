//! Local-filesystem storage backend.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use walkdir::WalkDir;

use super::{ContainerAccess, StorageBackend, StorageError};
use crate::blob::ListingEntry;

/// Filesystem-backed storage: each container is a registered directory
/// and each blob is a file beneath it, named by its relative path.
///
/// Subdirectories surface as virtual directory markers with a trailing
/// slash. Blob timestamps are file modification times rendered as
/// RFC 3339.
pub struct DirStore {
    containers: BTreeMap<String, PathBuf>,
}

impl DirStore {
    pub fn new() -> Self {
        Self {
            containers: BTreeMap::new(),
        }
    }

    /// Register a container rooted at `path`, creating the directory
    /// if it does not exist yet.
    pub fn add_container(
        &mut self,
        name: &str,
        path: impl Into<PathBuf>,
    ) -> Result<(), StorageError> {
        let path = path.into();
        std::fs::create_dir_all(&path)?;
        self.containers.insert(name.to_string(), path);
        Ok(())
    }

    fn root(&self, container: &str) -> Result<&Path, StorageError> {
        self.containers
            .get(container)
            .map(PathBuf::as_path)
            .ok_or_else(|| StorageError::ContainerNotFound(container.to_string()))
    }

    fn blob_path(&self, container: &str, name: &str) -> Result<PathBuf, StorageError> {
        Ok(self.root(container)?.join(name))
    }
}

impl Default for DirStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageBackend for DirStore {
    async fn list(&self, container: &str) -> Result<Vec<ListingEntry>, StorageError> {
        let root = self.root(container)?;
        let mut entries = Vec::new();

        for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let mut name = relative.to_string_lossy().to_string();

            if entry.file_type().is_dir() {
                name.push('/');
                entries.push(ListingEntry::Prefix { name });
            } else {
                let metadata = entry.metadata().map_err(std::io::Error::from)?;
                let last_modified = metadata
                    .modified()
                    .ok()
                    .map(|time| DateTime::<Utc>::from(time).to_rfc3339());
                entries.push(ListingEntry::Blob {
                    name,
                    last_modified,
                    content_length: metadata.len().to_string(),
                });
            }
        }

        Ok(entries)
    }

    async fn copy(&self, from: &str, to: &str, name: &str) -> Result<(), StorageError> {
        let src = self.blob_path(from, name)?;
        let dest = self.blob_path(to, name)?;

        if !src.exists() {
            return Err(StorageError::BlobNotFound {
                container: from.to_string(),
                name: name.to_string(),
            });
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(&src, &dest).await?;

        // A server-side copy replicates blob properties; carry the
        // source modification time onto the replica.
        let modified = std::fs::metadata(&src)?.modified()?;
        let dest_file = std::fs::OpenOptions::new().write(true).open(&dest)?;
        dest_file.set_modified(modified)?;

        Ok(())
    }

    async fn delete(&self, container: &str, name: &str) -> Result<(), StorageError> {
        let path = self.blob_path(container, name)?;
        if !path.exists() {
            return Err(StorageError::BlobNotFound {
                container: container.to_string(),
                name: name.to_string(),
            });
        }
        tokio::fs::remove_file(&path).await?;
        Ok(())
    }

    async fn set_public_access(
        &self,
        container: &str,
        access: ContainerAccess,
    ) -> Result<(), StorageError> {
        set_dir_permissions(self.root(container)?, access)
    }
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path, access: ContainerAccess) -> Result<(), StorageError> {
    use std::os::unix::fs::PermissionsExt;

    let mode = match access {
        ContainerAccess::Private => 0o700,
        ContainerAccess::Blob | ContainerAccess::Container => 0o755,
    };
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path, _access: ContainerAccess) -> Result<(), StorageError> {
    Ok(())
}
