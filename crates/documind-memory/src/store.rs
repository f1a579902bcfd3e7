//! One pretty-printed JSON file per collection under a single directory.

use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::types::CollectionIndex;

const INDEX_EXTENSION: &str = "json";

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
#[must_use]
pub fn sanitize_collection_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct IndexStore {
    root: PathBuf,
}

impl IndexStore {
    /// Open the store, creating the directory when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|source| StoreError::CreateDir {
                path: root.clone(),
                source,
            })?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn path_for(&self, collection: &str) -> PathBuf {
        self.root.join(format!(
            "{}.{INDEX_EXTENSION}",
            sanitize_collection_name(collection)
        ))
    }

    /// Persist `index` as the only record for `collection`, replacing any previous one.
    ///
    /// The record is written to a sibling temp file and renamed into place, so a
    /// concurrent [`load`](Self::load) sees either the old or the new index.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or any filesystem step fails.
    pub async fn save(
        &self,
        collection: &str,
        index: &CollectionIndex,
    ) -> Result<PathBuf, StoreError> {
        let path = self.path_for(collection);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(index)?;

        tokio::fs::write(&tmp, &body)
            .await
            .map_err(|source| StoreError::Write {
                path: tmp.clone(),
                source,
            })?;
        if let Err(source) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StoreError::Write { path, source });
        }

        tracing::info!(
            collection,
            path = %path.display(),
            chunks = index.chunks.len(),
            "saved collection index"
        );
        Ok(path)
    }

    /// Load the record for `collection`.
    ///
    /// A missing file and a file that no longer parses as a [`CollectionIndex`]
    /// both yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub async fn load(&self, collection: &str) -> Result<Option<CollectionIndex>, StoreError> {
        let path = self.path_for(collection);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Read { path, source }),
        };

        match serde_json::from_slice::<CollectionIndex>(&bytes) {
            Ok(index) => Ok(Some(index)),
            Err(e) => {
                tracing::warn!(
                    collection,
                    path = %path.display(),
                    "ignoring unreadable collection index: {e}"
                );
                Ok(None)
            }
        }
    }

    /// Remove every stored collection index. Returns the number of records removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be listed or a record cannot be removed.
    pub async fn clear(&self) -> Result<usize, StoreError> {
        let read_err = |source: std::io::Error| StoreError::Read {
            path: self.root.clone(),
            source,
        };
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(read_err(e)),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(INDEX_EXTENSION) {
                continue;
            }
            tokio::fs::remove_file(&path)
                .await
                .map_err(|source| StoreError::Write {
                    path: path.clone(),
                    source,
                })?;
            removed += 1;
        }

        tracing::info!(removed, dir = %self.root.display(), "cleared collection indices");
        Ok(removed)
    }
}
