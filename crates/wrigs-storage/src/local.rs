// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Local-disk file store rooted at the static directory.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};
use uuid::Uuid;
use wrigs_core::error::Result;

use crate::FileStore;
use crate::urls::join_under;

/// [`FileStore`] backed by `tokio::fs`.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Hidden sibling used as the write target before the rename.
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4().simple()))
}

impl FileStore for LocalFileStore {
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    async fn write(&self, rel_path: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = join_under(&self.root, rel_path)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Atomic write: write to temp, then rename
        let tmp_path = temp_sibling(&path);
        if let Err(err) = tokio::fs::write(&tmp_path, bytes).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(err.into());
        }
        if let Err(err) = tokio::fs::rename(&tmp_path, &path).await {
            warn!(path = %path.display(), error = %err, "rename failed, discarding temp file");
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(err.into());
        }

        debug!(path = %path.display(), "file written");
        Ok(path)
    }

    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    async fn create(&self, rel_path: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = join_under(&self.root, rel_path)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write to temp, then hard-link into place; linking fails if the
        // target already exists.
        let tmp_path = temp_sibling(&path);
        if let Err(err) = tokio::fs::write(&tmp_path, bytes).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(err.into());
        }
        let linked = tokio::fs::hard_link(&tmp_path, &path).await;
        let _ = tokio::fs::remove_file(&tmp_path).await;
        if let Err(err) = linked {
            debug!(path = %path.display(), error = %err, "create refused");
            return Err(err.into());
        }

        debug!(path = %path.display(), "file created");
        Ok(path)
    }

    async fn exists(&self, rel_path: &str) -> bool {
        match join_under(&self.root, rel_path) {
            Ok(path) => tokio::fs::try_exists(&path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    #[instrument(skip(self))]
    async fn remove(&self, rel_path: &str) -> Result<()> {
        let path = join_under(&self.root, rel_path)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "file removed");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn ensure_dir(&self, rel_dir: &str) -> Result<PathBuf> {
        let path = join_under(&self.root, rel_dir)?;
        tokio::fs::create_dir_all(&path).await?;
        Ok(path)
    }

    fn local_path(&self, rel_path: &str) -> Result<PathBuf> {
        join_under(&self.root, rel_path)
    }
}
