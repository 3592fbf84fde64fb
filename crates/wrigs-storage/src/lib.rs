// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// wrigs-storage — Static-file storage for Wrigs Fashion.
//
// Upload derivatives and generated PDFs live under one static root and are
// served as `/{relative path}`. Writes are atomic (temp file + rename), so a
// reader never sees a half-written file.

pub mod local;
pub mod urls;

use std::future::Future;
use std::path::PathBuf;

use wrigs_core::error::Result;

pub use local::LocalFileStore;
pub use urls::{public_url, resolve_design_url};

/// Where the service layer keeps its files.
///
/// Paths are relative to the store root and use `/` separators. Absolute
/// paths and `..` components are rejected.
pub trait FileStore: Send + Sync {
    /// Atomically write `bytes` to `rel_path`, creating parent directories.
    /// Returns the local path written.
    fn write(&self, rel_path: &str, bytes: &[u8]) -> impl Future<Output = Result<PathBuf>> + Send;

    /// Like [`write`](FileStore::write), but never replaces an existing file.
    /// Fails with an `AlreadyExists` I/O error when `rel_path` is taken.
    fn create(&self, rel_path: &str, bytes: &[u8]) -> impl Future<Output = Result<PathBuf>> + Send;

    fn exists(&self, rel_path: &str) -> impl Future<Output = bool> + Send;

    /// Remove a file. Removing a file that is already gone is not an error.
    fn remove(&self, rel_path: &str) -> impl Future<Output = Result<()>> + Send;

    /// Create a directory (and parents). Idempotent.
    fn ensure_dir(&self, rel_dir: &str) -> impl Future<Output = Result<PathBuf>> + Send;

    /// Local filesystem path for `rel_path`.
    fn local_path(&self, rel_path: &str) -> Result<PathBuf>;

    /// Public URL for `rel_path`.
    fn public_url(&self, rel_path: &str) -> String {
        public_url(rel_path)
    }
}
