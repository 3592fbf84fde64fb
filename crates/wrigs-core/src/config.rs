// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, WrigsError};

/// Upload size ceiling: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Longest side of either upload derivative, in pixels.
pub const DEFAULT_MAX_DIMENSION: u32 = 2000;

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root of the statically served tree. Uploads and PDFs live in
    /// subdirectories of it; template `base_image_url`s resolve against it.
    pub static_dir: PathBuf,
    /// Subdirectory (under `static_dir`) for upload derivatives.
    pub uploads_subdir: String,
    /// Subdirectory (under `static_dir`) for generated PDFs.
    pub pdfs_subdir: String,
    /// Reject uploads larger than this many bytes.
    pub max_upload_bytes: usize,
    /// Downscale uploads so neither side exceeds this many pixels.
    pub max_dimension: u32,
    /// Paper size used when a request does not name one.
    pub default_paper_size: crate::PaperSize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            static_dir: PathBuf::from("static"),
            uploads_subdir: "uploads".into(),
            pdfs_subdir: "pdfs".into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_dimension: DEFAULT_MAX_DIMENSION,
            default_paper_size: crate::PaperSize::Letter,
        }
    }
}

impl AppConfig {
    /// Load settings from a JSON file. A missing file yields the defaults;
    /// a present but malformed file is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Write the settings as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), raw)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.max_dimension == 0 {
            return Err(WrigsError::Config("max_dimension must be positive".into()));
        }
        if self.max_upload_bytes == 0 {
            return Err(WrigsError::Config("max_upload_bytes must be positive".into()));
        }
        for subdir in [&self.uploads_subdir, &self.pdfs_subdir] {
            if subdir.is_empty() || subdir.contains("..") || subdir.starts_with('/') {
                return Err(WrigsError::Config(format!(
                    "subdirectory {subdir:?} must be a plain relative name"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.max_dimension, 2000);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wrigs.json");
        std::fs::write(&path, r#"{"default_paper_size":"a4","static_dir":"/srv/wrigs"}"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.default_paper_size, crate::PaperSize::A4);
        assert_eq!(config.static_dir, PathBuf::from("/srv/wrigs"));
        assert_eq!(config.pdfs_subdir, "pdfs");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wrigs.json");
        let mut config = AppConfig::default();
        config.max_dimension = 1200;
        config.save(&path).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap().max_dimension, 1200);
    }

    #[test]
    fn escaping_subdir_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wrigs.json");
        std::fs::write(&path, r#"{"uploads_subdir":"../etc"}"#).unwrap();
        assert!(matches!(AppConfig::load(&path), Err(WrigsError::Config(_))));
    }
}
