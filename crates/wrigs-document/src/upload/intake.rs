// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Upload intake: format and size checks that run before any decoding.

use std::path::Path;

use tracing::{debug, instrument, warn};
use wrigs_core::UploadFormat;
use wrigs_core::config::{AppConfig, DEFAULT_MAX_DIMENSION, DEFAULT_MAX_UPLOAD_BYTES};
use wrigs_core::error::{Result, WrigsError};

/// Limits applied to every upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_bytes: usize,
    pub max_dimension: u32,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}

impl From<&AppConfig> for UploadPolicy {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_bytes: config.max_upload_bytes,
            max_dimension: config.max_dimension,
        }
    }
}

/// An upload that passed intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptedUpload {
    /// Format from the declared MIME type (or the extension when no type
    /// was declared).
    pub format: UploadFormat,
    /// Whether the payload has to go through the HEIC transcoder first.
    pub needs_transcode: bool,
}

impl UploadPolicy {
    /// Decide whether an upload may enter the pipeline.
    ///
    /// The format check runs first, then the size check. An empty `mime`
    /// falls back to the filename extension; a non-empty but unknown `mime`
    /// is rejected even if the extension looks fine.
    #[instrument(skip(self, data), fields(len = data.len()))]
    pub fn accept(&self, data: &[u8], filename: &str, mime: &str) -> Result<AcceptedUpload> {
        let format = if mime.trim().is_empty() {
            extension_of(filename).and_then(UploadFormat::from_extension)
        } else {
            UploadFormat::from_mime(mime)
        };

        let Some(format) = format else {
            warn!("rejecting upload with unsupported type");
            return Err(WrigsError::InvalidFormat {
                mime: mime.to_string(),
                filename: filename.to_string(),
            });
        };

        if data.len() > self.max_bytes {
            return Err(WrigsError::PayloadTooLarge {
                size: data.len(),
                limit: self.max_bytes,
            });
        }

        // Phones sometimes label HEIC photos as JPEG; trust the container.
        let needs_transcode = format.is_heic() || looks_like_heif(data);
        debug!(?format, needs_transcode, "upload accepted");
        Ok(AcceptedUpload {
            format,
            needs_transcode,
        })
    }
}

fn extension_of(filename: &str) -> Option<&str> {
    Path::new(filename).extension().and_then(|ext| ext.to_str())
}

/// ISO-BMFF brands used by HEIC/HEIF stills and sequences.
const HEIF_BRANDS: [&[u8; 4]; 8] = [
    b"heic", b"heix", b"hevc", b"hevx", b"heim", b"heis", b"mif1", b"msf1",
];

/// Whether `data` starts with an `ftyp` box carrying a HEIF brand.
pub fn looks_like_heif(data: &[u8]) -> bool {
    if data.len() < 12 || &data[4..8] != b"ftyp" {
        return false;
    }
    HEIF_BRANDS.iter().any(|brand| &data[8..12] == *brand)
}
