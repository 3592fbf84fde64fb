// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Wrigs Fashion.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Wrigs Fashion operations.
#[derive(Debug, Error)]
pub enum WrigsError {
    // -- Upload intake --
    #[error("invalid file type {mime:?} for {filename:?}: please upload JPG, PNG, or HEIC")]
    InvalidFormat { mime: String, filename: String },

    #[error("upload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    // -- Image pipeline --
    #[error("HEIC/HEIF image could not be transcoded: {0}")]
    UnsupportedHeicVariant(String),

    #[error("image processing failed: {0}")]
    ProcessingFailed(String),

    // -- PDF compositor --
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error("design image not found at {}", .0.display())]
    DesignImageNotFound(PathBuf),

    #[error("remote design URLs are not supported: {0}")]
    RemoteDesignUnsupported(String),

    #[error("PDF generation failed: {0}")]
    GenerationFailed(String),

    // -- Registry / configuration --
    #[error("invalid doll template {id}: {reason}")]
    InvalidTemplate { id: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    // -- Storage --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WrigsError {
    /// Stable snake_case identifier for the error kind, used by the HTTP
    /// boundary to pick a status code and by logs for grouping.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidFormat { .. } => "invalid_format",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::UnsupportedHeicVariant(_) => "unsupported_heic_variant",
            Self::ProcessingFailed(_) => "processing_failed",
            Self::TemplateNotFound(_) => "template_not_found",
            Self::DesignImageNotFound(_) => "design_image_not_found",
            Self::RemoteDesignUnsupported(_) => "remote_design_unsupported",
            Self::GenerationFailed(_) => "generation_failed",
            Self::InvalidTemplate { .. } => "invalid_template",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }

    /// Whether the caller can fix the problem by changing its input.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFormat { .. }
                | Self::PayloadTooLarge { .. }
                | Self::UnsupportedHeicVariant(_)
                | Self::TemplateNotFound(_)
                | Self::DesignImageNotFound(_)
                | Self::RemoteDesignUnsupported(_)
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, WrigsError>;
