// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for young designers and their grown-ups.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity drives how the UI presents the message.

use crate::error::WrigsError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Disk hiccup or similar — trying again may work.
    Transient,
    /// The user has to do something different (pick another file, retake
    /// the photo).
    ActionRequired,
    /// Something is wrong on our side; retrying won't help.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether the request may be retried as-is.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `WrigsError` into a `HumanError` a young designer can act on.
pub fn humanize_error(err: &WrigsError) -> HumanError {
    match err {
        // -- Upload intake --
        WrigsError::InvalidFormat { .. } => HumanError {
            message: "We can't use that kind of file.".into(),
            suggestion: "Please pick a photo saved as JPG, PNG, or HEIC.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        WrigsError::PayloadTooLarge { limit, .. } => HumanError {
            message: "That photo is too big.".into(),
            suggestion: format!(
                "Please choose a photo smaller than {} MB, or take a new one at a lower resolution.",
                limit / (1024 * 1024)
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // -- Image pipeline --
        WrigsError::UnsupportedHeicVariant(_) => HumanError {
            message: "We couldn't open this iPhone photo.".into(),
            suggestion: "Try converting it to JPG or PNG first, then upload it again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        WrigsError::ProcessingFailed(_) => HumanError {
            message: "We couldn't clean up your sketch.".into(),
            suggestion: "The photo may be damaged. Try taking a new photo of your drawing in good light.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        // -- PDF compositor --
        WrigsError::TemplateNotFound(_) => HumanError {
            message: "We couldn't find that paper doll.".into(),
            suggestion: "Go back and pick a doll from the list, then try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        WrigsError::DesignImageNotFound(_) => HumanError {
            message: "We couldn't find your design.".into(),
            suggestion: "It may have been removed. Try uploading your sketch again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        WrigsError::RemoteDesignUnsupported(_) => HumanError {
            message: "Designs have to be uploaded here first.".into(),
            suggestion: "Upload your sketch, then use it to make your paper doll.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        WrigsError::GenerationFailed(_) => HumanError {
            message: "Your printable paper doll didn't finish.".into(),
            suggestion: "Please try again in a moment.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        // -- Registry / configuration --
        WrigsError::InvalidTemplate { .. } | WrigsError::Config(_) => HumanError {
            message: "Wrigs Fashion isn't set up correctly.".into(),
            suggestion: "Please ask a grown-up to let us know about this problem.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        // -- Storage --
        WrigsError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "A file we needed has gone missing.".into(),
                    suggestion: "Try uploading your sketch again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "We had trouble saving your work.".into(),
                    suggestion: "Try again. If this keeps happening, the server may be out of space.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        WrigsError::Serialization(_) => HumanError {
            message: "Something got mixed up on our side.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}
