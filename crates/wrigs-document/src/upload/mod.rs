// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Upload module — intake checks, HEIC transcoding and the normalization
// pipeline.

pub mod heic;
pub mod intake;
pub mod pipeline;

pub use heic::{DefaultHeicTranscoder, HeicTranscoder};
pub use intake::{AcceptedUpload, UploadPolicy, looks_like_heif};
pub use pipeline::{Derivatives, NormalizationPipeline};
