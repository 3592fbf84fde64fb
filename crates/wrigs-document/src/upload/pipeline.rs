// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Normalization pipeline: raw upload bytes in, `original` and `cleaned` PNG
// derivatives out.
//
// Everything here is synchronous and CPU-bound. Async callers run `prepare`
// once and then the two derivative builders on separate blocking tasks.

use std::sync::Arc;

use image::DynamicImage;
use tracing::{info, instrument};
use wrigs_core::error::Result;

use super::heic::{DefaultHeicTranscoder, HeicTranscoder};
use super::intake::{AcceptedUpload, UploadPolicy};
use crate::image::{ImageProcessor, cleaned_steps};

/// Both encoded derivatives of one upload.
#[derive(Debug, Clone)]
pub struct Derivatives {
    pub original_png: Vec<u8>,
    pub cleaned_png: Vec<u8>,
}

/// Clean-up pipeline for uploaded sketches. Cheap to clone.
#[derive(Clone)]
pub struct NormalizationPipeline {
    policy: UploadPolicy,
    transcoder: Arc<dyn HeicTranscoder>,
}

impl std::fmt::Debug for NormalizationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NormalizationPipeline")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Default for NormalizationPipeline {
    fn default() -> Self {
        Self::new(UploadPolicy::default())
    }
}

impl NormalizationPipeline {
    pub fn new(policy: UploadPolicy) -> Self {
        Self {
            policy,
            transcoder: Arc::new(DefaultHeicTranscoder),
        }
    }

    /// Swap the HEIC transcoder (tests, alternative decoders).
    pub fn with_transcoder(mut self, transcoder: Arc<dyn HeicTranscoder>) -> Self {
        self.transcoder = transcoder;
        self
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Format and size checks. No decoding happens here.
    pub fn accept(&self, data: &[u8], filename: &str, mime: &str) -> Result<AcceptedUpload> {
        self.policy.accept(data, filename, mime)
    }

    /// Transcode if needed, decode and downscale. The returned image is the
    /// shared input of both derivatives.
    #[instrument(skip(self, data), fields(len = data.len()))]
    pub fn prepare(&self, data: &[u8], accepted: AcceptedUpload) -> Result<DynamicImage> {
        let processor = if accepted.needs_transcode {
            let jpeg = self.transcoder.transcode(data)?;
            ImageProcessor::from_bytes(&jpeg)?
        } else {
            ImageProcessor::from_bytes(data)?
        };
        let resized = processor.resize_within(self.policy.max_dimension);
        info!(
            width = resized.width(),
            height = resized.height(),
            "Upload decoded"
        );
        Ok(resized.into_dynamic())
    }

    /// The `original` derivative: the resized image as PNG.
    pub fn original_png(&self, image: DynamicImage) -> Result<Vec<u8>> {
        ImageProcessor::from_dynamic(image).to_png_bytes()
    }

    /// The `cleaned` derivative.
    #[instrument(skip_all)]
    pub fn cleaned_png(&self, image: DynamicImage) -> Result<Vec<u8>> {
        ImageProcessor::from_dynamic(image)
            .run(&cleaned_steps(self.policy.max_dimension))
            .to_png_bytes()
    }

    /// Accept, prepare and build both derivatives on the current thread.
    pub fn run(&self, data: &[u8], filename: &str, mime: &str) -> Result<Derivatives> {
        let accepted = self.accept(data, filename, mime)?;
        let prepared = self.prepare(data, accepted)?;
        let original_png = self.original_png(prepared.clone())?;
        let cleaned_png = self.cleaned_png(prepared)?;
        Ok(Derivatives {
            original_png,
            cleaned_png,
        })
    }
}
