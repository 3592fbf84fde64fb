// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode, run clean-up steps, encode. Operates on in-memory
// images using the `image` and `imageproc` crates.

use image::{DynamicImage, ImageFormat};
use tracing::{debug, info, instrument};
use wrigs_core::error::{Result, WrigsError};

use super::steps::{self, CleanStep};

/// Image processing pipeline operating on a single in-memory image.
///
/// Each method consumes `self` and returns a new `ImageProcessor` wrapping
/// the transformed image, enabling method chaining.
///
/// ```ignore
/// let png = ImageProcessor::from_bytes(&upload)?
///     .resize_within(2000)
///     .run(&cleaned_steps(2000))
///     .to_png_bytes()?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data).map_err(|err| {
            WrigsError::ProcessingFailed(format!("failed to decode image: {}", err))
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Downscale so neither side exceeds `max_dimension`. Smaller images
    /// pass through untouched.
    #[instrument(skip(self), fields(max_dimension))]
    pub fn resize_within(self, max_dimension: u32) -> Self {
        let (from_w, from_h) = (self.image.width(), self.image.height());
        let resized = steps::resize_within(self.image, max_dimension);
        if (resized.width(), resized.height()) != (from_w, from_h) {
            info!(
                from_w,
                from_h,
                new_w = resized.width(),
                new_h = resized.height(),
                "Image downscaled"
            );
        }
        Self { image: resized }
    }

    /// Apply a single clean-up step.
    pub fn apply(self, step: &CleanStep) -> Self {
        Self {
            image: step.apply(self.image),
        }
    }

    /// Apply `steps` in order.
    #[instrument(skip_all, fields(steps = steps.len()))]
    pub fn run(self, steps: &[CleanStep]) -> Self {
        let processed = steps.iter().fold(self, |proc, step| proc.apply(step));
        debug!(
            width = processed.width(),
            height = processed.height(),
            "Clean-up steps complete"
        );
        processed
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        encode_to_format(&self.image, ImageFormat::Png)
    }

    /// Encode the current image as JPEG bytes with the given quality (1-100).
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let rgb = self.image.to_rgb8();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
        rgb.write_with_encoder(encoder).map_err(|err| {
            WrigsError::ProcessingFailed(format!("JPEG encoding failed: {}", err))
        })?;
        Ok(buffer)
    }
}

/// Encode a `DynamicImage` into the specified format, returning the raw bytes.
fn encode_to_format(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image.write_to(&mut cursor, format).map_err(|err| {
        WrigsError::ProcessingFailed(format!("image encoding failed: {}", err))
    })?;
    Ok(buffer)
}
