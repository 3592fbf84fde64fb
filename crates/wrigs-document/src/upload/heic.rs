// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HEIC/HEIF transcoding.
//
// The general-purpose decoder cannot read HEIC, so those uploads are first
// turned into a baseline JPEG. Native decoding uses libheif and is only
// compiled with the `heic` feature:
//
// ```toml
// wrigs-document = { path = "crates/wrigs-document", features = ["heic"] }
// ```
//
// Without the feature every HEIC upload fails with `UnsupportedHeicVariant`,
// which the UI turns into a "convert to JPG or PNG first" hint.

use wrigs_core::error::{Result, WrigsError};

/// JPEG quality used for transcoded HEIC frames.
pub const TRANSCODE_JPEG_QUALITY: u8 = 95;

/// Turns HEIC/HEIF bytes into bytes the general decoder understands.
pub trait HeicTranscoder: Send + Sync {
    /// Transcode the primary image of `data` to JPEG. Any failure must be
    /// reported as `WrigsError::UnsupportedHeicVariant`.
    fn transcode(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// The transcoder compiled into this build.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHeicTranscoder;

#[cfg(feature = "heic")]
impl HeicTranscoder for DefaultHeicTranscoder {
    #[tracing::instrument(skip_all, fields(len = data.len()))]
    fn transcode(&self, data: &[u8]) -> Result<Vec<u8>> {
        use image::{DynamicImage, RgbImage};
        use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

        let heic_err = |stage: &str, err: libheif_rs::HeifError| {
            WrigsError::UnsupportedHeicVariant(format!("{stage}: {err}"))
        };

        let lib_heif = LibHeif::new();
        let ctx = HeifContext::read_from_bytes(data).map_err(|e| heic_err("read", e))?;
        let handle = ctx
            .primary_image_handle()
            .map_err(|e| heic_err("primary image", e))?;
        let decoded = lib_heif
            .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
            .map_err(|e| heic_err("decode", e))?;

        let planes = decoded.planes();
        let plane = planes.interleaved.ok_or_else(|| {
            WrigsError::UnsupportedHeicVariant("decoder produced no interleaved plane".into())
        })?;

        // Rows may be padded; copy exactly width * 3 bytes per row.
        let (width, height) = (plane.width, plane.height);
        let row_len = width as usize * 3;
        let mut pixels = Vec::with_capacity(row_len * height as usize);
        for row in plane.data.chunks(plane.stride).take(height as usize) {
            let row = row.get(..row_len).ok_or_else(|| {
                WrigsError::UnsupportedHeicVariant("truncated pixel row".into())
            })?;
            pixels.extend_from_slice(row);
        }
        let rgb = RgbImage::from_raw(width, height, pixels).ok_or_else(|| {
            WrigsError::UnsupportedHeicVariant("pixel buffer size mismatch".into())
        })?;

        tracing::debug!(width, height, "HEIC frame decoded");
        crate::image::ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(rgb))
            .to_jpeg_bytes(TRANSCODE_JPEG_QUALITY)
            .map_err(|e| WrigsError::UnsupportedHeicVariant(format!("re-encode: {e}")))
    }
}

#[cfg(not(feature = "heic"))]
impl HeicTranscoder for DefaultHeicTranscoder {
    fn transcode(&self, _data: &[u8]) -> Result<Vec<u8>> {
        Err(WrigsError::UnsupportedHeicVariant(
            "this build has no HEIC decoder (enable the `heic` feature)".into(),
        ))
    }
}
