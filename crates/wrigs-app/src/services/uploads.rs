// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Upload service — runs the normalization pipeline off the async runtime and
// persists both derivatives.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};
use wrigs_core::error::{Result, WrigsError};
use wrigs_core::{FileId, UploadedImage};
use wrigs_document::NormalizationPipeline;
use wrigs_storage::FileStore;

/// Accepts raw sketch uploads and stores `{id}-original.png` and
/// `{id}-cleaned.png` under the uploads directory.
pub struct UploadService<S> {
    store: Arc<S>,
    pipeline: NormalizationPipeline,
    uploads_subdir: String,
}

impl<S> Clone for UploadService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            pipeline: self.pipeline.clone(),
            uploads_subdir: self.uploads_subdir.clone(),
        }
    }
}

/// Await a blocking task, folding a panic or cancellation into the error type.
async fn joined<T>(handle: JoinHandle<Result<T>>) -> Result<T> {
    handle
        .await
        .map_err(|e| WrigsError::ProcessingFailed(format!("image worker stopped: {e}")))?
}

impl<S: FileStore> UploadService<S> {
    pub fn new(store: Arc<S>, pipeline: NormalizationPipeline, uploads_subdir: impl Into<String>) -> Self {
        Self {
            store,
            pipeline,
            uploads_subdir: uploads_subdir.into(),
        }
    }

    pub fn pipeline(&self) -> &NormalizationPipeline {
        &self.pipeline
    }

    fn derivative_path(&self, id: &FileId, kind: &str) -> String {
        format!("{}/{id}-{kind}.png", self.uploads_subdir)
    }

    /// Normalise one upload and persist both derivatives.
    ///
    /// Nothing is reported as stored unless both files are on disk. If the
    /// cleaned file cannot be written, the original is removed again.
    #[instrument(skip(self, data), fields(len = data.len(), id))]
    pub async fn upload(&self, data: Vec<u8>, filename: &str, mime: &str) -> Result<UploadedImage> {
        let file_size = data.len();
        let accepted = self.pipeline.accept(&data, filename, mime)?;

        let id = FileId::new();
        tracing::Span::current().record("id", tracing::field::display(&id));

        self.store.ensure_dir(&self.uploads_subdir).await?;

        let pipeline = self.pipeline.clone();
        let prepared =
            joined(tokio::task::spawn_blocking(move || pipeline.prepare(&data, accepted))).await?;

        // Both derivatives share the decoded image and are built side by side.
        let original_task = {
            let pipeline = self.pipeline.clone();
            let image = prepared.clone();
            tokio::task::spawn_blocking(move || pipeline.original_png(image))
        };
        let cleaned_task = {
            let pipeline = self.pipeline.clone();
            tokio::task::spawn_blocking(move || pipeline.cleaned_png(prepared))
        };
        let (original_png, cleaned_png) =
            tokio::try_join!(joined(original_task), joined(cleaned_task))?;

        let original_rel = self.derivative_path(&id, "original");
        let cleaned_rel = self.derivative_path(&id, "cleaned");

        self.store.write(&original_rel, &original_png).await?;
        if let Err(err) = self.store.write(&cleaned_rel, &cleaned_png).await {
            warn!(error = %err, "cleaned derivative not stored, removing original");
            if let Err(cleanup) = self.store.remove(&original_rel).await {
                warn!(error = %cleanup, path = %original_rel, "could not remove orphaned original");
            }
            return Err(err);
        }

        info!(
            original_bytes = original_png.len(),
            cleaned_bytes = cleaned_png.len(),
            "Upload stored"
        );

        Ok(UploadedImage {
            original_url: self.store.public_url(&original_rel),
            cleaned_url: self.store.public_url(&cleaned_rel),
            file_id: id,
            file_name: filename.to_string(),
            file_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::io::Cursor;
    use std::path::PathBuf;

    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use wrigs_document::UploadPolicy;
    use wrigs_storage::LocalFileStore;

    use super::*;

    fn service(root: &std::path::Path) -> UploadService<LocalFileStore> {
        UploadService::new(
            Arc::new(LocalFileStore::new(root)),
            NormalizationPipeline::new(UploadPolicy::default()),
            "uploads",
        )
    }

    fn sketch(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            if (x / 40 + y / 40) % 7 == 0 {
                Rgb([200, 30, 120])
            } else if (x + 2 * y) % 97 < 4 {
                Rgb([20, 40, 160])
            } else {
                Rgb([235, 228, 214])
            }
        })
    }

    fn encode(image: RgbImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image).write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    fn stored(root: &std::path::Path, url: &str) -> PathBuf {
        root.join(url.trim_start_matches('/'))
    }

    #[tokio::test]
    async fn large_jpeg_yields_padded_cleaned_derivative() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let jpeg = encode(sketch(2000, 2000), ImageFormat::Jpeg);

        let uploaded = svc.upload(jpeg, "dress.jpg", "image/jpeg").await.unwrap();
        assert_eq!(uploaded.original_url, format!("/uploads/{}-original.png", uploaded.file_id));
        assert_eq!(uploaded.cleaned_url, format!("/uploads/{}-cleaned.png", uploaded.file_id));
        assert_eq!(uploaded.file_name, "dress.jpg");

        let original = image::open(stored(dir.path(), &uploaded.original_url)).unwrap();
        assert_eq!((original.width(), original.height()), (2000, 2000));

        let cleaned = image::open(stored(dir.path(), &uploaded.cleaned_url))
            .unwrap()
            .to_rgb8();
        assert_eq!(cleaned.dimensions(), (2120, 2120));
        let colours: HashSet<[u8; 3]> = cleaned.pixels().map(|p| p.0).collect();
        assert!(colours.len() <= 32, "{} colours", colours.len());
        for (x, y, pixel) in cleaned.enumerate_pixels() {
            let in_border = x < 60 || x >= 2060 || y < 60 || y >= 2060;
            if in_border {
                assert_eq!(pixel.0, [248, 248, 248], "border pixel ({x}, {y})");
            }
        }
    }

    #[tokio::test]
    async fn heic_without_mime_is_accepted_then_fails_to_transcode() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());

        let err = svc
            .upload(b"definitely not a heic container".to_vec(), "photo.heic", "")
            .await
            .unwrap_err();
        assert!(matches!(err, WrigsError::UnsupportedHeicVariant(_)), "{err:?}");
    }

    #[tokio::test]
    async fn rejected_uploads_leave_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());

        let err = svc.upload(b"GIF89a".to_vec(), "cat.gif", "image/gif").await.unwrap_err();
        assert!(matches!(err, WrigsError::InvalidFormat { .. }));

        let oversized = vec![0u8; 10 * 1024 * 1024 + 1];
        let err = svc.upload(oversized, "big.png", "image/png").await.unwrap_err();
        assert!(matches!(err, WrigsError::PayloadTooLarge { .. }));

        assert!(!dir.path().join("uploads").exists());
    }

    #[tokio::test]
    async fn corrupt_png_is_a_processing_failure() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let err = svc
            .upload(b"\x89PNG\r\n\x1a\nbroken".to_vec(), "sketch.png", "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, WrigsError::ProcessingFailed(_)));
        let leftovers = std::fs::read_dir(dir.path().join("uploads")).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn repeated_uploads_get_new_ids_and_identical_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let png = encode(sketch(320, 240), ImageFormat::Png);

        let first = svc.upload(png.clone(), "a.png", "image/png").await.unwrap();
        let second = svc.upload(png, "a.png", "image/png").await.unwrap();
        assert_ne!(first.file_id, second.file_id);

        let a = image::open(stored(dir.path(), &first.cleaned_url)).unwrap().to_rgb8();
        let b = image::open(stored(dir.path(), &second.cleaned_url)).unwrap().to_rgb8();
        assert_eq!(a.dimensions(), (440, 360));
        assert_eq!(a.as_raw(), b.as_raw());
    }
}
