// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Paper-doll service — resolves the design, renders the PDF on a blocking
// task and publishes it under the PDF directory.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};
use wrigs_core::error::{Result, WrigsError};
use wrigs_core::{BodyType, DollTemplate, GeneratedPdf, PaperSize, PlacementData, Pose};
use wrigs_document::{PaperDollCompositor, PaperDollRequest, pdf_filename_for_attempt};
use wrigs_storage::{FileStore, resolve_design_url};

/// Suffixed names tried before giving up when PDFs share a millisecond.
const MAX_NAME_ATTEMPTS: u32 = 16;

pub struct PaperDollService<S> {
    store: Arc<S>,
    compositor: Arc<PaperDollCompositor>,
    /// Root that site-relative design URLs are resolved against.
    static_root: PathBuf,
    pdfs_subdir: String,
    default_paper_size: PaperSize,
}

impl<S> Clone for PaperDollService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            compositor: Arc::clone(&self.compositor),
            static_root: self.static_root.clone(),
            pdfs_subdir: self.pdfs_subdir.clone(),
            default_paper_size: self.default_paper_size,
        }
    }
}

impl<S: FileStore> PaperDollService<S> {
    pub fn new(
        store: Arc<S>,
        compositor: Arc<PaperDollCompositor>,
        static_root: impl Into<PathBuf>,
        pdfs_subdir: impl Into<String>,
    ) -> Self {
        Self {
            store,
            compositor,
            static_root: static_root.into(),
            pdfs_subdir: pdfs_subdir.into(),
            default_paper_size: PaperSize::default(),
        }
    }

    pub fn with_default_paper_size(mut self, paper_size: PaperSize) -> Self {
        self.default_paper_size = paper_size;
        self
    }

    // -- Templates ------------------------------------------------------------

    /// Stock templates, optionally narrowed by pose and body type.
    pub fn templates(&self, pose: Option<Pose>, body_type: Option<BodyType>) -> Vec<DollTemplate> {
        self.compositor
            .registry()
            .all()
            .iter()
            .filter(|t| pose.is_none_or(|p| t.pose == p))
            .filter(|t| body_type.is_none_or(|b| t.body_type == b))
            .cloned()
            .collect()
    }

    pub fn template(&self, id: &str) -> Result<DollTemplate> {
        self.compositor
            .registry()
            .get(id)
            .cloned()
            .ok_or_else(|| WrigsError::TemplateNotFound(id.to_string()))
    }

    // -- Generation -----------------------------------------------------------

    /// Generate from a design URL as returned by the upload service
    /// (`/uploads/{id}-cleaned.png`).
    pub async fn generate(
        &self,
        template_id: &str,
        design_url: &str,
        placement: PlacementData,
        paper_size: Option<PaperSize>,
    ) -> Result<GeneratedPdf> {
        let design_path = resolve_design_url(&self.static_root, design_url)?;
        self.generate_from_path(template_id, &design_path, placement, paper_size)
            .await
    }

    /// Generate from a design file on local disk.
    #[instrument(skip(self, placement), fields(category = %placement.category))]
    pub async fn generate_from_path(
        &self,
        template_id: &str,
        design_path: &Path,
        placement: PlacementData,
        paper_size: Option<PaperSize>,
    ) -> Result<GeneratedPdf> {
        let request = PaperDollRequest {
            template_id: template_id.to_string(),
            design_path: design_path.to_path_buf(),
            placement,
            paper_size: paper_size.unwrap_or(self.default_paper_size),
        };

        let compositor = Arc::clone(&self.compositor);
        let bytes = tokio::task::spawn_blocking(move || compositor.render(&request))
            .await
            .map_err(|e| WrigsError::GenerationFailed(format!("render task stopped: {e}")))??;

        self.publish(template_id, chrono::Utc::now().timestamp_millis(), &bytes)
            .await
    }

    /// Store `bytes` under a fresh name in the PDF directory. An existing PDF
    /// is never replaced; a taken name is retried with a numeric suffix.
    async fn publish(
        &self,
        template_id: &str,
        timestamp_millis: i64,
        bytes: &[u8],
    ) -> Result<GeneratedPdf> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let filename = pdf_filename_for_attempt(template_id, timestamp_millis, attempt);
            let rel_path = format!("{}/{filename}", self.pdfs_subdir);
            match self.store.create(&rel_path, bytes).await {
                Ok(pdf_path) => {
                    info!(path = %pdf_path.display(), bytes = bytes.len(), "Paper doll PDF published");
                    return Ok(GeneratedPdf {
                        pdf_url: self.store.public_url(&rel_path),
                        pdf_path,
                        filename,
                    });
                }
                Err(WrigsError::Io(err)) if err.kind() == io::ErrorKind::AlreadyExists => {
                    debug!(%filename, "PDF name taken, trying next suffix");
                }
                Err(e) => {
                    return Err(WrigsError::GenerationFailed(format!("writing {filename}: {e}")));
                }
            }
        }
        Err(WrigsError::GenerationFailed(format!(
            "no free PDF name for {template_id} at {timestamp_millis}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};
    use wrigs_core::TemplateRegistry;
    use wrigs_document::PdfReader;
    use wrigs_storage::LocalFileStore;

    use super::*;

    struct Fixture {
        dir: tempfile::TempDir,
        service: PaperDollService<LocalFileStore>,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let store = Arc::new(LocalFileStore::new(dir.path()));
            let compositor = Arc::new(PaperDollCompositor::new(
                Arc::new(TemplateRegistry::builtin()),
                dir.path(),
            ));
            let service = PaperDollService::new(store, compositor, dir.path(), "pdfs");
            Self { dir, service }
        }

        /// Drop a cleaned design into `uploads/` and return its public URL.
        fn design(&self) -> String {
            let uploads = self.dir.path().join("uploads");
            std::fs::create_dir_all(&uploads).unwrap();
            RgbImage::from_fn(120, 80, |x, _| {
                if x < 60 { Rgb([200, 40, 90]) } else { Rgb([248, 248, 248]) }
            })
            .save(uploads.join("abc123-cleaned.png"))
            .unwrap();
            "/uploads/abc123-cleaned.png".to_string()
        }

        fn pdf_count(&self) -> usize {
            match std::fs::read_dir(self.dir.path().join("pdfs")) {
                Ok(entries) => entries.count(),
                Err(_) => 0,
            }
        }
    }

    #[tokio::test]
    async fn a4_shoes_piece_has_two_a4_pages() {
        let fx = Fixture::new();
        let design = fx.design();

        let pdf = fx
            .service
            .generate(
                "pose-a-average",
                &design,
                PlacementData::for_category("shoes"),
                Some(PaperSize::A4),
            )
            .await
            .unwrap();

        assert!(pdf.filename.starts_with("paper-doll-pose-a-average-"));
        assert!(pdf.filename.ends_with(".pdf"));
        assert_eq!(pdf.pdf_url, format!("/pdfs/{}", pdf.filename));
        assert!(pdf.pdf_path.is_file());

        let reader = PdfReader::open(&pdf.pdf_path).unwrap();
        assert_eq!(reader.page_count(), 2);
        for page in 1..=2 {
            let (w, h) = reader.page_size(page).unwrap();
            assert!((w - 595.0).abs() < 1.0 && (h - 842.0).abs() < 1.0, "{w}x{h}");
        }
    }

    #[tokio::test]
    async fn default_paper_is_letter() {
        let fx = Fixture::new();
        let design = fx.design();
        let pdf = fx
            .service
            .generate("pose-b-curvy", &design, PlacementData::for_category("dress"), None)
            .await
            .unwrap();
        let (w, h) = PdfReader::open(&pdf.pdf_path).unwrap().page_size(1).unwrap();
        assert!((w - 612.0).abs() < 1.0 && (h - 792.0).abs() < 1.0, "{w}x{h}");
    }

    #[tokio::test]
    async fn unknown_template_writes_nothing() {
        let fx = Fixture::new();
        let design = fx.design();
        let err = fx
            .service
            .generate("does-not-exist", &design, PlacementData::for_category("top"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, WrigsError::TemplateNotFound(ref id) if id == "does-not-exist"));
        assert_eq!(fx.pdf_count(), 0);
    }

    #[tokio::test]
    async fn missing_design_writes_nothing() {
        let fx = Fixture::new();
        let err = fx
            .service
            .generate(
                "pose-a-petite",
                "/uploads/gone-cleaned.png",
                PlacementData::for_category("top"),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, WrigsError::DesignImageNotFound(_)));
        assert_eq!(fx.pdf_count(), 0);
    }

    #[tokio::test]
    async fn remote_design_is_refused() {
        let fx = Fixture::new();
        let err = fx
            .service
            .generate(
                "pose-a-average",
                "https://example.com/dress.png",
                PlacementData::for_category("top"),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, WrigsError::RemoteDesignUnsupported(_)));
    }

    #[tokio::test]
    async fn unknown_category_still_renders() {
        let fx = Fixture::new();
        let design = fx.design();
        let pdf = fx
            .service
            .generate("pose-b-petite", &design, PlacementData::for_category("cape"), None)
            .await
            .unwrap();
        assert_eq!(PdfReader::open(&pdf.pdf_path).unwrap().page_count(), 2);
    }

    #[tokio::test]
    async fn same_millisecond_pdfs_get_distinct_names() {
        let fx = Fixture::new();
        let first = fx.service.publish("pose-a-average", 1_700_000_000_000, b"first").await.unwrap();
        let second = fx.service.publish("pose-a-average", 1_700_000_000_000, b"second").await.unwrap();

        assert_eq!(first.filename, "paper-doll-pose-a-average-1700000000000.pdf");
        assert_eq!(second.filename, "paper-doll-pose-a-average-1700000000000-1.pdf");
        assert_eq!(std::fs::read(&first.pdf_path).unwrap(), b"first");
        assert_eq!(std::fs::read(&second.pdf_path).unwrap(), b"second");
        assert_eq!(fx.pdf_count(), 2);
    }

    #[test]
    fn templates_filter_by_pose_and_body_type() {
        let fx = Fixture::new();
        assert_eq!(fx.service.templates(None, None).len(), 6);
        assert_eq!(fx.service.templates(Some(Pose::PoseA), None).len(), 3);
        let curvy_b = fx.service.templates(Some(Pose::PoseB), Some(BodyType::Curvy));
        assert_eq!(curvy_b.len(), 1);
        assert_eq!(curvy_b[0].id, "pose-b-curvy");
        assert!(matches!(
            fx.service.template("nope"),
            Err(WrigsError::TemplateNotFound(_))
        ));
    }
}
