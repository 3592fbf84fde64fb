// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — loads configuration and wires the template
// registry, pipeline, compositor and file store together.

use std::path::Path;
use std::sync::Arc;

use tracing::info;
use wrigs_core::error::Result;
use wrigs_core::{AppConfig, TemplateRegistry};
use wrigs_document::{NormalizationPipeline, PaperDollCompositor, UploadPolicy};
use wrigs_storage::LocalFileStore;

use super::data_dir;
use super::paper_dolls::PaperDollService;
use super::uploads::UploadService;

/// Everything a front end needs. Cheap to clone.
#[derive(Clone)]
pub struct AppServices {
    config: Arc<AppConfig>,
    uploads: UploadService<LocalFileStore>,
    paper_dolls: PaperDollService<LocalFileStore>,
}

impl AppServices {
    /// Load configuration (from `config_path`, else `config.json` in the data
    /// directory) and build the services.
    pub fn init(config_path: Option<&Path>) -> Result<Self> {
        Ok(Self::from_config(Self::load_config(config_path)?))
    }

    pub fn load_config(config_path: Option<&Path>) -> Result<AppConfig> {
        match config_path {
            Some(path) => AppConfig::load(path),
            None => AppConfig::load(data_dir::config_path()),
        }
    }

    /// Build the services over the stock template registry.
    pub fn from_config(config: AppConfig) -> Self {
        Self::with_registry(config, TemplateRegistry::builtin())
    }

    pub fn with_registry(config: AppConfig, registry: TemplateRegistry) -> Self {
        info!(
            static_dir = %config.static_dir.display(),
            templates = registry.len(),
            "initialising app services"
        );

        let store = Arc::new(LocalFileStore::new(&config.static_dir));
        let pipeline = NormalizationPipeline::new(UploadPolicy::from(&config));
        let compositor = Arc::new(PaperDollCompositor::new(
            Arc::new(registry),
            &config.static_dir,
        ));

        let uploads = UploadService::new(Arc::clone(&store), pipeline, &config.uploads_subdir);
        let paper_dolls = PaperDollService::new(
            store,
            compositor,
            &config.static_dir,
            &config.pdfs_subdir,
        )
        .with_default_paper_size(config.default_paper_size);

        Self {
            config: Arc::new(config),
            uploads,
            paper_dolls,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn uploads(&self) -> &UploadService<LocalFileStore> {
        &self.uploads
    }

    pub fn paper_dolls(&self) -> &PaperDollService<LocalFileStore> {
        &self.paper_dolls
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use wrigs_core::{PaperSize, PlacementData};

    use super::*;

    #[tokio::test]
    async fn upload_then_generate_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            static_dir: dir.path().join("static"),
            default_paper_size: PaperSize::A4,
            ..AppConfig::default()
        };
        let services = AppServices::from_config(config);

        let sketch = RgbImage::from_fn(300, 400, |x, y| {
            if (x as i32 - 150).abs() < 60 && y > 80 { Rgb([220, 60, 140]) } else { Rgb([240, 236, 226]) }
        });
        let mut png = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(sketch).write_to(&mut png, ImageFormat::Png).unwrap();

        let uploaded = services
            .uploads()
            .upload(png.into_inner(), "gown.png", "image/png")
            .await
            .unwrap();

        let pdf = services
            .paper_dolls()
            .generate(
                "pose-b-average",
                &uploaded.cleaned_url,
                PlacementData::for_category("dress"),
                None,
            )
            .await
            .unwrap();

        assert!(pdf.pdf_path.starts_with(dir.path().join("static").join("pdfs")));
        let reader = wrigs_document::PdfReader::open(&pdf.pdf_path).unwrap();
        assert_eq!(reader.page_count(), 2);
        let (w, _) = reader.page_size(2).unwrap();
        assert!((w - 595.0).abs() < 1.0);
    }

    #[test]
    fn init_with_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let services = AppServices::init(Some(&dir.path().join("absent.json"))).unwrap();
        assert_eq!(services.config(), &AppConfig::default());
        assert_eq!(services.paper_dolls().templates(None, None).len(), 6);
    }
}
