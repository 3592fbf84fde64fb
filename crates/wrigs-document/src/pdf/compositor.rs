// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Paper-doll compositor — renders the two-page printable PDF using
// `printpdf` 0.8.
//
// Page 1 carries the doll base, page 2 the user's outfit piece with fold
// tabs. Both are built as `Op` lists from the pure layouts in `layout`, then
// serialised via `PdfDocument::save()` and re-read with lopdf before the
// bytes are handed back.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use printpdf::{Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg};
use tracing::{debug, info, instrument, warn};
use wrigs_core::error::{Result, WrigsError};
use wrigs_core::{DollTemplate, PaperSize, PlacementData, TemplateRegistry};

use super::assets::{AssetLoader, RasterAssetLoader};
use super::draw::{PageCanvas, ShapeStyle, TextStyle};
use super::layout::{
    self, CONTAINER_RADIUS, DollBaseLayout, OutfitPieceLayout, PageFrame, TAB_RADIUS,
};
use super::reader::PdfReader;

pub const PDF_TITLE: &str = "Wrigs Fashion Paper Doll";
pub const PDF_AUTHOR: &str = "Wrigs Fashion";
pub const PDF_SUBJECT: &str = "Paper Doll Cutout";
pub const PDF_KEYWORDS: [&str; 4] = ["paper doll", "fashion", "craft", "printable"];

const DOLL_TITLE: &str = "Paper Doll Base";
const DOLL_INSTRUCTIONS: &str =
    "Cut along the dotted lines. Fold the bottom tab to make the doll stand.";
const OUTFIT_INSTRUCTIONS: &str =
    "Cut along the dotted lines. Fold the tabs to attach to your paper doll!";
const DOLL_PLACEHOLDER: &str = "Doll Template";
const DESIGN_PLACEHOLDER: &str = "Your Design Here";
const FOOTER: &str = "Made with Wrigs Fashion";
const TAB_LABEL: &str = "fold";

const BLACK: u32 = 0x000000;
const WHITE: u32 = 0xffffff;
const INK: u32 = 0x333333;
const MUTED: u32 = 0x666666;
const CUT_GREY: u32 = 0x999999;
const TAB_FILL: u32 = 0xf0f0f0;

const TITLE_STYLE: TextStyle = TextStyle::bold(20.0, BLACK);
const INSTRUCTION_STYLE: TextStyle = TextStyle::regular(10.0, BLACK);
const FOOTER_STYLE: TextStyle = TextStyle::regular(8.0, MUTED);
const CUT_LINE: ShapeStyle = ShapeStyle::stroke(CUT_GREY, 1.0).dashed(5, 3);

/// One PDF generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct PaperDollRequest {
    pub template_id: String,
    /// Local path of the cleaned design image.
    pub design_path: PathBuf,
    pub placement: PlacementData,
    pub paper_size: PaperSize,
}

/// `paper-doll-{templateId}-{timestampMillis}.pdf`
pub fn pdf_filename(template_id: &str, timestamp_millis: i64) -> String {
    pdf_filename_for_attempt(template_id, timestamp_millis, 0)
}

/// Filename for the `attempt`-th try at publishing a PDF. The first attempt
/// is the plain [`pdf_filename`]; later ones append `-{attempt}`.
pub fn pdf_filename_for_attempt(template_id: &str, timestamp_millis: i64, attempt: u32) -> String {
    if attempt == 0 {
        format!("paper-doll-{template_id}-{timestamp_millis}.pdf")
    } else {
        format!("paper-doll-{template_id}-{timestamp_millis}-{attempt}.pdf")
    }
}

fn page_mm(frame: &PageFrame) -> (Mm, Mm) {
    (
        Mm(frame.width * 25.4 / 72.0),
        Mm(frame.height * 25.4 / 72.0),
    )
}

/// Renders printable paper dolls.
///
/// Holds the template registry and knows where template artwork lives.
/// Image loading goes through an [`AssetLoader`] so a missing or vector-only
/// asset degrades to a placeholder instead of failing the whole document.
pub struct PaperDollCompositor<L = RasterAssetLoader> {
    registry: Arc<TemplateRegistry>,
    /// Root that template `base_image_url`s are resolved against.
    asset_root: PathBuf,
    loader: L,
}

impl PaperDollCompositor<RasterAssetLoader> {
    pub fn new(registry: Arc<TemplateRegistry>, asset_root: impl Into<PathBuf>) -> Self {
        Self::with_loader(registry, asset_root, RasterAssetLoader)
    }
}

impl<L: AssetLoader> PaperDollCompositor<L> {
    pub fn with_loader(
        registry: Arc<TemplateRegistry>,
        asset_root: impl Into<PathBuf>,
        loader: L,
    ) -> Self {
        Self {
            registry,
            asset_root: asset_root.into(),
            loader,
        }
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Template and design checks. Runs before anything is rendered.
    pub fn validate(&self, template_id: &str, design_path: &Path) -> Result<&DollTemplate> {
        let template = self
            .registry
            .get(template_id)
            .ok_or_else(|| WrigsError::TemplateNotFound(template_id.to_string()))?;
        if !design_path.is_file() {
            return Err(WrigsError::DesignImageNotFound(design_path.to_path_buf()));
        }
        Ok(template)
    }

    /// Local path of a template's artwork.
    pub fn artwork_path(&self, template: &DollTemplate) -> PathBuf {
        self.asset_root
            .join(template.base_image_url.trim_start_matches('/'))
    }

    // -- Rendering ------------------------------------------------------------

    /// Render the two-page PDF and return its bytes.
    #[instrument(skip(self, request), fields(
        template = %request.template_id,
        category = %request.placement.category,
        paper = request.paper_size.as_str(),
    ))]
    pub fn render(&self, request: &PaperDollRequest) -> Result<Vec<u8>> {
        let template = self.validate(&request.template_id, &request.design_path)?;

        let mut doc = PdfDocument::new(PDF_TITLE);
        doc.metadata.info.author = PDF_AUTHOR.to_string();
        doc.metadata.info.subject = PDF_SUBJECT.to_string();
        doc.metadata.info.keywords = PDF_KEYWORDS.iter().map(|k| k.to_string()).collect();

        let base = layout::doll_base_layout(request.paper_size, template.view_box);
        let base_ops = self.doll_base_ops(&mut doc, template, &base);

        let region = template.regions.resolve(&request.placement.category);
        let piece = layout::outfit_piece_layout(request.paper_size, region);
        let piece_ops = self.outfit_piece_ops(&mut doc, request, &piece);

        let (page_w, page_h) = page_mm(&base.frame);
        doc.with_pages(vec![
            PdfPage::new(page_w, page_h, base_ops),
            PdfPage::new(page_w, page_h, piece_ops),
        ]);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            debug!(count = warnings.len(), "printpdf reported warnings");
        }

        let pages = PdfReader::from_bytes(&output)?.page_count();
        if pages != 2 {
            return Err(WrigsError::GenerationFailed(format!(
                "expected 2 pages, rendered {pages}"
            )));
        }

        info!(bytes = output.len(), "Paper doll PDF rendered");
        Ok(output)
    }

    fn doll_base_ops(
        &self,
        doc: &mut PdfDocument,
        template: &DollTemplate,
        page: &DollBaseLayout,
    ) -> Vec<Op> {
        let frame = &page.frame;
        let content = frame.content;
        let mut canvas = PageCanvas::new(frame.height);

        canvas.text_centered(DOLL_TITLE, TITLE_STYLE, content.x, content.width, frame.title_top());
        canvas.text_centered(
            DOLL_INSTRUCTIONS,
            INSTRUCTION_STYLE,
            content.x,
            content.width,
            frame.instruction_top(),
        );

        let artwork_path = self.artwork_path(template);
        match self.loader.load(&artwork_path, (page.artwork.width, page.artwork.height)) {
            Ok(image) => {
                let id = doc.add_image(&image.to_raw_image());
                canvas.image(id, image.width, image.height, page.artwork);
            }
            Err(err) => {
                debug!(template = %template.id, error = %err, "doll artwork placeholder");
                canvas.rect(page.artwork, ShapeStyle::stroke(BLACK, 1.0));
                canvas.text_centered(
                    DOLL_PLACEHOLDER,
                    TextStyle::regular(12.0, BLACK),
                    page.artwork.x,
                    page.artwork.width,
                    page.artwork.center_y(),
                );
            }
        }

        canvas.rect(page.cut_line, CUT_LINE);
        canvas.text_centered(FOOTER, FOOTER_STYLE, content.x, content.width, frame.footer_top());
        canvas.into_ops()
    }

    fn outfit_piece_ops(
        &self,
        doc: &mut PdfDocument,
        request: &PaperDollRequest,
        page: &OutfitPieceLayout,
    ) -> Vec<Op> {
        let frame = &page.frame;
        let content = frame.content;
        let container = page.container;
        let mut canvas = PageCanvas::new(frame.height);

        let title = format!(
            "{} Outfit Piece",
            request.placement.category_display_name()
        );
        canvas.text_centered(&title, TITLE_STYLE, content.x, content.width, frame.title_top());
        canvas.text_centered(
            OUTFIT_INSTRUCTIONS,
            INSTRUCTION_STYLE,
            content.x,
            content.width,
            frame.instruction_top(),
        );

        canvas.rounded_rect(
            container,
            CONTAINER_RADIUS,
            ShapeStyle::fill_stroke(WHITE, INK, 2.0),
        );

        let design_box = (page.design_box.width, page.design_box.height);
        match self.loader.load(&request.design_path, design_box) {
            Ok(image) => {
                let placed = layout::fit_image(image.width, image.height, page.design_box);
                let id = doc.add_image(&image.to_raw_image());
                canvas.image(id, image.width, image.height, placed);
            }
            Err(err) => {
                warn!(path = %request.design_path.display(), error = %err, "design image placeholder");
                canvas.text_centered(
                    DESIGN_PLACEHOLDER,
                    TextStyle::regular(12.0, MUTED),
                    container.x,
                    container.width,
                    container.center_y(),
                );
            }
        }

        for tab in &page.tabs {
            canvas.rounded_rect(*tab, TAB_RADIUS, ShapeStyle::fill_stroke(TAB_FILL, INK, 1.0));
            canvas.text_centered(
                TAB_LABEL,
                TextStyle::regular(6.0, MUTED),
                tab.x,
                tab.width,
                tab.center_y() - 3.0,
            );
        }

        canvas.rounded_rect(page.cut_line, CONTAINER_RADIUS, CUT_LINE);
        canvas.text_centered(FOOTER, FOOTER_STYLE, content.x, content.width, frame.footer_top());
        canvas.into_ops()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::assets::{AssetError, LoadedImage};
    use image::{Rgb, RgbImage};
    use printpdf::TextItem;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn fixture() -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let design = dir.path().join("uploads").join("abc-cleaned.png");
        std::fs::create_dir_all(design.parent().unwrap()).unwrap();
        RgbImage::from_fn(60, 40, |x, _| if x < 30 { Rgb([200, 40, 90]) } else { Rgb([248, 248, 248]) })
            .save(&design)
            .unwrap();
        (dir, design)
    }

    fn request(template_id: &str, design: &Path, category: &str, paper: PaperSize) -> PaperDollRequest {
        PaperDollRequest {
            template_id: template_id.into(),
            design_path: design.to_path_buf(),
            placement: PlacementData::for_category(category),
            paper_size: paper,
        }
    }

    fn texts(ops: &[Op]) -> Vec<String> {
        ops.iter()
            .filter_map(|op| match op {
                Op::WriteTextBuiltinFont { items, .. } => Some(items),
                _ => None,
            })
            .flatten()
            .filter_map(|item| match item {
                TextItem::Text(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Counts loads and always fails.
    #[derive(Default)]
    struct FailingLoader(AtomicUsize);

    impl AssetLoader for FailingLoader {
        fn load(&self, path: &Path, _box_pt: (f32, f32)) -> std::result::Result<LoadedImage, AssetError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(AssetError::NotFound(path.display().to_string()))
        }
    }

    #[test]
    fn letter_pdf_has_two_letter_pages() {
        let (dir, design) = fixture();
        let compositor = PaperDollCompositor::new(Arc::new(TemplateRegistry::builtin()), dir.path());
        let bytes = compositor
            .render(&request("pose-a-average", &design, "top", PaperSize::Letter))
            .unwrap();
        let reader = PdfReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.page_count(), 2);
        let (w, h) = reader.page_size(1).unwrap();
        assert_eq!((w.round(), h.round()), (612.0, 792.0));
    }

    #[test]
    fn a4_shoes_pdf_has_two_a4_pages() {
        let (dir, design) = fixture();
        let compositor = PaperDollCompositor::new(Arc::new(TemplateRegistry::builtin()), dir.path());
        let bytes = compositor
            .render(&request("pose-a-average", &design, "shoes", PaperSize::A4))
            .unwrap();
        let reader = PdfReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.page_count(), 2);
        for page in [1, 2] {
            let (w, h) = reader.page_size(page).unwrap();
            assert_eq!((w.round(), h.round()), (595.0, 842.0));
        }
    }

    #[test]
    fn every_template_and_category_renders() {
        let (dir, design) = fixture();
        let registry = Arc::new(TemplateRegistry::builtin());
        let compositor = PaperDollCompositor::new(registry.clone(), dir.path());
        for template in registry.all() {
            for category in ["top", "bottom", "dress", "shoes"] {
                let bytes = compositor
                    .render(&request(&template.id, &design, category, PaperSize::Letter))
                    .unwrap();
                assert_eq!(PdfReader::from_bytes(&bytes).unwrap().page_count(), 2);
            }
        }
    }

    #[test]
    fn unknown_template_is_rejected() {
        let (dir, design) = fixture();
        let compositor = PaperDollCompositor::new(Arc::new(TemplateRegistry::builtin()), dir.path());
        let err = compositor
            .render(&request("does-not-exist", &design, "top", PaperSize::Letter))
            .unwrap_err();
        assert!(matches!(err, WrigsError::TemplateNotFound(id) if id == "does-not-exist"));
    }

    #[test]
    fn missing_design_is_rejected_before_rendering() {
        let (dir, _) = fixture();
        let loader = FailingLoader::default();
        let compositor =
            PaperDollCompositor::with_loader(Arc::new(TemplateRegistry::builtin()), dir.path(), loader);
        let missing = dir.path().join("uploads").join("gone.png");
        let err = compositor
            .render(&request("pose-b-curvy", &missing, "dress", PaperSize::Letter))
            .unwrap_err();
        assert!(matches!(err, WrigsError::DesignImageNotFound(_)));
        assert_eq!(compositor.loader.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failed_asset_loads_fall_back_to_placeholders() {
        let (dir, design) = fixture();
        let registry = Arc::new(TemplateRegistry::builtin());
        let compositor =
            PaperDollCompositor::with_loader(registry.clone(), dir.path(), FailingLoader::default());
        let req = request("pose-a-petite", &design, "bottom", PaperSize::Letter);
        let template = registry.get("pose-a-petite").unwrap();
        let mut doc = PdfDocument::new(PDF_TITLE);

        let base = layout::doll_base_layout(req.paper_size, template.view_box);
        let base_texts = texts(&compositor.doll_base_ops(&mut doc, template, &base));
        assert!(base_texts.contains(&DOLL_PLACEHOLDER.to_string()));

        let piece = layout::outfit_piece_layout(req.paper_size, template.regions.bottom_region);
        let piece_texts = texts(&compositor.outfit_piece_ops(&mut doc, &req, &piece));
        assert!(piece_texts.contains(&DESIGN_PLACEHOLDER.to_string()));
        assert!(piece_texts.contains(&"Bottom Outfit Piece".to_string()));
        assert_eq!(piece_texts.iter().filter(|t| *t == TAB_LABEL).count(), 2);

        // The whole document still renders.
        assert!(compositor.render(&req).is_ok());
    }

    #[test]
    fn unknown_category_uses_top_region_and_raw_title() {
        let (dir, design) = fixture();
        let registry = Arc::new(TemplateRegistry::builtin());
        let compositor = PaperDollCompositor::new(registry.clone(), dir.path());
        let req = request("pose-b-average", &design, "cape", PaperSize::Letter);
        let template = registry.get("pose-b-average").unwrap();

        let region = template.regions.resolve(&req.placement.category);
        assert_eq!(region, template.regions.top_region);

        let piece = layout::outfit_piece_layout(req.paper_size, region);
        let mut doc = PdfDocument::new(PDF_TITLE);
        let piece_texts = texts(&compositor.outfit_piece_ops(&mut doc, &req, &piece));
        assert!(piece_texts.contains(&"cape Outfit Piece".to_string()));
        assert!(compositor.render(&req).is_ok());
    }

    fn image_draws(ops: &[Op]) -> usize {
        ops.iter()
            .filter(|op| matches!(op, Op::UseXobject { .. }))
            .count()
    }

    #[test]
    fn svg_doll_artwork_is_embedded() {
        let (dir, _design) = fixture();
        let registry = Arc::new(TemplateRegistry::builtin());
        let compositor = PaperDollCompositor::new(registry.clone(), dir.path());
        let template = registry.get("pose-a-average").unwrap();
        let svg = compositor.artwork_path(template);
        std::fs::create_dir_all(svg.parent().unwrap()).unwrap();
        std::fs::write(
            &svg,
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="600" viewBox="0 0 400 600"><circle cx="200" cy="80" r="50" fill="#f0c8a0"/><rect x="160" y="130" width="80" height="420" fill="#f0c8a0"/></svg>"##,
        )
        .unwrap();

        let base = layout::doll_base_layout(PaperSize::Letter, template.view_box);
        let mut doc = PdfDocument::new(PDF_TITLE);
        let ops = compositor.doll_base_ops(&mut doc, template, &base);
        assert_eq!(image_draws(&ops), 1);
        assert!(!texts(&ops).contains(&DOLL_PLACEHOLDER.to_string()));
    }

    #[test]
    fn malformed_svg_artwork_takes_placeholder_path() {
        let (dir, _design) = fixture();
        let registry = Arc::new(TemplateRegistry::builtin());
        let compositor = PaperDollCompositor::new(registry.clone(), dir.path());
        let template = registry.get("pose-a-curvy").unwrap();
        let svg = compositor.artwork_path(template);
        std::fs::create_dir_all(svg.parent().unwrap()).unwrap();
        std::fs::write(&svg, "<svg this is not xml").unwrap();

        let base = layout::doll_base_layout(PaperSize::Letter, template.view_box);
        let mut doc = PdfDocument::new(PDF_TITLE);
        let ops = compositor.doll_base_ops(&mut doc, template, &base);
        assert_eq!(image_draws(&ops), 0);
        assert!(texts(&ops).contains(&DOLL_PLACEHOLDER.to_string()));
    }

    #[test]
    fn filename_carries_template_and_timestamp() {
        assert_eq!(
            pdf_filename("pose-a-average", 1_700_000_000_123),
            "paper-doll-pose-a-average-1700000000123.pdf"
        );
        assert_eq!(
            pdf_filename_for_attempt("pose-b-petite", 1_700_000_000_123, 2),
            "paper-doll-pose-b-petite-1700000000123-2.pdf"
        );
    }
}
