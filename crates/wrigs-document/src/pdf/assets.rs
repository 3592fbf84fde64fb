// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Loading assets for embedding in a PDF.
//
// Raster files are decoded as-is; SVG artwork is rasterised at print
// resolution for the box it will be drawn into. A failed load is not fatal:
// the compositor draws a placeholder instead.

use std::path::Path;

use image::{DynamicImage, Rgb, RgbImage, RgbaImage};
use printpdf::{RawImage, RawImageData, RawImageFormat};
use resvg::{tiny_skia, usvg};
use thiserror::Error;
use tracing::debug;

/// Raster pixels per PDF point for vector artwork (144 dpi).
pub const SVG_PIXELS_PER_POINT: f32 = 2.0;

/// Upper bound on either side of a rasterised SVG.
const MAX_SVG_PIXELS: u32 = 4096;

/// Why an asset could not be embedded.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(String),

    #[error("asset format not embeddable: {0}")]
    Unsupported(String),

    #[error("asset could not be decoded: {0}")]
    Decode(String),
}

/// An image ready for `PdfDocument::add_image`: 8-bit RGB, no alpha.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    rgb: RgbImage,
}

impl LoadedImage {
    /// Composite onto white (paper colour) and drop alpha.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        let rgb = if image.color().has_alpha() {
            let rgba = image.into_rgba8();
            RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
                let [r, g, b, a] = rgba.get_pixel(x, y).0;
                let alpha = a as u32;
                let over_white = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
                Rgb([over_white(r), over_white(g), over_white(b)])
            })
        } else {
            image.into_rgb8()
        };
        Self {
            width: rgb.width(),
            height: rgb.height(),
            rgb,
        }
    }

    pub fn to_raw_image(&self) -> RawImage {
        RawImage {
            pixels: RawImageData::U8(self.rgb.as_raw().clone()),
            width: self.width as usize,
            height: self.height as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        }
    }
}

/// Capability to turn a path into an embeddable image.
///
/// `box_pt` is the (width, height) in points of the area the image will be
/// fitted into. Raster loaders may ignore it.
pub trait AssetLoader {
    fn load(&self, path: &Path, box_pt: (f32, f32)) -> Result<LoadedImage, AssetError>;
}

/// Loads PNG/JPEG (anything the `image` crate decodes) and SVG from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterAssetLoader;

impl AssetLoader for RasterAssetLoader {
    fn load(&self, path: &Path, box_pt: (f32, f32)) -> Result<LoadedImage, AssetError> {
        let shown = path.display().to_string();
        if !path.is_file() {
            return Err(AssetError::NotFound(shown));
        }
        let is_svg = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
        let image = if is_svg {
            let data = std::fs::read(path).map_err(|err| AssetError::Decode(format!("{shown}: {err}")))?;
            rasterize_svg(&data, box_pt).map_err(|reason| AssetError::Unsupported(format!("{shown}: {reason}")))?
        } else {
            image::open(path).map_err(|err| AssetError::Decode(format!("{shown}: {err}")))?
        };
        debug!(path = %shown, width = image.width(), height = image.height(), "asset loaded");
        Ok(LoadedImage::from_dynamic(image))
    }
}

/// Pixel size for drawing an `svg_w` x `svg_h` document into `box_pt` at
/// print resolution, keeping the document's aspect ratio.
fn svg_raster_size(svg_w: f32, svg_h: f32, box_pt: (f32, f32)) -> Option<(u32, u32)> {
    if !(svg_w.is_finite() && svg_h.is_finite() && svg_w > 0.0 && svg_h > 0.0) {
        return None;
    }
    let (box_w, box_h) = box_pt;
    // Without a usable box, fall back to the document's own size.
    let scale = if box_w > 0.0 && box_h > 0.0 {
        (box_w / svg_w).min(box_h / svg_h) * SVG_PIXELS_PER_POINT
    } else {
        1.0
    };
    let px = |v: f32| ((v * scale).ceil() as u32).clamp(1, MAX_SVG_PIXELS);
    Some((px(svg_w), px(svg_h)))
}

/// Parse and rasterise an SVG onto a white background.
fn rasterize_svg(data: &[u8], box_pt: (f32, f32)) -> Result<DynamicImage, String> {
    let tree = usvg::Tree::from_data(data, &usvg::Options::default()).map_err(|e| e.to_string())?;
    let size = tree.size();
    let (width, height) = svg_raster_size(size.width(), size.height(), box_pt)
        .ok_or_else(|| "svg has no usable width/height".to_string())?;

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| "failed to allocate svg pixmap".to_string())?;
    // Opaque white backdrop, so premultiplied and straight alpha agree.
    pixmap.fill(tiny_skia::Color::WHITE);
    let transform = tiny_skia::Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    let rgba = RgbaImage::from_raw(width, height, pixmap.take())
        .ok_or_else(|| "svg pixel buffer size mismatch".to_string())?;
    Ok(DynamicImage::ImageRgba8(rgba))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    const DOLL_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="600" viewBox="0 0 400 600">
  <rect x="150" y="100" width="100" height="400" fill="#d08050"/>
</svg>"##;

    #[test]
    fn svg_is_rasterised_at_print_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pose-a-average.svg");
        std::fs::write(&path, DOLL_SVG).unwrap();

        // 200x300 pt box at 2 px/pt.
        let loaded = RasterAssetLoader.load(&path, (200.0, 300.0)).unwrap();
        assert_eq!((loaded.width, loaded.height), (400, 600));
        match loaded.to_raw_image().pixels {
            RawImageData::U8(bytes) => {
                // Top-left is background white, the body rect is drawn.
                assert_eq!(&bytes[..3], &[255, 255, 255]);
                let idx = ((300 * 400) + 200) * 3;
                assert_eq!(&bytes[idx..idx + 3], &[0xd0, 0x80, 0x50]);
            }
            _ => panic!("expected 8-bit pixels"),
        }
    }

    #[test]
    fn svg_raster_keeps_document_aspect() {
        assert_eq!(svg_raster_size(400.0, 600.0, (400.0, 300.0)), Some((400, 600)));
        assert_eq!(svg_raster_size(400.0, 600.0, (0.0, 0.0)), Some((400, 600)));
        assert_eq!(svg_raster_size(0.0, 600.0, (100.0, 100.0)), None);
        assert_eq!(svg_raster_size(10.0, 10.0, (1.0e6, 1.0e6)), Some((4096, 4096)));
    }

    #[test]
    fn malformed_svg_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.svg");
        std::fs::write(&path, "<svg this is not xml").unwrap();
        let err = RasterAssetLoader.load(&path, (100.0, 100.0)).unwrap_err();
        assert!(matches!(err, AssetError::Unsupported(_)));
    }

    #[test]
    fn missing_svg_is_not_found() {
        let err = RasterAssetLoader
            .load(Path::new("static/templates/dolls/pose-a-average.svg"), (100.0, 100.0))
            .unwrap_err();
        assert!(matches!(err, AssetError::NotFound(_)));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = RasterAssetLoader.load(&dir.path().join("gone.png"), (10.0, 10.0)).unwrap_err();
        assert!(matches!(err, AssetError::NotFound(_)));
    }

    #[test]
    fn corrupt_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.png");
        std::fs::write(&path, b"nope").unwrap();
        assert!(matches!(RasterAssetLoader.load(&path, (10.0, 10.0)), Err(AssetError::Decode(_))));
    }

    #[test]
    fn transparency_is_composited_onto_white() {
        let img = RgbaImage::from_fn(2, 1, |x, _| {
            if x == 0 { Rgba([0, 0, 0, 0]) } else { Rgba([0, 0, 0, 255]) }
        });
        let loaded = LoadedImage::from_dynamic(DynamicImage::ImageRgba8(img));
        let raw = loaded.to_raw_image();
        match raw.pixels {
            RawImageData::U8(bytes) => assert_eq!(bytes, vec![255, 255, 255, 0, 0, 0]),
            _ => panic!("expected 8-bit pixels"),
        }
    }

    #[test]
    fn png_on_disk_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doll.png");
        RgbImage::from_pixel(6, 9, Rgb([1, 2, 3])).save(&path).unwrap();
        let loaded = RasterAssetLoader.load(&path, (300.0, 300.0)).unwrap();
        assert_eq!((loaded.width, loaded.height), (6, 9));
    }
}
