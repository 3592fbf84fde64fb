// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Individual clean-up steps for uploaded sketches.
//
// Every step is a pure function from an owned image to a new image, so each
// one can be tested on its own. `cleaned_steps` lists them in the order the
// cleaned derivative applies them.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::filter::gaussian_blur_f32;
use tracing::{debug, instrument};
use wrigs_core::config::DEFAULT_MAX_DIMENSION;

use super::quantize;

/// Neutral light grey used behind and around cleaned sketches (#f8f8f8).
pub const NEUTRAL_BACKGROUND: Rgb<u8> = Rgb([248, 248, 248]);

/// Pixels at or above this alpha are treated as part of the drawing.
pub const OPAQUE_THRESHOLD: u8 = 128;

/// Padding added around the cleaned sketch, in pixels.
pub const PADDING_PX: u32 = 60;

/// Palette size of the cleaned sketch (background colour included).
pub const PALETTE_SIZE: usize = 32;

/// One step of the cleaned-sketch pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CleanStep {
    /// Downscale so neither side exceeds `max_dimension`. Never upscales.
    Resize { max_dimension: u32 },
    /// Multiply brightness, then push channels away from luma.
    TonalBoost { brightness: f32, saturation: f32 },
    /// `v * slope + intercept` on every colour channel.
    Linear { slope: f32, intercept: f32 },
    /// Stretch the 1st..99th luma percentile to the full range.
    AutoLevels,
    /// Unsharp mask with a Gaussian of the given sigma.
    Sharpen { sigma: f32 },
    /// Settle on 8-bit sRGB with alpha.
    NormalizeSrgb,
    /// Fixed palette, no dithering. `background` is always in the palette.
    Quantize { colors: usize, background: Rgb<u8> },
    /// Composite onto an opaque background.
    Flatten { background: Rgb<u8> },
    /// Extend every side by `margin` pixels of `background`.
    Pad { margin: u32, background: Rgb<u8> },
}

/// The cleaned-derivative pipeline at the default size cap.
pub const CLEANED_STEPS: [CleanStep; 9] = cleaned_steps(DEFAULT_MAX_DIMENSION);

/// The cleaned-derivative pipeline for a given size cap.
pub const fn cleaned_steps(max_dimension: u32) -> [CleanStep; 9] {
    [
        CleanStep::Resize { max_dimension },
        CleanStep::TonalBoost {
            brightness: 1.4,
            saturation: 1.5,
        },
        CleanStep::Linear {
            slope: 1.3,
            intercept: 20.0,
        },
        CleanStep::AutoLevels,
        CleanStep::Sharpen { sigma: 1.5 },
        CleanStep::NormalizeSrgb,
        CleanStep::Quantize {
            colors: PALETTE_SIZE,
            background: NEUTRAL_BACKGROUND,
        },
        CleanStep::Flatten {
            background: NEUTRAL_BACKGROUND,
        },
        CleanStep::Pad {
            margin: PADDING_PX,
            background: NEUTRAL_BACKGROUND,
        },
    ]
}

impl CleanStep {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Resize { .. } => "resize",
            Self::TonalBoost { .. } => "tonal_boost",
            Self::Linear { .. } => "linear",
            Self::AutoLevels => "auto_levels",
            Self::Sharpen { .. } => "sharpen",
            Self::NormalizeSrgb => "normalize_srgb",
            Self::Quantize { .. } => "quantize",
            Self::Flatten { .. } => "flatten",
            Self::Pad { .. } => "pad",
        }
    }

    /// Run this step.
    #[instrument(skip(self, image), fields(step = self.name(), width = image.width(), height = image.height()))]
    pub fn apply(&self, image: DynamicImage) -> DynamicImage {
        let out = match *self {
            Self::Resize { max_dimension } => resize_within(image, max_dimension),
            Self::TonalBoost {
                brightness,
                saturation,
            } => tonal_boost(image, brightness, saturation),
            Self::Linear { slope, intercept } => linear(image, slope, intercept),
            Self::AutoLevels => auto_levels(image),
            Self::Sharpen { sigma } => sharpen(image, sigma),
            Self::NormalizeSrgb => normalize_srgb(image),
            Self::Quantize { colors, background } => {
                quantize::quantize(image, colors, background)
            }
            Self::Flatten { background } => flatten(image, background),
            Self::Pad { margin, background } => pad(image, margin, background),
        };
        debug!(out_w = out.width(), out_h = out.height(), "step complete");
        out
    }
}

// -- Geometry -----------------------------------------------------------------

/// Target size for fitting `width` x `height` inside a `max` square without
/// enlarging. The longer side becomes exactly `max` when shrinking. A `max`
/// of zero is treated as one pixel.
pub fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    let max = max.max(1);
    if width <= max && height <= max {
        return (width, height);
    }
    let scale = max as f64 / width.max(height) as f64;
    let w = ((width as f64 * scale).round() as u32).clamp(1, max);
    let h = ((height as f64 * scale).round() as u32).clamp(1, max);
    (w, h)
}

/// Downscale with Lanczos3 so neither side exceeds `max_dimension`.
pub fn resize_within(image: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (w, h) = (image.width(), image.height());
    let (target_w, target_h) = fit_within(w, h, max_dimension);
    if (target_w, target_h) == (w, h) {
        return image;
    }
    image.resize_exact(target_w, target_h, FilterType::Lanczos3)
}

// -- Tonal adjustments --------------------------------------------------------

fn clamp_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Rec. 709 luma.
fn luma(r: f32, g: f32, b: f32) -> f32 {
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

pub fn tonal_boost(image: DynamicImage, brightness: f32, saturation: f32) -> DynamicImage {
    let mut rgba = image.into_rgba8();
    for pixel in rgba.pixels_mut() {
        let Rgba([r, g, b, a]) = *pixel;
        let (r, g, b) = (
            r as f32 * brightness,
            g as f32 * brightness,
            b as f32 * brightness,
        );
        let y = luma(r, g, b);
        let saturate = |c: f32| clamp_channel(y + (c - y) * saturation);
        *pixel = Rgba([saturate(r), saturate(g), saturate(b), a]);
    }
    DynamicImage::ImageRgba8(rgba)
}

pub fn linear(image: DynamicImage, slope: f32, intercept: f32) -> DynamicImage {
    let lut: [u8; 256] = std::array::from_fn(|v| clamp_channel(v as f32 * slope + intercept));
    let mut rgba = image.into_rgba8();
    for pixel in rgba.pixels_mut() {
        let Rgba([r, g, b, a]) = *pixel;
        *pixel = Rgba([lut[r as usize], lut[g as usize], lut[b as usize], a]);
    }
    DynamicImage::ImageRgba8(rgba)
}

/// Smallest histogram bin at which the cumulative count reaches `fraction`
/// of `total`.
fn percentile(histogram: &[u64; 256], total: u64, fraction: f64) -> u8 {
    let target = ((total as f64 * fraction).ceil() as u64).max(1);
    let mut cumulative = 0u64;
    for (value, &count) in histogram.iter().enumerate() {
        cumulative += count;
        if cumulative >= target {
            return value as u8;
        }
    }
    255
}

pub fn auto_levels(image: DynamicImage) -> DynamicImage {
    let mut rgba = image.into_rgba8();
    let total = rgba.width() as u64 * rgba.height() as u64;
    if total == 0 {
        return DynamicImage::ImageRgba8(rgba);
    }

    let mut histogram = [0u64; 256];
    for pixel in rgba.pixels() {
        let Rgba([r, g, b, _]) = *pixel;
        histogram[clamp_channel(luma(r as f32, g as f32, b as f32)) as usize] += 1;
    }

    let low = percentile(&histogram, total, 0.01);
    let high = percentile(&histogram, total, 0.99);
    debug!(low, high, "auto-levels percentiles");
    if high <= low {
        return DynamicImage::ImageRgba8(rgba);
    }

    let scale = 255.0 / (high - low) as f32;
    let lut: [u8; 256] =
        std::array::from_fn(|v| clamp_channel((v as f32 - low as f32) * scale));
    for pixel in rgba.pixels_mut() {
        let Rgba([r, g, b, a]) = *pixel;
        *pixel = Rgba([lut[r as usize], lut[g as usize], lut[b as usize], a]);
    }
    DynamicImage::ImageRgba8(rgba)
}

// -- Sharpening ---------------------------------------------------------------

pub fn sharpen(image: DynamicImage, sigma: f32) -> DynamicImage {
    let rgba = image.into_rgba8();
    if sigma <= 0.0 || rgba.width() == 0 || rgba.height() == 0 {
        return DynamicImage::ImageRgba8(rgba);
    }
    let blurred = gaussian_blur_f32(&rgba, sigma);
    let sharpened = RgbaImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let Rgba([br, bg, bb, _]) = *blurred.get_pixel(x, y);
        let unsharp = |orig: u8, blur: u8| clamp_channel(2.0 * orig as f32 - blur as f32);
        Rgba([unsharp(r, br), unsharp(g, bg), unsharp(b, bb), a])
    });
    DynamicImage::ImageRgba8(sharpened)
}

// -- Colour space / compositing -----------------------------------------------

pub fn normalize_srgb(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageRgba8(_) => image,
        other => DynamicImage::ImageRgba8(other.to_rgba8()),
    }
}

/// Binary-alpha flatten: drawing pixels keep their colour, everything else
/// becomes `background`. Keeps the palette closed.
pub fn flatten(image: DynamicImage, background: Rgb<u8>) -> DynamicImage {
    let rgba = image.into_rgba8();
    let flat = RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        if a >= OPAQUE_THRESHOLD {
            Rgb([r, g, b])
        } else {
            background
        }
    });
    DynamicImage::ImageRgb8(flat)
}

pub fn pad(image: DynamicImage, margin: u32, background: Rgb<u8>) -> DynamicImage {
    let rgb = image.into_rgb8();
    let mut canvas = RgbImage::from_pixel(
        rgb.width() + 2 * margin,
        rgb.height() + 2 * margin,
        background,
    );
    imageops::replace(&mut canvas, &rgb, margin as i64, margin as i64);
    DynamicImage::ImageRgb8(canvas)
}
