// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Deterministic median-cut palette reduction.
//
// The background colour always occupies palette slot 0 so that flattening and
// padding afterwards never introduce a colour outside the palette. The other
// slots come from median cut over the opaque pixels. Ties are broken by index
// and pixel order is irrelevant (the histogram is a BTreeMap), so the same
// input always yields the same palette.

use std::collections::{BTreeMap, HashMap};

use image::{DynamicImage, Rgb, Rgba, RgbaImage};
use tracing::debug;

use super::steps::OPAQUE_THRESHOLD;

type Color = [u8; 3];

/// A box of distinct colours with their pixel counts.
struct ColorBox {
    colors: Vec<(Color, u64)>,
}

impl ColorBox {
    fn channel_range(&self, channel: usize) -> u8 {
        let (mut lo, mut hi) = (u8::MAX, u8::MIN);
        for (color, _) in &self.colors {
            lo = lo.min(color[channel]);
            hi = hi.max(color[channel]);
        }
        hi.saturating_sub(lo)
    }

    /// Widest channel and its range. Earlier channels win ties.
    fn widest_channel(&self) -> (usize, u8) {
        let mut best = (0, self.channel_range(0));
        for channel in 1..3 {
            let range = self.channel_range(channel);
            if range > best.1 {
                best = (channel, range);
            }
        }
        best
    }

    fn mean(&self) -> Color {
        let mut sums = [0u64; 3];
        let mut total = 0u64;
        for (color, count) in &self.colors {
            for channel in 0..3 {
                sums[channel] += color[channel] as u64 * count;
            }
            total += count;
        }
        let total = total.max(1);
        // Rounded integer division.
        sums.map(|sum| ((sum + total / 2) / total) as u8)
    }

    /// Split at the weighted median of the widest channel.
    fn split(mut self) -> (ColorBox, ColorBox) {
        let (channel, _) = self.widest_channel();
        self.colors
            .sort_by_key(|(color, _)| (color[channel], *color));

        let total: u64 = self.colors.iter().map(|(_, count)| count).sum();
        let mut running = 0u64;
        let mut cut = 1;
        for (idx, (_, count)) in self.colors.iter().enumerate() {
            running += count;
            if running * 2 >= total {
                cut = idx + 1;
                break;
            }
        }
        // Both halves must be non-empty.
        let cut = cut.clamp(1, self.colors.len() - 1);
        let upper = self.colors.split_off(cut);
        (self, ColorBox { colors: upper })
    }
}

/// Build a palette of at most `max_colors` entries from `histogram`.
fn median_cut(histogram: &BTreeMap<Color, u64>, max_colors: usize) -> Vec<Color> {
    if histogram.is_empty() || max_colors == 0 {
        return Vec::new();
    }
    let mut boxes = vec![ColorBox {
        colors: histogram.iter().map(|(c, n)| (*c, *n)).collect(),
    }];

    while boxes.len() < max_colors {
        // Pick the splittable box with the largest channel range.
        let mut candidate: Option<(usize, u8)> = None;
        for (idx, b) in boxes.iter().enumerate() {
            if b.colors.len() < 2 {
                continue;
            }
            let (_, range) = b.widest_channel();
            if candidate.is_none_or(|(_, best)| range > best) {
                candidate = Some((idx, range));
            }
        }
        let Some((idx, _)) = candidate else { break };
        let target = boxes.remove(idx);
        let (lower, upper) = target.split();
        boxes.insert(idx, upper);
        boxes.insert(idx, lower);
    }

    boxes.iter().map(ColorBox::mean).collect()
}

fn distance(a: Color, b: Color) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x as i32 - y as i32;
            (d * d) as u32
        })
        .sum()
}

/// Index of the nearest palette entry. Lowest index wins ties.
fn nearest(palette: &[Color], color: Color) -> usize {
    let mut best = (0, u32::MAX);
    for (idx, entry) in palette.iter().enumerate() {
        let d = distance(*entry, color);
        if d < best.1 {
            best = (idx, d);
        }
    }
    best.0
}

/// Reduce `image` to at most `max_colors` colours, one of which is
/// `background`. Transparent pixels take the background colour and keep
/// their alpha. No dithering.
pub fn quantize(image: DynamicImage, max_colors: usize, background: Rgb<u8>) -> DynamicImage {
    let mut rgba = image.into_rgba8();
    let palette = build_palette(&rgba, max_colors, background);
    debug!(palette_len = palette.len(), "palette built");

    let mut cache: HashMap<Color, Color> = HashMap::new();
    for pixel in rgba.pixels_mut() {
        let Rgba([r, g, b, a]) = *pixel;
        let mapped = if a < OPAQUE_THRESHOLD {
            background.0
        } else {
            *cache
                .entry([r, g, b])
                .or_insert_with(|| palette[nearest(&palette, [r, g, b])])
        };
        *pixel = Rgba([mapped[0], mapped[1], mapped[2], a]);
    }
    DynamicImage::ImageRgba8(rgba)
}

fn build_palette(rgba: &RgbaImage, max_colors: usize, background: Rgb<u8>) -> Vec<Color> {
    let mut histogram: BTreeMap<Color, u64> = BTreeMap::new();
    for Rgba([r, g, b, a]) in rgba.pixels().copied() {
        if a >= OPAQUE_THRESHOLD && [r, g, b] != background.0 {
            *histogram.entry([r, g, b]).or_default() += 1;
        }
    }

    let mut palette = Vec::with_capacity(max_colors.max(1));
    palette.push(background.0);
    for color in median_cut(&histogram, max_colors.saturating_sub(1)) {
        if !palette.contains(&color) {
            palette.push(color);
        }
    }
    palette
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const BG: Rgb<u8> = Rgb([248, 248, 248]);

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 255 / width) as u8, (y * 255 / height) as u8, ((x + y) % 256) as u8, 255])
        })
    }

    fn distinct_colors(image: &RgbaImage) -> HashSet<[u8; 3]> {
        image.pixels().map(|p| [p.0[0], p.0[1], p.0[2]]).collect()
    }

    #[test]
    fn output_never_exceeds_palette_size() {
        let out = quantize(DynamicImage::ImageRgba8(gradient(128, 96)), 32, BG).into_rgba8();
        assert!(distinct_colors(&out).len() <= 32);
    }

    #[test]
    fn few_colours_survive_unchanged() {
        let img = RgbaImage::from_fn(10, 10, |x, _| {
            if x < 5 { Rgba([200, 30, 30, 255]) } else { Rgba([20, 20, 180, 255]) }
        });
        let out = quantize(DynamicImage::ImageRgba8(img), 32, BG).into_rgba8();
        assert_eq!(out.get_pixel(0, 0).0, [200, 30, 30, 255]);
        assert_eq!(out.get_pixel(9, 9).0, [20, 20, 180, 255]);
    }

    #[test]
    fn background_is_always_in_palette() {
        let palette = build_palette(&gradient(64, 64), 32, BG);
        assert_eq!(palette[0], BG.0);
        assert!(palette.len() <= 32);
    }

    #[test]
    fn transparent_pixels_take_background() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 0]));
        let out = quantize(DynamicImage::ImageRgba8(img), 32, BG).into_rgba8();
        assert_eq!(out.get_pixel(2, 2).0, [248, 248, 248, 0]);
    }

    #[test]
    fn quantize_is_deterministic() {
        let a = quantize(DynamicImage::ImageRgba8(gradient(80, 80)), 32, BG).into_rgba8();
        let b = quantize(DynamicImage::ImageRgba8(gradient(80, 80)), 32, BG).into_rgba8();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn nearest_prefers_lowest_index_on_tie() {
        let palette = [[0, 0, 0], [10, 0, 0], [0, 0, 0]];
        assert_eq!(nearest(&palette, [5, 0, 0]), 0);
        assert_eq!(nearest(&palette, [9, 0, 0]), 1);
    }
}
