// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Drawing primitives on top of printpdf 0.8 operation lists.
//
// `PageCanvas` takes rectangles in the top-left layout space and emits `Op`s
// in PDF space (origin bottom-left).

use printpdf::{
    BuiltinFont, Color, LineDashPattern, LinePoint, Op, PaintMode, Point, Polygon, PolygonRing,
    Pt, Rgb, TextItem, WindingOrder, XObjectId, XObjectTransform,
};

use super::layout::Rect;

/// Circle-approximation constant for cubic Bézier corners.
const KAPPA: f32 = 0.552_284_8;

/// Approximate Helvetica advance per point of font size. Good enough for
/// centring short labels without font metrics.
const AVG_CHAR_WIDTH: f32 = 0.5;
const AVG_BOLD_CHAR_WIDTH: f32 = 0.55;

/// Ascent used to turn a text top into a baseline.
const ASCENT: f32 = 0.8;

pub fn rgb_hex(hex: u32) -> Color {
    let channel = |shift: u32| ((hex >> shift) & 0xFF) as f32 / 255.0;
    Color::Rgb(Rgb {
        r: channel(16),
        g: channel(8),
        b: channel(0),
        icc_profile: None,
    })
}

/// How a shape is painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeStyle {
    pub fill: Option<u32>,
    pub stroke: Option<u32>,
    pub line_width: f32,
    /// Dash length and gap, in points.
    pub dash: Option<(i64, i64)>,
}

impl ShapeStyle {
    pub const fn stroke(color: u32, line_width: f32) -> Self {
        Self {
            fill: None,
            stroke: Some(color),
            line_width,
            dash: None,
        }
    }

    pub const fn fill_stroke(fill: u32, stroke: u32, line_width: f32) -> Self {
        Self {
            fill: Some(fill),
            stroke: Some(stroke),
            line_width,
            dash: None,
        }
    }

    pub const fn dashed(mut self, dash: i64, gap: i64) -> Self {
        self.dash = Some((dash, gap));
        self
    }

    fn paint_mode(&self) -> Option<PaintMode> {
        match (self.fill.is_some(), self.stroke.is_some()) {
            (true, true) => Some(PaintMode::FillStroke),
            (true, false) => Some(PaintMode::Fill),
            (false, true) => Some(PaintMode::Stroke),
            (false, false) => None,
        }
    }
}

/// A single line of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub bold: bool,
    pub color: u32,
}

impl TextStyle {
    pub const fn regular(size: f32, color: u32) -> Self {
        Self {
            size,
            bold: false,
            color,
        }
    }

    pub const fn bold(size: f32, color: u32) -> Self {
        Self {
            size,
            bold: true,
            color,
        }
    }

    fn font(&self) -> BuiltinFont {
        if self.bold {
            BuiltinFont::HelveticaBold
        } else {
            BuiltinFont::Helvetica
        }
    }

    /// Estimated rendered width of `text`.
    pub fn estimate_width(&self, text: &str) -> f32 {
        let per_char = if self.bold {
            AVG_BOLD_CHAR_WIDTH
        } else {
            AVG_CHAR_WIDTH
        };
        text.chars().count() as f32 * per_char * self.size
    }
}

/// Collects drawing operations for one page.
pub struct PageCanvas {
    height: f32,
    ops: Vec<Op>,
}

impl PageCanvas {
    pub fn new(page_height: f32) -> Self {
        Self {
            height: page_height,
            ops: Vec::new(),
        }
    }

    pub fn into_ops(self) -> Vec<Op> {
        self.ops
    }

    fn point(&self, x: f32, y_top_down: f32) -> Point {
        Point {
            x: Pt(x),
            y: Pt(self.height - y_top_down),
        }
    }

    // -- Text -----------------------------------------------------------------

    /// Write `text` horizontally centred in `[left, left + width]`, with the
    /// top of the line at `top`.
    pub fn text_centered(&mut self, text: &str, style: TextStyle, left: f32, width: f32, top: f32) {
        let x = left + ((width - style.estimate_width(text)) / 2.0).max(0.0);
        let baseline = top + style.size * ASCENT;
        let pos = self.point(x, baseline);
        let font = style.font();
        self.ops.extend([
            Op::SaveGraphicsState,
            Op::SetFillColor {
                col: rgb_hex(style.color),
            },
            Op::StartTextSection,
            Op::SetTextCursor { pos },
            Op::SetFontSizeBuiltinFont {
                size: Pt(style.size),
                font,
            },
            Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(text.to_string())],
                font,
            },
            Op::EndTextSection,
            Op::RestoreGraphicsState,
        ]);
    }

    // -- Shapes ---------------------------------------------------------------

    pub fn rect(&mut self, rect: Rect, style: ShapeStyle) {
        let corners = [
            (rect.x, rect.bottom()),
            (rect.right(), rect.bottom()),
            (rect.right(), rect.y),
            (rect.x, rect.y),
        ];
        let points = corners
            .iter()
            .map(|&(x, y)| LinePoint {
                p: self.point(x, y),
                bezier: false,
            })
            .collect();
        self.polygon(points, style);
    }

    /// Rectangle with circular corners of `radius` (clamped to half the
    /// shorter side).
    pub fn rounded_rect(&mut self, rect: Rect, radius: f32, style: ShapeStyle) {
        let r = radius.min(rect.width / 2.0).min(rect.height / 2.0).max(0.0);
        if r == 0.0 {
            self.rect(rect, style);
            return;
        }
        let k = r * KAPPA;
        let (x0, y0, x1, y1) = (rect.x, rect.y, rect.right(), rect.bottom());

        // Walk clockwise in top-down space starting on the top edge. Each
        // corner is two control points followed by the end point.
        let path: [(f32, f32, bool); 16] = [
            (x0 + r, y0, false),
            (x1 - r, y0, false),
            (x1 - r + k, y0, true),
            (x1, y0 + r - k, true),
            (x1, y0 + r, false),
            (x1, y1 - r, false),
            (x1, y1 - r + k, true),
            (x1 - r + k, y1, true),
            (x1 - r, y1, false),
            (x0 + r, y1, false),
            (x0 + r - k, y1, true),
            (x0, y1 - r + k, true),
            (x0, y1 - r, false),
            (x0, y0 + r, false),
            (x0, y0 + r - k, true),
            (x0 + r - k, y0, true),
        ];
        let mut points: Vec<LinePoint> = path
            .iter()
            .map(|&(x, y, bezier)| LinePoint {
                p: self.point(x, y),
                bezier,
            })
            .collect();
        // Close the last corner back onto the start point.
        points.push(LinePoint {
            p: self.point(x0 + r, y0),
            bezier: false,
        });
        self.polygon(points, style);
    }

    fn polygon(&mut self, points: Vec<LinePoint>, style: ShapeStyle) {
        let Some(mode) = style.paint_mode() else {
            return;
        };
        self.ops.push(Op::SaveGraphicsState);
        if let Some(fill) = style.fill {
            self.ops.push(Op::SetFillColor {
                col: rgb_hex(fill),
            });
        }
        if let Some(stroke) = style.stroke {
            self.ops.push(Op::SetOutlineColor {
                col: rgb_hex(stroke),
            });
            self.ops.push(Op::SetOutlineThickness {
                pt: Pt(style.line_width),
            });
        }
        if let Some((dash, gap)) = style.dash {
            self.ops.push(Op::SetLineDashPattern {
                dash: LineDashPattern {
                    offset: 0,
                    dash_1: Some(dash),
                    gap_1: Some(gap),
                    ..Default::default()
                },
            });
        }
        self.ops.push(Op::DrawPolygon {
            polygon: Polygon {
                rings: vec![PolygonRing { points }],
                mode,
                winding_order: WindingOrder::NonZero,
            },
        });
        self.ops.push(Op::RestoreGraphicsState);
    }

    // -- Images ---------------------------------------------------------------

    /// Stretch an embedded image of `px_w` x `px_h` pixels over `target`.
    pub fn image(&mut self, id: XObjectId, px_w: u32, px_h: u32, target: Rect) {
        // At 72 dpi one pixel is one point, so the scale is target / pixels.
        let bottom_left = self.point(target.x, target.bottom());
        self.ops.push(Op::UseXobject {
            id,
            transform: XObjectTransform {
                translate_x: Some(bottom_left.x),
                translate_y: Some(bottom_left.y),
                scale_x: Some(target.width / px_w.max(1) as f32),
                scale_y: Some(target.height / px_h.max(1) as f32),
                dpi: Some(72.0),
                rotate: None,
            },
        });
    }
}
