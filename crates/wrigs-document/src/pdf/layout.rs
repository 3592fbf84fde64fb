// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page geometry for the two printable pages.
//
// All values are PostScript points in a top-left origin (y grows downward),
// which is how the page is designed. `draw` flips to PDF's bottom-left origin
// when emitting operations. Nothing here touches the filesystem or the clock,
// so the same inputs always produce the same layout.

use wrigs_core::{OutfitRegion, PaperSize, ViewBox};

/// Margin on every side of the page.
pub const MARGIN: f32 = 36.0;
/// Share of the content area the doll artwork may occupy.
pub const DOLL_FILL: f32 = 0.8;
/// Extra downward offset of the doll artwork to clear the title block.
pub const DOLL_TITLE_OFFSET: f32 = 50.0;
/// Vertical space reserved for the title block on the outfit page.
pub const OUTFIT_TITLE_BLOCK: f32 = 100.0;
/// Share of the available area the outfit container may occupy.
pub const OUTFIT_FILL: f32 = 0.7;
/// Distance from the top margin to the outfit container.
pub const OUTFIT_TOP_OFFSET: f32 = 80.0;
/// Share of the outfit container given to the design image.
pub const DESIGN_FILL: f32 = 0.8;
/// Outset of the dashed cut line around the doll artwork.
pub const CUT_OUTSET: f32 = 5.0;
/// Corner radius of the outfit container and its cut line.
pub const CONTAINER_RADIUS: f32 = 10.0;
pub const TAB_WIDTH: f32 = 40.0;
pub const TAB_HEIGHT: f32 = 15.0;
pub const TAB_RADIUS: f32 = 3.0;
/// Instruction line sits this far below the top margin.
pub const INSTRUCTION_OFFSET: f32 = 30.0;
/// Footer sits this far above the bottom margin.
pub const FOOTER_OFFSET: f32 = 20.0;

/// Axis-aligned rectangle, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Grow by `amount` on every side.
    pub fn outset(&self, amount: f32) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.width + 2.0 * amount,
            self.height + 2.0 * amount,
        )
    }

    /// A `fill`-sized copy centred inside `self`.
    pub fn shrink_centered(&self, fill: f32) -> Self {
        let (w, h) = (self.width * fill, self.height * fill);
        Self::new(
            self.x + (self.width - w) / 2.0,
            self.y + (self.height - h) / 2.0,
            w,
            h,
        )
    }

    pub fn contains(&self, other: &Rect) -> bool {
        const EPS: f32 = 1e-3;
        other.x >= self.x - EPS
            && other.y >= self.y - EPS
            && other.right() <= self.right() + EPS
            && other.bottom() <= self.bottom() + EPS
    }
}

/// Page size plus the margin-inset content area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    pub width: f32,
    pub height: f32,
    pub content: Rect,
}

impl PageFrame {
    pub fn for_paper(paper: PaperSize) -> Self {
        let (width, height) = paper.dimensions_pt();
        Self {
            width,
            height,
            content: Rect::new(MARGIN, MARGIN, width - 2.0 * MARGIN, height - 2.0 * MARGIN),
        }
    }

    /// Top of the title line.
    pub fn title_top(&self) -> f32 {
        MARGIN
    }

    /// Top of the instruction line.
    pub fn instruction_top(&self) -> f32 {
        MARGIN + INSTRUCTION_OFFSET
    }

    /// Top of the footer line.
    pub fn footer_top(&self) -> f32 {
        self.height - MARGIN - FOOTER_OFFSET
    }
}

/// Size of an `aspect` (w/h) shape filling `fill` of a `box_w` x `box_h`
/// box along its limiting axis.
pub fn fit_aspect(aspect: f32, box_w: f32, box_h: f32, fill: f32) -> (f32, f32) {
    if aspect > box_w / box_h {
        let width = box_w * fill;
        (width, width / aspect)
    } else {
        let height = box_h * fill;
        (height * aspect, height)
    }
}

/// Largest rectangle of the image's aspect ratio that fits in `target`,
/// centred.
pub fn fit_image(image_w: u32, image_h: u32, target: Rect) -> Rect {
    if image_w == 0 || image_h == 0 {
        return target;
    }
    let (w, h) = fit_aspect(
        image_w as f32 / image_h as f32,
        target.width,
        target.height,
        1.0,
    );
    Rect::new(
        target.x + (target.width - w) / 2.0,
        target.y + (target.height - h) / 2.0,
        w,
        h,
    )
}

// -- Page 1 -------------------------------------------------------------------

/// Geometry of the doll-base page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DollBaseLayout {
    pub frame: PageFrame,
    /// Where the doll artwork (or its placeholder) goes.
    pub artwork: Rect,
    /// Dashed cut guide around the artwork.
    pub cut_line: Rect,
}

pub fn doll_base_layout(paper: PaperSize, view_box: ViewBox) -> DollBaseLayout {
    let frame = PageFrame::for_paper(paper);
    let content = frame.content;
    let (width, height) = fit_aspect(
        view_box.aspect_ratio(),
        content.width,
        content.height,
        DOLL_FILL,
    );
    let x = content.x + (content.width - width) / 2.0;
    let y = content.y + (content.height - height) / 2.0 + DOLL_TITLE_OFFSET;
    let artwork = Rect::new(x, y, width, height);
    DollBaseLayout {
        frame,
        artwork,
        cut_line: artwork.outset(CUT_OUTSET),
    }
}

// -- Page 2 -------------------------------------------------------------------

/// Geometry of the outfit-piece page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutfitPieceLayout {
    pub frame: PageFrame,
    /// White rounded container the design sits in.
    pub container: Rect,
    /// Box the design image is fitted into.
    pub design_box: Rect,
    /// Fold tabs along the top edge of the container.
    pub tabs: [Rect; 2],
    /// Dashed rounded cut guide (includes the tabs).
    pub cut_line: Rect,
}

pub fn outfit_piece_layout(paper: PaperSize, region: OutfitRegion) -> OutfitPieceLayout {
    let frame = PageFrame::for_paper(paper);
    let content = frame.content;
    let available_h = content.height - OUTFIT_TITLE_BLOCK;
    let (width, height) = fit_aspect(region.aspect_ratio(), content.width, available_h, OUTFIT_FILL);
    let x = content.x + (content.width - width) / 2.0;
    let y = content.y + OUTFIT_TOP_OFFSET;
    let container = Rect::new(x, y, width, height);

    let tab = |fraction: f32| {
        let cx = x + width * fraction;
        Rect::new(cx - TAB_WIDTH / 2.0, y - TAB_HEIGHT, TAB_WIDTH, TAB_HEIGHT)
    };

    OutfitPieceLayout {
        frame,
        container,
        design_box: container.shrink_centered(DESIGN_FILL),
        tabs: [tab(0.25), tab(0.75)],
        cut_line: Rect::new(
            x - CUT_OUTSET,
            y - TAB_HEIGHT - CUT_OUTSET,
            width + 2.0 * CUT_OUTSET,
            height + TAB_HEIGHT + 2.0 * CUT_OUTSET,
        ),
    }
}
