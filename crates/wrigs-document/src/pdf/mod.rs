// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — paper-doll layout, rendering, and output verification.

pub mod assets;
pub mod compositor;
pub mod draw;
pub mod layout;
pub mod reader;

pub use assets::{AssetError, AssetLoader, LoadedImage, RasterAssetLoader};
pub use compositor::{
    PaperDollCompositor, PaperDollRequest, pdf_filename, pdf_filename_for_attempt,
};
pub use reader::PdfReader;
