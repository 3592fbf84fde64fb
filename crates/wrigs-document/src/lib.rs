// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// wrigs-document — Image and PDF processing for Wrigs Fashion.
//
// Provides the sketch normalization pipeline (intake checks, HEIC
// transcoding, clean-up steps, palette reduction) and the paper-doll PDF
// compositor (layout, drawing, output verification).

pub mod image;
pub mod pdf;
pub mod upload;

// Re-export the primary structs so callers can use `wrigs_document::PdfReader` etc.
pub use image::processor::ImageProcessor;
pub use pdf::compositor::{
    PaperDollCompositor, PaperDollRequest, pdf_filename, pdf_filename_for_attempt,
};
pub use pdf::reader::PdfReader;
pub use upload::pipeline::{Derivatives, NormalizationPipeline};
pub use upload::intake::UploadPolicy;
