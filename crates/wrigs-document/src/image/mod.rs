// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decoding, clean-up steps and palette reduction.

pub mod processor;
pub mod quantize;
pub mod steps;

pub use processor::ImageProcessor;
pub use steps::{CLEANED_STEPS, CleanStep, NEUTRAL_BACKGROUND, cleaned_steps};
