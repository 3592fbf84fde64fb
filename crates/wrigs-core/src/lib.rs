// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wrigs Fashion — Core types, templates and error definitions shared across
// all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod templates;
pub mod types;

pub use config::AppConfig;
pub use error::WrigsError;
pub use templates::{BodyType, DollTemplate, OutfitRegion, OutfitRegions, Pose, TemplateRegistry, ViewBox};
pub use types::*;
