// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// wrigs-app — Async services for Wrigs Fashion, shared by the `wrigs` binary
// and any front end that embeds them.

pub mod services;

pub use services::app_services::AppServices;
pub use services::paper_dolls::PaperDollService;
pub use services::uploads::UploadService;
