// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer — bridges callers (the CLI, an HTTP front end) to the
// pipeline, compositor and file store.
//
// Each service is async-friendly: CPU-bound work runs on blocking tasks,
// file writes go through the store.

pub mod app_services;
pub mod data_dir;
pub mod paper_dolls;
pub mod uploads;
