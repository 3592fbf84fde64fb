// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open and inspect generated PDF documents using the `lopdf`
// crate. Used to verify compositor output before it is published.

use std::path::Path;

use lopdf::{Document, Object, ObjectId};
use tracing::{debug, info, instrument};
use wrigs_core::error::{Result, WrigsError};

/// Read-only view of a PDF.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            WrigsError::GenerationFailed(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");
        Ok(Self { document })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            WrigsError::GenerationFailed(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");
        Ok(Self { document })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Width and height in points of page `page_number` (1-indexed), taken
    /// from its MediaBox. Inherited boxes are followed up the page tree.
    pub fn page_size(&self, page_number: u32) -> Option<(f32, f32)> {
        let page_id = *self.document.get_pages().get(&page_number)?;
        let media_box = self.inherited_media_box(page_id)?;
        let coords: Vec<f32> = media_box
            .iter()
            .map(|value| self.resolve(value).as_float().ok())
            .collect::<Option<_>>()?;
        match coords.as_slice() {
            [x0, y0, x1, y1] => Some(((x1 - x0).abs(), (y1 - y0).abs())),
            _ => None,
        }
    }

    fn inherited_media_box(&self, start: ObjectId) -> Option<&Vec<Object>> {
        let mut node = start;
        // Page trees are shallow; cap the walk so a cyclic Parent chain
        // cannot loop forever.
        for _ in 0..32 {
            let dict = self.document.get_dictionary(node).ok()?;
            if let Ok(media_box) = dict.get(b"MediaBox") {
                return self.resolve(media_box).as_array().ok();
            }
            node = dict.get(b"Parent").ok()?.as_reference().ok()?;
        }
        None
    }

    fn resolve<'a>(&'a self, object: &'a Object) -> &'a Object {
        match object.as_reference() {
            Ok(id) => self.document.get_object(id).unwrap_or(object),
            Err(_) => object,
        }
    }
}
