// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Mapping between public URLs and paths under the static root.

use std::io;
use std::path::{Component, Path, PathBuf};

use wrigs_core::error::{Result, WrigsError};

/// `/` + the relative path, normalised to forward slashes.
pub fn public_url(rel_path: &str) -> String {
    format!("/{}", rel_path.trim_start_matches('/').replace('\\', "/"))
}

/// Turn a store-relative path into a path under `root`, refusing anything
/// that could escape it.
pub(crate) fn join_under(root: &Path, rel_path: &str) -> Result<PathBuf> {
    let rel = Path::new(rel_path.trim_start_matches('/'));
    let mut out = root.to_path_buf();
    for component in rel.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            _ => {
                return Err(WrigsError::Io(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("path {rel_path:?} escapes the store root"),
                )));
            }
        }
    }
    if out == root {
        return Err(WrigsError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            "empty store path",
        )));
    }
    Ok(out)
}

/// Resolve the design reference sent with a PDF request to a local file.
///
/// Site-relative URLs such as `/uploads/abc-cleaned.png` map to
/// `{static_root}/uploads/abc-cleaned.png`. Remote `http(s)` URLs are not
/// fetched. Whether the file exists is checked by the compositor.
pub fn resolve_design_url(static_root: &Path, design_url: &str) -> Result<PathBuf> {
    let trimmed = design_url.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Err(WrigsError::RemoteDesignUnsupported(trimmed.to_string()));
    }
    join_under(static_root, trimmed)
        .map_err(|_| WrigsError::DesignImageNotFound(PathBuf::from(trimmed)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_urls_are_rooted() {
        assert_eq!(public_url("uploads/a-original.png"), "/uploads/a-original.png");
        assert_eq!(public_url("/pdfs/x.pdf"), "/pdfs/x.pdf");
    }

    #[test]
    fn site_relative_url_maps_under_static_root() {
        let path = resolve_design_url(Path::new("/srv/static"), "/uploads/abc-cleaned.png").unwrap();
        assert_eq!(path, PathBuf::from("/srv/static/uploads/abc-cleaned.png"));
    }

    #[test]
    fn remote_urls_are_rejected() {
        for url in ["http://example.com/a.png", "HTTPS://example.com/a.png"] {
            let err = resolve_design_url(Path::new("static"), url).unwrap_err();
            assert!(matches!(err, WrigsError::RemoteDesignUnsupported(_)));
        }
    }

    #[test]
    fn traversal_is_treated_as_missing() {
        let err = resolve_design_url(Path::new("static"), "/uploads/../../etc/passwd").unwrap_err();
        assert!(matches!(err, WrigsError::DesignImageNotFound(_)));
    }

    #[test]
    fn join_under_rejects_empty_and_parent() {
        assert!(join_under(Path::new("root"), "").is_err());
        assert!(join_under(Path::new("root"), "../x").is_err());
        assert_eq!(
            join_under(Path::new("root"), "./pdfs/x.pdf").unwrap(),
            PathBuf::from("root/pdfs/x.pdf")
        );
    }
}
