// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the sketch pipeline and paper-doll compositor.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of the public identifier embedded in upload filenames.
const FILE_ID_LEN: usize = 10;

/// Unique identifier for an uploaded sketch (shared by both derivatives).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(pub String);

impl FileId {
    pub fn new() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(hex[..FILE_ID_LEN].to_string())
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raster formats accepted at upload time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadFormat {
    Jpeg,
    Png,
    /// HEIC/HEIF (including image sequences). Needs transcoding before the
    /// general-purpose decoder can read it.
    Heic,
}

impl UploadFormat {
    /// Map a declared MIME type to a format, if it is one we accept.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/heic" | "image/heif" | "image/heic-sequence" | "image/heif-sequence" => {
                Some(Self::Heic)
            }
            _ => None,
        }
    }

    /// Infer the format from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "heic" | "heif" => Some(Self::Heic),
            _ => None,
        }
    }

    pub fn is_heic(&self) -> bool {
        matches!(self, Self::Heic)
    }
}

/// Paper sizes supported by the printable PDF.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    #[default]
    Letter,
    A4,
}

impl PaperSize {
    /// Dimensions in PostScript points (width, height), 72 pt = 1 inch.
    pub fn dimensions_pt(&self) -> (f32, f32) {
        match self {
            Self::Letter => (612.0, 792.0),
            Self::A4 => (595.0, 842.0),
        }
    }

    /// Parse a request value. Only `"a4"` selects A4; anything else,
    /// including an empty string, falls back to Letter.
    pub fn from_request(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("a4") {
            Self::A4
        } else {
            Self::Letter
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Letter => "letter",
            Self::A4 => "a4",
        }
    }
}

/// Outfit categories that map onto the regions of a doll template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutfitCategory {
    Top,
    Bottom,
    Dress,
    Shoes,
}

impl OutfitCategory {
    pub const ALL: [OutfitCategory; 4] = [Self::Top, Self::Bottom, Self::Dress, Self::Shoes];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            "dress" => Some(Self::Dress),
            "shoes" => Some(Self::Shoes),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Dress => "dress",
            Self::Shoes => "shoes",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Top => "Top",
            Self::Bottom => "Bottom",
            Self::Dress => "Dress",
            Self::Shoes => "Shoes",
        }
    }
}

/// Where the user placed their design, as supplied with a PDF request.
///
/// `category` stays a raw string: the compositor tolerates unknown values and
/// falls back to the top region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementData {
    pub category: String,
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub rotation: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl PlacementData {
    /// A placement for `category` at the origin with no scaling or rotation.
    pub fn for_category(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            rotation: 0.0,
        }
    }

    /// The parsed category, or `None` if the caller sent something unknown.
    pub fn outfit_category(&self) -> Option<OutfitCategory> {
        OutfitCategory::parse(&self.category)
    }

    /// Human-readable category name for titles. Unknown categories are shown
    /// verbatim.
    pub fn category_display_name(&self) -> &str {
        match self.outfit_category() {
            Some(category) => category.display_name(),
            None => &self.category,
        }
    }
}

/// Result of a successful upload: both derivatives are on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub file_id: FileId,
    pub original_url: String,
    pub cleaned_url: String,
    pub file_name: String,
    pub file_size: usize,
}

/// Result of a successful PDF generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPdf {
    pub pdf_path: PathBuf,
    pub pdf_url: String,
    pub filename: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_ids_are_short_and_unique() {
        let a = FileId::new();
        let b = FileId::new();
        assert_eq!(a.0.len(), FILE_ID_LEN);
        assert_ne!(a, b);
    }

    #[test]
    fn mime_acceptance_covers_heif_sequences() {
        assert_eq!(UploadFormat::from_mime("image/jpg"), Some(UploadFormat::Jpeg));
        assert_eq!(UploadFormat::from_mime("image/heif-sequence"), Some(UploadFormat::Heic));
        assert_eq!(UploadFormat::from_mime("IMAGE/PNG"), Some(UploadFormat::Png));
        assert_eq!(UploadFormat::from_mime("image/gif"), None);
        assert_eq!(UploadFormat::from_mime(""), None);
    }

    #[test]
    fn paper_size_request_parsing_defaults_to_letter() {
        assert_eq!(PaperSize::from_request("a4"), PaperSize::A4);
        assert_eq!(PaperSize::from_request("A4"), PaperSize::A4);
        assert_eq!(PaperSize::from_request("legal"), PaperSize::Letter);
        assert_eq!(PaperSize::from_request(""), PaperSize::Letter);
        assert_eq!(PaperSize::default().dimensions_pt(), (612.0, 792.0));
        assert_eq!(PaperSize::A4.dimensions_pt(), (595.0, 842.0));
    }

    #[test]
    fn placement_deserialises_from_camel_case_json() {
        let json = r#"{"category":"dress","x":12.5,"y":40,"scale":0.8,"rotation":15}"#;
        let placement: PlacementData = serde_json::from_str(json).unwrap();
        assert_eq!(placement.outfit_category(), Some(OutfitCategory::Dress));
        assert_eq!(placement.category_display_name(), "Dress");
        assert_eq!(placement.scale, 0.8);
    }

    #[test]
    fn unknown_category_displays_verbatim() {
        let placement = PlacementData::for_category("hat");
        assert_eq!(placement.outfit_category(), None);
        assert_eq!(placement.category_display_name(), "hat");
    }
}
