// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Paper-doll template registry.
//
// The registry is an ordinary value: construct it once (usually with
// `TemplateRegistry::builtin()`) and hand it to whoever needs lookups. Tests
// can build a registry from fixture templates instead.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, WrigsError};
use crate::types::OutfitCategory;

/// Doll pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pose {
    /// Arms out to the sides (classic paper-doll pose).
    #[serde(rename = "pose-a")]
    PoseA,
    /// Arms down at the sides.
    #[serde(rename = "pose-b")]
    PoseB,
}

impl Pose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PoseA => "pose-a",
            Self::PoseB => "pose-b",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pose-a" => Some(Self::PoseA),
            "pose-b" => Some(Self::PoseB),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::PoseA => {
                "Classic paper doll pose with arms out - perfect for jackets and accessories"
            }
            Self::PoseB => "Standing pose with arms down - great for dresses and flowing designs",
        }
    }
}

/// Doll body type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    Average,
    Curvy,
    Petite,
}

impl BodyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Average => "average",
            Self::Curvy => "curvy",
            Self::Petite => "petite",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "average" => Some(Self::Average),
            "curvy" => Some(Self::Curvy),
            "petite" => Some(Self::Petite),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Average => "Classic proportions, perfect for all designs",
            Self::Curvy => "Fuller figure, celebrates beautiful curves",
            Self::Petite => "Smaller frame, great for delicate designs",
        }
    }
}

/// A rectangle in the template artwork's own coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutfitRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl OutfitRegion {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }
}

/// Natural size of the doll artwork.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBox {
    pub width: f32,
    pub height: f32,
}

impl ViewBox {
    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }
}

/// Where each outfit category sits on the doll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutfitRegions {
    pub top_region: OutfitRegion,
    pub bottom_region: OutfitRegion,
    pub dress_region: OutfitRegion,
    pub shoes_region: OutfitRegion,
}

impl OutfitRegions {
    pub fn get(&self, category: OutfitCategory) -> OutfitRegion {
        match category {
            OutfitCategory::Top => self.top_region,
            OutfitCategory::Bottom => self.bottom_region,
            OutfitCategory::Dress => self.dress_region,
            OutfitCategory::Shoes => self.shoes_region,
        }
    }

    /// Region for a raw category string. Unknown categories resolve to the
    /// top region.
    pub fn resolve(&self, category: &str) -> OutfitRegion {
        match OutfitCategory::parse(category) {
            Some(category) => self.get(category),
            None => self.top_region,
        }
    }
}

/// A printable paper-doll base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DollTemplate {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub pose: Pose,
    pub pose_description: String,
    pub body_type: BodyType,
    pub body_type_display: String,
    pub base_image_url: String,
    pub view_box: ViewBox,
    pub regions: OutfitRegions,
}

impl DollTemplate {
    fn validate(&self) -> Result<()> {
        if !(self.view_box.width > 0.0 && self.view_box.height > 0.0) {
            return Err(WrigsError::InvalidTemplate {
                id: self.id.clone(),
                reason: "viewBox must have a positive width and height".into(),
            });
        }
        for category in OutfitCategory::ALL {
            if self.regions.get(category).is_degenerate() {
                return Err(WrigsError::InvalidTemplate {
                    id: self.id.clone(),
                    reason: format!("{} region is degenerate", category.as_str()),
                });
            }
        }
        Ok(())
    }
}

/// Read-only lookup over a fixed set of templates.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: Vec<DollTemplate>,
}

impl TemplateRegistry {
    /// Build a registry, rejecting duplicate ids and degenerate geometry.
    pub fn new(templates: Vec<DollTemplate>) -> Result<Self> {
        for (idx, template) in templates.iter().enumerate() {
            template.validate()?;
            if templates[..idx].iter().any(|t| t.id == template.id) {
                return Err(WrigsError::InvalidTemplate {
                    id: template.id.clone(),
                    reason: "duplicate template id".into(),
                });
            }
        }
        debug!(count = templates.len(), "template registry built");
        Ok(Self { templates })
    }

    /// The six stock templates: two poses times three body types.
    pub fn builtin() -> Self {
        let mut templates = Vec::with_capacity(6);
        for pose in [Pose::PoseA, Pose::PoseB] {
            for body_type in [BodyType::Average, BodyType::Curvy, BodyType::Petite] {
                templates.push(stock_template(pose, body_type));
            }
        }
        Self { templates }
    }

    pub fn get(&self, id: &str) -> Option<&DollTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn all(&self) -> &[DollTemplate] {
        &self.templates
    }

    pub fn by_pose(&self, pose: Pose) -> Vec<&DollTemplate> {
        self.templates.iter().filter(|t| t.pose == pose).collect()
    }

    pub fn by_body_type(&self, body_type: BodyType) -> Vec<&DollTemplate> {
        self.templates
            .iter()
            .filter(|t| t.body_type == body_type)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

// -- Stock geometry -----------------------------------------------------------

fn stock_regions(body_type: BodyType) -> OutfitRegions {
    match body_type {
        BodyType::Average => OutfitRegions {
            top_region: OutfitRegion::new(145.0, 225.0, 110.0, 110.0),
            bottom_region: OutfitRegion::new(160.0, 380.0, 80.0, 120.0),
            dress_region: OutfitRegion::new(145.0, 225.0, 110.0, 270.0),
            shoes_region: OutfitRegion::new(160.0, 540.0, 80.0, 30.0),
        },
        BodyType::Curvy => OutfitRegions {
            top_region: OutfitRegion::new(130.0, 220.0, 140.0, 115.0),
            bottom_region: OutfitRegion::new(155.0, 380.0, 90.0, 120.0),
            dress_region: OutfitRegion::new(130.0, 220.0, 140.0, 280.0),
            shoes_region: OutfitRegion::new(155.0, 540.0, 90.0, 30.0),
        },
        BodyType::Petite => OutfitRegions {
            top_region: OutfitRegion::new(155.0, 240.0, 90.0, 100.0),
            bottom_region: OutfitRegion::new(170.0, 390.0, 60.0, 115.0),
            dress_region: OutfitRegion::new(155.0, 240.0, 90.0, 260.0),
            shoes_region: OutfitRegion::new(170.0, 540.0, 60.0, 30.0),
        },
    }
}

fn stock_template(pose: Pose, body_type: BodyType) -> DollTemplate {
    let id = format!("{}-{}", pose.as_str(), body_type.as_str());
    let (display_name, pose_description) = match pose {
        Pose::PoseA => ("Classic Pose", "Arms out to the sides"),
        Pose::PoseB => ("Standing Pose", "Arms down at sides"),
    };
    let body_type_display = match body_type {
        BodyType::Average => "Classic Build",
        BodyType::Curvy => "Curvy Build",
        BodyType::Petite => "Petite Build",
    };
    DollTemplate {
        name: id.clone(),
        base_image_url: format!("/templates/dolls/{id}.svg"),
        id,
        display_name: display_name.into(),
        pose,
        pose_description: pose_description.into(),
        body_type,
        body_type_display: body_type_display.into(),
        view_box: ViewBox {
            width: 400.0,
            height: 600.0,
        },
        regions: stock_regions(body_type),
    }
}
