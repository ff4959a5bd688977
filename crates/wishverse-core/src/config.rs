//! Cake configuration model shared by the wizard, the 3D layer and the card.
//!
//! The wizard owns one `CakeConfig`. The manipulation layer never writes to it
//! directly; it reports `DecorationPatch`es which the owner merges by id.

use crate::color::Rgb;
use crate::constants::{clamp_scale, DEFAULT_CAKE_COLOR, LAYERS_MAX, LAYERS_MIN};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShapeKind {
    #[default]
    Round,
    Square,
    Heart,
    Custom,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Round,
        ShapeKind::Square,
        ShapeKind::Heart,
        ShapeKind::Custom,
    ];

    pub fn next(self) -> ShapeKind {
        match self {
            ShapeKind::Round => ShapeKind::Square,
            ShapeKind::Square => ShapeKind::Heart,
            ShapeKind::Heart => ShapeKind::Custom,
            ShapeKind::Custom => ShapeKind::Round,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShapeKind::Round => "Round",
            ShapeKind::Square => "Square",
            ShapeKind::Heart => "Heart",
            ShapeKind::Custom => "Custom",
        }
    }
}

/// Static decorations sit still; dynamic ones animate (spin, flicker, glow).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecorationKind {
    #[default]
    Static,
    Dynamic,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecorationId(pub String);

impl DecorationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Random id of the form `deco-xxxxxxxx`.
    pub fn random() -> Self {
        Self(format!("deco-{:08x}", rand::random::<u32>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DecorationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    pub id: DecorationId,
    pub model: String,
    #[serde(rename = "type")]
    pub kind: DecorationKind,
    pub position: [f32; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 3]>,
    pub scale: f32,
    pub color: String,
}

impl Decoration {
    pub fn new(
        id: DecorationId,
        model: impl Into<String>,
        kind: DecorationKind,
        position: Vec3,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id,
            model: model.into(),
            kind,
            position: position.to_array(),
            rotation: None,
            scale: 1.0,
            color: color.into(),
        }
    }

    pub fn position_vec(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn rotation_vec(&self) -> Vec3 {
        self.rotation.map(Vec3::from_array).unwrap_or(Vec3::ZERO)
    }

    pub fn rgb(&self) -> Rgb {
        Rgb::parse_or_default(&self.color)
    }

    /// Apply a partial update. Scale is re-clamped on the way in.
    pub fn apply(&mut self, patch: &DecorationPatch) {
        if let Some(p) = patch.position {
            self.position = p.to_array();
        }
        if let Some(s) = patch.scale {
            self.scale = clamp_scale(s);
        }
    }
}

/// The changed subset of a decoration's fields, as reported by the manipulation layer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DecorationPatch {
    pub position: Option<Vec3>,
    pub scale: Option<f32>,
}

impl DecorationPatch {
    pub fn position(p: Vec3) -> Self {
        Self {
            position: Some(p),
            scale: None,
        }
    }

    pub fn scale(s: f32) -> Self {
        Self {
            position: None,
            scale: Some(s),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.scale.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CakeConfig {
    /// Generated image as a data URI; empty until generation succeeds.
    #[serde(default)]
    pub image_url: String,
    /// User upload kept around for the final view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_image: Option<String>,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<ShapeKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decorations: Option<Vec<Decoration>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_path: Option<Vec<[f32; 2]>>,
}

impl CakeConfig {
    pub fn has_image(&self) -> bool {
        !self.image_url.is_empty()
    }

    pub fn layer_count(&self) -> u32 {
        self.layers.unwrap_or(LAYERS_MIN).clamp(LAYERS_MIN, LAYERS_MAX)
    }

    pub fn shape_kind(&self) -> ShapeKind {
        self.shape.unwrap_or_default()
    }

    pub fn base_color(&self) -> Rgb {
        Rgb::parse_or_default(self.color.as_deref().unwrap_or(DEFAULT_CAKE_COLOR))
    }

    pub fn decoration_list(&self) -> &[Decoration] {
        self.decorations.as_deref().unwrap_or(&[])
    }

    pub fn decoration(&self, id: &DecorationId) -> Option<&Decoration> {
        self.decoration_list().iter().find(|d| &d.id == id)
    }

    /// Merge a patch into the decoration with `id`, keeping order and all
    /// other fields. Returns false when no decoration has that id.
    pub fn merge_decoration(&mut self, id: &DecorationId, patch: &DecorationPatch) -> bool {
        let Some(list) = self.decorations.as_mut() else {
            return false;
        };
        match list.iter_mut().find(|d| &d.id == id) {
            Some(d) => {
                d.apply(patch);
                true
            }
            None => false,
        }
    }
}
