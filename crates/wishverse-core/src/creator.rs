//! Creator screen session: Generate -> Preview -> Card, plus the 3D draft
//! the user decorates alongside.

use crate::color::Rgb;
use crate::config::{CakeConfig, Decoration, DecorationId, DecorationPatch, ShapeKind};
use crate::constants::{LAYERS_MAX, LAYERS_MIN, LAYER_SHRINK_PER_TIER, ROUND_RADIUS};
use crate::generate::{GenerationError, GenerationRequest};
use crate::manipulate::ManipulationSink;
use crate::scene::CATALOG;
use glam::Vec3;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

pub const GENERATION_FAILED_NOTICE: &str = "The magic fizzled, please try again!";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CreatorStep {
    #[default]
    Generate,
    Preview,
    Card,
}

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// Identifies one generation request. A response only lands in the session
/// (and request) that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationTicket {
    session: u64,
    serial: u32,
}

/// What `complete_generation` did with a response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationOutcome {
    Stored,
    /// Failed; show the notice.
    Failed(&'static str),
    /// The response belongs to a session or request that is gone.
    Discarded,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SaveError {
    #[error("write a message first")]
    EmptyMessage,
    #[error("no cake image yet")]
    NoImage,
}

#[derive(Debug)]
pub struct CreatorSession {
    id: u64,
    step: CreatorStep,
    pub prompt: String,
    upload: Option<String>,
    cake_image: Option<String>,
    /// Prompt that produced `cake_image`.
    image_prompt: String,
    in_flight: Option<GenerationTicket>,
    serial: u32,
    pub message: String,
    draft: CakeConfig,
    orbit_enabled: bool,
}

impl Default for CreatorSession {
    fn default() -> Self {
        Self {
            id: NEXT_SESSION.fetch_add(1, Ordering::Relaxed),
            step: CreatorStep::Generate,
            prompt: String::new(),
            upload: None,
            cake_image: None,
            image_prompt: String::new(),
            in_flight: None,
            serial: 0,
            message: String::new(),
            draft: CakeConfig {
                layers: Some(LAYERS_MIN),
                shape: Some(ShapeKind::Round),
                decorations: Some(Vec::new()),
                ..CakeConfig::default()
            },
            orbit_enabled: true,
        }
    }
}

impl CreatorSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> CreatorStep {
        self.step
    }

    pub fn upload(&self) -> Option<&str> {
        self.upload.as_deref()
    }

    pub fn cake_image(&self) -> Option<&str> {
        self.cake_image.as_deref()
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn draft(&self) -> &CakeConfig {
        &self.draft
    }

    pub fn orbit_enabled(&self) -> bool {
        self.orbit_enabled
    }

    pub fn set_upload(&mut self, data_uri: Option<String>) {
        self.upload = data_uri.filter(|d| !d.is_empty());
    }

    /// Generation needs something to work from and no request in flight.
    pub fn can_generate(&self) -> bool {
        !self.is_generating() && (!self.prompt.is_empty() || self.upload.is_some() || self.cake_image.is_some())
    }

    /// Mark a request in flight and build it. `None` when generation is not
    /// allowed right now.
    pub fn begin_generation(&mut self) -> Option<(GenerationTicket, GenerationRequest)> {
        if !self.can_generate() {
            return None;
        }
        self.serial = self.serial.wrapping_add(1);
        let ticket = GenerationTicket {
            session: self.id,
            serial: self.serial,
        };
        self.in_flight = Some(ticket);
        let request = GenerationRequest::new(&self.prompt, self.upload.as_deref(), self.cake_image.as_deref());
        Some((ticket, request))
    }

    /// Settle the request `ticket` was issued for. On failure everything but
    /// the in-flight flag is left alone. Responses for another session or an
    /// older request change nothing.
    pub fn complete_generation(
        &mut self,
        ticket: GenerationTicket,
        result: Result<String, GenerationError>,
    ) -> GenerationOutcome {
        if self.in_flight != Some(ticket) {
            log::warn!("[gen] dropping response for {:?}", ticket);
            return GenerationOutcome::Discarded;
        }
        self.in_flight = None;
        match result {
            Ok(image) => {
                self.cake_image = Some(image);
                self.image_prompt = std::mem::take(&mut self.prompt);
                self.step = CreatorStep::Preview;
                GenerationOutcome::Stored
            }
            Err(e) => {
                log::error!("[gen] generation failed: {e}");
                GenerationOutcome::Failed(GENERATION_FAILED_NOTICE)
            }
        }
    }

    pub fn open_card(&mut self) -> bool {
        if self.step != CreatorStep::Preview {
            return false;
        }
        self.step = CreatorStep::Card;
        true
    }

    pub fn back_to_generate(&mut self) -> bool {
        if self.step == CreatorStep::Generate {
            return false;
        }
        self.step = CreatorStep::Generate;
        true
    }

    /// Finished configuration for the wizard.
    pub fn save_card(&self) -> Result<CakeConfig, SaveError> {
        if self.message.trim().is_empty() {
            return Err(SaveError::EmptyMessage);
        }
        let image = self.cake_image.clone().ok_or(SaveError::NoImage)?;
        Ok(CakeConfig {
            image_url: image,
            original_image: self.upload.clone(),
            prompt: self.image_prompt.clone(),
            message: self.message.clone(),
            ..self.draft.clone()
        })
    }

    // ---------------- 3D draft ----------------

    pub fn cycle_shape(&mut self) -> ShapeKind {
        let next = self.draft.shape_kind().next();
        self.draft.shape = Some(next);
        next
    }

    pub fn set_layers(&mut self, layers: u32) -> u32 {
        let layers = layers.clamp(LAYERS_MIN, LAYERS_MAX);
        self.draft.layers = Some(layers);
        layers
    }

    /// Set the cake color. Rejects anything that is not `#rrggbb`.
    pub fn set_color(&mut self, hex: &str) -> bool {
        match Rgb::parse(hex) {
            Some(c) => {
                self.draft.color = Some(c.to_hex());
                true
            }
            None => false,
        }
    }

    pub fn set_custom_path(&mut self, points: Vec<[f32; 2]>) {
        self.draft.custom_path = Some(points);
    }

    /// Add a catalog decoration on the top surface. `None` for unknown models.
    pub fn add_decoration(&mut self, model: &str) -> Option<DecorationId> {
        let (model, kind, color) = CATALOG.iter().copied().find(|(m, _, _)| *m == model)?;
        let top_radius = ROUND_RADIUS * (1.0 - (self.draft.layer_count() - 1) as f32 * LAYER_SHRINK_PER_TIER);
        let list = self.draft.decorations.get_or_insert_with(Vec::new);
        let mut id = DecorationId::random();
        while list.iter().any(|d| d.id == id) {
            id = DecorationId::random();
        }
        let position = placement(list.len(), top_radius * 0.8);
        list.push(Decoration::new(id.clone(), model, kind, position, color));
        log::info!("[creator] added {model} as {id}");
        Some(id)
    }

    pub fn remove_decoration(&mut self, id: &DecorationId) -> bool {
        let Some(list) = self.draft.decorations.as_mut() else {
            return false;
        };
        let before = list.len();
        list.retain(|d| &d.id != id);
        list.len() != before
    }
}

/// Sunflower spiral so successive decorations do not stack on one spot.
pub fn placement(index: usize, max_radius: f32) -> Vec3 {
    const GOLDEN_ANGLE: f32 = 2.399_963;
    if index == 0 {
        return Vec3::ZERO;
    }
    let r = (0.35 * (index as f32).sqrt()).min(max_radius.max(0.0));
    let theta = index as f32 * GOLDEN_ANGLE;
    Vec3::new(r * theta.cos(), 0.0, r * theta.sin())
}

impl ManipulationSink for CreatorSession {
    fn decoration_changed(&mut self, id: &DecorationId, patch: DecorationPatch) {
        if !self.draft.merge_decoration(id, &patch) {
            log::debug!("[creator] patch for unknown decoration {id}");
        }
    }

    fn set_orbit_enabled(&mut self, enabled: bool) {
        self.orbit_enabled = enabled;
    }
}
