//! Cake scene layout and the retained scene graph.
//!
//! `build_scene` turns a configuration plus view state into a flat list of
//! keyed nodes with world transforms and materials. `RetainedScene::update`
//! diffs that list against the previous frame so the renderer only touches
//! what changed.

use crate::color::Rgb;
use crate::config::{CakeConfig, Decoration, DecorationId, DecorationKind, ShapeKind};
use crate::constants::*;
use crate::mesh::MeshKey;
use crate::state::{ray_sphere, Ray};
use fnv::FnvHashMap;
use glam::{EulerRot, Mat4, Quat, Vec3};
use smallvec::SmallVec;
use std::f32::consts::{FRAC_PI_2, PI};

// ---------------- Layout ----------------

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TierLayout {
    pub index: u32,
    /// Bottom of the tier relative to the base group.
    pub y: f32,
    /// Horizontal footprint scale.
    pub footprint: f32,
}

pub fn tier_layouts(layers: u32) -> Vec<TierLayout> {
    let layers = layers.clamp(LAYERS_MIN, LAYERS_MAX);
    (0..layers)
        .map(|i| TierLayout {
            index: i,
            y: i as f32 * LAYER_HEIGHT * LAYER_STACK_FACTOR,
            footprint: 1.0 - i as f32 * LAYER_SHRINK_PER_TIER,
        })
        .collect()
}

/// Height of the decoration group above the cake origin.
pub fn decoration_anchor_y(layers: u32) -> f32 {
    let layers = layers.clamp(LAYERS_MIN, LAYERS_MAX);
    (layers - 1) as f32 * LAYER_HEIGHT * LAYER_STACK_FACTOR + DECORATION_ANCHOR_LIFT
}

/// Tier color and overall cake scale for a given baking progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BakingLook {
    pub color: Rgb,
    pub scale: f32,
}

impl BakingLook {
    pub fn at(base: Rgb, progress: Option<f32>) -> BakingLook {
        match progress {
            None => BakingLook { color: base, scale: 1.0 },
            Some(p) => {
                let p = if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 };
                BakingLook {
                    color: base.lerp(baked_tone(base), p),
                    scale: BAKE_START_SCALE + p * (1.0 - BAKE_START_SCALE),
                }
            }
        }
    }
}

/// Fully baked version of a base color.
pub fn baked_tone(base: Rgb) -> Rgb {
    let tone = Rgb::parse(BAKED_TONE_HEX).unwrap_or(Rgb::new(0.83, 0.64, 0.45));
    base.scaled(BAKED_BASE_WEIGHT).add(tone.scaled(BAKED_TONE_WEIGHT))
}

fn v3(a: [f32; 3]) -> Vec3 {
    Vec3::from_array(a)
}

/// Transform of a tier primitive inside its layer group.
pub fn tier_shape_transform(shape: ShapeKind) -> Mat4 {
    match shape {
        ShapeKind::Round | ShapeKind::Square => Mat4::from_translation(Vec3::new(0.0, TIER_CENTER_Y, 0.0)),
        ShapeKind::Heart => {
            Mat4::from_translation(v3(HEART_GROUP_OFFSET) + v3(HEART_LOCAL_OFFSET))
                * Mat4::from_quat(Quat::from_euler(EulerRot::XYZ, FRAC_PI_2, PI, 0.0))
                * Mat4::from_scale(Vec3::splat(HEART_SCALE))
        }
        ShapeKind::Custom => {
            Mat4::from_translation(v3(CUSTOM_LOCAL_OFFSET))
                * Mat4::from_quat(Quat::from_euler(EulerRot::XYZ, FRAC_PI_2, 0.0, 0.0))
                * Mat4::from_scale(Vec3::splat(CUSTOM_SCALE))
        }
    }
}

pub fn tier_mesh(config: &CakeConfig) -> MeshKey {
    match config.shape_kind() {
        ShapeKind::Round => MeshKey::TierRound,
        ShapeKind::Square => MeshKey::TierSquare,
        ShapeKind::Heart => MeshKey::TierHeart,
        ShapeKind::Custom => MeshKey::custom_tier(config.custom_path.as_deref()),
    }
}

pub fn cake_root_transform(cake_scale: f32) -> Mat4 {
    Mat4::from_scale(Vec3::splat(cake_scale))
}

/// World transform of the decoration group; decoration positions are local to it.
pub fn decoration_group_transform(layers: u32, cake_scale: f32) -> Mat4 {
    cake_root_transform(cake_scale) * Mat4::from_translation(Vec3::new(0.0, decoration_anchor_y(layers), 0.0))
}

// ---------------- Decoration catalog ----------------

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelSpec {
    pub mesh: Option<MeshKey>,
    /// Bounding-sphere radius at scale 1, used for picking.
    pub hit_radius: f32,
    pub flame: bool,
    pub spins: bool,
    pub glows: bool,
    pub metallic: bool,
}

impl ModelSpec {
    fn plain(mesh: MeshKey, hit_radius: f32) -> Self {
        Self {
            mesh: Some(mesh),
            hit_radius,
            flame: false,
            spins: false,
            glows: false,
            metallic: false,
        }
    }
}

pub fn model_spec(model: &str, kind: DecorationKind) -> ModelSpec {
    let cube = ModelSpec::plain(MeshKey::cuboid(0.2, 0.2, 0.2), 0.2);
    let candle = ModelSpec {
        flame: true,
        ..ModelSpec::plain(MeshKey::cylinder(0.04, 0.6), 0.35)
    };
    match kind {
        DecorationKind::Static => match model {
            "strawberry" | "cherry" => ModelSpec::plain(MeshKey::sphere(0.2, 16, 16), 0.2),
            "blueberry" | "pearl" => ModelSpec::plain(MeshKey::sphere(0.15, 12, 12), 0.15),
            "candle_basic" => candle,
            "star_candy" => ModelSpec::plain(MeshKey::sphere(0.18, 4, 2), 0.18),
            "heart_topper" => ModelSpec::plain(MeshKey::cuboid(0.4, 0.4, 0.05), 0.3),
            _ => cube,
        },
        DecorationKind::Dynamic => match model {
            "disco_ball" => ModelSpec {
                spins: true,
                metallic: true,
                ..ModelSpec::plain(MeshKey::sphere(0.25, 8, 4), 0.25)
            },
            "candle_flicker" => candle,
            "breathing_glow" => ModelSpec {
                glows: true,
                ..ModelSpec::plain(MeshKey::sphere(0.2, 16, 16), 0.2)
            },
            // particle effect with no solid body; still pickable
            "falling_frosting" => ModelSpec {
                mesh: None,
                hit_radius: 0.3,
                ..cube
            },
            _ => cube,
        },
    }
}

/// Decorations offered by the creator's tray: (model, kind, default color).
pub const CATALOG: [(&str, DecorationKind, &str); 9] = [
    ("strawberry", DecorationKind::Static, "#e11d48"),
    ("blueberry", DecorationKind::Static, "#3b82f6"),
    ("pearl", DecorationKind::Static, "#fdf2f8"),
    ("candle_basic", DecorationKind::Static, "#fde68a"),
    ("star_candy", DecorationKind::Static, "#fbbf24"),
    ("heart_topper", DecorationKind::Static, "#f472b6"),
    ("disco_ball", DecorationKind::Dynamic, "#e5e7eb"),
    ("candle_flicker", DecorationKind::Dynamic, "#fcd34d"),
    ("breathing_glow", DecorationKind::Dynamic, "#f9a8d4"),
];

// ---------------- Animation ----------------

/// Per-frame animation state for dynamic decorations.
#[derive(Debug, Default)]
pub struct Animator {
    spins: FnvHashMap<DecorationId, f32>,
    time: f32,
}

impl Animator {
    pub fn advance(&mut self, dt_sec: f32, decorations: &[Decoration]) {
        let dt = dt_sec.max(0.0);
        self.time += dt;
        self.spins.retain(|id, _| decorations.iter().any(|d| &d.id == id));
        for d in decorations {
            if model_spec(&d.model, d.kind).spins {
                let angle = self.spins.entry(d.id.clone()).or_insert(0.0);
                *angle = (*angle + DISCO_SPIN_RAD_PER_SEC * dt) % std::f32::consts::TAU;
            }
        }
    }

    pub fn spin(&self, id: &DecorationId) -> f32 {
        self.spins.get(id).copied().unwrap_or(0.0)
    }

    pub fn time(&self) -> f32 {
        self.time
    }
}

// ---------------- Scene nodes ----------------

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub color: Rgb,
    pub emissive: Rgb,
    pub roughness: f32,
    pub metalness: f32,
    pub opacity: f32,
    pub unlit: bool,
}

impl Material {
    pub fn standard(color: Rgb) -> Self {
        Self {
            color,
            emissive: Rgb::BLACK,
            roughness: 0.4,
            metalness: 0.1,
            opacity: 1.0,
            unlit: false,
        }
    }

    pub fn unlit(color: Rgb, opacity: f32) -> Self {
        Self {
            opacity,
            unlit: true,
            ..Self::standard(color)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Tier(u32),
    Decoration(DecorationId),
    Flame(DecorationId),
    Selection(DecorationId),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub key: NodeKey,
    pub mesh: MeshKey,
    pub transform: Mat4,
    pub material: Material,
}

/// View-dependent inputs to scene building.
#[derive(Clone, Copy, Debug)]
pub struct SceneView<'a> {
    /// `Some` while the baking animation runs.
    pub baking_progress: Option<f32>,
    pub active: Option<&'a DecorationId>,
    pub animator: &'a Animator,
}

pub fn build_scene(config: &CakeConfig, view: &SceneView<'_>) -> Vec<SceneNode> {
    let layers = config.layer_count();
    let look = BakingLook::at(config.base_color(), view.baking_progress);
    let root = cake_root_transform(look.scale);
    let base = root * Mat4::from_translation(Vec3::new(0.0, BASE_GROUP_Y, 0.0));
    let shape_local = tier_shape_transform(config.shape_kind());
    let tier_key = tier_mesh(config);

    let mut nodes = Vec::with_capacity(layers as usize + config.decoration_list().len() * 2);
    for tier in tier_layouts(layers) {
        let layer = Mat4::from_translation(Vec3::new(0.0, tier.y, 0.0))
            * Mat4::from_scale(Vec3::new(tier.footprint, 1.0, tier.footprint));
        nodes.push(SceneNode {
            key: NodeKey::Tier(tier.index),
            mesh: tier_key,
            transform: base * layer * shape_local,
            material: Material::standard(look.color),
        });
    }

    let group = decoration_group_transform(layers, look.scale);
    for d in config.decoration_list() {
        push_decoration(&mut nodes, group, d, view);
    }
    nodes
}

fn push_decoration(nodes: &mut Vec<SceneNode>, group: Mat4, d: &Decoration, view: &SceneView<'_>) {
    let spec = model_spec(&d.model, d.kind);
    let active = view.active == Some(&d.id);
    let rot = d.rotation_vec();
    let local = Mat4::from_translation(d.position_vec())
        * Mat4::from_quat(Quat::from_euler(
            EulerRot::XYZ,
            rot.x,
            rot.y + view.animator.spin(&d.id),
            rot.z,
        ))
        * Mat4::from_scale(Vec3::splat(clamp_scale(d.scale)));
    let world = group * local;

    if active {
        nodes.push(SceneNode {
            key: NodeKey::Selection(d.id.clone()),
            mesh: MeshKey::SelectionRing,
            transform: world,
            material: Material::unlit(Rgb::WHITE, 0.5),
        });
    }

    if let Some(mesh) = spec.mesh {
        let color = d.rgb();
        let mut material = Material::standard(color);
        if spec.metallic {
            material.roughness = 0.0;
            material.metalness = 1.0;
        }
        let mut glow = if active { ACTIVE_EMISSIVE } else { 0.0 };
        if spec.glows {
            glow += 0.35 + 0.25 * (view.animator.time() * 2.0).sin();
        }
        material.emissive = color.scaled(glow);
        nodes.push(SceneNode {
            key: NodeKey::Decoration(d.id.clone()),
            mesh,
            transform: world,
            material,
        });
    }

    if spec.flame {
        nodes.push(SceneNode {
            key: NodeKey::Flame(d.id.clone()),
            mesh: MeshKey::sphere(FLAME_RADIUS, 8, 8),
            transform: world * Mat4::from_translation(Vec3::new(0.0, FLAME_LIFT, 0.0)),
            material: Material::unlit(Rgb::ORANGE, 1.0),
        });
    }
}

/// Nearest decoration whose bounding sphere the ray hits. The ray must be in
/// the decoration group's local frame.
pub fn pick_decoration<'a>(ray: &Ray, decorations: &'a [Decoration]) -> Option<&'a Decoration> {
    decorations
        .iter()
        .filter_map(|d| {
            let r = model_spec(&d.model, d.kind).hit_radius * clamp_scale(d.scale);
            ray_sphere(ray.origin, ray.dir, d.position_vec(), r).map(|t| (d, t))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(d, _)| d)
}

// ---------------- Retained scene ----------------

#[derive(Clone, Debug, PartialEq)]
pub enum SceneOp {
    Add(SceneNode),
    Update(SceneNode),
    Remove(NodeKey),
}

pub type SceneDiff = SmallVec<[SceneOp; 8]>;

#[derive(Debug, Default)]
pub struct RetainedScene {
    nodes: FnvHashMap<NodeKey, SceneNode>,
    order: Vec<NodeKey>,
}

impl RetainedScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the retained nodes with `desired` and report what changed.
    pub fn update(&mut self, desired: Vec<SceneNode>) -> SceneDiff {
        let mut ops = SceneDiff::new();
        let mut next = FnvHashMap::with_capacity_and_hasher(desired.len(), Default::default());
        let mut order = Vec::with_capacity(desired.len());

        for node in desired {
            match self.nodes.remove(&node.key) {
                None => ops.push(SceneOp::Add(node.clone())),
                Some(prev) if prev != node => ops.push(SceneOp::Update(node.clone())),
                Some(_) => {}
            }
            order.push(node.key.clone());
            next.insert(node.key.clone(), node);
        }
        // anything left was not desired this frame
        for key in self.order.drain(..) {
            if self.nodes.remove(&key).is_some() {
                ops.push(SceneOp::Remove(key));
            }
        }
        self.nodes = next;
        self.order = order;
        ops
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Nodes in draw order.
    pub fn nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.order.iter().filter_map(|k| self.nodes.get(k))
    }

    pub fn clear(&mut self) -> SceneDiff {
        self.update(Vec::new())
    }
}
