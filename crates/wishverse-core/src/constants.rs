// Shared layout/interaction tuning constants used by the core and the web frontend.

// Decoration scale bounds and input sensitivity
pub const SCALE_MIN: f32 = 0.2;
pub const SCALE_MAX: f32 = 3.0;
pub const WHEEL_SCALE_PER_DELTA: f32 = 0.005; // scale change per wheel delta unit

// Tier stacking
pub const LAYER_HEIGHT: f32 = 1.2;
pub const LAYER_STACK_FACTOR: f32 = 0.85; // 15% overlap between consecutive tiers
pub const LAYER_SHRINK_PER_TIER: f32 = 0.2; // footprint lost per tier
pub const LAYERS_MIN: u32 = 1;
pub const LAYERS_MAX: u32 = 5;
pub const BASE_GROUP_Y: f32 = -0.5; // tiers hang below the cake origin
pub const TIER_CENTER_Y: f32 = 0.6; // primitive centre within a tier
pub const DECORATION_ANCHOR_LIFT: f32 = 0.15; // decorations sit slightly above the top tier

// Primitive footprints
pub const ROUND_RADIUS: f32 = 1.5;
pub const ROUND_SEGMENTS: u32 = 32;
pub const SQUARE_SIDE: f32 = 2.5;

// Heart tier extrusion
pub const HEART_DEPTH: f32 = 2.0;
pub const HEART_SCALE: f32 = 0.15;
pub const HEART_GROUP_OFFSET: [f32; 3] = [-1.2, 0.0, 1.0];
pub const HEART_LOCAL_OFFSET: [f32; 3] = [0.0, 1.0, 0.0];
pub const CURVE_SEGMENTS: u32 = 12; // samples per bezier segment

// Custom tier extrusion
pub const CUSTOM_DEPTH: f32 = 1.5;
pub const CUSTOM_SCALE: f32 = 0.5;
pub const CUSTOM_LOCAL_OFFSET: [f32; 3] = [-1.0, 1.0, 1.0];
pub const FALLBACK_TRIANGLE: [[f32; 2]; 3] = [[0.0, 0.0], [1.0, 0.0], [0.5, 1.0]];

// Baking look
pub const BAKE_START_SCALE: f32 = 0.8;
pub const BAKED_TONE_HEX: &str = "#d4a373";
pub const BAKED_BASE_WEIGHT: f32 = 0.8;
pub const BAKED_TONE_WEIGHT: f32 = 0.2;

// Baking timeline (milliseconds)
pub const BAKE_DURATION_MS: u32 = 3000;
pub const BAKE_STEP_MS: u32 = 50;
pub const BAKE_SETTLE_MS: u32 = 1000; // pause between chime and final screen

// Defaults
pub const DEFAULT_CAKE_COLOR: &str = "#fce7f3";
pub const DEFAULT_DECORATION_COLOR: &str = "#ffffff";

// Selection and animation
pub const SELECTION_RING_INNER: f32 = 0.3;
pub const SELECTION_RING_OUTER: f32 = 0.35;
pub const SELECTION_RING_SEGMENTS: u32 = 32;
pub const ACTIVE_EMISSIVE: f32 = 0.2;
pub const DISCO_SPIN_RAD_PER_SEC: f32 = 3.0; // 0.05 rad per frame at 60 fps
pub const FLAME_RADIUS: f32 = 0.05;
pub const FLAME_LIFT: f32 = 0.35;

// Creator palettes (pastel swatches offered for the cake body)
pub const PALETTE_DREAMY: [&str; 5] = ["#fce7f3", "#e0f2fe", "#fef3c7", "#d1fae5", "#f3e8ff"];
pub const PALETTE_SUNSET: [&str; 5] = ["#fecaca", "#fed7aa", "#fde68a", "#e9d5ff", "#fbcfe8"];
pub const PALETTE_NATURE: [&str; 5] = ["#dcfce7", "#d1fae5", "#fef9c3", "#faf5ff", "#e0f2fe"];

#[inline]
pub fn clamp_scale(scale: f32) -> f32 {
    if scale.is_nan() {
        return SCALE_MIN;
    }
    scale.clamp(SCALE_MIN, SCALE_MAX)
}
