// Camera, orbit and render tuning for the web frontend.
//
// Cake geometry and interaction limits live in `wishverse_core::constants`;
// these only concern how the scene is viewed.
// Orbit camera defaults
pub const CAMERA_FOVY_RAD: f32 = std::f32::consts::FRAC_PI_4;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 100.0;
pub const ORBIT_TARGET_Y: f32 = 0.8;
pub const ORBIT_DEFAULT_DISTANCE: f32 = 8.0;
pub const ORBIT_DEFAULT_YAW: f32 = 0.0;
pub const ORBIT_DEFAULT_PITCH: f32 = 0.45; // radians above the horizon

// Orbit limits and sensitivity
pub const ORBIT_MIN_DISTANCE: f32 = 4.0;
pub const ORBIT_MAX_DISTANCE: f32 = 16.0;
pub const ORBIT_MIN_PITCH: f32 = 0.05;
pub const ORBIT_MAX_PITCH: f32 = 1.45;
pub const ORBIT_RAD_PER_PX: f32 = 0.008;
pub const ORBIT_ZOOM_PER_DELTA: f32 = 0.01; // distance change per wheel delta unit
pub const ORBIT_AUTO_ROTATE_RAD_PER_SEC: f32 = 0.25; // while baking

// Lighting (world space, pointing from the light toward the scene)
pub const LIGHT_DIR: [f32; 3] = [-0.4, -1.0, -0.6];
pub const AMBIENT_LIGHT: f32 = 0.45;

// Clear color (pale sakura pink, linear)
pub const CLEAR_RGB: [f64; 3] = [0.97, 0.86, 0.89];

// Chime (magic sound at the end of baking)
pub const CHIME_START_HZ: f32 = 880.0;
pub const CHIME_END_HZ: f32 = 1760.0;
pub const CHIME_SWEEP_SEC: f64 = 0.5;
pub const CHIME_GAIN: f32 = 0.3;
pub const CHIME_FLOOR_GAIN: f32 = 0.000_01;
pub const CHIME_DURATION_SEC: f64 = 1.5;

// Animation step cap: a long stall (tab in background) animates as one short frame.
// The bake timeline always gets the full elapsed time.
pub const MAX_FRAME_DT_MS: u32 = 250;
