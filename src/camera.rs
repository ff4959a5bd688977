use crate::constants::*;
use glam::{Vec2, Vec3};
use wishverse_core::Camera;

/// Orbit controller around the cake. Disabled while a decoration is being
/// manipulated; input is dropped, not queued, while disabled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCamera {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub target: Vec3,
    pub enabled: bool,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            yaw: ORBIT_DEFAULT_YAW,
            pitch: ORBIT_DEFAULT_PITCH,
            distance: ORBIT_DEFAULT_DISTANCE,
            target: Vec3::new(0.0, ORBIT_TARGET_Y, 0.0),
            enabled: true,
        }
    }
}

impl OrbitCamera {
    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + Vec3::new(sy * cp, sp, cy * cp) * self.distance
    }

    /// Rotate by a pointer drag in CSS pixels. Returns false when disabled.
    pub fn drag(&mut self, delta_px: Vec2) -> bool {
        if !self.enabled {
            return false;
        }
        self.yaw -= delta_px.x * ORBIT_RAD_PER_PX;
        self.pitch = (self.pitch + delta_px.y * ORBIT_RAD_PER_PX).clamp(ORBIT_MIN_PITCH, ORBIT_MAX_PITCH);
        true
    }

    pub fn zoom(&mut self, wheel_delta: f32) -> bool {
        if !self.enabled || !wheel_delta.is_finite() {
            return false;
        }
        self.distance =
            (self.distance + wheel_delta * ORBIT_ZOOM_PER_DELTA).clamp(ORBIT_MIN_DISTANCE, ORBIT_MAX_DISTANCE);
        true
    }

    pub fn auto_rotate(&mut self, dt_sec: f32) {
        if self.enabled {
            self.yaw += ORBIT_AUTO_ROTATE_RAD_PER_SEC * dt_sec;
        }
    }

    pub fn reset(&mut self) {
        *self = OrbitCamera {
            enabled: self.enabled,
            ..OrbitCamera::default()
        };
    }

    pub fn camera(&self, aspect: f32) -> Camera {
        Camera {
            eye: self.eye(),
            target: self.target,
            up: Vec3::Y,
            aspect,
            fovy_radians: CAMERA_FOVY_RAD,
            znear: CAMERA_ZNEAR,
            zfar: CAMERA_ZFAR,
        }
    }
}
