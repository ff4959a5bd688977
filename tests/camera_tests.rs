// Host-side tests for the orbit camera.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}
mod camera {
    include!("../src/camera.rs");
}

use camera::OrbitCamera;
use constants::*;
use glam::Vec2;

#[test]
fn default_eye_looks_at_cake_from_above() {
    let cam = OrbitCamera::default();
    let eye = cam.eye();
    assert!((eye.distance(cam.target) - ORBIT_DEFAULT_DISTANCE).abs() < 1e-4);
    assert!(eye.y > cam.target.y);
}

#[test]
fn drag_is_ignored_while_disabled() {
    let mut cam = OrbitCamera::default();
    cam.enabled = false;
    let before = cam;
    assert!(!cam.drag(Vec2::new(50.0, 20.0)));
    assert!(!cam.zoom(100.0));
    cam.auto_rotate(1.0);
    assert_eq!(cam, before);
}

#[test]
fn pitch_and_distance_are_clamped() {
    let mut cam = OrbitCamera::default();
    assert!(cam.drag(Vec2::new(0.0, 1.0e6)));
    assert_eq!(cam.pitch, ORBIT_MAX_PITCH);
    cam.drag(Vec2::new(0.0, -1.0e6));
    assert_eq!(cam.pitch, ORBIT_MIN_PITCH);

    cam.zoom(1.0e6);
    assert_eq!(cam.distance, ORBIT_MAX_DISTANCE);
    cam.zoom(-1.0e6);
    assert_eq!(cam.distance, ORBIT_MIN_DISTANCE);
    assert!(!cam.zoom(f32::NAN));
}

#[test]
fn reset_keeps_enabled_flag() {
    let mut cam = OrbitCamera::default();
    cam.drag(Vec2::new(120.0, 30.0));
    cam.enabled = false;
    cam.reset();
    assert!(!cam.enabled);
    assert_eq!(cam.yaw, ORBIT_DEFAULT_YAW);
    assert_eq!(cam.distance, ORBIT_DEFAULT_DISTANCE);
}

#[test]
fn center_ray_hits_orbit_target() {
    let cam = OrbitCamera::default();
    let ray = cam.camera(1.5).ray_from_ndc(Vec2::ZERO);
    let to_target = (cam.target - ray.origin).normalize();
    assert!(ray.dir.dot(to_target) > 0.9999);
    assert_eq!(ray.origin, cam.eye());
}
