// Host-side tests for pure input functions.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod input {
    include!("../src/input.rs");
}

use glam::Vec2;
use input::*;

#[test]
fn css_to_ndc_maps_corners_and_center() {
    let tl = css_to_ndc(0.0, 0.0, 200.0, 100.0).unwrap();
    assert_eq!(tl, Vec2::new(-1.0, 1.0));
    let br = css_to_ndc(200.0, 100.0, 200.0, 100.0).unwrap();
    assert_eq!(br, Vec2::new(1.0, -1.0));
    let c = css_to_ndc(100.0, 50.0, 200.0, 100.0).unwrap();
    assert!(c.length() < 1e-6);
}

#[test]
fn css_to_ndc_rejects_empty_canvas() {
    assert!(css_to_ndc(10.0, 10.0, 0.0, 100.0).is_none());
    assert!(css_to_ndc(10.0, 10.0, 100.0, -1.0).is_none());
}

#[test]
fn aspect_never_divides_by_zero() {
    assert_eq!(aspect(1600, 800), 2.0);
    assert_eq!(aspect(0, 0), 1.0);
}

#[test]
fn orbit_drag_reports_deltas_for_its_pointer_only() {
    let mut drag = OrbitDrag::default();
    assert!(drag.step(1, Vec2::new(5.0, 5.0)).is_none());

    drag.begin(1, Vec2::new(10.0, 10.0));
    assert_eq!(drag.step(1, Vec2::new(14.0, 7.0)), Some(Vec2::new(4.0, -3.0)));
    assert_eq!(drag.step(1, Vec2::new(14.0, 7.0)), Some(Vec2::ZERO));
    // a second finger does not steer the orbit
    assert!(drag.step(2, Vec2::new(100.0, 100.0)).is_none());

    drag.end();
    assert!(drag.step(1, Vec2::new(20.0, 20.0)).is_none());
}

#[test]
fn key_bindings() {
    assert_eq!(action_for_key("Escape"), Some(KeyAction::Release));
    assert_eq!(action_for_key("Delete"), Some(KeyAction::RemoveActive));
    assert_eq!(action_for_key("Backspace"), Some(KeyAction::RemoveActive));
    assert_eq!(action_for_key("r"), Some(KeyAction::ResetCamera));
    assert_eq!(action_for_key("R"), Some(KeyAction::ResetCamera));
    assert_eq!(action_for_key("x"), None);
}
