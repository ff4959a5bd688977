// Host-side tests for frame time splitting.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}
mod clock {
    include!("../src/clock.rs");
}

use clock::FrameStep;
use constants::MAX_FRAME_DT_MS;
use wishverse_core::{CakeConfig, Screen, Wizard, WizardEvent};

fn baking_wizard() -> Wizard {
    let mut w = Wizard::new();
    w.start().unwrap();
    w.finish(CakeConfig {
        image_url: "data:image/png;base64,AAAA".into(),
        message: "Hi".into(),
        ..CakeConfig::default()
    })
    .unwrap();
    w
}

/// Drive the wizard the way the frame loop does; wall ms until Final.
fn wall_ms_to_final(frame_ms: u128) -> u128 {
    let mut w = baking_wizard();
    let mut wall = 0;
    while w.screen() != Screen::Final {
        wall += frame_ms;
        let step = FrameStep::from_elapsed_ms(frame_ms);
        w.tick(step.wizard_ms);
        assert!(wall < 60_000, "bake never finished");
    }
    wall
}

#[test]
fn animation_step_is_capped_but_wizard_time_is_not() {
    let step = FrameStep::from_elapsed_ms(5_000);
    assert_eq!(step.wizard_ms, 5_000);
    assert_eq!(step.anim_dt_sec, MAX_FRAME_DT_MS as f32 / 1000.0);

    let step = FrameStep::from_elapsed_ms(16);
    assert_eq!(step.wizard_ms, 16);
    assert!((step.anim_dt_sec - 0.016).abs() < 1e-6);
}

#[test]
fn bake_takes_the_same_wall_time_at_any_frame_rate() {
    assert_eq!(wall_ms_to_final(16), 4_000);
    // two frames per second
    assert_eq!(wall_ms_to_final(500), 4_000);
    // one frame after a long background stall
    assert_eq!(wall_ms_to_final(10_000), 10_000);
}

#[test]
fn stalled_frame_still_chimes_once() {
    let mut w = baking_wizard();
    let events = w.tick(FrameStep::from_elapsed_ms(10_000).wizard_ms);
    assert_eq!(events.iter().filter(|e| **e == WizardEvent::Chime).count(), 1);
    assert!(events.contains(&WizardEvent::Finished));
}

#[test]
fn huge_elapsed_saturates() {
    assert_eq!(FrameStep::from_elapsed_ms(u128::MAX).wizard_ms, u32::MAX);
}
