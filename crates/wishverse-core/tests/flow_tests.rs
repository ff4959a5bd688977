// Wizard transitions, baking timeline and the creator session.

use wishverse_core::creator::*;
use wishverse_core::generate::GenerationError;
use wishverse_core::*;

fn finished_config() -> CakeConfig {
    CakeConfig {
        image_url: "data:image/png;base64,AAAA".into(),
        prompt: "strawberry".into(),
        message: "Happy birthday".into(),
        ..CakeConfig::default()
    }
}

#[test]
fn full_wizard_cycle() {
    let mut w = Wizard::new();
    assert_eq!(w.screen(), Screen::Home);
    w.start().unwrap();
    assert_eq!(w.screen(), Screen::Creator);
    w.finish(finished_config()).unwrap();
    assert_eq!(w.screen(), Screen::Baking);
    assert_eq!(w.baking_progress(), Some(0.0));

    let mut events = Vec::new();
    for _ in 0..80 {
        events.extend(w.tick(50));
    }
    assert_eq!(w.screen(), Screen::Final);
    assert_eq!(events.iter().filter(|e| **e == WizardEvent::Chime).count(), 1);
    assert_eq!(events.last(), Some(&WizardEvent::Finished));
    assert_eq!(w.config().message, "Happy birthday");

    w.set_message("edited").unwrap();
    assert_eq!(w.config().message, "edited");

    w.restart().unwrap();
    assert_eq!(w.screen(), Screen::Home);
    assert_eq!(w.config(), &CakeConfig::default());
}

#[test]
fn finish_requires_generated_image() {
    let mut w = Wizard::new();
    w.start().unwrap();
    assert_eq!(w.finish(CakeConfig::default()), Err(WizardError::MissingImage));
    assert_eq!(w.screen(), Screen::Creator);
}

#[test]
fn invalid_transitions_change_nothing() {
    let mut w = Wizard::new();
    assert!(matches!(w.finish(finished_config()), Err(WizardError::InvalidTransition { from: Screen::Home, .. })));
    assert!(w.restart().is_err());
    assert!(w.back().is_err());
    assert!(w.set_message("x").is_err());
    assert_eq!(w.screen(), Screen::Home);
    assert!(w.tick(10_000).is_empty());

    w.start().unwrap();
    assert!(w.start().is_err());
    w.back().unwrap();
    assert_eq!(w.screen(), Screen::Home);
}

#[test]
fn baking_timeline_steps() {
    let mut w = Wizard::new();
    w.start().unwrap();
    w.finish(finished_config()).unwrap();

    // partial steps do not advance progress
    assert!(w.tick(49).is_empty());
    assert_eq!(w.tick(1).as_slice(), &[WizardEvent::Progress(1.0 / 60.0)]);

    let events = w.tick(2950);
    assert_eq!(events.as_slice(), &[WizardEvent::Progress(1.0), WizardEvent::Chime]);
    assert_eq!(w.screen(), Screen::Baking);

    assert!(w.tick(999).is_empty());
    assert_eq!(w.tick(1).as_slice(), &[WizardEvent::Finished]);
    assert_eq!(w.screen(), Screen::Final);
    assert_eq!(w.baking_progress(), None);
}

#[test]
fn one_huge_tick_runs_the_whole_bake() {
    let mut w = Wizard::new();
    w.start().unwrap();
    w.finish(finished_config()).unwrap();
    let events = w.tick(u32::MAX);
    assert_eq!(
        events.as_slice(),
        &[WizardEvent::Progress(1.0), WizardEvent::Chime, WizardEvent::Finished]
    );
}

#[test]
fn bake_progress_is_whole_steps() {
    assert_eq!(bake_progress(0), 0.0);
    assert_eq!(bake_progress(1500), 0.5);
    assert_eq!(bake_progress(3000), 1.0);
    assert_eq!(bake_progress(9000), 1.0);
}

// ---------------- creator ----------------

#[test]
fn generation_needs_input_and_no_request_in_flight() {
    let mut s = CreatorSession::new();
    assert!(!s.can_generate());
    assert!(s.begin_generation().is_none());

    s.prompt = "pink wings".into();
    let (_, req) = s.begin_generation().unwrap();
    assert_eq!(req.reference, None);
    assert!(!req.refinement);
    assert!(s.is_generating());
    assert!(s.begin_generation().is_none());
}

#[test]
fn upload_wins_over_previous_image() {
    let mut s = CreatorSession::new();
    s.prompt = "first".into();
    let (ticket, _) = s.begin_generation().unwrap();
    s.complete_generation(ticket, Ok("data:image/png;base64,R0VO".into()));

    // prior image only: refinement
    let (ticket, req) = s.begin_generation().unwrap();
    assert_eq!(req.reference.as_deref(), Some("data:image/png;base64,R0VO"));
    assert!(req.refinement);
    s.complete_generation(ticket, Err(GenerationError::NoImage));

    // an upload always wins, refinement off
    s.set_upload(Some("data:image/jpeg;base64,VVBM".into()));
    let (_, req) = s.begin_generation().unwrap();
    assert_eq!(req.reference.as_deref(), Some("data:image/jpeg;base64,VVBM"));
    assert!(!req.refinement);
}

#[test]
fn success_stores_image_and_moves_to_preview() {
    let mut s = CreatorSession::new();
    s.prompt = "matcha".into();
    let (ticket, _) = s.begin_generation().unwrap();
    assert_eq!(
        s.complete_generation(ticket, Ok("data:image/png;base64,QQ==".into())),
        GenerationOutcome::Stored
    );
    assert_eq!(s.step(), CreatorStep::Preview);
    assert_eq!(s.cake_image(), Some("data:image/png;base64,QQ=="));
    assert!(s.prompt.is_empty());
    assert!(!s.is_generating());
}

#[test]
fn failure_keeps_prior_image() {
    let mut s = CreatorSession::new();
    s.prompt = "one".into();
    let (ticket, _) = s.begin_generation().unwrap();
    s.complete_generation(ticket, Ok("data:image/png;base64,T0xE".into()));
    s.back_to_generate();

    s.prompt = "two".into();
    let (ticket, _) = s.begin_generation().unwrap();
    let outcome = s.complete_generation(
        ticket,
        Err(GenerationError::Status {
            status: 500,
            body: "boom".into(),
        }),
    );
    assert_eq!(outcome, GenerationOutcome::Failed(GENERATION_FAILED_NOTICE));
    assert_eq!(s.cake_image(), Some("data:image/png;base64,T0xE"));
    assert_eq!(s.step(), CreatorStep::Generate);
    assert_eq!(s.prompt, "two");
    assert!(!s.is_generating());
}

#[test]
fn response_for_a_replaced_session_is_dropped() {
    let mut old = CreatorSession::new();
    old.prompt = "lemon".into();
    let (ticket, _) = old.begin_generation().unwrap();

    // back to Home and Start again: a fresh session with its own request
    let mut s = CreatorSession::new();
    s.prompt = "peach".into();
    let (current, _) = s.begin_generation().unwrap();

    let outcome = s.complete_generation(ticket, Ok("data:image/png;base64,T0xE".into()));
    assert_eq!(outcome, GenerationOutcome::Discarded);
    assert_eq!(s.cake_image(), None);
    assert_eq!(s.step(), CreatorStep::Generate);
    assert_eq!(s.prompt, "peach");
    assert!(s.is_generating());
    assert!(s.begin_generation().is_none());

    assert_eq!(
        s.complete_generation(current, Ok("data:image/png;base64,TkVX".into())),
        GenerationOutcome::Stored
    );
    assert_eq!(s.cake_image(), Some("data:image/png;base64,TkVX"));
}

#[test]
fn response_is_settled_only_once() {
    let mut s = CreatorSession::new();
    s.prompt = "mango".into();
    let (ticket, _) = s.begin_generation().unwrap();
    s.complete_generation(ticket, Err(GenerationError::NoImage));
    assert_eq!(
        s.complete_generation(ticket, Ok("data:image/png;base64,TEFURQ==".into())),
        GenerationOutcome::Discarded
    );
    assert_eq!(s.cake_image(), None);
}

#[test]
fn card_steps_and_save() {
    let mut s = CreatorSession::new();
    assert!(!s.open_card());
    s.set_upload(Some("data:image/jpeg;base64,VVBM".into()));
    s.prompt = "chocolate".into();
    let (ticket, _) = s.begin_generation().unwrap();
    s.complete_generation(ticket, Ok("data:image/png;base64,Q0FLRQ==".into()));
    assert!(s.open_card());
    assert_eq!(s.step(), CreatorStep::Card);

    s.message = "   ".into();
    assert_eq!(s.save_card(), Err(SaveError::EmptyMessage));

    s.message = "For you".into();
    s.set_layers(3);
    let config = s.save_card().unwrap();
    assert_eq!(config.image_url, "data:image/png;base64,Q0FLRQ==");
    assert_eq!(config.original_image.as_deref(), Some("data:image/jpeg;base64,VVBM"));
    assert_eq!(config.prompt, "chocolate");
    assert_eq!(config.message, "For you");
    assert_eq!(config.layer_count(), 3);

    assert!(s.back_to_generate());
    assert_eq!(s.step(), CreatorStep::Generate);
}

#[test]
fn draft_editing() {
    let mut s = CreatorSession::new();
    assert_eq!(s.cycle_shape(), ShapeKind::Square);
    assert_eq!(s.set_layers(0), 1);
    assert_eq!(s.set_layers(9), 5);
    assert!(s.set_color("#FECACA"));
    assert!(!s.set_color("pink"));
    assert_eq!(s.draft().color.as_deref(), Some("#fecaca"));

    let a = s.add_decoration("strawberry").unwrap();
    let b = s.add_decoration("disco_ball").unwrap();
    assert_ne!(a, b);
    assert!(s.add_decoration("not-a-model").is_none());
    let list = s.draft().decoration_list();
    assert_eq!(list.len(), 2);
    assert_eq!(list[1].kind, DecorationKind::Dynamic);
    assert!(list.iter().all(|d| d.position[1] == 0.0));

    assert!(s.remove_decoration(&a));
    assert!(!s.remove_decoration(&a));
    assert_eq!(s.draft().decoration_list().len(), 1);
}

#[test]
fn decorations_on_a_tall_cake_stay_on_the_top_tier() {
    let mut s = CreatorSession::new();
    s.set_layers(3);
    let ids: Vec<_> = (0..6).map(|_| s.add_decoration("cherry").unwrap()).collect();
    let list = s.draft().decoration_list();
    assert_eq!(list.len(), ids.len());
    // top tier of three has radius 1.5 * 0.6; placements stay within 80% of it
    let limit = 1.5 * 0.6 * 0.8 + 1e-5;
    for d in list {
        assert_eq!(d.position[1], 0.0);
        assert!(d.position[0].hypot(d.position[2]) <= limit);
    }
}

#[test]
fn session_merges_manipulation_patches() {
    let mut s = CreatorSession::new();
    let id = s.add_decoration("pearl").unwrap();
    let deco = s.draft().decoration(&id).unwrap().clone();

    let mut m = Manipulator::new();
    m.begin(&deco, &mut s);
    assert!(!s.orbit_enabled());
    m.wheel(-100.0, &mut s);
    m.end(&mut s);
    assert!(s.orbit_enabled());
    assert!((s.draft().decoration(&id).unwrap().scale - 1.5).abs() < 1e-6);
}

#[test]
fn placement_spreads_within_radius() {
    assert_eq!(placement(0, 1.0), glam::Vec3::ZERO);
    for i in 1..40 {
        let p = placement(i, 1.0);
        assert_eq!(p.y, 0.0);
        assert!(glam::Vec2::new(p.x, p.z).length() <= 1.0 + 1e-5);
    }
}
