// Tier layout, baking look, picking and the retained scene diff.

use glam::{Mat4, Vec3};
use wishverse_core::mesh::MeshKey;
use wishverse_core::scene::*;
use wishverse_core::*;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

fn deco(id: &str, model: &str, kind: DecorationKind, pos: Vec3) -> Decoration {
    Decoration::new(DecorationId::new(id), model, kind, pos, "#88ccff")
}

#[test]
fn tiers_stack_and_shrink() {
    let tiers = tier_layouts(3);
    assert_eq!(tiers.len(), 3);
    for (i, t) in tiers.iter().enumerate() {
        assert!(approx(t.y, i as f32 * 1.2 * 0.85));
        assert!(approx(t.footprint, 1.0 - 0.2 * i as f32));
    }
    assert_eq!(tier_layouts(0).len(), 1);
    let five = tier_layouts(99);
    assert_eq!(five.len(), 5);
    assert!(five.iter().all(|t| t.footprint > 0.0));
}

#[test]
fn decoration_anchor_sits_above_top_tier() {
    assert!(approx(decoration_anchor_y(1), 0.15));
    assert!(approx(decoration_anchor_y(3), 2.0 * 1.02 + 0.15));
}

#[test]
fn parsed_colors_keep_srgb_encoding() {
    let grey = Rgb::parse("#808080").unwrap();
    assert!(approx(grey.r, 128.0 / 255.0));
    assert_eq!(grey, Rgb::from_u8(128, 128, 128));
    assert_eq!(grey.to_hex(), "#808080");
    // the baked tone is mixed in sRGB: 0.8 * 1.0 + 0.2 * (0xd4 / 255)
    let done = baked_tone(Rgb::WHITE);
    assert!(approx(done.r, 0.8 + 0.2 * 212.0 / 255.0));
    assert_eq!(Rgb::parse_or_default("pink"), Rgb::parse("#fce7f3").unwrap());
}

#[test]
fn baking_look_interpolates_color_and_scale() {
    let base = Rgb::parse("#ffffff").unwrap();
    let idle = BakingLook::at(base, None);
    assert_eq!(idle.scale, 1.0);
    assert_eq!(idle.color, base);

    let start = BakingLook::at(base, Some(0.0));
    assert!(approx(start.scale, 0.8));
    assert_eq!(start.color, base);

    let done = BakingLook::at(base, Some(1.0));
    assert!(approx(done.scale, 1.0));
    let tone = Rgb::parse("#d4a373").unwrap();
    assert!(approx(done.color.r, 0.8 + 0.2 * tone.r));
    assert!(approx(done.color.g, 0.8 + 0.2 * tone.g));
    assert!(approx(done.color.b, 0.8 + 0.2 * tone.b));

    let half = BakingLook::at(base, Some(0.5));
    assert!(approx(half.scale, 0.9));
    assert!(half.color.b < base.b && half.color.b > done.color.b);
}

#[test]
fn round_tier_transform_places_cylinder() {
    let config = CakeConfig {
        layers: Some(2),
        ..CakeConfig::default()
    };
    let animator = Animator::default();
    let view = SceneView {
        baking_progress: None,
        active: None,
        animator: &animator,
    };
    let nodes = build_scene(&config, &view);
    let tiers: Vec<_> = nodes.iter().filter(|n| matches!(n.key, NodeKey::Tier(_))).collect();
    assert_eq!(tiers.len(), 2);
    assert!(tiers.iter().all(|n| n.mesh == MeshKey::TierRound));

    // second tier: centre at -0.5 + 1.02 + 0.6, footprint 0.8
    let centre = tiers[1].transform.transform_point3(Vec3::ZERO);
    assert!((centre - Vec3::new(0.0, -0.5 + 1.02 + 0.6, 0.0)).length() < 1e-5);
    let rim = tiers[1].transform.transform_point3(Vec3::new(1.5, 0.0, 0.0));
    assert!(approx(rim.x, 1.2));
}

#[test]
fn heart_tier_uses_extrusion_transform() {
    let m = tier_shape_transform(ShapeKind::Heart);
    let origin = m.transform_point3(Vec3::ZERO);
    assert!((origin - Vec3::new(-1.2, 1.0, 1.0)).length() < 1e-5);
    // extrusion depth (+z) maps onto +y after the quarter turn about x and half turn about y
    let depth_axis = m.transform_vector3(Vec3::Z).normalize();
    assert!((depth_axis.y.abs() - 1.0).abs() < 1e-5);
    assert!(approx(m.transform_vector3(Vec3::X).length(), 0.15));
}

#[test]
fn custom_tier_mesh_key_tracks_points() {
    let a = CakeConfig {
        shape: Some(ShapeKind::Custom),
        custom_path: Some(vec![[0.0, 0.0], [2.0, 0.0], [2.0, 2.0]]),
        ..CakeConfig::default()
    };
    let mut b = a.clone();
    b.custom_path = Some(vec![[0.0, 0.0], [3.0, 0.0], [2.0, 2.0]]);
    assert_ne!(tier_mesh(&a), tier_mesh(&b));
    assert_eq!(tier_mesh(&a), tier_mesh(&a.clone()));
}

#[test]
fn catalog_models_map_to_geometry() {
    assert_eq!(
        model_spec("strawberry", DecorationKind::Static).mesh,
        Some(MeshKey::sphere(0.2, 16, 16))
    );
    assert!(model_spec("candle_basic", DecorationKind::Static).flame);
    assert!(model_spec("disco_ball", DecorationKind::Dynamic).spins);
    assert!(model_spec("falling_frosting", DecorationKind::Dynamic).mesh.is_none());
    assert_eq!(
        model_spec("mystery", DecorationKind::Static).mesh,
        Some(MeshKey::cuboid(0.2, 0.2, 0.2))
    );
}

#[test]
fn active_decoration_gets_ring_and_glow() {
    let config = CakeConfig {
        decorations: Some(vec![deco("a", "candle_basic", DecorationKind::Static, Vec3::ZERO)]),
        ..CakeConfig::default()
    };
    let animator = Animator::default();
    let id = DecorationId::new("a");
    let view = SceneView {
        baking_progress: None,
        active: Some(&id),
        animator: &animator,
    };
    let nodes = build_scene(&config, &view);
    assert!(nodes.iter().any(|n| n.key == NodeKey::Selection(id.clone())));
    assert!(nodes.iter().any(|n| n.key == NodeKey::Flame(id.clone())));
    let body = nodes.iter().find(|n| n.key == NodeKey::Decoration(id.clone())).unwrap();
    assert!(body.material.emissive.r > 0.0);

    let idle = SceneView { active: None, ..view };
    let nodes = build_scene(&config, &idle);
    assert!(!nodes.iter().any(|n| matches!(n.key, NodeKey::Selection(_))));
}

#[test]
fn pick_returns_nearest_hit() {
    let decos = vec![
        deco("far", "strawberry", DecorationKind::Static, Vec3::new(0.0, 0.0, -2.0)),
        deco("near", "strawberry", DecorationKind::Static, Vec3::new(0.0, 0.0, 2.0)),
        deco("off", "strawberry", DecorationKind::Static, Vec3::new(5.0, 0.0, 0.0)),
    ];
    let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
    assert_eq!(pick_decoration(&ray, &decos).map(|d| d.id.as_str()), Some("near"));
    let miss = Ray::new(Vec3::new(0.0, 3.0, 10.0), Vec3::NEG_Z);
    assert!(pick_decoration(&miss, &decos).is_none());
}

#[test]
fn pick_radius_scales_with_decoration() {
    let mut d = deco("a", "strawberry", DecorationKind::Static, Vec3::ZERO);
    let ray = Ray::new(Vec3::new(0.5, 0.0, 10.0), Vec3::NEG_Z);
    assert!(pick_decoration(&ray, std::slice::from_ref(&d)).is_none());
    d.scale = 3.0;
    assert!(pick_decoration(&ray, std::slice::from_ref(&d)).is_some());
}

#[test]
fn animator_spins_only_disco_balls() {
    let decos = vec![
        deco("disco", "disco_ball", DecorationKind::Dynamic, Vec3::ZERO),
        deco("berry", "strawberry", DecorationKind::Static, Vec3::ZERO),
    ];
    let mut a = Animator::default();
    a.advance(0.5, &decos);
    assert!(approx(a.spin(&DecorationId::new("disco")), 1.5));
    assert_eq!(a.spin(&DecorationId::new("berry")), 0.0);
    a.advance(0.5, &decos[1..]);
    assert_eq!(a.spin(&DecorationId::new("disco")), 0.0);
}

fn node(key: NodeKey, x: f32) -> SceneNode {
    SceneNode {
        key,
        mesh: MeshKey::TierRound,
        transform: Mat4::from_translation(Vec3::new(x, 0.0, 0.0)),
        material: Material::standard(Rgb::WHITE),
    }
}

#[test]
fn retained_scene_reports_only_changes() {
    let mut scene = RetainedScene::new();
    let ops = scene.update(vec![node(NodeKey::Tier(0), 0.0), node(NodeKey::Tier(1), 1.0)]);
    assert_eq!(ops.len(), 2);
    assert!(ops.iter().all(|op| matches!(op, SceneOp::Add(_))));

    let ops = scene.update(vec![node(NodeKey::Tier(0), 0.0), node(NodeKey::Tier(1), 1.0)]);
    assert!(ops.is_empty());

    let ops = scene.update(vec![node(NodeKey::Tier(0), 0.5)]);
    assert_eq!(ops.len(), 2);
    assert!(matches!(&ops[0], SceneOp::Update(n) if n.key == NodeKey::Tier(0)));
    assert!(matches!(&ops[1], SceneOp::Remove(NodeKey::Tier(1))));
    assert_eq!(scene.len(), 1);

    let ops = scene.clear();
    assert_eq!(ops.as_slice(), &[SceneOp::Remove(NodeKey::Tier(0))]);
    assert!(scene.is_empty());
}

#[test]
fn dragging_a_decoration_updates_one_node() {
    let mut config = CakeConfig {
        layers: Some(2),
        decorations: Some(vec![
            deco("a", "strawberry", DecorationKind::Static, Vec3::ZERO),
            deco("b", "pearl", DecorationKind::Static, Vec3::X),
        ]),
        ..CakeConfig::default()
    };
    let animator = Animator::default();
    let view = SceneView {
        baking_progress: None,
        active: None,
        animator: &animator,
    };
    let mut scene = RetainedScene::new();
    scene.update(build_scene(&config, &view));

    config.merge_decoration(&DecorationId::new("b"), &DecorationPatch::position(Vec3::new(0.5, 0.0, 0.5)));
    let ops = scene.update(build_scene(&config, &view));
    assert_eq!(ops.len(), 1);
    assert!(matches!(&ops[0], SceneOp::Update(n) if n.key == NodeKey::Decoration(DecorationId::new("b"))));
}
