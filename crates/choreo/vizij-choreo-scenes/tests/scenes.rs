use vizij_choreo_core::{run_script, Easing, Geometry, ShapeKind};
use vizij_choreo_scenes::{all_scripts, find_script, MorphTScene, PhotoconductiveAntennaScene};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

/// it should build every bundled scene without errors
#[test]
fn every_scene_builds() {
    for script in all_scripts() {
        let player = run_script(script.as_ref()).unwrap();
        assert!(player.total_duration() > 0.0, "{}", script.name());
        let end = player.state_at(player.total_duration());
        assert_eq!(end.nodes.len(), player.graph().len());
    }
    assert!(find_script("pca").is_some());
    assert!(find_script("nope").is_none());
}

/// it should morph the circle into the flattened pair of T shapes
#[test]
fn morph_t_ends_as_two_t_outlines() {
    let player = run_script(&MorphTScene).unwrap();
    // fade 1 + wait 1 + morph 1 + wait 2 + camera 2
    approx(player.total_duration(), 7.0, 1e-5);
    let circle = player.graph().find("circle").unwrap();

    let s = player.state_at(1.0);
    let c = s.node(circle).unwrap();
    assert_eq!(c.kind, ShapeKind::Circle);
    approx(c.world.opacity, 1.0, 1e-6);

    let s = player.state_at(3.0);
    let c = s.node(circle).unwrap();
    match &c.geometry {
        Geometry::Path { subpaths } => assert_eq!(subpaths.len(), 4),
        other => panic!("expected the flattened T outlines, got {other:?}"),
    }
    approx(c.local.style.fill_opacity, 1.0, 1e-6);
    assert!(!s.find("both_t").unwrap().world.visible);
}

/// it should orbit on both axes and stop phi with the script
#[test]
fn morph_t_camera_orbits() {
    let player = run_script(&MorphTScene).unwrap();
    let rate = 30.0_f32.to_radians();
    let c = player.state_at(5.0).camera;
    approx(c.phi, 0.0, 1e-6);
    let c = player.state_at(6.0).camera;
    approx(c.phi, rate, 1e-5);
    approx(c.theta, rate, 1e-5);
    let c = player.state_at(7.0).camera;
    approx(c.phi, 2.0 * rate, 1e-5);
}

/// it should zoom the antenna so its center lands at the requested point
#[test]
fn pca_zoom_recenters_antenna() {
    let player = run_script(&PhotoconductiveAntennaScene).unwrap();
    let pca = player.graph().find("pca").unwrap();
    let end = player.state_at(player.total_duration());
    let group = end.node(pca).unwrap();
    approx(group.world.transform.scale[0], 30.0, 1e-4);

    let bounds = player.graph().world_bounds(pca).unwrap().unwrap();
    let c = bounds.center();
    let world = group.world.transform.transform_point(c);
    approx(world[0], -5.0, 1e-3);
    approx(world[1], -0.1, 1e-3);

    assert!(!end.find("title").unwrap().world.visible);
    assert!(!end.find("cone").unwrap().world.visible);
    assert!(end.find("thz_pulse").unwrap().world.visible);
}

/// it should give the bundled scenes manim's smooth easing
#[test]
fn scenes_default_to_smooth_easing() {
    for script in all_scripts() {
        assert_eq!(script.config().default_easing, Easing::Smooth, "{}", script.name());
    }
}
