use std::f32::consts::{FRAC_PI_2, PI};

use vizij_choreo_core::{
    CameraAxis, CameraState, Color, CommandDraft, Config, Easing, Geometry, NodeBuilder, Player,
    ShapeKind, OUT,
};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn approx3(a: [f32; 3], b: [f32; 3], eps: f32) {
    for i in 0..3 {
        approx(a[i], b[i], eps);
    }
}

fn linear_player() -> Player {
    Player::new(Config {
        default_easing: Easing::Linear,
        ..Config::default()
    })
}

#[test]
fn shift_moves_by_offset_from_current_position() {
    let mut p = linear_player();
    let a = p.add_node(NodeBuilder::new(Geometry::square(1.0)).at([1.0, 1.0, 0.0])).unwrap();
    p.schedule(&CommandDraft::shift(&[a], [2.0, 0.0, 0.0]).duration(2.0)).unwrap();
    p.schedule(&CommandDraft::shift(&[a], [0.0, -1.0, 0.0]).start(2.0)).unwrap();
    approx3(p.state_at(1.0).node(a).unwrap().local.transform.position, [2.0, 1.0, 0.0], 1e-6);
    approx3(p.state_at(3.0).node(a).unwrap().local.transform.position, [3.0, 0.0, 0.0], 1e-6);
}

#[test]
fn rotate_about_point_swings_position() {
    let mut p = linear_player();
    let a = p.add_node(NodeBuilder::new(Geometry::square(0.2)).at([1.0, 0.0, 0.0])).unwrap();
    p.schedule(&CommandDraft::rotate(&[a], FRAC_PI_2).axis(OUT).about([0.0, 0.0, 0.0]))
        .unwrap();
    let t = p.state_at(1.0).node(a).unwrap().local.transform;
    approx3(t.position, [0.0, 1.0, 0.0], 1e-5);
    // quarter turn about z
    approx(t.rotation[2], (PI / 4.0).sin(), 1e-5);
    approx(t.rotation[3], (PI / 4.0).cos(), 1e-5);
}

#[test]
fn grow_from_point_scales_up_from_the_point() {
    let mut p = linear_player();
    let a = p
        .add_node(NodeBuilder::new(Geometry::circle(1.0)).at([2.0, 0.0, 0.0]).hidden())
        .unwrap();
    p.schedule(&CommandDraft::grow_from_point(&[a], [0.0, 0.0, 0.0]).start(1.0))
        .unwrap();
    assert!(!p.state_at(0.5).node(a).unwrap().world.visible);
    let mid = p.state_at(1.5).node(a).unwrap().local;
    assert!(mid.visible);
    approx3(mid.transform.scale, [0.5, 0.5, 0.5], 1e-6);
    approx3(mid.transform.position, [1.0, 0.0, 0.0], 1e-6);
    let end = p.state_at(2.0).node(a).unwrap().local;
    approx3(end.transform.scale, [1.0, 1.0, 1.0], 1e-6);
    approx3(end.transform.position, [2.0, 0.0, 0.0], 1e-6);
}

#[test]
fn create_reveals_and_remove_hides() {
    let mut p = linear_player();
    let a = p.add_node(NodeBuilder::new(Geometry::arc(1.0, 0.0, PI)).hidden()).unwrap();
    p.schedule(&CommandDraft::create(&[a]).duration(2.0)).unwrap();
    p.schedule(&CommandDraft::remove(&[a]).start(3.0).duration(0.0)).unwrap();

    let s = p.state_at(0.5);
    assert!(s.node(a).unwrap().is_drawn());
    approx(s.node(a).unwrap().world.reveal, 0.25, 1e-6);
    assert_eq!(p.state_at(2.5).node(a).unwrap().world.reveal, 1.0);
    assert!(!p.state_at(3.0).node(a).unwrap().world.visible);
    assert_eq!(p.state_at(3.0).drawn().count(), 0);
}

#[test]
fn fill_to_blends_color_and_opacity() {
    let mut p = linear_player();
    let a = p
        .add_node(NodeBuilder::new(Geometry::square(1.0)).fill(Color::BLACK, 0.0))
        .unwrap();
    p.schedule(&CommandDraft::fill_to(&[a], Color::WHITE).opacity(1.0)).unwrap();
    let style = p.state_at(0.5).node(a).unwrap().local.style;
    approx(style.fill_color.0[0], 0.5, 1e-6);
    approx(style.fill_opacity, 0.5, 1e-6);
    assert_eq!(style.stroke_color, Color::WHITE);
}

#[test]
fn transform_into_morphs_then_adopts_target() {
    let mut p = linear_player();
    let src = p
        .add_node(NodeBuilder::new(Geometry::circle(1.0)).stroke(Color::RED, 2.0))
        .unwrap();
    let dst = p
        .add_node(
            NodeBuilder::new(Geometry::square(2.0))
                .at([3.0, 0.0, 0.0])
                .stroke(Color::BLUE, 6.0)
                .hidden(),
        )
        .unwrap();
    p.schedule(&CommandDraft::transform_into(src, dst).duration(2.0)).unwrap();

    let mid = p.state_at(1.0);
    let n = mid.node(src).unwrap();
    assert_eq!(n.kind, ShapeKind::Path);
    match &n.geometry {
        Geometry::Path { subpaths } => {
            assert_eq!(subpaths.len(), 1);
            assert_eq!(subpaths[0].len(), p.config().morph_samples);
        }
        other => panic!("expected a path, got {other:?}"),
    }
    approx(n.local.style.stroke_width, 4.0, 1e-6);
    approx3(n.local.transform.position, [1.5, 0.0, 0.0], 1e-6);
    assert!(!mid.node(dst).unwrap().world.visible);

    let end = p.state_at(2.0);
    let n = end.node(src).unwrap();
    assert_eq!(n.geometry, Geometry::square(2.0));
    assert_eq!(n.kind, ShapeKind::Rectangle);
    for (got, want) in n.local.style.stroke_color.0.iter().zip(Color::BLUE.0) {
        approx(*got, want, 1e-6);
    }
    // the node's own geometry is untouched
    assert_eq!(p.node(src).unwrap().geometry(), &Geometry::circle(1.0));
}

#[test]
fn transform_into_itself_is_rejected() {
    let mut p = linear_player();
    let a = p.add_node(NodeBuilder::new(Geometry::circle(1.0))).unwrap();
    assert!(p.schedule(&CommandDraft::transform_into(a, a)).is_err());
}

#[test]
fn wait_only_extends_duration() {
    let mut p = linear_player();
    let a = p.add_node(NodeBuilder::new(Geometry::circle(1.0))).unwrap();
    let before = p.state_at(0.0);
    p.schedule(&CommandDraft::wait().start(1.0).duration(2.0)).unwrap();
    assert_eq!(p.total_duration(), 3.0);
    assert_eq!(p.state_at(2.0).node(a), before.node(a));
}

#[test]
fn easing_reshapes_progress() {
    let mut p = Player::new(Config::default());
    let a = p.add_node(NodeBuilder::new(Geometry::circle(1.0))).unwrap();
    let b = p.add_node(NodeBuilder::new(Geometry::circle(1.0))).unwrap();
    p.schedule(&CommandDraft::move_to(&[a], [1.0, 0.0, 0.0]).easing(Easing::EaseIn))
        .unwrap();
    p.schedule(&CommandDraft::move_to(&[b], [1.0, 0.0, 0.0]).easing(Easing::ThereAndBack))
        .unwrap();
    let s = p.state_at(0.5);
    approx(s.node(a).unwrap().local.transform.position[0], 0.25, 1e-6);
    approx(s.node(b).unwrap().local.transform.position[0], 1.0, 1e-5);
    let s = p.state_at(1.0);
    approx(s.node(b).unwrap().local.transform.position[0], 0.0, 1e-6);
}

#[test]
fn camera_rotation_is_linear_in_time() {
    let mut p = Player::new(Config::default());
    p.set_camera(CameraState::new(75.0_f32.to_radians(), 30.0_f32.to_radians()));
    p.schedule(
        &CommandDraft::rotate_camera(CameraAxis::Theta, 0.2)
            .start(1.0)
            .duration(10.0),
    )
    .unwrap();
    let theta0 = 30.0_f32.to_radians();
    approx(p.state_at(0.5).camera.theta, theta0, 1e-6);
    approx(p.state_at(6.0).camera.theta, theta0 + 1.0, 1e-5);
    approx(p.state_at(20.0).camera.theta, theta0 + 2.0, 1e-5);
    approx(p.state_at(20.0).camera.phi, 75.0_f32.to_radians(), 1e-6);
}
