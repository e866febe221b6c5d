//! Photoconductive antenna explainer: the antenna is drawn, a wave packet
//! crosses it and emits a cone, then the view zooms in on the gap where a
//! laser pulse separates electrons and holes and a THz pulse leaves.

use std::f32::consts::PI;

use vizij_choreo_core::{
    math, Color, CommandDraft, Config, Easing, Geometry, NodeBuilder, NodeId, PlayOpts, Result, Scene,
    SceneScript, DEGREES, LEFT, ORIGIN, OUT, RIGHT,
};

use crate::centered_destination;

pub struct PhotoconductiveAntennaScene;

fn wave_packet(x: f32, t: f32) -> f32 {
    let amplitude = 0.5 * (-(x - t).powi(2)).exp();
    amplitude * (5.0 * (x - t)).sin()
}

fn thz_dummy_pulse(x: f32) -> f32 {
    x.sin().powi(63) * (x + 1.5).sin() * 8.0
}

/// Wave packet curve with its envelope at `tracker`.
fn wave_curve(tracker: f32) -> Result<Geometry> {
    Geometry::parametric(|t| [t, wave_packet(t + 7.0, tracker), 0.0], -5.0, -0.01, 0.01)
}

fn linear(run_time: f32) -> PlayOpts {
    PlayOpts::run_time(run_time).with_easing(Easing::Linear)
}

struct Antenna {
    silicon: NodeId,
    substrate: NodeId,
    electrodes: NodeId,
    circuit: NodeId,
}

fn build_antenna(scene: &mut Scene) -> Result<Antenna> {
    let semicircle = scene.add(NodeBuilder::new(Geometry::arc(1.0, 0.0, PI)))?;
    scene
        .graph_mut()
        .rotate(semicircle, OUT, -90.0 * DEGREES, Some(ORIGIN))?;
    let line = scene.add(NodeBuilder::new(Geometry::line([0.0, -1.0, 0.0], [0.0, 1.0, 0.0])))?;
    scene.graph_mut().next_to(semicircle, line, RIGHT, 0.0)?;
    scene.graph_mut().set_fill(semicircle, Color::GRAY, Some(0.5))?;
    let silicon = scene.group_named("silicon", &[line, semicircle])?;
    scene.graph_mut().set_fill(silicon, Color::GRAY, None)?;

    let substrate = scene.add(
        NodeBuilder::new(Geometry::rectangle(0.05, 2.0))
            .named("substrate")
            .color(Color::BLUE)
            .fill(Color::BLUE, 1.0),
    )?;
    scene.graph_mut().next_to(substrate, silicon, LEFT, 0.0)?;

    let electrode = |y: f32| {
        NodeBuilder::new(Geometry::rectangle(0.05, 0.8))
            .color(Color::ORANGE)
            .fill(Color::ORANGE, 1.0)
            .at([0.0, y, 0.0])
    };
    let anode = scene.add(electrode(0.5))?;
    let cathode = scene.add(electrode(-0.5))?;
    let electrodes = scene.group_named("electrodes", &[anode, cathode])?;
    scene.graph_mut().set_fill(electrodes, Color::ORANGE, None)?;
    scene.graph_mut().next_to(electrodes, substrate, LEFT, 0.0)?;

    let wires = [
        ([-0.075, 0.9], [-0.075, 1.5]),
        ([-0.075, 1.5], [-1.0, 1.5]),
        ([-1.0, 1.5], [-1.0, -0.6]),
        ([-1.3, -0.6], [-0.7, -0.6]),
        ([-1.2, -0.8], [-0.8, -0.8]),
        ([-1.0, -0.8], [-1.0, -1.5]),
        ([-1.0, -1.5], [-0.075, -1.5]),
        ([-0.075, -1.5], [-0.075, -0.9]),
    ];
    let mut wire_ids = Vec::with_capacity(wires.len());
    for ([x0, y0], [x1, y1]) in wires {
        wire_ids.push(scene.add(NodeBuilder::new(Geometry::line([x0, y0, 0.0], [x1, y1, 0.0])))?);
    }
    let circuit = scene.group_named("circuit", &wire_ids)?;

    Ok(Antenna {
        silicon,
        substrate,
        electrodes,
        circuit,
    })
}

impl SceneScript for PhotoconductiveAntennaScene {
    fn name(&self) -> &str {
        "pca"
    }

    fn config(&self) -> Config {
        Config {
            default_easing: Easing::Smooth,
            ..Config::default()
        }
    }

    fn construct(&self, scene: &mut Scene) -> Result<()> {
        let antenna = build_antenna(scene)?;
        let title = scene.add(NodeBuilder::new(Geometry::text("Photoconductive Antenna (PCA)")).named("title"))?;
        scene.graph_mut().move_to(title, [0.0, 2.5, 0.0])?;

        scene.play(
            &[
                CommandDraft::create(&[antenna.circuit]),
                CommandDraft::create(&[antenna.silicon]),
                CommandDraft::create(&[title]),
                CommandDraft::create(&[antenna.electrodes]),
                CommandDraft::create(&[antenna.substrate]),
            ],
            PlayOpts::default(),
        )?;

        // The packet's envelope sweeps from 0 to 9 along the curve.
        let wave = scene.add(NodeBuilder::new(wave_curve(0.0)?).named("wave").stroke(Color::RED, 4.0))?;
        let swept = scene.add(NodeBuilder::new(wave_curve(9.0)?).stroke(Color::RED, 4.0))?;
        scene.play(&[CommandDraft::create(&[wave])], PlayOpts::default())?;
        scene.play(&[CommandDraft::transform_into(wave, swept)], linear(1.0))?;

        let cone = scene.add(
            NodeBuilder::new(Geometry::polygon(vec![
                [0.1, 1.0, 0.0],
                [5.0, 0.0, 0.0],
                [0.1, -1.0, 0.0],
            ]))
            .named("cone")
            .color(Color::BLUE)
            .fill(Color::BLUE, 0.5),
        )?;
        scene.graph_mut().set_stroke(cone, None, 0.0)?;
        let center = scene
            .graph()
            .world_bounds(cone)?
            .map(|b| b.center())
            .unwrap_or(ORIGIN);
        scene.graph_mut().rotate(cone, OUT, 180.0 * DEGREES, Some(center))?;
        let left = scene
            .graph()
            .world_bounds(cone)?
            .map(|b| b.critical_point(LEFT))
            .unwrap_or(ORIGIN);
        scene.play(&[CommandDraft::grow_from_point(&[cone], left)], linear(1.0))?;
        scene.wait(1.0)?;

        scene.play(
            &[
                CommandDraft::fade_out(&[cone]),
                CommandDraft::fade_out(&[wave]),
                CommandDraft::fade_out(&[title]),
            ],
            PlayOpts::default(),
        )?;

        // Zoom in on the gap by scaling the whole antenna about its origin
        // and recentering it.
        let pca = scene.group_named(
            "pca",
            &[
                antenna.electrodes,
                antenna.silicon,
                antenna.circuit,
                antenna.substrate,
            ],
        )?;
        let factor = 30.0;
        let center = scene
            .graph()
            .world_bounds(pca)?
            .map(|b| b.center())
            .unwrap_or(ORIGIN);
        let destination = math::sub([-5.0, -0.1, 0.0], math::scale(center, factor));
        scene.play(
            &[
                CommandDraft::scale_by(&[pca], factor),
                CommandDraft::move_to(&[pca], destination),
            ],
            PlayOpts::run_time(2.0),
        )?;
        scene.wait(1.0)?;

        let mut arrows = Vec::new();
        for x in [-2.25, -2.80, -3.35] {
            arrows.push(scene.add(
                NodeBuilder::new(Geometry::arrow([x, 3.0, 0.0], [x, -3.0, 0.0]))
                    .stroke(Color::WHITE, 1.0)
                    .fill(Color::WHITE, 0.5),
            )?);
        }
        let field = scene.add(NodeBuilder::new(Geometry::tex(r"$\vec{E}$", 100.0)).named("field"))?;
        scene.graph_mut().move_to(field, [-4.5, 2.5, 0.0])?;
        scene.play(
            &[
                CommandDraft::fade_in(&[field]),
                CommandDraft::create(&[arrows[0]]),
                CommandDraft::create(&[arrows[1]]),
                CommandDraft::create(&[arrows[2]]),
            ],
            PlayOpts::default(),
        )?;
        scene.wait(1.0)?;

        let laser = scene.add(
            NodeBuilder::new(Geometry::line([-10.0, 0.0, 0.0], [-2.0, 0.0, 0.0]))
                .named("laser")
                .stroke(Color::RED, 100.0),
        )?;
        scene.play(&[CommandDraft::create(&[laser])], PlayOpts::default())?;

        let mut electrons = Vec::new();
        let mut holes = Vec::new();
        let mut labels = Vec::new();
        for i in 0..3 {
            let y = 0.5 + i as f32;
            let electron = scene.add(
                NodeBuilder::new(Geometry::circle(0.3))
                    .color(Color::ORANGE)
                    .fill(Color::ORANGE, 1.0)
                    .at([-1.25, y, 0.0]),
            )?;
            let hole = scene.add(
                NodeBuilder::new(Geometry::circle(0.3))
                    .color(Color::BLACK)
                    .fill(Color::BLACK, 1.0)
                    .at([-1.25, -y, 0.0]),
            )?;
            let label = scene.add(NodeBuilder::new(Geometry::tex(r"e$^{-}$", 48.0)))?;
            scene.graph_mut().move_to(label, [-1.25, y, 0.0])?;
            scene.play(
                &[
                    CommandDraft::fade_in(&[hole]),
                    CommandDraft::fade_in(&[electron]),
                    CommandDraft::fade_in(&[label]),
                ],
                PlayOpts::run_time(0.1),
            )?;
            electrons.push(electron);
            holes.push(hole);
            labels.push(label);
        }

        let pulse = scene.add_instant(
            NodeBuilder::new(Geometry::parametric(
                |t| [t, thz_dummy_pulse(t), 0.0],
                4.0,
                5.5,
                0.01,
            )?)
            .named("thz_pulse")
            .stroke(Color::BLUE, 4.0),
        )?;
        scene.graph_mut().move_to(pulse, [1.0, 0.0, 0.0])?;
        let pulse_to = centered_destination(scene.graph(), pulse, [10.0, 0.0, 0.0])?;

        let mut separation = vec![CommandDraft::fade_out(&[laser])];
        for &e in electrons.iter().chain(&labels) {
            separation.push(CommandDraft::move_to(&[e], centered_destination(scene.graph(), e, [-1.25, 2.5, 0.0])?));
        }
        for &h in &holes {
            separation.push(CommandDraft::move_to(&[h], [-1.25, -2.5, 0.0]));
        }
        separation.push(CommandDraft::move_to(&[pulse], pulse_to));
        scene.play(&separation, linear(1.0))?;

        let gone: Vec<NodeId> = holes.iter().chain(&labels).chain(&electrons).copied().collect();
        scene.play(&[CommandDraft::fade_out(&gone)], PlayOpts::run_time(0.1))?;
        scene.wait(1.0)?;
        Ok(())
    }
}
