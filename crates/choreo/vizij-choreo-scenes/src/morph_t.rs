//! A filled circle fades in, morphs into two stacked "T" shapes, and the
//! camera starts orbiting.

use vizij_choreo_core::{
    CameraAxis, Color, CommandDraft, Config, Easing, Geometry, NodeBuilder, NodeId, PlayOpts,
    Result, Scene, SceneScript, DEGREES, DOWN, ORIGIN, UP,
};

pub struct MorphTScene;

/// Vertical and horizontal bars of one T; `flipped` puts the bar underneath.
fn t_shape(scene: &mut Scene, flipped: bool) -> Result<NodeId> {
    let stem = scene.add(NodeBuilder::new(Geometry::rectangle(0.5, 1.0)).color(Color::ORANGE))?;
    let bar = scene.add(NodeBuilder::new(Geometry::rectangle(2.0, 0.5)).color(Color::ORANGE))?;
    let side = if flipped { DOWN } else { UP };
    scene.graph_mut().next_to(bar, stem, side, 0.0)?;
    scene.group(&[stem, bar])
}

impl SceneScript for MorphTScene {
    fn name(&self) -> &str {
        "morph_t"
    }

    fn config(&self) -> Config {
        Config {
            default_easing: Easing::Smooth,
            ..Config::default()
        }
    }

    fn construct(&self, scene: &mut Scene) -> Result<()> {
        scene.set_camera_orientation(0.0, 0.0, None)?;

        let circle = scene.add(
            NodeBuilder::new(Geometry::circle(1.0))
                .named("circle")
                .stroke(Color::RED, 4.0)
                .fill(Color::ORANGE, 1.0),
        )?;

        let upright = t_shape(scene, false)?;
        let inverted = t_shape(scene, true)?;
        scene.graph_mut().next_to(inverted, upright, DOWN, 0.5)?;
        let both = scene.group_named("both_t", &[upright, inverted])?;
        scene.graph_mut().move_to(both, ORIGIN)?;
        scene.graph_mut().set_fill(both, Color::ORANGE, Some(1.0))?;

        scene.play(&[CommandDraft::fade_in(&[circle])], PlayOpts::default())?;
        scene.wait(1.0)?;
        scene.play(&[CommandDraft::transform_into(circle, both)], PlayOpts::default())?;
        scene.wait(2.0)?;

        scene.begin_ambient_camera_rotation(CameraAxis::Phi, 30.0 * DEGREES)?;
        scene.begin_ambient_camera_rotation(CameraAxis::Theta, 30.0 * DEGREES)?;
        scene.wait(2.0)?;
        scene.stop_ambient_camera_rotation(CameraAxis::Phi)?;
        Ok(())
    }
}
