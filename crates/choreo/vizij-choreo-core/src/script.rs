//! Script driver: a time cursor over a `Player` for writing choreographies
//! as a sequence of declarative calls.
//!
//! Nodes added with `add` start hidden and are introduced by a command
//! (`create`, `fade_in`, `grow_from_point`) or shown at once with `show`.
//! `play` starts every animation at the cursor and then moves the cursor past
//! the longest one; `wait` holds.

use hashbrown::HashMap;
use log::{debug, info};

use crate::camera::{CameraAxis, CameraState};
use crate::command::{Attribute, CommandDraft};
use crate::config::Config;
use crate::error::{ChoreoError, Result};
use crate::ids::{CommandId, NodeId};
use crate::interp::Easing;
use crate::node::NodeBuilder;
use crate::player::Player;
use crate::scene::SceneGraph;
use crate::timeline::{Channel, Timeline};

/// Options shared by every animation of one `play` call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayOpts {
    pub run_time: Option<f32>,
    pub easing: Option<Easing>,
}

impl PlayOpts {
    pub fn run_time(run_time: f32) -> Self {
        Self {
            run_time: Some(run_time),
            easing: None,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }
}

#[derive(Debug)]
pub struct Scene {
    player: Player,
    cursor: f32,
    ambient: HashMap<CameraAxis, (f32, f32)>,
}

impl Scene {
    pub fn new(cfg: Config) -> Self {
        Self {
            player: Player::new(cfg),
            cursor: 0.0,
            ambient: HashMap::new(),
        }
    }

    /// Current script time in seconds.
    #[inline]
    pub fn time(&self) -> f32 {
        self.cursor
    }

    pub fn config(&self) -> &Config {
        self.player.config()
    }

    pub fn graph(&self) -> &SceneGraph {
        self.player.graph()
    }

    /// Placement helpers (`next_to`, `set_fill`, ...) edit initial state.
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        self.player.graph_mut()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Register a node, hidden until a command introduces it.
    pub fn add(&mut self, builder: NodeBuilder) -> Result<NodeId> {
        self.player.add_node(builder.hidden())
    }

    /// Register a node and show it at the cursor.
    pub fn add_instant(&mut self, builder: NodeBuilder) -> Result<NodeId> {
        let id = self.add(builder)?;
        self.show(&[id])?;
        Ok(id)
    }

    /// Make nodes visible at the cursor without animation.
    pub fn show(&mut self, ids: &[NodeId]) -> Result<()> {
        let draft = CommandDraft::create(ids).start(self.cursor).duration(0.0);
        self.player.schedule(&draft).map(|_| ())
    }

    /// Hide nodes at the cursor without animation.
    pub fn hide(&mut self, ids: &[NodeId]) -> Result<()> {
        let draft = CommandDraft::remove(ids).start(self.cursor).duration(0.0);
        self.player.schedule(&draft).map(|_| ())
    }

    fn introduced(&self, id: NodeId) -> bool {
        let shown_initially = self
            .player
            .node(id)
            .map(|n| n.initial().visible)
            .unwrap_or(false);
        shown_initially
            || self
                .player
                .timeline()
                .has_channel(Channel::Node(id, Attribute::Visible))
    }

    /// Group nodes. When none of them has been introduced yet, the group
    /// takes over their visibility so introducing the group shows them all.
    pub fn group(&mut self, children: &[NodeId]) -> Result<NodeId> {
        self.group_inner(None, children)
    }

    pub fn group_named(&mut self, name: impl Into<String>, children: &[NodeId]) -> Result<NodeId> {
        self.group_inner(Some(name.into()), children)
    }

    fn group_inner(&mut self, name: Option<String>, children: &[NodeId]) -> Result<NodeId> {
        let fresh = !children.is_empty() && !children.iter().any(|c| self.introduced(*c));
        let graph = self.player.graph_mut();
        let gid = match name {
            Some(n) => graph.group_named(n, children)?,
            None => graph.group(children)?,
        };
        if fresh {
            for c in children {
                graph.set_visible(*c, true)?;
            }
            graph.set_visible(gid, false)?;
        }
        Ok(gid)
    }

    /// Run `anims` together from the cursor, then advance past the longest.
    /// A draft's own `start` is an offset from the cursor.
    pub fn play(&mut self, anims: &[CommandDraft], opts: PlayOpts) -> Result<Vec<CommandId>> {
        if anims.is_empty() {
            return Err(ChoreoError::invalid_command("play needs at least one animation"));
        }
        let cfg_run_time = self.config().default_run_time;
        let mut span: f32 = 0.0;
        let drafts: Vec<CommandDraft> = anims
            .iter()
            .map(|d| {
                let mut d = d.clone();
                let offset = d.start.unwrap_or(0.0);
                let duration = d.duration.or(opts.run_time).unwrap_or(cfg_run_time);
                d.start = Some(self.cursor + offset);
                d.duration = Some(duration);
                if d.easing.is_none() {
                    d.easing = opts.easing;
                }
                span = span.max(offset + duration);
                d
            })
            .collect();
        let ids = self.player.schedule_all(&drafts)?;
        debug!(
            "script: play {} animations at {:.3}s for {:.3}s",
            ids.len(),
            self.cursor,
            span
        );
        self.cursor += span.max(0.0);
        Ok(ids)
    }

    /// Hold for `duration` seconds.
    pub fn wait(&mut self, duration: f32) -> Result<()> {
        let draft = CommandDraft::wait().start(self.cursor).duration(duration);
        self.player.schedule(&draft)?;
        self.cursor += duration;
        Ok(())
    }

    /// Snap the camera. At time 0 this sets the initial orientation.
    pub fn set_camera_orientation(&mut self, phi: f32, theta: f32, gamma: Option<f32>) -> Result<()> {
        let camera_untouched = CameraAxis::ALL
            .iter()
            .all(|a| !self.player.timeline().has_channel(Channel::Camera(*a)));
        if self.cursor == 0.0 && camera_untouched {
            let cam = CameraState {
                phi,
                theta,
                gamma: gamma.unwrap_or(self.player.camera().gamma),
            };
            if !cam.is_finite() {
                return Err(ChoreoError::invalid_command("camera angles must be finite"));
            }
            self.player.set_camera(cam);
            return Ok(());
        }
        let mut draft = CommandDraft::orient_camera(phi, theta)
            .start(self.cursor)
            .duration(0.0);
        if let Some(g) = gamma {
            draft = draft.gamma(g);
        }
        self.player.schedule(&draft).map(|_| ())
    }

    /// Animated camera move from the cursor.
    pub fn move_camera(&mut self, phi: f32, theta: f32, opts: PlayOpts) -> Result<()> {
        self.play(&[CommandDraft::orient_camera(phi, theta)], opts)
            .map(|_| ())
    }

    /// Start rotating the camera about `axis` at `rate` rad/s. A rotation
    /// already running on that axis is closed first.
    pub fn begin_ambient_camera_rotation(&mut self, axis: CameraAxis, rate: f32) -> Result<()> {
        if !rate.is_finite() {
            return Err(ChoreoError::invalid_command("ambient rotation rate must be finite"));
        }
        self.stop_ambient_camera_rotation(axis)?;
        self.ambient.insert(axis, (self.cursor, rate));
        Ok(())
    }

    /// Close the open rotation on `axis` at the cursor; no-op if none runs.
    pub fn stop_ambient_camera_rotation(&mut self, axis: CameraAxis) -> Result<()> {
        let Some((start, rate)) = self.ambient.remove(&axis) else {
            return Ok(());
        };
        let draft = CommandDraft::rotate_camera(axis, rate)
            .start(start)
            .duration(self.cursor - start)
            .easing(Easing::Linear);
        self.player.schedule(&draft)?;
        Ok(())
    }

    /// Append a prepared phase after everything so far; the cursor moves to
    /// the new end.
    pub fn append(&mut self, phase: &Timeline) -> Result<Vec<CommandId>> {
        let ids = self.player.append(phase)?;
        self.cursor = self.cursor.max(self.player.total_duration());
        Ok(ids)
    }

    /// Close open ambient rotations and hand over the finished player.
    pub fn finish(mut self) -> Result<Player> {
        let open: Vec<CameraAxis> = self.ambient.keys().copied().collect();
        for axis in open {
            self.stop_ambient_camera_rotation(axis)?;
        }
        Ok(self.player)
    }
}

/// A choreography written against the script surface.
pub trait SceneScript {
    fn name(&self) -> &str;

    fn config(&self) -> Config {
        Config::default()
    }

    fn construct(&self, scene: &mut Scene) -> Result<()>;
}

/// Build `script` into a ready player.
pub fn run_script(script: &dyn SceneScript) -> Result<Player> {
    let cfg = script.config();
    cfg.validate()?;
    let mut scene = Scene::new(cfg);
    script.construct(&mut scene)?;
    let player = scene.finish()?;
    info!(
        "script '{}': {} nodes, {} commands, {:.3}s",
        script.name(),
        player.graph().len(),
        player.commands().len(),
        player.total_duration()
    );
    Ok(player)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Geometry;

    #[test]
    fn play_advances_cursor_by_longest() {
        let mut scene = Scene::new(Config::default());
        let a = scene.add(NodeBuilder::new(Geometry::circle(1.0))).unwrap();
        let b = scene.add(NodeBuilder::new(Geometry::square(1.0))).unwrap();
        scene
            .play(
                &[CommandDraft::fade_in(&[a]), CommandDraft::create(&[b]).duration(2.0)],
                PlayOpts::default(),
            )
            .unwrap();
        assert_eq!(scene.time(), 2.0);
        scene.wait(0.5).unwrap();
        assert_eq!(scene.time(), 2.5);
        let player = scene.finish().unwrap();
        assert_eq!(player.total_duration(), 2.5);
    }

    #[test]
    fn failed_play_keeps_cursor() {
        let mut scene = Scene::new(Config::default());
        let a = scene.add(NodeBuilder::new(Geometry::circle(1.0))).unwrap();
        let err = scene
            .play(&[CommandDraft::fade_in(&[a, NodeId(42)])], PlayOpts::default())
            .unwrap_err();
        assert_eq!(err.category(), "graph");
        assert_eq!(scene.time(), 0.0);
        assert!(scene.player().commands().is_empty());
    }

    #[test]
    fn added_nodes_start_hidden() {
        let mut scene = Scene::new(Config::default());
        let a = scene.add(NodeBuilder::new(Geometry::circle(1.0))).unwrap();
        scene.wait(1.0).unwrap();
        let b = scene.add_instant(NodeBuilder::new(Geometry::circle(1.0))).unwrap();
        let player = scene.finish().unwrap();
        let s = player.state_at(0.5);
        assert!(!s.node(a).unwrap().world.visible);
        assert!(!s.node(b).unwrap().world.visible);
        let s = player.state_at(1.0);
        assert!(s.node(b).unwrap().world.visible);
    }

    #[test]
    fn ambient_rotation_closed_at_finish() {
        let mut scene = Scene::new(Config::default());
        scene.set_camera_orientation(1.0, 0.5, None).unwrap();
        scene
            .begin_ambient_camera_rotation(CameraAxis::Theta, 0.1)
            .unwrap();
        scene.wait(4.0).unwrap();
        let player = scene.finish().unwrap();
        assert_eq!(player.camera().phi, 1.0);
        let cam = player.state_at(4.0).camera;
        assert!((cam.theta - 0.9).abs() < 1e-5);
        assert_eq!(player.total_duration(), 4.0);
    }
}
