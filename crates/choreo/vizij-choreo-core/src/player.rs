//! `Player`: owns a scene graph, a timeline and the initial camera, and
//! answers `state_at` queries. This is the surface renderers talk to.

use log::debug;

use crate::baking::{bake, BakedChoreography, BakingConfig};
use crate::camera::CameraState;
use crate::command::{AnimationCommand, CommandDraft};
use crate::config::Config;
use crate::error::Result;
use crate::ids::{CommandId, NodeId};
use crate::node::{NodeBuilder, ShapeNode};
use crate::sampling;
use crate::scene::SceneGraph;
use crate::snapshot::SceneSnapshot;
use crate::timeline::Timeline;

#[derive(Debug, Clone, Default)]
pub struct Player {
    cfg: Config,
    graph: SceneGraph,
    timeline: Timeline,
    camera: CameraState,
}

impl Player {
    pub fn new(cfg: Config) -> Self {
        Self {
            graph: SceneGraph::with_curve_samples(cfg.curve_samples),
            cfg,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn add_node(&mut self, builder: NodeBuilder) -> Result<NodeId> {
        self.graph.add_node(builder)
    }

    pub fn group(&mut self, children: &[NodeId]) -> Result<NodeId> {
        self.graph.group(children)
    }

    pub fn node(&self, id: NodeId) -> Result<&ShapeNode> {
        self.graph.get(id)
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Authoring access to initial states. Scheduled commands keep their
    /// validated targets; nodes can only be added, never removed.
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn commands(&self) -> &[AnimationCommand] {
        self.timeline.commands()
    }

    pub fn schedule(&mut self, draft: &CommandDraft) -> Result<CommandId> {
        let id = self.timeline.schedule(&self.graph, &self.cfg, draft)?;
        debug!(
            "player: scheduled {id} {} (total {:.3}s)",
            draft.kind.name(),
            self.timeline.total_duration()
        );
        Ok(id)
    }

    pub fn schedule_all(&mut self, drafts: &[CommandDraft]) -> Result<Vec<CommandId>> {
        self.timeline.schedule_all(&self.graph, &self.cfg, drafts)
    }

    /// Append another phase after everything scheduled so far.
    pub fn append(&mut self, phase: &Timeline) -> Result<Vec<CommandId>> {
        self.timeline.append(&self.graph, phase)
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    /// Initial camera orientation.
    pub fn set_camera(&mut self, camera: CameraState) {
        self.camera = camera;
    }

    #[inline]
    pub fn total_duration(&self) -> f32 {
        self.timeline.total_duration()
    }

    pub fn state_at(&self, t: f32) -> SceneSnapshot {
        sampling::state_at(&self.graph, &self.timeline, &self.camera, &self.cfg, t)
    }

    pub fn bake(&self, bake_cfg: &BakingConfig) -> BakedChoreography {
        bake(&self.graph, &self.timeline, &self.camera, &self.cfg, bake_cfg)
    }
}
