//! Ordered command list with a per-channel index.
//!
//! Commands are kept in declaration order (`CommandId` == slot). Each
//! channel (a node attribute or a camera axis) keeps the indices of the
//! commands writing it, sorted by start time with ties left in declaration
//! order, which is the order the sampler folds them in.

use hashbrown::HashMap;
use log::{debug, trace};

use crate::camera::CameraAxis;
use crate::command::{AnimationCommand, Attribute, CommandDraft, Verb};
use crate::config::Config;
use crate::error::Result;
use crate::ids::{CommandId, IdAllocator, NodeId};
use crate::scene::SceneGraph;

/// Something a command writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Node(NodeId, Attribute),
    Camera(CameraAxis),
}

#[derive(Debug, Clone, Default)]
pub struct Timeline {
    commands: Vec<AnimationCommand>,
    channels: HashMap<Channel, Vec<usize>>,
    ids: IdAllocator,
    total_duration: f32,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `draft` against `graph` and append it.
    /// On error the timeline is left unchanged.
    pub fn schedule(
        &mut self,
        graph: &SceneGraph,
        cfg: &Config,
        draft: &CommandDraft,
    ) -> Result<CommandId> {
        let cmd = draft.resolve(self.ids.peek_command(), graph, cfg)?;
        Ok(self.push(cmd))
    }

    /// Schedule several drafts; either all are appended or none.
    pub fn schedule_all(
        &mut self,
        graph: &SceneGraph,
        cfg: &Config,
        drafts: &[CommandDraft],
    ) -> Result<Vec<CommandId>> {
        let base = self.ids.peek_command().0;
        let resolved = drafts
            .iter()
            .enumerate()
            .map(|(i, d)| d.resolve(CommandId(base + i as u32), graph, cfg))
            .collect::<Result<Vec<_>>>()?;
        Ok(resolved.into_iter().map(|c| self.push(c)).collect())
    }

    /// Append every command of `other`, delayed by this timeline's current
    /// total duration. Targets must exist in `graph`.
    pub fn append(&mut self, graph: &SceneGraph, other: &Timeline) -> Result<Vec<CommandId>> {
        for cmd in &other.commands {
            for t in cmd.targets() {
                graph.get(*t)?;
            }
            if let Verb::TransformInto { target } = cmd.verb() {
                graph.get(*target)?;
            }
        }
        let offset = self.total_duration;
        debug!(
            "timeline: appending {} commands at +{offset:.3}s",
            other.commands.len()
        );
        let shifted: Vec<AnimationCommand> = other
            .commands
            .iter()
            .enumerate()
            .map(|(i, c)| c.offset_by(CommandId(self.ids.peek_command().0 + i as u32), offset))
            .collect();
        Ok(shifted.into_iter().map(|c| self.push(c)).collect())
    }

    fn push(&mut self, cmd: AnimationCommand) -> CommandId {
        let id = self.ids.alloc_command();
        debug_assert_eq!(id, cmd.id());
        let slot = self.commands.len();
        let start = cmd.start_time();

        let mut channels: Vec<Channel> = Vec::new();
        for t in cmd.targets() {
            channels.extend(cmd.verb().attributes().iter().map(|a| Channel::Node(*t, *a)));
        }
        channels.extend(cmd.verb().camera_axes().into_iter().map(Channel::Camera));
        for ch in channels {
            let list = self.channels.entry(ch).or_default();
            let at = list.partition_point(|&i| self.commands[i].start_time() <= start);
            list.insert(at, slot);
        }

        self.total_duration = self.total_duration.max(cmd.end_time());
        trace!(
            "timeline: {} {} [{:.3}, {:.3}]",
            id,
            cmd.verb().kind().name(),
            cmd.start_time(),
            cmd.end_time()
        );
        self.commands.push(cmd);
        id
    }

    /// Latest end time over all commands; 0 when empty.
    #[inline]
    pub fn total_duration(&self) -> f32 {
        self.total_duration
    }

    /// Commands in declaration order.
    pub fn commands(&self) -> &[AnimationCommand] {
        &self.commands
    }

    pub fn get(&self, id: CommandId) -> Option<&AnimationCommand> {
        self.commands.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands writing `channel` that have started by `t`, in fold order.
    pub fn started(&self, channel: Channel, t: f32) -> impl Iterator<Item = &AnimationCommand> {
        let list = self.channels.get(&channel).map(Vec::as_slice).unwrap_or(&[]);
        let n = list.partition_point(|&i| self.commands[i].start_time() <= t);
        list[..n].iter().map(move |&i| &self.commands[i])
    }

    pub fn has_channel(&self, channel: Channel) -> bool {
        self.channels.contains_key(&channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChoreoError;
    use crate::interp::Easing;
    use crate::node::NodeBuilder;
    use crate::shape::Geometry;

    fn setup() -> (SceneGraph, NodeId, NodeId) {
        let mut g = SceneGraph::new();
        let a = g.add_node(NodeBuilder::new(Geometry::square(1.0))).unwrap();
        let b = g.add_node(NodeBuilder::new(Geometry::circle(1.0))).unwrap();
        (g, a, b)
    }

    #[test]
    fn total_duration_tracks_latest_end() {
        let (g, a, b) = setup();
        let cfg = Config::default();
        let mut tl = Timeline::new();
        assert_eq!(tl.total_duration(), 0.0);
        tl.schedule(&g, &cfg, &CommandDraft::fade_in(&[a]).start(1.0).duration(2.0))
            .unwrap();
        tl.schedule(&g, &cfg, &CommandDraft::fade_in(&[b]).duration(0.5))
            .unwrap();
        assert_eq!(tl.total_duration(), 3.0);
    }

    #[test]
    fn unknown_target_leaves_timeline_untouched() {
        let (g, a, _) = setup();
        let cfg = Config::default();
        let mut tl = Timeline::new();
        tl.schedule(&g, &cfg, &CommandDraft::fade_in(&[a])).unwrap();
        let err = tl
            .schedule(&g, &cfg, &CommandDraft::fade_in(&[a, NodeId(99)]).duration(5.0))
            .unwrap_err();
        assert_eq!(err, ChoreoError::UnknownNode { id: NodeId(99) });
        assert_eq!(tl.len(), 1);
        assert_eq!(tl.total_duration(), 1.0);
    }

    #[test]
    fn schedule_all_is_all_or_nothing() {
        let (g, a, b) = setup();
        let cfg = Config::default();
        let mut tl = Timeline::new();
        let res = tl.schedule_all(
            &g,
            &cfg,
            &[
                CommandDraft::fade_in(&[a]),
                CommandDraft::fade_in(&[b]).start(-1.0),
            ],
        );
        assert!(res.is_err());
        assert!(tl.is_empty());

        let ids = tl
            .schedule_all(&g, &cfg, &[CommandDraft::fade_in(&[a]), CommandDraft::fade_in(&[b])])
            .unwrap();
        assert_eq!(ids, vec![CommandId(0), CommandId(1)]);
    }

    #[test]
    fn channel_order_is_start_then_declaration() {
        let (g, a, _) = setup();
        let cfg = Config::default();
        let mut tl = Timeline::new();
        let late = tl
            .schedule(&g, &cfg, &CommandDraft::move_to(&[a], [1.0, 0.0, 0.0]).start(2.0))
            .unwrap();
        let first = tl
            .schedule(&g, &cfg, &CommandDraft::move_to(&[a], [2.0, 0.0, 0.0]).start(0.0))
            .unwrap();
        let second = tl
            .schedule(&g, &cfg, &CommandDraft::shift(&[a], [0.0, 1.0, 0.0]).start(0.0))
            .unwrap();
        let order: Vec<CommandId> = tl
            .started(Channel::Node(a, Attribute::Position), 10.0)
            .map(|c| c.id())
            .collect();
        assert_eq!(order, vec![first, second, late]);
        let early: Vec<CommandId> = tl
            .started(Channel::Node(a, Attribute::Position), 1.0)
            .map(|c| c.id())
            .collect();
        assert_eq!(early, vec![first, second]);
    }

    #[test]
    fn append_offsets_by_total_duration() {
        let (g, a, b) = setup();
        let cfg = Config {
            default_easing: Easing::Linear,
            ..Config::default()
        };
        let mut first = Timeline::new();
        first
            .schedule(&g, &cfg, &CommandDraft::fade_in(&[a]).duration(2.0))
            .unwrap();
        let mut second = Timeline::new();
        second
            .schedule(&g, &cfg, &CommandDraft::fade_in(&[b]).start(0.5))
            .unwrap();
        let ids = first.append(&g, &second).unwrap();
        let cmd = first.get(ids[0]).unwrap();
        assert_eq!(cmd.start_time(), 2.5);
        assert_eq!(first.total_duration(), 3.5);
    }
}
