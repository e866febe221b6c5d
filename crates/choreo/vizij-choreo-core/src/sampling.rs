//! Pure evaluation of a timeline against a scene graph.
//!
//! Model:
//! - Every (node, attribute) channel starts from the node's initial state.
//! - Commands writing the channel that have started by `t` are folded in
//!   start order (ties in declaration order). Each command starts from the
//!   value the previous ones produced and runs until the next one starts, or
//!   until `t` for the last one. A later command therefore takes over from
//!   wherever the earlier one had got to, and past the end every command is
//!   fully applied.
//! - Local states are then composed parent-to-child into world states.
//!
//! Nothing here mutates the graph or the timeline; the same inputs give the
//! same snapshot.

use hashbrown::HashMap;
use log::{trace, warn};

use crate::camera::{CameraAxis, CameraState};
use crate::command::{AnimationCommand, ApplyEnv, Attribute, MorphTarget, Verb};
use crate::config::Config;
use crate::ids::{CommandId, NodeId};
use crate::math::Vec3;
use crate::node::{NodeState, ShapeNode, Transform};
use crate::scene::SceneGraph;
use crate::shape::Geometry;
use crate::snapshot::{NodeSnapshot, SceneSnapshot};
use crate::timeline::{Channel, Timeline};
use crate::value::Value;

/// Read one attribute out of a node state.
pub fn read_attribute(attr: Attribute, state: &NodeState, geometry: &Geometry) -> Value {
    match attr {
        Attribute::Position => Value::Vec3(state.transform.position),
        Attribute::Rotation => Value::Quat(state.transform.rotation),
        Attribute::Scale => Value::Vec3(state.transform.scale),
        Attribute::Opacity => Value::Float(state.opacity),
        Attribute::Visible => Value::Bool(state.visible),
        Attribute::Reveal => Value::Float(state.reveal),
        Attribute::FillColor => Value::Color(state.style.fill_color),
        Attribute::FillOpacity => Value::Float(state.style.fill_opacity),
        Attribute::StrokeColor => Value::Color(state.style.stroke_color),
        Attribute::StrokeWidth => Value::Float(state.style.stroke_width),
        Attribute::Shape => Value::Shape(geometry.clone()),
    }
}

/// Write one attribute; values of the wrong kind are ignored.
pub fn write_attribute(attr: Attribute, state: &mut NodeState, geometry: &mut Geometry, value: Value) {
    match (attr, value) {
        (Attribute::Position, Value::Vec3(v)) => state.transform.position = v,
        (Attribute::Rotation, Value::Quat(q)) => state.transform.rotation = q,
        (Attribute::Scale, Value::Vec3(v)) => state.transform.scale = v,
        (Attribute::Opacity, Value::Float(f)) => state.opacity = f,
        (Attribute::Visible, Value::Bool(b)) => state.visible = b,
        (Attribute::Reveal, Value::Float(f)) => state.reveal = f,
        (Attribute::FillColor, Value::Color(c)) => state.style.fill_color = c,
        (Attribute::FillOpacity, Value::Float(f)) => state.style.fill_opacity = f,
        (Attribute::StrokeColor, Value::Color(c)) => state.style.stroke_color = c,
        (Attribute::StrokeWidth, Value::Float(f)) => state.style.stroke_width = f,
        (Attribute::Shape, Value::Shape(g)) => *geometry = g,
        _ => {}
    }
}

/// Per-call sampler state: morph targets are built once per command.
struct Sampler<'a> {
    graph: &'a SceneGraph,
    timeline: &'a Timeline,
    cfg: &'a Config,
    morphs: HashMap<CommandId, MorphTarget>,
}

impl<'a> Sampler<'a> {
    fn morph_target(&mut self, cmd: &AnimationCommand) -> Option<&MorphTarget> {
        let Verb::TransformInto { target } = cmd.verb() else {
            return None;
        };
        if !self.morphs.contains_key(&cmd.id()) {
            let built = build_morph_target(self.graph, *target, self.cfg.curve_samples)?;
            self.morphs.insert(cmd.id(), built);
        }
        self.morphs.get(&cmd.id())
    }

    /// Fold `attr` of `node` at time `t`. With `stop_before`, only the
    /// commands ordered before that one in the channel are applied.
    fn fold(
        &mut self,
        node: &ShapeNode,
        attr: Attribute,
        t: f32,
        stop_before: Option<CommandId>,
    ) -> Value {
        let initial = read_attribute(attr, node.initial(), node.geometry());
        let channel = Channel::Node(node.id(), attr);
        let timeline = self.timeline;
        let mut cmds: Vec<&AnimationCommand> = timeline.started(channel, t).collect();
        if let Some(stop) = stop_before {
            if let Some(pos) = cmds.iter().position(|c| c.id() == stop) {
                cmds.truncate(pos);
            }
        }

        let mut value = initial;
        for (k, cmd) in cmds.iter().enumerate() {
            let until = cmds.get(k + 1).map_or(t, |next| next.start_time());
            let progress = cmd.progress(until);
            let scale_at_start = match cmd.verb() {
                Verb::ScaleTo { anchor: Some(_), .. } if attr == Attribute::Position => self
                    .fold(node, Attribute::Scale, cmd.start_time(), Some(cmd.id()))
                    .as_vec3(),
                _ => None,
            };
            let cfg = self.cfg;
            let env = ApplyEnv {
                nominal_opacity: node.nominal_opacity(),
                scale_at_start,
                morph_target: self.morph_target(cmd),
                curve_samples: cfg.curve_samples,
                morph_samples: cfg.morph_samples,
            };
            value = cmd.apply(attr, &value, progress, &env);
        }
        value
    }

    fn local_state(&mut self, node: &ShapeNode, t: f32) -> (NodeState, Geometry) {
        let mut state = *node.initial();
        let mut geometry = node.geometry().clone();
        for attr in Attribute::ALL {
            if !self.timeline.has_channel(Channel::Node(node.id(), attr)) {
                continue;
            }
            let v = self.fold(node, attr, t, None);
            write_attribute(attr, &mut state, &mut geometry, v);
        }
        (state, geometry)
    }
}

/// Flattened outline, transform and style of the node a morph heads for.
/// Group targets become one path in the group's local space, styled like
/// their first leaf.
pub(crate) fn build_morph_target(
    graph: &SceneGraph,
    target: NodeId,
    curve_samples: usize,
) -> Option<MorphTarget> {
    let node = graph.get(target).ok()?;
    if !node.is_group() {
        return Some(MorphTarget {
            geometry: node.geometry().clone(),
            outline: node.geometry().outline(curve_samples),
            transform: node.initial().transform,
            style: node.initial().style,
        });
    }

    warn!(
        "morph: target {} is a group; flattening its leaves into one path",
        node.label()
    );
    let mut outline: Vec<Vec<Vec3>> = Vec::new();
    let mut style = node.initial().style;
    let mut styled = false;
    for d in graph.descendants(target) {
        let Ok(leaf) = graph.get(d) else { continue };
        if leaf.is_group() {
            continue;
        }
        if !styled {
            style = leaf.initial().style;
            styled = true;
        }
        let rel = relative_transform(graph, target, d);
        for sub in leaf.geometry().outline(curve_samples) {
            outline.push(sub.into_iter().map(|p| rel.transform_point(p)).collect());
        }
    }
    Some(MorphTarget {
        geometry: Geometry::Path {
            subpaths: outline.clone(),
        },
        outline,
        transform: node.initial().transform,
        style,
    })
}

/// Initial transform of `node` expressed in `ancestor`'s local space.
fn relative_transform(graph: &SceneGraph, ancestor: NodeId, node: NodeId) -> Transform {
    let mut chain = vec![node];
    for a in graph.ancestors(node) {
        if a == ancestor {
            break;
        }
        chain.push(a);
    }
    chain.iter().rev().fold(Transform::identity(), |acc, id| match graph.get(*id) {
        Ok(n) => acc.compose(&n.initial().transform),
        Err(_) => acc,
    })
}

fn compose_world(parent: &NodeState, local: &NodeState) -> NodeState {
    NodeState {
        transform: parent.transform.compose(&local.transform),
        style: local.style,
        opacity: parent.opacity * local.opacity,
        visible: parent.visible && local.visible,
        reveal: parent.reveal * local.reveal,
    }
}

/// Camera orientation at `t`, starting from `initial`.
pub fn camera_at(timeline: &Timeline, initial: &CameraState, t: f32) -> CameraState {
    let t = if t.is_nan() { 0.0 } else { t.max(0.0) };
    let mut cam = *initial;
    for axis in CameraAxis::ALL {
        let cmds: Vec<&AnimationCommand> = timeline.started(Channel::Camera(axis), t).collect();
        let mut value = initial.get(axis);
        for (k, cmd) in cmds.iter().enumerate() {
            let until = cmds.get(k + 1).map_or(t, |next| next.start_time());
            value = cmd.apply_camera(axis, value, cmd.progress(until));
        }
        cam.set(axis, value);
    }
    cam
}

/// Resolve the whole scene at time `t` (negative or NaN times read as 0).
pub fn state_at(
    graph: &SceneGraph,
    timeline: &Timeline,
    camera: &CameraState,
    cfg: &Config,
    t: f32,
) -> SceneSnapshot {
    let t = if t.is_nan() { 0.0 } else { t.max(0.0) };
    let mut sampler = Sampler {
        graph,
        timeline,
        cfg,
        morphs: HashMap::new(),
    };

    let mut nodes: Vec<NodeSnapshot> = graph
        .iter()
        .map(|node| {
            let (local, geometry) = sampler.local_state(node, t);
            NodeSnapshot {
                id: node.id(),
                name: node.name().map(str::to_owned),
                kind: geometry.kind(),
                parent: node.parent(),
                children: node.children().to_vec(),
                geometry,
                local,
                world: local,
            }
        })
        .collect();

    let mut stack: Vec<NodeId> = graph.roots().map(|n| n.id()).collect();
    stack.reverse();
    while let Some(id) = stack.pop() {
        let i = id.index();
        if let Some(parent) = nodes[i].parent {
            let parent_world = nodes[parent.index()].world;
            nodes[i].world = compose_world(&parent_world, &nodes[i].local);
        }
        stack.extend(nodes[i].children.iter().rev().copied());
    }

    trace!(
        "sample: t={t:.3} nodes={} commands={}",
        nodes.len(),
        timeline.len()
    );
    SceneSnapshot {
        time: t,
        nodes,
        camera: camera_at(timeline, camera, t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandDraft;
    use crate::interp::Easing;
    use crate::node::NodeBuilder;

    fn approx(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() <= eps
    }

    fn linear() -> Config {
        Config {
            default_easing: Easing::Linear,
            ..Config::default()
        }
    }

    #[test]
    fn group_composes_transform_and_opacity() {
        let mut g = SceneGraph::new();
        let child = g
            .add_node(NodeBuilder::new(Geometry::circle(0.5)).at([1.0, 0.0, 0.0]).opacity(0.5))
            .unwrap();
        let group = g.group(&[child]).unwrap();
        g.shift(group, [0.0, 2.0, 0.0]).unwrap();
        let cfg = linear();
        let mut tl = Timeline::new();
        tl.schedule(&g, &cfg, &CommandDraft::fade_out(&[group]).start(1.0).duration(1.0))
            .unwrap();
        let cam = CameraState::default();

        let s = state_at(&g, &tl, &cam, &cfg, 0.0);
        let w = s.node(child).unwrap().world;
        assert!(approx(w.transform.position[0], 1.0, 1e-6));
        assert!(approx(w.transform.position[1], 2.0, 1e-6));
        assert!(approx(w.opacity, 0.5, 1e-6));

        let s = state_at(&g, &tl, &cam, &cfg, 1.5);
        assert!(approx(s.node(child).unwrap().world.opacity, 0.25, 1e-6));
        assert!(approx(s.node(child).unwrap().local.opacity, 0.5, 1e-6));

        let s = state_at(&g, &tl, &cam, &cfg, 2.0);
        assert!(!s.node(child).unwrap().world.visible);
        assert!(s.node(child).unwrap().local.visible);
    }

    #[test]
    fn anchored_scale_to_keeps_anchor_fixed() {
        let mut g = SceneGraph::new();
        let sq = g
            .add_node(NodeBuilder::new(Geometry::square(1.0)).at([2.0, 0.0, 0.0]).scaled(2.0))
            .unwrap();
        let cfg = linear();
        let mut tl = Timeline::new();
        tl.schedule(
            &g,
            &cfg,
            &CommandDraft::scale_to(&[sq], 1.0).anchor([0.0, 0.0, 0.0]).duration(1.0),
        )
        .unwrap();
        let s = state_at(&g, &tl, &CameraState::default(), &cfg, 1.0);
        let t = s.node(sq).unwrap().local.transform;
        assert!(approx(t.scale[0], 1.0, 1e-6));
        assert!(approx(t.position[0], 1.0, 1e-5));
    }

    #[test]
    fn morph_toward_group_flattens_leaves() {
        let mut g = SceneGraph::new();
        let a = g.add_node(NodeBuilder::new(Geometry::square(1.0)).at([-1.0, 0.0, 0.0])).unwrap();
        let b = g.add_node(NodeBuilder::new(Geometry::square(1.0)).at([1.0, 0.0, 0.0])).unwrap();
        let group = g.group(&[a, b]).unwrap();
        let target = build_morph_target(&g, group, 16).unwrap();
        assert_eq!(target.outline.len(), 2);
        let xs: Vec<f32> = target.outline[1].iter().map(|p| p[0]).collect();
        assert!(xs.iter().all(|x| *x >= 0.5 - 1e-6 && *x <= 1.5 + 1e-6));
    }

    #[test]
    fn camera_folds_orient_then_rotation() {
        let g = SceneGraph::new();
        let cfg = linear();
        let mut tl = Timeline::new();
        tl.schedule(&g, &cfg, &CommandDraft::orient_camera(1.0, 0.5).duration(1.0))
            .unwrap();
        tl.schedule(
            &g,
            &cfg,
            &CommandDraft::rotate_camera(CameraAxis::Theta, 0.2).start(1.0).duration(5.0),
        )
        .unwrap();
        let init = CameraState::new(0.0, 0.0);
        let c = camera_at(&tl, &init, 0.5);
        assert!(approx(c.phi, 0.5, 1e-6));
        assert!(approx(c.theta, 0.25, 1e-6));
        let c = camera_at(&tl, &init, 3.5);
        assert!(approx(c.phi, 1.0, 1e-6));
        assert!(approx(c.theta, 0.5 + 0.2 * 2.5, 1e-5));
    }
}
