//! Scene graph: an arena of shape nodes indexed by `NodeId`, with
//! parent/child links for groups.
//!
//! Invariants:
//! - ids are dense arena slots and never reused within a graph;
//! - a node has at most one parent;
//! - the child relation is acyclic.
//!
//! Placement helpers (`move_to`, `next_to`, `set_fill`, ...) edit the
//! initial state only; visual change over time goes through commands.

use hashbrown::HashMap;
use log::debug;

use crate::config::Config;
use crate::error::{ChoreoError, Result};
use crate::ids::{IdAllocator, NodeId};
use crate::math::{self, Vec3};
use crate::node::{NodeBuilder, ShapeNode, Style, Transform};
use crate::shape::{Bounds, Color, Geometry};

#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<ShapeNode>,
    names: HashMap<String, NodeId>,
    ids: IdAllocator,
    /// Outline resolution used when measuring curved shapes for placement.
    curve_samples: usize,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::with_curve_samples(Config::default().curve_samples)
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_curve_samples(curve_samples: usize) -> Self {
        Self {
            nodes: Vec::new(),
            names: HashMap::new(),
            ids: IdAllocator::default(),
            curve_samples: curve_samples.max(2),
        }
    }

    /// Register a new node built from `builder`.
    pub fn add_node(&mut self, builder: NodeBuilder) -> Result<NodeId> {
        builder.geometry.validate()?;
        validate_style(&builder.style)?;
        let opacities = [Some(builder.nominal_opacity), builder.opacity];
        if opacities
            .iter()
            .flatten()
            .any(|o| !o.is_finite() || !(0.0..=1.0).contains(o))
        {
            return Err(ChoreoError::invalid_geometry("opacity must be within [0,1]"));
        }
        let t = &builder.transform;
        if !(math::is_finite3(t.position)
            && math::is_finite3(t.scale)
            && t.rotation.iter().all(|c| c.is_finite()))
        {
            return Err(ChoreoError::invalid_geometry("transform must be finite"));
        }
        if let Some(name) = &builder.name {
            if self.names.contains_key(name) {
                return Err(ChoreoError::DuplicateName { name: name.clone() });
            }
        }

        let id = self.ids.alloc_node();
        if let Some(name) = &builder.name {
            self.names.insert(name.clone(), id);
        }
        let node = ShapeNode::new(id, builder);
        debug!("scene: created {} as {:?}", node.label(), node.kind());
        self.nodes.push(node);
        Ok(id)
    }

    /// Create a node from its parts.
    pub fn create(
        &mut self,
        geometry: Geometry,
        transform: Transform,
        style: Style,
    ) -> Result<NodeId> {
        self.add_node(NodeBuilder::new(geometry).transform(transform).style(style))
    }

    pub fn get(&self, id: NodeId) -> Result<&ShapeNode> {
        self.nodes
            .get(id.index())
            .ok_or(ChoreoError::UnknownNode { id })
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut ShapeNode> {
        self.nodes
            .get_mut(id.index())
            .ok_or(ChoreoError::UnknownNode { id })
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &ShapeNode> {
        self.nodes.iter()
    }

    /// Nodes without a parent, in creation order.
    pub fn roots(&self) -> impl Iterator<Item = &ShapeNode> {
        self.nodes.iter().filter(|n| n.parent.is_none())
    }

    /// `id` itself is not included.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.nodes.get(id.index()).and_then(|n| n.parent);
        while let Some(p) = cur {
            out.push(p);
            cur = self.nodes.get(p.index()).and_then(|n| n.parent);
        }
        out
    }

    /// Depth-first, children in declaration order; `id` itself is not included.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.nodes.get(id.index()) {
            Some(n) => n.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(n) = stack.pop() {
            out.push(n);
            if let Some(node) = self.nodes.get(n.index()) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Create a group holding `children`, which must currently be unparented.
    pub fn group(&mut self, children: &[NodeId]) -> Result<NodeId> {
        self.group_with(NodeBuilder::new(Geometry::Group), children)
    }

    pub fn group_named(&mut self, name: impl Into<String>, children: &[NodeId]) -> Result<NodeId> {
        self.group_with(NodeBuilder::new(Geometry::Group).named(name), children)
    }

    fn group_with(&mut self, builder: NodeBuilder, children: &[NodeId]) -> Result<NodeId> {
        if !matches!(builder.geometry, Geometry::Group) {
            return Err(ChoreoError::invalid_geometry("group nodes use Geometry::Group"));
        }
        // A fresh group cannot be anyone's ancestor; only parent links need checking.
        self.check_children(None, children)?;
        let gid = self.add_node(builder)?;
        self.link(gid, children);
        debug!("scene: grouped {} children under {gid}", children.len());
        Ok(gid)
    }

    /// Append `children` to an existing group.
    pub fn add_to_group(&mut self, group: NodeId, children: &[NodeId]) -> Result<()> {
        let g = self.get(group)?;
        if !g.is_group() {
            return Err(ChoreoError::invalid_geometry(format!(
                "{} is not a group",
                g.label()
            )));
        }
        self.check_children(Some(group), children)?;
        self.link(group, children);
        Ok(())
    }

    /// Validate a prospective child list without mutating anything.
    fn check_children(&self, group: Option<NodeId>, children: &[NodeId]) -> Result<()> {
        let lineage: Vec<NodeId> = match group {
            Some(g) => {
                let mut l = self.ancestors(g);
                l.push(g);
                l
            }
            None => Vec::new(),
        };
        for (i, child) in children.iter().enumerate() {
            let node = self.get(*child)?;
            if children[..i].contains(child) {
                return Err(ChoreoError::invalid_geometry(format!(
                    "group lists {child} twice"
                )));
            }
            if let Some(g) = group {
                if lineage.contains(child) {
                    return Err(ChoreoError::CyclicGroup { group: g, child: *child });
                }
            }
            if let Some(parent) = node.parent {
                return Err(ChoreoError::AlreadyParented { id: *child, parent });
            }
        }
        Ok(())
    }

    fn link(&mut self, group: NodeId, children: &[NodeId]) {
        for c in children {
            if let Some(node) = self.nodes.get_mut(c.index()) {
                node.parent = Some(group);
            }
        }
        if let Some(g) = self.nodes.get_mut(group.index()) {
            g.children.extend_from_slice(children);
        }
    }

    // ─── Authoring-time placement ───────────────────────────────────────

    /// Initial transform of the parent chain, composed root to `id`'s parent.
    fn parent_world(&self, id: NodeId) -> Transform {
        self.ancestors(id)
            .iter()
            .rev()
            .filter_map(|a| self.nodes.get(a.index()))
            .fold(Transform::identity(), |acc, n| {
                acc.compose(&n.initial.transform)
            })
    }

    /// Initial world transform.
    pub fn world_transform(&self, id: NodeId) -> Result<Transform> {
        let node = self.get(id)?;
        Ok(self.parent_world(id).compose(&node.initial.transform))
    }

    /// Initial world bounds; groups union their children. `None` for empty groups.
    pub fn world_bounds(&self, id: NodeId) -> Result<Option<Bounds>> {
        let node = self.get(id)?;
        if node.is_group() {
            let mut acc: Option<Bounds> = None;
            for c in &node.children {
                if let Some(b) = self.world_bounds(*c)? {
                    acc = Some(match acc {
                        Some(a) => a.union(b),
                        None => b,
                    });
                }
            }
            return Ok(acc);
        }
        let world = self.world_transform(id)?;
        Ok(node.geometry().local_bounds(self.curve_samples).and_then(|b| {
            let corners = b.corners().map(|c| world.transform_point(c));
            Bounds::from_points(corners.iter())
        }))
    }

    fn bounds_or_err(&self, id: NodeId) -> Result<Bounds> {
        self.world_bounds(id)?.ok_or_else(|| {
            ChoreoError::invalid_geometry(format!("{id} has no extent to place against"))
        })
    }

    /// Move by a world-space offset.
    pub fn shift(&mut self, id: NodeId, offset: Vec3) -> Result<()> {
        self.get(id)?;
        let local = self.parent_world(id).inverse_transform_vector(offset);
        let node = self.get_mut(id)?;
        node.initial.transform.position = math::add(node.initial.transform.position, local);
        Ok(())
    }

    /// Center the node's world bounds on `point` (its origin when it has no extent).
    pub fn move_to(&mut self, id: NodeId, point: Vec3) -> Result<()> {
        let anchor = match self.world_bounds(id)? {
            Some(b) => b.center(),
            None => self.world_transform(id)?.position,
        };
        self.shift(id, math::sub(point, anchor))
    }

    /// Place `id` beside `reference` in `direction`, `buff` apart, centers
    /// aligned on the other axes.
    pub fn next_to(&mut self, id: NodeId, reference: NodeId, direction: Vec3, buff: f32) -> Result<()> {
        if id == reference {
            return Err(ChoreoError::invalid_geometry("a node cannot be placed next to itself"));
        }
        let ref_bounds = self.bounds_or_err(reference)?;
        let own = self.bounds_or_err(id)?;
        let target = math::add(
            ref_bounds.critical_point(direction),
            math::scale(direction, buff),
        );
        let from = own.critical_point(math::scale(direction, -1.0));
        self.shift(id, math::sub(target, from))
    }

    /// Rotate the initial state, optionally about a world point.
    pub fn rotate(&mut self, id: NodeId, axis: Vec3, angle: f32, about: Option<Vec3>) -> Result<()> {
        let q = math::quat_from_axis_angle(axis, angle);
        if let Some(p) = about {
            let pos = self.world_transform(id)?.position;
            let rotated = math::add(p, math::quat_rotate(q, math::sub(pos, p)));
            self.shift(id, math::sub(rotated, pos))?;
        }
        let node = self.get_mut(id)?;
        node.initial.transform.rotation = math::quat_mul(q, node.initial.transform.rotation);
        Ok(())
    }

    /// Scale the initial state about the center of its world bounds.
    pub fn scale(&mut self, id: NodeId, factor: f32) -> Result<()> {
        if !factor.is_finite() {
            return Err(ChoreoError::invalid_geometry("scale factor must be finite"));
        }
        let before = self.world_bounds(id)?.map(|b| b.center());
        let node = self.get_mut(id)?;
        node.initial.transform.scale = math::scale(node.initial.transform.scale, factor);
        if let Some(center) = before {
            if let Some(after) = self.world_bounds(id)?.map(|b| b.center()) {
                self.shift(id, math::sub(center, after))?;
            }
        }
        Ok(())
    }

    /// Set fill on the node and every descendant.
    pub fn set_fill(&mut self, id: NodeId, color: Color, opacity: Option<f32>) -> Result<()> {
        if let Some(o) = opacity {
            if !(0.0..=1.0).contains(&o) {
                return Err(ChoreoError::invalid_geometry("fill opacity must be within [0,1]"));
            }
        }
        self.each_in_subtree(id, |style| {
            style.fill_color = color;
            if let Some(o) = opacity {
                style.fill_opacity = o;
            }
        })
    }

    /// Set stroke on the node and every descendant.
    pub fn set_stroke(&mut self, id: NodeId, color: Option<Color>, width: f32) -> Result<()> {
        if !width.is_finite() || width < 0.0 {
            return Err(ChoreoError::invalid_geometry("stroke width must be finite and >= 0"));
        }
        self.each_in_subtree(id, |style| {
            if let Some(c) = color {
                style.stroke_color = c;
            }
            style.stroke_width = width;
        })
    }

    fn each_in_subtree(&mut self, id: NodeId, mut f: impl FnMut(&mut Style)) -> Result<()> {
        self.get(id)?;
        let mut targets = vec![id];
        targets.extend(self.descendants(id));
        for t in targets {
            f(&mut self.get_mut(t)?.initial.style);
        }
        Ok(())
    }

    /// Show or hide at authoring time.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<()> {
        self.get_mut(id)?.initial.visible = visible;
        Ok(())
    }
}

fn validate_style(style: &Style) -> Result<()> {
    if !style.fill_color.is_finite() || !style.stroke_color.is_finite() {
        return Err(ChoreoError::invalid_geometry("colors must be finite"));
    }
    if !(0.0..=1.0).contains(&style.fill_opacity) {
        return Err(ChoreoError::invalid_geometry("fill opacity must be within [0,1]"));
    }
    if !style.stroke_width.is_finite() || style.stroke_width < 0.0 {
        return Err(ChoreoError::invalid_geometry("stroke width must be finite and >= 0"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{DEGREES, DOWN, UP};

    fn rect(g: &mut SceneGraph, w: f32, h: f32) -> NodeId {
        g.add_node(NodeBuilder::new(Geometry::rectangle(w, h))).unwrap()
    }

    #[test]
    fn unknown_ids_are_reported() {
        let g = SceneGraph::new();
        assert_eq!(
            g.get(NodeId(3)).unwrap_err(),
            ChoreoError::UnknownNode { id: NodeId(3) }
        );
    }

    #[test]
    fn placement_measures_arcs_at_graph_resolution() {
        let quarter = Geometry::arc(1.0, -45.0 * DEGREES, 90.0 * DEGREES);
        let mut coarse = SceneGraph::with_curve_samples(2);
        let a = coarse.add_node(NodeBuilder::new(quarter.clone())).unwrap();
        let b = coarse.world_bounds(a).unwrap().unwrap();
        assert!((b.max[0] - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);

        let mut fine = SceneGraph::new();
        let a = fine.add_node(NodeBuilder::new(quarter)).unwrap();
        assert!(fine.world_bounds(a).unwrap().unwrap().max[0] > 0.99);
    }

    #[test]
    fn names_are_unique() {
        let mut g = SceneGraph::new();
        g.add_node(NodeBuilder::new(Geometry::circle(1.0)).named("c")).unwrap();
        let err = g
            .add_node(NodeBuilder::new(Geometry::circle(1.0)).named("c"))
            .unwrap_err();
        assert!(matches!(err, ChoreoError::DuplicateName { .. }));
        assert_eq!(g.find("c"), Some(NodeId(0)));
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn next_to_stacks_bars_into_a_t() {
        let mut g = SceneGraph::new();
        let vertical = rect(&mut g, 0.5, 1.0);
        let horizontal = rect(&mut g, 2.0, 0.5);
        g.next_to(horizontal, vertical, UP, 0.0).unwrap();
        let b = g.world_bounds(horizontal).unwrap().unwrap();
        assert!((b.min[1] - 0.5).abs() < 1e-5);
        assert!((b.center()[0]).abs() < 1e-5);
    }

    #[test]
    fn group_bounds_and_move_to() {
        let mut g = SceneGraph::new();
        let a = rect(&mut g, 1.0, 1.0);
        let b = rect(&mut g, 1.0, 1.0);
        g.next_to(b, a, DOWN, 0.5).unwrap();
        let grp = g.group(&[a, b]).unwrap();
        let before = g.world_bounds(grp).unwrap().unwrap();
        assert!((before.size()[1] - 2.5).abs() < 1e-5);
        g.move_to(grp, [0.0, 0.0, 0.0]).unwrap();
        let after = g.world_bounds(grp).unwrap().unwrap();
        assert!(after.center()[1].abs() < 1e-5);
        // children keep their local transforms; the group carries the offset
        assert_eq!(g.get(a).unwrap().initial().transform.position, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn regrouping_a_parented_node_fails() {
        let mut g = SceneGraph::new();
        let a = rect(&mut g, 1.0, 1.0);
        let g1 = g.group(&[a]).unwrap();
        let err = g.group(&[a]).unwrap_err();
        assert_eq!(err, ChoreoError::AlreadyParented { id: a, parent: g1 });
        // the failed call created nothing
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn set_fill_propagates_to_descendants() {
        let mut g = SceneGraph::new();
        let a = rect(&mut g, 1.0, 1.0);
        let grp = g.group(&[a]).unwrap();
        g.set_fill(grp, Color::ORANGE, Some(1.0)).unwrap();
        let style = g.get(a).unwrap().initial().style;
        assert_eq!(style.fill_color, Color::ORANGE);
        assert_eq!(style.fill_opacity, 1.0);
    }

    #[test]
    fn shift_inside_scaled_group_uses_world_units() {
        let mut g = SceneGraph::new();
        let a = rect(&mut g, 1.0, 1.0);
        let grp = g.group(&[a]).unwrap();
        g.scale(grp, 2.0).unwrap();
        g.shift(a, [2.0, 0.0, 0.0]).unwrap();
        let world = g.world_transform(a).unwrap();
        assert!((world.position[0] - 2.0).abs() < 1e-5);
    }
}
