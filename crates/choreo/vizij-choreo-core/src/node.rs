//! Shape nodes: identity, immutable geometry and initial transform/style.

use serde::{Deserialize, Serialize};

use crate::ids::NodeId;
use crate::math::{self, Quat, Vec3, QUAT_IDENTITY};
use crate::shape::{Color, Geometry, ShapeKind};

/// Position, rotation and per-axis scale.
///
/// Applied as scale, then rotation, then translation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    /// Quaternion (x, y, z, w)
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: math::ORIGIN,
            rotation: QUAT_IDENTITY,
            scale: [1.0, 1.0, 1.0],
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Transform a point from local space to the parent's space
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let rotated = math::quat_rotate(self.rotation, math::mul(p, self.scale));
        math::add(rotated, self.position)
    }

    /// Map a parent-space direction into local space (no translation).
    /// Zero scale components map to zero.
    pub fn inverse_transform_vector(&self, v: Vec3) -> Vec3 {
        let unrotated = math::quat_inverse_rotate(self.rotation, v);
        let mut out = [0.0; 3];
        for i in 0..3 {
            if self.scale[i].abs() > f32::EPSILON {
                out[i] = unrotated[i] / self.scale[i];
            }
        }
        out
    }

    /// Compose `self` (parent) with a child-local transform.
    pub fn compose(&self, child: &Transform) -> Transform {
        Transform {
            position: self.transform_point(child.position),
            rotation: math::quat_mul(self.rotation, child.rotation),
            scale: math::mul(self.scale, child.scale),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub fill_color: Color,
    pub fill_opacity: f32,
    pub stroke_color: Color,
    pub stroke_width: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill_color: Color::WHITE,
            fill_opacity: 0.0,
            stroke_color: Color::WHITE,
            stroke_width: 4.0,
        }
    }
}

/// Animatable per-node state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeState {
    pub transform: Transform,
    pub style: Style,
    /// Overall alpha multiplier; fades move it between 0 and the nominal opacity.
    pub opacity: f32,
    pub visible: bool,
    /// Drawn fraction of the outline, driven by `create`.
    pub reveal: f32,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            transform: Transform::identity(),
            style: Style::default(),
            opacity: 1.0,
            visible: true,
            reveal: 1.0,
        }
    }
}

/// Scene node. Geometry and id never change after creation; only the
/// graph links and the authoring-time initial state may be edited.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeNode {
    id: NodeId,
    name: Option<String>,
    geometry: Geometry,
    nominal_opacity: f32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) initial: NodeState,
}

impl ShapeNode {
    pub(crate) fn new(id: NodeId, builder: NodeBuilder) -> Self {
        let initial = NodeState {
            transform: builder.transform,
            style: builder.style,
            opacity: builder.opacity.unwrap_or(builder.nominal_opacity),
            visible: builder.visible,
            reveal: 1.0,
        };
        Self {
            id,
            name: builder.name,
            geometry: builder.geometry,
            nominal_opacity: builder.nominal_opacity,
            parent: None,
            children: Vec::new(),
            initial,
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    pub fn is_group(&self) -> bool {
        matches!(self.geometry, Geometry::Group)
    }

    /// Opacity a `fade_in` arrives at.
    pub fn nominal_opacity(&self) -> f32 {
        self.nominal_opacity
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn initial(&self) -> &NodeState {
        &self.initial
    }

    /// Human-readable label for logs.
    pub fn label(&self) -> String {
        match &self.name {
            Some(n) => format!("{n} ({})", self.id),
            None => self.id.to_string(),
        }
    }
}

/// Declarative description of a node to create.
#[derive(Clone, Debug)]
pub struct NodeBuilder {
    pub(crate) geometry: Geometry,
    pub(crate) name: Option<String>,
    pub(crate) transform: Transform,
    pub(crate) style: Style,
    pub(crate) nominal_opacity: f32,
    pub(crate) opacity: Option<f32>,
    pub(crate) visible: bool,
}

impl NodeBuilder {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            name: None,
            transform: Transform::identity(),
            style: Style::default(),
            nominal_opacity: 1.0,
            opacity: None,
            visible: true,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn rotated(mut self, axis: Vec3, angle: f32) -> Self {
        self.transform.rotation = math::quat_mul(
            math::quat_from_axis_angle(axis, angle),
            self.transform.rotation,
        );
        self
    }

    pub fn scaled(mut self, factor: f32) -> Self {
        self.transform.scale = math::scale(self.transform.scale, factor);
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn fill(mut self, color: Color, opacity: f32) -> Self {
        self.style.fill_color = color;
        self.style.fill_opacity = opacity;
        self
    }

    pub fn stroke(mut self, color: Color, width: f32) -> Self {
        self.style.stroke_color = color;
        self.style.stroke_width = width;
        self
    }

    /// Fill and stroke in one color, keeping opacities.
    pub fn color(mut self, color: Color) -> Self {
        self.style.fill_color = color;
        self.style.stroke_color = color;
        self
    }

    pub fn nominal_opacity(mut self, opacity: f32) -> Self {
        self.nominal_opacity = opacity;
        self
    }

    /// Initial opacity; defaults to the nominal opacity.
    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// Start invisible until a `create`/`fade_in` shows the node.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{DEGREES, OUT, RIGHT, UP};

    fn close3(a: Vec3, b: Vec3) {
        for i in 0..3 {
            assert!((a[i] - b[i]).abs() < 1e-5, "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn compose_scales_rotates_then_translates() {
        let parent = Transform {
            position: [1.0, 0.0, 0.0],
            rotation: math::quat_from_axis_angle(OUT, 90.0 * DEGREES),
            scale: [2.0, 2.0, 2.0],
        };
        let child = Transform::from_position(RIGHT);
        let world = parent.compose(&child);
        close3(world.position, [1.0, 2.0, 0.0]);
        close3(world.scale, [2.0, 2.0, 2.0]);
        close3(parent.inverse_transform_vector(UP), [0.5, 0.0, 0.0]);
    }

    #[test]
    fn builder_defaults_opacity_to_nominal() {
        let node = ShapeNode::new(
            NodeId(0),
            NodeBuilder::new(Geometry::circle(1.0)).nominal_opacity(0.8),
        );
        assert_eq!(node.initial().opacity, 0.8);
        let hidden = ShapeNode::new(
            NodeId(1),
            NodeBuilder::new(Geometry::circle(1.0)).opacity(0.0).hidden(),
        );
        assert_eq!(hidden.initial().opacity, 0.0);
        assert!(!hidden.initial().visible);
        assert_eq!(hidden.nominal_opacity(), 1.0);
    }
}
