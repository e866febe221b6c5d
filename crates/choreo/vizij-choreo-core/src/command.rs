//! Animation commands.
//!
//! A command is built as a `CommandDraft` (verb kind plus optional
//! parameters, targets and timing) and validated into an immutable
//! `AnimationCommand` when scheduled. Each verb declares the attributes it
//! writes and maps eased progress in [0,1] to a new attribute value given the
//! value it starts from.

use serde::{Deserialize, Serialize};

use crate::camera::CameraAxis;
use crate::config::Config;
use crate::error::{ChoreoError, Result};
use crate::ids::{CommandId, NodeId};
use crate::interp::functions::{lerp_color, lerp_f32, lerp_vec3};
use crate::interp::{morph, Easing};
use crate::math::{self, Vec3};
use crate::node::{Style, Transform};
use crate::scene::SceneGraph;
use crate::shape::{Color, Geometry};
use crate::value::Value;

/// Animatable node attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Position,
    Rotation,
    Scale,
    Opacity,
    Visible,
    Reveal,
    FillColor,
    FillOpacity,
    StrokeColor,
    StrokeWidth,
    Shape,
}

impl Attribute {
    pub const ALL: [Attribute; 11] = [
        Attribute::Position,
        Attribute::Rotation,
        Attribute::Scale,
        Attribute::Opacity,
        Attribute::Visible,
        Attribute::Reveal,
        Attribute::FillColor,
        Attribute::FillOpacity,
        Attribute::StrokeColor,
        Attribute::StrokeWidth,
        Attribute::Shape,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerbKind {
    FadeIn,
    FadeOut,
    MoveTo,
    Shift,
    ScaleBy,
    ScaleTo,
    Rotate,
    TransformInto,
    GrowFromPoint,
    Create,
    Remove,
    FillTo,
    Wait,
    RotateCamera,
    OrientCamera,
}

impl VerbKind {
    pub fn name(self) -> &'static str {
        match self {
            VerbKind::FadeIn => "fade_in",
            VerbKind::FadeOut => "fade_out",
            VerbKind::MoveTo => "move_to",
            VerbKind::Shift => "shift",
            VerbKind::ScaleBy => "scale_by",
            VerbKind::ScaleTo => "scale_to",
            VerbKind::Rotate => "rotate",
            VerbKind::TransformInto => "transform_into",
            VerbKind::GrowFromPoint => "grow_from_point",
            VerbKind::Create => "create",
            VerbKind::Remove => "remove",
            VerbKind::FillTo => "fill_to",
            VerbKind::Wait => "wait",
            VerbKind::RotateCamera => "rotate_camera",
            VerbKind::OrientCamera => "orient_camera",
        }
    }

    /// Whether the verb acts on nodes (and so needs a non-empty target set).
    pub fn targets_nodes(self) -> bool {
        !matches!(
            self,
            VerbKind::Wait | VerbKind::RotateCamera | VerbKind::OrientCamera
        )
    }
}

/// Resolved verb with its parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verb", rename_all = "snake_case")]
pub enum Verb {
    FadeIn,
    FadeOut,
    MoveTo {
        destination: Vec3,
    },
    Shift {
        offset: Vec3,
    },
    /// Multiply scale by `factor`; with an anchor the position scales about it too.
    ScaleBy {
        factor: f32,
        anchor: Option<Vec3>,
    },
    ScaleTo {
        factor: f32,
        anchor: Option<Vec3>,
    },
    Rotate {
        angle: f32,
        axis: Vec3,
        about: Option<Vec3>,
    },
    TransformInto {
        target: NodeId,
    },
    GrowFromPoint {
        point: Vec3,
    },
    Create,
    Remove,
    FillTo {
        color: Color,
        opacity: Option<f32>,
    },
    Wait,
    /// Continuous rotation at `rate` rad/s over the active interval.
    RotateCamera {
        axis: CameraAxis,
        rate: f32,
    },
    OrientCamera {
        phi: Option<f32>,
        theta: Option<f32>,
        gamma: Option<f32>,
    },
}

impl Verb {
    pub fn kind(&self) -> VerbKind {
        match self {
            Verb::FadeIn => VerbKind::FadeIn,
            Verb::FadeOut => VerbKind::FadeOut,
            Verb::MoveTo { .. } => VerbKind::MoveTo,
            Verb::Shift { .. } => VerbKind::Shift,
            Verb::ScaleBy { .. } => VerbKind::ScaleBy,
            Verb::ScaleTo { .. } => VerbKind::ScaleTo,
            Verb::Rotate { .. } => VerbKind::Rotate,
            Verb::TransformInto { .. } => VerbKind::TransformInto,
            Verb::GrowFromPoint { .. } => VerbKind::GrowFromPoint,
            Verb::Create => VerbKind::Create,
            Verb::Remove => VerbKind::Remove,
            Verb::FillTo { .. } => VerbKind::FillTo,
            Verb::Wait => VerbKind::Wait,
            Verb::RotateCamera { .. } => VerbKind::RotateCamera,
            Verb::OrientCamera { .. } => VerbKind::OrientCamera,
        }
    }

    /// Node attributes this verb writes.
    pub fn attributes(&self) -> &'static [Attribute] {
        use Attribute::*;
        match self {
            Verb::FadeIn | Verb::FadeOut => &[Opacity, Visible],
            Verb::MoveTo { .. } | Verb::Shift { .. } => &[Position],
            Verb::ScaleBy { anchor, .. } | Verb::ScaleTo { anchor, .. } => match anchor {
                Some(_) => &[Scale, Position],
                None => &[Scale],
            },
            Verb::Rotate { about, .. } => match about {
                Some(_) => &[Rotation, Position],
                None => &[Rotation],
            },
            Verb::TransformInto { .. } => &[
                Shape,
                Position,
                Rotation,
                Scale,
                FillColor,
                FillOpacity,
                StrokeColor,
                StrokeWidth,
            ],
            Verb::GrowFromPoint { .. } => &[Scale, Position, Visible],
            Verb::Create => &[Visible, Reveal],
            Verb::Remove => &[Visible],
            Verb::FillTo { opacity, .. } => match opacity {
                Some(_) => &[FillColor, FillOpacity],
                None => &[FillColor],
            },
            Verb::Wait | Verb::RotateCamera { .. } | Verb::OrientCamera { .. } => &[],
        }
    }

    /// Camera axes this verb writes.
    pub fn camera_axes(&self) -> Vec<CameraAxis> {
        match self {
            Verb::RotateCamera { axis, .. } => vec![*axis],
            Verb::OrientCamera { phi, theta, gamma } => CameraAxis::ALL
                .into_iter()
                .zip([phi, theta, gamma])
                .filter(|(_, v)| v.is_some())
                .map(|(a, _)| a)
                .collect(),
            _ => Vec::new(),
        }
    }

    fn from_draft(kind: VerbKind, p: &VerbParams) -> Result<Verb> {
        let need = |v: Option<Vec3>, what: &str| -> Result<Vec3> {
            let v = v.ok_or_else(|| ChoreoError::unsupported(kind.name(), format!("missing {what}")))?;
            if math::is_finite3(v) {
                Ok(v)
            } else {
                Err(ChoreoError::invalid_command(format!(
                    "{} {what} must be finite",
                    kind.name()
                )))
            }
        };
        let need_f = |v: Option<f32>, what: &str| -> Result<f32> {
            let v = v.ok_or_else(|| ChoreoError::unsupported(kind.name(), format!("missing {what}")))?;
            if v.is_finite() {
                Ok(v)
            } else {
                Err(ChoreoError::invalid_command(format!(
                    "{} {what} must be finite",
                    kind.name()
                )))
            }
        };
        let opt = |v: Option<Vec3>, what: &str| -> Result<Option<Vec3>> {
            v.map(|v| need(Some(v), what)).transpose()
        };
        let opt_f = |v: Option<f32>, what: &str| -> Result<Option<f32>> {
            v.map(|v| need_f(Some(v), what)).transpose()
        };

        let verb = match kind {
            VerbKind::FadeIn => Verb::FadeIn,
            VerbKind::FadeOut => Verb::FadeOut,
            VerbKind::MoveTo => Verb::MoveTo {
                destination: need(p.destination, "destination")?,
            },
            VerbKind::Shift => Verb::Shift {
                offset: need(p.offset, "offset")?,
            },
            VerbKind::ScaleBy => Verb::ScaleBy {
                factor: need_f(p.factor, "factor")?,
                anchor: opt(p.anchor, "anchor")?,
            },
            VerbKind::ScaleTo => Verb::ScaleTo {
                factor: need_f(p.factor, "factor")?,
                anchor: opt(p.anchor, "anchor")?,
            },
            VerbKind::Rotate => Verb::Rotate {
                angle: need_f(p.angle, "angle")?,
                axis: match p.axis {
                    Some(a) => need(Some(a), "axis")?,
                    None => math::OUT,
                },
                about: opt(p.about, "about point")?,
            },
            VerbKind::TransformInto => Verb::TransformInto {
                target: p
                    .target
                    .ok_or_else(|| ChoreoError::unsupported(kind.name(), "missing target shape"))?,
            },
            VerbKind::GrowFromPoint => Verb::GrowFromPoint {
                point: need(p.point, "point")?,
            },
            VerbKind::Create => Verb::Create,
            VerbKind::Remove => Verb::Remove,
            VerbKind::FillTo => {
                let color = p
                    .color
                    .ok_or_else(|| ChoreoError::unsupported(kind.name(), "missing color"))?;
                if !color.is_finite() {
                    return Err(ChoreoError::invalid_command("fill_to color must be finite"));
                }
                let opacity = opt_f(p.opacity, "opacity")?;
                if opacity.is_some_and(|o| !(0.0..=1.0).contains(&o)) {
                    return Err(ChoreoError::invalid_command("fill_to opacity must be within [0,1]"));
                }
                Verb::FillTo { color, opacity }
            }
            VerbKind::Wait => Verb::Wait,
            VerbKind::RotateCamera => Verb::RotateCamera {
                axis: p
                    .camera_axis
                    .ok_or_else(|| ChoreoError::unsupported(kind.name(), "missing axis"))?,
                rate: need_f(p.rate, "rate")?,
            },
            VerbKind::OrientCamera => {
                let (phi, theta, gamma) = (
                    opt_f(p.phi, "phi")?,
                    opt_f(p.theta, "theta")?,
                    opt_f(p.gamma, "gamma")?,
                );
                if phi.is_none() && theta.is_none() && gamma.is_none() {
                    return Err(ChoreoError::unsupported(kind.name(), "no angle given"));
                }
                Verb::OrientCamera { phi, theta, gamma }
            }
        };
        Ok(verb)
    }
}

/// Optional verb parameters collected by a draft.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VerbParams {
    #[serde(default)]
    pub destination: Option<Vec3>,
    #[serde(default)]
    pub offset: Option<Vec3>,
    #[serde(default)]
    pub factor: Option<f32>,
    #[serde(default)]
    pub anchor: Option<Vec3>,
    #[serde(default)]
    pub angle: Option<f32>,
    #[serde(default)]
    pub axis: Option<Vec3>,
    #[serde(default)]
    pub about: Option<Vec3>,
    #[serde(default)]
    pub target: Option<NodeId>,
    #[serde(default)]
    pub point: Option<Vec3>,
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default)]
    pub opacity: Option<f32>,
    #[serde(default)]
    pub camera_axis: Option<CameraAxis>,
    #[serde(default)]
    pub rate: Option<f32>,
    #[serde(default)]
    pub phi: Option<f32>,
    #[serde(default)]
    pub theta: Option<f32>,
    #[serde(default)]
    pub gamma: Option<f32>,
}

/// Unvalidated command under construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommandDraft {
    pub kind: VerbKind,
    #[serde(default)]
    pub targets: Vec<NodeId>,
    #[serde(default)]
    pub start: Option<f32>,
    #[serde(default)]
    pub duration: Option<f32>,
    #[serde(default)]
    pub easing: Option<Easing>,
    #[serde(default)]
    pub params: VerbParams,
}

impl CommandDraft {
    pub fn new(kind: VerbKind) -> Self {
        Self {
            kind,
            targets: Vec::new(),
            start: None,
            duration: None,
            easing: None,
            params: VerbParams::default(),
        }
    }

    fn on(kind: VerbKind, targets: &[NodeId]) -> Self {
        Self::new(kind).targets(targets)
    }

    pub fn fade_in(targets: &[NodeId]) -> Self {
        Self::on(VerbKind::FadeIn, targets)
    }

    pub fn fade_out(targets: &[NodeId]) -> Self {
        Self::on(VerbKind::FadeOut, targets)
    }

    pub fn move_to(targets: &[NodeId], destination: Vec3) -> Self {
        Self::on(VerbKind::MoveTo, targets).destination(destination)
    }

    pub fn shift(targets: &[NodeId], offset: Vec3) -> Self {
        Self::on(VerbKind::Shift, targets).offset(offset)
    }

    pub fn scale_by(targets: &[NodeId], factor: f32) -> Self {
        Self::on(VerbKind::ScaleBy, targets).factor(factor)
    }

    pub fn scale_to(targets: &[NodeId], factor: f32) -> Self {
        Self::on(VerbKind::ScaleTo, targets).factor(factor)
    }

    pub fn rotate(targets: &[NodeId], angle: f32) -> Self {
        Self::on(VerbKind::Rotate, targets).angle(angle)
    }

    pub fn transform_into(source: NodeId, target: NodeId) -> Self {
        Self::on(VerbKind::TransformInto, &[source]).target(target)
    }

    pub fn grow_from_point(targets: &[NodeId], point: Vec3) -> Self {
        Self::on(VerbKind::GrowFromPoint, targets).point(point)
    }

    pub fn create(targets: &[NodeId]) -> Self {
        Self::on(VerbKind::Create, targets)
    }

    pub fn remove(targets: &[NodeId]) -> Self {
        Self::on(VerbKind::Remove, targets)
    }

    pub fn fill_to(targets: &[NodeId], color: Color) -> Self {
        Self::on(VerbKind::FillTo, targets).color(color)
    }

    pub fn wait() -> Self {
        Self::new(VerbKind::Wait)
    }

    pub fn rotate_camera(axis: CameraAxis, rate: f32) -> Self {
        Self::new(VerbKind::RotateCamera).camera_axis(axis).rate(rate)
    }

    pub fn orient_camera(phi: f32, theta: f32) -> Self {
        Self::new(VerbKind::OrientCamera).phi(phi).theta(theta)
    }

    pub fn targets(mut self, targets: &[NodeId]) -> Self {
        self.targets = targets.to_vec();
        self
    }

    pub fn start(mut self, start: f32) -> Self {
        self.start = Some(start);
        self
    }

    pub fn duration(mut self, duration: f32) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    pub fn destination(mut self, v: Vec3) -> Self {
        self.params.destination = Some(v);
        self
    }

    pub fn offset(mut self, v: Vec3) -> Self {
        self.params.offset = Some(v);
        self
    }

    pub fn factor(mut self, f: f32) -> Self {
        self.params.factor = Some(f);
        self
    }

    pub fn anchor(mut self, p: Vec3) -> Self {
        self.params.anchor = Some(p);
        self
    }

    pub fn angle(mut self, a: f32) -> Self {
        self.params.angle = Some(a);
        self
    }

    pub fn axis(mut self, v: Vec3) -> Self {
        self.params.axis = Some(v);
        self
    }

    pub fn about(mut self, p: Vec3) -> Self {
        self.params.about = Some(p);
        self
    }

    pub fn target(mut self, id: NodeId) -> Self {
        self.params.target = Some(id);
        self
    }

    pub fn point(mut self, p: Vec3) -> Self {
        self.params.point = Some(p);
        self
    }

    pub fn color(mut self, c: Color) -> Self {
        self.params.color = Some(c);
        self
    }

    pub fn opacity(mut self, o: f32) -> Self {
        self.params.opacity = Some(o);
        self
    }

    pub fn camera_axis(mut self, a: CameraAxis) -> Self {
        self.params.camera_axis = Some(a);
        self
    }

    pub fn rate(mut self, r: f32) -> Self {
        self.params.rate = Some(r);
        self
    }

    pub fn phi(mut self, v: f32) -> Self {
        self.params.phi = Some(v);
        self
    }

    pub fn theta(mut self, v: f32) -> Self {
        self.params.theta = Some(v);
        self
    }

    pub fn gamma(mut self, v: f32) -> Self {
        self.params.gamma = Some(v);
        self
    }

    /// Validate against the scene graph and fill defaults from `cfg`.
    /// Nothing is mutated; errors leave the caller's timeline untouched.
    pub(crate) fn resolve(
        &self,
        id: CommandId,
        graph: &SceneGraph,
        cfg: &Config,
    ) -> Result<AnimationCommand> {
        let name = self.kind.name();
        let start_time = self.start.unwrap_or(0.0);
        let duration = self.duration.unwrap_or(cfg.default_run_time);
        if !start_time.is_finite() || start_time < 0.0 {
            return Err(ChoreoError::invalid_command(format!(
                "{name} start_time must be finite and >= 0, got {start_time}"
            )));
        }
        if !duration.is_finite() || duration < 0.0 {
            return Err(ChoreoError::invalid_command(format!(
                "{name} duration must be finite and >= 0, got {duration}"
            )));
        }
        let easing = self.easing.unwrap_or(cfg.default_easing);
        if !easing.is_valid() {
            return Err(ChoreoError::invalid_command(format!(
                "{name} easing {easing:?} is not a function of time"
            )));
        }

        if self.kind.targets_nodes() {
            if self.targets.is_empty() {
                return Err(ChoreoError::invalid_command(format!("{name} needs at least one target")));
            }
            for (i, t) in self.targets.iter().enumerate() {
                graph.get(*t)?;
                if self.targets[..i].contains(t) {
                    return Err(ChoreoError::invalid_command(format!("{name} lists {t} twice")));
                }
            }
        } else if !self.targets.is_empty() {
            return Err(ChoreoError::invalid_command(format!("{name} does not take targets")));
        }

        let verb = Verb::from_draft(self.kind, &self.params)?;
        if let Verb::TransformInto { target } = verb {
            graph.get(target)?;
            if self.targets.contains(&target) {
                return Err(ChoreoError::invalid_command("transform_into target is also a source"));
            }
        }

        Ok(AnimationCommand {
            id,
            targets: self.targets.clone(),
            verb,
            start_time,
            duration,
            easing,
        })
    }
}

/// Progress of a command at some time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Progress {
    /// Linear progress in [0,1].
    pub raw: f32,
    /// `raw` after easing.
    pub eased: f32,
    /// Seconds since start, clamped to the interval.
    pub elapsed: f32,
}

/// Shape data a `transform_into` morphs toward.
#[derive(Clone, Debug, PartialEq)]
pub struct MorphTarget {
    pub geometry: Geometry,
    pub outline: Vec<Vec<Vec3>>,
    pub transform: Transform,
    pub style: Style,
}

/// Per-application context the sampler supplies.
#[derive(Clone, Debug, Default)]
pub struct ApplyEnv<'a> {
    pub nominal_opacity: f32,
    /// Scale at command start; only needed by anchored `scale_to`.
    pub scale_at_start: Option<Vec3>,
    pub morph_target: Option<&'a MorphTarget>,
    pub curve_samples: usize,
    pub morph_samples: usize,
}

/// A validated, immutable, scheduled command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationCommand {
    id: CommandId,
    targets: Vec<NodeId>,
    verb: Verb,
    start_time: f32,
    duration: f32,
    easing: Easing,
}

impl AnimationCommand {
    #[inline]
    pub fn id(&self) -> CommandId {
        self.id
    }

    pub fn targets(&self) -> &[NodeId] {
        &self.targets
    }

    pub fn verb(&self) -> &Verb {
        &self.verb
    }

    #[inline]
    pub fn start_time(&self) -> f32 {
        self.start_time
    }

    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[inline]
    pub fn end_time(&self) -> f32 {
        self.start_time + self.duration
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    /// Copy shifted later by `offset` seconds under a new id.
    pub(crate) fn offset_by(&self, id: CommandId, offset: f32) -> Self {
        Self {
            id,
            start_time: self.start_time + offset,
            ..self.clone()
        }
    }

    /// Progress at time `t`; zero-length commands jump to 1 at their start.
    pub fn progress(&self, t: f32) -> Progress {
        let elapsed = (t - self.start_time).clamp(0.0, self.duration);
        let raw = if self.duration <= 0.0 {
            if t >= self.start_time {
                1.0
            } else {
                0.0
            }
        } else {
            (elapsed / self.duration).clamp(0.0, 1.0)
        };
        Progress {
            raw,
            eased: self.easing.apply(raw),
            elapsed,
        }
    }

    /// New value of `attr` given the value the command starts from.
    pub fn apply(&self, attr: Attribute, base: &Value, p: Progress, env: &ApplyEnv<'_>) -> Value {
        let e = p.eased;
        match (&self.verb, attr) {
            (Verb::FadeIn, Attribute::Opacity) => Value::Float(lerp_f32(0.0, env.nominal_opacity, e)),
            (Verb::FadeIn, Attribute::Visible) => Value::Bool(true),
            (Verb::FadeOut, Attribute::Opacity) => match base {
                Value::Float(o) => Value::Float(lerp_f32(*o, 0.0, e)),
                _ => base.clone(),
            },
            (Verb::FadeOut | Verb::Remove, Attribute::Visible) => {
                if p.raw >= 1.0 {
                    Value::Bool(false)
                } else {
                    base.clone()
                }
            }
            (Verb::MoveTo { destination }, Attribute::Position) => match base {
                Value::Vec3(v) => Value::Vec3(lerp_vec3(*v, *destination, e)),
                _ => base.clone(),
            },
            (Verb::Shift { offset }, Attribute::Position) => match base {
                Value::Vec3(v) => Value::Vec3(math::add(*v, math::scale(*offset, e))),
                _ => base.clone(),
            },
            (Verb::ScaleBy { factor, .. }, Attribute::Scale) => match base {
                Value::Vec3(s) => Value::Vec3(math::scale(*s, lerp_f32(1.0, *factor, e))),
                _ => base.clone(),
            },
            (Verb::ScaleBy { factor, anchor: Some(a) }, Attribute::Position) => match base {
                Value::Vec3(v) => {
                    let k = lerp_f32(1.0, *factor, e);
                    Value::Vec3(math::add(*a, math::scale(math::sub(*v, *a), k)))
                }
                _ => base.clone(),
            },
            (Verb::ScaleTo { factor, .. }, Attribute::Scale) => match base {
                Value::Vec3(s) => Value::Vec3(lerp_vec3(*s, [*factor; 3], e)),
                _ => base.clone(),
            },
            (Verb::ScaleTo { factor, anchor: Some(a) }, Attribute::Position) => {
                match (base, env.scale_at_start) {
                    (Value::Vec3(v), Some(s0)) => {
                        let mut k = [1.0; 3];
                        for i in 0..3 {
                            if s0[i].abs() > f32::EPSILON {
                                k[i] = lerp_f32(s0[i], *factor, e) / s0[i];
                            }
                        }
                        Value::Vec3(math::add(*a, math::mul(math::sub(*v, *a), k)))
                    }
                    _ => base.clone(),
                }
            }
            (Verb::Rotate { angle, axis, .. }, Attribute::Rotation) => match base {
                Value::Quat(q) => {
                    let dq = math::quat_from_axis_angle(*axis, angle * e);
                    Value::Quat(math::quat_mul(dq, *q))
                }
                _ => base.clone(),
            },
            (Verb::Rotate { angle, axis, about: Some(p0) }, Attribute::Position) => match base {
                Value::Vec3(v) => {
                    let dq = math::quat_from_axis_angle(*axis, angle * e);
                    Value::Vec3(math::add(*p0, math::quat_rotate(dq, math::sub(*v, *p0))))
                }
                _ => base.clone(),
            },
            (Verb::TransformInto { .. }, _) => match env.morph_target {
                Some(target) => morph_attribute(attr, base, target, e, env),
                None => base.clone(),
            },
            (Verb::GrowFromPoint { .. }, Attribute::Scale) => match base {
                Value::Vec3(s) => Value::Vec3(math::scale(*s, e)),
                _ => base.clone(),
            },
            (Verb::GrowFromPoint { point }, Attribute::Position) => match base {
                Value::Vec3(v) => Value::Vec3(lerp_vec3(*point, *v, e)),
                _ => base.clone(),
            },
            (Verb::GrowFromPoint { .. } | Verb::Create, Attribute::Visible) => Value::Bool(true),
            (Verb::Create, Attribute::Reveal) => Value::Float(e),
            (Verb::FillTo { color, .. }, Attribute::FillColor) => match base {
                Value::Color(c) => Value::Color(lerp_color(*c, *color, e)),
                _ => base.clone(),
            },
            (Verb::FillTo { opacity: Some(o), .. }, Attribute::FillOpacity) => match base {
                Value::Float(b) => Value::Float(lerp_f32(*b, *o, e)),
                _ => base.clone(),
            },
            _ => base.clone(),
        }
    }

    /// New camera angle for `axis` given the angle at command start.
    pub fn apply_camera(&self, axis: CameraAxis, base: f32, p: Progress) -> f32 {
        match &self.verb {
            Verb::RotateCamera { axis: a, rate } if *a == axis => base + rate * p.elapsed,
            Verb::OrientCamera { phi, theta, gamma } => {
                let target = match axis {
                    CameraAxis::Phi => phi,
                    CameraAxis::Theta => theta,
                    CameraAxis::Gamma => gamma,
                };
                match target {
                    Some(v) => lerp_f32(base, *v, p.eased),
                    None => base,
                }
            }
            _ => base,
        }
    }
}

fn morph_attribute(
    attr: Attribute,
    base: &Value,
    target: &MorphTarget,
    e: f32,
    env: &ApplyEnv<'_>,
) -> Value {
    match (attr, base) {
        (Attribute::Shape, Value::Shape(g)) => {
            if e >= 1.0 {
                Value::Shape(target.geometry.clone())
            } else if e <= 0.0 {
                base.clone()
            } else {
                let from = g.outline(env.curve_samples);
                Value::Shape(Geometry::Path {
                    subpaths: morph::morph(&from, &target.outline, e, env.morph_samples),
                })
            }
        }
        (Attribute::Position, Value::Vec3(v)) => {
            Value::Vec3(lerp_vec3(*v, target.transform.position, e))
        }
        (Attribute::Scale, Value::Vec3(s)) => Value::Vec3(lerp_vec3(*s, target.transform.scale, e)),
        (Attribute::Rotation, Value::Quat(_)) => crate::interp::functions::linear_value(
            base,
            &Value::Quat(target.transform.rotation),
            e,
        ),
        (Attribute::FillColor, Value::Color(c)) => {
            Value::Color(lerp_color(*c, target.style.fill_color, e))
        }
        (Attribute::FillOpacity, Value::Float(o)) => {
            Value::Float(lerp_f32(*o, target.style.fill_opacity, e))
        }
        (Attribute::StrokeColor, Value::Color(c)) => {
            Value::Color(lerp_color(*c, target.style.stroke_color, e))
        }
        (Attribute::StrokeWidth, Value::Float(w)) => {
            Value::Float(lerp_f32(*w, target.style.stroke_width, e))
        }
        _ => base.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeBuilder;

    fn graph_with_circle() -> (SceneGraph, NodeId) {
        let mut g = SceneGraph::new();
        let c = g.add_node(NodeBuilder::new(Geometry::circle(1.0))).unwrap();
        (g, c)
    }

    #[test]
    fn missing_destination_is_unsupported() {
        let (g, c) = graph_with_circle();
        let draft = CommandDraft::new(VerbKind::MoveTo).targets(&[c]);
        let err = draft.resolve(CommandId(0), &g, &Config::default()).unwrap_err();
        assert!(matches!(err, ChoreoError::UnsupportedVerb { ref verb, .. } if verb == "move_to"));
    }

    #[test]
    fn negative_timing_and_empty_targets_are_invalid() {
        let (g, c) = graph_with_circle();
        let cfg = Config::default();
        for draft in [
            CommandDraft::fade_in(&[c]).start(-1.0),
            CommandDraft::fade_in(&[c]).duration(-0.5),
            CommandDraft::fade_in(&[]),
            CommandDraft::fade_in(&[c, c]),
            CommandDraft::wait().targets(&[c]),
        ] {
            let err = draft.resolve(CommandId(0), &g, &cfg).unwrap_err();
            assert!(matches!(err, ChoreoError::InvalidCommand { .. }), "{draft:?}");
        }
    }

    #[test]
    fn defaults_come_from_config() {
        let (g, c) = graph_with_circle();
        let cfg = Config {
            default_run_time: 2.5,
            default_easing: Easing::Linear,
            ..Config::default()
        };
        let cmd = CommandDraft::fade_in(&[c]).resolve(CommandId(4), &g, &cfg).unwrap();
        assert_eq!(cmd.duration(), 2.5);
        assert_eq!(cmd.easing(), Easing::Linear);
        assert_eq!(cmd.start_time(), 0.0);
        assert_eq!(cmd.end_time(), 2.5);
        assert_eq!(cmd.id(), CommandId(4));
    }

    #[test]
    fn zero_duration_progress_steps_at_start() {
        let (g, c) = graph_with_circle();
        let cmd = CommandDraft::create(&[c])
            .start(1.0)
            .duration(0.0)
            .resolve(CommandId(0), &g, &Config::default())
            .unwrap();
        assert_eq!(cmd.progress(0.5).raw, 0.0);
        assert_eq!(cmd.progress(1.0).raw, 1.0);
    }

    #[test]
    fn anchored_scale_touches_position() {
        let v = Verb::ScaleBy {
            factor: 2.0,
            anchor: Some([0.0; 3]),
        };
        assert_eq!(v.attributes(), &[Attribute::Scale, Attribute::Position]);
        assert!(Verb::Wait.attributes().is_empty());
        let cam = Verb::OrientCamera {
            phi: Some(1.0),
            theta: None,
            gamma: Some(0.0),
        };
        assert_eq!(cam.camera_axes(), vec![CameraAxis::Phi, CameraAxis::Gamma]);
    }

    #[test]
    fn rotate_camera_advances_with_elapsed_time() {
        let g = SceneGraph::new();
        let cmd = CommandDraft::rotate_camera(CameraAxis::Theta, 0.5)
            .start(1.0)
            .duration(2.0)
            .resolve(CommandId(0), &g, &Config::default())
            .unwrap();
        let p = cmd.progress(2.0);
        assert_eq!(cmd.apply_camera(CameraAxis::Theta, 1.0, p), 1.5);
        assert_eq!(cmd.apply_camera(CameraAxis::Phi, 1.0, p), 1.0);
        let end = cmd.progress(10.0);
        assert_eq!(cmd.apply_camera(CameraAxis::Theta, 1.0, end), 2.0);
    }
}
