//! Shape geometry, colors and bounds.
//!
//! Geometry is immutable once a node is created: a node whose form changes
//! is morphed by a `transform_into` command, never edited in place. Every
//! geometry can report local bounds and an outline (a list of polyline
//! subpaths in node-local space) which placement and morphing build on.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::error::{ChoreoError, Result};
use crate::math::{self, Vec3};

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color(pub [f32; 4]);

/// Parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const WHITE: Color = Color([1.0, 1.0, 1.0, 1.0]);
    pub const BLACK: Color = Color([0.0, 0.0, 0.0, 1.0]);
    pub const GRAY: Color = Color([0.533_333, 0.533_333, 0.533_333, 1.0]);
    pub const RED: Color = Color([0.988_235, 0.384_314, 0.333_333, 1.0]);
    pub const ORANGE: Color = Color([1.0, 0.525_490, 0.184_314, 1.0]);
    pub const YELLOW: Color = Color([1.0, 1.0, 0.0, 1.0]);
    pub const GREEN: Color = Color([0.513_725, 0.756_863, 0.403_922, 1.0]);
    pub const BLUE: Color = Color([0.345_098, 0.768_627, 0.866_667, 1.0]);

    fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self([r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0])
    }

    /// Parse a hex color string: `#RGB`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        match bytes.len() {
            3 => {
                let r = hex_val(bytes[0])?;
                let g = hex_val(bytes[1])?;
                let b = hex_val(bytes[2])?;
                Some(Self::rgb8(r * 17, g * 17, b * 17))
            }
            6 | 8 => {
                let byte = |i: usize| -> Option<u8> {
                    Some(hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?)
                };
                let mut c = Self::rgb8(byte(0)?, byte(2)?, byte(4)?);
                if bytes.len() == 8 {
                    c.0[3] = byte(6)? as f32 / 255.0;
                }
                Some(c)
            }
            _ => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|c| c.is_finite())
    }
}

// ─── Bounds ──────────────────────────────────────────────────────────────

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut b = Bounds {
            min: first,
            max: first,
        };
        for p in iter {
            for i in 0..3 {
                b.min[i] = b.min[i].min(p[i]);
                b.max[i] = b.max[i].max(p[i]);
            }
        }
        Some(b)
    }

    pub fn union(self, other: Bounds) -> Bounds {
        let mut b = self;
        for i in 0..3 {
            b.min[i] = b.min[i].min(other.min[i]);
            b.max[i] = b.max[i].max(other.max[i]);
        }
        b
    }

    pub fn center(&self) -> Vec3 {
        math::scale(math::add(self.min, self.max), 0.5)
    }

    pub fn size(&self) -> Vec3 {
        math::sub(self.max, self.min)
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            [a[0], a[1], a[2]],
            [b[0], a[1], a[2]],
            [a[0], b[1], a[2]],
            [b[0], b[1], a[2]],
            [a[0], a[1], b[2]],
            [b[0], a[1], b[2]],
            [a[0], b[1], b[2]],
            [b[0], b[1], b[2]],
        ]
    }

    /// Point on the box in the given direction, using only the sign of each
    /// component: `UP` is the top-center, `UP + RIGHT` the top-right corner.
    pub fn critical_point(&self, direction: Vec3) -> Vec3 {
        let c = self.center();
        let mut p = c;
        for i in 0..3 {
            if direction[i] > 0.0 {
                p[i] = self.max[i];
            } else if direction[i] < 0.0 {
                p[i] = self.min[i];
            }
        }
        p
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// Coarse classification of a node, derived from its geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Arc,
    Polygon,
    ParametricCurve,
    Text,
    Line,
    Path,
    Group,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Geometry {
    Rectangle {
        width: f32,
        height: f32,
    },
    Circle {
        radius: f32,
    },
    /// Arc of `angle` radians starting at `start_angle`, centered on the origin.
    Arc {
        radius: f32,
        start_angle: f32,
        angle: f32,
    },
    Polygon {
        vertices: Vec<Vec3>,
    },
    /// Points sampled from a parametric function at creation.
    ParametricCurve {
        points: Vec<Vec3>,
    },
    /// Plain text or a LaTeX label. Layout is owned by the renderer; bounds are an estimate.
    Text {
        content: String,
        font_size: f32,
        #[serde(default)]
        latex: bool,
    },
    /// A segment; `tip` turns it into an arrow pointing at `end`.
    Line {
        start: Vec3,
        end: Vec3,
        #[serde(default)]
        tip: bool,
    },
    /// Free polyline subpaths, produced by morphing.
    Path {
        subpaths: Vec<Vec<Vec3>>,
    },
    /// Container; extent is the union of its children.
    Group,
}

/// Default font size, matching the renderer's default text size.
pub const DEFAULT_FONT_SIZE: f32 = 48.0;

/// Arrow tip length relative to the shaft.
const TIP_FRACTION: f32 = 0.12;

/// Most points a sampled parametric curve may hold.
pub const MAX_CURVE_POINTS: usize = 1 << 20;

impl Geometry {
    pub fn rectangle(width: f32, height: f32) -> Self {
        Geometry::Rectangle { width, height }
    }

    pub fn square(side: f32) -> Self {
        Geometry::Rectangle {
            width: side,
            height: side,
        }
    }

    pub fn circle(radius: f32) -> Self {
        Geometry::Circle { radius }
    }

    pub fn arc(radius: f32, start_angle: f32, angle: f32) -> Self {
        Geometry::Arc {
            radius,
            start_angle,
            angle,
        }
    }

    pub fn polygon(vertices: impl Into<Vec<Vec3>>) -> Self {
        Geometry::Polygon {
            vertices: vertices.into(),
        }
    }

    pub fn line(start: Vec3, end: Vec3) -> Self {
        Geometry::Line {
            start,
            end,
            tip: false,
        }
    }

    pub fn arrow(start: Vec3, end: Vec3) -> Self {
        Geometry::Line {
            start,
            end,
            tip: true,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Geometry::Text {
            content: content.into(),
            font_size: DEFAULT_FONT_SIZE,
            latex: false,
        }
    }

    pub fn tex(content: impl Into<String>, font_size: f32) -> Self {
        Geometry::Text {
            content: content.into(),
            font_size,
            latex: true,
        }
    }

    /// Sample `f` over `[t_min, t_max]` every `step`, always including `t_max`.
    pub fn parametric(
        f: impl Fn(f32) -> Vec3,
        t_min: f32,
        t_max: f32,
        step: f32,
    ) -> Result<Self> {
        if !(t_min.is_finite() && t_max.is_finite() && step.is_finite()) {
            return Err(ChoreoError::invalid_geometry("parametric range must be finite"));
        }
        if step <= 0.0 || t_max <= t_min {
            return Err(ChoreoError::invalid_geometry(
                "parametric range needs t_max > t_min and step > 0",
            ));
        }
        let steps = ((f64::from(t_max) - f64::from(t_min)) / f64::from(step)).floor();
        if steps >= MAX_CURVE_POINTS as f64 {
            return Err(ChoreoError::invalid_geometry(format!(
                "parametric step {step} over [{t_min}, {t_max}] needs more than {MAX_CURVE_POINTS} points"
            )));
        }
        let count = steps as usize;
        let mut points: Vec<Vec3> = (0..=count).map(|i| f(t_min + i as f32 * step)).collect();
        let last_t = t_min + count as f32 * step;
        if (t_max - last_t).abs() > step * 1e-3 {
            points.push(f(t_max));
        }
        let geometry = Geometry::ParametricCurve { points };
        geometry.validate()?;
        Ok(geometry)
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Geometry::Rectangle { .. } => ShapeKind::Rectangle,
            Geometry::Circle { .. } => ShapeKind::Circle,
            Geometry::Arc { .. } => ShapeKind::Arc,
            Geometry::Polygon { .. } => ShapeKind::Polygon,
            Geometry::ParametricCurve { .. } => ShapeKind::ParametricCurve,
            Geometry::Text { .. } => ShapeKind::Text,
            Geometry::Line { .. } => ShapeKind::Line,
            Geometry::Path { .. } => ShapeKind::Path,
            Geometry::Group => ShapeKind::Group,
        }
    }

    /// Reject non-finite or degenerate parameters.
    pub fn validate(&self) -> Result<()> {
        let positive = |v: f32, what: &str| -> Result<()> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ChoreoError::invalid_geometry(format!(
                    "{what} must be finite and > 0, got {v}"
                )))
            }
        };
        let finite_points = |pts: &[Vec3], what: &str| -> Result<()> {
            if pts.iter().all(|p| math::is_finite3(*p)) {
                Ok(())
            } else {
                Err(ChoreoError::invalid_geometry(format!(
                    "{what} contains non-finite points"
                )))
            }
        };
        match self {
            Geometry::Rectangle { width, height } => {
                positive(*width, "rectangle width")?;
                positive(*height, "rectangle height")
            }
            Geometry::Circle { radius } => positive(*radius, "circle radius"),
            Geometry::Arc {
                radius,
                start_angle,
                angle,
            } => {
                positive(*radius, "arc radius")?;
                if start_angle.is_finite() && angle.is_finite() && *angle != 0.0 {
                    Ok(())
                } else {
                    Err(ChoreoError::invalid_geometry(
                        "arc angles must be finite and the sweep non-zero",
                    ))
                }
            }
            Geometry::Polygon { vertices } => {
                if vertices.len() < 3 {
                    return Err(ChoreoError::invalid_geometry(
                        "polygon needs at least 3 vertices",
                    ));
                }
                finite_points(vertices, "polygon")
            }
            Geometry::ParametricCurve { points } => {
                if points.len() < 2 {
                    return Err(ChoreoError::invalid_geometry(
                        "parametric curve needs at least 2 samples",
                    ));
                }
                finite_points(points, "parametric curve")
            }
            Geometry::Text { font_size, .. } => positive(*font_size, "font size"),
            Geometry::Line { start, end, .. } => finite_points(&[*start, *end], "line"),
            Geometry::Path { subpaths } => {
                for sp in subpaths {
                    finite_points(sp, "path")?;
                }
                Ok(())
            }
            Geometry::Group => Ok(()),
        }
    }

    /// Outline as polyline subpaths in local space. Closed shapes repeat
    /// their first point at the end. Groups have no outline of their own.
    pub fn outline(&self, curve_samples: usize) -> Vec<Vec<Vec3>> {
        let n = curve_samples.max(2);
        match self {
            Geometry::Rectangle { width, height } => {
                let (hw, hh) = (width * 0.5, height * 0.5);
                vec![vec![
                    [hw, hh, 0.0],
                    [-hw, hh, 0.0],
                    [-hw, -hh, 0.0],
                    [hw, -hh, 0.0],
                    [hw, hh, 0.0],
                ]]
            }
            Geometry::Circle { radius } => vec![arc_points(*radius, 0.0, TAU, n)],
            Geometry::Arc {
                radius,
                start_angle,
                angle,
            } => vec![arc_points(*radius, *start_angle, *angle, n)],
            Geometry::Polygon { vertices } => {
                let mut loop_pts = vertices.clone();
                if let Some(first) = vertices.first() {
                    loop_pts.push(*first);
                }
                vec![loop_pts]
            }
            Geometry::ParametricCurve { points } => vec![points.clone()],
            Geometry::Text { .. } => match self.local_bounds(curve_samples) {
                Some(b) => {
                    let [x0, y0, _] = b.min;
                    let [x1, y1, _] = b.max;
                    vec![vec![
                        [x1, y1, 0.0],
                        [x0, y1, 0.0],
                        [x0, y0, 0.0],
                        [x1, y0, 0.0],
                        [x1, y1, 0.0],
                    ]]
                }
                None => Vec::new(),
            },
            Geometry::Line { start, end, tip } => {
                let mut out = vec![vec![*start, *end]];
                if *tip {
                    out.push(tip_points(*start, *end));
                }
                out
            }
            Geometry::Path { subpaths } => subpaths.clone(),
            Geometry::Group => Vec::new(),
        }
    }

    /// Local-space bounds; `None` for groups and empty paths.
    /// Curved outlines are measured with `samples` points, as `outline` draws them.
    pub fn local_bounds(&self, samples: usize) -> Option<Bounds> {
        match self {
            Geometry::Rectangle { width, height } => Some(Bounds {
                min: [-width * 0.5, -height * 0.5, 0.0],
                max: [width * 0.5, height * 0.5, 0.0],
            }),
            Geometry::Circle { radius } => Some(Bounds {
                min: [-radius, -radius, 0.0],
                max: [*radius, *radius, 0.0],
            }),
            Geometry::Text {
                content, font_size, ..
            } => {
                // Rough em box: the default font size is half a unit tall.
                let em = font_size / (2.0 * DEFAULT_FONT_SIZE);
                let chars = content.chars().count().max(1) as f32;
                let (hw, hh) = (chars * em * 0.3, em * 0.5);
                Some(Bounds {
                    min: [-hw, -hh, 0.0],
                    max: [hw, hh, 0.0],
                })
            }
            Geometry::Group => None,
            _ => {
                let outline = self.outline(samples);
                Bounds::from_points(outline.iter().flatten())
            }
        }
    }
}

fn arc_points(radius: f32, start: f32, sweep: f32, n: usize) -> Vec<Vec3> {
    (0..n)
        .map(|i| {
            let a = start + sweep * (i as f32) / ((n - 1) as f32);
            [radius * a.cos(), radius * a.sin(), 0.0]
        })
        .collect()
}

fn tip_points(start: Vec3, end: Vec3) -> Vec<Vec3> {
    let shaft = math::sub(end, start);
    let len = math::length(shaft);
    let Some(dir) = math::normalize(shaft) else {
        return vec![end];
    };
    let tip_len = (len * TIP_FRACTION).max(1e-3);
    let back = math::sub(end, math::scale(dir, tip_len));
    let side = math::scale(math::cross(dir, math::OUT), tip_len * 0.5);
    vec![math::add(back, side), end, math::sub(back, side)]
}
