//! Interpolation helpers:
//! - lerp over scalars, vectors and colors
//! - quaternion NLERP with shortest-arc normalization
//! - cubic-bezier timing (x1, y1, x2, y2), inverted by bisection
//! - linear_value over attribute `Value`s

use crate::math::{Quat, Vec3};
use crate::shape::Color;
use crate::value::Value;

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn lerp_vec3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    [
        lerp_f32(a[0], b[0], t),
        lerp_f32(a[1], b[1], t),
        lerp_f32(a[2], b[2], t),
    ]
}

#[inline]
pub fn lerp_vec4(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    [
        lerp_f32(a[0], b[0], t),
        lerp_f32(a[1], b[1], t),
        lerp_f32(a[2], b[2], t),
        lerp_f32(a[3], b[3], t),
    ]
}

#[inline]
pub fn lerp_color(a: Color, b: Color, t: f32) -> Color {
    Color(lerp_vec4(a.0, b.0, t))
}

#[inline]
fn dot4(a: [f32; 4], b: [f32; 4]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

#[inline]
fn normalize4(mut q: [f32; 4]) -> [f32; 4] {
    let len2 = dot4(q, q);
    if len2 > 0.0 {
        let inv_len = len2.sqrt().recip();
        q[0] *= inv_len;
        q[1] *= inv_len;
        q[2] *= inv_len;
        q[3] *= inv_len;
    }
    q
}

/// Quaternion NLERP with shortest-arc correction.
/// If dot < 0, negate the second quaternion to ensure the shortest path.
/// Returns a normalized quaternion (x,y,z,w).
#[inline]
pub fn nlerp_quat(a: Quat, mut b: Quat, t: f32) -> Quat {
    if dot4(a, b) < 0.0 {
        b = [-b[0], -b[1], -b[2], -b[3]];
    }
    normalize4(lerp_vec4(a, b, t))
}

/// Cubic Bezier basis function
#[inline]
fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Given control points (x1, y1, x2, y2) and an input t in [0,1],
/// compute the eased y by inverting the x bezier via binary search.
pub fn bezier_ease(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    // Bezier(0,0,1,1) is exactly linear
    if x1 == 0.0 && y1 == 0.0 && x2 == 1.0 && y2 == 1.0 {
        return t;
    }
    // Monotonic X in [0,1] assumed for x1/x2 in [0,1]
    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    let mut mid = t;
    for _ in 0..24 {
        let x = cubic_bezier(0.0, x1, x2, 1.0, mid);
        if (x - t).abs() < 1e-6 {
            break;
        }
        if x < t {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(0.0, y1, y2, 1.0, mid)
}

/// Linear interpolation across Value kinds (Quat uses NLERP).
/// Bool and Shape values step at t >= 1.
pub fn linear_value(a: &Value, b: &Value, t: f32) -> Value {
    match (a, b) {
        (Value::Float(va), Value::Float(vb)) => Value::Float(lerp_f32(*va, *vb, t)),
        (Value::Vec3(va), Value::Vec3(vb)) => Value::Vec3(lerp_vec3(*va, *vb, t)),
        (Value::Quat(qa), Value::Quat(qb)) => Value::Quat(nlerp_quat(*qa, *qb, t)),
        (Value::Color(ca), Value::Color(cb)) => Value::Color(lerp_color(*ca, *cb, t)),
        (Value::Bool(_), Value::Bool(_)) | (Value::Shape(_), Value::Shape(_)) => {
            if t >= 1.0 {
                b.clone()
            } else {
                a.clone()
            }
        }
        // Fallback: if types mismatch, prefer left (fail-soft).
        _ => a.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bezier_linear_fast_path() {
        assert_eq!(bezier_ease(0.3, 0.0, 0.0, 1.0, 1.0), 0.3);
    }

    #[test]
    fn bezier_ease_in_out_is_symmetric() {
        let a = bezier_ease(0.25, 0.42, 0.0, 0.58, 1.0);
        let b = bezier_ease(0.75, 0.42, 0.0, 0.58, 1.0);
        assert!((a + b - 1.0).abs() < 1e-4);
        assert!(a < 0.25);
    }

    #[test]
    fn nlerp_takes_short_arc() {
        let a = [0.0, 0.0, 0.0, 1.0];
        let b = [0.0, 0.0, 0.0, -1.0];
        let q = nlerp_quat(a, b, 0.5);
        assert!((q[3].abs() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn mismatched_values_prefer_left() {
        let v = linear_value(&Value::Float(2.0), &Value::Bool(true), 0.5);
        assert_eq!(v, Value::Float(2.0));
    }
}
