//! Small fixed-size vector and quaternion helpers.
//!
//! Vectors are plain `[f32; 3]` and quaternions `[f32; 4]` in (x, y, z, w)
//! order, matching the array-backed values used throughout the crate. The
//! arithmetic underneath goes through nalgebra.

use std::f32::consts::PI;

use nalgebra::{Quaternion, Unit, UnitQuaternion, Vector3};

pub type Vec3 = [f32; 3];
pub type Quat = [f32; 4];

pub const ORIGIN: Vec3 = [0.0, 0.0, 0.0];
pub const UP: Vec3 = [0.0, 1.0, 0.0];
pub const DOWN: Vec3 = [0.0, -1.0, 0.0];
pub const LEFT: Vec3 = [-1.0, 0.0, 0.0];
pub const RIGHT: Vec3 = [1.0, 0.0, 0.0];
/// Toward the viewer.
pub const OUT: Vec3 = [0.0, 0.0, 1.0];
pub const IN: Vec3 = [0.0, 0.0, -1.0];

/// Multiply degrees by this to get radians.
pub const DEGREES: f32 = PI / 180.0;

pub const QUAT_IDENTITY: Quat = [0.0, 0.0, 0.0, 1.0];

#[inline]
fn to_vector(a: Vec3) -> Vector3<f32> {
    Vector3::new(a[0], a[1], a[2])
}

#[inline]
fn from_vector(v: &Vector3<f32>) -> Vec3 {
    [v.x, v.y, v.z]
}

#[inline]
fn to_quaternion(q: Quat) -> Quaternion<f32> {
    // nalgebra takes (w, i, j, k)
    Quaternion::new(q[3], q[0], q[1], q[2])
}

#[inline]
fn from_quaternion(q: &Quaternion<f32>) -> Quat {
    [q.i, q.j, q.k, q.w]
}

/// Unit rotation for `q`, or `None` when `q` has no usable length.
#[inline]
fn unit_quaternion(q: Quat) -> Option<UnitQuaternion<f32>> {
    UnitQuaternion::try_new(to_quaternion(q), f32::EPSILON)
}

#[inline]
pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    from_vector(&(to_vector(a) + to_vector(b)))
}

#[inline]
pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    from_vector(&(to_vector(a) - to_vector(b)))
}

#[inline]
pub fn scale(a: Vec3, s: f32) -> Vec3 {
    from_vector(&(to_vector(a) * s))
}

/// Component-wise product.
#[inline]
pub fn mul(a: Vec3, b: Vec3) -> Vec3 {
    from_vector(&to_vector(a).component_mul(&to_vector(b)))
}

#[inline]
pub fn dot(a: Vec3, b: Vec3) -> f32 {
    to_vector(a).dot(&to_vector(b))
}

#[inline]
pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    from_vector(&to_vector(a).cross(&to_vector(b)))
}

#[inline]
pub fn length(a: Vec3) -> f32 {
    to_vector(a).norm()
}

#[inline]
pub fn normalize(a: Vec3) -> Option<Vec3> {
    let v = to_vector(a);
    if !v.norm().is_finite() {
        return None;
    }
    v.try_normalize(f32::EPSILON).map(|n| from_vector(&n))
}

#[inline]
pub fn is_finite3(a: Vec3) -> bool {
    a.iter().all(|c| c.is_finite())
}

/// Rotation of `angle` radians about `axis` (normalized here).
/// A degenerate axis yields the identity.
pub fn quat_from_axis_angle(axis: Vec3, angle: f32) -> Quat {
    match normalize(axis) {
        Some(n) => {
            let axis = Unit::new_unchecked(to_vector(n));
            from_quaternion(UnitQuaternion::from_axis_angle(&axis, angle).quaternion())
        }
        None => QUAT_IDENTITY,
    }
}

/// Hamilton product `a * b` (apply `b` first, then `a`).
pub fn quat_mul(a: Quat, b: Quat) -> Quat {
    from_quaternion(&(to_quaternion(a) * to_quaternion(b)))
}

/// Rotate a vector by a rotation quaternion. A zero quaternion leaves `v` as is.
pub fn quat_rotate(q: Quat, v: Vec3) -> Vec3 {
    match unit_quaternion(q) {
        Some(rot) => from_vector(&rot.transform_vector(&to_vector(v))),
        None => v,
    }
}

/// Rotate a vector by the inverse of `q`.
pub fn quat_inverse_rotate(q: Quat, v: Vec3) -> Vec3 {
    match unit_quaternion(q) {
        Some(rot) => from_vector(&rot.inverse_transform_vector(&to_vector(v))),
        None => v,
    }
}
