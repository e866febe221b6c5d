//! Attribute value kinds used when resolving commands per attribute.

use serde::{Deserialize, Serialize};

use crate::math::{Quat, Vec3};
use crate::shape::{Color, Geometry};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum Value {
    Float(f32),
    Vec3(Vec3),
    /// Quaternion (x, y, z, w)
    Quat(Quat),
    /// RGBA color
    Color(Color),
    /// Step-only boolean value (no blending)
    Bool(bool),
    /// Node geometry; morphs produce `Geometry::Path`
    Shape(Geometry),
}

impl Value {
    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            Value::Vec3(v) => Some(*v),
            _ => None,
        }
    }
}
