//! Virtual camera orientation.
//!
//! The camera is global state: camera commands target no node. Angles are
//! spherical (phi from the +z axis, theta around it) plus a roll `gamma`,
//! all in radians.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraAxis {
    Phi,
    Theta,
    Gamma,
}

impl CameraAxis {
    pub const ALL: [CameraAxis; 3] = [CameraAxis::Phi, CameraAxis::Theta, CameraAxis::Gamma];

    pub fn name(self) -> &'static str {
        match self {
            CameraAxis::Phi => "phi",
            CameraAxis::Theta => "theta",
            CameraAxis::Gamma => "gamma",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub phi: f32,
    pub theta: f32,
    pub gamma: f32,
}

impl CameraState {
    pub fn new(phi: f32, theta: f32) -> Self {
        Self {
            phi,
            theta,
            gamma: 0.0,
        }
    }

    #[inline]
    pub fn get(&self, axis: CameraAxis) -> f32 {
        match axis {
            CameraAxis::Phi => self.phi,
            CameraAxis::Theta => self.theta,
            CameraAxis::Gamma => self.gamma,
        }
    }

    #[inline]
    pub fn set(&mut self, axis: CameraAxis, value: f32) {
        match axis {
            CameraAxis::Phi => self.phi = value,
            CameraAxis::Theta => self.theta = value,
            CameraAxis::Gamma => self.gamma = value,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.phi.is_finite() && self.theta.is_finite() && self.gamma.is_finite()
    }
}
