//! Core configuration for vizij-choreo-core.

use serde::{Deserialize, Serialize};

use crate::error::{ChoreoError, Result};
use crate::interp::Easing;

/// Authoring defaults and sampling resolution.
/// Every field has a default so partial JSON configs are accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Run time (seconds) of a play call that does not give one.
    pub default_run_time: f32,
    /// Easing applied to commands that do not pick their own.
    pub default_easing: Easing,
    /// Baking sample rate (Hz).
    pub frame_rate: f32,
    /// Points per circle/arc outline.
    pub curve_samples: usize,
    /// Points per subpath when morphing one shape into another.
    pub morph_samples: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_run_time: 1.0,
            default_easing: Easing::Linear,
            frame_rate: 60.0,
            curve_samples: 64,
            morph_samples: 96,
        }
    }
}

impl Config {
    /// Parse a JSON config, filling missing fields from `Config::default()`.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Config = serde_json::from_str(s).map_err(|e| ChoreoError::InvalidConfig {
            reason: format!("parse error: {e}"),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |reason: &str| {
            Err(ChoreoError::InvalidConfig {
                reason: reason.to_string(),
            })
        };
        if !self.default_run_time.is_finite() || self.default_run_time <= 0.0 {
            return fail("default_run_time must be finite and > 0");
        }
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return fail("frame_rate must be finite and > 0");
        }
        if self.curve_samples < 2 {
            return fail("curve_samples must be >= 2");
        }
        if self.morph_samples < 2 {
            return fail("morph_samples must be >= 2");
        }
        Ok(())
    }
}
