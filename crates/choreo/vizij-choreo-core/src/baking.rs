//! Baking API: sample a choreography at a fixed frame rate over a time window.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::camera::CameraState;
use crate::config::Config;
use crate::error::Result;
use crate::sampling::state_at;
use crate::scene::SceneGraph;
use crate::snapshot::SceneSnapshot;
use crate::timeline::Timeline;

/// Upper bound on frames per bake; denser requests are thinned to fit.
pub const MAX_BAKED_FRAMES: usize = 100_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BakingConfig {
    /// Target frame rate (Hz) for baked samples.
    pub frame_rate: f32,
    /// Start time (seconds).
    pub start_time: f32,
    /// End time (seconds); if None, uses the timeline's total duration.
    pub end_time: Option<f32>,
}

impl Default for BakingConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60.0,
            start_time: 0.0,
            end_time: None,
        }
    }
}

impl BakingConfig {
    /// Whole timeline at the configured frame rate.
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            frame_rate: cfg.frame_rate,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BakedChoreography {
    pub frame_rate: f32,
    pub start_time: f32,
    pub end_time: f32,
    pub frames: Vec<SceneSnapshot>,
}

impl BakedChoreography {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Bake `timeline` against `graph`. Frames are inclusive of the end time.
pub fn bake(
    graph: &SceneGraph,
    timeline: &Timeline,
    camera: &CameraState,
    cfg: &Config,
    bake_cfg: &BakingConfig,
) -> BakedChoreography {
    let sr = if bake_cfg.frame_rate.is_finite() && bake_cfg.frame_rate > 0.0 {
        bake_cfg.frame_rate
    } else {
        cfg.frame_rate
    };
    let mut sr = sr.max(1.0);
    let start = if bake_cfg.start_time.is_finite() {
        bake_cfg.start_time.max(0.0)
    } else {
        0.0
    };
    let mut end = bake_cfg.end_time.unwrap_or(timeline.total_duration());
    if !end.is_finite() {
        end = timeline.total_duration();
    }
    let end = end.max(start);
    let span = end - start;
    if (f64::from(span) * f64::from(sr)).ceil() >= MAX_BAKED_FRAMES as f64 {
        let capped = ((MAX_BAKED_FRAMES - 1) as f64 / f64::from(span)) as f32;
        warn!("bake: {sr} Hz over {span:.3}s exceeds {MAX_BAKED_FRAMES} frames, using {capped} Hz");
        sr = capped;
    }
    // inclusive of end
    let frame_count = ((f64::from(span) * f64::from(sr)).ceil() as usize + 1).min(MAX_BAKED_FRAMES);

    let frames: Vec<SceneSnapshot> = (0..frame_count)
        .map(|f| {
            let t = (start + f as f32 / sr).min(end);
            state_at(graph, timeline, camera, cfg, t)
        })
        .collect();
    debug!(
        "bake: {} frames at {sr} Hz over [{start:.3}, {end:.3}]",
        frames.len()
    );

    BakedChoreography {
        frame_rate: sr,
        start_time: start,
        end_time: end,
        frames,
    }
}

/// Export baked data as serde_json::Value (stable schema for renderers).
pub fn export_baked_json(baked: &BakedChoreography) -> serde_json::Value {
    serde_json::to_value(baked).unwrap_or(serde_json::Value::Null)
}

/// Pretty-printed JSON text of a baked choreography.
pub fn export_baked_json_string(baked: &BakedChoreography) -> Result<String> {
    Ok(serde_json::to_string_pretty(baked)?)
}
