//! Easing curves: map linear progress in [0,1] to eased progress.

use serde::{Deserialize, Serialize};

use super::functions::bezier_ease;

/// Steepness of the sigmoid behind `Easing::Smooth`.
const SMOOTH_INFLECTION: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    /// Normalized sigmoid; slow start and end.
    #[default]
    Smooth,
    /// Quadratic acceleration.
    EaseIn,
    /// Quadratic deceleration.
    EaseOut,
    /// Cubic bezier (0.42, 0, 0.58, 1).
    EaseInOut,
    /// Smooth out to 1 at the midpoint and back to 0.
    ThereAndBack,
    /// Cubic bezier timing with control points (x1, y1, x2, y2).
    CubicBezier([f32; 4]),
}

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

fn smooth(t: f32) -> f32 {
    let error = sigmoid(-SMOOTH_INFLECTION / 2.0);
    ((sigmoid(SMOOTH_INFLECTION * (t - 0.5)) - error) / (1.0 - 2.0 * error)).clamp(0.0, 1.0)
}

impl Easing {
    /// Eased progress for raw progress `t`; input is clamped to [0,1] and
    /// every curve pins 0 -> 0. All curves except `ThereAndBack` pin 1 -> 1.
    pub fn apply(self, t: f32) -> f32 {
        if t.is_nan() || t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return match self {
                Easing::ThereAndBack => 0.0,
                _ => 1.0,
            };
        }
        match self {
            Easing::Linear => t,
            Easing::Smooth => smooth(t),
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => bezier_ease(t, 0.42, 0.0, 0.58, 1.0),
            Easing::ThereAndBack => {
                let folded = if t < 0.5 { 2.0 * t } else { 2.0 * (1.0 - t) };
                smooth(folded)
            }
            Easing::CubicBezier([x1, y1, x2, y2]) => bezier_ease(t, x1, y1, x2, y2),
        }
    }

    /// Bezier control points must keep x inside [0,1] so the curve stays a function of time.
    pub fn is_valid(self) -> bool {
        match self {
            Easing::CubicBezier([x1, y1, x2, y2]) => {
                [x1, y1, x2, y2].iter().all(|c| c.is_finite())
                    && (0.0..=1.0).contains(&x1)
                    && (0.0..=1.0).contains(&x2)
            }
            _ => true,
        }
    }
}
