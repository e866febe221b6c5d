//! Interpolation helpers, easing curves and shape morphing.

pub mod easing;
pub mod functions;
pub mod morph;

pub use easing::Easing;
