//! Motion differencing and the decaying trail surface it feeds.

pub mod field;
pub mod scaling;
pub mod trail;

pub use field::{MotionField, MotionSample, stroke_weight};
pub use scaling::{DeviceClass, ScalingPolicy};
pub use trail::{TickOutcome, TrailBuffer, TrailRenderer, TrailStyle};
