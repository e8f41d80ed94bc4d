//! Persistent trail surface and the per-tick motion-to-stroke step.

use crate::config::MirrorConfig;
use crate::foundation::core::{Line, Size, TickIndex, Vec2};
use crate::foundation::error::MirrorResult;
use crate::foundation::noise::ValueNoise3;
use crate::motion::field::{MotionField, MotionSample};
use crate::motion::scaling::{DeviceClass, ScalingPolicy};
use crate::render::raster::{PremulRgba8, fade_toward_black_in_place, stroke_add_in_place};
use crate::render::surface::FrameRGBA;
use crate::source::Frame;

const OPAQUE_BLACK: PremulRgba8 = [0, 0, 0, 255];
/// Noise value in `[0, 1)` maps to `[0, 4π)` radians.
const ANGLE_SPAN: f64 = 2.0 * std::f64::consts::TAU;

/// Off-screen accumulation surface. Starts opaque black and is never fully cleared between ticks.
#[derive(Clone, Debug)]
pub struct TrailBuffer {
    surface: FrameRGBA,
}

impl TrailBuffer {
    pub fn new(size: Size) -> Self {
        Self {
            surface: FrameRGBA::filled(size, OPAQUE_BLACK),
        }
    }

    pub fn size(&self) -> Size {
        self.surface.size()
    }

    pub fn surface(&self) -> &FrameRGBA {
        &self.surface
    }

    /// Normal-blend a black rectangle at `alpha` over the whole surface.
    pub fn fade(&mut self, alpha: u8) -> MirrorResult<()> {
        fade_toward_black_in_place(&mut self.surface.data, alpha)
    }

    /// Additively draw one stroke.
    pub fn stroke(&mut self, line: Line, weight: f64, color: PremulRgba8) -> MirrorResult<()> {
        let size = self.size();
        stroke_add_in_place(&mut self.surface.data, size, line, weight, color)
    }
}

/// Stroke appearance shared by every tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailStyle {
    pub fade_alpha: u8,
    pub stroke_color: PremulRgba8,
    pub stroke_length: f64,
    pub noise_scale: f64,
    pub noise_time_step: f64,
}

impl TrailStyle {
    pub fn from_config(cfg: &MirrorConfig) -> Self {
        let a = cfg.stroke_alpha;
        Self {
            fade_alpha: cfg.fade_alpha,
            // White at `a`, premultiplied.
            stroke_color: [a, a, a, a],
            stroke_length: cfg.stroke_length,
            noise_scale: cfg.noise_scale,
            noise_time_step: cfg.noise_time_step,
        }
    }
}

/// What a tick did to the trail buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Faded and drew `strokes` strokes.
    Drawn { strokes: usize },
    /// Frame dimensions disagreed with the derived buffers; nothing was touched.
    SkippedMismatch,
}

/// Owns the trail buffer and the previous frame, and evolves them one tick at a time.
pub struct TrailRenderer {
    policy: ScalingPolicy,
    field: MotionField,
    style: TrailStyle,
    noise: ValueNoise3,
    buffer: TrailBuffer,
    previous: Frame,
    moving: Vec<MotionSample>,
}

impl TrailRenderer {
    pub fn new(frame: Size, device: DeviceClass, cfg: &MirrorConfig) -> MirrorResult<Self> {
        let policy = ScalingPolicy::derive(frame, device, cfg)?;
        Ok(Self {
            field: MotionField::new(cfg.motion_threshold, policy.sample_stride),
            style: TrailStyle::from_config(cfg),
            noise: ValueNoise3::new(cfg.noise_seed),
            buffer: TrailBuffer::new(policy.buffer_size),
            previous: Frame::blank(frame),
            moving: Vec::new(),
            policy,
        })
    }

    /// Re-derive sizing for `frame`, resetting the trail to black and the previous frame to blank.
    pub fn rederive(&mut self, frame: Size, device: DeviceClass, cfg: &MirrorConfig) -> MirrorResult<()> {
        *self = Self::new(frame, device, cfg)?;
        Ok(())
    }

    pub fn policy(&self) -> &ScalingPolicy {
        &self.policy
    }

    pub fn buffer(&self) -> &TrailBuffer {
        &self.buffer
    }

    pub fn previous_frame(&self) -> &Frame {
        &self.previous
    }

    /// Angle in `[0, 4π)` for the sample at frame pixel `(x, y)` on `tick`.
    pub fn stroke_angle(&self, x: u32, y: u32, tick: TickIndex) -> f64 {
        let n = self.noise.sample(
            f64::from(x) * self.style.noise_scale,
            f64::from(y) * self.style.noise_scale,
            tick.0 as f64 * self.style.noise_time_step,
        );
        n * ANGLE_SPAN
    }

    /// Fade, diff against the previous frame, draw strokes, then remember `frame`.
    pub fn step(&mut self, frame: &Frame, tick: TickIndex) -> MirrorResult<TickOutcome> {
        if frame.size() != self.policy.frame_size || frame.size() != self.previous.size() {
            tracing::debug!(
                frame = %frame.size(),
                expected = %self.policy.frame_size,
                "skipping tick: frame does not match derived buffers"
            );
            return Ok(TickOutcome::SkippedMismatch);
        }

        self.buffer.fade(self.style.fade_alpha)?;

        let policy = self.policy;
        let length = policy.scale(self.style.stroke_length);
        let mut moving = std::mem::take(&mut self.moving);
        moving.clear();
        self.field.scan(frame, &self.previous, |s| {
            if s.is_moving {
                moving.push(s);
            }
        })?;

        for s in &moving {
            let angle = self.stroke_angle(s.grid_x, s.grid_y, tick);
            let start = policy.to_buffer(s.grid_x, s.grid_y);
            let dir = Vec2::new(angle.cos(), angle.sin()) * length;
            let weight = policy.scale(self.field.weight(s.magnitude));
            self.buffer
                .stroke(Line::new(start, start + dir), weight, self.style.stroke_color)?;
        }

        let strokes = moving.len();
        self.moving = moving;
        self.previous.copy_from(frame)?;
        Ok(TickOutcome::Drawn { strokes })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/motion/trail.rs"]
mod tests;
