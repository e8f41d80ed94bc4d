use crate::foundation::error::{MirrorError, MirrorResult};

pub use kurbo::{Affine, Line, Point, Vec2};

/// Monotonic 0-based render tick counter.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TickIndex(pub u64);

impl TickIndex {
    /// Next tick, saturating.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> MirrorResult<Self> {
        if den == 0 {
            return Err(MirrorError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(MirrorError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame.
    pub fn frame_duration(self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(f64::from(self.den) / f64::from(self.num))
    }
}

/// Pixel dimensions of a frame, buffer or viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `true` when either axis is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height. Empty sizes report 0.
    pub fn aspect(self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        f64::from(self.width) / f64::from(self.height)
    }

    /// Byte length of a tightly packed RGBA8 buffer of this size.
    pub fn rgba_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }

    /// Parse `WIDTHxHEIGHT`, e.g. `1280x720`.
    pub fn parse(s: &str) -> MirrorResult<Self> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| MirrorError::validation(format!("expected WIDTHxHEIGHT, got '{s}'")))?;
        let width = w
            .parse::<u32>()
            .map_err(|e| MirrorError::validation(format!("invalid width '{w}': {e}")))?;
        let height = h
            .parse::<u32>()
            .map_err(|e| MirrorError::validation(format!("invalid height '{h}': {e}")))?;
        Ok(Self { width, height })
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
