use crate::foundation::error::{MirrorError, MirrorResult};
use crate::foundation::math::map_range_clamped;
use crate::source::Frame;

/// Largest possible `|dR| + |dG| + |dB|`.
pub const MAX_MAGNITUDE: u16 = 765;
/// Stroke weight at or below the motion threshold.
pub const MIN_STROKE_WEIGHT: f64 = 0.5;
/// Stroke weight at a single-channel full swing (magnitude 255) and above.
pub const MAX_STROKE_WEIGHT: f64 = 2.0;
const WEIGHT_DOMAIN_HI: f64 = 255.0;

/// One sampled grid cell. `grid_x`/`grid_y` are frame pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotionSample {
    pub grid_x: u32,
    pub grid_y: u32,
    /// Sum of absolute RGB channel differences, `0..=765`.
    pub magnitude: u16,
    pub is_moving: bool,
}

/// Sum of absolute RGB differences between two RGBA pixels; alpha is ignored.
pub fn channel_diff(a: &[u8], b: &[u8]) -> u16 {
    u16::from(a[0].abs_diff(b[0])) + u16::from(a[1].abs_diff(b[1])) + u16::from(a[2].abs_diff(b[2]))
}

/// Map a motion magnitude to a stroke weight: linear over `[threshold, 255]` onto `[0.5, 2]`,
/// clamped outside.
pub fn stroke_weight(magnitude: u16, threshold: u16) -> f64 {
    map_range_clamped(
        f64::from(magnitude),
        f64::from(threshold),
        WEIGHT_DOMAIN_HI,
        MIN_STROKE_WEIGHT,
        MAX_STROKE_WEIGHT,
    )
}

/// Strided frame differencing against the previous frame.
#[derive(Clone, Copy, Debug)]
pub struct MotionField {
    threshold: u16,
    stride: u32,
}

impl MotionField {
    pub fn new(threshold: u16, stride: u32) -> Self {
        Self {
            threshold,
            stride: stride.max(1),
        }
    }

    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn is_moving(&self, magnitude: u16) -> bool {
        magnitude > self.threshold
    }

    /// Stroke weight for `magnitude` under this field's threshold.
    pub fn weight(&self, magnitude: u16) -> f64 {
        stroke_weight(magnitude, self.threshold)
    }

    /// Visit every sampled cell in row-major order.
    ///
    /// Frames of different dimensions are rejected without visiting anything.
    pub fn scan(
        &self,
        current: &Frame,
        previous: &Frame,
        mut visit: impl FnMut(MotionSample),
    ) -> MirrorResult<()> {
        if current.size() != previous.size() || current.pixels.len() != previous.pixels.len() {
            return Err(MirrorError::dimension_mismatch(format!(
                "current frame {} vs previous frame {}",
                current.size(),
                previous.size()
            )));
        }

        let w = current.width as usize;
        let step = self.stride as usize;
        for y in (0..current.height).step_by(step) {
            for x in (0..current.width).step_by(step) {
                let i = ((y as usize) * w + (x as usize)) * 4;
                let magnitude = channel_diff(&current.pixels[i..i + 4], &previous.pixels[i..i + 4]);
                visit(MotionSample {
                    grid_x: x,
                    grid_y: y,
                    magnitude,
                    is_moving: self.is_moving(magnitude),
                });
            }
        }
        Ok(())
    }

    /// Collect every sampled cell.
    pub fn samples(&self, current: &Frame, previous: &Frame) -> MirrorResult<Vec<MotionSample>> {
        let mut out = Vec::new();
        self.scan(current, previous, |s| out.push(s))?;
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/motion/field.rs"]
mod tests;
