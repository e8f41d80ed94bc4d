use crate::config::MirrorConfig;
use crate::foundation::core::{Point, Size};
use crate::foundation::error::{MirrorError, MirrorResult};

/// Hard upper bound on either trail buffer axis, applied even when the device profile is uncapped.
pub const MAX_SURFACE_DIMENSION: u32 = 16_384;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Mobile,
    Desktop,
}

impl DeviceClass {
    /// Touch-capable hosts are treated as constrained devices.
    pub fn from_touch_points(max_touch_points: u32) -> Self {
        if max_touch_points > 0 {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }
}

/// Trail buffer sizing and sampling density for one frame size on one device class.
///
/// Derived at setup and on every accepted resize; both the motion stage and the compositor read
/// the same instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScalingPolicy {
    pub device_class: DeviceClass,
    pub frame_size: Size,
    pub buffer_size: Size,
    /// Factor (`<= 1`) applied to the raw `frame × step_size` target to respect the cap.
    pub scale_down: f64,
    /// Trail buffer pixels per frame pixel: `step_size × scale_down`.
    pub resolution_multiplier: f64,
    pub max_buffer_dimension: Option<u32>,
    pub sample_stride: u32,
}

impl ScalingPolicy {
    #[tracing::instrument(skip(cfg))]
    pub fn derive(frame: Size, device: DeviceClass, cfg: &MirrorConfig) -> MirrorResult<Self> {
        if frame.is_empty() {
            return Err(MirrorError::validation(format!(
                "cannot derive trail buffer for empty frame {frame}"
            )));
        }
        let profile = cfg.profile(device);
        let step = u64::from(cfg.step_size);
        let raw_w = u64::from(frame.width) * step;
        let raw_h = u64::from(frame.height) * step;

        let cap = u64::from(
            profile
                .max_buffer_dimension
                .map_or(MAX_SURFACE_DIMENSION, |c| c.min(MAX_SURFACE_DIMENSION)),
        );
        let larger = raw_w.max(raw_h);

        let (buf_w, buf_h, scale_down) = if larger > cap {
            // The binding axis lands exactly on the cap; the other axis is floored.
            let w = if raw_w == larger { cap } else { raw_w * cap / larger };
            let h = if raw_h == larger { cap } else { raw_h * cap / larger };
            (w.max(1), h.max(1), cap as f64 / larger as f64)
        } else {
            (raw_w, raw_h, 1.0)
        };

        let policy = Self {
            device_class: device,
            frame_size: frame,
            buffer_size: Size::new(buf_w as u32, buf_h as u32),
            scale_down,
            resolution_multiplier: f64::from(cfg.step_size) * scale_down,
            max_buffer_dimension: profile.max_buffer_dimension,
            sample_stride: profile.sample_stride.max(1),
        };
        tracing::debug!(
            buffer = %policy.buffer_size,
            multiplier = policy.resolution_multiplier,
            stride = policy.sample_stride,
            "derived scaling policy"
        );
        Ok(policy)
    }

    /// Frame pixel coordinate to trail buffer coordinate.
    pub fn to_buffer(&self, x: u32, y: u32) -> Point {
        Point::new(
            f64::from(x) * self.resolution_multiplier,
            f64::from(y) * self.resolution_multiplier,
        )
    }

    /// Scale a device-independent stroke length or weight into buffer space.
    pub fn scale(&self, v: f64) -> f64 {
        v * self.scale_down
    }
}

#[cfg(test)]
#[path = "../../tests/unit/motion/scaling.rs"]
mod tests;
