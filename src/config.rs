//! Tunable constants for the motion pipeline and the recorder.
//!
//! Every field has a default, so a JSON file only needs to name the values it overrides.

use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::Fps;
use crate::foundation::error::{MirrorError, MirrorResult};
use crate::motion::scaling::DeviceClass;
use crate::render::compositor::FitMode;

/// Ordered recording format preferences; the first one the host supports wins.
pub const DEFAULT_FORMAT_PREFERENCES: [&str; 4] = [
    "video/webm;codecs=vp9",
    "video/webm;codecs=vp8",
    "video/webm",
    "video/mp4",
];

/// Per-device sampling and buffer limits.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceProfile {
    /// Sample every `sample_stride`-th pixel on both axes.
    pub sample_stride: u32,
    /// Largest allowed trail buffer axis, if capped.
    pub max_buffer_dimension: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MirrorConfig {
    /// Cells whose channel difference sum exceeds this are moving.
    pub motion_threshold: u16,
    pub noise_scale: f64,
    /// Noise z-advance per tick.
    pub noise_time_step: f64,
    pub noise_seed: u64,
    /// Trail buffer pixels per frame pixel before any device cap.
    pub step_size: u32,
    /// Alpha of the black fade rectangle drawn each tick.
    pub fade_alpha: u8,
    /// Alpha of the white trail strokes.
    pub stroke_alpha: u8,
    /// Stroke length in trail buffer pixels before device scale-down.
    pub stroke_length: f64,
    pub mobile: DeviceProfile,
    pub desktop: DeviceProfile,
    pub fit_mode: FitMode,
    pub capture_fps: u32,
    /// Target encoder bitrate in bits per second.
    pub video_bitrate: u32,
    /// Cool-down after a record toggle during which further toggles are ignored.
    pub debounce_ms: u64,
    pub format_preferences: Vec<String>,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            motion_threshold: 60,
            noise_scale: 0.02,
            noise_time_step: 0.01,
            noise_seed: 0x6d6f_7469_6f6e,
            step_size: 6,
            fade_alpha: 15,
            stroke_alpha: 80,
            stroke_length: 5.0,
            mobile: DeviceProfile {
                sample_stride: 4,
                max_buffer_dimension: Some(1024),
            },
            desktop: DeviceProfile {
                sample_stride: 2,
                max_buffer_dimension: None,
            },
            fit_mode: FitMode::Letterbox,
            capture_fps: 30,
            video_bitrate: 5_000_000,
            debounce_ms: 500,
            format_preferences: DEFAULT_FORMAT_PREFERENCES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl MirrorConfig {
    /// Load and validate a JSON config file.
    pub fn from_path(path: &Path) -> MirrorResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> MirrorResult<Self> {
        let cfg: Self = serde_json::from_str(text).map_err(|e| MirrorError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_json_string(&self) -> MirrorResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| MirrorError::serde(e.to_string()))
    }

    pub fn validate(&self) -> MirrorResult<()> {
        if self.motion_threshold >= 255 {
            return Err(MirrorError::validation(
                "motion_threshold must be below 255 (stroke weight maps [threshold, 255])",
            ));
        }
        if !(self.noise_scale.is_finite() && self.noise_scale > 0.0) {
            return Err(MirrorError::validation("noise_scale must be finite and > 0"));
        }
        if !self.noise_time_step.is_finite() {
            return Err(MirrorError::validation("noise_time_step must be finite"));
        }
        if self.step_size == 0 {
            return Err(MirrorError::validation("step_size must be > 0"));
        }
        if !(self.stroke_length.is_finite() && self.stroke_length > 0.0) {
            return Err(MirrorError::validation("stroke_length must be finite and > 0"));
        }
        for (name, p) in [("mobile", &self.mobile), ("desktop", &self.desktop)] {
            if p.sample_stride == 0 {
                return Err(MirrorError::validation(format!(
                    "{name}.sample_stride must be > 0"
                )));
            }
            if p.max_buffer_dimension == Some(0) {
                return Err(MirrorError::validation(format!(
                    "{name}.max_buffer_dimension must be > 0 when set"
                )));
            }
        }
        if self.capture_fps == 0 {
            return Err(MirrorError::validation("capture_fps must be > 0"));
        }
        if self.video_bitrate == 0 {
            return Err(MirrorError::validation("video_bitrate must be > 0"));
        }
        if self.format_preferences.is_empty() {
            return Err(MirrorError::validation(
                "format_preferences must name at least one format",
            ));
        }
        Ok(())
    }

    pub fn profile(&self, device: DeviceClass) -> DeviceProfile {
        match device {
            DeviceClass::Mobile => self.mobile,
            DeviceClass::Desktop => self.desktop,
        }
    }

    pub fn capture_fps(&self) -> MirrorResult<Fps> {
        Fps::new(self.capture_fps, 1)
    }

    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
