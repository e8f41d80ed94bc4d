use std::time::Duration;

use crate::foundation::core::{Fps, Size};
use crate::foundation::error::MirrorResult;
use crate::render::surface::FrameRGBA;

/// A negotiated recording format, identified by its MIME-style id
/// (e.g. `video/webm;codecs=vp9`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VideoFormat {
    id: String,
}

impl VideoFormat {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Container MIME type without codec parameters.
    pub fn mime(&self) -> &str {
        self.id.split(';').next().unwrap_or(&self.id).trim()
    }

    /// Download file extension.
    pub fn extension(&self) -> &'static str {
        if self.id.contains("mp4") {
            "mp4"
        } else {
            "webm"
        }
    }
}

impl std::fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}

/// Pick the first format in `preferences` the host declares supported.
pub fn negotiate<S: AsRef<str>>(host: &dyn EncoderHost, preferences: &[S]) -> Option<VideoFormat> {
    preferences
        .iter()
        .map(AsRef::as_ref)
        .find(|id| host.is_format_supported(id))
        .map(VideoFormat::new)
}

/// Parameters for one encoder session.
#[derive(Clone, Debug, PartialEq)]
pub struct EncoderConfig {
    pub size: Size,
    pub fps: Fps,
    pub format: VideoFormat,
    /// Target bitrate in bits per second.
    pub bitrate: u32,
}

/// Asynchronous encoder notifications, delivered between ticks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EncoderEvent {
    /// One encoded segment. May be empty.
    Chunk(Vec<u8>),
    /// The encoder has flushed everything after `stop`.
    Stopped,
}

/// Host encoding capability.
pub trait EncoderHost {
    fn is_format_supported(&self, format: &str) -> bool;

    fn create_session(&mut self, cfg: EncoderConfig) -> MirrorResult<Box<dyn EncoderSession>>;
}

/// One running encode.
///
/// `push_frame` is only called between `start` and `stop`. After `stop`, remaining chunks and
/// then exactly one [`EncoderEvent::Stopped`] are reported through `poll_event`.
pub trait EncoderSession {
    fn start(&mut self) -> MirrorResult<()>;

    fn push_frame(&mut self, frame: &FrameRGBA) -> MirrorResult<()>;

    fn stop(&mut self) -> MirrorResult<()>;

    fn poll_event(&mut self) -> Option<EncoderEvent>;
}

/// Live pixel stream tapped from the output surface, throttled to a fixed frame rate.
///
/// The render loop may tick faster than the capture rate; frames offered before the next capture
/// slot are dropped.
#[derive(Clone, Debug)]
pub struct CaptureStream {
    size: Size,
    interval: Duration,
    next_due: Option<Duration>,
    captured: u64,
}

impl CaptureStream {
    pub fn new(size: Size, fps: Fps) -> Self {
        Self {
            size,
            interval: fps.frame_duration().max(Duration::from_nanos(1)),
            next_due: None,
            captured: 0,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn frames_captured(&self) -> u64 {
        self.captured
    }

    /// Whether a frame offered at `now` should be captured; advances the schedule when it is.
    pub fn should_capture(&mut self, now: Duration) -> bool {
        match self.next_due {
            Some(due) if now < due => false,
            Some(due) => {
                // Skip whole missed slots instead of bursting to catch up.
                let mut next = due + self.interval;
                while next <= now {
                    next += self.interval;
                }
                self.next_due = Some(next);
                self.captured += 1;
                true
            }
            None => {
                self.next_due = Some(now + self.interval);
                self.captured += 1;
                true
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/host.rs"]
mod tests;
