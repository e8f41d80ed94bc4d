use std::time::Duration;

use crate::capture::blob::{Blob, BlobStore};
use crate::capture::playback::Artifact;
use crate::capture::timer::RecTimer;
use crate::config::MirrorConfig;
use crate::encode::host::{
    CaptureStream, EncoderConfig, EncoderEvent, EncoderHost, EncoderSession, VideoFormat,
    negotiate,
};
use crate::encode::still::encode_png;
use crate::foundation::core::Fps;
use crate::foundation::error::MirrorResult;
use crate::host::ui::{
    ANNOUNCE_RECORDING_STARTED, ANNOUNCE_RECORDING_STOPPED, Control, LABEL_CAPTURE_IMAGE,
    LABEL_START_RECORDING, LABEL_STOP_RECORDING, Ui,
};
use crate::render::surface::FrameRGBA;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
    /// Terminal for a session; only a reset leaves it.
    Stopped,
}

/// How the toggle captures, decided by format negotiation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureMode {
    Video(VideoFormat),
    Still,
}

impl CaptureMode {
    pub fn idle_label(&self) -> &'static str {
        match self {
            Self::Video(_) => LABEL_START_RECORDING,
            Self::Still => LABEL_CAPTURE_IMAGE,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Trigger arrived inside the cool-down and was dropped.
    Debounced,
    Started(VideoFormat),
    Stopped,
    StillCaptured(Artifact),
    /// No transition applies in the current state.
    Ignored,
}

/// Cool-down lock collapsing rapid triggers into one.
#[derive(Clone, Copy, Debug)]
pub struct Debounce {
    cooldown: Duration,
    locked_until: Option<Duration>,
}

impl Debounce {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            locked_until: None,
        }
    }

    /// Take the lock at `now` unless it is still held.
    pub fn try_acquire(&mut self, now: Duration) -> bool {
        if let Some(until) = self.locked_until
            && now < until
        {
            return false;
        }
        self.locked_until = Some(now.saturating_add(self.cooldown));
        true
    }
}

struct RecordingSession {
    format: VideoFormat,
    chunks: Vec<Vec<u8>>,
    encoder: Box<dyn EncoderSession>,
    stream: CaptureStream,
    stop_failed: bool,
}

/// Turns the composited output into a video or still artifact.
pub struct RecordingController {
    state: RecorderState,
    debounce: Debounce,
    preferences: Vec<String>,
    fps: Fps,
    bitrate: u32,
    degraded: bool,
    session: Option<RecordingSession>,
    timer: RecTimer,
}

impl RecordingController {
    pub fn new(cfg: &MirrorConfig) -> MirrorResult<Self> {
        Ok(Self {
            state: RecorderState::Idle,
            debounce: Debounce::new(cfg.debounce()),
            preferences: cfg.format_preferences.clone(),
            fps: cfg.capture_fps()?,
            bitrate: cfg.video_bitrate,
            degraded: false,
            session: None,
            timer: RecTimer::new(),
        })
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Whether an encoder failure forced still capture for the rest of the run.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn mode(&self, host: &dyn EncoderHost) -> CaptureMode {
        if self.degraded {
            return CaptureMode::Still;
        }
        negotiate(host, self.preferences.as_slice()).map_or(CaptureMode::Still, CaptureMode::Video)
    }

    /// Buffered chunk count of the running or finalizing session.
    pub fn chunk_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.chunks.len())
    }

    /// The session has stopped but the encoder has not yet reported [`EncoderEvent::Stopped`].
    pub fn is_finalizing(&self) -> bool {
        self.state == RecorderState::Stopped && self.session.is_some()
    }

    /// User trigger: start, stop or capture a still depending on state and capability.
    pub fn toggle(
        &mut self,
        now: Duration,
        surface: &FrameRGBA,
        host: &mut dyn EncoderHost,
        ui: &mut dyn Ui,
    ) -> MirrorResult<ToggleOutcome> {
        if !self.debounce.try_acquire(now) {
            tracing::debug!("toggle debounced");
            return Ok(ToggleOutcome::Debounced);
        }
        match self.state {
            RecorderState::Idle => match self.mode(host) {
                CaptureMode::Video(format) => self.start(now, format, surface, host, ui),
                CaptureMode::Still => self.capture_still(surface),
            },
            RecorderState::Recording => {
                self.stop(ui);
                Ok(ToggleOutcome::Stopped)
            }
            RecorderState::Stopped => Ok(ToggleOutcome::Ignored),
        }
    }

    #[tracing::instrument(skip_all, fields(format = %format))]
    fn start(
        &mut self,
        now: Duration,
        format: VideoFormat,
        surface: &FrameRGBA,
        host: &mut dyn EncoderHost,
        ui: &mut dyn Ui,
    ) -> MirrorResult<ToggleOutcome> {
        let cfg = EncoderConfig {
            size: surface.size(),
            fps: self.fps,
            format: format.clone(),
            bitrate: self.bitrate,
        };
        let encoder = host.create_session(cfg).and_then(|mut enc| {
            enc.start()?;
            Ok(enc)
        });
        let encoder = match encoder {
            Ok(enc) => enc,
            Err(e) => {
                tracing::warn!(error = %e, "encoder unavailable; falling back to still capture");
                self.degraded = true;
                return self.capture_still(surface);
            }
        };

        self.session = Some(RecordingSession {
            format: format.clone(),
            chunks: Vec::new(),
            encoder,
            stream: CaptureStream::new(surface.size(), self.fps),
            stop_failed: false,
        });
        self.state = RecorderState::Recording;
        self.timer.start(now, ui);
        ui.set_control_label(Control::Toggle, LABEL_STOP_RECORDING);
        ui.announce(ANNOUNCE_RECORDING_STARTED);
        tracing::info!("recording started");
        Ok(ToggleOutcome::Started(format))
    }

    fn capture_still(&mut self, surface: &FrameRGBA) -> MirrorResult<ToggleOutcome> {
        let png = encode_png(surface)?;
        self.state = RecorderState::Stopped;
        tracing::info!(bytes = png.len(), "still image captured");
        Ok(ToggleOutcome::StillCaptured(Artifact::image(png)))
    }

    /// `Recording → Stopped`. The artifact follows once the encoder reports it has flushed.
    pub fn stop(&mut self, ui: &mut dyn Ui) {
        if self.state != RecorderState::Recording {
            return;
        }
        self.state = RecorderState::Stopped;
        if let Some(session) = self.session.as_mut()
            && let Err(e) = session.encoder.stop()
        {
            tracing::warn!(error = %e, "encoder stop failed; finalizing with buffered chunks");
            session.stop_failed = true;
        }
        self.timer.stop(ui);
        ui.set_control_visible(Control::Toggle, false);
        ui.announce(ANNOUNCE_RECORDING_STOPPED);
        tracing::info!(chunks = self.chunk_count(), "recording stopped");
    }

    /// Feed the composited surface to the encoder when a capture slot is due.
    pub fn capture_frame(&mut self, now: Duration, surface: &FrameRGBA) {
        if self.state != RecorderState::Recording {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if surface.size() != session.stream.size() || !session.stream.should_capture(now) {
            return;
        }
        if let Err(e) = session.encoder.push_frame(surface) {
            tracing::warn!(error = %e, "dropped frame");
        }
    }

    pub fn tick_timer(&mut self, now: Duration, ui: &mut dyn Ui) {
        self.timer.update(now, ui);
    }

    pub fn poll_encoder(&mut self) -> Option<EncoderEvent> {
        let session = self.session.as_mut()?;
        if session.stop_failed {
            session.stop_failed = false;
            return Some(EncoderEvent::Stopped);
        }
        session.encoder.poll_event()
    }

    /// Append one encoded chunk. Empty chunks are dropped.
    pub fn on_chunk(&mut self, bytes: Vec<u8>) {
        let Some(session) = self.session.as_mut() else {
            tracing::debug!("chunk without a session dropped");
            return;
        };
        if bytes.is_empty() {
            return;
        }
        session.chunks.push(bytes);
    }

    /// Assemble buffered chunks into one blob and produce the video artifact.
    #[tracing::instrument(skip_all)]
    pub fn on_encoder_stopped(
        &mut self,
        blobs: &mut dyn BlobStore,
    ) -> MirrorResult<Option<Artifact>> {
        if self.state != RecorderState::Stopped {
            return Ok(None);
        }
        let Some(mut session) = self.session.take() else {
            return Ok(None);
        };
        let bytes = session.chunks.concat();
        session.chunks.clear();
        let len = bytes.len();
        let blob = blobs.create(Blob {
            bytes,
            mime: session.format.id().to_owned(),
        });
        tracing::info!(bytes = len, "recording assembled");
        Ok(Some(Artifact::video(&session.format, blob)))
    }

    /// Back to `Idle`, discarding any session.
    pub fn reset(&mut self, ui: &mut dyn Ui) {
        self.timer.stop(ui);
        self.session = None;
        self.state = RecorderState::Idle;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/recording.rs"]
mod tests;
