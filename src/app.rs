//! The single-threaded session: one event queue, one owner per piece of mutable state.
//!
//! Hosts report asynchronously (camera readiness, encoder chunks) through polling; [`MotionMirror::pump`]
//! turns those reports and user actions into [`AppEvent`]s and applies them in order, never in
//! the middle of a tick.

use std::collections::VecDeque;

use crate::capture::blob::BlobStore;
use crate::capture::clock::Clock;
use crate::capture::playback::PlaybackManager;
use crate::capture::recording::{RecorderState, RecordingController, ToggleOutcome};
use crate::config::MirrorConfig;
use crate::encode::host::{EncoderEvent, EncoderHost};
use crate::foundation::core::{Size, TickIndex};
use crate::foundation::error::{MirrorError, MirrorResult};
use crate::host::download::DownloadSink;
use crate::host::flags::{FlagStore, ONBOARDING_FLAG};
use crate::host::ui::{
    ANNOUNCE_CAMERA_READY, ANNOUNCE_RESTARTED, CAMERA_DENIED_MESSAGE, Control, Ui,
};
use crate::motion::scaling::DeviceClass;
use crate::motion::trail::{TickOutcome, TrailRenderer};
use crate::render::compositor::Compositor;
use crate::source::{FrameSource, SourceEvent, SourceFailure};

/// Platform collaborators wired into one session.
pub struct Hosts {
    pub source: Box<dyn FrameSource>,
    pub encoder: Box<dyn EncoderHost>,
    pub blobs: Box<dyn BlobStore>,
    pub ui: Box<dyn Ui>,
    pub flags: Box<dyn FlagStore>,
    pub downloads: Box<dyn DownloadSink>,
    pub clock: Box<dyn Clock>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppEvent {
    SourceReady(Size),
    SourceFailed(SourceFailure),
    /// Host render tick.
    Tick,
    /// Viewport changed.
    Resize(Size),
    ToggleRecording,
    Save,
    Restart,
    /// A modal opened over the live view.
    Pause,
    /// The modal closed.
    Resume,
    DismissOnboarding,
    EncoderChunk(Vec<u8>),
    EncoderStopped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    AwaitingCamera,
    Live,
    /// Fatal: camera refused or missing. Camera-dependent controls stay hidden.
    CameraFailed,
}

/// The motion-trail mirror: source → motion field → trail buffer → compositor, with recording
/// tapping the composited output.
pub struct MotionMirror {
    cfg: MirrorConfig,
    device: DeviceClass,

    source: Box<dyn FrameSource>,
    encoder: Box<dyn EncoderHost>,
    ui: Box<dyn Ui>,
    flags: Box<dyn FlagStore>,
    downloads: Box<dyn DownloadSink>,
    clock: Box<dyn Clock>,

    renderer: Option<TrailRenderer>,
    compositor: Compositor,
    recorder: RecordingController,
    playback: PlaybackManager,

    phase: SessionPhase,
    paused: bool,
    onboarding_visible: bool,
    pending_viewport: Option<Size>,
    tick: TickIndex,
    last_outcome: Option<TickOutcome>,
    queue: VecDeque<AppEvent>,
}

impl MotionMirror {
    pub fn new(
        cfg: MirrorConfig,
        device: DeviceClass,
        viewport: Size,
        hosts: Hosts,
    ) -> MirrorResult<Self> {
        cfg.validate()?;
        let Hosts {
            source,
            encoder,
            blobs,
            mut ui,
            flags,
            downloads,
            clock,
        } = hosts;

        let compositor = Compositor::new(viewport, cfg.fit_mode)?;
        let recorder = RecordingController::new(&cfg)?;

        let onboarding_visible = !flags.get(ONBOARDING_FLAG)?;
        ui.set_onboarding_visible(onboarding_visible);
        ui.set_control_label(Control::Toggle, recorder.mode(&*encoder).idle_label());
        ui.set_control_visible(Control::Save, false);
        ui.set_control_visible(Control::Restart, false);

        Ok(Self {
            cfg,
            device,
            source,
            encoder,
            ui,
            flags,
            downloads,
            clock,
            renderer: None,
            compositor,
            recorder,
            playback: PlaybackManager::new(blobs),
            phase: SessionPhase::AwaitingCamera,
            paused: false,
            onboarding_visible,
            pending_viewport: None,
            tick: TickIndex::default(),
            last_outcome: None,
            queue: VecDeque::new(),
        })
    }

    /// Ask the source for the camera. Readiness arrives later as [`AppEvent::SourceReady`].
    pub fn start(&mut self) -> MirrorResult<()> {
        self.source.start()?;
        self.pump()?;
        Ok(())
    }

    /// Queue a user or host event for the next [`Self::pump`].
    pub fn dispatch(&mut self, event: AppEvent) {
        self.queue.push_back(event);
    }

    /// Apply every queued and host-reported event. Returns how many were handled.
    pub fn pump(&mut self) -> MirrorResult<usize> {
        let mut handled = 0;
        loop {
            self.collect_host_events();
            let Some(event) = self.queue.pop_front() else {
                break;
            };
            self.handle(event)?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Dispatch one tick and pump.
    pub fn tick(&mut self) -> MirrorResult<()> {
        self.dispatch(AppEvent::Tick);
        self.pump()?;
        Ok(())
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// The render loop is frozen from stop until restart.
    pub fn is_frozen(&self) -> bool {
        self.recorder.state() == RecorderState::Stopped || self.playback.has_artifact()
    }

    /// A stopped recording is still waiting for the encoder to flush.
    pub fn awaiting_encoder(&self) -> bool {
        self.recorder.is_finalizing()
    }

    pub fn tick_index(&self) -> TickIndex {
        self.tick
    }

    pub fn last_outcome(&self) -> Option<TickOutcome> {
        self.last_outcome
    }

    pub fn renderer(&self) -> Option<&TrailRenderer> {
        self.renderer.as_ref()
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn recorder(&self) -> &RecordingController {
        &self.recorder
    }

    pub fn playback(&self) -> &PlaybackManager {
        &self.playback
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.cfg
    }

    pub fn pending_viewport(&self) -> Option<Size> {
        self.pending_viewport
    }

    fn collect_host_events(&mut self) {
        while let Some(ev) = self.source.poll_event() {
            self.queue.push_back(match ev {
                SourceEvent::Ready(size) => AppEvent::SourceReady(size),
                SourceEvent::Failed(failure) => AppEvent::SourceFailed(failure),
            });
        }
        while let Some(ev) = self.recorder.poll_encoder() {
            self.queue.push_back(match ev {
                EncoderEvent::Chunk(bytes) => AppEvent::EncoderChunk(bytes),
                EncoderEvent::Stopped => AppEvent::EncoderStopped,
            });
        }
    }

    fn handle(&mut self, event: AppEvent) -> MirrorResult<()> {
        match event {
            AppEvent::SourceReady(size) => self.on_source_ready(size),
            AppEvent::SourceFailed(failure) => {
                self.on_source_failed(failure);
                Ok(())
            }
            AppEvent::Tick => self.on_tick(),
            AppEvent::Resize(size) => self.on_resize(size),
            AppEvent::ToggleRecording => self.on_toggle(),
            AppEvent::Save => {
                self.playback
                    .save(self.downloads.as_mut(), self.ui.as_mut())?;
                Ok(())
            }
            AppEvent::Restart => self.on_restart(),
            AppEvent::Pause => {
                if self.phase == SessionPhase::Live && !self.is_frozen() {
                    self.paused = true;
                }
                Ok(())
            }
            AppEvent::Resume => {
                if !self.is_frozen() {
                    self.paused = false;
                }
                Ok(())
            }
            AppEvent::DismissOnboarding => {
                self.dismiss_onboarding();
                Ok(())
            }
            AppEvent::EncoderChunk(bytes) => {
                self.recorder.on_chunk(bytes);
                Ok(())
            }
            AppEvent::EncoderStopped => {
                if let Some(artifact) = self
                    .recorder
                    .on_encoder_stopped(self.playback.blobs_mut())?
                {
                    self.playback.present(artifact, self.ui.as_mut())?;
                }
                Ok(())
            }
        }
    }

    #[tracing::instrument(skip(self), fields(size = %size))]
    fn on_source_ready(&mut self, size: Size) -> MirrorResult<()> {
        if self.phase != SessionPhase::AwaitingCamera {
            return Ok(());
        }
        if size.is_empty() {
            tracing::debug!("ignoring readiness with empty dimensions");
            return Ok(());
        }
        self.renderer = Some(TrailRenderer::new(size, self.device, &self.cfg)?);
        self.phase = SessionPhase::Live;
        self.dismiss_onboarding();
        self.ui.set_control_visible(Control::Toggle, true);
        self.ui.announce(ANNOUNCE_CAMERA_READY);
        tracing::info!("camera ready");
        Ok(())
    }

    fn on_source_failed(&mut self, failure: SourceFailure) {
        if self.phase == SessionPhase::CameraFailed {
            return;
        }
        self.phase = SessionPhase::CameraFailed;
        self.renderer = None;
        let (message, err) = match &failure {
            SourceFailure::PermissionDenied => (
                CAMERA_DENIED_MESSAGE.to_owned(),
                MirrorError::permission_denied(CAMERA_DENIED_MESSAGE),
            ),
            SourceFailure::Unavailable(reason) => (
                format!("Camera unavailable: {reason}"),
                MirrorError::Other(anyhow::anyhow!("camera unavailable: {reason}")),
            ),
        };
        for control in [Control::Toggle, Control::Save, Control::Restart] {
            self.ui.set_control_visible(control, false);
        }
        self.ui.show_camera_error(&message);
        self.ui.announce(&message);
        tracing::error!(error = %err, recoverable = err.is_recoverable(), "camera failed");
    }

    /// Hide the panel and persist that it was seen. Write failures are logged, not returned.
    fn dismiss_onboarding(&mut self) {
        if !self.onboarding_visible {
            return;
        }
        self.onboarding_visible = false;
        self.ui.set_onboarding_visible(false);
        if let Err(e) = self.flags.set(ONBOARDING_FLAG, true) {
            tracing::warn!(error = %e, flag = ONBOARDING_FLAG, "failed to persist onboarding flag");
        }
    }

    fn on_tick(&mut self) -> MirrorResult<()> {
        if self.phase != SessionPhase::Live || self.paused || self.is_frozen() {
            return Ok(());
        }
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };
        let Some(frame) = self.source.current_frame() else {
            return Ok(());
        };

        let outcome = renderer.step(frame, self.tick)?;
        self.compositor.compose(renderer.buffer().surface())?;
        self.last_outcome = Some(outcome);
        self.tick = self.tick.next();

        let now = self.clock.now();
        self.recorder.capture_frame(now, self.compositor.output());
        self.recorder.tick_timer(now, self.ui.as_mut());
        Ok(())
    }

    fn on_resize(&mut self, viewport: Size) -> MirrorResult<()> {
        if viewport.is_empty() {
            tracing::debug!("ignoring resize to an empty viewport");
            return Ok(());
        }
        if self.recorder.state() != RecorderState::Idle || self.playback.has_artifact() {
            tracing::debug!(%viewport, "resize deferred until restart");
            self.pending_viewport = Some(viewport);
            return Ok(());
        }
        self.apply_viewport(viewport)
    }

    fn apply_viewport(&mut self, viewport: Size) -> MirrorResult<()> {
        self.pending_viewport = None;
        self.compositor.resize(viewport)?;
        self.rederive()
    }

    fn rederive(&mut self) -> MirrorResult<()> {
        if self.phase != SessionPhase::Live {
            return Ok(());
        }
        let size = self.source.size();
        match self.renderer.as_mut() {
            Some(r) => r.rederive(size, self.device, &self.cfg)?,
            None => self.renderer = Some(TrailRenderer::new(size, self.device, &self.cfg)?),
        }
        Ok(())
    }

    fn on_toggle(&mut self) -> MirrorResult<()> {
        if self.phase != SessionPhase::Live {
            tracing::debug!(phase = ?self.phase, "toggle ignored: camera not live");
            return Ok(());
        }
        let now = self.clock.now();
        let outcome = self.recorder.toggle(
            now,
            self.compositor.output(),
            self.encoder.as_mut(),
            self.ui.as_mut(),
        )?;
        if let ToggleOutcome::StillCaptured(artifact) = outcome {
            self.playback.present(artifact, self.ui.as_mut())?;
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn on_restart(&mut self) -> MirrorResult<()> {
        if self.phase == SessionPhase::CameraFailed {
            return Ok(());
        }
        if !self.playback.has_artifact() && self.recorder.state() != RecorderState::Stopped {
            // Nothing to discard: leave the trail and any running session alone.
            self.playback.restart(self.ui.as_mut())?;
            if self.recorder.state() == RecorderState::Idle {
                let label = self.recorder.mode(&*self.encoder).idle_label();
                self.ui.set_control_label(Control::Toggle, label);
            }
            return Ok(());
        }
        self.playback.restart(self.ui.as_mut())?;
        self.recorder.reset(self.ui.as_mut());
        let label = self.recorder.mode(&*self.encoder).idle_label();
        self.ui.set_control_label(Control::Toggle, label);
        match self.pending_viewport {
            Some(viewport) => self.apply_viewport(viewport)?,
            None => self.rederive()?,
        }
        self.last_outcome = None;
        self.ui.announce(ANNOUNCE_RESTARTED);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/app/app.rs"]
mod tests;
