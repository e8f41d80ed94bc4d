use std::cell::RefCell;
use std::rc::Rc;

use crate::capture::playback::ArtifactKind;

/// Buttons the session drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    Toggle,
    Save,
    Restart,
}

pub const LABEL_START_RECORDING: &str = "Start Recording";
pub const LABEL_STOP_RECORDING: &str = "Stop Recording";
pub const LABEL_CAPTURE_IMAGE: &str = "Capture Image";
pub const LABEL_DOWNLOAD_RECORDING: &str = "Download Recording";
pub const LABEL_DOWNLOAD_IMAGE: &str = "Download Image";

pub const ANNOUNCE_CAMERA_READY: &str = "Camera ready. Motion visualization active.";
pub const ANNOUNCE_RECORDING_STARTED: &str = "Recording started.";
pub const ANNOUNCE_RECORDING_STOPPED: &str = "Recording stopped.";
pub const ANNOUNCE_RECORDING_READY: &str =
    "Recording ready for playback. You can download or restart.";
pub const ANNOUNCE_IMAGE_CAPTURED: &str = "Image captured. You can download or restart.";
pub const ANNOUNCE_DOWNLOAD_STARTED: &str = "Download started.";
pub const ANNOUNCE_RESTARTED: &str = "Restarted. Motion visualization active.";
pub const CAMERA_DENIED_MESSAGE: &str =
    "Camera access denied. Please allow camera access and reload.";

/// What the playback element shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaybackView {
    pub kind: ArtifactKind,
    pub mime: String,
    pub byte_len: usize,
    /// Video playback loops muted with autoplay; images are static.
    pub looping: bool,
}

/// Presentation collaborator. Every call is fire-and-forget.
pub trait Ui {
    fn announce(&mut self, text: &str);

    fn set_indicator_visible(&mut self, visible: bool);

    fn set_timer_text(&mut self, text: &str);

    fn set_control_label(&mut self, control: Control, label: &str);

    fn set_control_visible(&mut self, control: Control, visible: bool);

    fn set_live_surface_visible(&mut self, visible: bool);

    fn show_playback(&mut self, view: PlaybackView);

    fn remove_playback(&mut self);

    fn show_camera_error(&mut self, message: &str);

    fn set_onboarding_visible(&mut self, visible: bool);
}

/// Ui that reports through `tracing`, for headless runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogUi;

impl Ui for LogUi {
    fn announce(&mut self, text: &str) {
        tracing::info!(target: "motion_mirror::ui", "{text}");
    }

    fn set_indicator_visible(&mut self, visible: bool) {
        tracing::debug!(target: "motion_mirror::ui", visible, "recording indicator");
    }

    fn set_timer_text(&mut self, text: &str) {
        tracing::debug!(target: "motion_mirror::ui", elapsed = text, "recording timer");
    }

    fn set_control_label(&mut self, control: Control, label: &str) {
        tracing::debug!(target: "motion_mirror::ui", ?control, label, "control label");
    }

    fn set_control_visible(&mut self, control: Control, visible: bool) {
        tracing::debug!(target: "motion_mirror::ui", ?control, visible, "control visibility");
    }

    fn set_live_surface_visible(&mut self, visible: bool) {
        tracing::debug!(target: "motion_mirror::ui", visible, "live surface");
    }

    fn show_playback(&mut self, view: PlaybackView) {
        tracing::info!(
            target: "motion_mirror::ui",
            kind = ?view.kind,
            mime = %view.mime,
            bytes = view.byte_len,
            "playback shown"
        );
    }

    fn remove_playback(&mut self) {
        tracing::debug!(target: "motion_mirror::ui", "playback removed");
    }

    fn show_camera_error(&mut self, message: &str) {
        tracing::error!(target: "motion_mirror::ui", "{message}");
    }

    fn set_onboarding_visible(&mut self, visible: bool) {
        tracing::debug!(target: "motion_mirror::ui", visible, "onboarding");
    }
}

/// One recorded [`Ui`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiCall {
    Announce(String),
    Indicator(bool),
    Timer(String),
    Label(Control, String),
    Visible(Control, bool),
    LiveSurface(bool),
    ShowPlayback(PlaybackView),
    RemovePlayback,
    CameraError(String),
    Onboarding(bool),
}

/// Ui that records every call. Clones share the log.
#[derive(Clone, Debug, Default)]
pub struct RecordingUi {
    calls: Rc<RefCell<Vec<UiCall>>>,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<UiCall> {
        self.calls.borrow().clone()
    }

    pub fn announcements(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                UiCall::Announce(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }

    /// Most recent label set on `control`.
    pub fn label(&self, control: Control) -> Option<String> {
        self.calls.borrow().iter().rev().find_map(|c| match c {
            UiCall::Label(c, l) if *c == control => Some(l.clone()),
            _ => None,
        })
    }

    /// Most recent visibility set on `control`.
    pub fn visible(&self, control: Control) -> Option<bool> {
        self.calls.borrow().iter().rev().find_map(|c| match c {
            UiCall::Visible(c, v) if *c == control => Some(*v),
            _ => None,
        })
    }

    pub fn count(&self, pred: impl Fn(&UiCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    fn push(&self, call: UiCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl Ui for RecordingUi {
    fn announce(&mut self, text: &str) {
        self.push(UiCall::Announce(text.to_owned()));
    }

    fn set_indicator_visible(&mut self, visible: bool) {
        self.push(UiCall::Indicator(visible));
    }

    fn set_timer_text(&mut self, text: &str) {
        self.push(UiCall::Timer(text.to_owned()));
    }

    fn set_control_label(&mut self, control: Control, label: &str) {
        self.push(UiCall::Label(control, label.to_owned()));
    }

    fn set_control_visible(&mut self, control: Control, visible: bool) {
        self.push(UiCall::Visible(control, visible));
    }

    fn set_live_surface_visible(&mut self, visible: bool) {
        self.push(UiCall::LiveSurface(visible));
    }

    fn show_playback(&mut self, view: PlaybackView) {
        self.push(UiCall::ShowPlayback(view));
    }

    fn remove_playback(&mut self) {
        self.push(UiCall::RemovePlayback);
    }

    fn show_camera_error(&mut self, message: &str) {
        self.push(UiCall::CameraError(message.to_owned()));
    }

    fn set_onboarding_visible(&mut self, visible: bool) {
        self.push(UiCall::Onboarding(visible));
    }
}
