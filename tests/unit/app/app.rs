use super::*;

use std::time::Duration;

use crate::capture::blob::MemoryBlobStore;
use crate::capture::clock::ManualClock;
use crate::encode::memory::InMemoryEncoderHost;
use crate::host::download::MemoryDownloads;
use crate::host::flags::MemoryFlagStore;
use crate::host::ui::{RecordingUi, UiCall};
use crate::source::SyntheticSource;

struct Rig {
    app: MotionMirror,
    ui: RecordingUi,
    flags: MemoryFlagStore,
    clock: ManualClock,
}

fn rig_with(source: SyntheticSource, encoder: InMemoryEncoderHost, flags: MemoryFlagStore) -> Rig {
    let ui = RecordingUi::new();
    let clock = ManualClock::new();
    let hosts = Hosts {
        source: Box::new(source),
        encoder: Box::new(encoder),
        blobs: Box::new(MemoryBlobStore::new()),
        ui: Box::new(ui.clone()),
        flags: Box::new(flags.clone()),
        downloads: Box::new(MemoryDownloads::new()),
        clock: Box::new(clock.clone()),
    };
    let app = MotionMirror::new(
        MirrorConfig::default(),
        DeviceClass::Desktop,
        Size::new(40, 30),
        hosts,
    )
    .unwrap();
    Rig {
        app,
        ui,
        flags,
        clock,
    }
}

fn rig() -> Rig {
    rig_with(
        SyntheticSource::new(Size::new(16, 12)),
        InMemoryEncoderHost::new(["video/webm"]),
        MemoryFlagStore::new(),
    )
}

#[test]
fn startup_shows_onboarding_and_labels_toggle() {
    let r = rig();
    assert_eq!(r.app.phase(), SessionPhase::AwaitingCamera);
    assert!(r.ui.calls().contains(&UiCall::Onboarding(true)));
    assert_eq!(r.ui.label(Control::Toggle).as_deref(), Some("Start Recording"));
    assert_eq!(r.ui.visible(Control::Save), Some(false));
}

#[test]
fn camera_ready_dismisses_and_persists_onboarding() {
    let mut r = rig();
    r.app.start().unwrap();
    assert_eq!(r.app.phase(), SessionPhase::Live);
    assert!(r.ui.calls().contains(&UiCall::Onboarding(false)));
    assert!(r.flags.get(ONBOARDING_FLAG).unwrap());
    assert_eq!(
        r.ui.announcements(),
        ["Camera ready. Motion visualization active."]
    );
    let policy = r.app.renderer().unwrap().policy();
    assert_eq!(policy.buffer_size, Size::new(96, 72));
}

#[test]
fn onboarded_flag_keeps_panel_hidden() {
    let mut flags = MemoryFlagStore::new();
    flags.set(ONBOARDING_FLAG, true).unwrap();
    let r = rig_with(
        SyntheticSource::new(Size::new(16, 12)),
        InMemoryEncoderHost::unsupported(),
        flags,
    );
    assert!(r.ui.calls().contains(&UiCall::Onboarding(false)));
    assert!(!r.ui.calls().contains(&UiCall::Onboarding(true)));
    assert_eq!(r.ui.label(Control::Toggle).as_deref(), Some("Capture Image"));
}

#[test]
fn manual_dismiss_persists_once() {
    let mut r = rig();
    r.app.dispatch(AppEvent::DismissOnboarding);
    r.app.dispatch(AppEvent::DismissOnboarding);
    r.app.pump().unwrap();
    assert!(r.flags.get(ONBOARDING_FLAG).unwrap());
    assert_eq!(r.ui.count(|c| *c == UiCall::Onboarding(false)), 1);
}

#[test]
fn ticks_before_ready_do_nothing() {
    let mut r = rig();
    r.app.tick().unwrap();
    r.app.dispatch(AppEvent::ToggleRecording);
    r.app.pump().unwrap();
    assert_eq!(r.app.tick_index(), TickIndex(0));
    assert_eq!(r.app.recorder().state(), RecorderState::Idle);
}

#[test]
fn ticks_draw_and_compose() {
    let mut r = rig();
    r.app.start().unwrap();
    r.app.tick().unwrap();
    assert!(matches!(
        r.app.last_outcome(),
        Some(TickOutcome::Drawn { strokes }) if strokes > 0
    ));
    assert_eq!(r.app.tick_index(), TickIndex(1));
    assert!(r.app.compositor().output().data.iter().any(|&b| b != 0));
}

#[test]
fn pause_and_resume_follow_session_state() {
    let mut r = rig();
    r.app.dispatch(AppEvent::Pause);
    r.app.pump().unwrap();
    assert!(!r.app.is_paused(), "pause requires a live camera");

    r.app.start().unwrap();
    r.app.tick().unwrap();
    r.app.tick().unwrap();
    let trail = |r: &Rig| r.app.renderer().unwrap().buffer().surface().clone();
    let before = trail(&r);

    r.app.dispatch(AppEvent::Pause);
    r.app.pump().unwrap();
    assert!(r.app.is_paused());
    assert_eq!(trail(&r), before);
    r.app.tick().unwrap();
    assert_eq!(r.app.tick_index(), TickIndex(2));
    assert_eq!(trail(&r), before);

    r.app.dispatch(AppEvent::Resume);
    r.app.pump().unwrap();
    assert!(!r.app.is_paused());
    assert_eq!(trail(&r), before);
    r.app.tick().unwrap();
    assert_eq!(r.app.tick_index(), TickIndex(3));
}

#[test]
fn resize_while_idle_applies_immediately() {
    let mut r = rig();
    r.app.start().unwrap();
    r.app.tick().unwrap();
    r.app.dispatch(AppEvent::Resize(Size::new(64, 20)));
    r.app.pump().unwrap();
    assert_eq!(r.app.compositor().viewport(), Size::new(64, 20));
    assert_eq!(r.app.pending_viewport(), None);
    assert!(
        r.app
            .renderer()
            .unwrap()
            .buffer()
            .surface()
            .data
            .chunks_exact(4)
            .all(|px| px == [0, 0, 0, 255])
    );
}

#[test]
fn resize_while_recording_is_deferred_until_restart() {
    let mut r = rig();
    r.app.start().unwrap();
    r.app.tick().unwrap();
    r.app.dispatch(AppEvent::ToggleRecording);
    r.app.dispatch(AppEvent::Resize(Size::new(64, 20)));
    r.app.pump().unwrap();
    assert_eq!(r.app.recorder().state(), RecorderState::Recording);
    assert_eq!(r.app.compositor().viewport(), Size::new(40, 30));
    assert_eq!(r.app.pending_viewport(), Some(Size::new(64, 20)));

    r.clock.advance(Duration::from_secs(1));
    r.app.dispatch(AppEvent::ToggleRecording);
    r.app.pump().unwrap();
    r.app.dispatch(AppEvent::Restart);
    r.app.pump().unwrap();
    assert_eq!(r.app.compositor().viewport(), Size::new(64, 20));
    assert_eq!(r.app.pending_viewport(), None);
}

#[test]
fn empty_resize_is_ignored() {
    let mut r = rig();
    r.app.dispatch(AppEvent::Resize(Size::new(0, 10)));
    r.app.pump().unwrap();
    assert_eq!(r.app.compositor().viewport(), Size::new(40, 30));
}

struct FullDisk;

impl FlagStore for FullDisk {
    fn get(&self, _key: &str) -> MirrorResult<bool> {
        Ok(false)
    }

    fn set(&mut self, _key: &str, _value: bool) -> MirrorResult<()> {
        Err(MirrorError::validation("disk full"))
    }
}

#[test]
fn flag_write_failure_does_not_block_readiness() {
    let ui = RecordingUi::new();
    let hosts = Hosts {
        source: Box::new(SyntheticSource::new(Size::new(16, 12))),
        encoder: Box::new(InMemoryEncoderHost::new(["video/webm"])),
        blobs: Box::new(MemoryBlobStore::new()),
        ui: Box::new(ui.clone()),
        flags: Box::new(FullDisk),
        downloads: Box::new(MemoryDownloads::new()),
        clock: Box::new(ManualClock::new()),
    };
    let mut app = MotionMirror::new(
        MirrorConfig::default(),
        DeviceClass::Desktop,
        Size::new(40, 30),
        hosts,
    )
    .unwrap();

    app.start().unwrap();
    assert_eq!(app.phase(), SessionPhase::Live);
    assert_eq!(ui.visible(Control::Toggle), Some(true));
    assert!(ui.calls().contains(&UiCall::Onboarding(false)));
    assert_eq!(
        ui.announcements(),
        ["Camera ready. Motion visualization active."]
    );
}
