use super::*;

use crate::capture::blob::{Blob, MemoryBlobStore};
use crate::host::download::MemoryDownloads;
use crate::host::ui::{RecordingUi, UiCall};

fn manager() -> (PlaybackManager, std::rc::Rc<std::cell::RefCell<crate::capture::blob::BlobStats>>) {
    let store = MemoryBlobStore::new();
    let stats = store.stats_handle();
    (PlaybackManager::new(Box::new(store)), stats)
}

fn video_artifact(pm: &mut PlaybackManager, id: &str, bytes: Vec<u8>) -> Artifact {
    let r = pm.blobs_mut().create(Blob {
        bytes,
        mime: id.to_owned(),
    });
    Artifact::video(&VideoFormat::new(id), r)
}

#[test]
fn filenames_follow_kind_and_format() {
    let (mut pm, _) = manager();
    assert_eq!(
        video_artifact(&mut pm, "video/webm;codecs=vp9", vec![]).filename,
        "motion-recording.webm"
    );
    assert_eq!(
        video_artifact(&mut pm, "video/mp4", vec![]).filename,
        "motion-recording.mp4"
    );
    let img = Artifact::image(vec![1]);
    assert_eq!(img.filename, "motion-image.png");
    assert_eq!(img.mime, "image/png");
}

#[test]
fn present_hides_live_view_and_offers_download() {
    let (mut pm, _) = manager();
    let ui = RecordingUi::new();
    let mut handle = ui.clone();
    let a = video_artifact(&mut pm, "video/webm", vec![7; 10]);
    pm.present(a, &mut handle).unwrap();

    let calls = ui.calls();
    assert!(calls.contains(&UiCall::LiveSurface(false)));
    assert!(calls.contains(&UiCall::ShowPlayback(PlaybackView {
        kind: ArtifactKind::Video,
        mime: "video/webm".to_owned(),
        byte_len: 10,
        looping: true,
    })));
    assert_eq!(ui.label(Control::Save).as_deref(), Some("Download Recording"));
    assert_eq!(ui.visible(Control::Restart), Some(true));
    assert_eq!(
        ui.announcements(),
        ["Recording ready for playback. You can download or restart."]
    );
}

#[test]
fn present_twice_without_restart_is_rejected() {
    let (mut pm, _) = manager();
    let mut ui = RecordingUi::new();
    pm.present(Artifact::image(vec![1]), &mut ui).unwrap();
    let err = pm.present(Artifact::image(vec![2]), &mut ui).unwrap_err();
    assert!(matches!(err, MirrorError::Playback(_)));
}

#[test]
fn save_keeps_reference_and_restart_releases_once() {
    let (mut pm, stats) = manager();
    let ui = RecordingUi::new();
    let mut handle = ui.clone();
    let downloads = MemoryDownloads::new();
    let mut sink = downloads.clone();

    let a = video_artifact(&mut pm, "video/mp4", vec![1, 2, 3]);
    pm.present(a, &mut handle).unwrap();
    assert!(pm.save(&mut sink, &mut handle).unwrap());
    assert!(pm.save(&mut sink, &mut handle).unwrap());
    assert_eq!(stats.borrow().released, 0);

    let saved = downloads.saved();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].filename, "motion-recording.mp4");
    assert_eq!(saved[0].bytes, vec![1, 2, 3]);

    assert!(pm.restart(&mut handle).unwrap());
    assert!(!pm.restart(&mut handle).unwrap());
    assert_eq!(stats.borrow().released, 1);
    assert_eq!(pm.blobs().live_count(), 0);
    assert_eq!(ui.count(|c| *c == UiCall::RemovePlayback), 1);
    assert_eq!(ui.visible(Control::Toggle), Some(true));
}

#[test]
fn image_artifact_has_nothing_to_release() {
    let (mut pm, stats) = manager();
    let mut ui = RecordingUi::new();
    pm.present(Artifact::image(vec![9, 9]), &mut ui).unwrap();
    assert_eq!(pm.artifact_bytes(), Some(&[9u8, 9][..]));
    assert!(pm.restart(&mut ui).unwrap());
    assert_eq!(stats.borrow().released, 0);
}

#[test]
fn save_without_artifact_is_a_no_op() {
    let (pm, _) = manager();
    let mut ui = RecordingUi::new();
    let mut sink = MemoryDownloads::new();
    assert!(!pm.save(&mut sink, &mut ui).unwrap());
    assert!(ui.announcements().is_empty());
}
