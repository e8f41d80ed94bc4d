use super::*;

#[test]
fn ready_is_reported_once_after_start() {
    let mut src = SyntheticSource::new(Size::new(64, 48));
    assert!(src.size().is_empty());
    assert!(src.current_frame().is_none());
    src.start().unwrap();
    src.start().unwrap();
    assert_eq!(src.poll_event(), Some(SourceEvent::Ready(Size::new(64, 48))));
    assert_eq!(src.poll_event(), None);
    assert_eq!(src.size(), Size::new(64, 48));
}

#[test]
fn denied_source_never_delivers_frames() {
    let mut src = SyntheticSource::denied(Size::new(64, 48));
    src.start().unwrap();
    assert_eq!(
        src.poll_event(),
        Some(SourceEvent::Failed(SourceFailure::PermissionDenied))
    );
    assert!(src.current_frame().is_none());
}

#[test]
fn consecutive_frames_differ() {
    let mut src = SyntheticSource::new(Size::new(64, 48)).with_speed(3);
    src.start().unwrap();
    let a = src.current_frame().unwrap().clone();
    let b = src.current_frame().unwrap().clone();
    assert_eq!(a.size(), b.size());
    assert_ne!(a.pixels, b.pixels);
}
