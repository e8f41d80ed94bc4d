use super::*;

fn solid(size: Size, rgb: [u8; 3]) -> Frame {
    let mut f = Frame::blank(size);
    for px in f.pixels.chunks_exact_mut(4) {
        px.copy_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
    }
    f
}

fn lit_channel_sum(buf: &TrailBuffer) -> u64 {
    buf.surface()
        .data
        .chunks_exact(4)
        .map(|px| u64::from(px[0]) + u64::from(px[1]) + u64::from(px[2]))
        .sum()
}

fn renderer(frame: Size) -> TrailRenderer {
    TrailRenderer::new(frame, DeviceClass::Desktop, &MirrorConfig::default()).unwrap()
}

#[test]
fn new_buffer_is_opaque_black_at_policy_size() {
    let r = renderer(Size::new(32, 16));
    assert_eq!(r.buffer().size(), Size::new(192, 96));
    assert!(
        r.buffer()
            .surface()
            .data
            .chunks_exact(4)
            .all(|px| px == [0, 0, 0, 255])
    );
}

#[test]
fn first_tick_against_blank_previous_draws_and_stores_frame() {
    let size = Size::new(32, 16);
    let mut r = renderer(size);
    let frame = solid(size, [200, 200, 200]);
    let out = r.step(&frame, TickIndex(0)).unwrap();
    assert!(matches!(out, TickOutcome::Drawn { strokes } if strokes > 0));
    assert_eq!(r.previous_frame(), &frame);
    assert!(lit_channel_sum(r.buffer()) > 0);
}

#[test]
fn still_scene_only_fades() {
    let size = Size::new(32, 16);
    let mut r = renderer(size);
    let frame = solid(size, [200, 200, 200]);
    r.step(&frame, TickIndex(0)).unwrap();

    let before = r.buffer().surface().clone();
    let out = r.step(&frame, TickIndex(1)).unwrap();
    assert_eq!(out, TickOutcome::Drawn { strokes: 0 });

    let after = r.buffer().surface();
    let mut dimmed = false;
    for (a, b) in before.data.chunks_exact(4).zip(after.data.chunks_exact(4)) {
        for c in 0..3 {
            assert!(b[c] <= a[c]);
            dimmed |= b[c] < a[c];
        }
    }
    assert!(dimmed);
}

#[test]
fn single_changed_pixel_draws_one_stroke() {
    let size = Size::new(960, 540);
    let mut r = renderer(size);
    let prev = solid(size, [10, 10, 10]);
    r.step(&prev, TickIndex(0)).unwrap();
    r.step(&prev, TickIndex(1)).unwrap();

    let mut cur = prev.clone();
    cur.set_pixel(100, 50, [200, 10, 10, 255]);
    let out = r.step(&cur, TickIndex(2)).unwrap();
    assert_eq!(out, TickOutcome::Drawn { strokes: 1 });

    // The stroke starts at (600, 300) in buffer space.
    let px = r.buffer().surface().pixel(600, 300).unwrap();
    assert!(px[0] > 0);
}

#[test]
fn mismatched_frame_skips_everything() {
    let mut r = renderer(Size::new(32, 16));
    r.step(&solid(Size::new(32, 16), [200, 200, 200]), TickIndex(0))
        .unwrap();
    let buffer_before = r.buffer().surface().clone();
    let prev_before = r.previous_frame().clone();

    let out = r
        .step(&solid(Size::new(16, 16), [0, 0, 0]), TickIndex(1))
        .unwrap();
    assert_eq!(out, TickOutcome::SkippedMismatch);
    assert_eq!(r.buffer().surface(), &buffer_before);
    assert_eq!(r.previous_frame(), &prev_before);
}

#[test]
fn stroke_angle_is_deterministic_and_bounded() {
    let a = renderer(Size::new(32, 16));
    let b = renderer(Size::new(32, 16));
    for t in 0..20 {
        let x = a.stroke_angle(t * 3, t, TickIndex(u64::from(t)));
        assert_eq!(x, b.stroke_angle(t * 3, t, TickIndex(u64::from(t))));
        assert!((0.0..4.0 * std::f64::consts::PI).contains(&x));
    }
}

#[test]
fn rederive_resets_trail() {
    let size = Size::new(32, 16);
    let mut r = renderer(size);
    r.step(&solid(size, [200, 200, 200]), TickIndex(0)).unwrap();
    assert!(lit_channel_sum(r.buffer()) > 0);

    r.rederive(size, DeviceClass::Mobile, &MirrorConfig::default())
        .unwrap();
    assert_eq!(lit_channel_sum(r.buffer()), 0);
    assert_eq!(r.policy().device_class, DeviceClass::Mobile);
    assert_eq!(r.previous_frame(), &Frame::blank(size));
}
