use super::*;
use crate::foundation::core::Size;

fn solid(size: Size, rgb: [u8; 3]) -> Frame {
    let mut f = Frame::blank(size);
    for px in f.pixels.chunks_exact_mut(4) {
        px.copy_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
    }
    f
}

#[test]
fn single_pixel_change_is_classified_moving() {
    let size = Size::new(960, 540);
    let prev = solid(size, [10, 10, 10]);
    let mut cur = prev.clone();
    cur.set_pixel(100, 50, [200, 10, 10, 255]);

    let field = MotionField::new(60, 2);
    let hit = field
        .samples(&cur, &prev)
        .unwrap()
        .into_iter()
        .find(|s| s.grid_x == 100 && s.grid_y == 50)
        .unwrap();
    assert_eq!(hit.magnitude, 190);
    assert!(hit.is_moving);

    let w = field.weight(hit.magnitude);
    assert!((w - 1.5).abs() < 0.05, "weight {w}");
}

#[test]
fn classification_matches_threshold_exactly() {
    let field = MotionField::new(60, 1);
    for m in 0..=MAX_MAGNITUDE {
        assert_eq!(field.is_moving(m), m > 60);
    }
}

#[test]
fn classification_is_consistent_across_a_scan() {
    let size = Size::new(16, 16);
    let prev = solid(size, [0, 0, 0]);
    let mut cur = prev.clone();
    for x in 0..16 {
        let v = (x * 9) as u8;
        for y in 0..16 {
            cur.set_pixel(x, y, [v, v / 2, 0, 255]);
        }
    }
    let field = MotionField::new(60, 1);
    field
        .scan(&cur, &prev, |s| assert_eq!(s.is_moving, s.magnitude > 60))
        .unwrap();
}

#[test]
fn stride_controls_sample_count() {
    let size = Size::new(10, 6);
    let a = Frame::blank(size);
    assert_eq!(MotionField::new(60, 1).samples(&a, &a).unwrap().len(), 60);
    assert_eq!(MotionField::new(60, 2).samples(&a, &a).unwrap().len(), 15);
    assert_eq!(MotionField::new(60, 4).samples(&a, &a).unwrap().len(), 6);
}

#[test]
fn weight_is_clamped_and_monotonic() {
    assert_eq!(stroke_weight(0, 60), MIN_STROKE_WEIGHT);
    assert_eq!(stroke_weight(60, 60), MIN_STROKE_WEIGHT);
    assert_eq!(stroke_weight(255, 60), MAX_STROKE_WEIGHT);
    assert_eq!(stroke_weight(765, 60), MAX_STROKE_WEIGHT);
    let mut last = 0.0;
    for m in 0..=MAX_MAGNITUDE {
        let w = stroke_weight(m, 60);
        assert!(w >= last);
        last = w;
    }
}

#[test]
fn mismatched_frames_are_rejected() {
    let a = Frame::blank(Size::new(4, 4));
    let b = Frame::blank(Size::new(4, 2));
    let mut visited = 0;
    let err = MotionField::new(60, 1)
        .scan(&a, &b, |_| visited += 1)
        .unwrap_err();
    assert!(matches!(err, crate::MirrorError::DimensionMismatch(_)));
    assert_eq!(visited, 0);
}

#[test]
fn alpha_is_ignored() {
    assert_eq!(channel_diff(&[1, 2, 3, 0], &[1, 2, 3, 255]), 0);
    assert_eq!(channel_diff(&[255, 0, 255, 9], &[0, 255, 0, 9]), 765);
}
