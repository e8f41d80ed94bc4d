use super::*;

#[test]
fn fade_never_brightens_and_strictly_dims_lit_pixels() {
    let mut data: Vec<u8> = (0..=255u8).flat_map(|v| [v, v / 2, 255 - v, 255]).collect();
    let before = data.clone();
    fade_toward_black_in_place(&mut data, 15).unwrap();
    for (a, b) in before.chunks_exact(4).zip(data.chunks_exact(4)) {
        for c in 0..3 {
            assert!(b[c] <= a[c]);
            if a[c] > 0 {
                assert!(b[c] < a[c]);
            }
        }
        assert_eq!(b[3], 255);
    }
}

#[test]
fn repeated_fade_reaches_black() {
    let mut data = vec![255u8, 255, 255, 255];
    for _ in 0..400 {
        fade_toward_black_in_place(&mut data, 15).unwrap();
    }
    assert_eq!(data, vec![0, 0, 0, 255]);
}

#[test]
fn zero_alpha_fade_is_identity() {
    let mut data = vec![10u8, 20, 30, 255];
    fade_toward_black_in_place(&mut data, 0).unwrap();
    assert_eq!(data, vec![10, 20, 30, 255]);
}

#[test]
fn stroke_lights_pixels_along_segment_only() {
    let size = Size::new(16, 8);
    let mut data = FrameBytes::black(size);
    let line = Line::new((2.0, 4.0), (12.0, 4.0));
    stroke_add_in_place(&mut data.0, size, line, 2.0, [80, 80, 80, 80]).unwrap();

    assert!(data.at(size, 7, 3)[0] > 0 || data.at(size, 7, 4)[0] > 0);
    assert_eq!(data.at(size, 7, 0), [0, 0, 0, 255]);
    assert_eq!(data.at(size, 15, 7), [0, 0, 0, 255]);
}

#[test]
fn overlapping_strokes_accumulate() {
    let size = Size::new(8, 8);
    let mut once = FrameBytes::black(size);
    let mut twice = FrameBytes::black(size);
    let line = Line::new((1.0, 4.0), (7.0, 4.0));
    stroke_add_in_place(&mut once.0, size, line, 2.0, [80, 80, 80, 80]).unwrap();
    stroke_add_in_place(&mut twice.0, size, line, 2.0, [80, 80, 80, 80]).unwrap();
    stroke_add_in_place(&mut twice.0, size, line, 2.0, [80, 80, 80, 80]).unwrap();
    assert!(twice.at(size, 4, 4)[0] > once.at(size, 4, 4)[0]);
}

#[test]
fn stroke_outside_surface_is_ignored() {
    let size = Size::new(4, 4);
    let mut data = FrameBytes::black(size);
    let line = Line::new((40.0, 40.0), (45.0, 40.0));
    stroke_add_in_place(&mut data.0, size, line, 2.0, [80, 80, 80, 80]).unwrap();
    assert_eq!(data.0, FrameBytes::black(size).0);
}

#[test]
fn stroke_rejects_wrong_buffer_length() {
    let mut data = vec![0u8; 12];
    let line = Line::new((0.0, 0.0), (1.0, 1.0));
    assert!(stroke_add_in_place(&mut data, Size::new(2, 2), line, 1.0, [1, 1, 1, 1]).is_err());
}

struct FrameBytes(Vec<u8>);

impl FrameBytes {
    fn black(size: Size) -> Self {
        Self([0u8, 0, 0, 255].repeat((size.width * size.height) as usize))
    }

    fn at(&self, size: Size, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * size.width + x) * 4) as usize;
        [self.0[i], self.0[i + 1], self.0[i + 2], self.0[i + 3]]
    }
}
