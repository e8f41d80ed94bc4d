use super::*;

#[test]
fn mul_div255_rounds_and_floor_truncates() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(1, 240), 1);
    assert_eq!(mul_div255_floor_u8(1, 240), 0);
    assert_eq!(mul_div255_floor_u8(255, 240), 240);
    for x in 1..=255u16 {
        assert!(u16::from(mul_div255_floor_u8(x, 240)) < x);
    }
}

#[test]
fn map_range_clamps_both_edges() {
    assert_eq!(map_range_clamped(10.0, 60.0, 255.0, 0.5, 2.0), 0.5);
    assert_eq!(map_range_clamped(60.0, 60.0, 255.0, 0.5, 2.0), 0.5);
    assert_eq!(map_range_clamped(255.0, 60.0, 255.0, 0.5, 2.0), 2.0);
    assert_eq!(map_range_clamped(765.0, 60.0, 255.0, 0.5, 2.0), 2.0);
    let mid = map_range_clamped(157.5, 60.0, 255.0, 0.5, 2.0);
    assert!((mid - 1.25).abs() < 1e-12);
}

#[test]
fn map_range_degenerate_domain_returns_low() {
    assert_eq!(map_range_clamped(5.0, 3.0, 3.0, 1.0, 2.0), 1.0);
}

#[test]
fn rng_is_deterministic_and_unit_bounded() {
    let mut a = Rng64::new(123);
    let mut b = Rng64::new(123);
    for _ in 0..32 {
        let (x, y) = (a.next_f64_01(), b.next_f64_01());
        assert_eq!(x, y);
        assert!((0.0..1.0).contains(&x));
    }
}
