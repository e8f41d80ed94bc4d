use super::*;

#[test]
fn same_seed_same_field() {
    let a = ValueNoise3::new(7);
    let b = ValueNoise3::new(7);
    for i in 0..50 {
        let x = i as f64 * 0.37;
        assert_eq!(a.sample(x, x * 0.5, 0.01 * i as f64), b.sample(x, x * 0.5, 0.01 * i as f64));
    }
}

#[test]
fn output_is_unit_bounded() {
    let n = ValueNoise3::new(42);
    for yi in 0..40 {
        for xi in 0..40 {
            let v = n.sample(xi as f64 * 0.02 * 7.0, yi as f64 * 0.02 * 7.0, 1.3);
            assert!((0.0..1.0).contains(&v), "noise out of range: {v}");
        }
    }
}

#[test]
fn field_is_spatially_coherent() {
    let n = ValueNoise3::new(3);
    let a = n.sample(10.0, 4.0, 0.5);
    let b = n.sample(10.0 + 1e-4, 4.0, 0.5);
    assert!((a - b).abs() < 1e-3);
}

#[test]
fn field_varies_over_time() {
    let n = ValueNoise3::new(3);
    let samples: Vec<f64> = (0..20).map(|t| n.sample(1.1, 2.2, t as f64 * 0.37)).collect();
    assert!(samples.windows(2).any(|w| w[0] != w[1]));
}

#[test]
fn negative_coordinates_mirror_positive() {
    let n = ValueNoise3::new(11);
    assert_eq!(n.sample(-1.5, 2.0, 0.1), n.sample(1.5, 2.0, 0.1));
}
