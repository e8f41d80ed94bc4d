use super::*;

#[test]
fn desktop_uses_full_step_size() {
    let cfg = MirrorConfig::default();
    let p = ScalingPolicy::derive(Size::new(320, 240), DeviceClass::Desktop, &cfg).unwrap();
    assert_eq!(p.buffer_size, Size::new(1920, 1440));
    assert_eq!(p.scale_down, 1.0);
    assert_eq!(p.resolution_multiplier, 6.0);
    assert_eq!(p.sample_stride, 2);
}

#[test]
fn mobile_cap_lands_larger_axis_exactly_on_limit() {
    let cfg = MirrorConfig::default();
    let p = ScalingPolicy::derive(Size::new(640, 480), DeviceClass::Mobile, &cfg).unwrap();
    assert_eq!(p.buffer_size, Size::new(1024, 768));
    assert!((p.scale_down - 1024.0 / 3840.0).abs() < 1e-12);
    assert_eq!(p.sample_stride, 4);
}

#[test]
fn mobile_cap_applies_to_portrait_frames() {
    let cfg = MirrorConfig::default();
    let p = ScalingPolicy::derive(Size::new(480, 640), DeviceClass::Mobile, &cfg).unwrap();
    assert_eq!(p.buffer_size, Size::new(768, 1024));
}

#[test]
fn square_target_over_cap_scales_both_axes_to_cap() {
    let cfg = MirrorConfig::default();
    let p = ScalingPolicy::derive(Size::new(1024, 1024), DeviceClass::Mobile, &cfg).unwrap();
    assert_eq!(p.buffer_size, Size::new(1024, 1024));
    assert!((p.resolution_multiplier - 1.0).abs() < 1e-12);
}

#[test]
fn small_frames_below_cap_are_untouched_on_mobile() {
    let cfg = MirrorConfig::default();
    let p = ScalingPolicy::derive(Size::new(100, 50), DeviceClass::Mobile, &cfg).unwrap();
    assert_eq!(p.buffer_size, Size::new(600, 300));
    assert_eq!(p.scale_down, 1.0);
}

#[test]
fn uncapped_desktop_still_respects_surface_limit() {
    let cfg = MirrorConfig::default();
    let p = ScalingPolicy::derive(Size::new(3840, 2160), DeviceClass::Desktop, &cfg).unwrap();
    assert_eq!(p.buffer_size.width, MAX_SURFACE_DIMENSION);
    assert!(p.buffer_size.height < MAX_SURFACE_DIMENSION);
}

#[test]
fn empty_frame_is_rejected() {
    let cfg = MirrorConfig::default();
    assert!(ScalingPolicy::derive(Size::new(0, 480), DeviceClass::Desktop, &cfg).is_err());
}

#[test]
fn buffer_coordinates_scale_by_multiplier() {
    let cfg = MirrorConfig::default();
    let p = ScalingPolicy::derive(Size::new(640, 480), DeviceClass::Mobile, &cfg).unwrap();
    let pt = p.to_buffer(639, 479);
    assert!(pt.x < f64::from(p.buffer_size.width));
    assert!(pt.y < f64::from(p.buffer_size.height));
}

#[test]
fn touch_points_select_device_class() {
    assert_eq!(DeviceClass::from_touch_points(0), DeviceClass::Desktop);
    assert_eq!(DeviceClass::from_touch_points(5), DeviceClass::Mobile);
}
