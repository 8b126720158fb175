mod common;

use common::synthetic_image::{SyntheticRgb, GRIME, WHITE};
use dirt_detector::image::RawImage;
use dirt_detector::{analyze, DetectionConfig, DirtDetector, ErrorKind};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn white_surface_is_clean() {
    init_logger();
    let img = SyntheticRgb::solid(100, 100, WHITE);
    let result = analyze(&img.view(), &DetectionConfig::default()).unwrap();

    assert!(result.is_clean);
    assert_eq!(result.dirt_percentage, 0.0);
    assert!(
        result.confidence >= 0.9,
        "confidence too low for a blank frame: {:.3}",
        result.confidence
    );
    assert!(result.processing_time >= 0.0);
}

#[test]
fn dark_blotch_reads_about_twenty_percent() {
    init_logger();
    let mut img = SyntheticRgb::solid(100, 100, WHITE);
    img.fill_rect(30, 25, 40, 50, GRIME);
    let detector = DirtDetector::new(DetectionConfig::default()).unwrap();
    let result = detector.analyze(&img.view()).unwrap();

    assert!(!result.is_clean);
    assert!(
        (result.dirt_percentage - 20.0).abs() <= 2.0,
        "dirt_percentage = {:.3}",
        result.dirt_percentage
    );
    assert!(result.confidence >= 0.9, "confidence = {:.3}", result.confidence);
}

#[test]
fn blotch_on_textured_floor_is_found() {
    init_logger();
    let mut img = SyntheticRgb::solid(160, 120, [200, 190, 180]);
    img.add_texture(6);
    img.fill_rect(20, 30, 40, 30, GRIME);
    let result = analyze(&img.view(), &DetectionConfig::default()).unwrap();

    let expected = 100.0 * 1200.0 / (160.0 * 120.0);
    assert!(!result.is_clean);
    assert!(
        (result.dirt_percentage - expected).abs() <= 1.5,
        "dirt_percentage = {:.3}, expected about {expected:.3}",
        result.dirt_percentage
    );
}

#[test]
fn uneven_lighting_alone_is_clean() {
    init_logger();
    let img = SyntheticRgb::ramp(200, 150, 120, 230);
    let result = analyze(&img.view(), &DetectionConfig::default()).unwrap();
    assert!(result.is_clean);
    assert_eq!(result.dirt_percentage, 0.0);
}

#[test]
fn large_input_is_bounded_and_reported() {
    init_logger();
    let mut img = SyntheticRgb::solid(800, 400, WHITE);
    img.fill_rect(100, 100, 200, 100, GRIME);
    let config = DetectionConfig {
        max_image_size: 200,
        ..Default::default()
    };
    let detector = DirtDetector::new(config).unwrap();
    let report = detector.analyze_with_diagnostics(&img.view()).unwrap();

    let input = report.trace.input;
    assert_eq!((input.width, input.height), (800, 400));
    assert_eq!((input.working_width, input.working_height), (200, 100));
    assert_eq!((report.mask.w, report.mask.h), (200, 100));
    assert!((report.result.dirt_percentage - 6.25).abs() <= 1.0);
    assert!(report.reliable);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["trace"]["regions"]["regionCount"], 1);
}

#[test]
fn unsupported_layouts_are_rejected() {
    init_logger();
    let config = DetectionConfig::default();

    let err = analyze(&RawImage::rgb(0, 10, &[]), &config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedImage);

    let rgba = vec![255u8; 10 * 10 * 4];
    let image = RawImage {
        w: 10,
        h: 10,
        channels: 4,
        stride: 40,
        data: &rgba,
    };
    let err = analyze(&image, &config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedImage);

    let short = vec![255u8; 10];
    let err = analyze(&RawImage::rgb(10, 10, &short), &config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedImage);
}

#[test]
fn invalid_parameters_fail_fast() {
    init_logger();
    let img = SyntheticRgb::solid(20, 20, WHITE);
    for config in [
        DetectionConfig {
            blur_kernel_size: 4,
            ..Default::default()
        },
        DetectionConfig {
            blur_kernel_size: -3,
            ..Default::default()
        },
        DetectionConfig {
            max_image_size: 0,
            ..Default::default()
        },
    ] {
        let err = analyze(&img.view(), &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig, "{err}");
    }
}

#[test]
fn padded_rows_are_honoured() {
    init_logger();
    let (w, h, stride) = (50usize, 40usize, 50 * 3 + 7);
    let mut data = vec![0u8; stride * h];
    for y in 0..h {
        for x in 0..w {
            let v = if (10..30).contains(&x) && (10..30).contains(&y) { 30 } else { 250 };
            data[y * stride + 3 * x..y * stride + 3 * x + 3].copy_from_slice(&[v, v, v]);
        }
    }
    let image = RawImage {
        w,
        h,
        channels: 3,
        stride,
        data: &data,
    };
    let config = DetectionConfig {
        blur_kernel_size: 1,
        ..Default::default()
    };
    let result = analyze(&image, &config).unwrap();
    assert_eq!(result.dirt_percentage, 20.0);
}
