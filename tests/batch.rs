mod common;

use common::synthetic_image::{SyntheticRgb, GRIME, WHITE};
use dirt_detector::batch::{analyze_files, analyze_images, BatchOptions, NamedImage};
use dirt_detector::config::Settings;
use dirt_detector::image::io::{RgbBuffer, UploadLimits};
use dirt_detector::{DetectionConfig, DirtDetector, ErrorKind};
use image::RgbImage;
use std::fs;
use std::path::{Path, PathBuf};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("dirt-detector-{tag}-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn save_png(img: &SyntheticRgb, path: &Path) {
    RgbImage::from_raw(img.width as u32, img.height as u32, img.data.clone())
        .unwrap()
        .save(path)
        .unwrap();
}

fn named(name: &str, img: SyntheticRgb) -> NamedImage {
    NamedImage {
        filename: name.to_string(),
        image: RgbBuffer::new(img.width, img.height, img.data),
    }
}

fn dirty_frame() -> SyntheticRgb {
    let mut img = SyntheticRgb::solid(100, 100, WHITE);
    img.fill_rect(30, 25, 40, 50, GRIME);
    img
}

#[test]
fn in_memory_batch_aggregates_verdicts() {
    init_logger();
    let detector = DirtDetector::new(DetectionConfig::default()).unwrap();
    let images = vec![
        named("clean-1.png", SyntheticRgb::solid(80, 60, WHITE)),
        named("dirty.png", dirty_frame()),
        named("clean-2.png", SyntheticRgb::solid(60, 80, [200, 200, 200])),
    ];
    for max_concurrency in [0, 1, 2] {
        let report =
            analyze_images(&detector, &images, &BatchOptions { max_concurrency }).unwrap();
        assert!(!report.overall_clean);
        assert_eq!(report.total_images, 3);
        assert_eq!(report.clean_images, 2);
        let names: Vec<&str> = report
            .individual_results
            .iter()
            .map(|r| r.filename.as_str())
            .collect();
        assert_eq!(names, ["clean-1.png", "dirty.png", "clean-2.png"]);
        assert!(!report.individual_results[1].result.is_clean);
    }
}

#[test]
fn batch_results_match_single_calls() {
    init_logger();
    let detector = DirtDetector::new(DetectionConfig::default()).unwrap();
    let frame = dirty_frame();
    let single = detector.analyze(&frame.view()).unwrap();
    let report = analyze_images(
        &detector,
        &[named("a.png", frame.clone()), named("b.png", frame)],
        &BatchOptions::default(),
    )
    .unwrap();
    for entry in &report.individual_results {
        assert_eq!(entry.result.is_clean, single.is_clean);
        assert_eq!(entry.result.dirt_percentage, single.dirt_percentage);
        assert_eq!(entry.result.confidence, single.confidence);
    }
}

#[test]
fn files_are_loaded_and_failures_isolated() {
    init_logger();
    let dir = scratch_dir("batch-files");
    let clean = dir.join("clean.png");
    let dirty = dir.join("dirty.PNG");
    let rejected = dir.join("notes.txt");
    let broken = dir.join("broken.png");
    save_png(&SyntheticRgb::solid(64, 64, WHITE), &clean);
    save_png(&dirty_frame(), &dirty);
    fs::write(&rejected, b"not an image").unwrap();
    fs::write(&broken, b"not a png either").unwrap();
    let missing = dir.join("missing.jpg");

    let settings = Settings::default();
    let detector = DirtDetector::new(settings.detection.clone()).unwrap();
    let paths = vec![clean, dirty, rejected, broken, missing];
    let report = analyze_files(
        &detector,
        &paths,
        &settings.service.upload_limits(),
        &BatchOptions { max_concurrency: 2 },
    )
    .unwrap();

    assert_eq!(report.total_images, 2);
    assert_eq!(report.clean_images, 1);
    assert!(!report.overall_clean);
    let failed: Vec<&str> = report.failures.iter().map(|f| f.filename.as_str()).collect();
    assert_eq!(failed, ["notes.txt", "broken.png", "missing.jpg"]);
    assert!(report.failures.iter().all(|f| f.kind == ErrorKind::ImageLoad));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["individual_results"][1]["filename"], "dirty.PNG");
    assert_eq!(json["individual_results"][1]["is_clean"], false);
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn oversized_files_are_rejected() {
    init_logger();
    let dir = scratch_dir("batch-limits");
    let path = dir.join("big.png");
    save_png(&SyntheticRgb::solid(64, 64, WHITE), &path);

    let detector = DirtDetector::new(DetectionConfig::default()).unwrap();
    let limits = UploadLimits::new(16, &[".png".to_string()]);
    let report = analyze_files(&detector, &[path], &limits, &BatchOptions::default()).unwrap();
    assert_eq!(report.total_images, 0);
    assert!(report.overall_clean);
    assert_eq!(report.failures.len(), 1);
    fs::remove_dir_all(&dir).ok();
}
