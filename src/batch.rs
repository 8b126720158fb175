//! Batch orchestration over a bounded worker pool.
//!
//! Every item is analysed independently; a failure is recorded against its
//! filename and never aborts the rest of the batch. Results keep the input
//! order regardless of how the pool schedules the work.

use crate::detector::DirtDetector;
use crate::error::{DetectionError, ErrorKind, Result};
use crate::image::io::{load_rgb_image, RgbBuffer, UploadLimits};
use crate::types::AnalysisResult;
use log::{debug, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default)]
pub struct BatchOptions {
    /// Worker threads; 0 uses the pool default (one per core).
    pub max_concurrency: usize,
}

/// An in-memory image with the name it is reported under.
#[derive(Clone, Debug)]
pub struct NamedImage {
    pub filename: String,
    pub image: RgbBuffer,
}

#[derive(Clone, Debug, Serialize)]
pub struct FileResult {
    pub filename: String,
    #[serde(flatten)]
    pub result: AnalysisResult,
}

#[derive(Clone, Debug, Serialize)]
pub struct BatchFailure {
    pub filename: String,
    pub kind: ErrorKind,
    pub error: String,
}

/// Aggregate verdict over a batch. `total_images` counts analysed images;
/// rejected or failing inputs are listed under `failures` only.
#[derive(Clone, Debug, Serialize)]
pub struct BatchReport {
    pub overall_clean: bool,
    pub clean_images: usize,
    pub total_images: usize,
    pub individual_results: Vec<FileResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    /// Fold per-item outcomes, in order, into a report.
    pub fn from_outcomes(outcomes: Vec<(String, Result<AnalysisResult>)>) -> Self {
        let mut individual_results = Vec::new();
        let mut failures = Vec::new();
        for (filename, outcome) in outcomes {
            match outcome {
                Ok(result) => individual_results.push(FileResult { filename, result }),
                Err(err) => {
                    warn!("batch: {filename} failed: {err}");
                    failures.push(BatchFailure {
                        filename,
                        kind: err.kind(),
                        error: err.to_string(),
                    });
                }
            }
        }
        let clean_images = individual_results
            .iter()
            .filter(|r| r.result.is_clean)
            .count();
        let total_images = individual_results.len();
        Self {
            overall_clean: clean_images == total_images,
            clean_images,
            total_images,
            individual_results,
            failures,
        }
    }
}

/// Apply `job` to every item on a pool of at most `max_concurrency` workers.
/// Output order equals input order.
pub fn run_batch<T, R, F>(items: &[T], options: &BatchOptions, job: F) -> Result<Vec<R>>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        if options.max_concurrency == 0 {
            return Ok(items.par_iter().map(&job).collect());
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.max_concurrency)
            .build()
            .map_err(|err| DetectionError::WorkerPool {
                message: err.to_string(),
            })?;
        Ok(pool.install(|| items.par_iter().map(&job).collect()))
    }
    #[cfg(not(feature = "parallel"))]
    {
        let _ = options;
        Ok(items.iter().map(job).collect())
    }
}

/// Analyse in-memory images.
pub fn analyze_images(
    detector: &DirtDetector,
    images: &[NamedImage],
    options: &BatchOptions,
) -> Result<BatchReport> {
    debug!("batch: {} images, max_concurrency={}", images.len(), options.max_concurrency);
    let outcomes = run_batch(images, options, |item| {
        (item.filename.clone(), detector.analyze(&item.image.as_view()))
    })?;
    Ok(BatchReport::from_outcomes(outcomes))
}

/// Load and analyse files; load failures are reported per file.
pub fn analyze_files(
    detector: &DirtDetector,
    paths: &[PathBuf],
    limits: &UploadLimits,
    options: &BatchOptions,
) -> Result<BatchReport> {
    debug!("batch: {} files, max_concurrency={}", paths.len(), options.max_concurrency);
    let outcomes = run_batch(paths, options, |path| {
        let outcome = load_rgb_image(path, limits).and_then(|rgb| detector.analyze(&rgb.as_view()));
        (display_name(path), outcome)
    })?;
    Ok(BatchReport::from_outcomes(outcomes))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
