//! Parameters of the dirt-detection pipeline.
//!
//! Defaults follow the service's historical settings: a surface counts as
//! clean below 5 % dirty area, regions smaller than 100 px are noise, and
//! images are analysed at most at 1024 px on the longer side.

use crate::error::{DetectionError, Result};
use serde::{Deserialize, Serialize};

/// Read-only parameter bundle supplied once when the detector is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Dirty-area percentage at or above which the surface is dirty.
    pub dirt_threshold: f64,
    /// Minimum region area (pixels, post-resize) counted as dirt.
    pub min_dirt_area: usize,
    /// Minimum confidence for a verdict to be considered reliable.
    pub confidence_threshold: f64,
    /// Longer-side bound of the working buffer.
    pub max_image_size: usize,
    /// Side of the square Gaussian smoothing window (positive, odd).
    pub blur_kernel_size: i32,
    /// Background model and threshold tuning.
    pub segmenter: SegmenterOptions,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            dirt_threshold: 5.0,
            min_dirt_area: 100,
            confidence_threshold: 0.7,
            max_image_size: 1024,
            blur_kernel_size: 5,
            segmenter: SegmenterOptions::default(),
        }
    }
}

/// Knobs of the adaptive segmenter.
///
/// - `min_contrast`: smallest deviation from the background (intensity in
///   `[0, 1]`) that may ever count as dirt, whatever the histogram says.
/// - `inlier_band_sigmas`: width of the inlier band used while fitting the
///   background surface, in robust standard deviations.
/// - `fit_sample_target`: approximate number of fit samples per image side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterOptions {
    pub min_contrast: f32,
    pub inlier_band_sigmas: f32,
    pub fit_sample_target: usize,
}

impl Default for SegmenterOptions {
    fn default() -> Self {
        Self {
            min_contrast: 0.1,
            inlier_band_sigmas: 3.0,
            fit_sample_target: 128,
        }
    }
}

impl DetectionConfig {
    /// Check every field; the first offending one is reported.
    pub fn validate(&self) -> Result<()> {
        if !self.dirt_threshold.is_finite() || !(0.0..=100.0).contains(&self.dirt_threshold) {
            return Err(DetectionError::invalid_config(
                "dirt_threshold",
                self.dirt_threshold,
                "must be a percentage in [0, 100]",
            ));
        }
        if !self.confidence_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.confidence_threshold)
        {
            return Err(DetectionError::invalid_config(
                "confidence_threshold",
                self.confidence_threshold,
                "must lie in [0, 1]",
            ));
        }
        if self.max_image_size == 0 {
            return Err(DetectionError::invalid_config(
                "max_image_size",
                self.max_image_size,
                "must be positive",
            ));
        }
        validate_blur_kernel(self.blur_kernel_size)?;
        self.segmenter.validate()
    }
}

impl SegmenterOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.min_contrast.is_finite() || self.min_contrast <= 0.0 || self.min_contrast > 1.0 {
            return Err(DetectionError::invalid_config(
                "segmenter.min_contrast",
                self.min_contrast,
                "must lie in (0, 1]",
            ));
        }
        if !self.inlier_band_sigmas.is_finite() || self.inlier_band_sigmas <= 0.0 {
            return Err(DetectionError::invalid_config(
                "segmenter.inlier_band_sigmas",
                self.inlier_band_sigmas,
                "must be positive",
            ));
        }
        if self.fit_sample_target < 2 {
            return Err(DetectionError::invalid_config(
                "segmenter.fit_sample_target",
                self.fit_sample_target,
                "must be at least 2",
            ));
        }
        Ok(())
    }
}

/// Resolve the configured blur window into a usable side length.
pub(crate) fn validate_blur_kernel(size: i32) -> Result<usize> {
    if size <= 0 {
        return Err(DetectionError::invalid_config(
            "blur_kernel_size",
            size,
            "must be positive",
        ));
    }
    if size % 2 == 0 {
        return Err(DetectionError::invalid_config(
            "blur_kernel_size",
            size,
            "must be odd",
        ));
    }
    Ok(size as usize)
}
