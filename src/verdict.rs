//! Verdict composer: region statistics → [`AnalysisResult`].
//!
//! `dirt_percentage = 100 · total_area / (w · h)` and the surface is clean
//! strictly below `dirt_threshold`. Confidence grows with the distance of the
//! percentage from the threshold and is discounted when the dirt consists of
//! regions barely above the area floor:
//!
//! ```text
//! separation = 1 − exp(−|pct − T| / τ),   τ = max(T / 4, 0.5)
//! stability  = Σ area_i · min(1, area_i / (4 · min_dirt_area)) / Σ area_i
//! confidence = 0.5 + 0.5 · separation · (0.5 + 0.5 · stability)
//! ```
//!
//! At the threshold the verdict is a coin flip (0.5); far from it confidence
//! approaches 1.

use crate::config::DetectionConfig;
use crate::error::{DetectionError, Result};
use crate::regions::RegionSummary;
use crate::types::AnalysisResult;

/// Lower bound of the separation scale, in percentage points.
const MIN_TAU: f64 = 0.5;

/// Build the verdict for a working buffer of `dims = (w, h)`.
pub fn compose(
    summary: &RegionSummary,
    dims: (usize, usize),
    config: &DetectionConfig,
    processing_time: f64,
) -> Result<AnalysisResult> {
    let (w, h) = dims;
    let pixels = w * h;
    if pixels == 0 {
        return Err(DetectionError::invariant("working buffer is empty"));
    }
    if (summary.width, summary.height) != dims {
        return Err(DetectionError::invariant(format!(
            "region summary is {}x{} but the working buffer is {w}x{h}",
            summary.width, summary.height
        )));
    }
    if summary.total_area > pixels {
        return Err(DetectionError::invariant(format!(
            "dirt area {} exceeds {pixels} pixels",
            summary.total_area
        )));
    }

    let dirt_percentage = (100.0 * summary.total_area as f64 / pixels as f64).clamp(0.0, 100.0);
    let is_clean = dirt_percentage < config.dirt_threshold;
    let confidence = confidence(
        dirt_percentage,
        config.dirt_threshold,
        region_stability(summary, config.min_dirt_area),
    );

    Ok(AnalysisResult {
        is_clean,
        confidence,
        dirt_percentage,
        processing_time,
    })
}

/// Confidence of a verdict at `percentage` against `threshold`, given the
/// region stability in `[0, 1]`.
pub fn confidence(percentage: f64, threshold: f64, stability: f64) -> f64 {
    let tau = (0.25 * threshold).max(MIN_TAU);
    let separation = 1.0 - (-(percentage - threshold).abs() / tau).exp();
    let stability = stability.clamp(0.0, 1.0);
    (0.5 + 0.5 * separation * (0.5 + 0.5 * stability)).clamp(0.0, 1.0)
}

/// Area-weighted share of regions comfortably above the area floor. 1 with no
/// regions.
pub fn region_stability(summary: &RegionSummary, min_dirt_area: usize) -> f64 {
    if summary.total_area == 0 {
        return 1.0;
    }
    let full_weight_area = (4 * min_dirt_area).max(1) as f64;
    let weighted: f64 = summary
        .regions
        .iter()
        .map(|r| r.area as f64 * (r.area as f64 / full_weight_area).min(1.0))
        .sum();
    weighted / summary.total_area as f64
}
