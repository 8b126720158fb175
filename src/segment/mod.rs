//! Segmenter: working buffer → dirt-candidate mask.
//!
//! Dirt shows up as a localised departure from the surrounding surface, not
//! as an absolute brightness. The segmenter therefore
//! 1. fits a smooth background surface to the lightest populated intensity
//!    class of the frame ([`background::BackgroundModel`]), which absorbs
//!    uneven lighting and stays on the clean surface however much of the
//!    frame the grime covers;
//! 2. measures each pixel's deviation `|I − B|` from that surface;
//! 3. picks a per-image threshold with Otsu's method on the deviation
//!    histogram, floored at `min_contrast` so sensor noise on a clean frame
//!    never qualifies;
//! 4. marks pixels whose quantised deviation lies strictly above it.
//!
//! A zero-variance buffer short-circuits to an all-clean mask. The stage is
//! deterministic: equal buffers yield equal masks.

pub mod background;
pub mod histogram;

use crate::config::DetectionConfig;
use crate::error::Result;
use crate::image::{ImageF32, Mask};
use background::BackgroundModel;
use histogram::{level, quantize, Histogram};
use log::debug;
use serde::Serialize;

/// Intensity spread at or below which a buffer counts as uniform.
const UNIFORM_EPS: f32 = 1e-6;

/// Statistics of one segmentation run.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentStats {
    /// Median intensity of the clean-surface samples.
    pub background_level: f32,
    /// Polynomial terms used by the background surface.
    pub background_terms: usize,
    /// Fit samples retained as clean surface.
    pub fit_inliers: usize,
    pub fit_samples: usize,
    /// Deviation chosen by Otsu's method before flooring.
    pub otsu_level: f32,
    /// Effective deviation threshold.
    pub threshold: f32,
    pub candidate_pixels: usize,
    /// True when the buffer had no intensity variation.
    pub uniform: bool,
}

#[derive(Clone, Debug)]
pub struct Segmentation {
    pub mask: Mask,
    pub stats: SegmentStats,
}

/// Segment a working buffer into a dirt-candidate mask.
pub fn segment(buffer: &ImageF32, config: &DetectionConfig) -> Result<Mask> {
    segment_with_stats(buffer, config).map(|s| s.mask)
}

/// Same as [`segment`], also returning the intermediate statistics.
pub fn segment_with_stats(buffer: &ImageF32, config: &DetectionConfig) -> Result<Segmentation> {
    let options = &config.segmenter;
    options.validate()?;

    let (w, h) = (buffer.w, buffer.h);
    let uniform = match buffer.min_max() {
        None => true,
        Some((lo, hi)) => hi - lo <= UNIFORM_EPS,
    };
    if uniform {
        debug!("segment: uniform {w}x{h} buffer, no candidates");
        return Ok(Segmentation {
            mask: Mask::new(w, h),
            stats: SegmentStats {
                background_level: buffer.data.first().copied().unwrap_or(0.0),
                background_terms: 0,
                threshold: 1.0,
                otsu_level: 1.0,
                uniform: true,
                ..Default::default()
            },
        });
    }

    let model = BackgroundModel::fit(buffer, options);
    let deviation = model.deviation(buffer);
    let hist = Histogram::from_values(deviation.data.iter().copied());
    let floor_bin = quantize(options.min_contrast);
    let otsu_bin = hist.otsu_bin().unwrap_or(floor_bin);
    let threshold_bin = otsu_bin.max(floor_bin);

    let data: Vec<bool> = deviation
        .data
        .iter()
        .map(|&d| quantize(d) > threshold_bin)
        .collect();
    let mask = Mask { w, h, data };
    let candidate_pixels = mask.count();
    debug!(
        "segment: {w}x{h} median={:.3} terms={} otsu={:.3} threshold={:.3} candidates={}",
        model.median_level,
        model.term_count(),
        level(otsu_bin),
        level(threshold_bin),
        candidate_pixels
    );

    Ok(Segmentation {
        mask,
        stats: SegmentStats {
            background_level: model.median_level,
            background_terms: model.term_count(),
            fit_inliers: model.inliers,
            fit_samples: model.samples,
            otsu_level: level(otsu_bin),
            threshold: level(threshold_bin),
            candidate_pixels,
            uniform: false,
        },
    })
}
