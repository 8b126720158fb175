//! Detector pipeline driving dirt detection end-to-end.
//!
//! Typical usage:
//! ```no_run
//! use dirt_detector::{DetectionConfig, DirtDetector};
//! use dirt_detector::image::RawImage;
//!
//! # fn example(rgb: &[u8], w: usize, h: usize) -> dirt_detector::error::Result<()> {
//! let detector = DirtDetector::new(DetectionConfig::default())?;
//! let result = detector.analyze(&RawImage::rgb(w, h, rgb))?;
//! println!("clean={} dirt={:.2}%", result.is_clean, result.dirt_percentage);
//! # Ok(())
//! # }
//! ```
use crate::config::DetectionConfig;
use crate::diagnostics::timing::elapsed_ms;
use crate::diagnostics::{
    DetectionReport, InputDescriptor, PipelineTrace, RegionStage, SegmentationStage,
    TimingBreakdown,
};
use crate::error::Result;
use crate::image::RawImage;
use crate::preprocess::preprocess;
use crate::regions;
use crate::segment::segment_with_stats;
use crate::types::AnalysisResult;
use crate::verdict::compose;
use log::debug;
use std::time::Instant;

/// Immutable, validated detector.
#[derive(Clone, Debug)]
pub struct DirtDetector {
    config: DetectionConfig,
}

impl DirtDetector {
    /// Validate `config` and build a detector.
    pub fn new(config: DetectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Run the pipeline, returning the compact result.
    pub fn analyze(&self, image: &RawImage<'_>) -> Result<AnalysisResult> {
        self.analyze_with_diagnostics(image).map(|report| report.result)
    }

    /// Run the pipeline and return the result with a per-stage trace.
    pub fn analyze_with_diagnostics(&self, image: &RawImage<'_>) -> Result<DetectionReport> {
        debug!(
            "DirtDetector::analyze start w={} h={} max_side={}",
            image.w, image.h, self.config.max_image_size
        );
        let total_start = Instant::now();
        let mut timings = TimingBreakdown::default();

        let buffer = timings.measure("preprocess", || preprocess(image, &self.config))?;
        let dims = (buffer.w, buffer.h);
        debug!("preprocess: working buffer {}x{}", dims.0, dims.1);

        let segmentation =
            timings.measure("segment", || segment_with_stats(&buffer, &self.config))?;
        drop(buffer);
        let summary =
            timings.measure("regions", || regions::analyze(&segmentation.mask, &self.config));

        let processing_time = total_start.elapsed().as_secs_f64();
        let result = timings.measure("verdict", || {
            compose(&summary, dims, &self.config, processing_time)
        })?;
        timings.total_ms = elapsed_ms(total_start);
        let seg_ms = timings.stage_ms("segment").unwrap_or_default();
        let reg_ms = timings.stage_ms("regions").unwrap_or_default();

        debug!(
            "DirtDetector::analyze done clean={} dirt={:.3}% confidence={:.3} in {:.3} ms",
            result.is_clean, result.dirt_percentage, result.confidence, timings.total_ms
        );

        Ok(DetectionReport {
            result,
            reliable: result.is_reliable(self.config.confidence_threshold),
            trace: PipelineTrace {
                input: InputDescriptor::new((image.w, image.h), dims),
                timings,
                segmentation: SegmentationStage {
                    elapsed_ms: seg_ms,
                    stats: segmentation.stats,
                },
                regions: RegionStage::from_summary(summary, reg_ms),
            },
            mask: segmentation.mask,
        })
    }
}

/// Validate `config` and analyse one image.
pub fn analyze(image: &RawImage<'_>, config: &DetectionConfig) -> Result<AnalysisResult> {
    DirtDetector::new(config.clone())?.analyze(image)
}
