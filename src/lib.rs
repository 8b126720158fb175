#![doc = include_str!("../README.md")]

// Pipeline entry points.
pub mod detector;
pub mod diagnostics;
pub mod error;
pub mod types;

// Stages, usable on their own.
pub mod preprocess;
pub mod regions;
pub mod segment;
pub mod verdict;

// Plumbing around the pipeline.
pub mod batch;
pub mod config;
pub mod image;

// --- High-level re-exports -------------------------------------------------

pub use crate::config::{DetectionConfig, SegmenterOptions, Settings};
pub use crate::detector::{analyze, DirtDetector};
pub use crate::error::{DetectionError, ErrorKind};
pub use crate::types::AnalysisResult;

pub use crate::diagnostics::{DetectionReport, PipelineTrace};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use dirt_detector::prelude::*;
///
/// # fn main() -> dirt_detector::error::Result<()> {
/// let (w, h) = (64usize, 48usize);
/// let rgb = vec![255u8; w * h * 3];
/// let detector = DirtDetector::new(DetectionConfig::default())?;
/// let result = detector.analyze(&RawImage::rgb(w, h, &rgb))?;
/// println!("clean={} confidence={:.3}", result.is_clean, result.confidence);
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::io::{load_rgb_image, UploadLimits};
    pub use crate::image::RawImage;
    pub use crate::{AnalysisResult, DetectionConfig, DirtDetector};
}

// --- Stage-level API (for tools & advanced users) ---------------------------

pub mod stages {
    pub use crate::preprocess::preprocess;
    pub use crate::regions::{analyze as analyze_regions, Region, RegionSummary};
    pub use crate::segment::{segment, segment_with_stats, SegmentStats, Segmentation};
    pub use crate::verdict::compose;

    pub use crate::diagnostics::{
        InputDescriptor, RegionStage, SegmentationStage, StageTiming, TimingBreakdown,
    };
}
