//! Diagnostics data model returned by
//! [`DirtDetector::analyze_with_diagnostics`](crate::DirtDetector).
//!
//! `DetectionReport` bundles the plain [`AnalysisResult`](crate::AnalysisResult)
//! with a `PipelineTrace` describing each stage: input and working
//! dimensions, per-stage timings, segmentation statistics and the surviving
//! regions. Everything serialises to camelCase JSON; the mask itself is kept
//! in memory only.

pub mod pipeline;
pub mod timing;

pub use pipeline::{DetectionReport, InputDescriptor, PipelineTrace, RegionStage, SegmentationStage};
pub use timing::{StageTiming, TimingBreakdown};
