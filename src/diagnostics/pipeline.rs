use crate::diagnostics::TimingBreakdown;
use crate::image::Mask;
use crate::regions::{Region, RegionSummary};
use crate::segment::SegmentStats;
use crate::types::AnalysisResult;
use serde::Serialize;

/// Result produced by
/// [`DirtDetector::analyze_with_diagnostics`](crate::DirtDetector::analyze_with_diagnostics).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub result: AnalysisResult,
    /// `confidence >= confidence_threshold`.
    pub reliable: bool,
    pub trace: PipelineTrace,
    /// Dirt-candidate mask at working resolution.
    #[serde(skip)]
    pub mask: Mask,
}

/// Trace of one detector run.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTrace {
    pub input: InputDescriptor,
    pub timings: TimingBreakdown,
    pub segmentation: SegmentationStage,
    pub regions: RegionStage,
}

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub width: usize,
    pub height: usize,
    pub working_width: usize,
    pub working_height: usize,
    /// Working over input size along the longer side, 1 when not resized.
    pub scale: f32,
}

impl InputDescriptor {
    pub fn new(input: (usize, usize), working: (usize, usize)) -> Self {
        let long_in = input.0.max(input.1);
        let long_work = working.0.max(working.1);
        let scale = if long_in > 0 {
            long_work as f32 / long_in as f32
        } else {
            1.0
        };
        Self {
            width: input.0,
            height: input.1,
            working_width: working.0,
            working_height: working.1,
            scale,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationStage {
    pub elapsed_ms: f64,
    #[serde(flatten)]
    pub stats: SegmentStats,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionStage {
    pub elapsed_ms: f64,
    pub total_area: usize,
    pub region_count: usize,
    pub rejected_count: usize,
    pub rejected_area: usize,
    pub largest_area: usize,
    pub regions: Vec<Region>,
}

impl RegionStage {
    pub fn from_summary(summary: RegionSummary, elapsed_ms: f64) -> Self {
        Self {
            elapsed_ms,
            total_area: summary.total_area,
            region_count: summary.region_count,
            rejected_count: summary.rejected_count,
            rejected_area: summary.rejected_area,
            largest_area: summary.largest_area(),
            regions: summary.regions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_scale_follows_longer_side() {
        let input = InputDescriptor::new((2000, 1000), (1000, 500));
        assert!((input.scale - 0.5).abs() < 1e-6);
        assert_eq!(InputDescriptor::new((300, 200), (300, 200)).scale, 1.0);
    }

    #[test]
    fn report_omits_the_mask() {
        let report = DetectionReport {
            result: AnalysisResult {
                is_clean: true,
                confidence: 0.99,
                dirt_percentage: 0.0,
                processing_time: 0.001,
            },
            reliable: true,
            trace: PipelineTrace {
                input: InputDescriptor::new((4, 4), (4, 4)),
                timings: TimingBreakdown::default(),
                segmentation: SegmentationStage {
                    elapsed_ms: 0.0,
                    stats: SegmentStats::default(),
                },
                regions: RegionStage::from_summary(RegionSummary::default(), 0.0),
            },
            mask: Mask::new(4, 4),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("mask").is_none());
        assert_eq!(json["result"]["is_clean"], true);
        assert_eq!(json["trace"]["input"]["workingWidth"], 4);
        assert!(json["trace"]["segmentation"].get("backgroundLevel").is_some());
    }
}
