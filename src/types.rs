use serde::{Deserialize, Serialize};

/// Verdict for one image.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub is_clean: bool,
    /// Certainty of `is_clean`, `[0, 1]`.
    pub confidence: f64,
    /// Dirty share of the working buffer, `[0, 100]`.
    pub dirt_percentage: f64,
    /// Wall-clock seconds spent in the pipeline.
    pub processing_time: f64,
}

impl AnalysisResult {
    /// Whether the verdict meets the caller's confidence bar.
    pub fn is_reliable(&self, confidence_threshold: f64) -> bool {
        self.confidence >= confidence_threshold
    }
}
