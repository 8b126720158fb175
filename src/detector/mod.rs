//! Dirt detector orchestrating the four-stage pipeline.
//!
//! Overview
//! - Preprocess: RGB → luma, bounded resize, Gaussian smoothing.
//! - Segment: robust background surface, deviation histogram, adaptive
//!   threshold floored at a minimum contrast.
//! - Regions: 8-connected labeling with an area floor.
//! - Verdict: dirty percentage, clean flag, confidence, elapsed time.
//!
//! The detector holds only its validated configuration, so one instance can
//! be shared by reference across threads. Each call is independent and
//! either returns a complete result or the first stage error.

mod pipeline;

pub use pipeline::{analyze, DirtDetector};
