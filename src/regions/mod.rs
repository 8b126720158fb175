//! Region analyzer: mask → connected dirt regions.
//!
//! Dirt candidates are grouped with 8-connectivity (diagonal neighbours
//! join). Labeling is a stack-based flood fill seeded in row-major order, so
//! regions come out in the scan order of their first pixel. Regions smaller
//! than `min_dirt_area` are isolated speckle; they are dropped and only
//! counted in the `rejected_*` fields.

mod accumulator;

use crate::config::DetectionConfig;
use crate::image::Mask;
use accumulator::RegionAccumulator;
use log::debug;
use serde::Serialize;

const NEIGH_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Inclusive pixel bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionBounds {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl RegionBounds {
    pub fn width(&self) -> usize {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> usize {
        self.max_y - self.min_y + 1
    }

    pub fn area(&self) -> usize {
        self.width() * self.height()
    }
}

/// Second-moment shape of a region.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionShape {
    /// Major axis direction in radians, `[-π/2, π/2)`, x towards +y.
    pub orientation: f32,
    /// Length of the equivalent ellipse along the major axis (pixels).
    pub major_axis: f32,
    pub minor_axis: f32,
    /// `major_axis / minor_axis`, at least 1.
    pub elongation: f32,
    /// Area over bounding-box area.
    pub fill_ratio: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    /// Pixel count.
    pub area: usize,
    pub bounds: RegionBounds,
    /// Mean pixel position `[x, y]`.
    pub centroid: [f32; 2],
    pub shape: RegionShape,
}

/// Surviving regions of one mask and their aggregate statistics.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSummary {
    /// Mask width.
    pub width: usize,
    /// Mask height.
    pub height: usize,
    /// Sum of surviving region areas.
    pub total_area: usize,
    pub region_count: usize,
    pub regions: Vec<Region>,
    pub rejected_count: usize,
    pub rejected_area: usize,
}

impl RegionSummary {
    /// Area of the largest surviving region, 0 when there is none.
    pub fn largest_area(&self) -> usize {
        self.regions.iter().map(|r| r.area).max().unwrap_or(0)
    }
}

struct Labeler<'a> {
    mask: &'a Mask,
    min_area: usize,
    used: Vec<u8>,
    stack: Vec<usize>,
    region: RegionAccumulator,
    summary: RegionSummary,
}

impl<'a> Labeler<'a> {
    fn new(mask: &'a Mask, min_area: usize) -> Self {
        Self {
            mask,
            min_area,
            used: vec![0u8; mask.w * mask.h],
            stack: Vec::with_capacity(64),
            region: RegionAccumulator::new(),
            summary: RegionSummary {
                width: mask.w,
                height: mask.h,
                ..Default::default()
            },
        }
    }

    fn run(mut self) -> RegionSummary {
        for idx in 0..self.used.len() {
            self.process_seed(idx);
        }
        self.summary.region_count = self.summary.regions.len();
        self.summary
    }

    fn process_seed(&mut self, idx: usize) {
        if self.used[idx] != 0 || !self.mask.data[idx] {
            return;
        }
        self.region.reset();
        self.stack.clear();
        self.used[idx] = 1;
        self.stack.push(idx);
        self.grow_region();

        let area = self.region.len();
        if area < self.min_area {
            self.summary.rejected_count += 1;
            self.summary.rejected_area += area;
            return;
        }
        if let Some(region) = self.region.build() {
            self.summary.total_area += region.area;
            self.summary.regions.push(region);
        }
    }

    fn grow_region(&mut self) {
        let (w, h) = (self.mask.w, self.mask.h);
        while let Some(idx) = self.stack.pop() {
            let x = idx % w;
            let y = idx / w;
            self.region.push(x, y);

            for (dx, dy) in NEIGH_OFFSETS {
                let xn = x as isize + dx;
                let yn = y as isize + dy;
                if xn < 0 || yn < 0 || xn >= w as isize || yn >= h as isize {
                    continue;
                }
                let neighbor_idx = yn as usize * w + xn as usize;
                if self.used[neighbor_idx] != 0 || !self.mask.data[neighbor_idx] {
                    continue;
                }
                self.used[neighbor_idx] = 1;
                self.stack.push(neighbor_idx);
            }
        }
    }
}

/// Label the mask and keep regions of at least `min_dirt_area` pixels.
pub fn analyze(mask: &Mask, config: &DetectionConfig) -> RegionSummary {
    let summary = Labeler::new(mask, config.min_dirt_area).run();
    debug!(
        "regions: {} kept ({} px), {} rejected ({} px)",
        summary.region_count, summary.total_area, summary.rejected_count, summary.rejected_area
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(min_dirt_area: usize) -> DetectionConfig {
        DetectionConfig {
            min_dirt_area,
            ..Default::default()
        }
    }

    fn rect(x0: usize, y0: usize, x1: usize, y1: usize) -> impl Fn(usize, usize) -> bool {
        move |x, y| (x0..x1).contains(&x) && (y0..y1).contains(&y)
    }

    #[test]
    fn empty_mask_has_no_regions() {
        let summary = analyze(&Mask::new(20, 10), &config(1));
        assert_eq!(summary.region_count, 0);
        assert_eq!(summary.total_area, 0);
        assert_eq!((summary.width, summary.height), (20, 10));
    }

    #[test]
    fn diagonal_pixels_join() {
        let mask = Mask::from_fn(5, 5, |x, y| x == y);
        let summary = analyze(&mask, &config(1));
        assert_eq!(summary.region_count, 1);
        assert_eq!(summary.total_area, 5);
        let shape = summary.regions[0].shape;
        assert!((shape.orientation - std::f32::consts::FRAC_PI_4).abs() < 1e-4);
        assert!(shape.elongation > 3.0);
    }

    #[test]
    fn small_regions_are_rejected() {
        let big = rect(0, 0, 10, 10);
        let small = rect(20, 20, 23, 23);
        let mask = Mask::from_fn(30, 30, |x, y| big(x, y) || small(x, y));
        let summary = analyze(&mask, &config(50));
        assert_eq!(summary.region_count, 1);
        assert_eq!(summary.total_area, 100);
        assert_eq!(summary.rejected_count, 1);
        assert_eq!(summary.rejected_area, 9);
    }

    #[test]
    fn area_equal_to_floor_survives() {
        let mask = Mask::from_fn(20, 20, rect(2, 2, 7, 7));
        let summary = analyze(&mask, &config(25));
        assert_eq!(summary.region_count, 1);
        assert_eq!(summary.total_area, 25);
    }

    #[test]
    fn regions_come_out_in_scan_order() {
        let lower_left = rect(0, 10, 4, 14);
        let upper_right = rect(12, 1, 16, 5);
        let mask = Mask::from_fn(20, 20, |x, y| lower_left(x, y) || upper_right(x, y));
        let summary = analyze(&mask, &config(1));
        assert_eq!(summary.region_count, 2);
        assert_eq!(summary.regions[0].bounds.min_y, 1);
        assert_eq!(summary.regions[1].bounds.min_y, 10);
    }

    #[test]
    fn square_region_descriptor() {
        let mask = Mask::from_fn(20, 20, rect(4, 6, 10, 12));
        let summary = analyze(&mask, &config(1));
        let region = &summary.regions[0];
        assert_eq!(region.area, 36);
        assert_eq!(
            region.bounds,
            RegionBounds {
                min_x: 4,
                min_y: 6,
                max_x: 9,
                max_y: 11
            }
        );
        assert!((region.centroid[0] - 6.5).abs() < 1e-5);
        assert!((region.centroid[1] - 8.5).abs() < 1e-5);
        assert!((region.shape.fill_ratio - 1.0).abs() < 1e-6);
        assert!((region.shape.elongation - 1.0).abs() < 1e-4);
        assert!((region.shape.major_axis - 4.0 * 3f32.sqrt()).abs() < 1e-3);
    }

    #[test]
    fn largest_area_reports_biggest_region() {
        let a = rect(0, 0, 3, 3);
        let b = rect(10, 10, 15, 15);
        let mask = Mask::from_fn(20, 20, |x, y| a(x, y) || b(x, y));
        assert_eq!(analyze(&mask, &config(1)).largest_area(), 25);
    }
}
