use super::{Region, RegionBounds, RegionShape};
use nalgebra::{Matrix2, SymmetricEigen};

/// Running moments of the region being flooded.
pub(crate) struct RegionAccumulator {
    pub count: usize,
    pub sum_x: f64,
    pub sum_y: f64,
    pub sum_xx: f64,
    pub sum_yy: f64,
    pub sum_xy: f64,
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl RegionAccumulator {
    pub(crate) fn new() -> Self {
        Self {
            count: 0,
            sum_x: 0.0,
            sum_y: 0.0,
            sum_xx: 0.0,
            sum_yy: 0.0,
            sum_xy: 0.0,
            min_x: usize::MAX,
            min_y: usize::MAX,
            max_x: 0,
            max_y: 0,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.count = 0;
        self.sum_x = 0.0;
        self.sum_y = 0.0;
        self.sum_xx = 0.0;
        self.sum_yy = 0.0;
        self.sum_xy = 0.0;
        self.min_x = usize::MAX;
        self.min_y = usize::MAX;
        self.max_x = 0;
        self.max_y = 0;
    }

    pub(crate) fn push(&mut self, x: usize, y: usize) {
        self.count += 1;
        let xf = x as f64;
        let yf = y as f64;
        self.sum_x += xf;
        self.sum_y += yf;
        self.sum_xx += xf * xf;
        self.sum_yy += yf * yf;
        self.sum_xy += xf * yf;
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub(crate) fn len(&self) -> usize {
        self.count
    }

    /// Build the region descriptor. `None` for an empty accumulator.
    pub(crate) fn build(&self) -> Option<Region> {
        if self.count == 0 {
            return None;
        }
        let count = self.count as f64;
        let cx = self.sum_x / count;
        let cy = self.sum_y / count;
        let bounds = RegionBounds {
            min_x: self.min_x,
            min_y: self.min_y,
            max_x: self.max_x,
            max_y: self.max_y,
        };

        // Central moments of unit-square pixels; the 1/12 term keeps both
        // eigenvalues positive.
        let cxx = self.sum_xx / count - cx * cx + 1.0 / 12.0;
        let cyy = self.sum_yy / count - cy * cy + 1.0 / 12.0;
        let cxy = self.sum_xy / count - cx * cy;
        let eig = SymmetricEigen::new(Matrix2::new(cxx, cxy, cxy, cyy));
        let (major_idx, minor_idx) = if eig.eigenvalues[0] >= eig.eigenvalues[1] {
            (0, 1)
        } else {
            (1, 0)
        };
        let lambda_major = eig.eigenvalues[major_idx].max(0.0);
        let lambda_minor = eig.eigenvalues[minor_idx].max(0.0);
        let axis = eig.eigenvectors.column(major_idx);
        let mut orientation = axis[1].atan2(axis[0]);
        // Fold into [-pi/2, pi/2): an axis has no direction.
        if orientation >= std::f64::consts::FRAC_PI_2 {
            orientation -= std::f64::consts::PI;
        } else if orientation < -std::f64::consts::FRAC_PI_2 {
            orientation += std::f64::consts::PI;
        }
        let major_axis = 4.0 * lambda_major.sqrt();
        let minor_axis = 4.0 * lambda_minor.sqrt();

        Some(Region {
            area: self.count,
            bounds,
            centroid: [cx as f32, cy as f32],
            shape: RegionShape {
                orientation: orientation as f32,
                major_axis: major_axis as f32,
                minor_axis: minor_axis as f32,
                elongation: (major_axis / minor_axis) as f32,
                fill_ratio: (count / bounds.area() as f64) as f32,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_pixels_and_resets() {
        let mut acc = RegionAccumulator::new();
        assert!(acc.build().is_none());
        for y in 0..3 {
            for x in 0..4 {
                acc.push(x, y);
            }
        }
        assert_eq!(acc.len(), 12);
        let region = acc.build().unwrap();
        assert_eq!(region.area, 12);
        assert_eq!(region.centroid, [1.5, 1.0]);
        assert_eq!(region.shape.fill_ratio, 1.0);

        acc.reset();
        assert_eq!(acc.len(), 0);
        acc.push(7, 2);
        let single = acc.build().unwrap();
        assert_eq!(single.area, 1);
        assert_eq!((single.bounds.min_x, single.bounds.max_x), (7, 7));
    }
}
