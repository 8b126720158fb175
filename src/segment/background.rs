//! Robust illumination model of the clean surface.
//!
//! The background is a low-order polynomial surface in normalised image
//! coordinates (`x, y ∈ [-1, 1]`):
//!
//! `B(x, y) = c0 + c1·x + c2·y + c3·x² + c4·x·y + c5·y²`
//!
//! Terms are only used when the fitted samples cover enough distinct
//! positions, and enough of the frame, along the axis to constrain them. The
//! fit is an iteratively reweighted least-squares loop with hard (0/1)
//! weights: starting from the median intensity, each pass keeps the samples
//! whose residual lies inside `max(k · 1.4826 · MAD, min_contrast / 2)` and
//! re-solves the normal equations.
//!
//! Grime darkens a surface, so the clean surface is the lightest populated
//! intensity class, not the majority. After each fit, samples lying more than
//! `min_contrast` above the surface form a lighter class; when that class
//! holds at least [`MIN_SURFACE_SHARE`] of the samples the surface is refitted
//! to it alone. This keeps heavy coverage dirty instead of letting the stain
//! become the reference. Lighter marks below that share still deviate and
//! count as dirt.
//!
//! Samples come from a regular grid with roughly `fit_sample_target`
//! positions per side; the solve is O(samples · terms²) per pass.
use crate::config::SegmenterOptions;
use crate::image::{ImageF32, ImageView, ImageViewMut};
use log::{debug, warn};
use nalgebra::{DMatrix, DVector};

const MAX_ITERS: usize = 8;
const MAD_TO_SIGMA: f32 = 1.4826;
const CONVERGENCE_EPS: f64 = 1e-7;
/// Smallest share of the fit samples a lighter class needs to become the
/// surface.
pub const MIN_SURFACE_SHARE: f32 = 0.005;
/// Upper bound on surface switches towards lighter classes.
const MAX_SURFACE_PASSES: usize = 4;
/// Fraction of an axis the samples must span before slope terms are used.
const MIN_AXIS_SPAN: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Term {
    Const,
    X,
    Y,
    Xx,
    Xy,
    Yy,
}

impl Term {
    #[inline]
    fn eval(self, x: f64, y: f64) -> f64 {
        match self {
            Term::Const => 1.0,
            Term::X => x,
            Term::Y => y,
            Term::Xx => x * x,
            Term::Xy => x * y,
            Term::Yy => y * y,
        }
    }
}

#[derive(Clone, Copy)]
struct Sample {
    gx: usize,
    gy: usize,
    x: f64,
    y: f64,
    v: f32,
}

/// Distinct positions along one grid axis, and whether they span at least
/// [`MIN_AXIS_SPAN`] of it.
fn axis_coverage(positions: impl Iterator<Item = usize>, len: usize) -> (usize, bool) {
    let mut seen = vec![false; len];
    let (mut lo, mut hi) = (usize::MAX, 0);
    for p in positions {
        seen[p] = true;
        lo = lo.min(p);
        hi = hi.max(p);
    }
    let distinct = seen.iter().filter(|&&b| b).count();
    let wide = distinct > 1 && (hi - lo) as f64 >= MIN_AXIS_SPAN * (len - 1) as f64;
    (distinct, wide)
}

/// Polynomial terms supported by `samples` on a `cols × rows` grid.
fn terms_for(samples: &[Sample], cols: usize, rows: usize) -> Vec<Term> {
    let (x_distinct, x_wide) = axis_coverage(samples.iter().map(|s| s.gx), cols);
    let (y_distinct, y_wide) = axis_coverage(samples.iter().map(|s| s.gy), rows);

    let mut terms = vec![Term::Const];
    if x_wide {
        terms.push(Term::X);
    }
    if y_wide {
        terms.push(Term::Y);
    }
    if x_wide && x_distinct >= 3 {
        terms.push(Term::Xx);
    }
    if x_wide && y_wide {
        terms.push(Term::Xy);
    }
    if y_wide && y_distinct >= 3 {
        terms.push(Term::Yy);
    }
    terms
}

/// Fitted background surface for one working buffer.
#[derive(Clone, Debug)]
pub struct BackgroundModel {
    w: usize,
    h: usize,
    terms: Vec<Term>,
    coeffs: Vec<f64>,
    /// Median intensity of the samples the surface was fitted to.
    pub median_level: f32,
    /// Samples retained by the last accepted pass.
    pub inliers: usize,
    /// Number of samples drawn from the buffer.
    pub samples: usize,
}

#[inline]
fn normalized(coord: usize, len: usize) -> f64 {
    if len > 1 {
        2.0 * coord as f64 / (len - 1) as f64 - 1.0
    } else {
        0.0
    }
}

/// Median of `values` (upper median for even lengths); reorders the slice.
fn median_in_place(values: &mut [f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mid = values.len() / 2;
    let (_, m, _) = values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
    *m
}

impl BackgroundModel {
    /// A flat background at `level`.
    pub fn constant(w: usize, h: usize, level: f32) -> Self {
        Self {
            w,
            h,
            terms: vec![Term::Const],
            coeffs: vec![level as f64],
            median_level: level,
            inliers: 0,
            samples: 0,
        }
    }

    /// Fit the surface to `buffer`.
    pub fn fit(buffer: &ImageF32, options: &SegmenterOptions) -> Self {
        let (w, h) = (buffer.w, buffer.h);
        if w == 0 || h == 0 {
            return Self::constant(w, h, 0.0);
        }
        let step = w.max(h).div_ceil(options.fit_sample_target.max(1)).max(1);
        let (cols, rows) = (w.div_ceil(step), h.div_ceil(step));
        let samples: Vec<Sample> = (0..h)
            .step_by(step)
            .enumerate()
            .flat_map(|(gy, y)| {
                let row = buffer.row(y);
                (0..w).step_by(step).enumerate().map(move |(gx, x)| Sample {
                    gx,
                    gy,
                    x: normalized(x, w),
                    y: normalized(y, h),
                    v: row[x],
                })
            })
            .collect();

        let min_class = ((MIN_SURFACE_SHARE * samples.len() as f32).ceil() as usize).max(1);
        let mut model = Self::fit_samples(w, h, &samples, (cols, rows), options);
        for _ in 0..MAX_SURFACE_PASSES {
            let lighter: Vec<Sample> = samples
                .iter()
                .filter(|s| s.v - model.eval_normalized(s.x, s.y) > options.min_contrast)
                .copied()
                .collect();
            if lighter.len() < min_class.max(model.term_count()) {
                break;
            }
            debug!(
                "background fit: lighter class of {} / {} samples above {:.3}, refitting",
                lighter.len(),
                samples.len(),
                model.median_level
            );
            model = Self::fit_samples(w, h, &lighter, (cols, rows), options);
        }
        model.samples = samples.len();
        model
    }

    fn fit_samples(
        w: usize,
        h: usize,
        samples: &[Sample],
        (cols, rows): (usize, usize),
        options: &SegmenterOptions,
    ) -> Self {
        let mut scratch: Vec<f32> = samples.iter().map(|s| s.v).collect();
        let median_level = median_in_place(&mut scratch);
        let terms = terms_for(samples, cols, rows);

        let mut model = Self {
            w,
            h,
            coeffs: std::iter::once(median_level as f64)
                .chain(std::iter::repeat(0.0).take(terms.len() - 1))
                .collect(),
            terms,
            median_level,
            inliers: samples.len(),
            samples: samples.len(),
        };
        model.refine(samples, options, &mut scratch);
        model
    }

    fn refine(&mut self, samples: &[Sample], options: &SegmenterOptions, scratch: &mut Vec<f32>) {
        let n = self.terms.len();
        let min_band = 0.5 * options.min_contrast;
        for iter in 0..MAX_ITERS {
            scratch.clear();
            scratch.extend(
                samples
                    .iter()
                    .map(|s| (s.v - self.eval_normalized(s.x, s.y)).abs()),
            );
            let residuals: Vec<f32> = scratch.clone();
            let sigma = MAD_TO_SIGMA * median_in_place(scratch);
            let band = (options.inlier_band_sigmas * sigma).max(min_band);

            let mut ata = DMatrix::<f64>::zeros(n, n);
            let mut atb = DVector::<f64>::zeros(n);
            let mut basis = vec![0.0f64; n];
            let mut inliers = 0usize;
            for (sample, &r) in samples.iter().zip(&residuals) {
                if r > band {
                    continue;
                }
                inliers += 1;
                for (b, term) in basis.iter_mut().zip(&self.terms) {
                    *b = term.eval(sample.x, sample.y);
                }
                for i in 0..n {
                    atb[i] += basis[i] * sample.v as f64;
                    for j in i..n {
                        ata[(i, j)] += basis[i] * basis[j];
                    }
                }
            }
            if inliers < n {
                debug!("background fit: {inliers} inliers for {n} terms, keeping previous model");
                break;
            }
            for i in 0..n {
                for j in 0..i {
                    ata[(i, j)] = ata[(j, i)];
                }
            }
            let Some(solution) = ata.lu().solve(&atb) else {
                warn!("background fit: normal equations are singular, keeping previous model");
                break;
            };
            let delta = solution
                .iter()
                .zip(&self.coeffs)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0f64, f64::max);
            self.coeffs = solution.iter().copied().collect();
            self.inliers = inliers;
            if delta < CONVERGENCE_EPS {
                debug!("background fit converged after {} passes", iter + 1);
                break;
            }
        }
    }

    #[inline]
    fn eval_normalized(&self, x: f64, y: f64) -> f32 {
        self.terms
            .iter()
            .zip(&self.coeffs)
            .map(|(term, c)| c * term.eval(x, y))
            .sum::<f64>() as f32
    }

    /// Background intensity at pixel `(x, y)`.
    pub fn eval(&self, x: usize, y: usize) -> f32 {
        self.eval_normalized(normalized(x, self.w), normalized(y, self.h))
    }

    /// Number of polynomial terms in use.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Absolute deviation `|I(p) - B(p)|` for every pixel.
    pub fn deviation(&self, buffer: &ImageF32) -> ImageF32 {
        let mut out = ImageF32::new(buffer.w, buffer.h);
        for y in 0..buffer.h {
            let ny = normalized(y, buffer.h);
            let src = buffer.row(y);
            let dst = out.row_mut(y);
            for (x, (d, &v)) in dst.iter_mut().zip(src).enumerate() {
                *d = (v - self.eval_normalized(normalized(x, buffer.w), ny)).abs();
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_surface_is_recovered() {
        let img = ImageF32::filled(40, 30, 0.6);
        let model = BackgroundModel::fit(&img, &SegmenterOptions::default());
        assert!((model.eval(0, 0) - 0.6).abs() < 1e-5);
        assert!((model.eval(39, 29) - 0.6).abs() < 1e-5);
    }

    #[test]
    fn lighting_gradient_is_modelled() {
        let img = ImageF32::from_fn(80, 60, |x, y| 0.5 + 0.004 * x as f32 + 0.002 * y as f32);
        let model = BackgroundModel::fit(&img, &SegmenterOptions::default());
        let dev = model.deviation(&img);
        let worst = dev.data.iter().copied().fold(0.0f32, f32::max);
        assert!(worst < 1e-3, "worst deviation {worst}");
        assert_eq!(model.term_count(), 6);
    }

    #[test]
    fn dark_blotch_is_excluded_from_the_fit() {
        let img = ImageF32::from_fn(100, 100, |x, y| {
            if (20..60).contains(&x) && (30..80).contains(&y) {
                0.05
            } else {
                0.9
            }
        });
        let model = BackgroundModel::fit(&img, &SegmenterOptions::default());
        assert!((model.eval(40, 50) - 0.9).abs() < 1e-3);
        assert!(model.inliers < model.samples);
    }

    #[test]
    fn lighter_class_becomes_the_surface() {
        let img = ImageF32::from_fn(100, 100, |_, y| if y >= 96 { 0.9 } else { 0.1 });
        let model = BackgroundModel::fit(&img, &SegmenterOptions::default());
        assert!((model.median_level - 0.9).abs() < 1e-6);
        assert!((model.eval(50, 10) - 0.9).abs() < 1e-3);
        assert!((model.eval(0, 0) - 0.9).abs() < 1e-3);
        assert_eq!(model.samples, 10_000);
        assert_eq!(model.term_count(), 3);
    }

    #[test]
    fn narrow_bright_speck_is_not_a_surface() {
        let img = ImageF32::from_fn(100, 100, |x, y| if x < 5 && y < 5 { 0.9 } else { 0.4 });
        let model = BackgroundModel::fit(&img, &SegmenterOptions::default());
        assert!((model.eval(50, 50) - 0.4).abs() < 1e-3);
    }

    #[test]
    fn axis_terms_need_spread() {
        assert_eq!(axis_coverage([3usize, 4, 5].into_iter(), 100), (3, false));
        assert_eq!(axis_coverage([0usize, 60].into_iter(), 100), (2, true));
        assert_eq!(axis_coverage(std::iter::once(7usize), 10), (1, false));
    }

    #[test]
    fn single_row_uses_only_x_terms() {
        let img = ImageF32::from_fn(10, 1, |x, _| 0.1 * x as f32 / 9.0 + 0.5);
        let model = BackgroundModel::fit(&img, &SegmenterOptions::default());
        assert_eq!(model.term_count(), 3);
        assert!((model.eval(9, 0) - 0.6).abs() < 1e-4);
    }

    #[test]
    fn median_in_place_picks_middle() {
        let mut v = vec![3.0, 1.0, 2.0];
        assert_eq!(median_in_place(&mut v), 2.0);
        let mut v: Vec<f32> = Vec::new();
        assert_eq!(median_in_place(&mut v), 0.0);
    }
}
