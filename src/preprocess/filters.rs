//! Separable smoothing filters.
//!
//! Border samples clamp to the image extents (replicate border). The
//! horizontal pass writes into a scratch buffer, the vertical pass into the
//! output, so each pass is O(W·H·k).
use crate::config::detection::validate_blur_kernel;
use crate::error::Result;
use crate::image::{ImageF32, ImageView, ImageViewMut};

/// Trait implemented by separable 1D filters.
pub trait SeparableFilter {
    /// Return the 1D taps (in left-to-right order). The kernel is assumed to be
    /// symmetric around its centre, but the implementation does not rely on it.
    fn taps(&self) -> &[f32];
}

/// Normalised Gaussian window of odd side length.
#[derive(Clone, Debug, PartialEq)]
pub struct GaussianKernel {
    taps: Vec<f32>,
    sigma: f32,
}

impl GaussianKernel {
    /// Build the kernel for a configured window side.
    ///
    /// Sigma follows the usual size-derived rule
    /// `0.3 * ((k - 1) / 2 - 1) + 0.8`, so `k = 5` gives `sigma = 1.1`.
    /// Non-positive or even sizes are rejected.
    pub fn new(size: i32) -> Result<Self> {
        let k = validate_blur_kernel(size)?;
        let sigma = 0.3 * ((k as f32 - 1.0) * 0.5 - 1.0) + 0.8;
        if k == 1 {
            return Ok(Self {
                taps: vec![1.0],
                sigma,
            });
        }
        let radius = (k / 2) as f32;
        let denom = 2.0 * sigma * sigma;
        let mut taps: Vec<f32> = (0..k)
            .map(|i| {
                let d = i as f32 - radius;
                (-(d * d) / denom).exp()
            })
            .collect();
        let sum: f32 = taps.iter().sum();
        for t in &mut taps {
            *t /= sum;
        }
        Ok(Self { taps, sigma })
    }

    pub fn sigma(&self) -> f32 {
        self.sigma
    }

    pub fn size(&self) -> usize {
        self.taps.len()
    }
}

impl SeparableFilter for GaussianKernel {
    #[inline]
    fn taps(&self) -> &[f32] {
        &self.taps
    }
}

/// Apply a separable filter with replicate border handling.
pub fn apply(filter: &dyn SeparableFilter, src: &ImageF32) -> ImageF32 {
    let taps = filter.taps();
    if taps.len() <= 1 || src.w == 0 || src.h == 0 {
        let scale = taps.first().copied().unwrap_or(1.0);
        let mut out = src.clone();
        if scale != 1.0 {
            out.data.iter_mut().for_each(|v| *v *= scale);
        }
        return out;
    }
    let radius = (taps.len() / 2) as isize;
    let (w, h) = (src.w, src.h);

    let mut tmp = ImageF32::new(w, h);
    for y in 0..h {
        let src_row = src.row(y);
        let dst_row = tmp.row_mut(y);
        for (x, dst_px) in dst_row.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (k, &tap) in taps.iter().enumerate() {
                let sx = clamp_index(x as isize + k as isize - radius, w);
                acc += tap * src_row[sx];
            }
            *dst_px = acc;
        }
    }

    let mut out = ImageF32::new(w, h);
    for y in 0..h {
        let rows: Vec<&[f32]> = (0..taps.len())
            .map(|k| tmp.row(clamp_index(y as isize + k as isize - radius, h)))
            .collect();
        let dst_row = out.row_mut(y);
        for (x, dst_px) in dst_row.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (tap, row) in taps.iter().zip(&rows) {
                acc += tap * row[x];
            }
            *dst_px = acc;
        }
    }
    out
}

pub(crate) fn clamp_index(idx: isize, upper: usize) -> usize {
    if upper == 0 {
        return 0;
    }
    if idx < 0 {
        0
    } else if (idx as usize) >= upper {
        upper - 1
    } else {
        idx as usize
    }
}
