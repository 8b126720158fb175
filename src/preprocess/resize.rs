//! Bounded-resolution resampling.
//!
//! Downsampling uses area averaging: every destination pixel is the mean of
//! the source footprint it covers, with fractional coverage at the footprint
//! edges. The filter is separable, so the horizontal and vertical passes
//! reuse one table of weights per axis.
use crate::image::{ImageF32, ImageView, ImageViewMut};

/// Target dimensions keeping the aspect ratio with the longer side at most
/// `max_side`. The longer side lands exactly on `max_side` when shrinking;
/// the shorter one is rounded to the nearest integer and never drops below 1.
pub fn fit_within(w: usize, h: usize, max_side: usize) -> (usize, usize) {
    let long = w.max(h);
    if long <= max_side || long == 0 {
        return (w, h);
    }
    let scale_short = |short: usize| -> usize {
        let scaled = (short as f64 * max_side as f64 / long as f64).round() as usize;
        scaled.max(1)
    };
    if w >= h {
        (max_side, scale_short(h))
    } else {
        (scale_short(w), max_side)
    }
}

/// Coverage weights of one destination sample along an axis.
struct AxisTaps {
    first: usize,
    weights: Vec<f32>,
}

fn area_taps(src_len: usize, dst_len: usize) -> Vec<AxisTaps> {
    let scale = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|i| {
            let start = i as f64 * scale;
            let end = ((i + 1) as f64 * scale).min(src_len as f64);
            let first = (start.floor() as usize).min(src_len - 1);
            let last = (end.ceil() as usize).clamp(first + 1, src_len);
            let mut weights: Vec<f32> = (first..last)
                .map(|j| {
                    let lo = start.max(j as f64);
                    let hi = end.min((j + 1) as f64);
                    (hi - lo).max(0.0) as f32
                })
                .collect();
            let sum: f32 = weights.iter().sum();
            if sum > 0.0 {
                weights.iter_mut().for_each(|wgt| *wgt /= sum);
            } else {
                weights.iter_mut().for_each(|wgt| *wgt = 1.0 / (last - first) as f32);
            }
            AxisTaps { first, weights }
        })
        .collect()
}

/// Resample `src` to `dst_w × dst_h` by area averaging.
pub fn resize_area(src: &ImageF32, dst_w: usize, dst_h: usize) -> ImageF32 {
    if src.w == 0 || src.h == 0 || dst_w == 0 || dst_h == 0 {
        return ImageF32::new(dst_w, dst_h);
    }
    if (dst_w, dst_h) == (src.w, src.h) {
        return src.clone();
    }

    let x_taps = area_taps(src.w, dst_w);
    let y_taps = area_taps(src.h, dst_h);

    let mut horiz = ImageF32::new(dst_w, src.h);
    for y in 0..src.h {
        let src_row = src.row(y);
        let dst_row = horiz.row_mut(y);
        for (dst_px, taps) in dst_row.iter_mut().zip(&x_taps) {
            *dst_px = taps
                .weights
                .iter()
                .enumerate()
                .map(|(k, wgt)| wgt * src_row[taps.first + k])
                .sum();
        }
    }

    let mut out = ImageF32::new(dst_w, dst_h);
    for (y, taps) in y_taps.iter().enumerate() {
        let dst_row = out.row_mut(y);
        for (k, wgt) in taps.weights.iter().enumerate() {
            let src_row = horiz.row(taps.first + k);
            for (dst_px, &v) in dst_row.iter_mut().zip(src_row) {
                *dst_px += wgt * v;
            }
        }
    }
    out
}
