//! Preprocessor: color input → bounded, smoothed intensity buffer.
//!
//! Steps
//! - Validate the image layout and the blur/size parameters.
//! - Convert RGB to luma with the Rec. 601 weights
//!   `0.299 R + 0.587 G + 0.114 B`, normalised to `[0, 1]`.
//! - If the longer side exceeds `max_image_size`, shrink with area
//!   averaging so it equals `max_image_size` (see [`resize::fit_within`]).
//! - Smooth with a separable Gaussian of side `blur_kernel_size`.
//!
//! The stage is a pure function of its inputs.

pub mod filters;
pub mod resize;

use crate::config::DetectionConfig;
use crate::error::{DetectionError, Result};
use crate::image::{ImageF32, ImageViewMut, RawImage};

pub use filters::{GaussianKernel, SeparableFilter};
pub use resize::{fit_within, resize_area};

/// Rec. 601 luma weights in RGB order.
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Run the full preprocessing stage.
pub fn preprocess(image: &RawImage<'_>, config: &DetectionConfig) -> Result<ImageF32> {
    image.validate()?;
    if config.max_image_size == 0 {
        return Err(DetectionError::invalid_config(
            "max_image_size",
            config.max_image_size,
            "must be positive",
        ));
    }
    let kernel = GaussianKernel::new(config.blur_kernel_size)?;

    let luma = to_luma(image);
    let (w, h) = fit_within(luma.w, luma.h, config.max_image_size);
    let resized = if (w, h) == (luma.w, luma.h) {
        luma
    } else {
        resize_area(&luma, w, h)
    };
    Ok(filters::apply(&kernel, &resized))
}

/// Luma conversion of a validated RGB view.
pub fn to_luma(image: &RawImage<'_>) -> ImageF32 {
    let [wr, wg, wb] = LUMA_WEIGHTS;
    let mut out = ImageF32::new(image.w, image.h);
    for y in 0..image.h {
        let src = image.row(y);
        let dst = out.row_mut(y);
        for (px, rgb) in dst.iter_mut().zip(src.chunks_exact(image.channels)) {
            let v = wr * rgb[0] as f32 + wg * rgb[1] as f32 + wb * rgb[2] as f32;
            *px = (v / 255.0).clamp(0.0, 1.0);
        }
    }
    out
}
