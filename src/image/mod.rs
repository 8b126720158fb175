//! Pixel buffers flowing through the pipeline.
//!
//! - [`RawImage`]: borrowed 8-bit color input, never retained past a call.
//! - [`ImageF32`]: owned single-channel working buffer in `[0, 1]`.
//! - [`Mask`]: owned dirt/clean buffer with the working buffer's dimensions.
//! - [`io`]: file loading with upload limits and JSON output helpers.

pub mod f32;
pub mod io;
pub mod mask;
pub mod raw;
pub mod traits;

pub use self::f32::ImageF32;
pub use self::mask::Mask;
pub use self::raw::RawImage;
pub use self::traits::{ImageView, ImageViewMut};
