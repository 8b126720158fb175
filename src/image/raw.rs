//! Borrowed 8-bit color input.
//!
//! Samples are interleaved per pixel in RGB order; rows may be padded, with
//! `stride` giving the number of bytes between row starts.
use crate::error::{DetectionError, Result};

/// Channel count the pipeline accepts.
pub const RGB_CHANNELS: usize = 3;

#[derive(Clone, Copy, Debug)]
pub struct RawImage<'a> {
    pub w: usize,
    pub h: usize,
    pub channels: usize,
    /// bytes between rows
    pub stride: usize,
    pub data: &'a [u8],
}

impl<'a> RawImage<'a> {
    /// Tightly packed RGB view.
    pub fn rgb(w: usize, h: usize, data: &'a [u8]) -> Self {
        Self {
            w,
            h,
            channels: RGB_CHANNELS,
            stride: w * RGB_CHANNELS,
            data,
        }
    }

    /// Reject zero-area images, non-RGB layouts and truncated buffers.
    pub fn validate(&self) -> Result<()> {
        if self.w == 0 || self.h == 0 {
            return Err(DetectionError::unsupported_image(format!(
                "zero-area image {}x{}",
                self.w, self.h
            )));
        }
        if self.channels != RGB_CHANNELS {
            return Err(DetectionError::unsupported_image(format!(
                "{} channels per pixel, expected {RGB_CHANNELS}",
                self.channels
            )));
        }
        let row_bytes = self.w * self.channels;
        if self.stride < row_bytes {
            return Err(DetectionError::unsupported_image(format!(
                "stride {} shorter than a row ({row_bytes} bytes)",
                self.stride
            )));
        }
        let needed = self.stride * (self.h - 1) + row_bytes;
        if self.data.len() < needed {
            return Err(DetectionError::unsupported_image(format!(
                "buffer holds {} bytes, {}x{} needs {needed}",
                self.data.len(),
                self.w,
                self.h
            )));
        }
        Ok(())
    }

    /// Interleaved samples of row `y`; only meaningful after [`validate`](Self::validate).
    #[inline]
    pub fn row(&self, y: usize) -> &'a [u8] {
        let start = y * self.stride;
        &self.data[start..start + self.w * self.channels]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn packed_rgb_is_valid() {
        let data = vec![0u8; 4 * 3 * 3];
        let img = RawImage::rgb(4, 3, &data);
        img.validate().unwrap();
        assert_eq!(img.row(2).len(), 12);
    }

    #[test]
    fn padded_rows_are_accepted() {
        let data = vec![0u8; 16 * 2 + 12];
        let img = RawImage {
            w: 4,
            h: 3,
            channels: 3,
            stride: 16,
            data: &data,
        };
        img.validate().unwrap();
    }

    #[test]
    fn rejects_degenerate_inputs() {
        let data = vec![0u8; 64];
        let cases = [
            RawImage::rgb(0, 4, &data),
            RawImage {
                channels: 4,
                stride: 16,
                ..RawImage::rgb(4, 4, &data)
            },
            RawImage::rgb(8, 8, &data),
            RawImage {
                stride: 2,
                ..RawImage::rgb(4, 1, &data)
            },
        ];
        for img in cases {
            let err = img.validate().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnsupportedImage, "{img:?}");
        }
    }
}
