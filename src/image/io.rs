//! I/O helpers for color images, masks and JSON.
//!
//! - `load_rgb_image`: enforce upload limits, then decode a JPEG/PNG/BMP/TIFF
//!   file into an owned RGB buffer.
//! - `decode_rgb_image`: decode an in-memory upload.
//! - `save_mask_png`: write a [`Mask`] as a black/white PNG.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::{Mask, RawImage};
use crate::error::{DetectionError, Result};
use ::image::{GrayImage, Luma};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Owned, tightly packed RGB buffer.
#[derive(Clone, Debug)]
pub struct RgbBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl RgbBuffer {
    /// Wrap packed RGB bytes; `data.len()` must be `width * height * 3`.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height * 3);
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Borrow as a read-only [`RawImage`] view.
    pub fn as_view(&self) -> RawImage<'_> {
        RawImage::rgb(self.width, self.height, &self.data)
    }
}

/// Limits applied to files before they reach the decoder.
#[derive(Clone, Debug)]
pub struct UploadLimits {
    pub max_file_size: u64,
    /// Lower-case extensions without the leading dot.
    extensions: Vec<String>,
}

impl UploadLimits {
    pub fn new(max_file_size: u64, allowed_extensions: &[String]) -> Self {
        let extensions = allowed_extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self {
            max_file_size,
            extensions,
        }
    }

    pub fn allows_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|allowed| *allowed == ext)
            })
            .unwrap_or(false)
    }
}

impl Default for UploadLimits {
    fn default() -> Self {
        crate::config::ServiceSettings::default().upload_limits()
    }
}

/// Load an image file after checking its extension and size.
pub fn load_rgb_image(path: &Path, limits: &UploadLimits) -> Result<RgbBuffer> {
    if !limits.allows_extension(path) {
        return Err(DetectionError::image_rejected(
            path,
            "file extension is not an accepted image type",
        ));
    }
    let bytes = fs::read(path).map_err(|e| DetectionError::image_load(path, "read failed", e))?;
    if bytes.len() as u64 > limits.max_file_size {
        return Err(DetectionError::image_rejected(
            path,
            format!(
                "file is {} bytes, limit is {}",
                bytes.len(),
                limits.max_file_size
            ),
        ));
    }
    decode_rgb_image(&bytes, path)
}

/// Decode an in-memory image into RGB; `origin` only labels errors.
pub fn decode_rgb_image(bytes: &[u8], origin: &Path) -> Result<RgbBuffer> {
    let img = ::image::load_from_memory(bytes)
        .map_err(|e| DetectionError::image_load(origin, "decode failed", e))?
        .into_rgb8();
    let width = img.width() as usize;
    let height = img.height() as usize;
    Ok(RgbBuffer::new(width, height, img.into_raw()))
}

/// Save a mask as an 8-bit PNG, dirt in white.
pub fn save_mask_png(mask: &Mask, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut out = GrayImage::new(mask.w as u32, mask.h as u32);
    for (i, &dirty) in mask.data.iter().enumerate() {
        let (x, y) = (i % mask.w, i / mask.w);
        out.put_pixel(x as u32, y as u32, Luma([if dirty { 255 } else { 0 }]));
    }
    out.save(path).map_err(|e| output_error(path, e))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value).map_err(|e| output_error(path, e))?;
    fs::write(path, json).map_err(|e| output_error(path, e))
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| output_error(parent, e))?;
        }
    }
    Ok(())
}

fn output_error(path: &Path, e: impl std::fmt::Display) -> DetectionError {
    DetectionError::Output {
        path: PathBuf::from(path),
        message: e.to_string(),
    }
}
