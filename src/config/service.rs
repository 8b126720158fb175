use crate::error::{DetectionError, Result};
use crate::image::io::UploadLimits;
use serde::{Deserialize, Serialize};

/// Settings consumed by the loading and reporting layers only; the pipeline
/// itself never reads them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Largest accepted image file, in bytes.
    pub max_file_size: u64,
    /// Accepted file extensions, with leading dot.
    pub allowed_extensions: Vec<String>,
    /// Default `env_logger` filter.
    pub log_level: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
            allowed_extensions: [".jpg", ".jpeg", ".png", ".bmp", ".tiff"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            log_level: "info".to_string(),
        }
    }
}

impl ServiceSettings {
    pub fn validate(&self) -> Result<()> {
        if self.max_file_size == 0 {
            return Err(DetectionError::invalid_config(
                "max_file_size",
                self.max_file_size,
                "must be positive",
            ));
        }
        if self.allowed_extensions.is_empty() {
            return Err(DetectionError::invalid_config(
                "allowed_extensions",
                "[]",
                "at least one extension is required",
            ));
        }
        Ok(())
    }

    pub fn upload_limits(&self) -> UploadLimits {
        UploadLimits::new(self.max_file_size, &self.allowed_extensions)
    }
}
