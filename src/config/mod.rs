//! Configuration loading for the detector and its front-ends.
//!
//! Resolution order: built-in defaults, then an optional flat JSON file, then
//! environment overrides, then validation. The JSON document mixes the
//! pipeline parameters and the service settings at the top level:
//!
//! ```json
//! {
//!   "dirt_threshold": 5.0,
//!   "min_dirt_area": 100,
//!   "blur_kernel_size": 5,
//!   "max_file_size": 10485760,
//!   "segmenter": { "min_contrast": 0.1 }
//! }
//! ```

pub mod detection;
pub mod env;
pub mod service;

pub use detection::{DetectionConfig, SegmenterOptions};
pub use service::ServiceSettings;

use crate::error::{DetectionError, Result};
use env::{EnvSource, ProcessEnv};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(flatten)]
    pub detection: DetectionConfig,
    #[serde(flatten)]
    pub service: ServiceSettings,
}

impl Settings {
    /// Load settings from an optional JSON file plus the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, &ProcessEnv)
    }

    pub fn load_with_env(path: Option<&Path>, source: &dyn EnvSource) -> Result<Self> {
        let mut settings = match path {
            Some(path) => load_config(path)?,
            None => Settings::default(),
        };
        env::apply_overrides(&mut settings, source)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        self.detection.validate()?;
        self.service.validate()
    }
}

/// Parse a settings file without applying overrides or validating.
pub fn load_config(path: &Path) -> Result<Settings> {
    let contents = fs::read_to_string(path).map_err(|e| DetectionError::ConfigLoad {
        path: path.to_path_buf(),
        message: format!("read failed: {e}"),
    })?;
    serde_json::from_str(&contents).map_err(|e| DetectionError::ConfigLoad {
        path: path.to_path_buf(),
        message: format!("parse failed: {e}"),
    })
}
