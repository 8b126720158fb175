//! Environment overrides for [`Settings`](super::Settings).
//!
//! Keys are the field names, matched case-insensitively: `DIRT_THRESHOLD`
//! and `dirt_threshold` both override `dirt_threshold`. The upper-case form
//! wins when both are set. Lists are comma separated.

use super::Settings;
use crate::error::{DetectionError, Result};
use std::str::FromStr;

/// Source of override values. Implemented for closures so tests can inject a
/// fixed map instead of the process environment.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

impl<F> EnvSource for F
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        self(key)
    }
}

/// The process environment.
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

fn lookup(source: &dyn EnvSource, key: &str) -> Option<String> {
    source
        .get(&key.to_ascii_uppercase())
        .or_else(|| source.get(key))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_into<T: FromStr>(source: &dyn EnvSource, key: &str, slot: &mut T) -> Result<()> {
    if let Some(raw) = lookup(source, key) {
        *slot = raw.parse().map_err(|_| {
            DetectionError::invalid_config(key, &raw, "environment value could not be parsed")
        })?;
    }
    Ok(())
}

/// Apply every recognised override on top of `settings`.
pub fn apply_overrides(settings: &mut Settings, source: &dyn EnvSource) -> Result<()> {
    let detection = &mut settings.detection;
    parse_into(source, "dirt_threshold", &mut detection.dirt_threshold)?;
    parse_into(source, "min_dirt_area", &mut detection.min_dirt_area)?;
    parse_into(source, "confidence_threshold", &mut detection.confidence_threshold)?;
    parse_into(source, "max_image_size", &mut detection.max_image_size)?;
    parse_into(source, "blur_kernel_size", &mut detection.blur_kernel_size)?;

    let service = &mut settings.service;
    parse_into(source, "max_file_size", &mut service.max_file_size)?;
    if let Some(raw) = lookup(source, "allowed_extensions") {
        service.allowed_extensions = raw
            .split(',')
            .map(str::trim)
            .filter(|ext| !ext.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(level) = lookup(source, "log_level") {
        service.log_level = level;
    }
    Ok(())
}
