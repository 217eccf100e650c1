// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::HearthConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &HearthConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.loader.import_workers == 0 {
        errors.push(ConfigError::Validation {
            message: "loader.import_workers must be at least 1".to_string(),
        });
    }

    if let Some(dir) = &config.loader.custom_integrations_dir
        && dir.as_os_str().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "loader.custom_integrations_dir must not be empty when set".to_string(),
        });
    }

    if config.issues.tracker_url.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "issues.tracker_url must not be empty".to_string(),
        });
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
