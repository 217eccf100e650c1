// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Hearth loader.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default issue tracker, filtered to open issues.
pub const DEFAULT_TRACKER_URL: &str =
    "https://github.com/hearth-rs/hearth/issues?q=is%3Aopen+is%3Aissue";

/// Top-level Hearth configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HearthConfig {
    /// Integration loader settings.
    #[serde(default)]
    pub loader: LoaderConfig,

    /// Bug-report routing settings.
    #[serde(default)]
    pub issues: IssuesConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Integration loader configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoaderConfig {
    /// Degraded/minimal mode: custom integrations are never scanned.
    #[serde(default)]
    pub recovery_mode: bool,

    /// Directory holding `<domain>/manifest.json` custom integrations.
    #[serde(default)]
    pub custom_integrations_dir: Option<PathBuf>,

    /// Size of the bounded pool used for blocking imports.
    #[serde(default = "default_import_workers")]
    pub import_workers: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            recovery_mode: false,
            custom_integrations_dir: None,
            import_workers: default_import_workers(),
        }
    }
}

fn default_import_workers() -> usize {
    4
}

/// Where users are pointed to report bugs in built-in integrations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IssuesConfig {
    /// Base tracker URL; a domain label filter is appended to it.
    #[serde(default = "default_tracker_url")]
    pub tracker_url: String,
}

impl Default for IssuesConfig {
    fn default() -> Self {
        Self {
            tracker_url: default_tracker_url(),
        }
    }
}

fn default_tracker_url() -> String {
    DEFAULT_TRACKER_URL.to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
